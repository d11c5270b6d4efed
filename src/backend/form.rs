//! Multipart form payloads for content writes

use super::ClientError;

/// An image file staged for upload
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Ordered text fields plus an optional file part.
///
/// Kept transport-neutral so test doubles can inspect exactly what would
/// have been sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormPayload {
    fields: Vec<(String, String)>,
    file: Option<(String, ImageUpload)>,
}

impl FormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text field
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Attach a file part, replacing any previous one
    pub fn file(mut self, name: impl Into<String>, upload: ImageUpload) -> Self {
        self.file = Some((name.into(), upload));
        self
    }

    /// First value of a text field
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn file_part(&self) -> Option<(&str, &ImageUpload)> {
        self.file.as_ref().map(|(name, upload)| (name.as_str(), upload))
    }

    /// Convert into a reqwest multipart form
    pub fn into_multipart(self) -> Result<reqwest::multipart::Form, ClientError> {
        let mut form = reqwest::multipart::Form::new();
        for (name, value) in self.fields {
            form = form.text(name, value);
        }
        if let Some((name, upload)) = self.file {
            let part = reqwest::multipart::Part::bytes(upload.bytes)
                .file_name(upload.file_name)
                .mime_str(&upload.content_type)
                .map_err(|e| ClientError::Decode(format!("invalid image content type: {}", e)))?;
            form = form.part(name, part);
        }
        Ok(form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_keep_insertion_order() {
        let form = FormPayload::new()
            .text("page", "7")
            .text("title", "Hello")
            .text("id", "3");
        let names: Vec<&str> = form.fields().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["page", "title", "id"]);
        assert_eq!(form.get("title"), Some("Hello"));
        assert_eq!(form.get("missing"), None);
    }

    #[test]
    fn test_file_part() {
        let form = FormPayload::new().file("image", ImageUpload::new("a.png", "image/png", vec![1, 2, 3]));
        let (name, upload) = form.file_part().unwrap();
        assert_eq!(name, "image");
        assert_eq!(upload.len(), 3);
        assert!(form.into_multipart().is_ok());
    }

    #[test]
    fn test_bad_content_type_is_rejected() {
        let form = FormPayload::new().file("image", ImageUpload::new("a.png", "not a mime", vec![1]));
        assert!(form.into_multipart().is_err());
    }
}
