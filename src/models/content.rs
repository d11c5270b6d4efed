//! Page-owned content: cards, carousel items and about-us items

use serde::{Deserialize, Deserializer, Serialize};

use super::{lenient, PageRef};

/// Content that belongs to a single page.
pub trait PageOwned {
    /// The owning-page field as it came over the wire
    fn owning_page(&self) -> Option<&PageRef>;

    /// Whether this record is owned by `page`.
    ///
    /// The default compares coerced numeric ids. Types whose backend rows
    /// also carry a denormalized page title override this.
    fn belongs_to(&self, page: &PageRef) -> bool {
        self.owning_page().is_some_and(|own| own.same_page(page))
    }
}

/// A card shown on a page
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Card {
    #[serde(default, deserialize_with = "lenient::opt_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub page: Option<PageRef>,
    /// Denormalized owning-page title, present on some rows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_title: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,
    /// Rich-text (HTML) body
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl PageOwned for Card {
    fn owning_page(&self) -> Option<&PageRef> {
        self.page.as_ref()
    }

    fn belongs_to(&self, page: &PageRef) -> bool {
        // Rows are matched by id or by the denormalized title; both are live
        // in the backend data.
        if self.page_title.as_deref() == Some(page.to_string().as_str()) {
            return true;
        }
        self.owning_page().is_some_and(|own| own.same_page(page))
    }
}

/// A slide of the page carousel
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CarouselItem {
    #[serde(default, deserialize_with = "lenient::opt_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub page: Option<PageRef>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub sub_title: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl PageOwned for CarouselItem {
    fn owning_page(&self) -> Option<&PageRef> {
        self.page.as_ref()
    }
}

/// A title/subtitle entry inside an about-us item
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Module {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
}

impl Module {
    pub fn new(title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.into(),
        }
    }
}

/// An about-us block with its module list
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AboutUsItem {
    #[serde(default, deserialize_with = "lenient::opt_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub page: Option<PageRef>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "modules")]
    pub module: Vec<Module>,
}

impl PageOwned for AboutUsItem {
    fn owning_page(&self) -> Option<&PageRef> {
        self.page.as_ref()
    }
}

/// Older rows store modules as plain strings; those become titles.
fn modules<'de, D>(deserializer: D) -> Result<Vec<Module>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Legacy(String),
        Full(Module),
    }

    let raw: Option<Vec<Repr>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|repr| match repr {
            Repr::Legacy(title) => Module::new(title, ""),
            Repr::Full(module) => module,
        })
        .collect())
}

/// Resolve an image reference from a list response against the media origin.
///
/// Absolute URLs are kept as they are; relative paths are joined to the
/// origin with exactly one `/` between them.
pub fn resolve_image_url(origin: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    let origin = origin.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", origin, path)
    } else {
        format!("{}/{}", origin, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_card_matches_by_numeric_page() {
        let card: Card = serde_json::from_value(json!({"id": 1, "page": "7", "title": "A"})).unwrap();
        assert!(card.belongs_to(&PageRef::Id(7)));
        assert!(card.belongs_to(&PageRef::from("7")));
        assert!(!card.belongs_to(&PageRef::Id(8)));
    }

    #[test]
    fn test_card_matches_by_denormalized_title() {
        let card: Card = serde_json::from_value(json!({
            "id": 1,
            "page": 3,
            "page_title": "Gallery",
            "title": "A"
        }))
        .unwrap();
        assert!(card.belongs_to(&PageRef::from("Gallery")));
        assert!(card.belongs_to(&PageRef::Id(3)));
    }

    #[test]
    fn test_carousel_ignores_title_matching() {
        let item = CarouselItem {
            page: Some(PageRef::Id(2)),
            title: "Gallery".into(),
            ..Default::default()
        };
        assert!(!item.belongs_to(&PageRef::from("Gallery")));
        assert!(item.belongs_to(&PageRef::Id(2)));
    }

    #[test]
    fn test_legacy_string_modules_are_normalized() {
        let item: AboutUsItem = serde_json::from_value(json!({
            "id": 5,
            "page": 1,
            "title": "Team",
            "description": "<p>hi</p>",
            "module": ["Mission", {"title": "Vision", "subtitle": "2030"}]
        }))
        .unwrap();
        assert_eq!(
            item.module,
            vec![Module::new("Mission", ""), Module::new("Vision", "2030")]
        );
    }

    #[test]
    fn test_null_fields_become_defaults() {
        let card: Card = serde_json::from_value(json!({
            "id": null,
            "page": null,
            "title": null,
            "description": null,
            "image": null
        }))
        .unwrap();
        assert_eq!(card, Card::default());
    }

    #[test]
    fn test_resolve_image_url() {
        let origin = "https://example.org/backend/";
        assert_eq!(
            resolve_image_url(origin, "/media/a.png"),
            "https://example.org/backend/media/a.png"
        );
        assert_eq!(
            resolve_image_url(origin, "media/a.png"),
            "https://example.org/backend/media/a.png"
        );
        assert_eq!(
            resolve_image_url(origin, "https://cdn.example.org/a.png"),
            "https://cdn.example.org/a.png"
        );
    }
}
