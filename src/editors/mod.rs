//! Content editors
//!
//! A [`ContentEditor`] holds the working drafts of one content type for one
//! page. Drafts are copied from the backend list on load and written back
//! only by [`ContentEditor::save_all`], one request at a time, in order.

mod content;

pub use content::EditableContent;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::backend::{require_token, AuthToken, ClientError, ContentBackend, FormPayload, ImageUpload};
use crate::cache::{decode_items, ContentCache};
use crate::config::ImageConfig;
use crate::models::{AboutUsItem, Card, CarouselItem, ComponentKind, Module, PageRef};

pub type CardEditor = ContentEditor<Card>;
pub type CarouselEditor = ContentEditor<CarouselItem>;
pub type AboutUsEditor = ContentEditor<AboutUsItem>;

/// Error types for editor operations
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("No draft at index {0}")]
    InvalidIndex(usize),

    #[error("{component} drafts have no field '{field}'")]
    UnknownField { component: ComponentKind, field: String },

    #[error("Image rejected: {0}")]
    InvalidImage(String),

    #[error("Draft {index} cannot be saved: {reason}")]
    Invalid { index: usize, reason: String },

    #[error("Failed to load {component}: {source}")]
    Load {
        component: ComponentKind,
        #[source]
        source: ClientError,
    },

    #[error("Failed to delete {component} {id}: {source}")]
    Delete {
        component: ComponentKind,
        id: i64,
        #[source]
        source: ClientError,
    },

    #[error(transparent)]
    Client(#[from] ClientError),

    /// Drafts before `failed_index` were written; none after it were attempted
    #[error("Saving {component} stopped at draft {failed_index} after {saved} saved: {source}")]
    PartialSave {
        component: ComponentKind,
        saved: usize,
        failed_index: usize,
        #[source]
        source: ClientError,
    },
}

impl EditorError {
    /// Single user-facing message for the failure
    pub fn user_message(&self) -> String {
        match self {
            Self::Load { source, .. } | Self::Delete { source, .. } | Self::PartialSave { source, .. }
                if source.is_auth_failure() =>
            {
                source.user_message().to_string()
            }
            Self::Client(source) => source.user_message().to_string(),
            Self::Load { .. } => "Failed to load items. Please try again.".to_string(),
            Self::Delete { .. } => "Failed to delete item. Please try again.".to_string(),
            Self::PartialSave { .. } => "Save failed. Please try again.".to_string(),
            Self::Invalid { reason, .. } => format!("Please complete all required fields: {}", reason),
            Self::InvalidIndex(_) | Self::UnknownField { .. } | Self::InvalidImage(_) => self.to_string(),
        }
    }
}

/// Result of a complete save pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOutcome {
    /// Completion tag handed back to the caller
    pub kind: ComponentKind,
    pub created: usize,
    pub updated: usize,
}

/// Draft list for one content type of one page
pub struct ContentEditor<T: EditableContent> {
    page: PageRef,
    cache: Arc<ContentCache>,
    backend: Arc<dyn ContentBackend>,
    images: ImageConfig,
    drafts: Vec<T>,
    staged: BTreeMap<usize, ImageUpload>,
}

impl<T: EditableContent> ContentEditor<T> {
    pub fn new(
        page: impl Into<PageRef>,
        cache: Arc<ContentCache>,
        backend: Arc<dyn ContentBackend>,
        images: ImageConfig,
    ) -> Self {
        Self {
            page: page.into(),
            cache,
            backend,
            images,
            drafts: Vec::new(),
            staged: BTreeMap::new(),
        }
    }

    pub fn page(&self) -> &PageRef {
        &self.page
    }

    pub fn drafts(&self) -> &[T] {
        &self.drafts
    }

    /// Staged image for a draft, if any
    pub fn staged_image(&self, index: usize) -> Option<&ImageUpload> {
        self.staged.get(&index)
    }

    /// Replace the drafts with this page's records from a fresh fetch.
    ///
    /// On failure the current drafts are kept.
    pub async fn load(&mut self) -> Result<&[T], EditorError> {
        let kind = T::COMPONENT.resource();
        let load_error = |source| EditorError::Load {
            component: T::COMPONENT,
            source,
        };

        let items = self.cache.refresh(kind).await.map_err(load_error)?;
        let records: Vec<T> = decode_items(&items).map_err(load_error)?;

        self.drafts = records
            .into_iter()
            .filter(|record| record.belongs_to(&self.page))
            .collect();
        self.staged.clear();

        tracing::debug!(component = %T::COMPONENT, page = %self.page, count = self.drafts.len(), "Drafts loaded");
        Ok(&self.drafts)
    }

    /// Append a blank draft and return its index
    pub fn add(&mut self) -> usize {
        self.drafts.push(T::blank(&self.page));
        self.drafts.len() - 1
    }

    /// Set a text field of a draft by name
    pub fn set_field(&mut self, index: usize, field: &str, value: impl Into<String>) -> Result<(), EditorError> {
        let draft = self.drafts.get_mut(index).ok_or(EditorError::InvalidIndex(index))?;
        let slot = draft.field_mut(field).ok_or_else(|| EditorError::UnknownField {
            component: T::COMPONENT,
            field: field.to_string(),
        })?;
        *slot = value.into();
        Ok(())
    }

    /// Stage an image for a draft; it is uploaded with the draft on save.
    pub fn attach_image(&mut self, index: usize, upload: ImageUpload) -> Result<(), EditorError> {
        if index >= self.drafts.len() {
            return Err(EditorError::InvalidIndex(index));
        }
        if !self.images.is_type_allowed(&upload.content_type) {
            return Err(EditorError::InvalidImage(format!(
                "type '{}' is not allowed",
                upload.content_type
            )));
        }
        if upload.len() as u64 > self.images.max_file_size {
            return Err(EditorError::InvalidImage(format!(
                "{} bytes exceeds the {} byte limit",
                upload.len(),
                self.images.max_file_size
            )));
        }
        self.staged.insert(index, upload);
        Ok(())
    }

    pub fn add_module(&mut self, index: usize) -> Result<usize, EditorError> {
        let modules = self.modules(index)?;
        modules.push(Module::default());
        Ok(modules.len() - 1)
    }

    pub fn edit_module(
        &mut self,
        index: usize,
        module: usize,
        title: impl Into<String>,
        subtitle: impl Into<String>,
    ) -> Result<(), EditorError> {
        let slot = self
            .modules(index)?
            .get_mut(module)
            .ok_or(EditorError::InvalidIndex(module))?;
        *slot = Module::new(title, subtitle);
        Ok(())
    }

    pub fn remove_module(&mut self, index: usize, module: usize) -> Result<Module, EditorError> {
        let modules = self.modules(index)?;
        if module >= modules.len() {
            return Err(EditorError::InvalidIndex(module));
        }
        Ok(modules.remove(module))
    }

    fn modules(&mut self, index: usize) -> Result<&mut Vec<Module>, EditorError> {
        let draft = self.drafts.get_mut(index).ok_or(EditorError::InvalidIndex(index))?;
        draft.modules_mut().ok_or_else(|| EditorError::UnknownField {
            component: T::COMPONENT,
            field: "module".to_string(),
        })
    }

    /// Remove a draft, deleting it remotely first when it is persisted.
    ///
    /// If the remote delete fails the draft stays in the list.
    pub async fn remove(&mut self, index: usize, token: Option<&AuthToken>) -> Result<T, EditorError> {
        let draft = self.drafts.get(index).ok_or(EditorError::InvalidIndex(index))?;

        if let Some(id) = draft.id() {
            let token = require_token(token)?;
            let kind = T::COMPONENT.resource();
            self.backend
                .delete(kind, id, token)
                .await
                .map_err(|source| {
                    tracing::warn!(component = %T::COMPONENT, id, error = %source, "Delete failed");
                    EditorError::Delete {
                        component: T::COMPONENT,
                        id,
                        source,
                    }
                })?;
            self.cache.invalidate(kind).await;
            tracing::info!(component = %T::COMPONENT, id, "Item deleted");
        }

        self.staged = std::mem::take(&mut self.staged)
            .into_iter()
            .filter(|(i, _)| *i != index)
            .map(|(i, upload)| if i > index { (i - 1, upload) } else { (i, upload) })
            .collect();
        Ok(self.drafts.remove(index))
    }

    /// Write every draft, in order, one request at a time.
    ///
    /// Drafts with an id are updated, the rest created. The first failure
    /// stops the pass; earlier writes are not rolled back.
    pub async fn save_all(&mut self, token: Option<&AuthToken>) -> Result<SaveOutcome, EditorError> {
        let component = T::COMPONENT;
        let kind = component.resource();
        let mut outcome = SaveOutcome {
            kind: component,
            created: 0,
            updated: 0,
        };
        if self.drafts.is_empty() {
            return Ok(outcome);
        }

        let token = require_token(token)?;
        for (index, draft) in self.drafts.iter().enumerate() {
            draft
                .validate()
                .map_err(|reason| EditorError::Invalid { index, reason })?;
        }

        for (index, draft) in self.drafts.iter().enumerate() {
            let result = self.write(draft, index, token).await;
            if let Err(source) = result {
                let saved = outcome.created + outcome.updated;
                tracing::warn!(%component, index, saved, error = %source, "Save stopped");
                if saved > 0 {
                    self.cache.invalidate(kind).await;
                }
                return Err(EditorError::PartialSave {
                    component,
                    saved,
                    failed_index: index,
                    source,
                });
            }
            if draft.id().is_some() {
                outcome.updated += 1;
            } else {
                outcome.created += 1;
            }
        }

        self.cache.invalidate(kind).await;
        self.staged.clear();
        tracing::info!(%component, page = %self.page, created = outcome.created, updated = outcome.updated, "Saved");
        Ok(outcome)
    }

    async fn write(&self, draft: &T, index: usize, token: &AuthToken) -> Result<(), ClientError> {
        let kind = T::COMPONENT.resource();
        let mut form = draft.write_fields(&self.page, FormPayload::new())?;
        if let Some(upload) = self.staged.get(&index) {
            form = form.file("image", upload.clone());
        }
        match draft.id() {
            Some(id) => {
                let form = form.text("id", id.to_string());
                self.backend.update(kind, form, token).await
            }
            None => self.backend.create(kind, form, token).await,
        }
    }
}
