//! Data models
//!
//! This module contains the records exchanged with the content backend:
//! - Pages (hierarchical, with navigation order)
//! - Page-owned content: cards, carousel items, about-us items
//! - Resource/component identifiers and the list response envelope

mod content;
mod envelope;
mod page;
mod page_ref;
mod resource;

pub use content::{resolve_image_url, AboutUsItem, Card, CarouselItem, Module, PageOwned};
pub use envelope::decode_list;
pub use page::{Page, PageDraft};
pub use page_ref::PageRef;
pub use resource::{ComponentKind, ResourceKind};

/// Lenient integer helpers shared by the wire models.
///
/// The backend is inconsistent about numbers: ids and orders show up as JSON
/// numbers, numeric strings, or null depending on the endpoint.
pub(crate) mod lenient {
    use serde::{de::Error, Deserialize, Deserializer};

    use super::PageRef;

    pub fn id<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = PageRef::deserialize(deserializer)?;
        value
            .as_id()
            .ok_or_else(|| D::Error::custom(format!("invalid id: {}", value)))
    }

    pub fn opt_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value: Option<PageRef> = Option::deserialize(deserializer)?;
        Ok(value.and_then(|v| v.as_id()))
    }

    pub fn order<'de, D>(deserializer: D) -> Result<i32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value: Option<PageRef> = Option::deserialize(deserializer)?;
        Ok(value
            .and_then(|v| v.as_id())
            .and_then(|v| i32::try_from(v).ok())
            .unwrap_or_default())
    }

    pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value: Option<String> = Option::deserialize(deserializer)?;
        Ok(value.unwrap_or_default())
    }
}
