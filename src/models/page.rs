//! Page model for the hierarchical site navigation

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::lenient;

/// A page in the site tree.
///
/// The flat `pages-item` list carries `parent` ids; the `navbar-list`
/// endpoint returns the same records pre-nested under `children`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(deserialize_with = "lenient::id")]
    pub id: i64,
    #[serde(rename = "page_title", default, deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(rename = "sub_title", default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_id")]
    pub parent: Option<i64>,
    #[serde(default, deserialize_with = "lenient::order")]
    pub nav_order: i32,
    #[serde(default)]
    pub children: Vec<Page>,
}

impl Page {
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            subtitle: None,
            parent: None,
            nav_order: 0,
            children: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent: i64) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_children(mut self, children: Vec<Page>) -> Self {
        self.children = children;
        self
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Page details as edited in the wizard, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageDraft {
    /// Existing page id; `None` creates a new page
    pub id: Option<i64>,
    pub title: String,
    pub subtitle: Option<String>,
    pub parent: Option<i64>,
    pub nav_order: i32,
}

impl PageDraft {
    /// JSON body for the `pages-item` endpoint.
    ///
    /// Updates identify the row by the `id` body field. An empty subtitle is
    /// omitted on create and cleared on update.
    pub fn to_body(&self) -> Value {
        let mut body = json!({
            "page_title": self.title,
            "parent": self.parent,
            "nav_order": self.nav_order,
        });
        let subtitle = self.subtitle.as_deref().filter(|s| !s.is_empty());
        match (self.id, subtitle) {
            (Some(id), subtitle) => {
                body["id"] = json!(id);
                body["sub_title"] = json!(subtitle.unwrap_or_default());
            }
            (None, Some(subtitle)) => body["sub_title"] = json!(subtitle),
            (None, None) => {}
        }
        body
    }
}
