//! Edit plans
//!
//! A YAML document describing one pass of the edit wizard: the target page,
//! optional page-detail changes, the components in the order they are ticked
//! and the draft edits for each.
//!
//! ```yaml
//! page: 4
//! details:
//!   title: Upcoming events
//! components:
//!   - kind: carousel
//!     edits:
//!       - add: { title: Spring fair, description: "<p>May 3</p>" }
//!       - image: { index: 0, path: slides/fair.jpg }
//!   - kind: cards
//!     edits:
//!       - set: { index: 0, field: title, value: Tickets }
//!       - remove: 2
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::format_yaml_error;
use crate::models::ComponentKind;

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("Failed to read plan '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse plan '{path}': {message}")]
    Parse { path: String, message: String },

    #[error("Invalid plan: {0}")]
    Invalid(String),
}

/// One wizard pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditPlan {
    /// Existing page to edit
    #[serde(default)]
    pub page: Option<i64>,
    /// Create a new page from `details` instead
    #[serde(default)]
    pub new_page: bool,
    #[serde(default)]
    pub details: DetailsEdit,
    /// Components in tick order
    #[serde(default)]
    pub components: Vec<ComponentPlan>,
}

/// Page-detail fields to change; absent fields keep their value
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetailsEdit {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub parent: Option<i64>,
    pub nav_order: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentPlan {
    pub kind: ComponentKind,
    /// Each edit is a single-key map such as `add: {..}` or `remove: 2`
    #[serde(default, deserialize_with = "serde_yaml::with::singleton_map_recursive::deserialize")]
    pub edits: Vec<DraftEdit>,
}

/// A single editor operation, applied in order after the drafts load
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftEdit {
    /// Append a draft with these fields
    Add(BTreeMap<String, String>),
    Set {
        index: usize,
        field: String,
        value: String,
    },
    Remove(usize),
    Image {
        index: usize,
        path: PathBuf,
    },
    /// Append a module to an about-us draft
    Module {
        index: usize,
        title: String,
        #[serde(default)]
        subtitle: String,
    },
}

impl EditPlan {
    pub fn load(path: &Path) -> Result<Self, PlanError> {
        let content = std::fs::read_to_string(path).map_err(|source| PlanError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    pub fn parse(content: &str, origin: &str) -> Result<Self, PlanError> {
        let plan: EditPlan = serde_yaml::from_str(content).map_err(|e| PlanError::Parse {
            path: origin.to_string(),
            message: format_yaml_error(&e),
        })?;
        plan.validate()?;
        Ok(plan)
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        match (self.page, self.new_page) {
            (Some(_), true) => {
                return Err(PlanError::Invalid("set either `page` or `new_page`, not both".into()))
            }
            (None, false) => return Err(PlanError::Invalid("one of `page` or `new_page` is required".into())),
            _ => {}
        }
        if self.new_page && self.details.title.as_deref().map_or(true, |t| t.trim().is_empty()) {
            return Err(PlanError::Invalid("a new page needs `details.title`".into()));
        }
        for (i, component) in self.components.iter().enumerate() {
            if self.components[..i].iter().any(|c| c.kind == component.kind) {
                return Err(PlanError::Invalid(format!("component `{}` listed twice", component.kind)));
            }
        }
        Ok(())
    }

    /// Draft edits for a component
    pub fn edits_for(&self, kind: ComponentKind) -> &[DraftEdit] {
        self.components
            .iter()
            .find(|c| c.kind == kind)
            .map(|c| c.edits.as_slice())
            .unwrap_or_default()
    }
}
