//! Content backend access
//!
//! The dashboard talks to a REST backend exposing one list/write endpoint per
//! resource type. [`ContentBackend`] is the seam: [`HttpBackend`] speaks the
//! real protocol, and tests substitute a recording double.
//!
//! Write semantics follow the backend:
//! - content items (cards, carousel, about-us) are written as multipart forms
//!   and require a bearer token
//! - updates name their target row with an `id` body field, never a path segment
//! - pages are written as JSON

mod error;
mod form;
mod http;

#[cfg(test)]
pub(crate) mod testing;

pub use error::ClientError;
pub use form::{FormPayload, ImageUpload};
pub use http::HttpBackend;

use async_trait::async_trait;
use serde_json::Value;

use crate::models::ResourceKind;

/// Bearer token for authenticated writes
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

/// Resolve the token required for a content write.
///
/// Missing credentials short-circuit locally; no request is attempted.
pub fn require_token(token: Option<&AuthToken>) -> Result<&AuthToken, ClientError> {
    token.ok_or(ClientError::MissingToken)
}

/// Remote content store
#[async_trait]
pub trait ContentBackend: Send + Sync {
    /// Fetch the full, unfiltered list for a resource
    async fn list(&self, kind: ResourceKind) -> Result<Vec<Value>, ClientError>;

    /// Create a content item from a multipart form
    async fn create(
        &self,
        kind: ResourceKind,
        form: FormPayload,
        token: &AuthToken,
    ) -> Result<(), ClientError>;

    /// Update the content item named by the form's `id` field
    async fn update(
        &self,
        kind: ResourceKind,
        form: FormPayload,
        token: &AuthToken,
    ) -> Result<(), ClientError>;

    /// Delete a content item by id
    async fn delete(&self, kind: ResourceKind, id: i64, token: &AuthToken) -> Result<(), ClientError>;

    /// Create a page; returns the response body (may be `Value::Null`)
    async fn create_page(&self, body: Value, token: Option<&AuthToken>) -> Result<Value, ClientError>;

    /// Update the page named by the body's `id` field
    async fn update_page(&self, body: Value, token: Option<&AuthToken>) -> Result<(), ClientError>;
}
