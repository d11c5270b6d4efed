//! reqwest-backed content backend

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use super::{AuthToken, ClientError, ContentBackend, FormPayload};
use crate::config::BackendConfig;
use crate::models::{decode_list, ResourceKind};

/// Content backend over HTTP
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClientError::Transport(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Endpoint for a resource; the backend expects the trailing slash
    pub fn url(&self, kind: ResourceKind) -> String {
        format!("{}/{}/", self.base_url, kind.path())
    }

    async fn send_form(
        &self,
        method: reqwest::Method,
        kind: ResourceKind,
        form: FormPayload,
        token: &AuthToken,
    ) -> Result<(), ClientError> {
        let url = self.url(kind);
        tracing::debug!(%method, %url, fields = ?form.fields(), "Sending content form");

        let response = self
            .client
            .request(method, &url)
            .bearer_auth(token.as_str())
            .multipart(form.into_multipart()?)
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    async fn send_page(
        &self,
        method: reqwest::Method,
        body: Value,
        token: Option<&AuthToken>,
    ) -> Result<reqwest::Response, ClientError> {
        let url = self.url(ResourceKind::Pages);
        tracing::debug!(%method, %url, payload = %body, "Sending page details");

        let mut request = self.client.request(method, &url).json(&body);
        if let Some(token) = token {
            request = request.bearer_auth(token.as_str());
        }
        check(request.send().await?).await
    }
}

/// Map non-success statuses onto the error taxonomy
async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(ClientError::Unauthorized);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

#[async_trait]
impl ContentBackend for HttpBackend {
    async fn list(&self, kind: ResourceKind) -> Result<Vec<Value>, ClientError> {
        let url = self.url(kind);
        let response = check(self.client.get(&url).send().await?).await?;
        let body: Value = response.json().await?;
        decode_list(kind, body)
    }

    async fn create(
        &self,
        kind: ResourceKind,
        form: FormPayload,
        token: &AuthToken,
    ) -> Result<(), ClientError> {
        self.send_form(reqwest::Method::POST, kind, form, token).await
    }

    async fn update(
        &self,
        kind: ResourceKind,
        form: FormPayload,
        token: &AuthToken,
    ) -> Result<(), ClientError> {
        self.send_form(reqwest::Method::PUT, kind, form, token).await
    }

    async fn delete(&self, kind: ResourceKind, id: i64, token: &AuthToken) -> Result<(), ClientError> {
        let url = self.url(kind);
        tracing::debug!(%url, id, "Deleting content item");

        let response = self
            .client
            .delete(&url)
            .bearer_auth(token.as_str())
            .json(&json!({ "id": id }))
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    async fn create_page(&self, body: Value, token: Option<&AuthToken>) -> Result<Value, ClientError> {
        let response = self.send_page(reqwest::Method::POST, body, token).await?;
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        match serde_json::from_str(&text) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::warn!(error = %e, "Create page response is not JSON, id will be looked up by title");
                Ok(Value::Null)
            }
        }
    }

    async fn update_page(&self, body: Value, token: Option<&AuthToken>) -> Result<(), ClientError> {
        self.send_page(reqwest::Method::PUT, body, token).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_base_and_path() {
        let config = BackendConfig {
            base_url: "https://cms.example.org/backend/api/".to_string(),
            ..BackendConfig::default()
        };
        let backend = HttpBackend::new(&config).unwrap();
        assert_eq!(
            backend.url(ResourceKind::Carousel),
            "https://cms.example.org/backend/api/carousel1-item/"
        );
        assert_eq!(
            backend.url(ResourceKind::Navbar),
            "https://cms.example.org/backend/api/navbar-list/"
        );
    }
}
