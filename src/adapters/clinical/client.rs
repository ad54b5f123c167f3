//! Bahmni clinical-records client

use super::models::{ConceptListResponse, PushConceptsRequest};
use super::ClinicalRecordsServer;
use crate::config::ClinicalConfig;
use crate::domain::{Concept, FetchError, Result, SyncError};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::{Client, ClientBuilder, RequestBuilder, Response};
use secrecy::ExposeSecret;
use std::time::Duration;

/// HTTP client for the Bahmni procedure-order endpoints
pub struct BahmniClient {
    base_url: String,
    client: Client,
    config: ClinicalConfig,
}

impl BahmniClient {
    /// Builds the client from configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be constructed.
    pub fn new(config: ClinicalConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();

        let mut client_builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30));

        if !config.tls_verify {
            tracing::warn!("TLS certificate verification disabled for Bahmni");
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder
            .build()
            .map_err(|e| SyncError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            client,
            config,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Build authorization header value
    fn auth_header_value(&self) -> Option<String> {
        match (&self.config.username, &self.config.password) {
            (Some(username), Some(password)) => {
                let credentials = format!("{username}:{}", password.expose_secret());
                let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());
                Some(format!("Basic {encoded}"))
            }
            _ => None,
        }
    }

    async fn send(
        &self,
        request: RequestBuilder,
        url: &str,
    ) -> std::result::Result<Response, FetchError> {
        let request = match self.auth_header_value() {
            Some(auth) => request.header("Authorization", auth),
            None => request,
        };

        let resp = request.send().await.map_err(|e| FetchError::ConnectionFailed {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::ServerError {
                url: url.to_string(),
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(resp)
    }
}

#[async_trait]
impl ClinicalRecordsServer for BahmniClient {
    async fn fetch_concepts(&self) -> std::result::Result<Vec<Concept>, FetchError> {
        let url = self.url(&self.config.concepts_path);
        tracing::debug!(url = %url, "Fetching procedure-order concepts");

        let resp = self.send(self.client.get(&url), &url).await?;
        let list: ConceptListResponse =
            resp.json().await.map_err(|e| FetchError::InvalidResponse {
                url: url.clone(),
                message: e.to_string(),
            })?;

        Ok(list.results)
    }

    async fn delete_body_sites(&self) -> std::result::Result<(), FetchError> {
        let url = self.url(&self.config.body_sites_path);
        tracing::info!(url = %url, "Deleting body-site concepts");

        self.send(self.client.delete(&url), &url).await?;
        Ok(())
    }

    async fn push_concepts(&self, concepts: &[Concept]) -> std::result::Result<(), FetchError> {
        let url = self.url(&self.config.concepts_path);
        tracing::info!(url = %url, count = concepts.len(), "Pushing concepts");

        let request = self.client.post(&url).json(&PushConceptsRequest { concepts });
        self.send(request, &url).await?;
        Ok(())
    }

    fn endpoint(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;
    use crate::domain::ConceptSource;
    use mockito::Matcher;

    fn config_for(server: &mockito::ServerGuard) -> ClinicalConfig {
        ClinicalConfig {
            base_url: format!("{}/", server.url()),
            username: Some("superman".to_string()),
            password: Some(secret_string("Admin123".to_string())),
            concepts_path: "/concepts".to_string(),
            body_sites_path: "/body-sites".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_fetch_concepts() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/concepts")
            .match_header("authorization", Matcher::Regex("^Basic ".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"results":[{"code":"B1","display":"Abdomen","source":"bodySite"}]}"#,
            )
            .create_async()
            .await;

        let client = BahmniClient::new(config_for(&server)).unwrap();
        let concepts = client.fetch_concepts().await.unwrap();

        assert_eq!(
            concepts,
            vec![Concept::new("B1", "Abdomen", ConceptSource::BodySite)]
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_concepts_invalid_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/concepts")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = BahmniClient::new(config_for(&server)).unwrap();
        let err = client.fetch_concepts().await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_delete_body_sites() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/body-sites")
            .with_status(204)
            .create_async()
            .await;

        let client = BahmniClient::new(config_for(&server)).unwrap();
        client.delete_body_sites().await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_body_sites_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/body-sites")
            .with_status(401)
            .with_body("unauthorized")
            .create_async()
            .await;

        let client = BahmniClient::new(config_for(&server)).unwrap();
        let err = client.delete_body_sites().await.unwrap_err();
        assert!(matches!(err, FetchError::ServerError { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_push_concepts() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/concepts")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "concepts": [{"code": "P1", "display": "Biopsy", "source": "procedure"}]
            })))
            .with_status(200)
            .create_async()
            .await;

        let client = BahmniClient::new(config_for(&server)).unwrap();
        client
            .push_concepts(&[Concept::new("P1", "Biopsy", ConceptSource::Procedure)])
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = ClinicalConfig {
            base_url: "https://bahmni.local/".to_string(),
            ..Default::default()
        };
        let client = BahmniClient::new(config).unwrap();
        assert_eq!(client.endpoint(), "https://bahmni.local");
        assert_eq!(
            client.url("/concepts"),
            "https://bahmni.local/concepts"
        );
    }
}
