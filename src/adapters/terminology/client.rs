//! FHIR terminology server client
//!
//! Talks to a Snowstorm-style FHIR endpoint: members are created with one
//! `POST` per member and value sets are read back with a `GET` on the same URL.

use super::models::{value_sets_from_json, ValueSetResource};
use super::TerminologyServer;
use crate::config::TerminologyConfig;
use crate::domain::{FetchError, Member, PublishError, Result, SyncError, ValueSet};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::{Client, ClientBuilder};
use secrecy::ExposeSecret;
use std::time::Duration;

const FHIR_JSON: &str = "application/fhir+json";

/// HTTP client for the FHIR value set endpoint
pub struct FhirTerminologyClient {
    client: Client,
    config: TerminologyConfig,
}

impl FhirTerminologyClient {
    /// Builds the client from configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be constructed.
    pub fn new(config: TerminologyConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SyncError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
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
}

#[async_trait]
impl TerminologyServer for FhirTerminologyClient {
    async fn create_member(
        &self,
        value_set: &ValueSet,
        member: &Member,
    ) -> std::result::Result<u16, PublishError> {
        let payload =
            ValueSetResource::for_member(value_set, member, &self.config.canonical_base);

        tracing::debug!(
            value_set = %value_set.name,
            code = %member.code,
            url = %self.config.valueset_url,
            "Creating value set member"
        );

        let mut request = self.client.post(&self.config.valueset_url).json(&payload);

        if let Some(auth) = self.auth_header_value() {
            request = request.header("Authorization", auth);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| PublishError::transport(&member.code, e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let cause = if body.is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                body
            };
            return Err(PublishError::status(&member.code, status.as_u16(), cause));
        }

        Ok(status.as_u16())
    }

    async fn fetch_value_sets(&self) -> std::result::Result<Vec<ValueSet>, FetchError> {
        let url = &self.config.valueset_url;
        tracing::debug!(url = %url, "Fetching value sets");

        let mut request = self.client.get(url).header("Accept", FHIR_JSON);
        if let Some(auth) = self.auth_header_value() {
            request = request.header("Authorization", auth);
        }

        let resp = request.send().await.map_err(|e| FetchError::ConnectionFailed {
            url: url.clone(),
            message: e.to_string(),
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::ServerError {
                url: url.clone(),
                status: status.as_u16(),
                message: body,
            });
        }

        let body: serde_json::Value = resp.json().await.map_err(|e| FetchError::InvalidResponse {
            url: url.clone(),
            message: e.to_string(),
        })?;

        let value_sets =
            value_sets_from_json(&body).map_err(|message| FetchError::InvalidResponse {
                url: url.clone(),
                message,
            })?;

        tracing::info!(count = value_sets.len(), "Fetched value sets from terminology server");
        Ok(value_sets)
    }

    fn endpoint(&self) -> &str {
        &self.config.valueset_url
    }
}
