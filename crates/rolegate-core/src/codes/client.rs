//! Client for the verification code backend
//!
//! The coordinator reads expected codes through the [`CodeSource`] seam.
//! In-process deployments hand it the store itself; a bot running apart
//! from the backend uses [`CodeClient`] to ask over HTTP through the same
//! endpoint the frontend uses.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, Result};

/// Wire shape of a successful code lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeResponse {
    pub code: String,
}

/// Source of the expected verification code for a session
#[async_trait]
pub trait CodeSource: Send + Sync {
    /// Fetch the current code for a session id
    async fn fetch(&self, session_id: &str) -> Result<String>;
}

/// HTTP client for the code backend
#[derive(Debug, Clone)]
pub struct CodeClient {
    client: reqwest::Client,
    base_url: String,
}

impl CodeClient {
    /// Create a client against a backend base URL such as `http://127.0.0.1:5000`
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl CodeSource for CodeClient {
    async fn fetch(&self, session_id: &str) -> Result<String> {
        let url = format!("{}/api/code", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .get(&url)
            .query(&[("id", session_id)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Backend(format!(
                "code lookup returned {}: {}",
                status, body
            )));
        }

        let parsed: CodeResponse = response.json().await?;
        Ok(parsed.code)
    }
}
