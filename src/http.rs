use std::time::Duration;

use reqwest::Client;

use crate::error::{PatchdeckError, Result};

/// JSON transport seam. Every API client talks through this trait so tests
/// can run against canned responses instead of the network.
#[async_trait::async_trait]
pub trait HttpClient: Send + Sync {
    async fn get_json(&self, url: &str) -> Result<serde_json::Value>;
}

pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent("Patchdeck/0.3.0")
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client }
    }
}

impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl HttpClient for ReqwestClient {
    async fn get_json(&self, url: &str) -> Result<serde_json::Value> {
        let resp = self.client.get(url).send().await?;

        if !resp.status().is_success() {
            return Err(PatchdeckError::Status {
                url: url.to_string(),
                status: resp.status().as_u16(),
            });
        }

        let value: serde_json::Value = resp.json().await?;
        Ok(value)
    }
}

// ----------------------
// Mocks & Tests
// ----------------------

#[cfg(test)]
pub struct MockHttpClient {
    pub responses:
        std::sync::Mutex<std::collections::HashMap<String, std::result::Result<String, u16>>>,
    pub calls: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockHttpClient {
    pub fn new() -> Self {
        Self {
            responses: std::sync::Mutex::new(std::collections::HashMap::new()),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Register a JSON body for an exact URL.
    pub fn mock_json(&self, url: &str, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), Ok(body.to_string()));
    }

    /// Register a non-success status for an exact URL.
    pub fn mock_status(&self, url: &str, status: u16) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), Err(status));
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[cfg(test)]
#[async_trait::async_trait]
impl HttpClient for MockHttpClient {
    async fn get_json(&self, url: &str) -> Result<serde_json::Value> {
        self.calls.lock().unwrap().push(url.to_string());
        let responses = self.responses.lock().unwrap();
        match responses.get(url) {
            Some(Ok(body)) => Ok(serde_json::from_str(body)?),
            Some(Err(status)) => Err(PatchdeckError::Status {
                url: url.to_string(),
                status: *status,
            }),
            // Unregistered URLs behave like a missing endpoint
            None => Err(PatchdeckError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}
