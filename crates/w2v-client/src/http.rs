use std::time::{Duration, Instant};

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::{debug, warn};
use w2v_common::config::{ClientConfig, Method};
use w2v_common::{Result, VectorError};

use crate::{VectorService, Words};

/// HTTP client for the `/convert/` endpoint.
///
/// One call sends one request; nothing is retried.
#[derive(Debug, Clone)]
pub struct HttpVectorClient {
    client: Client,
    url: Url,
    config: ClientConfig,
}

impl HttpVectorClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let url = Url::parse(&config.endpoint)
            .map_err(|e| VectorError::InvalidConfig(format!("endpoint `{}`: {}", config.endpoint, e)))?;

        let mut builder = Client::builder();
        if let Some(ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        let client = builder.build().map_err(|e| VectorError::Transport(e.to_string()))?;

        Ok(Self { client, url, config })
    }

    /// Validates an untyped JSON value before sending; nothing goes on the
    /// wire when the shape is wrong.
    pub async fn get_vector_value(&self, words: &Value) -> Result<Value> {
        let words = Words::from_json(words).inspect_err(|e| w2v_obs::record_error(e.kind()))?;
        self.get_vector(&words).await
    }

    async fn send(&self, words: &Words) -> Result<Value> {
        let body = serde_json::to_vec(&words.payload())
            .map_err(|e| VectorError::InvalidInput(e.to_string()))?;
        let method = match self.config.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };

        let response = self
            .client
            .request(method, self.url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| VectorError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VectorError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| VectorError::Transport(e.to_string()))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl VectorService for HttpVectorClient {
    async fn get_vector(&self, words: &Words) -> Result<Value> {
        let start = Instant::now();
        match self.send(words).await {
            Ok(value) => {
                let elapsed = start.elapsed();
                w2v_obs::record_request(words.len(), elapsed);
                debug!(
                    target: "client",
                    words = words.len(),
                    elapsed_us = elapsed.as_micros() as u64,
                    "convert request complete"
                );
                Ok(value)
            }
            Err(e) => {
                w2v_obs::record_error(e.kind());
                warn!(target: "client", error = %e, url = %self.url, "convert request failed");
                Err(e)
            }
        }
    }
}
