//! HTTP client for the recommendation backend

use crate::error::{Error, Result};
use crate::recommend::{Recommendation, RecommendationRequest};
use serde_json::Value;
use tracing::debug;

/// Posts prompts to the recommendation endpoint
#[derive(Debug, Clone)]
pub struct RecommendationClient {
    client: reqwest::Client,
    url: String,
}

impl RecommendationClient {
    /// `url` is the full endpoint, e.g. `http://localhost:8000/api/recommend-food`
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Send `prompt` and return the backend's recommendation
    pub async fn recommend(&self, prompt: &str) -> Result<Recommendation> {
        debug!(url = %self.url, prompt_len = prompt.len(), "requesting recommendation");

        let response = self
            .client
            .post(&self.url)
            .json(&RecommendationRequest {
                prompt: prompt.to_string(),
            })
            .send()
            .await
            .map_err(|e| Error::Transport(format!("Recommendation request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Transport(format!(
                "Recommendation backend returned status: {}",
                response.status()
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            Error::UpstreamDataMissing(format!("Failed to parse recommendation response: {}", e))
        })?;

        parse_recommendation(body)
    }
}

/// Whether an `error` field signals a failure
///
/// Only truthy values count: `null`, `false`, `0` and `""` mean no error.
fn is_error(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0 && !v.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Interpret a backend body: a truthy `error` field wins, anything else is a recommendation
pub fn parse_recommendation(body: Value) -> Result<Recommendation> {
    match body.get("error") {
        Some(Value::String(message)) if !message.is_empty() => {
            return Err(Error::Upstream(message.clone()))
        }
        Some(other) if is_error(other) => return Err(Error::Upstream(other.to_string())),
        _ => {}
    }

    Ok(serde_json::from_value(body)?)
}
