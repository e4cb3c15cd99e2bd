//! openFDA drug-label client.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use super::{InteractionError, InteractionResult, InteractionSource};

/// Public drug-label endpoint.
pub const DEFAULT_OPENFDA_URL: &str = "https://api.fda.gov/drug/label.json";

/// Blocking HTTP client for the openFDA label endpoint.
pub struct OpenFdaClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::blocking::Client,
}

impl OpenFdaClient {
    /// Create a client. Without a timeout the HTTP client default applies.
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Option<Duration>,
    ) -> InteractionResult<Self> {
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| InteractionError::Http(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }
}

/// Response body from the label endpoint. Absent and null lists are empty.
#[derive(Debug, Deserialize)]
struct LabelResponse {
    #[serde(default)]
    results: Option<Vec<LabelRecord>>,
}

#[derive(Debug, Deserialize)]
struct LabelRecord {
    #[serde(default)]
    drug_interactions: Option<Vec<String>>,
    #[serde(default)]
    warnings: Option<Vec<String>>,
}

/// Extract interaction entries from a label response body.
///
/// Returns `None` when the response holds no label record. Otherwise the
/// first record's `drug_interactions` followed by its `warnings`; a missing
/// field counts as an empty list.
pub fn parse_label_response(body: &str) -> InteractionResult<Option<Vec<String>>> {
    let response: LabelResponse = serde_json::from_str(body)
        .map_err(|e| InteractionError::Malformed(e.to_string()))?;

    let first = response.results.unwrap_or_default().into_iter().next();
    Ok(first.map(|label| {
        let mut entries = label.drug_interactions.unwrap_or_default();
        entries.extend(label.warnings.unwrap_or_default());
        entries
    }))
}

impl InteractionSource for OpenFdaClient {
    fn fetch(&self, ingredient: &str) -> InteractionResult<Option<Vec<String>>> {
        let mut query = vec![
            ("search", format!("openfda.substance_name:\"{}\"", ingredient)),
            ("limit", "1".to_string()),
        ];
        if let Some(key) = &self.api_key {
            query.push(("api_key", key.clone()));
        }

        let response = self
            .client
            .get(&self.base_url)
            .query(&query)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    InteractionError::Http(format!("request timed out: {}", e))
                } else {
                    InteractionError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(InteractionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .map_err(|e| InteractionError::Http(e.to_string()))?;
        debug!(ingredient, bytes = body.len(), "received label response");

        parse_label_response(&body)
    }
}
