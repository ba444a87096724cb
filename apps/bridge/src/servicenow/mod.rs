//! ServiceNow Table API client — looks up a single incident or request item
//! by its human-readable number.
//!
//! Handlers never talk to ServiceNow directly; they go through the
//! [`RecordSource`] carried in `AppState`. The number is spliced into an
//! encoded query (`number=<n>`); callers must reject `^` beforehand, which
//! `LookupRequest::from_payload` does for every inbound route.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;

pub mod record;

pub use record::{RecordKind, VendorRecord, PLACEHOLDER};

#[derive(Debug, Error)]
pub enum ServiceNowError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ServiceNow API error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("{} {number} not found in ServiceNow", .kind.label())]
    NotFound { kind: RecordKind, number: String },

    #[error("Invalid ServiceNow URL: {0}")]
    InvalidUrl(String),

    #[error("Unexpected ServiceNow payload: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Source of vendor records. Implemented by [`ServiceNowClient`]; tests swap
/// in an in-memory fake.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Returns the single record whose `number` equals `number` exactly.
    async fn fetch_record(
        &self,
        kind: RecordKind,
        number: &str,
    ) -> Result<VendorRecord, ServiceNowError>;
}

#[derive(Debug, Deserialize)]
struct TableResponse {
    #[serde(default)]
    result: Vec<VendorRecord>,
}

/// Basic-auth client for `<instance>/api/now/table/<table>`.
#[derive(Clone)]
pub struct ServiceNowClient {
    client: Client,
    instance: String,
    username: String,
    password: String,
}

impl ServiceNowClient {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            instance: config.sn_instance.clone(),
            username: config.sn_username.clone(),
            password: config.sn_password.clone(),
        }
    }

    /// Query URL for one record with reference fields resolved to display values.
    pub fn lookup_url(&self, kind: RecordKind, number: &str) -> Result<Url, ServiceNowError> {
        let base = format!("{}/api/now/table/{}", self.instance, kind.table());
        Url::parse_with_params(
            &base,
            &[
                ("sysparm_query", format!("number={number}")),
                ("sysparm_limit", "1".to_string()),
                ("sysparm_display_value", "true".to_string()),
            ],
        )
        .map_err(|e| ServiceNowError::InvalidUrl(format!("{base}: {e}")))
    }
}

#[async_trait]
impl RecordSource for ServiceNowClient {
    async fn fetch_record(
        &self,
        kind: RecordKind,
        number: &str,
    ) -> Result<VendorRecord, ServiceNowError> {
        let url = self.lookup_url(kind, number)?;
        info!("Calling ServiceNow URL: {url}");

        let response = self
            .client
            .get(url)
            .basic_auth(&self.username, Some(&self.password))
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        info!("ServiceNow status: {status}");
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ServiceNowError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let table: TableResponse = serde_json::from_str(&body)?;
        debug!("ServiceNow returned {} row(s)", table.result.len());

        table
            .result
            .into_iter()
            .next()
            .ok_or_else(|| ServiceNowError::NotFound {
                kind,
                number: number.to_string(),
            })
    }
}
