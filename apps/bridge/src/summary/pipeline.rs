//! Validate → lookup → summarize → respond, shared by every summary route.
//!
//! Each step runs only after the previous one succeeded. The first failure is
//! returned as an [`AppError`]; nothing is retried.

use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::{CompletionBackend, LlmError};
use crate::servicenow::{RecordKind, RecordSource, VendorRecord, PLACEHOLDER};
use crate::summary::models::{
    BridgeResponse, Endpoint, LookupRequest, StructuredSummary, SummaryResult, SummaryStyle,
};
use crate::summary::prompts::{build_incident_prompt, build_item_prompt, system_prompt};

pub async fn run_pipeline(
    endpoint: &Endpoint,
    payload: &Value,
    records: &dyn RecordSource,
    llm: &dyn CompletionBackend,
) -> Result<BridgeResponse, AppError> {
    let request = LookupRequest::from_payload(endpoint, payload)?;
    info!(
        "Request for {}: {}",
        endpoint.identifier_field, request.identifier
    );

    let record = records
        .fetch_record(endpoint.kind, &request.identifier)
        .await?;

    let summary = summarize(endpoint, &request.identifier, &record, llm).await?;

    Ok(BridgeResponse::new(endpoint, request.identifier, summary))
}

/// Produces the endpoint's summary for an already fetched record.
pub async fn summarize(
    endpoint: &Endpoint,
    identifier: &str,
    record: &VendorRecord,
    llm: &dyn CompletionBackend,
) -> Result<SummaryResult, LlmError> {
    match endpoint.style {
        SummaryStyle::Brief => Ok(SummaryResult::Text(brief_summary(
            endpoint.kind,
            identifier,
            record,
        ))),
        SummaryStyle::FreeText => {
            let prompt = match endpoint.kind {
                RecordKind::Incident => build_incident_prompt(record),
                RecordKind::RequestItem => build_item_prompt(record),
            };
            let text = llm.complete(&system_prompt(endpoint.kind), &prompt).await?;
            Ok(SummaryResult::Text(text))
        }
        SummaryStyle::Structured => {
            let content = llm
                .complete(&system_prompt(endpoint.kind), &build_incident_prompt(record))
                .await?;
            let structured = StructuredSummary::parse(&content)?;
            if let Some(level) = structured.risk_level() {
                info!("{identifier} assessed risk level: {level:?}");
            }
            Ok(SummaryResult::Structured(structured))
        }
    }
}

/// `Incident INC0001234: Spill (Priority 2)`
pub fn brief_summary(kind: RecordKind, identifier: &str, record: &VendorRecord) -> String {
    let description = record
        .text("short_description")
        .unwrap_or_else(|| "No description".to_string());
    let priority = record
        .text("priority")
        .unwrap_or_else(|| PLACEHOLDER.to_string());
    format!("{} {identifier}: {description} (Priority {priority})", kind.label())
}
