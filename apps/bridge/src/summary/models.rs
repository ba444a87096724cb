use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::errors::AppError;
use crate::llm_client::{parse_json_content, LlmError};
use crate::servicenow::RecordKind;

// ────────────────────────────────────────────────────────────────────────────
// Endpoint profiles
// ────────────────────────────────────────────────────────────────────────────

/// How a looked-up record is turned into a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryStyle {
    /// One-line local summary, no completion call.
    Brief,
    /// Model text returned as-is.
    FreeText,
    /// Model text decoded as `{summary_and_risk, followup_actions}`.
    Structured,
}

/// Everything that differs between the bridge's summary routes.
#[derive(Debug, Clone, Copy)]
pub struct Endpoint {
    pub kind: RecordKind,
    /// Request field carrying the record number; echoed back when `echo_identifier`.
    pub identifier_field: &'static str,
    pub style: SummaryStyle,
    pub echo_identifier: bool,
}

/// POST /hse-summary
pub const HSE_SUMMARY: Endpoint = Endpoint {
    kind: RecordKind::Incident,
    identifier_field: "incident_number",
    style: SummaryStyle::Brief,
    echo_identifier: false,
};

/// POST /hse-summary-item
pub const ITEM_SUMMARY: Endpoint = Endpoint {
    kind: RecordKind::RequestItem,
    identifier_field: "item_number",
    style: SummaryStyle::FreeText,
    echo_identifier: true,
};

/// POST /hse-summary-incident
pub const INCIDENT_SUMMARY: Endpoint = Endpoint {
    kind: RecordKind::Incident,
    identifier_field: "incident_number",
    style: SummaryStyle::Structured,
    echo_identifier: true,
};

// ────────────────────────────────────────────────────────────────────────────
// Request
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct LookupRequest {
    pub identifier: String,
}

impl LookupRequest {
    /// Pulls the endpoint's identifier field out of an inbound JSON body.
    ///
    /// `^` separates clauses in a ServiceNow encoded query, so an identifier
    /// containing it could widen the lookup beyond one record and is refused.
    pub fn from_payload(endpoint: &Endpoint, payload: &Value) -> Result<Self, AppError> {
        let field = endpoint.identifier_field;
        match payload.get(field) {
            Some(Value::String(s)) if s.contains('^') => Err(AppError::Validation(format!(
                "{field} must not contain '^'"
            ))),
            Some(Value::String(s)) if !s.trim().is_empty() => Ok(Self {
                identifier: s.trim().to_string(),
            }),
            Some(Value::String(_)) | Some(Value::Null) | None => {
                Err(AppError::Validation(format!("{field} is required")))
            }
            Some(_) => Err(AppError::Validation(format!("{field} must be a string"))),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Summary
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// First Low/Medium/High mentioned after the "Risk Level" heading.
    pub fn from_narrative(narrative: &str) -> Option<Self> {
        let lower = narrative.to_lowercase();
        let start = lower.find("risk level")? + "risk level".len();
        let tail = &lower[start..];

        [
            ("low", RiskLevel::Low),
            ("medium", RiskLevel::Medium),
            ("high", RiskLevel::High),
        ]
        .into_iter()
        .filter_map(|(word, level)| tail.find(word).map(|pos| (pos, level)))
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, level)| level)
    }
}

/// The model may answer each field with a string or a list of lines.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextOrLines {
    Text(String),
    Lines(Vec<String>),
}

impl From<TextOrLines> for String {
    fn from(value: TextOrLines) -> Self {
        match value {
            TextOrLines::Text(text) => text,
            TextOrLines::Lines(lines) => lines.join("\n"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawStructuredSummary {
    summary_and_risk: TextOrLines,
    followup_actions: TextOrLines,
}

/// Incident summary split into narrative (with embedded risk level) and follow-up actions.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredSummary {
    pub narrative: String,
    pub follow_up_actions: String,
}

impl StructuredSummary {
    /// Decodes the model's message content. Fails with
    /// [`LlmError::MalformedOutput`] when it is not the expected object.
    pub fn parse(content: &str) -> Result<Self, LlmError> {
        let raw: RawStructuredSummary = parse_json_content(content)?;
        Ok(Self {
            narrative: raw.summary_and_risk.into(),
            follow_up_actions: raw.followup_actions.into(),
        })
    }

    pub fn risk_level(&self) -> Option<RiskLevel> {
        RiskLevel::from_narrative(&self.narrative)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SummaryResult {
    Text(String),
    Structured(StructuredSummary),
}

// ────────────────────────────────────────────────────────────────────────────
// Response
// ────────────────────────────────────────────────────────────────────────────

/// Outbound body. Serializes as `{summary}`, `{<identifier_field>, summary}` or
/// `{<identifier_field>, summary, follow_up}` depending on the endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeResponse {
    pub identifier_field: Option<&'static str>,
    pub identifier: String,
    pub summary: String,
    pub follow_up: Option<String>,
}

impl BridgeResponse {
    pub fn new(endpoint: &Endpoint, identifier: String, result: SummaryResult) -> Self {
        let (summary, follow_up) = match result {
            SummaryResult::Text(text) => (text, None),
            SummaryResult::Structured(s) => (s.narrative, Some(s.follow_up_actions)),
        };
        Self {
            identifier_field: endpoint.echo_identifier.then_some(endpoint.identifier_field),
            identifier,
            summary,
            follow_up,
        }
    }
}

impl Serialize for BridgeResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(field) = self.identifier_field {
            map.serialize_entry(field, &self.identifier)?;
        }
        map.serialize_entry("summary", &self.summary)?;
        if let Some(follow_up) = &self.follow_up {
            map.serialize_entry("follow_up", follow_up)?;
        }
        map.end()
    }
}
