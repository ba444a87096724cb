// Summarization prompt templates.
// Each template carries a `{record}` placeholder filled by `build_prompt`.

use crate::llm_client::prompts::{HSE_ASSISTANT_ROLE, JSON_ONLY_INSTRUCTION};
use crate::servicenow::{RecordKind, VendorRecord};

/// Free-text item summary. Replace `{record}` before sending.
pub const ITEM_PROMPT_TEMPLATE: &str = "\
Summarize this item in 5-7 sentences, keeping the important aspects of the item \
and suggest a risk level and 3 recommended follow-up actions:
{record}";

/// Structured incident summary. Replace `{json_only}` and `{record}` before sending.
pub const INCIDENT_PROMPT_TEMPLATE: &str = r#"Please return a JSON object with two fields:

1. "summary_and_risk": Format this as follows:
**Incident Summary:**
[Provide a 5-7 sentence summary of the incident, including number, short description, priority, and any relevant context. Make it clear whether the incident poses any health, safety, or environmental risks.]

**Risk Level:**
[State the risk level clearly as one of: Low, Medium, High]

2. "followup_actions": Format this as follows:
**Recommended Follow-up Actions:**
1. [First recommended action]
2. [Second recommended action]
3. [Third recommended action]

{json_only}

Here is the incident data:
{record}"#;

const INCIDENT_FIELDS: &[(&str, &str)] = &[
    ("Incident number", "number"),
    ("Short description", "short_description"),
    ("Description", "description"),
    ("Priority", "priority"),
    ("State", "state"),
];

// Reference fields (configuration_item, request, requested_for) come back as
// display values because the lookup sets sysparm_display_value=true.
const ITEM_FIELDS: &[(&str, &str)] = &[
    ("Item number", "number"),
    ("Short description", "short_description"),
    ("Description", "description"),
    ("Priority", "priority"),
    ("State", "state"),
    ("Item", "configuration_item"),
    ("Quantity", "quantity"),
    ("Linked Request", "request"),
    ("Approval Status", "approval"),
    ("Price", "price"),
    ("Recurring Price", "recurring_price"),
    ("Requested for", "requested_for"),
];

pub fn prompt_fields(kind: RecordKind) -> &'static [(&'static str, &'static str)] {
    match kind {
        RecordKind::Incident => INCIDENT_FIELDS,
        RecordKind::RequestItem => ITEM_FIELDS,
    }
}

pub fn system_prompt(kind: RecordKind) -> String {
    let subject = match kind {
        RecordKind::Incident => "incidents",
        RecordKind::RequestItem => "items",
    };
    format!("{HSE_ASSISTANT_ROLE} {subject} for HSE officers.")
}

/// One `Label: value` line per prompt field, placeholders for missing ones.
pub fn render_record(kind: RecordKind, record: &VendorRecord) -> String {
    prompt_fields(kind)
        .iter()
        .map(|(label, field)| format!("{label}: {}", record.field(field)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_item_prompt(record: &VendorRecord) -> String {
    ITEM_PROMPT_TEMPLATE.replace("{record}", &render_record(RecordKind::RequestItem, record))
}

pub fn build_incident_prompt(record: &VendorRecord) -> String {
    INCIDENT_PROMPT_TEMPLATE
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
        .replace("{record}", &render_record(RecordKind::Incident, record))
}
