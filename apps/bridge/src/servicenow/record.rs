use serde::Deserialize;
use serde_json::{Map, Value};

/// Rendered in place of fields the vendor left out, null or empty.
pub const PLACEHOLDER: &str = "N/A";

/// The two ServiceNow tables the bridge reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Incident,
    RequestItem,
}

impl RecordKind {
    /// Table name under `/api/now/table/`.
    pub fn table(self) -> &'static str {
        match self {
            RecordKind::Incident => "incident",
            RecordKind::RequestItem => "sc_req_item",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RecordKind::Incident => "Incident",
            RecordKind::RequestItem => "Item",
        }
    }
}

/// A single row returned by the Table API, kept as the vendor sent it.
///
/// Fields are read by name without schema validation. With
/// `sysparm_display_value=true` reference fields arrive as
/// `{"display_value": "...", "link": "..."}` objects; [`VendorRecord::field`]
/// flattens those to their label.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct VendorRecord(Map<String, Value>);

impl VendorRecord {
    /// Human-readable value of `name`, or `None` when absent or blank.
    pub fn text(&self, name: &str) -> Option<String> {
        let rendered = match self.0.get(name)? {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Object(obj) => match obj.get("display_value") {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => return None,
            },
            Value::Null | Value::Array(_) => return None,
        };
        // Blank values count as missing; anything else is rendered verbatim.
        (!rendered.trim().is_empty()).then_some(rendered)
    }

    /// Like [`VendorRecord::text`] but substitutes [`PLACEHOLDER`].
    pub fn field(&self, name: &str) -> String {
        self.text(name).unwrap_or_else(|| PLACEHOLDER.to_string())
    }
}

impl From<Value> for VendorRecord {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }
}
