//! Spreadsheet rows

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Column holding the size descriptor; blank means the row is skipped
pub const SIZE_FIELD: &str = "size";
/// Column naming each generated instance
pub const REPORTING_LABEL_FIELD: &str = "reportingLabel";
/// Column carrying the filmstrip frame hint
pub const FRAME_FIELD: &str = "frame";

/// One spreadsheet row: column name to cell value
///
/// Cells are kept as JSON values so that numbers, nulls and missing columns
/// stay distinguishable, which the validator and the frame hint rely on.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(Map<String, Value>);

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    /// Whether the column exists at all, whatever its value
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Cell rendered as text; `None` for missing or null cells
    pub fn text(&self, field: &str) -> Option<String> {
        self.get(field).and_then(value_text)
    }

    /// Missing, null and empty-string cells are empty
    pub fn is_empty_value(&self, field: &str) -> bool {
        match self.get(field) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(_) => false,
        }
    }

    /// Rows with an empty size are deliberate blanks
    pub fn is_blank(&self) -> bool {
        self.is_empty_value(SIZE_FIELD)
    }

    /// The size descriptor, empty when absent
    pub fn size(&self) -> String {
        self.text(SIZE_FIELD).unwrap_or_default()
    }

    pub fn reporting_label(&self) -> Option<String> {
        self.text(REPORTING_LABEL_FIELD)
    }

    /// Label used in diagnostics
    pub fn label(&self) -> String {
        self.reporting_label()
            .unwrap_or_else(|| "<unlabelled row>".to_string())
    }
}

impl From<Map<String, Value>> for Row {
    fn from(map: Map<String, Value>) -> Self {
        Row(map)
    }
}

/// Render a cell as the text a spreadsheet would show
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Find the first non-blank row whose reporting label equals `label`
pub fn find_by_reporting_label<'a>(rows: &'a [Row], label: &str) -> Option<&'a Row> {
    rows.iter()
        .filter(|row| !row.is_blank())
        .find(|row| row.reporting_label().as_deref() == Some(label))
}
