//! Which fields of a record play which role during a merge.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordLayout {
    /// Identity; taken from the resolved ancestor.
    pub name: String,
    /// Reference to the ancestor.
    pub extend: String,
    /// Ordered content; accumulates ancestor first.
    pub content: String,
    /// Keyed maps (metadata, style); shallow-merged, child keys win.
    pub keyed: Vec<String>,
}

impl Default for RecordLayout {
    fn default() -> Self {
        Self {
            name: "name".to_string(),
            extend: "extend".to_string(),
            content: "content".to_string(),
            keyed: vec!["meta".to_string(), "style".to_string()],
        }
    }
}

impl RecordLayout {
    pub fn name_of<'r>(&self, record: &'r Map<String, Value>) -> Option<&'r str> {
        record.get(&self.name).and_then(Value::as_str)
    }

    pub fn extend_of<'r>(&self, record: &'r Map<String, Value>) -> Option<&'r str> {
        record.get(&self.extend).and_then(Value::as_str)
    }

    pub fn is_keyed(&self, field: &str) -> bool {
        self.keyed.iter().any(|k| k == field)
    }

    /// Name used in error messages for a requesting record.
    pub(crate) fn requester(&self, record: &Map<String, Value>) -> String {
        self.name_of(record).unwrap_or("<anonymous>").to_string()
    }
}
