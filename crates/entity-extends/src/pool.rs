//! Named pool of like-typed records.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::ResolveError;
use crate::layout::RecordLayout;

/// Records keyed by name, in insertion order. A later record with the same
/// name replaces the earlier one in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPool {
    records: IndexMap<String, Map<String, Value>>,
}

impl RecordPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record must be an object carrying a string name field.
    pub fn from_records(
        records: impl IntoIterator<Item = Value>,
        layout: &RecordLayout,
    ) -> Result<Self, ResolveError> {
        let mut pool = Self::new();
        for (index, record) in records.into_iter().enumerate() {
            let Value::Object(record) = record else {
                return Err(ResolveError::Unnamed {
                    index,
                    field: layout.name.clone(),
                });
            };
            let Some(name) = layout.name_of(&record) else {
                return Err(ResolveError::Unnamed {
                    index,
                    field: layout.name.clone(),
                });
            };
            let name = name.to_string();
            pool.records.insert(name, record);
        }
        Ok(pool)
    }

    pub fn insert(&mut self, name: impl Into<String>, record: Map<String, Value>) {
        self.records.insert(name.into(), record);
    }

    pub fn get(&self, name: &str) -> Option<&Map<String, Value>> {
        self.records.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Map<String, Value>)> {
        self.records.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keeps_order_and_requires_names() {
        let layout = RecordLayout::default();
        let pool = RecordPool::from_records(
            [json!({"name": "b"}), json!({"name": "a"}), json!({"name": "b", "x": 1})],
            &layout,
        )
        .unwrap();
        assert_eq!(pool.names().collect::<Vec<_>>(), ["b", "a"]);
        assert_eq!(pool.get("b").unwrap().get("x"), Some(&json!(1)));

        let err = RecordPool::from_records([json!({"name": "a"}), json!({"title": "x"})], &layout)
            .unwrap_err();
        assert!(matches!(err, ResolveError::Unnamed { index: 1, .. }));
        assert!(RecordPool::from_records([json!("a")], &layout).is_err());
    }
}
