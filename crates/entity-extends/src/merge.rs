//! Combining a resolved ancestor with the child that extends it.

use serde_json::{Map, Value};

use crate::layout::RecordLayout;

/// Ancestor identity, ancestor-then-child content, child-over-ancestor keyed
/// maps. Any other child field replaces the ancestor's value.
pub(crate) fn merge_onto(
    layout: &RecordLayout,
    ancestor: &Map<String, Value>,
    child: &Map<String, Value>,
) -> Map<String, Value> {
    let mut merged = ancestor.clone();
    for (key, value) in child {
        if *key == layout.name || *key == layout.extend || *key == layout.content {
            continue;
        }
        if layout.is_keyed(key) {
            let combined = match (merged.get(key), value) {
                (Some(Value::Object(base)), Value::Object(over)) => {
                    let mut base = base.clone();
                    base.extend(over.clone());
                    Value::Object(base)
                }
                _ => value.clone(),
            };
            merged.insert(key.clone(), combined);
        } else {
            merged.insert(key.clone(), value.clone());
        }
    }

    let inherited = ancestor.get(&layout.content);
    let own = child.get(&layout.content);
    if inherited.is_some() || own.is_some() {
        let mut content = sequence(inherited);
        content.extend(sequence(own));
        merged.insert(layout.content.clone(), Value::Array(content));
    }
    merged
}

/// The record a built-in extend resolves to: the built-in's name plus the
/// child's own content and keyed maps, with no further extend.
pub(crate) fn terminal(
    layout: &RecordLayout,
    built_in: &str,
    child: &Map<String, Value>,
) -> Map<String, Value> {
    let mut record = Map::new();
    record.insert(layout.name.clone(), Value::String(built_in.to_string()));
    if let Some(content) = child.get(&layout.content) {
        record.insert(layout.content.clone(), content.clone());
    }
    for key in &layout.keyed {
        if let Some(value) = child.get(key) {
            record.insert(key.clone(), value.clone());
        }
    }
    record
}

/// Content is normally an array; a lone value counts as one item.
fn sequence(content: Option<&Value>) -> Vec<Value> {
    match content {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(other) => vec![other.clone()],
    }
}
