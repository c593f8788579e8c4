//! Variant specs and the matcher that interprets them.
//!
//! A property accepts the union of its variants. Matching is a plain
//! interpreter over [`VariantSpec`]; nested entity variants delegate to the
//! nested schema's own guard.

use std::sync::Arc;

use serde_json::Value;

use crate::entity::Entity;
use crate::mode::ValidationMode;
use crate::registry::SchemaRegistry;
use crate::schema::EntitySchema;

/// A named, closed set of accepted JSON scalars.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumSpec {
    name: String,
    values: Vec<Value>,
}

impl EnumSpec {
    pub fn new<V: Into<Value>>(name: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.values.iter().any(|v| scalar_equal(v, value))
    }
}

/// One acceptable shape for a property value.
#[derive(Debug, Clone)]
pub enum VariantSpec {
    String,
    Number,
    /// A number without a fractional part.
    Integer,
    Boolean,
    /// Any JSON value.
    Json,
    /// An explicit JSON `null`.
    Null,
    /// The property is not present at all. Marks a property optional.
    Absent,
    Enum(EnumSpec),
    Entity(Arc<EntitySchema>),
    /// A nested entity looked up by name in the global [`SchemaRegistry`].
    Ref(String),
}

impl VariantSpec {
    pub fn enumeration<V: Into<Value>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::Enum(EnumSpec::new(name, values))
    }

    pub fn entity(schema: &Arc<EntitySchema>) -> Self {
        Self::Entity(Arc::clone(schema))
    }

    pub fn reference(entity_name: impl Into<String>) -> Self {
        Self::Ref(entity_name.into())
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Human-readable name used in explanations.
    pub fn label(&self) -> String {
        match self {
            Self::String => "string".to_string(),
            Self::Number => "number".to_string(),
            Self::Integer => "integer".to_string(),
            Self::Boolean => "boolean".to_string(),
            Self::Json => "json".to_string(),
            Self::Null => "null".to_string(),
            Self::Absent => "absent".to_string(),
            Self::Enum(e) => e.name.clone(),
            Self::Entity(schema) => schema.dto_name(),
            Self::Ref(name) => format!("{name}DTO"),
        }
    }

    /// Does `candidate` have this shape?
    pub fn matches<'a>(&self, candidate: impl Into<Candidate<'a>>, mode: ValidationMode) -> bool {
        self.check(candidate.into(), mode, None)
    }

    /// `None` when `candidate` matches, otherwise the reason it does not.
    pub fn explain_mismatch<'a>(
        &self,
        candidate: impl Into<Candidate<'a>>,
        mode: ValidationMode,
    ) -> Option<String> {
        let candidate = candidate.into();
        let mut nested = Vec::new();
        if self.check(candidate, mode, Some(&mut nested)) {
            return None;
        }
        let mut reason = format!("expected {}, got {}", self.label(), candidate.kind());
        for line in nested {
            reason.push('\n');
            reason.push_str(&line);
        }
        Some(reason)
    }

    /// Core matcher. When `detail` is given, a failing nested entity check
    /// appends its explanation (already indented) to it.
    pub(crate) fn check(
        &self,
        candidate: Candidate<'_>,
        mode: ValidationMode,
        detail: Option<&mut Vec<String>>,
    ) -> bool {
        match self {
            Self::Absent => matches!(candidate, Candidate::Absent),
            Self::Json => !matches!(candidate, Candidate::Absent),
            Self::String => matches!(candidate, Candidate::Json(Value::String(_))),
            Self::Number => matches!(candidate, Candidate::Json(Value::Number(_))),
            Self::Integer => match candidate {
                Candidate::Json(Value::Number(n)) => is_integer(n),
                _ => false,
            },
            Self::Boolean => matches!(candidate, Candidate::Json(Value::Bool(_))),
            Self::Null => matches!(candidate, Candidate::Json(Value::Null)),
            Self::Enum(e) => match candidate {
                Candidate::Json(value) => e.contains(value),
                _ => false,
            },
            Self::Entity(schema) => check_nested(schema, candidate, mode, detail),
            Self::Ref(name) => match SchemaRegistry::global().get(name) {
                Some(schema) => check_nested(&schema, candidate, mode, detail),
                None => {
                    if let Some(detail) = detail {
                        detail.push(format!("  unknown entity type \"{name}\""));
                    }
                    false
                }
            },
        }
    }
}

fn check_nested(
    schema: &EntitySchema,
    candidate: Candidate<'_>,
    mode: ValidationMode,
    detail: Option<&mut Vec<String>>,
) -> bool {
    let value = match candidate {
        Candidate::Json(value) => value,
        Candidate::Entity(entity) => {
            let dto = entity.get_dto();
            return check_object(schema, &dto, mode, detail);
        }
        Candidate::Absent => return false,
    };
    check_object(schema, value, mode, detail)
}

fn check_object(
    schema: &EntitySchema,
    value: &Value,
    mode: ValidationMode,
    detail: Option<&mut Vec<String>>,
) -> bool {
    // Non-objects are fully described by the caller's "got <kind>" line.
    let Some(detail) = detail.filter(|_| value.is_object()) else {
        return schema.check_value(value, mode, None);
    };
    let mut lines = Vec::new();
    if schema.check_value(value, mode, Some(&mut lines)) {
        return true;
    }
    detail.push(format!("  {}:", schema.dto_name()));
    detail.extend(lines.into_iter().map(|line| format!("    {line}")));
    false
}

/// A value offered to a matcher: a missing property, a JSON value, or a live
/// entity whose DTO is checked in its place.
#[derive(Debug, Clone, Copy)]
pub enum Candidate<'a> {
    Absent,
    Json(&'a Value),
    Entity(&'a Entity),
}

impl Candidate<'_> {
    /// Kind name used in "got ..." phrases.
    pub fn kind(&self) -> String {
        match self {
            Self::Absent => "absent".to_string(),
            Self::Json(value) => json_kind(value).to_string(),
            Self::Entity(entity) => format!("{} entity", entity.schema().name()),
        }
    }
}

impl<'a> From<&'a Value> for Candidate<'a> {
    fn from(value: &'a Value) -> Self {
        Self::Json(value)
    }
}

impl<'a> From<Option<&'a Value>> for Candidate<'a> {
    fn from(value: Option<&'a Value>) -> Self {
        value.map_or(Self::Absent, Self::Json)
    }
}

impl<'a> From<&'a Entity> for Candidate<'a> {
    fn from(entity: &'a Entity) -> Self {
        Self::Entity(entity)
    }
}

pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn is_integer(n: &serde_json::Number) -> bool {
    if n.is_i64() || n.is_u64() {
        return true;
    }
    n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
}

/// Equality for enumeration members; `1` and `1.0` are the same member.
fn scalar_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .zip(b.as_f64())
            .is_some_and(|(a, b)| a == b),
        _ => a == b,
    }
}

/// Joins variant labels the way explanations list them.
pub(crate) fn labels<'a>(variants: impl IntoIterator<Item = &'a VariantSpec>) -> String {
    variants
        .into_iter()
        .map(VariantSpec::label)
        .collect::<Vec<_>>()
        .join(" or ")
}
