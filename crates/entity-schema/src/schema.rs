//! Entity schemas and the functions synthesized from them.
//!
//! The guard and the explainer share one checking routine: the guard runs it
//! in short-circuit mode, the explainer in collecting mode. They therefore
//! cannot disagree about whether a value is valid.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::entity::EntityType;
use crate::mode::ValidationMode;
use crate::property::PropertySchema;
use crate::variant::{json_kind, labels, Candidate, VariantSpec};

/// Text returned by every explainer for a valid value.
pub const EXPLAIN_OK: &str = "OK";

/// A named, ordered list of properties. Immutable once built.
#[derive(Debug)]
pub struct EntitySchema {
    name: String,
    properties: Vec<PropertySchema>,
    index: HashMap<String, usize>,
}

impl EntitySchema {
    /// Assumes the declaration was already validated by `EntityFactory::build`.
    pub(crate) fn new(name: String, properties: Vec<PropertySchema>) -> Self {
        let index = properties
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name().to_string(), i))
            .collect();
        Self {
            name,
            properties,
            index,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `"<name>DTO"`, the name used in explanations.
    pub fn dto_name(&self) -> String {
        format!("{}DTO", self.name)
    }

    pub fn properties(&self) -> &[PropertySchema] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertySchema> {
        self.index.get(name).map(|&i| &self.properties[i])
    }

    /// Position of a property in declaration order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn is_dto(&self, value: &Value, mode: ValidationMode) -> bool {
        self.check_value(value, mode, None)
    }

    /// `"OK"` or one line per violation.
    pub fn explain_dto(&self, value: &Value, mode: ValidationMode) -> String {
        let mut lines = Vec::new();
        if self.check_value(value, mode, Some(&mut lines)) {
            return EXPLAIN_OK.to_string();
        }
        lines.join("\n")
    }

    pub(crate) fn check_value(
        &self,
        value: &Value,
        mode: ValidationMode,
        lines: Option<&mut Vec<String>>,
    ) -> bool {
        match value.as_object() {
            Some(obj) => self.check_map(obj, mode, lines),
            None => {
                if let Some(lines) = lines {
                    lines.push(format!(
                        "expected {} object, got {}",
                        self.dto_name(),
                        json_kind(value)
                    ));
                }
                false
            }
        }
    }

    pub(crate) fn check_map(
        &self,
        obj: &Map<String, Value>,
        mode: ValidationMode,
        mut lines: Option<&mut Vec<String>>,
    ) -> bool {
        let mut valid = true;

        if mode.rejects_extra_keys() {
            let extra: Vec<&str> = obj
                .keys()
                .filter(|key| !self.index.contains_key(key.as_str()))
                .map(String::as_str)
                .collect();
            if !extra.is_empty() {
                match lines.as_deref_mut() {
                    Some(lines) => lines.push(format!("extra properties: {}", extra.join(", "))),
                    None => return false,
                }
                valid = false;
            }
        }

        for property in &self.properties {
            let candidate = Candidate::from(obj.get(property.name()));
            if !property.check(candidate, mode, lines.as_deref_mut()) {
                if lines.is_none() {
                    return false;
                }
                valid = false;
            }
        }
        valid
    }

    /// A DTO holding each required property's zero value. Optional
    /// properties are left out.
    pub fn create_default_dto(&self) -> Value {
        self.default_dto_inner(&mut Vec::new())
    }

    pub(crate) fn default_dto_inner(&self, visiting: &mut Vec<String>) -> Value {
        visiting.push(self.name.clone());
        let mut dto = Map::new();
        for property in &self.properties {
            if let Some(value) = property.zero_value(visiting) {
                dto.insert(property.name().to_string(), value);
            }
        }
        visiting.pop();
        Value::Object(dto)
    }

    /// `isXDTO` as a standalone function.
    pub fn create_test_function_of_dto(
        self: &Arc<Self>,
        mode: ValidationMode,
    ) -> impl Fn(&Value) -> bool + Send + Sync + 'static {
        let schema = Arc::clone(self);
        move |value| schema.is_dto(value, mode)
    }

    /// `explainXDTO` as a standalone function.
    pub fn create_explain_function_of_dto(
        self: &Arc<Self>,
        mode: ValidationMode,
    ) -> impl Fn(&Value) -> String + Send + Sync + 'static {
        let schema = Arc::clone(self);
        move |value| schema.explain_dto(value, mode)
    }

    /// Constructor of [`Entity`](crate::Entity) values of this schema.
    pub fn create_entity_type(self: &Arc<Self>, mode: ValidationMode) -> EntityType {
        EntityType::new(self, mode)
    }

    /// Guard accepting a DTO (or live entity) of this schema, or any of the
    /// `extra` bare variants, e.g. "DTO or string or absent".
    pub fn create_test_function_of_dto_or_one_of(
        self: &Arc<Self>,
        mode: ValidationMode,
        extra: Vec<VariantSpec>,
    ) -> impl Fn(Candidate<'_>) -> bool + Send + Sync + 'static {
        let widened = self.widen(extra);
        move |candidate| widened.test(candidate, mode)
    }

    pub fn create_explain_function_of_dto_or_one_of(
        self: &Arc<Self>,
        mode: ValidationMode,
        extra: Vec<VariantSpec>,
    ) -> impl Fn(Candidate<'_>) -> String + Send + Sync + 'static {
        let widened = self.widen(extra);
        move |candidate| widened.explain(candidate, mode)
    }

    fn widen(self: &Arc<Self>, extra: Vec<VariantSpec>) -> Widened {
        let mut variants = Vec::with_capacity(extra.len() + 1);
        variants.push(VariantSpec::entity(self));
        variants.extend(extra);
        Widened { variants }
    }
}

/// The schema's own entity variant followed by the extra variants.
struct Widened {
    variants: Vec<VariantSpec>,
}

impl Widened {
    fn test(&self, candidate: Candidate<'_>, mode: ValidationMode) -> bool {
        self.variants.iter().any(|v| v.check(candidate, mode, None))
    }

    fn explain(&self, candidate: Candidate<'_>, mode: ValidationMode) -> String {
        if self.test(candidate, mode) {
            return EXPLAIN_OK.to_string();
        }
        let mut nested = Vec::new();
        for variant in &self.variants {
            variant.check(candidate, mode, Some(&mut nested));
        }
        let mut text = format!(
            "expected {}, got {}",
            labels(&self.variants),
            candidate.kind()
        );
        for line in nested {
            text.push('\n');
            text.push_str(&line);
        }
        text
    }
}
