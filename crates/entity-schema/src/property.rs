//! One named property of an entity schema.

use convert_case::{Case, Casing};
use serde_json::Value;

use crate::mode::ValidationMode;
use crate::registry::SchemaRegistry;
use crate::variant::{labels, Candidate, VariantSpec};

#[derive(Debug, Clone)]
pub struct PropertySchema {
    name: String,
    variants: Vec<VariantSpec>,
    is_array: bool,
}

impl PropertySchema {
    pub fn new(name: impl Into<String>, variants: impl IntoIterator<Item = VariantSpec>) -> Self {
        Self {
            name: name.into(),
            variants: variants.into_iter().collect(),
            is_array: false,
        }
    }

    /// An array-valued property whose elements match one of `variants`.
    pub fn array(name: impl Into<String>, variants: impl IntoIterator<Item = VariantSpec>) -> Self {
        Self::new(name, variants).as_array()
    }

    pub fn as_array(mut self) -> Self {
        self.is_array = true;
        self
    }

    /// Adds the [`VariantSpec::Absent`] variant.
    pub fn optional(mut self) -> Self {
        if !self.is_optional() {
            self.variants.push(VariantSpec::Absent);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variants(&self) -> &[VariantSpec] {
        &self.variants
    }

    pub fn is_array(&self) -> bool {
        self.is_array
    }

    pub fn is_optional(&self) -> bool {
        self.variants.iter().any(VariantSpec::is_absent)
    }

    pub fn getter_name(&self) -> String {
        format!("get_{}", self.alias_name())
    }

    pub fn setter_name(&self) -> String {
        format!("set_{}", self.alias_name())
    }

    pub fn alias_name(&self) -> String {
        self.name.to_case(Case::Snake)
    }

    fn present_variants(&self) -> impl Iterator<Item = &VariantSpec> {
        self.variants.iter().filter(|v| !v.is_absent())
    }

    /// Validates the property's value, which is [`Candidate::Absent`] when the
    /// key is missing. With `lines`, every failure is described there.
    pub(crate) fn check(
        &self,
        candidate: Candidate<'_>,
        mode: ValidationMode,
        lines: Option<&mut Vec<String>>,
    ) -> bool {
        if let Candidate::Absent = candidate {
            if self.is_optional() {
                return true;
            }
            if let Some(lines) = lines {
                lines.push(format!(
                    "property \"{}\" is missing; expected {}",
                    self.name,
                    self.expected()
                ));
            }
            return false;
        }

        if !self.is_array {
            return self.check_element(candidate, mode, lines, None);
        }

        let Candidate::Json(Value::Array(items)) = candidate else {
            if let Some(lines) = lines {
                lines.push(format!(
                    "property \"{}\": expected {}, got {}",
                    self.name,
                    self.expected(),
                    candidate.kind()
                ));
            }
            return false;
        };
        // Only the first offending element is reported.
        for (index, item) in items.iter().enumerate() {
            if !self.check_element(item.into(), mode, None, None) {
                if let Some(lines) = lines {
                    self.check_element(item.into(), mode, Some(lines), Some(index));
                }
                return false;
            }
        }
        true
    }

    fn check_element(
        &self,
        candidate: Candidate<'_>,
        mode: ValidationMode,
        lines: Option<&mut Vec<String>>,
        index: Option<usize>,
    ) -> bool {
        let Some(lines) = lines else {
            return self.present_variants().any(|v| v.check(candidate, mode, None));
        };
        // Evaluate every variant so nested explanations are complete.
        let mut nested = Vec::new();
        let mut matched = false;
        for variant in self.present_variants() {
            matched |= variant.check(candidate, mode, Some(&mut nested));
        }
        if matched {
            return true;
        }
        let location = match index {
            Some(index) => format!("property \"{}\" index {index}", self.name),
            None => format!("property \"{}\"", self.name),
        };
        lines.push(format!(
            "{location}: expected {}, got {}",
            labels(self.present_variants()),
            candidate.kind()
        ));
        lines.extend(nested);
        false
    }

    fn expected(&self) -> String {
        let element = labels(self.present_variants());
        if self.is_array {
            format!("array of {element}")
        } else {
            element
        }
    }

    /// Zero value for the default DTO; `None` leaves the property out.
    ///
    /// The first variant with a zero value wins. A `Ref` that is unregistered
    /// or already being built has none; when no variant has one the property
    /// falls back to `{}`, which does not satisfy the nested guard.
    pub(crate) fn zero_value(&self, visiting: &mut Vec<String>) -> Option<Value> {
        if self.is_optional() {
            return None;
        }
        if self.is_array {
            return Some(Value::Array(Vec::new()));
        }
        if let Some(value) = self
            .present_variants()
            .find_map(|variant| variant_zero(variant, visiting))
        {
            return Some(value);
        }
        tracing::warn!(
            property = %self.name,
            "no variant has a default value, falling back to an empty object"
        );
        Some(Value::Object(serde_json::Map::new()))
    }
}

fn variant_zero(variant: &VariantSpec, visiting: &mut Vec<String>) -> Option<Value> {
    let value = match variant {
        VariantSpec::String => Value::String(String::new()),
        VariantSpec::Number | VariantSpec::Integer => Value::from(0),
        VariantSpec::Boolean => Value::Bool(false),
        VariantSpec::Json | VariantSpec::Null | VariantSpec::Absent => Value::Null,
        VariantSpec::Enum(e) => e.values().first().cloned().unwrap_or(Value::Null),
        VariantSpec::Entity(schema) => schema.default_dto_inner(visiting),
        VariantSpec::Ref(name) => match SchemaRegistry::global().get(name) {
            Some(schema) if !visiting.contains(name) => schema.default_dto_inner(visiting),
            _ => return None,
        },
    };
    Some(value)
}
