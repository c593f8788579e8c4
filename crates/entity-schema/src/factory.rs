//! Builder through which domain modules declare a schema once.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::SchemaError;
use crate::property::PropertySchema;
use crate::registry::SchemaRegistry;
use crate::schema::EntitySchema;
use crate::variant::VariantSpec;

/// Collects properties in declaration order. That order is the serialization
/// and display order of every DTO built from the schema.
#[derive(Debug, Clone)]
pub struct EntityFactory {
    name: String,
    properties: Vec<PropertySchema>,
}

impl EntityFactory {
    pub fn create(entity_name: impl Into<String>) -> Self {
        Self {
            name: entity_name.into(),
            properties: Vec::new(),
        }
    }

    pub fn add(mut self, property: PropertySchema) -> Self {
        self.properties.push(property);
        self
    }

    /// Shorthand for `add(PropertySchema::new(name, variants))`.
    pub fn property(
        self,
        name: impl Into<String>,
        variants: impl IntoIterator<Item = VariantSpec>,
    ) -> Self {
        self.add(PropertySchema::new(name, variants))
    }

    pub fn build(self) -> Result<Arc<EntitySchema>, SchemaError> {
        if self.name.is_empty() {
            return Err(SchemaError::EmptyEntityName);
        }
        let mut seen = HashSet::new();
        for property in &self.properties {
            self.check_property(property)?;
            if !seen.insert(property.name()) {
                return Err(SchemaError::DuplicateProperty {
                    entity: self.name.clone(),
                    property: property.name().to_string(),
                });
            }
        }
        Ok(Arc::new(EntitySchema::new(self.name, self.properties)))
    }

    /// Builds the schema and publishes it in the global registry so that
    /// [`VariantSpec::Ref`] can find it. A name registered earlier wins.
    pub fn register(self) -> Result<Arc<EntitySchema>, SchemaError> {
        let schema = self.build()?;
        Ok(SchemaRegistry::global().register(schema))
    }

    fn check_property(&self, property: &PropertySchema) -> Result<(), SchemaError> {
        if property.name().is_empty() {
            return Err(SchemaError::EmptyPropertyName {
                entity: self.name.clone(),
            });
        }
        if property.variants().is_empty() {
            return Err(SchemaError::NoVariants {
                entity: self.name.clone(),
                property: property.name().to_string(),
            });
        }
        for variant in property.variants() {
            if let VariantSpec::Enum(e) = variant {
                if e.values().is_empty() {
                    return Err(SchemaError::EmptyEnum {
                        entity: self.name.clone(),
                        property: property.name().to_string(),
                        enumeration: e.name().to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
