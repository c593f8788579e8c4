//! The mutable entity wrapper around one DTO record.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::EntityError;
use crate::mode::ValidationMode;
use crate::property::PropertySchema;
use crate::schema::EntitySchema;
use crate::variant::Candidate;

/// Owns exactly one DTO record, which is valid for `schema` for the whole
/// lifetime of the instance.
#[derive(Clone)]
pub struct Entity {
    schema: Arc<EntitySchema>,
    dto: Map<String, Value>,
    mode: ValidationMode,
}

impl Entity {
    /// An entity holding the schema's default DTO.
    ///
    /// A required property whose only variants are nested entities that are
    /// unregistered or recursive defaults to `{}`. Such an instance fails its
    /// own guard until that property is set; declare another variant (or make
    /// the property optional) to keep defaults valid.
    pub fn create(schema: &Arc<EntitySchema>, mode: ValidationMode) -> Self {
        let dto = match schema.create_default_dto() {
            Value::Object(dto) => dto,
            _ => Map::new(),
        };
        Self {
            schema: Arc::clone(schema),
            dto,
            mode,
        }
    }

    /// Copies `dto` into a new entity, failing when it is not a valid DTO.
    pub fn create_from_dto(
        schema: &Arc<EntitySchema>,
        dto: &Value,
        mode: ValidationMode,
    ) -> Result<Self, EntityError> {
        match dto.as_object() {
            Some(obj) if schema.check_map(obj, mode, None) => Ok(Self {
                schema: Arc::clone(schema),
                dto: obj.clone(),
                mode,
            }),
            _ => Err(EntityError::InvalidDto {
                entity: schema.name().to_string(),
                explanation: schema.explain_dto(dto, mode),
            }),
        }
    }

    /// Folds `sources` left to right over the default DTO. Later keys replace
    /// earlier ones wholesale; nested values are never deep-merged. Entity
    /// sources contribute their DTO, non-object values contribute nothing.
    pub fn merge<'a, I>(
        schema: &Arc<EntitySchema>,
        sources: I,
        mode: ValidationMode,
    ) -> Result<Self, EntityError>
    where
        I: IntoIterator,
        I::Item: Into<Candidate<'a>>,
    {
        let mut folded = match schema.create_default_dto() {
            Value::Object(dto) => dto,
            _ => Map::new(),
        };
        for source in sources {
            match source.into() {
                Candidate::Entity(entity) => folded.extend(entity.dto.clone()),
                Candidate::Json(Value::Object(obj)) => folded.extend(obj.clone()),
                Candidate::Json(_) | Candidate::Absent => {}
            }
        }
        Self::create_from_dto(schema, &Value::Object(folded), mode)
    }

    pub fn schema(&self) -> &Arc<EntitySchema> {
        &self.schema
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Borrowed view of the record.
    pub fn dto(&self) -> &Map<String, Value> {
        &self.dto
    }

    /// A snapshot of the record; later mutation of the entity does not
    /// affect it.
    pub fn get_dto(&self) -> Value {
        Value::Object(self.dto.clone())
    }

    pub fn value_of(&self) -> Value {
        self.get_dto()
    }

    pub fn to_json(&self) -> Value {
        self.get_dto()
    }

    pub fn into_dto(self) -> Value {
        Value::Object(self.dto)
    }

    pub fn get(&self, property: &str) -> Option<&Value> {
        self.dto.get(property)
    }

    /// Decodes a property into `T`. Yields `None` when the property is unset
    /// or does not decode into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, property: &str) -> Option<T> {
        let value = self.dto.get(property)?;
        match T::deserialize(value) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                tracing::warn!(
                    entity = self.schema.name(),
                    property,
                    %err,
                    "stored value does not decode into the requested type"
                );
                None
            }
        }
    }

    /// Replaces a property value after validating it against the property's
    /// variants.
    pub fn set(&mut self, property: &str, value: impl Into<Value>) -> Result<&mut Self, EntityError> {
        let value = value.into();
        let schema = Arc::clone(&self.schema);
        let declared = declared_property(&schema, property)?;
        let mut lines = Vec::new();
        if !declared.check((&value).into(), self.mode, Some(&mut lines)) {
            return Err(EntityError::InvalidProperty {
                entity: schema.name().to_string(),
                property: property.to_string(),
                explanation: lines.join("\n"),
            });
        }
        self.insert_ordered(&schema, property, value);
        Ok(self)
    }

    /// Serializes `value` and sets it.
    pub fn set_as<T: Serialize>(&mut self, property: &str, value: T) -> Result<&mut Self, EntityError> {
        let value = serde_json::to_value(value).map_err(|source| EntityError::Encode {
            entity: self.schema.name().to_string(),
            property: property.to_string(),
            source,
        })?;
        self.set(property, value)
    }

    /// Removes an optional property from the record.
    pub fn unset(&mut self, property: &str) -> Result<&mut Self, EntityError> {
        let schema = Arc::clone(&self.schema);
        let declared = declared_property(&schema, property)?;
        if !declared.is_optional() {
            return Err(EntityError::RequiredProperty {
                entity: schema.name().to_string(),
                property: property.to_string(),
            });
        }
        self.dto.shift_remove(property);
        Ok(self)
    }

    /// `Some` sets, `None` unsets.
    pub fn set_optional(
        &mut self,
        property: &str,
        value: Option<Value>,
    ) -> Result<&mut Self, EntityError> {
        match value {
            Some(value) => self.set(property, value),
            None => self.unset(property),
        }
    }

    /// Consuming variant of [`Entity::set`] for persistent-builder style.
    pub fn with(mut self, property: &str, value: impl Into<Value>) -> Result<Self, EntityError> {
        self.set(property, value)?;
        Ok(self)
    }

    /// Inserts keeping declaration order; undeclared keys (tolerated in
    /// production mode) stay after the declared ones.
    fn insert_ordered(&mut self, schema: &EntitySchema, property: &str, value: Value) {
        if self.dto.contains_key(property) {
            self.dto.insert(property.to_string(), value);
            return;
        }
        let mut previous = std::mem::take(&mut self.dto);
        let mut pending = Some(value);
        for declared in schema.properties() {
            if declared.name() == property {
                if let Some(value) = pending.take() {
                    self.dto.insert(property.to_string(), value);
                }
            } else if let Some(existing) = previous.shift_remove(declared.name()) {
                self.dto.insert(declared.name().to_string(), existing);
            }
        }
        self.dto.extend(previous);
    }
}

/// The runtime counterpart of a typed entity declaration: a schema bound to
/// a validation mode, constructing [`Entity`] values.
#[derive(Debug, Clone)]
pub struct EntityType {
    schema: Arc<EntitySchema>,
    mode: ValidationMode,
}

impl EntityType {
    pub fn new(schema: &Arc<EntitySchema>, mode: ValidationMode) -> Self {
        Self {
            schema: Arc::clone(schema),
            mode,
        }
    }

    pub fn schema(&self) -> &Arc<EntitySchema> {
        &self.schema
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    pub fn create(&self) -> Entity {
        Entity::create(&self.schema, self.mode)
    }

    pub fn create_from_dto(&self, dto: &Value) -> Result<Entity, EntityError> {
        Entity::create_from_dto(&self.schema, dto, self.mode)
    }

    pub fn merge<'a, I>(&self, sources: I) -> Result<Entity, EntityError>
    where
        I: IntoIterator,
        I::Item: Into<Candidate<'a>>,
    {
        Entity::merge(&self.schema, sources, self.mode)
    }
}

fn declared_property<'s>(
    schema: &'s EntitySchema,
    property: &str,
) -> Result<&'s PropertySchema, EntityError> {
    schema
        .property(property)
        .ok_or_else(|| EntityError::UnknownProperty {
            entity: schema.name().to_string(),
            property: property.to_string(),
        })
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("schema", &self.schema.name())
            .field("dto", &self.dto)
            .field("mode", &self.mode)
            .finish()
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.schema.name() == other.schema.name() && self.dto == other.dto
    }
}

impl Serialize for Entity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.dto.serialize(serializer)
    }
}

impl From<Entity> for Value {
    fn from(entity: Entity) -> Self {
        entity.into_dto()
    }
}

impl From<&Entity> for Value {
    fn from(entity: &Entity) -> Self {
        entity.get_dto()
    }
}
