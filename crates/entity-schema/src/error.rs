use thiserror::Error;

/// A schema declaration that cannot be built.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("entity name must not be empty")]
    EmptyEntityName,
    #[error("{entity}: property name must not be empty")]
    EmptyPropertyName { entity: String },
    #[error("{entity}: duplicate property \"{property}\"")]
    DuplicateProperty { entity: String, property: String },
    #[error("{entity}: property \"{property}\" declares no variants")]
    NoVariants { entity: String, property: String },
    #[error("{entity}: property \"{property}\" uses empty enumeration \"{enumeration}\"")]
    EmptyEnum {
        entity: String,
        property: String,
        enumeration: String,
    },
}

/// Failure to construct or mutate an entity instance.
///
/// Raised only at the boundary where an invalid record would otherwise become
/// a live entity; a constructed entity always holds a valid DTO.
#[derive(Debug, Error)]
pub enum EntityError {
    #[error("value is not a valid {entity}DTO:\n{explanation}")]
    InvalidDto { entity: String, explanation: String },
    #[error("{entity} has no property \"{property}\"")]
    UnknownProperty { entity: String, property: String },
    #[error("{entity}.{property}: {explanation}")]
    InvalidProperty {
        entity: String,
        property: String,
        explanation: String,
    },
    #[error("{entity}.{property} is required and cannot be unset")]
    RequiredProperty { entity: String, property: String },
    #[error("{entity}.{property}: cannot encode value: {source}")]
    Encode {
        entity: String,
        property: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown validation mode \"{0}\"")]
pub struct ParseModeError(pub String);
