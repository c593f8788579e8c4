//! Declarative DTO schemas and the entity engine built on them.
//!
//! A domain module declares a schema once with [`EntityFactory`] and gets, for
//! free, a structural guard ([`EntitySchema::is_dto`]), a validation-failure
//! explainer ([`EntitySchema::explain_dto`]), a default-DTO constructor and a
//! mutable [`Entity`] wrapper. [`entity_type!`] adds typed accessors on top.
//!
//! ```
//! use entity_schema::{EntityFactory, PropertySchema, ValidationMode, VariantSpec};
//! use serde_json::json;
//!
//! let schema = EntityFactory::create("Named")
//!     .add(PropertySchema::new("name", [VariantSpec::String]))
//!     .build()
//!     .unwrap();
//!
//! let value = json!({"name": "A", "extra": 1});
//! assert!(!schema.is_dto(&value, ValidationMode::Development));
//! assert!(schema.is_dto(&value, ValidationMode::Production));
//! ```

pub mod entity;
pub mod error;
pub mod factory;
mod macros;
pub mod mode;
pub mod property;
pub mod registry;
pub mod schema;
pub mod variant;

pub use entity::{Entity, EntityType};
pub use error::{EntityError, ParseModeError, SchemaError};
pub use factory::EntityFactory;
pub use mode::{ValidationMode, MODE_ENV_VAR};
pub use property::PropertySchema;
pub use registry::SchemaRegistry;
pub use schema::{EntitySchema, EXPLAIN_OK};
pub use variant::{json_kind, Candidate, EnumSpec, VariantSpec};

#[doc(hidden)]
pub use paste;
#[doc(hidden)]
pub use serde;
#[doc(hidden)]
pub use serde_json;
