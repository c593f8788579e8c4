//! `entity_type!`: a typed wrapper over [`Entity`](crate::Entity) with one
//! getter, setter, alias and unsetter per declared property.
//!
//! ```
//! use std::sync::{Arc, LazyLock};
//! use entity_schema::{entity_type, EntityFactory, EntitySchema, ValidationMode, VariantSpec};
//!
//! static LINK: LazyLock<Arc<EntitySchema>> = LazyLock::new(|| {
//!     EntityFactory::create("Link")
//!         .property("href", [VariantSpec::String])
//!         .property("newTab", [VariantSpec::Boolean, VariantSpec::Absent])
//!         .build()
//!         .expect("valid schema")
//! });
//!
//! entity_type! {
//!     pub struct LinkEntity(LINK.clone()) {
//!         href: String,
//!         new_tab("newTab"): bool,
//!     }
//! }
//!
//! let mut link = LinkEntity::create(ValidationMode::Development);
//! link.set_href("/home").unwrap().new_tab(true).unwrap();
//! assert_eq!(link.get_new_tab(), Some(true));
//! assert_eq!(link.to_json(), serde_json::json!({"href": "/home", "newTab": true}));
//! ```

#[doc(hidden)]
#[macro_export]
macro_rules! __entity_key {
    ($field:ident) => {
        stringify!($field)
    };
    ($field:ident, $key:literal) => {
        $key
    };
}

/// Declares a typed entity. Each property is `rust_name: Type` or, when the
/// DTO key differs from the Rust name, `rust_name("dtoKey"): Type`.
///
/// The schema expression is evaluated on every call to `schema()`; point it
/// at a `LazyLock` or another write-once location.
///
/// The wrapper already defines `schema`, `create`, `create_from_dto`,
/// `merge`, `is_dto`, `explain_dto`, `get_dto`, `value_of`, `to_json`,
/// `entity` and `into_entity`. A Rust name of `schema`, `create`, `merge`,
/// `entity`, `to_json`, `value_of` or `dto` would generate a second method of
/// the same name. Rename the field and map it to its key instead:
/// `merge_mode("merge"): String`.
///
/// ```compile_fail
/// use std::sync::{Arc, LazyLock};
/// use entity_schema::{entity_type, EntityFactory, EntitySchema, VariantSpec};
///
/// static STRATEGY: LazyLock<Arc<EntitySchema>> = LazyLock::new(|| {
///     EntityFactory::create("Strategy")
///         .property("merge", [VariantSpec::String])
///         .build()
///         .expect("valid schema")
/// });
///
/// entity_type! {
///     pub struct StrategyEntity(STRATEGY.clone()) {
///         merge: String,
///     }
/// }
/// ```
#[macro_export]
macro_rules! entity_type {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident($schema:expr) {
            $(
                $(#[$fattr:meta])*
                $field:ident $( ( $key:literal ) )? : $fty:ty
            ),* $(,)?
        }
    ) => {
        $crate::paste::paste! {
            $(#[$attr])*
            #[derive(Debug, Clone, PartialEq)]
            $vis struct $name($crate::Entity);

            #[allow(dead_code)]
            impl $name {
                pub fn schema() -> ::std::sync::Arc<$crate::EntitySchema> {
                    $schema
                }

                pub fn create(mode: $crate::ValidationMode) -> Self {
                    Self($crate::Entity::create(&Self::schema(), mode))
                }

                pub fn create_from_dto(
                    dto: &$crate::serde_json::Value,
                    mode: $crate::ValidationMode,
                ) -> ::std::result::Result<Self, $crate::EntityError> {
                    $crate::Entity::create_from_dto(&Self::schema(), dto, mode).map(Self)
                }

                pub fn merge<'a, I>(
                    sources: I,
                    mode: $crate::ValidationMode,
                ) -> ::std::result::Result<Self, $crate::EntityError>
                where
                    I: ::std::iter::IntoIterator,
                    I::Item: ::std::convert::Into<$crate::Candidate<'a>>,
                {
                    $crate::Entity::merge(&Self::schema(), sources, mode).map(Self)
                }

                pub fn is_dto(value: &$crate::serde_json::Value, mode: $crate::ValidationMode) -> bool {
                    Self::schema().is_dto(value, mode)
                }

                pub fn explain_dto(
                    value: &$crate::serde_json::Value,
                    mode: $crate::ValidationMode,
                ) -> ::std::string::String {
                    Self::schema().explain_dto(value, mode)
                }

                pub fn get_dto(&self) -> $crate::serde_json::Value {
                    self.0.get_dto()
                }

                pub fn value_of(&self) -> $crate::serde_json::Value {
                    self.0.value_of()
                }

                pub fn to_json(&self) -> $crate::serde_json::Value {
                    self.0.to_json()
                }

                pub fn entity(&self) -> &$crate::Entity {
                    &self.0
                }

                pub fn into_entity(self) -> $crate::Entity {
                    self.0
                }

                $(
                    $(#[$fattr])*
                    pub fn [<get_ $field>](&self) -> ::std::option::Option<$fty> {
                        self.0.get_as($crate::__entity_key!($field $(, $key)?))
                    }

                    pub fn [<set_ $field>](
                        &mut self,
                        value: impl ::std::convert::Into<$fty>,
                    ) -> ::std::result::Result<&mut Self, $crate::EntityError> {
                        let value: $fty = value.into();
                        self.0.set_as($crate::__entity_key!($field $(, $key)?), value)?;
                        Ok(self)
                    }

                    /// Same as the `set_` method of this property.
                    pub fn $field(
                        &mut self,
                        value: impl ::std::convert::Into<$fty>,
                    ) -> ::std::result::Result<&mut Self, $crate::EntityError> {
                        self.[<set_ $field>](value)
                    }

                    pub fn [<unset_ $field>](
                        &mut self,
                    ) -> ::std::result::Result<&mut Self, $crate::EntityError> {
                        self.0.unset($crate::__entity_key!($field $(, $key)?))?;
                        Ok(self)
                    }
                )*
            }

            impl ::std::convert::From<$name> for $crate::serde_json::Value {
                fn from(entity: $name) -> Self {
                    entity.0.into_dto()
                }
            }

            impl<'a> ::std::convert::From<&'a $name> for $crate::Candidate<'a> {
                fn from(entity: &'a $name) -> Self {
                    $crate::Candidate::Entity(&entity.0)
                }
            }

            impl ::std::convert::AsRef<$crate::Entity> for $name {
                fn as_ref(&self) -> &$crate::Entity {
                    &self.0
                }
            }

            impl ::std::convert::TryFrom<$crate::Entity> for $name {
                type Error = $crate::EntityError;

                /// Re-validates the DTO of an entity built from another schema.
                fn try_from(entity: $crate::Entity) -> ::std::result::Result<Self, Self::Error> {
                    if ::std::sync::Arc::ptr_eq(entity.schema(), &Self::schema()) {
                        return Ok(Self(entity));
                    }
                    Self::create_from_dto(&entity.get_dto(), entity.mode())
                }
            }

            impl $crate::serde::Serialize for $name {
                fn serialize<S: $crate::serde::Serializer>(
                    &self,
                    serializer: S,
                ) -> ::std::result::Result<S::Ok, S::Error> {
                    $crate::serde::Serialize::serialize(&self.0, serializer)
                }
            }
        }
    };
}
