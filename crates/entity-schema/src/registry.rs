//! Process-wide, write-once registry of entity schemas.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use crate::schema::EntitySchema;

static GLOBAL: LazyLock<SchemaRegistry> = LazyLock::new(SchemaRegistry::new);

/// Schemas keyed by entity name. Entries are never replaced or removed.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: RwLock<HashMap<String, Arc<EntitySchema>>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Registers `schema` unless its name is taken, returning whichever
    /// schema holds the name afterwards.
    pub fn register(&self, schema: Arc<EntitySchema>) -> Arc<EntitySchema> {
        if let Some(existing) = self.get(schema.name()) {
            return existing;
        }
        let mut schemas = self.schemas.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            schemas
                .entry(schema.name().to_string())
                .or_insert(schema),
        )
    }

    pub fn get(&self, name: &str) -> Option<Arc<EntitySchema>> {
        let schemas = self.schemas.read().unwrap_or_else(PoisonError::into_inner);
        schemas.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        let schemas = self.schemas.read().unwrap_or_else(PoisonError::into_inner);
        schemas.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let schemas = self.schemas.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<_> = schemas.keys().cloned().collect();
        names.sort();
        names
    }
}
