use std::collections::BTreeSet;

use entity_schema::ValidationMode;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::layout::RecordLayout;

pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Resolver configuration. Deserializable so it can live in application
/// config; every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverOptions {
    pub layout: RecordLayout,
    /// Extend targets that terminate a chain without a pool member, e.g. the
    /// primitive element names of a component library.
    pub built_ins: BTreeSet<String>,
    /// Mode used to validate remote payloads.
    pub mode: ValidationMode,
    /// Base for relative remote references found in local records.
    pub base_url: Option<Url>,
    pub max_depth: usize,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            layout: RecordLayout::default(),
            built_ins: BTreeSet::new(),
            mode: ValidationMode::default(),
            base_url: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ResolverOptions {
    pub fn with_layout(mut self, layout: RecordLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_built_ins<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.built_ins.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn is_built_in(&self, name: &str) -> bool {
        self.built_ins.contains(name)
    }
}
