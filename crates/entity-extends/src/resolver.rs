//! Local extend-chain resolution.
//!
//! Resolution is depth-first: a record without `extend` is terminal; otherwise
//! its target is resolved first, merged with the record, and the merged record
//! is resolved again until no `extend` remains.

use std::collections::HashMap;

use entity_schema::json_kind;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::error::ResolveError;
use crate::merge::{merge_onto, terminal};
use crate::options::ResolverOptions;
use crate::pool::RecordPool;
use crate::reference::is_remote;

/// State of one resolution pass. Shared by every record of a collection so
/// that ancestors are resolved (and fetched) once.
#[derive(Debug, Default)]
pub(crate) struct Pass {
    /// References currently being resolved, outermost first.
    pub(crate) chain: Vec<String>,
    /// Fully resolved pool members by their original name.
    pub(crate) resolved: HashMap<String, Map<String, Value>>,
    /// Remote records by absolute URL.
    pub(crate) fetched: HashMap<String, Map<String, Value>>,
}

impl Pass {
    /// Enters `reference`, failing on a cycle or an overly deep chain.
    pub(crate) fn enter(
        &mut self,
        reference: &str,
        requester: &str,
        options: &ResolverOptions,
    ) -> Result<(), ResolveError> {
        if self.chain.iter().any(|r| r == reference) {
            let mut chain = self.chain.clone();
            chain.push(reference.to_string());
            return Err(ResolveError::Cycle { chain });
        }
        if self.chain.len() >= options.max_depth {
            return Err(ResolveError::TooDeep {
                reference: reference.to_string(),
                requester: requester.to_string(),
                limit: options.max_depth,
            });
        }
        self.chain.push(reference.to_string());
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.chain.pop();
    }
}

pub(crate) fn as_record(record: &Value) -> Result<&Map<String, Value>, ResolveError> {
    record.as_object().ok_or(ResolveError::NotAnObject {
        kind: json_kind(record),
    })
}

/// Resolves extend chains within a [`RecordPool`]. URL references are
/// rejected; use [`RemoteResolver`](crate::RemoteResolver) for those.
#[derive(Debug, Clone, Default)]
pub struct ExtendsResolver {
    options: ResolverOptions,
}

impl ExtendsResolver {
    pub fn new(options: ResolverOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Fully merged `record`. A record without `extend` is returned as is.
    pub fn resolve(&self, record: &Value, pool: &RecordPool) -> Result<Value, ResolveError> {
        let record = as_record(record)?;
        let mut pass = Pass::default();
        self.resolve_root(record.clone(), None, pool, &mut pass)
            .map(Value::Object)
    }

    /// Resolves the pool member called `name`.
    pub fn resolve_named(&self, name: &str, pool: &RecordPool) -> Result<Value, ResolveError> {
        let record = pool
            .get(name)
            .ok_or_else(|| ResolveError::UnknownRecord(name.to_string()))?;
        let mut pass = Pass::default();
        self.resolve_root(record.clone(), Some(name), pool, &mut pass)
            .map(Value::Object)
    }

    /// `member` is the pool name of `record` when it is a pool member; only
    /// then does it occupy that name in the chain. A record outside the pool
    /// may extend the member it shares a name with.
    pub(crate) fn resolve_root(
        &self,
        record: Map<String, Value>,
        member: Option<&str>,
        pool: &RecordPool,
        pass: &mut Pass,
    ) -> Result<Map<String, Value>, ResolveError> {
        match member {
            Some(name) => {
                pass.enter(name, name, &self.options)?;
                let resolved = self.resolve_map(record, pool, pass);
                pass.leave();
                resolved
            }
            None => self.resolve_map(record, pool, pass),
        }
    }

    fn resolve_map(
        &self,
        record: Map<String, Value>,
        pool: &RecordPool,
        pass: &mut Pass,
    ) -> Result<Map<String, Value>, ResolveError> {
        let layout = &self.options.layout;
        let Some(reference) = layout.extend_of(&record).map(str::to_string) else {
            return Ok(record);
        };
        let requester = layout.requester(&record);
        debug!(%requester, %reference, "resolving extend");

        let ancestor = if let Some(done) = pass.resolved.get(&reference) {
            done.clone()
        } else if let Some(member) = pool.get(&reference) {
            pass.enter(&reference, &requester, &self.options)?;
            let ancestor = self.resolve_map(member.clone(), pool, pass);
            pass.leave();
            let ancestor = ancestor?;
            pass.resolved.insert(reference.clone(), ancestor.clone());
            ancestor
        } else if self.options.is_built_in(&reference) {
            trace!(%requester, %reference, "extend terminates at built-in");
            return Ok(terminal(layout, &reference, &record));
        } else if is_remote(&reference) {
            return Err(ResolveError::RemoteUnsupported {
                reference,
                requester,
            });
        } else {
            return Err(ResolveError::Missing {
                reference,
                requester,
            });
        };

        let merged = merge_onto(layout, &ancestor, &record);
        trace!(%requester, %reference, "merged with ancestor");
        self.resolve_map(merged, pool, pass)
    }
}
