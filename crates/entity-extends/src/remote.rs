//! Extend resolution where ancestors may live behind a URL.
//!
//! Only fetching suspends. A fetched record is validated against the
//! resolver's schema and then treated as a pool member for the rest of the
//! pass; its own relative references resolve against the URL it came from.

use std::sync::Arc;

use entity_schema::EntitySchema;
use futures::future::BoxFuture;
use serde_json::{Map, Value};
use tracing::{debug, trace};
use url::Url;

use crate::error::ResolveError;
use crate::fetcher::JsonFetcher;
use crate::merge::{merge_onto, terminal};
use crate::options::ResolverOptions;
use crate::pool::RecordPool;
use crate::reference::{is_remote, resolve_url};
use crate::resolver::{as_record, Pass};

pub struct RemoteResolver<F> {
    options: ResolverOptions,
    schema: Arc<EntitySchema>,
    fetcher: F,
}

impl<F: JsonFetcher> RemoteResolver<F> {
    /// `schema` guards every fetched payload.
    pub fn new(options: ResolverOptions, schema: Arc<EntitySchema>, fetcher: F) -> Self {
        Self {
            options,
            schema,
            fetcher,
        }
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    pub fn schema(&self) -> &Arc<EntitySchema> {
        &self.schema
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub async fn resolve(&self, record: &Value, pool: &RecordPool) -> Result<Value, ResolveError> {
        let record = as_record(record)?.clone();
        let mut pass = Pass::default();
        self.resolve_root(record, None, pool, &mut pass)
            .await
            .map(Value::Object)
    }

    pub async fn resolve_named(&self, name: &str, pool: &RecordPool) -> Result<Value, ResolveError> {
        let record = pool
            .get(name)
            .ok_or_else(|| ResolveError::UnknownRecord(name.to_string()))?
            .clone();
        let mut pass = Pass::default();
        self.resolve_root(record, Some(name), pool, &mut pass)
            .await
            .map(Value::Object)
    }

    /// See [`ExtendsResolver`]'s root handling: `member` is set only for
    /// pool members.
    pub(crate) async fn resolve_root(
        &self,
        record: Map<String, Value>,
        member: Option<&str>,
        pool: &RecordPool,
        pass: &mut Pass,
    ) -> Result<Map<String, Value>, ResolveError> {
        let base = self.options.base_url.clone();
        match member {
            Some(name) => {
                pass.enter(name, name, &self.options)?;
                let resolved = self.resolve_map(record, base, pool, pass).await;
                pass.leave();
                resolved
            }
            None => self.resolve_map(record, base, pool, pass).await,
        }
    }

    fn resolve_map<'a>(
        &'a self,
        record: Map<String, Value>,
        base: Option<Url>,
        pool: &'a RecordPool,
        pass: &'a mut Pass,
    ) -> BoxFuture<'a, Result<Map<String, Value>, ResolveError>> {
        Box::pin(async move {
            let layout = &self.options.layout;
            let Some(reference) = layout.extend_of(&record).map(str::to_string) else {
                return Ok(record);
            };
            let requester = layout.requester(&record);
            debug!(%requester, %reference, "resolving extend");

            let ancestor = if let Some(done) = pass.resolved.get(&reference) {
                done.clone()
            } else if let Some(member) = pool.get(&reference) {
                // Pool members are local, whoever extends them.
                pass.enter(&reference, &requester, &self.options)?;
                let local_base = self.options.base_url.clone();
                let ancestor = self
                    .resolve_map(member.clone(), local_base, pool, &mut *pass)
                    .await;
                pass.leave();
                let ancestor = ancestor?;
                pass.resolved.insert(reference.clone(), ancestor.clone());
                ancestor
            } else if self.options.is_built_in(&reference) {
                trace!(%requester, %reference, "extend terminates at built-in");
                return Ok(terminal(layout, &reference, &record));
            } else if is_remote(&reference) {
                self.remote_ancestor(&reference, &requester, base.as_ref(), pool, &mut *pass)
                    .await?
            } else {
                return Err(ResolveError::Missing {
                    reference,
                    requester,
                });
            };

            let merged = merge_onto(layout, &ancestor, &record);
            trace!(%requester, %reference, "merged with ancestor");
            self.resolve_map(merged, base, pool, pass).await
        })
    }

    /// Fetches, validates and resolves a URL ancestor, at most once per pass.
    async fn remote_ancestor(
        &self,
        reference: &str,
        requester: &str,
        base: Option<&Url>,
        pool: &RecordPool,
        pass: &mut Pass,
    ) -> Result<Map<String, Value>, ResolveError> {
        let url = resolve_url(reference, base).map_err(|source| ResolveError::InvalidUrl {
            reference: reference.to_string(),
            requester: requester.to_string(),
            source,
        })?;
        let key = url.to_string();
        if let Some(done) = pass.fetched.get(&key) {
            trace!(%url, "remote record already fetched in this pass");
            return Ok(done.clone());
        }

        pass.enter(&key, requester, &self.options)?;
        let resolved = self.fetch_and_resolve(reference, requester, url, pool, pass).await;
        pass.leave();
        let resolved = resolved?;
        pass.fetched.insert(key, resolved.clone());
        Ok(resolved)
    }

    async fn fetch_and_resolve(
        &self,
        reference: &str,
        requester: &str,
        url: Url,
        pool: &RecordPool,
        pass: &mut Pass,
    ) -> Result<Map<String, Value>, ResolveError> {
        debug!(%requester, %url, "fetching remote extend");
        let payload = self
            .fetcher
            .get_json(&url)
            .await
            .map_err(|source| ResolveError::Fetch {
                reference: reference.to_string(),
                requester: requester.to_string(),
                source,
            })?;

        let mode = self.options.mode;
        let invalid = |payload: &Value| ResolveError::InvalidRemote {
            reference: reference.to_string(),
            requester: requester.to_string(),
            entity: self.schema.dto_name(),
            explanation: self.schema.explain_dto(payload, mode),
        };
        if !self.schema.is_dto(&payload, mode) {
            return Err(invalid(&payload));
        }
        let Value::Object(fetched) = payload else {
            return Err(invalid(&payload));
        };
        self.resolve_map(fetched, Some(url), pool, pass).await
    }
}
