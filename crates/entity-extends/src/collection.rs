//! Whole-pool resolution.
//!
//! Members resolve strictly in pool order within one pass, so a member that
//! another member extends is resolved once and reused. The first failure
//! aborts the collection and no partial result is returned.

use serde_json::Value;
use tracing::debug;

use crate::error::ResolveError;
use crate::fetcher::JsonFetcher;
use crate::pool::RecordPool;
use crate::remote::RemoteResolver;
use crate::resolver::{ExtendsResolver, Pass};

impl ExtendsResolver {
    /// Every pool member, fully resolved, in pool order.
    pub fn resolve_collection(&self, pool: &RecordPool) -> Result<Vec<Value>, ResolveError> {
        debug!(records = pool.len(), "resolving collection");
        let mut pass = Pass::default();
        let mut resolved = Vec::with_capacity(pool.len());
        for (name, record) in pool.iter() {
            let record = match pass.resolved.get(name) {
                Some(done) => done.clone(),
                None => {
                    let done = self.resolve_root(record.clone(), Some(name), pool, &mut pass)?;
                    pass.resolved.insert(name.to_string(), done.clone());
                    done
                }
            };
            resolved.push(Value::Object(record));
        }
        Ok(resolved)
    }
}

impl<F: JsonFetcher> RemoteResolver<F> {
    /// Like [`ExtendsResolver::resolve_collection`]; each URL is fetched at
    /// most once for the whole collection.
    pub async fn resolve_collection(&self, pool: &RecordPool) -> Result<Vec<Value>, ResolveError> {
        debug!(records = pool.len(), "resolving collection");
        let mut pass = Pass::default();
        let mut resolved = Vec::with_capacity(pool.len());
        for (name, record) in pool.iter() {
            let record = match pass.resolved.get(name) {
                Some(done) => done.clone(),
                None => {
                    let done = self.resolve_root(record.clone(), Some(name), pool, &mut pass).await?;
                    pass.resolved.insert(name.to_string(), done.clone());
                    done
                }
            };
            resolved.push(Value::Object(record));
        }
        Ok(resolved)
    }
}

/// Resolves every record in `pool` with the local resolver.
pub fn resolve_collection(
    resolver: &ExtendsResolver,
    pool: &RecordPool,
) -> Result<Vec<Value>, ResolveError> {
    resolver.resolve_collection(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolves_in_pool_order_and_reuses_ancestors() {
        let pool = RecordPool::from_records(
            [
                json!({"name": "Card", "extend": "Panel", "content": ["card"]}),
                json!({"name": "Panel", "content": ["panel"], "meta": {"role": "region"}}),
                json!({"name": "Hero", "extend": "Card", "meta": {"role": "banner"}}),
            ],
            &Default::default(),
        )
        .unwrap();
        let resolved = resolve_collection(&ExtendsResolver::default(), &pool).unwrap();
        assert_eq!(
            resolved,
            [
                json!({"name": "Panel", "content": ["panel", "card"], "meta": {"role": "region"}}),
                json!({"name": "Panel", "content": ["panel"], "meta": {"role": "region"}}),
                json!({"name": "Panel", "content": ["panel", "card"], "meta": {"role": "banner"}}),
            ]
        );
    }

    #[test]
    fn first_failure_discards_everything() {
        let pool = RecordPool::from_records(
            [
                json!({"name": "Ok", "content": []}),
                json!({"name": "Broken", "extend": "Nowhere"}),
            ],
            &Default::default(),
        )
        .unwrap();
        let err = ExtendsResolver::default().resolve_collection(&pool).unwrap_err();
        assert!(matches!(err, ResolveError::Missing { .. }));
    }
}
