//! Resolution of `extend` chains between named records.
//!
//! A record may name an ancestor in its `extend` field. Resolving it yields a
//! record with the ancestor's identity, the ancestor's content followed by the
//! child's, and keyed maps where the child's keys win. Ancestors come from a
//! [`RecordPool`], from a built-in allow-list that terminates the chain, or
//! (with [`RemoteResolver`]) from a URL fetched through a [`JsonFetcher`].
//!
//! ```
//! use entity_extends::{ExtendsResolver, RecordPool};
//! use serde_json::json;
//!
//! let pool = RecordPool::from_records(
//!     [
//!         json!({"name": "A", "content": ["x"]}),
//!         json!({"name": "B", "extend": "A", "content": ["y"]}),
//!     ],
//!     &Default::default(),
//! )
//! .unwrap();
//!
//! let resolved = ExtendsResolver::default().resolve_named("B", &pool).unwrap();
//! assert_eq!(resolved, json!({"name": "A", "content": ["x", "y"]}));
//! ```

pub mod collection;
pub mod error;
pub mod fetcher;
pub mod layout;
mod merge;
pub mod options;
pub mod pool;
pub mod reference;
pub mod remote;
pub mod resolver;

pub use collection::resolve_collection;
pub use error::{FetchError, ResolveError};
#[cfg(feature = "reqwest")]
pub use fetcher::HttpFetcher;
pub use fetcher::JsonFetcher;
pub use layout::RecordLayout;
pub use options::{ResolverOptions, DEFAULT_MAX_DEPTH};
pub use pool::RecordPool;
pub use reference::{is_remote, resolve_url};
pub use remote::RemoteResolver;
pub use resolver::ExtendsResolver;
