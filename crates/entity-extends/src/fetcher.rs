//! The capability used to retrieve remote extend targets.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::error::FetchError;

/// Retrieves one JSON document. Implementations must not retry; the caller
/// owns any retry policy.
#[async_trait]
pub trait JsonFetcher: Send + Sync {
    async fn get_json(&self, url: &Url) -> Result<Value, FetchError>;
}

#[async_trait]
impl<T: JsonFetcher + ?Sized> JsonFetcher for Arc<T> {
    async fn get_json(&self, url: &Url) -> Result<Value, FetchError> {
        (**self).get_json(url).await
    }
}

#[async_trait]
impl<T: JsonFetcher + ?Sized> JsonFetcher for &T {
    async fn get_json(&self, url: &Url) -> Result<Value, FetchError> {
        (**self).get_json(url).await
    }
}

#[cfg(feature = "reqwest")]
pub use http::HttpFetcher;

#[cfg(feature = "reqwest")]
mod http {
    use super::*;

    /// `GET` over HTTP. Non-success statuses are errors.
    #[derive(Debug, Clone, Default)]
    pub struct HttpFetcher {
        client: reqwest::Client,
    }

    impl HttpFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_client(client: reqwest::Client) -> Self {
            Self { client }
        }
    }

    #[async_trait]
    impl JsonFetcher for HttpFetcher {
        async fn get_json(&self, url: &Url) -> Result<Value, FetchError> {
            tracing::debug!(%url, "fetching remote record");
            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(|err| FetchError::Transport {
                    url: url.to_string(),
                    source: Box::new(err),
                })?;
            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }
            response
                .json::<Value>()
                .await
                .map_err(|err| FetchError::Decode {
                    url: url.to_string(),
                    message: err.to_string(),
                })
        }
    }
}
