use thiserror::Error;

/// Failure of the remote fetch collaborator.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("request to {url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("response from {url} is not JSON: {message}")]
    Decode { url: String, message: String },
}

/// An extend reference that cannot be satisfied. Every variant raised while
/// resolving a chain names the reference and the record that requested it.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("expected a record object, got {kind}")]
    NotAnObject { kind: &'static str },
    #[error("record at position {index} has no string \"{field}\" field")]
    Unnamed { index: usize, field: String },
    #[error("no record named \"{0}\" in the pool")]
    UnknownRecord(String),
    #[error(
        "record \"{requester}\" extends \"{reference}\", which is neither a known record nor a built-in"
    )]
    Missing { reference: String, requester: String },
    #[error("extend cycle: {}", .chain.join(" -> "))]
    Cycle { chain: Vec<String> },
    #[error("record \"{requester}\" extends \"{reference}\" more than {limit} levels deep")]
    TooDeep {
        reference: String,
        requester: String,
        limit: usize,
    },
    #[error("record \"{requester}\" extends remote \"{reference}\", which needs a remote resolver")]
    RemoteUnsupported { reference: String, requester: String },
    #[error("record \"{requester}\" extends \"{reference}\", which is not a valid URL: {source}")]
    InvalidUrl {
        reference: String,
        requester: String,
        #[source]
        source: url::ParseError,
    },
    #[error("record \"{requester}\" extends \"{reference}\": {source}")]
    Fetch {
        reference: String,
        requester: String,
        #[source]
        source: FetchError,
    },
    #[error(
        "record \"{requester}\" extends \"{reference}\": remote payload is not a valid {entity}:\n{explanation}"
    )]
    InvalidRemote {
        reference: String,
        requester: String,
        entity: String,
        explanation: String,
    },
}
