//! Local names versus URL references.

use url::Url;

/// Absolute `http(s)` URLs and `./`, `../` or `/` relative paths are remote
/// references; anything else is a local name.
pub fn is_remote(reference: &str) -> bool {
    reference.starts_with("http://")
        || reference.starts_with("https://")
        || reference.starts_with("./")
        || reference.starts_with("../")
        || reference.starts_with('/')
}

/// Resolves `reference` against `base`, or parses it as absolute when there
/// is no base.
pub fn resolve_url(reference: &str, base: Option<&Url>) -> Result<Url, url::ParseError> {
    match base {
        Some(base) => base.join(reference),
        None => Url::parse(reference),
    }
}
