//! Mapping repository object URLs to node ids.

use url::Url;

use crate::error::{Result, ServiceError};

/// Turns a stored object URL into the repository node id.
pub trait NodeIdResolver: Send + Sync {
    /// Resolves `object_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidObjectUrl`] if no node id can be derived.
    fn resolve(&self, object_url: &str) -> Result<String>;
}

/// Resolves `ccrep://<repository>/<node-id>` URLs via [`object_id_from_url`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ObjectUrlResolver;

impl NodeIdResolver for ObjectUrlResolver {
    fn resolve(&self, object_url: &str) -> Result<String> {
        object_id_from_url(object_url)
    }
}

/// Returns the path of `url` with every `/` removed.
///
/// ```
/// use edusharing_service::object_id_from_url;
///
/// assert_eq!(object_id_from_url("ccrep://home/abc-123")?, "abc-123");
/// # Ok::<(), edusharing_service::ServiceError>(())
/// ```
///
/// # Errors
///
/// Returns [`ServiceError::InvalidObjectUrl`] if `url` does not parse or has
/// an empty path.
pub fn object_id_from_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| ServiceError::invalid_object_url(url, e.to_string()))?;
    let id = parsed.path().replace('/', "");
    if id.is_empty() {
        return Err(ServiceError::invalid_object_url(url, "URL has no path"));
    }
    Ok(id)
}
