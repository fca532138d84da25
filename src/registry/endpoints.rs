//! Registry endpoint URLs
//!
//! Builds Distribution API v2 URLs below a registry base URL. The base may
//! carry a path prefix (`https://mirror.example.com/registry`), which is kept
//! in front of every `/v2/...` path.

use crate::digest::Digest;
use crate::error::{RegistryError, Result};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryUrl {
    base: Url,
}

impl RegistryUrl {
    pub fn parse(address: &str) -> Result<Self> {
        let with_scheme = if address.contains("://") {
            address.to_string()
        } else {
            format!("https://{}", address)
        };
        let base = Url::parse(&with_scheme)?;
        if base.cannot_be_a_base() || base.host_str().is_none() {
            return Err(RegistryError::Parse(format!(
                "registry address has no host: {}",
                address
            )));
        }
        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Absolute URL for `path` (which starts with `/v2/`) under the base path
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let prefix = self.base.path().trim_end_matches('/');
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.set_path(&format!("{}{}", prefix, path));
        Ok(url)
    }

    /// `/v2/{repository}/blobs/{digest}`
    pub fn blob(&self, repository: &str, digest: &Digest) -> Result<Url> {
        self.endpoint(&format!("/v2/{}/blobs/{}", repository, digest))
    }

    /// `/v2/{repository}/blobs/uploads/`
    pub fn uploads(&self, repository: &str) -> Result<Url> {
        self.endpoint(&format!("/v2/{}/blobs/uploads/", repository))
    }
}

/// Resolve an upload `Location` header against the URL of the request that
/// returned it. Absolute locations are used as given.
pub fn resolve_location(request_url: &Url, location: &str) -> Result<Url> {
    if location.trim().is_empty() {
        return Err(RegistryError::Parse(
            "empty Location header in upload response".to_string(),
        ));
    }
    request_url
        .join(location)
        .map_err(|e| RegistryError::Parse(format!("invalid Location '{}': {}", location, e)))
}

/// Set `digest` on an upload location, replacing any existing value and
/// keeping every other query parameter
pub fn with_digest_query(location: &Url, digest: &Digest) -> Url {
    let mut url = location.clone();
    let retained: Vec<(String, String)> = location
        .query_pairs()
        .filter(|(key, _)| key != "digest")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(retained)
        .append_pair("digest", digest.as_str());
    url
}
