// src/source/mod.rs

//! Package sources
//!
//! A [`Source`] knows how to load specification metadata and how to transfer
//! a package archive into an install directory. The [`SourceList`] is the
//! ordered default list consulted when a specification does not name its own
//! source.

mod local;
mod remote;

pub use local::LocalSource;
pub use remote::{DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS, RemoteSource};

use crate::error::{Error, Result};
use crate::spec::{Platform, Specification};
use crate::version::Version;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use url::Url;

/// A place packages come from
pub trait Source: Send + Sync {
    /// Canonical URI, used for identity and diagnostics
    fn uri(&self) -> &str;

    /// Load the full specification for an index entry
    ///
    /// Returns `Ok(None)` when the source has no such package.
    fn fetch_spec(
        &self,
        name: &str,
        version: &Version,
        platform: &Platform,
    ) -> Result<Option<Specification>>;

    /// Transfer the package archive for `spec` into `dest`, returning the written path
    fn download(&self, spec: &Specification, dest: &Path) -> Result<PathBuf>;
}

/// Build a source from a URI: `file://` maps to a local directory, `http(s)://` to a remote
pub fn from_uri(uri: &str) -> Result<Arc<dyn Source>> {
    let parsed =
        Url::parse(uri).map_err(|e| Error::ConfigError(format!("Invalid source URI '{uri}': {e}")))?;

    match parsed.scheme() {
        "file" => {
            let path = parsed.to_file_path().map_err(|()| {
                Error::ConfigError(format!("Source URI '{uri}' is not a local path"))
            })?;
            Ok(Arc::new(LocalSource::new(path)))
        }
        "http" | "https" => Ok(Arc::new(RemoteSource::new(uri)?)),
        scheme => Err(Error::ConfigError(format!(
            "Unsupported source scheme '{scheme}' in '{uri}'"
        ))),
    }
}

/// Ordered, de-duplicated list of default sources
#[derive(Clone, Default)]
pub struct SourceList {
    sources: Vec<Arc<dyn Source>>,
}

impl SourceList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source unless one with the same URI is already present
    pub fn push(&mut self, source: Arc<dyn Source>) {
        if !self.sources.iter().any(|s| s.uri() == source.uri()) {
            self.sources.push(source);
        }
    }

    /// The preferred source
    pub fn first(&self) -> Option<&Arc<dyn Source>> {
        self.sources.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Source>> {
        self.sources.iter()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl FromIterator<Arc<dyn Source>> for SourceList {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Source>>>(iter: I) -> Self {
        let mut list = SourceList::new();
        for source in iter {
            list.push(source);
        }
        list
    }
}

impl std::fmt::Debug for SourceList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.sources.iter().map(|s| s.uri()))
            .finish()
    }
}

/// File name of a package archive
pub(crate) fn archive_name(spec: &Specification) -> String {
    format!("{}.pkg", spec.full_name())
}

/// File name of a specification metadata document
pub(crate) fn metadata_name(name: &str, version: &Version, platform: &Platform) -> String {
    format!("{}.toml", crate::spec::full_name(name, version, platform))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_list_dedups_by_uri() {
        let list: SourceList = [
            Arc::new(LocalSource::new("/srv/a")) as Arc<dyn Source>,
            Arc::new(LocalSource::new("/srv/b")) as Arc<dyn Source>,
            Arc::new(LocalSource::new("/srv/a")) as Arc<dyn Source>,
        ]
        .into_iter()
        .collect();

        assert_eq!(list.len(), 2);
        assert_eq!(list.first().map(|s| s.uri()), Some("file:///srv/a"));
    }

    #[test]
    fn test_from_uri_schemes() {
        let local = from_uri("file:///srv/mirror").unwrap();
        assert_eq!(local.uri(), "file:///srv/mirror");

        let remote = from_uri("https://packages.example.org").unwrap();
        assert_eq!(remote.uri(), "https://packages.example.org/");

        assert!(matches!(
            from_uri("ftp://packages.example.org"),
            Err(Error::ConfigError(_))
        ));
        assert!(from_uri("not a uri").is_err());
    }

    #[test]
    fn test_empty_list_has_no_first() {
        assert!(SourceList::new().first().is_none());
        assert!(SourceList::new().is_empty());
    }
}
