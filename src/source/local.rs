// src/source/local.rs

//! Local directory package source
//!
//! Mirrors the remote layout on disk: `specs/<full_name>.toml` and
//! `packages/<full_name>.pkg` under the source root.

use crate::error::{Error, Result};
use crate::paths;
use crate::spec::{Platform, SpecMetadata, Specification};
use crate::version::Version;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{Source, archive_name, metadata_name};

/// Package source backed by a local directory
#[derive(Debug, Clone)]
pub struct LocalSource {
    root: PathBuf,
    uri: String,
}

impl LocalSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let uri = format!("file://{}", root.display());
        Self { root, uri }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn specs_dir(&self) -> PathBuf {
        self.root.join("specs")
    }

    pub fn packages_dir(&self) -> PathBuf {
        self.root.join("packages")
    }
}

impl Source for LocalSource {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn fetch_spec(
        &self,
        name: &str,
        version: &Version,
        platform: &Platform,
    ) -> Result<Option<Specification>> {
        let path = self.specs_dir().join(metadata_name(name, version, platform));
        if !path.exists() {
            debug!("No specification metadata at {}", path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            Error::IoError(format!("Failed to read {}: {e}", path.display()))
        })?;

        SpecMetadata::from_toml(&content)?.into_specification().map(Some)
    }

    fn download(&self, spec: &Specification, dest: &Path) -> Result<PathBuf> {
        let file_name = archive_name(spec);
        let src_path = self.packages_dir().join(&file_name);
        if !src_path.is_file() {
            return Err(Error::NotFoundError(format!(
                "{} not found at {}",
                spec.full_name(),
                self.uri
            )));
        }

        let cache_dir = paths::cache_dir(dest);
        fs::create_dir_all(&cache_dir).map_err(|e| {
            Error::IoError(format!("Failed to create directory {}: {e}", cache_dir.display()))
        })?;

        let dest_path = cache_dir.join(&file_name);
        debug!("Copying {} to {}", src_path.display(), dest_path.display());

        fs::copy(&src_path, &dest_path).map_err(|e| {
            Error::IoError(format!(
                "Failed to copy {} to {}: {e}",
                src_path.display(),
                dest_path.display()
            ))
        })?;

        Ok(dest_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn mirror_with(spec: &Specification) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        let source = LocalSource::new(dir.path());
        fs::create_dir_all(source.specs_dir()).unwrap();
        fs::create_dir_all(source.packages_dir()).unwrap();

        let meta = toml::to_string(&SpecMetadata::from(spec)).unwrap();
        fs::write(
            source
                .specs_dir()
                .join(format!("{}.toml", spec.full_name())),
            meta,
        )
        .unwrap();
        fs::write(source.packages_dir().join(archive_name(spec)), b"archive").unwrap();
        dir
    }

    #[test]
    fn test_fetch_spec_found_and_missing() {
        let spec = Specification::parse("json", "2.7.1").unwrap();
        let mirror = mirror_with(&spec);
        let source = LocalSource::new(mirror.path());

        let loaded = source
            .fetch_spec("json", &spec.version, &Platform::Any)
            .unwrap();
        assert_eq!(loaded, Some(spec.clone()));

        let missing = source
            .fetch_spec("json", &Version::parse("9.9.9").unwrap(), &Platform::Any)
            .unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_download_copies_into_cache() {
        let spec = Specification::parse("json", "2.7.1").unwrap();
        let mirror = mirror_with(&spec);
        let dest = tempfile::tempdir().unwrap();

        let path = LocalSource::new(mirror.path())
            .download(&spec, dest.path())
            .unwrap();

        assert_eq!(path, dest.path().join("cache").join("json-2.7.1.pkg"));
        assert_eq!(fs::read(&path).unwrap(), b"archive");
    }

    #[test]
    fn test_download_missing_archive_is_not_found() {
        let mirror = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let spec = Specification::parse("absent", "1.0.0").unwrap();

        let result = LocalSource::new(mirror.path()).download(&spec, dest.path());
        assert!(matches!(result, Err(Error::NotFoundError(_))));
    }
}
