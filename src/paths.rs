// src/paths.rs
//! Centralized path derivation for install directories

use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Subdirectories every install directory carries
pub const INSTALL_SUBDIRS: &[&str] = &[
    "build_info",
    "cache",
    "doc",
    "extensions",
    "packages",
    "specifications",
];

/// Directory downloaded archives land in
pub fn cache_dir(install_dir: &Path) -> PathBuf {
    install_dir.join("cache")
}

/// Directory holding installed specification metadata
pub fn specifications_dir(install_dir: &Path) -> PathBuf {
    install_dir.join("specifications")
}

/// Create the install directory layout; existing directories are left alone
pub fn ensure_install_dirs(install_dir: &Path) -> Result<()> {
    for sub in INSTALL_SUBDIRS {
        let dir = install_dir.join(sub);
        fs::create_dir_all(&dir).map_err(|e| {
            Error::IoError(format!("Failed to create directory {}: {e}", dir.display()))
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_dir() {
        assert_eq!(
            cache_dir(Path::new("/var/lib/depsolve")),
            PathBuf::from("/var/lib/depsolve/cache")
        );
    }

    #[test]
    fn test_specifications_dir() {
        assert_eq!(
            specifications_dir(Path::new("/var/lib/depsolve")),
            PathBuf::from("/var/lib/depsolve/specifications")
        );
    }

    #[test]
    fn test_ensure_install_dirs_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        ensure_install_dirs(dir.path()).unwrap();
        ensure_install_dirs(dir.path()).unwrap();

        for sub in INSTALL_SUBDIRS {
            assert!(dir.path().join(sub).is_dir(), "{sub} should exist");
        }
    }
}
