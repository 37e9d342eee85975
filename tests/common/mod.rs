// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

use depsolve::spec::SpecMetadata;
use depsolve::{Dependency, DependencyRequest, Specification};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Create a local mirror containing metadata and an archive for each spec.
///
/// Returns the TempDir - keep it alive to prevent cleanup.
pub fn setup_mirror(specs: &[Specification]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let specs_dir = dir.path().join("specs");
    let packages_dir = dir.path().join("packages");
    fs::create_dir_all(&specs_dir).unwrap();
    fs::create_dir_all(&packages_dir).unwrap();

    for spec in specs {
        let meta = toml::to_string(&SpecMetadata::from(spec)).unwrap();
        fs::write(specs_dir.join(format!("{}.toml", spec.full_name())), meta).unwrap();
        fs::write(
            packages_dir.join(format!("{}.pkg", spec.full_name())),
            format!("archive of {}", spec.full_name()),
        )
        .unwrap();
    }

    dir
}

/// Write a sources config pointing at the given mirror directories
pub fn write_sources_config(dir: &Path, mirrors: &[&Path]) -> std::path::PathBuf {
    let uris: Vec<String> = mirrors
        .iter()
        .map(|m| format!("\"file://{}\"", m.display()))
        .collect();
    let path = dir.join("sources.toml");
    fs::write(&path, format!("sources = [{}]\n", uris.join(", "))).unwrap();
    path
}

pub fn spec(name: &str, version: &str) -> Specification {
    Specification::parse(name, version).unwrap()
}

pub fn root_request(name: &str, requirement: &str) -> DependencyRequest {
    DependencyRequest::root(Dependency::parse(name, requirement).unwrap())
}
