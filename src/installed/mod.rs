// src/installed/mod.rs

//! Installed package state
//!
//! The activation record only needs one question answered: "is a spec equal
//! to this one installed?". [`InstalledSet`] answers it from memory and
//! [`InstalledDb`] from a SQLite database.

mod db;

pub use db::InstalledDb;

use crate::error::Result;
use crate::spec::Specification;
use std::collections::HashSet;

/// Membership test over the currently installed specifications
pub trait InstalledSpecs {
    fn contains(&self, spec: &Specification) -> Result<bool>;
}

/// In-memory installed set
#[derive(Debug, Clone, Default)]
pub struct InstalledSet {
    specs: HashSet<Specification>,
}

impl InstalledSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if an equal spec was already present
    pub fn insert(&mut self, spec: Specification) -> bool {
        self.specs.insert(spec)
    }

    pub fn remove(&mut self, spec: &Specification) -> bool {
        self.specs.remove(spec)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Specification> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl FromIterator<Specification> for InstalledSet {
    fn from_iter<I: IntoIterator<Item = Specification>>(iter: I) -> Self {
        Self {
            specs: iter.into_iter().collect(),
        }
    }
}

impl InstalledSpecs for InstalledSet {
    fn contains(&self, spec: &Specification) -> Result<bool> {
        Ok(self.specs.contains(spec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::Platform;

    #[test]
    fn test_membership_is_by_identity() {
        let mut set = InstalledSet::new();
        let plain = Specification::parse("ffi", "1.16.3").unwrap();
        let native = plain
            .clone()
            .with_platform(Platform::Named("x86_64-linux".to_string()));

        assert!(set.insert(plain.clone()));
        assert!(!set.insert(plain.clone()));
        assert!(set.contains(&plain).unwrap());
        assert!(!set.contains(&native).unwrap());

        assert!(set.remove(&plain));
        assert!(set.is_empty());
    }
}
