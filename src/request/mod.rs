// src/request/mod.rs

//! Dependency requests
//!
//! A [`DependencyRequest`] is a dependency together with the activation that
//! introduced it. Requests made directly by the user have no requester.

use crate::activation::ActivationRequest;
use crate::error::Result;
use crate::spec::ActivatedSpec;
use crate::version::Requirement;
use std::fmt;
use std::sync::Arc;

/// Whether a dependency is needed at runtime or only for development
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DependencyKind {
    #[default]
    Runtime,
    Development,
}

impl DependencyKind {
    pub fn as_str(&self) -> &str {
        match self {
            DependencyKind::Runtime => "runtime",
            DependencyKind::Development => "development",
        }
    }
}

/// A named dependency with a version requirement
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dependency {
    pub name: String,
    pub requirement: Requirement,
    pub kind: DependencyKind,
}

impl Dependency {
    pub fn new(name: impl Into<String>, requirement: Requirement) -> Self {
        Self {
            name: name.into(),
            requirement,
            kind: DependencyKind::Runtime,
        }
    }

    /// Build a runtime dependency from an unparsed requirement string
    pub fn parse(name: &str, requirement: &str) -> Result<Self> {
        Ok(Self::new(name, Requirement::parse(requirement)?))
    }

    pub fn with_kind(mut self, kind: DependencyKind) -> Self {
        self.kind = kind;
        self
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DependencyKind::Runtime => write!(f, "{} ({})", self.name, self.requirement),
            DependencyKind::Development => {
                write!(f, "{} ({}, development)", self.name, self.requirement)
            }
        }
    }
}

/// A dependency the resolver must satisfy, and who asked for it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencyRequest {
    dependency: Dependency,
    requester: Option<Arc<ActivationRequest>>,
}

impl DependencyRequest {
    pub fn new(dependency: Dependency, requester: Option<Arc<ActivationRequest>>) -> Self {
        Self {
            dependency,
            requester,
        }
    }

    /// A top-level request with no introducing activation
    pub fn root(dependency: Dependency) -> Self {
        Self::new(dependency, None)
    }

    pub fn dependency(&self) -> &Dependency {
        &self.dependency
    }

    pub fn name(&self) -> &str {
        &self.dependency.name
    }

    pub fn requirement(&self) -> &Requirement {
        &self.dependency.requirement
    }

    pub fn is_development(&self) -> bool {
        self.dependency.kind == DependencyKind::Development
    }

    /// Requested directly rather than pulled in by another activation
    pub fn is_explicit(&self) -> bool {
        self.requester.is_none()
    }

    /// The activation whose dependencies produced this request
    pub fn requester(&self) -> Option<&Arc<ActivationRequest>> {
        self.requester.as_ref()
    }

    /// Does `spec` satisfy this request by name and version?
    pub fn matches(&self, spec: &ActivatedSpec) -> bool {
        spec.name() == self.name() && self.requirement().satisfied_by(spec.version())
    }
}

impl fmt::Display for DependencyRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dependency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::Specification;

    #[test]
    fn test_dependency_display() {
        let dep = Dependency::parse("rack", ">= 2.0").unwrap();
        assert_eq!(dep.to_string(), "rack (>= 2.0)");

        let dev = dep.with_kind(DependencyKind::Development);
        assert_eq!(dev.to_string(), "rack (>= 2.0, development)");
    }

    #[test]
    fn test_root_request_is_explicit() {
        let req = DependencyRequest::root(Dependency::parse("rack", "*").unwrap());
        assert!(req.is_explicit());
        assert!(req.requester().is_none());
        assert!(!req.is_development());
    }

    #[test]
    fn test_matches_checks_name_and_requirement() {
        let req = DependencyRequest::root(Dependency::parse("rack", "~> 2.2").unwrap());

        let good = ActivatedSpec::from(Specification::parse("rack", "2.2.8").unwrap());
        let too_new = ActivatedSpec::from(Specification::parse("rack", "3.0.0").unwrap());
        let other = ActivatedSpec::from(Specification::parse("rake", "2.2.8").unwrap());

        assert!(req.matches(&good));
        assert!(!req.matches(&too_new));
        assert!(!req.matches(&other));
    }
}
