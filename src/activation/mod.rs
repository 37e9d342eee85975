// src/activation/mod.rs

//! Activation records
//!
//! An [`ActivationRequest`] records one resolver decision: "activate this
//! spec because that dependency request asked for it". The resolver keeps
//! these on its solution stack, drops them on backtrack, and hands the
//! survivors to materialization once the search finishes.
//!
//! Records are immutable. The chain of decisions is reachable through
//! [`ActivationRequest::parent`], which follows the request's requester
//! rather than storing a second pointer.

use crate::error::{Error, Result};
use crate::installed::InstalledSpecs;
use crate::paths;
use crate::request::DependencyRequest;
use crate::source::SourceList;
use crate::spec::{ActivatedSpec, Platform, Specification};
use crate::version::Version;
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Non-empty list of other specs that could have satisfied the same request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternatives(Vec<ActivatedSpec>);

impl Alternatives {
    /// Returns `None` for an empty list
    pub fn new(specs: Vec<ActivatedSpec>) -> Option<Self> {
        if specs.is_empty() {
            None
        } else {
            Some(Self(specs))
        }
    }

    pub fn as_slice(&self) -> &[ActivatedSpec] {
        &self.0
    }

    pub fn full_names(&self) -> Vec<String> {
        self.0.iter().map(ActivatedSpec::full_name).collect()
    }
}

/// Whether other candidates existed when this activation was chosen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Ambiguity {
    /// The only viable candidate
    Definite,
    /// Others may have existed but were not recorded
    #[default]
    PossiblyOthers,
    /// These other candidates were also viable
    OthersKnown(Alternatives),
}

impl Ambiguity {
    /// Record known alternatives; an empty list means the choice was definite
    pub fn others_known(specs: Vec<ActivatedSpec>) -> Self {
        match Alternatives::new(specs) {
            Some(alternatives) => Ambiguity::OthersKnown(alternatives),
            None => Ambiguity::Definite,
        }
    }
}

impl From<bool> for Ambiguity {
    fn from(others_possible: bool) -> Self {
        if others_possible {
            Ambiguity::PossiblyOthers
        } else {
            Ambiguity::Definite
        }
    }
}

/// Right-hand side of a heterogeneous comparison
#[derive(Debug, Clone, Copy)]
pub enum Comparand<'a> {
    Spec(&'a Specification),
    Activated(&'a ActivatedSpec),
    Activation(&'a ActivationRequest),
    /// Anything else; never equal
    Other,
}

/// A spec activated to satisfy a dependency request
#[derive(Debug, Clone)]
pub struct ActivationRequest {
    spec: ActivatedSpec,
    request: DependencyRequest,
    ambiguity: Ambiguity,
}

impl ActivationRequest {
    /// Create a record without tracking alternatives
    pub fn new(spec: impl Into<ActivatedSpec>, request: DependencyRequest) -> Self {
        Self::with_ambiguity(spec, request, Ambiguity::PossiblyOthers)
    }

    pub fn with_ambiguity(
        spec: impl Into<ActivatedSpec>,
        request: DependencyRequest,
        ambiguity: Ambiguity,
    ) -> Self {
        Self {
            spec: spec.into(),
            request,
            ambiguity,
        }
    }

    pub fn spec(&self) -> &ActivatedSpec {
        &self.spec
    }

    pub fn request(&self) -> &DependencyRequest {
        &self.request
    }

    pub fn ambiguity(&self) -> &Ambiguity {
        &self.ambiguity
    }

    pub fn name(&self) -> &str {
        self.spec.name()
    }

    pub fn version(&self) -> &Version {
        self.spec.version()
    }

    pub fn platform(&self) -> &Platform {
        self.spec.platform()
    }

    pub fn full_name(&self) -> String {
        self.spec.full_name()
    }

    /// The canonical specification behind this activation
    ///
    /// Index entries are loaded from their source. Failing to load one means
    /// the record was built from a spec its source cannot back.
    pub fn full_spec(&self) -> Result<Cow<'_, Specification>> {
        self.spec.full_spec()
    }

    /// Is this exact spec already present in `installed`?
    ///
    /// Vendored specs are always considered installed.
    pub fn installed_already(&self, installed: &dyn InstalledSpecs) -> Result<bool> {
        if self.spec.is_always_satisfied() {
            return Ok(true);
        }

        let spec = self.full_spec()?;
        installed.contains(&spec)
    }

    /// Were other candidates possible for the same request?
    pub fn others_possible(&self) -> bool {
        !matches!(self.ambiguity, Ambiguity::Definite)
    }

    /// Known alternatives; empty unless they were recorded
    pub fn alternatives(&self) -> &[ActivatedSpec] {
        match &self.ambiguity {
            Ambiguity::OthersKnown(alternatives) => alternatives.as_slice(),
            _ => &[],
        }
    }

    /// The activation whose dependency produced this one, if any
    pub fn parent(&self) -> Option<&Arc<ActivationRequest>> {
        self.request.requester()
    }

    /// Walk the parent chain, nearest first
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors {
            next: self.parent().map(Arc::as_ref),
        }
    }

    /// Full names from the root activation down to this one
    pub fn request_path(&self) -> Vec<String> {
        let mut path: Vec<String> = self.ancestors().map(ActivationRequest::full_name).collect();
        path.reverse();
        path.push(self.full_name());
        path
    }

    /// Download the package into `path`
    ///
    /// Uses the spec's own source when it has one, otherwise the first entry
    /// of `sources`. Transport errors come back from the source untouched.
    pub fn download(&self, sources: &SourceList, path: &Path) -> Result<PathBuf> {
        let source = match self.spec.source() {
            Some(source) => Arc::clone(source),
            None => Arc::clone(sources.first().ok_or(Error::NoSources)?),
        };

        paths::ensure_install_dirs(path)?;

        let spec = self.full_spec()?;
        source.download(&spec, path)
    }

    /// Tagged comparison against a spec or another record
    pub fn matches(&self, other: Comparand<'_>) -> bool {
        match other {
            Comparand::Spec(spec) => self.spec == *spec,
            Comparand::Activated(spec) => self.spec == *spec,
            Comparand::Activation(record) => self == record,
            Comparand::Other => false,
        }
    }
}

impl PartialEq for ActivationRequest {
    fn eq(&self, other: &Self) -> bool {
        self.spec == other.spec && self.request == other.request
    }
}

impl Eq for ActivationRequest {}

impl Hash for ActivationRequest {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.spec.hash(state);
        self.request.hash(state);
    }
}

impl PartialEq<ActivatedSpec> for ActivationRequest {
    fn eq(&self, other: &ActivatedSpec) -> bool {
        self.spec == *other
    }
}

impl PartialEq<Specification> for ActivationRequest {
    fn eq(&self, other: &Specification) -> bool {
        self.spec == *other
    }
}

impl fmt::Display for ActivationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[Activation request {} for {}",
            self.spec.full_name(),
            self.request
        )?;

        match &self.ambiguity {
            Ambiguity::Definite => {}
            Ambiguity::PossiblyOthers => write!(f, " (others possible)")?,
            Ambiguity::OthersKnown(alternatives) => write!(
                f,
                " (others possible: {})",
                alternatives.full_names().join(", ")
            )?,
        }

        write!(f, "]")
    }
}

/// Iterator over an activation's parent chain
pub struct Ancestors<'a> {
    next: Option<&'a ActivationRequest>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a ActivationRequest;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent().map(Arc::as_ref);
        Some(current)
    }
}
