// src/spec/mod.rs

//! Package specifications
//!
//! A [`Specification`] identifies a concrete package build: name, version,
//! platform and, optionally, the source it must be fetched from. The resolver
//! activates one of three spec shapes, collected in [`ActivatedSpec`]:
//!
//! - `Installed`: a fully loaded specification
//! - `Index`: a lightweight index entry that loads its specification on demand
//! - `Vendor`: a locally pinned package, always treated as already installed

use crate::error::{Error, Result};
use crate::source::Source;
use crate::version::Version;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::Arc;

/// Target platform of a package build
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Platform independent
    #[default]
    Any,
    /// Built for a specific platform, e.g. `x86_64-linux`
    Named(String),
}

impl Platform {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "" | "any" => Platform::Any,
            other => Platform::Named(other.to_string()),
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Platform::Any)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Any => write!(f, "any"),
            Platform::Named(name) => write!(f, "{}", name),
        }
    }
}

/// Human-readable identity: `name-version`, with `-platform` for platform builds
pub fn full_name(name: &str, version: &Version, platform: &Platform) -> String {
    match platform {
        Platform::Any => format!("{name}-{version}"),
        Platform::Named(p) => format!("{name}-{version}-{p}"),
    }
}

/// A fully loaded package specification
///
/// Equality and hashing cover name, version and platform. The optional source
/// is routing information, not identity.
#[derive(Clone)]
pub struct Specification {
    pub name: String,
    pub version: Version,
    pub platform: Platform,
    source: Option<Arc<dyn Source>>,
}

impl Specification {
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
            platform: Platform::Any,
            source: None,
        }
    }

    /// Build a specification from a name and an unparsed version string
    pub fn parse(name: &str, version: &str) -> Result<Self> {
        Ok(Self::new(name, Version::parse(version)?))
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Pin this specification to a source other than the default list
    pub fn with_source(mut self, source: Arc<dyn Source>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn source(&self) -> Option<&Arc<dyn Source>> {
        self.source.as_ref()
    }

    pub fn full_name(&self) -> String {
        full_name(&self.name, &self.version, &self.platform)
    }
}

impl PartialEq for Specification {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.version == other.version && self.platform == other.platform
    }
}

impl Eq for Specification {}

impl Hash for Specification {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.version.hash(state);
        self.platform.hash(state);
    }
}

impl fmt::Debug for Specification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Specification")
            .field("name", &self.name)
            .field("version", &self.version.to_string())
            .field("platform", &self.platform)
            .field("source", &self.source.as_ref().map(|s| s.uri()))
            .finish()
    }
}

impl fmt::Display for Specification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_name())
    }
}

/// On-disk/over-the-wire specification metadata (`<full_name>.toml`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecMetadata {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub platform: Option<String>,
}

impl SpecMetadata {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::ParseError(format!("Invalid specification metadata: {e}")))
    }

    pub fn into_specification(self) -> Result<Specification> {
        let platform = self
            .platform
            .as_deref()
            .map(Platform::parse)
            .unwrap_or_default();

        Ok(Specification::parse(&self.name, &self.version)?.with_platform(platform))
    }
}

impl From<&Specification> for SpecMetadata {
    fn from(spec: &Specification) -> Self {
        Self {
            name: spec.name.clone(),
            version: spec.version.to_string(),
            platform: match &spec.platform {
                Platform::Any => None,
                Platform::Named(p) => Some(p.clone()),
            },
        }
    }
}

/// An index entry that knows its identity and source but not its full specification
#[derive(Clone)]
pub struct IndexSpecification {
    pub name: String,
    pub version: Version,
    pub platform: Platform,
    source: Arc<dyn Source>,
}

impl IndexSpecification {
    pub fn new(
        name: impl Into<String>,
        version: Version,
        platform: Platform,
        source: Arc<dyn Source>,
    ) -> Self {
        Self {
            name: name.into(),
            version,
            platform,
            source,
        }
    }

    pub fn source(&self) -> &Arc<dyn Source> {
        &self.source
    }

    pub fn full_name(&self) -> String {
        full_name(&self.name, &self.version, &self.platform)
    }

    /// Load the full specification from the owning source
    pub fn spec(&self) -> Result<Specification> {
        let loaded = self
            .source
            .fetch_spec(&self.name, &self.version, &self.platform)?
            .ok_or_else(|| {
                Error::UnresolvableSpec(format!("{} from {}", self.full_name(), self.source.uri()))
            })?;

        if loaded.name != self.name
            || loaded.version != self.version
            || loaded.platform != self.platform
        {
            return Err(Error::UnresolvableSpec(format!(
                "{} from {} describes {}",
                self.full_name(),
                self.source.uri(),
                loaded.full_name()
            )));
        }

        Ok(match loaded.source {
            Some(_) => loaded,
            None => loaded.with_source(Arc::clone(&self.source)),
        })
    }
}

impl PartialEq for IndexSpecification {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.version == other.version
            && self.platform == other.platform
            && self.source.uri() == other.source.uri()
    }
}

impl Eq for IndexSpecification {}

impl Hash for IndexSpecification {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.version.hash(state);
        self.platform.hash(state);
        self.source.uri().hash(state);
    }
}

impl fmt::Debug for IndexSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexSpecification")
            .field("name", &self.name)
            .field("version", &self.version.to_string())
            .field("platform", &self.platform)
            .field("source", &self.source.uri())
            .finish()
    }
}

/// A package supplied from a local directory and pinned there
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VendorSpecification {
    pub spec: Specification,
    pub directory: PathBuf,
}

impl VendorSpecification {
    pub fn new(spec: Specification, directory: impl Into<PathBuf>) -> Self {
        Self {
            spec,
            directory: directory.into(),
        }
    }
}

/// The spec shapes the resolver can activate
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActivatedSpec {
    Installed(Specification),
    Index(IndexSpecification),
    Vendor(VendorSpecification),
}

impl ActivatedSpec {
    pub fn name(&self) -> &str {
        match self {
            ActivatedSpec::Installed(s) => &s.name,
            ActivatedSpec::Index(s) => &s.name,
            ActivatedSpec::Vendor(v) => &v.spec.name,
        }
    }

    pub fn version(&self) -> &Version {
        match self {
            ActivatedSpec::Installed(s) => &s.version,
            ActivatedSpec::Index(s) => &s.version,
            ActivatedSpec::Vendor(v) => &v.spec.version,
        }
    }

    pub fn platform(&self) -> &Platform {
        match self {
            ActivatedSpec::Installed(s) => &s.platform,
            ActivatedSpec::Index(s) => &s.platform,
            ActivatedSpec::Vendor(v) => &v.spec.platform,
        }
    }

    pub fn full_name(&self) -> String {
        full_name(self.name(), self.version(), self.platform())
    }

    /// Source this spec must be fetched from, if it overrides the default list
    pub fn source(&self) -> Option<&Arc<dyn Source>> {
        match self {
            ActivatedSpec::Installed(s) => s.source(),
            ActivatedSpec::Index(s) => Some(s.source()),
            ActivatedSpec::Vendor(v) => v.spec.source(),
        }
    }

    /// Vendored packages need no installation
    pub fn is_always_satisfied(&self) -> bool {
        matches!(self, ActivatedSpec::Vendor(_))
    }

    /// Resolve to the canonical specification, loading index entries on demand
    pub fn full_spec(&self) -> Result<Cow<'_, Specification>> {
        match self {
            ActivatedSpec::Installed(s) => Ok(Cow::Borrowed(s)),
            ActivatedSpec::Vendor(v) => Ok(Cow::Borrowed(&v.spec)),
            ActivatedSpec::Index(s) => s.spec().map(Cow::Owned),
        }
    }
}

impl PartialEq<Specification> for ActivatedSpec {
    fn eq(&self, other: &Specification) -> bool {
        matches!(self, ActivatedSpec::Installed(s) if s == other)
    }
}

impl From<Specification> for ActivatedSpec {
    fn from(spec: Specification) -> Self {
        ActivatedSpec::Installed(spec)
    }
}

impl From<IndexSpecification> for ActivatedSpec {
    fn from(spec: IndexSpecification) -> Self {
        ActivatedSpec::Index(spec)
    }
}

impl From<VendorSpecification> for ActivatedSpec {
    fn from(spec: VendorSpecification) -> Self {
        ActivatedSpec::Vendor(spec)
    }
}

impl fmt::Display for ActivatedSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_name())
    }
}
