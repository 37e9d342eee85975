// src/lib.rs

//! Depsolve
//!
//! Bookkeeping for a backtracking dependency resolver. Each decision the
//! resolver makes is an [`ActivationRequest`]: a spec, the dependency request
//! that asked for it, and whether other candidates existed.
//!
//! # Architecture
//!
//! - `activation`: the record itself, its equality and parent chain
//! - `spec` / `request`: what was chosen and why
//! - `source`: where packages are downloaded from (local directory or HTTP)
//! - `installed`: what is already present (in memory or SQLite)
//! - `config`: the default source list, loaded from TOML

pub mod activation;
pub mod config;
mod error;
pub mod installed;
pub mod paths;
pub mod request;
pub mod source;
pub mod spec;
pub mod version;

pub use activation::{ActivationRequest, Alternatives, Ambiguity, Ancestors, Comparand};
pub use config::SourcesConfig;
pub use error::{Error, Result};
pub use installed::{InstalledDb, InstalledSet, InstalledSpecs};
pub use request::{Dependency, DependencyKind, DependencyRequest};
pub use source::{LocalSource, RemoteSource, Source, SourceList};
pub use spec::{ActivatedSpec, IndexSpecification, Platform, Specification, VendorSpecification};
pub use version::{Requirement, Version};
