// src/error.rs

//! Error types for depsolve
//!
//! A single crate-wide error enum. Variants carry a formatted message with
//! enough context (package full name, URI, path) to be shown to a user as-is.

use thiserror::Error;

/// Errors produced by activation records and their collaborators
#[derive(Error, Debug)]
pub enum Error {
    /// Initialization failed (HTTP client, database handle, ...)
    #[error("Initialization error: {0}")]
    InitError(String),

    /// Filesystem I/O with context
    #[error("I/O error: {0}")]
    IoError(String),

    /// Transport failure while fetching from a source
    #[error("Download error: {0}")]
    DownloadError(String),

    /// Malformed version, requirement, or metadata
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Requested item does not exist at the source
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A spec proxy could not be resolved to a full specification
    #[error("Cannot resolve specification for {0}")]
    UnresolvableSpec(String),

    /// No per-spec source and the default source list is empty
    #[error("No package sources configured")]
    NoSources,

    /// Installed-state database failure
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// Raw I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
