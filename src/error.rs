//! Error types for the resolver core.

use thiserror::Error;

use crate::item::ItemId;

/// Result type alias for resolver operations.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// The failure taxonomy surfaced by the resolver core (see spec §7).
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("invalid version: {0}")]
    InvalidVersion(String),

    #[error("invalid version constraint: {0}")]
    InvalidConstraint(String),

    #[error("mod not found: {id}{}", version.as_deref().map(|v| format!("@{v}")).unwrap_or_default())]
    ModNotFound { id: ItemId, version: Option<String> },

    #[error("invalid lockfile operation: {0}")]
    InvalidLockfileOperation(String),

    #[error(
        "{depender}@{depender_version} requires {dep_id} {constraint}, but {dep_id}@{dep_version} \
         is pinned by the manifest; you must manually adjust {dep_id}"
    )]
    DependencyManifestMismatch {
        dep_id: ItemId,
        dep_version: String,
        depender: ItemId,
        depender_version: String,
        constraint: String,
    },

    #[error("no version of {dep_id} satisfies the constraints required by {depender}")]
    UnsolvableDependency { dep_id: ItemId, depender: ItemId },

    #[error("resolution was cancelled")]
    Cancelled,

    #[error("catalog error: {0}")]
    Catalog(String),

    #[error("mod cache error: {0}")]
    ModCache(String),

    #[error("lockfile is corrupted or invalid: {0}")]
    InvalidLockfile(String),
}

impl ResolveError {
    pub fn catalog<S: Into<String>>(msg: S) -> Self {
        ResolveError::Catalog(msg.into())
    }

    pub fn mod_cache<S: Into<String>>(msg: S) -> Self {
        ResolveError::ModCache(msg.into())
    }
}
