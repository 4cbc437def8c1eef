//! The `Catalog` and `ModCache` boundary (spec §4.2, §6).
//!
//! This crate owns the trait definitions, a TTL-memoizing decorator, and the fakes
//! used by the test suite. A networked registry client or an unzip-based mod cache is
//! a caller concern (spec §1) and lives outside this crate; it only needs to implement
//! [`Catalog`] / [`ModCache`].

pub mod memo;
pub mod testing;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ResolveResult;
use crate::item::ItemId;

pub use memo::MemoizingCatalog;

/// A single published version of the loader, and the minimum game version it declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderInfo {
    pub version: String,
    /// May be a bare integer (e.g. `"109000"`); coerced by [`crate::version::coerce`].
    pub game_version: String,
}

/// Dependency metadata for a single (mod, version) pair, as returned by a `ModCache`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModMeta {
    pub mod_id: ItemId,
    pub version: String,
    /// Missing in the source payload is treated as the empty map (spec §4.3).
    #[serde(default)]
    pub dependencies: BTreeMap<ItemId, String>,
    /// The loader constraint this mod declares, if any.
    #[serde(default)]
    pub sml_version: Option<String>,
}

/// Enumerates available versions and fetches dependency metadata for the mod loader.
///
/// Implementations are expected to be authoritative-but-possibly-stale (spec §7): a
/// version returned here that later 404s at `getModMetadata` is reported as
/// `ModNotFound`, not silently skipped.
pub trait Catalog {
    /// Versions of `id` matching every constraint in `constraints`, in any order (the
    /// resolver sorts). Must return `Ok(vec![])`, not an error, when nothing matches.
    /// Must raise `ModNotFound` when `id` has no published versions at all.
    fn list_matching_versions(&self, id: &ItemId, constraints: &[String]) -> ResolveResult<Vec<String>>;

    /// Dependency metadata for one (mod, version) pair. Used for every id except `SML`
    /// and `SatisfactoryGame`, which the resolver never routes here.
    fn get_mod_metadata(&self, id: &ItemId, version: &str) -> ResolveResult<ModMeta>;

    /// All published loader versions.
    fn list_loader_versions(&self) -> ResolveResult<Vec<LoaderInfo>>;

    /// A single loader version's info, or `None` if unpublished.
    fn get_loader_info(&self, version: &str) -> ResolveResult<Option<LoaderInfo>>;
}

impl<T: Catalog + ?Sized> Catalog for &T {
    fn list_matching_versions(&self, id: &ItemId, constraints: &[String]) -> ResolveResult<Vec<String>> {
        (**self).list_matching_versions(id, constraints)
    }

    fn get_mod_metadata(&self, id: &ItemId, version: &str) -> ResolveResult<ModMeta> {
        (**self).get_mod_metadata(id, version)
    }

    fn list_loader_versions(&self) -> ResolveResult<Vec<LoaderInfo>> {
        (**self).list_loader_versions()
    }

    fn get_loader_info(&self, version: &str) -> ResolveResult<Option<LoaderInfo>> {
        (**self).get_loader_info(version)
    }
}

/// Downloads and unzips a mod on cache miss, returning its parsed metadata.
pub trait ModCache {
    fn get_metadata(&self, id: &ItemId, version: &str) -> ResolveResult<ModMeta>;
}

impl<T: ModCache + ?Sized> ModCache for &T {
    fn get_metadata(&self, id: &ItemId, version: &str) -> ResolveResult<ModMeta> {
        (**self).get_metadata(id, version)
    }
}
