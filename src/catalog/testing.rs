//! In-memory fakes for the `Catalog`/`ModCache` boundary.
//!
//! Exposed as a non-`#[cfg(test)]` `pub mod` (rather than gated behind the `test`
//! cfg) so both unit tests in this crate and the integration tests in `tests/` can
//! build scenarios against the exact table in spec §8 without standing up a mock HTTP
//! server — the boundary is already a trait object, not a transport.

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::catalog::{Catalog, LoaderInfo, ModMeta};
use crate::error::{ResolveError, ResolveResult};
use crate::item::ItemId;
use crate::version;

/// An in-memory stand-in for a networked mod catalog.
#[derive(Debug, Default)]
pub struct FakeCatalog {
    mods: RefCell<BTreeMap<ItemId, BTreeMap<String, ModMeta>>>,
    loader: RefCell<Vec<LoaderInfo>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a published mod version and its declared dependencies.
    pub fn with_mod_version(
        self,
        id: impl Into<ItemId>,
        version: impl Into<String>,
        dependencies: impl IntoIterator<Item = (&'static str, &'static str)>,
        sml_version: Option<&str>,
    ) -> Self {
        let id = id.into();
        let version = version.into();
        let meta = ModMeta {
            mod_id: id.clone(),
            version: version.clone(),
            dependencies: dependencies
                .into_iter()
                .map(|(k, v)| (ItemId::new(k), v.to_string()))
                .collect(),
            sml_version: sml_version.map(str::to_string),
        };
        self.mods.borrow_mut().entry(id).or_default().insert(version, meta);
        self
    }

    /// Register a published loader version and the minimum game version it requires.
    pub fn with_loader_version(self, version: impl Into<String>, game_version: impl Into<String>) -> Self {
        self.loader.borrow_mut().push(LoaderInfo {
            version: version.into(),
            game_version: game_version.into(),
        });
        self
    }

    /// Builds the catalog used by the scenario table in spec §8: SML has versions
    /// `1.0.0`, `1.0.1`, `2.0.0`, each declaring a minimum game version of `109000`;
    /// `6vQ6ckVYFiidDh` publishes `1.4.1` with no dependencies; `dummyMod1` publishes
    /// four versions with increasingly demanding constraints on both. `1.0.0`'s
    /// `^1.5.0` constraint on `6vQ6ckVYFiidDh` is deliberately outside the manifest's
    /// `1.4.1` pin (unlike `1.0.1`/`1.0.2`'s `^1.2.0`/`^1.3.0`, which are inside it) so
    /// installing it actually triggers `DependencyManifestMismatch`.
    pub fn scenario() -> Self {
        Self::new()
            .with_loader_version("1.0.0", "109000")
            .with_loader_version("1.0.1", "109000")
            .with_loader_version("2.0.0", "109000")
            .with_mod_version("6vQ6ckVYFiidDh", "1.4.1", [], None)
            .with_mod_version(
                "dummyMod1",
                "1.0.0",
                [("6vQ6ckVYFiidDh", "^1.5.0")],
                Some("2.0.0"),
            )
            .with_mod_version(
                "dummyMod1",
                "1.0.1",
                [("6vQ6ckVYFiidDh", "^1.2.0")],
                Some(">=1.0.0"),
            )
            .with_mod_version(
                "dummyMod1",
                "1.0.2",
                [("6vQ6ckVYFiidDh", "^1.3.0")],
                Some("1.0.1"),
            )
            .with_mod_version(
                "dummyMod1",
                "1.0.3",
                [("6vQ6ckVYFiidDh", "^1.5.2")],
                Some("^1.0.0"),
            )
    }

    /// A `ModCache` view onto the same metadata this catalog publishes.
    pub fn mod_cache(&self) -> FakeModCache {
        FakeModCache { mods: self.mods.borrow().clone() }
    }
}

impl Catalog for FakeCatalog {
    fn list_matching_versions(&self, id: &ItemId, constraints: &[String]) -> ResolveResult<Vec<String>> {
        if id.is_loader() {
            let loader = self.loader.borrow();
            if loader.is_empty() {
                return Err(ResolveError::ModNotFound { id: id.clone(), version: None });
            }
            return loader
                .iter()
                .filter(|info| matches_all(&info.version, constraints))
                .map(|info| Ok(info.version.clone()))
                .collect();
        }

        let mods = self.mods.borrow();
        let versions = mods
            .get(id)
            .ok_or_else(|| ResolveError::ModNotFound { id: id.clone(), version: None })?;

        versions
            .keys()
            .filter(|v| matches_all(v, constraints))
            .map(|v| Ok(v.clone()))
            .collect()
    }

    fn get_mod_metadata(&self, id: &ItemId, version: &str) -> ResolveResult<ModMeta> {
        self.mods
            .borrow()
            .get(id)
            .and_then(|versions| versions.get(version))
            .cloned()
            .ok_or_else(|| ResolveError::ModNotFound { id: id.clone(), version: Some(version.to_string()) })
    }

    fn list_loader_versions(&self) -> ResolveResult<Vec<LoaderInfo>> {
        Ok(self.loader.borrow().clone())
    }

    fn get_loader_info(&self, version: &str) -> ResolveResult<Option<LoaderInfo>> {
        Ok(self.loader.borrow().iter().find(|info| info.version == version).cloned())
    }
}

fn matches_all(version_str: &str, constraints: &[String]) -> bool {
    let Ok(v) = version::parse(version_str) else { return false };
    version::satisfies_all(&v, constraints).unwrap_or(false)
}

/// An in-memory stand-in for the on-disk mod cache.
#[derive(Debug, Default)]
pub struct FakeModCache {
    mods: BTreeMap<ItemId, BTreeMap<String, ModMeta>>,
}

impl crate::catalog::ModCache for FakeModCache {
    fn get_metadata(&self, id: &ItemId, version: &str) -> ResolveResult<ModMeta> {
        self.mods
            .get(id)
            .and_then(|versions| versions.get(version))
            .cloned()
            .ok_or_else(|| ResolveError::ModNotFound { id: id.clone(), version: Some(version.to_string()) })
    }
}
