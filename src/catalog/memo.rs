//! TTL-memoizing `Catalog` decorator (spec §5, "Shared resources").
//!
//! Mirrors the shape of the teacher crate's `CacheManager::get_metadata` /
//! `store_metadata` TTL check, but keyed per call-and-arguments rather than per
//! package name, and with an injectable clock so tests advance time deterministically
//! instead of sleeping.

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, LoaderInfo, ModMeta};
use crate::error::ResolveResult;
use crate::item::ItemId;

/// Default memoization window for Catalog responses (spec §5: "5-minute TTL").
pub const DEFAULT_TTL_SECS: u64 = 300;

/// A source of the current time, abstracted so tests don't have to sleep.
pub trait Clock {
    fn now_secs(&self) -> u64;
}

/// The real wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// A clock that only advances when told to, for deterministic TTL-expiry tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: RefCell<u64>,
}

impl ManualClock {
    pub fn new(start: u64) -> Self {
        Self { now: RefCell::new(start) }
    }

    pub fn advance(&self, secs: u64) {
        *self.now.borrow_mut() += secs;
    }
}

impl Clock for ManualClock {
    fn now_secs(&self) -> u64 {
        *self.now.borrow()
    }
}

/// Configuration for [`MemoizingCatalog`], deserializable from the same small
/// TOML-config shape the rest of the ambient stack uses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoConfig {
    pub ttl_secs: u64,
}

impl Default for MemoConfig {
    fn default() -> Self {
        Self { ttl_secs: DEFAULT_TTL_SECS }
    }
}

struct Entry<T> {
    value: T,
    cached_at: u64,
}

/// Wraps an inner `Catalog` with a per-request-key TTL memoization layer. The resolver
/// never touches this cache directly (spec §5); it only ever sees the `Catalog` trait.
pub struct MemoizingCatalog<C, K = SystemClock> {
    inner: C,
    clock: K,
    config: MemoConfig,
    versions: RefCell<HashMap<(ItemId, Vec<String>), Entry<Vec<String>>>>,
    metadata: RefCell<HashMap<(ItemId, String), Entry<ModMeta>>>,
    loader_versions: RefCell<HashMap<(), Entry<Vec<LoaderInfo>>>>,
    loader_info: RefCell<HashMap<String, Entry<Option<LoaderInfo>>>>,
}

impl<C: Catalog> MemoizingCatalog<C, SystemClock> {
    pub fn new(inner: C) -> Self {
        Self::with_config(inner, MemoConfig::default())
    }

    pub fn with_config(inner: C, config: MemoConfig) -> Self {
        Self::with_clock(inner, config, SystemClock)
    }
}

impl<C: Catalog, K: Clock> MemoizingCatalog<C, K> {
    pub fn with_clock(inner: C, config: MemoConfig, clock: K) -> Self {
        Self {
            inner,
            clock,
            config,
            versions: RefCell::new(HashMap::new()),
            metadata: RefCell::new(HashMap::new()),
            loader_versions: RefCell::new(HashMap::new()),
            loader_info: RefCell::new(HashMap::new()),
        }
    }

    fn fresh(&self, cached_at: u64) -> bool {
        self.clock.now_secs().saturating_sub(cached_at) < self.config.ttl_secs
    }
}

impl<C: Catalog, K: Clock> Catalog for MemoizingCatalog<C, K> {
    fn list_matching_versions(&self, id: &ItemId, constraints: &[String]) -> ResolveResult<Vec<String>> {
        let key = (id.clone(), constraints.to_vec());
        if let Some(entry) = self.versions.borrow().get(&key) {
            if self.fresh(entry.cached_at) {
                return Ok(entry.value.clone());
            }
        }

        let value = self.inner.list_matching_versions(id, constraints)?;
        self.versions.borrow_mut().insert(
            key,
            Entry { value: value.clone(), cached_at: self.clock.now_secs() },
        );
        Ok(value)
    }

    fn get_mod_metadata(&self, id: &ItemId, version: &str) -> ResolveResult<ModMeta> {
        let key = (id.clone(), version.to_string());
        if let Some(entry) = self.metadata.borrow().get(&key) {
            if self.fresh(entry.cached_at) {
                return Ok(entry.value.clone());
            }
        }

        let value = self.inner.get_mod_metadata(id, version)?;
        self.metadata.borrow_mut().insert(
            key,
            Entry { value: value.clone(), cached_at: self.clock.now_secs() },
        );
        Ok(value)
    }

    fn list_loader_versions(&self) -> ResolveResult<Vec<LoaderInfo>> {
        if let Some(entry) = self.loader_versions.borrow().get(&()) {
            if self.fresh(entry.cached_at) {
                return Ok(entry.value.clone());
            }
        }

        let value = self.inner.list_loader_versions()?;
        self.loader_versions.borrow_mut().insert(
            (),
            Entry { value: value.clone(), cached_at: self.clock.now_secs() },
        );
        Ok(value)
    }

    fn get_loader_info(&self, version: &str) -> ResolveResult<Option<LoaderInfo>> {
        if let Some(entry) = self.loader_info.borrow().get(version) {
            if self.fresh(entry.cached_at) {
                return Ok(entry.value.clone());
            }
        }

        let value = self.inner.get_loader_info(version)?;
        self.loader_info.borrow_mut().insert(
            version.to_string(),
            Entry { value: value.clone(), cached_at: self.clock.now_secs() },
        );
        Ok(value)
    }
}
