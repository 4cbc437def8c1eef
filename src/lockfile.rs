//! The lockfile codec and diff algorithm (spec §4.6, §6).

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ResolveResult;
use crate::item::ItemId;

/// One pinned entry in a lockfile: the exact version installed and the exact
/// constraint strings it was resolved against (spec §6).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LockedItem {
    pub version: String,
    #[serde(default)]
    pub dependencies: BTreeMap<ItemId, String>,
}

/// A full lockfile: `{"<id>": {"version": ..., "dependencies": {...}}, ...}` (spec §6).
/// Serialized as JSON, matching the teacher's `Lockfile`/`package-lock.json` shape.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lockfile {
    items: BTreeMap<ItemId, LockedItem>,
}

/// The install/uninstall sets between two lockfiles (spec §4.6).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LockDiff {
    /// Ids present in `new` that were absent from `old`, or whose version changed.
    pub install: BTreeMap<ItemId, String>,
    /// Ids present in `old` that are absent from `new`, or whose version changed.
    pub uninstall: Vec<ItemId>,
}

impl Lockfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: impl AsRef<Path>) -> ResolveResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> ResolveResult<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    pub fn get(&self, id: &ItemId) -> Option<&LockedItem> {
        self.items.get(id)
    }

    pub fn insert(&mut self, id: ItemId, item: LockedItem) {
        self.items.insert(id, item);
    }

    pub fn remove(&mut self, id: &ItemId) -> Option<LockedItem> {
        self.items.remove(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, &LockedItem)> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Compute the set of ids to uninstall and install to move from `self` to `new`
    /// (spec §4.6): `uninstall` is every id in `self` that is absent, or whose version
    /// changed, in `new`; `install` is every id in `new` that is absent, or whose
    /// version changed, from `self`. A version change therefore appears in both sets.
    pub fn diff(&self, new: &Lockfile) -> LockDiff {
        let mut uninstall = Vec::new();
        for (id, old_item) in self.iter() {
            match new.get(id) {
                None => uninstall.push(id.clone()),
                Some(new_item) if new_item.version != old_item.version => uninstall.push(id.clone()),
                Some(_) => {}
            }
        }

        let mut install = BTreeMap::new();
        for (id, new_item) in new.iter() {
            match self.get(id) {
                None => {
                    install.insert(id.clone(), new_item.version.clone());
                }
                Some(old_item) if old_item.version != new_item.version => {
                    install.insert(id.clone(), new_item.version.clone());
                }
                Some(_) => {}
            }
        }

        LockDiff { install, uninstall }
    }
}
