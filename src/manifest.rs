//! The user-facing manifest (`mods.toml`), an ambient addition over the distilled
//! spec (SPEC_FULL.md §3): it is the thing a human edits, and the resolver's
//! `isInManifest` flag is derived from it rather than invented out of thin air.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ResolveResult;
use crate::graph::ResolutionGraph;
use crate::item::{ItemId, SATISFACTORY_GAME, SML};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSection {
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderSection {
    pub version: String,
}

/// `mods.toml`:
/// ```toml
/// [game]
/// version = "109000"
///
/// [loader]
/// version = "2.0.0"
///
/// [mods]
/// dummyMod1 = "^1.0.0"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub game: GameSection,
    pub loader: LoaderSection,
    #[serde(default)]
    pub mods: BTreeMap<ItemId, String>,
}

impl Manifest {
    pub fn load(path: impl AsRef<Path>) -> ResolveResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> ResolveResult<()> {
        let text = toml::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Every constraint this manifest pins directly, in ascending id order (the
    /// deterministic visit order called out in SPEC_FULL.md §5): `SatisfactoryGame`
    /// and `SML` first, then the declared mods.
    pub fn entries(&self) -> impl Iterator<Item = (ItemId, String)> + '_ {
        std::iter::once((ItemId::new(SATISFACTORY_GAME), self.game.version.clone()))
            .chain(std::iter::once((ItemId::new(SML), self.loader.version.clone())))
            .chain(self.mods.iter().map(|(id, constraint)| (id.clone(), constraint.clone())))
    }

    /// Re-derive `Node::is_in_manifest` across `graph` to exactly the ids this
    /// manifest names. Nodes not present in the graph yet are left alone; callers run
    /// resolution first and this afterwards.
    pub fn apply_to_graph(&self, graph: &mut ResolutionGraph) {
        let pinned: std::collections::BTreeSet<ItemId> = self.entries().map(|(id, _)| id).collect();
        let ids: Vec<ItemId> = graph.nodes().map(|n| n.id.clone()).collect();
        for id in ids {
            let should_pin = pinned.contains(&id);
            if let Some(node) = graph.get(&id) {
                if node.is_in_manifest != should_pin {
                    let mut updated = node.clone();
                    updated.is_in_manifest = should_pin;
                    graph.remove(&id);
                    graph.add(updated);
                }
            }
        }
    }
}
