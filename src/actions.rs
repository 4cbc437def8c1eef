//! User-facing install/uninstall/update actions (spec §4.5 "Manifest operations").
//!
//! The spec describes this as belonging to "the orchestration layer (not this core)",
//! but ties it so directly to `ResolutionGraph::snapshot`/`restore` and
//! `Manifest::apply_to_graph` that it is included here as a thin convenience rather
//! than left for every caller to hand-roll.

use crate::catalog::{Catalog, ModCache};
use crate::error::ResolveResult;
use crate::graph::{Node, ResolutionGraph};
use crate::item::ItemId;
use crate::manifest::Manifest;
use crate::resolver::{get_item_data, Resolver};
use crate::version;

/// The manifest and its resolved graph, kept in lockstep.
pub struct Workspace {
    pub manifest: Manifest,
    pub graph: ResolutionGraph,
}

impl Workspace {
    pub fn new(manifest: Manifest, graph: ResolutionGraph) -> Self {
        Self { manifest, graph }
    }

    /// Pin `id` at exactly `version` in the manifest, pre-insert it into the graph as a
    /// manifest node, then re-validate. On any error the manifest and graph are
    /// restored to their pre-call state and the error is propagated.
    pub fn install<C: Catalog, M: ModCache>(
        &mut self,
        resolver: &Resolver<'_, C, M>,
        id: impl Into<ItemId>,
        version_str: impl Into<String>,
    ) -> ResolveResult<()> {
        let id = id.into();
        let version_str = version_str.into();
        let manifest_snapshot = self.manifest.mods.clone();
        let graph_snapshot = self.graph.snapshot();

        self.manifest.mods.insert(id.clone(), version_str.clone());
        self.graph.remove(&id);

        let result = get_item_data(resolver.catalog(), resolver.mod_cache(), &id, &version_str).map(|node| {
            self.graph.add(node.manifest(true));
            self.manifest.apply_to_graph(&mut self.graph);
        });

        let result = result.and_then(|()| resolver.validate_all(&mut self.graph));

        match result {
            Ok(()) => {
                self.graph.cleanup();
                Ok(())
            }
            Err(err) => {
                self.manifest.mods = manifest_snapshot;
                self.graph.restore(graph_snapshot);
                Err(err)
            }
        }
    }

    /// Remove `id` from the manifest and try to drop it from the graph. Refused
    /// (a no-op) when other installed items still depend on it (spec §8 scenario 6).
    pub fn uninstall<C: Catalog, M: ModCache>(
        &mut self,
        resolver: &Resolver<'_, C, M>,
        id: &ItemId,
    ) -> ResolveResult<()> {
        if !self.graph.dependants_of(id).is_empty() {
            return Ok(());
        }

        self.manifest.mods.remove(id);
        self.manifest.apply_to_graph(&mut self.graph);
        self.graph.cleanup();
        resolver.validate_all(&mut self.graph)
    }

    /// Re-resolve `id` to the newest version still satisfying its existing manifest
    /// constraint and every other declared dependency on it.
    pub fn update<C: Catalog, M: ModCache>(
        &mut self,
        resolver: &Resolver<'_, C, M>,
        id: &ItemId,
    ) -> ResolveResult<()> {
        let graph_snapshot = self.graph.snapshot();
        let was_in_manifest = self.graph.get(id).map(|n| n.is_in_manifest).unwrap_or(false);

        if let Some(node) = self.graph.get(id) {
            let mut relaxed = node.clone();
            relaxed.is_in_manifest = false;
            self.graph.remove(id);
            self.graph.add(relaxed);
        }

        match resolver.validate_all(&mut self.graph) {
            Ok(()) => {
                if was_in_manifest {
                    self.manifest.apply_to_graph(&mut self.graph);
                }
                self.graph.cleanup();
                Ok(())
            }
            Err(err) => {
                self.graph.restore(graph_snapshot);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::testing::FakeCatalog;
    use crate::item::SATISFACTORY_GAME;
    use crate::manifest::{GameSection, LoaderSection};
    use std::collections::BTreeMap;

    fn empty_workspace() -> Workspace {
        let manifest = Manifest {
            game: GameSection { version: "109000".to_string() },
            loader: LoaderSection { version: "2.0.0".to_string() },
            mods: BTreeMap::new(),
        };
        let mut graph = ResolutionGraph::new();
        graph.add(Node::new(SATISFACTORY_GAME, version::parse("109000.0.0").unwrap()).manifest(true));
        Workspace::new(manifest, graph)
    }

    #[test]
    fn scenario_6_uninstall_with_dependants_is_refused() {
        let catalog = FakeCatalog::scenario();
        let mod_cache = catalog.mod_cache();
        let resolver = Resolver::new(&catalog, &mod_cache);
        let mut ws = empty_workspace();

        ws.install(&resolver, "6vQ6ckVYFiidDh", "1.4.1").unwrap();
        let mut deps = BTreeMap::new();
        deps.insert(ItemId::new("6vQ6ckVYFiidDh"), "^1.2.0".to_string());
        deps.insert(ItemId::new(crate::item::SML), ">=1.0.0".to_string());
        ws.manifest.mods.insert(ItemId::new("dummyMod1"), "^1.0.1".to_string());
        ws.graph.add(Node::new("dummyMod1", version::parse("1.0.1").unwrap()).with_dependencies(deps).manifest(true));
        resolver.validate_all(&mut ws.graph).unwrap();

        let before = ws.graph.get(&ItemId::new("6vQ6ckVYFiidDh")).unwrap().clone();
        ws.uninstall(&resolver, &ItemId::new("6vQ6ckVYFiidDh")).unwrap();
        let after = ws.graph.get(&ItemId::new("6vQ6ckVYFiidDh")).unwrap();
        assert_eq!(before.version, after.version);
        assert_eq!(ws.graph.len(), 4);
    }

    #[test]
    fn install_failure_restores_prior_state() {
        let catalog = FakeCatalog::scenario();
        let mod_cache = catalog.mod_cache();
        let resolver = Resolver::new(&catalog, &mod_cache);
        let mut ws = empty_workspace();
        ws.install(&resolver, "6vQ6ckVYFiidDh", "1.4.1").unwrap();

        let before_len = ws.graph.len();
        let err = ws.install(&resolver, "dummyMod1", "1.0.0");
        assert!(err.is_err());
        assert_eq!(ws.graph.len(), before_len);
        assert!(ws.graph.get(&ItemId::new("dummyMod1")).is_none());
    }
}
