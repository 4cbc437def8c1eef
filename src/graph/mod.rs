//! The resolution graph (spec §3, §4.4).

use std::collections::{BTreeMap, HashMap};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use semver::Version;
use tracing::debug;

use crate::item::ItemId;
use crate::lockfile::{Lockfile, LockedItem};
use crate::version;

/// A single pinned item in the graph (spec §3 "Node").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: ItemId,
    pub version: Version,
    /// Exact constraint strings as declared by the item, keyed by dependency id.
    pub dependencies: BTreeMap<ItemId, String>,
    /// `true` iff a user-visible manifest entry pinned this item. Sticky: the resolver
    /// never removes or version-mutates a manifest node (spec invariant 3).
    pub is_in_manifest: bool,
}

impl Node {
    pub fn new(id: impl Into<ItemId>, version: Version) -> Self {
        Self { id: id.into(), version, dependencies: BTreeMap::new(), is_in_manifest: false }
    }

    pub fn with_dependencies(mut self, dependencies: BTreeMap<ItemId, String>) -> Self {
        self.dependencies = dependencies;
        self
    }

    pub fn manifest(mut self, is_in_manifest: bool) -> Self {
        self.is_in_manifest = is_in_manifest;
        self
    }
}

/// In-memory multigraph of pinned items, with the invariants of spec §3 enforced by
/// construction rather than checked after the fact: `add` is id-idempotent, `remove`
/// never touches a manifest node (callers must not ask it to), and `cleanup` is the
/// only operation that drops nodes based on reachability.
///
/// Backed by a `petgraph::DiGraph` keyed through an id→index map (spec §9: "use a map
/// keyed by id for O(1) lookup"), with edges running depender→dependency. Edges are
/// rebuilt from the authoritative `Node::dependencies` maps after every mutation
/// (cheap for the tens-of-nodes graphs this resolver handles) rather than maintained
/// incrementally, so a dependency edge can never go stale relative to the node data.
#[derive(Debug, Default)]
pub struct ResolutionGraph {
    graph: DiGraph<Node, ()>,
    index: HashMap<ItemId, NodeIndex>,
}

impl ResolutionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate a graph from a prior lockfile; no entry is marked `is_in_manifest`
    /// (spec §3 "Lifecycle" — callers re-derive manifest flags afterwards).
    pub fn load_from_lockfile(lock: &Lockfile) -> Self {
        let mut graph = Self::new();
        for (id, locked) in lock.iter() {
            if let Ok(v) = version::parse(&locked.version) {
                graph.add(Node::new(id.clone(), v).with_dependencies(locked.dependencies.clone()));
            }
        }
        graph
    }

    /// Serialize the current nodes back to a lockfile (manifest membership is not
    /// serialized, spec §3).
    pub fn to_lockfile(&self) -> Lockfile {
        let mut lock = Lockfile::new();
        for node in self.nodes() {
            lock.insert(
                node.id.clone(),
                LockedItem { version: node.version.to_string(), dependencies: node.dependencies.clone() },
            );
        }
        lock
    }

    /// Insert `node` unless a node with the same id already exists, in which case this
    /// is a no-op (spec §4.4 "add") that the resolver relies on for safe re-insertion
    /// during backtracking.
    pub fn add(&mut self, node: Node) {
        if self.index.contains_key(&node.id) {
            debug!(id = %node.id, "add: node already present, ignoring");
            return;
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.index.insert(id, idx);
        self.reconcile_edges();
    }

    /// Remove the node with id `id`, if any. Fails silently if absent (spec §4.4).
    pub fn remove(&mut self, id: &ItemId) -> Option<Node> {
        let idx = self.index.remove(id)?;
        let node = self.graph.remove_node(idx);
        // Removing a node shifts the last node's index in petgraph; re-sync.
        self.reindex();
        self.reconcile_edges();
        node
    }

    pub fn get(&self, id: &ItemId) -> Option<&Node> {
        self.index.get(id).map(|&idx| &self.graph[idx])
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.index.contains_key(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// All nodes whose dependency map names `id` (spec §4.4 "dependantsOf").
    pub fn dependants_of(&self, id: &ItemId) -> Vec<&Node> {
        self.nodes().filter(|n| n.dependencies.contains_key(id)).collect()
    }

    /// Nodes with no dependants (spec §4.4 "roots").
    pub fn roots(&self) -> Vec<&Node> {
        self.nodes().filter(|n| self.dependants_of(&n.id).is_empty()).collect()
    }

    /// `true` iff `id` has no dependants and is not pinned by the manifest (spec §4.4
    /// "isDangling" / glossary "Dangling node").
    pub fn is_dangling(&self, id: &ItemId) -> bool {
        match self.get(id) {
            Some(node) if node.is_in_manifest => false,
            Some(_) => self.dependants_of(id).is_empty(),
            None => false,
        }
    }

    /// Repeatedly remove dangling nodes until a fixed point (spec §4.4 "cleanup";
    /// testable law "idempotence of cleanup"). Returns the ids removed.
    pub fn cleanup(&mut self) -> Vec<ItemId> {
        let mut removed = Vec::new();
        loop {
            let dangling: Vec<ItemId> =
                self.nodes().filter(|n| self.is_dangling(&n.id)).map(|n| n.id.clone()).collect();
            if dangling.is_empty() {
                break;
            }
            for id in dangling {
                self.remove(&id);
                removed.push(id);
            }
        }
        removed
    }

    /// A full copy of the current graph state, for the backtracking bookkeeping
    /// manifest operations need around `validate_all` (spec §4.5 "Manifest
    /// operations").
    pub fn snapshot(&self) -> ResolutionGraph {
        ResolutionGraph { graph: self.graph.clone(), index: self.index.clone() }
    }

    pub fn restore(&mut self, snapshot: ResolutionGraph) {
        *self = snapshot;
    }

    /// Rebuild petgraph edges (depender → dependency) from the authoritative
    /// `Node::dependencies` maps. Dangling dependency references (the target node
    /// doesn't exist yet, mid-resolution) are simply skipped; `dependants_of` never
    /// relies on these edges, only on the dependency maps themselves.
    fn reconcile_edges(&mut self) {
        self.graph.clear_edges();
        let edges: Vec<(NodeIndex, NodeIndex)> = self
            .graph
            .node_indices()
            .flat_map(|idx| {
                let deps: Vec<ItemId> = self.graph[idx].dependencies.keys().cloned().collect();
                deps.into_iter().filter_map(move |dep_id| {
                    self.index.get(&dep_id).map(|&target| (idx, target))
                })
            })
            .collect();
        for (from, to) in edges {
            self.graph.add_edge(from, to, ());
        }
    }

    /// petgraph's `remove_node` moves the last-added node into the freed slot; refresh
    /// the id→index map accordingly.
    fn reindex(&mut self) {
        self.index.clear();
        for idx in self.graph.node_indices() {
            self.index.insert(self.graph[idx].id.clone(), idx);
        }
    }

    /// Outgoing dependency ids of `id` for debugging/inspection, sourced from petgraph
    /// edges rather than the raw map (i.e. only dependencies that currently resolve to
    /// a present node).
    pub fn resolved_dependency_ids(&self, id: &ItemId) -> Vec<ItemId> {
        let Some(&idx) = self.index.get(id) else { return Vec::new() };
        self.graph
            .neighbors_directed(idx, Direction::Outgoing)
            .map(|n| self.graph[n].id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, version: &str) -> Node {
        Node::new(id, version::parse(version).unwrap())
    }

    #[test]
    fn add_is_idempotent_by_id() {
        let mut g = ResolutionGraph::new();
        g.add(node("SatisfactoryGame", "109000.0.0"));
        g.add(node("SatisfactoryGame", "999999.0.0"));
        assert_eq!(g.len(), 1);
        assert_eq!(g.get(&ItemId::new("SatisfactoryGame")).unwrap().version.major, 109000);
    }

    #[test]
    fn dependants_of_uses_dependency_maps_not_edges() {
        let mut g = ResolutionGraph::new();
        let mut deps = BTreeMap::new();
        deps.insert(ItemId::new("SML"), ">=1.0.0".to_string());
        g.add(node("dummyMod1", "1.0.0").with_dependencies(deps));
        // SML isn't in the graph yet, but dummyMod1 already names it as a dependant.
        assert_eq!(g.dependants_of(&ItemId::new("SML")).len(), 1);
    }

    #[test]
    fn cleanup_removes_dangling_nodes_to_a_fixed_point() {
        let mut g = ResolutionGraph::new();
        g.add(node("game", "1.0.0").manifest(true));

        let mut mod_deps = BTreeMap::new();
        mod_deps.insert(ItemId::new("game"), ">=1.0.0".to_string());
        g.add(node("modA", "1.0.0").with_dependencies(mod_deps.clone()));

        let mut dep_deps = BTreeMap::new();
        dep_deps.insert(ItemId::new("modA"), ">=1.0.0".to_string());
        g.add(node("modB", "1.0.0").with_dependencies(dep_deps));

        // Nothing depends on modB's presence anymore once we drop modA's dependants.
        g.remove(&ItemId::new("modA"));
        let removed = g.cleanup();
        assert!(removed.contains(&ItemId::new("modB")));
        assert!(g.get(&ItemId::new("game")).is_some(), "manifest node must survive cleanup");
    }

    #[test]
    fn cleanup_is_idempotent() {
        let mut g = ResolutionGraph::new();
        g.add(node("game", "1.0.0").manifest(true));
        g.add(node("orphan", "1.0.0"));
        let first: std::collections::HashSet<_> = g.cleanup().into_iter().collect();
        let second: std::collections::HashSet<_> = g.cleanup().into_iter().collect();
        assert_eq!(first, std::collections::HashSet::from([ItemId::new("orphan")]));
        assert!(second.is_empty());
    }

    #[test]
    fn roots_are_nodes_with_no_dependants() {
        let mut g = ResolutionGraph::new();
        g.add(node("game", "1.0.0").manifest(true));
        let mut deps = BTreeMap::new();
        deps.insert(ItemId::new("game"), ">=1.0.0".to_string());
        g.add(node("modA", "1.0.0").with_dependencies(deps));

        let roots = g.roots();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].id, ItemId::new("modA"));
    }
}
