//! The validation/backtracking algorithm (spec §4.3, §4.5).

use std::collections::BTreeMap;

use crate::cancel::CancellationToken;
use crate::catalog::{Catalog, ModCache};
use crate::error::{ResolveError, ResolveResult};
use crate::graph::{Node, ResolutionGraph};
use crate::item::{ItemId, SATISFACTORY_GAME, SML};
use crate::version;

/// Materialize a `Node` for `(id, version)` (spec §4.3).
///
/// `SML`'s dependency set is synthesized from the loader's declared minimum game
/// version rather than fetched; `SatisfactoryGame` can never be resolved this way at
/// all — it only ever enters the graph as a caller-supplied pinned node.
pub fn get_item_data<C: Catalog, M: ModCache>(
    catalog: &C,
    mod_cache: &M,
    id: &ItemId,
    version: &str,
) -> ResolveResult<Node> {
    if id.is_loader() {
        let info = catalog
            .get_loader_info(version)?
            .ok_or_else(|| ResolveError::ModNotFound { id: id.clone(), version: Some(version.to_string()) })?;
        let v = crate::version::parse(version)?;
        let mut dependencies = BTreeMap::new();
        dependencies.insert(
            ItemId::new(SATISFACTORY_GAME),
            version::coerce_to_minimum_constraint(&info.game_version)?,
        );
        return Ok(Node::new(id.clone(), v).with_dependencies(dependencies));
    }

    if id.is_game() {
        return Err(ResolveError::InvalidLockfileOperation(format!(
            "{SATISFACTORY_GAME} is never resolved, only pinned by the caller"
        )));
    }

    let meta = mod_cache.get_metadata(id, version)?;
    let v = crate::version::parse(version)?;
    let mut dependencies = meta.dependencies;
    if let Some(sml_version) = &meta.sml_version {
        dependencies.insert(ItemId::new(SML), version::coerce_to_minimum_constraint(sml_version)?);
    }
    Ok(Node::new(id.clone(), v).with_dependencies(dependencies))
}

/// Drives `validate`/`validateAll` over a [`ResolutionGraph`] against a `Catalog` and
/// `ModCache`, with optional cooperative cancellation (spec §4.5, §5).
pub struct Resolver<'a, C, M> {
    catalog: &'a C,
    mod_cache: &'a M,
    cancel: Option<CancellationToken>,
}

impl<'a, C: Catalog, M: ModCache> Resolver<'a, C, M> {
    pub fn new(catalog: &'a C, mod_cache: &'a M) -> Self {
        Self { catalog, mod_cache, cancel: None }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn catalog(&self) -> &'a C {
        self.catalog
    }

    pub fn mod_cache(&self) -> &'a M {
        self.mod_cache
    }

    fn check_cancelled(&self) -> ResolveResult<()> {
        if self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
            return Err(ResolveError::Cancelled);
        }
        Ok(())
    }

    /// Invoke `validate` on every node currently in the graph, in ascending id order
    /// for reproducibility (spec §5). A no-op, network-call-free pass on an
    /// already-valid graph (spec §5 "Idempotency").
    pub fn validate_all(&self, graph: &mut ResolutionGraph) -> ResolveResult<()> {
        let mut ids: Vec<ItemId> = graph.nodes().map(|n| n.id.clone()).collect();
        ids.sort();
        for id in ids {
            if graph.contains(&id) {
                self.validate(graph, &id)?;
            }
        }
        Ok(())
    }

    /// Validate every dependency of the node `id`, recursing into each one (spec §4.5).
    pub fn validate(&self, graph: &mut ResolutionGraph, id: &ItemId) -> ResolveResult<()> {
        self.check_cancelled()?;

        let Some(node) = graph.get(id) else { return Ok(()) };
        let depender_id = node.id.clone();
        let depender_version = node.version.to_string();
        let dependencies: Vec<(ItemId, String)> =
            node.dependencies.iter().map(|(k, v)| (k.clone(), v.clone())).collect();

        for (dep_id, constraint) in dependencies {
            self.validate_dependency(graph, &depender_id, &depender_version, &dep_id, &constraint)?;
        }
        Ok(())
    }

    fn validate_dependency(
        &self,
        graph: &mut ResolutionGraph,
        depender_id: &ItemId,
        depender_version: &str,
        dep_id: &ItemId,
        constraint: &str,
    ) -> ResolveResult<()> {
        let existing = graph.get(dep_id).cloned();

        if let Some(d) = &existing {
            if version::satisfies(&d.version, constraint)? {
                return Ok(());
            }
        }

        if let Some(d) = &existing {
            if d.is_in_manifest {
                return Err(ResolveError::DependencyManifestMismatch {
                    dep_id: dep_id.clone(),
                    dep_version: d.version.to_string(),
                    depender: depender_id.clone(),
                    depender_version: depender_version.to_string(),
                    constraint: constraint.to_string(),
                });
            }
            graph.remove(dep_id);
        }

        let constraints: Vec<String> = graph
            .dependants_of(dep_id)
            .into_iter()
            .filter_map(|n| n.dependencies.get(dep_id).cloned())
            .collect();

        self.check_cancelled()?;
        let mut candidates: Vec<semver::Version> = self
            .catalog
            .list_matching_versions(dep_id, &constraints)?
            .into_iter()
            .filter_map(|v| crate::version::parse(&v).ok())
            .collect();
        candidates.sort();

        for candidate in candidates.into_iter().rev() {
            self.check_cancelled()?;

            let child = match get_item_data(self.catalog, self.mod_cache, dep_id, &candidate.to_string()) {
                Ok(child) => child,
                Err(_) => continue,
            };

            graph.add(child);
            match self.validate(graph, dep_id) {
                Ok(()) => return Ok(()),
                Err(err @ ResolveError::DependencyManifestMismatch { .. }) => return Err(err),
                Err(err @ ResolveError::Cancelled) => return Err(err),
                Err(_) => {
                    graph.remove(dep_id);
                }
            }
        }

        if let Some(d) = existing {
            graph.add(d);
        }
        Err(ResolveError::UnsolvableDependency { dep_id: dep_id.clone(), depender: depender_id.clone() })
    }
}
