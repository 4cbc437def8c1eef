//! Integration test for the scenario table in the resolution specification,
//! driven through the public `Workspace`/`Resolver` API rather than internals.

use std::collections::BTreeMap;

use ficsit_resolve::catalog::testing::FakeCatalog;
use ficsit_resolve::error::ResolveError;
use ficsit_resolve::graph::{Node, ResolutionGraph};
use ficsit_resolve::item::{ItemId, SATISFACTORY_GAME};
use ficsit_resolve::manifest::{GameSection, LoaderSection, Manifest};
use ficsit_resolve::resolver::Resolver;
use ficsit_resolve::version;
use ficsit_resolve::{Lockfile, LockedItem, Workspace};

fn workspace() -> Workspace {
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
fn scenario_table_end_to_end() {
    let catalog = FakeCatalog::scenario();
    let mod_cache = catalog.mod_cache();
    let resolver = Resolver::new(&catalog, &mod_cache);
    let mut ws = workspace();

    // 1. install 6vQ6ckVYFiidDh@1.4.1 (no deps)
    ws.install(&resolver, "6vQ6ckVYFiidDh", "1.4.1").unwrap();
    assert_eq!(ws.graph.len(), 2);
    assert_eq!(ws.graph.get(&ItemId::new("6vQ6ckVYFiidDh")).unwrap().version.to_string(), "1.4.1");

    // 2. install dummyMod1@1.0.0 (needs SML 2.0.0 and 6vQ...@^1.5.0) -> manifest mismatch
    let err = ws.install(&resolver, "dummyMod1", "1.0.0").unwrap_err();
    assert!(matches!(err, ResolveError::DependencyManifestMismatch { .. }));
    assert_eq!(ws.graph.len(), 2, "failed install must not mutate the graph");
    assert_eq!(ws.graph.get(&ItemId::new("6vQ6ckVYFiidDh")).unwrap().version.to_string(), "1.4.1");

    // 3. install dummyMod1@1.0.1 (SML >=1.0.0, 6vQ...@^1.2.0) -> succeeds, loader at newest (2.0.0)
    ws.install(&resolver, "dummyMod1", "1.0.1").unwrap();
    assert_eq!(ws.graph.get(&ItemId::new("dummyMod1")).unwrap().version.to_string(), "1.0.1");
    assert_eq!(ws.graph.get(&ItemId::new("6vQ6ckVYFiidDh")).unwrap().version.to_string(), "1.4.1");
    assert_eq!(ws.graph.get(&ItemId::new("SML")).unwrap().version.to_string(), "2.0.0");

    // 4. install dummyMod1@1.0.2 (SML 1.0.1, 6vQ...@^1.3.0) -> loader downgrades, not in manifest
    ws.install(&resolver, "dummyMod1", "1.0.2").unwrap();
    let sml = ws.graph.get(&ItemId::new("SML")).unwrap();
    assert_eq!(sml.version.to_string(), "1.0.1");
    assert!(!sml.is_in_manifest);

    // 5. install dummyMod1@1.0.3 (SML ^1.0.0, 6vQ...@^1.5.2) -> manifest mismatch, prior graph intact
    let before = ws.graph.get(&ItemId::new("dummyMod1")).unwrap().clone();
    let err = ws.install(&resolver, "dummyMod1", "1.0.3").unwrap_err();
    assert!(matches!(err, ResolveError::DependencyManifestMismatch { .. }));
    assert_eq!(ws.graph.get(&ItemId::new("dummyMod1")).unwrap().version, before.version);

    // 6. uninstall 6vQ6ckVYFiidDh: manifest entry with dependants, refused
    let before = ws.graph.get(&ItemId::new("6vQ6ckVYFiidDh")).unwrap().clone();
    ws.uninstall(&resolver, &ItemId::new("6vQ6ckVYFiidDh")).unwrap();
    let after = ws.graph.get(&ItemId::new("6vQ6ckVYFiidDh")).unwrap();
    assert_eq!(before.version, after.version);
}

#[test]
fn diff_scenario_from_the_spec() {
    let mut old = Lockfile::new();
    old.insert(ItemId::new("A"), LockedItem { version: "1.0".to_string(), dependencies: BTreeMap::new() });
    old.insert(ItemId::new("B"), LockedItem { version: "1.0".to_string(), dependencies: BTreeMap::new() });

    let mut new = Lockfile::new();
    new.insert(ItemId::new("A"), LockedItem { version: "1.0".to_string(), dependencies: BTreeMap::new() });
    new.insert(ItemId::new("B"), LockedItem { version: "2.0".to_string(), dependencies: BTreeMap::new() });
    new.insert(ItemId::new("C"), LockedItem { version: "1.0".to_string(), dependencies: BTreeMap::new() });

    let diff = old.diff(&new);
    assert_eq!(diff.uninstall, vec![ItemId::new("B")]);
    assert_eq!(diff.install.get(&ItemId::new("B")), Some(&"2.0".to_string()));
    assert_eq!(diff.install.get(&ItemId::new("C")), Some(&"1.0".to_string()));
    assert!(!diff.install.contains_key(&ItemId::new("A")));
}

#[test]
fn lockfile_round_trips_through_a_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mods.lock.json");

    let mut lock = Lockfile::new();
    let mut deps = BTreeMap::new();
    deps.insert(ItemId::new("SML"), ">=1.0.0".to_string());
    lock.insert(ItemId::new("dummyMod1"), LockedItem { version: "1.0.1".to_string(), dependencies: deps });
    lock.save(&path).unwrap();

    let loaded = Lockfile::load(&path).unwrap();
    assert_eq!(lock, loaded);
}
