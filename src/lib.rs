//! Dependency resolution and lockfile engine for a Satisfactory mod manager.
//!
//! This crate owns the version-constraint solver, the in-memory resolution graph and
//! its invariants, the validation/backtracking algorithm, and the diff computation
//! between two lockfiles. The HTTP/GraphQL catalog client, the on-disk mod cache that
//! unzips and parses a mod's metadata, file installation, and the CLI are out of scope
//! and are expected to plug in through the [`catalog::Catalog`] / [`catalog::ModCache`]
//! traits.

pub mod actions;
pub mod cancel;
pub mod catalog;
pub mod error;
pub mod graph;
pub mod item;
pub mod lockfile;
pub mod manifest;
pub mod resolver;
pub mod version;

pub use actions::Workspace;
pub use cancel::CancellationToken;
pub use catalog::{Catalog, LoaderInfo, MemoizingCatalog, ModCache, ModMeta};
pub use error::{ResolveError, ResolveResult};
pub use graph::{Node, ResolutionGraph};
pub use item::ItemId;
pub use lockfile::{LockDiff, Lockfile, LockedItem};
pub use manifest::Manifest;
pub use resolver::{get_item_data, Resolver};
