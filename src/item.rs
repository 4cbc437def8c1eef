//! Item identifiers.
//!
//! An [`ItemId`] is an opaque string naming a mod, the loader, or the game. Keeping it
//! as a newtype (rather than passing bare `String`s around) stops a version string from
//! being handed to a function expecting an id, the way the teacher crate keeps package
//! name and version as distinct `String` fields throughout `LockedPackage`.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The mod loader. Its versions are listed by the catalog but its dependency set is
/// synthesized by [`crate::resolver::get_item_data`] rather than fetched from a mod cache.
pub const SML: &str = "SML";

/// The game itself. Only ever inserted by the caller as a pinned node; the resolver
/// refuses to fabricate or mutate it.
pub const SATISFACTORY_GAME: &str = "SatisfactoryGame";

/// An opaque identifier for a mod, the loader, or the game.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_loader(&self) -> bool {
        self.0 == SML
    }

    pub fn is_game(&self) -> bool {
        self.0 == SATISFACTORY_GAME
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for ItemId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ItemId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}
