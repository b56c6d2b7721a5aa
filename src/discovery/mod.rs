//! Asset discovery: which files under a root are compressible.
//!
//! Traversal is delegated to a [`Discovery`] backend so the generator never
//! depends on how files are enumerated:
//!
//! | Backend | How |
//! |---|---|
//! | [`FindDiscovery`] | runs `find(1)` with the filter as an argument vector, NUL-separated output |
//! | [`WalkDiscovery`] | walks in process with `walkdir`, same predicate |
//!
//! Both return paths relative to the directory the build tool will run in
//! and sorted, so two runs over an unchanged tree agree byte for byte.

pub mod backend;
pub mod find;
pub mod walk;

pub use backend::{Discovery, DiscoveryError};
pub use find::FindDiscovery;
pub use walk::WalkDiscovery;

use serde::{Deserialize, Serialize};

/// Which discovery backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryKind {
    /// External `find` command.
    #[default]
    Find,
    /// In-process directory walk.
    Walk,
}

impl DiscoveryKind {
    pub fn backend(self) -> Box<dyn Discovery> {
        match self {
            DiscoveryKind::Find => Box::new(FindDiscovery::default()),
            DiscoveryKind::Walk => Box::new(WalkDiscovery),
        }
    }
}
