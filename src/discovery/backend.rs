//! Discovery backend trait and shared path handling.

use crate::filter::FilterExpression;
use std::path::{Component, Path, PathBuf};
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    ToolFailed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
}

/// Enumerates the regular files under `root` that satisfy `filter`.
///
/// Implementations return paths as the build tool should see them (see
/// [`display_path`]) in a stable order (see [`sort_paths`]).
pub trait Discovery {
    fn discover(
        &self,
        root: &Path,
        filter: &FilterExpression,
    ) -> Result<Vec<PathBuf>, DiscoveryError>;
}

/// Turn a traversal result into the path written to the rule file.
///
/// When the root is the current directory the `./` prefix is dropped. Any
/// path that would then start with `-`, whatever the root, is written as
/// `./-...` so the compressor never mistakes the argument for a flag.
pub fn display_path(root: &Path, found: &Path) -> PathBuf {
    let shown = if is_current_dir(root) {
        found.strip_prefix(".").unwrap_or(found)
    } else {
        found
    };
    if starts_with_dash(shown) {
        Path::new(".").join(shown)
    } else {
        shown.to_path_buf()
    }
}

/// Sort by raw bytes for a locale-independent, repeatable order.
pub fn sort_paths(paths: &mut [PathBuf]) {
    paths.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
}

pub(crate) fn is_current_dir(root: &Path) -> bool {
    let mut components = root.components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::CurDir), None)
    )
}

pub(crate) fn starts_with_dash(path: &Path) -> bool {
    path.as_os_str().as_encoded_bytes().first() == Some(&b'-')
}
