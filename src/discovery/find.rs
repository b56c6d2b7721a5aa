//! Discovery through the external `find` command.
//!
//! The filter is handed to `find` as separate arguments, never through a
//! shell, so patterns like `*.html` reach it unexpanded without any
//! glob-suppression tricks:
//!
//! ```text
//! find <root> -type f ( -name *.html -o -name *.css ) -print0
//! ```
//!
//! `-print0` output is split on NUL, so names containing newlines are
//! reported intact. Whether such names can be turned into rules is the
//! generator's decision.

use super::backend::{Discovery, DiscoveryError, display_path, sort_paths, starts_with_dash};
use crate::filter::FilterExpression;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Runs `find` (or a compatible program) to enumerate files.
#[derive(Debug, Clone)]
pub struct FindDiscovery {
    pub program: String,
}

impl Default for FindDiscovery {
    fn default() -> Self {
        Self {
            program: "find".to_string(),
        }
    }
}

impl FindDiscovery {
    /// Full argument vector for one search, starting with the root.
    ///
    /// A root beginning with `-` is prefixed with `./` so `find` does not
    /// parse it as an option.
    pub fn args(&self, root: &Path, filter: &FilterExpression) -> Vec<OsString> {
        let search_root = if starts_with_dash(root) {
            Path::new(".").join(root)
        } else {
            root.to_path_buf()
        };
        let mut args = vec![search_root.into_os_string()];
        args.extend(filter.find_args().into_iter().map(OsString::from));
        args.push(OsString::from("-print0"));
        args
    }
}

impl Discovery for FindDiscovery {
    fn discover(
        &self,
        root: &Path,
        filter: &FilterExpression,
    ) -> Result<Vec<PathBuf>, DiscoveryError> {
        if filter.matches_nothing() {
            return Ok(Vec::new());
        }

        let args = self.args(root, filter);
        debug!(program = %self.program, ?args, "running discovery");
        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|source| DiscoveryError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(DiscoveryError::ToolFailed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let mut paths: Vec<PathBuf> = output
            .stdout
            .split(|b| *b == 0)
            .filter(|entry| !entry.is_empty())
            .map(|entry| display_path(root, &path_from_bytes(entry)))
            .collect();
        sort_paths(&mut paths);
        Ok(paths)
    }
}

#[cfg(unix)]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    use std::os::unix::ffi::OsStringExt;
    PathBuf::from(OsString::from_vec(bytes.to_vec()))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}
