//! In-process discovery with `walkdir`.
//!
//! Mirrors what [`FindDiscovery`](super::FindDiscovery) asks of `find`:
//! symlinks are not followed, only regular files are considered, and the
//! basename is tested against the filter with `-name` semantics.

use super::backend::{Discovery, DiscoveryError, display_path, sort_paths};
use crate::filter::FilterExpression;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, Default)]
pub struct WalkDiscovery;

impl Discovery for WalkDiscovery {
    fn discover(
        &self,
        root: &Path,
        filter: &FilterExpression,
    ) -> Result<Vec<PathBuf>, DiscoveryError> {
        if filter.matches_nothing() {
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        for entry in WalkDir::new(root).follow_links(false) {
            let entry = entry?;
            if entry.file_type().is_file() && filter.matches(entry.file_name()) {
                paths.push(display_path(root, entry.path()));
            }
        }
        sort_paths(&mut paths);
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{ExtensionSet, build_filter};
    use crate::test_helpers::make_tree;

    #[test]
    fn walks_nested_directories() {
        let tmp = make_tree(&["index.html", "a/b/c.js", "a/skip.png", "z.svg"]);
        let filter = build_filter(&ExtensionSet::default());
        let found = WalkDiscovery.discover(tmp.path(), &filter).unwrap();
        let expected: Vec<PathBuf> = ["a/b/c.js", "index.html", "z.svg"]
            .iter()
            .map(|p| tmp.path().join(p))
            .collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn directories_named_like_assets_are_skipped() {
        let tmp = make_tree(&["dir.html/inner.css"]);
        let filter = build_filter(&ExtensionSet::default());
        let found = WalkDiscovery.discover(tmp.path(), &filter).unwrap();
        assert_eq!(found, vec![tmp.path().join("dir.html/inner.css")]);
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_not_followed() {
        let tmp = make_tree(&["real.css"]);
        std::os::unix::fs::symlink(tmp.path().join("real.css"), tmp.path().join("link.css"))
            .unwrap();
        let filter = build_filter(&ExtensionSet::default());
        let found = WalkDiscovery.discover(tmp.path(), &filter).unwrap();
        assert_eq!(found, vec![tmp.path().join("real.css")]);
    }

    #[cfg(unix)]
    #[test]
    fn agrees_with_find_backend() {
        let tmp = make_tree(&["a b.html", "it's.css", "x/[y].js", "x/skip.txt", "-dash.json"]);
        let filter = build_filter(&ExtensionSet::default());
        let walked = WalkDiscovery.discover(tmp.path(), &filter).unwrap();
        let found = super::super::FindDiscovery::default()
            .discover(tmp.path(), &filter)
            .unwrap();
        assert_eq!(walked, found);
    }

    #[test]
    fn missing_root_is_error() {
        let tmp = make_tree(&[]);
        let filter = build_filter(&ExtensionSet::default());
        let result = WalkDiscovery.discover(&tmp.path().join("absent"), &filter);
        assert!(matches!(result, Err(DiscoveryError::Walk(_))));
    }
}
