//! Extension filter for asset discovery.
//!
//! A file is compressible when its basename matches `*.<ext>` for one of the
//! configured extensions. The same predicate has two renderings:
//!
//! - [`FilterExpression::find_args`]: an argument vector for `find(1)`,
//!   passed as separate arguments so no shell expands the patterns.
//! - [`FilterExpression::matches`]: an in-process check with `find -name`
//!   semantics, used by the walkdir backend.
//!
//! ```text
//! {html, css}  →  -type f ( -name *.html -o -name *.css )
//! ```
//!
//! An empty extension set matches nothing.

use std::ffi::OsStr;
use std::fmt;
use thiserror::Error;

/// Extensions compressed when nothing else is configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["html", "css", "js", "svg", "xml", "json"];

/// Characters that would turn an extension into a glob or a path.
const FORBIDDEN: &[char] = &['*', '?', '[', ']', '\\', '/'];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid extension {ext:?}: {reason}")]
    InvalidExtension { ext: String, reason: &'static str },
}

/// Ordered, de-duplicated set of file extensions (no leading dot).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionSet(Vec<String>);

impl ExtensionSet {
    /// Validate and collect extensions, keeping first-seen order.
    pub fn new<I, S>(exts: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set: Vec<String> = Vec::new();
        for ext in exts {
            let ext = ext.as_ref();
            validate_extension(ext)?;
            if !set.iter().any(|e| e == ext) {
                set.push(ext.to_string());
            }
        }
        Ok(Self(set))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ExtensionSet {
    fn default() -> Self {
        Self(DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect())
    }
}

fn validate_extension(ext: &str) -> Result<(), FilterError> {
    let reason = if ext.is_empty() {
        Some("must not be empty")
    } else if ext.starts_with('.') {
        Some("must not start with a dot")
    } else if ext.contains(FORBIDDEN) {
        Some("must not contain glob characters or path separators")
    } else if ext.chars().any(|c| c.is_whitespace() || c.is_control()) {
        Some("must not contain whitespace or control characters")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(FilterError::InvalidExtension {
            ext: ext.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Predicate selecting regular files whose basename ends in `.<ext>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterExpression {
    /// Basename globs, one per extension: `*.html`.
    patterns: Vec<String>,
}

/// Build the discovery predicate for an extension set.
pub fn build_filter(exts: &ExtensionSet) -> FilterExpression {
    FilterExpression {
        patterns: exts.iter().map(|e| format!("*.{e}")).collect(),
    }
}

impl FilterExpression {
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// True when no file can match (empty extension set).
    pub fn matches_nothing(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Render as `find` arguments: `-type f ( -name *.a -o -name *.b )`.
    ///
    /// For an empty expression this is `-type f -false`.
    pub fn find_args(&self) -> Vec<String> {
        let mut args = vec!["-type".to_string(), "f".to_string()];
        if self.patterns.is_empty() {
            args.push("-false".to_string());
            return args;
        }
        args.push("(".to_string());
        for (i, pattern) in self.patterns.iter().enumerate() {
            if i > 0 {
                args.push("-o".to_string());
            }
            args.push("-name".to_string());
            args.push(pattern.clone());
        }
        args.push(")".to_string());
        args
    }

    /// Check a basename against the predicate.
    ///
    /// `*` in `find -name` matches any run of bytes including a leading dot,
    /// so this is a byte-wise suffix test. The file type check is the
    /// caller's job.
    pub fn matches(&self, file_name: &OsStr) -> bool {
        let name = file_name.as_encoded_bytes();
        self.patterns.iter().any(|pattern| {
            let suffix = &pattern.as_bytes()[1..];
            name.ends_with(suffix)
        })
    }
}

impl fmt::Display for FilterExpression {
    /// Human-readable form for logs, patterns quoted.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .find_args()
            .into_iter()
            .map(|arg| {
                if arg.contains('*') {
                    format!("'{arg}'")
                } else {
                    arg
                }
            })
            .collect();
        write!(f, "{}", rendered.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(exts: &[&str]) -> ExtensionSet {
        ExtensionSet::new(exts).unwrap()
    }

    #[test]
    fn default_set_is_the_six_web_formats() {
        let set_default = ExtensionSet::default();
        let exts: Vec<&str> = set_default.iter().collect();
        assert_eq!(exts, vec!["html", "css", "js", "svg", "xml", "json"]);
    }

    #[test]
    fn duplicates_are_dropped_in_order() {
        let deduped = set(&["css", "html", "css"]);
        let exts: Vec<&str> = deduped.iter().collect();
        assert_eq!(exts, vec!["css", "html"]);
    }

    #[test]
    fn leading_dot_rejected() {
        let err = ExtensionSet::new([".html"]).unwrap_err();
        assert!(matches!(err, FilterError::InvalidExtension { ref ext, .. } if ext == ".html"));
    }

    #[test]
    fn glob_characters_rejected() {
        for bad in ["h*", "x?", "[ab]", "a/b", r"a\b"] {
            assert!(ExtensionSet::new([bad]).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn empty_and_whitespace_rejected() {
        assert!(ExtensionSet::new([""]).is_err());
        assert!(ExtensionSet::new(["ht ml"]).is_err());
    }

    #[test]
    fn multi_dot_extension_allowed() {
        let filter = build_filter(&set(&["min.js"]));
        assert!(filter.matches(OsStr::new("app.min.js")));
        assert!(!filter.matches(OsStr::new("app.js")));
    }

    #[test]
    fn find_args_or_all_patterns() {
        let filter = build_filter(&set(&["html", "css"]));
        assert_eq!(
            filter.find_args(),
            vec!["-type", "f", "(", "-name", "*.html", "-o", "-name", "*.css", ")"]
        );
    }

    #[test]
    fn find_args_single_pattern() {
        let filter = build_filter(&set(&["svg"]));
        assert_eq!(
            filter.find_args(),
            vec!["-type", "f", "(", "-name", "*.svg", ")"]
        );
    }

    #[test]
    fn empty_set_matches_nothing() {
        let filter = build_filter(&set(&[]));
        assert!(filter.matches_nothing());
        assert!(!filter.matches(OsStr::new("index.html")));
        assert_eq!(filter.find_args(), vec!["-type", "f", "-false"]);
    }

    #[test]
    fn matches_is_case_sensitive() {
        let filter = build_filter(&set(&["html"]));
        assert!(filter.matches(OsStr::new("index.html")));
        assert!(!filter.matches(OsStr::new("INDEX.HTML")));
    }

    #[test]
    fn matches_dotfile_like_find() {
        let filter = build_filter(&set(&["html"]));
        assert!(filter.matches(OsStr::new(".html")));
        assert!(!filter.matches(OsStr::new("html")));
    }

    #[test]
    fn matches_ignores_compressed_siblings() {
        let filter = build_filter(&ExtensionSet::default());
        assert!(!filter.matches(OsStr::new("index.html.gz")));
        assert!(!filter.matches(OsStr::new("index.html.br")));
    }

    #[test]
    fn display_quotes_patterns() {
        let filter = build_filter(&set(&["js"]));
        assert_eq!(filter.to_string(), "-type f ( -name '*.js' )");
    }
}
