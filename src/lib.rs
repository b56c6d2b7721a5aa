//! # precompress-mk
//!
//! Generates a Makefile that pre-compresses static web assets. For every
//! compressible file under a directory tree it declares two derived
//! artifacts, `<file>.gz` (zopfli) and `<file>.br` (brotli), and an `all`
//! target depending on all of them:
//!
//! ```text
//! precompress-mk | make -f - -j8
//! ```
//!
//! The generator does no compression itself. Scheduling, parallelism and
//! "is this already up to date" all belong to `make`, which compares
//! timestamps between each source and its siblings.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`escape`] | Path → rule token and path → shell token, from one quoting primitive |
//! | [`filter`] | Extension set → discovery predicate (`find` arguments or in-process match) |
//! | [`discovery`] | Enumerates candidate files via `find(1)` or `walkdir` |
//! | [`rules`] | Builds the two rules per source and drives generation |
//! | [`output`] | Rule-file formatting and block-atomic writing |
//! | [`config`] | `precompress.toml` loading, merging, and validation |
//!
//! # Design Decisions
//!
//! ## Two Escapers, One Primitive
//!
//! A path appears both as a make target and as a shell argument. Make
//! treats `'` as ordinary but `$`, `:` and `#` as syntax; the shell is the
//! opposite. [`escape::rule_token`] and [`escape::command_token`] render from
//! the same per-character quoting decision, so a fix to one cannot silently
//! miss the other.
//!
//! ## Argument Vectors Until the Last Moment
//!
//! Discovery runs `find` with an argument list, and rules carry their
//! commands as program plus arguments. Text escaping happens only in
//! [`output`], where the Makefile is serialized.
//!
//! ## Independent `.gz` and `.br` Rules
//!
//! Each artifact has its own rule with the source as sole prerequisite, so
//! `make -j` can run both compressors at once and a failure in one does not
//! block the other.
//!
//! ## Unsupported File Names
//!
//! Make cannot name a file containing a newline, and has no escape for `;`,
//! `=`, `|`, `%`, parentheses or a leading `~` in a rule name. Such files
//! (and names that are not UTF-8) abort generation with an explicit error
//! instead of being skipped or mangled.

pub mod config;
pub mod discovery;
pub mod escape;
pub mod filter;
pub mod output;
pub mod rules;

#[cfg(test)]
pub(crate) mod test_helpers;
