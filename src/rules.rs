//! Rule generation: discovered assets → build rules.
//!
//! Every compressible source gets two independent rules, one per derived
//! artifact, plus an entry for each artifact in the aggregate `all` target:
//!
//! ```text
//! all: app.js.gz app.js.br
//!
//! app.js.gz: app.js
//! 	zopfli --i127 app.js
//!
//! app.js.br: app.js
//! 	brotli --quality 15 --input app.js --output app.js.br
//! ```
//!
//! Neither rule depends on the other's output, so the build tool may run
//! them in parallel and either can fail alone. `all` has no recipe; it only
//! gives the build tool a default goal.
//!
//! Rules are held as structured data (program plus argument list). Text is
//! produced only by [`crate::output`], which is where escaping happens.
//!
//! ## Unsupported paths
//!
//! The rule grammar cannot name a file containing a newline, nor one using
//! a character make has no escape for (see [`escape::rule_unspellable`]),
//! and rule text is UTF-8. Such paths fail the whole run with
//! [`GenerateError::UnsupportedPath`] before anything is written.

use crate::discovery::{Discovery, DiscoveryError};
use crate::escape;
use crate::filter::FilterExpression;
use crate::output::{self, OutputWriter};
use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Name of the recipe-less target depending on every artifact.
pub const AGGREGATE_TARGET: &str = "all";

/// Effort flag for the gzip-compatible compressor (zopfli iterations).
pub const GZIP_EFFORT_FLAG: &str = "--i127";

/// Quality passed to the brotli compressor.
pub const BROTLI_QUALITY: &str = "15";

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("Discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Unsupported path {}: {reason}", .path.display())]
    UnsupportedPath {
        path: PathBuf,
        reason: UnsupportedReason,
    },
}

impl GenerateError {
    /// True when the consumer closed the output pipe.
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, GenerateError::Io(e) if output::is_broken_pipe(e))
    }
}

/// Why a discovered path cannot be turned into rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedReason {
    /// Rule names are line-delimited; a newline cannot be spelled.
    ContainsNewline,
    /// Rule text is UTF-8.
    NotUtf8,
    /// The character has line-level or name-level meaning in rule text and
    /// no escape.
    Unspellable(char),
}

impl fmt::Display for UnsupportedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnsupportedReason::ContainsNewline => write!(f, "file name contains a newline"),
            UnsupportedReason::NotUtf8 => write!(f, "file name is not valid UTF-8"),
            UnsupportedReason::Unspellable('~') => {
                write!(f, "file name starts with '~', which make expands")
            }
            UnsupportedReason::Unspellable(c) => {
                write!(f, "file name contains {c:?}, which make cannot escape")
            }
        }
    }
}

/// A compressed sibling produced from a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Gzip,
    Brotli,
}

impl Artifact {
    /// Emission order for each source.
    pub const ALL: [Artifact; 2] = [Artifact::Gzip, Artifact::Brotli];

    pub fn suffix(self) -> &'static str {
        match self {
            Artifact::Gzip => ".gz",
            Artifact::Brotli => ".br",
        }
    }
}

/// Program names for the two compressors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compressors {
    pub gzip: String,
    pub brotli: String,
}

impl Default for Compressors {
    fn default() -> Self {
        Self {
            gzip: "zopfli".to_string(),
            brotli: "brotli".to_string(),
        }
    }
}

/// An external command as program plus argument vector, unescaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressorCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl CompressorCommand {
    /// `<program> --i127 <input>`; the tool writes `<input>.gz` itself.
    pub fn gzip(program: &str, input: &str) -> Self {
        Self {
            program: program.to_string(),
            args: vec![GZIP_EFFORT_FLAG.to_string(), input.to_string()],
        }
    }

    /// `<program> --quality 15 --input <input> --output <input>.br`.
    pub fn brotli(program: &str, input: &str) -> Self {
        Self {
            program: program.to_string(),
            args: vec![
                "--quality".to_string(),
                BROTLI_QUALITY.to_string(),
                "--input".to_string(),
                input.to_string(),
                "--output".to_string(),
                format!("{input}{}", Artifact::Brotli.suffix()),
            ],
        }
    }
}

/// One target, its single prerequisite, and the command building it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRule {
    pub target: String,
    pub prerequisite: String,
    pub command: CompressorCommand,
}

impl BuildRule {
    pub fn new(artifact: Artifact, source: &str, compressors: &Compressors) -> Self {
        let command = match artifact {
            Artifact::Gzip => CompressorCommand::gzip(&compressors.gzip, source),
            Artifact::Brotli => CompressorCommand::brotli(&compressors.brotli, source),
        };
        Self {
            target: format!("{source}{}", artifact.suffix()),
            prerequisite: source.to_string(),
            command,
        }
    }
}

/// Both rules for one source, `.gz` first.
pub fn rules_for(source: &str, compressors: &Compressors) -> [BuildRule; 2] {
    Artifact::ALL.map(|artifact| BuildRule::new(artifact, source, compressors))
}

/// Check that a discovered path can be named in rule text.
pub fn source_name(path: &Path) -> Result<String, GenerateError> {
    let unsupported = |reason| GenerateError::UnsupportedPath {
        path: path.to_path_buf(),
        reason,
    };
    let name = path
        .to_str()
        .ok_or_else(|| unsupported(UnsupportedReason::NotUtf8))?;
    match escape::rule_unspellable(name) {
        None => Ok(name.to_string()),
        Some('\n') => Err(unsupported(UnsupportedReason::ContainsNewline)),
        Some(c) => Err(unsupported(UnsupportedReason::Unspellable(c))),
    }
}

/// Discover and validate all sources under `root`.
pub fn collect_sources(
    discovery: &dyn Discovery,
    root: &Path,
    filter: &FilterExpression,
) -> Result<Vec<String>, GenerateError> {
    if filter.matches_nothing() {
        warn!("extension set is empty; no files will be compressed");
    }
    let found = discovery.discover(root, filter)?;
    debug!(count = found.len(), root = %root.display(), "discovered sources");
    found.iter().map(|p| source_name(p)).collect()
}

/// Counts reported after a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateSummary {
    pub sources: usize,
    pub rules: usize,
}

/// Discover sources under `root` and stream the rule file to `out`.
///
/// All paths are validated before the first byte is written, so an
/// unsupported name never leaves a truncated rule file behind.
pub fn generate<W: Write>(
    discovery: &dyn Discovery,
    root: &Path,
    filter: &FilterExpression,
    compressors: &Compressors,
    out: &mut OutputWriter<W>,
) -> Result<GenerateSummary, GenerateError> {
    let sources = collect_sources(discovery, root, filter)?;
    let summary = write_rules(&sources, compressors, out)?;
    info!(
        sources = summary.sources,
        rules = summary.rules,
        "rule file complete"
    );
    Ok(summary)
}

/// Emit the aggregate target, then two rule blocks per source.
pub fn write_rules<W: Write>(
    sources: &[String],
    compressors: &Compressors,
    out: &mut OutputWriter<W>,
) -> io::Result<GenerateSummary> {
    out.emit(&output::format_aggregate(AGGREGATE_TARGET, sources))?;

    let mut summary = GenerateSummary {
        sources: sources.len(),
        rules: 0,
    };
    for source in sources {
        for rule in rules_for(source, compressors) {
            out.emit(&output::format_rule(&rule))?;
            summary.rules += 1;
        }
    }
    Ok(summary)
}
