//! Rule-file text and the stream it is written to.
//!
//! # Output Format
//!
//! ```text
//! all: a\ b'c.html.gz a\ b'c.html.br
//!
//! a\ b'c.html.gz: a\ b'c.html
//! 	zopfli --i127 a\ b\'c.html
//!
//! a\ b'c.html.br: a\ b'c.html
//! 	brotli --quality 15 --input a\ b\'c.html --output a\ b\'c.html.br
//!
//! ```
//!
//! One aggregate line, then one block per rule: target line, tab-indented
//! recipe, blank separator. Targets and prerequisites are rule tokens,
//! recipe arguments are command tokens (see [`crate::escape`]).
//!
//! # Architecture
//!
//! `format_*` functions are pure and return whole blocks. [`OutputWriter`]
//! writes each block with a single `write_all` and flushes, so a consumer
//! that stops reading sees the stream end on a block boundary.

use crate::escape::{command_token, recipe_line, rule_token};
use crate::rules::{Artifact, BuildRule};
use std::io::{self, Write};

// ============================================================================
// Formatting
// ============================================================================

/// Format the aggregate target over every artifact of every source.
///
/// ```text
/// all: a.html.gz a.html.br b.css.gz b.css.br
/// ```
///
/// With no sources this is `all:` followed by the blank separator.
pub fn format_aggregate(target: &str, sources: &[String]) -> String {
    let mut line = format!("{target}:");
    for source in sources {
        let token = rule_token(source);
        for artifact in Artifact::ALL {
            line.push(' ');
            line.push_str(&token);
            line.push_str(artifact.suffix());
        }
    }
    line.push_str("\n\n");
    line
}

/// Format one rule as target line, recipe line, and blank separator.
pub fn format_rule(rule: &BuildRule) -> String {
    let words: Vec<String> = std::iter::once(&rule.command.program)
        .chain(&rule.command.args)
        .map(|word| command_token(word))
        .collect();
    format!(
        "{}: {}\n\t{}\n\n",
        rule_token(&rule.target),
        rule_token(&rule.prerequisite),
        recipe_line(&words)
    )
}

/// Format discovered sources as a pretty JSON array.
pub fn format_list_json(sources: &[String]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(sources)
}

/// Print the `list` output to stdout, one path per line or as JSON.
pub fn print_list(sources: &[String], json: bool) -> io::Result<()> {
    let mut out = OutputWriter::new(io::stdout().lock());
    if json {
        let text = format_list_json(sources)?;
        out.emit(&format!("{text}\n"))
    } else {
        for source in sources {
            out.emit(&format!("{source}\n"))?;
        }
        Ok(())
    }
}

// ============================================================================
// Stream
// ============================================================================

/// Block-at-a-time writer for generated text.
pub struct OutputWriter<W: Write> {
    inner: W,
    blocks: usize,
}

impl<W: Write> OutputWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, blocks: 0 }
    }

    /// Write one complete block and flush it.
    pub fn emit(&mut self, block: &str) -> io::Result<()> {
        self.inner.write_all(block.as_bytes())?;
        self.inner.flush()?;
        self.blocks += 1;
        Ok(())
    }

    pub fn blocks_written(&self) -> usize {
        self.blocks
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// True for the error a write gets once the reader has gone away.
pub fn is_broken_pipe(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::BrokenPipe
}

// ============================================================================
// Tests
// ============================================================================
