//! Shared test utilities for the precompress-mk test suite.
//!
//! Provides a temp-tree builder for discovery and generator tests, plus
//! reference tokenizers for the two grammars escaped paths must survive.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = make_tree(&["index.html", "css/site.css"]);
//! let token = crate::escape::rule_token("a b.html");
//! assert_eq!(unescape_rule(&token).as_deref(), Ok("a b.html"));
//! ```

use std::fs;
use tempfile::TempDir;

/// Paths exercising every character class the escapers care about, all of
/// them spellable in both grammars.
///
/// Newline and the empty string are tested separately: neither is a valid
/// rule-grammar name.
pub const NASTY_PATHS: &[&str] = &[
    "index.html",
    "a b'c.html",
    " leading.css",
    "trailing.js ",
    "tab\there.svg",
    "$HOME/x.json",
    "$$double.js",
    "`id`.js",
    "\"dq\".html",
    "it's.css",
    r"back\slash.xml",
    r"back\ space.css",
    r"\'mixed\\'.html",
    "*.html",
    "q?.svg",
    "[ab].css",
    "x].css",
    r"glob\*.css",
    r"pat\ *.js",
    "amp&x.html",
    "<lt>gt>.xml",
    "colon:x.json",
    "hash#x.css",
    "mid~tilde.html",
    "bang!x.html",
    "{brace}.svg",
    "caret^x.css",
    "uni ç ☃.html",
    "dir with space/nested 'q'/f.js",
];

/// Paths the shell can take but the rule grammar has no spelling for.
pub const UNSPELLABLE_PATHS: &[&str] = &[
    "(paren).js",
    "photo (1).html",
    "pipe|x.html",
    "semi;x.css",
    "pct%x.html",
    "eq=x.js",
    "~tilde.html",
    "line\nbreak.html",
];

// =========================================================================
// Fixture setup
// =========================================================================

/// Create a temp directory containing the given relative file paths.
///
/// Parent directories are created as needed; files get a short body.
pub fn make_tree(files: &[&str]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for file in files {
        let path = tmp.path().join(file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, b"body").unwrap();
    }
    tmp
}

// =========================================================================
// Grammar models
// =========================================================================

/// Tokenize `token` as one shell word and return the literal it denotes.
///
/// Supports backslash escapes and single-quoted runs. Any unquoted
/// whitespace or metacharacter is an error: it would split the word or be
/// interpreted by the shell.
pub fn unescape_shell(token: &str) -> Result<String, String> {
    let mut out = String::new();
    let mut chars = token.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('\n') => return Err("backslash-newline is a continuation".into()),
                Some(next) => out.push(next),
                None => return Err("trailing backslash".into()),
            },
            '\'' => loop {
                match chars.next() {
                    Some('\'') => break,
                    Some(q) => out.push(q),
                    None => return Err("unterminated single quote".into()),
                }
            },
            ' ' | '\t' | '\n' => return Err(format!("unquoted whitespace in {token:?}")),
            '$' | '`' | '"' | '*' | '?' | '[' | ']' | '(' | ')' | '|' | '&' | ';' | '<' | '>'
            | '{' | '}' | '~' | '!' | '#' | '=' | '^' => {
                return Err(format!("unquoted {c:?} in {token:?}"));
            }
            _ => out.push(c),
        }
    }
    Ok(out)
}

/// Tokenize `token` as one target/prerequisite name the way GNU make reads
/// it and return the file name it denotes.
///
/// Line pass: `$$` is one `$`; a run of backslashes before a blank, `:` or
/// `#` is halved and protects that character when the run was odd; other
/// backslashes stay. Pattern pass, only when the result contains `*`, `?`
/// or `[`: every backslash makes the next character literal. Unprotected
/// separators, lone `$`, unescaped wildcards, a leading `~` and characters
/// with no escape are errors.
pub fn unescape_rule(token: &str) -> Result<String, String> {
    let chars: Vec<char> = token.chars().collect();
    let mut line = String::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            '\\' => {
                let run = chars[i..].iter().take_while(|&&b| b == '\\').count();
                match chars.get(i + run) {
                    Some(&next) if matches!(next, ' ' | '\t' | ':' | '#') => {
                        if run % 2 == 0 {
                            return Err(format!("unprotected {next:?} in {token:?}"));
                        }
                        line.push_str(&"\\".repeat(run / 2));
                        line.push(next);
                        i += run + 1;
                    }
                    _ => {
                        line.push_str(&"\\".repeat(run));
                        i += run;
                    }
                }
            }
            '$' => match chars.get(i + 1) {
                Some('$') => {
                    line.push('$');
                    i += 2;
                }
                _ => return Err(format!("variable reference in {token:?}")),
            },
            ' ' | '\t' | '\n' | ':' | '#' | ';' | '=' | '|' | '%' | '(' | ')' => {
                return Err(format!("unescaped {c:?} in {token:?}"));
            }
            _ => {
                line.push(c);
                i += 1;
            }
        }
    }
    if line.starts_with('~') {
        return Err(format!("home directory reference in {token:?}"));
    }
    if !line.contains(['*', '?', '[']) {
        return Ok(line);
    }

    let mut out = String::new();
    let mut rest = line.chars();
    while let Some(c) = rest.next() {
        match c {
            '\\' => match rest.next() {
                Some(next) => out.push(next),
                None => return Err(format!("trailing backslash in pattern {token:?}")),
            },
            '*' | '?' | '[' => return Err(format!("wildcard {c:?} in {token:?}")),
            _ => out.push(c),
        }
    }
    Ok(out)
}

#[test]
fn shell_model_rejects_unquoted_space() {
    assert!(unescape_shell("a b").is_err());
}

#[test]
fn shell_model_reads_single_quotes() {
    assert_eq!(unescape_shell(r"'a b'\''c'").as_deref(), Ok("a b'c"));
}

#[test]
fn rule_model_rejects_lone_dollar() {
    assert!(unescape_rule("$x").is_err());
}

#[test]
fn rule_model_reads_double_dollar() {
    assert_eq!(unescape_rule(r"$$x\ y").as_deref(), Ok("$x y"));
}

#[test]
fn rule_model_keeps_backslash_before_ordinary_character() {
    assert_eq!(unescape_rule(r"a\(b").as_deref(), Ok(r"a\(b"));
}

#[test]
fn rule_model_halves_backslash_run_before_blank() {
    assert_eq!(unescape_rule(r"a\\\ b").as_deref(), Ok(r"a\ b"));
    assert!(unescape_rule(r"a\\ b").is_err());
}

#[test]
fn rule_model_unescapes_patterns() {
    assert_eq!(unescape_rule(r"\[x\]\\.css").as_deref(), Ok(r"[x]\.css"));
    assert!(unescape_rule("*.css").is_err());
}
