//! Path escaping for the two grammars a generated rule file speaks.
//!
//! Every source path ends up in two places:
//!
//! ```text
//! a\ b'c.html.gz: a\ b'c.html              ← rule grammar (targets, prerequisites)
//! 	zopfli --i127 a\ b\'c.html           ← shell grammar (recipe arguments)
//! ```
//!
//! The grammars disagree on which characters are special. The build tool
//! treats `'` as an ordinary character but reads `$`, `:` and `#` as
//! syntax; the shell is the other way round. A single escaping function
//! cannot serve both, so this module exposes two:
//!
//! - [`rule_token`]: one target/prerequisite name that the build tool reads
//!   back as exactly the original path.
//! - [`command_token`]: one shell word that the shell reads back as exactly
//!   the original path.
//!
//! Both render from the same quoting primitive ([`shell_pieces`]), which
//! decides per character whether it is literal, backslash-escaped, or has to
//! be single-quoted. [`rule_token`] only post-processes those pieces, so the
//! two flavors cannot drift apart.
//!
//! ## Rule grammar model
//!
//! The build tool (GNU make) reads a name in two steps. First the rule line
//! is split: blanks separate names, `:` ends the target list, `#` starts a
//! comment, and `$` starts a variable reference. A backslash protects a
//! following blank, `:` or `#`, and a run of backslashes in front of one of
//! those is halved. Any other backslash is an ordinary character, and `$$`
//! denotes one `$`. Second, a name containing `*`, `?` or `[` is matched as a
//! wildcard pattern, which consumes one more level of backslashes anywhere in
//! the name.
//!
//! Recipe lines additionally go through [`recipe_line`], because the build
//! tool expands `$` in recipe text before the shell ever sees it.
//!
//! ## Unspellable names
//!
//! Some characters have no escape in the rule grammar: `;` (inline recipe),
//! `=` (variable assignment), `|` (order-only prerequisites), `%` (pattern
//! rules), parentheses (archive members), a leading `~` (home directory),
//! and newline. [`rule_token`] stays total and passes them through, so
//! callers must reject such paths first with [`rule_unspellable`] (the
//! generator does, see [`crate::rules::UnsupportedReason`]).

/// Characters the shell interprets outside quotes, escaped with a backslash.
const SHELL_SPECIAL: &[char] = &[
    ' ', '\t', '`', '~', '!', '#', '$', '&', '*', '(', ')', '\\', '|', '[', ']', '{', '}', ';',
    '\'', '"', '<', '>', '?', '=', '^',
];

/// Characters a rule line splits on or reads as a comment; a backslash
/// protects them.
const LINE_SPECIAL: &[char] = &[' ', '\t', ':', '#'];

/// Characters that turn a name into a wildcard pattern.
const WILDCARD: &[char] = &['*', '?', '['];

/// Characters the rule grammar cannot escape.
const RULE_UNSPELLABLE: &[char] = &['\n', ';', '=', '|', '%', '(', ')'];

/// One character of a path after shell quoting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece {
    /// Passed through unchanged.
    Literal(char),
    /// Preceded by a backslash.
    Escaped(char),
    /// Wrapped in single quotes; only used for characters a backslash
    /// cannot protect (a backslash-newline is a line continuation).
    Quoted(char),
}

impl Piece {
    /// The path character this piece stands for.
    pub fn char(self) -> char {
        match self {
            Piece::Literal(c) | Piece::Escaped(c) | Piece::Quoted(c) => c,
        }
    }
}

/// Split a path into shell-quoting pieces.
///
/// This is the shared primitive behind both token flavors.
pub fn shell_pieces(path: &str) -> Vec<Piece> {
    path.chars()
        .map(|c| {
            if c == '\n' {
                Piece::Quoted(c)
            } else if SHELL_SPECIAL.contains(&c) {
                Piece::Escaped(c)
            } else {
                Piece::Literal(c)
            }
        })
        .collect()
}

/// Escape a path as a single shell word.
///
/// ```
/// use precompress_mk::escape::command_token;
/// assert_eq!(command_token("a b'c.html"), r"a\ b\'c.html");
/// assert_eq!(command_token(""), "''");
/// ```
pub fn command_token(path: &str) -> String {
    if path.is_empty() {
        return "''".to_string();
    }
    let mut out = String::with_capacity(path.len() * 2);
    for piece in shell_pieces(path) {
        match piece {
            Piece::Literal(c) => out.push(c),
            Piece::Escaped(c) => {
                out.push('\\');
                out.push(c);
            }
            Piece::Quoted(c) => push_quoted(&mut out, c),
        }
    }
    out
}

/// Escape a path as a single target or prerequisite name.
///
/// Same pieces as [`command_token`], rendered for the rule grammar: shell
/// metacharacters go back to literals, `$` becomes `$$`, blanks, `:` and `#`
/// gain a backslash, and so do the wildcard characters when the name would
/// otherwise be matched as a pattern. A literal backslash is doubled in front
/// of a protected character, and doubled once more inside a pattern.
///
/// Characters reported by [`rule_unspellable`] are passed through unchanged
/// and will not survive the build tool.
///
/// ```
/// use precompress_mk::escape::rule_token;
/// assert_eq!(rule_token("a b'c.html"), r"a\ b'c.html");
/// assert_eq!(rule_token("$x:y.css"), r"$$x\:y.css");
/// assert_eq!(rule_token("[x].css"), r"\[x\].css");
/// ```
pub fn rule_token(path: &str) -> String {
    if path.is_empty() {
        return "''".to_string();
    }
    let pattern = path.contains(WILDCARD);
    let pieces = shell_pieces(path);
    let mut out = String::with_capacity(path.len() * 2);
    for (i, piece) in pieces.iter().enumerate() {
        match *piece {
            Piece::Escaped('\\') => {
                let before_special = pieces[i..]
                    .iter()
                    .map(|p| p.char())
                    .find(|&c| c != '\\')
                    .is_some_and(|c| LINE_SPECIAL.contains(&c));
                let mut copies = if pattern { 2 } else { 1 };
                if before_special {
                    copies *= 2;
                }
                out.push_str(&"\\".repeat(copies));
            }
            Piece::Escaped('$') => out.push_str("$$"),
            Piece::Escaped(c) | Piece::Literal(c) if LINE_SPECIAL.contains(&c) => {
                out.push('\\');
                out.push(c);
            }
            Piece::Escaped(c @ ('*' | '?' | '[' | ']')) if pattern => {
                out.push('\\');
                out.push(c);
            }
            other => out.push(other.char()),
        }
    }
    out
}

/// The first character of `path` that no rule token can spell, if any.
///
/// ```
/// use precompress_mk::escape::rule_unspellable;
/// assert_eq!(rule_unspellable("a;b.css"), Some(';'));
/// assert_eq!(rule_unspellable("~home.html"), Some('~'));
/// assert_eq!(rule_unspellable("a~b.html"), None);
/// ```
pub fn rule_unspellable(path: &str) -> Option<char> {
    if path.starts_with('~') {
        return Some('~');
    }
    path.chars().find(|c| RULE_UNSPELLABLE.contains(c))
}

/// Join shell words into a recipe line body.
///
/// The words must already be shell tokens (see [`command_token`]). Every `$`
/// is doubled so the build tool's variable expansion hands the shell the
/// text unchanged.
pub fn recipe_line<S: AsRef<str>>(words: &[S]) -> String {
    let joined = words
        .iter()
        .map(|w| w.as_ref())
        .collect::<Vec<_>>()
        .join(" ");
    joined.replace('$', "$$")
}

fn push_quoted(out: &mut String, c: char) {
    out.push('\'');
    out.push(c);
    out.push('\'');
}
