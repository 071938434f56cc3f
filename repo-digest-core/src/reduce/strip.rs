//! Regex comment stripping, the middle fallback tier.
//!
//! Patterns are applied without any notion of string literals, so a `//` inside
//! a URL string or a `#` inside a Python string is stripped as well. That is a
//! known limitation of this tier, not something to fix here: callers only get
//! this text when the structural parse already failed.

use once_cell::sync::Lazy;
use regex::Regex;

/// Comment syntax to strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    /// `//` and `/* */`, including the JSX `{/* */}` and `{// }` forms
    CLike,
    /// `#` line comments and triple-quoted blocks
    Hash,
}

static C_LIKE_COMMENTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"//.*|/\*[\s\S]*?\*/|\{/\*[\s\S]*?\*/\}|\{//.*?\}").unwrap()
});

static HASH_COMMENTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"#.*|'''[\s\S]*?'''|"""[\s\S]*?""""#).unwrap());

/// Remove every comment-like sequence of the given style.
pub fn strip_comments(content: &str, style: CommentStyle) -> String {
    let pattern = match style {
        CommentStyle::CLike => &*C_LIKE_COMMENTS,
        CommentStyle::Hash => &*HASH_COMMENTS,
    };
    pattern.replace_all(content, "").into_owned()
}
