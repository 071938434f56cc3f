//! Language reducers: strip a file down to its structurally significant parts.
//!
//! Each [`LanguageFamily`] has one [`Reducer`] implementation that owns its
//! grammar and its fallback ladder:
//!
//! | family     | structural                               | on parse failure   |
//! |------------|------------------------------------------|--------------------|
//! | Python     | imports, classes, functions, assignments | `#` comments strip |
//! | JS / TS    | top-level functions, classes, variables  | `//` comments strip|
//! | C / C++    | functions, struct/union/enum, typedefs   | raw content        |
//! | other      | (none)                                   | raw content        |
//!
//! "Parse failure" means the tree-sitter tree contains error or missing nodes.
//! Whatever the tier, the result goes through [`collapse_line_breaks`].

pub mod c_family;
pub mod javascript;
pub mod python;
pub mod strip;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};
use tree_sitter::{Parser, Tree};

use crate::contract::{ReductionResult, Reducer};
use crate::language::{Dialect, LanguageFamily};

pub use c_family::CFamilyReducer;
pub use javascript::JavaScriptReducer;
pub use python::PythonReducer;
pub use strip::{strip_comments, CommentStyle};

static EXCESS_LINE_BREAKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Collapse every run of three or more newlines to exactly two.
pub fn collapse_line_breaks(content: &str) -> String {
    EXCESS_LINE_BREAKS.replace_all(content, "\n\n").into_owned()
}

/// Parse `content` and return the tree only if it is free of syntax errors.
pub(crate) fn parse_clean(dialect: Dialect, content: &str) -> Option<Tree> {
    let language = dialect.tree_sitter_language()?;
    let mut parser = Parser::new();
    if let Err(e) = parser.set_language(&language) {
        warn!(error = %e, ?dialect, "Failed to load tree-sitter grammar");
        return None;
    }
    let tree = parser.parse(content, None)?;
    if tree.root_node().has_error() {
        debug!(?dialect, "Syntax tree contains errors");
        return None;
    }
    Some(tree)
}

/// Dispatches each file to the reducer for its language family.
#[derive(Debug, Default, Clone, Copy)]
pub struct LanguageReducer {
    python: PythonReducer,
    javascript: JavaScriptReducer,
    c_family: CFamilyReducer,
}

impl LanguageReducer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reducer_for(&self, family: LanguageFamily) -> Option<&dyn Reducer> {
        match family {
            LanguageFamily::Python => Some(&self.python),
            LanguageFamily::JavaScriptFamily => Some(&self.javascript),
            LanguageFamily::CFamily => Some(&self.c_family),
            LanguageFamily::Other => None,
        }
    }

    /// Reduce one file. Never fails: the worst case is the content unchanged.
    pub fn reduce(&self, virtual_path: &str, content: &str) -> ReductionResult {
        let family = LanguageFamily::from_path(virtual_path);
        let result = match self.reducer_for(family) {
            Some(reducer) => reducer.reduce(virtual_path, content),
            None => ReductionResult::raw(content.to_string()),
        };

        if result.fell_back() && family != LanguageFamily::Other {
            warn!(
                path = virtual_path,
                ?family,
                tier = ?result.tier,
                "Structural parse failed, using fallback"
            );
        }

        ReductionResult {
            text: collapse_line_breaks(&result.text),
            tier: result.tier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::ReductionTier;

    #[test]
    fn collapses_runs_of_newlines() {
        assert_eq!(collapse_line_breaks("a\n\n\n\nb\n\nc\n\n\n"), "a\n\nb\n\nc\n\n");
        assert_eq!(collapse_line_breaks("no breaks"), "no breaks");
    }

    #[test]
    fn other_extensions_pass_through() {
        let reducer = LanguageReducer::new();
        let result = reducer.reduce("notes.txt", "keep // this\n\n\n\nline");
        assert_eq!(result.tier, ReductionTier::Raw);
        assert_eq!(result.text, "keep // this\n\nline");
    }

    #[test]
    fn python_failure_strips_hash_comments() {
        let reducer = LanguageReducer::new();
        let result = reducer.reduce("bad.py", "def broken(:\n    pass  # why\n");
        assert_eq!(result.tier, ReductionTier::CommentStripped);
        assert!(!result.text.contains("why"));
        assert!(result.text.contains("def broken(:"));
    }
}
