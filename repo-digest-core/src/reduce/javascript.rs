use tree_sitter::{Node, Tree};

use super::parse_clean;
use super::strip::{strip_comments, CommentStyle};
use crate::contract::{ReductionResult, Reducer};
use crate::language::{Dialect, LanguageFamily};

/// Top-level statements kept verbatim.
const DECLARATION_KINDS: &[&str] = &[
    "function_declaration",
    "generator_function_declaration",
    "class_declaration",
    "abstract_class_declaration",
    "lexical_declaration",
    "variable_declaration",
];

/// Keeps top-level function, class and variable declarations of JavaScript
/// and TypeScript files, sliced by whole lines from the original source.
#[derive(Debug, Default, Clone, Copy)]
pub struct JavaScriptReducer;

impl Reducer for JavaScriptReducer {
    fn family(&self) -> LanguageFamily {
        LanguageFamily::JavaScriptFamily
    }

    fn reduce(&self, virtual_path: &str, content: &str) -> ReductionResult {
        let dialect = match Dialect::from_path(virtual_path) {
            d @ (Dialect::JavaScript | Dialect::Jsx | Dialect::TypeScript | Dialect::Tsx) => d,
            _ => Dialect::JavaScript,
        };
        match parse_clean(dialect, content) {
            Some(tree) => ReductionResult::structural(slice_declarations(&tree, content)),
            None => ReductionResult::comment_stripped(strip_comments(content, CommentStyle::CLike)),
        }
    }
}

fn slice_declarations(tree: &Tree, source: &str) -> String {
    let lines: Vec<&str> = source.split('\n').collect();
    let root = tree.root_node();
    let mut kept: Vec<&str> = Vec::new();

    let mut cursor = root.walk();
    for node in root.named_children(&mut cursor) {
        if !is_declaration(node) {
            continue;
        }
        let start = node.start_position().row;
        let end = node.end_position().row.min(lines.len().saturating_sub(1));
        if start <= end {
            kept.extend_from_slice(&lines[start..=end]);
        }
    }

    kept.join("\n")
}

fn is_declaration(node: Node<'_>) -> bool {
    if DECLARATION_KINDS.contains(&node.kind()) {
        return true;
    }
    node.kind() == "export_statement"
        && node
            .child_by_field_name("declaration")
            .is_some_and(|decl| DECLARATION_KINDS.contains(&decl.kind()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::ReductionTier;

    #[test]
    fn keeps_top_level_declarations_with_original_formatting() {
        let src = "// header\nimport x from 'x';\n\nfunction add(a, b) {\n  return a + b; // sum\n}\n\nconsole.log(add(1, 2));\nconst K = 3;\nclass Box {\n  open() {}\n}\n";
        let result = JavaScriptReducer.reduce("src/app.js", src);
        assert_eq!(result.tier, ReductionTier::Structural);
        assert_eq!(
            result.text,
            "function add(a, b) {\n  return a + b; // sum\n}\nconst K = 3;\nclass Box {\n  open() {}\n}"
        );
    }

    #[test]
    fn exported_declarations_are_kept() {
        let src = "export const a = 1;\nexport default foo;\nexport function b() {}\n";
        let result = JavaScriptReducer.reduce("lib/index.js", src);
        assert_eq!(result.text, "export const a = 1;\nexport function b() {}");
    }

    #[test]
    fn typescript_uses_its_own_grammar() {
        let src = "interface Shape { area(): number }\nexport class Square implements Shape {\n  constructor(private side: number) {}\n  area(): number { return this.side ** 2; }\n}\nlet count: number = 0;\n";
        let result = JavaScriptReducer.reduce("shapes.ts", src);
        assert_eq!(result.tier, ReductionTier::Structural);
        assert!(result.text.starts_with("export class Square implements Shape {"));
        assert!(result.text.ends_with("let count: number = 0;"));
        assert!(!result.text.contains("interface Shape"));
    }

    #[test]
    fn jsx_parses_structurally() {
        let src = "function App() {\n  return <div className=\"app\">{/* todo */}</div>;\n}\n";
        let result = JavaScriptReducer.reduce("App.jsx", src);
        assert_eq!(result.tier, ReductionTier::Structural);
        assert!(result.text.contains("function App() {"));
    }

    #[test]
    fn parse_failure_strips_comments() {
        let src = "function broken( {\n  // gone\n  return 1;\n";
        let result = JavaScriptReducer.reduce("broken.js", src);
        assert_eq!(result.tier, ReductionTier::CommentStripped);
        assert!(!result.text.contains("gone"));
        assert!(result.text.contains("return 1;"));
    }
}
