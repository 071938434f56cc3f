use tree_sitter::{Node, Tree};

use super::parse_clean;
use crate::contract::{ReductionResult, Reducer};
use crate::language::{Dialect, LanguageFamily};

/// Items kept from C and C++ sources.
const DEFINITION_KINDS: &[&str] = &[
    "function_definition",
    "struct_specifier",
    "union_specifier",
    "enum_specifier",
    "type_definition",
    "class_specifier",
];

/// Containers whose items count as top level: include guards, conditional
/// compilation, `extern "C"` blocks and namespaces.
const TRANSPARENT_KINDS: &[&str] = &[
    "preproc_ifdef",
    "preproc_if",
    "preproc_else",
    "preproc_elif",
    "linkage_specification",
    "namespace_definition",
    "template_declaration",
    "declaration_list",
];

/// Keeps function definitions, struct/union/enum declarations and typedefs.
///
/// A kept item runs from its first line through the first *following* line
/// whose trimmed text ends in `;` or `}`. For a multi-line function that is
/// often the first statement of its body, not the closing brace.
#[derive(Debug, Default, Clone, Copy)]
pub struct CFamilyReducer;

impl Reducer for CFamilyReducer {
    fn family(&self) -> LanguageFamily {
        LanguageFamily::CFamily
    }

    fn reduce(&self, virtual_path: &str, content: &str) -> ReductionResult {
        let dialect = match Dialect::from_path(virtual_path) {
            Dialect::Cpp => Dialect::Cpp,
            _ => Dialect::C,
        };
        match parse_clean(dialect, content) {
            Some(tree) => ReductionResult::structural(slice_definitions(&tree, content)),
            // without a preprocessor C often fails to parse; hand it over untouched
            None => ReductionResult::raw(content.to_string()),
        }
    }
}

fn slice_definitions(tree: &Tree, source: &str) -> String {
    let lines: Vec<&str> = source.split('\n').collect();
    let mut items = Vec::new();
    collect_definitions(tree.root_node(), &mut items);

    let mut kept: Vec<&str> = Vec::new();
    for node in items {
        let start = node.start_position().row;
        let end = heuristic_end(&lines, start).min(lines.len());
        if start < end {
            kept.extend_from_slice(&lines[start..end]);
        }
    }
    kept.join("\n")
}

fn collect_definitions<'tree>(node: Node<'tree>, out: &mut Vec<Node<'tree>>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if DEFINITION_KINDS.contains(&child.kind()) {
            out.push(child);
        } else if TRANSPARENT_KINDS.contains(&child.kind()) {
            collect_definitions(child, out);
        }
    }
}

/// Exclusive end row: one past the first line after `start` that ends in `;`
/// or `}`, or just the start line when there is none.
fn heuristic_end(lines: &[&str], start: usize) -> usize {
    lines
        .iter()
        .enumerate()
        .skip(start + 1)
        .find(|(_, line)| {
            let trimmed = line.trim();
            trimmed.ends_with(';') || trimmed.ends_with('}')
        })
        .map(|(idx, _)| idx + 1)
        .unwrap_or(start + 1)
}
