use std::collections::VecDeque;
use std::ops::Range;

use tree_sitter::{Node, Tree};

use super::parse_clean;
use super::strip::{strip_comments, CommentStyle};
use crate::contract::{ReductionResult, Reducer};
use crate::language::{Dialect, LanguageFamily};

/// Keeps imports, class and function definitions and plain assignments,
/// wherever they are nested.
#[derive(Debug, Default, Clone, Copy)]
pub struct PythonReducer;

impl Reducer for PythonReducer {
    fn family(&self) -> LanguageFamily {
        LanguageFamily::Python
    }

    fn reduce(&self, _virtual_path: &str, content: &str) -> ReductionResult {
        let tree = parse_clean(Dialect::Python, content)
            .filter(|tree| !has_python2_statements(tree.root_node()));
        match tree {
            Some(tree) => ReductionResult::structural(render_declarations(&tree, content)),
            None => ReductionResult::comment_stripped(strip_comments(content, CommentStyle::Hash)),
        }
    }
}

/// The grammar still accepts `print x` and `exec code`, which Python 3 rejects.
fn has_python2_statements(node: Node<'_>) -> bool {
    if matches!(node.kind(), "print_statement" | "exec_statement") {
        return true;
    }
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .any(|child| has_python2_statements(child));
    found
}

/// Breadth-first walk over every named node, rendering each retained one.
/// Nested definitions therefore show up inside their parent and again on
/// their own.
fn render_declarations(tree: &Tree, source: &str) -> String {
    let mut queue = VecDeque::from([tree.root_node()]);
    let mut rendered = Vec::new();

    while let Some(node) = queue.pop_front() {
        if let Some(span) = retained_span(node) {
            let text = render(span, source);
            if !text.is_empty() {
                rendered.push(text);
            }
        }
        let mut cursor = node.walk();
        queue.extend(node.named_children(&mut cursor));
    }

    rendered.join("\n")
}

/// The node whose source range represents `node` in the output, if `node` is
/// a kind worth keeping.
fn retained_span(node: Node<'_>) -> Option<Node<'_>> {
    match node.kind() {
        "import_statement" | "import_from_statement" | "future_import_statement" => Some(node),
        "function_definition" | "class_definition" => match node.parent() {
            Some(parent) if parent.kind() == "decorated_definition" => Some(parent),
            _ => Some(node),
        },
        // `x = 1` only: annotated assignments carry a `type` field, chained
        // ones nest an assignment under another assignment
        "assignment" if node.child_by_field_name("type").is_none() => node
            .parent()
            .filter(|parent| parent.kind() == "expression_statement"),
        _ => None,
    }
}

/// Source text of `node` without comments, docstrings or blank lines.
fn render(node: Node<'_>, source: &str) -> String {
    let mut skipped = Vec::new();
    collect_noise(node, &mut skipped);

    let mut text = String::new();
    let mut cursor = node.start_byte();
    for range in skipped {
        if range.start > cursor {
            text.push_str(source.get(cursor..range.start).unwrap_or(""));
        }
        cursor = cursor.max(range.end);
    }
    if node.end_byte() > cursor {
        text.push_str(source.get(cursor..node.end_byte()).unwrap_or(""));
    }

    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Byte ranges of comments and docstrings under `node`, in source order.
fn collect_noise(node: Node<'_>, out: &mut Vec<Range<usize>>) {
    if node.kind() == "comment" || is_docstring(node) {
        out.push(node.start_byte()..node.end_byte());
        return;
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_noise(child, out);
    }
}

/// A bare string statement opening the body of a class or function.
fn is_docstring(node: Node<'_>) -> bool {
    if node.kind() != "expression_statement" || node.named_child_count() != 1 {
        return false;
    }
    let is_string = node
        .named_child(0)
        .is_some_and(|child| matches!(child.kind(), "string" | "concatenated_string"));
    if !is_string {
        return false;
    }
    let Some(block) = node.parent().filter(|parent| parent.kind() == "block") else {
        return false;
    };
    let owned_by_definition = block
        .parent()
        .is_some_and(|owner| matches!(owner.kind(), "function_definition" | "class_definition"));

    let mut cursor = block.walk();
    let first_statement = block
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment");
    owned_by_definition && first_statement == Some(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::ReductionTier;

    fn reduce(src: &str) -> ReductionResult {
        PythonReducer.reduce("mod.py", src)
    }

    #[test]
    fn keeps_imports_and_functions_without_docstrings() {
        let result = reduce("import os\n\ndef f():\n    \"\"\"doc\"\"\"\n    return 1\n");
        assert_eq!(result.tier, ReductionTier::Structural);
        assert_eq!(result.text, "import os\ndef f():\n    return 1");
    }

    #[test]
    fn drops_module_level_expressions_and_control_flow() {
        let src = "\"\"\"Module doc.\"\"\"\nimport sys\nprint('hi')\nif __name__ == '__main__':\n    main()\n";
        let result = reduce(src);
        assert_eq!(result.text, "import sys");
    }

    #[test]
    fn keeps_plain_assignments_only() {
        let src = "A = 1\nB: int = 2\nC += 3\nD = E = 4\n";
        let result = reduce(src);
        assert_eq!(result.text, "A = 1\nD = E = 4");
    }

    #[test]
    fn decorated_definitions_keep_their_decorators() {
        let src = "@dataclass\nclass Point:\n    \"\"\"A point.\"\"\"\n    x = 0  # origin\n";
        let result = reduce(src);
        let lines: Vec<&str> = result.text.lines().collect();
        assert_eq!(lines, vec!["@dataclass", "class Point:", "    x = 0", "x = 0"]);
    }

    #[test]
    fn nested_definitions_are_emitted_again_after_their_parent() {
        let src = "class A:\n    def m(self):\n        return 2\n";
        let result = reduce(src);
        assert_eq!(
            result.text,
            "class A:\n    def m(self):\n        return 2\ndef m(self):\n        return 2"
        );
    }

    #[test]
    fn only_the_first_string_is_a_docstring() {
        let src = "def f():\n    \"\"\"doc\"\"\"\n    \"kept\"\n    return 1\n";
        let result = reduce(src);
        assert!(!result.text.contains("doc"));
        assert!(result.text.contains("\"kept\""));
    }

    #[test]
    fn python2_statements_fall_back_to_comment_stripping() {
        let src = "# legacy helper\nimport os\nprint 'hello'  # say hi\nexec \"x = 1\"\n";
        let result = reduce(src);
        assert_eq!(result.tier, ReductionTier::CommentStripped);
        assert!(result.text.contains("import os"));
        assert!(result.text.contains("print 'hello'"));
        assert!(result.text.contains("exec \"x = 1\""));
        assert!(!result.text.contains("legacy helper"));
        assert!(!result.text.contains("say hi"));
    }

    #[test]
    fn invalid_syntax_falls_back_to_comment_stripping() {
        let result = reduce("def f(:\n    # note\n    pass\n");
        assert_eq!(result.tier, ReductionTier::CommentStripped);
        assert!(!result.text.contains("note"));
    }
}
