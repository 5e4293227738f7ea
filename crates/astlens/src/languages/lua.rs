//! Lua language support for astlens.
//!
//! Parses with tree-sitter-lua. The adapter is strict: any syntax error turns
//! the whole parse into an Error-kind root, pointing at the first problem in
//! document order. Ranges are reported from line/column points and text is
//! resolved against the editor surface by range.
//!
//! Block bodies are not nodes of their own in either view: a loop, function or
//! clause lists its body statements directly after its header children.
//!
//! Strictness is bounded by the grammar. Tree-sitter-lua has no reserved-word
//! check, so `x = 1 +\nlocal y = 2` parses cleanly with `local` read as an
//! identifier and is not reported.

use super::tree_sitter_utils::{
    error_properties, field_child, field_children, infrastructure_failure, named_children,
    parse_tree, syntax_properties, to_native, PositionFields,
};
use super::LanguageAdapter;
use crate::native::{byte_position, NativeNode, ParseFailure, ParsedSource, SyntaxNode};
use crate::position::TextSurface;
use crate::projector::PropertyValue;
use crate::types::{SourceSelection, StyleClass};

/// Tree-sitter node kind constants for the Lua grammar.
mod node_kinds {
    // Containers
    pub const CHUNK: &str = "chunk";
    pub const BLOCK: &str = "block";

    // Statements with bodies
    pub const DO_STATEMENT: &str = "do_statement";
    pub const WHILE_STATEMENT: &str = "while_statement";
    pub const REPEAT_STATEMENT: &str = "repeat_statement";
    pub const FOR_STATEMENT: &str = "for_statement";
    pub const IF_STATEMENT: &str = "if_statement";
    pub const ELSEIF_STATEMENT: &str = "elseif_statement";
    pub const ELSE_STATEMENT: &str = "else_statement";
    pub const FUNCTION_DECLARATION: &str = "function_declaration";
    pub const FUNCTION_DEFINITION: &str = "function_definition";

    // Tables
    pub const TABLE_CONSTRUCTOR: &str = "table_constructor";
    pub const FIELD: &str = "field";

    // Extras
    pub const COMMENT: &str = "comment";
    pub const HASH_BANG_LINE: &str = "hash_bang_line";

    // Literals
    pub const STRING: &str = "string";
    pub const STRING_CONTENT: &str = "string_content";
    pub const ESCAPE_SEQUENCE: &str = "escape_sequence";
    pub const NUMBER: &str = "number";
    pub const TRUE: &str = "true";
    pub const FALSE: &str = "false";
    pub const NIL: &str = "nil";
}

const SAMPLE_SOURCE: &str = r#"local tab = {
  variable = "string",
  method = function (self) print(self.variable) end
}

tab:method()
"#;

/// Lua language adapter.
pub struct LuaLanguage;

impl LanguageAdapter for LuaLanguage {
    fn name(&self) -> &'static str {
        "lua"
    }

    fn editor_language(&self) -> &'static str {
        "lua"
    }

    fn kind_key(&self) -> &'static str {
        "type"
    }

    fn sample_source(&self) -> &'static str {
        SAMPLE_SOURCE
    }

    fn parse(&self, text: &str) -> ParsedSource {
        let tree = match parse_tree(&tree_sitter_lua::LANGUAGE.into(), text) {
            Ok(tree) => tree,
            Err(message) => return ParsedSource::failed(text, infrastructure_failure(message)),
        };

        let root = tree.root_node();
        if root.has_error() {
            let failure = describe_failure(root, text);
            tracing::debug!(message = %failure.message, "Lua source rejected");
            return ParsedSource::failed(text, failure);
        }

        tracing::debug!(nodes = root.descendant_count(), "Parsed Lua source");
        ParsedSource::from_tree(text, tree)
    }

    fn extended_children<'a>(&self, node: NativeNode<'a>) -> Vec<NativeNode<'a>> {
        let Some(syntax) = node.as_syntax() else {
            return Vec::new();
        };
        let spliced = named_children(syntax)
            .into_iter()
            .flat_map(|child| {
                if child.kind() == node_kinds::BLOCK {
                    named_children(child)
                } else {
                    vec![child]
                }
            })
            .collect();
        to_native(spliced)
    }

    fn children<'a>(&self, node: NativeNode<'a>) -> Vec<NativeNode<'a>> {
        use node_kinds::{
            BLOCK, CHUNK, DO_STATEMENT, ELSEIF_STATEMENT, ELSE_STATEMENT, FIELD, FOR_STATEMENT,
            FUNCTION_DECLARATION, FUNCTION_DEFINITION, IF_STATEMENT, REPEAT_STATEMENT,
            TABLE_CONSTRUCTOR, WHILE_STATEMENT,
        };

        let Some(syntax) = node.as_syntax() else {
            return Vec::new();
        };

        let structural = match syntax.kind() {
            CHUNK | BLOCK => statements(syntax),
            DO_STATEMENT | WHILE_STATEMENT | REPEAT_STATEMENT | FOR_STATEMENT
            | FUNCTION_DECLARATION | FUNCTION_DEFINITION | ELSE_STATEMENT => {
                body_statements(syntax, "body")
            }
            IF_STATEMENT | ELSEIF_STATEMENT => {
                let mut clauses = body_statements(syntax, "consequence");
                clauses.extend(field_children(syntax, "alternative"));
                clauses
            }
            TABLE_CONSTRUCTOR => named_children(syntax)
                .into_iter()
                .filter(|child| child.kind() == FIELD)
                .collect(),
            _ => Vec::new(),
        };
        to_native(structural)
    }

    fn source_range(&self, node: NativeNode<'_>, _surface: &dyn TextSurface) -> SourceSelection {
        match node {
            NativeNode::Syntax(syntax) => {
                SourceSelection::new(syntax.start_position(), syntax.end_position())
            }
            NativeNode::Error(failure) => failure.range,
        }
    }

    fn full_text(&self, node: NativeNode<'_>, surface: &dyn TextSurface) -> String {
        surface.value_in_range(&self.source_range(node, surface))
    }

    fn classify(&self, node: NativeNode<'_>) -> StyleClass {
        use node_kinds::{ESCAPE_SEQUENCE, FALSE, NIL, NUMBER, STRING, STRING_CONTENT, TRUE};

        match node.kind() {
            STRING | STRING_CONTENT | ESCAPE_SEQUENCE => StyleClass::String,
            TRUE | FALSE | NIL => StyleClass::Keyword,
            NUMBER => StyleClass::Number,
            _ => StyleClass::Plain,
        }
    }

    fn properties<'a>(&self, node: NativeNode<'a>) -> Vec<(String, PropertyValue<NativeNode<'a>>)> {
        match node {
            NativeNode::Syntax(syntax) => {
                syntax_properties(syntax, self.kind_key(), PositionFields::LineColumn)
            }
            NativeNode::Error(failure) => error_properties(failure, self.kind_key()),
        }
    }
}

/// Statements of a chunk or block, without comments.
fn statements(syntax: SyntaxNode<'_>) -> Vec<SyntaxNode<'_>> {
    use node_kinds::{COMMENT, HASH_BANG_LINE};

    named_children(syntax)
        .into_iter()
        .filter(|child| !matches!(child.kind(), COMMENT | HASH_BANG_LINE))
        .collect()
}

/// Statements of the block stored under `field`; empty when the body is.
fn body_statements<'a>(syntax: SyntaxNode<'a>, field: &str) -> Vec<SyntaxNode<'a>> {
    field_child(syntax, field)
        .filter(|body| body.kind() == node_kinds::BLOCK)
        .map(statements)
        .unwrap_or_default()
}

/// First ERROR or MISSING node in document order.
///
/// Walks with a cursor and only enters subtrees that contain an error.
fn first_problem(node: tree_sitter::Node<'_>) -> Option<tree_sitter::Node<'_>> {
    let mut cursor = node.walk();
    loop {
        let current = cursor.node();
        if current.is_error() || current.is_missing() {
            return Some(current);
        }
        if current.has_error() && cursor.goto_first_child() {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

/// Leaf tokens under `node`, in source order.
fn tokens(node: tree_sitter::Node<'_>) -> Vec<tree_sitter::Node<'_>> {
    let mut out = Vec::new();
    let mut cursor = node.walk();
    loop {
        let current = cursor.node();
        if current.child_count() == 0 {
            out.push(current);
        } else if cursor.goto_first_child() {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                return out;
            }
        }
    }
}

/// Closing keyword of the innermost block still open at the end of `node`.
///
/// `while` and `for` open their block themselves, so the `do` that follows
/// them does not open another one.
fn unclosed_block(node: tree_sitter::Node<'_>) -> Option<&'static str> {
    let mut open = Vec::new();
    let mut loop_header = false;
    for token in tokens(node) {
        if token.is_named() || token.is_missing() {
            continue;
        }
        match token.kind() {
            "if" | "function" => open.push("end"),
            "while" | "for" => {
                open.push("end");
                loop_header = true;
            }
            "do" if loop_header => loop_header = false,
            "do" => open.push("end"),
            "repeat" => open.push("until"),
            "end" | "until" => {
                open.pop();
            }
            _ => {}
        }
    }
    open.pop()
}

/// Turn the first syntax problem of a tree into a parse failure.
///
/// A problem that reaches the end of the meaningful input is reported at the
/// end of the text, near `<eof>`, naming the keyword that would close a block
/// left open.
fn describe_failure(root: tree_sitter::Node<'_>, text: &str) -> ParseFailure {
    let problem = first_problem(root).unwrap_or(root);
    let meaningful_end = text.trim_end().len();
    let at_eof = problem.start_byte() >= meaningful_end || problem.end_byte() >= meaningful_end;

    let byte = if at_eof { text.len() } else { problem.start_byte() };
    let position = byte_position(text, byte);
    let near = if at_eof {
        "<eof>"
    } else {
        text[byte..].split_whitespace().next().unwrap_or("<eof>")
    };

    let expected = if problem.is_missing() {
        Some(problem.kind())
    } else if at_eof {
        unclosed_block(root)
    } else {
        None
    };
    let message = match expected {
        Some(keyword) => format!(
            "[{}:{}] '{keyword}' expected near '{near}'",
            position.line, position.column
        ),
        None => format!(
            "[{}:{}] unexpected symbol near '{near}'",
            position.line, position.column
        ),
    };
    ParseFailure::at(message, position)
}
