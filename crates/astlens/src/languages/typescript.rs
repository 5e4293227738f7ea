//! TypeScript language support for astlens.
//!
//! Parses with tree-sitter-typescript. Unlike Lua, syntax errors do not
//! reject the input: ERROR nodes stay in the tree alongside whatever the
//! parser recovered, so a half-typed file still shows most of its structure.
//! Ranges come from character offsets resolved by the editor surface.

use super::tree_sitter_utils::{
    all_children, error_properties, field_child, infrastructure_failure, named_children,
    offset_position, parse_tree, syntax_properties, to_native, PositionFields,
};
use super::{EditorSettings, LanguageAdapter};
use crate::native::{NativeNode, ParsedSource, SyntaxNode};
use crate::position::TextSurface;
use crate::projector::PropertyValue;
use crate::types::{SourceSelection, StyleClass};

/// Tree-sitter node kind constants for the TypeScript grammar.
mod node_kinds {
    // Kind suffixes that always mark structure
    pub const STATEMENT_SUFFIX: &str = "_statement";
    pub const DECLARATION_SUFFIX: &str = "_declaration";

    // Calls that may carry callbacks
    pub const CALL_EXPRESSION: &str = "call_expression";
    pub const ARGUMENTS: &str = "arguments";

    // Literals
    pub const STRING: &str = "string";
    pub const STRING_FRAGMENT: &str = "string_fragment";
    pub const TEMPLATE_STRING: &str = "template_string";
    pub const ESCAPE_SEQUENCE: &str = "escape_sequence";
    pub const REGEX: &str = "regex";
    pub const NUMBER: &str = "number";
    pub const TRUE: &str = "true";
    pub const FALSE: &str = "false";
    pub const NULL: &str = "null";
    pub const UNDEFINED: &str = "undefined";
}

/// Named kinds kept in the collapsed view besides statements and
/// declarations.
const STRUCTURAL_KINDS: &[&str] = &[
    "program",
    "statement_block",
    "class_body",
    "interface_body",
    "enum_body",
    "switch_body",
    "switch_case",
    "switch_default",
    "else_clause",
    "catch_clause",
    "finally_clause",
    "method_definition",
    "public_field_definition",
    "variable_declarator",
    "function_expression",
    "arrow_function",
    "class",
    // Recovered input keeps whatever structure the parser found inside it.
    "ERROR",
];

/// Argument kinds that make a call structural.
const FUNCTION_LIKE: &[&str] = &["arrow_function", "function_expression"];

const SAMPLE_SOURCE: &str = r"@Component({
  selector: 'app-root',
  templateUrl: './app.component.html',
  styleUrls: ['./app.component.css']
})
export class AppComponent {
  title = 'app';

  constructor(private http: HttpClient) {}

  greet(name: string): string {
    return `Hello, ${name}!`;
  }
}
";

/// TypeScript language adapter.
pub struct TypeScriptLanguage;

impl LanguageAdapter for TypeScriptLanguage {
    fn name(&self) -> &'static str {
        "typescript"
    }

    fn editor_language(&self) -> &'static str {
        "typescript"
    }

    fn kind_key(&self) -> &'static str {
        "kind"
    }

    fn sample_source(&self) -> &'static str {
        SAMPLE_SOURCE
    }

    fn editor_settings(&self) -> EditorSettings {
        // Snippets reference types that are never in scope.
        EditorSettings {
            semantic_validation: false,
            syntax_validation: false,
        }
    }

    fn parse(&self, text: &str) -> ParsedSource {
        match parse_tree(&tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(), text) {
            Ok(tree) => {
                let root = tree.root_node();
                tracing::debug!(
                    nodes = root.descendant_count(),
                    has_error = root.has_error(),
                    "Parsed TypeScript source"
                );
                ParsedSource::from_tree(text, tree)
            }
            Err(message) => ParsedSource::failed(text, infrastructure_failure(message)),
        }
    }

    fn extended_children<'a>(&self, node: NativeNode<'a>) -> Vec<NativeNode<'a>> {
        match node.as_syntax() {
            Some(syntax) => to_native(all_children(syntax)),
            None => Vec::new(),
        }
    }

    fn children<'a>(&self, node: NativeNode<'a>) -> Vec<NativeNode<'a>> {
        match node.as_syntax() {
            Some(syntax) => to_native(
                named_children(syntax)
                    .into_iter()
                    .filter(|child| keeps_in_collapsed(*child))
                    .collect(),
            ),
            None => Vec::new(),
        }
    }

    fn source_range(&self, node: NativeNode<'_>, surface: &dyn TextSurface) -> SourceSelection {
        match node {
            NativeNode::Syntax(syntax) => SourceSelection::new(
                offset_position(surface, syntax.start_offset(), syntax.kind()),
                offset_position(surface, syntax.end_offset(), syntax.kind()),
            ),
            NativeNode::Error(failure) => failure.range,
        }
    }

    fn full_text(&self, node: NativeNode<'_>, surface: &dyn TextSurface) -> String {
        match node {
            NativeNode::Syntax(syntax) => syntax.text().to_string(),
            NativeNode::Error(failure) => surface.value_in_range(&failure.range),
        }
    }

    fn classify(&self, node: NativeNode<'_>) -> StyleClass {
        let Some(syntax) = node.as_syntax() else {
            return StyleClass::Plain;
        };
        classify_syntax(syntax)
    }

    fn properties<'a>(&self, node: NativeNode<'a>) -> Vec<(String, PropertyValue<NativeNode<'a>>)> {
        match node {
            NativeNode::Syntax(syntax) => {
                syntax_properties(syntax, self.kind_key(), PositionFields::Offsets)
            }
            NativeNode::Error(failure) => error_properties(failure, self.kind_key()),
        }
    }
}

fn is_structural(kind: &str) -> bool {
    kind.ends_with(node_kinds::STATEMENT_SUFFIX)
        || kind.ends_with(node_kinds::DECLARATION_SUFFIX)
        || STRUCTURAL_KINDS.contains(&kind)
}

/// Structural kinds, plus calls (and their argument lists) that pass a
/// function literal, such as `describe('x', () => { ... })`.
fn keeps_in_collapsed(syntax: SyntaxNode<'_>) -> bool {
    match syntax.kind() {
        node_kinds::CALL_EXPRESSION => {
            field_child(syntax, "arguments").is_some_and(passes_callback)
        }
        node_kinds::ARGUMENTS => passes_callback(syntax),
        kind => is_structural(kind),
    }
}

fn passes_callback(arguments: SyntaxNode<'_>) -> bool {
    named_children(arguments)
        .iter()
        .any(|argument| FUNCTION_LIKE.contains(&argument.kind()))
}

fn classify_syntax(syntax: SyntaxNode<'_>) -> StyleClass {
    use node_kinds::{
        ESCAPE_SEQUENCE, FALSE, NULL, NUMBER, REGEX, STRING, STRING_FRAGMENT, TEMPLATE_STRING,
        TRUE, UNDEFINED,
    };

    let node = syntax.node();
    let kind = syntax.kind();
    match kind {
        STRING | STRING_FRAGMENT | TEMPLATE_STRING | ESCAPE_SEQUENCE | REGEX => StyleClass::String,
        NUMBER => StyleClass::Number,
        TRUE | FALSE | NULL | UNDEFINED => StyleClass::Keyword,
        _ if !node.is_named() => {
            let in_string = node
                .parent()
                .is_some_and(|parent| matches!(parent.kind(), STRING | TEMPLATE_STRING));
            if in_string {
                StyleClass::String
            } else if !kind.is_empty() && kind.bytes().all(|b| b.is_ascii_alphabetic()) {
                StyleClass::Keyword
            } else {
                StyleClass::Plain
            }
        }
        _ => StyleClass::Plain,
    }
}
