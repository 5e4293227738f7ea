//! Shared tree-sitter utilities for language adapters.
//!
//! Provides parsing, child enumeration and property extraction for adapters
//! whose native parser is a tree-sitter grammar.

// Positions are reported as f64 properties; snippets stay far below 2^52.
#![allow(clippy::cast_precision_loss)]

use crate::native::{NativeNode, ParseFailure, SyntaxNode};
use crate::projector::PropertyValue;
use crate::types::{SourceSelection, TextPosition};

/// Parse `text` with a tree-sitter grammar.
///
/// Fails only on infrastructure problems (grammar ABI mismatch, parser
/// cancellation); syntax errors are part of the returned tree.
pub fn parse_tree(
    language: &tree_sitter::Language,
    text: &str,
) -> Result<tree_sitter::Tree, String> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(language)
        .map_err(|e| format!("failed to set language: {e}"))?;
    parser
        .parse(text, None)
        .ok_or_else(|| "parser returned no tree".to_string())
}

/// Failure for a parse that could not run at all.
pub fn infrastructure_failure(message: String) -> ParseFailure {
    tracing::warn!(%message, "tree-sitter parser unavailable");
    ParseFailure::at(message, TextPosition::new(1, 0))
}

/// Every child of a node, anonymous tokens included, in source order.
pub fn all_children<'a>(syntax: SyntaxNode<'a>) -> Vec<SyntaxNode<'a>> {
    let node = syntax.node();
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .map(|child| syntax.sibling(child))
        .collect()
}

/// Named children of a node, in source order.
pub fn named_children<'a>(syntax: SyntaxNode<'a>) -> Vec<SyntaxNode<'a>> {
    let node = syntax.node();
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .map(|child| syntax.sibling(child))
        .collect()
}

/// The child stored under `field`, if present.
pub fn field_child<'a>(syntax: SyntaxNode<'a>, field: &str) -> Option<SyntaxNode<'a>> {
    syntax
        .node()
        .child_by_field_name(field)
        .map(|child| syntax.sibling(child))
}

/// Every child stored under `field`, in source order.
pub fn field_children<'a>(syntax: SyntaxNode<'a>, field: &str) -> Vec<SyntaxNode<'a>> {
    let node = syntax.node();
    let mut cursor = node.walk();
    node.children_by_field_name(field, &mut cursor)
        .map(|child| syntax.sibling(child))
        .collect()
}

/// Lift syntax nodes into native handles.
pub fn to_native<'a>(nodes: Vec<SyntaxNode<'a>>) -> Vec<NativeNode<'a>> {
    nodes.into_iter().map(NativeNode::Syntax).collect()
}

/// How an adapter reports node positions as properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionFields {
    /// A `loc` record with `start`/`end` line/column pairs
    LineColumn,
    /// `pos`/`end` absolute character offsets
    Offsets,
}

/// Own fields of a syntax node.
///
/// Named children are grouped by grammar field; named children without a
/// field land under `children`. The `parent` back-reference is included so
/// the projector's blacklist has something to skip.
pub fn syntax_properties<'a>(
    syntax: SyntaxNode<'a>,
    kind_key: &str,
    positions: PositionFields,
) -> Vec<(String, PropertyValue<NativeNode<'a>>)> {
    let node = syntax.node();
    let mut props = vec![(
        kind_key.to_string(),
        PropertyValue::String(syntax.kind().to_string()),
    )];

    match positions {
        PositionFields::LineColumn => props.push((
            "loc".to_string(),
            PropertyValue::Object(vec![
                ("start".to_string(), position_record(syntax.start_position())),
                ("end".to_string(), position_record(syntax.end_position())),
            ]),
        )),
        PositionFields::Offsets => {
            props.push(("pos".to_string(), PropertyValue::Number(syntax.start_offset() as f64)));
            props.push(("end".to_string(), PropertyValue::Number(syntax.end_offset() as f64)));
        }
    }

    props.push(("named".to_string(), PropertyValue::Bool(node.is_named())));
    props.push(("isMissing".to_string(), PropertyValue::Bool(node.is_missing())));
    props.push(("hasError".to_string(), PropertyValue::Bool(node.has_error())));

    if node.child_count() == 0 {
        props.push(("text".to_string(), PropertyValue::String(syntax.text().to_string())));
    }

    let mut fields: Vec<(&'static str, Vec<NativeNode<'a>>)> = Vec::new();
    let mut unfielded = Vec::new();
    let mut cursor = node.walk();
    if cursor.goto_first_child() {
        loop {
            let child = cursor.node();
            if child.is_named() {
                let native = NativeNode::Syntax(syntax.sibling(child));
                match cursor.field_name() {
                    Some(name) => match fields.iter_mut().find(|(field, _)| *field == name) {
                        Some((_, nodes)) => nodes.push(native),
                        None => fields.push((name, vec![native])),
                    },
                    None => unfielded.push(native),
                }
            }
            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }

    for (name, mut nodes) in fields {
        let value = if nodes.len() == 1 {
            PropertyValue::Node(nodes.remove(0))
        } else {
            PropertyValue::List(nodes.into_iter().map(PropertyValue::Node).collect())
        };
        props.push((name.to_string(), value));
    }
    if !unfielded.is_empty() {
        props.push((
            "children".to_string(),
            PropertyValue::List(unfielded.into_iter().map(PropertyValue::Node).collect()),
        ));
    }

    if let Some(parent) = node.parent() {
        props.push((
            "parent".to_string(),
            PropertyValue::Node(NativeNode::Syntax(syntax.sibling(parent))),
        ));
    }

    props
}

/// Own fields of an Error-kind node: its kind, message and range.
pub fn error_properties<'a>(
    failure: &ParseFailure,
    kind_key: &str,
) -> Vec<(String, PropertyValue<NativeNode<'a>>)> {
    vec![
        (
            kind_key.to_string(),
            PropertyValue::String(crate::native::ERROR_KIND.to_string()),
        ),
        (
            "message".to_string(),
            PropertyValue::String(failure.message.clone()),
        ),
        ("range".to_string(), selection_record(&failure.range)),
    ]
}

fn position_record<N>(position: TextPosition) -> PropertyValue<N> {
    PropertyValue::Object(vec![
        ("line".to_string(), PropertyValue::Number(f64::from(position.line))),
        ("column".to_string(), PropertyValue::Number(f64::from(position.column))),
    ])
}

fn selection_record<N>(selection: &SourceSelection) -> PropertyValue<N> {
    PropertyValue::Object(vec![
        ("startPos".to_string(), position_record(selection.start_pos)),
        ("endPos".to_string(), position_record(selection.end_pos)),
    ])
}

/// Position of a syntax node's start, falling back to the first line if the
/// text surface cannot resolve the offset.
pub fn offset_position(
    surface: &dyn crate::position::TextSurface,
    offset: usize,
    kind: &str,
) -> TextPosition {
    surface.position_at(offset).unwrap_or_else(|| {
        tracing::warn!(
            offset,
            node_kind = %kind,
            "Offset outside the text surface, using fallback position"
        );
        TextPosition::new(1, 0)
    })
}
