//! Native parse results as seen by the engine.
//!
//! A [`ParsedSource`] owns one parse of one text: either a tree-sitter tree
//! or, when the adapter rejected the input, a [`ParseFailure`]. Everything
//! downstream borrows it through [`NativeNode`] handles, which are `Copy` and
//! never clone the underlying tree.

// Tree-sitter reports usize positions; we store u32 line/column numbers.
#![allow(clippy::cast_possible_truncation)]

use std::fmt;

use serde::Serialize;

use crate::types::{SourceSelection, TextPosition};

/// Kind label of the node an adapter returns when parsing fails.
pub const ERROR_KIND: &str = "Error";

/// A parse failure, surfaced as an ordinary Error-kind node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseFailure {
    /// Human-readable diagnostic
    pub message: String,
    /// Best-effort one-character range at the failure point
    pub range: SourceSelection,
}

impl ParseFailure {
    /// Create a failure whose range is the single character at `position`.
    #[must_use]
    pub fn at(message: impl Into<String>, position: TextPosition) -> Self {
        Self {
            message: message.into(),
            range: SourceSelection::single_char(position),
        }
    }
}

/// A tree-sitter node together with the text it was parsed from.
#[derive(Clone, Copy)]
pub struct SyntaxNode<'a> {
    node: tree_sitter::Node<'a>,
    source: &'a str,
}

impl<'a> SyntaxNode<'a> {
    pub(crate) fn new(node: tree_sitter::Node<'a>, source: &'a str) -> Self {
        Self { node, source }
    }

    /// Wrap another node of the same tree.
    pub(crate) fn sibling(&self, node: tree_sitter::Node<'a>) -> Self {
        Self::new(node, self.source)
    }

    /// The underlying tree-sitter node.
    #[must_use]
    pub fn node(&self) -> tree_sitter::Node<'a> {
        self.node
    }

    /// Grammar kind of the node.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.node.kind()
    }

    /// The full text the tree was parsed from.
    #[must_use]
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Literal text covered by the node.
    #[must_use]
    pub fn text(&self) -> &'a str {
        &self.source[self.node.byte_range()]
    }

    /// Character offset of the node's first character.
    #[must_use]
    pub fn start_offset(&self) -> usize {
        char_offset(self.source, self.node.start_byte())
    }

    /// Character offset just past the node.
    #[must_use]
    pub fn end_offset(&self) -> usize {
        char_offset(self.source, self.node.end_byte())
    }

    /// Start of the node from its tree-sitter point, with a character column.
    #[must_use]
    pub fn start_position(&self) -> TextPosition {
        point_position(self.source, self.node.start_byte(), self.node.start_position())
    }

    /// End of the node from its tree-sitter point, with a character column.
    #[must_use]
    pub fn end_position(&self) -> TextPosition {
        point_position(self.source, self.node.end_byte(), self.node.end_position())
    }
}

impl fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxNode")
            .field("kind", &self.kind())
            .field("bytes", &self.node.byte_range())
            .finish()
    }
}

/// Handle to one node of a parse, as adapters hand it to the engine.
#[derive(Debug, Clone, Copy)]
pub enum NativeNode<'a> {
    /// A node of a tree-sitter tree
    Syntax(SyntaxNode<'a>),
    /// The Error-kind node of a rejected parse
    Error(&'a ParseFailure),
}

impl<'a> NativeNode<'a> {
    /// Grammar kind, or [`ERROR_KIND`] for a failed parse.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Syntax(syntax) => syntax.kind(),
            Self::Error(_) => ERROR_KIND,
        }
    }

    /// Whether this is the Error-kind node of a failed parse.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Identity of the node within its tree, if it has one.
    ///
    /// Tree-sitter ids are unique within a tree and stable across views, which
    /// makes them the join key between an extended and a collapsed wrapper of
    /// the same native node.
    #[must_use]
    pub fn identity(&self) -> Option<usize> {
        match self {
            Self::Syntax(syntax) => Some(syntax.node.id()),
            Self::Error(_) => None,
        }
    }

    /// The syntax node, unless this is an Error-kind node.
    #[must_use]
    pub fn as_syntax(&self) -> Option<SyntaxNode<'a>> {
        match self {
            Self::Syntax(syntax) => Some(*syntax),
            Self::Error(_) => None,
        }
    }
}

/// One parse of one text.
#[derive(Debug)]
pub struct ParsedSource {
    text: String,
    outcome: ParseOutcome,
}

#[derive(Debug)]
enum ParseOutcome {
    Tree(tree_sitter::Tree),
    Failed(ParseFailure),
}

impl ParsedSource {
    pub(crate) fn from_tree(text: &str, tree: tree_sitter::Tree) -> Self {
        Self {
            text: text.to_string(),
            outcome: ParseOutcome::Tree(tree),
        }
    }

    pub(crate) fn failed(text: &str, failure: ParseFailure) -> Self {
        Self {
            text: text.to_string(),
            outcome: ParseOutcome::Failed(failure),
        }
    }

    /// The text that was parsed.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Root of the parse: the tree's root node, or the Error-kind node.
    #[must_use]
    pub fn root(&self) -> NativeNode<'_> {
        match &self.outcome {
            ParseOutcome::Tree(tree) => {
                NativeNode::Syntax(SyntaxNode::new(tree.root_node(), &self.text))
            }
            ParseOutcome::Failed(failure) => NativeNode::Error(failure),
        }
    }

    /// The failure, if the adapter rejected the input.
    #[must_use]
    pub fn failure(&self) -> Option<&ParseFailure> {
        match &self.outcome {
            ParseOutcome::Tree(_) => None,
            ParseOutcome::Failed(failure) => Some(failure),
        }
    }
}

/// Number of characters before `byte` in `source`.
pub(crate) fn char_offset(source: &str, byte: usize) -> usize {
    source[..byte].chars().count()
}

/// Position of `byte` given its tree-sitter point, converting the point's
/// byte column to a character column.
fn point_position(source: &str, byte: usize, point: tree_sitter::Point) -> TextPosition {
    let line_start = byte.saturating_sub(point.column);
    TextPosition::new(
        point.row as u32 + 1,
        source[line_start..byte].chars().count() as u32,
    )
}

/// Position of `byte` computed from the text alone.
pub(crate) fn byte_position(source: &str, byte: usize) -> TextPosition {
    let before = &source[..byte];
    let line = before.matches('\n').count() as u32 + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    TextPosition::new(line, before[line_start..].chars().count() as u32)
}
