//! Inspector code view.
//!
//! Renders the source as a sequence of leaf spans of the extended tree, each
//! tagged with its node id and highlight class. The text between two leaves
//! (whitespace, and tokens the adapter does not expose as nodes) travels as the
//! `leading` part of the next span, so concatenating every span and the
//! trailing remainder gives back the source exactly.

use serde::Serialize;

use crate::position::TextSurface;
use crate::session::TreeViews;
use crate::types::{StyleClass, ViewMode};

/// One leaf of the extended tree, positioned in the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeSpan {
    /// Id of the leaf in the extended tree
    pub id: u32,
    /// Source text between the previous leaf and this one
    pub leading: String,
    /// Text of the leaf itself
    pub text: String,
    /// Highlight class
    pub style: StyleClass,
    /// Line breaks inside `text`
    pub newlines: usize,
}

/// The whole code view of one document version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CodeView {
    /// Leaf spans in source order
    pub spans: Vec<CodeSpan>,
    /// Source text after the last leaf
    pub trailing: String,
}

impl CodeView {
    /// The source text, reassembled from the spans.
    #[must_use]
    pub fn render_plain(&self) -> String {
        let mut out = String::new();
        for span in &self.spans {
            out.push_str(&span.leading);
            out.push_str(&span.text);
        }
        out.push_str(&self.trailing);
        out
    }

    /// The span of a leaf, by extended-tree id.
    #[must_use]
    pub fn span(&self, id: u32) -> Option<&CodeSpan> {
        self.spans.iter().find(|span| span.id == id)
    }
}

/// Build the code view for the document behind `views`.
#[must_use]
pub fn code_view(views: &TreeViews<'_>) -> CodeView {
    let document = views.document();
    let adapter = document.adapter();
    let surface = document.buffer();
    let bridge = document.bridge();
    let chars: Vec<char> = surface.text().chars().collect();

    let mut spans = Vec::new();
    let mut cursor = 0;
    for leaf in views.view(ViewMode::Extended).leaves_in_order() {
        let selection = bridge.selection_for(leaf.native);
        let Some(start) = surface.offset_at(selection.start_pos) else {
            tracing::warn!(
                id = %leaf.id,
                kind = leaf.kind,
                %selection,
                "Leaf outside the text, skipping"
            );
            continue;
        };
        // Error ranges at the end of the text end one past it.
        let end = surface
            .offset_at(selection.end_pos)
            .unwrap_or(chars.len());
        let start = start.max(cursor).min(chars.len());
        let end = end.max(start).min(chars.len());

        let text: String = chars[start..end].iter().collect();
        spans.push(CodeSpan {
            id: leaf.id.as_u32(),
            leading: chars[cursor..start].iter().collect(),
            newlines: text.matches('\n').count(),
            text,
            style: adapter.classify(leaf.native),
        });
        cursor = end;
    }

    tracing::debug!(spans = spans.len(), "Built code view");
    CodeView {
        spans,
        trailing: chars[cursor..].iter().collect(),
    }
}
