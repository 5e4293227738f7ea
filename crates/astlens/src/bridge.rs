//! Selection bridge between the tree and the editor.
//!
//! Converts nodes into editor selections through the adapter's own position
//! convention, and resolves editor positions back to the innermost node that
//! spans them.

use crate::languages::LanguageAdapter;
use crate::materialize::{Materialized, NodeWrapper};
use crate::native::NativeNode;
use crate::position::TextSurface;
use crate::types::{SourceSelection, TextPosition};

/// Maps nodes to selections and positions to nodes for one text surface.
#[derive(Clone, Copy)]
pub struct SelectionBridge<'s> {
    adapter: &'s dyn LanguageAdapter,
    surface: &'s dyn TextSurface,
}

impl<'s> SelectionBridge<'s> {
    /// Bridge `adapter`'s nodes onto `surface`.
    #[must_use]
    pub fn new(adapter: &'s dyn LanguageAdapter, surface: &'s dyn TextSurface) -> Self {
        Self { adapter, surface }
    }

    /// The editor selection a node covers.
    #[must_use]
    pub fn selection_for(&self, node: NativeNode<'_>) -> SourceSelection {
        self.adapter.source_range(node, self.surface)
    }

    /// The literal text a node covers.
    #[must_use]
    pub fn text_for(&self, node: NativeNode<'_>) -> String {
        self.adapter.full_text(node, self.surface)
    }

    /// Position of an absolute character offset, or `None` past the end.
    #[must_use]
    pub fn position_at(&self, offset: usize) -> Option<TextPosition> {
        self.surface.position_at(offset)
    }

    /// The innermost wrapper of `view` whose selection spans `position`.
    ///
    /// The root matches any position inside or at the edges of its range;
    /// below the root a child matches when the position lies in its half-open
    /// range, and the first matching child in source order wins.
    #[must_use]
    pub fn node_at<'v, 'a>(
        &self,
        view: &'v Materialized<'a>,
        position: TextPosition,
    ) -> Option<&'v NodeWrapper<'a>> {
        let root = view.root();
        if !self.selection_for(root.native).covers(position) {
            return None;
        }

        let mut current = root;
        while let Some(child) = view
            .children(current)
            .find(|child| self.selection_for(child.native).contains(position))
        {
            current = child;
        }
        tracing::trace!(
            %position,
            id = %current.id,
            kind = current.kind,
            "Resolved position to node"
        );
        Some(current)
    }
}
