//! Tree materialization.
//!
//! Walks a native tree depth-first through a [`LanguageAdapter`] and builds
//! the wrapper tree the views render. Each pass owns a flat arena of
//! [`NodeWrapper`]s that doubles as the identifier table: wrapper `#n` lives at
//! index `n - 1`.
//!
//! Identifiers are assigned in finishing order. A node's children are
//! materialized before the node itself, so children always carry smaller ids
//! than their parent and the root carries the largest id of the pass.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::languages::LanguageAdapter;
use crate::native::NativeNode;
use crate::types::{NodeId, ViewMode};

/// A native node together with its pass-local identifier.
#[derive(Debug, Clone)]
pub struct NodeWrapper<'a> {
    /// Identifier, unique within one pass
    pub id: NodeId,
    /// Kind label from the adapter
    pub kind: &'static str,
    /// The wrapped native node
    pub native: NativeNode<'a>,
    /// Wrapped children, in source order
    pub children: Vec<NodeId>,
}

impl NodeWrapper<'_> {
    /// Whether this wrapper has no children in its view.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Result of one materialization pass.
#[derive(Debug, Clone)]
pub struct Materialized<'a> {
    mode: ViewMode,
    nodes: Vec<NodeWrapper<'a>>,
    root: NodeId,
}

/// Materialize the tree under `root` in the given view mode.
///
/// Cannot fail: an Error-kind root becomes a single leaf wrapper.
#[must_use]
pub fn materialize<'a>(
    adapter: &dyn LanguageAdapter,
    root: NativeNode<'a>,
    mode: ViewMode,
) -> Materialized<'a> {
    let mut nodes = Vec::new();
    let root_id = visit(adapter, root, mode, &mut nodes);
    tracing::debug!(
        language = adapter.name(),
        %mode,
        nodes = nodes.len(),
        "Materialized tree"
    );
    Materialized {
        mode,
        nodes,
        root: root_id,
    }
}

/// A node whose children are still being materialized.
struct Frame<'a> {
    node: NativeNode<'a>,
    pending: std::vec::IntoIter<NativeNode<'a>>,
    children: Vec<NodeId>,
}

impl<'a> Frame<'a> {
    fn open(adapter: &dyn LanguageAdapter, node: NativeNode<'a>, mode: ViewMode) -> Self {
        let native_children = match mode {
            ViewMode::Extended => adapter.extended_children(node),
            ViewMode::Collapsed => adapter.children(node),
        };
        Self {
            node,
            children: Vec::with_capacity(native_children.len()),
            pending: native_children.into_iter(),
        }
    }
}

/// Post-order walk on an explicit stack; deep trees do not grow the call stack.
fn visit<'a>(
    adapter: &dyn LanguageAdapter,
    root: NativeNode<'a>,
    mode: ViewMode,
    nodes: &mut Vec<NodeWrapper<'a>>,
) -> NodeId {
    let mut stack = vec![Frame::open(adapter, root, mode)];
    while let Some(frame) = stack.last_mut() {
        if let Some(child) = frame.pending.next() {
            stack.push(Frame::open(adapter, child, mode));
            continue;
        }
        let Some(finished) = stack.pop() else { break };

        let id = NodeId(next_id(nodes.len()));
        let kind = adapter.kind(finished.node);
        tracing::trace!(%id, kind, "Wrapped node");
        nodes.push(NodeWrapper {
            id,
            kind,
            native: finished.node,
            children: finished.children,
        });
        if let Some(parent) = stack.last_mut() {
            parent.children.push(id);
        }
    }

    // The root frame finishes last.
    NodeId(next_id(nodes.len().saturating_sub(1)))
}

#[allow(clippy::cast_possible_truncation)]
fn next_id(len: usize) -> u32 {
    // Trees with 4 billion nodes do not fit in memory long before this wraps.
    len as u32 + 1
}

impl<'a> Materialized<'a> {
    /// The view mode this pass ran in.
    #[must_use]
    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Identifier of the root wrapper.
    #[must_use]
    pub fn root_id(&self) -> NodeId {
        self.root
    }

    /// The root wrapper.
    #[must_use]
    pub fn root(&self) -> &NodeWrapper<'a> {
        // `root` was pushed by this pass, so it always resolves.
        &self.nodes[self.nodes.len() - 1]
    }

    /// Number of wrappers in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the table is empty. Never true for a finished pass.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a wrapper by identifier.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&NodeWrapper<'a>> {
        id.index().and_then(|index| self.nodes.get(index))
    }

    /// Look up a wrapper, reporting unknown identifiers as an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] when `id` is not in this pass's table.
    pub fn require(&self, id: NodeId) -> Result<&NodeWrapper<'a>> {
        self.get(id).ok_or(Error::NodeNotFound {
            id: id.as_u32(),
            mode: self.mode,
            count: self.nodes.len(),
        })
    }

    /// Children of a wrapper, resolved.
    pub fn children(&self, wrapper: &NodeWrapper<'a>) -> impl Iterator<Item = &NodeWrapper<'a>> {
        wrapper.children.iter().filter_map(|id| self.get(*id))
    }

    /// All wrappers in identifier (finishing) order.
    pub fn iter(&self) -> impl Iterator<Item = &NodeWrapper<'a>> {
        self.nodes.iter()
    }

    /// Wrappers in pre-order, starting at the root.
    #[must_use]
    pub fn preorder(&self) -> Vec<&NodeWrapper<'a>> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root()];
        while let Some(wrapper) = stack.pop() {
            out.push(wrapper);
            stack.extend(
                wrapper
                    .children
                    .iter()
                    .rev()
                    .filter_map(|id| self.get(*id)),
            );
        }
        out
    }

    /// Leaf wrappers in source order.
    ///
    /// Finishing order visits leaves left to right, so this is a filter over
    /// the table.
    pub fn leaves_in_order(&self) -> impl Iterator<Item = &NodeWrapper<'a>> {
        self.nodes.iter().filter(|wrapper| wrapper.is_leaf())
    }

    /// Serializable form of the tree: ids, kinds and nested children.
    #[must_use]
    pub fn to_render_tree(&self) -> RenderNode {
        let mut built = self.build_up(|wrapper, children| RenderNode {
            id: wrapper.id.as_u32(),
            value: wrapper.kind.to_string(),
            children,
        });
        built.pop().flatten().unwrap_or_else(|| RenderNode {
            id: self.root.as_u32(),
            value: String::new(),
            children: Vec::new(),
        })
    }

    /// Build one value per wrapper from the values of its children.
    ///
    /// Runs over the table in finishing order, where every child precedes its
    /// parent, so no recursion is needed. Slot `i` holds the value of wrapper
    /// `#i+1` until its parent takes it; the root's value is the last slot.
    pub fn build_up<T>(
        &self,
        mut build: impl FnMut(&NodeWrapper<'a>, Vec<T>) -> T,
    ) -> Vec<Option<T>> {
        let mut slots: Vec<Option<T>> = Vec::with_capacity(self.nodes.len());
        for wrapper in &self.nodes {
            let mut children = Vec::with_capacity(wrapper.children.len());
            for id in &wrapper.children {
                let Some(index) = id.index() else { continue };
                if let Some(value) = slots.get_mut(index).and_then(Option::take) {
                    children.push(value);
                }
            }
            slots.push(Some(build(wrapper, children)));
        }
        slots
    }
}

/// Tree shape handed to tree widgets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderNode {
    /// Wrapper identifier
    pub id: u32,
    /// Kind label shown for the node
    pub value: String,
    /// Child nodes; omitted for leaves
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RenderNode>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Language;

    #[test]
    fn ids_are_assigned_in_finishing_order() {
        let adapter = Language::TypeScript.adapter();
        let parsed = adapter.parse("a;");
        let tree = materialize(adapter, parsed.root(), ViewMode::Extended);

        // program > expression_statement > (identifier, ';')
        let kinds: Vec<&str> = tree.iter().map(|w| w.kind).collect();
        assert_eq!(kinds, vec!["identifier", ";", "expression_statement", "program"]);
        assert_eq!(tree.root_id(), NodeId(4));
        assert_eq!(tree.root().kind, "program");
    }

    #[test]
    fn children_carry_smaller_ids_than_parents() {
        let adapter = Language::Lua.adapter();
        let parsed = adapter.parse(adapter.sample_source());
        let tree = materialize(adapter, parsed.root(), ViewMode::Extended);

        for wrapper in tree.iter() {
            for child in &wrapper.children {
                assert!(child < &wrapper.id, "{child} should precede {}", wrapper.id);
            }
        }
    }

    #[test]
    fn table_lookup_matches_wrapper_ids() {
        let adapter = Language::Lua.adapter();
        let parsed = adapter.parse("local x = 1");
        let tree = materialize(adapter, parsed.root(), ViewMode::Extended);

        for wrapper in tree.iter() {
            assert_eq!(tree.get(wrapper.id).map(|w| w.id), Some(wrapper.id));
        }
        assert!(tree.get(NodeId(0)).is_none());
        assert!(tree.get(NodeId(tree.len() as u32 + 1)).is_none());
    }

    #[test]
    fn require_reports_view_and_size() {
        let adapter = Language::Lua.adapter();
        let parsed = adapter.parse("local x = 1");
        let tree = materialize(adapter, parsed.root(), ViewMode::Collapsed);

        let err = tree.require(NodeId(99)).expect_err("id 99 is out of range");
        assert!(matches!(
            err,
            Error::NodeNotFound { id: 99, mode: ViewMode::Collapsed, .. }
        ));
    }

    #[test]
    fn error_root_materializes_to_a_single_leaf() {
        let adapter = Language::Lua.adapter();
        let parsed = adapter.parse("x = ");

        for mode in [ViewMode::Extended, ViewMode::Collapsed] {
            let tree = materialize(adapter, parsed.root(), mode);
            assert_eq!(tree.len(), 1);
            assert_eq!(tree.root().kind, "Error");
            assert!(tree.root().is_leaf());
        }
    }

    #[test]
    fn preorder_starts_at_the_root_and_visits_everything() {
        let adapter = Language::TypeScript.adapter();
        let parsed = adapter.parse("let a = 1;\nlet b = 2;");
        let tree = materialize(adapter, parsed.root(), ViewMode::Extended);

        let order = tree.preorder();

        assert_eq!(order.len(), tree.len());
        assert_eq!(order[0].id, tree.root_id());
        assert_eq!(order[1].kind, "lexical_declaration");
    }

    #[test]
    fn leaves_in_order_follow_the_source() {
        let adapter = Language::TypeScript.adapter();
        let parsed = adapter.parse("f(1);");
        let tree = materialize(adapter, parsed.root(), ViewMode::Extended);

        let leaves: Vec<&str> = tree
            .leaves_in_order()
            .filter_map(|w| w.native.as_syntax())
            .map(|s| s.text())
            .collect();

        assert_eq!(leaves, vec!["f", "(", "1", ")", ";"]);
    }

    #[test]
    fn deep_nesting_materializes_without_recursion() {
        let depth = 3000;
        let code = format!("x = {}1{};", "(".repeat(depth), ")".repeat(depth));
        let adapter = Language::TypeScript.adapter();
        let parsed = adapter.parse(&code);

        let tree = materialize(adapter, parsed.root(), ViewMode::Extended);

        assert_eq!(tree.root().kind, "program");
        assert_eq!(tree.root_id().index(), Some(tree.len() - 1));
        let nested = tree.iter().filter(|w| w.kind == "parenthesized_expression").count();
        assert_eq!(nested, depth);

        let render = tree.to_render_tree();
        assert_eq!(render.id, tree.root_id().as_u32());
    }

    #[test]
    fn build_up_sees_children_before_parents() {
        let adapter = Language::TypeScript.adapter();
        let parsed = adapter.parse("f(1);");
        let tree = materialize(adapter, parsed.root(), ViewMode::Extended);

        let sizes = tree.build_up(|_, children: Vec<usize>| 1 + children.iter().sum::<usize>());

        assert_eq!(sizes.last().copied().flatten(), Some(tree.len()));
        assert!(sizes[..sizes.len() - 1].iter().all(Option::is_none));
    }

    #[test]
    fn render_tree_omits_children_of_leaves() {
        let adapter = Language::TypeScript.adapter();
        let parsed = adapter.parse("a;");
        let tree = materialize(adapter, parsed.root(), ViewMode::Extended);

        let json = serde_json::to_value(tree.to_render_tree()).expect("serializable");

        assert_eq!(json["id"], 4);
        assert_eq!(json["value"], "program");
        let leaf = &json["children"][0]["children"][0];
        assert_eq!(leaf["value"], "identifier");
        assert!(leaf.get("children").is_none());
    }
}
