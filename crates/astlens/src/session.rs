//! Document and view state for one inspector session.
//!
//! A [`Document`] owns the source text, its line cache and the latest parse.
//! [`TreeViews`] borrows a document version and holds the materialized trees
//! for it: the extended tree is built up front, the collapsed tree on first
//! request. Editing the document needs `&mut Document`, so every view of the
//! previous version has to be dropped first and a stale tree can never be
//! observed.

use std::cell::OnceCell;

use crate::bridge::SelectionBridge;
use crate::error::Result;
use crate::languages::LanguageAdapter;
use crate::materialize::{materialize, Materialized, NodeWrapper};
use crate::native::{NativeNode, ParsedSource};
use crate::position::{SourceBuffer, TextSurface};
use crate::types::{Language, NodeId, SourceSelection, ViewMode};

/// Source text, line cache and parse of one language.
#[derive(Debug)]
pub struct Document {
    language: Language,
    buffer: SourceBuffer,
    parsed: ParsedSource,
    version: u64,
}

impl Document {
    /// Parse `text` as `language`.
    #[must_use]
    pub fn new(language: Language, text: impl Into<String>) -> Self {
        let buffer = SourceBuffer::new(text);
        let parsed = language.adapter().parse(buffer.text());
        Self {
            language,
            buffer,
            parsed,
            version: 1,
        }
    }

    /// A document holding the language's sample source.
    #[must_use]
    pub fn with_sample(language: Language) -> Self {
        Self::new(language, language.adapter().sample_source())
    }

    /// Replace the text and re-parse.
    ///
    /// Returns `false`, leaving the version untouched, when the text is
    /// unchanged.
    pub fn update(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if text == self.buffer.text() {
            return false;
        }
        self.buffer.set_text(text);
        self.reparse();
        true
    }

    /// Switch language, resetting the text to the new language's sample.
    pub fn set_language(&mut self, language: Language) {
        self.language = language;
        self.buffer.set_text(language.adapter().sample_source());
        self.reparse();
    }

    fn reparse(&mut self) {
        self.parsed = self.adapter().parse(self.buffer.text());
        self.version += 1;
        tracing::debug!(
            language = %self.language,
            version = self.version,
            failed = self.parsed.failure().is_some(),
            "Document re-parsed"
        );
    }

    /// Language of the document.
    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }

    /// Adapter for the document's language.
    #[must_use]
    pub fn adapter(&self) -> &'static dyn LanguageAdapter {
        self.language.adapter()
    }

    /// Text buffer the editor shows.
    #[must_use]
    pub fn buffer(&self) -> &SourceBuffer {
        &self.buffer
    }

    /// Latest parse of the text.
    #[must_use]
    pub fn parsed(&self) -> &ParsedSource {
        &self.parsed
    }

    /// Version counter, bumped on every re-parse.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Bridge for this document's adapter and buffer.
    #[must_use]
    pub fn bridge(&self) -> SelectionBridge<'_> {
        SelectionBridge::new(self.adapter(), &self.buffer)
    }
}

/// How a node was picked in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Pointer moved over the node
    Hover,
    /// The node was clicked
    Click,
}

/// Which panel is shown and which tree granularity is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewState {
    mode: ViewMode,
    inspector_active: bool,
}

impl ViewState {
    /// Start in `mode` with the editor panel active.
    #[must_use]
    pub fn new(mode: ViewMode) -> Self {
        Self {
            mode,
            inspector_active: false,
        }
    }

    /// Active tree granularity.
    #[must_use]
    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Whether the editor panel (rather than the inspector) is active.
    #[must_use]
    pub fn editor_view_active(&self) -> bool {
        !self.inspector_active
    }

    /// Change the tree granularity.
    ///
    /// Returns `false` and keeps the current mode while the inspector is
    /// active; the inspector always shows the extended tree.
    pub fn set_mode(&mut self, mode: ViewMode) -> bool {
        if self.inspector_active {
            tracing::debug!(requested = %mode, "Mode toggle ignored while inspector is active");
            return false;
        }
        self.mode = mode;
        true
    }

    /// Switch between the editor and the inspector panel.
    pub fn set_editor_view_active(&mut self, active: bool) {
        self.inspector_active = !active;
        if self.inspector_active {
            self.mode = ViewMode::Extended;
        }
    }
}

/// Materialized trees for one document version.
pub struct TreeViews<'d> {
    document: &'d Document,
    extended: Materialized<'d>,
    collapsed: OnceCell<Materialized<'d>>,
}

impl<'d> TreeViews<'d> {
    /// Materialize the extended tree of `document`.
    #[must_use]
    pub fn new(document: &'d Document) -> Self {
        let extended = materialize(
            document.adapter(),
            document.parsed().root(),
            ViewMode::Extended,
        );
        Self {
            document,
            extended,
            collapsed: OnceCell::new(),
        }
    }

    /// The document these views belong to.
    #[must_use]
    pub fn document(&self) -> &'d Document {
        self.document
    }

    /// Version of the document the views were built from.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.document.version()
    }

    /// The tree for `mode`; the collapsed tree is built on first use.
    #[must_use]
    pub fn view(&self, mode: ViewMode) -> &Materialized<'d> {
        match mode {
            ViewMode::Extended => &self.extended,
            ViewMode::Collapsed => self.collapsed.get_or_init(|| {
                materialize(
                    self.document.adapter(),
                    self.document.parsed().root(),
                    ViewMode::Collapsed,
                )
            }),
        }
    }

    /// Whether the collapsed tree has been built yet.
    #[must_use]
    pub fn collapsed_ready(&self) -> bool {
        self.collapsed.get().is_some()
    }

    /// Look up a node in the `mode` tree.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NodeNotFound`] when `id` is not in that tree.
    pub fn node(&self, mode: ViewMode, id: NodeId) -> Result<&NodeWrapper<'d>> {
        self.view(mode).require(id)
    }

    /// Editor selection for a hovered node.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NodeNotFound`] when `id` is not in the `mode` tree.
    pub fn hover(&self, mode: ViewMode, id: NodeId) -> Result<SourceSelection> {
        let wrapper = self.node(mode, id)?;
        Ok(self.document.bridge().selection_for(wrapper.native))
    }

    /// The node whose properties should be shown for this pick, if any.
    ///
    /// Hovering only updates the detail panel while the editor view is
    /// active; a click always does.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NodeNotFound`] when `id` is not in the active tree.
    pub fn detail(
        &self,
        state: &ViewState,
        id: NodeId,
        trigger: Trigger,
    ) -> Result<Option<NativeNode<'d>>> {
        if !state.editor_view_active() && trigger == Trigger::Hover {
            return Ok(None);
        }
        self.node(state.mode(), id).map(|wrapper| Some(wrapper.native))
    }

    /// Node count of the `mode` tree, for diagnostics.
    #[must_use]
    pub fn len(&self, mode: ViewMode) -> usize {
        self.view(mode).len()
    }

    /// Whether the `mode` tree is empty. Never true once built.
    #[must_use]
    pub fn is_empty(&self, mode: ViewMode) -> bool {
        self.view(mode).is_empty()
    }
}

impl std::fmt::Debug for TreeViews<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeViews")
            .field("version", &self.version())
            .field("extended", &self.extended.len())
            .field("collapsed", &self.collapsed.get().map(Materialized::len))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::TextPosition;

    #[test]
    fn update_reports_whether_the_text_changed() {
        let mut doc = Document::new(Language::Lua, "local x = 1");

        assert!(!doc.update("local x = 1"));
        assert_eq!(doc.version(), 1);
        assert!(doc.update("local x = 2"));
        assert_eq!(doc.version(), 2);
        assert_eq!(doc.buffer().text(), "local x = 2");
    }

    #[test]
    fn set_language_resets_to_the_sample() {
        let mut doc = Document::new(Language::Lua, "local x = 1");

        doc.set_language(Language::TypeScript);

        assert_eq!(doc.language(), Language::TypeScript);
        assert_eq!(doc.buffer().text(), Language::TypeScript.adapter().sample_source());
        assert_eq!(doc.parsed().root().kind(), "program");
    }

    #[test]
    fn collapsed_view_is_built_lazily() {
        let doc = Document::with_sample(Language::Lua);
        let views = TreeViews::new(&doc);

        assert!(!views.collapsed_ready());
        let extended = views.len(ViewMode::Extended);
        assert!(!views.collapsed_ready());
        let collapsed = views.len(ViewMode::Collapsed);
        assert!(views.collapsed_ready());
        assert!(collapsed < extended);
    }

    #[test]
    fn collapsed_view_is_built_once_per_version() {
        let doc = Document::with_sample(Language::TypeScript);
        let views = TreeViews::new(&doc);

        let first: *const Materialized<'_> = views.view(ViewMode::Collapsed);
        let second: *const Materialized<'_> = views.view(ViewMode::Collapsed);

        assert_eq!(first, second);
    }

    #[test]
    fn hover_returns_the_node_selection() {
        let doc = Document::new(Language::TypeScript, "let a = 1;");
        let views = TreeViews::new(&doc);
        let root = views.view(ViewMode::Extended).root_id();

        let selection = views.hover(ViewMode::Extended, root).expect("root exists");

        assert_eq!(selection.start_pos, TextPosition::new(1, 0));
        assert_eq!(selection.end_pos, TextPosition::new(1, 10));
    }

    #[test]
    fn hover_with_unknown_id_is_an_error() {
        let doc = Document::new(Language::TypeScript, "let a = 1;");
        let views = TreeViews::new(&doc);

        assert!(matches!(
            views.hover(ViewMode::Collapsed, NodeId(500)),
            Err(Error::NodeNotFound { id: 500, .. })
        ));
    }

    #[test]
    fn inspector_forces_extended_mode_and_locks_the_toggle() {
        let mut state = ViewState::new(ViewMode::Collapsed);

        state.set_editor_view_active(false);

        assert_eq!(state.mode(), ViewMode::Extended);
        assert!(!state.set_mode(ViewMode::Collapsed));
        assert_eq!(state.mode(), ViewMode::Extended);

        state.set_editor_view_active(true);
        assert!(state.set_mode(ViewMode::Collapsed));
        assert_eq!(state.mode(), ViewMode::Collapsed);
    }

    #[test]
    fn detail_ignores_hover_in_the_inspector() {
        let doc = Document::new(Language::Lua, "local x = 1");
        let views = TreeViews::new(&doc);
        let root = views.view(ViewMode::Extended).root_id();
        let mut state = ViewState::default();

        let hovered = views.detail(&state, root, Trigger::Hover).expect("root exists");
        assert!(hovered.is_some());

        state.set_editor_view_active(false);
        let hovered = views.detail(&state, root, Trigger::Hover).expect("root exists");
        let clicked = views.detail(&state, root, Trigger::Click).expect("root exists");
        assert!(hovered.is_none());
        assert_eq!(clicked.map(|n| n.kind()), Some("chunk"));
    }
}
