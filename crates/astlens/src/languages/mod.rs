//! Language adapters.
//!
//! Each supported language implements the [`LanguageAdapter`] trait, which
//! wraps a native parser behind the uniform contract the engine relies on:
//! parsing, kinds, ranges, the two child views, leaf classification and
//! inspectable properties.
//!
//! ## Adding a New Language
//!
//! 1. Add the variant to the `Language` enum in `types.rs`
//! 2. Create a new module (e.g., `python.rs`)
//! 3. Implement `LanguageAdapter`
//! 4. Register in `get_language_support()`
//!
//! ## Contract Notes
//!
//! - `parse` never fails to the caller; failures become an Error-kind root.
//! - `children` must return a subset of `extended_children` in the same
//!   relative order. Languages with a single granularity may return the same
//!   sequence from both.
//! - `source_range` and `full_text` must agree: resolving the range against
//!   the text surface yields the full text.

pub mod lua;
pub mod tree_sitter_utils;
pub mod typescript;

use serde::Serialize;

use crate::native::{NativeNode, ParsedSource};
use crate::position::TextSurface;
use crate::projector::PropertyValue;
use crate::types::{Language, SourceSelection, StyleClass};

/// Get the adapter implementation for a language.
#[must_use]
pub fn get_language_support(lang: Language) -> &'static dyn LanguageAdapter {
    match lang {
        Language::Lua => &lua::LuaLanguage,
        Language::TypeScript => &typescript::TypeScriptLanguage,
    }
}

/// Look up an adapter by its registry name.
///
/// Returns `None` for names no adapter is registered under.
#[must_use]
pub fn adapter_by_name(name: &str) -> Option<&'static dyn LanguageAdapter> {
    name.parse::<Language>().ok().map(get_language_support)
}

/// Diagnostics the editor surface should run alongside the inspector.
///
/// Returned once by [`LanguageAdapter::editor_settings`] when the editor is
/// initialised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSettings {
    /// Whether the editor reports semantic diagnostics
    pub semantic_validation: bool,
    /// Whether the editor reports syntax diagnostics
    pub syntax_validation: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            semantic_validation: true,
            syntax_validation: true,
        }
    }
}

/// Uniform parsing and inspection contract, implemented once per language.
pub trait LanguageAdapter: Send + Sync {
    /// Registry name of the language.
    fn name(&self) -> &'static str;

    /// Language identifier the editor uses for syntax highlighting.
    fn editor_language(&self) -> &'static str;

    /// Field name that conventionally carries a node's kind.
    fn kind_key(&self) -> &'static str;

    /// Sample text shown when the language is first selected.
    fn sample_source(&self) -> &'static str;

    /// One-time editor configuration.
    fn editor_settings(&self) -> EditorSettings {
        EditorSettings::default()
    }

    /// Parse `text` into a native tree.
    ///
    /// Never fails: a rejected input yields an Error-kind root carrying a
    /// message and a one-character range at the failure point.
    fn parse(&self, text: &str) -> ParsedSource;

    /// Every syntactically present child, in source order.
    fn extended_children<'a>(&self, node: NativeNode<'a>) -> Vec<NativeNode<'a>>;

    /// The semantically structural subset of the extended children.
    fn children<'a>(&self, node: NativeNode<'a>) -> Vec<NativeNode<'a>>;

    /// Stable label of the node's grammatical category.
    fn kind(&self, node: NativeNode<'_>) -> &'static str {
        node.kind()
    }

    /// The span the node covers, in editor coordinates.
    fn source_range(&self, node: NativeNode<'_>, surface: &dyn TextSurface) -> SourceSelection;

    /// The literal text the node covers.
    fn full_text(&self, node: NativeNode<'_>, surface: &dyn TextSurface) -> String;

    /// Highlight class for leaf tokens.
    fn classify(&self, node: NativeNode<'_>) -> StyleClass;

    /// Own fields of the node, for the property projector.
    fn properties<'a>(&self, node: NativeNode<'a>) -> Vec<(String, PropertyValue<NativeNode<'a>>)>;
}
