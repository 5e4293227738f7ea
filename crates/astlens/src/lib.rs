//! # Astlens: Live Dual-View Syntax Tree Inspector
//!
//! Astlens parses source text through per-language adapters and materializes
//! the result into two wrapper trees over the same native parse: an
//! *extended* tree exposing every syntactic child, and a *collapsed* tree
//! keeping only the structural ones. Every wrapper carries an identifier and
//! maps back to an editor selection, so tree and text stay linked in both
//! directions.
//!
//! ## Design Philosophy
//!
//! - **Adapters, not parsers** - tree-sitter grammars do the parsing; the
//!   engine only relies on the [`LanguageAdapter`] contract
//! - **Two views, one parse** - extended and collapsed trees share native nodes
//! - **Failures are nodes** - a rejected input becomes an Error-kind root
//! - **Library first, CLI second**
//!
//! ## Quick Start
//!
//! ```
//! use astlens::{Document, Language, TreeViews, ViewMode};
//!
//! let doc = Document::new(Language::TypeScript, "if (a) { b(); }");
//! let views = TreeViews::new(&doc);
//!
//! let collapsed = views.view(ViewMode::Collapsed);
//! let root = collapsed.root();
//! println!("{} has {} structural children", root.kind, root.children.len());
//!
//! let selection = views.hover(ViewMode::Collapsed, root.id)?;
//! println!("root spans {selection}");
//! # Ok::<(), astlens::Error>(())
//! ```

#![forbid(unsafe_code)]

pub mod bridge;
pub mod code_view;
pub mod config;
pub mod debounce;
mod error;
pub mod languages;
pub mod materialize;
pub mod native;
pub mod position;
pub mod projector;
pub mod session;
mod types;

pub use bridge::SelectionBridge;
pub use code_view::{code_view, CodeSpan, CodeView};
pub use config::AstlensConfig;
pub use debounce::Debouncer;
pub use error::{Error, Result};
pub use languages::{adapter_by_name, get_language_support, EditorSettings, LanguageAdapter};
pub use materialize::{materialize, Materialized, NodeWrapper, RenderNode};
pub use native::{NativeNode, ParseFailure, ParsedSource, ERROR_KIND};
pub use position::{LineLengthCache, SourceBuffer, TextSurface};
pub use projector::{DisplayEntry, Inspect, Inspected, Projector, PropertyValue};
pub use session::{Document, TreeViews, Trigger, ViewState};
pub use types::{Language, NodeId, SourceSelection, StyleClass, TextPosition, ViewMode};
