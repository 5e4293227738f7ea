//! Output formatting for CLI commands.
//!
//! Trees (syntax trees and property trees) are rendered with ASCII or Unicode
//! connectors; leaf tokens are colored by their highlight class.

use std::env;
use std::io::{self, Write};

use colored::Colorize;
use serde::Serialize;

use astlens::{
    DisplayEntry, LanguageAdapter, Materialized, NativeNode, NodeWrapper, SelectionBridge,
    StyleClass,
};

/// Longest leaf text shown inline in a tree before it is cut.
const MAX_INLINE_TEXT: usize = 40;

/// Configuration for output formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether to use ASCII-only connectors instead of Unicode.
    pub use_ascii: bool,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create an `OutputConfig` by reading from environment variables.
    ///
    /// Reads:
    /// - `ASTLENS_ASCII`: Set to "1" or "true" for ASCII-only connectors (default: false)
    /// - `NO_COLOR`: Standard env var to disable colors (any value disables colors)
    /// - `ASTLENS_COLOR`: Set to "0" or "false" to disable colors (default: true)
    pub fn from_env() -> Self {
        let use_ascii = match env::var("ASTLENS_ASCII") {
            Ok(v) if v == "1" || v.eq_ignore_ascii_case("true") => true,
            Ok(v) if v == "0" || v.eq_ignore_ascii_case("false") || v.is_empty() => false,
            Ok(v) => {
                tracing::warn!(
                    env_var = "ASTLENS_ASCII",
                    value = %v,
                    "Invalid value (expected '1', 'true', '0', or 'false'), using default"
                );
                false
            }
            Err(_) => false,
        };

        // Respect NO_COLOR standard (https://no-color.org/)
        let use_colors = env::var("NO_COLOR").is_err()
            && env::var("ASTLENS_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);

        Self {
            use_ascii,
            use_colors,
        }
    }

    /// Apply `f` only when colors are enabled.
    pub fn paint(&self, text: &str, f: impl Fn(&str) -> colored::ColoredString) -> String {
        if self.use_colors {
            f(text).to_string()
        } else {
            text.to_string()
        }
    }
}

/// A tree of pre-rendered labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTree {
    /// Text printed for this node
    pub label: String,
    /// Child nodes
    pub children: Vec<LabelTree>,
}

impl LabelTree {
    /// Labels for a materialized syntax tree: `#id kind`, plus the text of
    /// leaves.
    pub fn from_view(
        view: &Materialized<'_>,
        bridge: &SelectionBridge<'_>,
        adapter: &dyn LanguageAdapter,
        config: &OutputConfig,
    ) -> Self {
        let mut built = view.build_up(|wrapper, children| Self {
            label: node_label(wrapper, bridge, adapter, config),
            children,
        });
        built.pop().flatten().unwrap_or_else(|| Self {
            label: String::new(),
            children: Vec::new(),
        })
    }

    /// Labels for a projected property tree.
    pub fn from_entry(entry: &DisplayEntry, config: &OutputConfig) -> Self {
        let mut root = Self {
            label: entry_label(entry, config),
            children: Vec::new(),
        };
        // (entry, path of child indices from the root to its label node)
        let mut pending: Vec<(&DisplayEntry, Vec<usize>)> = vec![(entry, Vec::new())];
        while let Some((entry, path)) = pending.pop() {
            let Some(node) = root.descend_mut(&path) else {
                continue;
            };
            node.children = entry
                .children
                .iter()
                .map(|child| Self {
                    label: entry_label(child, config),
                    children: Vec::new(),
                })
                .collect();
            for (index, child) in entry.children.iter().enumerate() {
                let mut child_path = path.clone();
                child_path.push(index);
                pending.push((child, child_path));
            }
        }
        root
    }

    fn descend_mut(&mut self, path: &[usize]) -> Option<&mut Self> {
        let mut node = self;
        for &index in path {
            node = node.children.get_mut(index)?;
        }
        Some(node)
    }
}

fn node_label(
    wrapper: &NodeWrapper<'_>,
    bridge: &SelectionBridge<'_>,
    adapter: &dyn LanguageAdapter,
    config: &OutputConfig,
) -> String {
    let id = config.paint(&wrapper.id.to_string(), |s| s.dimmed());
    if let NativeNode::Error(failure) = wrapper.native {
        return format!(
            "{id} {} {}",
            config.paint(wrapper.kind, |s| s.red().bold()),
            config.paint(&failure.message, |s| s.red())
        );
    }
    let mut label = format!("{id} {}", config.paint(wrapper.kind, |s| s.bold()));
    if wrapper.is_leaf() {
        let text = inline_text(&bridge.text_for(wrapper.native));
        label.push(' ');
        let style = adapter.classify(wrapper.native);
        label.push_str(&paint_style(&format!("{text:?}"), style, config));
    }
    label
}

fn entry_label(entry: &DisplayEntry, config: &OutputConfig) -> String {
    let mut label = config.paint(&entry.key, |s| s.bold());
    if let Some(kind) = &entry.kind {
        label.push_str(&format!(" {}", config.paint(kind, |s| s.cyan())));
    }
    if let Some(value) = &entry.value {
        label.push_str(&format!(": {value}"));
    }
    if let Some(value_type) = &entry.value_type {
        let value_type = format!("({value_type})");
        label.push_str(&format!(" {}", config.paint(&value_type, |s| s.dimmed())));
    }
    label
}

/// Render a label tree with connectors.
///
/// ```text
/// #9 program
/// ├── #3 lexical_declaration
/// │   └── #2 variable_declarator
/// └── #8 if_statement
/// ```
pub fn write_tree<W: Write>(w: &mut W, root: &LabelTree, config: &OutputConfig) -> io::Result<()> {
    let (branch, corner, pipe, space) = if config.use_ascii {
        ("|-- ", "`-- ", "|   ", "    ")
    } else {
        ("├── ", "└── ", "│   ", "    ")
    };

    writeln!(w, "{}", root.label)?;

    // One iterator per open level; a level with items left draws a pipe.
    let mut levels = vec![root.children.iter()];
    while let Some(level) = levels.last_mut() {
        let Some(child) = level.next() else {
            levels.pop();
            continue;
        };
        let is_last = level.len() == 0;

        let mut prefix = String::new();
        for ancestor in &levels[..levels.len() - 1] {
            let has_more = ancestor.len() > 0;
            prefix.push_str(&config.paint(if has_more { pipe } else { space }, |s| s.dimmed()));
        }
        let connector = config.paint(if is_last { corner } else { branch }, |s| s.dimmed());

        writeln!(w, "{prefix}{connector}{}", child.label)?;

        if !child.children.is_empty() {
            levels.push(child.children.iter());
        }
    }

    Ok(())
}

/// Color text by its highlight class.
pub fn paint_style(text: &str, style: StyleClass, config: &OutputConfig) -> String {
    match style {
        StyleClass::String => config.paint(text, |s| s.green()),
        StyleClass::Keyword => config.paint(text, |s| s.magenta()),
        StyleClass::Number => config.paint(text, |s| s.yellow()),
        StyleClass::Plain => text.to_string(),
    }
}

/// Print a value as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> astlens::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

fn inline_text(text: &str) -> String {
    if text.chars().count() <= MAX_INLINE_TEXT {
        text.to_string()
    } else {
        let cut: String = text.chars().take(MAX_INLINE_TEXT).collect();
        format!("{cut}...")
    }
}
