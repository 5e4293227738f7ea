//! `astlens locate` command implementation.

use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use astlens::{SourceSelection, TextPosition, TextSurface, TreeViews, ViewMode};

use super::output::{print_json, OutputConfig};
use super::{source, Context};

/// What to resolve.
#[derive(Debug, Clone, Copy)]
pub enum Target {
    /// An absolute character offset
    Offset(usize),
    /// A line (1-based) and column (0-based)
    Position(TextPosition),
}

#[derive(Debug, Serialize)]
struct Located {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<usize>,
    /// 1-based line and column from the line cache; `(0, 0)` past the end
    line_col: (u32, u32),
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<TextPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    node: Option<LocatedNode>,
}

#[derive(Debug, Serialize)]
struct LocatedNode {
    id: u32,
    kind: &'static str,
    selection: SourceSelection,
}

/// Run the locate command.
pub fn run(
    ctx: &Context,
    file: Option<&Path>,
    target: Target,
    mode: ViewMode,
    json: bool,
) -> astlens::Result<()> {
    let doc = source::load(ctx, file)?;
    let views = TreeViews::new(&doc);
    let buffer = doc.buffer();
    let bridge = doc.bridge();

    let (offset, position) = match target {
        Target::Offset(offset) => (Some(offset), bridge.position_at(offset)),
        Target::Position(position) => (
            buffer.offset_at(position),
            buffer.offset_at(position).map(|_| position),
        ),
    };
    let line_col = offset.map_or((0, 0), |offset| buffer.lines().line_col(offset));
    let node = position
        .and_then(|position| bridge.node_at(views.view(mode), position))
        .map(|wrapper| LocatedNode {
            id: wrapper.id.as_u32(),
            kind: wrapper.kind,
            selection: bridge.selection_for(wrapper.native),
        });

    let located = Located {
        offset,
        line_col,
        position,
        node,
    };
    if json {
        return print_json(&located);
    }

    let config = OutputConfig::from_env();
    match located.position {
        Some(position) => println!(
            "{} {position} ({} {}:{})",
            config.paint("position", |s| s.dimmed()),
            config.paint("line/col", |s| s.dimmed()),
            line_col.0,
            line_col.1
        ),
        None => println!(
            "{}",
            config.paint("position is outside the text (line/col 0:0)", |s| s.yellow())
        ),
    }
    if let Some(node) = &located.node {
        println!(
            "{} {} {} {}",
            config.paint("node", |s| s.dimmed()),
            config.paint(&format!("#{}", node.id), |s| s.dimmed()),
            config.paint(node.kind, |s| s.cyan().bold()),
            node.selection
        );
    }
    Ok(())
}
