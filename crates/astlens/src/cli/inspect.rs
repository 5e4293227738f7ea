//! `astlens inspect` command implementation.

use std::io;
use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use astlens::{
    DisplayEntry, Inspected, NodeId, SourceSelection, TreeViews, Trigger, ViewMode, ViewState,
};

use super::output::{print_json, write_tree, LabelTree, OutputConfig};
use super::{source, Context};

/// Everything shown for a clicked node.
#[derive(Debug, Serialize)]
struct NodeDetail {
    id: u32,
    kind: &'static str,
    mode: ViewMode,
    selection: SourceSelection,
    text: String,
    properties: DisplayEntry,
}

/// Run the inspect command.
pub fn run(
    ctx: &Context,
    file: Option<&Path>,
    id: u32,
    mode: ViewMode,
    json: bool,
) -> astlens::Result<()> {
    let doc = source::load(ctx, file)?;
    let views = TreeViews::new(&doc);
    let state = ViewState::new(mode);
    let id = NodeId(id);

    // A command-line lookup behaves like a click in the tree.
    let Some(native) = views.detail(&state, id, Trigger::Click)? else {
        return Ok(());
    };
    let wrapper = views.node(mode, id)?;
    let bridge = doc.bridge();
    let detail = NodeDetail {
        id: wrapper.id.as_u32(),
        kind: wrapper.kind,
        mode,
        selection: views.hover(mode, id)?,
        text: bridge.text_for(native),
        properties: ctx
            .config
            .projector()
            .project_root(&Inspected::new(doc.adapter(), native)),
    };

    if json {
        return print_json(&detail);
    }

    let config = OutputConfig::from_env();
    println!(
        "{} {} {}",
        config.paint(&wrapper.id.to_string(), |s| s.dimmed()),
        config.paint(detail.kind, |s| s.cyan().bold()),
        config.paint(&format!("({mode})"), |s| s.dimmed())
    );
    println!("  {}: {}", config.paint("selection", |s| s.dimmed()), detail.selection);
    println!("  {}: {:?}", config.paint("text", |s| s.dimmed()), detail.text);
    println!();

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_tree(&mut handle, &LabelTree::from_entry(&detail.properties, &config), &config)?;
    Ok(())
}
