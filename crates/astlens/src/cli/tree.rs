//! `astlens tree` command implementation.

use std::io;
use std::path::Path;

use astlens::{TreeViews, ViewMode};

use super::output::{print_json, write_tree, LabelTree, OutputConfig};
use super::{source, Context};

/// Run the tree command.
pub fn run(ctx: &Context, file: Option<&Path>, mode: ViewMode, json: bool) -> astlens::Result<()> {
    let doc = source::load(ctx, file)?;
    let views = TreeViews::new(&doc);
    render(&views, mode, json)
}

/// Print the `mode` tree of an already materialized document.
pub fn render(views: &TreeViews<'_>, mode: ViewMode, json: bool) -> astlens::Result<()> {
    let view = views.view(mode);
    if json {
        return print_json(&view.to_render_tree());
    }

    let doc = views.document();
    let config = OutputConfig::from_env();
    let labels = LabelTree::from_view(view, &doc.bridge(), doc.adapter(), &config);
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_tree(&mut handle, &labels, &config)?;
    Ok(())
}
