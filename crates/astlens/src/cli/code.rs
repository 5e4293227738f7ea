//! `astlens code` command implementation.

use std::io::{self, Write};
use std::path::Path;

use astlens::{code_view, TreeViews};

use super::output::{paint_style, print_json, OutputConfig};
use super::{source, Context};

/// Run the code command.
pub fn run(ctx: &Context, file: Option<&Path>, json: bool) -> astlens::Result<()> {
    let doc = source::load(ctx, file)?;
    let views = TreeViews::new(&doc);
    let view = code_view(&views);
    if json {
        return print_json(&view);
    }

    let config = OutputConfig::from_env();
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    for span in &view.spans {
        write!(handle, "{}{}", span.leading, paint_style(&span.text, span.style, &config))?;
    }
    write!(handle, "{}", view.trailing)?;
    if !view.render_plain().ends_with('\n') {
        writeln!(handle)?;
    }
    Ok(())
}
