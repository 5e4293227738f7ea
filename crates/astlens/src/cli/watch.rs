//! `astlens watch` command implementation.

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use colored::Colorize;

use astlens::{Debouncer, TextSurface, TreeViews, ViewMode};

use super::output::OutputConfig;
use super::{source, tree, Context};

/// How often the file is re-read.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run the watch command.
///
/// Renders once, then polls the file and re-renders each time its content
/// settles on a new value for the configured quiet period.
pub fn run(
    ctx: &Context,
    file: &Path,
    mode: ViewMode,
    exit_after: Option<usize>,
) -> astlens::Result<()> {
    let mut doc = source::load(ctx, Some(file))?;
    let mut debouncer = Debouncer::new(ctx.config.debounce.source());
    debouncer.prime(doc.buffer().text().to_string());
    let config = OutputConfig::from_env();

    let mut renders = 0;
    loop {
        print_header(&config, file, doc.version());
        tree::render(&TreeViews::new(&doc), mode, false)?;
        renders += 1;
        if exit_after.is_some_and(|limit| renders >= limit) {
            return Ok(());
        }

        while !doc.update(wait_for_change(file, &mut debouncer)?) {
            tracing::debug!("Settled text matches the document, skipping render");
        }
    }
}

/// Block until the file settles on content different from the last release.
fn wait_for_change(file: &Path, debouncer: &mut Debouncer<String>) -> astlens::Result<String> {
    loop {
        thread::sleep(POLL_INTERVAL);
        match std::fs::read_to_string(file) {
            Ok(text) => {
                let now = Instant::now();
                debouncer.observe(text, now);
                if let Some(settled) = debouncer.poll(now) {
                    tracing::info!(path = %file.display(), "File changed");
                    return Ok(settled);
                }
            }
            // Editors often replace files by rename; a brief absence is not fatal.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %file.display(), "File temporarily missing");
            }
            Err(e) => return Err(e.into()),
        }
    }
}

fn print_header(config: &OutputConfig, file: &Path, version: u64) {
    let title = format!("{} (version {version})", file.display());
    println!("{}", config.paint(&title, |s| s.cyan().bold()));
}
