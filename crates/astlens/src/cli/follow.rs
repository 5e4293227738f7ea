//! `astlens follow` command implementation.

use std::io::{self, BufRead};
use std::path::Path;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use colored::Colorize;
use serde::Serialize;

use astlens::{
    Debouncer, SourceBuffer, SourceSelection, TextPosition, TextSurface, TreeViews, ViewMode,
};

use super::output::OutputConfig;
use super::{source, Context};

/// How long the loop waits for the next cursor move before polling.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Serialize)]
struct Selected {
    id: u32,
    kind: &'static str,
    selection: SourceSelection,
}

/// Run the follow command.
///
/// Reads cursor positions from stdin, one per line, as `LINE:COLUMN` (1-based
/// line, 0-based column) or as an absolute offset. Each position selects the
/// node under it; a selection is printed once it has held for the configured
/// selection debounce and differs from the one printed before.
pub fn run(ctx: &Context, file: Option<&Path>, mode: ViewMode, json: bool) -> astlens::Result<()> {
    let doc = source::load(ctx, file)?;
    let views = TreeViews::new(&doc);
    let view = views.view(mode);
    let bridge = doc.bridge();
    let mut debouncer = Debouncer::new(ctx.config.debounce.selection());
    let config = OutputConfig::from_env();

    let (sender, cursor_moves) = mpsc::channel::<String>();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if sender.send(line).is_err() {
                break;
            }
        }
    });

    loop {
        let (received, closed) = match cursor_moves.recv_timeout(POLL_INTERVAL) {
            Ok(line) => (Some(line), false),
            Err(RecvTimeoutError::Timeout) => (None, false),
            Err(RecvTimeoutError::Disconnected) => (None, true),
        };
        let now = Instant::now();

        if let Some(line) = received {
            match parse_cursor(&line, doc.buffer()) {
                Some(position) => match bridge.node_at(view, position) {
                    Some(node) => {
                        debouncer.observe(node.id, now);
                    }
                    None => tracing::debug!(%position, "Cursor is outside the tree"),
                },
                None => tracing::warn!(line = %line, "Expected LINE:COLUMN or an offset"),
            }
        }

        // Once input ends, whatever is pending settles immediately.
        let settle_at = if closed { now + debouncer.quiet() } else { now };
        if let Some(id) = debouncer.poll(settle_at) {
            let wrapper = view.require(id)?;
            let selected = Selected {
                id: id.as_u32(),
                kind: wrapper.kind,
                selection: bridge.selection_for(wrapper.native),
            };
            if json {
                println!("{}", serde_json::to_string(&selected)?);
            } else {
                println!(
                    "{} {} {}",
                    config.paint(&format!("#{}", selected.id), |s| s.dimmed()),
                    config.paint(selected.kind, |s| s.cyan().bold()),
                    selected.selection
                );
            }
        }

        if closed {
            tracing::debug!("Cursor input closed");
            return Ok(());
        }
    }
}

/// Position named by one input line, if it is well formed and in the text.
fn parse_cursor(line: &str, buffer: &SourceBuffer) -> Option<TextPosition> {
    let line = line.trim();
    match line.split_once(':') {
        Some((row, column)) => {
            let position = TextPosition::new(row.trim().parse().ok()?, column.trim().parse().ok()?);
            buffer.offset_at(position).map(|_| position)
        }
        None => buffer.position_at(line.parse().ok()?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::line_column("2:1", Some(TextPosition::new(2, 1)))]
    #[case::padded(" 1 : 0 ", Some(TextPosition::new(1, 0)))]
    #[case::offset("3", Some(TextPosition::new(2, 1)))]
    #[case::past_the_end("9", None)]
    #[case::line_past_the_end("7:0", None)]
    #[case::garbage("here", None)]
    fn cursor_lines_resolve_against_the_buffer(
        #[case] line: &str,
        #[case] expected: Option<TextPosition>,
    ) {
        let buffer = SourceBuffer::new("a\nbc");
        assert_eq!(parse_cursor(line, &buffer), expected);
    }
}
