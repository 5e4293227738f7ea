//! Astlens CLI - Inspect syntax trees from the command line.
//!
//! Astlens parses a file (or a language's sample snippet) through a language
//! adapter and renders its extended or collapsed syntax tree, the leaf-level
//! code view, the properties of a single node, or the node under a position.
//! It can also follow a stream of cursor positions and report the node each
//! one settles on.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use astlens::{AstlensConfig, Language};

mod cli;

/// Astlens: live dual-view syntax tree inspector.
#[derive(Parser)]
#[command(name = "astlens")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (defaults to .astlens.yaml in the current directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Source language (lua, typescript); overrides the file extension
    #[arg(short, long, global = true)]
    language: Option<String>,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the registered language adapters
    Languages {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the syntax tree of a file
    Tree {
        /// Source file (defaults to the language's sample snippet)
        file: Option<PathBuf>,

        /// Tree granularity (extended, collapsed)
        #[arg(short, long)]
        mode: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the source as highlighted leaf tokens of the extended tree
    Code {
        /// Source file (defaults to the language's sample snippet)
        file: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the selection, text and properties of one node
    Inspect {
        /// Source file (defaults to the language's sample snippet)
        file: Option<PathBuf>,

        /// Node identifier, as printed by `astlens tree`
        #[arg(long)]
        id: u32,

        /// Tree granularity the identifier refers to (extended, collapsed)
        #[arg(short, long)]
        mode: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve an offset or line/column to a position and the node under it
    Locate {
        /// Source file (defaults to the language's sample snippet)
        file: Option<PathBuf>,

        /// Absolute character offset
        #[arg(long, conflicts_with_all = ["line", "column"], required_unless_present = "line")]
        offset: Option<usize>,

        /// Line number (1-based)
        #[arg(long, requires = "column")]
        line: Option<u32>,

        /// Column number (0-based, in characters)
        #[arg(long, requires = "line")]
        column: Option<u32>,

        /// Tree granularity to search (extended, collapsed)
        #[arg(short, long)]
        mode: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Re-render the tree of a file whenever it settles after a change
    Watch {
        /// Source file to watch
        file: PathBuf,

        /// Tree granularity (extended, collapsed)
        #[arg(short, long)]
        mode: Option<String>,

        /// Stop after this many renders (runs until interrupted by default)
        #[arg(long)]
        exit_after: Option<usize>,
    },

    /// Follow cursor positions read from stdin and print each settled selection
    Follow {
        /// Source file (defaults to the language's sample snippet)
        file: Option<PathBuf>,

        /// Tree granularity to search (extended, collapsed)
        #[arg(short, long)]
        mode: Option<String>,

        /// Output one JSON object per line
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            // Show cause chain for nested errors
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                eprintln!("  {}: {cause}", "caused by".dimmed());
                source = std::error::Error::source(cause);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> astlens::Result<()> {
    let cwd = std::env::current_dir()?;
    let config = AstlensConfig::discover(cli.config.as_deref(), &cwd)?;
    let language = cli.language.as_deref().map(str::parse::<Language>).transpose()?;
    let ctx = cli::Context { config, language };

    match cli.command {
        Commands::Languages { json } => cli::languages::run(json),
        Commands::Tree { file, mode, json } => {
            cli::tree::run(&ctx, file.as_deref(), ctx.mode(mode.as_deref())?, json)
        }
        Commands::Code { file, json } => cli::code::run(&ctx, file.as_deref(), json),
        Commands::Inspect {
            file,
            id,
            mode,
            json,
        } => cli::inspect::run(&ctx, file.as_deref(), id, ctx.mode(mode.as_deref())?, json),
        Commands::Locate {
            file,
            offset,
            line,
            column,
            mode,
            json,
        } => {
            let target = match (offset, line, column) {
                (Some(offset), _, _) => cli::locate::Target::Offset(offset),
                (None, Some(line), Some(column)) => cli::locate::Target::Position(
                    astlens::TextPosition::new(line, column),
                ),
                _ => {
                    return Err(astlens::Error::Config(
                        "locate needs --offset or --line with --column".to_string(),
                    ));
                }
            };
            cli::locate::run(&ctx, file.as_deref(), target, ctx.mode(mode.as_deref())?, json)
        }
        Commands::Watch {
            file,
            mode,
            exit_after,
        } => cli::watch::run(&ctx, &file, ctx.mode(mode.as_deref())?, exit_after),
        Commands::Follow { file, mode, json } => {
            cli::follow::run(&ctx, file.as_deref(), ctx.mode(mode.as_deref())?, json)
        }
    }
}
