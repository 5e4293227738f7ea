//! CLI command implementations.

mod output;
mod source;

pub mod code;
pub mod follow;
pub mod inspect;
pub mod languages;
pub mod locate;
pub mod tree;
pub mod watch;

use astlens::{AstlensConfig, Language, ViewMode};

/// Settings shared by every command.
pub struct Context {
    /// Loaded configuration file, or defaults
    pub config: AstlensConfig,
    /// Language forced with `--language`
    pub language: Option<Language>,
}

impl Context {
    /// The requested view mode, or the configured default.
    pub fn mode(&self, requested: Option<&str>) -> astlens::Result<ViewMode> {
        requested.map_or(Ok(self.config.mode), str::parse)
    }
}
