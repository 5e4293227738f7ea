//! Domain types shared by adapters, the materializer and the bridge.
//!
//! ## Conventions
//!
//! | Value | Convention |
//! |-------|------------|
//! | `TextPosition::line` | 1-indexed |
//! | `TextPosition::column` | 0-indexed, counted in characters |
//! | `NodeId` | 1-indexed, unique within one materialization pass |
//! | Offsets | 0-indexed character offsets into the source text |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::languages::{self, LanguageAdapter};

// ============================================================================
// Positions
// ============================================================================

/// A position in source text, in the coordinates the editor surface expects.
///
/// Ordering is by line, then column.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TextPosition {
    /// Line number (1-indexed)
    pub line: u32,
    /// Column (0-indexed, in characters)
    pub column: u32,
}

impl TextPosition {
    /// Create a position from a 1-indexed line and a 0-indexed column.
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for TextPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A highlighted span of source text, from `start_pos` to `end_pos`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSelection {
    /// First position covered by the span
    pub start_pos: TextPosition,
    /// Position just past the span
    pub end_pos: TextPosition,
}

impl SourceSelection {
    /// Create a selection between two positions.
    #[must_use]
    pub const fn new(start_pos: TextPosition, end_pos: TextPosition) -> Self {
        Self { start_pos, end_pos }
    }

    /// A one-character selection starting at `position`.
    #[must_use]
    pub const fn single_char(position: TextPosition) -> Self {
        Self {
            start_pos: position,
            end_pos: TextPosition::new(position.line, position.column + 1),
        }
    }

    /// Whether `position` falls inside the half-open span `[start, end)`.
    #[must_use]
    pub fn contains(&self, position: TextPosition) -> bool {
        self.start_pos <= position && position < self.end_pos
    }

    /// Whether `position` falls inside the closed span `[start, end]`.
    #[must_use]
    pub fn covers(&self, position: TextPosition) -> bool {
        self.start_pos <= position && position <= self.end_pos
    }
}

impl fmt::Display for SourceSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start_pos, self.end_pos)
    }
}

// ============================================================================
// Identifiers
// ============================================================================

/// Identifier of a node wrapper within one materialization pass.
///
/// Identifiers are assigned in finishing order starting at 1, so the table
/// index of a wrapper is always `id - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Extract the raw u32 value.
    #[must_use]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// Position of this node in its identifier table, if the id is valid.
    #[must_use]
    pub fn index(self) -> Option<usize> {
        self.0.checked_sub(1).map(|i| i as usize)
    }
}

impl From<u32> for NodeId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// Enums
// ============================================================================

/// Which child-selection function the materializer follows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Every syntactic child the adapter exposes
    #[default]
    Extended,
    /// Only semantically structural children
    Collapsed,
}

impl ViewMode {
    /// Lowercase name used in configuration and on the command line.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Extended => "extended",
            Self::Collapsed => "collapsed",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "extended" => Ok(Self::Extended),
            "collapsed" => Ok(Self::Collapsed),
            _ => Err(Error::UnknownMode(s.to_string())),
        }
    }
}

/// Highlight class an adapter assigns to a leaf token.
///
/// The set is closed; renderers map each class to a color. The css names are
/// the token classes of the editor theme the classes were designed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleClass {
    /// String literals and their pieces
    String,
    /// Keywords and keyword-like literals (booleans, nil/null)
    Keyword,
    /// Numeric literals
    Number,
    /// Everything else
    Plain,
}

impl StyleClass {
    /// Editor token class for this style.
    #[must_use]
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::String => "mtk5",
            Self::Keyword => "mtk8",
            Self::Number => "mtk6",
            Self::Plain => "mtk1",
        }
    }
}

/// Supported source languages.
///
/// Adding a language requires implementing `LanguageAdapter` and registering
/// it in `languages::get_language_support`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Lua (`.lua`)
    Lua,
    /// TypeScript (`.ts`, `.mts`, `.cts`)
    #[default]
    TypeScript,
}

impl Language {
    /// Every registered language, in display order.
    pub const ALL: [Self; 2] = [Self::Lua, Self::TypeScript];

    /// File extensions handled by this language.
    #[must_use]
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Lua => &["lua"],
            Self::TypeScript => &["ts", "mts", "cts"],
        }
    }

    /// Detect language from file extension.
    ///
    /// # Returns
    ///
    /// `None` if the extension is not recognized.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|lang| lang.extensions().contains(&ext.as_str()))
    }

    /// Registry name of this language.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lua => "lua",
            Self::TypeScript => "typescript",
        }
    }

    /// The adapter implementing the parsing contract for this language.
    #[must_use]
    pub fn adapter(self) -> &'static dyn LanguageAdapter {
        languages::get_language_support(self)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lua" => Ok(Self::Lua),
            "typescript" | "ts" => Ok(Self::TypeScript),
            _ => Err(Error::UnknownLanguage(s.to_string())),
        }
    }
}
