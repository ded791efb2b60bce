//! Typographic settings applied when a laid-out packet is typeset.
//!
//! A theme only covers sizes and spacing.  Structural choices, such as which rules are drawn and
//! how heavy they are, belong to [`crate::layout`].

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;

/// Font sizes, spacing and fills used by the builder.  Every field has a default, so a theme file
/// only needs to list the values it changes.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Theme {
    /// Page margin on all four sides.
    pub margins_mm: f64,
    pub body_font_size: u8,
    pub title_font_size: u8,
    pub problem_font_size: u8,
    pub test_case_font_size: u8,
    pub header_font_size: u8,
    pub footer_font_size: u8,
    /// Size of the verbatim text inside example boxes.
    pub example_font_size: u8,
    pub line_spacing: f64,
    /// Greyscale level (0 black, 255 white) filling example boxes.
    pub example_fill: u8,
    /// Inner padding of example table cells.
    pub example_padding_mm: f64,
    /// Space left after each heading and between paragraphs.
    pub block_gap_mm: f64,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            margins_mm: 20.0,
            body_font_size: 11,
            title_font_size: 24,
            problem_font_size: 16,
            test_case_font_size: 12,
            header_font_size: 10,
            footer_font_size: 9,
            example_font_size: 10,
            line_spacing: 1.2,
            example_fill: 235,
            example_padding_mm: 2.0,
            block_gap_mm: 2.0,
        }
    }
}

impl Theme {
    pub fn from_toml_str(content: &str) -> Result<Self, ThemeError> {
        toml::from_str(content).map_err(ThemeError::Malformed)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ThemeError> {
        let content = fs::read_to_string(path.as_ref()).map_err(ThemeError::Read)?;
        Self::from_toml_str(&content)
    }
}

/// Errors raised while loading a theme file.
#[derive(Debug)]
pub enum ThemeError {
    Read(io::Error),
    Malformed(toml::de::Error),
}

impl fmt::Display for ThemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(_) => write!(f, "Failed to read theme file"),
            Self::Malformed(_) => write!(f, "Theme is malformed"),
        }
    }
}

impl std::error::Error for ThemeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read(err) => Some(err),
            Self::Malformed(err) => Some(err),
        }
    }
}
