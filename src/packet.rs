//! Problem packets: the input to the layout rules.
//!
//! Packets are usually authored in TOML, either as a standalone file or as the `[packet]` table
//! of a competition server configuration:
//!
//! ```toml
//! title = "Example Packet"
//! preamble = "Read from **standard input**."
//!
//! [[problems]]
//! title = "Add"
//! description = "Print the sum of `a` and `b`."
//!
//! [[problems.tests]]
//! input = "1 2"
//! output = "3"
//! visible = true
//! ```
//!
//! Keys that only matter to the server (`languages`, `setup`, `authentication`, ...) are ignored.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;

use crate::markdown::Markup;

/// A complete problem packet.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Packet {
    pub title: String,
    #[serde(default)]
    pub preamble: Option<Markup>,
    #[serde(default)]
    pub problems: Vec<Problem>,
}

/// One problem statement with its example tests.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Problem {
    pub title: String,
    #[serde(default)]
    pub description: Option<Markup>,
    #[serde(default)]
    pub tests: Vec<TestCase>,
}

/// An input/output pair.  Only visible tests are printed.
///
/// `input` and `output` must be present, though either may be empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct TestCase {
    pub input: String,
    pub output: String,
    #[serde(default)]
    pub visible: bool,
}

impl TestCase {
    pub fn new(input: impl Into<String>, output: impl Into<String>, visible: bool) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            visible,
        }
    }
}

impl Problem {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            tests: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<Option<Markup>>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_test(mut self, test: TestCase) -> Self {
        self.tests.push(test);
        self
    }
}

impl Packet {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            preamble: None,
            problems: Vec::new(),
        }
    }

    pub fn with_preamble(mut self, preamble: impl Into<Option<Markup>>) -> Self {
        self.preamble = preamble.into();
        self
    }

    pub fn with_problem(mut self, problem: Problem) -> Self {
        self.problems.push(problem);
        self
    }

    /// Parses a standalone packet document.
    pub fn from_toml_str(content: &str) -> Result<Self, PacketError> {
        let packet: Packet = toml::from_str(content).map_err(PacketError::Malformed)?;
        packet.validate()?;
        Ok(packet)
    }

    /// Parses a server configuration and extracts its `[packet]` table.
    ///
    /// A document without a `[packet]` table is parsed as a standalone packet.
    pub fn from_config_str(content: &str) -> Result<Self, PacketError> {
        #[derive(Deserialize)]
        struct Config {
            packet: Option<Packet>,
        }

        let config: Config = toml::from_str(content).map_err(PacketError::Malformed)?;
        match config.packet {
            Some(packet) => {
                packet.validate()?;
                Ok(packet)
            }
            None => Self::from_toml_str(content),
        }
    }

    /// Reads and parses the packet at `path`, accepting both layouts of
    /// [`Packet::from_config_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PacketError> {
        let content = fs::read_to_string(path.as_ref()).map_err(PacketError::Read)?;
        Self::from_config_str(&content)
    }

    /// Checks the structural requirements that serde cannot express.
    pub fn validate(&self) -> Result<(), PacketError> {
        if self.title.trim().is_empty() {
            return Err(PacketError::MissingTitle { problem: None });
        }
        if let Some(index) = self
            .problems
            .iter()
            .position(|problem| problem.title.trim().is_empty())
        {
            return Err(PacketError::MissingTitle {
                problem: Some(index),
            });
        }
        Ok(())
    }
}

/// Errors raised while reading a packet.
#[derive(Debug)]
pub enum PacketError {
    /// The packet file could not be read.
    Read(io::Error),
    /// The content is not a valid packet: bad TOML, a missing key or a value of the wrong type.
    Malformed(toml::de::Error),
    /// The packet title, or the title of the problem at the given index, is blank.
    MissingTitle { problem: Option<usize> },
}

impl fmt::Display for PacketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(_) => write!(f, "Failed to read packet file"),
            Self::Malformed(_) => write!(f, "Packet is malformed"),
            Self::MissingTitle { problem: None } => write!(f, "Packet title is missing"),
            Self::MissingTitle {
                problem: Some(index),
            } => write!(f, "Problem {} has no title", index + 1),
        }
    }
}

impl std::error::Error for PacketError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read(err) => Some(err),
            Self::Malformed(err) => Some(err),
            Self::MissingTitle { .. } => None,
        }
    }
}
