//! Parsed G-code line types

use std::collections::HashMap;
use std::fmt;

/// Letters that introduce a command word on a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeLetter {
    /// Machine (M) code
    M,
    /// General (G) code
    G,
    /// Feed rate (F) word
    F,
    /// Tool select (T) word
    T,
}

impl CodeLetter {
    /// Map a leading character to a controlling letter, if it is one
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'M' => Some(Self::M),
            'G' => Some(Self::G),
            'F' => Some(Self::F),
            'T' => Some(Self::T),
            _ => None,
        }
    }

    /// The letter as it appears on the line
    pub fn as_char(self) -> char {
        match self {
            Self::M => 'M',
            Self::G => 'G',
            Self::F => 'F',
            Self::T => 'T',
        }
    }
}

impl fmt::Display for CodeLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A single protocol line broken into its parts
///
/// Built once per input line by [`parse_line`](super::parse_line) and never
/// modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCommand {
    pub(crate) code: Option<CodeLetter>,
    pub(crate) command: Option<String>,
    pub(crate) args: HashMap<char, String>,
    pub(crate) comment: Option<String>,
    pub(crate) checksum: u32,
}

impl ParsedCommand {
    /// Parse a line; shorthand for [`parse_line`](super::parse_line)
    pub fn parse(line: &str) -> Self {
        super::parse_line(line)
    }

    /// Controlling letter of the command word
    pub fn code(&self) -> Option<CodeLetter> {
        self.code
    }

    /// Full command word, e.g. `M115`
    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    /// Parameter words keyed by their first character
    pub fn args(&self) -> &HashMap<char, String> {
        &self.args
    }

    /// Value of a single parameter word
    pub fn arg(&self, key: char) -> Option<&str> {
        self.args.get(&key).map(String::as_str)
    }

    /// Trailing comment including its leading `;`
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Checksum following `*`, 0 when absent
    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    /// True when nothing recognizable was found on the line
    pub fn is_empty(&self) -> bool {
        self.code.is_none()
            && self.command.is_none()
            && self.args.is_empty()
            && self.comment.is_none()
            && self.checksum == 0
    }
}

impl fmt::Display for ParsedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut args: Vec<_> = self.args.iter().collect();
        args.sort();

        write!(f, "ParsedCommand(code=")?;
        match self.code {
            Some(code) => write!(f, "{}", code)?,
            None => write!(f, "-")?,
        }
        write!(f, ", command={}", self.command.as_deref().unwrap_or("-"))?;
        write!(f, ", args={{")?;
        for (i, (key, value)) in args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {:?}", key, value)?;
        }
        write!(f, "}}")?;
        write!(f, ", comment={}", self.comment.as_deref().unwrap_or("-"))?;
        write!(f, ", checksum={})", self.checksum)
    }
}
