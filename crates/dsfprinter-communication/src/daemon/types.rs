//! Value types exchanged with the remote daemon

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Input channel a code originates from or is sent to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CodeChannel {
    /// HTTP requests
    #[serde(rename = "HTTP")]
    Http,
    /// Telnet sessions
    Telnet,
    /// Print file
    File,
    /// USB serial
    #[serde(rename = "USB")]
    Usb,
    /// Serial aux port
    Aux,
    /// Triggers
    Trigger,
    /// Deferred code queue
    Queue,
    /// Panel / LCD
    #[serde(rename = "LCD")]
    Lcd,
    /// Single board computer, the default channel for API clients
    #[default]
    #[serde(rename = "SBC")]
    Sbc,
    /// Daemon jobs
    Daemon,
    /// Second aux port
    Aux2,
    /// Auto pause
    Autopause,
    /// Channel the daemon could not attribute
    Unknown,
}

impl CodeChannel {
    /// Name used on the wire
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "HTTP",
            Self::Telnet => "Telnet",
            Self::File => "File",
            Self::Usb => "USB",
            Self::Aux => "Aux",
            Self::Trigger => "Trigger",
            Self::Queue => "Queue",
            Self::Lcd => "LCD",
            Self::Sbc => "SBC",
            Self::Daemon => "Daemon",
            Self::Aux2 => "Aux2",
            Self::Autopause => "Autopause",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for CodeChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CodeChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HTTP" => Ok(Self::Http),
            "Telnet" => Ok(Self::Telnet),
            "File" => Ok(Self::File),
            "USB" => Ok(Self::Usb),
            "Aux" => Ok(Self::Aux),
            "Trigger" => Ok(Self::Trigger),
            "Queue" => Ok(Self::Queue),
            "LCD" => Ok(Self::Lcd),
            "SBC" => Ok(Self::Sbc),
            "Daemon" => Ok(Self::Daemon),
            "Aux2" => Ok(Self::Aux2),
            "Autopause" => Ok(Self::Autopause),
            "Unknown" => Ok(Self::Unknown),
            other => Err(format!("Unknown code channel: {}", other)),
        }
    }
}

/// Kind of an intercepted code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodeType {
    /// Comment-only line
    Comment,
    /// G-code
    GCode,
    /// M-code
    MCode,
    /// Tool change
    TCode,
    /// Meta command keyword (if, while, echo...)
    Keyword,
}

impl CodeType {
    fn letter(self) -> &'static str {
        match self {
            Self::Comment => ";",
            Self::GCode => "G",
            Self::MCode => "M",
            Self::TCode => "T",
            Self::Keyword => "",
        }
    }
}

/// A code surfaced by the intercept connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCode {
    /// Channel the code arrived on
    pub channel: CodeChannel,
    /// Kind of code
    #[serde(rename = "type")]
    pub code_type: CodeType,
    /// Major code number, e.g. 104 for M104
    #[serde(default)]
    pub major_number: Option<i32>,
    /// Minor code number, e.g. 1 for G29.1
    #[serde(default)]
    pub minor_number: Option<i8>,
    /// Code flags bitmask
    #[serde(default)]
    pub flags: u32,
    /// Line number in the originating file, if any
    #[serde(default)]
    pub line_number: Option<u64>,
    /// Keyword text or comment
    #[serde(default)]
    pub comment: Option<String>,
}

impl RemoteCode {
    /// Create a code with no numbers or flags
    pub fn new(channel: CodeChannel, code_type: CodeType) -> Self {
        Self {
            channel,
            code_type,
            major_number: None,
            minor_number: None,
            flags: 0,
            line_number: None,
            comment: None,
        }
    }

    /// Set the code numbers
    pub fn with_numbers(mut self, major: i32, minor: Option<i8>) -> Self {
        self.major_number = Some(major);
        self.minor_number = minor;
        self
    }

    /// Set the comment or keyword text
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

impl fmt::Display for RemoteCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code_type.letter())?;
        if let Some(major) = self.major_number {
            write!(f, "{}", major)?;
            if let Some(minor) = self.minor_number {
                write!(f, ".{}", minor)?;
            }
        }
        if let Some(comment) = &self.comment {
            if self.code_type != CodeType::Comment && self.major_number.is_some() {
                f.write_str(" ")?;
            }
            f.write_str(comment)?;
        }
        Ok(())
    }
}

/// Result of executing a code
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeResult {
    /// Whether the code completed without error
    pub success: bool,
    /// Output produced by the code
    #[serde(default)]
    pub result: String,
}

impl CodeResult {
    /// Successful result with output
    pub fn ok(result: impl Into<String>) -> Self {
        Self {
            success: true,
            result: result.into(),
        }
    }

    /// Failed result with output
    pub fn failed(result: impl Into<String>) -> Self {
        Self {
            success: false,
            result: result.into(),
        }
    }
}
