//! Interactive command parsing

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A command typed at the recorder prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Record,
    Stop,
    Cancel,
    Download,
    DismissOverlay,
    Help,
    Quit,
}

impl UserAction {
    /// Every action with its accepted spellings and a short description
    pub const ALL: &'static [(UserAction, &'static str, &'static str)] = &[
        (UserAction::Record, "r, record", "start a new recording"),
        (UserAction::Stop, "s, stop", "stop and play back the recording"),
        (UserAction::Cancel, "c, cancel", "discard the current recording"),
        (UserAction::Download, "d, download", "save the last recording"),
        (UserAction::DismissOverlay, "ok", "dismiss the unsupported notice"),
        (UserAction::Help, "h, help", "show this help"),
        (UserAction::Quit, "q, quit", "exit"),
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown command: \"{0}\". Type 'help' for a list of commands")]
pub struct UnknownCommand(pub String);

impl FromStr for UserAction {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "r" | "record" | "start" => Ok(Self::Record),
            "s" | "stop" => Ok(Self::Stop),
            "c" | "cancel" => Ok(Self::Cancel),
            "d" | "download" | "save" => Ok(Self::Download),
            "ok" => Ok(Self::DismissOverlay),
            "h" | "help" | "?" => Ok(Self::Help),
            "q" | "quit" | "exit" => Ok(Self::Quit),
            other => Err(UnknownCommand(other.to_string())),
        }
    }
}

impl fmt::Display for UserAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Record => "record",
            Self::Stop => "stop",
            Self::Cancel => "cancel",
            Self::Download => "download",
            Self::DismissOverlay => "ok",
            Self::Help => "help",
            Self::Quit => "quit",
        };
        write!(f, "{}", name)
    }
}
