//! Remote commands and their acknowledgements.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::RemoteError;

/// A command accepted on the remote-control channel.
///
/// Parsing trims whitespace, ignores case, and accepts an optional leading
/// `/` so chat-style commands (`/led_on`) work unchanged.
///
/// # Examples
///
/// ```
/// use doorward_network::RemoteCommand;
///
/// let command: RemoteCommand = "/LED_ON".parse().unwrap();
/// assert_eq!(command, RemoteCommand::LampOn);
/// assert_eq!(command.ack(), "LED turned ON");
///
/// assert!("open_door".parse::<RemoteCommand>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemoteCommand {
    #[serde(rename = "led_on")]
    LampOn,
    #[serde(rename = "led_off")]
    LampOff,
    #[serde(rename = "fan_on")]
    FanOn,
    #[serde(rename = "fan_off")]
    FanOff,
}

impl RemoteCommand {
    /// Every command, in wire-name order.
    pub const ALL: [RemoteCommand; 4] = [
        RemoteCommand::LampOn,
        RemoteCommand::LampOff,
        RemoteCommand::FanOn,
        RemoteCommand::FanOff,
    ];

    /// Wire name of the command.
    pub fn as_str(self) -> &'static str {
        match self {
            RemoteCommand::LampOn => "led_on",
            RemoteCommand::LampOff => "led_off",
            RemoteCommand::FanOn => "fan_on",
            RemoteCommand::FanOff => "fan_off",
        }
    }

    /// Reply sent once the command has been applied.
    pub fn ack(self) -> &'static str {
        match self {
            RemoteCommand::LampOn => "LED turned ON",
            RemoteCommand::LampOff => "LED turned OFF",
            RemoteCommand::FanOn => "Fan turned ON",
            RemoteCommand::FanOff => "Fan turned OFF",
        }
    }

    /// Requested output level.
    pub fn level(self) -> bool {
        matches!(self, RemoteCommand::LampOn | RemoteCommand::FanOn)
    }

    /// True for the lamp commands, false for the fan commands.
    pub fn is_lamp(self) -> bool {
        matches!(self, RemoteCommand::LampOn | RemoteCommand::LampOff)
    }
}

impl fmt::Display for RemoteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RemoteCommand {
    type Err = RemoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let name = trimmed.strip_prefix('/').unwrap_or(trimmed);
        if name.is_empty() {
            return Err(RemoteError::EmptyCommand);
        }

        RemoteCommand::ALL
            .into_iter()
            .find(|command| command.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| RemoteError::UnknownCommand(name.to_string()))
    }
}
