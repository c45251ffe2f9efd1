//! Bluetooth Control Tool Protocol
//!
//! This module contains the commands understood by the Bluetooth control
//! tool and the parsing of its line-oriented `devices` listings.

use crate::domain::models::{DeviceEntry, DeviceFilter};
use tracing::trace;

/// Prefix of every device row in a `devices` listing
pub const DEVICE_LINE_PREFIX: &str = "Device ";

/// Commands passed to the tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCommand {
    /// List known devices, optionally filtered
    Devices(DeviceFilter),
    /// Start discovery; runs until the tool is killed
    ScanOn,
    Pair(String),
    Trust(String),
    Connect(String),
    Remove(String),
}

impl ToolCommand {
    /// Get the argument vector for this command
    pub fn args(&self) -> Vec<String> {
        let words: Vec<&str> = match self {
            Self::Devices(DeviceFilter::All) => vec!["devices"],
            Self::Devices(DeviceFilter::Paired) => vec!["devices", "Paired"],
            Self::Devices(DeviceFilter::Connected) => vec!["devices", "Connected"],
            Self::ScanOn => vec!["scan", "on"],
            Self::Pair(address) => vec!["pair", address.as_str()],
            Self::Trust(address) => vec!["trust", address.as_str()],
            Self::Connect(address) => vec!["connect", address.as_str()],
            Self::Remove(address) => vec!["remove", address.as_str()],
        };
        words.into_iter().map(str::to_string).collect()
    }

    /// The command as it would be typed after the tool name
    pub fn command_line(&self) -> String {
        self.args().join(" ")
    }
}

/// Parse a `devices` listing.
///
/// Each row looks like `Device AA:BB:CC:DD:EE:FF Wireless Controller`; the
/// name keeps its inner spaces. Rows without a name get an empty name and
/// anything that is not a device row is skipped.
pub fn parse_device_listing(output: &str) -> Vec<DeviceEntry> {
    output
        .lines()
        .filter_map(|line| {
            let Some(rest) = line.trim_start().strip_prefix(DEVICE_LINE_PREFIX) else {
                trace!("Skipping listing line: {:?}", line);
                return None;
            };
            let rest = rest.trim();
            if rest.is_empty() {
                return None;
            }
            let (address, name) = rest.split_once(' ').unwrap_or((rest, ""));
            Some(DeviceEntry::new(address, name.trim()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_args() {
        assert_eq!(
            ToolCommand::Devices(DeviceFilter::Paired).command_line(),
            "devices Paired"
        );
        assert_eq!(ToolCommand::Devices(DeviceFilter::All).args(), vec!["devices"]);
        assert_eq!(ToolCommand::ScanOn.args(), vec!["scan", "on"]);
        assert_eq!(
            ToolCommand::Remove("AA:BB:CC:DD:EE:FF".into()).command_line(),
            "remove AA:BB:CC:DD:EE:FF"
        );
    }

    #[test]
    fn test_parse_listing_keeps_spaces_in_names() {
        let output = "Device 00:1A:7D:DA:71:13 Wireless Controller\n\
                      Device 11:22:33:44:55:66 DualSense  Edge \n";
        let devices = parse_device_listing(output);
        assert_eq!(
            devices,
            vec![
                DeviceEntry::new("00:1A:7D:DA:71:13", "Wireless Controller"),
                DeviceEntry::new("11:22:33:44:55:66", "DualSense  Edge"),
            ]
        );
    }

    #[test]
    fn test_parse_listing_skips_noise() {
        let output = "Agent registered\n\
                      Device AA:BB:CC:DD:EE:FF\n\
                      \n\
                      [CHG] Controller 00:00:00:00:00:00 Discovering: yes\n";
        let devices = parse_device_listing(output);
        assert_eq!(devices, vec![DeviceEntry::new("AA:BB:CC:DD:EE:FF", "")]);
    }

    #[test]
    fn test_parse_empty_listing() {
        assert!(parse_device_listing("").is_empty());
    }
}
