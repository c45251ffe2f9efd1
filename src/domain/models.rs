use serde::{Deserialize, Serialize};
use std::fmt;

/// A device row reported by the Bluetooth tool.
///
/// Stored on disk as a two-element JSON array `[address, name]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DeviceRow", into = "DeviceRow")]
pub struct DeviceEntry {
    pub address: String,
    pub name: String,
}

impl DeviceEntry {
    pub fn new(address: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: name.into(),
        }
    }

    /// Check whether the device name contains any of the given keywords (case-insensitive)
    pub fn matches_any(&self, keywords: &[String]) -> bool {
        let name = self.name.to_lowercase();
        keywords
            .iter()
            .any(|keyword| name.contains(&keyword.to_lowercase()))
    }
}

impl fmt::Display for DeviceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' (Address: {})", self.name, self.address)
    }
}

// Rows written by older runs may carry only an address, or extra leading columns.
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
struct DeviceRow(Vec<String>);

impl From<DeviceRow> for DeviceEntry {
    fn from(row: DeviceRow) -> Self {
        let mut row = row.0;
        while row.len() > 2 {
            row.remove(0);
        }
        let mut fields = row.into_iter();
        let address = fields.next().unwrap_or_default();
        let name = fields.next().unwrap_or_default();
        Self { address, name }
    }
}

impl From<DeviceEntry> for DeviceRow {
    fn from(entry: DeviceEntry) -> Self {
        DeviceRow(vec![entry.address, entry.name])
    }
}

/// Which `devices` listing to request from the tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceFilter {
    All,
    Paired,
    Connected,
}

impl DeviceFilter {
    pub fn label(&self) -> &'static str {
        match self {
            DeviceFilter::All => "all",
            DeviceFilter::Paired => "paired",
            DeviceFilter::Connected => "connected",
        }
    }
}

/// Result of one tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// Exit code reported when the tool could not finish (timeout, spawn or wait failure)
    pub const FAILURE_CODE: i32 = -1;

    pub const TIMEOUT_MESSAGE: &'static str = "Timeout expired while executing the command.";

    pub fn timed_out() -> Self {
        Self::failed(Self::TIMEOUT_MESSAGE)
    }

    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            code: Self::FAILURE_CODE,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// A line typed on the console, after parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    ScanAndPair,
    Scan,
    RemoveAllDevices,
    RemoveNonConnected,
    UpdatePairInfo,
    Pair(String),
    Connect(String),
    Remove(String),
    /// A single-device command with a missing or malformed address
    Usage(&'static str),
    Invalid,
}

impl ConsoleCommand {
    pub fn parse(line: &str) -> Self {
        let mut words = line.split_whitespace();
        let verb = words.next().unwrap_or_default();
        let argument = words.next();
        let extra = words.next().is_some();

        let single = |verb: &'static str, build: fn(String) -> ConsoleCommand| match argument {
            Some(address) if !extra && is_valid_address(address) => build(address.to_string()),
            _ => ConsoleCommand::Usage(verb),
        };

        match verb {
            "pair" => single("pair", ConsoleCommand::Pair),
            "connect" => single("connect", ConsoleCommand::Connect),
            "remove" => single("remove", ConsoleCommand::Remove),
            _ if argument.is_some() => ConsoleCommand::Invalid,
            "scanAndPair" => ConsoleCommand::ScanAndPair,
            "scan" => ConsoleCommand::Scan,
            "removeAllDevices" => ConsoleCommand::RemoveAllDevices,
            "removeNonConnected" => ConsoleCommand::RemoveNonConnected,
            "updatePairInfo" => ConsoleCommand::UpdatePairInfo,
            _ => ConsoleCommand::Invalid,
        }
    }
}

/// Six colon-separated hex octets, e.g. `AA:BB:CC:DD:EE:FF`
pub fn is_valid_address(address: &str) -> bool {
    let octets: Vec<&str> = address.split(':').collect();
    octets.len() == 6
        && octets
            .iter()
            .all(|o| o.len() == 2 && o.chars().all(|c| c.is_ascii_hexdigit()))
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    LogMessage(StatusMessage),
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub message: String,
    pub severity: MessageSeverity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSeverity {
    Info,
    Success,
    Warning,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords() -> Vec<String> {
        ["dualshock", "dualsense", "controller"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_keyword_match_ignores_case() {
        let pad = DeviceEntry::new("AA:BB:CC:DD:EE:FF", "DualSense Wireless Controller");
        let speaker = DeviceEntry::new("11:22:33:44:55:66", "JBL Flip 5");
        assert!(pad.matches_any(&keywords()));
        assert!(!speaker.matches_any(&keywords()));
    }

    #[test]
    fn test_entry_serializes_as_pair() {
        let entry = DeviceEntry::new("AA:BB:CC:DD:EE:FF", "Wireless Controller");
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"["AA:BB:CC:DD:EE:FF","Wireless Controller"]"#);
    }

    #[test]
    fn test_entry_rows_are_trimmed_from_the_front() {
        let entries: Vec<DeviceEntry> =
            serde_json::from_str(r#"[["Device","AA:BB:CC:DD:EE:FF","Pad"],["11:22:33:44:55:66"]]"#)
                .unwrap();
        assert_eq!(entries[0], DeviceEntry::new("AA:BB:CC:DD:EE:FF", "Pad"));
        assert_eq!(entries[1], DeviceEntry::new("11:22:33:44:55:66", ""));
    }

    #[test]
    fn test_parse_console_commands() {
        assert_eq!(ConsoleCommand::parse("scanAndPair"), ConsoleCommand::ScanAndPair);
        assert_eq!(ConsoleCommand::parse("scan"), ConsoleCommand::Scan);
        assert_eq!(
            ConsoleCommand::parse("removeAllDevices"),
            ConsoleCommand::RemoveAllDevices
        );
        assert_eq!(
            ConsoleCommand::parse("removeNonConnected"),
            ConsoleCommand::RemoveNonConnected
        );
        assert_eq!(
            ConsoleCommand::parse("updatePairInfo"),
            ConsoleCommand::UpdatePairInfo
        );
        assert_eq!(ConsoleCommand::parse("Scan"), ConsoleCommand::Invalid);
        assert_eq!(ConsoleCommand::parse("scan now"), ConsoleCommand::Invalid);
        assert_eq!(ConsoleCommand::parse("bogus"), ConsoleCommand::Invalid);
    }

    #[test]
    fn test_parse_single_device_commands() {
        assert_eq!(
            ConsoleCommand::parse("pair aa:bb:cc:dd:ee:ff"),
            ConsoleCommand::Pair("aa:bb:cc:dd:ee:ff".to_string())
        );
        assert_eq!(
            ConsoleCommand::parse("remove AA:BB:CC:DD:EE:FF"),
            ConsoleCommand::Remove("AA:BB:CC:DD:EE:FF".to_string())
        );
        assert_eq!(ConsoleCommand::parse("connect"), ConsoleCommand::Usage("connect"));
        assert_eq!(
            ConsoleCommand::parse("pair AA:BB:CC"),
            ConsoleCommand::Usage("pair")
        );
    }

    #[test]
    fn test_timeout_sentinel() {
        let out = ToolOutput::timed_out();
        assert_eq!(out.code, -1);
        assert!(!out.success());
        assert_eq!(out.stderr, ToolOutput::TIMEOUT_MESSAGE);
    }
}
