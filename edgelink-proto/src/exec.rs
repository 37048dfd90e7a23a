//! Execution status record types.
//!
//! After a transmission cycle the engine leaves one consolidated result
//! artifact describing every connection attempt it made, per channel,
//! plus whether a software update was applied. These types are the
//! read-only decoded form of that artifact.

use serde::{Deserialize, Deserializer};

/// Outcome of one connection attempt. The authoritative indicator —
/// warnings and errors are diagnostic only and never affect it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum CommsStatus {
    /// The channel was disabled for this cycle.
    Disabled,
    /// The connection completed successfully.
    Success,
    /// The connection could not be established.
    ConnFailed,
    /// The engine reported a label this build does not know.
    #[default]
    Unknown,
}

impl CommsStatus {
    /// Maps an engine-reported label; anything unrecognized is `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "disabled" => Self::Disabled,
            "success" => Self::Success,
            "connfailed" => Self::ConnFailed,
            _ => Self::Unknown,
        }
    }
}

impl<'de> Deserialize<'de> for CommsStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::from_label(&String::deserialize(deserializer)?))
    }
}

/// Transfer direction of a high-bandwidth connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum Direction {
    /// Device → cloud offload.
    DownlinkOut,
    /// Cloud → device delivery (software payloads report `sw`).
    DownlinkIn,
    /// The engine reported a label this build does not know.
    #[default]
    Unknown,
}

impl Direction {
    /// Maps an engine-reported label; anything unrecognized is `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "do" => Self::DownlinkOut,
            "dt" | "sw" => Self::DownlinkIn,
            _ => Self::Unknown,
        }
    }
}

impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::from_label(&String::deserialize(deserializer)?))
    }
}

/// One low-bandwidth connection attempt.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[non_exhaustive]
pub struct LbConnectionStatus {
    /// Free-form transport label (e.g. a provider name).
    #[serde(default)]
    pub comms_type: String,
    /// Connection outcome.
    #[serde(rename = "status", default)]
    pub comms_status: CommsStatus,
    /// When the attempt started (RFC3339), if reported.
    #[serde(rename = "timestart", default)]
    pub start_time: Option<String>,
    /// When the attempt finished (RFC3339), if reported.
    #[serde(rename = "timestop", default)]
    pub stop_time: Option<String>,
    /// Engine warnings, in reported order.
    #[serde(default)]
    pub warnings: Vec<String>,
    /// Engine errors, in reported order.
    #[serde(default)]
    pub errors: Vec<String>,
    /// Messages sent over this connection.
    #[serde(rename = "msgsent", default)]
    pub messages_sent: u64,
    /// Packets sent over this connection.
    #[serde(rename = "pktsent", default)]
    pub packets_sent: u64,
    /// Messages received over this connection.
    #[serde(rename = "msgrecv", default)]
    pub messages_received: u64,
}

/// One high-bandwidth connection attempt.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[non_exhaustive]
pub struct HbConnectionStatus {
    /// Free-form transport label.
    #[serde(default)]
    pub comms_type: String,
    /// Connection outcome.
    #[serde(rename = "status", default)]
    pub comms_status: CommsStatus,
    /// When the attempt started (RFC3339), if reported.
    #[serde(rename = "timestart", default)]
    pub start_time: Option<String>,
    /// When the attempt finished (RFC3339), if reported.
    #[serde(rename = "timestop", default)]
    pub stop_time: Option<String>,
    /// Engine warnings, in reported order.
    #[serde(default)]
    pub warnings: Vec<String>,
    /// Engine errors, in reported order.
    #[serde(default)]
    pub errors: Vec<String>,
    /// Transfer direction.
    #[serde(rename = "dtype", default)]
    pub direction: Direction,
    /// Kilobytes sent.
    #[serde(rename = "datasent_kB", default)]
    pub bytes_sent_kb: u64,
    /// Kilobytes received.
    #[serde(rename = "datarecv_kB", default)]
    pub bytes_received_kb: u64,
}

/// Per-channel section of the consolidated artifact.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct ChannelSection<T> {
    /// Connection attempts, in engine-reported order.
    #[serde(default)]
    connections: Vec<T>,
}

impl<T> Default for ChannelSection<T> {
    fn default() -> Self {
        Self {
            connections: Vec::new(),
        }
    }
}

/// Snapshot of one execution cycle's outcome, populated in a single
/// import and read-only thereafter.
///
/// A channel the engine reported nothing for yields an empty sequence,
/// not an error.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExecStatus {
    #[serde(default)]
    lb: ChannelSection<LbConnectionStatus>,
    #[serde(default)]
    hb: ChannelSection<HbConnectionStatus>,
    #[serde(default)]
    software_updated: bool,
}

impl ExecStatus {
    /// Low-bandwidth connection attempts, in engine-reported order.
    pub fn lb_connections(&self) -> &[LbConnectionStatus] {
        &self.lb.connections
    }

    /// High-bandwidth connection attempts, in engine-reported order.
    pub fn hb_connections(&self) -> &[HbConnectionStatus] {
        &self.hb.connections
    }

    /// Whether the engine applied a software update during this cycle.
    pub const fn software_was_updated(&self) -> bool {
        self.software_updated
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_report() {
        let raw = r#"{
            "lb": {"connections": [
                {
                    "comms_type": "iridium-sbd",
                    "status": "success",
                    "timestart": "2020-09-03T17:15:01-04:00",
                    "timestop": "2020-09-03T17:15:44-04:00",
                    "warnings": ["w1", "w2"],
                    "errors": [],
                    "msgsent": 3,
                    "pktsent": 7,
                    "msgrecv": 1
                },
                {"comms_type": "lte", "status": "connfailed", "errors": ["no carrier"]}
            ]},
            "hb": {"connections": [
                {"comms_type": "wifi", "status": "success", "dtype": "sw",
                 "datasent_kB": 0, "datarecv_kB": 2048}
            ]},
            "software_updated": true
        }"#;
        let status: ExecStatus = serde_json::from_str(raw).unwrap();

        assert_eq!(status.lb_connections().len(), 2);
        let first = &status.lb_connections()[0];
        assert_eq!(first.comms_status, CommsStatus::Success);
        assert_eq!(first.warnings, ["w1", "w2"]);
        assert_eq!(first.packets_sent, 7);
        let second = &status.lb_connections()[1];
        assert_eq!(second.comms_status, CommsStatus::ConnFailed);
        assert_eq!(second.start_time, None);
        assert_eq!(second.messages_sent, 0);

        let hb = &status.hb_connections()[0];
        assert_eq!(hb.direction, Direction::DownlinkIn);
        assert_eq!(hb.bytes_received_kb, 2048);
        assert!(status.software_was_updated());
    }

    #[test]
    fn missing_channel_is_an_empty_sequence() {
        let status: ExecStatus = serde_json::from_str("{}").unwrap();
        assert!(status.lb_connections().is_empty());
        assert!(status.hb_connections().is_empty());
        assert!(!status.software_was_updated());
    }

    #[test]
    fn unknown_labels_map_to_unknown() {
        assert_eq!(CommsStatus::from_label("partial"), CommsStatus::Unknown);
        assert_eq!(Direction::from_label("up"), Direction::Unknown);
        assert_eq!(Direction::from_label("do"), Direction::DownlinkOut);
    }
}
