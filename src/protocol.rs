/// Machine-readable event stream.
///
/// Every event is one JSON object per line (NDJSON), serialized with
/// `serde-json-core` into a fixed buffer. A message that does not fit is
/// dropped; reporting never fails a tick.
use heapless::Vec;
use serde::Serialize;

use crate::oui::MacString;

/// Firmware version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum size of a serialized JSON message
pub const MAX_MSG_LEN: usize = 256;

/// Buffer type for serialized JSON messages
pub type MsgBuffer = Vec<u8, MAX_MSG_LEN>;

/// Scan lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanPhase {
    Start,
    Complete,
    /// Stopped early by lowering shields
    Aborted,
}

/// Events sent from the device to whoever listens on the serial port
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum DeviceMessage<'a> {
    #[serde(rename = "boot")]
    Boot {
        board: &'static str,
        version: &'static str,
    },
    /// One classified observation
    #[serde(rename = "device")]
    Device {
        mac: &'a MacString,
        name: &'a str,
        vendor: &'static str,
        rssi: i8,
        usable: bool,
        alert: bool,
        /// Uptime in milliseconds
        ts: u32,
    },
    #[serde(rename = "scan")]
    Scan {
        state: ScanPhase,
        total: u32,
        usable: u32,
        alerts: u32,
        /// Addresses seen since boot
        known: u32,
        ts: u32,
    },
    #[serde(rename = "shields")]
    Shields { up: bool, ts: u32 },
}

/// Truncate a millisecond uptime to the wire width.
pub fn timestamp(now_ms: u64) -> u32 {
    now_ms as u32
}

/// Serialize a message followed by a newline. Returns the number of bytes
/// written, or `None` if it did not fit.
pub fn serialize_message(msg: &DeviceMessage, buf: &mut [u8]) -> Option<usize> {
    match serde_json_core::to_slice(msg, buf) {
        Ok(len) if len < buf.len() => {
            buf[len] = b'\n';
            Some(len + 1)
        }
        _ => None,
    }
}

/// Sink for [`DeviceMessage`]s.
pub trait Reporter {
    fn report(&mut self, msg: &DeviceMessage<'_>);
}

/// Writes each event as one log line.
#[derive(Debug, Default, Clone, Copy)]
pub struct SerialReporter;

impl Reporter for SerialReporter {
    fn report(&mut self, msg: &DeviceMessage<'_>) {
        let mut buf = MsgBuffer::new();
        buf.resize_default(MAX_MSG_LEN).ok();
        let Some(len) = serialize_message(msg, &mut buf) else {
            log::trace!("event dropped (too long)");
            return;
        };
        if let Ok(line) = core::str::from_utf8(&buf[..len]) {
            log::info!("{}", line.trim_end());
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use alloc::string::String;

    /// Reporter double that keeps every serialized line.
    #[derive(Default)]
    pub(crate) struct RecordingReporter {
        pub lines: alloc::vec::Vec<String>,
    }

    impl RecordingReporter {
        /// Lines whose `type` field is `kind`.
        pub fn of_type(&self, kind: &str) -> alloc::vec::Vec<&str> {
            let tag = alloc::format!(r#""type":"{}""#, kind);
            self.lines
                .iter()
                .filter(|l| l.contains(&tag))
                .map(String::as_str)
                .collect()
        }
    }

    impl Reporter for RecordingReporter {
        fn report(&mut self, msg: &DeviceMessage<'_>) {
            let mut buf = [0u8; MAX_MSG_LEN];
            let len = serialize_message(msg, &mut buf).expect("message fits");
            let line = core::str::from_utf8(&buf[..len]).unwrap();
            self.lines.push(String::from(line.trim_end()));
        }
    }

    fn to_json(msg: &DeviceMessage) -> String {
        let mut buf = [0u8; MAX_MSG_LEN];
        let len = serialize_message(msg, &mut buf).unwrap();
        String::from(core::str::from_utf8(&buf[..len]).unwrap())
    }

    // ── DeviceMessage serialization ─────────────────────────────────

    #[test]
    fn serialize_boot_message() {
        let json = to_json(&DeviceMessage::Boot {
            board: "test_board",
            version: "0.1.0",
        });
        assert_eq!(json, "{\"type\":\"boot\",\"board\":\"test_board\",\"version\":\"0.1.0\"}\n");
    }

    #[test]
    fn serialize_device_message() {
        let mac = MacString::try_from("F8:A7:63:00:00:09").unwrap();
        let json = to_json(&DeviceMessage::Device {
            mac: &mac,
            name: "Mi Band",
            vendor: "Xiaomi",
            rssi: -40,
            usable: true,
            alert: true,
            ts: 2000,
        });
        assert!(json.contains(r#""type":"device""#));
        assert!(json.contains(r#""mac":"F8:A7:63:00:00:09""#));
        assert!(json.contains(r#""name":"Mi Band""#));
        assert!(json.contains(r#""vendor":"Xiaomi""#));
        assert!(json.contains(r#""rssi":-40"#));
        assert!(json.contains(r#""alert":true"#));
        assert!(json.ends_with('\n'));
    }

    #[test]
    fn serialize_scan_phases() {
        for (phase, text) in [
            (ScanPhase::Start, "start"),
            (ScanPhase::Complete, "complete"),
            (ScanPhase::Aborted, "aborted"),
        ] {
            let json = to_json(&DeviceMessage::Scan {
                state: phase,
                total: 3,
                usable: 1,
                alerts: 0,
                known: 7,
                ts: 5000,
            });
            assert!(json.contains(&alloc::format!(r#""state":"{}""#, text)));
            assert!(json.contains(r#""known":7"#));
        }
    }

    #[test]
    fn serialize_shields_message() {
        let json = to_json(&DeviceMessage::Shields { up: true, ts: 42 });
        assert_eq!(json, "{\"type\":\"shields\",\"up\":true,\"ts\":42}\n");
    }

    #[test]
    fn oversized_message_is_dropped() {
        let mut buf = [0u8; 16];
        let msg = DeviceMessage::Shields { up: false, ts: 1 };
        assert_eq!(serialize_message(&msg, &mut buf), None);
    }

    #[test]
    fn no_room_for_newline_is_dropped() {
        let msg = DeviceMessage::Shields { up: true, ts: 42 };
        let exact = to_json(&msg).len() - 1;
        let mut buf = alloc::vec![0u8; exact];
        assert_eq!(serialize_message(&msg, &mut buf), None);
    }

    #[test]
    fn timestamp_wraps_at_u32() {
        assert_eq!(timestamp(1_500), 1_500);
        assert_eq!(timestamp(u32::MAX as u64 + 11), 10);
    }

    // ── Version constant ────────────────────────────────────────────

    #[test]
    fn version_is_semver() {
        let parts: heapless::Vec<&str, 4> = VERSION.split('.').collect();
        assert_eq!(parts.len(), 3, "VERSION should be semver (major.minor.patch)");
        for part in &parts {
            assert!(part.parse::<u32>().is_ok(), "'{part}' is not a number");
        }
    }
}
