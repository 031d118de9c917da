/// BLE scan lifecycle and advertisement intake.
///
/// The radio is driven through the [`Radio`] trait so the scan state machine
/// runs unchanged on the host. Advertisement reports are parsed into
/// [`Observation`]s by the platform layer and handed to
/// [`ScanController::accept`], which gates them on the scan state before
/// they reach the registry.

use alloc::collections::btree_map::{BTreeMap, Entry};
use core::fmt;

use crate::error::Error;
use crate::oui::MacAddress;
use crate::registry::Registry;

/// Length of one discovery window in milliseconds.
pub const SCAN_DURATION_MS: u64 = 5_000;

/// Pause between scan starts while shields are down.
pub const SCAN_IDLE_MS: u64 = 10_000;

/// Scan interval and window, passed to the radio verbatim.
pub const SCAN_INTERVAL: u16 = 100;
pub const SCAN_WINDOW: u16 = 99;

/// Longest advertised name kept, in bytes.
pub const MAX_NAME_LEN: usize = 32;

/// Advertised device name storage
pub type NameString = heapless::String<33>;

/// One advertisement, as seen by the monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub address: MacAddress,
    /// Advertised local name, empty when the peer sent none
    pub name: NameString,
    /// Signal strength in dBm
    pub rssi: i8,
    /// Vendor label derived from the address OUI
    pub vendor: &'static str,
}

impl Observation {
    /// Build an observation; `name` is truncated to [`MAX_NAME_LEN`] bytes
    /// on a char boundary.
    pub fn new(address: MacAddress, name: &str, rssi: i8) -> Self {
        let mut stored = NameString::new();
        for c in name.chars() {
            if stored.len() + c.len_utf8() > MAX_NAME_LEN || stored.push(c).is_err() {
                break;
            }
        }
        Self {
            address,
            name: stored,
            rssi,
            vendor: address.vendor(),
        }
    }

    /// Leading part of the display line: `Name (Vendor)`, or the vendor
    /// alone when no name was advertised.
    pub fn write_label<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        if self.name.is_empty() {
            write!(out, "{}", self.vendor)
        } else {
            write!(out, "{} ({})", self.name, self.vendor)
        }
    }
}

/// Renders the human-readable display line (without trailing newline):
/// `Name (Vendor) [AA:BB:CC:DD:EE:FF] RSSI: -60`, or
/// `Vendor [AA:BB:CC:DD:EE:FF] RSSI: -60` when no name was advertised.
impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_label(f)?;
        write!(f, " [{}] RSSI: {}", self.address, self.rssi)
    }
}

/// Parser for BLE advertisement data (AD structures).
///
/// AD structure format: [length] [type] [data...]
/// Types we care about:
///   0x08 = Shortened local name
///   0x09 = Complete local name
pub struct AdvParser;

impl AdvParser {
    /// Extract the advertised local name, preferring the complete name.
    /// Returns an empty string when none is present or it is not UTF-8.
    pub fn local_name(ad_data: &[u8]) -> &str {
        let mut short = "";
        let mut pos = 0;
        while pos < ad_data.len() {
            let len = ad_data[pos] as usize;
            if len == 0 || pos + 1 + len > ad_data.len() {
                break;
            }

            let ad_type = ad_data[pos + 1];
            let data = &ad_data[pos + 2..pos + 1 + len];

            match ad_type {
                0x09 => {
                    if let Ok(name) = core::str::from_utf8(data) {
                        return name;
                    }
                }
                0x08 => {
                    if let Ok(name) = core::str::from_utf8(data) {
                        short = name;
                    }
                }
                _ => {}
            }

            pos += 1 + len;
        }
        short
    }

    /// Parse a raw advertisement report into an [`Observation`].
    pub fn parse(address: MacAddress, rssi: i8, ad_data: &[u8]) -> Observation {
        Observation::new(address, Self::local_name(ad_data), rssi)
    }
}

/// Radio scan parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanParams {
    /// Request scan responses from advertisers
    pub active: bool,
    /// Vendor-defined interval units
    pub interval: u16,
    /// Vendor-defined window units
    pub window: u16,
}

impl ScanParams {
    pub const DEFAULT: Self = Self {
        active: true,
        interval: SCAN_INTERVAL,
        window: SCAN_WINDOW,
    };
}

impl Default for ScanParams {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The BLE radio as seen by the scan controller.
///
/// `start` begins continuous scanning that lasts until `stop`. Reports are
/// delivered out of band (see the firmware's event handler).
pub trait Radio {
    fn configure(&mut self, params: &ScanParams) -> Result<(), Error>;
    fn start(&mut self) -> Result<(), Error>;
    fn stop(&mut self) -> Result<(), Error>;
}

/// Scan controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Running { started_at: u64 },
}

/// What [`ScanController::accept`] decided for one report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intake {
    /// First report from this address in the current window
    New,
    /// Later report carrying the name the first one lacked, typically the
    /// scan response to an active scan
    Named,
    Dropped,
}

/// Owns the radio and the scan-in-progress state.
///
/// At most one scan is outstanding. Within a scan window each address is
/// counted once, matching a duplicate-filtered scan. An address first seen
/// without a name may still be named once by a later report.
pub struct ScanController<R> {
    radio: R,
    state: ScanState,
    last_started_at: u64,
    /// Addresses reported this window, and whether they carried a name
    reported: BTreeMap<MacAddress, bool>,
}

impl<R: Radio> ScanController<R> {
    pub fn new(mut radio: R) -> Self {
        if let Err(e) = radio.configure(&ScanParams::DEFAULT) {
            log::error!("BLE scan configure failed: {}", e);
        }
        Self {
            radio,
            state: ScanState::Idle,
            last_started_at: 0,
            reported: BTreeMap::new(),
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, ScanState::Running { .. })
    }

    pub fn radio(&self) -> &R {
        &self.radio
    }

    /// IDLE → RUNNING. Resets the registry's per-scan tallies and commands
    /// the radio. Returns `false` (no-op) when a scan is already running.
    ///
    /// A radio error is logged but the scan still counts as running, so the
    /// timeout path retries it.
    pub fn start(&mut self, now: u64, registry: &mut Registry) -> bool {
        if self.is_running() {
            return false;
        }

        self.state = ScanState::Running { started_at: now };
        self.last_started_at = now;
        self.reported.clear();
        registry.begin_scan();

        log::info!("Starting BLE scan...");
        if let Err(e) = self.radio.start() {
            log::error!("BLE scan start failed: {}", e);
        }
        true
    }

    /// RUNNING → IDLE. Returns `false` when no scan was running.
    pub fn stop(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.state = ScanState::Idle;
        if let Err(e) = self.radio.stop() {
            log::error!("BLE scan stop failed: {}", e);
        }
        true
    }

    /// Whether the running scan has used up its window.
    pub fn timed_out(&self, now: u64) -> bool {
        match self.state {
            ScanState::Running { started_at } => now.saturating_sub(started_at) >= SCAN_DURATION_MS,
            ScanState::Idle => false,
        }
    }

    /// Whether the inter-scan pause has elapsed since the last start.
    pub fn idle_elapsed(&self, now: u64) -> bool {
        now.saturating_sub(self.last_started_at) >= SCAN_IDLE_MS
    }

    /// Gate an incoming report against the running scan window.
    pub fn accept(&mut self, obs: &Observation) -> Intake {
        if !self.is_running() {
            log::trace!("Dropping report from {} (not scanning)", obs.address);
            return Intake::Dropped;
        }
        let named = !obs.name.is_empty();
        match self.reported.entry(obs.address) {
            Entry::Vacant(slot) => {
                slot.insert(named);
                Intake::New
            }
            Entry::Occupied(mut slot) if named && !*slot.get() => {
                slot.insert(true);
                Intake::Named
            }
            Entry::Occupied(_) => Intake::Dropped,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec::Vec;

    /// Radio double that records every command.
    #[derive(Default)]
    pub(crate) struct RecordingRadio {
        pub commands: Vec<&'static str>,
        pub fail_start: bool,
    }

    impl Radio for RecordingRadio {
        fn configure(&mut self, params: &ScanParams) -> Result<(), Error> {
            assert_eq!(*params, ScanParams::DEFAULT);
            self.commands.push("configure");
            Ok(())
        }

        fn start(&mut self) -> Result<(), Error> {
            self.commands.push("start");
            if self.fail_start {
                Err(Error::RadioStart)
            } else {
                Ok(())
            }
        }

        fn stop(&mut self) -> Result<(), Error> {
            self.commands.push("stop");
            Ok(())
        }
    }

    fn mac(s: &str) -> MacAddress {
        s.parse().unwrap()
    }

    // ── Observation ─────────────────────────────────────────────────

    #[test]
    fn display_line_with_name() {
        let obs = Observation::new(mac("AA:BB:CC:11:22:33"), "X", -80);
        assert_eq!(obs.to_string(), "X (Unknown) [AA:BB:CC:11:22:33] RSSI: -80");
    }

    #[test]
    fn display_line_without_name_uses_vendor() {
        let obs = Observation::new(mac("D0:03:4B:00:00:01"), "", -50);
        assert_eq!(obs.to_string(), "Apple [D0:03:4B:00:00:01] RSSI: -50");
        let mut label = alloc::string::String::new();
        obs.write_label(&mut label).unwrap();
        assert_eq!(label, "Apple");
    }

    #[test]
    fn long_name_truncated_on_char_boundary() {
        let long = "ééééééééééééééééééééé"; // 21 two-byte chars
        let obs = Observation::new(mac("AA:BB:CC:11:22:33"), long, -60);
        assert!(obs.name.len() <= MAX_NAME_LEN);
        assert_eq!(obs.name.chars().count(), 16);
    }

    // ── AdvParser ───────────────────────────────────────────────────

    #[test]
    fn parse_complete_name() {
        // Flags, then Complete Local Name "Tag"
        let data = [0x02, 0x01, 0x06, 0x04, 0x09, b'T', b'a', b'g'];
        assert_eq!(AdvParser::local_name(&data), "Tag");
    }

    #[test]
    fn complete_name_preferred_over_short() {
        let data = [0x03, 0x08, b'A', b'B', 0x05, 0x09, b'A', b'B', b'C', b'D'];
        assert_eq!(AdvParser::local_name(&data), "ABCD");
    }

    #[test]
    fn short_name_used_when_alone() {
        let data = [0x03, 0x08, b'A', b'B'];
        assert_eq!(AdvParser::local_name(&data), "AB");
    }

    #[test]
    fn truncated_structure_stops_parsing() {
        let data = [0x02, 0x01, 0x06, 0x09, 0x09, b'X'];
        assert_eq!(AdvParser::local_name(&data), "");
    }

    #[test]
    fn zero_length_terminates() {
        let data = [0x00, 0x09, b'X'];
        assert_eq!(AdvParser::local_name(&data), "");
    }

    #[test]
    fn invalid_utf8_name_is_empty() {
        let data = [0x03, 0x09, 0xFF, 0xFE];
        assert_eq!(AdvParser::local_name(&data), "");
    }

    #[test]
    fn parse_builds_observation() {
        let data = [0x04, 0x09, b'B', b'u', b'd'];
        let obs = AdvParser::parse(mac("F8:A7:63:00:00:09"), -40, &data);
        assert_eq!(obs.name.as_str(), "Bud");
        assert_eq!(obs.vendor, "Xiaomi");
        assert_eq!(obs.rssi, -40);
    }

    // ── ScanController ──────────────────────────────────────────────

    #[test]
    fn new_configures_radio() {
        let ctl = ScanController::new(RecordingRadio::default());
        assert_eq!(ctl.radio().commands, ["configure"]);
        assert_eq!(ctl.state(), ScanState::Idle);
    }

    #[test]
    fn start_is_noop_while_running() {
        let mut reg = Registry::new();
        let mut ctl = ScanController::new(RecordingRadio::default());
        assert!(ctl.start(100, &mut reg));
        assert!(!ctl.start(200, &mut reg));
        assert_eq!(ctl.state(), ScanState::Running { started_at: 100 });
        assert_eq!(ctl.radio().commands, ["configure", "start"]);
    }

    #[test]
    fn start_resets_scan_tallies() {
        let mut reg = Registry::new();
        let mut ctl = ScanController::new(RecordingRadio::default());
        reg.on_observation(
            &Observation::new(mac("AA:BB:CC:11:22:33"), "", -40),
            crate::shields::Shields::Down,
        );
        assert_eq!(reg.total_count(), 1);
        ctl.start(0, &mut reg);
        assert_eq!(reg.total_count(), 0);
        assert!(reg.all_lines().is_empty());
    }

    #[test]
    fn stop_only_when_running() {
        let mut reg = Registry::new();
        let mut ctl = ScanController::new(RecordingRadio::default());
        assert!(!ctl.stop());
        ctl.start(0, &mut reg);
        assert!(ctl.stop());
        assert!(!ctl.is_running());
        assert_eq!(ctl.radio().commands, ["configure", "start", "stop"]);
    }

    #[test]
    fn timeout_after_scan_duration() {
        let mut reg = Registry::new();
        let mut ctl = ScanController::new(RecordingRadio::default());
        assert!(!ctl.timed_out(100_000));
        ctl.start(1_000, &mut reg);
        assert!(!ctl.timed_out(1_000 + SCAN_DURATION_MS - 1));
        assert!(ctl.timed_out(1_000 + SCAN_DURATION_MS));
    }

    #[test]
    fn idle_gap_measured_from_last_start() {
        let mut reg = Registry::new();
        let mut ctl = ScanController::new(RecordingRadio::default());
        assert!(!ctl.idle_elapsed(SCAN_IDLE_MS - 1));
        assert!(ctl.idle_elapsed(SCAN_IDLE_MS));
        ctl.start(20_000, &mut reg);
        ctl.stop();
        assert!(!ctl.idle_elapsed(29_999));
        assert!(ctl.idle_elapsed(30_000));
    }

    #[test]
    fn failed_radio_start_still_runs() {
        let mut reg = Registry::new();
        let radio = RecordingRadio {
            fail_start: true,
            ..Default::default()
        };
        let mut ctl = ScanController::new(radio);
        assert!(ctl.start(0, &mut reg));
        assert!(ctl.is_running());
    }

    #[test]
    fn accept_drops_reports_while_idle() {
        let mut ctl = ScanController::new(RecordingRadio::default());
        let obs = Observation::new(mac("AA:BB:CC:11:22:33"), "", -40);
        assert_eq!(ctl.accept(&obs), Intake::Dropped);
    }

    #[test]
    fn accept_filters_duplicates_per_window() {
        let mut reg = Registry::new();
        let mut ctl = ScanController::new(RecordingRadio::default());
        let obs = Observation::new(mac("AA:BB:CC:11:22:33"), "", -40);
        ctl.start(0, &mut reg);
        assert_eq!(ctl.accept(&obs), Intake::New);
        assert_eq!(ctl.accept(&obs), Intake::Dropped);
        ctl.stop();
        ctl.start(10_000, &mut reg);
        assert_eq!(ctl.accept(&obs), Intake::New);
    }

    #[test]
    fn scan_response_names_address_once() {
        let mut reg = Registry::new();
        let mut ctl = ScanController::new(RecordingRadio::default());
        let address = mac("D0:03:4B:00:00:01");
        let adv = AdvParser::parse(address, -50, &[0x02, 0x01, 0x06]);
        let rsp = AdvParser::parse(address, -52, &[0x06, 0x09, b'P', b'h', b'o', b'n', b'e']);

        ctl.start(0, &mut reg);
        assert_eq!(ctl.accept(&adv), Intake::New);
        assert_eq!(ctl.accept(&rsp), Intake::Named);
        assert_eq!(ctl.accept(&rsp), Intake::Dropped);
        assert_eq!(ctl.accept(&adv), Intake::Dropped);
    }

    #[test]
    fn named_first_report_is_never_renamed() {
        let mut reg = Registry::new();
        let mut ctl = ScanController::new(RecordingRadio::default());
        let first = Observation::new(mac("AA:BB:CC:11:22:33"), "Tag", -40);
        let other = Observation::new(mac("AA:BB:CC:11:22:33"), "Other", -40);
        ctl.start(0, &mut reg);
        assert_eq!(ctl.accept(&first), Intake::New);
        assert_eq!(ctl.accept(&other), Intake::Dropped);
    }
}
