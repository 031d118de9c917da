/// Device identity memory and per-scan tallies.
///
/// Three tiers of addresses decide what counts as an alert:
/// - `all_known`: every address observed since boot, never cleared
/// - `session_seen`: near addresses observed since the last shields transition
/// - the current scan's counters and display lines, reset per scan
///
/// An observation raises an alert only when it is near (`rssi > -70`), the
/// address is new this lifetime and new this session, and shields are up.

use alloc::collections::BTreeSet;
use alloc::string::String;
use core::fmt::{self, Write};

use crate::oui::MacAddress;
use crate::scanner::Observation;
use crate::shields::Shields;

/// Observations strictly stronger than this (dBm) count as usable.
pub const USABLE_RSSI_THRESHOLD: i8 = -70;

/// Newline-terminated display lines, one per observation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBuffer {
    text: String,
}

impl LineBuffer {
    pub const fn new() -> Self {
        Self {
            text: String::new(),
        }
    }

    /// Append `line` followed by `\n`.
    pub fn push(&mut self, line: impl fmt::Display) {
        let _ = writeln!(self.text, "{}", line);
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of `\n` terminators in the buffer.
    pub fn line_count(&self) -> usize {
        line_count(&self.text)
    }

    pub fn lines(&self) -> core::str::Lines<'_> {
        self.text.lines()
    }

    /// Replace the leading label of the line for `address`, the text before
    /// its ` [AA:BB:..]`. Returns `false` when no line mentions the address.
    pub fn relabel(&mut self, address: &MacAddress, label: &str) -> bool {
        let mut marker: heapless::String<20> = heapless::String::new();
        let _ = write!(marker, " [{}]", address);
        let Some(at) = self.text.find(marker.as_str()) else {
            return false;
        };
        let start = self.text[..at].rfind('\n').map_or(0, |nl| nl + 1);
        self.text.replace_range(start..at, label);
        true
    }
}

/// Count `\n` occurrences in a multi-line buffer.
pub fn line_count(text: &str) -> usize {
    text.bytes().filter(|&b| b == b'\n').count()
}

/// How a single observation was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Classification {
    /// First time this address was seen since boot
    pub new_global: bool,
    /// Strong enough to count as usable
    pub usable: bool,
    /// Raised an alert
    pub alert: bool,
}

/// The three-tier registry.
#[derive(Debug, Default)]
pub struct Registry {
    // Grows for the whole uptime. Peers using rotating private addresses
    // add a fresh entry per rotation, so a long run in a busy place is
    // bounded only by the heap.
    all_known: BTreeSet<MacAddress>,
    session_seen: BTreeSet<MacAddress>,

    total_count: u32,
    usable_count: u32,
    all_lines: LineBuffer,
    usable_lines: LineBuffer,

    alert_count: u32,
    alert_lines: LineBuffer,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the per-scan counters and line buffers. Sets and alert state
    /// are left untouched.
    pub fn begin_scan(&mut self) {
        self.total_count = 0;
        self.usable_count = 0;
        self.all_lines.clear();
        self.usable_lines.clear();
    }

    /// Classify one observation and record it.
    pub fn on_observation(&mut self, obs: &Observation, shields: Shields) -> Classification {
        let mut class = Classification {
            new_global: self.all_known.insert(obs.address),
            ..Default::default()
        };

        if obs.rssi > USABLE_RSSI_THRESHOLD {
            class.usable = true;
            self.usable_count += 1;
            self.usable_lines.push(obs);

            let new_session = self.session_seen.insert(obs.address);

            if shields.is_up() && class.new_global && new_session {
                class.alert = true;
                self.alert_count += 1;
                self.alert_lines.push(obs);
            }
        }

        self.total_count += 1;
        self.all_lines.push(obs);

        class
    }

    /// Apply a name that arrived after the address was already recorded
    /// this scan. Rewrites its lines in place; counts and sets are unchanged.
    pub fn on_name(&mut self, obs: &Observation) {
        let mut label = String::new();
        let _ = obs.write_label(&mut label);
        for lines in [&mut self.all_lines, &mut self.usable_lines, &mut self.alert_lines] {
            lines.relabel(&obs.address, &label);
        }
    }

    /// Forget the session: clears `session_seen` and all alert state.
    /// Invoked on every shields transition.
    pub fn clear_session(&mut self) {
        self.session_seen.clear();
        self.alert_count = 0;
        self.alert_lines.clear();
    }

    pub fn total_count(&self) -> u32 {
        self.total_count
    }

    pub fn usable_count(&self) -> u32 {
        self.usable_count
    }

    pub fn alert_count(&self) -> u32 {
        self.alert_count
    }

    pub fn all_lines(&self) -> &LineBuffer {
        &self.all_lines
    }

    pub fn usable_lines(&self) -> &LineBuffer {
        &self.usable_lines
    }

    pub fn alert_lines(&self) -> &LineBuffer {
        &self.alert_lines
    }

    /// Number of addresses seen since boot.
    pub fn known_count(&self) -> usize {
        self.all_known.len()
    }

    pub fn session_count(&self) -> usize {
        self.session_seen.len()
    }

    pub fn is_known(&self, address: &MacAddress) -> bool {
        self.all_known.contains(address)
    }

    pub fn in_session(&self, address: &MacAddress) -> bool {
        self.session_seen.contains(address)
    }

    /// Whether every session address is also known.
    pub fn session_is_subset(&self) -> bool {
        self.session_seen.is_subset(&self.all_known)
    }
}
