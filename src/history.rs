/// Per-minute history of the scan tallies for the main-view sparklines.
///
/// Two fixed rings, written in lockstep. The sampler copies the current
/// counters into slot `head` once a minute and advances `head`; nothing is
/// aggregated.

/// Slots per ring
pub const HISTORY_LEN: usize = 15;

/// Sampling period in milliseconds.
pub const HISTORY_SAMPLE_MS: u64 = 60_000;

#[derive(Debug, Clone)]
pub struct History {
    total: [u32; HISTORY_LEN],
    usable: [u32; HISTORY_LEN],
    head: usize,
    last_sample: Option<u64>,
    written: usize,
}

impl History {
    pub const fn new() -> Self {
        Self {
            total: [0; HISTORY_LEN],
            usable: [0; HISTORY_LEN],
            head: 0,
            last_sample: None,
            written: 0,
        }
    }

    /// Sample if a period has elapsed since the last sample (or none was
    /// taken yet). Returns `true` when a slot was written.
    pub fn tick(&mut self, now: u64, total: u32, usable: u32) -> bool {
        if let Some(last) = self.last_sample {
            if now.saturating_sub(last) < HISTORY_SAMPLE_MS {
                return false;
            }
        }

        self.total[self.head] = total;
        self.usable[self.head] = usable;
        self.head = (self.head + 1) % HISTORY_LEN;
        self.last_sample = Some(now);
        self.written = (self.written + 1).min(HISTORY_LEN);
        true
    }

    /// Total-device ring in storage order
    pub fn total(&self) -> &[u32; HISTORY_LEN] {
        &self.total
    }

    /// Usable-device ring in storage order
    pub fn usable(&self) -> &[u32; HISTORY_LEN] {
        &self.usable
    }

    /// Slot the next sample goes into.
    pub fn head(&self) -> usize {
        self.head
    }

    /// Slots written so far, saturating at the ring length.
    pub fn filled(&self) -> usize {
        self.written
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
