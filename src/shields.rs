/// Alert mode ("shields").
///
/// Raising shields starts a fresh session and scans back to back; lowering
/// them drops the session and pre-empts any scan in flight.

use crate::registry::Registry;
use crate::scanner::{Radio, ScanController};

/// Alert mode flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shields {
    #[default]
    Down,
    Up,
}

impl Shields {
    pub fn is_up(self) -> bool {
        self == Shields::Up
    }

    pub fn toggled(self) -> Self {
        match self {
            Shields::Down => Shields::Up,
            Shields::Up => Shields::Down,
        }
    }

    /// Button caption
    pub fn label(self) -> &'static str {
        match self {
            Shields::Up => "SHIELDS UP",
            Shields::Down => "SHIELDS DOWN",
        }
    }
}

/// What a transition did to the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Shields raised; a scan was started (or one was already running)
    Raised { scan_started: bool },
    /// Shields lowered; `preempted` if a running scan was stopped
    Lowered { preempted: bool },
}

/// Holds the shields flag and applies transition effects.
#[derive(Debug, Default)]
pub struct ModeController {
    shields: Shields,
}

impl ModeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shields(&self) -> Shields {
        self.shields
    }

    /// Flip shields. The session is cleared before any scan this
    /// transition starts.
    pub fn toggle<R: Radio>(
        &mut self,
        now: u64,
        registry: &mut Registry,
        scanner: &mut ScanController<R>,
    ) -> Transition {
        self.shields = self.shields.toggled();
        registry.clear_session();

        match self.shields {
            Shields::Up => {
                log::info!("Shields UP");
                Transition::Raised {
                    scan_started: scanner.start(now, registry),
                }
            }
            Shields::Down => {
                log::info!("Shields DOWN");
                let preempted = scanner.stop();
                if preempted {
                    log::info!("Scanning stopped due to shields down");
                }
                Transition::Lowered { preempted }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::tests::RecordingRadio;
    use crate::scanner::Observation;

    fn obs(addr: &str, rssi: i8) -> Observation {
        Observation::new(addr.parse().unwrap(), "", rssi)
    }

    #[test]
    fn flag_helpers() {
        assert!(!Shields::default().is_up());
        assert_eq!(Shields::Down.toggled(), Shields::Up);
        assert_eq!(Shields::Up.toggled(), Shields::Down);
        assert_eq!(Shields::Up.label(), "SHIELDS UP");
        assert_eq!(Shields::Down.label(), "SHIELDS DOWN");
    }

    #[test]
    fn raising_clears_session_then_starts_scan() {
        let mut reg = Registry::new();
        let mut scanner = ScanController::new(RecordingRadio::default());
        let mut mode = ModeController::new();
        reg.on_observation(&obs("AA:BB:CC:00:00:01", -40), Shields::Down);
        assert_eq!(reg.session_count(), 1);

        let t = mode.toggle(500, &mut reg, &mut scanner);

        assert_eq!(t, Transition::Raised { scan_started: true });
        assert_eq!(mode.shields(), Shields::Up);
        assert_eq!(reg.session_count(), 0);
        assert!(scanner.is_running());
        // begin_scan ran as part of the start
        assert_eq!(reg.total_count(), 0);
    }

    #[test]
    fn raising_while_scanning_keeps_scan() {
        let mut reg = Registry::new();
        let mut scanner = ScanController::new(RecordingRadio::default());
        let mut mode = ModeController::new();
        scanner.start(0, &mut reg);

        let t = mode.toggle(100, &mut reg, &mut scanner);
        assert_eq!(t, Transition::Raised { scan_started: false });
        assert_eq!(scanner.radio().commands, ["configure", "start"]);
    }

    #[test]
    fn lowering_preempts_scan_and_clears_alerts() {
        let mut reg = Registry::new();
        let mut scanner = ScanController::new(RecordingRadio::default());
        let mut mode = ModeController::new();
        mode.toggle(0, &mut reg, &mut scanner);
        reg.on_observation(&obs("F8:A7:63:00:00:09", -40), Shields::Up);
        assert_eq!(reg.alert_count(), 1);

        let t = mode.toggle(1_000, &mut reg, &mut scanner);

        assert_eq!(t, Transition::Lowered { preempted: true });
        assert!(!scanner.is_running());
        assert_eq!(reg.alert_count(), 0);
        assert!(reg.alert_lines().is_empty());
        assert_eq!(reg.session_count(), 0);
        // Already-classified observations stay in the scan buffers
        assert_eq!(reg.total_count(), 1);
    }

    #[test]
    fn lowering_when_idle_does_not_touch_radio() {
        let mut reg = Registry::new();
        let mut scanner = ScanController::new(RecordingRadio::default());
        let mut mode = ModeController::new();
        mode.toggle(0, &mut reg, &mut scanner);
        scanner.stop();

        let t = mode.toggle(10, &mut reg, &mut scanner);
        assert_eq!(t, Transition::Lowered { preempted: false });
        assert_eq!(scanner.radio().commands, ["configure", "start", "stop"]);
    }
}
