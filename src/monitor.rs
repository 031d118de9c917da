/// The cooperative main loop.
///
/// `Monitor` owns every piece of application state and advances it one
/// tick at a time: poll touch, sample history, drive the scan cycle,
/// animate alerts, then repaint whatever is dirty. Advertisement reports
/// are fed in between ticks through [`Monitor::on_advertisement`], so the
/// registry only ever sees a single writer.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::DrawTarget;

use crate::board;
use crate::history::History;
use crate::input::{self, InputRouter, ListHit, MainHit, TouchPanel};
use crate::protocol::{timestamp, DeviceMessage, Reporter, ScanPhase, VERSION};
use crate::registry::{Classification, Registry};
use crate::scanner::{Intake, Observation, Radio, ScanController};
use crate::shields::{ModeController, Shields, Transition};
use crate::ui::glyphs::AlertAnimation;
use crate::ui::list_view::{ListKind, ListView};
use crate::ui::main_view::{self, MainModel};

/// Nominal tick period.
pub const TICK_MS: u64 = 10;

/// What is on screen.
#[derive(Debug)]
pub enum View {
    Main,
    List(ListView),
}

pub struct Monitor<R, P> {
    registry: Registry,
    history: History,
    scanner: ScanController<R>,
    mode: ModeController,
    input: InputRouter,
    view: View,
    animation: AlertAnimation,
    main_dirty: bool,
    reporter: P,
}

impl<R: Radio, P: Reporter> Monitor<R, P> {
    pub fn new(radio: R, mut reporter: P) -> Self {
        reporter.report(&DeviceMessage::Boot {
            board: board::BOARD_NAME,
            version: VERSION,
        });
        Self {
            registry: Registry::new(),
            history: History::new(),
            scanner: ScanController::new(radio),
            mode: ModeController::new(),
            input: InputRouter::new(),
            view: View::Main,
            animation: AlertAnimation::new(),
            main_dirty: true,
            reporter,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn scanner(&self) -> &ScanController<R> {
        &self.scanner
    }

    pub fn shields(&self) -> Shields {
        self.mode.shields()
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn reporter(&self) -> &P {
        &self.reporter
    }

    /// Classify one advertisement report. Returns `None` when the report
    /// was not counted: no scan running, already seen this scan, or a scan
    /// response that only supplies the name of a device already counted.
    pub fn on_advertisement(&mut self, now: u64, obs: &Observation) -> Option<Classification> {
        match self.scanner.accept(obs) {
            Intake::New => {}
            Intake::Named => {
                log::debug!("Scan response names {}: {}", obs.address, obs.name);
                self.registry.on_name(obs);
                return None;
            }
            Intake::Dropped => return None,
        }

        let class = self.registry.on_observation(obs, self.mode.shields());
        log::info!("Device found: {}", obs);
        if class.alert {
            log::info!("New alert device detected!");
            self.main_dirty = true;
        }

        let mac = obs.address.to_mac_string();
        self.reporter.report(&DeviceMessage::Device {
            mac: &mac,
            name: obs.name.as_str(),
            vendor: obs.vendor,
            rssi: obs.rssi,
            usable: class.usable,
            alert: class.alert,
            ts: timestamp(now),
        });
        Some(class)
    }

    /// Run one iteration of the main loop.
    pub fn tick<T, D>(&mut self, now: u64, touch: &mut T, display: &mut D)
    where
        T: TouchPanel,
        D: DrawTarget<Color = Rgb565>,
    {
        self.poll_touch(now, touch);

        if self
            .history
            .tick(now, self.registry.total_count(), self.registry.usable_count())
        {
            self.main_dirty = true;
        }

        if !self.scanner.is_running() && !self.mode.shields().is_up() && self.scanner.idle_elapsed(now) {
            self.start_scan(now);
        }

        if self.scanner.timed_out(now) {
            self.finish_scan(now);
        }

        if self.registry.alert_count() > 0 && self.animation.step(now) {
            self.main_dirty = true;
        }

        self.render(display);
    }

    /// Flip shields and report the transition.
    pub fn toggle_shields(&mut self, now: u64) {
        let transition = self.mode.toggle(now, &mut self.registry, &mut self.scanner);
        self.reporter.report(&DeviceMessage::Shields {
            up: self.mode.shields().is_up(),
            ts: timestamp(now),
        });
        match transition {
            Transition::Raised { scan_started: true } => self.report_scan(now, ScanPhase::Start),
            Transition::Lowered { preempted: true } => self.report_scan(now, ScanPhase::Aborted),
            _ => {}
        }
        self.main_dirty = true;
    }

    /// Show a list with a snapshot of its buffer.
    pub fn open_list(&mut self, kind: ListKind) {
        let lines = match kind {
            ListKind::All => self.registry.all_lines(),
            ListKind::Usable => self.registry.usable_lines(),
            ListKind::Alerts => self.registry.alert_lines(),
        };
        log::debug!("Opening {} ({} lines)", kind.title(), lines.line_count());
        self.view = View::List(ListView::new(kind, lines.as_str()));
    }

    /// Back to the main view; always repaints it.
    pub fn close_list(&mut self) {
        self.view = View::Main;
        self.main_dirty = true;
    }

    fn poll_touch<T: TouchPanel>(&mut self, now: u64, touch: &mut T) {
        let debounce = match self.view {
            View::Main => input::MAIN_DEBOUNCE_MS,
            View::List(_) => input::LIST_DEBOUNCE_MS,
        };
        let Some(p) = self.input.poll(now, touch, debounce) else {
            return;
        };

        let list_hit = match &self.view {
            View::Main => None,
            View::List(list) => Some(input::hit_list(p, list.max_scroll())),
        };
        match list_hit {
            None => match input::hit_main(p) {
                Some(MainHit::AllDevices) => self.open_list(ListKind::All),
                Some(MainHit::UsableDevices) => self.open_list(ListKind::Usable),
                Some(MainHit::Alerts) => self.open_list(ListKind::Alerts),
                Some(MainHit::ShieldsButton) => self.toggle_shields(now),
                None => {}
            },
            Some(ListHit::Exit) => self.close_list(),
            Some(ListHit::ScrollTo(pos)) => {
                if let View::List(list) = &mut self.view {
                    list.scroll_to(pos);
                }
            }
        }
    }

    fn start_scan(&mut self, now: u64) {
        if self.scanner.start(now, &mut self.registry) {
            self.report_scan(now, ScanPhase::Start);
            self.main_dirty = true;
        }
    }

    fn finish_scan(&mut self, now: u64) {
        self.scanner.stop();
        log::info!("BLE scan completed.");
        log::info!(
            "Total devices: {}, Usable devices: {}, Alert devices: {}",
            self.registry.total_count(),
            self.registry.usable_count(),
            self.registry.alert_count()
        );
        self.report_scan(now, ScanPhase::Complete);
        self.main_dirty = true;

        if self.mode.shields().is_up() {
            if self.registry.alert_count() > 0 {
                self.show_alerts();
            }
            self.start_scan(now);
        }
    }

    /// Open the alert list, or refresh it in place if already shown.
    fn show_alerts(&mut self) {
        let showing = matches!(&self.view, View::List(list) if list.kind() == ListKind::Alerts);
        if !showing {
            self.open_list(ListKind::Alerts);
        } else if let View::List(list) = &mut self.view {
            list.refresh(self.registry.alert_lines().as_str());
        }
    }

    fn report_scan(&mut self, now: u64, state: ScanPhase) {
        self.reporter.report(&DeviceMessage::Scan {
            state,
            total: self.registry.total_count(),
            usable: self.registry.usable_count(),
            alerts: self.registry.alert_count(),
            known: self.registry.known_count() as u32,
            ts: timestamp(now),
        });
    }

    fn render<D: DrawTarget<Color = Rgb565>>(&mut self, display: &mut D) {
        if let View::List(list) = &mut self.view {
            if list.draw(display).is_err() {
                log::warn!("display draw failed");
            }
            return;
        }
        if !self.main_dirty {
            return;
        }

        let model = MainModel {
            total: self.registry.total_count(),
            usable: self.registry.usable_count(),
            alerts: self.registry.alert_count(),
            shields: self.mode.shields(),
            scanning: self.scanner.is_running(),
            history: &self.history,
            animation: &self.animation,
        };
        match main_view::draw(display, &model) {
            Ok(()) => self.main_dirty = false,
            Err(_) => log::warn!("display draw failed"),
        }
    }
}
