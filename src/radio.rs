/// Glue between the monitor's [`Radio`] seam and the trouble-host scanner.
///
/// The monitor runs in the UI loop and cannot await the BLE host, so radio
/// commands travel over a small channel to the future that owns the
/// `Scanner`. Advertisement reports come back the other way: the runner's
/// event handler parses them and queues them for the UI loop to drain.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::Duration;
use trouble_host::prelude::*;

use blemonitor::error::Error;
use blemonitor::oui::MacAddress;
use blemonitor::scanner::{AdvParser, Observation, Radio, ScanParams};

/// Requests for the scan-session owner.
#[derive(Debug, Clone, Copy)]
pub enum RadioCommand {
    Configure(ScanParams),
    Start,
    Stop,
}

type CommandChannel = Channel<CriticalSectionRawMutex, RadioCommand, 4>;
type ObservationChannel = Channel<CriticalSectionRawMutex, Observation, 32>;

/// Radio commands from the monitor
pub static RADIO_COMMANDS: CommandChannel = Channel::new();

/// Parsed advertisement reports, drained before every tick
pub static OBSERVATIONS: ObservationChannel = Channel::new();

/// [`Radio`] that forwards to the scan-session owner without blocking.
pub struct ChannelRadio;

impl ChannelRadio {
    fn send(cmd: RadioCommand) -> Result<(), Error> {
        RADIO_COMMANDS.try_send(cmd).map_err(|_| Error::RadioBusy)
    }
}

impl Radio for ChannelRadio {
    fn configure(&mut self, params: &ScanParams) -> Result<(), Error> {
        Self::send(RadioCommand::Configure(*params))
    }

    fn start(&mut self) -> Result<(), Error> {
        Self::send(RadioCommand::Start)
    }

    fn stop(&mut self) -> Result<(), Error> {
        Self::send(RadioCommand::Stop)
    }
}

/// Copy scan parameters into a trouble-host scan config. Interval and
/// window are passed through as milliseconds.
pub fn apply_params(config: &mut ScanConfig<'_>, params: &ScanParams) {
    config.active = params.active;
    config.interval = Duration::from_millis(u64::from(params.interval));
    config.window = Duration::from_millis(u64::from(params.window));
}

/// EventHandler for BLE advertisement reports from trouble-host.
///
/// Called synchronously from the runner; must not block. Reports that do
/// not fit in the queue are dropped. Scan responses are queued like any
/// other report; the monitor folds their names into the earlier advert.
pub struct ScanEventHandler;

impl EventHandler for ScanEventHandler {
    fn on_adv_reports(&self, mut it: LeAdvReportsIter<'_>) {
        while let Some(Ok(report)) = it.next() {
            let Ok(raw) = <[u8; 6]>::try_from(report.addr.raw()) else {
                continue;
            };
            let obs = AdvParser::parse(MacAddress::from_le_bytes(raw), report.rssi, report.data);
            if OBSERVATIONS.try_send(obs).is_err() {
                log::trace!("observation queue full, report dropped");
            }
        }
    }
}
