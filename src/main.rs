//! BLE Monitor: handheld proximity monitor firmware
//!
//! Scans for BLE advertisers in short windows, classifies each device
//! against everything seen since boot, and raises an on-screen alert when
//! an unfamiliar device comes close while shields are up.
//!
//! Three futures share one executor: the BLE host runner, the scan-session
//! owner that turns monitor commands into trouble-host scans, and the UI
//! loop that drains advertisement reports and ticks the monitor.

#![no_std]
#![no_main]

extern crate alloc;

use esp_backtrace as _;

esp_bootloader_esp_idf::esp_app_desc!();

// Hardware-specific modules (binary crate only)
mod display;
mod radio;
mod touch;

// Re-export library modules so binary submodules can use crate::*
pub(crate) use blemonitor::{board, monitor, protocol};

use embassy_time::{Duration, Instant, Ticker, Timer};
use embedded_hal_bus::spi::ExclusiveDevice;
use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::interrupt::software::SoftwareInterruptControl;
use esp_hal::spi::master::{Config as SpiConfig, Spi};
use esp_hal::spi::Mode;
use esp_hal::time::Rate;
use esp_hal::timer::timg::TimerGroup;
use static_cell::StaticCell;

use trouble_host::prelude::*;

use monitor::{Monitor, TICK_MS};
use protocol::{SerialReporter, VERSION};
use radio::{ChannelRadio, RadioCommand, ScanEventHandler, OBSERVATIONS, RADIO_COMMANDS};

// ── Entry point ──────────────────────────────────────────────────────

#[esp_rtos::main]
async fn main(_spawner: embassy_executor::Spawner) {
    esp_println::logger::init_logger_from_env();

    let peripherals = esp_hal::init(esp_hal::Config::default());

    // Heap for the BLE stack plus the registry's sets and line buffers
    esp_alloc::heap_allocator!(size: 72 * 1024);

    // Start the RTOS (needs a timer and a software interrupt)
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let sw_int = SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    esp_rtos::start(timg0.timer0, sw_int.software_interrupt0);

    log::info!("BLE Monitor v{} starting on {}", VERSION, board::BOARD_NAME);

    // ── Display (HSPI) ─────────────────────────────────────────────────

    let _backlight = Output::new(peripherals.GPIO21, Level::High, OutputConfig::default());
    let mut screen = display::init(
        peripherals.SPI2,
        peripherals.GPIO14,
        peripherals.GPIO13,
        peripherals.GPIO12,
        peripherals.GPIO15,
        peripherals.GPIO2,
    );

    // ── Touch (VSPI) ───────────────────────────────────────────────────

    let touch_config = SpiConfig::default()
        .with_frequency(Rate::from_mhz(board::TOUCH_SPI_FREQ_MHZ))
        .with_mode(Mode::_0);
    let touch_spi = Spi::new(peripherals.SPI3, touch_config)
        .expect("touch SPI init failed")
        .with_sck(peripherals.GPIO25)
        .with_mosi(peripherals.GPIO32)
        .with_miso(peripherals.GPIO39);
    let touch_cs = Output::new(peripherals.GPIO33, Level::High, OutputConfig::default());
    let mut panel = touch::Xpt2046::new(
        ExclusiveDevice::new_no_delay(touch_spi, touch_cs).expect("touch CS init failed"),
    );

    log::info!("Touch controller initialized");

    // ── BLE radio initialization ───────────────────────────────────────

    let connector =
        esp_radio::ble::controller::BleConnector::new(peripherals.BT, Default::default())
            .expect("BLE connector init failed");

    let controller: ExternalController<_, 20> = ExternalController::new(connector);

    static HOST_RESOURCES: StaticCell<HostResources<DefaultPacketPool, 1, 1>> = StaticCell::new();
    let resources = HOST_RESOURCES.init(HostResources::new());

    let address = Address::random([0xff, 0x8f, 0x1a, 0x05, 0xe4, 0xac]);

    let stack = trouble_host::new(controller, resources).set_random_address(address);
    let Host {
        central,
        mut runner,
        ..
    } = stack.build();

    log::info!("BLE radio initialized");

    let scan_handler = ScanEventHandler;

    // Queues the initial Configure before the session owner starts
    let mut monitor = Monitor::new(ChannelRadio, SerialReporter);

    // ── Orchestration ──────────────────────────────────────────────────
    //
    // Three concurrent futures via join3:
    //   1. BLE stack runner (drives HCI, delivers scan reports to handler)
    //   2. Scan-session owner (one trouble-host session per Start..Stop)
    //   3. UI loop (drain reports, tick the monitor)

    let _ = embassy_futures::join::join3(
        // ── Runner: drives the BLE stack ────────────────────────────────
        async {
            loop {
                if let Err(e) = runner.run_with_handler(&scan_handler).await {
                    log::error!("BLE runner error: {:?}", e);
                    Timer::after(Duration::from_secs(1)).await;
                }
            }
        },
        // ── Scanner: one session per Start..Stop ───────────────────────
        async {
            let mut scanner = trouble_host::scan::Scanner::new(central);
            let mut config = ScanConfig::default();
            let commands = RADIO_COMMANDS.receiver();

            loop {
                match commands.receive().await {
                    RadioCommand::Configure(params) => radio::apply_params(&mut config, &params),
                    RadioCommand::Stop => {}
                    RadioCommand::Start => {
                        // New parameters take effect on the next session
                        let mut pending = None;
                        match scanner.scan(&config).await {
                            // Reports flow through ScanEventHandler while the
                            // session is alive; dropping it stops the scan.
                            Ok(_session) => loop {
                                match commands.receive().await {
                                    RadioCommand::Stop => break,
                                    RadioCommand::Start => {}
                                    RadioCommand::Configure(params) => pending = Some(params),
                                }
                            },
                            Err(e) => log::error!("BLE scan failed to start: {:?}", e),
                        }
                        if let Some(params) = pending {
                            radio::apply_params(&mut config, &params);
                        }
                    }
                }
            }
        },
        // ── UI loop ─────────────────────────────────────────────────────
        async {
            let reports = OBSERVATIONS.receiver();
            let mut ticker = Ticker::every(Duration::from_millis(TICK_MS));

            loop {
                let now = Instant::now().as_millis();
                while let Ok(obs) = reports.try_receive() {
                    monitor.on_advertisement(now, &obs);
                }
                monitor.tick(now, &mut panel, &mut screen);
                ticker.next().await;
            }
        },
    )
    .await;
}
