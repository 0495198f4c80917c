//! darkroom touch firmware
//!
//! Serial touch panel front end for the enlarger timer on the Raspberry Pi
//! Pico 2. The panel is wired to UART0 at 9600 baud:
//!
//! 1. A button on the panel is released; the panel sends a touch frame.
//! 2. The touch receive task parses it and queues a `TouchEvent`.
//! 3. The session input task applies the event to the shared `Session`.
//! 4. The countdown task ticks an armed exposure once per second.
//! 5. The touch display task wakes on every change and sends only the
//!    setters whose values moved.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::block::ImageDef;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::UART0;
use embassy_rp::pwm::Pwm;
use embassy_rp::uart::{self, BufferedInterruptHandler, BufferedUart, BufferedUartRx, BufferedUartTx};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::{with_timeout, Duration};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use darkroom::session::{
    countdown_task, input_task, CountdownConfig, RedrawSignal, RunSignal, Session, SharedSession,
    TouchEvent,
};
use darkroom_hw_interface::{open_store, PwmBuzzer, Relay, Store};
use darkroom_touch_panel_rs::{touch_display_task, touch_rx_task, TouchPanel, TouchRx, TouchTx};

// ---------------------------------------------------------------------------
// Boot block and interrupt binding
// ---------------------------------------------------------------------------

/// Tell the RP2350 Boot ROM about our application.
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = embassy_rp::block::ImageDef::secure_exe();

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// ---------------------------------------------------------------------------
// Static storage
// ---------------------------------------------------------------------------

const BAUD_RATE: u32 = 9600;

/// Depth of the touch → session event queue.
const EVENT_QUEUE: usize = 8;

/// How long to wait for the panel to answer a boot-time readback.
const READBACK_TIMEOUT: Duration = Duration::from_millis(500);

static TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 64]> = StaticCell::new();

static SESSION: StaticCell<SharedSession<Relay, Store>> = StaticCell::new();

static EVENTS: Channel<CriticalSectionRawMutex, TouchEvent, EVENT_QUEUE> = Channel::new();
static RUNS: RunSignal = Signal::new();
static REDRAW: RedrawSignal = Signal::new();

// ---------------------------------------------------------------------------
// Type aliases
// ---------------------------------------------------------------------------

type TouchSession = SharedSession<Relay, Store>;

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[embassy_executor::task]
async fn touch_rx(
    rx: TouchRx<BufferedUartRx>,
    events: Sender<'static, CriticalSectionRawMutex, TouchEvent, EVENT_QUEUE>,
) {
    touch_rx_task(rx, events).await;
}

#[embassy_executor::task]
async fn touch_display(tx: TouchTx<BufferedUartTx>, session: &'static TouchSession) {
    touch_display_task(tx, session, &REDRAW).await;
}

#[embassy_executor::task]
async fn session_input(
    events: Receiver<'static, CriticalSectionRawMutex, TouchEvent, EVENT_QUEUE>,
    session: &'static TouchSession,
) {
    input_task(events, session, &RUNS, &REDRAW).await;
}

#[embassy_executor::task]
async fn countdown(session: &'static TouchSession, buzzer: PwmBuzzer) {
    countdown_task(session, &RUNS, &REDRAW, buzzer).await;
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());

    // Relay first: a reset mid-exposure must not leave the lamp on.
    let relay = Relay::new(Output::new(p.PIN_15, Level::Low));

    info!("darkroom touch firmware starting");

    // ── Session ─────────────────────────────────────────────────────────────

    let store = unwrap!(open_store(p.FLASH));
    let session: &'static TouchSession = SESSION.init(Mutex::new(Session::boot(
        relay,
        store,
        CountdownConfig::TOUCH,
    )));

    // ── Touch panel ─────────────────────────────────────────────────────────

    let mut config = uart::Config::default();
    config.baudrate = BAUD_RATE;
    let uart = BufferedUart::new(
        p.UART0,
        p.PIN_0, // TX
        p.PIN_1, // RX
        Irqs,
        TX_BUF.init([0; 64]),
        RX_BUF.init([0; 64]),
        config,
    );
    let (uart_tx, uart_rx) = uart.split();
    let mut panel = TouchPanel::new(uart_rx, uart_tx);

    // Readback of two panel settings; only logged. A panel that does not
    // answer in time is still driven.
    match with_timeout(READBACK_TIMEOUT, panel.get_value("dim")).await {
        Ok(Ok(dim)) => info!("Panel backlight: {}%", dim),
        Ok(Err(e)) => warn!("Backlight readback failed: {}", e),
        Err(_) => warn!("Panel did not answer backlight readback"),
    }
    match with_timeout(READBACK_TIMEOUT, panel.get_text("t0.txt")).await {
        Ok(Ok(title)) => info!("Panel title: {=str}", title.as_str()),
        Ok(Err(e)) => warn!("Title readback failed: {}", e),
        Err(_) => warn!("Panel did not answer title readback"),
    }

    let (rx, tx) = panel.split();

    // ── Buzzer ──────────────────────────────────────────────────────────────

    let buzzer = PwmBuzzer::new(Pwm::new_output_a(
        p.PWM_SLICE0,
        p.PIN_16,
        Default::default(),
    ));

    // ── Spawn tasks ─────────────────────────────────────────────────────────

    spawner.spawn(unwrap!(touch_rx(rx, EVENTS.sender())));
    spawner.spawn(unwrap!(touch_display(tx, session)));
    spawner.spawn(unwrap!(session_input(EVENTS.receiver(), session)));
    spawner.spawn(unwrap!(countdown(session, buzzer)));

    info!("All tasks spawned");
}
