//! darkroom panel firmware
//!
//! Rotary encoder + 16×2 character LCD front panel for the enlarger timer
//! on the Raspberry Pi Pico 2:
//!
//! 1. The encoder knob is turned or pressed.
//! 2. The encoder breakout pulls its INT line low.
//! 3. The encoder task reads the position and button, turns the readings
//!    into `PanelEvent`s and queues them.
//! 4. The session input task applies each event to the shared `Session`,
//!    which switches the relay together with the mode.
//! 5. The countdown task ticks an armed exposure every 100 ms and plays the
//!    completion tone at the end.
//! 6. The LCD task redraws changed rows every 100 ms.
//!
//! Build with `--features oled` for boards fitted with an SSD1306 OLED
//! instead of the character LCD.

#![no_std]
#![no_main]

use defmt::*;
use embassy_embedded_hal::shared_bus::asynch::i2c::I2cDevice;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::block::ImageDef;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_rp::pwm::Pwm;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;
#[cfg(not(feature = "oled"))]
use embassy_time::Delay;
use embassy_time::Instant;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use darkroom::session::{
    countdown_task, input_task, CountdownConfig, Direction, PanelEvent, RedrawSignal, RunSignal,
    Session, SharedSession,
};
use darkroom_hw_interface::{open_store, PwmBuzzer, Relay, Store};
use darkroom_lcd_display_rs::{panel_refresh_task, PanelConfig};
#[cfg(not(feature = "oled"))]
use darkroom_lcd_display_rs::{Hd44780, PCF8574_ADDRESS};
#[cfg(feature = "oled")]
use darkroom_lcd_display_rs::{OledCharGrid, SSD1306_ADDRESS};
use encoder_driver::{EncoderBoard, EncoderTracker, TrackerConfig, DEFAULT_ADDRESS};

// ---------------------------------------------------------------------------
// Boot block and interrupt binding
// ---------------------------------------------------------------------------

/// Tell the RP2350 Boot ROM about our application.
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = embassy_rp::block::ImageDef::secure_exe();

bind_interrupts!(struct Irqs {
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
});

// ---------------------------------------------------------------------------
// Static storage
// ---------------------------------------------------------------------------

/// Depth of the encoder → session event queue.
const EVENT_QUEUE: usize = 16;

/// Largest rotation taken from one reading. Anything bigger is a glitch
/// or a long stall and is clipped.
const MAX_STEPS_PER_READ: i32 = 24;

/// Shared I2C0 bus: the encoder breakout and the LCD backpack.
static I2C_BUS: StaticCell<
    Mutex<CriticalSectionRawMutex, I2c<'static, I2C0, i2c::Async>>,
> = StaticCell::new();

static SESSION: StaticCell<SharedSession<Relay, Store>> = StaticCell::new();

static EVENTS: Channel<CriticalSectionRawMutex, PanelEvent, EVENT_QUEUE> = Channel::new();
static RUNS: RunSignal = Signal::new();
static REDRAW: RedrawSignal = Signal::new();

// ---------------------------------------------------------------------------
// Type aliases
// ---------------------------------------------------------------------------

type BusI2c = I2cDevice<'static, CriticalSectionRawMutex, I2c<'static, I2C0, i2c::Async>>;

type PanelSession = SharedSession<Relay, Store>;

/// Character LCD behind a PCF8574 backpack (default build).
#[cfg(not(feature = "oled"))]
type PanelDisplay = Hd44780<BusI2c, Delay>;

/// SSD1306 OLED drawing the same 16×2 grid (`--features oled`).
#[cfg(feature = "oled")]
type PanelDisplay = OledCharGrid<BusI2c>;

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// Display refresh. A display that fails to come up halts the firmware.
#[embassy_executor::task]
async fn lcd_task(
    lcd: PanelDisplay,
    session: &'static PanelSession,
    config: PanelConfig,
) {
    if panel_refresh_task(lcd, session, config).await.is_err() {
        defmt::panic!("Panel display init failed");
    }
}

#[embassy_executor::task]
async fn session_input(
    events: Receiver<'static, CriticalSectionRawMutex, PanelEvent, EVENT_QUEUE>,
    session: &'static PanelSession,
) {
    input_task(events, session, &RUNS, &REDRAW).await;
}

#[embassy_executor::task]
async fn countdown(session: &'static PanelSession, buzzer: PwmBuzzer) {
    countdown_task(session, &RUNS, &REDRAW, buzzer).await;
}

/// Interrupt-driven encoder monitoring task.
///
/// Waits for INT to go low, reads position and button, then clears the
/// flags so INT returns high. The tracker turns each reading into detent
/// steps and at most one press, which are queued as `PanelEvent`s. No
/// session lock is taken here.
#[embassy_executor::task]
async fn encoder_task(
    mut int_pin: Input<'static>,
    mut board: EncoderBoard<BusI2c>,
    events: Sender<'static, CriticalSectionRawMutex, PanelEvent, EVENT_QUEUE>,
    config: TrackerConfig,
) {
    info!("Encoder monitor task started");

    let mut tracker = EncoderTracker::new(config);

    // Baseline, so the first interrupt does not report the absolute position.
    match read_encoder(&mut board).await {
        Some((position, down)) => {
            tracker.update(position, down, Instant::now().as_millis());
        }
        None => warn!("Could not read initial encoder state"),
    }

    loop {
        int_pin.wait_for_low().await;

        let reading = read_encoder(&mut board).await;

        // Clear after reading: drives INT back high even when the read failed.
        if board.clear_interrupt_flags().await.is_err() {
            warn!("Failed to clear interrupt flags");
        }

        let Some((position, down)) = reading else {
            error!("Encoder read failed");
            continue;
        };

        let motion = tracker.update(position, down, Instant::now().as_millis());
        if motion.is_idle() {
            continue;
        }
        debug!("Encoder motion: {}", motion);

        let steps = motion.steps.clamp(-MAX_STEPS_PER_READ, MAX_STEPS_PER_READ);
        let direction = if steps > 0 { Direction::Cw } else { Direction::Ccw };
        for _ in 0..steps.unsigned_abs() {
            events.send(PanelEvent::Rotate(direction)).await;
        }
        if motion.pressed {
            events.send(PanelEvent::Press).await;
        }
    }
}

async fn read_encoder(board: &mut EncoderBoard<BusI2c>) -> Option<(i32, bool)> {
    let position = board.read_position().await.ok()?;
    let down = board.read_button().await.ok()?;
    Some((position, down))
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());

    // Relay first: a reset mid-exposure must not leave the lamp on.
    let relay = Relay::new(Output::new(p.PIN_15, Level::Low));

    info!("darkroom panel firmware starting");

    // ── Session ─────────────────────────────────────────────────────────────

    let store = unwrap!(open_store(p.FLASH));
    let session: &'static PanelSession = SESSION.init(Mutex::new(Session::boot(
        relay,
        store,
        CountdownConfig::PANEL,
    )));

    // ── I2C peripherals ─────────────────────────────────────────────────────

    let i2c = I2c::new_async(
        p.I2C0,
        p.PIN_21, // SCL
        p.PIN_20, // SDA
        Irqs,
        i2c::Config::default(),
    );
    let i2c_bus = I2C_BUS.init(Mutex::new(i2c));

    let mut encoder_board = EncoderBoard::new(I2cDevice::new(i2c_bus), DEFAULT_ADDRESS);
    #[cfg(not(feature = "oled"))]
    let lcd = Hd44780::new(I2cDevice::new(i2c_bus), PCF8574_ADDRESS, Delay);
    #[cfg(feature = "oled")]
    let lcd = OledCharGrid::new(I2cDevice::new(i2c_bus), SSD1306_ADDRESS);

    let int_pin = Input::new(p.PIN_19, Pull::Up);

    // ── Encoder initialisation ──────────────────────────────────────────────

    // Without the button input and the interrupt the panel is dead, so
    // stop here rather than run a timer nobody can operate.
    if encoder_board.configure_button().await.is_err() {
        defmt::panic!("Failed to configure encoder button");
    }
    if encoder_board.enable_interrupt().await.is_err() {
        defmt::panic!("Failed to enable encoder interrupt");
    }
    if encoder_board.clear_interrupt_flags().await.is_err() {
        warn!("Failed to clear initial interrupt flags");
    }

    // ── Buzzer ──────────────────────────────────────────────────────────────

    let buzzer = PwmBuzzer::new(Pwm::new_output_a(
        p.PWM_SLICE0,
        p.PIN_16,
        Default::default(),
    ));

    // ── Spawn tasks ─────────────────────────────────────────────────────────

    spawner.spawn(unwrap!(lcd_task(lcd, session, PanelConfig::default())));
    spawner.spawn(unwrap!(session_input(EVENTS.receiver(), session)));
    spawner.spawn(unwrap!(countdown(session, buzzer)));
    spawner.spawn(unwrap!(encoder_task(
        int_pin,
        encoder_board,
        EVENTS.sender(),
        TrackerConfig::default(),
    )));

    info!("All tasks spawned");
}
