//! Board glue shared by the `panel` and `touch` firmware binaries.
//!
//! Both binaries run the same session on the same Raspberry Pi Pico 2
//! carrier board and differ only in their front panel:
//!
//! | Signal    | Pin   | Notes                                       |
//! |-----------|-------|---------------------------------------------|
//! | RELAY     | GP15  | enlarger lamp relay, active-high            |
//! | BUZZER    | GP16  | PWM slice 0 channel A                       |
//! | I2C_SDA   | GP20  | `panel`: encoder breakout and LCD backpack  |
//! | I2C_SCL   | GP21  | `panel`                                     |
//! | ENC_INT   | GP19  | `panel`: active-low, pull-up enabled        |
//! | UART_TX   | GP0   | `touch`: to the panel's RX                  |
//! | UART_RX   | GP1   | `touch`: from the panel's TX                |

#![no_std]

use darkroom::session::{Actuator, CompletionTone, FlashStore, StoreError};
use embassy_rp::clocks::clk_sys_freq;
use embassy_rp::flash::{self, Blocking, Flash};
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::FLASH;
use embassy_rp::pwm::{self, Pwm};
use embassy_rp::Peri;
use embassy_time::Timer;

// ---------------------------------------------------------------------------
// Persisted settings
// ---------------------------------------------------------------------------

/// On-board QSPI flash of the Pico 2.
pub const FLASH_SIZE: usize = 4 * 1024 * 1024;

/// Last erase sector, kept out of the program image by `memory.x`.
pub const STORE_OFFSET: u32 = (FLASH_SIZE - flash::ERASE_SIZE) as u32;

pub type BoardFlash = Flash<'static, FLASH, Blocking, FLASH_SIZE>;

/// Store backing the session's persisted exposure time.
pub type Store = FlashStore<BoardFlash>;

/// Open the settings sector.
pub fn open_store(
    flash: Peri<'static, FLASH>,
) -> Result<Store, StoreError<flash::Error>> {
    FlashStore::new(Flash::new_blocking(flash), STORE_OFFSET)
}

// ---------------------------------------------------------------------------
// Relay
// ---------------------------------------------------------------------------

/// Enlarger lamp relay on a push-pull GPIO.
pub struct Relay(Output<'static>);

impl Relay {
    /// Take ownership of the relay pin. Create the `Output` with
    /// `Level::Low` so the lamp stays dark through boot.
    pub fn new(pin: Output<'static>) -> Self {
        Self(pin)
    }
}

impl Actuator for Relay {
    fn set_level(&mut self, on: bool) {
        self.0.set_level(if on { Level::High } else { Level::Low });
    }
}

// ---------------------------------------------------------------------------
// Completion tone
// ---------------------------------------------------------------------------

/// Length of one beat of [`SCORE`].
const BEAT_MS: u64 = 143;

/// Silence at the end of every note so repeated pitches stay distinct.
const NOTE_GAP_MS: u64 = 12;

/// PWM clock divider. 150 MHz / 64 keeps `top` within 16 bits down to 36 Hz.
const PWM_DIVIDER: u8 = 64;

/// Completion melody as (frequency in Hz, length in beats).
pub const SCORE: [(u32, u8); 27] = [
    (165, 1), (440, 1), (277, 1), (330, 1), (880, 1), (554, 1), (659, 3), (554, 3),
    (175, 1), (440, 1), (262, 1), (349, 1), (880, 1), (523, 1), (698, 3), (523, 3),
    (147, 1), (494, 1), (294, 1), (392, 1), (988, 1), (587, 1), (784, 3),
    (784, 1), (784, 1), (784, 1), (1760, 6),
];

/// Piezo buzzer driven by one PWM channel at 50% duty.
pub struct PwmBuzzer {
    pwm: Pwm<'static>,
    config: pwm::Config,
    /// PWM counter rate after the divider.
    counter_hz: u32,
}

impl PwmBuzzer {
    /// Wrap a PWM output created with channel A on the buzzer pin. The
    /// output starts silent.
    pub fn new(pwm: Pwm<'static>) -> Self {
        let mut config = pwm::Config::default();
        config.divider = PWM_DIVIDER.into();
        config.compare_a = 0;

        let mut buzzer = Self {
            pwm,
            config,
            counter_hz: clk_sys_freq() / PWM_DIVIDER as u32,
        };
        buzzer.pwm.set_config(&buzzer.config);
        buzzer
    }

    /// Start a square wave at `hz`.
    fn tone(&mut self, hz: u32) {
        let top = (self.counter_hz / hz.max(1)).saturating_sub(1).min(u16::MAX as u32) as u16;
        self.config.top = top;
        self.config.compare_a = (top / 2).saturating_add(1);
        self.pwm.set_config(&self.config);
    }
}

impl CompletionTone for PwmBuzzer {
    async fn play(&mut self) {
        for &(hz, beats) in SCORE.iter() {
            self.tone(hz);
            Timer::after_millis(beats as u64 * BEAT_MS - NOTE_GAP_MS).await;
            self.silence();
            Timer::after_millis(NOTE_GAP_MS).await;
        }
    }

    fn silence(&mut self) {
        self.config.compare_a = 0;
        self.pwm.set_config(&self.config);
    }
}
