//! Seesaw register address constants for the Adafruit I2C QT Rotary Encoder.
//!
//! The Seesaw firmware uses a two-byte register addressing scheme:
//! - Byte 1: Module ID
//! - Byte 2: Register offset within the module
//!
//! GPIO bulk registers take a 32-bit big-endian pin mask.

// ---------------------------------------------------------------------------
// Module IDs
// ---------------------------------------------------------------------------

/// Seesaw GPIO module identifier.
pub const MODULE_GPIO: u8 = 0x01;

/// Seesaw encoder module identifier.
pub const MODULE_ENCODER: u8 = 0x11;

// ---------------------------------------------------------------------------
// GPIO module registers
// ---------------------------------------------------------------------------

/// Configure the pins in the mask as inputs.
pub const GPIO_DIRCLR_BULK: u8 = 0x03;

/// Read the level of every pin (32-bit).
pub const GPIO_BULK: u8 = 0x04;

/// Drive the pins in the mask high (selects pull-up when pull is enabled).
pub const GPIO_BULK_SET: u8 = 0x05;

/// Enable pin-change interrupts for the pins in the mask.
pub const GPIO_INTENSET: u8 = 0x08;

/// Interrupt flag register (32-bit, read-only).
/// Reading this register clears all GPIO interrupt flags.
pub const GPIO_INTFLAG: u8 = 0x0A;

/// Enable the pull resistor on the pins in the mask.
pub const GPIO_PULLENSET: u8 = 0x0B;

// ---------------------------------------------------------------------------
// Encoder module registers
// ---------------------------------------------------------------------------

/// Enable the encoder-change interrupt.
pub const ENCODER_INT_SET: u8 = 0x10;

/// Absolute encoder position (32-bit signed).
pub const ENCODER_POSITION: u8 = 0x30;

// ---------------------------------------------------------------------------
// Board constants
// ---------------------------------------------------------------------------

/// Required delay in microseconds between I2C write and read operations
/// required by the Seesaw firmware.
pub const SEESAW_DELAY_US: u64 = 125;

/// Default I2C address of the rotary encoder breakout.
pub const DEFAULT_ADDRESS: u8 = 0x36;

/// Seesaw GPIO pin wired to the encoder push-button (active-low).
pub const BUTTON_PIN: u8 = 24;

/// Bulk mask selecting [`BUTTON_PIN`].
pub const BUTTON_MASK: u32 = 1 << BUTTON_PIN;
