//! Async driver for the Adafruit I2C QT Rotary Encoder.
//!
//! The breakout runs Seesaw firmware: one quadrature encoder plus a
//! push-button on Seesaw GPIO 24, with an active-low interrupt line that
//! fires on rotation or on a button change.
//!
//! [`EncoderBoard`] talks to the hardware. [`EncoderTracker`] turns the
//! absolute readings into relative detent steps and debounced presses.
//!
//! # Crate Features
//!
//! - **`defmt`**: `defmt::Format` implementations for the public types.

#![no_std]

mod driver;
pub mod encoder_board;
pub mod error;
pub mod registers;
pub mod tracker;

pub use encoder_board::EncoderBoard;
pub use error::EncoderError;
pub use registers::DEFAULT_ADDRESS;
pub use tracker::{EncoderMotion, EncoderTracker, TrackerConfig};
