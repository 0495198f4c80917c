//! High-level API for the single-knob Seesaw rotary encoder breakout.

use embedded_hal_async::i2c::I2c;

use crate::driver::SeesawDriver;
use crate::error::EncoderError;
use crate::registers::*;

/// Driver for the Adafruit I2C QT Rotary Encoder.
///
/// Wraps the low-level Seesaw protocol and exposes the knob position, the
/// push-button level and the interrupt plumbing used to wake the firmware
/// on activity.
///
/// # Example
///
/// ```ignore
/// let mut board = EncoderBoard::new(i2c, DEFAULT_ADDRESS);
/// board.configure_button().await?;
/// board.enable_interrupt().await?;
///
/// let position = board.read_position().await?;
/// let pressed = board.read_button().await?;
/// ```
pub struct EncoderBoard<I2C> {
    driver: SeesawDriver<I2C>,
}

impl<I2C> EncoderBoard<I2C>
where
    I2C: I2c,
{
    /// Create a new driver instance.
    ///
    /// # Arguments
    ///
    /// * `i2c` - The I2C peripheral (or shared bus device)
    /// * `address` - 7-bit I2C address of the board (default: `0x36`)
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            driver: SeesawDriver::new(i2c, address),
        }
    }

    /// Read the absolute encoder position.
    pub async fn read_position(&mut self) -> Result<i32, EncoderError<I2C::Error>> {
        self.driver
            .read_i32(&[MODULE_ENCODER, ENCODER_POSITION])
            .await
    }

    /// Overwrite the encoder's position counter.
    pub async fn set_position(&mut self, value: i32) -> Result<(), EncoderError<I2C::Error>> {
        self.driver
            .write_u32(&[MODULE_ENCODER, ENCODER_POSITION], value as u32)
            .await
    }

    /// Read the push-button level. Returns `true` while the knob is held
    /// down (the pin reads low).
    pub async fn read_button(&mut self) -> Result<bool, EncoderError<I2C::Error>> {
        let levels = self.driver.read_u32(&[MODULE_GPIO, GPIO_BULK]).await?;
        Ok(levels & BUTTON_MASK == 0)
    }

    /// Configure the button pin as a pulled-up input that raises the
    /// interrupt line when it changes.
    pub async fn configure_button(&mut self) -> Result<(), EncoderError<I2C::Error>> {
        self.driver
            .write_u32(&[MODULE_GPIO, GPIO_DIRCLR_BULK], BUTTON_MASK)
            .await?;
        self.driver
            .write_u32(&[MODULE_GPIO, GPIO_PULLENSET], BUTTON_MASK)
            .await?;
        self.driver
            .write_u32(&[MODULE_GPIO, GPIO_BULK_SET], BUTTON_MASK)
            .await?;
        self.driver
            .write_u32(&[MODULE_GPIO, GPIO_INTENSET], BUTTON_MASK)
            .await
    }

    /// Enable the encoder-change interrupt.
    ///
    /// The board's INT pin is active-low and stays asserted until the
    /// position is read or the GPIO flags are cleared.
    pub async fn enable_interrupt(&mut self) -> Result<(), EncoderError<I2C::Error>> {
        self.driver
            .write_u8(&[MODULE_ENCODER, ENCODER_INT_SET], 0x01)
            .await
    }

    /// Clear pending GPIO interrupt flags by reading the flag register.
    pub async fn clear_interrupt_flags(&mut self) -> Result<(), EncoderError<I2C::Error>> {
        let _flags = self.driver.read_u32(&[MODULE_GPIO, GPIO_INTFLAG]).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use core::convert::Infallible;
    use std::vec;
    use std::vec::Vec;
    use embedded_hal_async::i2c::{ErrorType, Operation, SevenBitAddress};
    use futures::executor::block_on;

    /// Records every write; reads are never exercised here.
    #[derive(Default)]
    struct Recorder {
        writes: Vec<(u8, Vec<u8>)>,
    }

    impl ErrorType for Recorder {
        type Error = Infallible;
    }

    impl I2c<SevenBitAddress> for Recorder {
        async fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            for op in operations {
                if let Operation::Write(bytes) = op {
                    self.writes.push((address, bytes.to_vec()));
                }
            }
            Ok(())
        }
    }

    #[test]
    fn set_position_writes_big_endian_word() {
        let mut bus = Recorder::default();
        let mut board = EncoderBoard::new(&mut bus, DEFAULT_ADDRESS);
        block_on(board.set_position(-2)).unwrap();

        assert_eq!(
            bus.writes,
            vec![(0x36, vec![0x11, 0x30, 0xFF, 0xFF, 0xFF, 0xFE])]
        );
    }

    #[test]
    fn configure_button_sets_input_pullup_and_interrupt() {
        let mut bus = Recorder::default();
        let mut board = EncoderBoard::new(&mut bus, DEFAULT_ADDRESS);
        block_on(board.configure_button()).unwrap();

        let mask = [0x01, 0x00, 0x00, 0x00];
        let registers: Vec<u8> = bus.writes.iter().map(|(_, w)| w[1]).collect();
        assert_eq!(registers, vec![0x03, 0x0B, 0x05, 0x08]);
        for (address, write) in &bus.writes {
            assert_eq!(*address, 0x36);
            assert_eq!(write[0], MODULE_GPIO);
            assert_eq!(&write[2..], &mask);
        }
    }

    #[test]
    fn enable_interrupt_writes_single_byte() {
        let mut bus = Recorder::default();
        let mut board = EncoderBoard::new(&mut bus, 0x37);
        block_on(board.enable_interrupt()).unwrap();

        assert_eq!(bus.writes, vec![(0x37, vec![0x11, 0x10, 0x01])]);
    }
}
