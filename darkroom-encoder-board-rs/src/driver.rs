//! Low-level Seesaw protocol driver.
//!
//! Implements the I2C communication primitives required by the Seesaw firmware,
//! including the mandatory 125µs delay between write and read phases.
//!
//! This module is crate-private. Consumers interact with [`EncoderBoard`]
//! instead.
//!
//! [`EncoderBoard`]: crate::EncoderBoard

use embassy_time::{Duration, Timer};
use embedded_hal_async::i2c::I2c;

use crate::error::EncoderError;
use crate::registers::SEESAW_DELAY_US;

/// Low-level Seesaw protocol driver.
///
/// Owns an I2C peripheral and provides read/write primitives that respect
/// the Seesaw timing requirements.
pub(crate) struct SeesawDriver<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> SeesawDriver<I2C>
where
    I2C: I2c,
{
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Write a register address, wait the required delay, then read the response.
    ///
    /// Uses separate `write()` and `read()` operations rather than `write_read()`
    /// because a repeated start leaves the Seesaw firmware no time to prepare
    /// the response.
    async fn write_then_read(
        &mut self,
        register: &[u8; 2],
        buffer: &mut [u8],
    ) -> Result<(), EncoderError<I2C::Error>> {
        self.i2c.write(self.address, register).await?;
        Timer::after(Duration::from_micros(SEESAW_DELAY_US)).await;
        self.i2c.read(self.address, buffer).await?;
        Ok(())
    }

    /// Read a big-endian 32-bit word.
    pub async fn read_u32(
        &mut self,
        register: &[u8; 2],
    ) -> Result<u32, EncoderError<I2C::Error>> {
        let mut buf = [0u8; 4];
        self.write_then_read(register, &mut buf).await?;
        Ok(u32::from_be_bytes(buf))
    }

    /// Read a big-endian 32-bit signed integer.
    pub async fn read_i32(
        &mut self,
        register: &[u8; 2],
    ) -> Result<i32, EncoderError<I2C::Error>> {
        Ok(self.read_u32(register).await? as i32)
    }

    /// Write a big-endian 32-bit word in one transaction with its register.
    pub async fn write_u32(
        &mut self,
        register: &[u8; 2],
        value: u32,
    ) -> Result<(), EncoderError<I2C::Error>> {
        // [register_hi, register_lo, b3, b2, b1, b0]
        let mut buf = [0u8; 6];
        buf[0..2].copy_from_slice(register);
        buf[2..6].copy_from_slice(&value.to_be_bytes());
        self.i2c.write(self.address, &buf).await?;
        Ok(())
    }

    /// Write a single byte to a register.
    pub async fn write_u8(
        &mut self,
        register: &[u8; 2],
        value: u8,
    ) -> Result<(), EncoderError<I2C::Error>> {
        let buf = [register[0], register[1], value];
        self.i2c.write(self.address, &buf).await?;
        Ok(())
    }
}
