#![cfg_attr(not(test), no_std)]

//! [Si5351](https://www.silabs.com/timing/clocks/si5351) clock generator driver.
//!
//! Output frequencies are planned exactly: the multisynth divider is chosen for
//! a VCO near 800 MHz and the PLL fraction makes up for what the 20 bit
//! multisynth fraction can't express.
//!
//! ```no_run
//! # use si5351::{config::Config, device::*, register::Pll, transport::I2cTransport};
//! # fn demo<I2C, E>(i2c: I2C) -> Result<(), si5351::errors::Error<E>>
//! # where I2C: embedded_hal::blocking::i2c::Write<Error = E> + embedded_hal::blocking::i2c::WriteRead<Error = E>
//! # {
//! let mut clock = Si5351::new(I2cTransport::new(i2c), Config::default())?;
//! clock.init()?;
//! clock.set_frequency(Channel::Clk0, Pll::A, 14_175_000)?;
//! # Ok(())
//! # }
//! ```

pub mod constants;
pub mod errors;
pub mod fraction;
pub mod register;
pub mod config;
pub mod frequency;
pub mod transport;
pub mod device;
