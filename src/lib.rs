#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

//! Blocking `embedded-hal` driver for the Sensirion SGP30 gas sensor.
//!
//! ```
//! use embedded_hal::{delay::DelayNs, i2c::I2c};
//! use erust_sgp30::{Error, Sgp30};
//!
//! fn poll<I2C: I2c, D: DelayNs>(i2c: I2C, delay: D) -> Result<(), Error<I2C::Error>> {
//!     let mut sgp = Sgp30::new(i2c, delay)?;
//!
//!     let m = sgp.measure()?;
//!     println!("CO2eq {} ppm, TVOC {} ppb", m.co2eq_ppm, m.tvoc_ppb);
//!
//!     let baseline = sgp.get_baseline()?;
//!     sgp.set_baseline(baseline.co2eq, baseline.tvoc)?;
//!     Ok(())
//! }
//! ```

pub mod commands;
mod sensirion;
pub mod sgp30;

pub use sensirion::{Command, Error, crc8};
pub use sgp30::{Baseline, DEFAULT_ADDRESS, FEATURE_SET, Measurement, SerialNumber, Sgp30};
