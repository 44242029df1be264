use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{I2c, SevenBitAddress};
use log::{info, warn};

use crate::commands;
use crate::sensirion::{Error, Sensor};

pub const DEFAULT_ADDRESS: SevenBitAddress = 0x58;

/// Feature set reported by every supported SGP30.
pub const FEATURE_SET: u16 = 0x0020;

/// 48-bit chip serial number, as three words in the order the sensor sends them.
#[derive(Clone, Copy, Hash, Debug, PartialEq, Eq)]
pub struct SerialNumber([u16; 3]);

impl SerialNumber {
    pub fn words(&self) -> [u16; 3] {
        self.0
    }

    pub fn as_u64(&self) -> u64 {
        (self.0[0] as u64) << 32 | (self.0[1] as u64) << 16 | (self.0[2] as u64)
    }
}

#[derive(Clone, Copy, Hash, Debug, PartialEq, Eq)]
pub struct Measurement {
    pub co2eq_ppm: u16,
    pub tvoc_ppb: u16,
}

/// IAQ algorithm calibration state.
///
/// Persist it periodically and restore it with [`Sgp30::set_baseline`] after a
/// power cycle.
#[derive(Clone, Copy, Hash, Debug, PartialEq, Eq)]
pub struct Baseline {
    pub co2eq: u16,
    pub tvoc: u16,
}

#[derive(Debug)]
pub struct Sgp30<I2C, D> {
    sensor: Sensor<I2C, D>,
    serial: SerialNumber,
}

impl<I2C: I2c, D: DelayNs> Sgp30<I2C, D> {
    /// Connects to a sensor at [`DEFAULT_ADDRESS`].
    pub fn new(i2c: I2C, delay: D) -> Result<Self, Error<I2C::Error>> {
        Self::with_address(i2c, delay, DEFAULT_ADDRESS)
    }

    /// Reads the serial number, checks the feature set and starts the IAQ
    /// algorithm. The sensor is not usable if any of these steps fails.
    pub fn with_address(
        i2c: I2C,
        delay: D,
        address: SevenBitAddress,
    ) -> Result<Self, Error<I2C::Error>> {
        if address > 0x7f {
            return Err(Error::InvalidAddress(address));
        }

        let mut sensor = Sensor::new(i2c, delay, address);

        let serial = SerialNumber(sensor.read_words(&commands::GET_SERIAL_ID)?);

        let [feature_set] = sensor.read_words(&commands::GET_FEATURE_SET)?;
        if feature_set != FEATURE_SET {
            warn!(
                "SGP30 not detected at {:#04x}: feature set {:#06x}",
                address, feature_set
            );
            return Err(Error::UnsupportedFeatureSet(feature_set));
        }

        sensor.send(&commands::IAQ_INIT, &[])?;

        info!(
            "SGP30 at {:#04x} initialized, serial {:#014x}",
            address,
            serial.as_u64()
        );

        Ok(Self { sensor, serial })
    }

    pub fn serial_number(&self) -> SerialNumber {
        self.serial
    }

    pub fn address(&self) -> SevenBitAddress {
        self.sensor.address()
    }

    /// Restarts the IAQ algorithm, discarding its current baseline.
    pub fn iaq_init(&mut self) -> Result<(), Error<I2C::Error>> {
        self.sensor.send(&commands::IAQ_INIT, &[])
    }

    /// Reads CO2eq (ppm) and TVOC (ppb).
    /// The IAQ algorithm expects this to be called once per second.
    pub fn measure(&mut self) -> Result<Measurement, Error<I2C::Error>> {
        let [co2eq_ppm, tvoc_ppb] = self.sensor.read_words(&commands::MEASURE_IAQ)?;
        Ok(Measurement {
            co2eq_ppm,
            tvoc_ppb,
        })
    }

    pub fn get_baseline(&mut self) -> Result<Baseline, Error<I2C::Error>> {
        let [co2eq, tvoc] = self.sensor.read_words(&commands::GET_IAQ_BASELINE)?;
        Ok(Baseline { co2eq, tvoc })
    }

    /// Restores a baseline previously read with [`Sgp30::get_baseline`].
    pub fn set_baseline(&mut self, co2eq: u16, tvoc: u16) -> Result<(), Error<I2C::Error>> {
        if co2eq == 0 && tvoc == 0 {
            return Err(Error::InvalidBaseline);
        }

        self.sensor
            .send(&commands::SET_IAQ_BASELINE, &[tvoc, co2eq])
    }

    /// Gives back the bus and the delay provider.
    pub fn release(self) -> (I2C, D) {
        self.sensor.release()
    }
}
