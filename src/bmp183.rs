use std::convert::TryFrom;
use std::time::Duration;

use hal::blocking::delay::DelayUs;
#[cfg(target_os = "linux")]
use linux_embedded_hal::Delay;

use bus::{Session, Transport};
use calibration::*;
use error::Error;
use registers::*;
use utils::*;

/// UT assumed until a temperature conversion has been read successfully.
pub const DEFAULT_UT: i32 = 26400;

#[derive(Clone, Copy, Debug)]
pub struct Config {
    pub oversampling: Oversampling,
    /// Pressure conversions averaged into one UP.
    pub pressure_samples: usize,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            oversampling: Oversampling::UltraHighResolution,
            pressure_samples: 3,
        }
    }
}

/// Last compensated values.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Reading {
    /// °C
    pub temperature: f32,
    /// Pa
    pub pressure: i32,
}

/// BMP183 on an SPI transport.
///
/// Each register access runs in its own bus session, so the bus is not
/// held while the sensor converts. Failed transactions keep the last good
/// values; only a pressure cycle without a single valid sample is an error.
///
/// Construction loads the calibration and takes a first reading, so the
/// accessors hold real values from the start.
pub struct Bmp183<T: Transport, D: DelayUs<u32>> {
    pub bus: T,
    pub delay: D,
    config: Config,
    pub params: CalibrationSet,
    identity: DeviceIdentity,
    ut: Option<i32>,
    b5: Option<i64>,
    reading: Reading,
}

#[cfg(target_os = "linux")]
impl<T: Transport> Bmp183<T, Delay> {
    pub fn new(bus: T, config: Config) -> Result<Bmp183<T, Delay>, Error> {
        Bmp183::with_delay(bus, Delay, config)
    }
}

impl<T: Transport, D: DelayUs<u32>> Bmp183<T, D> {
    pub fn with_delay(bus: T, delay: D, config: Config) -> Result<Bmp183<T, D>, Error> {
        let mut bmp183 = Bmp183 {
            bus: bus,
            delay: delay,
            config: config,
            params: CalibrationSet::default(),
            identity: DeviceIdentity::default(),
            ut: None,
            b5: None,
            reading: Reading::default(),
        };
        bmp183.initialize()?;
        if let Err(e) = bmp183.measure_pressure() {
            warn!("initial measurement failed: {}", e);
        }
        Ok(bmp183)
    }

    /// Checks the chip id and (re)loads the calibration coefficients.
    ///
    /// A wrong chip id is only logged. A failed calibration read is
    /// returned, since compensation with a broken coefficient yields
    /// meaningless values.
    pub fn initialize(&mut self) -> Result<(), Error> {
        self.identity = DeviceIdentity::load(&mut self.bus);
        match self.identity.verify() {
            Ok(()) => info!(
                "BMP183 found, chip id {:#04x}, version {:#04x}",
                self.identity.chip_id, self.identity.version
            ),
            Err(e) => warn!("{}; communication failed, expect problems", e),
        }
        self.params = CalibrationSet::load(&mut self.bus)?;
        Ok(())
    }

    /// Soft reset followed by `initialize`.
    pub fn soft_reset(&mut self) -> Result<(), Error> {
        Session::open(&mut self.bus)?.write(&[SOFT_RESET, SOFT_RESET_VALUE])?;
        self.wait(STARTUP_WAIT);
        self.ut = None;
        self.b5 = None;
        self.initialize()
    }

    /// Runs a temperature conversion and returns the temperature in °C.
    ///
    /// On a failed read the previous UT (or `DEFAULT_UT`) is compensated
    /// instead.
    pub fn measure_temperature(&mut self) -> f32 {
        let ut = match self.read_ut() {
            Ok(ut) => {
                trace!("UT = {}", ut);
                self.ut = Some(ut);
                ut
            }
            Err(e) => {
                let ut = self.ut.unwrap_or(DEFAULT_UT);
                warn!("temperature read failed ({}), using UT = {}", e, ut);
                ut
            }
        };
        match self.params.b5(ut) {
            Some(b5) => {
                self.b5 = Some(b5);
                self.reading.temperature = CalibrationSet::temperature_tenths(b5) as f32 / 10.0;
            }
            None => warn!("temperature not compensated: {}", Error::InvalidCalibration),
        }
        self.reading.temperature
    }

    /// Refreshes the temperature, then averages the configured number of
    /// pressure conversions and returns the pressure in Pa.
    pub fn measure_pressure(&mut self) -> Result<i32, Error> {
        self.measure_temperature();

        let oss = self.config.oversampling;
        let mut sum: i64 = 0;
        let mut count: i64 = 0;
        for i in 0..self.config.pressure_samples {
            match self.read_up(oss) {
                Ok(up) => {
                    trace!("UP[{}] = {}", i, up);
                    sum += up as i64;
                    count += 1;
                }
                Err(e) => warn!("pressure sample {} skipped: {}", i, e),
            }
        }
        if count == 0 {
            return Err(Error::MeasurementFailed);
        }
        let up = (sum / count) as i32;

        let b5 = self.b5.ok_or(Error::InvalidCalibration)?;
        let p = self
            .params
            .pressure_pa(up, b5, oss)
            .and_then(|p| i32::try_from(p).ok())
            .ok_or(Error::InvalidCalibration)?;
        debug!("UP = {} from {} samples, p = {} Pa", up, count, p);
        self.reading.pressure = p;
        Ok(p)
    }

    fn wait(&mut self, duration: Duration) {
        self.delay.delay_us(duration.as_micros() as u32);
    }

    fn read_ut(&mut self) -> Result<i32, Error> {
        Session::open(&mut self.bus)?.write(&[CTRL_MEAS, CMD_TEMP, 0])?;
        self.wait(TEMP_WAIT);
        let mut rx = [0u8; 3];
        Session::open(&mut self.bus)?.read(&[DATA, 0, 0], &mut rx)?;
        Ok(be_u16(rx[1], rx[2]) as i32)
    }

    fn read_up(&mut self, oss: Oversampling) -> Result<i32, Error> {
        Session::open(&mut self.bus)?.write(&[CTRL_MEAS, oss.press_command(), 0])?;
        self.wait(oss.wait());
        let mut rx = [0u8; 4];
        Session::open(&mut self.bus)?.read(&[DATA, 0, 0, 0], &mut rx)?;
        Ok((be_u24(rx[1], rx[2], rx[3]) >> (8 - oss.bits())) as i32)
    }

    pub fn temperature(&self) -> f32 {
        self.reading.temperature
    }

    pub fn pressure(&self) -> i32 {
        self.reading.pressure
    }

    pub fn pressure_hpa(&self) -> f32 {
        self.reading.pressure as f32 / 100.0
    }

    pub fn reading(&self) -> Reading {
        self.reading
    }

    pub fn chip_id(&self) -> u8 {
        self.identity.chip_id
    }

    pub fn chip_version(&self) -> u8 {
        self.identity.version
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
