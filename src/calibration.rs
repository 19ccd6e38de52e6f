use std::fmt;

use bus::Transport;
use error::Error;
use registers::*;
use utils::*;

/// Factory calibration coefficients from the sensor's EEPROM.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CalibrationSet {
    pub ac1: i16,
    pub ac2: i16,
    pub ac3: i16,
    pub ac4: u16,
    pub ac5: u16,
    pub ac6: u16,
    pub b1: i16,
    pub b2: i16,
    pub mb: i16,
    pub mc: i16,
    pub md: i16,
}

impl CalibrationSet {
    /// Reads all eleven coefficients, AC1 through MD.
    pub fn load<T: Transport>(bus: &mut T) -> Result<CalibrationSet, Error> {
        let mut words = [0u16; 11];
        for (word, reg) in words.iter_mut().zip(CALIBRATION.iter()) {
            *word = read_word(bus, *reg)?;
        }
        let params = CalibrationSet::from_words(&words);
        debug!("calibration: {}", params);
        Ok(params)
    }

    pub fn from_words(w: &[u16; 11]) -> CalibrationSet {
        CalibrationSet {
            ac1: w[0] as i16,
            ac2: w[1] as i16,
            ac3: w[2] as i16,
            ac4: w[3],
            ac5: w[4],
            ac6: w[5],
            b1: w[6] as i16,
            b2: w[7] as i16,
            mb: w[8] as i16,
            mc: w[9] as i16,
            md: w[10] as i16,
        }
    }

    pub fn words(&self) -> [u16; 11] {
        [
            self.ac1 as u16,
            self.ac2 as u16,
            self.ac3 as u16,
            self.ac4,
            self.ac5,
            self.ac6,
            self.b1 as u16,
            self.b2 as u16,
            self.mb as u16,
            self.mc as u16,
            self.md as u16,
        ]
    }

    /// Builds the set from the 22-byte EEPROM image starting at AC1.
    pub fn from_bytes(b: &[u8; 22]) -> CalibrationSet {
        let mut words = [0u16; 11];
        for (i, word) in words.iter_mut().enumerate() {
            *word = be_u16(b[2 * i], b[2 * i + 1]);
        }
        CalibrationSet::from_words(&words)
    }

    pub fn to_bytes(&self) -> [u8; 22] {
        let mut bytes = [0u8; 22];
        for (i, word) in self.words().iter().enumerate() {
            bytes[2 * i] = (word >> 8) as u8;
            bytes[2 * i + 1] = *word as u8;
        }
        bytes
    }

    /// Intermediate B5 for an uncompensated temperature.
    ///
    /// `None` when the coefficients make the arithmetic divide by zero or
    /// overflow, which only corrupt calibration data does.
    pub fn b5(&self, ut: i32) -> Option<i64> {
        let x1 = (ut as i64 - self.ac6 as i64).checked_mul(self.ac5 as i64)? >> 15;
        let x2 = ((self.mc as i64) << 11).checked_div(x1.checked_add(self.md as i64)?)?;
        x1.checked_add(x2)
    }

    /// Temperature in 0.1 °C.
    pub fn temperature_tenths(b5: i64) -> i64 {
        b5.saturating_add(8) >> 4
    }

    pub fn compensated_temp(&self, ut: i32) -> Option<f32> {
        self.b5(ut)
            .map(|b5| CalibrationSet::temperature_tenths(b5) as f32 / 10.0)
    }

    /// Pressure in Pa from an uncompensated (averaged) pressure and the B5 of
    /// the preceding temperature conversion.
    ///
    /// `None` under the same conditions as `b5`.
    pub fn pressure_pa(&self, up: i32, b5: i64, oss: Oversampling) -> Option<i64> {
        let oss = oss.bits() as u32;
        let ac1 = self.ac1 as i64;
        let ac2 = self.ac2 as i64;
        let ac3 = self.ac3 as i64;
        let ac4 = self.ac4 as i64;
        let b1 = self.b1 as i64;
        let b2 = self.b2 as i64;

        let b6 = b5.checked_sub(4000)?;
        let b6_sq = b6.checked_mul(b6)? >> 12;
        let x1 = b2.checked_mul(b6_sq)? >> 11;
        let x2 = ac2.checked_mul(b6)? >> 11;
        let x3 = x1.checked_add(x2)?;
        let b3 = (ac1 * 4)
            .checked_add(x3)?
            .checked_mul(1 << oss)?
            .checked_add(2)?
            / 4;

        let x1 = ac3.checked_mul(b6)? >> 13;
        let x2 = b1.checked_mul(b6_sq)? >> 16;
        let x3 = x1.checked_add(x2)?.checked_add(2)? >> 2;
        let b4 = ac4.checked_mul(x3.checked_add(32768)?)? >> 15;
        let b7 = (up as i64).checked_sub(b3)?.checked_mul(50000 >> oss)?;
        let p = b7.checked_mul(2)?.checked_div(b4)?;

        let x1 = (p >> 8).checked_mul(p >> 8)?.checked_mul(3038)? >> 16;
        let x2 = p.checked_mul(-7357)? >> 16;
        let x = x1.checked_add(x2)?.checked_add(3791)?;
        p.checked_add(x >> 4)
    }
}

impl fmt::Display for CalibrationSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "AC1={} AC2={} AC3={} AC4={} AC5={} AC6={} B1={} B2={} MB={} MC={} MD={}",
            self.ac1,
            self.ac2,
            self.ac3,
            self.ac4,
            self.ac5,
            self.ac6,
            self.b1,
            self.b2,
            self.mb,
            self.mc,
            self.md
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub chip_id: u8,
    pub version: u8,
}

impl DeviceIdentity {
    /// Reads ID and VER. A failed read leaves the byte at zero, which then
    /// fails `verify`.
    pub fn load<T: Transport>(bus: &mut T) -> DeviceIdentity {
        let chip_id = read_byte(bus, ID).unwrap_or_else(|e| {
            warn!("could not read chip id: {}", e);
            0
        });
        let version = read_byte(bus, VER).unwrap_or_else(|e| {
            warn!("could not read chip version: {}", e);
            0
        });
        DeviceIdentity {
            chip_id: chip_id,
            version: version,
        }
    }

    pub fn verify(&self) -> Result<(), Error> {
        if self.chip_id != ID_VALUE {
            return Err(Error::ChipIdMismatch {
                found: self.chip_id,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bus::mock::SimulatedBus;

    fn datasheet() -> CalibrationSet {
        CalibrationSet {
            ac1: 408,
            ac2: -72,
            ac3: -14383,
            ac4: 32741,
            ac5: 32757,
            ac6: 23153,
            b1: 6190,
            b2: 4,
            mb: -32768,
            mc: -8711,
            md: 2868,
        }
    }

    #[test]
    fn load_applies_sign_per_coefficient() {
        let mut bus = SimulatedBus::new();
        for reg in CALIBRATION.iter() {
            bus.set_word(*reg, 0xFFFF);
        }
        let params = CalibrationSet::load(&mut bus).unwrap();
        assert_eq!(params.ac1, -1);
        assert_eq!(params.ac2, -1);
        assert_eq!(params.ac3, -1);
        assert_eq!(params.ac4, 65535);
        assert_eq!(params.ac5, 65535);
        assert_eq!(params.ac6, 65535);
        assert_eq!(params.b1, -1);
        assert_eq!(params.b2, -1);
        assert_eq!(params.mb, -1);
        assert_eq!(params.mc, -1);
        assert_eq!(params.md, -1);
        assert_eq!(bus.opened, 11);
        assert_eq!(bus.closed, 11);
    }

    #[test]
    fn load_reads_datasheet_values() {
        let mut bus = SimulatedBus::datasheet();
        assert_eq!(CalibrationSet::load(&mut bus).unwrap(), datasheet());
    }

    #[test]
    fn load_fails_on_short_read() {
        let mut bus = SimulatedBus::datasheet();
        bus.short_registers.push(CAL_MC);
        match CalibrationSet::load(&mut bus) {
            Err(Error::Transport { register, .. }) => assert_eq!(register, CAL_MC),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(bus.opened, bus.closed);
    }

    #[test]
    fn bytes_survive_the_trip() {
        let params = datasheet();
        let bytes = params.to_bytes();
        assert_eq!(&bytes[..4], &[0x01, 0x98, 0xFF, 0xB8]);
        assert_eq!(CalibrationSet::from_bytes(&bytes), params);
        assert_eq!(CalibrationSet::from_words(&params.words()), params);
    }

    #[test]
    fn datasheet_temperature() {
        let params = datasheet();
        let b5 = params.b5(27898).unwrap();
        assert_eq!(CalibrationSet::temperature_tenths(b5), 150);
        assert_eq!(params.compensated_temp(27898), Some(15.0));
    }

    #[test]
    fn datasheet_pressure() {
        let params = datasheet();
        let b5 = params.b5(27898).unwrap();
        let p = params.pressure_pa(23843, b5, Oversampling::UltraLowPower);
        assert_eq!(p, Some(69964));
    }

    #[test]
    fn zero_divisor_is_reported() {
        let mut params = datasheet();
        params.ac5 = 0;
        params.md = 0;
        assert_eq!(params.b5(27898), None);

        let mut params = datasheet();
        params.ac4 = 0;
        assert_eq!(params.pressure_pa(23843, 2400, Oversampling::UltraLowPower), None);
    }

    #[test]
    fn overflow_is_reported() {
        let params = CalibrationSet {
            ac1: 32767,
            ac2: 32767,
            ac4: 1,
            b2: -32768,
            mc: -32768,
            md: 1,
            ..CalibrationSet::default()
        };
        let b5 = params.b5(0).unwrap();
        assert_eq!(b5, -67108864);
        assert_eq!(params.pressure_pa(0, b5, Oversampling::UltraHighResolution), None);
        assert_eq!(params.pressure_pa(0, i64::min_value(), Oversampling::UltraLowPower), None);
    }

    #[test]
    fn identity_check() {
        let mut bus = SimulatedBus::new();
        let id = DeviceIdentity::load(&mut bus);
        assert_eq!(id.chip_id, ID_VALUE);
        assert_eq!(id.version, 0x02);
        assert!(id.verify().is_ok());

        bus.short_registers.push(ID);
        let id = DeviceIdentity::load(&mut bus);
        match id.verify() {
            Err(Error::ChipIdMismatch { found }) => assert_eq!(found, 0),
            other => panic!("unexpected {:?}", other),
        }
    }
}
