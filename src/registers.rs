use std::time::Duration;

// Calibration data, MSB first.
pub const CAL_AC1: u8 = 0xAA;
pub const CAL_AC2: u8 = 0xAC;
pub const CAL_AC3: u8 = 0xAE;
pub const CAL_AC4: u8 = 0xB0;
pub const CAL_AC5: u8 = 0xB2;
pub const CAL_AC6: u8 = 0xB4;
pub const CAL_B1: u8 = 0xB6;
pub const CAL_B2: u8 = 0xB8;
pub const CAL_MB: u8 = 0xBA;
pub const CAL_MC: u8 = 0xBC;
pub const CAL_MD: u8 = 0xBE;

/// Calibration registers in load order.
pub const CALIBRATION: [u8; 11] = [
    CAL_AC1, CAL_AC2, CAL_AC3, CAL_AC4, CAL_AC5, CAL_AC6, CAL_B1, CAL_B2, CAL_MB, CAL_MC, CAL_MD,
];

pub const ID: u8 = 0xD0;
pub const VER: u8 = 0xD1;

// Bit 7 of the address selects read (1) or write (0), so the write-only
// registers are addressed with that bit cleared.
pub const SOFT_RESET: u8 = 0x60;
pub const CTRL_MEAS: u8 = 0x74;
pub const DATA: u8 = 0xF6;

pub const ID_VALUE: u8 = 0x55;
pub const SOFT_RESET_VALUE: u8 = 0xB6;
pub const CMD_TEMP: u8 = 0x2E;
pub const CMD_PRESS: u8 = 0x34;

pub const TEMP_WAIT: Duration = Duration::from_micros(4500);
// Start-up time after power on or soft reset.
pub const STARTUP_WAIT: Duration = Duration::from_millis(10);

/// Pressure oversampling setting (`oss` in the datasheet).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Oversampling {
    UltraLowPower,
    Standard,
    HighResolution,
    UltraHighResolution,
}

impl Oversampling {
    pub fn bits(self) -> u8 {
        match self {
            Oversampling::UltraLowPower => 0,
            Oversampling::Standard => 1,
            Oversampling::HighResolution => 2,
            Oversampling::UltraHighResolution => 3,
        }
    }

    /// Number of internal samples the sensor averages.
    pub fn samples(self) -> u8 {
        1 << self.bits()
    }

    /// Maximum conversion time.
    pub fn wait(self) -> Duration {
        match self {
            Oversampling::UltraLowPower => Duration::from_micros(4500),
            Oversampling::Standard => Duration::from_micros(7500),
            Oversampling::HighResolution => Duration::from_micros(13500),
            Oversampling::UltraHighResolution => Duration::from_micros(25500),
        }
    }

    /// Control byte starting a pressure conversion.
    pub fn press_command(self) -> u8 {
        CMD_PRESS | (self.bits() << 6)
    }
}

impl Default for Oversampling {
    fn default() -> Oversampling {
        Oversampling::UltraHighResolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ultra_high_resolution_is_the_default() {
        let oss = Oversampling::default();
        assert_eq!(oss.bits(), 3);
        assert_eq!(oss.samples(), 8);
        assert_eq!(oss.wait(), Duration::from_micros(25500));
        assert_eq!(oss.press_command(), 0xF4);
    }

    #[test]
    fn wait_times_follow_the_datasheet() {
        let waits: Vec<u64> = [
            Oversampling::UltraLowPower,
            Oversampling::Standard,
            Oversampling::HighResolution,
            Oversampling::UltraHighResolution,
        ]
        .iter()
        .map(|o| o.wait().as_micros() as u64)
        .collect();
        assert_eq!(waits, vec![4500, 7500, 13500, 25500]);
        assert_eq!(Oversampling::UltraLowPower.press_command(), CMD_PRESS);
    }
}
