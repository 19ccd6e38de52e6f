use std::error;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum Error {
    /// The spidev node could not be opened or configured.
    BusUnavailable(io::Error),
    /// A transaction exchanged fewer bytes than requested.
    Transport {
        register: u8,
        expected: usize,
        actual: usize,
    },
    /// The ID register did not hold 0x55.
    ChipIdMismatch { found: u8 },
    /// Not a single pressure sample could be read in a cycle.
    MeasurementFailed,
    /// The calibration coefficients lead to a division by zero.
    InvalidCalibration,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::BusUnavailable(ref e) => write!(f, "SPI bus unavailable: {}", e),
            Error::Transport {
                register,
                expected,
                actual,
            } => write!(
                f,
                "short transfer at register {:#04x}: {} of {} bytes",
                register, actual, expected
            ),
            Error::ChipIdMismatch { found } => {
                write!(f, "chip id is {:#04x}, expected 0x55", found)
            }
            Error::MeasurementFailed => write!(f, "no valid pressure sample in this cycle"),
            Error::InvalidCalibration => write!(f, "calibration data is unusable"),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::BusUnavailable(ref e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Error {
        Error::BusUnavailable(e)
    }
}
