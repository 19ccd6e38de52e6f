use error::Error;

#[cfg(target_os = "linux")]
pub use self::linux::SpidevBus;

/// Half-duplex byte transport to the sensor.
///
/// Every transaction happens between `open` and `close`; use `Session` to
/// make sure `close` runs on every path.
pub trait Transport {
    fn open(&mut self) -> Result<(), Error>;

    /// Clocks out `tx` while filling `rx` with the bytes clocked in.
    /// Returns the number of bytes exchanged, which may be less than
    /// `tx.len()`.
    fn transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<usize, Error>;

    fn write(&mut self, tx: &[u8]) -> Result<usize, Error>;

    fn close(&mut self);
}

/// An open bus session, closed when dropped.
pub struct Session<'a, T: Transport + 'a> {
    transport: &'a mut T,
}

impl<'a, T: Transport> Session<'a, T> {
    pub fn open(transport: &'a mut T) -> Result<Session<'a, T>, Error> {
        transport.open()?;
        Ok(Session { transport: transport })
    }

    pub fn transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<usize, Error> {
        self.transport.transfer(tx, rx)
    }

    /// Like `transfer`, but a short exchange is an error.
    pub fn read(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<(), Error> {
        let count = self.transport.transfer(tx, rx)?;
        check_count(tx, count)
    }

    pub fn write(&mut self, tx: &[u8]) -> Result<(), Error> {
        let count = self.transport.write(tx)?;
        check_count(tx, count)
    }
}

impl<'a, T: Transport> Drop for Session<'a, T> {
    fn drop(&mut self) {
        self.transport.close();
    }
}

fn check_count(tx: &[u8], count: usize) -> Result<(), Error> {
    if count < tx.len() {
        return Err(Error::Transport {
            register: tx.first().cloned().unwrap_or(0),
            expected: tx.len(),
            actual: count,
        });
    }
    Ok(())
}

#[cfg(target_os = "linux")]
mod linux {
    use std::io::Write;
    use std::path::{Path, PathBuf};

    use spidev::{SpiModeFlags, Spidev, SpidevOptions, SpidevTransfer};

    use super::Transport;
    use error::Error;

    const SPEED_HZ: u32 = 34_000;

    /// The sensor behind a Linux spidev node, e.g. `/dev/spidev0.0`.
    pub struct SpidevBus {
        path: PathBuf,
        device: Option<Spidev>,
    }

    impl SpidevBus {
        pub fn new<P: AsRef<Path>>(path: P) -> SpidevBus {
            SpidevBus {
                path: path.as_ref().to_path_buf(),
                device: None,
            }
        }

        fn device(&mut self) -> Result<&mut Spidev, Error> {
            match self.device {
                Some(ref mut dev) => Ok(dev),
                None => Err(Error::BusUnavailable(::std::io::Error::new(
                    ::std::io::ErrorKind::NotConnected,
                    "no open SPI session",
                ))),
            }
        }
    }

    impl Transport for SpidevBus {
        fn open(&mut self) -> Result<(), Error> {
            let mut dev = Spidev::open(&self.path)?;
            let options = SpidevOptions::new()
                .bits_per_word(8)
                .max_speed_hz(SPEED_HZ)
                .mode(SpiModeFlags::SPI_MODE_3)
                .build();
            dev.configure(&options)?;
            self.device = Some(dev);
            Ok(())
        }

        fn transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<usize, Error> {
            let len = tx.len().min(rx.len());
            let dev = self.device()?;
            let mut transfer = SpidevTransfer::read_write(&tx[..len], &mut rx[..len]);
            match dev.transfer(&mut transfer) {
                Ok(()) => Ok(len),
                Err(e) => {
                    warn!("SPI transfer failed: {}", e);
                    Ok(0)
                }
            }
        }

        fn write(&mut self, tx: &[u8]) -> Result<usize, Error> {
            let dev = self.device()?;
            match dev.write(tx) {
                Ok(count) => Ok(count),
                Err(e) => {
                    warn!("SPI write failed: {}", e);
                    Ok(0)
                }
            }
        }

        fn close(&mut self) {
            self.device = None;
        }
    }
}


#[cfg(test)]
mod tests {
    use super::mock::SimulatedBus;
    use super::*;
    use registers::*;

    #[test]
    fn session_closes_on_drop() {
        let mut bus = SimulatedBus::new();
        {
            let mut session = Session::open(&mut bus).unwrap();
            let mut rx = [0u8; 2];
            session.read(&[ID, 0], &mut rx).unwrap();
            assert_eq!(rx[1], ID_VALUE);
        }
        assert_eq!(bus.opened, 1);
        assert_eq!(bus.closed, 1);
    }

    #[test]
    fn short_read_is_an_error_and_still_closes() {
        let mut bus = SimulatedBus::new();
        bus.short_registers.push(ID);
        let result = {
            let mut session = Session::open(&mut bus).unwrap();
            let mut rx = [0u8; 2];
            session.read(&[ID, 0], &mut rx)
        };
        match result {
            Err(Error::Transport {
                register,
                expected,
                actual,
            }) => {
                assert_eq!(register, ID);
                assert_eq!(expected, 2);
                assert_eq!(actual, 1);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(bus.closed, 1);
    }

    #[test]
    fn disconnected_bus_does_not_open() {
        let mut bus = SimulatedBus::new();
        bus.connected = false;
        match Session::open(&mut bus) {
            Err(Error::BusUnavailable(_)) => {}
            _ => panic!("expected BusUnavailable"),
        }
        assert_eq!(bus.opened, 0);
        assert_eq!(bus.closed, 0);
    }
}
