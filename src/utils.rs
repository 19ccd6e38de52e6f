use bus::{Session, Transport};
use error::Error;

// The sensor shifts data out one byte behind the address, so every read
// clocks one extra byte and drops the first one received.

pub fn read_byte<T: Transport>(bus: &mut T, address: u8) -> Result<u8, Error> {
    let mut rx = [0u8; 2];
    Session::open(bus)?.read(&[address, 0], &mut rx)?;
    Ok(rx[1])
}

pub fn read_word<T: Transport>(bus: &mut T, address: u8) -> Result<u16, Error> {
    let mut rx = [0u8; 3];
    Session::open(bus)?.read(&[address, 0, 0], &mut rx)?;
    Ok(be_u16(rx[1], rx[2]))
}

pub fn be_u16(msb: u8, lsb: u8) -> u16 {
    ((msb as u16) << 8) | lsb as u16
}

pub fn be_u24(msb: u8, lsb: u8, xlsb: u8) -> u32 {
    ((msb as u32) << 16) | ((lsb as u32) << 8) | xlsb as u32
}
