//! # bmp183-rs
//!
//! This crate provides you a way to access the Bosch BMP183 pressure sensor
//! via the Linux spidev interface.
//!
//! # Examples
//! ```no_run
//! # extern crate bmp183_rs;
//! # #[cfg(target_os = "linux")]
//! # fn main() {
//! # use bmp183_rs::*;
//! let bus = SpidevBus::new("/dev/spidev0.0");
//! let mut bmp183 = Bmp183::new(bus, Config::default()).unwrap();
//! let pressure = bmp183.measure_pressure().unwrap();
//! println!("{:.1}", bmp183.temperature());
//! println!("{:.2}", pressure as f32 / 100.0);
//! # }
//! # #[cfg(not(target_os = "linux"))]
//! # fn main() {}
//! ```
//!
//! # Known limitations
//!
//! Measurements block the calling thread for the conversion times
//! (about 81 ms for a pressure cycle at the default oversampling). Callers
//! running an event loop should measure on another thread.

extern crate embedded_hal as hal;
#[cfg(target_os = "linux")]
extern crate linux_embedded_hal;
#[macro_use]
extern crate log;
#[cfg(target_os = "linux")]
extern crate spidev;

mod bmp183;
mod bus;
mod calibration;
mod error;
pub mod registers;
mod utils;

pub use bmp183::*;
pub use bus::{Session, Transport};
#[cfg(target_os = "linux")]
pub use bus::SpidevBus;
#[cfg(target_os = "linux")]
pub use linux_embedded_hal::Delay;
pub use calibration::*;
pub use error::Error;
pub use registers::Oversampling;
