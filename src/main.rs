extern crate bmp183_rs;
extern crate docopt;
extern crate env_logger;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

use docopt::Docopt;

#[cfg(target_os = "linux")]
use std::{process, thread, time};

#[cfg(target_os = "linux")]
use bmp183_rs::*;

const USAGE: &'static str = "
Reading BMP183 sensor value

Usage:
  bmp183 [<device>] [--temperature] [--pressure] [--reset] [--interval <secs>] [--count <n>]
  bmp183 (-h | --help)
  bmp183 (-v | --version)

Options:
  -h --help            Show this help text.
  --temperature        Show temperature [degC].
  --pressure           Show pressure [hPa].
  --reset              Soft reset the sensor before measuring.
  --interval <secs>    Measure repeatedly, every <secs> seconds.
  --count <n>          Stop after <n> measurements when polling.
  -v --version         Show version.
";

const BMP183_DEFAULT_DEVICE: &'static str = "/dev/spidev0.0";

#[derive(Debug, Deserialize)]
struct Args {
    arg_device: Option<String>,
    flag_temperature: bool,
    flag_pressure: bool,
    flag_reset: bool,
    flag_interval: Option<f64>,
    flag_count: Option<u64>,
    flag_version: bool,
}

#[cfg(not(target_os = "linux"))]
fn main() {
    let _: Args = Docopt::new(USAGE).and_then(|d| d.deserialize()).unwrap_or_else(|e| e.exit());
    println!("This program can run only on Linux")
}

#[cfg(target_os = "linux")]
fn main() {
    let args: Args = Docopt::new(USAGE).and_then(|d| d.deserialize()).unwrap_or_else(|e| e.exit());

    if args.flag_version {
        println!("bmp183 {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(&args) {
        error!("{}", e);
        process::exit(1);
    }
}

#[cfg(target_os = "linux")]
fn run(args: &Args) -> Result<(), Error> {
    let device = args
        .arg_device
        .clone()
        .unwrap_or_else(|| BMP183_DEFAULT_DEVICE.to_string());
    let bus = SpidevBus::new(&device);
    let mut bmp183 = Bmp183::new(bus, Config::default())?;
    if args.flag_reset {
        bmp183.soft_reset()?;
    }

    // Without a selection both values are shown.
    let show_all = !args.flag_temperature && !args.flag_pressure;
    let interval = match args.flag_interval {
        Some(secs) => time::Duration::from_millis((secs.max(0.0) * 1000.0) as u64),
        None => return measure(&mut bmp183, args, show_all),
    };

    let mut n = 0;
    loop {
        if let Err(e) = measure(&mut bmp183, args, show_all) {
            warn!("{}", e);
        }
        n += 1;
        if args.flag_count.map_or(false, |count| n >= count) {
            return Ok(());
        }
        thread::sleep(interval);
    }
}

#[cfg(target_os = "linux")]
fn measure(bmp183: &mut Bmp183<SpidevBus, Delay>, args: &Args, show_all: bool) -> Result<(), Error> {
    if args.flag_pressure || show_all {
        bmp183.measure_pressure()?;
    } else {
        bmp183.measure_temperature();
    }
    if args.flag_temperature || show_all {
        println!("{:.1}", bmp183.temperature());
    }
    if args.flag_pressure || show_all {
        println!("{:.2}", bmp183.pressure_hpa());
    }
    Ok(())
}
