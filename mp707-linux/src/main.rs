use std::time::Duration;

use clap::Parser;
use ds18x20::{Ds18x20, Temperature};
use embedded_onewire::{OneWireSearch, OneWireSearchKind, Rom};
use mp707::{Mp707, rusb};

/// Read 1-Wire thermometers attached to MP707 USB adapters
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Only use the adapter with this ID
    #[arg(short, long)]
    device: Option<u8>,
    /// ROM address of a single sensor to read (hexadecimal)
    #[arg(short, long)]
    sensor: Option<Rom>,
    /// Attempts per search pass and per temperature reading
    #[arg(short, long, default_value_t = 3)]
    retries: u8,
    /// USB transfer timeout in milliseconds
    #[arg(short, long, default_value_t = 5000)]
    timeout: u64,
}

fn print_reading(rom: Rom, temperature: Temperature) {
    println!("{} {:.2} °C", rom, temperature.to_num::<f32>());
}

fn main() -> anyhow::Result<()> {
    // Initialize the logger
    env_logger::init();
    // Parse command line arguments
    let args = Args::parse();
    let context = rusb::Context::new()?;
    let devices = mp707::lookup(&context)?;
    if devices.is_empty() {
        anyhow::bail!("no devices found");
    }
    let sensor = Ds18x20::default().with_retries(args.retries);

    for found in devices {
        if args.device.is_some_and(|id| id != found.id) {
            log::info!("skipping device {}", found.id);
            continue;
        }
        log::info!("processing device {}", found.id);
        let transport = found
            .transport
            .with_timeout(Duration::from_millis(args.timeout));
        let mut mp707 = Mp707::new(transport, linux_embedded_hal::Delay).with_id(found.id);

        if let Some(rom) = args.sensor {
            log::info!("processing sensor {}", rom);
            match sensor.read_temperature(&mut mp707, rom) {
                Ok(temperature) => print_reading(rom, temperature),
                Err(e) => log::error!("{} (invalid ROM?)", e),
            }
            continue;
        }

        // Enumerate devices on the 1-Wire bus
        let roms = OneWireSearch::new(&mut mp707, OneWireSearchKind::Normal)
            .with_retries(args.retries)
            .search_all()?;
        log::info!("Found {} sensors", roms.len());
        for rom in roms {
            log::info!("processing sensor {}", rom);
            match sensor.read_temperature(&mut mp707, rom) {
                Ok(temperature) => print_reading(rom, temperature),
                Err(e) => log::error!("{}: {}", rom, e),
            }
        }
    }
    Ok(())
}
