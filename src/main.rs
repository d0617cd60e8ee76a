//! Firmata DHT command line client
//!
//! ```bash
//! # List available serial ports
//! firmata-dht --list-ports
//!
//! # Read a DHT22 on pin 2 five times, one second apart
//! RUST_LOG=firmata_dht=debug firmata-dht --port /dev/ttyACM0 --pin 2 --sensor dht22 --count 5
//!
//! # Same against the in-memory mock board
//! firmata-dht --mock --pin 2 --sensor dht22
//!
//! # Save the port settings as a profile, then reuse them
//! firmata-dht --port /dev/ttyACM0 --baud 57600 --save-profile bench --profile-dir ./profiles
//! firmata-dht --profile bench --profile-dir ./profiles --pin 2
//! ```

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::Parser;

use firmata_dht::adapters::mock_board::MockBoard;
use firmata_dht::adapters::profile_store;
use firmata_dht::adapters::serial_port::SerialPortFactory;
use firmata_dht::domain::{ClientConfig, DhtReading, DhtType, FirmataResult, Pin};
use firmata_dht::ports::SerialFactory;

#[derive(Parser, Debug)]
#[command(name = "firmata-dht", version, about = "Read DHT sensors through a Firmata board")]
struct Cli {
    /// Serial port of the board
    #[arg(long)]
    port: Option<String>,

    /// Serial baud rate
    #[arg(long)]
    baud: Option<u32>,

    /// Use the in-memory mock board instead of a serial port
    #[arg(long, conflicts_with = "port")]
    mock: bool,

    /// Pin the sensor is wired to
    #[arg(long, default_value_t = 2)]
    pin: Pin,

    /// Sensor type: dht11, dht21, dht22 or am2301
    #[arg(long, default_value = "dht11")]
    sensor: DhtType,

    /// Number of readings to take
    #[arg(long, default_value_t = 1)]
    count: u32,

    /// Delay between readings in milliseconds
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,

    /// Reply timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Load settings from a saved profile
    #[arg(long)]
    profile: Option<String>,

    /// Save the effective settings under this profile name and exit
    #[arg(long)]
    save_profile: Option<String>,

    /// Directory holding profiles
    #[arg(long, default_value = "profiles")]
    profile_dir: PathBuf,

    /// List serial ports and exit
    #[arg(long)]
    list_ports: bool,
}

impl Cli {
    /// Profile values, overridden by any flags given on the command line
    fn effective_config(&self) -> FirmataResult<ClientConfig> {
        let mut config = match &self.profile {
            Some(name) => profile_store::load_profile(&self.profile_dir, name)?,
            None => ClientConfig::default(),
        };
        if let Some(port) = &self.port {
            config.serial_port = Some(port.clone());
        }
        if let Some(baud) = self.baud {
            config.baud_rate = baud;
        }
        if let Some(timeout) = self.timeout_ms {
            config.reply_timeout_ms = timeout;
        }
        if self.mock {
            // Nothing to reset
            config.arduino_wait_ms = 0;
        }
        Ok(config)
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> FirmataResult<()> {
    if cli.list_ports {
        for port in SerialPortFactory::list_ports()? {
            println!("{}\t{}", port.name, port.port_type);
        }
        return Ok(());
    }

    let mut config = cli.effective_config()?;

    if let Some(name) = &cli.save_profile {
        config.name = name.clone();
        return profile_store::save_profile(&cli.profile_dir, &config);
    }

    let (session, client) = if cli.mock {
        let board = MockBoard::new();
        board.set_reading(cli.pin, DhtReading { temperature: 23, humidity: 45 });
        firmata_dht::connect_with(board.connection(), &config)?
    } else {
        firmata_dht::connect(&config)?
    };

    client.configure(cli.pin, cli.sensor)?;

    for i in 0..cli.count {
        if i > 0 {
            thread::sleep(Duration::from_millis(cli.interval_ms));
        }
        match client.get_data(cli.pin)? {
            Some(reading) => match serde_json::to_string(&reading) {
                Ok(line) => println!("{line}"),
                Err(e) => log::error!("Failed to format reading: {e}"),
            },
            None => println!("no data"),
        }
    }

    session.close()
}
