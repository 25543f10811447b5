//! CONSULT CLI
//!
//! Command line utility for reading ECU metadata, stored fault codes and
//! live engine parameters from a CONSULT-capable vehicle, either over a
//! serial port or by replaying a previously recorded transaction log.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use consult_protocol::{
    ByteTransport, ConsultEngine, EngineParameter, RecordingTransport, ReplayTransport,
    SerialTransport,
};

#[derive(Parser)]
#[command(name = "consult-cli", version)]
#[command(about = "Command line utility for reading from a Consult device")]
struct Cli {
    /// Serial device to communicate with, or a log path when --replay is
    /// given.
    device: String,

    /// Record all Consult transactions to this path. The log may be
    /// subsequently replayed using --replay.
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,

    /// Interpret the passed device as a log to replay transactions from.
    #[arg(long)]
    replay: bool,

    /// When replaying a log, wrap at the end of the log.
    #[arg(long = "replay_wrap")]
    replay_wrap: bool,

    /// Print metadata about the ECU.
    #[arg(long = "print_ecu")]
    print_ecu: bool,

    /// Print any recently observed fault codes.
    #[arg(long = "print_faults")]
    print_faults: bool,

    /// Read the given engine parameters once and print them. Takes a comma
    /// separated list of parameter identifiers such as engine_speed_rpm.
    #[arg(long = "print_params", value_name = "IDS", value_delimiter = ',')]
    print_params: Vec<String>,

    /// Baud rate for the serial device.
    #[arg(long, default_value_t = 9600)]
    baud: u32,
}

/// Report a usage-level failure (bad argument, unopenable file) and exit
/// with the conventional status.
fn usage_error(message: impl std::fmt::Display) -> ! {
    eprintln!("error: {message}");
    process::exit(2);
}

fn build_transport(cli: &Cli) -> Result<Box<dyn ByteTransport>> {
    if cli.replay {
        let file = File::open(&cli.device)
            .unwrap_or_else(|error| usage_error(format_args!("failed to open {}: {}", cli.device, error)));
        let transport = ReplayTransport::new(BufReader::new(file), cli.replay_wrap)
            .with_context(|| format!("failed to parse replay log {}", cli.device))?;
        return Ok(Box::new(transport));
    }

    let serial = SerialTransport::open(&cli.device, cli.baud)
        .with_context(|| format!("failed to open serial device {}", cli.device))?;
    let transport: Box<dyn ByteTransport> = Box::new(serial);

    if let Some(path) = &cli.log {
        let sink = File::create(path)
            .unwrap_or_else(|error| usage_error(format_args!("failed to open {}: {}", path.display(), error)));
        debug!("recording transactions to {}", path.display());
        return Ok(Box::new(RecordingTransport::new(
            transport,
            BufWriter::new(sink),
        )));
    }
    Ok(transport)
}

fn resolve_params(ids: &[String]) -> Vec<EngineParameter> {
    ids.iter()
        .map(|id| {
            EngineParameter::from_id(id)
                .unwrap_or_else(|error| usage_error(error))
        })
        .collect()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let params = resolve_params(&cli.print_params);

    let transport = build_transport(&cli)?;
    let mut engine = ConsultEngine::new(transport).context("failed to connect to the ECU")?;

    if cli.print_ecu {
        let metadata = engine
            .read_ecu_metadata()
            .context("failed to read ECU metadata")?;
        println!("{}", metadata.to_json());
    }

    if cli.print_faults {
        let faults = engine
            .read_fault_codes()
            .context("failed to read fault codes")?;
        println!("{}", faults.to_json());
    }

    if !params.is_empty() {
        let values = engine
            .read_engine_parameters(&params)
            .context("failed to read engine parameters")?;
        println!("{}", values.to_json());
    }

    Ok(())
}
