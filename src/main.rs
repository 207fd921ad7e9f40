//! statlink - Hardware Telemetry over Serial Binary
//!
//! A standalone binary that streams live hardware stats to a microcontroller
//! display over a serial link.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use statlink::{
    build_frame, encode_frame, Config, DiskProbe, FanCalibration, HostSource, LogNotifier,
    SampleLoop, SnapshotAggregator, TokioSerialEndpoint, DEFAULT_INTERVAL_MS,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// How long a cancelled loop gets to finish its tick and release the port.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(1500);

#[derive(Parser)]
#[command(name = "statlink")]
#[command(about = "Streams live hardware telemetry to a serial display")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Serial port the display is attached to
    #[arg(short, long, default_value = "/dev/ttyUSB0")]
    port: String,

    /// Serial baud rate
    #[arg(short, long, default_value_t = 115_200)]
    baud: u32,

    /// Tick period in milliseconds
    #[arg(short, long, default_value_t = DEFAULT_INTERVAL_MS)]
    interval: u64,

    /// Load the full configuration from a JSON file instead of flags
    #[arg(long)]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the telemetry loop (default)
    Run,

    /// Sample once, print the encoded line, and exit
    Snapshot(SnapshotArgs),
}

#[derive(Args)]
struct SnapshotArgs {
    /// Output format: line or json
    #[arg(short, long, default_value = "line")]
    format: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(&cli)?;

    let config = load_config(&cli)?;

    match &cli.command {
        Some(Commands::Snapshot(args)) => snapshot_command(&config, args)?,
        Some(Commands::Run) | None => run_command(config).await?,
    }

    Ok(())
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::load(path).with_context(|| format!("loading config {}", path))?,
        None => Config::new(&cli.port, cli.baud).with_interval_ms(cli.interval),
    };
    config.validate().context("invalid configuration")?;
    Ok(config)
}

async fn run_command(config: Config) -> anyhow::Result<()> {
    info!(
        port = %config.serial_port,
        baud = config.baud_rate,
        interval_ms = config.interval_ms,
        "starting telemetry loop"
    );

    let endpoint = TokioSerialEndpoint::new(&config.serial_port, config.baud_rate);
    let driver = SampleLoop::new(
        &config,
        HostSource::new(),
        DiskProbe::new(),
        endpoint,
        Arc::new(LogNotifier),
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let mut task = tokio::spawn(driver.run(shutdown_rx));

    tokio::signal::ctrl_c()
        .await
        .context("waiting for ctrl-c")?;
    info!("shutdown requested, draining");

    let _ = shutdown_tx.send(true);
    if tokio::time::timeout(SHUTDOWN_GRACE, &mut task).await.is_err() {
        // The transport close is idempotent, so a hard stop is safe here.
        error!("loop did not drain within grace period, aborting");
        task.abort();
    }

    Ok(())
}

fn snapshot_command(config: &Config, args: &SnapshotArgs) -> anyhow::Result<()> {
    let aggregator = SnapshotAggregator::new(config.volumes.clone());
    let mut source = HostSource::new();
    let mut probe = DiskProbe::new();

    let snapshot = aggregator
        .collect(&mut source, &mut probe)
        .context("sampling hardware")?;
    let frame = build_frame(&snapshot, 0, &FanCalibration::from(config));

    match args.format.as_str() {
        "line" => {
            println!(
                "# sampled at {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
            );
            print!("{}", encode_frame(&frame));
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&frame)?);
        }
        other => {
            error!("unsupported format: {}. Use 'line' or 'json'", other);
            std::process::exit(1);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["statlink", "--port", "/dev/ttyACM1"]).unwrap();
        assert_eq!(cli.port, "/dev/ttyACM1");
    }

    #[test]
    fn test_default_values() {
        let cli = Cli::try_parse_from(["statlink"]).unwrap();
        assert_eq!(cli.port, "/dev/ttyUSB0");
        assert_eq!(cli.baud, 115_200);
        assert_eq!(cli.interval, DEFAULT_INTERVAL_MS);
    }

    #[test]
    fn test_snapshot_subcommand_parses() {
        let cli = Cli::try_parse_from(["statlink", "snapshot", "--format", "json"]).unwrap();
        match cli.command {
            Some(Commands::Snapshot(args)) => assert_eq!(args.format, "json"),
            _ => panic!("expected snapshot subcommand"),
        }
    }
}
