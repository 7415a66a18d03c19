//! `smokelink`: run an emulated smoke detector against a base station.

use std::path::PathBuf;
use std::sync::atomic::Ordering;

use anyhow::Context;
use clap::{Parser, Subcommand};
use smokelink_detector::{Detector, DetectorConfig, Transport};
use smokelink_runner::{spawn_tcp_bridge, PollLoop, RunnerConfig, SerialTransport, TransportConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "smokelink", version, about = "Emulated smoke detector for an RF base station")]
struct Cli {
    /// YAML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Detector name used in logs and metrics.
    #[arg(long, global = true)]
    name: Option<String>,

    /// Periodic status push interval in seconds (0 disables).
    #[arg(long, global = true)]
    status_interval: Option<u64>,

    /// Log filter when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Transport; defaults to the one in the config file.
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve one base-station client at a time over TCP.
    Tcp {
        /// Listen address.
        #[arg(long)]
        listen: Option<String>,
    },
    /// Talk to a base station on a serial port.
    Serial {
        /// Serial device, e.g. /dev/ttyUSB0.
        #[arg(long)]
        path: String,
        /// Baud rate.
        #[arg(long)]
        baud: Option<u32>,
    },
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_config(cli: &Cli) -> anyhow::Result<RunnerConfig> {
    let mut config = match &cli.config {
        Some(path) => RunnerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RunnerConfig::default(),
    };

    if let Some(name) = &cli.name {
        config.detector.name = name.clone();
    }
    if let Some(secs) = cli.status_interval {
        config.detector.status_interval_secs = secs;
    }
    match &cli.command {
        Some(Command::Tcp { listen }) => {
            let listen = match (listen, &config.transport) {
                (Some(listen), _) => listen.clone(),
                (None, TransportConfig::Tcp { listen }) => listen.clone(),
                (None, _) => smokelink_runner::config::DEFAULT_LISTEN.to_string(),
            };
            config.transport = TransportConfig::Tcp { listen };
        }
        Some(Command::Serial { path, baud }) => {
            config.transport = TransportConfig::Serial {
                path: path.clone(),
                baud_rate: baud.unwrap_or(smokelink_runner::config::DEFAULT_BAUD_RATE),
            };
        }
        None => {}
    }
    Ok(config)
}

fn install_log_sinks<T: Transport>(detector: &mut Detector<T>) {
    let name = detector.name().to_string();
    let alarm_name = name.clone();
    detector.set_on_alarm(move |active| info!("{}: alarm {}", alarm_name, on_off(active)));
    let test_name = name.clone();
    detector.set_on_test_alarm(move |active| info!("{}: test alarm {}", test_name, on_off(active)));
    detector.set_on_battery_warning(move |active| {
        info!("{}: battery warning {}", name, on_off(active))
    });
}

fn on_off(active: bool) -> &'static str {
    if active {
        "on"
    } else {
        "off"
    }
}

fn run<T: Transport>(config: DetectorConfig, transport: T, poll: &PollLoop) -> anyhow::Result<()> {
    let mut detector = Detector::new(config, transport).context("invalid detector configuration")?;
    install_log_sinks(&mut detector);

    let stats = poll.run(&mut detector).context("detector transport failed")?;
    info!(
        "Detector[{}]: stopped after {} ticks ({:.1}s)",
        detector.name(),
        stats.ticks,
        stats.elapsed.as_secs_f64()
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let config = load_config(&cli)?;
    smokelink_metrics::describe_metrics();

    let poll = PollLoop::new(config.tick_interval());
    let stop = poll.stop_handle();
    ctrlc::set_handler(move || {
        stop.store(false, Ordering::SeqCst);
    })
    .context("installing Ctrl-C handler")?;

    match config.transport.clone() {
        TransportConfig::Tcp { listen } => {
            let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
            let (transport, _addr) = runtime
                .block_on(spawn_tcp_bridge(&listen))
                .with_context(|| format!("binding {}", listen))?;
            run(config.detector, transport, &poll)
        }
        TransportConfig::Serial { path, baud_rate } => {
            let transport = SerialTransport::open(&path, baud_rate)
                .with_context(|| format!("opening serial port {}", path))?;
            run(config.detector, transport, &poll)
        }
    }
}
