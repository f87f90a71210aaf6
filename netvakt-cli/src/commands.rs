use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::info;

use netvakt_config::NetvaktConfig;
use netvakt_core::time::{Clock, SystemClock};
use netvakt_engine::{Monitor, MonitorSettings, Shutdown};
use netvakt_simulator::{source_from_config, Scenario, SyntheticSource};

use crate::report::StatusReport;

#[derive(Parser)]
#[command(name = "netvakt", version, about)]
pub struct Cli {
    /// Configuration file; defaults to config/netvakt.yaml plus overlays
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Monitor synthetic or replayed traffic and print a live status block
    Monitor(MonitorArgs),
    /// Record a synthetic scenario for later replay
    Record(RecordArgs),
    /// Run the monitor briefly and print the Prometheus export
    Metrics(MetricsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct MonitorArgs {
    /// Seconds to run; 0 runs until Ctrl-C
    #[arg(short, long, default_value_t = 0)]
    pub duration: u64,
    /// Seconds between status blocks
    #[arg(short, long, default_value_t = 5)]
    pub refresh: u64,
    /// Overrides the generator seed
    #[arg(long)]
    pub seed: Option<u64>,
    /// Replays a recorded scenario instead of generating traffic
    #[arg(short, long)]
    pub scenario: Option<PathBuf>,
    /// Restart the scenario once it is exhausted
    #[arg(long = "loop")]
    pub loop_replay: bool,
    /// Number of alerts shown per status block
    #[arg(long, default_value_t = 5)]
    pub alerts: usize,
}

#[derive(Args, Debug, Clone)]
pub struct RecordArgs {
    /// Number of events to capture
    #[arg(short, long, default_value_t = 100)]
    pub events: usize,
    /// Overrides the generator seed
    #[arg(long)]
    pub seed: Option<u64>,
    /// Destination YAML file
    #[arg(short, long)]
    pub output: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct MetricsArgs {
    /// Seconds to run before exporting
    #[arg(short, long, default_value_t = 3)]
    pub duration: u64,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<NetvaktConfig> {
    let config = match path {
        Some(path) => NetvaktConfig::load_from_path(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => NetvaktConfig::load().context("loading configuration")?,
    };
    Ok(config)
}

fn build_monitor(config: &NetvaktConfig) -> anyhow::Result<Monitor> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let source =
        source_from_config(&config.simulator, Arc::clone(&clock)).context("opening event source")?;
    let monitor = Monitor::builder(source)
        .settings(MonitorSettings::from(config))
        .clock(clock)
        .build()?;
    Ok(monitor)
}

pub async fn run_monitor(mut config: NetvaktConfig, args: MonitorArgs) -> anyhow::Result<()> {
    if let Some(seed) = args.seed {
        config.simulator.seed = seed;
    }
    if args.scenario.is_some() {
        config.simulator.scenario = args.scenario.clone();
    }
    config.simulator.loop_replay |= args.loop_replay;

    let monitor = build_monitor(&config)?;
    monitor.start()?;

    let deadline = (args.duration > 0).then(|| Instant::now() + Duration::from_secs(args.duration));
    let mut ticker = interval(Duration::from_secs(args.refresh.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; skip the empty report.
    ticker.tick().await;

    loop {
        let stop_at = async {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::select! {
            _ = ticker.tick() => print!("{}", StatusReport::capture(&monitor, args.alerts)),
            _ = stop_at => break,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    let outcome = monitor.stop();
    if outcome == Shutdown::GraceExpired {
        eprintln!("warning: monitor loop did not exit within its grace period");
    }
    print!("{}", StatusReport::capture(&monitor, args.alerts));
    Ok(())
}

pub fn record_scenario(config: NetvaktConfig, args: RecordArgs) -> anyhow::Result<()> {
    let seed = args.seed.unwrap_or(config.simulator.seed);
    let source = SyntheticSource::new(seed, Arc::new(SystemClock))
        .with_threat_probability(config.simulator.threat_probability);

    let scenario = Scenario::record(&source, args.events);
    scenario
        .save(&args.output)
        .with_context(|| format!("writing scenario to {}", args.output.display()))?;

    println!(
        "Recorded {} events (seed {}) to {}\nchecksum: {}",
        scenario.events.len(),
        scenario.seed,
        args.output.display(),
        scenario.checksum
    );
    Ok(())
}

pub async fn export_metrics(config: NetvaktConfig, args: MetricsArgs) -> anyhow::Result<()> {
    let monitor = build_monitor(&config)?;
    monitor.start()?;
    tokio::time::sleep(Duration::from_secs(args.duration)).await;
    monitor.stop();

    let text = monitor
        .metrics()
        .gather_metrics()
        .context("encoding metrics")?;
    print!("{text}");
    Ok(())
}
