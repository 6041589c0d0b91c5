//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "binary"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Binary entrypoint for the panel simulator daemon."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use panelsim_common::{init_tracing, AppConfig, LogFormat};
use panelsim_msg::{MqttSink, PublishSink, StdoutSink};
use panelsim_rt::{shutdown_channel, PanelRunner, TickSchedule};
use panelsim_sim::{LocalClock, RandGenerator};
use tokio::signal;
use tracing::{info, warn};

const SERVICE_NAME: &str = "panelsimd";
const DEFAULT_CONFIG: &str = "configs/panelsim.toml";

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Publish synthetic wind-panel telemetry to an MQTT topic",
    long_about = None
)]
struct Cli {
    #[arg(long, value_name = "FILE", help = "Path to configuration file")]
    config: Option<PathBuf>,

    #[arg(long, help = "Broker host name")]
    broker_host: Option<String>,

    #[arg(long, help = "Broker TCP port")]
    broker_port: Option<u16>,

    #[arg(long, help = "MQTT client identifier")]
    client_id: Option<String>,

    #[arg(long, help = "Topic records are published to")]
    topic: Option<String>,

    #[arg(long, help = "Seconds to wait between ticks")]
    interval_secs: Option<u64>,

    #[arg(long, help = "Fixed RNG seed for reproducible output")]
    seed: Option<u64>,

    #[arg(long, help = "Stop after this many ticks")]
    ticks: Option<u64>,

    #[arg(long, value_enum, help = "Console log format")]
    log_format: Option<CliLogFormat>,

    #[arg(long, help = "Print records to stdout instead of connecting to a broker")]
    dry_run: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogFormat {
    Pretty,
    Json,
}

impl From<CliLogFormat> for LogFormat {
    fn from(value: CliLogFormat) -> Self {
        match value {
            CliLogFormat::Pretty => LogFormat::Pretty,
            CliLogFormat::Json => LogFormat::StructuredJson,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut candidates = Vec::new();
    if let Some(path) = &cli.config {
        if !path.exists() {
            return Err(anyhow!("config file {} does not exist", path.display()));
        }
        candidates.push(path.clone());
    }
    candidates.push(PathBuf::from(DEFAULT_CONFIG));

    let loaded = AppConfig::load_with_source(&candidates)?;
    let mut config = loaded.config;
    apply_overrides(&mut config, &cli);
    config.validate()?;

    init_tracing(SERVICE_NAME, &config.logging)?;
    match &loaded.source {
        Some(path) => info!(config_path = %path.display(), "configuration loaded"),
        None => info!("no configuration file found; using defaults"),
    }

    let (trigger, shutdown) = shutdown_channel();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("interrupt received; stopping");
        trigger.trigger();
    });

    let mut sink: Box<dyn PublishSink> = if cli.dry_run {
        Box::new(StdoutSink::new())
    } else {
        let sink = MqttSink::connect(&config.broker)
            .await
            .with_context(|| format!("unable to connect to broker {}", config.broker.endpoint()))?;
        Box::new(sink)
    };

    let generator = match config.simulation.seed {
        Some(seed) => RandGenerator::seeded(seed, LocalClock),
        None => RandGenerator::from_os(LocalClock),
    };
    let mut runner = PanelRunner::new(
        generator,
        TickSchedule::from_config(&config.simulation),
        config.publish.topic.clone(),
    );
    let summary = runner.run(sink.as_mut(), shutdown).await?;
    info!(ticks = summary.ticks, alerts = summary.alerts, "simulation ended");
    Ok(())
}

fn apply_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(host) = &cli.broker_host {
        config.broker.host = host.clone();
    }
    if let Some(port) = cli.broker_port {
        config.broker.port = port;
    }
    if let Some(client_id) = &cli.client_id {
        config.broker.client_id = client_id.clone();
    }
    if let Some(topic) = &cli.topic {
        config.publish.topic = topic.clone();
    }
    if let Some(secs) = cli.interval_secs {
        config.simulation.tick_interval = Duration::from_secs(secs);
    }
    if let Some(seed) = cli.seed {
        config.simulation.seed = Some(seed);
    }
    if let Some(ticks) = cli.ticks {
        config.simulation.max_ticks = Some(ticks);
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format.into();
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "unable to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        result = signal::ctrl_c() => {
            if let Err(err) = result {
                warn!(error = %err, "unable to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        },
        _ = terminate => {},
    }
}
