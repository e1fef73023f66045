//! Startup wiring: config, logger, tables, applier, transport listeners,
//! and signal-driven graceful shutdown .

mod config;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use tradefeed_applier::{Applier, BatchConfig};
use tradefeed_codec::{DataMessage, ParseErrorCounter};
use tradefeed_logger::Logger;
use tradefeed_metrics::{CsvFileSink, MetricsPipeline, MetricsSink};
use tradefeed_ring::Config as RingConfig;
use tradefeed_ring_stream::channel;
use tradefeed_table::Table;
use tradefeed_transport::TransportConfig;

use config::{Config, ConfigError};

#[derive(Parser, Debug)]
#[command(
    name = "tradefeed-server",
    about = "Real-time trading-data ingestion and indexing engine"
)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    tcp_port: Option<u16>,
    #[arg(long)]
    pipe_name: Option<String>,
    #[arg(long)]
    batch_size: Option<u32>,
    #[arg(long)]
    batch_timeout_ms: Option<u32>,
    #[arg(long)]
    max_refresh_fps: Option<u32>,
    #[arg(long)]
    tcp_buffer_size: Option<u32>,
    #[arg(long)]
    log_directory: Option<PathBuf>,
    /// Disables the metrics pipeline regardless of config/env value.
    #[arg(long)]
    disable_metrics: bool,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => std::process::ExitCode::from(0),
        Err(err) => {
            eprintln!("tradefeed-server: {err:#}");
            std::process::ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;

    let _logger = Logger::init(config.log_directory.clone())?;
    info!(?config, "starting tradefeed-server");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(config))
}

/// Applies CLI overrides on top of the file/env-layered config and
/// re-validates .
fn load_config(cli: &Cli) -> Result<Config, ConfigError> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(v) = cli.tcp_port {
        config.tcp_port = v;
    }
    if let Some(v) = &cli.pipe_name {
        config.pipe_name = v.clone();
    }
    if let Some(v) = cli.batch_size {
        config.batch_size = v;
    }
    if let Some(v) = cli.batch_timeout_ms {
        config.batch_timeout_ms = v;
    }
    if let Some(v) = cli.max_refresh_fps {
        config.max_refresh_fps = v;
    }
    if let Some(v) = cli.tcp_buffer_size {
        config.tcp_buffer_size = v;
    }
    if let Some(v) = &cli.log_directory {
        config.log_directory = v.clone();
    }
    if cli.disable_metrics {
        config.enable_metrics = false;
    }
    config.validate()?;
    Ok(config)
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let order_table = Arc::new(Table::new());
    let trade_table = Arc::new(Table::new());
    let errors = ParseErrorCounter::new();

    let metrics = if config.enable_metrics {
        let sink: Arc<dyn MetricsSink> = Arc::new(CsvFileSink::create(config.metrics_csv_path())?);
        let pipeline = MetricsPipeline::new(sink);
        pipeline.start();
        Some(pipeline)
    } else {
        None
    };

    let applier = Applier::new(
        order_table.clone(),
        trade_table.clone(),
        BatchConfig {
            batch_size: config.batch_size as usize,
            batch_timeout: Duration::from_millis(u64::from(config.batch_timeout_ms)),
        },
        metrics.clone(),
        errors.clone(),
    );

    let mut batch_events = applier.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = batch_events.recv().await {
            debug!(?event, "batch applied");
        }
    });

    let (ingest_senders, ingest_receiver) = channel::<DataMessage>(RingConfig::default());

    let cancel = CancellationToken::new();

    let applier_cancel = cancel.clone();
    let applier_handle =
        tokio::spawn(async move { applier.run(ingest_receiver, applier_cancel).await });

    let transport_config = TransportConfig {
        tcp_port: config.tcp_port,
        socket_path: config.socket_path(),
        buffer_size: config.tcp_buffer_size as usize,
        max_local_instances: 4,
    };
    let listener_handles = tradefeed_transport::spawn_listeners(
        transport_config,
        ingest_senders,
        errors,
        cancel.clone(),
    );

    wait_for_shutdown_signal().await;
    info!("shutdown signal received, cancelling in-flight work");
    cancel.cancel();

    for handle in listener_handles {
        if let Err(err) = handle.await {
            error!(error = %err, "listener task panicked");
        }
    }
    if let Err(err) = applier_handle.await {
        error!(error = %err, "applier task panicked");
    }
    if let Some(metrics) = metrics {
        metrics.dispose().await;
    }
    info!("shutdown complete");
    Ok(())
}

/// Waits on Ctrl-C . A production deployment would also fold SIGTERM in here;
/// this binary targets interactive/foreground use.
async fn wait_for_shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
    }
}
