use anyhow::{Context, Result};
use clap::Parser;
use sng_exporter::{config::Config, server, targets::ReloadRequest};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/Default.toml")]
    config: String,

    /// syslog-ng control socket (overrides config)
    #[arg(long, env = "SNG_SOCKET_PATH")]
    socket_path: Option<String>,

    /// Relay syslog-ng's native Prometheus stats instead of translating
    #[arg(long)]
    prom: bool,

    /// Port to listen on for metrics (overrides config)
    #[arg(short, long, env = "EXPORTER_PORT")]
    port: Option<u16>,

    /// Address to bind to (overrides config)
    #[arg(short, long, env = "EXPORTER_ADDR")]
    addr: Option<String>,

    /// Append logs to this file instead of stdout
    #[arg(long, env = "EXPORTER_LOG_PATH")]
    log_path: Option<String>,

    /// Tab-separated list of HTTP sites to probe
    #[arg(long)]
    site_list: Option<String>,

    /// Tab-separated list of DNS names to resolve
    #[arg(long)]
    dns_list: Option<String>,
}

fn init_tracing(log_path: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let (file_layer, stdout_layer) = match log_path {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path))?;
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            (Some(layer), None)
        }
        None => (None, Some(tracing_subscriber::fmt::layer())),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();
    Ok(())
}

/// Forward SIGUSR2 as a reload request and SIGINT/SIGTERM as shutdown
async fn handle_signals(reload: mpsc::Sender<ReloadRequest>, shutdown: watch::Sender<bool>) -> Result<()> {
    let mut usr2 = signal(SignalKind::user_defined2())?;
    let mut term = signal(SignalKind::terminate())?;
    let mut int = signal(SignalKind::interrupt())?;

    loop {
        tokio::select! {
            _ = usr2.recv() => {
                info!("signal: reloading target lists");
                if reload.try_send(ReloadRequest).is_err() {
                    debug!("Reload already pending or probes disabled");
                }
            }
            _ = term.recv() => break,
            _ = int.recv() => break,
        }
    }

    info!("signal: shutting down");
    let _ = shutdown.send(true);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize tracing
    init_tracing(args.log_path.as_deref())?;

    info!("Starting syslog-ng Prometheus Exporter v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = Config::load(&args.config)?;

    // Override with CLI arguments if provided
    if let Some(socket_path) = args.socket_path {
        config.syslog_ng.socket_path = socket_path;
    }
    if args.prom {
        config.syslog_ng.prometheus_passthrough = true;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(addr) = args.addr {
        config.server.addr = addr;
    }
    if args.site_list.is_some() {
        config.probes.site_list = args.site_list;
    }
    if args.dns_list.is_some() {
        config.probes.dns_list = args.dns_list;
    }
    config.validate()?;

    info!("Configuration loaded successfully");
    if config.syslog_ng.enabled {
        info!("syslog-ng socket: {}", config.syslog_ng.socket_path);
    }
    info!(
        "Metrics endpoint: http://{}:{}/metrics",
        config.server.addr, config.server.port
    );

    let (reload_tx, reload_rx) = mpsc::channel(1);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = handle_signals(reload_tx, shutdown_tx).await {
            error!("Signal handling unavailable: {}", e);
        }
    });

    // Start the metrics server
    if let Err(e) = server::start(config, reload_rx, shutdown_rx).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
