use clap::{Parser, Subcommand};
use media_metrics::TracingService;
use media_models::Config;
use media_sessions::probe::{self, DEFAULT_PROBE_URL};
use media_sessions::server;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};

const DEFAULT_CONFIG: &str = "configs/default.toml";

#[derive(Parser)]
#[command(name = "media-sessions-server")]
#[command(about = "Per-session direct download link service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API (the default)
    Serve {
        /// TOML config file, `configs/default.toml` when present
        #[arg(long)]
        config: Option<PathBuf>,
        /// Emit JSON log lines
        #[arg(long)]
        json_logs: bool,
    },
    /// Probe a running server and exit 0 when it answers
    Healthcheck {
        #[arg(long, default_value = DEFAULT_PROBE_URL)]
        url: String,
        #[arg(long, default_value = "10")]
        timeout_secs: u64,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Serve {
        config: None,
        json_logs: false,
    });

    match command {
        Commands::Serve { config, json_logs } => serve(config, json_logs),
        Commands::Healthcheck { url, timeout_secs } => healthcheck(&url, timeout_secs),
    }
}

fn serve(config_path: Option<PathBuf>, json_logs: bool) -> ExitCode {
    if let Err(e) = TracingService::init(json_logs) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let config_path = config_path.or_else(|| {
        let default = Path::new(DEFAULT_CONFIG);
        default.exists().then(|| default.to_path_buf())
    });

    let config = match Config::load(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    info!(
        config_file = ?config_path,
        worker_threads = config.server.worker_threads,
        "Configuration loaded"
    );

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.worker_threads)
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to build runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(server::run(config, async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received shutdown signal"),
            Err(err) => warn!("Unable to listen for shutdown signal: {}", err),
        }
    }));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn healthcheck(url: &str, timeout_secs: u64) -> ExitCode {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("healthcheck: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(probe::check(url, Duration::from_secs(timeout_secs))) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("healthcheck: {e:#}");
            ExitCode::FAILURE
        }
    }
}
