//! CLI entry point for the subway congestion dashboard.
//!
//! Loads the congestion CSV once, then either prints a single view as JSON
//! or serves the read-only HTTP API.

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use subway_congestion::{
    config::DashboardConfig,
    dashboard::{Dashboard, FilterParams},
    http::{AppState, create_router},
    output::{export_ranking, print_json, ranking_file_name},
};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "subway_congestion")]
#[command(about = "Explore Seoul subway congestion by line, station and time slot", long_about = None)]
struct Cli {
    /// Congestion CSV to load (overrides CONGESTION_DATA_PATH)
    #[arg(long, global = true, value_name = "FILE")]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Filters shared by every view.
#[derive(Args, Debug, Clone, Default)]
struct FilterArgs {
    /// Line to restrict to, e.g. "2호선"
    #[arg(short, long)]
    line: Option<String>,

    /// Direction, e.g. "상선"; "전체" keeps both
    #[arg(short, long)]
    direction: Option<String>,

    /// First time slot of the range, e.g. "07:00"
    #[arg(long)]
    from: Option<String>,

    /// Last time slot of the range, e.g. "09:00"
    #[arg(long)]
    to: Option<String>,
}

impl From<FilterArgs> for FilterParams {
    fn from(args: FilterArgs) -> Self {
        FilterParams {
            line: args.line,
            direction: args.direction,
            from: args.from,
            to: args.to,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP JSON API
    Serve {
        /// Bind address (overrides HOST)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// List the lines present in the data
    Lines,
    /// List stations, optionally for one line
    Stations {
        #[arg(short, long)]
        line: Option<String>,
    },
    /// List the time slots found in the header
    Slots,
    /// Top-N stations by peak congestion
    Ranking {
        #[command(flatten)]
        filters: FilterArgs,

        /// Number of stations (clamped to 5..=50)
        #[arg(short = 'n', long)]
        top_n: Option<usize>,

        /// Write the ranking as CSV; a directory gets a timestamped file name
        #[arg(short, long, value_name = "PATH")]
        export: Option<PathBuf>,
    },
    /// Station x time slot congestion matrix
    Heatmap {
        #[command(flatten)]
        filters: FilterArgs,

        /// Row order: "alphabetical" or "peak"
        #[arg(short, long)]
        sort: Option<String>,

        /// Maximum number of rows (clamped to 5..=50)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// KPIs and time series of one station
    Station {
        name: String,

        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Compare up to three stations
    Compare {
        #[arg(required = true, num_args = 1..)]
        names: Vec<String>,

        #[command(flatten)]
        filters: FilterArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/subway_congestion.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("subway_congestion.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let mut config = DashboardConfig::from_env().context("invalid configuration")?;
    if let Some(data) = cli.data {
        config.data_path = data;
    }

    let dashboard = Dashboard::load(config).context("failed to load congestion data")?;

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| dashboard.config().host.clone());
            let port = port.unwrap_or(dashboard.config().port);
            serve(dashboard, &host, port).await?;
        }
        Commands::Lines => {
            print_json(&dashboard.table().lines())?;
        }
        Commands::Stations { line } => {
            print_json(&dashboard.table().stations(line.as_deref()))?;
        }
        Commands::Slots => {
            print_json(dashboard.table().slots())?;
        }
        Commands::Ranking {
            filters,
            top_n,
            export,
        } => {
            let view = dashboard.ranking(&filters.into(), top_n)?;
            if let Some(target) = export {
                let path = if target.is_dir() {
                    target.join(ranking_file_name(view.line.as_deref(), Local::now()))
                } else {
                    target
                };
                export_ranking(&path, &view.entries)
                    .with_context(|| format!("failed to export ranking to {}", path.display()))?;
            }
            print_json(&view)?;
        }
        Commands::Heatmap {
            filters,
            sort,
            limit,
        } => {
            let matrix = dashboard.heatmap(&filters.into(), sort.as_deref(), limit)?;
            print_json(&matrix)?;
        }
        Commands::Station { name, filters } => {
            match dashboard.station(&filters.into(), &name)? {
                Some(profile) => print_json(&profile)?,
                None => anyhow::bail!("no data for station `{}` under this filter", name),
            }
        }
        Commands::Compare { names, filters } => {
            let view = dashboard.compare(&filters.into(), &names)?;
            print_json(&view)?;
        }
    }

    Ok(())
}

/// Serves the HTTP API until the process is stopped.
async fn serve(dashboard: Dashboard, host: &str, port: u16) -> Result<()> {
    let app = create_router(AppState::new(Arc::new(dashboard)));
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!(%addr, "HTTP API listening");
    axum::serve(listener, app).await?;
    Ok(())
}
