//! CLI binary for the blood-flow viewer.
//!
//! Serves the viewer pages, or drives the viewer headless against the backend
//! and prints chart figures as JSON.
//!
//! # Usage
//!
//! ```bash
//! bloodflow-viewer serve                       # PORT env or 3000
//! bloodflow-viewer frame --sim sim1 --index 10
//! bloodflow-viewer scrub --sim health_wk_laxw  # one JSON line per frame
//! bloodflow-viewer frame --sim wk --name-query # /data?name=wk backends
//! bloodflow-viewer monitor
//! ```

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;

use bloodflow_viewer::chart::RecordingChart;
use bloodflow_viewer::config::{BackendConfig, Environment, ServerConfig, DEFAULT_PORT};
use bloodflow_viewer::fetcher::{EndpointStyle, HttpFetcher};
use bloodflow_viewer::monitor::MonitorView;
use bloodflow_viewer::profile::ProfileTable;
use bloodflow_viewer::server;
use bloodflow_viewer::viewer::{RenderOutcome, Viewer};

#[derive(Parser, Debug)]
#[command(name = "bloodflow-viewer")]
#[command(about = "Browse precomputed 1-D blood-flow simulation results")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the viewer pages and the health check
    Serve {
        /// Port for the web server
        #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Asset directory (defaults to ./static or bloodflow-viewer/static)
        #[arg(long)]
        static_dir: Option<PathBuf>,

        /// Open a browser once the server is listening
        #[arg(long)]
        open_browser: bool,
    },

    /// Load a simulation and print the chart for one frame
    Frame {
        /// Simulation name, as in ?sim=<name>
        #[arg(long)]
        sim: Option<String>,

        /// Frame index
        #[arg(short, long, default_value = "0")]
        index: usize,

        #[command(flatten)]
        backend: BackendArgs,
    },

    /// Load a simulation and print every frame in slider order
    Scrub {
        /// Simulation name, as in ?sim=<name>
        #[arg(long)]
        sim: Option<String>,

        #[command(flatten)]
        backend: BackendArgs,
    },

    /// Run the artery monitor view and print its panels
    Monitor {
        #[command(flatten)]
        backend: BackendArgs,
    },
}

#[derive(clap::Args, Debug)]
struct BackendArgs {
    /// Backend base URL; overrides the environment default
    #[arg(long, env = "BLOODFLOW_BACKEND_URL")]
    backend_url: Option<String>,

    /// Host the viewer is considered to run on; loopback selects the local backend
    #[arg(long, env = "BLOODFLOW_HOST", default_value = "localhost")]
    host: String,

    /// Use `/data?name=<sim>` instead of `/simulation/<sim>`
    #[arg(long, conflicts_with = "fixed_endpoint")]
    name_query: bool,

    /// Fetch this path for every simulation (single-simulation backends)
    #[arg(long)]
    fixed_endpoint: Option<String>,
}

impl BackendArgs {
    /// Resolve the backend once and build the fetcher around it.
    fn fetcher(&self) -> Result<HttpFetcher> {
        let environment = Environment::detect(&self.host);
        let backend = BackendConfig::resolve(self.backend_url.as_deref(), environment);
        tracing::info!(
            environment = %environment,
            backend = %backend.base_url,
            "Resolved backend"
        );

        let style = match (&self.fixed_endpoint, self.name_query) {
            (Some(path), _) => EndpointStyle::Fixed(path.clone()),
            (None, true) => EndpointStyle::NameQuery,
            (None, false) => EndpointStyle::PathSegment,
        };
        HttpFetcher::with_style(backend, style).context("Failed to create backend client")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing - RUST_LOG takes precedence, fallback to info.
    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            port,
            static_dir,
            open_browser,
        } => {
            let config = ServerConfig {
                port,
                static_dir,
                open_browser,
            };
            server::run_server(config).await
        }
        Command::Frame {
            sim,
            index,
            backend,
        } => run_frame(sim.as_deref(), index, &backend).await,
        Command::Scrub { sim, backend } => run_scrub(sim.as_deref(), &backend).await,
        Command::Monitor { backend } => run_monitor(&backend).await,
    }
}

async fn run_frame(sim: Option<&str>, index: usize, backend: &BackendArgs) -> Result<()> {
    let fetcher = backend.fetcher()?;
    let mut viewer = Viewer::new(RecordingChart::new(), ProfileTable::builtin());

    viewer
        .load(&fetcher, sim)
        .await
        .with_context(|| viewer.status().alert().unwrap_or(viewer.status().text()).to_string())?;

    if let RenderOutcome::Skipped(reason) = viewer.render(index) {
        let frames = viewer.dataset().map(|d| d.frame_count()).unwrap_or(0);
        anyhow::bail!(
            "frame {} not drawn ({:?}); simulation has {} frames",
            index,
            reason,
            frames
        );
    }

    let output = json!({
        "simulation": viewer.simulation_id(),
        "index": index,
        "label": viewer.status().text(),
        "figure": viewer.chart().figure(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run_scrub(sim: Option<&str>, backend: &BackendArgs) -> Result<()> {
    let fetcher = backend.fetcher()?;
    let mut viewer = Viewer::new(RecordingChart::new(), ProfileTable::builtin());

    viewer
        .load(&fetcher, sim)
        .await
        .with_context(|| viewer.status().alert().unwrap_or(viewer.status().text()).to_string())?;

    let frames = viewer.dataset().map(|d| d.frame_count()).unwrap_or(0);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    for index in 0..frames {
        let line = match viewer.on_slider_input(&index.to_string()) {
            RenderOutcome::Drawn(_) => json!({
                "index": index,
                "label": viewer.status().text(),
                "figure": viewer.chart().figure(),
            }),
            RenderOutcome::Skipped(reason) => json!({
                "index": index,
                "skipped": format!("{:?}", reason),
            }),
        };
        writeln!(out, "{}", line)?;
    }

    tracing::info!(frames, "Scrubbed all frames");
    Ok(())
}

async fn run_monitor(backend: &BackendArgs) -> Result<()> {
    let fetcher = backend.fetcher()?;
    let mut view: MonitorView<RecordingChart> = MonitorView::new();

    view.run(&fetcher)
        .await
        .with_context(|| view.status().text().to_string())?;

    let panels: serde_json::Map<String, serde_json::Value> = view
        .panels()
        .map(|(panel, chart)| {
            Ok((
                panel.element_id().to_string(),
                serde_json::to_value(chart.figure())?,
            ))
        })
        .collect::<Result<_, serde_json::Error>>()?;

    println!("{}", serde_json::to_string_pretty(&panels)?);
    Ok(())
}
