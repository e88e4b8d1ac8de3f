//! Viewer for precomputed 1-D blood-flow simulation results.
//!
//! The simulations themselves run in a separate backend service. This crate
//! fetches their output and turns it into navigable line charts, and hosts the
//! viewer pages.
//!
//! ## Architecture
//!
//! 1. **Data Fetcher** (`fetcher` module) - One GET per simulation against the
//!    backend resolved at startup (`config`), decoded into an immutable
//!    `SimulationDataset` (`dataset`).
//!
//! 2. **Frame Renderer** (`viewer` module) - Turns a dataset and a frame index
//!    into a chart figure (`chart`), with a cached global y-range, per-simulation
//!    display settings (`profile`) and zoom-preserving redraws.
//!
//! 3. **Monitor view** (`monitor` module) - Render-once panels of the full time
//!    history at fixed monitoring locations.
//!
//! 4. **Page server** (`server` module) - Static assets plus `/api/health`.
//!
//! ## Usage
//!
//! ```bash
//! bloodflow-viewer frame --sim sim1 --index 10
//! bloodflow-viewer scrub --sim health_wk_laxw
//! bloodflow-viewer serve --port 3000
//! ```

pub mod chart;
pub mod config;
pub mod dataset;
pub mod fetcher;
pub mod monitor;
pub mod profile;
pub mod server;
pub mod viewer;

pub use chart::{ChartSurface, Figure, RecordingChart};
pub use dataset::SimulationDataset;
pub use fetcher::{DatasetSource, FetchError, HttpFetcher};
pub use viewer::Viewer;
