//! HTTP client for the simulation backend.
//!
//! One GET per load, no retries and no timeout: a hung request stays pending
//! and the caller keeps showing its loading state.

use std::future::Future;

use crate::config::BackendConfig;
use crate::dataset::{ArteryPayload, DatasetError, SimulationDataset};

/// Backend endpoints the viewers consume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `GET <base>/simulation/<id>`
    Simulation(String),
    /// `GET <base>/data?name=<id>`
    Data(String),
    /// `GET <base>/<path>`, single-simulation backends without an identifier.
    Fixed(String),
    /// `GET <base>/artery-sim`
    ArterySim,
}

impl Endpoint {
    /// Full URL below `base_url`.
    pub fn url(&self, base_url: &str) -> String {
        let base = base_url.trim_end_matches('/');
        match self {
            Endpoint::Simulation(id) => format!("{}/simulation/{}", base, urlencoding::encode(id)),
            Endpoint::Data(name) => format!("{}/data?name={}", base, urlencoding::encode(name)),
            Endpoint::Fixed(path) => format!("{}/{}", base, path.trim_start_matches('/')),
            Endpoint::ArterySim => format!("{}/artery-sim", base),
        }
    }
}

/// How a simulation identifier maps to an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EndpointStyle {
    /// `/simulation/<id>`
    #[default]
    PathSegment,
    /// `/data?name=<id>`, the multi-simulation selector backend.
    NameQuery,
    /// Always the same path; the identifier only labels the view.
    Fixed(String),
}

impl EndpointStyle {
    pub fn endpoint(&self, simulation_id: &str) -> Endpoint {
        match self {
            EndpointStyle::PathSegment => Endpoint::Simulation(simulation_id.to_string()),
            EndpointStyle::NameQuery => Endpoint::Data(simulation_id.to_string()),
            EndpointStyle::Fixed(path) => Endpoint::Fixed(path.clone()),
        }
    }
}

/// Anything that can produce simulation payloads.
pub trait DatasetSource {
    /// Load the dataset for `simulation_id`.
    fn load(
        &self,
        simulation_id: &str,
    ) -> impl Future<Output = Result<SimulationDataset, FetchError>> + Send;

    /// Load the full-history artery monitor payload.
    fn load_artery(&self) -> impl Future<Output = Result<ArteryPayload, FetchError>> + Send;
}

/// `DatasetSource` backed by the HTTP API.
#[derive(Clone)]
pub struct HttpFetcher {
    backend: BackendConfig,
    style: EndpointStyle,
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher for `/simulation/<id>` backends.
    pub fn new(backend: BackendConfig) -> Result<Self, FetchError> {
        Self::with_style(backend, EndpointStyle::default())
    }

    pub fn with_style(backend: BackendConfig, style: EndpointStyle) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            backend,
            style,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.backend.base_url
    }

    /// GET `url` and return the body of a 2xx response.
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        tracing::info!(url, "Fetching");

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(url, status = status.as_u16(), body = %body, "Backend returned an error");
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.bytes().await.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;
        Ok(body.to_vec())
    }
}

impl DatasetSource for HttpFetcher {
    async fn load(&self, simulation_id: &str) -> Result<SimulationDataset, FetchError> {
        let simulation_id = simulation_id.trim();
        if simulation_id.is_empty() {
            return Err(FetchError::MissingSimulationId);
        }

        let url = self.style.endpoint(simulation_id).url(&self.backend.base_url);
        let body = self.get(&url).await?;
        let dataset = SimulationDataset::from_slice(&body)?;

        tracing::debug!(
            simulation_id,
            frames = dataset.frame_count(),
            points = dataset.space_len(),
            "Decoded simulation"
        );
        Ok(dataset)
    }

    async fn load_artery(&self) -> Result<ArteryPayload, FetchError> {
        let url = Endpoint::ArterySim.url(&self.backend.base_url);
        let body = self.get(&url).await?;
        let payload: ArteryPayload = serde_json::from_slice(&body).map_err(DatasetError::from)?;
        Ok(payload)
    }
}

/// Errors from loading a simulation.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("missing simulation name, e.g. ?sim=sim1")]
    MissingSimulationId,

    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("backend returned HTTP {status}")]
    Status { status: u16, body: String },

    #[error("invalid simulation payload: {0}")]
    Decode(#[from] DatasetError),
}
