//! Startup configuration for the viewer and the page server.
//!
//! The backend base URL is resolved once when the process starts and then
//! injected into the fetcher. Nothing below re-reads the environment.

use std::path::PathBuf;

/// Development backend used when the pages are served from the local machine.
pub const BACKEND_LOCAL: &str = "http://localhost:8000";

/// Hosted backend used everywhere else.
pub const BACKEND_PRODUCTION: &str = "https://blood-flow-backend.onrender.com";

/// Default port for the page server when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 3000;

/// Where the viewer is running, as far as backend selection is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Local,
    #[default]
    Production,
}

impl Environment {
    /// Classify a host name. Loopback names are local, everything else is production.
    pub fn detect(host: &str) -> Self {
        let host = host.trim().trim_start_matches('[').trim_end_matches(']');
        match host {
            "localhost" | "127.0.0.1" | "::1" => Environment::Local,
            _ => Environment::Production,
        }
    }

    /// Backend base URL for this environment.
    pub fn default_backend(&self) -> &'static str {
        match self {
            Environment::Local => BACKEND_LOCAL,
            Environment::Production => BACKEND_PRODUCTION,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub base_url: String,
}

impl BackendConfig {
    /// Resolve the backend URL.
    ///
    /// An explicit override wins; otherwise the environment picks between the
    /// local and hosted backends. Trailing slashes are trimmed so endpoint paths
    /// can be appended directly.
    pub fn resolve(override_url: Option<&str>, environment: Environment) -> Self {
        let base = match override_url.map(str::trim) {
            Some(url) if !url.is_empty() => url,
            _ => environment.default_backend(),
        };
        Self {
            base_url: base.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::resolve(None, Environment::default())
    }
}

/// Page server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Asset directory. When unset the server probes the usual locations.
    pub static_dir: Option<PathBuf>,
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            static_dir: None,
            open_browser: false,
        }
    }
}
