use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use url::Url;

pub const DEFAULT_CATALOG_PATH: &str = "data/source/client_data.csv";
pub const DEFAULT_ID_COLUMN: &str = "num__SK_ID_CURR";
pub const DEFAULT_GATEWAY_BASE_URL: &str = "http://127.0.0.1:5002";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the dashboard.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub dashboard: DashboardConfig,
    pub gateway: GatewayConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let catalog_path = env::var("DASHBOARD_CATALOG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CATALOG_PATH));
        let id_column =
            env::var("DASHBOARD_ID_COLUMN").unwrap_or_else(|_| DEFAULT_ID_COLUMN.to_string());
        let session_idle_minutes = env::var("DASHBOARD_SESSION_IDLE_MINUTES")
            .unwrap_or_else(|_| "60".to_string())
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidSessionIdle)?;

        let base_url = GatewayConfig::parse_base_url(
            &env::var("SCORING_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GATEWAY_BASE_URL.to_string()),
        )?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            dashboard: DashboardConfig {
                catalog_path,
                id_column,
                session_idle_minutes,
            },
            gateway: GatewayConfig { base_url },
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where the client catalog lives and how sessions age out.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub catalog_path: PathBuf,
    pub id_column: String,
    pub session_idle_minutes: u32,
}

impl DashboardConfig {
    pub fn session_idle(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.session_idle_minutes))
    }
}

/// Remote scoring service location.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: Url,
}

impl GatewayConfig {
    pub fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
        let url = Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidGatewayUrl {
            value: raw.to_string(),
            source,
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            _ => Err(ConfigError::UnsupportedGatewayScheme {
                value: raw.to_string(),
            }),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidSessionIdle,
    InvalidGatewayUrl { value: String, source: url::ParseError },
    UnsupportedGatewayScheme { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidSessionIdle => {
                write!(f, "DASHBOARD_SESSION_IDLE_MINUTES must be a whole number of minutes")
            }
            ConfigError::InvalidGatewayUrl { value, .. } => {
                write!(f, "SCORING_API_BASE_URL '{}' is not a valid URL", value)
            }
            ConfigError::UnsupportedGatewayScheme { value } => {
                write!(f, "SCORING_API_BASE_URL '{}' must use http or https", value)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidGatewayUrl { source, .. } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidSessionIdle
            | ConfigError::UnsupportedGatewayScheme { .. } => None,
        }
    }
}
