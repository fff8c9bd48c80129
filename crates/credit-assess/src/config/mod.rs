use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::assessment::import::{load_scorecard, InputImportError};
use crate::assessment::{PolicyThresholds, Scorecard};

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

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub policy: PolicyThresholds,
    /// JSON scorecard replacing the standard one when set.
    pub scorecard_path: Option<PathBuf>,
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

        let defaults = PolicyThresholds::default();
        let policy = PolicyThresholds {
            max_debt_burden_ratio: threshold(
                "CREDIT_MAX_DEBT_BURDEN_RATIO",
                defaults.max_debt_burden_ratio,
            )?,
            max_loan_to_value: threshold("CREDIT_MAX_LOAN_TO_VALUE", defaults.max_loan_to_value)?,
            min_debt_service_coverage: threshold(
                "CREDIT_MIN_DSCR",
                defaults.min_debt_service_coverage,
            )?,
            min_current_ratio: threshold("CREDIT_MIN_CURRENT_RATIO", defaults.min_current_ratio)?,
            min_cash_flow_stability: threshold(
                "CREDIT_MIN_CASH_FLOW_STABILITY",
                defaults.min_cash_flow_stability,
            )?,
            max_age_at_maturity: threshold(
                "CREDIT_MAX_AGE_AT_MATURITY",
                defaults.max_age_at_maturity,
            )?,
        };

        let scorecard_path = env::var("CREDIT_SCORECARD_PATH")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            policy,
            scorecard_path,
        })
    }

    /// The configured scorecard, or the standard one when no path is set.
    pub fn scorecard(&self) -> Result<Scorecard, ConfigError> {
        match &self.scorecard_path {
            Some(path) => load_scorecard(path).map_err(|source| ConfigError::Scorecard {
                path: path.clone(),
                source,
            }),
            None => Ok(Scorecard::standard()),
        }
    }
}

fn threshold(key: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite() && *value >= 0.0)
            .ok_or(ConfigError::InvalidThreshold { key }),
        Err(_) => Ok(default),
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

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    InvalidThreshold {
        key: &'static str,
    },
    Scorecard {
        path: PathBuf,
        source: InputImportError,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidThreshold { key } => {
                write!(f, "{key} must be a non-negative number")
            }
            ConfigError::Scorecard { path, .. } => {
                write!(f, "unable to load scorecard from {}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidThreshold { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::Scorecard { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "CREDIT_MAX_DEBT_BURDEN_RATIO",
            "CREDIT_MAX_LOAN_TO_VALUE",
            "CREDIT_MIN_DSCR",
            "CREDIT_MIN_CURRENT_RATIO",
            "CREDIT_MIN_CASH_FLOW_STABILITY",
            "CREDIT_MAX_AGE_AT_MATURITY",
            "CREDIT_SCORECARD_PATH",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.policy, PolicyThresholds::default());
        assert!(config.scorecard_path.is_none());
        assert_eq!(config.scorecard().expect("standard scorecard"), Scorecard::standard());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
    }

    #[test]
    fn policy_thresholds_read_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CREDIT_MAX_DEBT_BURDEN_RATIO", "45");
        env::set_var("CREDIT_MIN_DSCR", " 1.5 ");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.policy.max_debt_burden_ratio, 45.0);
        assert_eq!(config.policy.min_debt_service_coverage, 1.5);
        assert_eq!(config.policy.max_loan_to_value, 80.0);
        reset_env();
    }

    #[test]
    fn rejects_unparsable_threshold() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CREDIT_MAX_LOAN_TO_VALUE", "eighty");
        let error = AppConfig::load().unwrap_err();
        assert!(matches!(
            error,
            ConfigError::InvalidThreshold {
                key: "CREDIT_MAX_LOAN_TO_VALUE"
            }
        ));
        reset_env();
    }

    #[test]
    fn missing_scorecard_file_is_reported() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CREDIT_SCORECARD_PATH", "/nonexistent/scorecard.json");
        let config = AppConfig::load().expect("config loads");
        let error = config.scorecard().unwrap_err();
        assert!(matches!(error, ConfigError::Scorecard { .. }));
        assert!(error.to_string().contains("/nonexistent/scorecard.json"));
        reset_env();
    }
}
