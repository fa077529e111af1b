use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Serialize;

/// Application-level constants
pub const APP_NAME: &str = "Wardline";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_ADDR: &str = "127.0.0.1:8080";

/// ~/Wardline/ on all platforms.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

pub fn default_database_path() -> PathBuf {
    app_data_dir().join("wardline.db")
}

/// Default `tracing` filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "wardline_lib=info,wardline=info,tower_http=warn"
}

/// Bed capacity used by occupancy and alert computations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CapacityConfig {
    pub beds_per_department: u32,
    pub hospital_beds: u32,
    /// Occupancy fraction above which a capacity alert fires.
    pub alert_threshold: f64,
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            beds_per_department: 50,
            hospital_beds: 200,
            alert_threshold: 0.9,
        }
    }
}

/// Server settings, from `WARDLINE_DB` and `WARDLINE_ADDR`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_path: PathBuf,
    pub addr: SocketAddr,
    pub capacity: CapacityConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_vars(
            std::env::var("WARDLINE_DB").ok(),
            std::env::var("WARDLINE_ADDR").ok(),
        )
    }

    fn from_vars(db: Option<String>, addr: Option<String>) -> Result<Self, String> {
        let database_path = db
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path);
        let raw_addr = addr.unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = raw_addr
            .parse()
            .map_err(|e| format!("invalid WARDLINE_ADDR '{raw_addr}': {e}"))?;
        Ok(Self {
            database_path,
            addr,
            capacity: CapacityConfig::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_named_after_app() {
        assert!(app_data_dir().ends_with("Wardline"));
        assert!(default_database_path().starts_with(app_data_dir()));
    }

    #[test]
    fn capacity_defaults() {
        let cap = CapacityConfig::default();
        assert_eq!(cap.beds_per_department, 50);
        assert_eq!(cap.hospital_beds, 200);
        assert_eq!(cap.alert_threshold, 0.9);
    }

    #[test]
    fn server_config_defaults_and_overrides() {
        let cfg = ServerConfig::from_vars(None, None).unwrap();
        assert_eq!(cfg.addr.to_string(), DEFAULT_ADDR);
        assert_eq!(cfg.database_path, default_database_path());

        let cfg = ServerConfig::from_vars(Some("/tmp/w.db".into()), Some("0.0.0.0:9000".into())).unwrap();
        assert_eq!(cfg.database_path, PathBuf::from("/tmp/w.db"));
        assert_eq!(cfg.addr.port(), 9000);

        assert!(ServerConfig::from_vars(None, Some("nope".into())).is_err());
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, env!("CARGO_PKG_VERSION"));
    }
}
