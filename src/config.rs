//! Units and runtime settings.

/// Internal length units per meter. Piece and roll dimensions are hundredths of a meter.
pub const UNITS_PER_METER: u32 = 100;

/// Tolerance for comparing remaining batch lengths, in meters.
pub const LENGTH_EPS: f64 = 1e-10;

/// Upper bound on the cells of one packed roll (roll width x used length).
pub const MAX_ROLL_CELLS: u64 = 1 << 24;

pub const DEFAULT_PORT: &str = "3001";
pub const DEFAULT_LOG_FILE: &str = "development.log";

pub fn units_to_meters(units: u32) -> f64 {
    units as f64 / UNITS_PER_METER as f64
}

/// Settings for the HTTP server, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: String,
    pub log_file: String,
    pub sentry_dsn: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            port: lookup("PORT").unwrap_or_else(|| DEFAULT_PORT.to_string()),
            log_file: lookup("LOG_FILE").unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()),
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
        }
    }

    pub fn addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units_to_meters() {
        assert_eq!(units_to_meters(250), 2.5);
        assert_eq!(units_to_meters(0), 0.0);
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(|_| None);
        assert_eq!(config.addr(), "0.0.0.0:3001");
        assert_eq!(config.log_file, "development.log");
        assert_eq!(config.sentry_dsn, None);
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(|key| match key {
            "PORT" => Some("8080".to_string()),
            "SENTRY_DSN" => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.port, "8080");
        assert_eq!(config.sentry_dsn, None);
    }
}
