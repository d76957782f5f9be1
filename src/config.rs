use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::sources::types::{SheetCredentials, SheetParams, DEFAULT_SHEETS_API_BASE, DEFAULT_SHEET_RANGE};

pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_API_URL: &str = "http://localhost:4000";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;

/// Backend settings, read from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub sheet: SheetParams,
    pub credentials: Option<SheetCredentials>,
    pub fixture: Option<PathBuf>,
}

/// Settings for talking to the backend
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub fetch_timeout: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind = env::var("RENTAL_SCOUT_BIND").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = parse_env("RENTAL_SCOUT_PORT", DEFAULT_PORT)?;

        let sheet = SheetParams {
            spreadsheet_id: env::var("SPREADSHEET_ID").unwrap_or_default(),
            range: env::var("SHEET_RANGE").unwrap_or_else(|_| DEFAULT_SHEET_RANGE.to_string()),
            api_base: env::var("SHEETS_API_BASE")
                .unwrap_or_else(|_| DEFAULT_SHEETS_API_BASE.to_string()),
        };

        let credentials = match (non_empty("GOOGLE_ACCESS_TOKEN"), non_empty("GOOGLE_API_KEY")) {
            (Some(token), _) => Some(SheetCredentials::BearerToken(token)),
            (None, Some(key)) => Some(SheetCredentials::ApiKey(key)),
            (None, None) => None,
        };

        let fixture = non_empty("RENTAL_SCOUT_FIXTURE").map(PathBuf::from);

        Ok(Self {
            bind,
            port,
            sheet,
            credentials,
            fixture,
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    /// Spreadsheet id and credentials, when both are configured.
    pub fn sheet_access(&self) -> Option<(SheetParams, SheetCredentials)> {
        if self.sheet.spreadsheet_id.is_empty() {
            return None;
        }
        self.credentials
            .clone()
            .map(|credentials| (self.sheet.clone(), credentials))
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = env::var("RENTAL_SCOUT_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let secs = parse_env("RENTAL_SCOUT_FETCH_TIMEOUT_SECS", DEFAULT_FETCH_TIMEOUT_SECS)?;
        if secs == 0 {
            return Err(ConfigError::Invalid {
                var: "RENTAL_SCOUT_FETCH_TIMEOUT_SECS",
                reason: "timeout must be at least one second".to_string(),
            });
        }

        Ok(Self {
            api_url,
            fetch_timeout: Duration::from_secs(secs),
        })
    }
}

fn non_empty(var: &str) -> Option<String> {
    env::var(var).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(value) => value.trim().parse().map_err(|err: T::Err| ConfigError::Invalid {
            var,
            reason: err.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_env_uses_default_when_unset() {
        let port: u16 = parse_env("RENTAL_SCOUT_TEST_UNSET_PORT", 4000).unwrap();
        assert_eq!(port, 4000);
    }

    #[test]
    fn parse_env_reports_bad_values() {
        env::set_var("RENTAL_SCOUT_TEST_BAD_PORT", "forty");
        let err = parse_env::<u16>("RENTAL_SCOUT_TEST_BAD_PORT", 4000).unwrap_err();
        assert!(err.to_string().contains("RENTAL_SCOUT_TEST_BAD_PORT"));
        env::remove_var("RENTAL_SCOUT_TEST_BAD_PORT");
    }

    #[test]
    fn sheet_access_needs_id_and_credentials() {
        let mut config = ServerConfig {
            bind: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            sheet: SheetParams::default(),
            credentials: Some(SheetCredentials::ApiKey("key".to_string())),
            fixture: None,
        };
        assert!(config.sheet_access().is_none());

        config.sheet.spreadsheet_id = "sheet-123".to_string();
        assert!(config.sheet_access().is_some());

        config.credentials = None;
        assert!(config.sheet_access().is_none());
        assert_eq!(config.address(), "127.0.0.1:4000");
    }
}
