// config.rs
use crate::data_loader::DataSource;
use crate::error::OracleError;

use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub data_url: Option<String>,
    pub api_key: Option<String>,
    pub log_config: PathBuf,
    pub interactive: bool,
    pub seed: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self, OracleError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, OracleError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let host = non_empty("ORACLE_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = match non_empty("ORACLE_PORT") {
            Some(raw) => raw.parse().map_err(|_| OracleError::Config {
                message: format!("ORACLE_PORT must be a port number, got '{}'", raw),
            })?,
            None => 8080,
        };
        let interactive = match non_empty("ORACLE_INTERACTIVE") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| OracleError::Config {
                message: format!("ORACLE_INTERACTIVE must be true or false, got '{}'", raw),
            })?,
            None => false,
        };
        let seed = match non_empty("ORACLE_SEED") {
            Some(raw) => Some(raw.parse().map_err(|_| OracleError::Config {
                message: format!("ORACLE_SEED must be an unsigned integer, got '{}'", raw),
            })?),
            None => None,
        };

        Ok(Self {
            host,
            port,
            data_dir: PathBuf::from(non_empty("ORACLE_DATA_DIR").unwrap_or_else(|| "data".to_string())),
            data_url: non_empty("ORACLE_DATA_URL"),
            api_key: non_empty("API_KEY"),
            log_config: PathBuf::from(non_empty("LOG4RS_CONFIG").unwrap_or_else(|| "log4rs.yaml".to_string())),
            interactive,
            seed,
        })
    }

    /// A configured URL wins over the local data directory.
    pub fn data_source(&self) -> DataSource {
        match &self.data_url {
            Some(url) => DataSource::Remote(url.clone()),
            None => DataSource::Directory(self.data_dir.clone()),
        }
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
