// Server configuration.
//
// `ServerConfig` has sensible defaults for every field and can be loaded
// from a JSON file; missing keys fall back to the defaults. The binary
// (`main.rs`) applies command-line overrides on top and then calls
// `validate()`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use four_in_a_row_game::{DEFAULT_COLUMNS, DEFAULT_ROWS};
use four_in_a_row_protocol::DEFAULT_PORT;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Widest board a one-byte column number can address.
pub const MAX_COLUMNS: usize = u8::MAX as usize + 1;

/// Tallest board the server will host.
pub const MAX_ROWS: usize = 256;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("board must have at least one column and one row (got {columns} x {rows})")]
    EmptyBoard { columns: usize, rows: usize },
    #[error("board has {0} columns; at most 256 fit in a move frame")]
    TooManyColumns(usize),
    #[error("board has {0} rows; at most 256 are supported")]
    TooManyRows(usize),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to listen on.
    pub bind_address: String,
    /// Listen port; 0 lets the OS pick one.
    pub port: u16,
    pub columns: usize,
    pub rows: usize,
    /// How long the dispatch loop sleeps when no session had anything to do.
    pub idle_poll_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".into(),
            port: DEFAULT_PORT,
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
            idle_poll_ms: 1,
        }
    }
}

impl ServerConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(ConfigError::EmptyBoard {
                columns: self.columns,
                rows: self.rows,
            });
        }
        if self.columns > MAX_COLUMNS {
            return Err(ConfigError::TooManyColumns(self.columns));
        }
        if self.rows > MAX_ROWS {
            return Err(ConfigError::TooManyRows(self.rows));
        }
        Ok(())
    }

    /// `bind_address:port`, ready for `TcpListener::bind`.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.port, 46841);
        assert_eq!((config.columns, config.rows), (7, 6));
        assert_eq!(config.listen_addr(), "127.0.0.1:46841");
    }

    #[test]
    fn default_config_serializes() {
        let json = serde_json::to_string(&ServerConfig::default()).unwrap();
        let back = ServerConfig::from_json(&json).unwrap();
        assert_eq!(back, ServerConfig::default());
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config = ServerConfig::from_json(r#"{"port": 0, "columns": 9}"#).unwrap();
        assert_eq!(config.port, 0);
        assert_eq!(config.columns, 9);
        assert_eq!(config.rows, 6);
        assert_eq!(config.bind_address, "127.0.0.1");
    }

    #[test]
    fn rejects_empty_board() {
        let err = ServerConfig::from_json(r#"{"rows": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyBoard { columns: 7, rows: 0 }));
    }

    #[test]
    fn rejects_unaddressable_columns() {
        let err = ServerConfig::from_json(r#"{"columns": 257}"#).unwrap_err();
        assert!(matches!(err, ConfigError::TooManyColumns(257)));
        assert!(ServerConfig::from_json(r#"{"columns": 256}"#).is_ok());
    }

    #[test]
    fn rejects_oversized_rows() {
        let err =
            ServerConfig::from_json(r#"{"columns": 256, "rows": 72057594037927936}"#).unwrap_err();
        assert!(matches!(err, ConfigError::TooManyRows(72057594037927936)));
        assert!(ServerConfig::from_json(r#"{"columns": 256, "rows": 256}"#).is_ok());
    }

    #[test]
    fn rejects_bad_json() {
        let err = ServerConfig::from_json("{port: }").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ServerConfig::load(Path::new("/definitely/not/here.json")).unwrap_err();
        match err {
            ConfigError::Read { path, .. } => {
                assert_eq!(path, PathBuf::from("/definitely/not/here.json"));
            }
            other => panic!("expected Read error, got {other:?}"),
        }
    }
}
