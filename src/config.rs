//! Server configuration
//!
//! Built once at startup from the environment (`SECRET_KEY`), an optional
//! TOML file and command line overrides, then shared read-only with every
//! request handler.

use std::fmt;
use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use log::warn;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::ffi::FfiSource;
use crate::parser::{PolylineSource, SvgParser, DEFAULT_TOLERANCE};

/// Upper bound for request bodies and uploads
pub const MAX_CONTENT_LENGTH: usize = 16 * 1024 * 1024;

pub const DEFAULT_BIND: &str = "127.0.0.1:5000";

/// Environment variable holding the secret key
pub const SECRET_KEY_VAR: &str = "SECRET_KEY";

/// The application secret. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(String);

impl SecretKey {
    /// Wrap a key; an absent or empty value is a startup error
    pub fn from_value(value: Option<String>) -> Result<Self, ConfigError> {
        match value {
            Some(key) if !key.is_empty() => Ok(Self(key)),
            _ => Err(ConfigError::MissingSecretKey),
        }
    }

    /// Read the key from the `SECRET_KEY` environment variable
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_value(std::env::var(SECRET_KEY_VAR).ok())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(****)")
    }
}

/// Which [`PolylineSource`] serves requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParserBackend {
    /// Call the Rust parser directly
    #[default]
    Builtin,
    /// Go through the C ABI
    Ffi,
}

impl FromStr for ParserBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "builtin" => Ok(Self::Builtin),
            "ffi" => Ok(Self::Ffi),
            _ => Err(ConfigError::UnknownParser(s.to_string())),
        }
    }
}

/// TOML structure for deserializing config files
#[derive(Deserialize)]
struct TomlConfig {
    server: Option<TomlServer>,
    parser: Option<TomlParser>,
}

#[derive(Deserialize)]
struct TomlServer {
    bind: Option<String>,
}

#[derive(Deserialize)]
struct TomlParser {
    backend: Option<String>,
    tolerance: Option<f64>,
}

/// Configuration for the web server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the listener binds to
    pub bind: SocketAddr,

    pub secret_key: SecretKey,

    pub parser: ParserBackend,

    /// Flattening tolerance for the built-in parser
    pub tolerance: f64,

    /// Request body limit in bytes
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    /// Create a configuration with default values
    pub fn new(secret_key: SecretKey) -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
            secret_key,
            parser: ParserBackend::default(),
            tolerance: DEFAULT_TOLERANCE,
            max_upload_bytes: MAX_CONTENT_LENGTH,
        }
    }

    /// Load from the environment and an optional config file
    pub fn from_env(file: Option<&Path>) -> Result<Self, ConfigError> {
        let secret_key = SecretKey::from_env()?;
        match file {
            Some(path) => Self::from_file(secret_key, path),
            None => Ok(Self::new(secret_key)),
        }
    }

    /// Load settings from a TOML file
    pub fn from_file(secret_key: SecretKey, path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(secret_key, &content)
    }

    /// Load settings from a TOML string
    pub fn from_toml_str(secret_key: SecretKey, content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;
        let mut config = Self::new(secret_key);

        if let Some(bind) = parsed.server.and_then(|s| s.bind) {
            config = config.with_bind_str(&bind)?;
        }
        if let Some(parser) = parsed.parser {
            if let Some(backend) = parser.backend {
                config.parser = backend.parse()?;
            }
            if let Some(tolerance) = parser.tolerance {
                config = config.with_tolerance(tolerance)?;
            }
        }
        Ok(config)
    }

    /// Set the bind address
    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    /// Set the bind address from its string form
    pub fn with_bind_str(self, bind: &str) -> Result<Self, ConfigError> {
        let addr = bind
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddress(bind.to_string()))?;
        Ok(self.with_bind(addr))
    }

    /// Set the parser backend
    pub fn with_parser(mut self, parser: ParserBackend) -> Self {
        self.parser = parser;
        self
    }

    /// Set the flattening tolerance; must be positive and finite
    pub fn with_tolerance(mut self, tolerance: f64) -> Result<Self, ConfigError> {
        if !(tolerance.is_finite() && tolerance > 0.0) {
            return Err(ConfigError::InvalidTolerance(tolerance));
        }
        self.tolerance = tolerance;
        Ok(self)
    }

    /// Build the polyline source selected by this configuration
    pub fn polyline_source(&self) -> Arc<dyn PolylineSource> {
        match self.parser {
            ParserBackend::Builtin => Arc::new(SvgParser::new().with_tolerance(self.tolerance)),
            ParserBackend::Ffi => {
                if self.tolerance != DEFAULT_TOLERANCE {
                    warn!(
                        "The ffi parser always uses tolerance {}, ignoring {}",
                        DEFAULT_TOLERANCE, self.tolerance
                    );
                }
                Arc::new(FfiSource)
            }
        }
    }
}
