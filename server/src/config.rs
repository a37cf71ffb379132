use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Server settings, read from the environment (`HOST`, `PORT`, ...).
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Accept websocket upgrades from any origin.
    #[serde(default)]
    pub cors_permissive: bool,

    /// Capacity of each connection's outbound channel.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Directory served as static files; its `index.html` answers every unknown path.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

impl ServerConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, Self>(vars).map_err(ConfigError::EnvError)?;
        if config.channel_capacity == 0 {
            return Err(ConfigError::Invalid("CHANNEL_CAPACITY must be positive".into()));
        }
        Ok(config)
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn index_file(&self) -> PathBuf {
        Path::new(&self.static_dir).join("index.html")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    EnvError(envy::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EnvError(e) => write!(f, "environment variable error: {}", e),
            ConfigError::Invalid(reason) => write!(f, "invalid configuration: {}", reason),
        }
    }
}

impl std::error::Error for ConfigError {}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_channel_capacity() -> usize {
    64
}

fn default_static_dir() -> String {
    "public".to_string()
}
