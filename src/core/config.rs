//! Configuration - Type-safe, validated config
//!
//! Loaded from `config.toml` (or the file named by `HFT_CONFIG`). The
//! network endpoints can be overridden from the environment, which is how
//! the test exchange wires ports: `CLIENT_IN_PORT`, `EXCHANGE_IN_PORT` and
//! `RESPONSE_HOST`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::{Error, Result};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Datagram endpoints
    #[serde(default)]
    pub network: NetworkConfig,

    /// Session-level replies
    #[serde(default)]
    pub session: SessionConfig,

    /// Mean-reversion signal
    #[serde(default)]
    pub strategy: StrategyConfig,

    /// Order book
    #[serde(default)]
    pub book: BookConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Host to bind the inbound socket on
    #[serde(default = "default_listen_host")]
    pub listen_host: String,

    /// Inbound port (`CLIENT_IN_PORT`)
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Host replies and orders are sent to (`RESPONSE_HOST`)
    #[serde(default = "default_response_host")]
    pub response_host: String,

    /// Port replies and orders are sent to (`EXCHANGE_IN_PORT`)
    #[serde(default = "default_response_port")]
    pub response_port: u16,

    /// Receive timeout; bounds how long shutdown can take
    #[serde(default = "default_recv_timeout_ms")]
    pub recv_timeout_ms: u64,

    /// Largest datagram accepted, in bytes
    #[serde(default = "default_max_datagram")]
    pub max_datagram: usize,
}

fn default_listen_host() -> String {
    "0.0.0.0".to_string()
}
fn default_listen_port() -> u16 {
    9999
}
fn default_response_host() -> String {
    "127.0.0.1".to_string()
}
fn default_response_port() -> u16 {
    9998
}
fn default_recv_timeout_ms() -> u64 {
    250
}
fn default_max_datagram() -> usize {
    4096
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            listen_host: default_listen_host(),
            listen_port: default_listen_port(),
            response_host: default_response_host(),
            response_port: default_response_port(),
            recv_timeout_ms: default_recv_timeout_ms(),
            max_datagram: default_max_datagram(),
        }
    }
}

impl NetworkConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.listen_host, self.listen_port)
    }

    pub fn response_addr(&self) -> String {
        format!("{}:{}", self.response_host, self.response_port)
    }

    pub fn recv_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.recv_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// HeartBtInt (108) advertised in the Logon reply, seconds
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_secs: u32,

    /// BeginString (8) stamped on outbound messages
    #[serde(default = "default_begin_string")]
    pub begin_string: String,
}

fn default_heartbeat_interval() -> u32 {
    30
}
fn default_begin_string() -> String {
    "FIX.4.4".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_secs: default_heartbeat_interval(),
            begin_string: default_begin_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Evaluations spent calibrating the mean before any order is sent
    #[serde(default = "default_warmup_window")]
    pub warmup_window: u32,

    /// EMA smoothing factor, in (0, 1)
    #[serde(default = "default_smoothing_factor")]
    pub smoothing_factor: f64,

    /// Relative deviation from the mean that triggers an order (0.005 = 0.5%)
    #[serde(default = "default_deviation_threshold")]
    pub deviation_threshold: f64,

    /// Fixed quantity of every order sent
    #[serde(default = "default_order_qty")]
    pub order_qty: u64,
}

fn default_warmup_window() -> u32 {
    20
}
fn default_smoothing_factor() -> f64 {
    0.1
}
fn default_deviation_threshold() -> f64 {
    0.005
}
fn default_order_qty() -> u64 {
    10
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            warmup_window: default_warmup_window(),
            smoothing_factor: default_smoothing_factor(),
            deviation_threshold: default_deviation_threshold(),
            order_qty: default_order_qty(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookConfig {
    /// Instrument this book tracks
    #[serde(default = "default_symbol")]
    pub symbol: String,

    /// Rest our own outbound orders in the book
    #[serde(default)]
    pub rest_own_orders: bool,
}

fn default_symbol() -> String {
    "TEST".to_string()
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            rest_own_orders: false,
        }
    }
}

impl Config {
    /// Load from TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `HFT_CONFIG` or `config.toml`, falling back to defaults
    /// when no file exists, then apply environment overrides.
    pub fn load_default() -> Result<Self> {
        let path = std::env::var("HFT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        let mut config = if path.exists() {
            tracing::info!("Loaded config from {}", path.display());
            Self::load(&path)?
        } else {
            tracing::warn!("No config at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Override network endpoints from `CLIENT_IN_PORT`, `EXCHANGE_IN_PORT`
    /// and `RESPONSE_HOST`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("CLIENT_IN_PORT") {
            self.network.listen_port = parse_port("CLIENT_IN_PORT", &port)?;
        }
        if let Some(port) = lookup("EXCHANGE_IN_PORT") {
            self.network.response_port = parse_port("EXCHANGE_IN_PORT", &port)?;
        }
        if let Some(host) = lookup("RESPONSE_HOST") {
            self.network.response_host = host;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let s = &self.strategy;
        if !(s.smoothing_factor > 0.0 && s.smoothing_factor < 1.0) {
            return Err(Error::Config(format!(
                "smoothing_factor must be in (0, 1), got {}",
                s.smoothing_factor
            )));
        }
        if !(s.deviation_threshold > 0.0 && s.deviation_threshold < 1.0) {
            return Err(Error::Config(format!(
                "deviation_threshold must be in (0, 1), got {}",
                s.deviation_threshold
            )));
        }
        if s.order_qty == 0 {
            return Err(Error::Config("order_qty must be positive".to_string()));
        }
        if self.network.recv_timeout_ms == 0 {
            return Err(Error::Config("recv_timeout_ms must be positive".to_string()));
        }
        if self.network.max_datagram == 0 {
            return Err(Error::Config("max_datagram must be positive".to_string()));
        }
        if self.book.symbol.trim().is_empty() {
            return Err(Error::Config("book.symbol must not be empty".to_string()));
        }
        Ok(())
    }
}

fn parse_port(key: &str, value: &str) -> Result<u16> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} must be a port number, got {:?}", key, value)))
}
