use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// =============================================================================
// Configuration (figment-deserialized from defaults / config.toml / env vars)
// =============================================================================
//
// Layered lowest to highest: defaults → config.toml → env vars → CLI flags.
//
//   config.toml:     [server]
//                    port = 9000
//
//   env var:         TAILVIEW_SERVER__PORT=9000   (double underscore = nesting)

/// Top-level tunable configuration, deserialized by figment.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerFileConfig,
    #[serde(default)]
    pub viewport: ViewportFileConfig,
}

/// Server coordinates (lives under `[server]` in config.toml).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerFileConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub tls: bool,
}

impl Default for ServerFileConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            tls: false,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Display buffer tuning (lives under `[viewport]` in config.toml).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ViewportFileConfig {
    #[serde(default = "default_soft_cap_bytes")]
    pub soft_cap_bytes: usize,
}

impl Default for ViewportFileConfig {
    fn default() -> Self {
        Self {
            soft_cap_bytes: default_soft_cap_bytes(),
        }
    }
}

fn default_soft_cap_bytes() -> usize {
    5_242_080
}

/// Build the layered figment. `config_path` overrides the default file
/// location; a missing file is fine.
pub fn load_config(config_path: Option<&Path>) -> figment::Figment {
    use figment::{
        Figment,
        providers::{Env, Format, Serialized, Toml},
    };

    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);

    Figment::from(Serialized::defaults(FileConfig::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("TAILVIEW_").split("__"))
}

/// `<config dir>/tailview/config.toml`.
fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tailview")
        .join("config.toml")
}

/// Connection flags accepted on the command line; the highest layer.
#[derive(Clone, Debug, Default)]
pub struct CliOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub tls: bool,
}

/// Resolved runtime view of the configuration.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub tls: bool,
    pub soft_cap_bytes: usize,
}

impl ClientConfig {
    /// Extract the file/env layers and apply CLI overrides on top.
    pub fn resolve(figment: &figment::Figment, overrides: &CliOverrides) -> Result<Self> {
        let file: FileConfig = figment.extract().context("invalid configuration")?;
        Ok(Self {
            host: overrides.host.clone().unwrap_or(file.server.host),
            port: overrides.port.unwrap_or(file.server.port),
            tls: overrides.tls || file.server.tls,
            soft_cap_bytes: file.viewport.soft_cap_bytes,
        })
    }

    /// WebSocket base URI, `ws://host:port` or `wss://host:port`.
    pub fn ws_base(&self) -> String {
        let scheme = if self.tls { "wss" } else { "ws" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }
}
