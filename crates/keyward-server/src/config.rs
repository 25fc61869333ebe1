use keyward_auth::config::IssuerConfig;
use keyward_auth::types::Scope;
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, net::SocketAddr, time::Duration};
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Token issuance settings
    #[serde(default)]
    pub oauth: IssuerConfig,
    /// In-memory store housekeeping
    #[serde(default)]
    pub storage: StorageConfig,
    /// Clients and resource owners registered at startup
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        // Server validations
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        if self.server.body_limit_bytes == 0 {
            return Err("server.body_limit_bytes must be > 0".into());
        }
        // Logging validation
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        // OAuth validation
        self.oauth
            .validate()
            .map_err(|e| format!("oauth config error: {e}"))?;
        if self.storage.purge_interval.is_zero() {
            return Err("storage.purge_interval must be > 0".into());
        }
        // Bootstrap validation
        let mut seen = HashSet::new();
        for client in &self.bootstrap.clients {
            if client.id.is_empty() {
                return Err("bootstrap.clients[].id must not be empty".into());
            }
            if client.id.contains(':') {
                return Err(format!(
                    "bootstrap client '{}': id must not contain ':'",
                    client.id
                ));
            }
            if client.secret.is_empty() {
                return Err(format!("bootstrap client '{}': secret must not be empty", client.id));
            }
            if !seen.insert(client.id.as_str()) {
                return Err(format!("bootstrap client '{}' is defined twice", client.id));
            }
        }
        for owner in &self.bootstrap.resource_owners {
            if owner.username.is_empty() || owner.password.is_empty() {
                return Err("bootstrap.resource_owners[] requires username and password".into());
            }
        }
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        use std::net::{IpAddr, Ipv4Addr};
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Largest accepted request body; token requests are small forms.
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8080
}
fn default_body_limit() -> usize {
    64 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "info".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// How often used, expired and revoked records are dropped.
    #[serde(default = "default_purge_interval", with = "humantime_serde")]
    pub purge_interval: Duration,
}

fn default_purge_interval() -> Duration {
    Duration::from_secs(300)
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            purge_interval: default_purge_interval(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BootstrapConfig {
    #[serde(default)]
    pub clients: Vec<ClientSeed>,
    #[serde(default)]
    pub resource_owners: Vec<ResourceOwnerSeed>,
}

/// A client registered on startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSeed {
    pub id: String,
    pub secret: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub redirect_url: Url,
    #[serde(default)]
    pub homepage_url: Option<Url>,
    #[serde(default)]
    pub profile_image_url: Option<Url>,
    /// Scopes the client may be granted.
    #[serde(default)]
    pub scopes: Vec<Scope>,
}

/// A resource owner for the password grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceOwnerSeed {
    pub username: String,
    pub password: String,
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        let pathbuf = PathBuf::from(path.unwrap_or("keyward.toml"));
        if pathbuf.exists() {
            builder = builder.add_source(File::from(pathbuf));
        }
        // Environment variable overrides, e.g., KEYWARD__SERVER__PORT=9090
        builder = builder.add_source(
            Environment::with_prefix("KEYWARD")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}
