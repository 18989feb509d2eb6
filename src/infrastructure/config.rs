use crate::domain::fountain::DEFAULT_TARGET;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError};
use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub store: StoreSettings,
    pub security: SecuritySettings,
    pub projection: ProjectionSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreSettings {
    /// Postgres connection string; without one the store lives in memory
    pub database_url: Option<String>,
    pub max_connections: u32,
    /// CSV of `timestamp,value` lines loaded into an empty store
    pub seed_path: Option<String>,
    pub seed_fountain: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SecuritySettings {
    pub delete_password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProjectionSettings {
    pub default_target: f64,
}

fn with_defaults(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("store.max_connections", 5)?
        .set_default("store.seed_fountain", "Main")?
        .set_default("security.delete_password", "fountain")?
        .set_default("projection.default_target", DEFAULT_TARGET)
}

/// Defaults, then `config/app.*` if present, then `FOUNTAIN__SECTION__KEY` variables.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = with_defaults(config::Config::builder())?
        .add_source(config::File::with_name("config/app").required(false))
        .add_source(
            config::Environment::with_prefix("FOUNTAIN")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: AppConfig = with_defaults(config::Config::builder())
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.security.delete_password, "fountain");
        assert_eq!(config.projection.default_target, 30000.0);
        assert_eq!(config.store.seed_fountain, "Main");
        assert!(config.store.seed_path.is_none());
        assert!(config.store.database_url.is_none());
        assert_eq!(config.store.max_connections, 5);
        assert_eq!(
            config.server.socket_addr().unwrap(),
            "0.0.0.0:8080".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_overrides_apply_over_defaults() {
        let config: AppConfig = with_defaults(config::Config::builder())
            .unwrap()
            .set_override("server.port", 9000)
            .unwrap()
            .set_override("store.database_url", "postgres://localhost/water-observation")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(
            config.store.database_url.as_deref(),
            Some("postgres://localhost/water-observation")
        );
        assert_eq!(config.security.delete_password, "fountain");
    }
}
