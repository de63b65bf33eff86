//! Builds the `AppConfig` with `figment`.
//! Sources, lowest priority first: `config/base.toml`, `config/{environment}.toml`,
//! `APP_`-prefixed environment variables (nested with `__`), `PORT` and `DATABASE_URL`.
//! Gets initialized with `OnceLock` so it only needs to get initialized once.

mod error;
mod types;

use std::{path::Path, sync::OnceLock};

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use tracing::info;

// Re-export config structs
pub use error::{ConfigError, ConfigResult};
pub use types::{
    AppConfig, DbConfig, Environment, NetConfig, PoolConfig, SslRequire, StaticConfig,
};

/// Allocates a static `OnceLock` containing `AppConfig`.
/// This ensures configuration only gets initialized the first time we call this function.
/// Every other caller gets a &'static ref to AppConfig.
/// Panics if anything goes wrong.
pub fn get_or_init_config() -> &'static AppConfig {
    static CONFIG_INIT: OnceLock<AppConfig> = OnceLock::new();
    CONFIG_INIT.get_or_init(|| {
        info!(
            "{:<20} - Initializing the configuration",
            "get_or_init_config"
        );
        load_config().unwrap_or_else(|er| panic!("Fatal Error: Building config: {er}"))
    })
}

/// Reads `APP_ENVIRONMENT` (defaults to `local`) and builds the config from the `config/`
/// directory in the current working directory.
pub fn load_config() -> ConfigResult<AppConfig> {
    let config_dir = std::env::current_dir()?.join("config");
    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()?;

    AppConfig::from_figment(AppConfig::figment(&config_dir, environment))
}

impl AppConfig {
    pub fn figment(config_dir: &Path, environment: Environment) -> Figment {
        let environment_filename = format!("{}.toml", environment.as_ref().to_lowercase());

        Figment::new()
            .merge(Toml::file(config_dir.join("base.toml")))
            .merge(Toml::file(config_dir.join(environment_filename)))
            .merge(Env::prefixed("APP_").split("__"))
            .merge(
                Env::raw()
                    .only(&["PORT"])
                    .map(|_| "net_config.app_port".into()),
            )
    }

    /// Extracts the config and applies `DATABASE_URL` on top of it when it is set.
    pub fn from_figment(figment: Figment) -> ConfigResult<Self> {
        let mut config: AppConfig = figment.extract()?;

        if let Ok(database_url) = std::env::var("DATABASE_URL") {
            config.db_config = config.db_config.with_database_url(&database_url)?;
        }

        Ok(config)
    }
}
