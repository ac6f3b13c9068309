//! Server configuration resolved from the process environment.
//!
//! Read once in `main` after `.env` has been loaded; nothing downstream touches the environment.

use std::path::PathBuf;
use zahani_core::config::store_kind_from_env_value;
use zahani_core::{CoreConfig, DEFAULT_DATA_DIR, StoreKind};

pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub rest_addr: String,
    pub core: CoreConfig,
    /// When set, every workflow route requires a matching `x-api-key` header.
    pub api_key: Option<String>,
}

impl ServerConfig {
    /// Resolve configuration from the real environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve configuration from any variable lookup.
    ///
    /// Environment variables:
    /// - `ZAHANI_REST_ADDR`: listen address (default: "0.0.0.0:3000")
    /// - `ZAHANI_DATA_DIR`: data directory; an existing directory selects the file store
    /// - `ZAHANI_STORE`: `memory` or `file`, overriding the data-directory rule
    /// - `API_KEY`: optional API key for the workflow routes
    ///
    /// # Errors
    ///
    /// Returns an error if `ZAHANI_STORE` is not recognised, or if the file store is selected and
    /// the data directory does not exist.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let rest_addr = non_blank("ZAHANI_REST_ADDR").unwrap_or_else(|| DEFAULT_REST_ADDR.into());

        let data_dir_env = non_blank("ZAHANI_DATA_DIR");
        let data_dir = PathBuf::from(data_dir_env.as_deref().unwrap_or(DEFAULT_DATA_DIR));
        let data_dir_usable = data_dir_env.is_some() && data_dir.is_dir();
        if data_dir_env.is_some() && !data_dir_usable {
            tracing::warn!(
                "ZAHANI_DATA_DIR {} is not an existing directory",
                data_dir.display()
            );
        }

        let store_kind = store_kind_from_env_value(lookup("ZAHANI_STORE"), data_dir_usable)?;
        let core = match store_kind {
            StoreKind::Memory => CoreConfig::in_memory(),
            StoreKind::File => CoreConfig::new(data_dir, StoreKind::File)?,
        };

        Ok(Self {
            rest_addr,
            core,
            api_key: non_blank("API_KEY"),
        })
    }
}
