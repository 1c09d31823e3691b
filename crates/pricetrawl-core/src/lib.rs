mod app_config;
mod config;
mod items;
mod rules;
mod sources;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use items::{DedupKey, Item};
pub use rules::ExtractRules;
pub use sources::{load_sources, SourceConfig, SourcesFile};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("item field `{field}` must be non-empty")]
    EmptyField { field: &'static str },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read sources file {path}: {source}")]
    SourcesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sources file: {0}")]
    SourcesFileParse(#[from] serde_yaml::Error),

    #[error("sources validation failed: {0}")]
    Validation(String),
}
