use crate::config::toml_config::LoggingConfig;
use crate::utils::error::{CatalogError, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_FILTER: &str = "hero_catalog=info";

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init_logger(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_deref().unwrap_or(DEFAULT_FILTER)));

    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.json.unwrap_or(false) {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .json(),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .compact(),
            )
            .try_init()
    };

    result.map_err(|e| CatalogError::ConfigValidationError {
        field: "logging".to_string(),
        message: format!("Failed to install subscriber: {}", e),
    })
}
