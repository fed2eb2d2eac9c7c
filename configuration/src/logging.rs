use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::{AsrConfig, ConfigurationError};

/// Installs the global subscriber. `RUST_LOG` wins over `logging.level`.
pub fn setup_logging(config: &AsrConfig) -> Result<(), ConfigurationError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .map_err(|err| ConfigurationError::Logging(err.to_string()))?;

    let installed = if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_target(true).with_current_span(true))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(true))
            .try_init()
    };
    installed.map_err(|err| ConfigurationError::Logging(err.to_string()))?;

    tracing::info!(
        level = %config.logging.level,
        json = config.logging.json,
        "logging initialized"
    );
    Ok(())
}
