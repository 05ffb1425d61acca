use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    AnalysisConfig, Config, DataConfig, LoggingConfig, MIN_REGRESSION_WINDOW, MergeParams, NullPolicy,
    RegressionParams, ServerConfig,
};

/// Environment variables override file settings, e.g. `BULLION__SERVER__ADDR`.
const ENV_PREFIX: &str = "BULLION";

/// Loads the application configuration from `config.toml` in the working directory.
///
/// The file is optional; missing keys fall back to defaults and environment
/// variables take precedence over the file.
pub fn load_config() -> Result<Config, ConfigError> {
    build(config::File::with_name("config.toml").required(false))
}

/// Loads the configuration from an explicit file, which must exist.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    build(config::File::from(path).required(true))
}

fn build<S>(file: S) -> Result<Config, ConfigError>
where
    S: config::Source + Send + Sync + 'static,
{
    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    validate(&config)?;

    tracing::debug!(?config, "Configuration loaded.");
    Ok(config)
}

/// Rejects parameter combinations the analysis cannot run with.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let merge = &config.analysis.merge;
    if merge.volatility_window < 2 {
        return Err(ConfigError::ValidationError(
            "analysis.merge.volatility_window must be at least 2".to_string(),
        ));
    }
    if merge.correlation_window < 2 {
        return Err(ConfigError::ValidationError(
            "analysis.merge.correlation_window must be at least 2".to_string(),
        ));
    }
    if !(merge.trading_days.is_finite() && merge.trading_days > 0.0) {
        return Err(ConfigError::ValidationError(format!(
            "analysis.merge.trading_days must be positive, got {}",
            merge.trading_days
        )));
    }
    if config.analysis.regression.window < MIN_REGRESSION_WINDOW {
        return Err(ConfigError::ValidationError(format!(
            "analysis.regression.window must be at least {MIN_REGRESSION_WINDOW}, got {}",
            config.analysis.regression.window
        )));
    }
    if config.analysis.cache_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "analysis.cache_capacity must be positive".to_string(),
        ));
    }
    Ok(())
}
