use anyhow::Result;
use config::{Config, ConfigBuilder, Environment, FileFormat, builder::DefaultState};
use serde::Deserialize;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{CoreError, CoreResult};

#[cfg(test)]
mod tests;

/// Default nesting limit for selections and token sets.
pub const DEFAULT_MAX_DEPTH: usize = 32;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub parser: ParserSettings,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ParserSettings {
    /// Maximum nesting of selections and token sets before the parser gives
    /// up.
    pub max_depth: usize,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParserSettings {
    /// ## Summary
    /// Checks that the settings can drive a parser.
    ///
    /// ## Errors
    /// Returns `CoreError::InvalidConfiguration` if `max_depth` is zero.
    pub fn validate(&self) -> CoreResult<()> {
        if self.max_depth == 0 {
            return Err(CoreError::InvalidConfiguration(
                "parser.max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// An `EnvFilter` directive such as `info` or `tempus_spec=trace`.
    pub level: String,
}

impl LoggingConfig {
    /// ## Summary
    /// Builds the tracing filter named by `level`.
    ///
    /// ## Errors
    /// Returns `CoreError::InvalidConfiguration` if `level` is not a valid
    /// filter directive.
    pub fn filter(&self) -> CoreResult<EnvFilter> {
        EnvFilter::try_new(&self.level).map_err(|e| {
            CoreError::InvalidConfiguration(format!("logging.level '{}': {e}", self.level))
        })
    }
}

impl Settings {
    /// ## Summary
    /// Loads configuration from defaults, `TEMPUS_*` environment variables and
    /// an optional `tempus.toml`. Environment variables take precedence.
    ///
    /// ## Errors
    /// Returns an error if building, deserializing or validating the
    /// configuration fails.
    pub fn load() -> Result<Self> {
        Self::layered(environment())
    }

    fn layered(environment: Environment) -> Result<Self> {
        let settings = with_defaults(Config::builder())?
            // TOML file
            .add_source(config::File::with_name("tempus.toml").required(false))
            // Env file
            .add_source(environment)
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;
        Ok(settings)
    }

    /// ## Summary
    /// Loads configuration from a TOML document layered over the defaults.
    ///
    /// ## Errors
    /// Returns an error if the document is malformed or the result is invalid.
    pub fn from_toml(toml: &str) -> Result<Self> {
        let settings = with_defaults(Config::builder())?
            .add_source(config::File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;
        Ok(settings)
    }

    /// ## Summary
    /// Checks every section of the configuration.
    ///
    /// ## Errors
    /// Returns `CoreError::InvalidConfiguration` naming the first bad key.
    pub fn validate(&self) -> CoreResult<()> {
        self.parser.validate()?;
        self.logging.filter()?;
        Ok(())
    }
}

fn environment() -> Environment {
    Environment::with_prefix("TEMPUS")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn with_defaults(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
    builder
        .set_default("parser.max_depth", DEFAULT_MAX_DEPTH as u64)?
        .set_default("logging.level", "info")
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    tracing::debug!(max_depth = settings.parser.max_depth, "Configuration loaded");
    Ok(settings)
}

/// ## Summary
/// Installs the global tracing subscriber, filtered by `logging.level`.
///
/// ## Errors
/// Returns an error if the level is invalid or a subscriber is already set.
pub fn init_logging(logging: &LoggingConfig) -> Result<()> {
    tracing_subscriber::registry()
        .with(logging.filter()?)
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .try_init()?;

    tracing::debug!(level = %logging.level, "Logging initialized");
    Ok(())
}
