use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section has defaults, so an empty or missing `config.toml` yields a
/// working configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub analysis: AnalysisConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// Where the input exports live and where outputs are written.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// CSV export of the gold/silver price sheet.
    pub prices_path: Option<PathBuf>,
    /// CSV export of the macro indicator sheet.
    pub macro_path: Option<PathBuf>,
    pub output_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            prices_path: None,
            macro_path: None,
            output_dir: PathBuf::from("output"),
        }
    }
}

/// Parameters for the whole analysis run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub merge: MergeParams,
    pub regression: RegressionParams,
    /// How many distinct analysis results the cache keeps.
    pub cache_capacity: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            merge: MergeParams::default(),
            regression: RegressionParams::default(),
            cache_capacity: 8,
        }
    }
}

/// Window sizes for the derived columns computed after the join.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeParams {
    /// Rows in the trailing volatility window.
    pub volatility_window: usize,
    /// Rows in the trailing correlation window.
    pub correlation_window: usize,
    /// Trading days per year used to annualize volatility.
    pub trading_days: f64,
}

impl Default for MergeParams {
    fn default() -> Self {
        Self {
            volatility_window: 30,
            correlation_window: 90,
            trading_days: 252.0,
        }
    }
}

impl MergeParams {
    pub fn annualization(&self) -> f64 {
        self.trading_days.sqrt()
    }
}

/// Smallest usable regression window: the intercept and four predictors plus
/// one residual degree of freedom.
pub const MIN_REGRESSION_WINDOW: usize = 6;

/// Parameters for the rolling regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegressionParams {
    /// Rows per regression window.
    pub window: usize,
    pub null_policy: NullPolicy,
}

impl Default for RegressionParams {
    fn default() -> Self {
        Self {
            window: 180,
            null_policy: NullPolicy::DropRows,
        }
    }
}

/// How rows with missing regression inputs are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum NullPolicy {
    /// Drop incomplete rows once, before windowing.
    #[default]
    DropRows,
    /// Keep every row and skip each window that touches a null.
    SkipWindows,
}

/// Settings for the JSON API server.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
        }
    }
}

/// Optional file logging in addition to stdout.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// When set, logs are also written to a daily-rolling file in this directory.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: None,
            file_prefix: "bullion.log".to_string(),
        }
    }
}
