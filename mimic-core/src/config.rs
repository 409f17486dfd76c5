//! Configuration types for Mimic

use serde::{Deserialize, Serialize};

/// Largest accepted [`RecorderConfig::initial_capacity`]
pub const MAX_INITIAL_CAPACITY: usize = 1 << 20;

/// Main configuration for Mimic
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct MimicConfig {
    /// Call recorder configuration
    #[serde(default)]
    pub recorder: RecorderConfig,

    /// Report configuration (used by the CLI)
    #[serde(default)]
    pub report: ReportConfig,
}

/// Call recorder configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecorderConfig {
    /// Number of records to pre-allocate in the history
    #[serde(default = "default_initial_capacity")]
    pub initial_capacity: usize,

    /// Emit a trace event for every recorded call
    #[serde(default)]
    pub trace_calls: bool,
}

fn default_initial_capacity() -> usize {
    64
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            initial_capacity: default_initial_capacity(),
            trace_calls: false,
        }
    }
}

/// Report configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportConfig {
    /// Output format
    #[serde(default)]
    pub format: ReportFormat,

    /// Append the full call timeline to the report
    #[serde(default)]
    pub include_timeline: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::Text,
            include_timeline: false,
        }
    }
}

/// Report output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Human readable lines
    #[default]
    Text,
    /// One JSON document
    Json,
}

/// Builder for [`MimicConfig`]
pub struct ConfigBuilder {
    config: MimicConfig,
}

impl ConfigBuilder {
    /// Start from the defaults
    pub fn new() -> Self {
        Self {
            config: MimicConfig::default(),
        }
    }

    /// Set the history pre-allocation
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.config.recorder.initial_capacity = capacity;
        self
    }

    /// Enable or disable per-call trace events
    pub fn trace_calls(mut self, enabled: bool) -> Self {
        self.config.recorder.trace_calls = enabled;
        self
    }

    /// Set the report format
    pub fn report_format(mut self, format: ReportFormat) -> Self {
        self.config.report.format = format;
        self
    }

    /// Include the call timeline in reports
    pub fn include_timeline(mut self, include: bool) -> Self {
        self.config.report.include_timeline = include;
        self
    }

    /// Build the configuration
    pub fn build(self) -> MimicConfig {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MimicConfig {
    /// Load configuration from file and environment variables.
    ///
    /// Loads in this order:
    /// 1. Default configuration
    /// 2. Configuration file (mimic.toml)
    /// 3. Environment variable overrides (`MIMIC_RECORDER__TRACE_CALLS=true`)
    /// 4. Configuration file named by MIMIC_CONFIG_PATH, if set
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration source is invalid.
    pub fn load() -> crate::error::Result<Self> {
        use figment::{
            Figment,
            providers::{Env, Format, Serialized, Toml},
        };

        let mut figment = Figment::from(Serialized::defaults(MimicConfig::default()))
            .merge(Toml::file("mimic.toml"))
            .merge(Env::prefixed("MIMIC_").split("__"));

        if let Ok(path) = std::env::var("MIMIC_CONFIG_PATH") {
            figment = figment.merge(Toml::file(path));
        }

        let config: MimicConfig = figment.extract()?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::error::Result<Self> {
        use figment::{
            Figment,
            providers::{Format, Serialized, Toml},
        };

        let path = path.as_ref();
        if !path.exists() {
            return Err(crate::error::MimicError::Configuration(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let config: MimicConfig = Figment::from(Serialized::defaults(MimicConfig::default()))
            .merge(Toml::file(path))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.recorder.initial_capacity > MAX_INITIAL_CAPACITY {
            return Err(crate::error::MimicError::Configuration(format!(
                "recorder.initial_capacity {} exceeds the maximum of {}",
                self.recorder.initial_capacity, MAX_INITIAL_CAPACITY
            )));
        }
        Ok(())
    }
}
