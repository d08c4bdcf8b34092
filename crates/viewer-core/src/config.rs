//! Runtime settings for pdf-clip front ends.
//!
//! Settings come from defaults, optionally overridden by environment
//! variables. Nothing is written back to disk.

use log::LevelFilter;
use pdf_clip_engine::EngineBackend;

pub const BACKEND_VAR: &str = "PDF_CLIP_BACKEND";
pub const LOG_VAR: &str = "PDF_CLIP_LOG";
pub const RENDER_SCALE_VAR: &str = "PDF_CLIP_RENDER_SCALE";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {var}")]
    InvalidValue { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// Engine to open documents with.
    pub backend: EngineBackend,
    /// Maximum level written by the front end's logger.
    pub log_level: LevelFilter,
    /// Pixels per PDF point when rasterizing the current page.
    pub render_scale: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self { backend: EngineBackend::Auto, log_level: LevelFilter::Warn, render_scale: 1.0 }
    }
}

impl ViewerConfig {
    pub fn with_backend(mut self, backend: EngineBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_log_level(mut self, level: LevelFilter) -> Self {
        self.log_level = level;
        self
    }

    pub fn with_render_scale(mut self, scale: f32) -> Self {
        self.render_scale = scale;
        self
    }

    /// Loads configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PDF_CLIP_BACKEND`: `auto`, `pdfium` or `pdfplumber` (default: auto)
    /// - `PDF_CLIP_LOG`: `off`, `error`, `warn`, `info`, `debug`, `trace` (default: warn)
    /// - `PDF_CLIP_RENDER_SCALE`: positive number (default: 1.0)
    ///
    /// # Errors
    /// Returns an error if any variable holds a value that does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`ViewerConfig::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(BACKEND_VAR) {
            config.backend = value
                .parse()
                .map_err(|_| ConfigError::InvalidValue { var: BACKEND_VAR, value })?;
        }

        if let Some(value) = lookup(LOG_VAR) {
            config.log_level = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue { var: LOG_VAR, value })?;
        }

        if let Some(value) = lookup(RENDER_SCALE_VAR) {
            config.render_scale = value
                .trim()
                .parse::<f32>()
                .ok()
                .filter(|scale| scale.is_finite() && *scale > 0.0)
                .ok_or(ConfigError::InvalidValue { var: RENDER_SCALE_VAR, value })?;
        }

        Ok(config)
    }
}
