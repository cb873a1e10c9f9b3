use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::error::PhonePoolError;
use crate::types::Language;

pub const DEFAULT_FRAME_RATE_HZ: f64 = 100.0;
pub const DEFAULT_SILENCE_LABEL: &str = "SIL";
pub const DEFAULT_FEATURE_CACHE: &str = "w2feat.pkl";
pub const DEFAULT_ALIGNMENT_CACHE: &str = "full_alignment.pkl";

/// What to do when a segment's frame range does not fit its feature matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundsPolicy {
    /// Truncate to the matrix length; drop segments left with no frames.
    #[default]
    Clamp,
    /// Drop any segment whose range is empty or overruns the matrix.
    Skip,
    /// Fail the whole pooling pass.
    Strict,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PoolingConfig {
    /// Feature frames per second; must match the upstream extractor.
    pub frame_rate_hz: f64,
    pub silence_label: String,
    pub bounds: BoundsPolicy,
}

impl Default for PoolingConfig {
    fn default() -> Self {
        Self {
            frame_rate_hz: DEFAULT_FRAME_RATE_HZ,
            silence_label: DEFAULT_SILENCE_LABEL.to_string(),
            bounds: BoundsPolicy::default(),
        }
    }
}

impl PoolingConfig {
    /// Rejects frame rates that would collapse every segment to an empty span.
    pub fn validate(&self) -> crate::Result<()> {
        if !(self.frame_rate_hz.is_finite() && self.frame_rate_hz > 0.0) {
            return Err(PhonePoolError::config(format!(
                "frame_rate_hz must be positive, got {}",
                self.frame_rate_hz
            )));
        }
        Ok(())
    }

    /// Milliseconds covered by a single feature frame.
    pub fn frame_ms(&self) -> f64 {
        1000.0 / self.frame_rate_hz
    }
}

/// Locations and knobs for one pooling run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding the `CV_<lang>` feature subdirectories.
    pub root: PathBuf,
    pub feature_cache_name: String,
    pub alignment_cache_name: String,
    pub pooling: PoolingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            feature_cache_name: DEFAULT_FEATURE_CACHE.to_string(),
            alignment_cache_name: DEFAULT_ALIGNMENT_CACHE.to_string(),
            pooling: PoolingConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn with_bounds(mut self, bounds: BoundsPolicy) -> Self {
        self.pooling.bounds = bounds;
        self
    }

    pub fn with_frame_rate(mut self, frame_rate_hz: f64) -> Self {
        self.pooling.frame_rate_hz = frame_rate_hz;
        self
    }

    /// Reads a JSON config. A relative `root` is resolved against the file's directory.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read pipeline config {:?}", path))?;
        let mut config: PipelineConfig = serde_json::from_str(&data)
            .with_context(|| format!("failed to parse pipeline config {:?}", path))?;
        if config.root.is_relative() {
            let base = path
                .parent()
                .ok_or_else(|| anyhow!("config path {:?} has no parent directory", path))?;
            config.root = base.join(&config.root);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> crate::Result<()> {
        self.pooling.validate()?;
        if self.feature_cache_name.is_empty() || self.alignment_cache_name.is_empty() {
            return Err(PhonePoolError::config("cache file names must not be empty"));
        }
        if self.feature_cache_name == self.alignment_cache_name {
            return Err(PhonePoolError::config(
                "feature and alignment caches must use different file names",
            ));
        }
        Ok(())
    }

    pub fn corpus_dir(&self, language: &Language) -> PathBuf {
        self.root.join(language.corpus_dir_name())
    }

    pub fn feature_cache_path(&self, language: &Language) -> PathBuf {
        self.corpus_dir(language).join(&self.feature_cache_name)
    }

    pub fn alignment_cache_path(&self, language: &Language) -> PathBuf {
        self.corpus_dir(language).join(&self.alignment_cache_name)
    }

    /// True for file names the pipeline writes itself, including the
    /// `<cache>.tmp` files a cache write stages through.
    pub(crate) fn is_cache_file(&self, name: &str) -> bool {
        [&self.feature_cache_name, &self.alignment_cache_name]
            .into_iter()
            .any(|cache| match name.strip_prefix(cache.as_str()) {
                Some(rest) => rest.is_empty() || rest == ".tmp",
                None => false,
            })
    }
}
