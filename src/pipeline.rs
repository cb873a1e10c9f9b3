use std::path::Path;

use tracing::info;

use crate::alignment::load_alignment;
use crate::cache;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::features::load_features;
use crate::pooling::pool_alignment;
use crate::types::{Language, PooledAlignment};

/// Pooled phone table for `language`, computed at most once.
///
/// A `full_alignment.pkl` under `<root>/CV_<lang>` short-circuits everything;
/// otherwise features are loaded (through their own cache), the CTM file is
/// parsed and pooled, and the result is persisted. The config is checked
/// first so that a bad frame rate never reaches the cache.
pub fn retrieve_alignment(
    ctm_path: &Path,
    language: &Language,
    config: &PipelineConfig,
) -> Result<PooledAlignment> {
    config.validate()?;
    let cache_path = config.alignment_cache_path(language);
    let (table, from_cache) = cache::load_or_build(&cache_path, || {
        info!(language = %language, "1. retrieving frame features");
        let load = load_features(language, config)?;

        info!(path = %ctm_path.display(), "2. loading alignment");
        let records = load_alignment(ctm_path, language)?;

        info!(records = records.len(), "3. pooling features per phone");
        let mut table = pool_alignment(&load.features, records, language, &config.pooling)?;
        table.skipped = load.skipped;
        Ok(table)
    })?;

    info!(
        language = %language,
        records = table.len(),
        from_cache,
        "alignment ready"
    );
    Ok(table)
}
