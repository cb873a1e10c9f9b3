mod matrix;

use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

pub use matrix::parse_feature_matrix;

use crate::cache;
use crate::config::PipelineConfig;
use crate::error::{PhonePoolError, Result};
use crate::types::{FeatureLoad, FeatureMap, Language, SkippedFile};

/// Returns the feature map for `language`, reading `w2feat.pkl` when present
/// and otherwise parsing every file under `<root>/CV_<lang>` and caching it.
pub fn load_features(language: &Language, config: &PipelineConfig) -> Result<FeatureLoad> {
    config.validate()?;
    let cache_path = config.feature_cache_path(language);
    let mut skipped = Vec::new();
    let (features, from_cache) = cache::load_or_build(&cache_path, || {
        let (features, failures) = read_feature_dir(&config.corpus_dir(language), config)?;
        skipped = failures;
        Ok(features)
    })?;

    info!(
        language = %language,
        utterances = features.len(),
        skipped = skipped.len(),
        from_cache,
        "feature map ready"
    );
    Ok(FeatureLoad {
        features,
        skipped,
        from_cache,
    })
}

/// Parses every feature file in `dir`. Unreadable or malformed files are
/// returned as skips rather than failing the batch.
pub fn read_feature_dir(
    dir: &Path,
    config: &PipelineConfig,
) -> Result<(FeatureMap, Vec<SkippedFile>)> {
    let entries =
        fs::read_dir(dir).map_err(|err| PhonePoolError::io("listing features in", dir, err))?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| PhonePoolError::io("listing features in", dir, err))?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        if !path.is_file() || config.is_cache_file(&name) {
            continue;
        }
        paths.push(path);
    }
    paths.sort();

    let mut features = FeatureMap::new();
    let mut skipped = Vec::new();
    for path in paths {
        let Some(utterance) = utterance_key(&path) else {
            skipped.push(SkippedFile {
                reason: "file name has no utterance stem".to_string(),
                path,
            });
            continue;
        };
        let parsed = fs::read_to_string(&path)
            .map_err(|err| err.to_string())
            .and_then(|text| parse_feature_matrix(&text).map_err(|err| err.to_string()));
        match parsed {
            Ok(matrix) => {
                debug!(
                    utterance = %utterance,
                    frames = matrix.nrows(),
                    dims = matrix.ncols(),
                    "parsed features"
                );
                features.insert(utterance, matrix);
            }
            Err(reason) => {
                warn!(path = %path.display(), %reason, "skipping feature file");
                skipped.push(SkippedFile { path, reason });
            }
        }
    }
    Ok((features, skipped))
}

/// Utterance id for a feature file: its name up to the first `.`.
fn utterance_key(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let stem = name.split('.').next().unwrap_or(name);
    (!stem.is_empty()).then(|| stem.to_string())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::{read_feature_dir, utterance_key};
    use crate::config::PipelineConfig;

    #[test]
    fn utterance_key_stops_at_first_dot() {
        assert_eq!(
            utterance_key(Path::new("/x/utt001.feat.txt")).as_deref(),
            Some("utt001")
        );
        assert_eq!(utterance_key(Path::new("/x/utt002")).as_deref(), Some("utt002"));
        assert_eq!(utterance_key(Path::new("/x/.hidden")), None);
    }

    #[test]
    fn ignores_only_cache_staging_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::new(dir.path());
        fs::write(dir.path().join("utt001.txt"), "1 2\n3 4\n").unwrap();
        fs::write(dir.path().join("utt003.tmp"), "5 6\n").unwrap();
        fs::write(dir.path().join("notes.tmp"), "not a matrix\n").unwrap();
        fs::write(dir.path().join("w2feat.pkl.tmp"), "partial pickle").unwrap();
        fs::write(dir.path().join("full_alignment.pkl.tmp"), "partial pickle").unwrap();

        let (features, skipped) = read_feature_dir(dir.path(), &config).unwrap();
        assert_eq!(
            features.keys().map(String::as_str).collect::<Vec<_>>(),
            ["utt001", "utt003"]
        );
        assert_eq!(skipped.len(), 1);
        assert!(skipped[0].path.ends_with("notes.tmp"));
    }
}
