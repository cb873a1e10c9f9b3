//! Core types for the phone pooling pipeline

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::PhonePoolError;

/// Frame-level encoder features keyed by utterance id, shaped (frames, dims).
///
/// Ordered so that persisted caches are byte-for-byte reproducible.
pub type FeatureMap = BTreeMap<String, Array2<f32>>;

/// Corpus language, identified by its tag as written (`en`, `fr`, `FR`, ...).
///
/// The tag keeps its casing because it names the `CV_<tag>` feature
/// subdirectory; [`LanguageKind`] matches it case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Language {
    tag: String,
}

/// Languages with dedicated phone handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageKind {
    English,
    French,
    Other,
}

impl Language {
    pub fn en() -> Self {
        Self { tag: "en".to_string() }
    }

    pub fn fr() -> Self {
        Self { tag: "fr".to_string() }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn kind(&self) -> LanguageKind {
        if self.tag.eq_ignore_ascii_case("en") {
            LanguageKind::English
        } else if self.tag.eq_ignore_ascii_case("fr") {
            LanguageKind::French
        } else {
            LanguageKind::Other
        }
    }

    /// Name of the corpus subdirectory holding this language's features.
    pub fn corpus_dir_name(&self) -> String {
        format!("CV_{}", self.tag)
    }
}

impl Display for Language {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag)
    }
}

impl FromStr for Language {
    type Err = PhonePoolError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let tag = raw.trim();
        let valid = !tag.is_empty()
            && tag
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
        if !valid {
            return Err(PhonePoolError::Language(raw.to_string()));
        }
        Ok(Self {
            tag: tag.to_string(),
        })
    }
}

impl From<Language> for String {
    fn from(language: Language) -> Self {
        language.tag
    }
}

impl TryFrom<String> for Language {
    type Error = PhonePoolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One phone segment from a CTM alignment file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentRecord {
    pub utterance_id: String,
    pub segment: u32,
    pub onset_s: f64,    // seconds
    pub duration_s: f64, // seconds
    /// Label as written in the alignment, including its `_` suffix
    pub raw_phone: String,
    /// Label after suffix stripping and language normalization
    pub phone: String,
    pub duration_ms: f64,
    /// Trailing CTM column (usually a confidence), carried verbatim
    pub extra: Option<String>,
}

/// Half-open frame interval `[start, end)` reduced for a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSpan {
    pub start: usize,
    pub end: usize,
}

impl FrameSpan {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Alignment record augmented with its pooled feature vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PooledRecord {
    pub record: AlignmentRecord,
    pub language: Language,
    pub frames: FrameSpan,
    pub max_pool: Array1<f32>,
    pub sum_pool: Array1<f32>,
    pub avg_pool: Array1<f32>,
}

/// Why a segment produced no pooled record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropReason {
    /// Utterance has no feature matrix
    MissingFeatures,
    /// Onset and offset collapse to the same frame (or past the matrix end)
    EmptyFrameRange,
    /// Offset lies past the last frame of the matrix
    OutOfBounds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedSegment {
    pub utterance_id: String,
    pub segment: u32,
    pub phone: String,
    pub reason: DropReason,
}

/// Final pooled table for one language, as persisted in the alignment cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PooledAlignment {
    pub records: Vec<PooledRecord>,
    pub dropped: Vec<DroppedSegment>,
    pub silence_count: usize,
    /// Feature files that failed to parse while this table was built.
    /// Empty when the feature map itself came from its cache.
    pub skipped: Vec<SkippedFile>,
}

impl PooledAlignment {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records whose normalized phone equals `phone`.
    pub fn by_phone<'a>(&'a self, phone: &'a str) -> impl Iterator<Item = &'a PooledRecord> + 'a {
        self.records
            .iter()
            .filter(move |pooled| pooled.record.phone == phone)
    }
}

/// A feature file that could not be turned into a matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of loading a language's feature directory.
#[derive(Debug, Clone, Default)]
pub struct FeatureLoad {
    pub features: FeatureMap,
    /// Files that failed to parse. The feature cache stores only the map, so
    /// this is empty when served from cache.
    pub skipped: Vec<SkippedFile>,
    pub from_cache: bool,
}
