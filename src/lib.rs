//! Pools self-supervised speech features over forced-alignment phone segments.
//!
//! Frame matrices live under `<root>/CV_<lang>/`, one text file per
//! utterance. A CTM alignment supplies phone onsets and durations; each
//! non-silence phone becomes one record carrying max, sum and mean pooled
//! feature vectors. Both the raw feature map and the final table are cached
//! next to the features as pickle files.

pub mod alignment;
pub mod cache;
pub mod config;
pub mod error;
pub mod features;
pub mod logging;
pub mod pipeline;
pub mod pooling;
pub mod taxonomy;
pub mod types;

pub use config::{BoundsPolicy, PipelineConfig, PoolingConfig};
pub use error::{PhonePoolError, Result};
pub use pipeline::retrieve_alignment;
pub use types::{
    AlignmentRecord, DropReason, DroppedSegment, FeatureLoad, FeatureMap, FrameSpan, Language,
    LanguageKind, PooledAlignment, PooledRecord, SkippedFile,
};
