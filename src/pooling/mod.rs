use ndarray::{Array1, ArrayView2, Axis};
use tracing::{info, warn};

use crate::config::{BoundsPolicy, PoolingConfig};
use crate::error::{PhonePoolError, Result};
use crate::types::{
    AlignmentRecord, DropReason, DroppedSegment, FeatureMap, FrameSpan, Language, PooledAlignment,
    PooledRecord,
};

/// Frame-axis reductions applied to each segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pooling {
    Max,
    Sum,
    Mean,
}

impl Pooling {
    /// Reduces `frames` (frames, dims) to one vector of length dims.
    ///
    /// Returns `None` when there are no frames to reduce. A NaN frame value
    /// makes every reduction over it NaN, max included.
    pub fn apply(self, frames: ArrayView2<'_, f32>) -> Option<Array1<f32>> {
        if frames.nrows() == 0 {
            return None;
        }
        match self {
            Pooling::Max => Some(frames.fold_axis(Axis(0), f32::NEG_INFINITY, |&acc, &v| {
                if acc.is_nan() || v.is_nan() {
                    f32::NAN
                } else {
                    acc.max(v)
                }
            })),
            Pooling::Sum => Some(frames.sum_axis(Axis(0))),
            Pooling::Mean => frames.mean_axis(Axis(0)),
        }
    }
}

/// Requested frame interval for a segment, before any bounds handling.
///
/// Expects a validated config; see [`PoolingConfig::validate`].
///
/// `onset = ceil(onset_s * rate)`, `offset = ceil(onset_s * rate + duration_ms / frame_ms)`.
pub fn frame_span(record: &AlignmentRecord, config: &PoolingConfig) -> FrameSpan {
    let onset = record.onset_s * config.frame_rate_hz;
    let offset = onset + record.duration_ms / config.frame_ms();
    FrameSpan {
        start: to_frame(onset.ceil()),
        end: to_frame(offset.ceil()),
    }
}

fn to_frame(value: f64) -> usize {
    if value.is_finite() && value > 0.0 {
        value as usize
    } else {
        0
    }
}

enum Resolved {
    Span(FrameSpan),
    Drop(DropReason),
}

fn resolve_span(
    requested: FrameSpan,
    frame_count: usize,
    policy: BoundsPolicy,
    record: &AlignmentRecord,
) -> Result<Resolved> {
    let overruns = requested.end > frame_count;
    let clamped = FrameSpan {
        start: requested.start.min(frame_count),
        end: requested.end.min(frame_count),
    };
    match policy {
        BoundsPolicy::Clamp if clamped.is_empty() => {
            Ok(Resolved::Drop(DropReason::EmptyFrameRange))
        }
        BoundsPolicy::Clamp => Ok(Resolved::Span(clamped)),
        BoundsPolicy::Skip if requested.is_empty() => {
            Ok(Resolved::Drop(DropReason::EmptyFrameRange))
        }
        BoundsPolicy::Skip if overruns => Ok(Resolved::Drop(DropReason::OutOfBounds)),
        BoundsPolicy::Skip => Ok(Resolved::Span(requested)),
        BoundsPolicy::Strict if requested.is_empty() || overruns => {
            Err(PhonePoolError::FrameRange {
                utterance: record.utterance_id.clone(),
                segment: record.segment,
                message: format!(
                    "frames [{}, {}) do not fit a {frame_count}-frame matrix",
                    requested.start, requested.end
                ),
            })
        }
        BoundsPolicy::Strict => Ok(Resolved::Span(requested)),
    }
}

/// Pools every non-silence segment whose utterance has features.
pub fn pool_alignment(
    features: &FeatureMap,
    records: Vec<AlignmentRecord>,
    language: &Language,
    config: &PoolingConfig,
) -> Result<PooledAlignment> {
    config.validate()?;
    let mut table = PooledAlignment::default();

    for record in records {
        if record.phone == config.silence_label {
            table.silence_count += 1;
            continue;
        }
        let Some(matrix) = features.get(&record.utterance_id) else {
            table.dropped.push(dropped(&record, DropReason::MissingFeatures));
            continue;
        };

        let requested = frame_span(&record, config);
        let span = match resolve_span(requested, matrix.nrows(), config.bounds, &record)? {
            Resolved::Span(span) => span,
            Resolved::Drop(reason) => {
                table.dropped.push(dropped(&record, reason));
                continue;
            }
        };

        let frames = matrix.slice(ndarray::s![span.start..span.end, ..]);
        let (Some(max_pool), Some(sum_pool), Some(avg_pool)) = (
            Pooling::Max.apply(frames),
            Pooling::Sum.apply(frames),
            Pooling::Mean.apply(frames),
        ) else {
            table
                .dropped
                .push(dropped(&record, DropReason::EmptyFrameRange));
            continue;
        };

        table.records.push(PooledRecord {
            record,
            language: language.clone(),
            frames: span,
            max_pool,
            sum_pool,
            avg_pool,
        });
    }

    if !table.dropped.is_empty() {
        warn!(
            language = %language,
            dropped = table.dropped.len(),
            "segments dropped during pooling"
        );
    }
    info!(
        language = %language,
        pooled = table.records.len(),
        silence = table.silence_count,
        "pooling complete"
    );
    Ok(table)
}

fn dropped(record: &AlignmentRecord, reason: DropReason) -> DroppedSegment {
    DroppedSegment {
        utterance_id: record.utterance_id.clone(),
        segment: record.segment,
        phone: record.phone.clone(),
        reason,
    }
}
