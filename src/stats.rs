use crate::error::PpkError;
use serde::{Deserialize, Serialize};

/// Summary statistics over one window or sub-window of samples
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub min: f64,
    pub max: f64,
    pub rms: f64,
    pub avg: f64,
}

/// Cursor-bounded statistics plus the sample values under each cursor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorSummary {
    pub summary: Summary,
    pub y1: f64,
    pub y2: f64,
}

/// Compute min/max/rms/avg over a run of samples.
/// `rms = sqrt(mean(x_i^2))`.
pub fn summarize(samples: &[f64]) -> Result<Summary, PpkError> {
    if samples.is_empty() {
        return Err(PpkError::EmptyWindow);
    }
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    for &x in samples {
        min = min.min(x);
        max = max.max(x);
        sum += x;
        sum_sq += x * x;
    }
    let n = samples.len() as f64;
    Ok(Summary {
        min,
        max,
        rms: (sum_sq / n).sqrt(),
        avg: sum / n,
    })
}

/// Resolve a time-domain cursor position to a sample index:
/// `floor(len / span_seconds * cursor_time)`.
///
/// An index outside the buffer is an explicit out-of-bounds signal,
/// shown as "N/A" by the display layer, never a clamped value.
pub fn cursor_index(len: usize, span_seconds: f64, cursor_time: f64) -> Result<usize, PpkError> {
    if len == 0 || span_seconds <= 0.0 {
        return Err(PpkError::CursorOutOfBounds);
    }
    let position = (len as f64 / span_seconds * cursor_time).floor();
    if position < 0.0 || position >= len as f64 {
        return Err(PpkError::CursorOutOfBounds);
    }
    Ok(position as usize)
}

/// Statistics over the sub-window selected by a cursor pair.
///
/// The first cursor is inclusive, the second exclusive for the
/// aggregate; `y1`/`y2` are the samples directly under each cursor.
pub fn cursor_summary(
    samples: &[f64],
    span_seconds: f64,
    cursor1_time: f64,
    cursor2_time: f64,
) -> Result<CursorSummary, PpkError> {
    let i = cursor_index(samples.len(), span_seconds, cursor1_time)?;
    let j = cursor_index(samples.len(), span_seconds, cursor2_time)?;
    if i >= j {
        return Err(PpkError::CursorOutOfBounds);
    }
    let summary = summarize(&samples[i..j])?;
    Ok(CursorSummary {
        summary,
        y1: samples[i],
        y2: samples[j],
    })
}
