use crate::error::PpkError;
use std::collections::VecDeque;

/// Fixed-capacity sliding window over one measurement channel.
///
/// The window always holds exactly `capacity` samples: it is zero-filled
/// on construction and on resize, and every push evicts the oldest
/// sample. This mirrors the display model, where the plot width is
/// constant and new data scrolls in from the right.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl SlidingWindow {
    /// Create a zero-filled window. Capacity is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: std::iter::repeat_n(0.0, capacity).collect(),
            capacity,
        }
    }

    /// Capacity implied by a time window and a sample interval:
    /// `floor(window / interval)`, minimum 1.
    pub fn capacity_for(window_seconds: f64, interval_seconds: f64) -> usize {
        ((window_seconds / interval_seconds) as usize).max(1)
    }

    /// Reallocate to a new capacity, discarding history. The window
    /// comes back zero-filled.
    pub fn resize(&mut self, new_capacity: usize) {
        *self = Self::new(new_capacity);
    }

    /// Discard all content, keeping the capacity
    pub fn clear(&mut self) {
        self.resize(self.capacity);
    }

    /// Append at the tail, evicting the head. O(1) amortized.
    pub fn push(&mut self, sample: f64) {
        self.samples.pop_front();
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.samples.get(index).copied()
    }

    /// Copy of `[start, end)`, oldest first. Out-of-bounds indices are
    /// reported, never clamped, so callers can surface the N/A policy.
    pub fn range(&self, start: usize, end: usize) -> Result<Vec<f64>, PpkError> {
        if start > end || end > self.samples.len() {
            return Err(PpkError::IndexOutOfBounds);
        }
        Ok(self.samples.range(start..end).copied().collect())
    }

    /// Copy of the whole window, oldest first
    pub fn to_vec(&self) -> Vec<f64> {
        self.samples.iter().copied().collect()
    }
}
