//! Accumulator for samples between reporting intervals.
//!
//! The line reader thread appends, the reporting side drains. Both go
//! through one mutex, so a drain sees every sample appended before it and
//! no sample is ever returned twice.

use std::sync::{Mutex, MutexGuard};

use super::model::Sample;

/// Extra capacity reserved for the next batch after a drain.
const DRAIN_HEADROOM: usize = 5;

#[derive(Debug, Default)]
pub struct SampleBuffer {
    samples: Mutex<Vec<Sample>>,
}

impl SampleBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push and swap cannot leave the vector half-updated, so a poisoned
    /// lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, Vec<Sample>> {
        self.samples
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn append(&self, sample: Sample) {
        self.lock().push(sample);
    }

    /// Returns everything collected since the previous drain and leaves an
    /// empty collection in its place.
    pub fn drain(&self) -> Vec<Sample> {
        let mut samples = self.lock();
        let capacity = samples.len() + DRAIN_HEADROOM;
        std::mem::replace(&mut *samples, Vec::with_capacity(capacity))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
