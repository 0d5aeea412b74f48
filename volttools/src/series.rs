//! Bounded, time-ordered storage for live series data

use std::collections::VecDeque;

use crate::error::MeterError;
use crate::Sample;

/// Fixed-capacity, append-only series of samples ordered by time.
///
/// The newest samples win: an append that would exceed the capacity drops
/// the single oldest entry. Eviction pops the front of a `VecDeque`, so
/// appends stay O(1) no matter how large the buffer is — a plain remove at
/// index 0 gets too slow for sliding realtime plots at thousands of points
/// and tens of updates per second.
///
/// Times must be non-decreasing. [`BoundedSeries::append`] rejects a sample
/// older than the newest entry and leaves the series unchanged; duplicate
/// times are accepted.
#[derive(Clone, Debug)]
pub struct BoundedSeries {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl BoundedSeries {
    /// An empty series holding at most `capacity` samples (minimum 1).
    pub fn new(capacity: usize) -> BoundedSeries {
        let capacity = capacity.max(1);
        BoundedSeries {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Append a sample, evicting the oldest entry if the series is full.
    pub fn append(&mut self, time: f64, voltage: f64) -> Result<(), MeterError> {
        if let Some(last) = self.samples.back() {
            if time < last.time {
                return Err(MeterError::NonMonotonicTime {
                    last: last.time,
                    new: time,
                });
            }
        }
        self.samples.push_back(Sample { time, voltage });
        if self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
        Ok(())
    }

    /// Change the capacity, evicting oldest entries until the data fits.
    /// A capacity of zero is bumped to one. Never grows the data.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Drop all samples; the capacity is unchanged.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn get(&self, index: usize) -> Option<Sample> {
        self.samples.get(index).copied()
    }

    pub fn first(&self) -> Option<Sample> {
        self.samples.front().copied()
    }

    pub fn last(&self) -> Option<Sample> {
        self.samples.back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }
}
