//! Bounded FIFO buffer for jobs waiting on a free device
//!
//! The buffer never grows past its capacity. When a job arrives at a full
//! buffer the job at the head (the one that has waited longest) is evicted and
//! the newcomer is appended at the tail: fresh work wins over stale work.

use crate::error::StationError;
use crate::job::Job;
use std::collections::VecDeque;

/// Result of offering a job to the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// The job was appended; nothing was displaced.
    Accepted,
    /// The buffer was full; the former head was evicted to make room.
    ///
    /// The caller must report the evicted job as rejected and drop it.
    Evicted(Job),
}

#[derive(Debug, Clone)]
pub struct BoundedBuffer {
    items: VecDeque<Job>,
    capacity: usize,
    total_enqueued: u64,
    total_evicted: u64,
}

impl BoundedBuffer {
    /// Create a buffer holding at most `capacity` jobs.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Buffer capacity must be positive");
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
            total_enqueued: 0,
            total_evicted: 0,
        }
    }

    /// Append `job`, evicting the head first if the buffer is full.
    pub fn try_enqueue(&mut self, job: Job) -> EnqueueOutcome {
        let outcome = if self.is_full() {
            match self.items.pop_front() {
                Some(evicted) => {
                    self.total_evicted += 1;
                    EnqueueOutcome::Evicted(evicted)
                }
                None => EnqueueOutcome::Accepted,
            }
        } else {
            EnqueueOutcome::Accepted
        };

        self.items.push_back(job);
        self.total_enqueued += 1;
        debug_assert!(self.items.len() <= self.capacity);
        outcome
    }

    /// Remove and return the head job.
    pub fn dequeue(&mut self) -> Result<Job, StationError> {
        self.items.pop_front().ok_or(StationError::EmptyBuffer)
    }

    /// The head job (next to leave), without removing it.
    pub fn peek_head(&self) -> Result<&Job, StationError> {
        self.items.front().ok_or(StationError::EmptyBuffer)
    }

    /// The most recently appended job.
    pub fn newest(&self) -> Option<&Job> {
        self.items.back()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Jobs from head to tail.
    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.items.iter()
    }

    pub fn total_enqueued(&self) -> u64 {
        self.total_enqueued
    }

    pub fn total_evicted(&self) -> u64 {
        self.total_evicted
    }
}
