//! Job identity: per-source sequential identifiers and display names

use crate::time::SimTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Index of a job source.
pub type SourceId = usize;

/// Identity of a job: the source that produced it and its per-source sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId {
    pub source: SourceId,
    pub sequence: u64,
}

impl JobId {
    pub const fn new(source: SourceId, sequence: u64) -> Self {
        Self { source, sequence }
    }
}

/// Renders as `S{source}_{sequence}`; this is the job's display name.
impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("S{}_{}", self.source, self.sequence))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid job name: {0:?}")]
pub struct ParseJobIdError(String);

impl FromStr for JobId {
    type Err = ParseJobIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseJobIdError(s.to_string());
        let rest = s.strip_prefix('S').ok_or_else(err)?;
        let (source, sequence) = rest.split_once('_').ok_or_else(err)?;
        Ok(JobId {
            source: source.parse().map_err(|_| err())?,
            sequence: sequence.parse().map_err(|_| err())?,
        })
    }
}

/// One unit of work. Immutable once issued.
///
/// Equality only looks at the identity, never at the creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    id: JobId,
    name: String,
    created_at: SimTime,
}

impl Job {
    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn source(&self) -> SourceId {
        self.id.source
    }

    pub fn sequence(&self) -> u64 {
        self.id.sequence
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_at(&self) -> SimTime {
        self.created_at
    }
}

impl PartialEq for Job {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Job {}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Per-source counter table that issues jobs.
///
/// Owned by one simulation, so independent runs never share sequence numbers.
#[derive(Debug, Default)]
pub struct JobRegistry {
    next_sequence: HashMap<SourceId, u64>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next job for `source`, created at `created_at`.
    pub fn next_job(&mut self, source: SourceId, created_at: SimTime) -> Job {
        let counter = self.next_sequence.entry(source).or_insert(0);
        let id = JobId::new(source, *counter);
        *counter += 1;

        Job {
            id,
            name: id.to_string(),
            created_at,
        }
    }

    /// Number of jobs issued so far for `source`.
    pub fn issued_for(&self, source: SourceId) -> u64 {
        self.next_sequence.get(&source).copied().unwrap_or(0)
    }

    /// Number of jobs issued across all sources.
    pub fn total_issued(&self) -> u64 {
        self.next_sequence.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sequences_are_per_source() {
        let mut registry = JobRegistry::new();
        let a0 = registry.next_job(0, SimTime::zero());
        let b0 = registry.next_job(1, SimTime::zero());
        let a1 = registry.next_job(0, SimTime::from_secs(1));

        assert_eq!(a0.id(), JobId::new(0, 0));
        assert_eq!(b0.id(), JobId::new(1, 0));
        assert_eq!(a1.id(), JobId::new(0, 1));
        assert_eq!(a1.created_at(), SimTime::from_secs(1));
        assert_eq!(registry.issued_for(0), 2);
        assert_eq!(registry.issued_for(7), 0);
        assert_eq!(registry.total_issued(), 3);
    }

    #[test]
    fn test_registries_are_independent() {
        let mut first = JobRegistry::new();
        let mut second = JobRegistry::new();
        first.next_job(3, SimTime::zero());
        first.next_job(3, SimTime::zero());

        assert_eq!(second.next_job(3, SimTime::zero()).sequence(), 0);
    }

    #[test]
    fn test_equality_ignores_creation_time() {
        let mut registry = JobRegistry::new();
        let job = registry.next_job(2, SimTime::zero());
        let mut twin = job.clone();
        twin.created_at = SimTime::from_secs(9);
        assert_eq!(job, twin);

        let other = registry.next_job(2, SimTime::zero());
        assert_ne!(job, other);
    }

    #[test]
    fn test_display_name_encodes_identity() {
        let mut registry = JobRegistry::new();
        let mut seen = HashSet::new();
        for round in 0..20 {
            for source in [0, 1, 10, 11] {
                let job = registry.next_job(source, SimTime::from_secs(round));
                assert_eq!(job.name().parse::<JobId>(), Ok(job.id()));
                assert!(seen.insert(job.name().to_string()), "duplicate name {}", job.name());
            }
        }
        // "S1_11" and "S11_1" must not collide
        assert_ne!(JobId::new(1, 11).to_string(), JobId::new(11, 1).to_string());
    }

    #[test]
    fn test_parse_rejects_malformed_names() {
        assert!("".parse::<JobId>().is_err());
        assert!("S1".parse::<JobId>().is_err());
        assert!("X1_2".parse::<JobId>().is_err());
        assert!("S1_x".parse::<JobId>().is_err());
    }

    #[test]
    fn test_parse_error_names_the_input() {
        let err = "S1".parse::<JobId>().unwrap_err();
        assert_eq!(err, ParseJobIdError("S1".to_string()));
        assert_eq!(err.to_string(), "invalid job name: \"S1\"");

        let boxed: Box<dyn std::error::Error> = Box::new(err);
        assert!(boxed.source().is_none());
    }
}
