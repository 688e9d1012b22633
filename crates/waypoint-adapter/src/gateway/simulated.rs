//! Simulated Upstream - The reference record source
//!
//! Behaves like a remote catalog that is sometimes unreachable:
//!
//! - id `"timeout"` (and the search text `"timeout"`) always fails
//!   transiently
//! - unknown ids fail permanently
//! - `with_fail_first(k)` makes the first `k` calls fail transiently
//! - `with_latency(d)` delays every call by `d`
//!
//! Everything is deterministic so the full retry path can be exercised
//! in tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tracing::debug;
use waypoint_domain::{Criteria, Record, RecordId, UpstreamError, UpstreamFetcher};

/// Reserved id that never resolves
pub const TIMEOUT_SENTINEL: &str = "timeout";

/// In-memory upstream with scripted faults
#[derive(Debug, Default)]
pub struct SimulatedUpstream {
    records: BTreeMap<String, Record>,
    fail_first: u32,
    latency: Duration,
    calls: AtomicU32,
    one_calls: AtomicU32,
    many_calls: AtomicU32,
}

impl SimulatedUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    /// A small catalog of heritage sites
    pub fn sample() -> Self {
        Self::new().with_records([
            Record::new(RecordId::new("site-001"), "Colosseum")
                .with_description("Flavian amphitheatre in the centre of the city")
                .with_location("Rome")
                .with_images(["img/colosseum/front.jpg", "img/colosseum/arena.jpg"]),
            Record::new(RecordId::new("site-002"), "Uffizi Gallery")
                .with_description("Renaissance art museum")
                .with_location("Florence")
                .with_image("img/uffizi/courtyard.jpg"),
            Record::new(RecordId::new("site-003"), "Valley of the Temples")
                .with_description("Greek temples on a ridge above the sea")
                .with_location("Agrigento"),
            Record::new(RecordId::new("site-004"), "Roman Forum")
                .with_description("Ruins of the ancient city centre")
                .with_location("Rome")
                .with_image("img/forum/overview.jpg"),
        ])
    }

    /// Builder: add a record (replaces one with the same id)
    pub fn with_record(mut self, record: Record) -> Self {
        self.records
            .insert(record.id().as_str().to_string(), record);
        self
    }

    /// Builder: add records
    pub fn with_records(mut self, records: impl IntoIterator<Item = Record>) -> Self {
        for record in records {
            self.records
                .insert(record.id().as_str().to_string(), record);
        }
        self
    }

    /// Builder: fail the first `calls` calls transiently
    pub fn with_fail_first(mut self, calls: u32) -> Self {
        self.fail_first = calls;
        self
    }

    /// Builder: delay every call
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Total calls to either operation
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn one_calls(&self) -> u32 {
        self.one_calls.load(Ordering::SeqCst)
    }

    pub fn many_calls(&self) -> u32 {
        self.many_calls.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Count the call, apply latency and injected faults
    fn begin_call(&self) -> Result<(), UpstreamError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }
        if call <= self.fail_first {
            return Err(UpstreamError::transient(format!(
                "connection to upstream interrupted (simulated fault {}/{})",
                call, self.fail_first
            )));
        }
        Ok(())
    }
}

fn timed_out() -> UpstreamError {
    UpstreamError::transient("connection to upstream timed out")
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn matches_text(record: &Record, text: &str) -> bool {
    text.is_empty()
        || contains_ignore_case(record.name(), text)
        || contains_ignore_case(record.description(), text)
        || record
            .location()
            .is_some_and(|location| contains_ignore_case(location, text))
}

fn matches_field(record: &Record, key: &str, value: &str) -> bool {
    match key {
        "id" => record.id().as_str().eq_ignore_ascii_case(value),
        "name" => contains_ignore_case(record.name(), value),
        "description" => contains_ignore_case(record.description(), value),
        "location" => record
            .location()
            .is_some_and(|location| contains_ignore_case(location, value)),
        "text" => matches_text(record, value),
        _ => false,
    }
}

fn matches(record: &Record, criteria: &Criteria) -> bool {
    match criteria {
        Criteria::Text(text) => matches_text(record, text),
        Criteria::Fields(pairs) => pairs
            .iter()
            .all(|(key, value)| matches_field(record, key, value)),
    }
}

impl UpstreamFetcher for SimulatedUpstream {
    fn fetch_one(&self, id: &RecordId) -> Result<Record, UpstreamError> {
        self.one_calls.fetch_add(1, Ordering::SeqCst);
        debug!(record_id = %id, "simulated upstream: fetch_one");
        self.begin_call()?;

        if id.as_str() == TIMEOUT_SENTINEL {
            return Err(timed_out());
        }
        self.records
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| UpstreamError::not_found(id))
    }

    fn fetch_many(&self, criteria: &Criteria) -> Result<Vec<Record>, UpstreamError> {
        self.many_calls.fetch_add(1, Ordering::SeqCst);
        debug!(%criteria, "simulated upstream: fetch_many");
        self.begin_call()?;

        if criteria.as_text() == Some(TIMEOUT_SENTINEL) {
            return Err(timed_out());
        }
        Ok(self
            .records
            .values()
            .filter(|record| matches(record, criteria))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint_domain::ErrorClass;

    #[test]
    fn test_sentinel_always_transient() {
        let upstream = SimulatedUpstream::sample();

        for _ in 0..5 {
            let err = upstream
                .fetch_one(&RecordId::new(TIMEOUT_SENTINEL))
                .unwrap_err();
            assert_eq!(err.classification(), ErrorClass::Transient);
        }
        assert_eq!(upstream.one_calls(), 5);
    }

    #[test]
    fn test_unknown_id_is_permanent() {
        let upstream = SimulatedUpstream::sample();
        let err = upstream.fetch_one(&RecordId::new("missing")).unwrap_err();
        assert_eq!(err.classification(), ErrorClass::Permanent);
    }

    #[test]
    fn test_fail_first_then_recover() {
        let upstream = SimulatedUpstream::sample().with_fail_first(2);
        let id = RecordId::new("site-001");

        assert!(upstream.fetch_one(&id).is_err());
        assert!(upstream.fetch_one(&id).is_err());
        assert_eq!(upstream.fetch_one(&id).unwrap().name(), "Colosseum");
        assert_eq!(upstream.calls(), 3);
    }

    #[test]
    fn test_text_search_is_case_insensitive() {
        let upstream = SimulatedUpstream::sample();

        let found = upstream.fetch_many(&Criteria::text("ROME")).unwrap();
        let ids: Vec<&str> = found.iter().map(|r| r.id().as_str()).collect();
        assert_eq!(ids, vec!["site-001", "site-004"]);
    }

    #[test]
    fn test_empty_text_lists_everything() {
        let upstream = SimulatedUpstream::sample();
        assert_eq!(
            upstream.fetch_many(&Criteria::default()).unwrap().len(),
            upstream.len()
        );
    }

    #[test]
    fn test_field_search_requires_every_pair() {
        let upstream = SimulatedUpstream::sample();

        let criteria = Criteria::fields()
            .with_field("location", "rome")
            .with_field("name", "forum");
        let found = upstream.fetch_many(&criteria).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id().as_str(), "site-004");

        let unknown_key = Criteria::fields().with_field("rating", "5");
        assert!(upstream.fetch_many(&unknown_key).unwrap().is_empty());
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let upstream = SimulatedUpstream::sample();
        assert!(upstream
            .fetch_many(&Criteria::text("atlantis"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_timeout_search_fails_transiently() {
        let upstream = SimulatedUpstream::sample();
        let err = upstream
            .fetch_many(&Criteria::text(TIMEOUT_SENTINEL))
            .unwrap_err();
        assert_eq!(err.classification(), ErrorClass::Transient);
    }
}
