//! Record Service - Business policy over the repository
//!
//! The two operations deliberately disagree on failure:
//!
//! | Operation   | On failure                                   |
//! |-------------|----------------------------------------------|
//! | `search`    | empty collection, failure visible only in logs |
//! | `get_by_id` | `ServiceError` wrapping the repository error |
//!
//! A failed search is indistinguishable from one that found nothing.
//! That ambiguity is kept on purpose and covered by tests.

use std::sync::Arc;

use waypoint_domain::{
    render_chain, CallContext, CallEvent, CallLog, CallOutcome, Criteria, ErrorClass, Layer,
    Record, RecordId, RecordRepository, RepositoryError, RetryPolicy,
};

/// Business-level failure of a single-item operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The record could not be loaded; `source` holds the repository error
    /// unchanged.
    Failure {
        id: RecordId,
        source: RepositoryError,
    },
}

impl ServiceError {
    pub fn id(&self) -> &RecordId {
        match self {
            ServiceError::Failure { id, .. } => id,
        }
    }

    pub fn repository_error(&self) -> &RepositoryError {
        match self {
            ServiceError::Failure { source, .. } => source,
        }
    }

    pub fn classification(&self) -> ErrorClass {
        self.repository_error().classification()
    }

    pub fn attempts(&self) -> u32 {
        self.repository_error().attempts()
    }
}

impl core::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ServiceError::Failure { id, .. } => write!(f, "could not load details for record {}", id),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServiceError::Failure { source, .. } => Some(source),
        }
    }
}

/// Record Service Trait
///
/// The capability the controller depends on.
pub trait RecordService: Send + Sync {
    /// Always returns a collection, possibly empty
    fn search(&self, criteria: &Criteria) -> Vec<Record>;

    /// Returns the record or a `ServiceError`; never a default value
    fn get_by_id(
        &self,
        id: &RecordId,
        policy: &RetryPolicy,
        ctx: &CallContext,
    ) -> Result<Record, ServiceError>;
}

impl<T: RecordService + ?Sized> RecordService for Arc<T> {
    fn search(&self, criteria: &Criteria) -> Vec<Record> {
        (**self).search(criteria)
    }

    fn get_by_id(
        &self,
        id: &RecordId,
        policy: &RetryPolicy,
        ctx: &CallContext,
    ) -> Result<Record, ServiceError> {
        (**self).get_by_id(id, policy, ctx)
    }
}

/// Catalog service backed by any `RecordRepository`
pub struct CatalogService<R: RecordRepository> {
    repo: R,
    log: Arc<dyn CallLog>,
}

impl<R: RecordRepository> CatalogService<R> {
    /// Creates a service using the provided repository and call log.
    pub fn new(repo: R, log: Arc<dyn CallLog>) -> Self {
        Self { repo, log }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }
}

impl<R: RecordRepository> RecordService for CatalogService<R> {
    fn search(&self, criteria: &Criteria) -> Vec<Record> {
        // find_all is total; nothing to translate here
        let records = self.repo.find_all(criteria);
        self.log.record(CallEvent::new(
            Layer::Service,
            "search",
            CallOutcome::Success,
            format!("{} record(s) for {}", records.len(), criteria),
        ));
        records
    }

    fn get_by_id(
        &self,
        id: &RecordId,
        policy: &RetryPolicy,
        ctx: &CallContext,
    ) -> Result<Record, ServiceError> {
        match self.repo.find_by_id(id, policy, ctx) {
            Ok(record) => {
                self.log.record(CallEvent::new(
                    Layer::Service,
                    "get_by_id",
                    CallOutcome::Success,
                    format!("loaded {}", id),
                ));
                Ok(record)
            }
            Err(source) => {
                let err = ServiceError::Failure {
                    id: id.clone(),
                    source,
                };
                self.log.record(CallEvent::new(
                    Layer::Service,
                    "get_by_id",
                    CallOutcome::Failed,
                    render_chain(&err),
                ));
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use waypoint_domain::{cause_chain, NullCallLog, UpstreamError};

    /// Repository that replays a fixed answer
    struct StubRepo {
        listing: Vec<Record>,
        lookup: Result<Record, RepositoryError>,
        lookups: Mutex<u32>,
    }

    impl StubRepo {
        fn answering(lookup: Result<Record, RepositoryError>) -> Self {
            Self {
                listing: Vec::new(),
                lookup,
                lookups: Mutex::new(0),
            }
        }
    }

    impl RecordRepository for StubRepo {
        fn find_all(&self, _criteria: &Criteria) -> Vec<Record> {
            self.listing.clone()
        }

        fn find_by_id(
            &self,
            _id: &RecordId,
            _policy: &RetryPolicy,
            _ctx: &CallContext,
        ) -> Result<Record, RepositoryError> {
            *self.lookups.lock().unwrap() += 1;
            self.lookup.clone()
        }
    }

    #[derive(Default)]
    struct MemoryLog {
        events: Mutex<Vec<CallEvent>>,
    }

    impl CallLog for MemoryLog {
        fn record(&self, event: CallEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    fn exhausted(id: &str) -> RepositoryError {
        RepositoryError::Exhausted {
            id: RecordId::new(id),
            attempts: 3,
            cause: UpstreamError::transient("connection to upstream timed out"),
        }
    }

    #[test]
    fn test_search_forwards_repository_result() {
        let mut repo = StubRepo::answering(Err(exhausted("unused")));
        repo.listing = vec![Record::new(RecordId::new("r-1"), "Forum")];
        let service = CatalogService::new(repo, Arc::new(NullCallLog));

        let found = service.search(&Criteria::text("forum"));
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_search_empty_is_not_an_error() {
        let service = CatalogService::new(
            StubRepo::answering(Err(exhausted("unused"))),
            Arc::new(NullCallLog),
        );

        assert!(service.search(&Criteria::text("anything")).is_empty());
    }

    #[test]
    fn test_get_by_id_success() {
        let service = CatalogService::new(
            StubRepo::answering(Ok(Record::new(RecordId::new("X1"), "Arena"))),
            Arc::new(NullCallLog),
        );

        let record = service
            .get_by_id(&RecordId::new("X1"), &RetryPolicy::default(), &CallContext::none())
            .unwrap();
        assert_eq!(record.id().as_str(), "X1");
        assert_eq!(*service.repository().lookups.lock().unwrap(), 1);
    }

    #[test]
    fn test_get_by_id_wraps_repository_error_unchanged() {
        let service = CatalogService::new(
            StubRepo::answering(Err(exhausted("X1"))),
            Arc::new(NullCallLog),
        );

        let err = service
            .get_by_id(&RecordId::new("X1"), &RetryPolicy::default(), &CallContext::none())
            .unwrap_err();

        assert_eq!(err.repository_error(), &exhausted("X1"));
        assert_eq!(err.attempts(), 3);
        assert_eq!(err.classification(), ErrorClass::Transient);
    }

    #[test]
    fn test_cause_chain_reaches_upstream_message() {
        let service = CatalogService::new(
            StubRepo::answering(Err(exhausted("X1"))),
            Arc::new(NullCallLog),
        );

        let err = service
            .get_by_id(&RecordId::new("X1"), &RetryPolicy::default(), &CallContext::none())
            .unwrap_err();

        let chain = cause_chain(&err);
        assert_eq!(chain.len(), 3);
        assert_eq!(chain[0], "could not load details for record X1");
        assert_eq!(chain.last().unwrap(), "connection to upstream timed out");
    }

    #[test]
    fn test_failures_are_logged() {
        let log = Arc::new(MemoryLog::default());
        let service = CatalogService::new(StubRepo::answering(Err(exhausted("X1"))), log.clone());

        let _ = service.get_by_id(&RecordId::new("X1"), &RetryPolicy::default(), &CallContext::none());

        let events = log.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].layer, Layer::Service);
        assert_eq!(events[0].outcome, CallOutcome::Failed);
        assert!(events[0].detail.contains("connection to upstream timed out"));
    }
}
