//! Record Controller - The public entry point
//!
//! Only `view_details` can surface a failure beyond this boundary.
//! `search` always hands back a collection.

use std::sync::Arc;

use tracing::{error, info};
use waypoint_domain::{
    render_chain, CallContext, CallEvent, CallLog, CallOutcome, Criteria, Layer, Record, RecordId,
    RetryPolicy,
};
use waypoint_usecase::{RecordService, ServiceError};

/// Controller over any `RecordService`
pub struct RecordController<S: RecordService> {
    service: S,
    log: Arc<dyn CallLog>,
    default_policy: RetryPolicy,
}

impl<S: RecordService> RecordController<S> {
    pub fn new(service: S, log: Arc<dyn CallLog>) -> Self {
        Self {
            service,
            log,
            default_policy: RetryPolicy::default(),
        }
    }

    /// Builder: policy used by [`RecordController::view_details_default`]
    pub fn with_default_policy(mut self, policy: RetryPolicy) -> Self {
        self.default_policy = policy;
        self
    }

    pub fn default_policy(&self) -> &RetryPolicy {
        &self.default_policy
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Search; never fails
    ///
    /// An upstream outage and a query with no matches both return `[]`.
    pub fn search(&self, criteria: &Criteria) -> Vec<Record> {
        let records = self.service.search(criteria);
        info!(%criteria, count = records.len(), "search completed");
        self.log.record(CallEvent::new(
            Layer::Controller,
            "search",
            CallOutcome::Success,
            format!("{} result(s) for {}", records.len(), criteria),
        ));
        records
    }

    /// Load one record, re-raising the service error unchanged
    pub fn view_details(
        &self,
        id: &RecordId,
        policy: &RetryPolicy,
        ctx: &CallContext,
    ) -> Result<Record, ServiceError> {
        match self.service.get_by_id(id, policy, ctx) {
            Ok(record) => {
                info!(record_id = %id, "details loaded");
                self.log.record(CallEvent::new(
                    Layer::Controller,
                    "view_details",
                    CallOutcome::Success,
                    id.as_str(),
                ));
                Ok(record)
            }
            Err(err) => {
                let chain = render_chain(&err);
                error!(
                    record_id = %id,
                    attempts = err.attempts(),
                    class = %err.classification(),
                    "view_details failed: {}",
                    chain
                );
                self.log.record(CallEvent::new(
                    Layer::Controller,
                    "view_details",
                    CallOutcome::Failed,
                    chain,
                ));
                Err(err)
            }
        }
    }

    /// `view_details` with the default policy and no deadline
    pub fn view_details_default(&self, id: &RecordId) -> Result<Record, ServiceError> {
        self.view_details(id, &self.default_policy, &CallContext::none())
    }
}
