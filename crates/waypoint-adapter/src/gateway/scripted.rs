//! Scripted Upstream - Replays programmed responses
//!
//! Each call pops the next scripted response; once the script runs dry
//! the fallback answers every further call. Useful for pinning the exact
//! failure sequence a retry path has to survive.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use waypoint_domain::{Criteria, Record, RecordId, UpstreamError, UpstreamFetcher};

type OneResult = Result<Record, UpstreamError>;
type ManyResult = Result<Vec<Record>, UpstreamError>;

/// Upstream driven by a response script
#[derive(Debug)]
pub struct ScriptedUpstream {
    one_script: Mutex<VecDeque<OneResult>>,
    one_fallback: OneResult,
    many_script: Mutex<VecDeque<ManyResult>>,
    many_fallback: ManyResult,
    requested: Mutex<Vec<RecordId>>,
    queries: Mutex<Vec<Criteria>>,
}

impl Default for ScriptedUpstream {
    fn default() -> Self {
        Self {
            one_script: Mutex::new(VecDeque::new()),
            one_fallback: Err(UpstreamError::permanent("no scripted response")),
            many_script: Mutex::new(VecDeque::new()),
            many_fallback: Ok(Vec::new()),
            requested: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call to either operation fails with `err`
    pub fn always_failing(err: UpstreamError) -> Self {
        Self::new()
            .with_one_fallback(Err(err.clone()))
            .with_many_fallback(Err(err))
    }

    /// Builder: queue a `fetch_one` response
    pub fn then_one(mut self, response: OneResult) -> Self {
        self.one_script
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(response);
        self
    }

    /// Builder: queue `times` copies of a `fetch_one` failure
    pub fn fail_one_times(mut self, times: u32, err: UpstreamError) -> Self {
        let script = self
            .one_script
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        for _ in 0..times {
            script.push_back(Err(err.clone()));
        }
        self
    }

    /// Builder: answer once the `fetch_one` script is empty
    pub fn with_one_fallback(mut self, response: OneResult) -> Self {
        self.one_fallback = response;
        self
    }

    /// Builder: queue a `fetch_many` response
    pub fn then_many(mut self, response: ManyResult) -> Self {
        self.many_script
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(response);
        self
    }

    /// Builder: answer once the `fetch_many` script is empty
    pub fn with_many_fallback(mut self, response: ManyResult) -> Self {
        self.many_fallback = response;
        self
    }

    /// Ids passed to `fetch_one`, in call order
    pub fn requested_ids(&self) -> Vec<RecordId> {
        self.requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Criteria passed to `fetch_many`, in call order
    pub fn queries(&self) -> Vec<Criteria> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn one_calls(&self) -> u32 {
        self.requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len() as u32
    }

    pub fn many_calls(&self) -> u32 {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len() as u32
    }
}

impl UpstreamFetcher for ScriptedUpstream {
    fn fetch_one(&self, id: &RecordId) -> Result<Record, UpstreamError> {
        self.requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(id.clone());
        self.one_script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| self.one_fallback.clone())
    }

    fn fetch_many(&self, criteria: &Criteria) -> Result<Vec<Record>, UpstreamError> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(criteria.clone());
        self.many_script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| self.many_fallback.clone())
    }
}
