//! Call Log - Write-only side channel
//!
//! Every layer reports `{layer, operation, outcome}` for each call.
//! Sinks stamp the time; nothing they do can influence control flow.

/// Which layer produced an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Controller,
    Service,
    Repository,
}

impl Layer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Controller => "controller",
            Layer::Service => "service",
            Layer::Repository => "repository",
        }
    }
}

impl core::fmt::Display for Layer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a call (or one attempt of it) ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallOutcome {
    /// Returned a value
    Success,
    /// An attempt failed and another one is scheduled
    Retrying,
    /// A failure was swallowed and replaced by an empty result
    Degraded,
    /// The error went back to the caller
    Failed,
}

impl CallOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallOutcome::Success => "success",
            CallOutcome::Retrying => "retrying",
            CallOutcome::Degraded => "degraded",
            CallOutcome::Failed => "failed",
        }
    }

    pub fn is_failure(&self) -> bool {
        !matches!(self, CallOutcome::Success)
    }
}

impl core::fmt::Display for CallOutcome {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line for the call log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallEvent {
    pub layer: Layer,
    pub operation: &'static str,
    pub outcome: CallOutcome,
    pub detail: String,
}

impl CallEvent {
    pub fn new(
        layer: Layer,
        operation: &'static str,
        outcome: CallOutcome,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            layer,
            operation,
            outcome,
            detail: detail.into(),
        }
    }
}

/// Call log sink
///
/// Injected into every layer. Implementations must tolerate concurrent
/// writers.
pub trait CallLog: Send + Sync {
    fn record(&self, event: CallEvent);
}

impl<T: CallLog + ?Sized> CallLog for std::sync::Arc<T> {
    fn record(&self, event: CallEvent) {
        (**self).record(event)
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCallLog;

impl CallLog for NullCallLog {
    fn record(&self, _event: CallEvent) {}
}
