//! AuditLogger - Bounded call log for Waypoint
//!
//! Receives `CallEvent`s from every layer, stamps them and keeps the most
//! recent `max_entries`. Optionally mirrors each entry to `tracing`.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use waypoint_domain::{CallEvent, CallLog, CallOutcome, Layer};

/// Audit log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub timestamp: String,
    pub layer: AuditLayer,
    pub operation: String,
    pub outcome: AuditOutcome,
    pub detail: String,
}

/// Layer that produced an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditLayer {
    Controller,
    Service,
    Repository,
}

impl AuditLayer {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditLayer::Controller => "controller",
            AuditLayer::Service => "service",
            AuditLayer::Repository => "repository",
        }
    }
}

impl From<Layer> for AuditLayer {
    fn from(layer: Layer) -> Self {
        match layer {
            Layer::Controller => AuditLayer::Controller,
            Layer::Service => AuditLayer::Service,
            Layer::Repository => AuditLayer::Repository,
        }
    }
}

/// How the call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Success,
    Retrying,
    Degraded,
    Failed,
}

impl AuditOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditOutcome::Success => "success",
            AuditOutcome::Retrying => "retrying",
            AuditOutcome::Degraded => "degraded",
            AuditOutcome::Failed => "failed",
        }
    }

    pub fn is_failure(&self) -> bool {
        !matches!(self, AuditOutcome::Success)
    }
}

impl From<CallOutcome> for AuditOutcome {
    fn from(outcome: CallOutcome) -> Self {
        match outcome {
            CallOutcome::Success => AuditOutcome::Success,
            CallOutcome::Retrying => AuditOutcome::Retrying,
            CallOutcome::Degraded => AuditOutcome::Degraded,
            CallOutcome::Failed => AuditOutcome::Failed,
        }
    }
}

/// Audit logger
#[derive(Debug)]
pub struct AuditLogger {
    entries: Mutex<VecDeque<AuditEntry>>,
    max_entries: usize,
    mirror_to_tracing: bool,
}

impl AuditLogger {
    /// Create a new AuditLogger
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(max_entries.min(1024))),
            max_entries: max_entries.max(1),
            mirror_to_tracing: false,
        }
    }

    /// Builder: also emit every entry through `tracing`
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.mirror_to_tracing = enabled;
        self
    }

    fn entries(&self) -> MutexGuard<'_, VecDeque<AuditEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Log an audit entry
    pub fn log(&self, entry: AuditEntry) {
        if self.mirror_to_tracing {
            mirror(&entry);
        }
        let mut entries = self.entries();
        if entries.len() >= self.max_entries {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Get recent entries, newest first
    pub fn get_recent(&self, limit: usize) -> Vec<AuditEntry> {
        self.entries().iter().rev().take(limit).cloned().collect()
    }

    /// Get recent non-success entries, newest first
    pub fn get_recent_failures(&self, limit: usize) -> Vec<AuditEntry> {
        self.entries()
            .iter()
            .rev()
            .filter(|e| e.outcome.is_failure())
            .take(limit)
            .cloned()
            .collect()
    }

    /// Get statistics
    pub fn get_stats(&self) -> AuditStats {
        let entries = self.entries();
        let count = |outcome: AuditOutcome| entries.iter().filter(|e| e.outcome == outcome).count();

        AuditStats {
            total_entries: entries.len(),
            success_count: count(AuditOutcome::Success),
            retry_count: count(AuditOutcome::Retrying),
            degraded_count: count(AuditOutcome::Degraded),
            failure_count: count(AuditOutcome::Failed),
        }
    }

    /// Export as JSON
    pub fn export_json(&self) -> serde_json::Value {
        let entries = self.entries();
        serde_json::to_value(entries.iter().collect::<Vec<_>>()).unwrap_or_default()
    }

    pub fn clear(&self) {
        self.entries().clear();
    }
}

fn mirror(entry: &AuditEntry) {
    let layer = entry.layer.as_str();
    let outcome = entry.outcome.as_str();
    match entry.outcome {
        AuditOutcome::Success => tracing::info!(
            target: "waypoint::audit",
            layer,
            operation = %entry.operation,
            outcome,
            "{}",
            entry.detail
        ),
        AuditOutcome::Retrying | AuditOutcome::Degraded => tracing::warn!(
            target: "waypoint::audit",
            layer,
            operation = %entry.operation,
            outcome,
            "{}",
            entry.detail
        ),
        AuditOutcome::Failed => tracing::error!(
            target: "waypoint::audit",
            layer,
            operation = %entry.operation,
            outcome,
            "{}",
            entry.detail
        ),
    }
}

impl CallLog for AuditLogger {
    fn record(&self, event: CallEvent) {
        self.log(AuditEntry {
            timestamp: chrono::Utc::now().to_rfc3339(),
            layer: event.layer.into(),
            operation: event.operation.to_string(),
            outcome: event.outcome.into(),
            detail: event.detail,
        });
    }
}

/// Audit statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditStats {
    pub total_entries: usize,
    pub success_count: usize,
    pub retry_count: usize,
    pub degraded_count: usize,
    pub failure_count: usize,
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new(10000)
    }
}
