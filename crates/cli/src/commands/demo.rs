//! waypoint demo command
//!
//! Walks the retry and degradation paths against fresh simulated upstreams
//! that all report into one audit log.

use std::sync::Arc;

use audit::AuditLogger;
use clap::Args;
use console::style;
use shared::WaypointConfig;
use waypoint_adapter::{SimulatedUpstream, TIMEOUT_SENTINEL};
use waypoint_domain::{Criteria, RecordId};

use crate::wiring::{audit_from_config, App};

#[derive(Debug, Args)]
pub struct DemoCommand {
    /// Transient faults injected before the recovering lookup succeeds
    #[arg(long, default_value_t = 2)]
    pub faults: u32,
}

/// Result of one walkthrough step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub title: &'static str,
    pub outcome: String,
    pub upstream_calls: u32,
}

enum Action {
    View(&'static str),
    Search(&'static str),
}

impl DemoCommand {
    fn steps(&self) -> Vec<(&'static str, SimulatedUpstream, Action)> {
        vec![
            (
                "lookup recovers after transient faults",
                SimulatedUpstream::sample().with_fail_first(self.faults),
                Action::View("site-001"),
            ),
            (
                "lookup exhausts the retry budget",
                SimulatedUpstream::sample().with_fail_first(u32::MAX),
                Action::View("site-002"),
            ),
            (
                "unknown id fails without retrying",
                SimulatedUpstream::sample(),
                Action::View("missing"),
            ),
            (
                "search during an outage degrades to empty",
                SimulatedUpstream::sample().with_fail_first(u32::MAX),
                Action::Search("anything"),
            ),
            (
                "reserved id walks the full retry path",
                SimulatedUpstream::sample(),
                Action::View(TIMEOUT_SENTINEL),
            ),
        ]
    }

    /// Run every step and collect what happened
    pub fn execute(&self, config: &WaypointConfig, audit: Arc<AuditLogger>) -> Vec<StepReport> {
        self.steps()
            .into_iter()
            .map(|(title, upstream, action)| {
                let app = App::assemble(config.clone(), upstream, audit.clone());
                let outcome = match action {
                    Action::View(id) => {
                        match app.controller.view_details_default(&RecordId::new(id)) {
                            Ok(record) => format!("loaded {} ({})", record.id(), record.name()),
                            Err(err) => format!("failed: {}", err.repository_error()),
                        }
                    }
                    Action::Search(text) => {
                        let found = app.controller.search(&Criteria::text(text));
                        format!("{} record(s)", found.len())
                    }
                };
                StepReport {
                    title,
                    outcome,
                    upstream_calls: app.upstream.calls(),
                }
            })
            .collect()
    }

    pub fn run(&self, config: &WaypointConfig, json: bool) -> anyhow::Result<()> {
        let audit = audit_from_config(config);
        let reports = self.execute(config, audit.clone());

        if json {
            println!("{}", serde_json::to_string_pretty(&audit.export_json())?);
            return Ok(());
        }

        for (index, report) in reports.iter().enumerate() {
            println!(
                "{} {}",
                style(format!("[{}]", index + 1)).cyan().bold(),
                style(report.title).bold()
            );
            println!(
                "    {}  {}",
                report.outcome,
                style(format!("{} upstream call(s)", report.upstream_calls)).dim()
            );
        }

        let stats = audit.get_stats();
        println!();
        println!(
            "audit: {} entries, {} success, {} retrying, {} degraded, {} failed",
            stats.total_entries,
            style(stats.success_count).green(),
            style(stats.retry_count).yellow(),
            style(stats.degraded_count).yellow(),
            style(stats.failure_count).red()
        );
        Ok(())
    }
}
