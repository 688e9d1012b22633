//! waypoint view command

use std::time::Duration;

use clap::Args;
use console::style;
use waypoint_adapter::RecordDto;
use waypoint_domain::{cause_chain, CallContext, RecordId, RetryPolicy};
use waypoint_usecase::ServiceError;

use super::search::print_record;
use crate::wiring::App;

#[derive(Debug, Args)]
pub struct ViewCommand {
    /// Record id (`timeout` always fails transiently)
    pub id: String,

    /// Retries after the first attempt
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Delay between attempts in milliseconds
    #[arg(long)]
    pub backoff_ms: Option<u64>,

    /// Give up after this many milliseconds overall
    #[arg(long)]
    pub deadline_ms: Option<u64>,
}

impl ViewCommand {
    /// The configured policy with per-call flags applied
    pub fn policy(&self, default: &RetryPolicy) -> RetryPolicy {
        let mut policy = *default;
        if let Some(max_retries) = self.max_retries {
            policy = policy.with_max_retries(max_retries);
        }
        if let Some(backoff_ms) = self.backoff_ms {
            policy = policy.with_backoff_delay(Duration::from_millis(backoff_ms));
        }
        policy
    }

    pub fn context(&self) -> CallContext {
        match self.deadline_ms {
            Some(ms) => CallContext::none().with_timeout(Duration::from_millis(ms)),
            None => CallContext::none(),
        }
    }

    /// Prints the record; a failure is returned so the process exits non-zero
    pub fn run(&self, app: &App, json: bool) -> anyhow::Result<()> {
        let id = RecordId::new(self.id.as_str());
        let policy = self.policy(app.controller.default_policy());

        match app.controller.view_details(&id, &policy, &self.context()) {
            Ok(record) => {
                if json {
                    println!("{}", serde_json::to_string_pretty(&RecordDto::from(&record))?);
                } else {
                    print_record(&record);
                }
                Ok(())
            }
            Err(err) => {
                if json {
                    println!("{}", serde_json::to_string_pretty(&failure_json(&err))?);
                } else {
                    eprintln!(
                        "{} {} ({} attempt(s), {})",
                        style("✗").red().bold(),
                        style(&err).red(),
                        err.attempts(),
                        err.classification()
                    );
                }
                Err(err.into())
            }
        }
    }
}

fn failure_json(err: &ServiceError) -> serde_json::Value {
    serde_json::json!({
        "id": err.id().as_str(),
        "error": err.to_string(),
        "classification": err.classification().as_str(),
        "attempts": err.attempts(),
        "causes": cause_chain(err),
    })
}
