//! waypoint burst command
//!
//! Fires one lookup per id concurrently through a single shared controller.

use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use tracing::info;
use waypoint_domain::RecordId;

use crate::wiring::App;

#[derive(Debug, Args)]
pub struct BurstCommand {
    /// Record ids to look up in parallel
    #[arg(required = true, num_args = 1..)]
    pub ids: Vec<String>,
}

/// Outcome of one lookup in the burst
#[derive(Debug)]
pub struct BurstResult {
    pub id: String,
    pub outcome: Result<String, String>,
    pub elapsed: Duration,
}

impl BurstCommand {
    /// Lookups block on backoff, so each runs on the blocking pool
    pub async fn execute(&self, app: &App) -> anyhow::Result<Vec<BurstResult>> {
        let handles: Vec<_> = self
            .ids
            .iter()
            .cloned()
            .map(|id| {
                let controller = Arc::clone(&app.controller);
                tokio::task::spawn_blocking(move || {
                    let started = Instant::now();
                    let outcome = controller
                        .view_details_default(&RecordId::new(id.as_str()))
                        .map(|record| record.name().to_string())
                        .map_err(|err| err.to_string());
                    BurstResult {
                        id,
                        outcome,
                        elapsed: started.elapsed(),
                    }
                })
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            results.push(handle.await?);
        }
        Ok(results)
    }

    pub fn run(&self, app: &App, json: bool) -> anyhow::Result<()> {
        let runtime = tokio::runtime::Runtime::new()?;
        let started = Instant::now();
        let results = runtime.block_on(self.execute(app))?;
        info!(lookups = results.len(), elapsed = ?started.elapsed(), "burst finished");

        if json {
            let rows: Vec<serde_json::Value> = results
                .iter()
                .map(|r| {
                    let mut row = serde_json::json!({
                        "id": r.id,
                        "elapsedMs": r.elapsed.as_millis() as u64,
                    });
                    match &r.outcome {
                        Ok(name) => row["name"] = serde_json::json!(name),
                        Err(error) => row["error"] = serde_json::json!(error),
                    }
                    row
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
            return Ok(());
        }

        for result in &results {
            match &result.outcome {
                Ok(name) => println!(
                    "{} {:<12} {}  {}",
                    style("✓").green(),
                    result.id,
                    name,
                    style(format!("{:?}", result.elapsed)).dim()
                ),
                Err(error) => println!(
                    "{} {:<12} {}  {}",
                    style("✗").red(),
                    result.id,
                    style(error).red(),
                    style(format!("{:?}", result.elapsed)).dim()
                ),
            }
        }
        let failed = results.iter().filter(|r| r.outcome.is_err()).count();
        println!();
        println!(
            "{} lookup(s), {} failed, {} upstream call(s)",
            results.len(),
            failed,
            app.upstream.calls()
        );
        Ok(())
    }
}
