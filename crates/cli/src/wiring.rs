//! Wiring - builds the upstream → repository → service → controller stack

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use audit::AuditLogger;
use shared::WaypointConfig;
use tracing::debug;
use waypoint_adapter::{load_catalog, RecordController, RetryingRecordRepository, SimulatedUpstream};
use waypoint_usecase::CatalogService;

/// The fully assembled controller
pub type Controller =
    RecordController<CatalogService<RetryingRecordRepository<Arc<SimulatedUpstream>>>>;

/// Everything a command needs
pub struct App {
    pub config: WaypointConfig,
    pub controller: Arc<Controller>,
    pub upstream: Arc<SimulatedUpstream>,
    pub audit: Arc<AuditLogger>,
}

/// Read the config file (if any) then apply `WAYPOINT_*` overrides
pub fn load_config(path: Option<&Path>) -> anyhow::Result<WaypointConfig> {
    let mut config = match path {
        Some(path) => WaypointConfig::from_file(path)
            .with_context(|| format!("failed to load config '{}'", path.display()))?,
        None => WaypointConfig::default(),
    };
    config
        .apply_process_env()
        .context("invalid environment override")?;
    Ok(config)
}

/// Upstream described by `config.upstream`
pub fn upstream_from_config(config: &WaypointConfig) -> anyhow::Result<SimulatedUpstream> {
    let upstream = match &config.upstream.catalog_path {
        Some(path) => {
            let records = load_catalog(path)?;
            debug!(path = %path.display(), count = records.len(), "catalog loaded");
            SimulatedUpstream::new().with_records(records)
        }
        None => SimulatedUpstream::sample(),
    };
    Ok(upstream
        .with_latency(config.upstream.latency())
        .with_fail_first(config.upstream.fail_first))
}

/// Audit log sized and mirrored per `config.audit`
pub fn audit_from_config(config: &WaypointConfig) -> Arc<AuditLogger> {
    Arc::new(AuditLogger::new(config.audit.capacity).with_tracing(config.audit.mirror_to_tracing))
}

impl App {
    pub fn from_config(config: WaypointConfig) -> anyhow::Result<Self> {
        let upstream = upstream_from_config(&config)?;
        let audit = audit_from_config(&config);
        Ok(Self::assemble(config, upstream, audit))
    }

    /// Assemble the stack over a given upstream, reporting into `audit`
    pub fn assemble(
        config: WaypointConfig,
        upstream: SimulatedUpstream,
        audit: Arc<AuditLogger>,
    ) -> Self {
        let upstream = Arc::new(upstream);
        let repository = RetryingRecordRepository::new(upstream.clone(), audit.clone());
        let service = CatalogService::new(repository, audit.clone());
        let controller = RecordController::new(service, audit.clone())
            .with_default_policy(config.retry.to_policy());

        Self {
            config,
            controller: Arc::new(controller),
            upstream,
            audit,
        }
    }
}
