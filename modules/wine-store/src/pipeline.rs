//! Sequences every stage of a seed run against one store handle.
//!
//! Order: reset → load → tasters → link → cleanup → lookups. Each stage
//! reads the committed output of the one before it, so stages are awaited
//! one at a time. Only the lookup extractions run side by side, and they
//! are joined before the run is reported.
//!
//! There is no transaction scope; a reader that looks mid-run sees partial
//! state.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use wine_common::error::Result;
use wine_common::SeedConfig;

use crate::cleanup::{clean_fields, CleanupStats};
use crate::linker::{link_tastings, normalize_unlinked, LinkStats};
use crate::loader::load_tastings;
use crate::lookups::extract_lookups;
use crate::reset::reset_if_populated;
use crate::tasters::create_tasters;
use crate::{SourceBatch, WineStore};

/// Stats from a full pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub reset: bool,
    pub tastings_loaded: u64,
    pub tasters_created: u64,
    pub link: LinkStats,
    pub cleanup: CleanupStats,
    /// Document count per lookup collection.
    pub lookups: BTreeMap<String, u64>,
}

impl std::fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Wine collection set up (run {})", self.run_id)?;
        if self.reset {
            writeln!(f, "  previous data dropped")?;
        }
        writeln!(f, "  tastings: {}", self.tastings_loaded)?;
        writeln!(
            f,
            "  tasters:  {} ({} tastings linked)",
            self.tasters_created, self.link.matched
        )?;
        for (name, count) in &self.lookups {
            writeln!(f, "  {name}: {count}")?;
        }
        let secs = (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0;
        write!(f, "  took {secs:.2}s")
    }
}

/// Orchestrates every stage into a complete rebuild.
pub struct Pipeline {
    store: WineStore,
    config: SeedConfig,
}

impl Pipeline {
    pub fn new(store: WineStore, config: SeedConfig) -> Self {
        Self { store, config }
    }

    /// Full rebuild from a parsed batch. Any stage failure ends the run.
    pub async fn run(&self, batch: &SourceBatch) -> Result<PipelineReport> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(%run_id, records = batch.len(), "Pipeline: seed run starting");

        let reset = reset_if_populated(&self.store).await?;
        let tastings_loaded = load_tastings(&self.store, batch).await?;

        let tasters = create_tasters(&self.store).await?;
        let mut link = link_tastings(&self.store, self.config.link_concurrency).await?;
        if self.config.normalize_unlinked {
            link.unlinked_normalized = normalize_unlinked(&self.store).await?;
        }

        // Every link update has been awaited above; cleanup may start.
        let cleanup = clean_fields(&self.store, self.config.region_cleanup).await?;
        let lookups = extract_lookups(&self.store).await?;

        let report = PipelineReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            reset,
            tastings_loaded,
            tasters_created: tasters.len() as u64,
            link,
            cleanup,
            lookups,
        };
        info!(
            %run_id,
            tastings = report.tastings_loaded,
            tasters = report.tasters_created,
            linked = report.link.matched,
            "Pipeline: seed run complete"
        );
        Ok(report)
    }
}
