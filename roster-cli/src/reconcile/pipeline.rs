//! The ordered reconciliation pipeline
//!
//! parse → remove → add/update. Each stage takes the store by value and hands
//! back the next state with its own rejections and counters.

use super::batch::{ChangeBatch, RawBatch};
use super::reject::Rejections;
use super::remove::apply_removals;
use super::store::Store;
use super::summary::RunSummary;
use super::upsert::apply_upserts;

/// Result of one pipeline stage (or of the whole pipeline)
#[derive(Debug, Clone)]
pub struct StageOutput {
    pub store: Store,
    pub rejections: Rejections,
    pub summary: RunSummary,
}

/// Run a raw batch through every stage against `store`
pub fn reconcile(store: Store, raw: &RawBatch) -> StageOutput {
    let (batch, parse_rejections) = ChangeBatch::parse(raw);
    log::info!(
        "Parsed {} change request(s) from {} row(s), {} rejected at parse time",
        batch.len(),
        raw.total_rows(),
        parse_rejections.len()
    );
    apply_batch(store, &batch, parse_rejections)
}

/// Run an already-parsed batch; `rejections` carries any parse-time rejects
pub fn apply_batch(store: Store, batch: &ChangeBatch, mut rejections: Rejections) -> StageOutput {
    let mut summary = RunSummary::new();
    for (kind, skipped) in &batch.skipped {
        summary.record_skipped(*kind, *skipped);
    }

    log::info!("Processing removals");
    let removed = apply_removals(store, &batch.removals);
    rejections.extend(removed.rejections);
    summary.merge(removed.summary);

    log::info!("Processing additions and updates");
    let upserted = apply_upserts(removed.store, &batch.upserts);
    rejections.extend(upserted.rejections);
    summary.merge(upserted.summary);

    summary.tally_rejections(&rejections);

    StageOutput {
        store: upserted.store,
        rejections,
        summary,
    }
}
