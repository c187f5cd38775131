//! Reconciliation driver
//!
//! One run: load store and batch, run the pipeline, then persist the store,
//! persist rejections and archive the batch. Load failures abort before
//! anything is written; a failed store save aborts before the batch is
//! archived so it stays available for a retry.

use anyhow::{Context, Result};
use serde::Serialize;

use super::batch::RawBatch;
use super::pipeline::reconcile;
use super::reject::RejectedRecord;
use super::store::Store;
use super::summary::RunSummary;

/// Storage collaborator used by [`Reconciler`]
pub trait ReconcileIo {
    /// Load the master dataset
    fn load_store(&mut self) -> Result<Store>;

    /// Load the pending change batch
    fn load_batch(&mut self) -> Result<RawBatch>;

    /// Write the reconciled master dataset
    fn persist_store(&mut self, store: &Store) -> Result<()>;

    /// Write rejected records for manual follow-up; only called when non-empty
    fn persist_rejections(&mut self, rejected: &[RejectedRecord]) -> Result<()>;

    /// Move the consumed batch out of the queue; only called after a save
    fn archive_batch(&mut self) -> Result<()>;
}

/// Per-run options
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Run the pipeline without persisting or archiving anything
    pub dry_run: bool,
}

/// What happened during a run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub summary: RunSummary,
    pub rejections: Vec<RejectedRecord>,
    pub dry_run: bool,
    pub store_persisted: bool,
    pub rejections_persisted: bool,
    pub archived: bool,
    #[serde(skip)]
    pub store: Store,
}

/// Drives one reconciliation run against an I/O collaborator
pub struct Reconciler<I> {
    io: I,
    options: RunOptions,
}

impl<I: ReconcileIo> Reconciler<I> {
    pub fn new(io: I, options: RunOptions) -> Self {
        Self { io, options }
    }

    /// Execute one run
    ///
    /// Errors are fatal: nothing after the failing step was attempted.
    /// Rejection-file and archive failures are not fatal; they are logged and
    /// reported through the `rejections_persisted` / `archived` flags.
    pub fn run(&mut self) -> Result<RunReport> {
        let store = self.io.load_store().context("Failed to load master dataset")?;
        let raw = self.io.load_batch().context("Failed to load update queue")?;
        log::info!(
            "Loaded master dataset and {} queued row(s)",
            raw.total_rows()
        );

        let outcome = reconcile(store, &raw);
        let rejections = outcome.rejections.into_vec();

        let mut report = RunReport {
            summary: outcome.summary,
            rejections,
            dry_run: self.options.dry_run,
            store_persisted: false,
            rejections_persisted: false,
            archived: false,
            store: outcome.store,
        };

        if self.options.dry_run {
            log::info!("Dry run: skipping save, rejection file and archive");
            return Ok(report);
        }

        self.io
            .persist_store(&report.store)
            .context("Failed to save master dataset; update queue left in place")?;
        report.store_persisted = true;

        if !report.rejections.is_empty() {
            match self.io.persist_rejections(&report.rejections) {
                Ok(()) => report.rejections_persisted = true,
                Err(e) => log::error!(
                    "Failed to write {} rejected record(s): {:#}",
                    report.rejections.len(),
                    e
                ),
            }
        }

        match self.io.archive_batch() {
            Ok(()) => report.archived = true,
            Err(e) => log::error!("Master dataset saved but update queue not archived: {:#}", e),
        }

        Ok(report)
    }

    pub fn into_io(self) -> I {
        self.io
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::batch::OperationKind;
    use crate::reconcile::testing::store_fixture;
    use crate::reconcile::types::{Row, cols};
    use anyhow::bail;

    /// In-memory collaborator that records calls and can be told to fail
    #[derive(Default)]
    struct MemoryIo {
        store: Option<Store>,
        batch: Option<RawBatch>,
        fail_persist: bool,
        fail_rejections: bool,
        fail_archive: bool,
        saved: Option<Store>,
        rejected: Vec<RejectedRecord>,
        archived: bool,
        calls: Vec<&'static str>,
    }

    impl ReconcileIo for MemoryIo {
        fn load_store(&mut self) -> Result<Store> {
            self.calls.push("load_store");
            match &self.store {
                Some(store) => Ok(store.clone()),
                None => bail!("master workbook missing"),
            }
        }

        fn load_batch(&mut self) -> Result<RawBatch> {
            self.calls.push("load_batch");
            match &self.batch {
                Some(batch) => Ok(batch.clone()),
                None => bail!("queue workbook missing"),
            }
        }

        fn persist_store(&mut self, store: &Store) -> Result<()> {
            self.calls.push("persist_store");
            if self.fail_persist {
                bail!("disk full");
            }
            self.saved = Some(store.clone());
            Ok(())
        }

        fn persist_rejections(&mut self, rejected: &[RejectedRecord]) -> Result<()> {
            self.calls.push("persist_rejections");
            if self.fail_rejections {
                bail!("archive directory read-only");
            }
            self.rejected = rejected.to_vec();
            Ok(())
        }

        fn archive_batch(&mut self) -> Result<()> {
            self.calls.push("archive_batch");
            if self.fail_archive {
                bail!("queue file locked");
            }
            self.archived = true;
            Ok(())
        }
    }

    fn batch_with_one_reject() -> RawBatch {
        RawBatch::new()
            .with(
                OperationKind::RemoveTeam,
                vec![Row::new().with(cols::TEAM_ID, "STMT")],
            )
            .with(
                OperationKind::RemoveEmployee,
                vec![Row::new().with(cols::EMPLOYEE_ID, "TEST003")],
            )
    }

    fn io_with(batch: RawBatch) -> MemoryIo {
        MemoryIo {
            store: Some(store_fixture()),
            batch: Some(batch),
            ..Default::default()
        }
    }

    #[test]
    fn test_successful_run_persists_everything() {
        let mut reconciler = Reconciler::new(io_with(batch_with_one_reject()), RunOptions::default());
        let report = reconciler.run().unwrap();
        let io = reconciler.into_io();

        assert_eq!(
            io.calls,
            vec![
                "load_store",
                "load_batch",
                "persist_store",
                "persist_rejections",
                "archive_batch"
            ]
        );
        assert!(report.store_persisted && report.rejections_persisted && report.archived);
        assert_eq!(io.saved.as_ref(), Some(&report.store));
        assert_eq!(io.rejected.len(), 1);
        assert!(report.store.employee("TEST003").is_none());
    }

    #[test]
    fn test_no_rejections_skips_rejection_file() {
        let batch = RawBatch::new().with(
            OperationKind::RemoveEmployee,
            vec![Row::new().with(cols::EMPLOYEE_ID, "TEST003")],
        );
        let mut reconciler = Reconciler::new(io_with(batch), RunOptions::default());
        reconciler.run().unwrap();

        let io = reconciler.into_io();
        assert!(!io.calls.contains(&"persist_rejections"));
        assert!(io.archived);
    }

    #[test]
    fn test_load_failure_aborts_before_any_write() {
        let io = MemoryIo {
            store: Some(store_fixture()),
            batch: None,
            ..Default::default()
        };
        let mut reconciler = Reconciler::new(io, RunOptions::default());
        let err = reconciler.run().unwrap_err();
        assert!(format!("{:#}", err).contains("update queue"));

        let io = reconciler.into_io();
        assert_eq!(io.calls, vec!["load_store", "load_batch"]);
        assert!(io.saved.is_none());
    }

    #[test]
    fn test_store_load_failure_skips_batch_load() {
        let mut reconciler = Reconciler::new(MemoryIo::default(), RunOptions::default());
        assert!(reconciler.run().is_err());
        assert_eq!(reconciler.into_io().calls, vec!["load_store"]);
    }

    #[test]
    fn test_persist_failure_leaves_batch_unarchived() {
        let mut io = io_with(batch_with_one_reject());
        io.fail_persist = true;
        let mut reconciler = Reconciler::new(io, RunOptions::default());

        let err = reconciler.run().unwrap_err();
        assert!(format!("{:#}", err).contains("disk full"));

        let io = reconciler.into_io();
        assert!(!io.archived);
        assert!(!io.calls.contains(&"archive_batch"));
        assert!(!io.calls.contains(&"persist_rejections"));
    }

    #[test]
    fn test_rejection_write_failure_is_not_fatal() {
        let mut io = io_with(batch_with_one_reject());
        io.fail_rejections = true;
        let mut reconciler = Reconciler::new(io, RunOptions::default());

        let report = reconciler.run().unwrap();
        assert!(report.store_persisted);
        assert!(!report.rejections_persisted);
        assert!(report.archived);
    }

    #[test]
    fn test_archive_failure_is_reported() {
        let mut io = io_with(batch_with_one_reject());
        io.fail_archive = true;
        let mut reconciler = Reconciler::new(io, RunOptions::default());

        let report = reconciler.run().unwrap();
        assert!(report.store_persisted);
        assert!(!report.archived);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let mut reconciler = Reconciler::new(
            io_with(batch_with_one_reject()),
            RunOptions { dry_run: true },
        );
        let report = reconciler.run().unwrap();
        let io = reconciler.into_io();

        assert_eq!(io.calls, vec!["load_store", "load_batch"]);
        assert!(report.dry_run);
        assert_eq!(report.rejections.len(), 1);
        assert!(report.store.employee("TEST003").is_none());
    }
}
