//! Roster reconciliation
//!
//! Applies a queued batch of change-requests (removals, additions, updates)
//! to the master roster of teams, employees, skills and certifications while
//! keeping referential integrity. Requests that cannot be applied are
//! collected as rejected records instead of failing the run.

pub mod batch;
pub mod driver;
pub mod excel;
pub mod integrity;
pub mod pipeline;
pub mod reject;
pub mod remove;
pub mod seed;
pub mod store;
pub mod summary;
pub mod types;
pub mod upsert;

#[cfg(test)]
mod testing;

pub use batch::{ChangeBatch, OperationKind, RawBatch};
pub use driver::{ReconcileIo, Reconciler, RunOptions, RunReport};
pub use excel::XlsxWorkspace;
pub use integrity::IntegrityIssue;
pub use pipeline::{StageOutput, apply_batch, reconcile};
pub use reject::{RejectReason, RejectedRecord, Rejections};
pub use store::{RecordKey, Store};
pub use summary::{KindCounts, RunSummary};
pub use types::*;
