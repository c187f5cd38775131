//! Excel workbook I/O
//!
//! - `cells` - cell/value conversion, including serial dates
//! - `reader` - master and queue workbooks into a [`Store`](crate::reconcile::Store) / [`RawBatch`](crate::reconcile::RawBatch)
//! - `writer` - master, queue and rejection-report workbooks
//! - `workspace` - [`XlsxWorkspace`], the file-backed run collaborator

pub mod cells;
pub mod reader;
pub mod workspace;
pub mod writer;

pub use reader::{read_master_workbook, read_queue_workbook};
pub use workspace::XlsxWorkspace;
pub use writer::{REJECTED_SHEET, write_master_workbook, write_queue_workbook, write_rejections_workbook};
