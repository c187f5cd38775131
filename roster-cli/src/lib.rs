//! roster-sync: queue-driven maintenance of a team skills roster
//!
//! The master roster (teams, employees, skills, certifications) lives in an
//! Excel workbook. Changes are queued in a second workbook, one sheet per
//! operation kind, and applied in a fixed order by [`reconcile::Reconciler`].

pub mod cli;
pub mod config;
pub mod reconcile;
