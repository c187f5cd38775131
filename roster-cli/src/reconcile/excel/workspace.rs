//! Workbook-backed storage for a reconciliation run

use anyhow::{Context, Result, bail};
use chrono::Local;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::reader::{read_master_workbook, read_queue_workbook};
use super::writer::{write_master_workbook, write_rejections_workbook};
use crate::config::Config;
use crate::reconcile::batch::RawBatch;
use crate::reconcile::driver::ReconcileIo;
use crate::reconcile::reject::RejectedRecord;
use crate::reconcile::store::Store;

pub const ARCHIVE_PREFIX: &str = "PROCESSED_updates_";
pub const REJECTS_PREFIX: &str = "rejected_records_";
const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// The master workbook, the queue workbook and the archive directory
///
/// One timestamp is taken per workspace so the archived queue and its
/// rejection report share a suffix.
#[derive(Debug, Clone)]
pub struct XlsxWorkspace {
    master_path: PathBuf,
    queue_path: PathBuf,
    archive_dir: PathBuf,
    stamp: String,
}

impl XlsxWorkspace {
    pub fn new(config: &Config) -> Self {
        Self {
            master_path: config.master_path(),
            queue_path: config.queue_path(),
            archive_dir: config.archive_dir.clone(),
            stamp: Local::now().format(STAMP_FORMAT).to_string(),
        }
    }

    /// Override the run timestamp
    pub fn with_stamp(mut self, stamp: impl Into<String>) -> Self {
        self.stamp = stamp.into();
        self
    }

    pub fn master_path(&self) -> &Path {
        &self.master_path
    }

    pub fn queue_path(&self) -> &Path {
        &self.queue_path
    }

    pub fn archive_path(&self) -> PathBuf {
        self.archive_dir
            .join(format!("{}{}.xlsx", ARCHIVE_PREFIX, self.stamp))
    }

    pub fn rejections_path(&self) -> PathBuf {
        self.archive_dir
            .join(format!("{}{}.xlsx", REJECTS_PREFIX, self.stamp))
    }

    /// Scratch file the master workbook is written to before the rename
    fn staging_path(&self) -> PathBuf {
        self.master_path.with_extension("saving.xlsx")
    }

    fn ensure_archive_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.archive_dir).with_context(|| {
            format!(
                "Failed to create archive directory: {}",
                self.archive_dir.display()
            )
        })
    }
}

impl ReconcileIo for XlsxWorkspace {
    fn load_store(&mut self) -> Result<Store> {
        if !self.master_path.exists() {
            bail!("Master workbook not found: {}", self.master_path.display());
        }
        read_master_workbook(&self.master_path)
    }

    fn load_batch(&mut self) -> Result<RawBatch> {
        if !self.queue_path.exists() {
            bail!("Update queue not found: {}", self.queue_path.display());
        }
        read_queue_workbook(&self.queue_path)
    }

    fn persist_store(&mut self, store: &Store) -> Result<()> {
        // Staged next to the target and renamed into place
        let staging = self.staging_path();
        let saved = write_master_workbook(store, &staging).and_then(|()| {
            fs::rename(&staging, &self.master_path).with_context(|| {
                format!(
                    "Failed to replace master workbook: {}",
                    self.master_path.display()
                )
            })
        });
        if let Err(err) = saved {
            match fs::remove_file(&staging) {
                Err(cleanup) if cleanup.kind() != io::ErrorKind::NotFound => log::warn!(
                    "Could not remove staging file {}: {}",
                    staging.display(),
                    cleanup
                ),
                _ => {}
            }
            return Err(err);
        }
        log::info!("Master dataset saved to {}", self.master_path.display());
        Ok(())
    }

    fn persist_rejections(&mut self, rejected: &[RejectedRecord]) -> Result<()> {
        self.ensure_archive_dir()?;
        let path = self.rejections_path();
        write_rejections_workbook(rejected, &path)?;
        log::warn!(
            "{} record(s) rejected; details in {}",
            rejected.len(),
            path.display()
        );
        Ok(())
    }

    fn archive_batch(&mut self) -> Result<()> {
        self.ensure_archive_dir()?;
        let target = self.archive_path();
        fs::rename(&self.queue_path, &target).with_context(|| {
            format!(
                "Failed to move {} to {}",
                self.queue_path.display(),
                target.display()
            )
        })?;
        log::info!("Update queue archived to {}", target.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_share_stamp() {
        let config = Config {
            data_dir: PathBuf::from("/srv/roster"),
            archive_dir: PathBuf::from("/srv/roster/archive"),
            ..Config::default()
        };
        let workspace = XlsxWorkspace::new(&config).with_stamp("20250101_090000");

        assert_eq!(
            workspace.archive_path(),
            PathBuf::from("/srv/roster/archive/PROCESSED_updates_20250101_090000.xlsx")
        );
        assert_eq!(
            workspace.rejections_path(),
            PathBuf::from("/srv/roster/archive/rejected_records_20250101_090000.xlsx")
        );
        assert_eq!(
            workspace.master_path(),
            Path::new("/srv/roster/Master_Database.xlsx")
        );
    }

    #[test]
    fn test_missing_queue_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            archive_dir: dir.path().join("archive"),
            ..Config::default()
        };
        let mut workspace = XlsxWorkspace::new(&config);
        let err = workspace.load_batch().unwrap_err();
        assert!(err.to_string().contains("Update queue not found"));
    }

    #[test]
    fn test_failed_save_removes_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            archive_dir: dir.path().join("archive"),
            ..Config::default()
        };
        let mut workspace = XlsxWorkspace::new(&config);

        // A non-empty directory where the master workbook belongs makes the rename fail
        fs::create_dir_all(workspace.master_path()).unwrap();
        fs::write(workspace.master_path().join("keep.txt"), "x").unwrap();

        let store = crate::reconcile::seed::sample_store().unwrap();
        let err = workspace.persist_store(&store).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to replace master workbook"));
        assert!(!workspace.staging_path().exists());
        assert!(workspace.master_path().join("keep.txt").exists());
    }

    #[test]
    fn test_save_replaces_master_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            archive_dir: dir.path().join("archive"),
            ..Config::default()
        };
        let mut workspace = XlsxWorkspace::new(&config);
        let store = crate::reconcile::seed::sample_store().unwrap();

        workspace.persist_store(&store).unwrap();
        assert!(!workspace.staging_path().exists());
        assert_eq!(workspace.load_store().unwrap(), store);
    }
}
