//! Read the master workbook and the update queue workbook

use anyhow::{Context, Result, bail};
use calamine::{Data, Range, Reader, Xlsx, open_workbook};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::cells::{cell_to_value, header_name};
use crate::reconcile::batch::RawBatch;
use crate::reconcile::store::Store;
use crate::reconcile::types::{Row, TableKind};

type Workbook = Xlsx<BufReader<File>>;

fn open(path: &Path) -> Result<Workbook> {
    open_workbook(path).with_context(|| format!("Failed to open Excel file: {}", path.display()))
}

/// Turn a sheet range into rows keyed by the header row
///
/// Every data row is returned, blank ones included, so callers can report
/// row numbers that match the sheet. Columns with an empty header are
/// dropped; so are `_`-prefixed metadata columns when `skip_metadata` is set.
pub fn rows_from_range(range: &Range<Data>, skip_metadata: bool) -> Vec<Row> {
    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(header_name).collect(),
        None => return Vec::new(),
    };

    rows.map(|cells| {
        headers
            .iter()
            .enumerate()
            .filter(|(_, header)| !header.is_empty())
            .filter(|(_, header)| !(skip_metadata && header.starts_with('_')))
            .map(|(idx, header)| {
                let value = cells.get(idx).map(cell_to_value).unwrap_or_default();
                (header.clone(), value)
            })
            .collect()
    })
    .collect()
}

/// Load the four master tables; a missing sheet is an error
pub fn read_master_workbook(path: &Path) -> Result<Store> {
    let mut workbook = open(path)?;
    let sheet_names = workbook.sheet_names().to_vec();
    let mut store = Store::new();

    for table in TableKind::ALL {
        let sheet = table.sheet_name();
        if !sheet_names.iter().any(|name| name == sheet) {
            bail!(
                "Master workbook {} has no '{}' sheet",
                path.display(),
                sheet
            );
        }

        let range = workbook
            .worksheet_range(sheet)
            .with_context(|| format!("Failed to read sheet: {}", sheet))?;
        let rows: Vec<Row> = rows_from_range(&range, false)
            .into_iter()
            .filter(|row| !row.is_blank())
            .collect();

        log::debug!("Read {} row(s) from {}", rows.len(), sheet);
        store
            .replace(table, rows)
            .with_context(|| format!("Invalid data in master sheet '{}'", sheet))?;
    }

    Ok(store)
}

/// Load every sheet of the queue workbook as raw rows
///
/// Sheet names are not interpreted here; unknown sheets are ignored later.
pub fn read_queue_workbook(path: &Path) -> Result<RawBatch> {
    let mut workbook = open(path)?;
    let sheet_names = workbook.sheet_names().to_vec();
    let mut batch = RawBatch::new();

    for sheet in sheet_names {
        let range = workbook
            .worksheet_range(&sheet)
            .with_context(|| format!("Failed to read sheet: {}", sheet))?;
        let rows = rows_from_range(&range, true);
        log::debug!("Queue sheet '{}' has {} row(s)", sheet, rows.len());
        batch.add_sheet(sheet, rows);
    }

    Ok(batch)
}
