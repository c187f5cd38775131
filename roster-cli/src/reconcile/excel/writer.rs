//! Write the master workbook, queue workbooks and the rejection report

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};
use std::path::Path;

use super::cells::{CellFormats, write_value};
use crate::reconcile::batch::RawBatch;
use crate::reconcile::reject::RejectedRecord;
use crate::reconcile::store::Store;
use crate::reconcile::types::{Row, TableKind, Value};

/// Sheet name of the rejection report
pub const REJECTED_SHEET: &str = "Rejected";

/// Special column names (prefixed with _)
mod special_cols {
    pub const OPERATION: &str = "_operation";
    pub const ROW: &str = "_row";
    pub const REASON_CODE: &str = "_reason_code";
    pub const REASON: &str = "_reason";
}

/// Write all four master tables, one sheet each
pub fn write_master_workbook(store: &Store, path: &Path) -> Result<()> {
    let formats = CellFormats::new();
    let mut workbook = Workbook::new();

    for table in TableKind::ALL {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(table.sheet_name())?;
        write_table(worksheet, &store.columns(table), &store.get(table), &formats)?;
    }

    save(&mut workbook, path)
}

/// Write a raw batch with one sheet per queue sheet
pub fn write_queue_workbook(batch: &RawBatch, path: &Path) -> Result<()> {
    let formats = CellFormats::new();
    let mut workbook = Workbook::new();

    for (name, rows) in batch.sheets() {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(name)?;
        write_table(worksheet, &union_columns(rows), rows, &formats)?;
    }

    save(&mut workbook, path)
}

/// Write rejected records to a single sheet
///
/// Layout: `_operation`, `_row`, every payload column (first-seen order),
/// then `_reason_code` and `_reason`.
pub fn write_rejections_workbook(records: &[RejectedRecord], path: &Path) -> Result<()> {
    let formats = CellFormats::new();
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(REJECTED_SHEET)?;

    let payload_columns = union_columns(records.iter().map(|r| &r.payload));

    let mut columns: Vec<&str> = vec![special_cols::OPERATION, special_cols::ROW];
    columns.extend(payload_columns.iter().map(String::as_str));
    columns.push(special_cols::REASON_CODE);
    columns.push(special_cols::REASON);

    for (col, name) in columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &formats.header)?;
    }

    for (idx, record) in records.iter().enumerate() {
        let row = (idx + 1) as u32;
        worksheet.write_string(row, 0, record.operation.sheet_name())?;
        worksheet.write_number(row, 1, record.row_number as f64)?;

        for (col_idx, column) in payload_columns.iter().enumerate() {
            let col = (col_idx + 2) as u16;
            write_value(worksheet, row, col, record.payload.get(column), &formats)?;
        }

        let reason_col = (columns.len() - 2) as u16;
        worksheet.write_string(row, reason_col, record.reason.code())?;
        worksheet.write_string(row, reason_col + 1, &record.reason.to_string())?;
    }

    save(&mut workbook, path)
}

fn write_table(
    worksheet: &mut Worksheet,
    columns: &[String],
    rows: &[Row],
    formats: &CellFormats,
) -> Result<()> {
    for (col, name) in columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, name, &formats.header)?;
    }

    for (idx, record) in rows.iter().enumerate() {
        let row = (idx + 1) as u32;
        for (col, name) in columns.iter().enumerate() {
            let value: &Value = record.get(name);
            write_value(worksheet, row, col as u16, value, formats)?;
        }
    }
    Ok(())
}

/// Every column that appears in `rows`, in first-seen order
fn union_columns<'a>(rows: impl IntoIterator<Item = &'a Row>) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for row in rows {
        for column in row.columns() {
            if !columns.iter().any(|c| c == column) {
                columns.push(column.to_string());
            }
        }
    }
    columns
}

fn save(workbook: &mut Workbook, path: &Path) -> Result<()> {
    workbook
        .save(path)
        .with_context(|| format!("Failed to save Excel file: {}", path.display()))
}
