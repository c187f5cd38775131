//! Loosely-typed row-records as they arrive from a sheet

use serde::Serialize;

use super::Value;

static NULL: Value = Value::Null;

/// Ordered column → value mapping for one sheet row
///
/// Column order is the order cells were inserted, which for rows read from a
/// workbook is the header order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Row {
    cells: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    /// Get a cell; absent columns read as null
    pub fn get(&self, column: &str) -> &Value {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
            .unwrap_or(&NULL)
    }

    /// Insert or overwrite a cell, keeping the original column position
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(name, _)| *name == column) {
            Some((_, slot)) => *slot = value,
            None => self.cells.push((column, value)),
        }
    }

    /// Natural key stored in `column`, if present and key-shaped
    pub fn key(&self, column: &str) -> Option<String> {
        self.get(column).as_key()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.cells.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// True when every cell is null
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, value)| value.is_null())
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}
