//! Cell-level conversion between workbook cells and [`Value`]

use anyhow::Result;
use calamine::Data;
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use rust_xlsxwriter::{Format, Worksheet};

use crate::reconcile::types::Value;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Number formats applied to date cells on write
pub struct CellFormats {
    pub header: Format,
    pub date: Format,
    pub datetime: Format,
}

impl CellFormats {
    pub fn new() -> Self {
        Self {
            header: Format::new().set_bold(),
            date: Format::new().set_num_format("yyyy-mm-dd"),
            datetime: Format::new().set_num_format("yyyy-mm-dd hh:mm:ss"),
        }
    }
}

impl Default for CellFormats {
    fn default() -> Self {
        Self::new()
    }
}

/// Day zero of the 1900 date system as Excel counts it
fn excel_epoch() -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(1899, 12, 30).and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Convert an Excel serial date to a date (or date-time when it has a time part)
pub fn serial_to_value(serial: f64) -> Value {
    let days = serial.floor();
    let mut seconds = ((serial - days) * SECONDS_PER_DAY).round() as i64;
    let mut days = days as i64;
    if seconds >= SECONDS_PER_DAY as i64 {
        days += 1;
        seconds = 0;
    }

    let converted = excel_epoch()
        .zip(TimeDelta::try_days(days))
        .and_then(|(epoch, offset)| epoch.checked_add_signed(offset))
        .zip(TimeDelta::try_seconds(seconds))
        .and_then(|(dt, offset)| dt.checked_add_signed(offset));

    match converted {
        Some(dt) if seconds == 0 => Value::Date(dt.date()),
        Some(dt) => Value::DateTime(dt),
        None => Value::Float(serial),
    }
}

pub fn datetime_to_serial(dt: NaiveDateTime) -> Option<f64> {
    let delta = dt.signed_duration_since(excel_epoch()?);
    Some(delta.num_seconds() as f64 / SECONDS_PER_DAY)
}

pub fn date_to_serial(date: NaiveDate) -> Option<f64> {
    datetime_to_serial(date.and_hms_opt(0, 0, 0)?)
}

/// Convert a calamine cell to a [`Value`]
pub fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) => Value::text(s.as_str()),
        Data::Int(i) => Value::Int(*i),
        Data::Float(f) => {
            // Spreadsheets store every number as a float; whole ones are ints
            if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                Value::Int(*f as i64)
            } else {
                Value::Float(*f)
            }
        }
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) if dt.is_duration() => Value::Float(dt.as_f64()),
        Data::DateTime(dt) => serial_to_value(dt.as_f64()),
        Data::DateTimeIso(s) => parse_iso(s),
        Data::DurationIso(s) => Value::text(s.as_str()),
        Data::Error(_) => Value::Null,
    }
}

fn parse_iso(s: &str) -> Value {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return if dt.time() == chrono::NaiveTime::MIN {
            Value::Date(dt.date())
        } else {
            Value::DateTime(dt)
        };
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Value::Date(date);
    }
    Value::text(s)
}

/// Header text of a cell; non-text headers are treated as blank
pub fn header_name(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        _ => String::new(),
    }
}

/// Write one value; nulls leave the cell empty
pub fn write_value(
    ws: &mut Worksheet,
    row: u32,
    col: u16,
    value: &Value,
    formats: &CellFormats,
) -> Result<()> {
    match value {
        Value::Null => { /* Leave cell empty */ }
        Value::String(s) => {
            ws.write_string(row, col, s)?;
        }
        Value::Int(i) => {
            ws.write_number(row, col, *i as f64)?;
        }
        Value::Float(f) => {
            ws.write_number(row, col, *f)?;
        }
        Value::Bool(b) => {
            ws.write_boolean(row, col, *b)?;
        }
        Value::Date(d) => match date_to_serial(*d) {
            Some(serial) => {
                ws.write_number_with_format(row, col, serial, &formats.date)?;
            }
            None => {
                ws.write_string(row, col, &value.to_string())?;
            }
        },
        Value::DateTime(dt) => match datetime_to_serial(*dt) {
            Some(serial) => {
                ws.write_number_with_format(row, col, serial, &formats.datetime)?;
            }
            None => {
                ws.write_string(row, col, &value.to_string())?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_known_serials() {
        // 45933 is 2025-10-03 in the 1900 date system
        assert_eq!(date_to_serial(date(2025, 10, 3)), Some(45933.0));
        assert_eq!(serial_to_value(45933.0), Value::Date(date(2025, 10, 3)));
        assert_eq!(serial_to_value(1.0), Value::Date(date(1899, 12, 31)));
    }

    #[test]
    fn test_serial_with_time_part() {
        let dt = date(2024, 5, 15).and_hms_opt(12, 0, 0).unwrap();
        let serial = datetime_to_serial(dt).unwrap();
        assert_eq!(serial.fract(), 0.5);
        assert_eq!(serial_to_value(serial), Value::DateTime(dt));
    }

    #[test]
    fn test_cell_to_value() {
        assert_eq!(cell_to_value(&Data::Empty), Value::Null);
        assert_eq!(cell_to_value(&Data::String(String::new())), Value::Null);
        assert_eq!(cell_to_value(&Data::Float(3.0)), Value::Int(3));
        assert_eq!(cell_to_value(&Data::Float(3.25)), Value::Float(3.25));
        assert_eq!(
            cell_to_value(&Data::DateTimeIso("2023-01-01T00:00:00".into())),
            Value::Date(date(2023, 1, 1))
        );
        assert_eq!(
            cell_to_value(&Data::String("STMT".into())),
            Value::String("STMT".into())
        );
    }

    #[test]
    fn test_default_formats_match_new() {
        let formats = CellFormats::default();
        assert_eq!(formats.header, Format::new().set_bold());
        assert_eq!(formats.date, CellFormats::new().date);
        assert_eq!(
            formats.datetime,
            Format::new().set_num_format("yyyy-mm-dd hh:mm:ss")
        );
    }

    #[test]
    fn test_header_name() {
        assert_eq!(header_name(&Data::String(" Team_ID ".into())), "Team_ID");
        assert_eq!(header_name(&Data::Float(1.0)), "");
    }
}
