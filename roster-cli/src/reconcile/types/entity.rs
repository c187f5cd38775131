//! Typed master-table entities and their row mappings

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;

use super::{Row, Value};

/// Column names shared by the master workbook and the update queue
pub mod cols {
    pub const TEAM_ID: &str = "Team_ID";
    pub const TEAM_NAME: &str = "Team_Name";
    pub const MANAGER: &str = "Manager";
    pub const EMPLOYEE_ID: &str = "ACF2_ID";
    pub const FIRST_NAME: &str = "First_Name";
    pub const LAST_NAME: &str = "Last_Name";
    pub const STATUS: &str = "Status";
    pub const SKILL_ID: &str = "Skill_ID";
    pub const SKILL_NAME: &str = "Skill_Name";
    pub const CATEGORY: &str = "Category";
    pub const PROFICIENCY_LEVEL: &str = "Proficiency_Level";
    pub const CERTIFICATION_DATE: &str = "Certification_Date";
    pub const EXPIRATION_DATE: &str = "Expiration_Date";
}

/// Columns beyond the modelled ones, preserved verbatim in header order
pub type Attributes = IndexMap<String, Value>;

/// The four master tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum TableKind {
    Teams,
    Employees,
    Skills,
    Certifications,
}

impl TableKind {
    pub const ALL: [TableKind; 4] = [
        TableKind::Teams,
        TableKind::Employees,
        TableKind::Skills,
        TableKind::Certifications,
    ];

    /// Sheet name in the master workbook
    pub fn sheet_name(&self) -> &'static str {
        match self {
            TableKind::Teams => "Teams",
            TableKind::Employees => "Employees",
            TableKind::Skills => "Skills",
            TableKind::Certifications => "Employee_Skills_Map",
        }
    }

    /// Modelled columns, in the order they are written
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            TableKind::Teams => &[cols::TEAM_ID, cols::TEAM_NAME, cols::MANAGER],
            TableKind::Employees => &[
                cols::EMPLOYEE_ID,
                cols::FIRST_NAME,
                cols::LAST_NAME,
                cols::TEAM_ID,
                cols::STATUS,
            ],
            TableKind::Skills => &[cols::SKILL_ID, cols::SKILL_NAME, cols::TEAM_ID, cols::CATEGORY],
            TableKind::Certifications => &[
                cols::EMPLOYEE_ID,
                cols::SKILL_ID,
                cols::PROFICIENCY_LEVEL,
                cols::CERTIFICATION_DATE,
                cols::EXPIRATION_DATE,
            ],
        }
    }
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.sheet_name())
    }
}

/// Why a row could not be turned into a typed entity
#[derive(Debug, Clone, PartialEq)]
pub enum FieldError {
    /// Required column is absent or null
    Missing(String),
    /// Column holds a value of the wrong shape
    Invalid { column: String, value: Value },
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldError::Missing(column) => write!(f, "missing required field '{}'", column),
            FieldError::Invalid { column, value } => {
                write!(f, "invalid value '{}' in field '{}'", value, column)
            }
        }
    }
}

impl std::error::Error for FieldError {}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Team {
    pub team_id: String,
    pub team_name: String,
    pub manager: Option<String>,
    pub extra: Attributes,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Employee {
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    pub team_id: String,
    pub status: Option<String>,
    pub extra: Attributes,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Skill {
    pub skill_id: String,
    pub skill_name: String,
    /// Owning team or required area; not enforced as a foreign key
    pub team_id: Option<String>,
    pub category: Option<String>,
    pub extra: Attributes,
}

/// One employee's certification in one skill, keyed by the pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Certification {
    pub employee_id: String,
    pub skill_id: String,
    pub proficiency_level: Option<i64>,
    pub certification_date: NaiveDate,
    pub expiration_date: Option<NaiveDate>,
    pub extra: Attributes,
}

impl Certification {
    pub fn key(&self) -> (&str, &str) {
        (&self.employee_id, &self.skill_id)
    }
}

/// Partial update of a team; `None` leaves the stored value untouched
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamPatch {
    pub team_id: String,
    pub team_name: Option<String>,
    pub manager: Option<String>,
    pub extra: Attributes,
}

impl TeamPatch {
    pub fn apply(&self, team: &mut Team) {
        if let Some(name) = &self.team_name {
            team.team_name = name.clone();
        }
        if let Some(manager) = &self.manager {
            team.manager = Some(manager.clone());
        }
        for (column, value) in &self.extra {
            team.extra.insert(column.clone(), value.clone());
        }
    }
}

/// Conversion between a typed entity and its row-record
pub trait TableRow: Sized {
    const TABLE: TableKind;

    fn from_row(row: &Row) -> Result<Self, FieldError>;

    fn to_row(&self) -> Row;

    fn extra(&self) -> &Attributes;
}

impl TableRow for Team {
    const TABLE: TableKind = TableKind::Teams;

    fn from_row(row: &Row) -> Result<Self, FieldError> {
        Ok(Team {
            team_id: required_key(row, cols::TEAM_ID)?,
            team_name: required_text(row, cols::TEAM_NAME)?,
            manager: optional_text(row, cols::MANAGER)?,
            extra: attributes(row, Self::TABLE),
        })
    }

    fn to_row(&self) -> Row {
        let mut row = Row::new()
            .with(cols::TEAM_ID, self.team_id.as_str())
            .with(cols::TEAM_NAME, self.team_name.as_str())
            .with(cols::MANAGER, self.manager.clone());
        append_attributes(&mut row, &self.extra);
        row
    }

    fn extra(&self) -> &Attributes {
        &self.extra
    }
}

impl TableRow for Employee {
    const TABLE: TableKind = TableKind::Employees;

    fn from_row(row: &Row) -> Result<Self, FieldError> {
        Ok(Employee {
            employee_id: required_key(row, cols::EMPLOYEE_ID)?,
            first_name: required_text(row, cols::FIRST_NAME)?,
            last_name: required_text(row, cols::LAST_NAME)?,
            team_id: required_key(row, cols::TEAM_ID)?,
            status: optional_text(row, cols::STATUS)?,
            extra: attributes(row, Self::TABLE),
        })
    }

    fn to_row(&self) -> Row {
        let mut row = Row::new()
            .with(cols::EMPLOYEE_ID, self.employee_id.as_str())
            .with(cols::FIRST_NAME, self.first_name.as_str())
            .with(cols::LAST_NAME, self.last_name.as_str())
            .with(cols::TEAM_ID, self.team_id.as_str())
            .with(cols::STATUS, self.status.clone());
        append_attributes(&mut row, &self.extra);
        row
    }

    fn extra(&self) -> &Attributes {
        &self.extra
    }
}

impl TableRow for Skill {
    const TABLE: TableKind = TableKind::Skills;

    fn from_row(row: &Row) -> Result<Self, FieldError> {
        Ok(Skill {
            skill_id: required_key(row, cols::SKILL_ID)?,
            skill_name: required_text(row, cols::SKILL_NAME)?,
            team_id: optional_key(row, cols::TEAM_ID)?,
            category: optional_text(row, cols::CATEGORY)?,
            extra: attributes(row, Self::TABLE),
        })
    }

    fn to_row(&self) -> Row {
        let mut row = Row::new()
            .with(cols::SKILL_ID, self.skill_id.as_str())
            .with(cols::SKILL_NAME, self.skill_name.as_str())
            .with(cols::TEAM_ID, self.team_id.clone())
            .with(cols::CATEGORY, self.category.clone());
        append_attributes(&mut row, &self.extra);
        row
    }

    fn extra(&self) -> &Attributes {
        &self.extra
    }
}

impl TableRow for Certification {
    const TABLE: TableKind = TableKind::Certifications;

    fn from_row(row: &Row) -> Result<Self, FieldError> {
        Ok(Certification {
            employee_id: required_key(row, cols::EMPLOYEE_ID)?,
            skill_id: required_key(row, cols::SKILL_ID)?,
            proficiency_level: optional_int(row, cols::PROFICIENCY_LEVEL)?,
            certification_date: required_date(row, cols::CERTIFICATION_DATE)?,
            expiration_date: optional_date(row, cols::EXPIRATION_DATE)?,
            extra: attributes(row, Self::TABLE),
        })
    }

    fn to_row(&self) -> Row {
        let mut row = Row::new()
            .with(cols::EMPLOYEE_ID, self.employee_id.as_str())
            .with(cols::SKILL_ID, self.skill_id.as_str())
            .with(cols::PROFICIENCY_LEVEL, self.proficiency_level)
            .with(cols::CERTIFICATION_DATE, self.certification_date)
            .with(cols::EXPIRATION_DATE, self.expiration_date);
        append_attributes(&mut row, &self.extra);
        row
    }

    fn extra(&self) -> &Attributes {
        &self.extra
    }
}

impl TeamPatch {
    pub fn from_row(row: &Row) -> Result<Self, FieldError> {
        Ok(TeamPatch {
            team_id: required_key(row, cols::TEAM_ID)?,
            team_name: optional_text(row, cols::TEAM_NAME)?,
            manager: optional_text(row, cols::MANAGER)?,
            extra: attributes(row, TableKind::Teams),
        })
    }
}

fn required<'a>(row: &'a Row, column: &str) -> Result<&'a Value, FieldError> {
    let value = row.get(column);
    if value.is_null() {
        Err(FieldError::Missing(column.to_string()))
    } else {
        Ok(value)
    }
}

fn invalid(column: &str, value: &Value) -> FieldError {
    FieldError::Invalid {
        column: column.to_string(),
        value: value.clone(),
    }
}

fn required_key(row: &Row, column: &str) -> Result<String, FieldError> {
    let value = required(row, column)?;
    value.as_key().ok_or_else(|| invalid(column, value))
}

fn optional_key(row: &Row, column: &str) -> Result<Option<String>, FieldError> {
    match row.get(column) {
        Value::Null => Ok(None),
        value => value.as_key().map(Some).ok_or_else(|| invalid(column, value)),
    }
}

fn required_text(row: &Row, column: &str) -> Result<String, FieldError> {
    let value = required(row, column)?;
    value.as_text().ok_or_else(|| invalid(column, value))
}

fn optional_text(row: &Row, column: &str) -> Result<Option<String>, FieldError> {
    match row.get(column) {
        Value::Null => Ok(None),
        value => value.as_text().map(Some).ok_or_else(|| invalid(column, value)),
    }
}

fn optional_int(row: &Row, column: &str) -> Result<Option<i64>, FieldError> {
    match row.get(column) {
        Value::Null => Ok(None),
        value => value.as_int().map(Some).ok_or_else(|| invalid(column, value)),
    }
}

fn required_date(row: &Row, column: &str) -> Result<NaiveDate, FieldError> {
    let value = required(row, column)?;
    value.as_date().ok_or_else(|| invalid(column, value))
}

fn optional_date(row: &Row, column: &str) -> Result<Option<NaiveDate>, FieldError> {
    match row.get(column) {
        Value::Null => Ok(None),
        value => value.as_date().map(Some).ok_or_else(|| invalid(column, value)),
    }
}

/// Collect non-null cells outside the table's modelled columns
fn attributes(row: &Row, table: TableKind) -> Attributes {
    let known = table.columns();
    row.iter()
        .filter(|(column, value)| !known.contains(column) && !value.is_null())
        .map(|(column, value)| (column.to_string(), value.clone()))
        .collect()
}

fn append_attributes(row: &mut Row, extra: &Attributes) {
    for (column, value) in extra {
        row.insert(column.as_str(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_team_from_row_keeps_extra_columns() {
        let row = Row::new()
            .with(cols::TEAM_ID, "STMT")
            .with(cols::TEAM_NAME, "Statement")
            .with("Location", "Floor 3")
            .with("Notes", Value::Null);

        let team = Team::from_row(&row).unwrap();
        assert_eq!(team.team_id, "STMT");
        assert_eq!(team.manager, None);
        assert_eq!(team.extra.len(), 1);
        assert_eq!(team.extra["Location"], Value::String("Floor 3".into()));
    }

    #[test]
    fn test_employee_missing_field() {
        let row = Row::new()
            .with(cols::EMPLOYEE_ID, "TEST001")
            .with(cols::FIRST_NAME, "John")
            .with(cols::TEAM_ID, "STMT");

        let err = Employee::from_row(&row).unwrap_err();
        assert_eq!(err, FieldError::Missing(cols::LAST_NAME.to_string()));
    }

    #[test]
    fn test_numeric_team_id_is_normalized() {
        let row = Row::new()
            .with(cols::EMPLOYEE_ID, "TEST005")
            .with(cols::FIRST_NAME, "Robert")
            .with(cols::LAST_NAME, "Mateuse")
            .with(cols::TEAM_ID, 99i64);

        let employee = Employee::from_row(&row).unwrap();
        assert_eq!(employee.team_id, "99");
    }

    #[test]
    fn test_certification_invalid_date() {
        let row = Row::new()
            .with(cols::EMPLOYEE_ID, "TEST001")
            .with(cols::SKILL_ID, "STMT1")
            .with(cols::CERTIFICATION_DATE, "next tuesday");

        match Certification::from_row(&row) {
            Err(FieldError::Invalid { column, .. }) => {
                assert_eq!(column, cols::CERTIFICATION_DATE)
            }
            other => panic!("expected invalid date, got {:?}", other),
        }
    }

    #[test]
    fn test_certification_row_mapping() {
        let row = Row::new()
            .with(cols::EMPLOYEE_ID, "TEST001")
            .with(cols::SKILL_ID, "STMT1")
            .with(cols::PROFICIENCY_LEVEL, 2i64)
            .with(cols::CERTIFICATION_DATE, date(2025, 10, 3));

        let cert = Certification::from_row(&row).unwrap();
        assert_eq!(cert.key(), ("TEST001", "STMT1"));
        assert_eq!(cert.proficiency_level, Some(2));
        assert_eq!(cert.expiration_date, None);
        assert_eq!(Certification::from_row(&cert.to_row()).unwrap(), cert);
    }

    #[test]
    fn test_team_patch_only_touches_present_fields() {
        let mut team = Team {
            team_id: "STMT".into(),
            team_name: "Statement".into(),
            manager: Some("Kamal Douglas".into()),
            extra: Attributes::new(),
        };
        let patch = TeamPatch::from_row(
            &Row::new()
                .with(cols::TEAM_ID, "STMT")
                .with(cols::MANAGER, "Rahul Verma")
                .with(cols::TEAM_NAME, Value::Null),
        )
        .unwrap();

        patch.apply(&mut team);
        assert_eq!(team.team_name, "Statement");
        assert_eq!(team.manager.as_deref(), Some("Rahul Verma"));
    }

    #[test]
    fn test_team_patch_sets_extra_columns() {
        let mut team = Team::from_row(
            &Row::new()
                .with(cols::TEAM_ID, "MAINT")
                .with(cols::TEAM_NAME, "Maintenance")
                .with("Location", "Floor 2")
                .with("Cost_Center", "CC-100"),
        )
        .unwrap();
        let patch = TeamPatch::from_row(
            &Row::new()
                .with(cols::TEAM_ID, "MAINT")
                .with("Shift", "Night")
                .with("Location", "Floor 5")
                .with("Cost_Center", Value::Null),
        )
        .unwrap();

        patch.apply(&mut team);
        assert_eq!(team.extra["Location"], Value::String("Floor 5".into()));
        assert_eq!(team.extra["Cost_Center"], Value::String("CC-100".into()));
        let columns: Vec<&str> = team.extra.keys().map(String::as_str).collect();
        assert_eq!(columns, vec!["Location", "Cost_Center", "Shift"]);
    }

    #[test]
    fn test_extra_columns_keep_header_order() {
        let row = Row::new()
            .with(cols::TEAM_ID, "STMT")
            .with(cols::TEAM_NAME, "Statement")
            .with("Zone", "B")
            .with("Area", "North");

        let team = Team::from_row(&row).unwrap();
        let row = team.to_row();
        let columns: Vec<&str> = row.columns().collect();
        assert_eq!(
            columns,
            vec![cols::TEAM_ID, cols::TEAM_NAME, cols::MANAGER, "Zone", "Area"]
        );
    }
}
