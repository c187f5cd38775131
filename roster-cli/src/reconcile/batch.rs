//! Change batches
//!
//! A batch arrives as loosely-typed rows grouped by sheet name. Parsing
//! happens once, here: each recognised sheet becomes a list of typed requests
//! and rows that fail their required-field checks are rejected up front, so
//! the pipeline stages never have to ask whether a column is present.

use std::collections::BTreeMap;

use serde::Serialize;

use super::reject::{RejectReason, Rejections};
use super::types::{
    Certification, Employee, FieldError, Row, Skill, TableRow, Team, TeamPatch, cols,
};

/// Kind of change-request, named after its queue sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum OperationKind {
    #[serde(rename = "Remove_Team")]
    RemoveTeam,
    #[serde(rename = "Remove_Employee")]
    RemoveEmployee,
    #[serde(rename = "Remove_Skill")]
    RemoveSkill,
    #[serde(rename = "Add_Team")]
    AddTeam,
    #[serde(rename = "Update_Team")]
    UpdateTeam,
    #[serde(rename = "Add_Employee")]
    AddEmployee,
    #[serde(rename = "Add_Skill")]
    AddSkill,
    #[serde(rename = "Add_Training_Map")]
    AddTrainingMap,
}

impl OperationKind {
    /// All kinds, in pipeline order
    pub const ALL: [OperationKind; 8] = [
        OperationKind::RemoveTeam,
        OperationKind::RemoveEmployee,
        OperationKind::RemoveSkill,
        OperationKind::AddTeam,
        OperationKind::UpdateTeam,
        OperationKind::AddEmployee,
        OperationKind::AddSkill,
        OperationKind::AddTrainingMap,
    ];

    pub fn sheet_name(&self) -> &'static str {
        match self {
            OperationKind::RemoveTeam => "Remove_Team",
            OperationKind::RemoveEmployee => "Remove_Employee",
            OperationKind::RemoveSkill => "Remove_Skill",
            OperationKind::AddTeam => "Add_Team",
            OperationKind::UpdateTeam => "Update_Team",
            OperationKind::AddEmployee => "Add_Employee",
            OperationKind::AddSkill => "Add_Skill",
            OperationKind::AddTrainingMap => "Add_Training_Map",
        }
    }

    pub fn from_sheet_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.sheet_name() == name.trim())
    }

    /// Columns that must be non-null for a row of this kind
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            OperationKind::RemoveTeam => &[cols::TEAM_ID],
            OperationKind::RemoveEmployee => &[cols::EMPLOYEE_ID],
            OperationKind::RemoveSkill => &[cols::SKILL_ID],
            OperationKind::AddTeam => &[cols::TEAM_ID, cols::TEAM_NAME],
            OperationKind::UpdateTeam => &[cols::TEAM_ID],
            OperationKind::AddEmployee => &[
                cols::EMPLOYEE_ID,
                cols::FIRST_NAME,
                cols::LAST_NAME,
                cols::TEAM_ID,
            ],
            OperationKind::AddSkill => &[cols::SKILL_ID, cols::SKILL_NAME],
            OperationKind::AddTrainingMap => &[
                cols::EMPLOYEE_ID,
                cols::SKILL_ID,
                cols::PROFICIENCY_LEVEL,
                cols::CERTIFICATION_DATE,
            ],
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.sheet_name())
    }
}

/// Unparsed batch: rows grouped by sheet name, in sheet order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawBatch {
    sheets: Vec<(String, Vec<Row>)>,
}

impl RawBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sheet(&mut self, name: impl Into<String>, rows: Vec<Row>) {
        self.sheets.push((name.into(), rows));
    }

    /// Builder-style variant of [`RawBatch::add_sheet`] keyed by operation kind
    pub fn with(mut self, kind: OperationKind, rows: Vec<Row>) -> Self {
        self.add_sheet(kind.sheet_name(), rows);
        self
    }

    pub fn sheets(&self) -> impl Iterator<Item = (&str, &[Row])> {
        self.sheets
            .iter()
            .map(|(name, rows)| (name.as_str(), rows.as_slice()))
    }

    pub fn total_rows(&self) -> usize {
        self.sheets.iter().map(|(_, rows)| rows.len()).sum()
    }
}

/// A typed change-request together with the row it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Request<T> {
    /// 1-based data row in the batch sheet
    pub row_number: usize,
    pub payload: Row,
    pub value: T,
}

/// Removal requests, keyed by natural id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Removals {
    pub teams: Vec<Request<String>>,
    pub employees: Vec<Request<String>>,
    pub skills: Vec<Request<String>>,
}

/// Addition and update requests
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Upserts {
    pub add_teams: Vec<Request<Team>>,
    pub update_teams: Vec<Request<TeamPatch>>,
    pub add_employees: Vec<Request<Employee>>,
    pub add_skills: Vec<Request<Skill>>,
    pub add_training: Vec<Request<Certification>>,
}

/// A parsed batch, ready for the pipeline
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeBatch {
    pub removals: Removals,
    pub upserts: Upserts,
    /// Removal rows ignored because their key was blank
    pub skipped: BTreeMap<OperationKind, usize>,
}

impl ChangeBatch {
    /// Parse a raw batch into typed requests
    ///
    /// Rows that fail required-field or type checks come back as rejections.
    /// Removal rows with a blank key are silently skipped instead. Sheets whose
    /// name is not an operation kind are ignored.
    pub fn parse(raw: &RawBatch) -> (ChangeBatch, Rejections) {
        let mut batch = ChangeBatch::default();
        let mut rejections = Rejections::new();

        for (sheet_name, rows) in raw.sheets() {
            let Some(kind) = OperationKind::from_sheet_name(sheet_name) else {
                log::debug!("Ignoring unrecognised batch sheet '{}'", sheet_name);
                continue;
            };

            let mut parser = SheetParser {
                kind,
                rows,
                rejections: &mut rejections,
            };

            match kind {
                OperationKind::RemoveTeam => {
                    let (ids, skipped) = parser.removal_ids();
                    batch.removals.teams.extend(ids);
                    *batch.skipped.entry(kind).or_default() += skipped;
                }
                OperationKind::RemoveEmployee => {
                    let (ids, skipped) = parser.removal_ids();
                    batch.removals.employees.extend(ids);
                    *batch.skipped.entry(kind).or_default() += skipped;
                }
                OperationKind::RemoveSkill => {
                    let (ids, skipped) = parser.removal_ids();
                    batch.removals.skills.extend(ids);
                    *batch.skipped.entry(kind).or_default() += skipped;
                }
                OperationKind::AddTeam => batch.upserts.add_teams.extend(parser.typed(Team::from_row)),
                OperationKind::UpdateTeam => batch
                    .upserts
                    .update_teams
                    .extend(parser.typed(TeamPatch::from_row)),
                OperationKind::AddEmployee => batch
                    .upserts
                    .add_employees
                    .extend(parser.typed(Employee::from_row)),
                OperationKind::AddSkill => batch.upserts.add_skills.extend(parser.typed(Skill::from_row)),
                OperationKind::AddTrainingMap => batch
                    .upserts
                    .add_training
                    .extend(parser.typed(Certification::from_row)),
            }
        }

        batch.skipped.retain(|_, count| *count > 0);
        (batch, rejections)
    }

    /// Total number of typed requests
    pub fn len(&self) -> usize {
        let r = &self.removals;
        let u = &self.upserts;
        r.teams.len()
            + r.employees.len()
            + r.skills.len()
            + u.add_teams.len()
            + u.update_teams.len()
            + u.add_employees.len()
            + u.add_skills.len()
            + u.add_training.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct SheetParser<'a> {
    kind: OperationKind,
    rows: &'a [Row],
    rejections: &'a mut Rejections,
}

impl SheetParser<'_> {
    fn data_rows(&self) -> impl Iterator<Item = (usize, &Row)> {
        self.rows
            .iter()
            .enumerate()
            .map(|(idx, row)| (idx + 1, row))
            .filter(|(_, row)| !row.is_blank())
    }

    /// Extract removal keys; returns the requests and how many rows were skipped
    fn removal_ids(&mut self) -> (Vec<Request<String>>, usize) {
        let column = self.kind.required_columns()[0];
        let mut requests = Vec::new();
        let mut skipped = 0;
        let mut rejected = Vec::new();

        for (row_number, row) in self.data_rows() {
            let value = row.get(column);
            if value.is_null() {
                skipped += 1;
                continue;
            }
            match value.as_key() {
                Some(id) => requests.push(Request {
                    row_number,
                    payload: row.clone(),
                    value: id,
                }),
                None => rejected.push((
                    row_number,
                    row.clone(),
                    RejectReason::InvalidFieldValue {
                        column: column.to_string(),
                        value: value.to_string(),
                    },
                )),
            }
        }

        for (row_number, row, reason) in rejected {
            self.rejections.push(self.kind, row_number, &row, reason);
        }
        if skipped > 0 {
            log::debug!("{}: skipped {} row(s) with blank {}", self.kind, skipped, column);
        }
        (requests, skipped)
    }

    /// Check required columns, then parse each row into a typed request
    fn typed<T>(&mut self, parse: fn(&Row) -> Result<T, FieldError>) -> Vec<Request<T>> {
        let kind = self.kind;
        let mut requests = Vec::new();
        let mut rejected = Vec::new();

        for (row_number, row) in self.data_rows() {
            let outcome = kind
                .required_columns()
                .iter()
                .find(|column| row.get(column).is_null())
                .map(|column| Err(FieldError::Missing(column.to_string())))
                .unwrap_or_else(|| parse(row));

            match outcome {
                Ok(value) => requests.push(Request {
                    row_number,
                    payload: row.clone(),
                    value,
                }),
                Err(err) => rejected.push((row_number, row.clone(), RejectReason::from(err))),
            }
        }

        for (row_number, row, reason) in rejected {
            self.rejections.push(kind, row_number, &row, reason);
        }
        requests
    }
}
