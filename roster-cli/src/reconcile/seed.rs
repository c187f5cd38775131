//! Template data for a fresh workspace
//!
//! `init` writes [`sample_store`] as the starting master workbook and, when
//! asked, [`sample_batch`] as an update queue that touches every operation
//! kind including a few rows that are expected to be rejected.

use anyhow::Result;
use chrono::NaiveDate;

use super::batch::{OperationKind, RawBatch};
use super::store::Store;
use super::types::{Row, TableKind, Value, cols};

/// Starting master dataset
pub fn sample_store() -> Result<Store> {
    let mut store = Store::new();

    store.replace(
        TableKind::Teams,
        vec![
            team_row("STMT", "Statement", "Kamal Douglas"),
            team_row("PAYT", "Payout", "Rahul Verma"),
            team_row("MAINT", "Maintenance", "Mary Mole"),
            team_row("DPER", "Doc Prep & E-Reg", "Vanessa E Malendez"),
        ],
    )?;

    store.replace(
        TableKind::Employees,
        vec![
            employee_row("TEST001", "John", "Doe", "STMT"),
            employee_row("TEST002", "Jane", "Smith", "PAYT"),
            employee_row("TEST003", "Bob", "Johnson", "PAYT"),
        ],
    )?;

    store.replace(
        TableKind::Skills,
        vec![
            skill_row("STMT1", "Process_Statements", "STMT"),
            skill_row("STMT2", "Penalty_Waiver_Review", "STMT"),
            skill_row("PAYT1", "Process_Payout_Exception", "PAYT"),
            skill_row("PAYT2", "Approve_Payout_Exception", "PAYT"),
        ],
    )?;

    store.replace(
        TableKind::Certifications,
        vec![
            training_row("TEST001", "STMT1", 1, NaiveDate::from_ymd_opt(2025, 10, 3)),
            training_row("TEST001", "PAYT2", 2, NaiveDate::from_ymd_opt(2024, 5, 15)),
            training_row("TEST002", "PAYT1", 3, NaiveDate::from_ymd_opt(2023, 1, 1)),
        ],
    )?;

    Ok(store)
}

/// Update queue exercising every operation kind against [`sample_store`]
///
/// Expected outcome: STMT stays (TEST001 still on it), CMT is added, PAYT2 and
/// TEST003 are removed with their training records, TEST004 joins CMT while
/// TEST005 is rejected for team 99, and of the three training rows only
/// TEST002/PAYT1 lands (TEST005 does not exist, DPER1 was never a skill).
pub fn sample_batch(certified_on: NaiveDate) -> RawBatch {
    RawBatch::new()
        .with(
            OperationKind::RemoveTeam,
            vec![Row::new().with(cols::TEAM_ID, "STMT")],
        )
        .with(
            OperationKind::RemoveEmployee,
            vec![Row::new().with(cols::EMPLOYEE_ID, "TEST003")],
        )
        .with(
            OperationKind::RemoveSkill,
            vec![Row::new().with(cols::SKILL_ID, "PAYT2")],
        )
        .with(
            OperationKind::AddTeam,
            vec![team_row("CMT", "Credit Maintenance", "Eric Melo")],
        )
        .with(
            OperationKind::UpdateTeam,
            vec![
                Row::new()
                    .with(cols::TEAM_ID, "MAINT")
                    .with(cols::MANAGER, "Mary Mole-Hart")
                    .with(cols::TEAM_NAME, Value::Null),
            ],
        )
        .with(
            OperationKind::AddEmployee,
            vec![
                employee_row("TEST004", "Samantha", "White", "CMT"),
                employee_row("TEST005", "Robert", "Mateuse", "99"),
            ],
        )
        .with(
            OperationKind::AddSkill,
            vec![skill_row("MAINT01", "Data Entry", "MAINT")],
        )
        .with(
            OperationKind::AddTrainingMap,
            vec![
                training_row("TEST002", "PAYT1", 1, Some(certified_on)),
                training_row("TEST005", "STMT1", 1, Some(certified_on)),
                training_row("TEST004", "DPER1", 1, Some(certified_on)),
            ],
        )
}

fn team_row(id: &str, name: &str, manager: &str) -> Row {
    Row::new()
        .with(cols::TEAM_ID, id)
        .with(cols::TEAM_NAME, name)
        .with(cols::MANAGER, manager)
}

fn employee_row(id: &str, first: &str, last: &str, team: &str) -> Row {
    Row::new()
        .with(cols::EMPLOYEE_ID, id)
        .with(cols::FIRST_NAME, first)
        .with(cols::LAST_NAME, last)
        .with(cols::TEAM_ID, team)
        .with(cols::STATUS, "Active")
}

fn skill_row(id: &str, name: &str, team: &str) -> Row {
    Row::new()
        .with(cols::SKILL_ID, id)
        .with(cols::SKILL_NAME, name)
        .with(cols::TEAM_ID, team)
}

fn training_row(employee: &str, skill: &str, level: i64, date: Option<NaiveDate>) -> Row {
    Row::new()
        .with(cols::EMPLOYEE_ID, employee)
        .with(cols::SKILL_ID, skill)
        .with(cols::PROFICIENCY_LEVEL, level)
        .with(cols::CERTIFICATION_DATE, date)
}
