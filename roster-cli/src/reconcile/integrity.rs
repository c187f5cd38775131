//! Referential-integrity checks over a store
//!
//! Key uniqueness is enforced when a table is loaded, and the pipeline keeps
//! the foreign keys resolvable on its own. This module exists to audit a
//! master workbook that was edited by hand and to assert the invariants in
//! tests.

use serde::Serialize;

use super::store::{RecordKey, Store};
use super::types::TableKind;

/// A single invariant violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum IntegrityIssue {
    EmployeeWithoutTeam {
        employee_id: String,
        team_id: String,
    },
    CertificationWithoutEmployee {
        employee_id: String,
        skill_id: String,
    },
    CertificationWithoutSkill {
        employee_id: String,
        skill_id: String,
    },
}

impl std::fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntegrityIssue::EmployeeWithoutTeam {
                employee_id,
                team_id,
            } => write!(
                f,
                "Employees: {} references missing team '{}'",
                employee_id, team_id
            ),
            IntegrityIssue::CertificationWithoutEmployee {
                employee_id,
                skill_id,
            } => write!(
                f,
                "Employee_Skills_Map: {}/{} references missing employee",
                employee_id, skill_id
            ),
            IntegrityIssue::CertificationWithoutSkill {
                employee_id,
                skill_id,
            } => write!(
                f,
                "Employee_Skills_Map: {}/{} references missing skill",
                employee_id, skill_id
            ),
        }
    }
}

/// Collect every invariant violation in `store`
pub fn check(store: &Store) -> Vec<IntegrityIssue> {
    let mut issues = Vec::new();

    for employee in store.employees() {
        if !store.contains(TableKind::Teams, RecordKey::Id(&employee.team_id)) {
            issues.push(IntegrityIssue::EmployeeWithoutTeam {
                employee_id: employee.employee_id.clone(),
                team_id: employee.team_id.clone(),
            });
        }
    }

    for cert in store.certifications() {
        if !store.contains(TableKind::Employees, RecordKey::Id(&cert.employee_id)) {
            issues.push(IntegrityIssue::CertificationWithoutEmployee {
                employee_id: cert.employee_id.clone(),
                skill_id: cert.skill_id.clone(),
            });
        }
        if !store.contains(TableKind::Skills, RecordKey::Id(&cert.skill_id)) {
            issues.push(IntegrityIssue::CertificationWithoutSkill {
                employee_id: cert.employee_id.clone(),
                skill_id: cert.skill_id.clone(),
            });
        }
    }

    issues
}
