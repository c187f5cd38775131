//! Rejection collection
//!
//! Every stage appends to the same [`Rejections`] list. A rejected record
//! keeps its original payload so it can be written back out for manual
//! follow-up.

use serde::Serialize;

use super::batch::OperationKind;
use super::types::{FieldError, Row};

/// Why a change-request was refused
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RejectReason {
    DuplicateTeamId,
    DuplicateEmployeeId,
    DuplicateSkillId,
    TeamNotFound,
    EmployeeNotFoundForCert,
    SkillNotFoundForCert,
    TeamHasDependents { dependents: usize },
    MissingRequiredField { column: String },
    InvalidFieldValue { column: String, value: String },
}

impl RejectReason {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::DuplicateTeamId => "DUPLICATE_TEAM_ID",
            RejectReason::DuplicateEmployeeId => "DUPLICATE_EMPLOYEE_ID",
            RejectReason::DuplicateSkillId => "DUPLICATE_SKILL_ID",
            RejectReason::TeamNotFound => "TEAM_NOT_FOUND",
            RejectReason::EmployeeNotFoundForCert => "EMPLOYEE_NOT_FOUND_FOR_CERT",
            RejectReason::SkillNotFoundForCert => "SKILL_NOT_FOUND_FOR_CERT",
            RejectReason::TeamHasDependents { .. } => "TEAM_HAS_DEPENDENTS",
            RejectReason::MissingRequiredField { .. } => "MISSING_REQUIRED_FIELD",
            RejectReason::InvalidFieldValue { .. } => "INVALID_FIELD_VALUE",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::DuplicateTeamId => write!(f, "duplicate team id"),
            RejectReason::DuplicateEmployeeId => write!(f, "duplicate employee id"),
            RejectReason::DuplicateSkillId => write!(f, "duplicate skill id"),
            RejectReason::TeamNotFound => write!(f, "team id does not exist"),
            RejectReason::EmployeeNotFoundForCert => write!(f, "employee id does not exist"),
            RejectReason::SkillNotFoundForCert => write!(f, "skill id does not exist"),
            RejectReason::TeamHasDependents { dependents } => write!(
                f,
                "team has active dependents ({} employee(s) still assigned)",
                dependents
            ),
            RejectReason::MissingRequiredField { column } => {
                write!(f, "missing required field '{}'", column)
            }
            RejectReason::InvalidFieldValue { column, value } => {
                write!(f, "invalid value '{}' in field '{}'", value, column)
            }
        }
    }
}

impl From<FieldError> for RejectReason {
    fn from(err: FieldError) -> Self {
        match err {
            FieldError::Missing(column) => RejectReason::MissingRequiredField { column },
            FieldError::Invalid { column, value } => RejectReason::InvalidFieldValue {
                column,
                value: value.to_string(),
            },
        }
    }
}

/// A refused change-request with its original payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRecord {
    pub operation: OperationKind,
    /// 1-based data row in the batch sheet
    pub row_number: usize,
    pub payload: Row,
    pub reason: RejectReason,
}

/// Ordered accumulation of rejected records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rejections {
    records: Vec<RejectedRecord>,
}

impl Rejections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        operation: OperationKind,
        row_number: usize,
        payload: &Row,
        reason: RejectReason,
    ) {
        log::debug!(
            "Rejected {} row {}: {} ({})",
            operation,
            row_number,
            reason.code(),
            reason
        );
        self.records.push(RejectedRecord {
            operation,
            row_number,
            payload: payload.clone(),
            reason,
        });
    }

    /// Append another stage's rejections, keeping order
    pub fn extend(&mut self, other: Rejections) {
        self.records.extend(other.records);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RejectedRecord> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[RejectedRecord] {
        &self.records
    }

    pub fn into_vec(self) -> Vec<RejectedRecord> {
        self.records
    }
}
