//! Shared test fixtures

use chrono::NaiveDate;

use super::seed;
use super::store::Store;
use super::types::{Attributes, Certification, Employee, Skill, Team};

pub fn team(id: &str) -> Team {
    Team {
        team_id: id.into(),
        team_name: format!("Team {}", id),
        manager: None,
        extra: Attributes::new(),
    }
}

pub fn employee(id: &str, team_id: &str) -> Employee {
    Employee {
        employee_id: id.into(),
        first_name: "Test".into(),
        last_name: id.into(),
        team_id: team_id.into(),
        status: Some("Active".into()),
        extra: Attributes::new(),
    }
}

pub fn skill(id: &str) -> Skill {
    Skill {
        skill_id: id.into(),
        skill_name: format!("Skill {}", id),
        team_id: None,
        category: None,
        extra: Attributes::new(),
    }
}

pub fn cert(employee_id: &str, skill_id: &str, level: i64) -> Certification {
    Certification {
        employee_id: employee_id.into(),
        skill_id: skill_id.into(),
        proficiency_level: Some(level),
        certification_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        expiration_date: None,
        extra: Attributes::new(),
    }
}

/// Teams STMT/PAYT/MAINT/DPER; TEST001 on STMT, TEST002 and TEST003 on PAYT;
/// certifications TEST001/STMT1, TEST001/PAYT2, TEST002/PAYT1
pub fn store_fixture() -> Store {
    seed::sample_store().unwrap()
}
