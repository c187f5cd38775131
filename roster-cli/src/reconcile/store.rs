//! In-memory master dataset
//!
//! The store is a passive container for the four master tables. Each table is
//! keyed by its natural id and keeps rows in insertion order, which is the
//! order they are written back in. Beyond key uniqueness it performs no
//! validation; the pipeline stages keep foreign keys resolvable.

use std::collections::HashSet;
use std::hash::Hash;

use anyhow::{Context, Result, bail};
use indexmap::{Equivalent, IndexMap, map::Values};

use super::types::{Certification, Employee, Row, Skill, TableKind, TableRow, Team};

/// Key used by [`Store::contains`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKey<'a> {
    /// Natural id of a team, employee or skill
    Id(&'a str),
    /// (employee_id, skill_id) of a certification
    Pair(&'a str, &'a str),
}

type PairKey = (String, String);

/// Borrowed form of [`PairKey`]; hashes the same as the owned tuple
#[derive(Hash)]
struct PairRef<'a>(&'a str, &'a str);

impl Equivalent<PairKey> for PairRef<'_> {
    fn equivalent(&self, key: &PairKey) -> bool {
        self.0 == key.0 && self.1 == key.1
    }
}

/// The four master tables
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Store {
    teams: IndexMap<String, Team>,
    employees: IndexMap<String, Employee>,
    skills: IndexMap<String, Skill>,
    certifications: IndexMap<PairKey, Certification>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn teams(&self) -> Values<'_, String, Team> {
        self.teams.values()
    }

    pub fn employees(&self) -> Values<'_, String, Employee> {
        self.employees.values()
    }

    pub fn skills(&self) -> Values<'_, String, Skill> {
        self.skills.values()
    }

    pub fn certifications(&self) -> Values<'_, PairKey, Certification> {
        self.certifications.values()
    }

    pub fn team(&self, team_id: &str) -> Option<&Team> {
        self.teams.get(team_id)
    }

    pub fn employee(&self, employee_id: &str) -> Option<&Employee> {
        self.employees.get(employee_id)
    }

    pub fn skill(&self, skill_id: &str) -> Option<&Skill> {
        self.skills.get(skill_id)
    }

    pub fn certification(&self, employee_id: &str, skill_id: &str) -> Option<&Certification> {
        self.certifications.get(&PairRef(employee_id, skill_id))
    }

    /// Number of rows in a table
    pub fn len(&self, table: TableKind) -> usize {
        match table {
            TableKind::Teams => self.teams.len(),
            TableKind::Employees => self.employees.len(),
            TableKind::Skills => self.skills.len(),
            TableKind::Certifications => self.certifications.len(),
        }
    }

    /// Rows of a table as generic row-records
    pub fn get(&self, table: TableKind) -> Vec<Row> {
        match table {
            TableKind::Teams => to_rows(self.teams.values()),
            TableKind::Employees => to_rows(self.employees.values()),
            TableKind::Skills => to_rows(self.skills.values()),
            TableKind::Certifications => to_rows(self.certifications.values()),
        }
    }

    /// Column layout of a table: modelled columns, then extra columns in
    /// first-seen order, each row's extras in header order
    pub fn columns(&self, table: TableKind) -> Vec<String> {
        match table {
            TableKind::Teams => columns_of(self.teams.values()),
            TableKind::Employees => columns_of(self.employees.values()),
            TableKind::Skills => columns_of(self.skills.values()),
            TableKind::Certifications => columns_of(self.certifications.values()),
        }
    }

    /// Parse `rows` into typed entities and swap them in as the table contents
    ///
    /// Fails without touching the store if any row is malformed or repeats a
    /// key already seen earlier in `rows`.
    pub fn replace(&mut self, table: TableKind, rows: Vec<Row>) -> Result<()> {
        match table {
            TableKind::Teams => self.teams = parse_rows(&rows, |t: &Team| t.team_id.clone())?,
            TableKind::Employees => {
                self.employees = parse_rows(&rows, |e: &Employee| e.employee_id.clone())?
            }
            TableKind::Skills => self.skills = parse_rows(&rows, |s: &Skill| s.skill_id.clone())?,
            TableKind::Certifications => {
                self.certifications = parse_rows(&rows, |c: &Certification| pair_key(c))?
            }
        }
        Ok(())
    }

    /// Check whether a key is present in a table
    ///
    /// Teams, employees and skills take [`RecordKey::Id`]; certifications take
    /// [`RecordKey::Pair`]. A key of the other shape never matches.
    pub fn contains(&self, table: TableKind, key: RecordKey<'_>) -> bool {
        match (table, key) {
            (TableKind::Teams, RecordKey::Id(id)) => self.teams.contains_key(id),
            (TableKind::Employees, RecordKey::Id(id)) => self.employees.contains_key(id),
            (TableKind::Skills, RecordKey::Id(id)) => self.skills.contains_key(id),
            (TableKind::Certifications, RecordKey::Pair(employee_id, skill_id)) => self
                .certifications
                .contains_key(&PairRef(employee_id, skill_id)),
            _ => false,
        }
    }

    /// Employees whose team_id points at `team_id`
    pub fn employees_on_team<'a>(&'a self, team_id: &'a str) -> impl Iterator<Item = &'a Employee> {
        self.employees.values().filter(move |e| e.team_id == team_id)
    }

    /// Add a team, or overwrite the row with the same id in place
    pub fn insert_team(&mut self, team: Team) {
        self.teams.insert(team.team_id.clone(), team);
    }

    /// Add an employee, or overwrite the row with the same id in place
    pub fn insert_employee(&mut self, employee: Employee) {
        self.employees.insert(employee.employee_id.clone(), employee);
    }

    /// Add a skill, or overwrite the row with the same id in place
    pub fn insert_skill(&mut self, skill: Skill) {
        self.skills.insert(skill.skill_id.clone(), skill);
    }

    pub fn team_mut(&mut self, team_id: &str) -> Option<&mut Team> {
        self.teams.get_mut(team_id)
    }

    /// Delete a team row, returning whether it existed
    pub fn remove_team(&mut self, team_id: &str) -> bool {
        self.teams.shift_remove(team_id).is_some()
    }

    /// Delete employees by id, returning how many rows went away
    pub fn remove_employees(&mut self, employee_ids: &HashSet<String>) -> usize {
        let before = self.employees.len();
        self.employees.retain(|id, _| !employee_ids.contains(id));
        before - self.employees.len()
    }

    /// Delete skills by id, returning how many rows went away
    pub fn remove_skills(&mut self, skill_ids: &HashSet<String>) -> usize {
        let before = self.skills.len();
        self.skills.retain(|id, _| !skill_ids.contains(id));
        before - self.skills.len()
    }

    /// Delete every certification matching `predicate`
    pub fn remove_certifications_where<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&Certification) -> bool,
    {
        let before = self.certifications.len();
        self.certifications.retain(|_, c| !predicate(c));
        before - self.certifications.len()
    }

    /// Insert a certification, dropping any prior record for the same pair
    ///
    /// Returns true when an existing record was replaced. The new record is
    /// always placed at the end of the table.
    pub fn upsert_certification(&mut self, certification: Certification) -> bool {
        let key = pair_key(&certification);
        let replaced = self.certifications.shift_remove(&key).is_some();
        self.certifications.insert(key, certification);
        replaced
    }
}

fn pair_key(certification: &Certification) -> PairKey {
    (
        certification.employee_id.clone(),
        certification.skill_id.clone(),
    )
}

fn to_rows<'a, T: TableRow + 'a>(items: impl Iterator<Item = &'a T>) -> Vec<Row> {
    items.map(T::to_row).collect()
}

fn columns_of<'a, T: TableRow + 'a>(items: impl Iterator<Item = &'a T>) -> Vec<String> {
    let mut columns: Vec<String> = T::TABLE.columns().iter().map(|c| c.to_string()).collect();
    let mut seen: HashSet<String> = columns.iter().cloned().collect();
    for item in items {
        for column in item.extra().keys() {
            if seen.insert(column.clone()) {
                columns.push(column.clone());
            }
        }
    }
    columns
}

fn parse_rows<T, K, F>(rows: &[Row], key_of: F) -> Result<IndexMap<K, T>>
where
    T: TableRow,
    K: Hash + Eq + std::fmt::Debug,
    F: Fn(&T) -> K,
{
    let mut table = IndexMap::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        let item = T::from_row(row).with_context(|| format!("{} row {}", T::TABLE, idx + 1))?;
        let key = key_of(&item);
        if table.contains_key(&key) {
            bail!("{} row {}: duplicate key {:?}", T::TABLE, idx + 1, key);
        }
        table.insert(key, item);
    }
    Ok(table)
}
