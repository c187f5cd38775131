//! Validating upserter
//!
//! Applies additions and updates in the order teams, team updates, employees,
//! skills, certifications. Each kind validates against the store as left by
//! every earlier step, so a team added in this batch can receive employees and
//! a skill removed in this batch can no longer receive certifications.

use super::batch::{OperationKind, Request, Upserts};
use super::pipeline::StageOutput;
use super::reject::{RejectReason, Rejections};
use super::store::{RecordKey, Store};
use super::summary::RunSummary;
use super::types::{Certification, Employee, Skill, TableKind, Team, TeamPatch};

/// Apply all addition and update requests to `store`
pub fn apply_upserts(mut store: Store, upserts: &Upserts) -> StageOutput {
    let mut stage = Stage {
        store: &mut store,
        rejections: Rejections::new(),
        summary: RunSummary::new(),
    };

    stage.add_teams(&upserts.add_teams);
    stage.update_teams(&upserts.update_teams);
    stage.add_employees(&upserts.add_employees);
    stage.add_skills(&upserts.add_skills);
    stage.add_training(&upserts.add_training);

    let Stage {
        rejections,
        summary,
        ..
    } = stage;

    StageOutput {
        store,
        rejections,
        summary,
    }
}

struct Stage<'a> {
    store: &'a mut Store,
    rejections: Rejections,
    summary: RunSummary,
}

impl Stage<'_> {
    fn reject<T>(&mut self, kind: OperationKind, request: &Request<T>, reason: RejectReason) {
        self.rejections
            .push(kind, request.row_number, &request.payload, reason);
    }

    fn add_teams(&mut self, requests: &[Request<Team>]) {
        let kind = OperationKind::AddTeam;
        let mut added = 0;

        for request in requests {
            let team = &request.value;
            if self.store.contains(TableKind::Teams, RecordKey::Id(&team.team_id)) {
                self.reject(kind, request, RejectReason::DuplicateTeamId);
                continue;
            }
            self.store.insert_team(team.clone());
            added += 1;
        }

        self.finish(kind, requests.len(), added);
    }

    fn update_teams(&mut self, requests: &[Request<TeamPatch>]) {
        let kind = OperationKind::UpdateTeam;
        let mut updated = 0;

        for request in requests {
            let patch = &request.value;
            match self.store.team_mut(&patch.team_id) {
                Some(team) => {
                    patch.apply(team);
                    updated += 1;
                }
                None => self.reject(kind, request, RejectReason::TeamNotFound),
            }
        }

        self.finish(kind, requests.len(), updated);
    }

    fn add_employees(&mut self, requests: &[Request<Employee>]) {
        let kind = OperationKind::AddEmployee;
        let mut added = 0;

        for request in requests {
            let employee = &request.value;
            if self
                .store
                .contains(TableKind::Employees, RecordKey::Id(&employee.employee_id))
            {
                self.reject(kind, request, RejectReason::DuplicateEmployeeId);
                continue;
            }
            if !self
                .store
                .contains(TableKind::Teams, RecordKey::Id(&employee.team_id))
            {
                self.reject(kind, request, RejectReason::TeamNotFound);
                continue;
            }
            self.store.insert_employee(employee.clone());
            added += 1;
        }

        self.finish(kind, requests.len(), added);
    }

    fn add_skills(&mut self, requests: &[Request<Skill>]) {
        let kind = OperationKind::AddSkill;
        let mut added = 0;

        for request in requests {
            let skill = &request.value;
            if self.store.contains(TableKind::Skills, RecordKey::Id(&skill.skill_id)) {
                self.reject(kind, request, RejectReason::DuplicateSkillId);
                continue;
            }
            self.store.insert_skill(skill.clone());
            added += 1;
        }

        self.finish(kind, requests.len(), added);
    }

    fn add_training(&mut self, requests: &[Request<Certification>]) {
        let kind = OperationKind::AddTrainingMap;
        let mut applied = 0;

        for request in requests {
            let cert = &request.value;
            if !self
                .store
                .contains(TableKind::Employees, RecordKey::Id(&cert.employee_id))
            {
                self.reject(kind, request, RejectReason::EmployeeNotFoundForCert);
                continue;
            }
            if !self.store.contains(TableKind::Skills, RecordKey::Id(&cert.skill_id)) {
                self.reject(kind, request, RejectReason::SkillNotFoundForCert);
                continue;
            }
            if self.store.upsert_certification(cert.clone()) {
                self.summary.certifications_replaced += 1;
            }
            applied += 1;
        }

        self.finish(kind, requests.len(), applied);
    }

    fn finish(&mut self, kind: OperationKind, requested: usize, applied: usize) {
        self.summary.record_applied(kind, applied);
        if requested > 0 {
            log::info!(
                "{}: applied {} of {} request(s), rejected {}",
                kind,
                applied,
                requested,
                requested - applied
            );
        }
    }
}
