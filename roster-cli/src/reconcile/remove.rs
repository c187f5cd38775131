//! Cascade remover
//!
//! Applies removals in a fixed order: teams, then employees, then skills.
//! A team is only removed when no employee still references it; employee and
//! skill removals are unconditional and cascade into the certification table.

use std::collections::HashSet;

use super::batch::{OperationKind, Removals, Request};
use super::pipeline::StageOutput;
use super::reject::{RejectReason, Rejections};
use super::store::Store;
use super::summary::RunSummary;

/// Apply all removal requests to `store`
pub fn apply_removals(mut store: Store, removals: &Removals) -> StageOutput {
    let mut rejections = Rejections::new();
    let mut summary = RunSummary::new();

    remove_teams(&mut store, &removals.teams, &mut rejections, &mut summary);
    remove_employees(&mut store, &removals.employees, &mut summary);
    remove_skills(&mut store, &removals.skills, &mut summary);

    StageOutput {
        store,
        rejections,
        summary,
    }
}

fn remove_teams(
    store: &mut Store,
    requests: &[Request<String>],
    rejections: &mut Rejections,
    summary: &mut RunSummary,
) {
    let kind = OperationKind::RemoveTeam;
    let (unique, duplicates) = unique_requests(requests);
    summary.record_skipped(kind, duplicates);

    let mut removed = 0;
    for request in unique {
        let dependents = store.employees_on_team(&request.value).count();
        if dependents > 0 {
            log::warn!(
                "Cannot remove team {}: {} employee(s) still linked",
                request.value,
                dependents
            );
            rejections.push(
                kind,
                request.row_number,
                &request.payload,
                RejectReason::TeamHasDependents { dependents },
            );
            continue;
        }

        if store.remove_team(&request.value) {
            removed += 1;
        } else {
            summary.record_skipped(kind, 1);
        }
    }

    summary.record_applied(kind, removed);
    if !requests.is_empty() {
        log::info!("Removed {} team(s)", removed);
    }
}

fn remove_employees(store: &mut Store, requests: &[Request<String>], summary: &mut RunSummary) {
    let kind = OperationKind::RemoveEmployee;
    let ids = unique_ids(requests, kind, summary);
    if ids.is_empty() {
        return;
    }

    let removed = store.remove_employees(&ids);
    let cascaded = store.remove_certifications_where(|c| ids.contains(&c.employee_id));

    summary.record_applied(kind, removed);
    summary.record_skipped(kind, ids.len().saturating_sub(removed));
    summary.certifications_cascaded += cascaded;
    log::info!(
        "Removed {} employee(s) and {} associated training record(s)",
        removed,
        cascaded
    );
}

fn remove_skills(store: &mut Store, requests: &[Request<String>], summary: &mut RunSummary) {
    let kind = OperationKind::RemoveSkill;
    let ids = unique_ids(requests, kind, summary);
    if ids.is_empty() {
        return;
    }

    let removed = store.remove_skills(&ids);
    let cascaded = store.remove_certifications_where(|c| ids.contains(&c.skill_id));

    summary.record_applied(kind, removed);
    summary.record_skipped(kind, ids.len().saturating_sub(removed));
    summary.certifications_cascaded += cascaded;
    log::info!(
        "Removed {} skill(s) and {} associated training record(s)",
        removed,
        cascaded
    );
}

/// First request per id, in order, plus the number of duplicates dropped
fn unique_requests(requests: &[Request<String>]) -> (Vec<&Request<String>>, usize) {
    let mut seen = HashSet::new();
    let unique: Vec<_> = requests
        .iter()
        .filter(|r| seen.insert(r.value.as_str()))
        .collect();
    let duplicates = requests.len() - unique.len();
    (unique, duplicates)
}

fn unique_ids(
    requests: &[Request<String>],
    kind: OperationKind,
    summary: &mut RunSummary,
) -> HashSet<String> {
    let (unique, duplicates) = unique_requests(requests);
    summary.record_skipped(kind, duplicates);
    unique.into_iter().map(|r| r.value.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::testing::{cert, employee, skill, store_fixture, team};
    use crate::reconcile::types::Row;

    fn request(id: &str) -> Request<String> {
        Request {
            row_number: 1,
            payload: Row::new().with("id", id),
            value: id.to_string(),
        }
    }

    fn removals(teams: &[&str], employees: &[&str], skills: &[&str]) -> Removals {
        Removals {
            teams: teams.iter().map(|id| request(id)).collect(),
            employees: employees.iter().map(|id| request(id)).collect(),
            skills: skills.iter().map(|id| request(id)).collect(),
        }
    }

    #[test]
    fn test_team_with_dependents_is_blocked() {
        let store = store_fixture();
        let before = store.clone();

        let out = apply_removals(store, &removals(&["STMT"], &[], &[]));

        assert_eq!(out.store, before);
        assert_eq!(out.rejections.len(), 1);
        let rejected = &out.rejections.as_slice()[0];
        assert_eq!(rejected.reason.code(), "TEAM_HAS_DEPENDENTS");
        assert_eq!(rejected.reason, RejectReason::TeamHasDependents { dependents: 1 });
    }

    #[test]
    fn test_team_without_dependents_is_removed() {
        let out = apply_removals(store_fixture(), &removals(&["MAINT"], &[], &[]));

        assert!(out.store.team("MAINT").is_none());
        assert!(out.rejections.is_empty());
        assert_eq!(out.summary.counts(OperationKind::RemoveTeam).applied, 1);
    }

    #[test]
    fn test_blocked_team_does_not_block_others() {
        let out = apply_removals(store_fixture(), &removals(&["PAYT", "MAINT", "DPER"], &[], &[]));

        assert!(out.store.team("PAYT").is_some());
        assert!(out.store.team("MAINT").is_none());
        assert!(out.store.team("DPER").is_none());
        assert_eq!(out.rejections.len(), 1);
        assert_eq!(out.summary.counts(OperationKind::RemoveTeam).applied, 2);
    }

    #[test]
    fn test_employee_removal_cascades_only_their_certifications() {
        let out = apply_removals(store_fixture(), &removals(&[], &["TEST001"], &[]));

        assert!(out.store.employee("TEST001").is_none());
        assert!(
            out.store
                .certifications()
                .all(|c| c.employee_id != "TEST001")
        );
        // TEST002's certification survives
        assert!(out.store.certification("TEST002", "PAYT1").is_some());
        assert_eq!(out.summary.certifications_cascaded, 2);
    }

    #[test]
    fn test_unknown_ids_are_silent_no_ops() {
        let before = store_fixture();
        let out = apply_removals(before.clone(), &removals(&[], &["NOBODY"], &["NOSKILL"]));

        assert_eq!(out.store, before);
        assert!(out.rejections.is_empty());
        assert_eq!(out.summary.counts(OperationKind::RemoveEmployee).skipped, 1);
        assert_eq!(out.summary.counts(OperationKind::RemoveSkill).skipped, 1);
    }

    #[test]
    fn test_duplicate_ids_are_processed_once() {
        let out = apply_removals(
            store_fixture(),
            &removals(&["PAYT", "PAYT"], &[], &["STMT1", "STMT1"]),
        );

        // One rejection, not two
        assert_eq!(out.rejections.len(), 1);
        assert_eq!(out.summary.counts(OperationKind::RemoveSkill).applied, 1);
        assert_eq!(out.summary.counts(OperationKind::RemoveSkill).skipped, 1);
    }

    #[test]
    fn test_removing_last_employee_frees_team_only_in_next_batch() {
        // Teams are processed before employees, so removing the only member
        // and the team together still blocks the team.
        let mut store = Store::new();
        store.insert_team(team("SOLO"));
        store.insert_employee(employee("E1", "SOLO"));

        let out = apply_removals(store, &removals(&["SOLO"], &["E1"], &[]));
        assert!(out.store.team("SOLO").is_some());
        assert!(out.store.employee("E1").is_none());
        assert_eq!(out.rejections.len(), 1);
    }

    #[test]
    fn test_skill_removal_cascades() {
        let mut store = store_fixture();
        store.insert_skill(skill("EXTRA"));
        store.upsert_certification(cert("TEST002", "EXTRA", 1));

        let out = apply_removals(store, &removals(&[], &[], &["EXTRA", "PAYT2"]));
        assert!(out.store.skill("EXTRA").is_none());
        assert!(out.store.certification("TEST002", "EXTRA").is_none());
        assert!(out.store.certification("TEST001", "PAYT2").is_none());
        assert_eq!(out.summary.certifications_cascaded, 2);
    }
}
