//! Validation and membership rules for organisation entities.

use crate::organisation::domain::{
    CatalogName, OrganisationDomainError, Project, ProjectDraft, ProjectName, Team, TeamDraft,
};
use crate::worker::domain::{Requester, WorkerId};
use mockable::DefaultClock;
use rstest::rstest;

#[rstest]
fn names_are_trimmed_and_bounded() {
    assert_eq!(ProjectName::new("  Apollo ").expect("valid").as_str(), "Apollo");
    assert_eq!(ProjectName::new(" "), Err(OrganisationDomainError::EmptyProjectName));
    assert_eq!(
        ProjectName::new(&"p".repeat(201)),
        Err(OrganisationDomainError::ProjectNameTooLong(201))
    );
    assert_eq!(
        CatalogName::new(&"t".repeat(101)),
        Err(OrganisationDomainError::CatalogNameTooLong(101))
    );
}

#[rstest]
fn project_search_matches_name_or_description() {
    let draft = ProjectDraft::new("Website", "Marketing relaunch").expect("valid draft");
    let project = Project::new(draft, &DefaultClock);

    assert!(project.matches_search("web"));
    assert!(project.matches_search("RELAUNCH"));
    assert!(!project.matches_search("mobile"));
}

#[rstest]
fn team_is_managed_by_creator_members_and_staff() {
    let creator = WorkerId::new();
    let member = WorkerId::new();
    let outsider = WorkerId::new();
    let draft = TeamDraft::new("Backend", None, [member]).expect("valid draft");
    let team = Team::new(draft, creator, &DefaultClock);

    assert!(team.can_be_managed_by(&Requester::regular(creator)));
    assert!(team.can_be_managed_by(&Requester::regular(member)));
    assert!(!team.can_be_managed_by(&Requester::regular(outsider)));
    assert!(team.can_be_managed_by(&Requester::new(outsider, true, false)));
}

#[rstest]
fn membership_changes_report_whether_anything_changed() {
    let worker = WorkerId::new();
    let draft = TeamDraft::new("QA", None, []).expect("valid draft");
    let mut team = Team::new(draft, WorkerId::new(), &DefaultClock);

    assert!(team.add_member(worker));
    assert!(!team.add_member(worker));
    assert!(team.remove_member(worker));
    assert!(!team.remove_member(worker));
}
