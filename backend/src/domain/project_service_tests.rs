//! Tests for the project service.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::MockProjectRepository;
use crate::domain::{ErrorCode, Patch, ProjectStatus, UserId};

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

#[fixture]
fn owner() -> UserId {
    UserId::random()
}

fn make_service(
    repo: MockProjectRepository,
    now: DateTime<Utc>,
) -> ProjectService<MockProjectRepository> {
    ProjectService::new(Arc::new(repo), Arc::new(FixtureClock { utc_now: now }))
}

fn demo_input() -> ProjectInput {
    ProjectInput {
        title: Patch::Value("Demo".to_owned()),
        status: Patch::Value("planned".to_owned()),
        ..ProjectInput::default()
    }
}

fn stored_project(owner: UserId, now: DateTime<Utc>) -> Project {
    let draft = ProjectDraft::validate(demo_input()).expect("valid draft");
    Project::create(ProjectId::random(), draft, owner, now)
}

#[rstest]
#[tokio::test]
async fn create_assigns_actor_as_owner(owner: UserId, now: DateTime<Utc>) {
    let mut repo = MockProjectRepository::new();
    repo.expect_insert()
        .withf(move |project| project.owner() == &owner)
        .times(1)
        .return_once(|_| Ok(()));

    let service = make_service(repo, now);
    let project = service
        .create(&Actor::User(owner), demo_input())
        .await
        .expect("create succeeds");

    assert_eq!(project.owner(), &owner);
    assert_eq!(project.status(), ProjectStatus::Planned);
    assert_eq!(project.created_at(), now);
}

#[rstest]
#[tokio::test]
async fn create_rejects_anonymous_without_touching_storage(now: DateTime<Utc>) {
    let mut repo = MockProjectRepository::new();
    repo.expect_insert().never();

    let service = make_service(repo, now);
    let err = service
        .create(&Actor::Anonymous, demo_input())
        .await
        .expect_err("anonymous create");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn create_rejects_unknown_status(owner: UserId, now: DateTime<Utc>) {
    let mut repo = MockProjectRepository::new();
    repo.expect_insert().never();

    let service = make_service(repo, now);
    let input = ProjectInput {
        status: Patch::Value("someday".to_owned()),
        ..demo_input()
    };
    let err = service
        .create(&Actor::User(owner), input)
        .await
        .expect_err("invalid status");
    assert_eq!(err.code(), ErrorCode::ValidationFailed);
}

#[rstest]
#[tokio::test]
async fn list_scopes_to_actor_when_requested(owner: UserId, now: DateTime<Utc>) {
    let mut repo = MockProjectRepository::new();
    repo.expect_list()
        .withf(move |filter| *filter == Some(owner))
        .times(1)
        .return_once(|_| Ok(Vec::new()));

    let service = make_service(repo, now);
    let projects = service
        .list(&Actor::User(owner), ProjectScope::Mine)
        .await
        .expect("list succeeds");
    assert!(projects.is_empty());
}

#[rstest]
#[tokio::test]
async fn list_mine_requires_authentication(now: DateTime<Utc>) {
    let mut repo = MockProjectRepository::new();
    repo.expect_list().never();

    let service = make_service(repo, now);
    let err = service
        .list(&Actor::Anonymous, ProjectScope::Mine)
        .await
        .expect_err("anonymous scoped listing");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn get_reports_missing_project(now: DateTime<Utc>) {
    let mut repo = MockProjectRepository::new();
    repo.expect_find_by_id().return_once(|_| Ok(None));

    let service = make_service(repo, now);
    let err = service
        .get(&Actor::Anonymous, &ProjectId::random())
        .await
        .expect_err("missing project");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn update_by_non_owner_is_forbidden(owner: UserId, now: DateTime<Utc>) {
    let existing = stored_project(owner, now);
    let id = *existing.id();
    let mut repo = MockProjectRepository::new();
    repo.expect_find_by_id()
        .return_once(move |_| Ok(Some(existing)));
    repo.expect_update().never();

    let service = make_service(repo, now);
    let err = service
        .update(&Actor::User(UserId::random()), &id, ProjectInput::default())
        .await
        .expect_err("non-owner update");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn forbidden_outranks_validation(owner: UserId, now: DateTime<Utc>) {
    let existing = stored_project(owner, now);
    let id = *existing.id();
    let mut repo = MockProjectRepository::new();
    repo.expect_find_by_id()
        .return_once(move |_| Ok(Some(existing)));

    let service = make_service(repo, now);
    let input = ProjectInput {
        status: Patch::Value("bogus".to_owned()),
        ..ProjectInput::default()
    };
    let err = service
        .update(&Actor::User(UserId::random()), &id, input)
        .await
        .expect_err("non-owner update");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn update_by_owner_keeps_owner(owner: UserId, now: DateTime<Utc>) {
    let existing = stored_project(owner, now);
    let id = *existing.id();
    let mut repo = MockProjectRepository::new();
    repo.expect_find_by_id()
        .return_once(move |_| Ok(Some(existing)));
    repo.expect_update()
        .withf(move |project| project.owner() == &owner)
        .times(1)
        .return_once(|_| Ok(true));

    let service = make_service(repo, now);
    let input = ProjectInput {
        status: Patch::Value("current".to_owned()),
        ..ProjectInput::default()
    };
    let updated = service
        .update(&Actor::User(owner), &id, input)
        .await
        .expect("owner update");
    assert_eq!(updated.status(), ProjectStatus::Current);
    assert_eq!(updated.owner(), &owner);
    assert_eq!(updated.title().as_ref(), "Demo");
}

#[rstest]
#[tokio::test]
async fn anonymous_update_skips_lookup(now: DateTime<Utc>) {
    let mut repo = MockProjectRepository::new();
    repo.expect_find_by_id().never();

    let service = make_service(repo, now);
    let err = service
        .update(&Actor::Anonymous, &ProjectId::random(), demo_input())
        .await
        .expect_err("anonymous update");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn delete_by_owner_removes_project(owner: UserId, now: DateTime<Utc>) {
    let existing = stored_project(owner, now);
    let id = *existing.id();
    let mut repo = MockProjectRepository::new();
    repo.expect_find_by_id()
        .return_once(move |_| Ok(Some(existing)));
    repo.expect_delete()
        .withf(move |target| *target == id)
        .times(1)
        .return_once(|_| Ok(true));

    let service = make_service(repo, now);
    service
        .delete(&Actor::User(owner), &id)
        .await
        .expect("owner delete");
}

#[rstest]
#[tokio::test]
async fn delete_by_non_owner_is_forbidden(owner: UserId, now: DateTime<Utc>) {
    let existing = stored_project(owner, now);
    let id = *existing.id();
    let mut repo = MockProjectRepository::new();
    repo.expect_find_by_id()
        .return_once(move |_| Ok(Some(existing)));
    repo.expect_delete().never();

    let service = make_service(repo, now);
    let err = service
        .delete(&Actor::User(UserId::random()), &id)
        .await
        .expect_err("non-owner delete");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[case(ProjectPersistenceError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case(ProjectPersistenceError::query("syntax"), ErrorCode::InternalError)]
#[tokio::test]
async fn repository_errors_map_to_domain_codes(
    #[case] failure: ProjectPersistenceError,
    #[case] expected: ErrorCode,
    now: DateTime<Utc>,
) {
    let mut repo = MockProjectRepository::new();
    repo.expect_list().return_once(move |_| Err(failure));

    let service = make_service(repo, now);
    let err = service
        .list(&Actor::Anonymous, ProjectScope::All)
        .await
        .expect_err("repository failure");
    assert_eq!(err.code(), expected);
}
