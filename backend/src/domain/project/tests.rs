//! Regression coverage for project value objects and validation.

use super::*;
use chrono::TimeZone;
use rstest::{fixture, rstest};

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 14, 14, 35, 40)
        .single()
        .expect("valid fixture timestamp")
}

fn value(raw: &str) -> Patch<String> {
    Patch::Value(raw.to_owned())
}

fn minimal_input() -> ProjectInput {
    ProjectInput {
        title: value("Demo"),
        status: value("planned"),
        ..ProjectInput::default()
    }
}

fn failing_fields(error: &Error) -> Vec<String> {
    error
        .details()
        .and_then(|details| details["errors"].as_object())
        .map(|fields| fields.keys().cloned().collect())
        .unwrap_or_default()
}

#[rstest]
#[case("planned", ProjectStatus::Planned)]
#[case("current", ProjectStatus::Current)]
#[case("finished", ProjectStatus::Finished)]
fn status_parses_known_values(#[case] raw: &str, #[case] expected: ProjectStatus) {
    assert_eq!(raw.parse::<ProjectStatus>(), Ok(expected));
    assert_eq!(expected.to_string(), raw);
}

#[rstest]
#[case("Planned")]
#[case("done")]
#[case("")]
fn status_rejects_unknown_values(#[case] raw: &str) {
    assert_eq!(
        raw.parse::<ProjectStatus>(),
        Err(ProjectValidationError::UnknownStatus)
    );
}

#[rstest]
#[case("not-a-uuid")]
#[case("")]
fn project_ids_must_be_uuids(#[case] raw: &str) {
    let err = ProjectId::new(raw).expect_err("not a UUID");
    assert_eq!(err, ProjectValidationError::InvalidId);
    assert_eq!(err.to_string(), "project id must be a valid UUID");
}

#[rstest]
#[case("", ProjectValidationError::EmptyTitle)]
#[case("   ", ProjectValidationError::EmptyTitle)]
fn title_rejects_blank(#[case] raw: &str, #[case] expected: ProjectValidationError) {
    assert_eq!(ProjectTitle::new(raw), Err(expected));
}

#[rstest]
fn title_accepts_boundary_length() {
    assert!(ProjectTitle::new("t".repeat(TITLE_MAX)).is_ok());
    assert_eq!(
        ProjectTitle::new("t".repeat(TITLE_MAX + 1)),
        Err(ProjectValidationError::TitleTooLong { max: TITLE_MAX })
    );
}

#[rstest]
fn description_enforces_limit() {
    assert!(ProjectDescription::new("d".repeat(DESCRIPTION_MAX)).is_ok());
    assert!(ProjectDescription::new("d".repeat(DESCRIPTION_MAX + 1)).is_err());
}

#[rstest]
#[case("https://example.com")]
#[case("http://example.com/demo?x=1")]
#[case("  https://github.com/ada/engine  ")]
fn link_accepts_web_urls(#[case] raw: &str) {
    assert!(ProjectLink::new(raw).is_ok());
}

#[rstest]
#[case("example.com")]
#[case("not a url")]
#[case("mailto:ada@example.com")]
#[case("javascript:alert(1)")]
fn link_rejects_non_web_urls(#[case] raw: &str) {
    assert_eq!(
        ProjectLink::new(raw),
        Err(ProjectValidationError::InvalidLink)
    );
}

#[rstest]
fn link_rejects_overlong_urls() {
    let raw = format!("https://example.com/{}", "a".repeat(LINK_MAX));
    assert_eq!(
        ProjectLink::new(raw),
        Err(ProjectValidationError::LinkTooLong { max: LINK_MAX })
    );
}

#[rstest]
fn draft_accepts_minimal_input() {
    let draft = ProjectDraft::validate(minimal_input()).expect("valid draft");
    assert_eq!(draft.title.as_ref(), "Demo");
    assert_eq!(draft.status, ProjectStatus::Planned);
    assert!(draft.description.is_none());
    assert!(draft.demo_link.is_none());
}

#[rstest]
fn draft_requires_title_and_status() {
    let err = ProjectDraft::validate(ProjectInput::default()).expect_err("empty input");
    assert_eq!(failing_fields(&err), ["status", "title"]);
}

#[rstest]
fn draft_lists_every_failing_field() {
    let input = ProjectInput {
        title: value(""),
        description: value(&"d".repeat(DESCRIPTION_MAX + 1)),
        demo_link: value("nope"),
        github_link: value("also nope"),
        image: value("still nope"),
        status: value("abandoned"),
        rejected: FieldErrors::new(),
    };
    let err = ProjectDraft::validate(input).expect_err("invalid input");
    assert_eq!(
        failing_fields(&err),
        [
            "demo_link",
            "description",
            "github_link",
            "image",
            "status",
            "title"
        ]
    );
}

#[rstest]
fn draft_treats_blank_optional_fields_as_absent() {
    let input = ProjectInput {
        description: value("   "),
        demo_link: value(""),
        image: Patch::Null,
        ..minimal_input()
    };
    let draft = ProjectDraft::validate(input).expect("valid draft");
    assert!(draft.description.is_none());
    assert!(draft.demo_link.is_none());
    assert!(draft.image.is_none());
}

#[rstest]
fn patch_with_no_fields_changes_nothing() {
    let patch = ProjectPatch::validate(ProjectInput::default()).expect("empty patch");
    assert_eq!(patch, ProjectPatch::default());
}

#[rstest]
fn patch_rejects_clearing_required_fields() {
    let input = ProjectInput {
        title: Patch::Null,
        status: Patch::Null,
        ..ProjectInput::default()
    };
    let err = ProjectPatch::validate(input).expect_err("cannot clear");
    assert_eq!(failing_fields(&err), ["status", "title"]);
}

#[rstest]
fn patch_distinguishes_clear_from_missing() {
    let input = ProjectInput {
        description: Patch::Null,
        github_link: value("https://github.com/ada/engine"),
        ..ProjectInput::default()
    };
    let patch = ProjectPatch::validate(input).expect("valid patch");
    assert_eq!(patch.description, Some(None));
    assert!(matches!(patch.github_link, Some(Some(_))));
    assert_eq!(patch.demo_link, None);
}

#[rstest]
fn apply_preserves_owner_and_creation_time(now: DateTime<Utc>) {
    let owner = UserId::random();
    let draft = ProjectDraft::validate(ProjectInput {
        description: value("first"),
        ..minimal_input()
    })
    .expect("valid draft");
    let project = Project::create(ProjectId::random(), draft, owner, now);

    let later = now + chrono::Duration::hours(1);
    let patch = ProjectPatch::validate(ProjectInput {
        status: value("current"),
        description: Patch::Null,
        ..ProjectInput::default()
    })
    .expect("valid patch");
    let updated = project.clone().apply(patch, later);

    assert_eq!(updated.owner(), &owner);
    assert_eq!(updated.id(), project.id());
    assert_eq!(updated.title(), project.title());
    assert_eq!(updated.status(), ProjectStatus::Current);
    assert!(updated.description().is_none());
    assert_eq!(updated.created_at(), now);
    assert_eq!(updated.updated_at(), later);
}

#[rstest]
fn decode_failures_are_reported_alongside_validation_failures() {
    let mut rejected = FieldErrors::new();
    rejected.push("title", "the title must be a string");
    let err = ProjectDraft::validate(ProjectInput {
        status: value("someday"),
        rejected,
        ..ProjectInput::default()
    })
    .expect_err("both fields fail");

    assert_eq!(failing_fields(&err), vec!["status", "title"]);
    let title_messages = &err.details().expect("details")["errors"]["title"];
    assert_eq!(title_messages, &serde_json::json!(["the title must be a string"]));
}
