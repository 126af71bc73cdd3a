//! Regression coverage for user value objects.

use super::*;
use chrono::TimeZone;
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5)
        .single()
        .expect("valid fixture timestamp")
}

#[rstest]
#[case("3fa85f64-5717-4562-b3fc-2c963f66afa6", true)]
#[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6", false)]
#[case("not-a-uuid", false)]
#[case("", false)]
fn user_id_parsing(#[case] raw: &str, #[case] valid: bool) {
    assert_eq!(UserId::new(raw).is_ok(), valid);
}

#[rstest]
#[case("", UserValidationError::EmptyName)]
#[case("    ", UserValidationError::EmptyName)]
fn user_name_rejects_blank(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(UserName::new(raw), Err(expected));
}

#[rstest]
fn user_name_rejects_overlong() {
    let raw = "a".repeat(USER_NAME_MAX + 1);
    assert_eq!(
        UserName::new(raw),
        Err(UserValidationError::NameTooLong {
            max: USER_NAME_MAX
        })
    );
}

#[rstest]
fn user_name_is_trimmed() {
    let name = UserName::new("  Ada  ").expect("valid name");
    assert_eq!(name.as_ref(), "Ada");
}

#[rstest]
#[case("ada@example.com")]
#[case("ADA@Example.com")]
#[case("first.last+tag@sub.example.org")]
fn email_accepts_common_shapes(#[case] raw: &str) {
    assert!(EmailAddress::new(raw).is_ok());
}

#[rstest]
#[case("", UserValidationError::EmptyEmail)]
#[case("plainaddress", UserValidationError::InvalidEmail)]
#[case("@example.com", UserValidationError::InvalidEmail)]
#[case("ada@", UserValidationError::InvalidEmail)]
#[case("ada@localhost", UserValidationError::InvalidEmail)]
#[case("ada@@example.com", UserValidationError::InvalidEmail)]
#[case("ada lovelace@example.com", UserValidationError::InvalidEmail)]
#[case("ada@example..com", UserValidationError::InvalidEmail)]
fn email_rejects_malformed(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(EmailAddress::new(raw), Err(expected));
}

#[rstest]
fn email_is_normalised() {
    let email = EmailAddress::new(" Ada@Example.COM ").expect("valid email");
    assert_eq!(email.as_ref(), "ada@example.com");
}

#[rstest]
fn user_serialises_without_credentials(timestamp: DateTime<Utc>) {
    let id = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("fixture id");
    let user = User::new(
        id,
        UserName::new("Ada").expect("name"),
        EmailAddress::new("ada@example.com").expect("email"),
        timestamp,
        timestamp,
    );
    let value = serde_json::to_value(&user).expect("serialise user");
    assert_eq!(value["id"], json!("3fa85f64-5717-4562-b3fc-2c963f66afa6"));
    assert_eq!(value["name"], json!("Ada"));
    assert_eq!(value["email"], json!("ada@example.com"));
    assert!(value.get("password").is_none());
}

#[rstest]
fn with_profile_updates_supplied_fields_only(timestamp: DateTime<Utc>) {
    let user = User::new(
        UserId::random(),
        UserName::new("Ada").expect("name"),
        EmailAddress::new("ada@example.com").expect("email"),
        timestamp,
        timestamp,
    );
    let later = timestamp + chrono::Duration::minutes(5);
    let updated = user
        .clone()
        .with_profile(Some(UserName::new("Grace").expect("name")), None, later);

    assert_eq!(updated.name().as_ref(), "Grace");
    assert_eq!(updated.email(), user.email());
    assert_eq!(updated.updated_at(), later);
    assert_eq!(updated.created_at(), timestamp);
}
