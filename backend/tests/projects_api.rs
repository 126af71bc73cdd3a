//! End-to-end behaviour of the project endpoints.

mod support;

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use portfolio_backend::inbound::http::projects::TitleKey;
use rstest::rstest;
use serde_json::{Value, json};

use support::{config, init_app, send, sign_up, with_token};

fn project_uri(project: &Value) -> String {
    format!(
        "/api/v1/projects/{}",
        project["data"]["id"].as_str().expect("project id")
    )
}

#[actix_web::test]
async fn only_the_owner_may_change_a_project() {
    let app = init_app(config()).await;
    let (owner_id, owner) = sign_up(&app, "one@example.com").await;
    let (_, other) = sign_up(&app, "two@example.com").await;

    let created = send(
        &app,
        with_token(TestRequest::post().uri("/api/v1/projects"), Some(owner.as_str()))
            .set_json(json!({"name": "Demo", "status": "planned"})),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let uri = project_uri(&created.body);

    let denied = send(
        &app,
        with_token(TestRequest::put().uri(&uri), Some(other.as_str()))
            .set_json(json!({"status": "current"})),
    )
    .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    assert_eq!(denied.body["code"], "forbidden");

    let updated = send(
        &app,
        with_token(TestRequest::put().uri(&uri), Some(owner.as_str()))
            .set_json(json!({"status": "current"})),
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["data"]["status"], "current");
    assert_eq!(updated.body["data"]["user_id"], owner_id);
    assert_eq!(updated.body["data"]["name"], "Demo");

    let denied = send(
        &app,
        with_token(TestRequest::delete().uri(&uri), Some(other.as_str())),
    )
    .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    let still_there = send(&app, TestRequest::get().uri(&uri)).await;
    assert_eq!(still_there.status, StatusCode::OK);
}

#[actix_web::test]
async fn create_then_get_returns_the_submitted_fields() {
    let app = init_app(config()).await;
    let (owner_id, token) = sign_up(&app, "one@example.com").await;
    let fields = json!({
        "title": "Portfolio",
        "description": "Personal site",
        "demo_link": "https://demo.example.com",
        "github_link": "https://github.com/example/portfolio",
        "image": "https://cdn.example.com/shot.png",
        "status": "finished",
        "user_id": "00000000-0000-0000-0000-000000000000"
    });

    let created = send(
        &app,
        with_token(TestRequest::post().uri("/api/v1/projects"), Some(token.as_str()))
            .set_json(&fields),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);

    let fetched = send(&app, TestRequest::get().uri(&project_uri(&created.body))).await;
    assert_eq!(fetched.status, StatusCode::OK);
    let data = &fetched.body["data"];
    assert_eq!(data["name"], "Portfolio");
    for key in ["description", "demo_link", "github_link", "image", "status"] {
        assert_eq!(data[key], fields[key], "{key}");
    }
    assert_eq!(data["user_id"], owner_id);
    assert_eq!(data, &created.body["data"]);
}

#[rstest]
#[case("post", "/api/v1/projects")]
#[case("put", "/api/v1/projects/{id}")]
#[case("patch", "/api/v1/projects/{id}")]
#[case("delete", "/api/v1/projects/{id}")]
#[actix_web::test]
async fn anonymous_mutations_are_rejected_without_side_effects(
    #[case] method: &str,
    #[case] template: &str,
) {
    let app = init_app(config()).await;
    let (_, token) = sign_up(&app, "one@example.com").await;
    let created = send(
        &app,
        with_token(TestRequest::post().uri("/api/v1/projects"), Some(token.as_str()))
            .set_json(json!({"name": "Demo", "status": "planned"})),
    )
    .await;
    let id = created.body["data"]["id"].as_str().expect("id");
    let uri = template.replace("{id}", id);

    let request = match method {
        "post" => TestRequest::post(),
        "put" => TestRequest::put(),
        "patch" => TestRequest::patch(),
        _ => TestRequest::delete(),
    };
    let reply = send(
        &app,
        with_token(request.uri(&uri), Some("not-a-real-token"))
            .set_json(json!({"name": "Changed", "status": "finished"})),
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

    let listed = send(&app, TestRequest::get().uri("/api/v1/projects")).await;
    let projects = listed.body["data"].as_array().expect("list");
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0]["name"], "Demo");
    assert_eq!(projects[0]["status"], "planned");
}

#[rstest]
#[case(json!({"name": "Demo", "status": "archived"}), &["status"])]
#[case(json!({"name": "Demo", "status": "PLANNED"}), &["status"])]
#[case(json!({"name": "", "status": 3}), &["status", "title"])]
#[case(json!({"name": "Demo", "title": "Other", "status": "planned"}), &["title"])]
#[case(
    json!({"title": "Demo", "status": "planned", "demo_link": "ftp://x", "github_link": "nope"}),
    &["demo_link", "github_link"]
)]
#[actix_web::test]
async fn invalid_payloads_list_every_failing_field(
    #[case] payload: Value,
    #[case] fields: &[&str],
) {
    let app = init_app(config()).await;
    let (_, token) = sign_up(&app, "one@example.com").await;

    let reply = send(
        &app,
        with_token(TestRequest::post().uri("/api/v1/projects"), Some(token.as_str()))
            .set_json(&payload),
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY, "{}", reply.body);
    assert_eq!(reply.body["code"], "validation_failed");
    let errors = reply.body["details"]["errors"]
        .as_object()
        .expect("errors object");
    let mut reported: Vec<&str> = errors.keys().map(String::as_str).collect();
    reported.sort_unstable();
    assert_eq!(reported, fields);
}

#[actix_web::test]
async fn partial_updates_keep_omitted_fields_and_clear_nulls() {
    let app = init_app(config()).await;
    let (_, token) = sign_up(&app, "one@example.com").await;
    let created = send(
        &app,
        with_token(TestRequest::post().uri("/api/v1/projects"), Some(token.as_str()))
            .set_json(json!({
                "name": "Demo",
                "status": "planned",
                "description": "First cut",
                "demo_link": "https://demo.example.com"
            })),
    )
    .await;
    let uri = project_uri(&created.body);

    let patched = send(
        &app,
        with_token(TestRequest::patch().uri(&uri), Some(token.as_str()))
            .set_json(json!({"demo_link": null, "title": "Renamed"})),
    )
    .await;
    assert_eq!(patched.status, StatusCode::OK);
    let data = &patched.body["data"];
    assert_eq!(data["name"], "Renamed");
    assert_eq!(data["description"], "First cut");
    assert!(data["demo_link"].is_null());
    assert_eq!(data["status"], "planned");
}

#[actix_web::test]
async fn projects_list_newest_first_and_scope_to_the_caller() {
    let app = init_app(config()).await;
    let (_, first) = sign_up(&app, "one@example.com").await;
    let (_, second) = sign_up(&app, "two@example.com").await;

    for (token, name) in [(&first, "Oldest"), (&second, "Middle"), (&first, "Newest")] {
        let reply = send(
            &app,
            with_token(TestRequest::post().uri("/api/v1/projects"), Some(token.as_str()))
                .set_json(json!({"name": name, "status": "planned"})),
        )
        .await;
        assert_eq!(reply.status, StatusCode::CREATED);
    }

    let names = |reply: &support::Reply| -> Vec<String> {
        reply.body["data"]
            .as_array()
            .expect("list")
            .iter()
            .filter_map(|project| project["name"].as_str().map(str::to_owned))
            .collect()
    };

    let all = send(&app, TestRequest::get().uri("/api/v1/projects")).await;
    assert_eq!(names(&all), ["Newest", "Middle", "Oldest"]);

    let mine = send(
        &app,
        with_token(TestRequest::get().uri("/api/v1/projects?scope=mine"), Some(first.as_str())),
    )
    .await;
    assert_eq!(names(&mine), ["Newest", "Oldest"]);
}

#[rstest]
#[case(TitleKey::Name, Some("Demo"), None)]
#[case(TitleKey::Title, None, Some("Demo"))]
#[case(TitleKey::Both, Some("Demo"), Some("Demo"))]
#[actix_web::test]
async fn the_configured_title_key_shapes_responses(
    #[case] key: TitleKey,
    #[case] name: Option<&str>,
    #[case] title: Option<&str>,
) {
    let app = init_app(config().with_title_key(key)).await;
    let (_, token) = sign_up(&app, "one@example.com").await;

    let created = send(
        &app,
        with_token(TestRequest::post().uri("/api/v1/projects"), Some(token.as_str()))
            .set_json(json!({"name": "Demo", "status": "planned"})),
    )
    .await;
    let data = &created.body["data"];
    assert_eq!(data.get("name").and_then(Value::as_str), name);
    assert_eq!(data.get("title").and_then(Value::as_str), title);
}

#[actix_web::test]
async fn deleting_an_account_removes_its_projects() {
    let app = init_app(config()).await;
    let (owner_id, token) = sign_up(&app, "one@example.com").await;
    let created = send(
        &app,
        with_token(TestRequest::post().uri("/api/v1/projects"), Some(token.as_str()))
            .set_json(json!({"name": "Demo", "status": "planned"})),
    )
    .await;
    let uri = project_uri(&created.body);

    let deleted = send(
        &app,
        with_token(
            TestRequest::delete().uri(&format!("/api/v1/users/{owner_id}")),
            Some(token.as_str()),
        ),
    )
    .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let gone = send(&app, TestRequest::get().uri(&uri)).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.body["code"], "not_found");
}

#[actix_web::test]
async fn malformed_bodies_are_bad_requests() {
    let app = init_app(config()).await;
    let (_, token) = sign_up(&app, "one@example.com").await;

    let reply = send(
        &app,
        with_token(TestRequest::post().uri("/api/v1/projects"), Some(token.as_str()))
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"name\": "),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["code"], "invalid_request");
}

#[actix_web::test]
async fn anonymous_mutations_fail_authentication_before_body_parsing() {
    let app = init_app(config()).await;
    let (_, token) = sign_up(&app, "one@example.com").await;
    let created = send(
        &app,
        with_token(TestRequest::post().uri("/api/v1/projects"), Some(token.as_str()))
            .set_json(json!({"name": "Demo", "status": "planned"})),
    )
    .await;
    let uri = project_uri(&created.body);

    let malformed = send(
        &app,
        TestRequest::post()
            .uri("/api/v1/projects")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json"),
    )
    .await;
    assert_eq!(malformed.status, StatusCode::UNAUTHORIZED);
    assert_eq!(malformed.body["code"], "unauthorized");

    let bodiless = send(&app, TestRequest::put().uri(&uri)).await;
    assert_eq!(bodiless.status, StatusCode::UNAUTHORIZED);

    let owned_but_bodiless = send(
        &app,
        with_token(TestRequest::put().uri(&uri), Some(token.as_str())),
    )
    .await;
    assert_eq!(owned_but_bodiless.status, StatusCode::BAD_REQUEST);
    assert_eq!(owned_but_bodiless.body["code"], "invalid_request");
}
