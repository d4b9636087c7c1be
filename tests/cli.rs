//! End-to-end runs of the `aap` binary against a stub platform.

mod common;

use common::{aap, aap_in, aap_unconfigured, get, page, route, stderr, stdout, StubServer};
use serde_json::{json, Value};
use tempfile::TempDir;

#[tokio::test]
async fn organization_show_merges_gateway_and_controller() {
    let server = StubServer::start(vec![
        get(
            "/api/gateway/v1/organizations/",
            page(vec![json!({
                "id": 1,
                "name": "Default",
                "description": "Main org",
                "managed": false,
                "summary_fields": {"related_field_counts": {"users": 3, "teams": 2}}
            })]),
        )
        .query("name", "Default"),
        get(
            "/api/v2/organizations/1/",
            json!({
                "id": 1,
                "name": "Default",
                "max_hosts": 100,
                "summary_fields": {"related_field_counts": {
                    "users": 5, "teams": 2, "projects": 4, "job_templates": 6, "inventories": 1
                }}
            }),
        ),
    ])
    .await;

    let output = aap(
        &server,
        &["organization", "show", "Default", "--format", "json"],
    )
    .await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let shown: Value = serde_json::from_str(&stdout(&output)).expect("json output");
    assert_eq!(shown["name"], json!("Default"));
    assert_eq!(shown["description"], json!("Main org"));
    assert_eq!(shown["max_hosts"], json!(100));
    assert_eq!(shown["users"], json!(5));
    assert_eq!(shown["projects"], json!(4));

    // No discovery document, so the controller falls back to /api/v2/.
    let requests = server.requests().await;
    assert!(requests.contains(&"GET /api/".to_string()), "{requests:?}");
    assert!(
        requests.contains(&"GET /api/v2/organizations/1/".to_string()),
        "{requests:?}"
    );
}

#[tokio::test]
async fn bulk_delete_reports_every_target_and_fails() {
    let server = StubServer::start(vec![
        get(
            "/api/gateway/v1/teams/",
            page(vec![json!({"id": 1, "name": "alpha"})]),
        )
        .query("name", "alpha"),
        get("/api/gateway/v1/teams/", page(vec![])).query("name", "ghost"),
        route("DELETE", "/api/gateway/v1/teams/1/", 204, Value::Null),
    ])
    .await;

    let output = aap(&server, &["team", "delete", "alpha", "ghost"]).await;
    assert_eq!(output.status.code(), Some(1));
    let out = stdout(&output);
    assert!(out.contains("Team 'alpha' (ID: 1) deleted"), "{out}");
    assert!(out.contains("Team 'ghost' not found"), "{out}");
    assert!(
        stderr(&output).contains("1 of 2 teams failed to delete."),
        "{}",
        stderr(&output)
    );
}

#[tokio::test]
async fn missing_host_is_a_configuration_error() {
    let output = aap_unconfigured(&["whoami"]).await;
    assert_eq!(output.status.code(), Some(1));
    assert!(
        stderr(&output).contains("AAP host is required"),
        "{}",
        stderr(&output)
    );
}

#[tokio::test]
async fn inventory_name_match_is_refetched_by_id() {
    let server = StubServer::start(vec![
        get(
            "/api/v2/inventories/",
            page(vec![json!({"id": 42, "name": "prod-inventory"})]),
        )
        .query("name", "prod-inventory"),
        get(
            "/api/v2/inventories/42/",
            json!({
                "id": 42,
                "name": "prod-inventory",
                "kind": "",
                "total_hosts": 3,
                "summary_fields": {"organization": {"id": 1, "name": "Default"}}
            }),
        ),
    ])
    .await;

    let output = aap(
        &server,
        &["inventory", "show", "prod-inventory", "-f", "json"],
    )
    .await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let shown: Value = serde_json::from_str(&stdout(&output)).expect("json output");
    assert_eq!(shown["Id"], json!(42));
    assert_eq!(shown["Total Hosts"], json!(3));
    assert_eq!(shown["Organization Name"], json!("Default"));
    assert!(server
        .requests()
        .await
        .contains(&"GET /api/v2/inventories/42/".to_string()));
}

#[tokio::test]
async fn id_and_name_must_agree() {
    let server = StubServer::start(vec![get(
        "/api/gateway/v1/teams/7/",
        json!({"id": 7, "name": "team-y"}),
    )])
    .await;

    let output = aap(&server, &["team", "show", "--id", "7", "--name", "team-x"]).await;
    assert_eq!(output.status.code(), Some(1));
    assert!(
        stderr(&output).contains(
            "ID 7 and name 'team-x' refer to different teams: ID 7 is 'team-y', not 'team-x'"
        ),
        "{}",
        stderr(&output)
    );
}

#[tokio::test]
async fn job_cancel_refuses_finished_jobs() {
    let server = StubServer::start(vec![get(
        "/api/v2/jobs/15/",
        json!({"id": 15, "name": "deploy", "status": "successful"}),
    )])
    .await;

    let output = aap(&server, &["job", "cancel", "15"]).await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "Job 15 cannot be canceled (status: successful)\n"
    );
    assert!(!server
        .requests()
        .await
        .iter()
        .any(|request| request.starts_with("POST")));
}

#[tokio::test]
async fn dotenv_in_working_directory_configures_the_client() {
    let server = StubServer::start(vec![get(
        "/api/gateway/v1/me/",
        page(vec![json!({
            "id": 1,
            "username": "admin",
            "summary_fields": {"organizations": [{"id": 1, "name": "Default"}]}
        })]),
    )])
    .await;
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(
        dir.path().join(".env"),
        format!("AAP_HOST={}\nAAP_TOKEN=from-dotenv\n", server.url()),
    )
    .expect("write .env");

    let output = aap_in(&dir, &["whoami", "-f", "value"]).await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let lines: Vec<String> = stdout(&output).lines().map(str::to_string).collect();
    assert_eq!(lines[0], "1");
    assert_eq!(lines[1], "admin");
    assert!(lines.contains(&"Default".to_string()), "{lines:?}");
}

#[tokio::test]
async fn unusable_ca_bundle_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let bundle = dir.path().join("bundle.pem");
    std::fs::write(&bundle, "not a certificate\n").expect("write bundle");
    let bundle = bundle.to_string_lossy().into_owned();

    let output = aap_in(
        &dir,
        &[
            "whoami",
            "--aap-host",
            "https://aap.example.com",
            "--aap-token",
            "t",
            "--aap-ca-bundle",
            &bundle,
        ],
    )
    .await;
    assert_eq!(output.status.code(), Some(1));
    assert!(
        stderr(&output).contains("CA bundle"),
        "{}",
        stderr(&output)
    );
}

#[tokio::test]
async fn debug_flag_logs_requests() {
    let me = page(vec![json!({"id": 1, "username": "admin"})]);
    let server = StubServer::start(vec![get("/api/gateway/v1/me/", me)]).await;

    let quiet = aap(&server, &["whoami"]).await;
    assert!(quiet.status.success(), "stderr: {}", stderr(&quiet));
    assert!(!stderr(&quiet).contains("request complete"), "{}", stderr(&quiet));

    let output = aap(&server, &["--debug", "whoami"]).await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let err = stderr(&output);
    assert!(err.contains("request complete"), "{err}");
    assert!(err.contains("/api/gateway/v1/me/"), "{err}");
}
