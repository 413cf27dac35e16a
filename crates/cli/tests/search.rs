use assert_cmd::Command;
use predicates::prelude::*;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("shelfcheck-cli").unwrap();
    cmd.env("SHELFCHECK_CONFIG_DIR", std::env::temp_dir())
        .env_remove("SHELFCHECK_ENV")
        .env("RUST_LOG", "off");
    cmd
}

#[test]
fn blank_title_is_a_silent_no_op() {
    cli()
        .args(["search", "   ", "--endpoint", "http://127.0.0.1:9"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[tokio::test]
async fn available_title_prints_status_and_link() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .and(query_param("bookTitle", "Piranesi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "Available",
            "searchUrl": "https://catalog.example/v2/search?query=Piranesi"
        })))
        .mount(&server)
        .await;

    let endpoint = server.uri();
    let output = tokio::task::spawn_blocking(move || {
        cli()
            .args(["search", "  Piranesi ", "--endpoint", &endpoint])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("[ok] \"Piranesi\" is likely AVAILABLE!"));
    assert!(stdout.contains("Catalog link: https://catalog.example/v2/search?query=Piranesi"));
}

#[tokio::test]
async fn server_error_exits_non_zero() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let endpoint = server.uri();
    let output = tokio::task::spawn_blocking(move || {
        cli()
            .args(["search", "Emma", "--endpoint", &endpoint])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(!output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("[error] Error: Server error: 500"));
    assert!(!stdout.contains("Catalog link"));
}
