use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn answer_for(prompt: &str) -> &'static str {
    if prompt.contains("Previous UI State") {
        "0.9"
    } else if prompt.contains("Current UI State: Home Page") {
        "Click Sign Up"
    } else if prompt.contains("Current UI State: Sign Up Page") {
        "Submit"
    } else if prompt.contains("Current UI State: Account Created Page") {
        "Click Continue to Dashboard"
    } else {
        "I am not sure"
    }
}

fn respond(req: &Request) -> ResponseTemplate {
    let body: Value = serde_json::from_slice(&req.body).unwrap_or(Value::Null);
    let prompt = body["messages"][0]["content"].as_str().unwrap_or_default();
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{"message": {"role": "assistant", "content": answer_for(prompt)}}]
    }))
}

#[test]
fn missing_api_key_is_fatal_before_any_iteration() {
    let mut cmd = Command::cargo_bin("wegfinder").unwrap();
    cmd.env_remove("OPEN_AI_KEY")
        .env_remove("OPENAI_API_KEY")
        .args(["run", "--base-url", "http://127.0.0.1:9"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("No api key provided"))
        .stdout(predicate::str::contains("Action History").not());
}

#[test]
fn api_key_is_read_from_dotenv_file() {
    let dir = std::env::temp_dir().join(format!("wegfinder_dotenv_test_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(".env"), "OPEN_AI_KEY=sk-test\n").unwrap();

    // No actions from "Nowhere", so the run ends before any request is sent.
    let mut cmd = Command::cargo_bin("wegfinder").unwrap();
    cmd.current_dir(&dir)
        .env_remove("OPEN_AI_KEY")
        .env_remove("OPENAI_API_KEY")
        .args(["run", "--initial-state", "Nowhere", "--base-url", "http://127.0.0.1:9"]);

    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("No api key provided").not())
        .stdout(predicate::str::contains("no actions available"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test(flavor = "multi_thread")]
async fn run_walks_sign_up_flow_against_mock_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(respond)
        .mount(&server)
        .await;

    let dir = std::env::temp_dir().join(format!("wegfinder_cli_test_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    let report_path = dir.join("report.json");
    let base_url = format!("{}/v1", server.uri());

    let report_arg = report_path.clone();
    let output = tokio::task::spawn_blocking(move || {
        Command::cargo_bin("wegfinder")
            .unwrap()
            .env("OPEN_AI_KEY", "test-key")
            .env("RUST_LOG", "warn")
            .args(["run", "--base-url", &base_url, "--retry-delay-ms", "0"])
            .arg("--report")
            .arg(&report_arg)
            .assert()
            .success()
            .get_output()
            .clone()
    })
    .await
    .unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("goal reached"), "stdout: {stdout}");
    assert!(stdout.contains("Click Sign Up, Submit, Click Continue to Dashboard"));

    let report: Value = serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report["outcome"], "goal_reached");
    assert_eq!(report["final_state"], "Dashboard");
    assert_eq!(report["experiences"].as_array().map(Vec::len), Some(3));

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_initial_state_exits_with_no_actions_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(respond)
        .expect(0)
        .mount(&server)
        .await;
    let base_url = format!("{}/v1", server.uri());

    tokio::task::spawn_blocking(move || {
        Command::cargo_bin("wegfinder")
            .unwrap()
            .env("OPEN_AI_KEY", "test-key")
            .args(["run", "--initial-state", "Nowhere", "--base-url", &base_url])
            .assert()
            .code(2)
            .stdout(predicate::str::contains("no actions available"));
    })
    .await
    .unwrap();
}
