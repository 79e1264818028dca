//! End-to-end tests for the Python tool against a mock interpreter
//! service.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use opslens_tools::{InterpreterConfig, PythonTool};
use opslens_traits::{Tool, ToolErrorKind};

fn disable_system_proxy_for_tests() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        // Safety: set once for the process before any HTTP clients are built.
        unsafe {
            std::env::set_var("OPSLENS_DISABLE_SYSTEM_PROXY", "1");
        }
    });
}

async fn mock_interpreter(reply: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/execute"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn clean_execution_yields_a_success_observation() {
    disable_system_proxy_for_tests();
    let server = mock_interpreter(json!({
        "stdout": "2\n",
        "stderr": "",
        "exit_code": 0,
        "files": {}
    }))
    .await;

    let tool = PythonTool::new(&InterpreterConfig::new(server.uri()));
    let output = tool
        .execute(json!({"code": "print(1+1)"}))
        .await
        .unwrap();

    assert!(output.success);
    assert_eq!(output.result["status"], "success");
    assert!(output.result["output"].as_str().unwrap().contains('2'));
    assert!(output.result.get("diagnostic").is_none());
}

#[tokio::test]
async fn nonzero_exit_with_stdout_is_a_partial_result() {
    disable_system_proxy_for_tests();
    let server = mock_interpreter(json!({
        "stdout": "step 1 done\n",
        "stderr": "Traceback: boom",
        "exit_code": 1,
        "files": {}
    }))
    .await;

    let tool = PythonTool::new(&InterpreterConfig::new(server.uri()));
    let output = tool.execute(json!({"code": "run()"})).await.unwrap();

    assert!(output.success, "partial results stay success-shaped");
    assert_eq!(output.error_kind, Some(ToolErrorKind::PartialResult));
    assert_eq!(output.result["status"], "partial_failure");
    assert_eq!(output.result["output"], "step 1 done");
    assert!(
        output.result["diagnostic"]
            .as_str()
            .unwrap()
            .contains("boom")
    );
}

#[tokio::test]
async fn generated_files_come_back_as_artifacts() {
    disable_system_proxy_for_tests();
    let server = mock_interpreter(json!({
        "stdout": "saved",
        "stderr": "",
        "exit_code": 0,
        "files": {"/workspace/plot.png": "3f2a"}
    }))
    .await;

    let tool = PythonTool::new(&InterpreterConfig::new(server.uri()));
    let output = tool.execute(json!({"code": "plot()"})).await.unwrap();

    assert!(output.success);
    let artifact = &output.result["artifacts"][0];
    assert_eq!(artifact["name"], "plot.png");
    assert_eq!(artifact["content_type"], "image/png");
    assert!(
        artifact["urn"]
            .as_str()
            .unwrap()
            .starts_with("urn:opslens:artifact:")
    );
    assert!(
        output.result["artifact_markdown"]
            .as_str()
            .unwrap()
            .contains("![plot.png]")
    );
    // Plot bytes never appear inline.
    assert_eq!(output.result["output"], "saved");
}

#[tokio::test]
async fn language_tag_is_normalized_on_the_wire() {
    disable_system_proxy_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/execute"))
        .and(body_partial_json(json!({"language": "python"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "stdout": "ok", "stderr": "", "exit_code": 0, "files": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tool = PythonTool::new(&InterpreterConfig::new(server.uri()));
    let output = tool
        .execute(json!({"code": "print('ok')", "language": "Language.PYTHON"}))
        .await
        .unwrap();
    assert!(output.success);
}

#[tokio::test]
async fn backend_error_status_is_classified_as_rejection() {
    disable_system_proxy_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/execute"))
        .respond_with(ResponseTemplate::new(500).set_body_string("sandbox unavailable"))
        .mount(&server)
        .await;

    let tool = PythonTool::new(&InterpreterConfig::new(server.uri()));
    let output = tool.execute(json!({"code": "print(1)"})).await.unwrap();

    assert!(!output.success);
    assert_eq!(output.error_kind, Some(ToolErrorKind::BackendRejected));
    let message = output.error.unwrap();
    assert!(message.contains("500"));
    assert!(message.contains("sandbox unavailable"));
}

#[tokio::test]
async fn slow_backend_is_classified_as_timeout() {
    disable_system_proxy_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/execute"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"stdout": "late", "exit_code": 0}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let config = InterpreterConfig::new(server.uri()).with_timeout(Duration::from_millis(50));
    let tool = PythonTool::new(&config);
    let output = tool.execute(json!({"code": "print(1)"})).await.unwrap();

    assert!(!output.success);
    assert_eq!(output.error_kind, Some(ToolErrorKind::Timeout));
    assert_eq!(output.retryable, Some(true));
}

#[tokio::test]
async fn unreachable_backend_is_classified_as_connection_failure() {
    disable_system_proxy_for_tests();
    let tool = PythonTool::new(&InterpreterConfig::new("http://127.0.0.1:1"));
    let output = tool.execute(json!({"code": "print(1)"})).await.unwrap();

    assert!(!output.success);
    assert_eq!(output.error_kind, Some(ToolErrorKind::ConnectionFailed));
    assert_eq!(output.retryable, Some(true));
}

#[tokio::test]
async fn undecodable_reply_is_an_internal_error() {
    disable_system_proxy_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/execute"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let tool = PythonTool::new(&InterpreterConfig::new(server.uri()));
    let output = tool.execute(json!({"code": "print(1)"})).await.unwrap();

    assert!(!output.success);
    assert_eq!(output.error_kind, Some(ToolErrorKind::Internal));
    // Operator-facing detail stays out of the observation.
    assert!(!output.error.unwrap().contains("not json"));
}
