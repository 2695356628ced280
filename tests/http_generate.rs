use std::fs;
use std::net::TcpListener;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use consent_banner::test_support::{
    apply_generator_test_env, remove_dir_if_exists, scenario_config, temp_path,
};
use reqwest::StatusCode;
use serde_json::json;
use tokio::time::sleep;

struct RunningServer {
    child: Child,
    bind_addr: String,
    log_dir: PathBuf,
}

impl Drop for RunningServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        remove_dir_if_exists(&self.log_dir);
    }
}

#[tokio::test]
async fn http_and_cli_produce_identical_artifacts() {
    let Some(server) = start_server().await else {
        eprintln!("skipping: local TCP bind is not permitted in this environment");
        return;
    };
    let client = reqwest::Client::new();
    let config = scenario_config();

    let response = client
        .post(format!("http://{}/generate/js", server.bind_addr))
        .json(&config)
        .send()
        .await
        .expect("HTTP request should complete");
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    assert!(content_type.starts_with("text/javascript"));
    let http_js = response.text().await.expect("body should be text");

    let config_dir = temp_path("integration-http-config");
    fs::create_dir_all(&config_dir).expect("config dir should be creatable");
    let config_path = config_dir.join("banner.json");
    fs::write(
        &config_path,
        serde_json::to_string(&config).expect("config should serialize"),
    )
    .expect("config should be writable");

    let mut command = Command::new(bin_path());
    command.args([
        "generate",
        "--tab",
        "js",
        "--config",
        config_path.to_str().expect("temp path should be UTF-8"),
    ]);
    apply_generator_test_env(&mut command, &config_dir.join("logs"));
    let output = command.output().expect("CLI command should execute");
    remove_dir_if_exists(&config_dir);

    assert!(output.status.success());
    let cli_js = String::from_utf8_lossy(&output.stdout);
    assert_eq!(cli_js.trim_end(), http_js.trim_end());
}

#[tokio::test]
async fn http_rejects_unknown_artifact() {
    let Some(server) = start_server().await else {
        eprintln!("skipping: local TCP bind is not permitted in this environment");
        return;
    };
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{}/generate/pdf", server.bind_addr))
        .json(&json!({}))
        .send()
        .await
        .expect("HTTP request should complete");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = response
        .json()
        .await
        .expect("HTTP error body should be valid JSON");
    let error = body
        .get("error")
        .and_then(|value| value.as_str())
        .expect("error field should be a string");
    assert!(
        error.contains("invalid output tab"),
        "expected tab error, got: {error}"
    );
}

#[tokio::test]
async fn http_serves_default_config() {
    let Some(server) = start_server().await else {
        eprintln!("skipping: local TCP bind is not permitted in this environment");
        return;
    };

    let url = format!("http://{}/config/default", server.bind_addr);
    let body: serde_json::Value = reqwest::get(url)
        .await
        .expect("HTTP request should complete")
        .json()
        .await
        .expect("default config should be JSON");

    assert_eq!(body["position"], "bottom");
    assert_eq!(body["behavior"]["cookieExpiry"], 365);
    assert_eq!(body["advanced"]["performance"]["inlineCriticalCSS"], true);
}

async fn start_server() -> Option<RunningServer> {
    let port = find_available_port()?;
    let bind_addr = format!("127.0.0.1:{port}");
    let log_dir = temp_path("integration-logs");
    fs::create_dir_all(&log_dir).expect("log dir should be creatable");

    let mut command = Command::new(bin_path());
    command
        .args(["serve", "--bind", &bind_addr])
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    apply_generator_test_env(&mut command, &log_dir);

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(error) if error.kind() == std::io::ErrorKind::PermissionDenied => return None,
        Err(error) => panic!("server should start: {error}"),
    };

    let health_url = format!("http://{bind_addr}/health");
    let client = reqwest::Client::new();
    for _ in 0..100 {
        if let Some(status) = child.try_wait().expect("failed to poll server process") {
            panic!("server exited before becoming healthy: {status}");
        }

        if let Ok(response) = client.get(&health_url).send().await
            && response.status().is_success()
        {
            return Some(RunningServer {
                child,
                bind_addr,
                log_dir,
            });
        }

        sleep(Duration::from_millis(50)).await;
    }

    let _ = child.kill();
    let _ = child.wait();
    panic!("server did not become healthy at {health_url}");
}

fn find_available_port() -> Option<u16> {
    let listener = match TcpListener::bind("127.0.0.1:0") {
        Ok(listener) => listener,
        Err(error) if error.kind() == std::io::ErrorKind::PermissionDenied => return None,
        Err(error) => panic!("ephemeral port should be available for bind: {error}"),
    };
    let port = listener
        .local_addr()
        .expect("ephemeral listener should have local address")
        .port();
    drop(listener);
    Some(port)
}

fn bin_path() -> &'static str {
    env!("CARGO_BIN_EXE_consent_banner")
}
