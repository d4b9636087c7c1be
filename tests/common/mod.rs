//! Shared test infrastructure for integration tests.
//!
//! [`StubServer`] mounts canned JSON responses on a wiremock [`MockServer`];
//! anything unrouted gets wiremock's empty 404. [`aap`] runs the built binary
//! against it from an empty temp directory so no stray `.env` is picked up.

use serde_json::Value;
use std::process::Output;
use tempfile::TempDir;
use tokio::process::Command;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// One canned response.
#[derive(Debug, Clone)]
pub struct Route {
    method: &'static str,
    path: String,
    query: Vec<(String, String)>,
    status: u16,
    body: Value,
}

impl Route {
    /// Only match requests carrying `key=value` in the query string.
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    fn into_mock(self) -> Mock {
        let mut builder = Mock::given(method(self.method)).and(path(self.path));
        for (key, value) in self.query {
            builder = builder.and(query_param(key, value));
        }
        let mut response = ResponseTemplate::new(self.status);
        if !self.body.is_null() {
            response = response.set_body_json(self.body);
        }
        builder.respond_with(response)
    }
}

/// A route answering `status`; a `Null` body means an empty response.
pub fn route(method: &'static str, path: &str, status: u16, body: Value) -> Route {
    Route {
        method,
        path: path.to_string(),
        query: Vec::new(),
        status,
        body,
    }
}

pub fn get(path: &str, body: Value) -> Route {
    route("GET", path, 200, body)
}

/// A list envelope around `results`.
pub fn page(results: Vec<Value>) -> Value {
    serde_json::json!({"count": results.len(), "next": null, "results": results})
}

pub struct StubServer {
    server: MockServer,
}

impl StubServer {
    pub async fn start(routes: Vec<Route>) -> Self {
        let server = MockServer::start().await;
        for route in routes {
            route.into_mock().mount(&server).await;
        }
        Self { server }
    }

    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// `"METHOD /path?query"` for every request received so far.
    pub async fn requests(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|request| {
                let target = match request.url.query() {
                    Some(query) => format!("{}?{query}", request.url.path()),
                    None => request.url.path().to_string(),
                };
                format!("{} {target}", request.method)
            })
            .collect()
    }
}

/// Run `aap` with token auth against `server`.
pub async fn aap(server: &StubServer, args: &[&str]) -> Output {
    let dir = TempDir::new().expect("temp dir");
    let mut command = base_command(&dir);
    command
        .env("AAP_HOST", server.url())
        .env("AAP_TOKEN", "test-token")
        .args(args);
    command.output().await.expect("run aap")
}

/// Run `aap` with no connection settings at all.
pub async fn aap_unconfigured(args: &[&str]) -> Output {
    let dir = TempDir::new().expect("temp dir");
    aap_in(&dir, args).await
}

/// Run `aap` from `dir` with only the settings `dir` provides (a `.env`).
pub async fn aap_in(dir: &TempDir, args: &[&str]) -> Output {
    let mut command = base_command(dir);
    command.args(args);
    command.output().await.expect("run aap")
}

fn base_command(dir: &TempDir) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_aap"));
    command.current_dir(dir.path());
    for key in [
        "AAP_HOST",
        "AAP_USERNAME",
        "AAP_PASSWORD",
        "AAP_TOKEN",
        "AAP_VERIFY_SSL",
        "AAP_CA_BUNDLE",
        "AAP_TIMEOUT",
        "AAP_LOG",
        "RUST_LOG",
    ] {
        command.env_remove(key);
    }
    command
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
