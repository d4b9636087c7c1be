use super::{ClientError, ServiceClient};
use crate::api::Filters;
use crate::config::Settings;
use serde_json::{json, Value};
use std::ops::Deref;
use ureq::Agent;

/// Client for the job and workflow orchestration service.
pub struct ControllerClient {
    inner: ServiceClient,
}

impl ControllerClient {
    /// Discover the API root under `<host>/api/`, falling back to `/api/v2/`.
    pub fn discover(agent: Agent, settings: &Settings) -> Self {
        let probe = ServiceClient::new(agent.clone(), format!("{}/api/", settings.host), settings);
        let base_url = match discover_path(&probe, &settings.host) {
            Some(path) => join_host(&settings.host, &path),
            None => format!("{}/api/v2/", settings.host),
        };
        tracing::debug!(base_url = %base_url, "controller api root");
        Self {
            inner: ServiceClient::new(agent, base_url, settings),
        }
    }

    pub fn ping(&self) -> Result<Value, ClientError> {
        self.get("ping/", &Filters::new())
    }

    pub fn launch_job_template(&self, id: i64, body: &Value) -> Result<Value, ClientError> {
        self.post(&format!("job_templates/{id}/launch/"), body)
    }

    pub fn cancel_job(&self, id: i64) -> Result<Value, ClientError> {
        self.post(&format!("jobs/{id}/cancel/"), &json!({}))
    }

    pub fn relaunch_job(&self, id: i64, body: &Value) -> Result<Value, ClientError> {
        self.post(&format!("jobs/{id}/relaunch/"), body)
    }

    pub fn job_events(&self, id: i64) -> Result<Value, ClientError> {
        self.get(&format!("jobs/{id}/job_events/"), &Filters::new())
    }

    pub fn job_stdout(&self, id: i64) -> Result<String, ClientError> {
        self.get_text(
            &format!("jobs/{id}/stdout/"),
            &Filters::new().with("format", "txt"),
        )
    }

    pub fn launch_workflow(&self, id: i64, body: &Value) -> Result<Value, ClientError> {
        self.post(&format!("workflow_job_templates/{id}/launch/"), body)
    }

    pub fn cancel_workflow_job(&self, id: i64) -> Result<Value, ClientError> {
        self.post(&format!("workflow_jobs/{id}/cancel/"), &json!({}))
    }

    pub fn relaunch_workflow_job(&self, id: i64) -> Result<Value, ClientError> {
        self.post(&format!("workflow_jobs/{id}/relaunch/"), &json!({}))
    }
}

impl Deref for ControllerClient {
    type Target = ServiceClient;

    fn deref(&self) -> &ServiceClient {
        &self.inner
    }
}

fn discover_path(probe: &ServiceClient, host: &str) -> Option<String> {
    let root = match probe.get("", &Filters::new()) {
        Ok(root) => root,
        Err(err) => {
            tracing::debug!(error = %err, "api root discovery failed");
            return None;
        }
    };
    let controller_path = root.pointer("/apis/controller").and_then(Value::as_str)?;
    let listing = match probe.get_absolute(&join_host(host, controller_path)) {
        Ok(listing) => listing,
        Err(err) => {
            tracing::debug!(error = %err, "controller version discovery failed");
            return None;
        }
    };
    version_path(&listing)
}

/// Pick the API version path from a controller version listing.
pub(crate) fn version_path(listing: &Value) -> Option<String> {
    listing
        .get("current_version")
        .and_then(Value::as_str)
        .or_else(|| listing.pointer("/available_versions/v2").and_then(Value::as_str))
        .map(str::to_string)
}

pub(crate) fn join_host(host: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!("{}/{}", host.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_version_wins_over_available_versions() {
        let listing = json!({
            "current_version": "/api/controller/v2/",
            "available_versions": {"v2": "/api/v2/"}
        });
        assert_eq!(
            version_path(&listing).as_deref(),
            Some("/api/controller/v2/")
        );
    }

    #[test]
    fn available_v2_is_used_without_current_version() {
        let listing = json!({"available_versions": {"v2": "/api/controller/v2/"}});
        assert_eq!(
            version_path(&listing).as_deref(),
            Some("/api/controller/v2/")
        );
        assert_eq!(version_path(&json!({})), None);
    }

    #[test]
    fn join_host_handles_slashes() {
        assert_eq!(
            join_host("https://aap/", "/api/controller/"),
            "https://aap/api/controller/"
        );
    }
}
