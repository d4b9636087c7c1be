use crate::config::Settings;
use serde_json::{json, Value};

/// Event-driven automation service. No endpoints are wired yet; the handle
/// exists so every service is reachable the same way.
pub struct EdaClient {
    host: String,
}

impl EdaClient {
    pub fn new(settings: &Settings) -> Self {
        Self {
            host: settings.host.clone(),
        }
    }

    /// Reports the configured host as reachable without any network I/O.
    pub fn ping(&self) -> Value {
        json!({"status": "ok", "host": self.host})
    }
}
