use crate::config::Settings;
use serde_json::{json, Value};

/// Content galaxy service placeholder.
pub struct GalaxyClient {
    host: String,
}

impl GalaxyClient {
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
