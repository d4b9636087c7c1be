use super::{ClientError, ServiceClient};
use crate::api::Filters;
use crate::config::Settings;
use serde_json::Value;
use std::ops::Deref;
use ureq::Agent;

/// Client for the identity service (organizations, teams, users).
pub struct GatewayClient {
    inner: ServiceClient,
}

impl GatewayClient {
    pub fn new(agent: Agent, settings: &Settings) -> Self {
        Self {
            inner: ServiceClient::new(agent, format!("{}/api/gateway/v1/", settings.host), settings),
        }
    }

    /// The authenticated user, as a list envelope.
    pub fn me(&self) -> Result<Value, ClientError> {
        self.get("me/", &Filters::new())
    }

    pub fn ping(&self) -> Result<Value, ClientError> {
        self.get("ping/", &Filters::new())
    }
}

impl Deref for GatewayClient {
    type Target = ServiceClient;

    fn deref(&self) -> &ServiceClient {
        &self.inner
    }
}
