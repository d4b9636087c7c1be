//! Blocking HTTP clients for the platform services.
//!
//! Every service shares one [`ServiceClient`] shape: a `ureq` agent, a base
//! URL, and an `Authorization` header. The per-service wrappers only add the
//! base-URL rules and the operations that are not plain resource CRUD.
mod controller;
mod eda;
mod error;
mod galaxy;
mod gateway;

pub use controller::ControllerClient;
pub use eda::EdaClient;
pub use error::ClientError;
pub use galaxy::GalaxyClient;
pub use gateway::GatewayClient;

use crate::api::{Filters, ResourceApi};
use crate::config::{Settings, Tls};
use crate::record::{ListPage, Record};
use crate::resource::ResourceKind;
use anyhow::{anyhow, Context, Result};
use error::body_snippet;
use serde_json::Value;
use std::time::Instant;
use ureq::tls::{PemItem, RootCerts, TlsConfig};
use ureq::Agent;

/// The service handles one command invocation works with.
///
/// Built once from validated settings and passed by reference; the
/// controller handle is created on request because it costs a discovery
/// round trip.
pub struct Clients {
    settings: Settings,
    agent: Agent,
}

impl Clients {
    pub fn connect(settings: &Settings) -> Result<Self> {
        let agent = build_agent(settings)?;
        Ok(Self {
            settings: settings.clone(),
            agent,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn gateway(&self) -> GatewayClient {
        GatewayClient::new(self.agent.clone(), &self.settings)
    }

    pub fn controller(&self) -> ControllerClient {
        ControllerClient::discover(self.agent.clone(), &self.settings)
    }

    pub fn eda(&self) -> EdaClient {
        EdaClient::new(&self.settings)
    }

    pub fn galaxy(&self) -> GalaxyClient {
        GalaxyClient::new(&self.settings)
    }
}

/// Build the agent every service client of one invocation shares.
pub fn build_agent(settings: &Settings) -> Result<Agent> {
    let tls = match &settings.tls {
        Tls::Verify => TlsConfig::builder().build(),
        Tls::Insecure => TlsConfig::builder().disable_verification(true).build(),
        Tls::CaBundle(path) => {
            let pem = std::fs::read(path)
                .with_context(|| format!("read CA bundle {}", path.display()))?;
            let mut certs = Vec::new();
            for item in ureq::tls::parse_pem(&pem) {
                let item = item.with_context(|| format!("parse CA bundle {}", path.display()))?;
                if let PemItem::Certificate(cert) = item {
                    certs.push(cert.to_owned());
                }
            }
            if certs.is_empty() {
                return Err(anyhow!(
                    "CA bundle {} contains no certificates",
                    path.display()
                ));
            }
            TlsConfig::builder()
                .root_certs(RootCerts::new_with_certs(&certs))
                .build()
        }
    };

    let config = Agent::config_builder()
        .timeout_global(Some(settings.timeout))
        .http_status_as_error(false)
        .tls_config(tls)
        .build();
    Ok(config.into())
}

/// HTTP verb, kept as a static string for logging and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

/// One service endpoint root plus the shared agent and credentials.
#[derive(Clone)]
pub struct ServiceClient {
    agent: Agent,
    base_url: String,
    auth: String,
}

impl ServiceClient {
    pub fn new(agent: Agent, base_url: impl Into<String>, settings: &Settings) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            agent,
            base_url,
            auth: settings.auth.header_value(),
        }
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    pub fn get(&self, endpoint: &str, query: &Filters) -> Result<Value, ClientError> {
        let url = self.url(endpoint);
        let text = self.execute(Method::Get, &url, query, None)?;
        decode(&url, Method::Get, &text)
    }

    /// GET returning the raw body, for text endpoints such as job stdout.
    pub fn get_text(&self, endpoint: &str, query: &Filters) -> Result<String, ClientError> {
        let url = self.url(endpoint);
        self.execute(Method::Get, &url, query, None)
    }

    /// GET an absolute URL on the same agent (used before a base URL is known).
    pub fn get_absolute(&self, url: &str) -> Result<Value, ClientError> {
        let text = self.execute(Method::Get, url, &Filters::new(), None)?;
        decode(url, Method::Get, &text)
    }

    pub fn post(&self, endpoint: &str, body: &Value) -> Result<Value, ClientError> {
        let url = self.url(endpoint);
        let text = self.execute(Method::Post, &url, &Filters::new(), Some(body))?;
        decode(&url, Method::Post, &text)
    }

    pub fn patch(&self, endpoint: &str, body: &Value) -> Result<Value, ClientError> {
        let url = self.url(endpoint);
        let text = self.execute(Method::Patch, &url, &Filters::new(), Some(body))?;
        decode(&url, Method::Patch, &text)
    }

    pub fn delete(&self, endpoint: &str) -> Result<Value, ClientError> {
        let url = self.url(endpoint);
        let text = self.execute(Method::Delete, &url, &Filters::new(), None)?;
        decode(&url, Method::Delete, &text)
    }

    fn execute(
        &self,
        method: Method,
        url: &str,
        query: &Filters,
        body: Option<&Value>,
    ) -> Result<String, ClientError> {
        let started = Instant::now();
        let auth = self.auth.as_str();
        let result = match method {
            Method::Get | Method::Delete => {
                let mut request = if method == Method::Get {
                    self.agent.get(url)
                } else {
                    self.agent.delete(url)
                };
                for (key, value) in query.pairs() {
                    request = request.query(key, value);
                }
                request
                    .header("Authorization", auth)
                    .header("Accept", "application/json")
                    .call()
            }
            Method::Post | Method::Patch => {
                let request = if method == Method::Post {
                    self.agent.post(url)
                } else {
                    self.agent.patch(url)
                };
                let empty = Value::Object(Default::default());
                request
                    .header("Authorization", auth)
                    .header("Accept", "application/json")
                    .send_json(body.unwrap_or(&empty))
            }
        };

        let mut response = result.map_err(|err| {
            tracing::debug!(method = method.as_str(), url, error = %err, "request failed");
            ClientError::Transport {
                method: method.as_str(),
                url: url.to_string(),
                message: err.to_string(),
            }
        })?;
        let status = response.status().as_u16();
        let text = response
            .body_mut()
            .read_to_string()
            .map_err(|err| ClientError::Decode {
                url: url.to_string(),
                message: err.to_string(),
            })?;
        tracing::debug!(
            method = method.as_str(),
            url,
            status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request complete"
        );

        if !(200..300).contains(&status) {
            return Err(ClientError::Status {
                method: method.as_str(),
                url: url.to_string(),
                status,
                body: body_snippet(&text),
            });
        }
        Ok(text)
    }
}

fn decode(url: &str, method: Method, text: &str) -> Result<Value, ClientError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        Err(_) if method == Method::Delete => Ok(Value::Null),
        Err(err) => Err(ClientError::Decode {
            url: url.to_string(),
            message: err.to_string(),
        }),
    }
}

fn decode_record(url: String, value: Value) -> Result<Record, ClientError> {
    Record::from_value(value).map_err(|err| ClientError::Decode {
        url,
        message: err.to_string(),
    })
}

impl ResourceApi for ServiceClient {
    fn list(&self, kind: ResourceKind, filters: &Filters) -> Result<ListPage, ClientError> {
        let value = self.get(kind.endpoint(), filters)?;
        ListPage::from_value(value).map_err(|err| ClientError::Decode {
            url: self.url(kind.endpoint()),
            message: err.to_string(),
        })
    }

    fn fetch(&self, kind: ResourceKind, id: i64) -> Result<Option<Record>, ClientError> {
        let endpoint = kind.item_endpoint(id);
        match self.get(&endpoint, &Filters::new()) {
            Ok(value) => decode_record(self.url(&endpoint), value).map(Some),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn create(&self, kind: ResourceKind, body: &Value) -> Result<Record, ClientError> {
        let value = self.post(kind.endpoint(), body)?;
        decode_record(self.url(kind.endpoint()), value)
    }

    fn update(&self, kind: ResourceKind, id: i64, body: &Value) -> Result<Record, ClientError> {
        let endpoint = kind.item_endpoint(id);
        let value = self.patch(&endpoint, body)?;
        decode_record(self.url(&endpoint), value)
    }

    fn remove(&self, kind: ResourceKind, id: i64) -> Result<(), ClientError> {
        self.delete(&kind.item_endpoint(id)).map(|_| ())
    }
}
