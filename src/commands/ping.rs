//! Connectivity check against the gateway and the controller.
use crate::cli::PingArgs;
use crate::client::{ClientError, Clients};
use crate::config::Auth;
use crate::format::{cell_text, format_datetime, yes_no};
use crate::output::{Output, ShowBuilder};
use anyhow::Result;
use serde_json::Value;
use std::fmt;
use std::time::{Duration, Instant};

const SLOW_AFTER: Duration = Duration::from_secs(2);
const WARN_AFTER: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Health {
    Ok,
    Slow,
    Warning,
    Failed,
}

impl Health {
    fn for_elapsed(elapsed: Duration) -> Self {
        if elapsed > WARN_AFTER {
            Health::Warning
        } else if elapsed > SLOW_AFTER {
            Health::Slow
        } else {
            Health::Ok
        }
    }
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Health::Ok => "OK",
            Health::Slow => "SLOW",
            Health::Warning => "WARNING",
            Health::Failed => "FAILED",
        })
    }
}

/// One timed ping.
#[derive(Debug, Clone)]
struct Probe {
    health: Health,
    elapsed: Duration,
    result: Result<Value, String>,
}

impl Probe {
    fn run(ping: impl FnOnce() -> Result<Value, ClientError>) -> Self {
        let started = Instant::now();
        let result = ping();
        let elapsed = started.elapsed();
        match result {
            Ok(payload) => Probe {
                health: Health::for_elapsed(elapsed),
                elapsed,
                result: Ok(payload),
            },
            Err(err) => Probe {
                health: Health::Failed,
                elapsed,
                result: Err(err.to_string()),
            },
        }
    }

    fn payload(&self) -> Option<&Value> {
        self.result.as_ref().ok()
    }

    fn text(&self, key: &str) -> Option<String> {
        self.payload()
            .and_then(|payload| payload.get(key))
            .filter(|value| !value.is_null())
            .map(cell_text)
    }

    fn flag(&self, key: &str) -> Option<bool> {
        self.payload()
            .and_then(|payload| payload.get(key))
            .and_then(Value::as_bool)
    }

    fn response_time(&self) -> String {
        format!("{:.2} ms", self.elapsed.as_secs_f64() * 1000.0)
    }
}

fn overall(gateway: Health, controller: Health) -> &'static str {
    if gateway == Health::Failed || controller == Health::Failed {
        if gateway != controller {
            "PARTIAL"
        } else {
            "FAILED"
        }
    } else if gateway == Health::Warning || controller == Health::Warning {
        "WARNING"
    } else if gateway == Health::Slow || controller == Health::Slow {
        "SLOW"
    } else {
        "OK"
    }
}

pub(super) fn run(args: &PingArgs, clients: &Clients) -> Result<Output> {
    let settings = clients
        .settings()
        .with_timeout(Duration::from_secs(args.timeout));
    let clients = Clients::connect(&settings)?;
    let controller = clients.controller();
    let gateway = clients.gateway();

    let controller_probe = Probe::run(|| controller.ping());
    let gateway_probe = Probe::run(|| gateway.ping());
    tracing::debug!(
        gateway = %gateway_probe.health,
        controller = %controller_probe.health,
        "ping finished"
    );

    let authentication = match settings.auth {
        Auth::Bearer(_) => "Token",
        Auth::Basic { .. } => "Username/Password",
    };
    let mut show = report(&settings.host, authentication, &gateway_probe, &controller_probe);
    if args.detail {
        detail(&mut show, &controller_probe);
        show.push_separator();
        show.push("EDA Status", service_status(&clients.eda().ping()));
        show.push("Galaxy Status", service_status(&clients.galaxy().ping()));
    }
    Ok(show.build())
}

fn service_status(payload: &Value) -> String {
    payload
        .get("status")
        .map(cell_text)
        .unwrap_or_else(|| "Unknown".to_string())
}

fn report(host: &str, authentication: &str, gateway: &Probe, controller: &Probe) -> ShowBuilder {
    let mut show = Output::show()
        .field("Overall Status", overall(gateway.health, controller.health))
        .field("Server Host", host)
        .field("Authentication", authentication)
        .separator()
        .field("Gateway API Status", gateway.health.to_string())
        .field("Gateway Response Time", gateway.response_time())
        .field(
            "Gateway Version",
            gateway.text("version").unwrap_or_else(|| "Unknown".into()),
        );
    if let Some(pong) = gateway.text("pong").filter(|pong| !pong.is_empty()) {
        show.push("Gateway Server Time", format_datetime(Some(&pong)));
    }
    if let Some(db) = gateway.flag("db_connected") {
        show.push("Gateway DB Status", connected(db));
    }
    if let Some(proxy) = gateway.flag("proxy_connected") {
        show.push("Gateway Proxy Status", connected(proxy));
    }
    if let Err(err) = &gateway.result {
        show.push("Gateway Error", err.as_str());
    }

    show.push_separator();
    show.push("Controller API Status", controller.health.to_string());
    show.push("Controller Response Time", controller.response_time());
    show.push(
        "Controller Version",
        controller.text("version").unwrap_or_else(|| "Unknown".into()),
    );
    if let Some(node) = controller.text("active_node").filter(|node| !node.is_empty()) {
        show.push("Controller Active Node", node);
    }
    if let Err(err) = &controller.result {
        show.push("Controller Error", err.as_str());
    }
    show
}

fn connected(up: bool) -> &'static str {
    if up {
        "Connected"
    } else {
        "Disconnected"
    }
}

/// HA, instances, and instance groups from the controller ping payload.
fn detail(show: &mut ShowBuilder, controller: &Probe) {
    show.push_separator();
    let payload = match &controller.result {
        Ok(payload) => payload,
        Err(err) => {
            show.push("Controller Detail Error", err.as_str());
            return;
        }
    };

    let text = |value: &Value, key: &str, fallback: &str| -> String {
        value
            .get(key)
            .filter(|v| !v.is_null())
            .map(cell_text)
            .unwrap_or_else(|| fallback.to_string())
    };

    show.push(
        "Controller HA Enabled",
        yes_no(payload.get("ha").and_then(Value::as_bool).unwrap_or(false)),
    );
    show.push("Controller Install UUID", text(payload, "install_uuid", "N/A"));

    let instances = payload
        .get("instances")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    if !instances.is_empty() {
        show.push_separator();
        show.push("Controller Instances", format!("{} node(s)", instances.len()));
        for (index, instance) in instances.iter().enumerate() {
            let prefix = format!("Instance {}", index + 1);
            show.push(format!("{prefix} Node"), text(instance, "node", "Unknown"));
            show.push(format!("{prefix} Type"), text(instance, "node_type", "Unknown"));
            show.push(format!("{prefix} Capacity"), text(instance, "capacity", "Unknown"));
            show.push(format!("{prefix} Version"), text(instance, "version", "Unknown"));
            show.push(
                format!("{prefix} Heartbeat"),
                format_datetime(instance.get("heartbeat").and_then(Value::as_str)),
            );
            if index + 1 < instances.len() {
                show.push_separator();
            }
        }
    }

    let groups = payload
        .get("instance_groups")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    if !groups.is_empty() {
        show.push_separator();
        show.push("Controller Instance Groups", format!("{} group(s)", groups.len()));
        for (index, group) in groups.iter().enumerate() {
            let prefix = format!("Group {}", index + 1);
            let members: Vec<String> = group
                .get("instances")
                .and_then(Value::as_array)
                .map(|members| members.iter().map(cell_text).collect())
                .unwrap_or_default();
            show.push(format!("{prefix} Name"), text(group, "name", "Unknown"));
            show.push(format!("{prefix} Capacity"), text(group, "capacity", "Unknown"));
            show.push(
                format!("{prefix} Instances"),
                format!("{} ({})", members.len(), members.join(", ")),
            );
            if index + 1 < groups.len() {
                show.push_separator();
            }
        }
    }
}
