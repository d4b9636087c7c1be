//! Command layer: turns parsed arguments into resolver and merger calls and
//! hands back [`Output`] for rendering.
//!
//! CRUD goes through [`ResourceApi`] so most command logic runs against the
//! in-memory fake in unit tests; job and workflow actions need the
//! controller client itself.
mod credential;
mod host;
mod inventory;
mod job;
mod job_template;
mod organization;
mod ping;
mod project;
mod team;
mod user;
mod whoami;
mod workflow;
mod workflow_job;

use crate::api::ResourceApi;
use crate::cli::{Command, Targets};
use crate::client::Clients;
use crate::format::{field_label, format_datetime, format_name};
use crate::output::Output;
use crate::record::Record;
use crate::resolve::{Reference, ResolveError, Resolver};
use crate::resource::{capitalized, ResourceKind};
use anyhow::{anyhow, bail, Result};
use serde_json::{Map, Value};
use thiserror::Error;

pub fn run(command: Command, clients: &Clients) -> Result<Output> {
    match command {
        Command::Organization(cmd) => organization::run(cmd, clients),
        Command::Team(cmd) => team::run(cmd, &*clients.gateway()),
        Command::User(cmd) => user::run(cmd, &*clients.gateway()),
        Command::Whoami => whoami::run(&clients.gateway()),
        Command::Ping(args) => ping::run(&args, clients),
        Command::Project(cmd) => project::run(cmd, &*clients.controller()),
        Command::Inventory(cmd) => inventory::run(cmd, &*clients.controller()),
        Command::Credential(cmd) => credential::run(cmd, &*clients.controller()),
        Command::Host(cmd) => host::run(cmd, &*clients.controller()),
        Command::JobTemplate(cmd) => job_template::run(cmd, &clients.controller()),
        Command::Job(cmd) => job::run(cmd, &clients.controller()),
        Command::Workflow(cmd) => workflow::run(cmd, &clients.controller()),
        Command::WorkflowJob(cmd) => workflow_job::run(cmd, &clients.controller()),
    }
}

/// A multi-target command finished with some targets failed. `output` holds
/// the per-target lines, which are still printed.
#[derive(Debug, Error)]
#[error("{failed} of {total} {plural} failed to delete.")]
pub struct PartialFailure {
    pub output: Output,
    pub failed: usize,
    pub total: usize,
    pub plural: &'static str,
}

/// Delete one target (`--id`/`--name`, fail fast) or each positional target
/// (best effort, every target reported).
pub(crate) fn delete<A>(api: &A, kind: ResourceKind, targets: &Targets) -> Result<Output>
where
    A: ResourceApi + ?Sized,
{
    let resolver = Resolver::new(api, kind).full_record(false);

    if targets.id.is_some() || targets.name.is_some() {
        if targets.references.len() > 1 {
            bail!("Only one positional {kind} can be combined with --id or --name");
        }
        let reference = Reference {
            positional: targets.references.first().cloned(),
            id: targets.id,
            name: targets.name.clone(),
        };
        let record = resolver.resolve(&reference)?;
        api.remove(kind, record.id)?;
        return Ok(Output::line(deleted_line(kind, &record)));
    }

    if targets.references.is_empty() {
        return Err(ResolveError::MissingReference { kind }.into());
    }

    let mut lines = Vec::new();
    let mut failed = 0;
    for (token, resolved) in resolver.resolve_each(&targets.references) {
        let record = match resolved {
            Ok(record) => record,
            Err(err) => {
                tracing::debug!(token, error = %err, "delete target not resolved");
                lines.push(err.to_string());
                failed += 1;
                continue;
            }
        };
        match api.remove(kind, record.id) {
            Ok(()) => lines.push(deleted_line(kind, &record)),
            Err(err) => {
                lines.push(format!(
                    "Failed to delete {kind} '{}' (ID: {}): {err}",
                    display_name(kind, &record),
                    record.id
                ));
                failed += 1;
            }
        }
    }

    let output = Output::Lines(lines);
    if failed > 0 {
        return Err(PartialFailure {
            output,
            failed,
            total: targets.references.len(),
            plural: kind.plural(),
        }
        .into());
    }
    Ok(output)
}

fn deleted_line(kind: ResourceKind, record: &Record) -> String {
    format!(
        "{} '{}' (ID: {}) deleted",
        capitalized(kind.label()),
        display_name(kind, record),
        record.id
    )
}

fn display_name(kind: ResourceKind, record: &Record) -> String {
    format_name(record.display_name(kind).unwrap_or_default())
}

/// Resolve a relationship flag (`--organization`, `--inventory`, ...) to an id.
pub(crate) fn resolve_id<A>(api: &A, kind: ResourceKind, token: &str) -> Result<i64>
where
    A: ResourceApi + ?Sized,
{
    Ok(Resolver::new(api, kind).resolve_id(token)?)
}

/// Like [`resolve_id`] for an optional flag.
pub(crate) fn resolve_opt<A>(api: &A, kind: ResourceKind, token: Option<&str>) -> Result<Option<i64>>
where
    A: ResourceApi + ?Sized,
{
    token.map(|token| resolve_id(api, kind, token)).transpose()
}

/// Parse a JSON-valued flag.
pub(crate) fn parse_json(flag: &str, raw: &str) -> Result<Value> {
    serde_json::from_str(raw).map_err(|err| anyhow!("Invalid JSON in {flag}: {err}"))
}

/// Validate `--variables` and send it as JSON text, the form the API stores.
pub(crate) fn variables_arg(raw: &str) -> Result<Value> {
    let parsed = parse_json("--variables", raw)?;
    Ok(Value::from(parsed.to_string()))
}

/// Stored variables for display; empty documents render empty.
pub(crate) fn variables(record: &Record) -> Value {
    match record.field("variables") {
        Some(Value::String(text)) => Value::from(text),
        Some(Value::Object(map)) if map.is_empty() => Value::from(""),
        Some(Value::Null) | None => Value::from(""),
        Some(other) => Value::from(other.to_string()),
    }
}

/// A request body built from optional flags; absent flags are left out.
#[derive(Debug, Default)]
pub(crate) struct Body(Map<String, Value>);

impl Body {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn opt<T: Into<Value>>(&mut self, key: &str, value: Option<T>) {
        if let Some(value) = value {
            self.set(key, value);
        }
    }

    /// `true` when `on`, `false` when `off`, nothing when neither.
    pub fn toggle(&mut self, key: &str, on: bool, off: bool) {
        if on {
            self.set(key, true);
        } else if off {
            self.set(key, false);
        }
    }

    /// Set commands refuse to send an empty patch.
    pub fn require_changes(&self) -> Result<()> {
        if self.0.is_empty() {
            bail!("No properties specified to update");
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// A field for display; absent fields render empty.
pub(crate) fn field(record: &Record, key: &str) -> Value {
    record.field(key).unwrap_or_else(|| Value::from(""))
}

/// Like [`field`], but nulls render empty too.
pub(crate) fn text(record: &Record, key: &str) -> Value {
    match record.field(key) {
        None | Some(Value::Null) => Value::from(""),
        Some(value) => value,
    }
}

/// Username from `summary_fields.<key>`, for `created_by` / `modified_by`.
pub(crate) fn actor(record: &Record, key: &str) -> Value {
    Value::from(
        record
            .summary_fields
            .related_str(key, "username")
            .unwrap_or_default(),
    )
}

/// Show output whose `snake_case` field names are rendered as title-cased labels.
pub(crate) fn titled(fields: Vec<(&str, Value)>) -> Output {
    let mut show = Output::show();
    for (name, value) in fields {
        show.push(field_label(name), value);
    }
    show.build()
}

/// A timestamp field as `YYYY-MM-DD HH:MM:SS`.
pub(crate) fn when(record: &Record, key: &str) -> Value {
    Value::from(format_datetime(record.str_field(key)))
}

/// Name of a related object from summary fields, else the raw id, else empty.
pub(crate) fn related(record: &Record, key: &str) -> Value {
    if let Some(name) = record.related_name(key) {
        return Value::from(name);
    }
    match record.field(key) {
        Some(Value::Null) | None => Value::from(""),
        Some(Value::String(text)) => Value::from(text),
        Some(other) => Value::from(other.to_string()),
    }
}

/// Name of a related object from summary fields, else `fallback`.
pub(crate) fn related_or(record: &Record, key: &str, fallback: &str) -> Value {
    Value::from(record.related_name(key).unwrap_or(fallback))
}

/// Who launched a job, from `launched_by` or its summary, else `"N/A"`.
pub(crate) fn launched_by(record: &Record) -> Value {
    let name = match record.field("launched_by") {
        Some(Value::Object(by)) => by.get("name").and_then(Value::as_str).map(str::to_string),
        Some(Value::String(name)) if !name.is_empty() => Some(name),
        _ => None,
    };
    let name = name.or_else(|| {
        record
            .summary_fields
            .related_str("launched_by", "name")
            .map(str::to_string)
    });
    Value::from(name.unwrap_or_else(|| "N/A".to_string()))
}

/// Decode a response that should be a single record.
pub(crate) fn into_record(value: Value) -> Result<Record> {
    Ok(Record::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, FakeApi};
    use serde_json::json;

    const TEAM: ResourceKind = ResourceKind::Team;

    fn teams() -> FakeApi {
        FakeApi::new()
            .with(TEAM, json!({"id": 1, "name": "alpha"}))
            .with(TEAM, json!({"id": 2, "name": "beta"}))
            .with(TEAM, json!({"id": 3, "name": "gamma"}))
    }

    fn targets(references: &[&str]) -> Targets {
        Targets {
            references: references.iter().map(|r| r.to_string()).collect(),
            ..Targets::default()
        }
    }

    #[test]
    fn bulk_delete_reports_every_target() {
        let api = teams();
        let err = delete(&api, TEAM, &targets(&["alpha", "missing", "gamma"]))
            .expect_err("one target fails");
        let partial = err.downcast_ref::<PartialFailure>().expect("partial failure");

        assert_eq!(partial.to_string(), "1 of 3 teams failed to delete.");
        assert_eq!(
            partial.output,
            Output::Lines(vec![
                "Team 'alpha' (ID: 1) deleted".into(),
                "Team 'missing' not found".into(),
                "Team 'gamma' (ID: 3) deleted".into(),
            ])
        );
        let removed: Vec<_> = api
            .calls()
            .into_iter()
            .filter(|call| matches!(call, Call::Remove(..)))
            .collect();
        assert_eq!(removed, vec![Call::Remove(TEAM, 1), Call::Remove(TEAM, 3)]);
    }

    #[test]
    fn bulk_delete_falls_back_to_id_for_numeric_tokens() {
        let api = teams();
        let output = delete(&api, TEAM, &targets(&["2"])).expect("delete");
        assert_eq!(output, Output::line("Team 'beta' (ID: 2) deleted"));
    }

    #[test]
    fn bulk_delete_reports_failed_removals() {
        let api = teams().failing("remove", TEAM, Some(2));
        let err = delete(&api, TEAM, &targets(&["alpha", "beta"])).expect_err("remove fails");
        let partial = err.downcast_ref::<PartialFailure>().expect("partial failure");
        let Output::Lines(lines) = &partial.output else {
            panic!("expected lines");
        };
        assert!(lines[1].starts_with("Failed to delete team 'beta' (ID: 2): "), "{lines:?}");
    }

    #[test]
    fn single_target_delete_checks_name_against_id() {
        let api = teams();
        let err = delete(
            &api,
            TEAM,
            &Targets {
                references: vec!["alpha".into()],
                id: Some(2),
                name: None,
            },
        )
        .expect_err("mismatch");
        assert!(err.to_string().contains("ID 2 is 'beta', not 'alpha'"), "{err}");
        assert!(!api.calls().iter().any(|call| matches!(call, Call::Remove(..))));
    }

    #[test]
    fn delete_without_targets_is_a_missing_reference() {
        let err = delete(&teams(), TEAM, &Targets::default()).expect_err("no targets");
        assert!(err.to_string().starts_with("No team specified"), "{err}");
    }

    #[test]
    fn invalid_json_names_the_flag() {
        let err = parse_json("--variables", "{nope").expect_err("bad json");
        assert!(err.to_string().starts_with("Invalid JSON in --variables: "), "{err}");
    }

    #[test]
    fn related_prefers_summary_name_then_raw_id() {
        let with_summary = Record::from_value(json!({
            "id": 1,
            "organization": 4,
            "summary_fields": {"organization": {"id": 4, "name": "Default"}}
        }))
        .expect("record");
        let bare = Record::from_value(json!({"id": 1, "organization": 4})).expect("record");

        assert_eq!(related(&with_summary, "organization"), json!("Default"));
        assert_eq!(related(&bare, "organization"), json!("4"));
        assert_eq!(related_or(&bare, "organization", "N/A"), json!("N/A"));
    }

    #[test]
    fn empty_body_is_rejected_for_set() {
        let mut body = Body::new();
        assert_eq!(
            body.require_changes().expect_err("empty").to_string(),
            "No properties specified to update"
        );
        body.toggle("enabled", false, true);
        assert_eq!(body.into_value(), json!({"enabled": false}));
    }
}
