use super::{
    actor, delete, field, related, resolve_id, resolve_opt, text, titled, variables, variables_arg,
    when, Body,
};
use crate::api::{Filters, ResourceApi};
use crate::cli::{HostCommand, HostCreateArgs, HostListArgs, HostMetricsArgs, HostSetArgs};
use crate::format::{format_name, yes_no};
use crate::output::Output;
use crate::record::Record;
use crate::resolve::{Reference, Resolver};
use crate::resource::ResourceKind;
use anyhow::{anyhow, Context, Result};
use serde_json::Value;

const KIND: ResourceKind = ResourceKind::Host;

pub(super) fn run<A: ResourceApi + ?Sized>(cmd: HostCommand, api: &A) -> Result<Output> {
    match cmd {
        HostCommand::List(args) => list(api, &args),
        HostCommand::Show(target) => show(api, &target.reference()),
        HostCommand::Create(args) => create(api, &args),
        HostCommand::Set(args) => set(api, &args),
        HostCommand::Delete(targets) => delete(api, KIND, &targets),
        HostCommand::Metrics(args) => metrics(api, &args),
    }
}

fn enabled(host: &Record) -> &'static str {
    yes_no(host.bool_field("enabled").unwrap_or(true))
}

fn last_job(host: &Record) -> String {
    let Some(job) = host.summary_fields.related.get("last_job") else {
        return String::new();
    };
    let id = job.get("id").map(Value::to_string).unwrap_or_default();
    let status = job.get("status").and_then(Value::as_str).unwrap_or_default();
    format!("#{id} ({status})")
}

fn list<A: ResourceApi + ?Sized>(api: &A, args: &HostListArgs) -> Result<Output> {
    let mut filters = Filters::new();
    filters.push_opt(
        "inventory",
        resolve_opt(api, ResourceKind::Inventory, args.inventory.as_deref())?,
    );
    filters.push("page_size", args.limit);
    filters.push("order_by", "id");
    let page = api.list(KIND, &filters)?;

    let mut columns = vec!["ID", "Name", "Description", "Inventory", "Enabled"];
    if args.long {
        columns.extend(["Created", "Modified", "Last Job"]);
    }
    let rows = page
        .results
        .iter()
        .map(|host| {
            let mut row = vec![
                Value::from(host.id),
                field(host, "name"),
                text(host, "description"),
                related(host, "inventory"),
                Value::from(enabled(host)),
            ];
            if args.long {
                row.push(when(host, "created"));
                row.push(when(host, "modified"));
                row.push(Value::from(last_job(host)));
            }
            row
        })
        .collect();
    Ok(Output::list(columns, rows))
}

fn show<A: ResourceApi + ?Sized>(api: &A, reference: &Reference) -> Result<Output> {
    let host = Resolver::new(api, KIND).resolve(reference)?;
    Ok(titled(vec![
        ("id", Value::from(host.id)),
        ("name", text(&host, "name")),
        ("description", text(&host, "description")),
        ("inventory_name", related(&host, "inventory")),
        ("enabled", Value::from(enabled(&host))),
        ("variables", variables(&host)),
        ("created", when(&host, "created")),
        ("modified", when(&host, "modified")),
        ("created_by_name", actor(&host, "created_by")),
        ("modified_by_name", actor(&host, "modified_by")),
    ]))
}

fn create<A: ResourceApi + ?Sized>(api: &A, args: &HostCreateArgs) -> Result<Output> {
    let inventory = resolve_id(api, ResourceKind::Inventory, &args.inventory)?;
    let mut body = Body::new();
    body.set("name", args.name.as_str());
    body.set("inventory", inventory);
    body.opt("description", args.description.as_deref());
    body.opt("variables", args.variables.as_deref().map(variables_arg).transpose()?);
    if args.disabled {
        body.set("enabled", false);
    }

    let host = match api.create(KIND, &body.into_value()) {
        Ok(host) => host,
        Err(err) => {
            if err.status() == Some(400) {
                if let Some(existing) = existing_host(api, &args.name, inventory) {
                    return Err(anyhow!(
                        "Host '{} (ID: {})' already exists in this inventory",
                        args.name,
                        existing.id
                    ));
                }
            }
            return Err(anyhow::Error::new(err).context("Failed to create host"));
        }
    };
    Ok(Output::show()
        .field("ID", host.id)
        .field("Name", text(&host, "name"))
        .field("Description", text(&host, "description"))
        .field("Inventory", text(&host, "inventory"))
        .field("Enabled", enabled(&host))
        .field("Created", when(&host, "created"))
        .build())
}

/// Best-effort duplicate check after a rejected create.
fn existing_host<A: ResourceApi + ?Sized>(api: &A, name: &str, inventory: i64) -> Option<Record> {
    let filters = Filters::new().with("name", name).with("inventory", inventory);
    match api.list(KIND, &filters) {
        Ok(page) if page.count > 0 => page.results.into_iter().next(),
        Ok(_) => None,
        Err(err) => {
            tracing::debug!(error = %err, "duplicate host check failed");
            None
        }
    }
}

fn set<A: ResourceApi + ?Sized>(api: &A, args: &HostSetArgs) -> Result<Output> {
    let mut body = Body::new();
    body.opt("name", args.name.as_deref());
    body.opt("description", args.description.as_deref());
    body.opt("variables", args.variables.as_deref().map(variables_arg).transpose()?);
    body.toggle("enabled", args.enabled, args.disabled);
    body.require_changes()?;

    let host = Resolver::new(api, KIND)
        .full_record(false)
        .resolve(&args.target.reference())?;
    let updated = api
        .update(KIND, host.id, &body.into_value())
        .with_context(|| format!("Failed to update host {}", host.id))?;
    let name = updated.name.or(host.name).unwrap_or_default();
    Ok(Output::line(format!("Host {} updated", format_name(&name))))
}

fn metrics<A: ResourceApi + ?Sized>(api: &A, args: &HostMetricsArgs) -> Result<Output> {
    let mut filters = Filters::new();
    filters.push_opt("hostname", args.hostname.as_deref());
    filters.push("page_size", args.limit);
    filters.push("order_by", "id");
    let page = api.list(ResourceKind::HostMetric, &filters)?;

    let mut columns = vec![
        "ID",
        "Hostname",
        "First Automated",
        "Last Automated",
        "Automation Count",
        "Deleted",
        "Deleted Count",
    ];
    if args.long {
        columns.extend(["Created", "Modified"]);
    }
    let rows = page
        .results
        .iter()
        .map(|metric| {
            let mut row = vec![
                Value::from(metric.id),
                text(metric, "hostname"),
                when(metric, "first_automation"),
                when(metric, "last_automation"),
                Value::from(metric.i64_field("automated_counter").unwrap_or(0)),
                Value::from(yes_no(metric.bool_field("deleted").unwrap_or(false))),
                Value::from(metric.i64_field("deleted_counter").unwrap_or(0)),
            ];
            if args.long {
                row.push(when(metric, "created"));
                row.push(when(metric, "modified"));
            }
            row
        })
        .collect();
    Ok(Output::list(columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::SetTarget;
    use crate::testing::{Call, FakeApi};
    use serde_json::json;

    fn api() -> FakeApi {
        FakeApi::new()
            .with(ResourceKind::Inventory, json!({"id": 42, "name": "prod-inventory"}))
            .with(
                KIND,
                json!({
                    "id": 100,
                    "name": "web-01",
                    "inventory": 42,
                    "enabled": false,
                    "summary_fields": {
                        "inventory": {"id": 42, "name": "prod-inventory"},
                        "last_job": {"id": 77, "status": "failed"}
                    }
                }),
            )
    }

    fn create_args(name: &str) -> HostCreateArgs {
        HostCreateArgs {
            name: name.into(),
            inventory: "prod-inventory".into(),
            description: None,
            variables: None,
            disabled: false,
        }
    }

    #[test]
    fn list_pages_by_id_and_shows_last_job() {
        let api = api();
        let args = HostListArgs {
            inventory: Some("42".into()),
            limit: 20,
            long: true,
        };
        let Output::List { rows, .. } = list(&api, &args).expect("list") else {
            panic!("expected list output");
        };
        assert_eq!(rows[0][3], json!("prod-inventory"));
        assert_eq!(rows[0][4], json!("No"));
        assert_eq!(rows[0][7], json!("#77 (failed)"));
        assert_eq!(
            api.calls(),
            vec![Call::List(
                KIND,
                vec![
                    ("inventory".into(), "42".into()),
                    ("page_size".into(), "20".into()),
                    ("order_by".into(), "id".into())
                ]
            )]
        );
    }

    #[test]
    fn rejected_create_names_the_existing_host() {
        let api = api().failing_with("create", KIND, None, 400);
        let err = create(&api, &create_args("web-01")).expect_err("duplicate");
        assert_eq!(
            err.to_string(),
            "Host 'web-01 (ID: 100)' already exists in this inventory"
        );
    }

    #[test]
    fn rejected_create_without_duplicate_keeps_the_upstream_error() {
        let api = api().failing_with("create", KIND, None, 400);
        let err = create(&api, &create_args("web-02")).expect_err("rejected");
        assert!(format!("{err:#}").starts_with("Failed to create host: "), "{err:#}");
    }

    #[test]
    fn set_reports_the_new_name() {
        let api = api();
        let args = HostSetArgs {
            target: SetTarget {
                reference: Some("web-01".into()),
                id: None,
            },
            name: Some("web-01b".into()),
            description: None,
            variables: None,
            enabled: true,
            disabled: false,
        };
        let output = set(&api, &args).expect("set");
        assert_eq!(output, Output::line("Host web-01b updated"));
        assert!(api.calls().contains(&Call::Update(
            KIND,
            100,
            json!({"name": "web-01b", "enabled": true})
        )));
    }

    #[test]
    fn metrics_use_the_host_metrics_endpoint() {
        let api = FakeApi::new().with(
            ResourceKind::HostMetric,
            json!({"id": 1, "hostname": "web-01", "automated_counter": 5, "deleted": false}),
        );
        let args = HostMetricsArgs {
            hostname: Some("web-01".into()),
            limit: 20,
            long: false,
        };
        let Output::List { rows, .. } = metrics(&api, &args).expect("metrics") else {
            panic!("expected list output");
        };
        assert_eq!(rows[0][4], json!(5));
        assert_eq!(rows[0][5], json!("No"));
        assert_eq!(rows[0][6], json!(0));
    }
}
