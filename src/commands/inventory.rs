use super::{
    actor, delete, field, related, resolve_id, resolve_opt, text, titled, variables, variables_arg,
    when, Body,
};
use crate::api::{Filters, ResourceApi};
use crate::cli::{
    InventoryCommand, InventoryCreateArgs, InventoryKind, InventoryListArgs, InventorySetArgs,
};
use crate::output::Output;
use crate::record::Record;
use crate::resolve::{Reference, Resolver};
use crate::resource::ResourceKind;
use anyhow::Result;
use serde_json::Value;

const KIND: ResourceKind = ResourceKind::Inventory;

pub(super) fn run<A: ResourceApi + ?Sized>(cmd: InventoryCommand, api: &A) -> Result<Output> {
    match cmd {
        InventoryCommand::List(args) => list(api, &args),
        InventoryCommand::Show(target) => show(api, &target.reference()),
        InventoryCommand::Create(args) => create(api, &args),
        InventoryCommand::Set(args) => set(api, &args),
        InventoryCommand::Delete(targets) => delete(api, KIND, &targets),
    }
}

fn kind_str(kind: InventoryKind) -> &'static str {
    match kind {
        InventoryKind::Smart => "smart",
    }
}

/// The API reports regular inventories with an empty kind.
fn kind_of(inventory: &Record) -> Value {
    match inventory.str_field("kind") {
        Some(kind) if !kind.is_empty() => Value::from(kind),
        _ => Value::from("regular"),
    }
}

fn list<A: ResourceApi + ?Sized>(api: &A, args: &InventoryListArgs) -> Result<Output> {
    let mut filters = Filters::new();
    filters.push_opt(
        "organization",
        resolve_opt(api, ResourceKind::Organization, args.organization.as_deref())?,
    );
    filters.push_opt("kind", args.kind.map(kind_str));
    let page = api.list(KIND, &filters)?;

    let columns = if args.long {
        vec!["ID", "Name", "Kind", "Organization", "Description", "Host Count", "Created", "Modified"]
    } else {
        vec!["ID", "Name", "Kind", "Organization", "Host Count"]
    };
    let rows = page
        .results
        .iter()
        .map(|inventory| {
            let mut row = vec![
                Value::from(inventory.id),
                field(inventory, "name"),
                kind_of(inventory),
                related(inventory, "organization"),
            ];
            if args.long {
                row.push(text(inventory, "description"));
            }
            row.push(Value::from(inventory.i64_field("total_hosts").unwrap_or(0)));
            if args.long {
                row.push(when(inventory, "created"));
                row.push(when(inventory, "modified"));
            }
            row
        })
        .collect();
    Ok(Output::list(columns, rows))
}

fn show<A: ResourceApi + ?Sized>(api: &A, reference: &Reference) -> Result<Output> {
    let inventory = Resolver::new(api, KIND).resolve(reference)?;
    Ok(titled(vec![
        ("id", Value::from(inventory.id)),
        ("name", text(&inventory, "name")),
        ("description", text(&inventory, "description")),
        ("kind", text(&inventory, "kind")),
        ("host_filter", text(&inventory, "host_filter")),
        ("variables", variables(&inventory)),
        ("organization_name", related(&inventory, "organization")),
        ("total_hosts", text(&inventory, "total_hosts")),
        ("hosts_with_active_failures", text(&inventory, "hosts_with_active_failures")),
        ("total_groups", text(&inventory, "total_groups")),
        ("total_inventory_sources", text(&inventory, "total_inventory_sources")),
        (
            "inventory_sources_with_failures",
            text(&inventory, "inventory_sources_with_failures"),
        ),
        ("created", when(&inventory, "created")),
        ("modified", when(&inventory, "modified")),
        ("created_by", actor(&inventory, "created_by")),
        ("modified_by", actor(&inventory, "modified_by")),
    ]))
}

fn create<A: ResourceApi + ?Sized>(api: &A, args: &InventoryCreateArgs) -> Result<Output> {
    let mut body = Body::new();
    body.set("name", args.name.as_str());
    body.set(
        "organization",
        resolve_id(api, ResourceKind::Organization, &args.organization)?,
    );
    body.opt("description", args.description.as_deref());
    body.opt("kind", args.kind.map(kind_str));
    body.opt("host_filter", args.host_filter.as_deref());
    body.opt("variables", args.variables.as_deref().map(variables_arg).transpose()?);

    let inventory = api.create(KIND, &body.into_value())?;
    Ok(Output::show()
        .field("ID", inventory.id)
        .field("Name", text(&inventory, "name"))
        .field("Description", text(&inventory, "description"))
        .field("Kind", kind_of(&inventory))
        .field("Organization", related(&inventory, "organization"))
        .field("Host Filter", text(&inventory, "host_filter"))
        .field("Total Hosts", inventory.i64_field("total_hosts").unwrap_or(0))
        .field("Created", when(&inventory, "created"))
        .build())
}

fn set<A: ResourceApi + ?Sized>(api: &A, args: &InventorySetArgs) -> Result<Output> {
    let mut body = Body::new();
    body.opt("name", args.name.as_deref());
    body.opt("description", args.description.as_deref());
    body.opt("host_filter", args.host_filter.as_deref());
    body.opt("variables", args.variables.as_deref().map(variables_arg).transpose()?);
    body.require_changes()?;

    let id = Resolver::new(api, KIND)
        .full_record(false)
        .resolve(&args.target.reference())?
        .id;
    api.update(KIND, id, &body.into_value())?;
    Ok(Output::line(format!("Inventory {id} updated")))
}
