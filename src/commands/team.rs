use super::{delete, field, related, related_or, resolve_id, resolve_opt, when, Body};
use crate::api::{Filters, ResourceApi};
use crate::cli::{TeamCommand, TeamCreateArgs, TeamListArgs, TeamSetArgs};
use crate::output::Output;
use crate::resolve::{Reference, Resolver};
use crate::resource::ResourceKind;
use anyhow::Result;
use serde_json::Value;

const KIND: ResourceKind = ResourceKind::Team;

pub(super) fn run<A: ResourceApi + ?Sized>(cmd: TeamCommand, api: &A) -> Result<Output> {
    match cmd {
        TeamCommand::List(args) => list(api, &args),
        TeamCommand::Show(target) => show(api, &target.reference()),
        TeamCommand::Create(args) => create(api, &args),
        TeamCommand::Set(args) => set(api, &args),
        TeamCommand::Delete(targets) => delete(api, KIND, &targets),
    }
}

fn list<A: ResourceApi + ?Sized>(api: &A, args: &TeamListArgs) -> Result<Output> {
    let mut filters = Filters::new();
    filters.push_opt(
        "organization",
        resolve_opt(api, ResourceKind::Organization, args.organization.as_deref())?,
    );
    let page = api.list(KIND, &filters)?;

    let mut columns = vec!["ID", "Name", "Description", "Organization"];
    if args.long {
        columns.extend(["Created", "Modified"]);
    }
    let rows = page
        .results
        .iter()
        .map(|team| {
            let mut row = vec![
                Value::from(team.id),
                field(team, "name"),
                field(team, "description"),
                related(team, "organization"),
            ];
            if args.long {
                row.push(when(team, "created"));
                row.push(when(team, "modified"));
            }
            row
        })
        .collect();
    Ok(Output::list(columns, rows))
}

fn show<A: ResourceApi + ?Sized>(api: &A, reference: &Reference) -> Result<Output> {
    let team = Resolver::new(api, KIND).resolve(reference)?;
    Ok(Output::show()
        .field("id", team.id)
        .field("name", field(&team, "name"))
        .field("description", field(&team, "description"))
        .field("organization_name", related_or(&team, "organization", "N/A"))
        .field("created", when(&team, "created"))
        .field("modified", when(&team, "modified"))
        .build())
}

fn create<A: ResourceApi + ?Sized>(api: &A, args: &TeamCreateArgs) -> Result<Output> {
    let mut body = Body::new();
    body.set("name", args.name.as_str());
    body.set(
        "organization",
        resolve_id(api, ResourceKind::Organization, &args.organization)?,
    );
    body.opt("description", args.description.as_deref());

    let team = api.create(KIND, &body.into_value())?;
    Ok(Output::show()
        .field("id", team.id)
        .field("name", field(&team, "name"))
        .field("description", field(&team, "description"))
        .field("organization", related(&team, "organization"))
        .field("created", when(&team, "created"))
        .build())
}

fn set<A: ResourceApi + ?Sized>(api: &A, args: &TeamSetArgs) -> Result<Output> {
    let mut body = Body::new();
    body.opt("name", args.name.as_deref());
    body.opt("description", args.description.as_deref());
    body.opt(
        "organization",
        resolve_opt(api, ResourceKind::Organization, args.organization.as_deref())?,
    );
    body.require_changes()?;

    let id = Resolver::new(api, KIND).resolve(&args.target.reference())?.id;
    let team = api.update(KIND, id, &body.into_value())?;
    Ok(Output::show()
        .field("id", team.id)
        .field("name", field(&team, "name"))
        .field("description", field(&team, "description"))
        .field("organization", related(&team, "organization"))
        .field("modified", when(&team, "modified"))
        .build())
}
