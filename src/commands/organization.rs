use super::{delete, when};
use crate::api::ResourceApi;
use crate::cli::{LongArgs, OrganizationCommand, OrganizationCreateArgs, OrganizationSetArgs};
use crate::client::Clients;
use crate::format::format_datetime;
use crate::merge::{
    create_organization, list_organizations, show_organization, update_organization,
    MergedOrganization, OrganizationChanges, OrganizationWriteError,
};
use crate::output::Output;
use crate::resolve::{Reference, Resolver};
use crate::resource::ResourceKind;
use anyhow::Result;
use serde_json::Value;

const KIND: ResourceKind = ResourceKind::Organization;

pub(super) fn run(cmd: OrganizationCommand, clients: &Clients) -> Result<Output> {
    let gateway = clients.gateway();
    match cmd {
        OrganizationCommand::List(args) => list(&*gateway, &args),
        OrganizationCommand::Show(target) => {
            show(&*gateway, &*clients.controller(), &target.reference())
        }
        OrganizationCommand::Create(args) => create(&*gateway, &*clients.controller(), &args),
        OrganizationCommand::Set(args) => set(&*gateway, &*clients.controller(), &args),
        OrganizationCommand::Delete(targets) => delete(&*gateway, KIND, &targets),
    }
}

fn list<I: ResourceApi + ?Sized>(identity: &I, args: &LongArgs) -> Result<Output> {
    let mut columns = vec!["ID", "Name", "Description"];
    if args.long {
        columns.extend(["Managed", "Created", "Modified"]);
    }
    let rows = list_organizations(identity)?
        .iter()
        .map(|org| {
            let mut row = vec![
                Value::from(org.id),
                Value::from(org.name.clone().unwrap_or_default()),
                Value::from(org.description.clone().unwrap_or_default()),
            ];
            if args.long {
                row.push(Value::from(org.bool_field("managed").unwrap_or(false)));
                row.push(when(org, "created"));
                row.push(when(org, "modified"));
            }
            row
        })
        .collect();
    Ok(Output::list(columns, rows))
}

fn show<I, O>(identity: &I, operational: &O, reference: &Reference) -> Result<Output>
where
    I: ResourceApi + ?Sized,
    O: ResourceApi + ?Sized,
{
    let org = show_organization(identity, operational, reference)?;
    Ok(show_merged(&org))
}

fn show_merged(org: &MergedOrganization) -> Output {
    Output::show()
        .field("id", org.id)
        .field("name", org.name.as_str())
        .field("description", org.description.as_str())
        .field("max_hosts", org.max_hosts)
        .field("managed", org.managed)
        .field("users", org.counts.users)
        .field("teams", org.counts.teams)
        .field("projects", org.counts.projects)
        .field("job_templates", org.counts.job_templates)
        .field("inventories", org.counts.inventories)
        .field("created", format_datetime(org.created.as_deref()))
        .field("modified", format_datetime(org.modified.as_deref()))
        .build()
}

fn create<I, O>(identity: &I, operational: &O, args: &OrganizationCreateArgs) -> Result<Output>
where
    I: ResourceApi + ?Sized,
    O: ResourceApi + ?Sized,
{
    let changes = OrganizationChanges {
        name: Some(args.name.clone()),
        description: args.description.clone(),
        max_hosts: args.max_hosts,
    };
    let outcome = create_organization(identity, operational, &changes)?;
    let org = &outcome.record;
    Ok(Output::show()
        .field("id", org.id)
        .field("name", org.name.clone().unwrap_or_default())
        .field("description", org.description.clone().unwrap_or_default())
        .field("max_hosts", outcome.max_hosts)
        .field("created", when(org, "created"))
        .build())
}

fn set<I, O>(identity: &I, operational: &O, args: &OrganizationSetArgs) -> Result<Output>
where
    I: ResourceApi + ?Sized,
    O: ResourceApi + ?Sized,
{
    let changes = OrganizationChanges {
        name: args.name.clone(),
        description: args.description.clone(),
        max_hosts: args.max_hosts,
    };
    if changes.is_empty() {
        return Err(OrganizationWriteError::NoChanges.into());
    }
    let id = Resolver::new(identity, KIND)
        .resolve(&args.target.reference())?
        .id;
    let outcome = update_organization(identity, operational, id, &changes)?;
    let org = &outcome.record;
    Ok(Output::show()
        .field("id", org.id)
        .field("name", org.name.clone().unwrap_or_default())
        .field("description", org.description.clone().unwrap_or_default())
        .field("max_hosts", outcome.max_hosts)
        .field("modified", when(org, "modified"))
        .build())
}
