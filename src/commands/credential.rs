use super::{actor, delete, field, related, resolve_id, resolve_opt, text, titled, when, Body};
use crate::api::{Filters, ResourceApi};
use crate::cli::{
    CredentialCommand, CredentialCreateArgs, CredentialInputs, CredentialListArgs,
    CredentialSetArgs,
};
use crate::output::Output;
use crate::resolve::{Reference, Resolver};
use crate::resource::ResourceKind;
use anyhow::Result;
use serde_json::Value;

const KIND: ResourceKind = ResourceKind::Credential;

pub(super) fn run<A: ResourceApi + ?Sized>(cmd: CredentialCommand, api: &A) -> Result<Output> {
    match cmd {
        CredentialCommand::List(args) => list(api, &args),
        CredentialCommand::Show(target) => show(api, &target.reference()),
        CredentialCommand::Create(args) => create(api, &args),
        CredentialCommand::Set(args) => set(api, &args),
        CredentialCommand::Delete(targets) => delete(api, KIND, &targets),
    }
}

impl CredentialInputs {
    /// The `inputs` object, or `None` when no input flag was given.
    fn to_body(&self) -> Option<Value> {
        let mut inputs = Body::new();
        inputs.opt("username", self.username.as_deref());
        inputs.opt("password", self.password.as_deref());
        inputs.opt("ssh_key_data", self.ssh_key_data.as_deref());
        inputs.opt("ssh_key_unlock", self.ssh_key_unlock.as_deref());
        inputs.opt("become_method", self.become_method.as_deref());
        inputs.opt("become_username", self.become_username.as_deref());
        inputs.opt("become_password", self.become_password.as_deref());
        if inputs.is_empty() {
            None
        } else {
            Some(inputs.into_value())
        }
    }
}

fn list<A: ResourceApi + ?Sized>(api: &A, args: &CredentialListArgs) -> Result<Output> {
    let mut filters = Filters::new();
    filters.push_opt(
        "organization",
        resolve_opt(api, ResourceKind::Organization, args.organization.as_deref())?,
    );
    filters.push_opt("credential_type", args.credential_type);
    let page = api.list(KIND, &filters)?;

    let mut columns = vec!["ID", "Name", "Credential Type", "Organization"];
    if args.long {
        columns.extend(["Description", "Created", "Modified"]);
    }
    let rows = page
        .results
        .iter()
        .map(|credential| {
            let mut row = vec![
                Value::from(credential.id),
                field(credential, "name"),
                related(credential, "credential_type"),
                related(credential, "organization"),
            ];
            if args.long {
                row.push(text(credential, "description"));
                row.push(when(credential, "created"));
                row.push(when(credential, "modified"));
            }
            row
        })
        .collect();
    Ok(Output::list(columns, rows))
}

fn show<A: ResourceApi + ?Sized>(api: &A, reference: &Reference) -> Result<Output> {
    let credential = Resolver::new(api, KIND).resolve(reference)?;
    Ok(titled(vec![
        ("id", Value::from(credential.id)),
        ("name", text(&credential, "name")),
        ("description", text(&credential, "description")),
        ("credential_type_name", related(&credential, "credential_type")),
        ("organization_name", related(&credential, "organization")),
        ("created", when(&credential, "created")),
        ("modified", when(&credential, "modified")),
        ("created_by", actor(&credential, "created_by")),
        ("modified_by", actor(&credential, "modified_by")),
    ]))
}

fn create<A: ResourceApi + ?Sized>(api: &A, args: &CredentialCreateArgs) -> Result<Output> {
    let mut body = Body::new();
    body.set("name", args.name.as_str());
    body.set(
        "organization",
        resolve_id(api, ResourceKind::Organization, &args.organization)?,
    );
    body.set("credential_type", args.credential_type);
    body.opt("description", args.description.as_deref());
    body.opt("inputs", args.inputs.to_body());

    let credential = api.create(KIND, &body.into_value())?;
    Ok(Output::show()
        .field("ID", credential.id)
        .field("Name", text(&credential, "name"))
        .field("Description", text(&credential, "description"))
        .field("Credential Type", related(&credential, "credential_type"))
        .field("Organization", related(&credential, "organization"))
        .field("Created", when(&credential, "created"))
        .build())
}

fn set<A: ResourceApi + ?Sized>(api: &A, args: &CredentialSetArgs) -> Result<Output> {
    let mut body = Body::new();
    body.opt("name", args.name.as_deref());
    body.opt("description", args.description.as_deref());
    body.opt("inputs", args.inputs.to_body());
    body.require_changes()?;

    let id = Resolver::new(api, KIND)
        .full_record(false)
        .resolve(&args.target.reference())?
        .id;
    api.update(KIND, id, &body.into_value())?;
    Ok(Output::line(format!("Credential {id} updated")))
}
