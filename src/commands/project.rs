use super::{delete, field, related, resolve_id, resolve_opt, when, Body};
use crate::api::{Filters, ResourceApi};
use crate::cli::{ProjectCommand, ProjectCreateArgs, ProjectListArgs, ProjectSetArgs};
use crate::format::format_name;
use crate::output::Output;
use crate::resolve::{Reference, Resolver};
use crate::resource::ResourceKind;
use anyhow::Result;
use serde_json::Value;

const KIND: ResourceKind = ResourceKind::Project;

pub(super) fn run<A: ResourceApi + ?Sized>(cmd: ProjectCommand, api: &A) -> Result<Output> {
    match cmd {
        ProjectCommand::List(args) => list(api, &args),
        ProjectCommand::Show(target) => show(api, &target.reference()),
        ProjectCommand::Create(args) => create(api, &args),
        ProjectCommand::Set(args) => set(api, &args),
        ProjectCommand::Delete(targets) => delete(api, KIND, &targets),
    }
}

fn list<A: ResourceApi + ?Sized>(api: &A, args: &ProjectListArgs) -> Result<Output> {
    let mut filters = Filters::new();
    filters.push_opt(
        "organization",
        resolve_opt(api, ResourceKind::Organization, args.organization.as_deref())?,
    );
    filters.push_opt("scm_type", args.scm_type.map(|scm| scm.as_str()));
    let page = api.list(KIND, &filters)?;

    let columns = if args.long {
        vec!["ID", "Name", "Description", "Organization", "SCM Type", "SCM URL", "Status", "Created"]
    } else {
        vec!["ID", "Name", "Description", "Organization", "SCM Type", "Status"]
    };
    let rows = page
        .results
        .iter()
        .map(|project| {
            let mut row = vec![
                Value::from(project.id),
                field(project, "name"),
                field(project, "description"),
                related(project, "organization"),
                field(project, "scm_type"),
            ];
            if args.long {
                row.push(field(project, "scm_url"));
            }
            row.push(field(project, "status"));
            if args.long {
                row.push(when(project, "created"));
            }
            row
        })
        .collect();
    Ok(Output::list(columns, rows))
}

fn show<A: ResourceApi + ?Sized>(api: &A, reference: &Reference) -> Result<Output> {
    let project = Resolver::new(api, KIND).resolve(reference)?;
    Ok(Output::show()
        .field("id", project.id)
        .field("name", field(&project, "name"))
        .field("description", field(&project, "description"))
        .field("organization_name", related(&project, "organization"))
        .field("scm_type", field(&project, "scm_type"))
        .field("scm_url", field(&project, "scm_url"))
        .field("scm_branch", field(&project, "scm_branch"))
        .field("scm_credential", related(&project, "credential"))
        .field("local_path", field(&project, "local_path"))
        .field("status", field(&project, "status"))
        .field("last_job_run", when(&project, "last_job_run"))
        .field("last_job_failed", field(&project, "last_job_failed"))
        .field("next_job_run", when(&project, "next_job_run"))
        .field("created", when(&project, "created"))
        .field("modified", when(&project, "modified"))
        .build())
}

fn create<A: ResourceApi + ?Sized>(api: &A, args: &ProjectCreateArgs) -> Result<Output> {
    let mut body = Body::new();
    body.set("name", args.name.as_str());
    body.set(
        "organization",
        resolve_id(api, ResourceKind::Organization, &args.organization)?,
    );
    body.opt("description", args.description.as_deref());
    body.opt("scm_type", args.scm_type.map(|scm| scm.as_str()));
    body.opt("scm_url", args.scm_url.as_deref());
    body.opt("scm_branch", args.scm_branch.as_deref());
    body.opt("credential", args.scm_credential);
    body.opt("local_path", args.local_path.as_deref());

    let project = api.create(KIND, &body.into_value())?;
    Ok(Output::show()
        .field("id", project.id)
        .field("name", field(&project, "name"))
        .field("description", field(&project, "description"))
        .field("organization", related(&project, "organization"))
        .field("scm_type", field(&project, "scm_type"))
        .field("scm_url", field(&project, "scm_url"))
        .field("scm_branch", field(&project, "scm_branch"))
        .field("status", field(&project, "status"))
        .field("created", when(&project, "created"))
        .field("modified", when(&project, "modified"))
        .build())
}

fn set<A: ResourceApi + ?Sized>(api: &A, args: &ProjectSetArgs) -> Result<Output> {
    let mut body = Body::new();
    body.opt("name", args.name.as_deref());
    body.opt("description", args.description.as_deref());
    body.opt("scm_url", args.scm_url.as_deref());
    body.opt("scm_branch", args.scm_branch.as_deref());
    body.opt("credential", args.scm_credential);
    body.require_changes()?;

    let id = Resolver::new(api, KIND).resolve(&args.target.reference())?.id;
    let project = api.update(KIND, id, &body.into_value())?;
    Ok(Output::line(format!(
        "Project '{}' updated successfully",
        format_name(project.name.as_deref().unwrap_or_default())
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{ScmType, SetTarget};
    use crate::testing::{Call, FakeApi};
    use serde_json::json;

    fn api() -> FakeApi {
        FakeApi::new()
            .with(ResourceKind::Organization, json!({"id": 2, "name": "Default"}))
            .with(
                KIND,
                json!({"id": 6, "name": "playbooks", "scm_type": "git", "status": "successful", "organization": 2}),
            )
    }

    #[test]
    fn create_maps_scm_credential_to_credential() {
        let api = api();
        let args = ProjectCreateArgs {
            name: "infra".into(),
            organization: "Default".into(),
            description: None,
            scm_type: Some(ScmType::Git),
            scm_url: Some("https://git.example.com/infra.git".into()),
            scm_branch: None,
            scm_credential: Some(11),
            local_path: None,
        };
        create(&api, &args).expect("create");
        assert!(api.calls().contains(&Call::Create(
            KIND,
            json!({
                "name": "infra",
                "organization": 2,
                "scm_type": "git",
                "scm_url": "https://git.example.com/infra.git",
                "credential": 11
            })
        )));
    }

    #[test]
    fn long_list_inserts_url_and_created() {
        let args = ProjectListArgs {
            organization: None,
            scm_type: Some(ScmType::Git),
            long: true,
        };
        let output = list(&api(), &args).expect("list");
        let Output::List { columns, rows } = output else {
            panic!("expected list output");
        };
        assert_eq!(columns.len(), rows[0].len());
        assert_eq!(rows[0][6], json!("successful"));
    }

    #[test]
    fn set_reports_the_updated_name() {
        let args = ProjectSetArgs {
            target: SetTarget {
                reference: Some("playbooks".into()),
                id: None,
            },
            name: Some("ansible".into()),
            description: None,
            scm_url: None,
            scm_branch: None,
            scm_credential: None,
        };
        let output = set(&api(), &args).expect("set");
        assert_eq!(output, Output::line("Project 'ansible' updated successfully"));
    }
}
