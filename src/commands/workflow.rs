use super::{
    delete, field, into_record, launched_by, parse_json, related, resolve_id, resolve_opt, text,
    when, Body,
};
use crate::api::{Filters, ResourceApi};
use crate::cli::{
    WorkflowCommand, WorkflowCreateArgs, WorkflowLaunchArgs, WorkflowListArgs, WorkflowSetArgs,
};
use crate::client::ControllerClient;
use crate::format::{format_duration, format_name};
use crate::output::Output;
use crate::record::Record;
use crate::resolve::{Reference, Resolver};
use crate::resource::ResourceKind;
use anyhow::Result;
use serde_json::Value;

const KIND: ResourceKind = ResourceKind::WorkflowJobTemplate;

pub(super) fn run(cmd: WorkflowCommand, controller: &ControllerClient) -> Result<Output> {
    match cmd {
        WorkflowCommand::List(args) => list(&**controller, &args),
        WorkflowCommand::Show(target) => show(&**controller, &target.reference()),
        WorkflowCommand::Create(args) => create(&**controller, &args),
        WorkflowCommand::Set(args) => set(&**controller, &args),
        WorkflowCommand::Delete(targets) => delete(&**controller, KIND, &targets),
        WorkflowCommand::Launch(args) => launch(controller, &args),
    }
}

fn list<A: ResourceApi + ?Sized>(api: &A, args: &WorkflowListArgs) -> Result<Output> {
    let mut filters = Filters::new();
    filters.push_opt(
        "organization",
        resolve_opt(api, ResourceKind::Organization, args.organization.as_deref())?,
    );
    let page = api.list(KIND, &filters)?;

    let columns = if args.long {
        vec![
            "ID",
            "Name",
            "Description",
            "Organization",
            "Inventory",
            "Allow Simultaneous",
            "Status",
            "Created",
        ]
    } else {
        vec!["ID", "Name", "Description", "Organization", "Status"]
    };
    let rows = page
        .results
        .iter()
        .map(|workflow| {
            let mut row = vec![
                Value::from(workflow.id),
                field(workflow, "name"),
                text(workflow, "description"),
                related(workflow, "organization"),
            ];
            if args.long {
                row.push(related(workflow, "inventory"));
                row.push(field(workflow, "allow_simultaneous"));
            }
            row.push(field(workflow, "status"));
            if args.long {
                row.push(when(workflow, "created"));
            }
            row
        })
        .collect();
    Ok(Output::list(columns, rows))
}

fn show<A: ResourceApi + ?Sized>(api: &A, reference: &Reference) -> Result<Output> {
    let workflow = Resolver::new(api, KIND).resolve(reference)?;
    let mut show = Output::show();
    for name in [
        "id",
        "name",
        "description",
        "organization",
        "inventory",
        "extra_vars",
        "allow_simultaneous",
        "ask_variables_on_launch",
        "ask_inventory_on_launch",
        "ask_limit_on_launch",
        "ask_scm_branch_on_launch",
        "survey_enabled",
        "created",
        "modified",
        "last_job_run",
        "last_job_failed",
        "next_job_run",
        "status",
    ] {
        show.push(name, display(&workflow, name));
    }
    Ok(show.build())
}

fn display(workflow: &Record, name: &str) -> Value {
    match name {
        "organization" | "inventory" => related(workflow, name),
        "created" | "modified" | "last_job_run" | "next_job_run" => when(workflow, name),
        _ => field(workflow, name),
    }
}

fn create<A: ResourceApi + ?Sized>(api: &A, args: &WorkflowCreateArgs) -> Result<Output> {
    let mut body = Body::new();
    body.set("name", args.name.as_str());
    body.set(
        "organization",
        resolve_id(api, ResourceKind::Organization, &args.organization)?,
    );
    body.opt("description", args.description.as_deref());
    body.opt(
        "inventory",
        resolve_opt(api, ResourceKind::Inventory, args.inventory.as_deref())?,
    );
    body.opt(
        "extra_vars",
        args.extra_vars
            .as_deref()
            .map(|raw| parse_json("--extra-vars", raw))
            .transpose()?,
    );
    for (key, on) in [
        ("allow_simultaneous", args.allow_simultaneous),
        ("ask_variables_on_launch", args.ask_variables_on_launch),
        ("ask_inventory_on_launch", args.ask_inventory_on_launch),
        ("ask_limit_on_launch", args.ask_limit_on_launch),
        ("ask_scm_branch_on_launch", args.ask_scm_branch_on_launch),
    ] {
        if on {
            body.set(key, true);
        }
    }

    let workflow = api.create(KIND, &body.into_value())?;
    let mut show = Output::show();
    for name in [
        "id",
        "name",
        "description",
        "organization",
        "inventory",
        "allow_simultaneous",
        "ask_variables_on_launch",
        "ask_inventory_on_launch",
        "created",
        "modified",
        "last_job_run",
        "last_job_failed",
        "status",
    ] {
        show.push(name, display(&workflow, name));
    }
    Ok(show.build())
}

fn set<A: ResourceApi + ?Sized>(api: &A, args: &WorkflowSetArgs) -> Result<Output> {
    let mut body = Body::new();
    body.opt("name", args.name.as_deref());
    body.opt("description", args.description.as_deref());
    body.opt(
        "extra_vars",
        args.extra_vars
            .as_deref()
            .map(|raw| parse_json("--extra-vars", raw))
            .transpose()?,
    );
    body.toggle(
        "allow_simultaneous",
        args.allow_simultaneous,
        args.no_allow_simultaneous,
    );
    body.toggle(
        "ask_variables_on_launch",
        args.ask_variables_on_launch,
        args.no_ask_variables_on_launch,
    );
    body.toggle(
        "ask_inventory_on_launch",
        args.ask_inventory_on_launch,
        args.no_ask_inventory_on_launch,
    );
    if args.inventory.is_none() {
        body.require_changes()?;
    }

    body.opt(
        "inventory",
        resolve_opt(api, ResourceKind::Inventory, args.inventory.as_deref())?,
    );
    let workflow = Resolver::new(api, KIND)
        .full_record(false)
        .resolve(&args.target.reference())?;
    api.update(KIND, workflow.id, &body.into_value())?;
    let name = workflow.name.as_deref().unwrap_or_default();
    Ok(Output::line(format!(
        "Workflow job template '{}' updated successfully",
        format_name(name)
    )))
}

fn launch(controller: &ControllerClient, args: &WorkflowLaunchArgs) -> Result<Output> {
    let mut body = Body::new();
    body.opt(
        "extra_vars",
        args.extra_vars
            .as_deref()
            .map(|raw| parse_json("--extra-vars", raw))
            .transpose()?,
    );
    body.opt("inventory", args.inventory);
    body.opt("limit", args.limit.as_deref());
    body.opt("scm_branch", args.scm_branch.as_deref());

    let workflow = Resolver::new(&**controller, KIND)
        .full_record(false)
        .resolve(&args.target.reference())?;
    tracing::debug!(workflow = workflow.id, "launching workflow");
    let job = into_record(controller.launch_workflow(workflow.id, &body.into_value())?)?;
    Ok(workflow_job_summary(&job))
}

/// The short view of a workflow job shown after launch, cancel, and relaunch.
pub(super) fn workflow_job_summary(job: &Record) -> Output {
    Output::show()
        .field("id", job.id)
        .field("name", field(job, "name"))
        .field("status", field(job, "status"))
        .field("created", when(job, "created"))
        .field("started", when(job, "started"))
        .field("finished", when(job, "finished"))
        .field(
            "elapsed",
            format_duration(job.str_field("started"), job.str_field("finished")),
        )
        .field("launched_by", launched_by(job))
        .field("workflow_job_template", field(job, "workflow_job_template"))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::SetTarget;
    use crate::testing::{Call, FakeApi};
    use serde_json::json;

    fn api() -> FakeApi {
        FakeApi::new()
            .with(ResourceKind::Organization, json!({"id": 1, "name": "Default"}))
            .with(ResourceKind::Inventory, json!({"id": 42, "name": "prod-inventory"}))
            .with(
                KIND,
                json!({
                    "id": 8,
                    "name": "release",
                    "organization": 1,
                    "inventory": 42,
                    "allow_simultaneous": false,
                    "status": "successful",
                    "summary_fields": {
                        "organization": {"id": 1, "name": "Default"},
                        "inventory": {"id": 42, "name": "prod-inventory"}
                    }
                }),
            )
    }

    fn set_args() -> WorkflowSetArgs {
        WorkflowSetArgs {
            target: SetTarget {
                reference: Some("release".into()),
                id: None,
            },
            name: None,
            description: None,
            inventory: None,
            extra_vars: None,
            allow_simultaneous: false,
            no_allow_simultaneous: false,
            ask_variables_on_launch: false,
            no_ask_variables_on_launch: false,
            ask_inventory_on_launch: false,
            no_ask_inventory_on_launch: false,
        }
    }

    #[test]
    fn long_list_places_status_after_the_extra_columns() {
        let args = WorkflowListArgs {
            organization: Some("Default".into()),
            long: true,
        };
        let Output::List { columns, rows } = list(&api(), &args).expect("list") else {
            panic!("expected list output");
        };
        assert_eq!(columns[6], "Status");
        assert_eq!(
            rows[0][..7],
            [
                json!(8),
                json!("release"),
                json!(""),
                json!("Default"),
                json!("prod-inventory"),
                json!(false),
                json!("successful")
            ]
        );
    }

    #[test]
    fn create_resolves_names_and_sends_only_raised_flags() {
        let api = api();
        let args = WorkflowCreateArgs {
            name: "nightly".into(),
            organization: "Default".into(),
            description: None,
            inventory: Some("prod-inventory".into()),
            extra_vars: Some(r#"{"env": "prod"}"#.into()),
            allow_simultaneous: true,
            ask_variables_on_launch: false,
            ask_inventory_on_launch: false,
            ask_limit_on_launch: true,
            ask_scm_branch_on_launch: false,
        };
        create(&api, &args).expect("create");
        assert!(api.calls().contains(&Call::Create(
            KIND,
            json!({
                "name": "nightly",
                "organization": 1,
                "inventory": 42,
                "extra_vars": {"env": "prod"},
                "allow_simultaneous": true,
                "ask_limit_on_launch": true
            })
        )));
    }

    #[test]
    fn set_toggles_flags_off() {
        let api = api();
        let args = WorkflowSetArgs {
            no_allow_simultaneous: true,
            ask_inventory_on_launch: true,
            ..set_args()
        };
        let output = set(&api, &args).expect("set");
        assert_eq!(
            output,
            Output::line("Workflow job template 'release' updated successfully")
        );
        assert!(api.calls().contains(&Call::Update(
            KIND,
            8,
            json!({"allow_simultaneous": false, "ask_inventory_on_launch": true})
        )));
    }

    #[test]
    fn set_rejects_bad_extra_vars_before_lookup() {
        let api = api();
        let args = WorkflowSetArgs {
            extra_vars: Some("not json".into()),
            ..set_args()
        };
        let err = set(&api, &args).expect_err("bad json");
        assert!(err.to_string().starts_with("Invalid JSON in --extra-vars: "), "{err}");
        assert!(api.calls().is_empty());
    }

    #[test]
    fn set_without_flags_is_rejected() {
        let err = set(&api(), &set_args()).expect_err("no changes");
        assert_eq!(err.to_string(), "No properties specified to update");
    }

    #[test]
    fn summary_reads_the_launcher() {
        let job = Record::from_value(json!({
            "id": 300,
            "name": "release",
            "status": "pending",
            "workflow_job_template": 8,
            "launched_by": {"id": 1, "name": "admin"}
        }))
        .expect("record");
        let Output::Show { fields } = workflow_job_summary(&job) else {
            panic!("expected show output");
        };
        assert_eq!(fields[0], ("id".to_string(), json!(300)));
        assert!(fields.contains(&("launched_by".to_string(), json!("admin"))));
        assert!(fields.contains(&("workflow_job_template".to_string(), json!(8))));
    }
}
