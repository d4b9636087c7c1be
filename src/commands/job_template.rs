use super::{field, into_record, related, resolve_opt, text, when, Body};
use crate::api::{Filters, ResourceApi};
use crate::cli::{JobTemplateCommand, JobTemplateLaunchArgs, JobTemplateListArgs};
use crate::client::ControllerClient;
use crate::format::format_duration;
use crate::output::Output;
use crate::resolve::{Reference, Resolver};
use crate::resource::ResourceKind;
use anyhow::{anyhow, bail, Result};
use serde_json::{Map, Value};
use std::path::Path;

const KIND: ResourceKind = ResourceKind::JobTemplate;

const SHOW_FIELDS: &[&str] = &[
    "id",
    "name",
    "description",
    "job_type",
    "inventory_name",
    "project_name",
    "playbook",
    "scm_branch",
    "forks",
    "limit",
    "verbosity",
    "extra_vars",
    "job_tags",
    "force_handlers",
    "skip_tags",
    "start_at_task",
    "timeout",
    "use_fact_cache",
    "survey_enabled",
    "ask_scm_branch_on_launch",
    "ask_diff_mode_on_launch",
    "ask_variables_on_launch",
    "ask_limit_on_launch",
    "ask_tags_on_launch",
    "ask_skip_tags_on_launch",
    "ask_job_type_on_launch",
    "ask_verbosity_on_launch",
    "ask_inventory_on_launch",
    "ask_credential_on_launch",
    "created",
    "modified",
    "last_job_run",
    "last_job_failed",
    "next_job_run",
    "status",
];

pub(super) fn run(cmd: JobTemplateCommand, controller: &ControllerClient) -> Result<Output> {
    match cmd {
        JobTemplateCommand::List(args) => list(&**controller, &args),
        JobTemplateCommand::Show(target) => show(&**controller, &target.reference()),
        JobTemplateCommand::Launch(args) => launch(controller, &args),
    }
}

fn list<A: ResourceApi + ?Sized>(api: &A, args: &JobTemplateListArgs) -> Result<Output> {
    let mut filters = Filters::new();
    filters.push_opt(
        "organization",
        resolve_opt(api, ResourceKind::Organization, args.organization.as_deref())?,
    );
    filters.push_opt(
        "project",
        resolve_opt(api, ResourceKind::Project, args.project.as_deref())?,
    );
    let page = api.list(KIND, &filters)?;

    let columns = if args.long {
        vec!["ID", "Name", "Description", "Project", "Playbook", "Inventory", "Status", "Created"]
    } else {
        vec!["ID", "Name", "Project", "Playbook", "Status"]
    };
    let rows = page
        .results
        .iter()
        .map(|template| {
            if args.long {
                vec![
                    Value::from(template.id),
                    field(template, "name"),
                    text(template, "description"),
                    related(template, "project"),
                    field(template, "playbook"),
                    related(template, "inventory"),
                    field(template, "status"),
                    when(template, "created"),
                ]
            } else {
                vec![
                    Value::from(template.id),
                    field(template, "name"),
                    related(template, "project"),
                    field(template, "playbook"),
                    field(template, "status"),
                ]
            }
        })
        .collect();
    Ok(Output::list(columns, rows))
}

fn show<A: ResourceApi + ?Sized>(api: &A, reference: &Reference) -> Result<Output> {
    let template = Resolver::new(api, KIND).resolve(reference)?;
    let mut show = Output::show();
    for &name in SHOW_FIELDS {
        let value = match name {
            "inventory_name" => related(&template, "inventory"),
            "project_name" => related(&template, "project"),
            "created" | "modified" | "last_job_run" | "next_job_run" => when(&template, name),
            _ => field(&template, name),
        };
        show.push(name, value);
    }
    Ok(show.build())
}

/// `--extra-vars key=value` pairs, then the `--extra-vars-file` object on top.
fn extra_vars(pairs: &[String], file: Option<&Path>) -> Result<Map<String, Value>> {
    let mut vars = Map::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("Invalid extra var format: {pair}. Use key=value");
        };
        vars.insert(key.to_string(), Value::from(value));
    }
    if let Some(path) = file {
        let from_file = std::fs::read_to_string(path)
            .map_err(|err| err.to_string())
            .and_then(|raw| {
                serde_json::from_str::<Map<String, Value>>(&raw).map_err(|err| err.to_string())
            })
            .map_err(|err| anyhow!("Error reading extra vars file: {err}"))?;
        vars.extend(from_file);
    }
    Ok(vars)
}

fn launch_body(args: &JobTemplateLaunchArgs) -> Result<Body> {
    let vars = extra_vars(&args.extra_vars, args.extra_vars_file.as_deref())?;
    let mut body = Body::new();
    if !vars.is_empty() {
        body.set("extra_vars", vars);
    }
    body.opt("inventory", args.inventory);
    body.opt("limit", args.limit.as_deref());
    body.opt("job_tags", args.job_tags.as_deref());
    body.opt("skip_tags", args.skip_tags.as_deref());
    body.opt("scm_branch", args.scm_branch.as_deref());
    body.opt("verbosity", args.verbosity);
    Ok(body)
}

fn launch(controller: &ControllerClient, args: &JobTemplateLaunchArgs) -> Result<Output> {
    let body = launch_body(args)?;
    let template = Resolver::new(&**controller, KIND)
        .full_record(false)
        .resolve(&args.target.reference())?;
    tracing::debug!(template = template.id, "launching job template");
    let job = into_record(controller.launch_job_template(template.id, &body.into_value())?)?;
    Ok(Output::show()
        .field("id", job.id)
        .field("name", field(&job, "name"))
        .field("description", field(&job, "description"))
        .field("status", field(&job, "status"))
        .field("started", when(&job, "started"))
        .field("finished", when(&job, "finished"))
        .field(
            "elapsed",
            format_duration(job.str_field("started"), job.str_field("finished")),
        )
        .field("job_template", field(&job, "job_template"))
        .field("inventory", field(&job, "inventory"))
        .field("project", field(&job, "project"))
        .field("playbook", field(&job, "playbook"))
        .field("created", when(&job, "created"))
        .field("modified", when(&job, "modified"))
        .build())
}
