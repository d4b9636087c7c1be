use super::workflow::workflow_job_summary;
use super::{field, into_record, launched_by, when};
use crate::api::{Filters, ResourceApi};
use crate::cli::{WorkflowJobCommand, WorkflowJobListArgs};
use crate::client::ControllerClient;
use crate::format::format_duration;
use crate::output::Output;
use crate::record::Record;
use crate::resolve::{Reference, Resolver};
use crate::resource::ResourceKind;
use anyhow::{Context, Result};
use serde_json::Value;

const KIND: ResourceKind = ResourceKind::WorkflowJob;

pub(super) fn run(cmd: WorkflowJobCommand, controller: &ControllerClient) -> Result<Output> {
    match cmd {
        WorkflowJobCommand::List(args) => list(&**controller, &args),
        WorkflowJobCommand::Show(args) => show(&**controller, args.id),
        WorkflowJobCommand::Cancel(args) => cancel(controller, args.id),
        WorkflowJobCommand::Relaunch(args) => relaunch(controller, args.id),
    }
}

fn elapsed(job: &Record) -> Value {
    Value::from(format_duration(job.str_field("started"), job.str_field("finished")))
}

fn list<A: ResourceApi + ?Sized>(api: &A, args: &WorkflowJobListArgs) -> Result<Output> {
    let mut filters = Filters::new();
    filters.push_opt("status", args.status.as_deref());
    filters.push_opt("workflow_job_template", args.workflow_job_template);
    let page = api.list(KIND, &filters)?;

    let columns = if args.long {
        vec![
            "ID",
            "Name",
            "Status",
            "Created",
            "Started",
            "Finished",
            "Elapsed",
            "Launched By",
            "Template",
        ]
    } else {
        vec!["ID", "Name", "Status", "Created", "Launched By"]
    };
    let rows = page
        .results
        .iter()
        .map(|job| {
            let mut row = vec![
                Value::from(job.id),
                field(job, "name"),
                field(job, "status"),
                when(job, "created"),
            ];
            if args.long {
                row.push(when(job, "started"));
                row.push(when(job, "finished"));
                row.push(elapsed(job));
            }
            row.push(launched_by(job));
            if args.long {
                row.push(field(job, "workflow_job_template"));
            }
            row
        })
        .collect();
    Ok(Output::list(columns, rows))
}

fn show<A: ResourceApi + ?Sized>(api: &A, id: i64) -> Result<Output> {
    let job = Resolver::new(api, KIND).resolve(&Reference::id(id))?;
    let mut show = Output::show();
    for name in [
        "id",
        "name",
        "description",
        "status",
        "failed",
        "started",
        "finished",
        "canceled_on",
        "elapsed",
        "job_explanation",
        "launched_by",
        "workflow_job_template",
        "extra_vars",
        "allow_simultaneous",
        "job_template",
        "inventory",
        "limit",
        "scm_branch",
        "created",
        "modified",
    ] {
        let value = match name {
            "started" | "finished" | "canceled_on" | "created" | "modified" => when(&job, name),
            "elapsed" => elapsed(&job),
            "launched_by" => launched_by(&job),
            _ => field(&job, name),
        };
        show.push(name, value);
    }
    Ok(show.build())
}

fn cancel(controller: &ControllerClient, id: i64) -> Result<Output> {
    controller
        .cancel_workflow_job(id)
        .with_context(|| format!("Failed to cancel workflow job {id}"))?;
    let job = Resolver::new(&**controller, KIND).resolve(&Reference::id(id))?;
    Ok(workflow_job_summary(&job))
}

fn relaunch(controller: &ControllerClient, id: i64) -> Result<Output> {
    let job = controller
        .relaunch_workflow_job(id)
        .with_context(|| format!("Failed to relaunch workflow job {id}"))?;
    Ok(workflow_job_summary(&into_record(job)?))
}
