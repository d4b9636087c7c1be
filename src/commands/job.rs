use super::{
    field, into_record, launched_by, parse_json, related, text, titled, when, Body,
};
use crate::api::{Filters, ResourceApi};
use crate::cli::{JobCommand, JobListArgs, JobRelaunchArgs};
use crate::client::ControllerClient;
use crate::format::{format_datetime, format_duration};
use crate::output::Output;
use crate::record::{ListPage, Record};
use crate::resolve::{Reference, Resolver};
use crate::resource::ResourceKind;
use anyhow::{Context, Result};
use serde_json::Value;

const KIND: ResourceKind = ResourceKind::Job;

/// Statuses a cancel request is accepted for.
const CANCELABLE: &[&str] = &["pending", "waiting", "running"];

pub(super) fn run(cmd: JobCommand, controller: &ControllerClient) -> Result<Output> {
    match cmd {
        JobCommand::List(args) => list(&**controller, &args),
        JobCommand::Show(args) => show(&**controller, args.id),
        JobCommand::Cancel(args) => cancel(controller, args.id),
        JobCommand::Relaunch(args) => relaunch(controller, &args),
        JobCommand::Output(args) => output(controller, args.id),
    }
}

fn list<A: ResourceApi + ?Sized>(api: &A, args: &JobListArgs) -> Result<Output> {
    let mut filters = Filters::new();
    filters.push_opt("page_size", args.limit);
    filters.push_opt("status", args.status.as_deref());
    filters.push_opt("job_type", args.job_type.as_deref());
    let page = api.list(KIND, &filters)?;

    let mut columns = vec!["ID", "Name", "Status", "Started", "Finished"];
    if args.long {
        columns.extend(["Elapsed", "Job Template", "Inventory"]);
    }
    let rows = page
        .results
        .iter()
        .map(|job| {
            let mut row = vec![
                Value::from(job.id),
                field(job, "name"),
                field(job, "status"),
                when(job, "started"),
                when(job, "finished"),
            ];
            if args.long {
                row.push(elapsed(job));
                row.push(related(job, "job_template"));
                row.push(related(job, "inventory"));
            }
            row
        })
        .collect();
    Ok(Output::list(columns, rows))
}

fn elapsed(job: &Record) -> Value {
    Value::from(format_duration(job.str_field("started"), job.str_field("finished")))
}

fn fetch<A: ResourceApi + ?Sized>(api: &A, id: i64) -> Result<Record> {
    Ok(Resolver::new(api, KIND).resolve(&Reference::id(id))?)
}

fn show<A: ResourceApi + ?Sized>(api: &A, id: i64) -> Result<Output> {
    let job = fetch(api, id)?;
    Ok(titled(vec![
        ("id", Value::from(job.id)),
        ("name", text(&job, "name")),
        ("description", text(&job, "description")),
        ("status", text(&job, "status")),
        ("failed", text(&job, "failed")),
        ("started", when(&job, "started")),
        ("finished", when(&job, "finished")),
        ("elapsed", elapsed(&job)),
        ("job_template_name", related(&job, "job_template")),
        ("job_type", text(&job, "job_type")),
        ("inventory_name", related(&job, "inventory")),
        ("project_name", related(&job, "project")),
        ("playbook", text(&job, "playbook")),
        ("forks", text(&job, "forks")),
        ("limit", text(&job, "limit")),
        ("verbosity", text(&job, "verbosity")),
        ("extra_vars", text(&job, "extra_vars")),
        ("job_tags", text(&job, "job_tags")),
        ("skip_tags", text(&job, "skip_tags")),
        ("execution_node", text(&job, "execution_node")),
        ("controller_node", text(&job, "controller_node")),
        (
            "execution_environment_name",
            related(&job, "execution_environment"),
        ),
        ("instance_group_name", related(&job, "instance_group")),
        ("launched_by", launched_by(&job)),
        ("created", when(&job, "created")),
        ("modified", when(&job, "modified")),
        ("created_by", text(&job, "created_by")),
        ("modified_by", text(&job, "modified_by")),
    ]))
}

fn cancel(controller: &ControllerClient, id: i64) -> Result<Output> {
    let job = fetch(&**controller, id)?;
    let status = job.str_field("status").unwrap_or_default();
    if !CANCELABLE.contains(&status) {
        return Ok(Output::line(format!(
            "Job {id} cannot be canceled (status: {status})"
        )));
    }
    controller.cancel_job(id)?;
    Ok(Output::line(format!("Job {id} cancellation requested")))
}

fn relaunch(controller: &ControllerClient, args: &JobRelaunchArgs) -> Result<Output> {
    let mut body = Body::new();
    body.opt(
        "extra_vars",
        args.extra_vars
            .as_deref()
            .map(|raw| parse_json("--extra-vars", raw))
            .transpose()?,
    );
    body.opt("limit", args.limit.as_deref());
    body.opt("job_tags", args.job_tags.as_deref());
    body.opt("skip_tags", args.skip_tags.as_deref());

    let job = into_record(controller.relaunch_job(args.id, &body.into_value())?)?;
    Ok(Output::show()
        .field("New Job ID", job.id)
        .field("Name", text(&job, "name"))
        .field("Status", text(&job, "status"))
        .field("Job Template", text(&job, "job_template"))
        .field("Created", when(&job, "created"))
        .build())
}

fn output(controller: &ControllerClient, id: i64) -> Result<Output> {
    match controller.job_events(id) {
        Ok(events) => Ok(event_lines(ListPage::from_value(events)?)),
        Err(err) => {
            tracing::debug!(error = %err, "job events unavailable, reading stdout");
            let stdout = controller
                .job_stdout(id)
                .with_context(|| format!("Failed to retrieve job output: {err}"))?;
            if stdout.is_empty() {
                Ok(Output::line("No output available for this job"))
            } else {
                Ok(Output::Lines(stdout.lines().map(str::to_string).collect()))
            }
        }
    }
}

fn event_lines(events: ListPage) -> Output {
    if events.results.is_empty() {
        return Output::line("No output available for this job");
    }
    let lines = events
        .results
        .iter()
        .filter_map(|event| {
            let stdout = event.str_field("stdout").filter(|out| !out.is_empty())?;
            Some(format!(
                "[{}] {stdout}",
                format_datetime(event.str_field("created"))
            ))
        })
        .collect();
    Output::Lines(lines)
}
