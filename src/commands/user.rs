use super::{delete, field, resolve_opt, when, Body};
use crate::api::{Filters, ResourceApi};
use crate::cli::{UserCommand, UserCreateArgs, UserListArgs, UserSetArgs};
use crate::output::{Output, ShowBuilder};
use crate::record::Record;
use crate::resolve::{Reference, Resolver};
use crate::resource::ResourceKind;
use anyhow::Result;
use serde_json::Value;

const KIND: ResourceKind = ResourceKind::User;

pub(super) fn run<A: ResourceApi + ?Sized>(cmd: UserCommand, api: &A) -> Result<Output> {
    match cmd {
        UserCommand::List(args) => list(api, &args),
        UserCommand::Show(target) => show(api, &target.reference()),
        UserCommand::Create(args) => create(api, &args),
        UserCommand::Set(args) => set(api, &args),
        UserCommand::Delete(targets) => delete(api, KIND, &targets),
    }
}

fn list<A: ResourceApi + ?Sized>(api: &A, args: &UserListArgs) -> Result<Output> {
    let mut filters = Filters::new();
    filters.push_opt(
        "organization",
        resolve_opt(api, ResourceKind::Organization, args.organization.as_deref())?,
    );
    if args.superuser {
        filters.push("is_superuser", true);
    }
    if args.active {
        filters.push("is_active", true);
    } else if args.inactive {
        filters.push("is_active", false);
    }
    let page = api.list(KIND, &filters)?;

    let mut columns = vec!["ID", "Username", "Email", "First Name", "Last Name"];
    if args.long {
        columns.extend(["Active", "Superuser", "Date Joined"]);
    }
    let rows = page
        .results
        .iter()
        .map(|user| {
            let mut row = vec![
                Value::from(user.id),
                field(user, "username"),
                field(user, "email"),
                field(user, "first_name"),
                field(user, "last_name"),
            ];
            if args.long {
                row.push(field(user, "is_active"));
                row.push(field(user, "is_superuser"));
                row.push(when(user, "date_joined"));
            }
            row
        })
        .collect();
    Ok(Output::list(columns, rows))
}

fn identity_fields(user: &Record) -> ShowBuilder {
    Output::show()
        .field("id", user.id)
        .field("username", field(user, "username"))
        .field("email", field(user, "email"))
        .field("first_name", field(user, "first_name"))
        .field("last_name", field(user, "last_name"))
}

fn show<A: ResourceApi + ?Sized>(api: &A, reference: &Reference) -> Result<Output> {
    let user = Resolver::new(api, KIND).resolve(reference)?;
    Ok(identity_fields(&user)
        .field("managed", field(&user, "managed"))
        .field("is_superuser", field(&user, "is_superuser"))
        .field("is_platform_auditor", field(&user, "is_platform_auditor"))
        .field("created", when(&user, "created"))
        .field("last_login", when(&user, "last_login"))
        .build())
}

fn create<A: ResourceApi + ?Sized>(api: &A, args: &UserCreateArgs) -> Result<Output> {
    let mut body = Body::new();
    body.set("username", args.username.as_str());
    body.opt("email", args.email.as_deref());
    body.opt("first_name", args.first_name.as_deref());
    body.opt("last_name", args.last_name.as_deref());
    body.opt("password", args.password.as_deref());
    body.opt(
        "organization",
        resolve_opt(api, ResourceKind::Organization, args.organization.as_deref())?,
    );
    if args.superuser {
        body.set("is_superuser", true);
    }
    if args.system_auditor {
        body.set("is_system_auditor", true);
    }

    let user = api.create(KIND, &body.into_value())?;
    Ok(identity_fields(&user)
        .field("is_superuser", field(&user, "is_superuser"))
        .field("date_joined", when(&user, "date_joined"))
        .build())
}

fn set<A: ResourceApi + ?Sized>(api: &A, args: &UserSetArgs) -> Result<Output> {
    let mut body = Body::new();
    body.opt("username", args.username.as_deref());
    body.opt("email", args.email.as_deref());
    body.opt("first_name", args.first_name.as_deref());
    body.opt("last_name", args.last_name.as_deref());
    body.opt("password", args.password.as_deref());
    body.toggle("is_active", args.active, args.inactive);
    body.toggle("is_superuser", args.superuser, args.no_superuser);
    body.toggle("is_system_auditor", args.system_auditor, args.no_system_auditor);
    body.require_changes()?;

    let id = Resolver::new(api, KIND).resolve(&args.target.reference())?.id;
    let user = api.update(KIND, id, &body.into_value())?;
    Ok(identity_fields(&user)
        .field("is_active", field(&user, "is_active"))
        .field("is_superuser", field(&user, "is_superuser"))
        .field("modified", when(&user, "modified"))
        .build())
}
