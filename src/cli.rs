//! Command-line surface of the `aap` binary.
//!
//! Connection flags are global so they can follow any subcommand; they win
//! over `AAP_*` environment variables and `.env`.
use crate::config::Overrides;
use crate::output::OutputFormat;
use crate::resolve::Reference;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "aap",
    version,
    about = "Command-line client for the automation platform gateway and controller",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,

    /// Log each request to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Default)]
pub struct ConnectionArgs {
    /// Platform URL (env: AAP_HOST)
    #[arg(long, value_name = "URL", global = true)]
    pub aap_host: Option<String>,

    /// Username for basic auth (env: AAP_USERNAME)
    #[arg(long, value_name = "USER", global = true)]
    pub aap_username: Option<String>,

    /// Password for basic auth (env: AAP_PASSWORD)
    #[arg(long, value_name = "PASSWORD", global = true)]
    pub aap_password: Option<String>,

    /// Bearer token; preferred over username/password (env: AAP_TOKEN)
    #[arg(long, value_name = "TOKEN", global = true)]
    pub aap_token: Option<String>,

    /// Verify TLS certificates (env: AAP_VERIFY_SSL)
    #[arg(long, global = true, overrides_with = "aap_no_verify_ssl")]
    pub aap_verify_ssl: bool,

    /// Skip TLS certificate verification
    #[arg(long, global = true, overrides_with = "aap_verify_ssl")]
    pub aap_no_verify_ssl: bool,

    /// PEM bundle of trusted CAs (env: AAP_CA_BUNDLE)
    #[arg(long, value_name = "PATH", global = true)]
    pub aap_ca_bundle: Option<PathBuf>,

    /// Per-request timeout in seconds (env: AAP_TIMEOUT)
    #[arg(long, value_name = "SECS", global = true)]
    pub aap_timeout: Option<u64>,
}

impl ConnectionArgs {
    pub fn overrides(&self) -> Overrides {
        let verify_ssl = if self.aap_no_verify_ssl {
            Some(false)
        } else if self.aap_verify_ssl {
            Some(true)
        } else {
            None
        };
        Overrides {
            host: self.aap_host.clone(),
            username: self.aap_username.clone(),
            password: self.aap_password.clone(),
            token: self.aap_token.clone(),
            verify_ssl,
            ca_bundle: self.aap_ca_bundle.clone(),
            timeout_secs: self.aap_timeout,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage organizations (gateway identity merged with controller settings)
    #[command(subcommand)]
    Organization(OrganizationCommand),
    /// Manage teams
    #[command(subcommand)]
    Team(TeamCommand),
    /// Manage users
    #[command(subcommand)]
    User(UserCommand),
    /// Show the authenticated user
    Whoami,
    /// Check connectivity to the gateway and controller
    Ping(PingArgs),
    /// Manage projects
    #[command(subcommand)]
    Project(ProjectCommand),
    /// Manage inventories
    #[command(subcommand)]
    Inventory(InventoryCommand),
    /// Manage credentials
    #[command(subcommand)]
    Credential(CredentialCommand),
    /// Manage hosts
    #[command(subcommand)]
    Host(HostCommand),
    /// List, show, and launch job templates
    #[command(subcommand, name = "job-template")]
    JobTemplate(JobTemplateCommand),
    /// Inspect and control jobs
    #[command(subcommand)]
    Job(JobCommand),
    /// Manage workflow job templates
    #[command(subcommand)]
    Workflow(WorkflowCommand),
    /// Inspect and control workflow jobs
    #[command(subcommand, name = "workflow-job")]
    WorkflowJob(WorkflowJobCommand),
}

/// One resource, by positional name-or-ID, `--id`, or `--name`.
#[derive(Args, Debug, Clone, Default)]
pub struct Target {
    /// Name or ID
    #[arg(value_name = "NAME_OR_ID")]
    pub reference: Option<String>,

    /// Select by ID; a positional name is then checked against the record
    #[arg(long, value_name = "ID")]
    pub id: Option<i64>,

    /// Select by exact name, even when it looks like a number
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,
}

impl Target {
    pub fn reference(&self) -> Reference {
        Reference {
            positional: self.reference.clone(),
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// One or more resources to delete.
#[derive(Args, Debug, Clone, Default)]
pub struct Targets {
    /// Names or IDs
    #[arg(value_name = "NAME_OR_ID")]
    pub references: Vec<String>,

    /// Delete by ID; one positional name is then checked against the record
    #[arg(long, value_name = "ID")]
    pub id: Option<i64>,

    /// Delete by exact name
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,
}

/// The resource a `set` command modifies; `--name` on `set` is the new name.
#[derive(Args, Debug, Clone, Default)]
pub struct SetTarget {
    /// Name or ID of the resource to modify
    #[arg(value_name = "NAME_OR_ID")]
    pub reference: Option<String>,

    /// Modify by ID
    #[arg(long = "id", value_name = "ID")]
    pub id: Option<i64>,
}

impl SetTarget {
    pub fn reference(&self) -> Reference {
        Reference {
            positional: self.reference.clone(),
            id: self.id,
            name: None,
        }
    }
}

// Organizations

#[derive(Subcommand, Debug)]
pub enum OrganizationCommand {
    /// List organizations
    List(LongArgs),
    /// Show one organization
    Show(Target),
    /// Create an organization
    Create(OrganizationCreateArgs),
    /// Change an organization
    Set(OrganizationSetArgs),
    /// Delete organizations
    Delete(Targets),
}

#[derive(Args, Debug, Default)]
pub struct LongArgs {
    /// Include more columns
    #[arg(long)]
    pub long: bool,
}

#[derive(Args, Debug)]
pub struct OrganizationCreateArgs {
    /// Name of the new organization
    pub name: String,

    #[arg(long)]
    pub description: Option<String>,

    /// Host limit, applied on the controller
    #[arg(long, value_name = "N")]
    pub max_hosts: Option<i64>,
}

#[derive(Args, Debug)]
pub struct OrganizationSetArgs {
    #[command(flatten)]
    pub target: SetTarget,

    /// New name
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Host limit, applied on the controller
    #[arg(long, value_name = "N")]
    pub max_hosts: Option<i64>,
}

// Teams

#[derive(Subcommand, Debug)]
pub enum TeamCommand {
    /// List teams
    List(TeamListArgs),
    /// Show one team
    Show(Target),
    /// Create a team
    Create(TeamCreateArgs),
    /// Change a team
    Set(TeamSetArgs),
    /// Delete teams
    Delete(Targets),
}

#[derive(Args, Debug)]
pub struct TeamListArgs {
    /// Only teams in this organization (name or ID)
    #[arg(long, value_name = "ORG")]
    pub organization: Option<String>,

    /// Include more columns
    #[arg(long)]
    pub long: bool,
}

#[derive(Args, Debug)]
pub struct TeamCreateArgs {
    pub name: String,

    /// Owning organization (name or ID)
    #[arg(long, value_name = "ORG")]
    pub organization: String,

    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Args, Debug)]
pub struct TeamSetArgs {
    #[command(flatten)]
    pub target: SetTarget,

    /// New name
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Move to this organization (name or ID)
    #[arg(long, value_name = "ORG")]
    pub organization: Option<String>,
}

// Users

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// List users
    List(UserListArgs),
    /// Show one user
    Show(Target),
    /// Create a user
    Create(UserCreateArgs),
    /// Change a user
    Set(UserSetArgs),
    /// Delete users
    Delete(Targets),
}

#[derive(Args, Debug)]
pub struct UserListArgs {
    /// Include more columns
    #[arg(long)]
    pub long: bool,

    /// Only members of this organization (name or ID)
    #[arg(long, value_name = "ORG")]
    pub organization: Option<String>,

    /// Only superusers
    #[arg(long)]
    pub superuser: bool,

    /// Only active users
    #[arg(long, conflicts_with = "inactive")]
    pub active: bool,

    /// Only inactive users
    #[arg(long)]
    pub inactive: bool,
}

#[derive(Args, Debug)]
pub struct UserCreateArgs {
    pub username: String,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub last_name: Option<String>,

    #[arg(long)]
    pub password: Option<String>,

    /// Organization (name or ID)
    #[arg(long, value_name = "ORG")]
    pub organization: Option<String>,

    #[arg(long)]
    pub superuser: bool,

    #[arg(long)]
    pub system_auditor: bool,
}

#[derive(Args, Debug)]
pub struct UserSetArgs {
    #[command(flatten)]
    pub target: SetTarget,

    /// New username
    #[arg(long)]
    pub username: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub last_name: Option<String>,

    #[arg(long)]
    pub password: Option<String>,

    #[arg(long, conflicts_with = "inactive")]
    pub active: bool,

    #[arg(long)]
    pub inactive: bool,

    #[arg(long, conflicts_with = "no_superuser")]
    pub superuser: bool,

    #[arg(long)]
    pub no_superuser: bool,

    #[arg(long, conflicts_with = "no_system_auditor")]
    pub system_auditor: bool,

    #[arg(long)]
    pub no_system_auditor: bool,
}

// Ping

#[derive(Args, Debug)]
pub struct PingArgs {
    /// Timeout for each ping request, in seconds
    #[arg(long, value_name = "SECS", default_value_t = 10)]
    pub timeout: u64,

    /// Add controller instance and instance group details
    #[arg(long)]
    pub detail: bool,
}

// Projects

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    /// List projects
    List(ProjectListArgs),
    /// Show one project
    Show(Target),
    /// Create a project
    Create(ProjectCreateArgs),
    /// Change a project
    Set(ProjectSetArgs),
    /// Delete projects
    Delete(Targets),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScmType {
    Git,
    Hg,
    Svn,
}

impl ScmType {
    pub fn as_str(self) -> &'static str {
        match self {
            ScmType::Git => "git",
            ScmType::Hg => "hg",
            ScmType::Svn => "svn",
        }
    }
}

#[derive(Args, Debug)]
pub struct ProjectListArgs {
    /// Only projects in this organization (name or ID)
    #[arg(long, value_name = "ORG")]
    pub organization: Option<String>,

    #[arg(long, value_enum)]
    pub scm_type: Option<ScmType>,

    /// Include more columns
    #[arg(long)]
    pub long: bool,
}

#[derive(Args, Debug)]
pub struct ProjectCreateArgs {
    pub name: String,

    /// Owning organization (name or ID)
    #[arg(long, value_name = "ORG")]
    pub organization: String,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long, value_enum)]
    pub scm_type: Option<ScmType>,

    #[arg(long, value_name = "URL")]
    pub scm_url: Option<String>,

    #[arg(long, value_name = "REF")]
    pub scm_branch: Option<String>,

    /// Credential ID used for source control
    #[arg(long, value_name = "ID")]
    pub scm_credential: Option<i64>,

    /// Directory for manual projects
    #[arg(long, value_name = "DIR")]
    pub local_path: Option<String>,
}

#[derive(Args, Debug)]
pub struct ProjectSetArgs {
    #[command(flatten)]
    pub target: SetTarget,

    /// New name
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long, value_name = "URL")]
    pub scm_url: Option<String>,

    #[arg(long, value_name = "REF")]
    pub scm_branch: Option<String>,

    /// Credential ID used for source control
    #[arg(long, value_name = "ID")]
    pub scm_credential: Option<i64>,
}

// Inventories

#[derive(Subcommand, Debug)]
pub enum InventoryCommand {
    /// List inventories
    List(InventoryListArgs),
    /// Show one inventory
    Show(Target),
    /// Create an inventory
    Create(InventoryCreateArgs),
    /// Change an inventory
    Set(InventorySetArgs),
    /// Delete inventories
    Delete(Targets),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InventoryKind {
    Smart,
}

#[derive(Args, Debug)]
pub struct InventoryListArgs {
    /// Only inventories in this organization (name or ID)
    #[arg(long, value_name = "ORG")]
    pub organization: Option<String>,

    #[arg(long, value_enum)]
    pub kind: Option<InventoryKind>,

    /// Include more columns
    #[arg(long)]
    pub long: bool,
}

#[derive(Args, Debug)]
pub struct InventoryCreateArgs {
    pub name: String,

    /// Owning organization (name or ID)
    #[arg(long, value_name = "ORG")]
    pub organization: String,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long, value_enum)]
    pub kind: Option<InventoryKind>,

    /// Host filter for smart inventories
    #[arg(long, value_name = "FILTER")]
    pub host_filter: Option<String>,

    /// Inventory variables as JSON
    #[arg(long, value_name = "JSON")]
    pub variables: Option<String>,
}

#[derive(Args, Debug)]
pub struct InventorySetArgs {
    #[command(flatten)]
    pub target: SetTarget,

    /// New name
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long, value_name = "FILTER")]
    pub host_filter: Option<String>,

    /// Inventory variables as JSON
    #[arg(long, value_name = "JSON")]
    pub variables: Option<String>,
}

// Credentials

#[derive(Subcommand, Debug)]
pub enum CredentialCommand {
    /// List credentials
    List(CredentialListArgs),
    /// Show one credential (secret inputs are never shown)
    Show(Target),
    /// Create a credential
    Create(CredentialCreateArgs),
    /// Change a credential
    Set(CredentialSetArgs),
    /// Delete credentials
    Delete(Targets),
}

#[derive(Args, Debug)]
pub struct CredentialListArgs {
    /// Only credentials in this organization (name or ID)
    #[arg(long, value_name = "ORG")]
    pub organization: Option<String>,

    /// Only credentials of this type ID
    #[arg(long, value_name = "ID")]
    pub credential_type: Option<i64>,

    /// Include more columns
    #[arg(long)]
    pub long: bool,
}

/// Values sent under the credential's `inputs`.
#[derive(Args, Debug, Default)]
pub struct CredentialInputs {
    #[arg(long)]
    pub username: Option<String>,

    #[arg(long)]
    pub password: Option<String>,

    #[arg(long, value_name = "KEY")]
    pub ssh_key_data: Option<String>,

    #[arg(long, value_name = "PASSPHRASE")]
    pub ssh_key_unlock: Option<String>,

    #[arg(long, value_name = "METHOD")]
    pub become_method: Option<String>,

    #[arg(long, value_name = "USER")]
    pub become_username: Option<String>,

    #[arg(long, value_name = "PASSWORD")]
    pub become_password: Option<String>,
}

#[derive(Args, Debug)]
pub struct CredentialCreateArgs {
    pub name: String,

    /// Owning organization (name or ID)
    #[arg(long, value_name = "ORG")]
    pub organization: String,

    /// Credential type ID
    #[arg(long, value_name = "ID")]
    pub credential_type: i64,

    #[arg(long)]
    pub description: Option<String>,

    #[command(flatten)]
    pub inputs: CredentialInputs,
}

#[derive(Args, Debug)]
pub struct CredentialSetArgs {
    #[command(flatten)]
    pub target: SetTarget,

    /// New name
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[command(flatten)]
    pub inputs: CredentialInputs,
}

// Hosts

#[derive(Subcommand, Debug)]
pub enum HostCommand {
    /// List hosts
    List(HostListArgs),
    /// Show one host
    Show(Target),
    /// Create a host
    Create(HostCreateArgs),
    /// Change a host
    Set(HostSetArgs),
    /// Delete hosts
    Delete(Targets),
    /// Show host automation metrics
    Metrics(HostMetricsArgs),
}

#[derive(Args, Debug)]
pub struct HostListArgs {
    /// Only hosts in this inventory (name or ID)
    #[arg(long, value_name = "INVENTORY")]
    pub inventory: Option<String>,

    /// Page size
    #[arg(long, value_name = "N", default_value_t = 20)]
    pub limit: u32,

    /// Include more columns
    #[arg(long)]
    pub long: bool,
}

#[derive(Args, Debug)]
pub struct HostCreateArgs {
    pub name: String,

    /// Inventory to add the host to (name or ID)
    #[arg(long, value_name = "INVENTORY")]
    pub inventory: String,

    #[arg(long)]
    pub description: Option<String>,

    /// Host variables as JSON
    #[arg(long, value_name = "JSON")]
    pub variables: Option<String>,

    /// Create the host disabled
    #[arg(long)]
    pub disabled: bool,
}

#[derive(Args, Debug)]
pub struct HostSetArgs {
    #[command(flatten)]
    pub target: SetTarget,

    /// New name
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Host variables as JSON
    #[arg(long, value_name = "JSON")]
    pub variables: Option<String>,

    #[arg(long, conflicts_with = "disabled")]
    pub enabled: bool,

    #[arg(long)]
    pub disabled: bool,
}

#[derive(Args, Debug)]
pub struct HostMetricsArgs {
    /// Only this hostname
    #[arg(long)]
    pub hostname: Option<String>,

    /// Page size
    #[arg(long, value_name = "N", default_value_t = 20)]
    pub limit: u32,

    /// Include more columns
    #[arg(long)]
    pub long: bool,
}

// Job templates

#[derive(Subcommand, Debug)]
pub enum JobTemplateCommand {
    /// List job templates
    List(JobTemplateListArgs),
    /// Show one job template
    Show(Target),
    /// Launch a job from a template
    Launch(JobTemplateLaunchArgs),
}

#[derive(Args, Debug)]
pub struct JobTemplateListArgs {
    /// Only templates in this organization (name or ID)
    #[arg(long, value_name = "ORG")]
    pub organization: Option<String>,

    /// Only templates using this project (name or ID)
    #[arg(long, value_name = "PROJECT")]
    pub project: Option<String>,

    /// Include more columns
    #[arg(long)]
    pub long: bool,
}

#[derive(Args, Debug)]
pub struct JobTemplateLaunchArgs {
    #[command(flatten)]
    pub target: SetTarget,

    /// Extra variable as key=value; repeatable
    #[arg(long = "extra-vars", value_name = "KEY=VALUE")]
    pub extra_vars: Vec<String>,

    /// JSON file of extra variables, merged over --extra-vars
    #[arg(long, value_name = "PATH")]
    pub extra_vars_file: Option<PathBuf>,

    /// Inventory ID to run against
    #[arg(long, value_name = "ID")]
    pub inventory: Option<i64>,

    #[arg(long, value_name = "PATTERN")]
    pub limit: Option<String>,

    #[arg(long, value_name = "TAGS")]
    pub job_tags: Option<String>,

    #[arg(long, value_name = "TAGS")]
    pub skip_tags: Option<String>,

    #[arg(long, value_name = "REF")]
    pub scm_branch: Option<String>,

    #[arg(long, value_name = "0-5", value_parser = clap::value_parser!(u8).range(0..=5))]
    pub verbosity: Option<u8>,
}

// Jobs

#[derive(Subcommand, Debug)]
pub enum JobCommand {
    /// List jobs
    List(JobListArgs),
    /// Show one job
    Show(JobIdArgs),
    /// Cancel a pending or running job
    Cancel(JobIdArgs),
    /// Relaunch a job
    Relaunch(JobRelaunchArgs),
    /// Print job output
    Output(JobIdArgs),
}

#[derive(Args, Debug)]
pub struct JobListArgs {
    /// Page size
    #[arg(long, value_name = "N")]
    pub limit: Option<u32>,

    /// pending, waiting, running, successful, failed, error, or canceled
    #[arg(long)]
    pub status: Option<String>,

    /// run or check
    #[arg(long)]
    pub job_type: Option<String>,

    /// Include more columns
    #[arg(long)]
    pub long: bool,
}

#[derive(Args, Debug)]
pub struct JobIdArgs {
    /// Job ID
    pub id: i64,
}

#[derive(Args, Debug)]
pub struct JobRelaunchArgs {
    /// Job ID
    pub id: i64,

    /// Extra variables as JSON
    #[arg(long, value_name = "JSON")]
    pub extra_vars: Option<String>,

    #[arg(long, value_name = "PATTERN")]
    pub limit: Option<String>,

    #[arg(long, value_name = "TAGS")]
    pub job_tags: Option<String>,

    #[arg(long, value_name = "TAGS")]
    pub skip_tags: Option<String>,
}

// Workflows

#[derive(Subcommand, Debug)]
pub enum WorkflowCommand {
    /// List workflow job templates
    List(WorkflowListArgs),
    /// Show one workflow job template
    Show(Target),
    /// Create a workflow job template
    Create(WorkflowCreateArgs),
    /// Change a workflow job template
    Set(WorkflowSetArgs),
    /// Delete workflow job templates
    Delete(Targets),
    /// Launch a workflow
    Launch(WorkflowLaunchArgs),
}

#[derive(Args, Debug)]
pub struct WorkflowListArgs {
    /// Only workflows in this organization (name or ID)
    #[arg(long, value_name = "ORG")]
    pub organization: Option<String>,

    /// Include more columns
    #[arg(long)]
    pub long: bool,
}

#[derive(Args, Debug)]
pub struct WorkflowCreateArgs {
    pub name: String,

    /// Owning organization (name or ID)
    #[arg(long, value_name = "ORG")]
    pub organization: String,

    #[arg(long)]
    pub description: Option<String>,

    /// Default inventory (name or ID)
    #[arg(long, value_name = "INVENTORY")]
    pub inventory: Option<String>,

    /// Extra variables as JSON
    #[arg(long, value_name = "JSON")]
    pub extra_vars: Option<String>,

    #[arg(long)]
    pub allow_simultaneous: bool,

    #[arg(long)]
    pub ask_variables_on_launch: bool,

    #[arg(long)]
    pub ask_inventory_on_launch: bool,

    #[arg(long)]
    pub ask_limit_on_launch: bool,

    #[arg(long)]
    pub ask_scm_branch_on_launch: bool,
}

#[derive(Args, Debug)]
pub struct WorkflowSetArgs {
    #[command(flatten)]
    pub target: SetTarget,

    /// New name
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Default inventory (name or ID)
    #[arg(long, value_name = "INVENTORY")]
    pub inventory: Option<String>,

    /// Extra variables as JSON
    #[arg(long, value_name = "JSON")]
    pub extra_vars: Option<String>,

    #[arg(long, conflicts_with = "no_allow_simultaneous")]
    pub allow_simultaneous: bool,

    #[arg(long)]
    pub no_allow_simultaneous: bool,

    #[arg(long, conflicts_with = "no_ask_variables_on_launch")]
    pub ask_variables_on_launch: bool,

    #[arg(long)]
    pub no_ask_variables_on_launch: bool,

    #[arg(long, conflicts_with = "no_ask_inventory_on_launch")]
    pub ask_inventory_on_launch: bool,

    #[arg(long)]
    pub no_ask_inventory_on_launch: bool,
}

#[derive(Args, Debug)]
pub struct WorkflowLaunchArgs {
    #[command(flatten)]
    pub target: SetTarget,

    /// Extra variables as JSON
    #[arg(long, value_name = "JSON")]
    pub extra_vars: Option<String>,

    /// Inventory ID to run against
    #[arg(long, value_name = "ID")]
    pub inventory: Option<i64>,

    #[arg(long, value_name = "PATTERN")]
    pub limit: Option<String>,

    #[arg(long, value_name = "REF")]
    pub scm_branch: Option<String>,
}

// Workflow jobs

#[derive(Subcommand, Debug)]
pub enum WorkflowJobCommand {
    /// List workflow jobs
    List(WorkflowJobListArgs),
    /// Show one workflow job
    Show(JobIdArgs),
    /// Cancel a workflow job
    Cancel(JobIdArgs),
    /// Relaunch a workflow job
    Relaunch(JobIdArgs),
}

#[derive(Args, Debug)]
pub struct WorkflowJobListArgs {
    /// pending, waiting, running, successful, failed, error, or canceled
    #[arg(long)]
    pub status: Option<String>,

    /// Only jobs of this workflow job template ID
    #[arg(long, value_name = "ID")]
    pub workflow_job_template: Option<i64>,

    /// Include more columns
    #[arg(long)]
    pub long: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn connection_flags_work_after_the_subcommand() {
        let cli = Cli::try_parse_from([
            "aap",
            "team",
            "list",
            "--aap-host",
            "aap.example.com",
            "--aap-no-verify-ssl",
        ])
        .expect("parse");
        let overrides = cli.connection.overrides();
        assert_eq!(overrides.host.as_deref(), Some("aap.example.com"));
        assert_eq!(overrides.verify_ssl, Some(false));
    }

    #[test]
    fn show_target_carries_all_three_forms() {
        let cli = Cli::try_parse_from(["aap", "team", "show", "ops", "--id", "7"]).expect("parse");
        let Command::Team(TeamCommand::Show(target)) = cli.command else {
            panic!("expected team show");
        };
        assert_eq!(
            target.reference(),
            Reference {
                positional: Some("ops".into()),
                id: Some(7),
                name: None,
            }
        );
    }

    #[test]
    fn verbosity_is_bounded() {
        let err = Cli::try_parse_from(["aap", "job-template", "launch", "deploy", "--verbosity", "6"]);
        assert!(err.is_err());
    }
}
