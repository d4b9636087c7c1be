//! Catalogue of the resource kinds the client addresses.
//!
//! A kind only knows where it lives under a service's base URL and how it is
//! named for users; which service is asked is the caller's choice, because
//! some kinds (organizations, users) exist on both the gateway and the
//! controller.
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Organization,
    Team,
    User,
    Project,
    Inventory,
    Credential,
    Host,
    HostMetric,
    JobTemplate,
    Job,
    WorkflowJobTemplate,
    WorkflowJob,
}

impl ResourceKind {
    /// Collection endpoint relative to a service base URL.
    pub fn endpoint(self) -> &'static str {
        match self {
            ResourceKind::Organization => "organizations/",
            ResourceKind::Team => "teams/",
            ResourceKind::User => "users/",
            ResourceKind::Project => "projects/",
            ResourceKind::Inventory => "inventories/",
            ResourceKind::Credential => "credentials/",
            ResourceKind::Host => "hosts/",
            ResourceKind::HostMetric => "host_metrics/",
            ResourceKind::JobTemplate => "job_templates/",
            ResourceKind::Job => "jobs/",
            ResourceKind::WorkflowJobTemplate => "workflow_job_templates/",
            ResourceKind::WorkflowJob => "workflow_jobs/",
        }
    }

    /// Endpoint for a single record of this kind.
    pub fn item_endpoint(self, id: i64) -> String {
        format!("{}{id}/", self.endpoint())
    }

    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Organization => "organization",
            ResourceKind::Team => "team",
            ResourceKind::User => "user",
            ResourceKind::Project => "project",
            ResourceKind::Inventory => "inventory",
            ResourceKind::Credential => "credential",
            ResourceKind::Host => "host",
            ResourceKind::HostMetric => "host metric",
            ResourceKind::JobTemplate => "job template",
            ResourceKind::Job => "job",
            ResourceKind::WorkflowJobTemplate => "workflow job template",
            ResourceKind::WorkflowJob => "workflow job",
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            ResourceKind::Organization => "organizations",
            ResourceKind::Team => "teams",
            ResourceKind::User => "users",
            ResourceKind::Project => "projects",
            ResourceKind::Inventory => "inventories",
            ResourceKind::Credential => "credentials",
            ResourceKind::Host => "hosts",
            ResourceKind::HostMetric => "host metrics",
            ResourceKind::JobTemplate => "job templates",
            ResourceKind::Job => "jobs",
            ResourceKind::WorkflowJobTemplate => "workflow job templates",
            ResourceKind::WorkflowJob => "workflow jobs",
        }
    }

    /// Field that carries the human-readable identity and doubles as the
    /// exact-match list filter.
    pub fn name_field(self) -> &'static str {
        match self {
            ResourceKind::User => "username",
            ResourceKind::HostMetric => "hostname",
            _ => "name",
        }
    }

    /// Kinds whose list rows are trimmed by the API, so a name match is
    /// re-fetched by id before it is shown.
    pub fn list_rows_are_partial(self) -> bool {
        matches!(
            self,
            ResourceKind::Inventory | ResourceKind::Credential | ResourceKind::Host
        )
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Capitalize the first letter of a label for sentence-initial use.
pub fn capitalized(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
