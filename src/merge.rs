//! Organizations live in two services: the gateway owns identity (name,
//! description, audit fields) and the controller owns operational settings
//! and the fuller relationship counts. This module combines the two for
//! display and orders writes across them.
//!
//! The gateway side always decides success. Controller reads and writes are
//! best-effort: their failures are logged as warnings and recorded on the
//! outcome, never returned as errors.
use crate::api::{Filters, ResourceApi};
use crate::client::ClientError;
use crate::record::{Record, RelatedFieldCounts};
use crate::resolve::{Reference, ResolveError, Resolver};
use crate::resource::ResourceKind;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

const KIND: ResourceKind = ResourceKind::Organization;

/// One organization as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedOrganization {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub managed: Option<bool>,
    pub created: Option<String>,
    pub modified: Option<String>,
    pub max_hosts: Option<i64>,
    pub custom_virtualenv: Option<String>,
    pub default_environment: Option<Value>,
    pub counts: RelatedFieldCounts,
    /// Every other identity field (`url`, `related`, ...), carried through as-is.
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// Keys the merged view owns; identity copies of these are not carried in `rest`.
const MERGED_KEYS: [&str; 6] = [
    "managed",
    "created",
    "modified",
    "max_hosts",
    "custom_virtualenv",
    "default_environment",
];

/// Combine the identity record with the operational one, if it was fetched.
///
/// The result starts as a copy of `identity`, and identity fields always come
/// from it. Operational fields and all five counters come from `operational`
/// when present; without it, user and team counters fall back to the identity
/// record and the rest are zero.
pub fn merge(identity: &Record, operational: Option<&Record>) -> MergedOrganization {
    let mut merged = MergedOrganization {
        id: identity.id,
        name: identity.name.clone().unwrap_or_default(),
        description: identity.description.clone().unwrap_or_default(),
        managed: identity.bool_field("managed"),
        created: identity.str_field("created").map(str::to_string),
        modified: identity.str_field("modified").map(str::to_string),
        max_hosts: None,
        custom_virtualenv: None,
        default_environment: None,
        counts: RelatedFieldCounts::default(),
        rest: identity
            .fields
            .iter()
            .filter(|(key, _)| !MERGED_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
    };

    match operational {
        Some(operational) => {
            merged.max_hosts = operational.i64_field("max_hosts");
            merged.custom_virtualenv = operational
                .str_field("custom_virtualenv")
                .map(str::to_string);
            merged.default_environment = operational
                .field("default_environment")
                .filter(|value| !value.is_null());
            merged.counts = operational.summary_fields.counts();
        }
        None => {
            let identity_counts = identity.summary_fields.counts();
            merged.counts = RelatedFieldCounts {
                users: identity_counts.users,
                teams: identity_counts.teams,
                ..RelatedFieldCounts::default()
            };
        }
    }
    merged
}

/// Resolve an organization on the identity service and merge in the
/// operational record with the same id.
pub fn show_organization<I, O>(
    identity: &I,
    operational: &O,
    reference: &Reference,
) -> Result<MergedOrganization, ResolveError>
where
    I: ResourceApi + ?Sized,
    O: ResourceApi + ?Sized,
{
    let record = Resolver::new(identity, KIND).resolve(reference)?;
    let details = match operational.fetch(KIND, record.id) {
        Ok(Some(details)) => Some(details),
        Ok(None) => {
            tracing::warn!(
                id = record.id,
                "organization has no operational record; showing identity counts only"
            );
            None
        }
        Err(err) => {
            tracing::warn!("Could not fetch operational details: {err}");
            None
        }
    };
    Ok(merge(&record, details.as_ref()))
}

/// Requested changes to an organization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganizationChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub max_hosts: Option<i64>,
}

impl OrganizationChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.max_hosts.is_none()
    }

    fn identity_body(&self) -> Map<String, Value> {
        let mut body = Map::new();
        if let Some(name) = &self.name {
            body.insert("name".into(), Value::from(name.as_str()));
        }
        if let Some(description) = &self.description {
            body.insert("description".into(), Value::from(description.as_str()));
        }
        body
    }
}

/// Result of a two-service write.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOutcome {
    /// The identity record after the write.
    pub record: Record,
    /// `max_hosts` as confirmed by the operational service, when it was set.
    pub max_hosts: Option<i64>,
    /// Operational changes that could not be applied.
    pub warnings: Vec<String>,
}

#[derive(Debug, Error)]
pub enum OrganizationWriteError {
    #[error("No properties specified to update")]
    NoChanges,
    #[error("Organization with ID {id} not found")]
    NotFound { id: i64 },
    #[error(transparent)]
    Upstream(#[from] ClientError),
}

/// Create on the identity service, then apply `max_hosts` on the
/// operational service if requested.
pub fn create_organization<I, O>(
    identity: &I,
    operational: &O,
    changes: &OrganizationChanges,
) -> Result<WriteOutcome, OrganizationWriteError>
where
    I: ResourceApi + ?Sized,
    O: ResourceApi + ?Sized,
{
    let record = identity.create(KIND, &Value::Object(changes.identity_body()))?;
    let mut warnings = Vec::new();
    let max_hosts = changes.max_hosts.and_then(|max_hosts| {
        apply_max_hosts(operational, record.id, max_hosts, "set max_hosts", &mut warnings)
    });
    Ok(WriteOutcome {
        record,
        max_hosts,
        warnings,
    })
}

/// Update identity fields, then `max_hosts`.
///
/// When only `max_hosts` is requested the identity record is re-read so the
/// caller always gets the organization back, even if the operational write
/// failed.
pub fn update_organization<I, O>(
    identity: &I,
    operational: &O,
    id: i64,
    changes: &OrganizationChanges,
) -> Result<WriteOutcome, OrganizationWriteError>
where
    I: ResourceApi + ?Sized,
    O: ResourceApi + ?Sized,
{
    if changes.is_empty() {
        return Err(OrganizationWriteError::NoChanges);
    }

    let body = changes.identity_body();
    let updated = if body.is_empty() {
        None
    } else {
        Some(identity.update(KIND, id, &Value::Object(body))?)
    };

    let mut warnings = Vec::new();
    let max_hosts = changes.max_hosts.and_then(|max_hosts| {
        apply_max_hosts(
            operational,
            id,
            max_hosts,
            "update operational settings",
            &mut warnings,
        )
    });

    let record = match updated {
        Some(record) => record,
        None => identity
            .fetch(KIND, id)?
            .ok_or(OrganizationWriteError::NotFound { id })?,
    };
    Ok(WriteOutcome {
        record,
        max_hosts,
        warnings,
    })
}

fn apply_max_hosts<O>(
    operational: &O,
    id: i64,
    max_hosts: i64,
    action: &str,
    warnings: &mut Vec<String>,
) -> Option<i64>
where
    O: ResourceApi + ?Sized,
{
    let body = serde_json::json!({ "max_hosts": max_hosts });
    match operational.update(KIND, id, &body) {
        Ok(record) => record.i64_field("max_hosts"),
        Err(err) => {
            let warning = format!("Could not {action} in the controller: {err}");
            tracing::warn!("{warning}");
            warnings.push(warning);
            None
        }
    }
}

/// Organizations on the identity service, for `organization list`.
pub fn list_organizations<I>(identity: &I) -> Result<Vec<Record>, ClientError>
where
    I: ResourceApi + ?Sized,
{
    Ok(identity.list(KIND, &Filters::new())?.results)
}

#[cfg(test)]
#[path = "merge_tests.rs"]
mod tests;
