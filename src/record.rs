//! Typed views of the JSON records the services return.
//!
//! Records keep the fields the resolver and merger rely on as typed members
//! and carry everything else in `fields`, so commands can still render
//! kind-specific columns without a struct per resource.
use crate::resource::ResourceKind;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A single resource as returned by a service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary_fields: SummaryFields,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    /// Decode a record from an arbitrary JSON value.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// The identifying text for `kind` (`username` for users, `name` otherwise).
    pub fn display_name(&self, kind: ResourceKind) -> Option<&str> {
        match kind.name_field() {
            "username" => self.username.as_deref(),
            "name" => self.name.as_deref(),
            other => self.fields.get(other).and_then(Value::as_str),
        }
    }

    /// Look up a field by key, including the typed members.
    pub fn field(&self, key: &str) -> Option<Value> {
        match key {
            "id" => Some(Value::from(self.id)),
            "name" => self.name.clone().map(Value::String),
            "username" => self.username.clone().map(Value::String),
            "description" => self.description.clone().map(Value::String),
            _ => self.fields.get(key).cloned(),
        }
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        match key {
            "name" => self.name.as_deref(),
            "username" => self.username.as_deref(),
            "description" => self.description.as_deref(),
            _ => self.fields.get(key).and_then(Value::as_str),
        }
    }

    pub fn i64_field(&self, key: &str) -> Option<i64> {
        if key == "id" {
            return Some(self.id);
        }
        self.fields.get(key).and_then(Value::as_i64)
    }

    pub fn bool_field(&self, key: &str) -> Option<bool> {
        self.fields.get(key).and_then(Value::as_bool)
    }

    /// Name of a related entity from `summary_fields.<key>.name`.
    pub fn related_name(&self, key: &str) -> Option<&str> {
        self.summary_fields.related_str(key, "name")
    }
}

/// Decode `null` the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Denormalized related-entity snippets embedded by the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_field_counts: Option<RelatedFieldCounts>,
    #[serde(flatten)]
    pub related: BTreeMap<String, Value>,
}

impl SummaryFields {
    pub fn related_str(&self, key: &str, field: &str) -> Option<&str> {
        self.related
            .get(key)
            .and_then(|value| value.get(field))
            .and_then(Value::as_str)
    }

    /// Relationship counters, defaulting every absent counter to zero.
    pub fn counts(&self) -> RelatedFieldCounts {
        self.related_field_counts.clone().unwrap_or_default()
    }
}

/// Relationship counters as reported under `summary_fields.related_field_counts`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedFieldCounts {
    #[serde(default)]
    pub users: u64,
    #[serde(default)]
    pub teams: u64,
    #[serde(default)]
    pub projects: u64,
    #[serde(default)]
    pub job_templates: u64,
    #[serde(default)]
    pub inventories: u64,
}

/// The `{count, next, results}` envelope of every list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListPage {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub results: Vec<Record>,
}

impl ListPage {
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// The single record behind a `count == 1` page.
    pub fn single(&self) -> Option<&Record> {
        if self.count == 1 {
            self.results.first()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_fields_are_kept_in_the_flattened_map() {
        let record = Record::from_value(json!({
            "id": 3,
            "name": "web",
            "enabled": true,
            "summary_fields": {"inventory": {"id": 2, "name": "prod"}}
        }))
        .expect("decode record");

        assert_eq!(record.id, 3);
        assert_eq!(record.bool_field("enabled"), Some(true));
        assert_eq!(record.related_name("inventory"), Some("prod"));
    }

    #[test]
    fn missing_counters_default_to_zero() {
        let record = Record::from_value(json!({
            "id": 1,
            "name": "Default",
            "summary_fields": {"related_field_counts": {"users": 4}}
        }))
        .expect("decode record");

        let counts = record.summary_fields.counts();
        assert_eq!(counts.users, 4);
        assert_eq!(counts.teams, 0);
        assert_eq!(counts.inventories, 0);
    }

    #[test]
    fn null_summary_fields_decode_as_empty() {
        let record = Record::from_value(json!({
            "id": 5,
            "name": "web",
            "summary_fields": null
        }))
        .expect("decode record");

        assert_eq!(record.summary_fields, SummaryFields::default());
        assert_eq!(record.summary_fields.counts().users, 0);
        assert!(!record.fields.contains_key("summary_fields"));
    }

    #[test]
    fn display_name_follows_kind() {
        let user = Record::from_value(json!({"id": 9, "username": "alice"})).expect("decode user");
        assert_eq!(user.display_name(ResourceKind::User), Some("alice"));
        assert_eq!(user.display_name(ResourceKind::Team), None);
    }

    #[test]
    fn single_requires_count_of_one() {
        let page = ListPage::from_value(json!({
            "count": 2,
            "results": [{"id": 1, "name": "a"}]
        }))
        .expect("decode page");
        assert!(page.single().is_none());
    }
}
