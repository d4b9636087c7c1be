//! The resource-level seam the resolver and merger are written against.
use crate::client::ClientError;
use crate::record::{ListPage, Record};
use crate::resource::ResourceKind;
use serde_json::Value;

/// Query parameters for a list call, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pairs: Vec<(String, String)>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl ToString) {
        self.pairs.push((key.into(), value.to_string()));
    }

    pub fn push_opt<T: ToString>(&mut self, key: &str, value: Option<T>) {
        if let Some(value) = value {
            self.push(key, value);
        }
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

/// CRUD by resource kind against one service.
pub trait ResourceApi {
    fn list(&self, kind: ResourceKind, filters: &Filters) -> Result<ListPage, ClientError>;

    /// Fetch by id; a 404 is `Ok(None)` rather than an error.
    fn fetch(&self, kind: ResourceKind, id: i64) -> Result<Option<Record>, ClientError>;

    fn create(&self, kind: ResourceKind, body: &Value) -> Result<Record, ClientError>;

    fn update(&self, kind: ResourceKind, id: i64, body: &Value) -> Result<Record, ClientError>;

    fn remove(&self, kind: ResourceKind, id: i64) -> Result<(), ClientError>;
}
