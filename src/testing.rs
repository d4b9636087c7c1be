//! In-memory [`ResourceApi`] for unit tests.
use crate::api::{Filters, ResourceApi};
use crate::client::ClientError;
use crate::record::{ListPage, Record};
use crate::resource::ResourceKind;
use serde_json::{json, Map, Value};
use std::cell::RefCell;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List(ResourceKind, Vec<(String, String)>),
    Fetch(ResourceKind, i64),
    Create(ResourceKind, Value),
    Update(ResourceKind, i64, Value),
    Remove(ResourceKind, i64),
}

#[derive(Default)]
pub struct FakeApi {
    records: RefCell<Vec<(ResourceKind, Record)>>,
    calls: RefCell<Vec<Call>>,
    failures: RefCell<Vec<(&'static str, ResourceKind, Option<i64>, u16)>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, kind: ResourceKind, value: Value) -> Self {
        let record = Record::from_value(value).expect("fake record");
        self.records.borrow_mut().push((kind, record));
        self
    }

    /// Make `op` ("list", "fetch", "create", "update", "remove") fail with
    /// HTTP 500, for every id when `id` is `None`.
    pub fn failing(self, op: &'static str, kind: ResourceKind, id: Option<i64>) -> Self {
        self.failing_with(op, kind, id, 500)
    }

    /// Like [`FakeApi::failing`] with a chosen HTTP status.
    pub fn failing_with(
        self,
        op: &'static str,
        kind: ResourceKind,
        id: Option<i64>,
        status: u16,
    ) -> Self {
        self.failures.borrow_mut().push((op, kind, id, status));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn record(&self, kind: ResourceKind, id: i64) -> Option<Record> {
        self.records
            .borrow()
            .iter()
            .find(|(k, r)| *k == kind && r.id == id)
            .map(|(_, r)| r.clone())
    }

    fn check(&self, op: &'static str, kind: ResourceKind, id: Option<i64>) -> Result<(), ClientError> {
        let failure = self
            .failures
            .borrow()
            .iter()
            .find(|(o, k, i, _)| *o == op && *k == kind && (i.is_none() || *i == id))
            .map(|(_, _, _, status)| *status);
        if let Some(status) = failure {
            return Err(ClientError::Status {
                method: "GET",
                url: format!("fake://{}", kind.endpoint()),
                status,
                body: format!("{op} failed"),
            });
        }
        Ok(())
    }
}

fn matches(record: &Record, key: &str, wanted: &str) -> bool {
    match record.field(key) {
        Some(Value::String(s)) => s == wanted,
        Some(Value::Null) | None => false,
        Some(other) => other.to_string() == wanted,
    }
}

impl ResourceApi for FakeApi {
    fn list(&self, kind: ResourceKind, filters: &Filters) -> Result<ListPage, ClientError> {
        self.calls
            .borrow_mut()
            .push(Call::List(kind, filters.pairs().to_vec()));
        self.check("list", kind, None)?;
        let results: Vec<Record> = self
            .records
            .borrow()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, r)| r.clone())
            .filter(|r| {
                filters
                    .pairs()
                    .iter()
                    .filter(|(key, _)| !matches!(key.as_str(), "page_size" | "order_by"))
                    .all(|(key, value)| matches(r, key, value))
            })
            .collect();
        Ok(ListPage {
            count: results.len() as u64,
            next: None,
            results,
        })
    }

    fn fetch(&self, kind: ResourceKind, id: i64) -> Result<Option<Record>, ClientError> {
        self.calls.borrow_mut().push(Call::Fetch(kind, id));
        self.check("fetch", kind, Some(id))?;
        Ok(self.record(kind, id))
    }

    fn create(&self, kind: ResourceKind, body: &Value) -> Result<Record, ClientError> {
        self.calls.borrow_mut().push(Call::Create(kind, body.clone()));
        self.check("create", kind, None)?;
        let next_id = self
            .records
            .borrow()
            .iter()
            .map(|(_, r)| r.id)
            .max()
            .unwrap_or(0)
            + 1;
        let mut object = body.as_object().cloned().unwrap_or_else(Map::new);
        object.insert("id".into(), json!(next_id));
        let record = Record::from_value(Value::Object(object)).expect("fake create");
        self.records.borrow_mut().push((kind, record.clone()));
        Ok(record)
    }

    fn update(&self, kind: ResourceKind, id: i64, body: &Value) -> Result<Record, ClientError> {
        self.calls
            .borrow_mut()
            .push(Call::Update(kind, id, body.clone()));
        self.check("update", kind, Some(id))?;
        let mut records = self.records.borrow_mut();
        let Some((_, record)) = records.iter_mut().find(|(k, r)| *k == kind && r.id == id) else {
            return Err(ClientError::Status {
                method: "PATCH",
                url: format!("fake://{}", kind.item_endpoint(id)),
                status: 404,
                body: String::new(),
            });
        };
        let mut merged = serde_json::to_value(&*record).expect("fake serialize");
        if let (Some(target), Some(patch)) = (merged.as_object_mut(), body.as_object()) {
            for (key, value) in patch {
                target.insert(key.clone(), value.clone());
            }
        }
        *record = Record::from_value(merged).expect("fake update");
        Ok(record.clone())
    }

    fn remove(&self, kind: ResourceKind, id: i64) -> Result<(), ClientError> {
        self.calls.borrow_mut().push(Call::Remove(kind, id));
        self.check("remove", kind, Some(id))?;
        self.records
            .borrow_mut()
            .retain(|(k, r)| !(*k == kind && r.id == id));
        Ok(())
    }
}
