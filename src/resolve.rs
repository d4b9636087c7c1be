//! Turning user-supplied references into concrete records.
//!
//! Single-target resolution fails fast on the first problem. Multi-target
//! resolution ([`Resolver::resolve_each`]) resolves every token on its own
//! and hands back one result per token, so a bad token never hides the
//! outcome for the others.
//!
//! A bare positional made only of digits is read as an id. A resource whose
//! name is literally digits can therefore only be addressed with `--name`.
use crate::api::{Filters, ResourceApi};
use crate::client::ClientError;
use crate::record::Record;
use crate::resource::{capitalized, ResourceKind};
use std::fmt;
use thiserror::Error;

/// How the user pointed at one resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reference {
    pub positional: Option<String>,
    pub id: Option<i64>,
    pub name: Option<String>,
}

impl Reference {
    pub fn id(id: i64) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }
}

#[cfg(test)]
impl Reference {
    pub fn positional(token: impl Into<String>) -> Self {
        Self {
            positional: Some(token.into()),
            ..Self::default()
        }
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// What a failed lookup was looking for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Id(i64),
    Name(String),
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookup::Id(id) => write!(f, "with ID {id}"),
            Lookup::Name(name) => write!(f, "'{name}'"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("No {kind} specified: give a name or ID, --id, or --name")]
    MissingReference { kind: ResourceKind },
    #[error("Cannot combine a positional {kind} with --name")]
    RedundantArgument { kind: ResourceKind },
    #[error("{} {lookup} not found", capitalized(.kind.label()))]
    NotFound { kind: ResourceKind, lookup: Lookup },
    #[error(
        "Multiple {} found with {} '{name}' ({count} matches)",
        .kind.plural(),
        .kind.name_field()
    )]
    AmbiguousName {
        kind: ResourceKind,
        name: String,
        count: u64,
    },
    #[error(
        "ID {id} and name '{expected}' refer to different {}: ID {id} is '{found}', not '{expected}'",
        .kind.plural()
    )]
    CrossReferenceMismatch {
        kind: ResourceKind,
        id: i64,
        found: String,
        expected: String,
    },
    #[error(transparent)]
    Upstream(#[from] ClientError),
}

/// Resolves references of one kind against one service.
pub struct Resolver<'a, A: ResourceApi + ?Sized> {
    api: &'a A,
    kind: ResourceKind,
    full_record: bool,
}

impl<'a, A: ResourceApi + ?Sized> Resolver<'a, A> {
    pub fn new(api: &'a A, kind: ResourceKind) -> Self {
        Self {
            api,
            kind,
            full_record: kind.list_rows_are_partial(),
        }
    }

    /// Re-fetch name matches by id so the caller sees the full record.
    pub fn full_record(mut self, enabled: bool) -> Self {
        self.full_record = enabled;
        self
    }

    /// Resolve one reference, failing fast.
    pub fn resolve(&self, reference: &Reference) -> Result<Record, ResolveError> {
        let kind = self.kind;
        match (
            reference.positional.as_deref(),
            reference.id,
            reference.name.as_deref(),
        ) {
            (None, None, None) => Err(ResolveError::MissingReference { kind }),
            (Some(_), _, Some(_)) => Err(ResolveError::RedundantArgument { kind }),
            (Some(expected), Some(id), None) | (None, Some(id), Some(expected)) => {
                self.fetch_checked(id, expected)
            }
            (None, Some(id), None) => self.fetch_by_id(id),
            (None, None, Some(name)) => self.lookup_name(name),
            (Some(token), None, None) => match numeric_id(token) {
                Some(id) => self.fetch_by_id(id),
                None => self.lookup_name(token),
            },
        }
    }

    /// Resolve a relationship argument to an id.
    ///
    /// Digits are taken as the id without a request; anything else is an
    /// exact-name lookup with the usual cardinality rules.
    pub fn resolve_id(&self, token: &str) -> Result<i64, ResolveError> {
        match numeric_id(token) {
            Some(id) => Ok(id),
            None => self.match_name(token).map(|record| record.id),
        }
    }

    /// Resolve each token independently.
    ///
    /// A unique exact-name match wins; otherwise a numeric token is fetched by
    /// id. Failures are returned per token and never stop the loop.
    pub fn resolve_each<'t>(
        &self,
        tokens: &'t [String],
    ) -> Vec<(&'t str, Result<Record, ResolveError>)> {
        tokens
            .iter()
            .map(|token| (token.as_str(), self.resolve_token(token)))
            .collect()
    }

    fn resolve_token(&self, token: &str) -> Result<Record, ResolveError> {
        let page = self.api.list(self.kind, &self.name_filter(token))?;
        if let Some(record) = page.single() {
            return self.complete(record.clone());
        }
        if let Some(id) = numeric_id(token) {
            return self.fetch_by_id(id);
        }
        Err(self.cardinality_error(token, page.count))
    }

    fn fetch_checked(&self, id: i64, expected: &str) -> Result<Record, ResolveError> {
        let record = self.fetch_by_id(id)?;
        let found = record.display_name(self.kind).unwrap_or_default();
        if found != expected {
            return Err(ResolveError::CrossReferenceMismatch {
                kind: self.kind,
                id,
                found: found.to_string(),
                expected: expected.to_string(),
            });
        }
        Ok(record)
    }

    fn fetch_by_id(&self, id: i64) -> Result<Record, ResolveError> {
        self.api
            .fetch(self.kind, id)?
            .ok_or(ResolveError::NotFound {
                kind: self.kind,
                lookup: Lookup::Id(id),
            })
    }

    fn lookup_name(&self, name: &str) -> Result<Record, ResolveError> {
        let record = self.match_name(name)?;
        self.complete(record)
    }

    /// Exact-name list lookup without the follow-up fetch.
    fn match_name(&self, name: &str) -> Result<Record, ResolveError> {
        let page = self.api.list(self.kind, &self.name_filter(name))?;
        match page.single() {
            Some(record) => Ok(record.clone()),
            None => Err(self.cardinality_error(name, page.count)),
        }
    }

    fn complete(&self, record: Record) -> Result<Record, ResolveError> {
        if self.full_record {
            self.fetch_by_id(record.id)
        } else {
            Ok(record)
        }
    }

    fn name_filter(&self, name: &str) -> Filters {
        Filters::new().with(self.kind.name_field(), name)
    }

    fn cardinality_error(&self, name: &str, count: u64) -> ResolveError {
        if count > 1 {
            ResolveError::AmbiguousName {
                kind: self.kind,
                name: name.to_string(),
                count,
            }
        } else {
            ResolveError::NotFound {
                kind: self.kind,
                lookup: Lookup::Name(name.to_string()),
            }
        }
    }
}

/// A token made only of ASCII digits, read as an id.
pub fn numeric_id(token: &str) -> Option<i64> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod tests;
