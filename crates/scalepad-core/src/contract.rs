//! Response contract checks.
//!
//! A [`ContractCheck`] validates a parsed JSON body against the shape a caller
//! expects. The client runs one check per successful response and turns a
//! failure into [`ApiError::ResponseValidation`], which is never retried.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, Result};

/// One reason a value failed its contract. `path` is empty for the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractIssue {
    pub path: String,
    pub message: String,
}

impl ContractIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    fn nested(self, prefix: &str) -> Self {
        let path = if self.path.is_empty() {
            prefix.to_string()
        } else {
            format!("{}.{}", prefix, self.path)
        };
        Self { path, ..self }
    }
}

pub trait ContractCheck: Send + Sync {
    fn check(&self, value: &Value) -> std::result::Result<(), Vec<ContractIssue>>;
}

impl<C: ContractCheck + ?Sized> ContractCheck for Arc<C> {
    fn check(&self, value: &Value) -> std::result::Result<(), Vec<ContractIssue>> {
        (**self).check(value)
    }
}

/// Accepts any value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unchecked;

impl ContractCheck for Unchecked {
    fn check(&self, _value: &Value) -> std::result::Result<(), Vec<ContractIssue>> {
        Ok(())
    }
}

/// Value must deserialize into `T`.
pub struct Shape<T>(PhantomData<fn() -> T>);

impl<T> Shape<T> {
    pub fn new() -> Self {
        Shape(PhantomData)
    }
}

impl<T> Default for Shape<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned> ContractCheck for Shape<T> {
    fn check(&self, value: &Value) -> std::result::Result<(), Vec<ContractIssue>> {
        T::deserialize(value)
            .map(drop)
            .map_err(|e| vec![ContractIssue::new("", e.to_string())])
    }
}

/// Paginated envelope: `{data: [item...], total_count: u64, next_cursor?: string|null}`,
/// with every element of `data` checked by `item`.
pub struct Envelope<C> {
    item: C,
}

impl<C: ContractCheck> Envelope<C> {
    pub fn new(item: C) -> Self {
        Self { item }
    }
}

impl<C: ContractCheck> ContractCheck for Envelope<C> {
    fn check(&self, value: &Value) -> std::result::Result<(), Vec<ContractIssue>> {
        let Some(obj) = value.as_object() else {
            return Err(vec![ContractIssue::new("", "expected an object")]);
        };
        let mut issues = Vec::new();

        match obj.get("data") {
            Some(Value::Array(items)) => {
                for (i, item) in items.iter().enumerate() {
                    if let Err(found) = self.item.check(item) {
                        let prefix = format!("data[{}]", i);
                        issues.extend(found.into_iter().map(|issue| issue.nested(&prefix)));
                    }
                }
            }
            Some(_) => issues.push(ContractIssue::new("data", "expected an array")),
            None => issues.push(ContractIssue::new("data", "required")),
        }

        match obj.get("total_count") {
            Some(n) if n.as_u64().is_some() => {}
            Some(_) => issues.push(ContractIssue::new(
                "total_count",
                "expected a non-negative integer",
            )),
            None => issues.push(ContractIssue::new("total_count", "required")),
        }

        match obj.get("next_cursor") {
            None | Some(Value::Null) | Some(Value::String(_)) => {}
            Some(_) => issues.push(ContractIssue::new(
                "next_cursor",
                "expected a string or null",
            )),
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}

/// Runs `check` once and maps failure into the error taxonomy.
pub(crate) fn enforce(check: &dyn ContractCheck, value: &Value) -> Result<()> {
    check.check(value).map_err(|issues| {
        tracing::error!(issues = issues.len(), "response failed contract check");
        ApiError::ResponseValidation {
            message: "invalid response format".to_string(),
            issues,
        }
    })
}

/// Deserializes an already-checked value, reporting mismatches as validation errors.
pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| ApiError::ResponseValidation {
        message: "response does not match the expected type".to_string(),
        issues: vec![ContractIssue::new("", e.to_string())],
    })
}
