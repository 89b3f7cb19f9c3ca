//! Client-side resource records and the cached list.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// One server-side record as received: an opaque key/value object.
pub type Resource = Map<String, Value>;

/// A record after field normalization: every canonical field is present.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NormalizedResource(Map<String, Value>);

impl NormalizedResource {
    pub(crate) fn from_canonical(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Text value of a canonical field; `None` for non-string values.
    pub fn str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// Numeric value of a canonical field. Numeric strings are accepted,
    /// since some endpoints send ids as text.
    pub fn i64(&self, field: &str) -> Option<i64> {
        self.0.get(field).and_then(number_like).and_then(|n| {
            if n.fract() == 0.0 {
                Some(n as i64)
            } else {
                None
            }
        })
    }

    pub fn f64(&self, field: &str) -> Option<f64> {
        self.0.get(field).and_then(number_like)
    }

    pub fn flag(&self, field: &str) -> bool {
        self.0.get(field).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Back to a plain [`Resource`] (canonical keys).
    pub fn into_raw(self) -> Resource {
        self.0
    }
}

fn number_like(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Loose equality used by client-side filters: `5`, `5.0` and `"5"` match.
fn loosely_equal(a: &Value, b: &Value) -> bool {
    match (number_like(a), number_like(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// The client-side cache of one resource type, in server order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResourceList(Vec<NormalizedResource>);

impl ResourceList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NormalizedResource> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[NormalizedResource] {
        &self.0
    }

    /// Records whose `field` loosely equals `value` (the product page's
    /// "products of store N" view).
    pub fn filter_eq(&self, field: &str, value: &Value) -> ResourceList {
        self.0
            .iter()
            .filter(|r| r.get(field).is_some_and(|v| loosely_equal(v, value)))
            .cloned()
            .collect()
    }

    /// First record whose `field` loosely equals `value`.
    pub fn find(&self, field: &str, value: &Value) -> Option<&NormalizedResource> {
        self.0
            .iter()
            .find(|r| r.get(field).is_some_and(|v| loosely_equal(v, value)))
    }

    /// Sum of a numeric field; non-numeric values count as zero.
    pub fn sum(&self, field: &str) -> f64 {
        self.0.iter().filter_map(|r| r.f64(field)).sum()
    }
}

impl FromIterator<NormalizedResource> for ResourceList {
    fn from_iter<I: IntoIterator<Item = NormalizedResource>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ResourceList {
    type Item = NormalizedResource;
    type IntoIter = std::vec::IntoIter<NormalizedResource>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResourceList {
    type Item = &'a NormalizedResource;
    type IntoIter = std::slice::Iter<'a, NormalizedResource>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The request a controller is about to issue or just issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", content = "id", rename_all = "snake_case")]
pub enum PendingOperation {
    List,
    Get(String),
    Create,
    Update(String),
    Delete(String),
}

impl PendingOperation {
    pub fn name(&self) -> &'static str {
        match self {
            PendingOperation::List => "list",
            PendingOperation::Get(_) => "get",
            PendingOperation::Create => "create",
            PendingOperation::Update(_) => "update",
            PendingOperation::Delete(_) => "delete",
        }
    }
}

impl fmt::Display for PendingOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PendingOperation::Get(id)
            | PendingOperation::Update(id)
            | PendingOperation::Delete(id) => {
                write!(f, "{} #{id}", self.name())
            }
            _ => f.write_str(self.name()),
        }
    }
}
