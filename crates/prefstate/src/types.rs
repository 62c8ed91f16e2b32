use crate::converge;
use crate::error::Result;
use crate::path::EntryPath;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A typed document value — the closed set of leaf and container kinds a
/// preference document can hold.
///
/// `Value` is externally tagged: the JSON form is a single-key object whose
/// key names the kind. This keeps the type tag on disk, so an integer and a
/// real that happen to be numerically equal stay distinguishable across a
/// round trip.
///
/// # JSON shape
///
/// ```json
/// { "Dict": { "AppleFirstWeekday": { "Dict": { "gregorian": { "Int": 4 } } } } }
/// ```
///
/// # Equality is type-aware
///
/// Two values are equal only if their kinds match *and* their payloads
/// compare equal under that kind: numeric for `Int`/`Real`, byte-exact for
/// `String`/`Data`, structural for `Dict`/`Array`. There is no cross-kind
/// fallback — `Int(4)` is never equal to `Real(4.0)`, because the on-disk
/// formats this models treat them as distinct. `Real(NAN)` never compares
/// equal to anything, itself included, so a declared NaN always re-converges.
///
/// ```
/// use prefstate::v1::Value;
///
/// assert_eq!(Value::Int(4), Value::Int(4));
/// assert_ne!(Value::Int(4), Value::Real(4.0));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Int(i64),
    Real(f64),
    Bool(bool),
    String(String),
    /// Timestamp, serialized as RFC 3339.
    Date(DateTime<Utc>),
    /// Raw bytes.
    Data(Vec<u8>),
    /// Ordered string-keyed mapping.
    Dict(BTreeMap<String, Value>),
    Array(Vec<Value>),
}

/// The kind tag of a [`Value`], without its payload.
///
/// Used in error messages and when parsing external tool output against an
/// expected type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    Int,
    Real,
    Bool,
    String,
    Date,
    Data,
    Dict,
    Array,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Int => "Int",
            Kind::Real => "Real",
            Kind::Bool => "Bool",
            Kind::String => "String",
            Kind::Date => "Date",
            Kind::Data => "Data",
            Kind::Dict => "Dict",
            Kind::Array => "Array",
        };
        write!(f, "{}", name)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Real(a), Value::Real(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Data(a), Value::Data(b)) => a == b,
            (Value::Dict(a), Value::Dict(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    /// The kind tag of this value.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Int(_) => Kind::Int,
            Value::Real(_) => Kind::Real,
            Value::Bool(_) => Kind::Bool,
            Value::String(_) => Kind::String,
            Value::Date(_) => Kind::Date,
            Value::Data(_) => Kind::Data,
            Value::Dict(_) => Kind::Dict,
            Value::Array(_) => Kind::Array,
        }
    }

    /// True for `Dict` and `Array` — the kinds a path can descend into.
    pub fn is_container(&self) -> bool {
        matches!(self, Value::Dict(_) | Value::Array(_))
    }

    /// Create a `String` value.
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Create a `Data` value.
    pub fn data(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Data(bytes.into())
    }

    /// Create a `Dict` value from key/value pairs.
    ///
    /// ```
    /// use prefstate::v1::Value;
    ///
    /// let v = Value::dict([("gregorian", Value::Int(4))]);
    /// assert_eq!(v.kind().to_string(), "Dict");
    /// ```
    pub fn dict<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Dict(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v))
                .collect(),
        )
    }

    /// Create an `Array` value.
    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Array(items.into_iter().collect())
    }
}

// ============================================================================
// Document
// ============================================================================

/// An in-memory preference document: a tree of [`Value`] nodes rooted at a
/// single top-level dictionary.
///
/// Documents are either constructed empty or decoded from on-disk bytes by a
/// codec (see `prefstate-store`). A convergence pass takes the document by
/// `&mut`, so exactly one writer holds it between load and save; nothing can
/// observe a partially-mutated tree.
///
/// # JSON shape
///
/// The root dictionary serializes transparently — no wrapper object:
///
/// ```json
/// { "AppleFirstWeekday": { "Dict": { "gregorian": { "Int": 4 } } } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    pub root: BTreeMap<String, Value>,
}

impl Document {
    /// Create an empty document (a bare root dictionary).
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a document from its JSON form.
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// True if the root dictionary has no entries.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Read-only lookup of the value at `path`.
    ///
    /// Returns `Ok(None)` when the leaf is absent — a missing dictionary
    /// key along the way, or an index past the end of the final array.
    /// Structural problems — descending into a scalar, an index applied to
    /// a dictionary, an out-of-bounds index on an intermediate array — are
    /// errors. Never creates anything.
    pub fn get(&self, path: &EntryPath) -> Result<Option<&Value>> {
        converge::lookup(self, path)
    }

    /// Make the leaf at `path` hold `desired`, creating missing intermediate
    /// dictionaries. See [`crate::v1::converge::converge`] for the full
    /// contract.
    pub fn converge(&mut self, path: &EntryPath, desired: Value) -> Result<Outcome> {
        converge::converge(self, path, desired)
    }

    /// Remove the leaf at `path`, if present. See
    /// [`crate::v1::converge::delete`].
    pub fn delete(&mut self, path: &EntryPath) -> Result<Outcome> {
        converge::delete(self, path)
    }
}

// ============================================================================
// Outcome
// ============================================================================

/// The result of one convergence (or delete) pass.
///
/// `changed` reports whether the document was mutated; `prior` holds the
/// value the leaf had before the pass (`None` = the leaf was absent).
/// Callers use `changed` to decide whether a write-back is needed and
/// `prior` for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub changed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior: Option<Value>,
}

impl Outcome {
    /// An outcome reporting no mutation.
    pub fn unchanged(prior: Option<Value>) -> Self {
        Self {
            changed: false,
            prior,
        }
    }

    /// An outcome reporting a mutation.
    pub fn changed(prior: Option<Value>) -> Self {
        Self {
            changed: true,
            prior,
        }
    }
}
