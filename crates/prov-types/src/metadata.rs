use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The open metadata mapping carried by every block.
///
/// `BTreeMap` keeps key order deterministic, which the canonical hash form
/// relies on.
pub type Metadata = BTreeMap<String, MetaValue>;

/// A scalar or string metadata value.
///
/// The mapping itself is open-ended; the value space is a closed set of
/// scalars so the on-disk encoding stays stable and comparable. Known
/// keys-of-convention (trust_score, price, buyer_id, …) are documented in
/// `prov_ledger::meta`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetaValue {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    /// A small list of strings, e.g. the changed-fields set of an UPDATED
    /// event.
    List(Vec<String>),
}

impl MetaValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for MetaValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for MetaValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for MetaValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<&str> for MetaValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Vec<String>> for MetaValue {
    fn from(v: Vec<String>) -> Self {
        Self::List(v)
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Str(v) => f.write_str(v),
            Self::List(v) => write!(f, "[{}]", v.join(", ")),
        }
    }
}
