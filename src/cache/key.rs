//! Cache key derivation using SHA-256 fingerprints

use std::collections::BTreeMap;
use std::fmt;

use sha2::{Digest, Sha256};

/// Whether a query result may be stored and reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cacheability {
    /// Result may be served from and written to the cache.
    Cacheable,
    /// Result must always come from the network and is never stored.
    Bypass,
}

/// A primitive query parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl ParamValue {
    fn tag(&self) -> u8 {
        match self {
            ParamValue::Str(_) => b's',
            ParamValue::Int(_) => b'i',
            ParamValue::Bool(_) => b'b',
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Str(s) => f.write_str(s),
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Str(value.clone())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

/// Identity of a read query: a namespace plus a flat set of primitive params.
///
/// Params are kept sorted by name, so the order in which they are added never
/// changes the fingerprint. Blank strings and `None` are both treated as
/// "absent" and leave no trace in the key; callers are expected to fill in
/// their defaults before building the key so that an omitted value and its
/// default produce the same fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryKey {
    namespace: &'static str,
    params: BTreeMap<&'static str, ParamValue>,
    cacheability: Cacheability,
}

impl QueryKey {
    /// Start a key for the given namespace (e.g. `"listings"`).
    pub fn new(namespace: &'static str) -> Self {
        Self {
            namespace,
            params: BTreeMap::new(),
            cacheability: Cacheability::Cacheable,
        }
    }

    /// Key for a single identifier within a namespace.
    pub fn scalar(namespace: &'static str, id: impl Into<ParamValue>) -> Self {
        Self::new(namespace).param("id", id)
    }

    /// Add a parameter. Blank string values are dropped.
    pub fn param(mut self, name: &'static str, value: impl Into<ParamValue>) -> Self {
        match value.into() {
            ParamValue::Str(s) if s.trim().is_empty() => {
                self.params.remove(name);
            }
            ParamValue::Str(s) => {
                self.params.insert(name, ParamValue::Str(s.trim().to_string()));
            }
            other => {
                self.params.insert(name, other);
            }
        }
        self
    }

    /// Add a parameter only when it is present.
    pub fn opt_param<V: Into<ParamValue>>(self, name: &'static str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.param(name, v),
            None => self,
        }
    }

    /// Mark this query as never cacheable.
    pub fn no_cache(mut self) -> Self {
        self.cacheability = Cacheability::Bypass;
        self
    }

    pub fn namespace(&self) -> &'static str {
        self.namespace
    }

    pub fn cacheability(&self) -> Cacheability {
        self.cacheability
    }

    pub fn is_cacheable(&self) -> bool {
        self.cacheability == Cacheability::Cacheable
    }

    /// Look up a parameter value.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    /// Parameters as `(name, value)` pairs in key order, for building URLs.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        self.params
            .iter()
            .map(|(k, v)| (*k, v.to_string()))
            .collect()
    }

    /// Deterministic `namespace:hex` string identifying this query.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();

        for (name, value) in &self.params {
            // Length prefixes keep "a=bc" and "ab=c" apart
            hasher.update((name.len() as u64).to_le_bytes());
            hasher.update(name.as_bytes());
            hasher.update([value.tag()]);
            let encoded = value.to_string();
            hasher.update((encoded.len() as u64).to_le_bytes());
            hasher.update(encoded.as_bytes());
        }

        format!("{}:{:x}", self.namespace, hasher.finalize())
    }
}
