use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};

/// Calling identifier as written in a compiled program.
///
/// The compiler emits numeric ids for instructions and symbolic ids for a
/// few well-known sites; both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawKey {
    Number(i64),
    Symbol(String),
}

impl RawKey {
    /// Key of the synthetic root site that owns the render entry point.
    pub const ROOT: RawKey = RawKey::Number(-1);
}

impl fmt::Display for RawKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawKey::Number(n) => write!(f, "{}", n),
            RawKey::Symbol(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for RawKey {
    fn from(value: i64) -> Self {
        RawKey::Number(value)
    }
}

impl From<i32> for RawKey {
    fn from(value: i32) -> Self {
        RawKey::Number(value.into())
    }
}

impl From<&str> for RawKey {
    fn from(value: &str) -> Self {
        RawKey::Symbol(value.to_string())
    }
}

/// Canonical handle for a calling identifier.
///
/// Equal raw keys always resolve to the same handle, so handles can be
/// compared and hashed without looking at the key again.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallId(u32);

impl CallId {
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// Registry that maps raw keys to canonical [`CallId`] handles.
#[derive(Debug, Default, Clone)]
pub struct Identifiers {
    index: HashMap<RawKey, CallId>,
    keys: Vec<RawKey>,
}

impl Identifiers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handle for `raw`, creating it on first use.
    pub fn resolve(&mut self, raw: &RawKey) -> CallId {
        if let Some(&id) = self.index.get(raw) {
            return id;
        }
        let index = self.keys.len();
        assert!(
            index <= u32::MAX as usize,
            "identifier registry overflow: cannot register more than {} keys",
            u32::MAX
        );
        let id = CallId(index as u32);
        self.keys.push(raw.clone());
        self.index.insert(raw.clone(), id);
        id
    }

    /// Returns the handle for `raw` without registering it.
    pub fn get(&self, raw: &RawKey) -> Option<CallId> {
        self.index.get(raw).copied()
    }

    pub fn raw(&self, id: CallId) -> Option<&RawKey> {
        self.keys.get(id.0 as usize)
    }

    /// Display form of the raw key behind `id`, used in `x-id` tags and logs.
    pub fn label(&self, id: CallId) -> String {
        match self.raw(id) {
            Some(raw) => raw.to_string(),
            None => format!("#{}", id.0),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
