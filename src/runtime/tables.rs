use std::{collections::HashMap, rc::Rc};

use crate::runtime::error::{ResourceKind, Result, RuntimeError};

/// String and numeric constant tables of a loaded program.
///
/// Each table is replaced as a whole by its loader; there is no incremental
/// insertion.
#[derive(Debug, Default, Clone)]
pub struct ResourceTables {
    strings: HashMap<i64, Rc<str>>,
    constants: HashMap<i64, f64>,
}

impl ResourceTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the string table. Later duplicates of a key win.
    pub fn load_strings<I, S>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (i64, S)>,
        S: Into<Rc<str>>,
    {
        self.strings = entries.into_iter().map(|(k, v)| (k, v.into())).collect();
    }

    /// Replaces the constant table. Later duplicates of a key win.
    pub fn load_constants<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (i64, f64)>,
    {
        self.constants = entries.into_iter().collect();
    }

    pub fn get_string(&self, key: i64) -> Result<Rc<str>> {
        self.strings
            .get(&key)
            .cloned()
            .ok_or(RuntimeError::UndefinedResource {
                kind: ResourceKind::String,
                key,
            })
    }

    pub fn get_constant(&self, key: i64) -> Result<f64> {
        self.constants
            .get(&key)
            .copied()
            .ok_or(RuntimeError::UndefinedResource {
                kind: ResourceKind::Constant,
                key,
            })
    }

    pub fn string_count(&self) -> usize {
        self.strings.len()
    }

    pub fn constant_count(&self) -> usize {
        self.constants.len()
    }
}
