use std::{
    collections::{HashMap, HashSet},
    fmt, fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    bytecode::instruction::{Instruction, ValueRef},
    runtime::section::MAIN_SECTION,
};

/// Section definition as stored in a program file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionDef {
    pub label: String,
    pub renderable: bool,
    #[serde(default)]
    pub body: Vec<Instruction>,
}

/// Compiled program: resource tables plus code sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    #[serde(default)]
    pub unsafe_mode: bool,
    #[serde(default)]
    pub strings: Vec<(i64, String)>,
    #[serde(default)]
    pub constants: Vec<(i64, f64)>,
    #[serde(default)]
    pub sections: Vec<SectionDef>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed program: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no `main` code section found in the program")]
    MissingMain,
}

/// Non-fatal finding of [`Program::validate`]. Each one would fail at
/// runtime only if the offending instruction executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgramWarning {
    UndefinedSection { from: String, label: String },
    UndefinedString { from: String, key: i64 },
    UndefinedConstant { from: String, key: i64 },
    DuplicateSection { label: String },
}

impl fmt::Display for ProgramWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramWarning::UndefinedSection { from, label } => {
                write!(f, "section `{}` references undefined section `{}`", from, label)
            }
            ProgramWarning::UndefinedString { from, key } => {
                write!(f, "section `{}` references undefined string {}", from, key)
            }
            ProgramWarning::UndefinedConstant { from, key } => {
                write!(f, "section `{}` references undefined constant {}", from, key)
            }
            ProgramWarning::DuplicateSection { label } => {
                write!(f, "section `{}` is defined more than once", label)
            }
        }
    }
}

impl Program {
    pub fn from_json(source: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let source = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&source)
    }

    pub fn to_json(&self) -> Result<String, LoadError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Last definition of `label`, matching the runtime's redefinition rule.
    pub fn section(&self, label: &str) -> Option<&SectionDef> {
        self.sections.iter().rev().find(|s| s.label == label)
    }

    /// Checks the program statically.
    ///
    /// A missing `main` section is an error; dangling references are
    /// reported as warnings since they only fail if reached.
    pub fn validate(&self) -> Result<Vec<ProgramWarning>, LoadError> {
        if self.section(MAIN_SECTION).is_none() {
            return Err(LoadError::MissingMain);
        }

        let strings: HashSet<i64> = self.strings.iter().map(|(k, _)| *k).collect();
        let constants: HashSet<i64> = self.constants.iter().map(|(k, _)| *k).collect();
        let mut definitions: HashMap<&str, usize> = HashMap::new();
        for section in &self.sections {
            *definitions.entry(section.label.as_str()).or_default() += 1;
        }

        let mut warnings = Vec::new();
        let mut reported = HashSet::new();
        for section in &self.sections {
            if definitions[section.label.as_str()] > 1 && reported.insert(section.label.as_str()) {
                warnings.push(ProgramWarning::DuplicateSection {
                    label: section.label.clone(),
                });
            }
            let check = ReferenceCheck {
                from: &section.label,
                sections: &definitions,
                strings: &strings,
                constants: &constants,
            };
            check.walk(&section.body, &mut warnings);
        }
        Ok(warnings)
    }
}

struct ReferenceCheck<'a> {
    from: &'a str,
    sections: &'a HashMap<&'a str, usize>,
    strings: &'a HashSet<i64>,
    constants: &'a HashSet<i64>,
}

impl ReferenceCheck<'_> {
    fn walk(&self, body: &[Instruction], warnings: &mut Vec<ProgramWarning>) {
        for instruction in body {
            match instruction {
                Instruction::Call { label, .. } | Instruction::Listen { handler: label, .. } => {
                    if !self.sections.contains_key(label.as_str()) {
                        warnings.push(ProgramWarning::UndefinedSection {
                            from: self.from.to_string(),
                            label: label.clone(),
                        });
                    }
                }
                Instruction::Push { value, .. } | Instruction::Value { value, .. } => {
                    self.check_value(*value, warnings);
                }
                _ => {}
            }
            if let Some(body) = instruction.body() {
                self.walk(body, warnings);
            }
        }
    }

    fn check_value(&self, value: ValueRef, warnings: &mut Vec<ProgramWarning>) {
        match value {
            ValueRef::String(key) if !self.strings.contains(&key) => {
                warnings.push(ProgramWarning::UndefinedString {
                    from: self.from.to_string(),
                    key,
                });
            }
            ValueRef::Constant(key) if !self.constants.contains(&key) => {
                warnings.push(ProgramWarning::UndefinedConstant {
                    from: self.from.to_string(),
                    key,
                });
            }
            _ => {}
        }
    }
}
