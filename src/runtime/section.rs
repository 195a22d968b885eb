use std::{collections::HashMap, rc::Rc};

use crate::{
    bytecode::Instruction,
    runtime::error::{Result, RuntimeError},
};

/// Label of the section the render pass starts from.
pub const MAIN_SECTION: &str = "main";
/// Label of the optional section run once before the first render.
pub const INIT_SECTION: &str = "init";

/// Label of the synthetic section owning the root render frame.
const ROOT_SECTION: &str = "#root";

/// Named, executable unit of a program.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeSection {
    pub label: Rc<str>,
    /// Whether executing the section produces output nodes.
    pub renderable: bool,
    /// `None` only for the synthetic root section.
    pub body: Option<Rc<[Instruction]>>,
}

impl CodeSection {
    pub fn new(label: impl Into<Rc<str>>, renderable: bool, body: Vec<Instruction>) -> Self {
        Self {
            label: label.into(),
            renderable,
            body: Some(body.into()),
        }
    }

    /// The renderable, bodiless section bound to the root render frame.
    pub fn root() -> Self {
        Self {
            label: ROOT_SECTION.into(),
            renderable: true,
            body: None,
        }
    }

    pub fn is_root(&self) -> bool {
        self.body.is_none()
    }
}

/// Label-indexed set of code sections.
#[derive(Debug, Default)]
pub struct SectionTable {
    sections: HashMap<Rc<str>, Rc<CodeSection>>,
}

impl SectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `section`, returning the definition it replaced, if any.
    pub fn define(&mut self, section: CodeSection) -> Option<Rc<CodeSection>> {
        self.sections
            .insert(section.label.clone(), Rc::new(section))
    }

    pub fn lookup(&self, label: &str) -> Result<Rc<CodeSection>> {
        self.sections
            .get(label)
            .cloned()
            .ok_or_else(|| RuntimeError::UndefinedSection {
                label: label.to_string(),
            })
    }

    pub fn contains(&self, label: &str) -> bool {
        self.sections.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}
