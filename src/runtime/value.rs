use std::{fmt, rc::Rc};

use crate::runtime::error::{Result, RuntimeError};

/// Largest magnitude a number may have on the operand stack (2^53 - 1).
///
/// Every integer up to this bound is exactly representable as an `f64`, so
/// arithmetic on stack values never silently loses integer precision.
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Scalar value held by the operand stack.
///
/// Numbers are finite `f64` values bounded by [`MAX_SAFE_INTEGER`]; the bound
/// is checked when a value is pushed, not when it is constructed, so
/// arithmetic results and host-provided numbers are validated at one place.
#[derive(Debug, Clone, PartialEq)]
pub enum StackValue {
    /// Finite number within the exact-integer range.
    Number(f64),
    /// UTF-8 text.
    Text(Rc<str>),
}

impl StackValue {
    /// Builds a validated number.
    pub fn number(value: f64) -> Result<Self> {
        let value = StackValue::Number(value);
        value.validate()?;
        Ok(value)
    }

    pub fn text(value: impl Into<Rc<str>>) -> Self {
        StackValue::Text(value.into())
    }

    /// Checks that the value may live on the operand stack.
    pub fn validate(&self) -> Result<()> {
        match self {
            StackValue::Text(_) => Ok(()),
            StackValue::Number(n) if n.is_finite() && n.abs() <= MAX_SAFE_INTEGER => Ok(()),
            StackValue::Number(n) => Err(RuntimeError::InvalidStackValue {
                value: n.to_string(),
            }),
        }
    }

    /// Returns the runtime type label used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            StackValue::Number(_) => "Number",
            StackValue::Text(_) => "Text",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            StackValue::Number(n) => Some(*n),
            StackValue::Text(_) => None,
        }
    }

    /// Branch truth: only the number `1` is true.
    pub fn is_true(&self) -> bool {
        matches!(self, StackValue::Number(n) if *n == 1.0)
    }

    /// Converts the value to the text inserted into the output tree.
    ///
    /// Unlike [`fmt::Display`], text is returned without quotes.
    pub fn to_text(&self) -> String {
        match self {
            StackValue::Number(n) => format_number(*n),
            StackValue::Text(s) => s.to_string(),
        }
    }
}

impl fmt::Display for StackValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackValue::Number(n) => write!(f, "{}", format_number(*n)),
            StackValue::Text(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl From<&str> for StackValue {
    fn from(value: &str) -> Self {
        StackValue::Text(value.into())
    }
}

impl From<String> for StackValue {
    fn from(value: String) -> Self {
        StackValue::Text(value.into())
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
