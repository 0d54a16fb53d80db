//! Column layout and declared datatypes.
//!
//! Declared types are the four tokens allowed in the `datatype` column of a
//! specification table. Each maps to exactly one concrete value type:
//!
//! TEXT -> String, BOOLEAN -> bool, INTEGER -> i64, FLOAT -> f64

use crate::parse::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Text,
    Boolean,
    Integer,
    Float,
}

impl DataType {
    /// Map a declared datatype token to its concrete type.
    ///
    /// Tokens are matched exactly (upper case) after trimming; anything else
    /// is returned as the error so the caller can attach the spec location.
    pub fn from_declared(token: &str) -> Result<Self, String> {
        match token.trim() {
            "TEXT" => Ok(Self::Text),
            "BOOLEAN" => Ok(Self::Boolean),
            "INTEGER" => Ok(Self::Integer),
            "FLOAT" => Ok(Self::Float),
            other => Err(format!(
                "unknown datatype {:?} (expected TEXT, BOOLEAN, INTEGER or FLOAT)",
                other
            )),
        }
    }

    /// Convert one sliced field into a typed value.
    pub fn convert(self, raw: &str) -> Result<Value, String> {
        let s = raw.trim();
        match self {
            Self::Text => Ok(Value::Text(s.to_string())),
            Self::Boolean => parse_bool(s).map(Value::Boolean),
            Self::Integer => {
                if s.is_empty() {
                    return Err("blank field for INTEGER".to_string());
                }
                s.parse::<i64>()
                    .map(Value::Integer)
                    .map_err(|e| format!("cannot parse {:?} as INTEGER: {}", s, e))
            }
            Self::Float => {
                if s.is_empty() {
                    return Err("blank field for FLOAT".to_string());
                }
                let v = s
                    .parse::<f64>()
                    .map_err(|e| format!("cannot parse {:?} as FLOAT: {}", s, e))?;
                if !v.is_finite() {
                    return Err(format!("non-finite FLOAT {:?} has no JSON form", s));
                }
                Ok(Value::Float(v))
            }
        }
    }
}

fn parse_bool(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Ok(true),
        "false" | "f" | "no" | "n" | "0" => Ok(false),
        _ => Err(format!("cannot parse {:?} as BOOLEAN", s)),
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            Self::Text => "TEXT",
            Self::Boolean => "BOOLEAN",
            Self::Integer => "INTEGER",
            Self::Float => "FLOAT",
        };
        f.write_str(token)
    }
}

/// One column of a fixed-width layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub name: String,
    /// Width in characters, always > 0.
    pub width: usize,
    pub data_type: DataType,
}

/// Validated, ordered column layout for one dataset family.
#[derive(Debug, Clone, PartialEq)]
pub struct Specification {
    pub columns: Vec<ColumnSpec>,
}

impl Specification {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self { columns }
    }

    /// Expected character count of every data line.
    ///
    /// Saturates instead of overflowing; a saturated width matches no line.
    pub fn line_width(&self) -> usize {
        self.columns
            .iter()
            .fold(0usize, |acc, c| acc.saturating_add(c.width))
    }
}
