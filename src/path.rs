//! Field paths for pulling values out of table records.
//!
//! Segments are separated by `.`; a `?.` separator short-circuits to an
//! absent value when the segment before it resolves to null:
//!
//! - `a.b.c` against `{"a": {"b": {"c": 1}}}` yields `1`
//! - `a?.b` against `{"a": null}` yields null without failing
//! - `items.0.name` indexes into lists
//!
//! Missing keys in the middle of a path read as null; a missing final key,
//! or reading through null with a plain `.`, is an error.

use std::fmt;

use crate::error::{Result, SheetboxError};
use crate::types::Value;

static NULL: Value = Value::Null;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    key: String,
    /// The separator after this segment was `?.`
    safe: bool,
}

/// A parsed field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    steps: Vec<Step>,
}

impl FieldPath {
    pub fn parse(raw: &str) -> Self {
        let mut steps = Vec::new();
        let mut key = String::new();
        let mut chars = raw.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                '?' if chars.peek() == Some(&'.') => {
                    chars.next();
                    steps.push(Step {
                        key: std::mem::take(&mut key),
                        safe: true,
                    });
                }
                '.' => steps.push(Step {
                    key: std::mem::take(&mut key),
                    safe: false,
                }),
                _ => key.push(ch),
            }
        }
        steps.push(Step { key, safe: false });
        Self {
            raw: raw.to_string(),
            steps,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Resolve against a record.
    pub fn resolve<'a>(&self, record: &'a Value) -> Result<&'a Value> {
        let mut current = record;
        let last = self.steps.len().saturating_sub(1);
        for (i, step) in self.steps.iter().enumerate() {
            let is_last = i == last;
            current = self.step_into(current, &step.key, is_last)?;
            if !is_last && step.safe && current.is_null() {
                return Ok(&NULL);
            }
        }
        Ok(current)
    }

    fn step_into<'a>(&self, current: &'a Value, key: &str, is_last: bool) -> Result<&'a Value> {
        match current {
            Value::Map(map) => match map.get(key) {
                Some(v) => Ok(v),
                None if !is_last => Ok(&NULL),
                None => Err(self.error(format!("no field `{key}`"))),
            },
            Value::List(items) => key
                .parse::<usize>()
                .ok()
                .and_then(|idx| items.get(idx))
                .ok_or_else(|| {
                    self.error(format!("no element `{key}` in list of {}", items.len()))
                }),
            other => Err(self.error(format!("cannot read `{key}` of {}", other.kind_name()))),
        }
    }

    fn error(&self, reason: String) -> SheetboxError {
        SheetboxError::FieldPath {
            path: self.raw.clone(),
            reason,
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for FieldPath {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}
