use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A scalar written into a single grid cell.
///
/// Deserialization is untagged: `null` becomes `Empty`, ISO-8601 strings
/// become temporal values, every other string stays text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
    Time(NaiveTime),
    String(String),
}

/// Which temporal family a value belongs to (drives automatic number formats).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalKind {
    DateTime,
    Date,
    Time,
}

impl CellValue {
    /// True for absent values and empty strings (skipped in fast mode).
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::String(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn temporal_kind(&self) -> Option<TemporalKind> {
        match self {
            Self::DateTime(_) => Some(TemporalKind::DateTime),
            Self::Date(_) => Some(TemporalKind::Date),
            Self::Time(_) => Some(TemporalKind::Time),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Excel serial number for temporal values (1900 date system).
    pub fn excel_serial(&self) -> Option<f64> {
        match self {
            Self::DateTime(dt) => Some(date_serial(dt.date()) + time_fraction(dt.time())),
            Self::Date(d) => Some(date_serial(*d)),
            Self::Time(t) => Some(time_fraction(*t)),
            _ => None,
        }
    }
}

/// Days since the 1899-12-30 epoch; dates after 1900-02-28 line up with
/// Excel's serials because the epoch absorbs the phantom 1900-02-29.
#[allow(clippy::cast_precision_loss)]
fn date_serial(date: NaiveDate) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or_default();
    (date - epoch).num_days() as f64
}

fn time_fraction(time: NaiveTime) -> f64 {
    use chrono::Timelike;
    let secs = f64::from(time.num_seconds_from_midnight());
    let nanos = f64::from(time.nanosecond()) / 1_000_000_000.0;
    (secs + nanos) / 86_400.0
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Self::Number(n) => write!(f, "{n}"),
            Self::DateTime(dt) => write!(f, "{dt}"),
            Self::Date(d) => write!(f, "{d}"),
            Self::Time(t) => write!(f, "{t}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<u32> for CellValue {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<i64> for CellValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        Self::DateTime(dt)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<NaiveTime> for CellValue {
    fn from(t: NaiveTime) -> Self {
        Self::Time(t)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Empty, Into::into)
    }
}

/// A table record: a tree of maps, lists and scalars.
///
/// Field paths (`a.b.c`, `a?.b`) navigate through `Map` keys and `List`
/// indices. JSON converts losslessly; temporal scalars are only produced by
/// Rust callers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
    Time(NaiveTime),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Build a map record from key/value pairs.
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Scalar view of this value; `None` for lists and maps.
    pub fn to_cell_value(&self) -> Option<CellValue> {
        Some(match self {
            Self::Null => CellValue::Empty,
            Self::Bool(b) => CellValue::Bool(*b),
            Self::Number(n) => CellValue::Number(*n),
            Self::String(s) => CellValue::String(s.clone()),
            Self::DateTime(dt) => CellValue::DateTime(*dt),
            Self::Date(d) => CellValue::Date(*d),
            Self::Time(t) => CellValue::Time(*t),
            Self::List(_) | Self::Map(_) => return None,
        })
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::DateTime(_) => "datetime",
            Self::Date(_) => "date",
            Self::Time(_) => "time",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n.as_f64().unwrap_or_default()),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => Self::List(items.into_iter().map(Into::into).collect()),
            serde_json::Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => serde_json::Number::from_f64(n).map_or(Self::Null, Self::Number),
            Value::String(s) => Self::String(s),
            Value::DateTime(dt) => Self::String(dt.to_string()),
            Value::Date(d) => Self::String(d.to_string()),
            Value::Time(t) => Self::String(t.to_string()),
            Value::List(items) => Self::Array(items.into_iter().map(Into::into).collect()),
            Value::Map(map) => Self::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Self::DateTime(dt)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<NaiveTime> for Value {
    fn from(t: NaiveTime) -> Self {
        Self::Time(t)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_excel_serials() {
        let d = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        assert_eq!(CellValue::Date(d).excel_serial(), Some(36526.0));

        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
        assert_eq!(CellValue::Time(noon).excel_serial(), Some(0.5));

        let dt = d.and_time(noon);
        assert_eq!(CellValue::DateTime(dt).excel_serial(), Some(36526.5));
        assert_eq!(CellValue::from("x").excel_serial(), None);
    }

    #[test]
    fn test_empty_detection() {
        assert!(CellValue::Empty.is_empty());
        assert!(CellValue::from("").is_empty());
        assert!(!CellValue::from(0).is_empty());
        assert!(!CellValue::from(false).is_empty());
    }

    #[test]
    fn test_untagged_cell_value_json() {
        let v: CellValue = serde_json::from_str("null").unwrap();
        assert_eq!(v, CellValue::Empty);
        let v: CellValue = serde_json::from_str("\"2024-07-04\"").unwrap();
        assert_eq!(v.temporal_kind(), Some(TemporalKind::Date));
        let v: CellValue = serde_json::from_str("\"hello\"").unwrap();
        assert_eq!(v, CellValue::from("hello"));
        let v: CellValue = serde_json::from_str("3").unwrap();
        assert_eq!(v, CellValue::Number(3.0));
    }

    #[test]
    fn test_record_from_json() {
        let json = serde_json::json!({"a": {"b": [1, "x", null]}});
        let value = Value::from(json);
        let Value::Map(map) = value else {
            panic!("expected map");
        };
        let Some(Value::Map(inner)) = map.get("a") else {
            panic!("expected nested map");
        };
        assert_eq!(
            inner.get("b"),
            Some(&Value::List(vec![
                Value::Number(1.0),
                Value::from("x"),
                Value::Null
            ]))
        );
    }
}
