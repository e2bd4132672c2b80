//! 單一純量值與傳輸形式之間的轉換規則，序列化與反序列化共用。

use crate::domain::schema::{EntityKind, FieldDescriptor, FieldType};
use crate::domain::value::FieldValue;
use crate::utils::error::{CodecError, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M:%S";
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemporalFormats {
    pub datetime: String,
    pub date: String,
    pub time: String,
}

impl Default for TemporalFormats {
    fn default() -> Self {
        Self {
            datetime: DEFAULT_DATETIME_FORMAT.to_string(),
            date: DEFAULT_DATE_FORMAT.to_string(),
            time: DEFAULT_TIME_FORMAT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValuePolicy {
    formats: TemporalFormats,
}

impl ValuePolicy {
    pub fn new(formats: TemporalFormats) -> Self {
        Self { formats }
    }

    pub fn formats(&self) -> &TemporalFormats {
        &self.formats
    }

    /// 純量 → 傳輸形式。外鍵只留下 key。
    pub fn encode(&self, field: &str, value: &FieldValue) -> Result<Value> {
        let encoded = match value {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Int(n) => Value::Number((*n).into()),
            FieldValue::Float(f) => match Number::from_f64(*f) {
                Some(n) => Value::Number(n),
                None => {
                    return Err(CodecError::UnsupportedValueKind {
                        field: field.to_string(),
                        kind: format!("non-finite float ({})", f),
                    })
                }
            },
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::DateTime(dt) => {
                Value::String(render(&dt.format(&self.formats.datetime), &self.formats.datetime)?)
            }
            FieldValue::Date(d) => Value::String(render(&d.format(&self.formats.date), &self.formats.date)?),
            FieldValue::Time(t) => Value::String(render(&t.format(&self.formats.time), &self.formats.time)?),
            FieldValue::Ref(_, key) => Value::Number((*key).into()),
        };
        Ok(encoded)
    }

    /// 傳輸形式 → 純量，依欄位宣告的型別還原
    pub fn decode(&self, kind: EntityKind, desc: &FieldDescriptor, value: &Value) -> Result<FieldValue> {
        let mismatch = |reason: String| CodecError::schema_mismatch(kind.name(), desc.name, reason);

        match value {
            Value::Null if desc.nullable => return Ok(FieldValue::Null),
            Value::Null => return Err(mismatch("null supplied for a non-nullable field".to_string())),
            Value::Object(_) => return Err(mismatch(format!("mapping supplied for {} field", desc.ty.describe()))),
            Value::Array(_) => return Err(mismatch(format!("sequence supplied for {} field", desc.ty.describe()))),
            _ => {}
        }

        let decoded = match (desc.ty, value) {
            (FieldType::Text, Value::String(s)) => FieldValue::Text(s.clone()),
            (FieldType::Integer | FieldType::BigInteger, Value::Number(n)) => match n.as_i64() {
                Some(n) => FieldValue::Int(n),
                None => return Err(mismatch(format!("{} is not a 64-bit integer", n))),
            },
            (FieldType::Boolean, Value::Bool(b)) => FieldValue::Bool(*b),
            (FieldType::DateTime, Value::String(s)) => {
                FieldValue::DateTime(self.parse_datetime(desc.name, s)?)
            }
            (FieldType::Date, Value::String(s)) => FieldValue::Date(self.parse_date(desc.name, s)?),
            (FieldType::Time, Value::String(s)) => FieldValue::Time(self.parse_time(desc.name, s)?),
            (FieldType::Reference(target), Value::Number(n)) => match n.as_i64() {
                Some(key) => FieldValue::Ref(target, key),
                None => return Err(mismatch(format!("{} is not a valid storage key", n))),
            },
            (ty, other) => {
                return Err(mismatch(format!(
                    "expected {}, got {}",
                    ty.describe(),
                    json_kind(other)
                )))
            }
        };
        Ok(decoded)
    }

    /// 沒有欄位宣告時的還原：符合任一時間格式的字串還原成時間值
    pub fn decode_untyped(&self, value: &Value) -> FieldValue {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Int(i),
                None => FieldValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => self.recognize_temporal(s).unwrap_or_else(|| FieldValue::Text(s.clone())),
            // 容器由呼叫端處理
            Value::Array(_) | Value::Object(_) => FieldValue::Null,
        }
    }

    pub fn recognize_temporal(&self, s: &str) -> Option<FieldValue> {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, &self.formats.datetime) {
            return Some(FieldValue::DateTime(dt));
        }
        if let Ok(d) = NaiveDate::parse_from_str(s, &self.formats.date) {
            return Some(FieldValue::Date(d));
        }
        NaiveTime::parse_from_str(s, &self.formats.time)
            .ok()
            .map(FieldValue::Time)
    }

    fn parse_datetime(&self, field: &str, s: &str) -> Result<NaiveDateTime> {
        NaiveDateTime::parse_from_str(s, &self.formats.datetime)
            .map_err(|_| format_error(field, s, &self.formats.datetime))
    }

    fn parse_date(&self, field: &str, s: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(s, &self.formats.date).map_err(|_| format_error(field, s, &self.formats.date))
    }

    fn parse_time(&self, field: &str, s: &str) -> Result<NaiveTime> {
        NaiveTime::parse_from_str(s, &self.formats.time).map_err(|_| format_error(field, s, &self.formats.time))
    }
}

// 格式字串含非法指令時 chrono 的 Display 會回傳錯誤，不能直接 to_string()
fn render(formatted: &impl std::fmt::Display, format: &str) -> Result<String> {
    use std::fmt::Write;
    let mut out = String::new();
    write!(out, "{}", formatted).map_err(|_| CodecError::ConfigError {
        message: format!("invalid temporal format '{}'", format),
    })?;
    Ok(out)
}

fn format_error(field: &str, value: &str, expected: &str) -> CodecError {
    CodecError::FormatError {
        field: field.to_string(),
        value: value.to_string(),
        expected: expected.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
