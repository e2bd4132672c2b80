use crate::core::policy::{TemporalFormats, ValuePolicy};
use crate::domain::model::{AnyRecord, Entity, Place, Tweet, User};
use crate::domain::ports::RecordStore;
use crate::domain::projection::Node;
use crate::domain::schema::EntityKind;
use crate::utils::error::{CodecError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeserializeOptions {
    /// 略過未宣告的欄位而不是報錯
    pub ignore_unknown: bool,
}

/// 純量結構 → 紀錄。外鍵只還原成帶 key 的參照，不查詢儲存層；
/// 建好的紀錄也不會寫回儲存層。
pub struct Deserializer<'a, S: RecordStore> {
    store: &'a S,
    policy: ValuePolicy,
    options: DeserializeOptions,
}

impl<'a, S: RecordStore> Deserializer<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            policy: ValuePolicy::default(),
            options: DeserializeOptions::default(),
        }
    }

    pub fn with_formats(mut self, formats: TemporalFormats) -> Self {
        self.policy = ValuePolicy::new(formats);
        self
    }

    pub fn with_options(mut self, options: DeserializeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn deserialize<E: Entity>(&self, data: &Value) -> Result<E> {
        let kind = E::KIND;
        let Value::Object(map) = data else {
            return Err(CodecError::schema_mismatch(
                kind.name(),
                "<root>",
                "expected a mapping of field names to values",
            ));
        };

        let mut values = Vec::with_capacity(map.len());
        for (name, raw) in map {
            if let Some(desc) = kind.field(name) {
                values.push((name.clone(), self.policy.decode(kind, desc, raw)?));
                continue;
            }

            if kind.reverse_relation(name).is_some() {
                check_key_sequence(kind, name, raw)?;
                // 反向關聯由持有外鍵的一方負責
                tracing::debug!(kind = %kind, field = %name, "dropping reverse relation");
                continue;
            }

            if self.options.ignore_unknown {
                tracing::debug!(kind = %kind, field = %name, "ignoring undeclared field");
                continue;
            }

            return Err(CodecError::schema_mismatch(kind.name(), name.as_str(), "undeclared field"));
        }

        tracing::debug!(kind = %kind, fields = values.len(), "deserialized record");
        self.store.construct(values)
    }

    pub fn deserialize_kind(&self, kind: EntityKind, data: &Value) -> Result<AnyRecord> {
        let record = match kind {
            EntityKind::Place => self.deserialize::<Place>(data)?.into_any(),
            EntityKind::User => self.deserialize::<User>(data)?.into_any(),
            EntityKind::Tweet => self.deserialize::<Tweet>(data)?.into_any(),
        };
        Ok(record)
    }

    pub fn from_json_str(&self, kind: EntityKind, text: &str) -> Result<AnyRecord> {
        let value: Value = serde_json::from_str(text)?;
        self.deserialize_kind(kind, &value)
    }

    /// 沒有目標種類時的還原；外鍵無法辨識，維持整數
    pub fn decode_node(&self, value: &Value) -> Node {
        match value {
            Value::Object(map) => Node::Mapping(
                map.iter()
                    .map(|(k, v)| (k.clone(), self.decode_node(v)))
                    .collect(),
            ),
            Value::Array(items) => Node::Sequence(items.iter().map(|v| self.decode_node(v)).collect()),
            scalar => Node::Scalar(self.policy.decode_untyped(scalar)),
        }
    }
}

fn check_key_sequence(kind: EntityKind, name: &str, raw: &Value) -> Result<()> {
    let valid = match raw {
        Value::Array(items) => items.iter().all(|v| v.as_i64().is_some()),
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(CodecError::schema_mismatch(
            kind.name(),
            name,
            "reverse relation must be a sequence of storage keys",
        ))
    }
}
