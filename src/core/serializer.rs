use crate::core::policy::{TemporalFormats, ValuePolicy};
use crate::domain::model::{AnyRecord, Entity};
use crate::domain::ports::RecordStore;
use crate::domain::projection::{FieldSelection, Node};
use crate::utils::error::Result;
use serde_json::{Map, Value};

/// 紀錄 → 純量結構。外鍵在投影階段就已經只剩 key，所以遞迴深度固定，
/// 回覆鏈形成循環也不會無限展開。
pub struct Serializer<'a, S: RecordStore> {
    store: &'a S,
    policy: ValuePolicy,
}

impl<'a, S: RecordStore> Serializer<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            policy: ValuePolicy::default(),
        }
    }

    pub fn with_formats(store: &'a S, formats: TemporalFormats) -> Self {
        Self {
            store,
            policy: ValuePolicy::new(formats),
        }
    }

    pub fn policy(&self) -> &ValuePolicy {
        &self.policy
    }

    pub fn serialize<E: Entity>(&self, record: &E, selection: Option<&FieldSelection>) -> Result<Value> {
        let default_selection = FieldSelection::all();
        let selection = selection.unwrap_or(&default_selection);

        let node = self.store.project(record, selection)?;
        tracing::debug!(
            kind = %E::KIND,
            key = ?self.store.key_of(record),
            "serializing record"
        );
        self.serialize_node(&node)
    }

    pub fn serialize_any(&self, record: &AnyRecord, selection: Option<&FieldSelection>) -> Result<Value> {
        match record {
            AnyRecord::Place(p) => self.serialize(p, selection),
            AnyRecord::User(u) => self.serialize(u, selection),
            AnyRecord::Tweet(t) => self.serialize(t, selection),
        }
    }

    /// 走訪任意結構：mapping 逐值轉換，序列逐元素轉換，其餘交給純量規則
    pub fn serialize_node(&self, node: &Node) -> Result<Value> {
        self.walk("", node)
    }

    fn walk(&self, path: &str, node: &Node) -> Result<Value> {
        match node {
            Node::Mapping(entries) => {
                let mut map = Map::with_capacity(entries.len());
                for (name, child) in entries {
                    let child_path = if path.is_empty() {
                        name.clone()
                    } else {
                        format!("{}.{}", path, name)
                    };
                    map.insert(name.clone(), self.walk(&child_path, child)?);
                }
                Ok(Value::Object(map))
            }
            Node::Sequence(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| self.walk(&format!("{}[{}]", path, i), item))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Node::Scalar(value) => self.policy.encode(path, value),
        }
    }

    /// 傳輸邊界：序列化後直接編成 JSON 文字
    pub fn to_json_string<E: Entity>(
        &self,
        record: &E,
        selection: Option<&FieldSelection>,
        pretty: bool,
    ) -> Result<String> {
        let value = self.serialize(record, selection)?;
        let text = if pretty {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };
        Ok(text)
    }
}
