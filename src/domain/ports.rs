use crate::config::codec_config::CodecConfig;
use crate::domain::exchange::{Envelope, ExchangeResult};
use crate::domain::model::Entity;
use crate::domain::projection::{construct_record, project_fields, FieldSelection, Node};
use crate::domain::schema::ReverseRelation;
use crate::domain::value::{FieldValue, Key};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 儲存層協作者。轉換器只透過這裡投影、建構紀錄及取得 key。
pub trait RecordStore {
    /// 反向關聯：`relation.source` 中 `via_field` 指向 `key` 的紀錄
    fn related_keys(&self, relation: &ReverseRelation, key: Key) -> Vec<Key>;

    fn key_of<E: Entity>(&self, record: &E) -> Option<Key> {
        record.key()
    }

    fn project<E: Entity>(&self, record: &E, selection: &FieldSelection) -> Result<Node> {
        let mut node = project_fields(record, selection)?;

        if selection.backrefs {
            if let Some(key) = self.key_of(record) {
                for relation in E::KIND.reverse_relations() {
                    if !selection.includes(relation.name) {
                        continue;
                    }
                    let items = self
                        .related_keys(relation, key)
                        .into_iter()
                        .map(|k| Node::Scalar(FieldValue::Ref(relation.source, k)))
                        .collect();
                    node.push(relation.name, Node::Sequence(items))?;
                }
            }
        }

        Ok(node)
    }

    fn construct<E: Entity>(&self, values: Vec<(String, FieldValue)>) -> Result<E> {
        construct_record(values)
    }
}

/// 沒有後端資料的協作者：反向關聯一律為空
#[derive(Debug, Clone, Copy, Default)]
pub struct Detached;

impl RecordStore for Detached {
    fn related_keys(&self, _relation: &ReverseRelation, _key: Key) -> Vec<Key> {
        Vec::new()
    }
}

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_file(&self) -> &str;
    fn output_path(&self) -> &str;
    fn output_file(&self) -> &str;
    fn codec(&self) -> &CodecConfig;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Envelope>>;
    async fn transform(&self, data: Vec<Envelope>) -> Result<ExchangeResult>;
    async fn load(&self, result: ExchangeResult) -> Result<String>;
}
