use crate::domain::schema::EntityKind;
use crate::domain::value::Key;
use serde::{Deserialize, Serialize};

/// 傾印檔中的一筆紀錄：種類、儲存層 key 與序列化後的欄位
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub kind: EntityKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Key>,
    pub record: serde_json::Value,
}

#[derive(Debug, Clone, Default)]
pub struct ExchangeResult {
    pub envelopes: Vec<Envelope>,
    pub places: usize,
    pub users: usize,
    pub tweets: usize,
}

impl ExchangeResult {
    pub fn total(&self) -> usize {
        self.envelopes.len()
    }

    pub fn count(&mut self, kind: EntityKind) {
        match kind {
            EntityKind::Place => self.places += 1,
            EntityKind::User => self.users += 1,
            EntityKind::Tweet => self.tweets += 1,
        }
    }
}
