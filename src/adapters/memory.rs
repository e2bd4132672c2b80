use crate::domain::model::{AnyRecord, Entity, Place, Ref, Tweet, User};
use crate::domain::ports::RecordStore;
use crate::domain::schema::{EntityKind, ReverseRelation};
use crate::domain::value::{FieldValue, Key};
use crate::utils::error::{CodecError, Result};
use std::collections::BTreeMap;

/// 記憶體內的儲存層：每種實體一張以 key 排序的表
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    places: BTreeMap<Key, Place>,
    users: BTreeMap<Key, User>,
    tweets: BTreeMap<Key, Tweet>,
    next_key: Key,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            next_key: 1,
            ..Self::default()
        }
    }

    /// 寫入紀錄；沒有 key 時由這裡指派，已存在的 key 會被覆蓋
    pub fn save<E: Entity>(&mut self, record: E) -> Result<Key> {
        self.save_any(record.into_any())
    }

    pub fn save_any(&mut self, record: AnyRecord) -> Result<Key> {
        self.store(record, true)
    }

    /// 只新增不覆蓋；key 已被同種類紀錄使用時回傳 Constraint
    pub fn insert_any(&mut self, record: AnyRecord) -> Result<Key> {
        self.store(record, false)
    }

    fn store(&mut self, mut record: AnyRecord, overwrite: bool) -> Result<Key> {
        let kind = record.kind();
        let key = match record.key() {
            Some(key) => key,
            None => {
                let key = self.next_key.max(1);
                record.set_key(key);
                key
            }
        };

        if !overwrite && self.contains(kind, key) {
            return Err(CodecError::constraint(
                kind.name(),
                format!("{} key {} is already taken", kind, key),
            ));
        }
        self.check_constraints(&record, key)?;
        let next_key = key.checked_add(1).ok_or_else(|| {
            CodecError::constraint(kind.name(), format!("key {} leaves no room for new keys", key))
        })?;
        self.next_key = self.next_key.max(next_key);

        match record {
            AnyRecord::Place(p) => {
                self.places.insert(key, p);
            }
            AnyRecord::User(u) => {
                self.users.insert(key, u);
            }
            AnyRecord::Tweet(t) => {
                self.tweets.insert(key, t);
            }
        }
        tracing::debug!(key, "record saved");
        Ok(key)
    }

    fn check_constraints(&self, record: &AnyRecord, key: Key) -> Result<()> {
        match record {
            AnyRecord::Place(p) if p.id.is_empty() => {
                Err(CodecError::constraint("place", "id must not be empty"))
            }
            AnyRecord::User(u) => {
                if u.screen_name.is_empty() {
                    return Err(CodecError::constraint("user", "screen_name must not be empty"));
                }
                let taken = self
                    .users
                    .iter()
                    .any(|(k, other)| *k != key && other.screen_name == u.screen_name);
                if taken {
                    return Err(CodecError::constraint(
                        "user",
                        format!("screen_name '{}' is already taken", u.screen_name),
                    ));
                }
                Ok(())
            }
            AnyRecord::Tweet(t) if t.in_reply_to.map(|r| r.key()) == Some(key) => Err(
                CodecError::constraint("tweet", format!("tweet {} cannot reply to itself", key)),
            ),
            _ => Ok(()),
        }
    }

    pub fn get(&self, kind: EntityKind, key: Key) -> Option<AnyRecord> {
        match kind {
            EntityKind::Place => self.places.get(&key).cloned().map(AnyRecord::Place),
            EntityKind::User => self.users.get(&key).cloned().map(AnyRecord::User),
            EntityKind::Tweet => self.tweets.get(&key).cloned().map(AnyRecord::Tweet),
        }
    }

    pub fn contains(&self, kind: EntityKind, key: Key) -> bool {
        match kind {
            EntityKind::Place => self.places.contains_key(&key),
            EntityKind::User => self.users.contains_key(&key),
            EntityKind::Tweet => self.tweets.contains_key(&key),
        }
    }

    /// 呼叫端自行解析外鍵
    pub fn resolve<T: Entity>(&self, reference: Ref<T>) -> Option<T> {
        self.get(T::KIND, reference.key()).and_then(T::from_any)
    }

    pub fn remove(&mut self, kind: EntityKind, key: Key) -> Option<AnyRecord> {
        match kind {
            EntityKind::Place => self.places.remove(&key).map(AnyRecord::Place),
            EntityKind::User => self.users.remove(&key).map(AnyRecord::User),
            EntityKind::Tweet => self.tweets.remove(&key).map(AnyRecord::Tweet),
        }
    }

    pub fn user_by_screen_name(&self, screen_name: &str) -> Option<&User> {
        self.users.values().find(|u| u.screen_name == screen_name)
    }

    pub fn len(&self) -> usize {
        self.places.len() + self.users.len() + self.tweets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 依 Place、User、Tweet 的順序列出所有紀錄
    pub fn records(&self) -> impl Iterator<Item = AnyRecord> + '_ {
        self.places
            .values()
            .cloned()
            .map(AnyRecord::Place)
            .chain(self.users.values().cloned().map(AnyRecord::User))
            .chain(self.tweets.values().cloned().map(AnyRecord::Tweet))
    }

    /// 每個外鍵都必須指向存在的紀錄。較長的回覆循環不在檢查範圍。
    pub fn verify_references(&self) -> Result<()> {
        for record in self.records() {
            let kind = record.kind();
            for desc in kind.fields() {
                let Some(target) = desc.reference_kind() else {
                    continue;
                };
                if let Some(FieldValue::Ref(_, key)) = record.get(desc.name) {
                    if !self.contains(target, key) {
                        return Err(CodecError::constraint(
                            kind.name(),
                            format!(
                                "{} {:?}.{} points to missing {} {}",
                                kind,
                                record.key(),
                                desc.name,
                                target,
                                key
                            ),
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

fn referring_keys<'a, E: Entity + 'a>(
    table: impl Iterator<Item = (&'a Key, &'a E)>,
    via_field: &str,
    key: Key,
) -> Vec<Key> {
    table
        .filter(|(_, record)| {
            matches!(record.get(via_field), Some(FieldValue::Ref(_, target)) if target == key)
        })
        .map(|(k, _)| *k)
        .collect()
}

impl RecordStore for MemoryStore {
    fn related_keys(&self, relation: &ReverseRelation, key: Key) -> Vec<Key> {
        match relation.source {
            EntityKind::Place => referring_keys(self.places.iter(), relation.via_field, key),
            EntityKind::User => referring_keys(self.users.iter(), relation.via_field, key),
            EntityKind::Tweet => referring_keys(self.tweets.iter(), relation.via_field, key),
        }
    }
}
