use crate::domain::schema::EntityKind;
use crate::domain::value::{FieldValue, Key};
use crate::utils::error::{CodecError, Result};
use chrono::{NaiveDateTime, Timelike};
use std::fmt;
use std::marker::PhantomData;

/// 未解析的外鍵：只有目標的 key，不載入內容
pub struct Ref<T> {
    key: Key,
    _target: PhantomData<fn() -> T>,
}

impl<T> Ref<T> {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            _target: PhantomData,
        }
    }

    pub fn key(&self) -> Key {
        self.key
    }
}

impl<T> Clone for Ref<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Ref<T> {}

impl<T> PartialEq for Ref<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T> Eq for Ref<T> {}

impl<T: Entity> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ref<{}>({})", T::KIND, self.key)
    }
}

/// 可被轉換器處理的實體。欄位存取依照 `EntityKind::fields()` 的描述表。
pub trait Entity: Clone + Sized {
    const KIND: EntityKind;

    /// 所有欄位為空、尚未套用預設值的紀錄
    fn blank() -> Self;

    fn key(&self) -> Option<Key>;

    fn set_key(&mut self, key: Key);

    /// 讀取宣告欄位；未宣告的名稱回傳 None
    fn get(&self, field: &str) -> Option<FieldValue>;

    fn set(&mut self, field: &str, value: FieldValue) -> Result<()>;

    fn into_any(self) -> AnyRecord;

    fn from_any(record: AnyRecord) -> Option<Self>;
}

/// 目前時間（本地），截到秒
pub fn now() -> NaiveDateTime {
    let now = chrono::Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub key: Option<Key>,
    pub id: String,
    pub place_type: Option<String>,
    pub country_code: Option<String>,
    pub country: Option<String>,
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub url: Option<String>,
    pub bounding_box_coordinates: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub key: Option<Key>,
    pub screen_name: String,
    pub location: Option<Ref<Place>>,
    pub followers_count: Option<i64>,
    pub created_date: NaiveDateTime,
    pub statuses_count: Option<i64>,
    pub friends_count: Option<i64>,
    pub favourites_count: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tweet {
    pub key: Option<Key>,
    pub id: Option<i64>,
    pub id_str: Option<String>,
    pub in_reply_to_id_str: Option<String>,
    pub in_reply_to: Option<Ref<Tweet>>,
    pub user: Option<Ref<User>>,
    pub source: Option<String>,
    pub text: Option<String>,
    pub tags: Option<String>,
    pub created_date: NaiveDateTime,
    pub location: Option<String>,
    pub place: Option<Ref<Place>>,
    pub verified: Option<bool>,
    pub favorite_count: i64,
}

impl Place {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::blank()
        }
    }
}

impl User {
    pub fn new(screen_name: impl Into<String>) -> Self {
        Self {
            screen_name: screen_name.into(),
            created_date: now(),
            ..Self::blank()
        }
    }
}

impl Tweet {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            created_date: now(),
            ..Self::blank()
        }
    }
}

fn mismatch(kind: EntityKind, field: &str, expected: &str, got: &FieldValue) -> CodecError {
    CodecError::schema_mismatch(
        kind.name(),
        field,
        format!("expected {}, got {}", expected, got.kind_name()),
    )
}

fn opt_text(kind: EntityKind, field: &str, value: FieldValue) -> Result<Option<String>> {
    match value {
        FieldValue::Null => Ok(None),
        FieldValue::Text(s) => Ok(Some(s)),
        other => Err(mismatch(kind, field, "string", &other)),
    }
}

fn req_text(kind: EntityKind, field: &str, value: FieldValue) -> Result<String> {
    match value {
        FieldValue::Text(s) => Ok(s),
        other => Err(mismatch(kind, field, "non-null string", &other)),
    }
}

fn opt_int(kind: EntityKind, field: &str, value: FieldValue) -> Result<Option<i64>> {
    match value {
        FieldValue::Null => Ok(None),
        FieldValue::Int(n) => Ok(Some(n)),
        other => Err(mismatch(kind, field, "integer", &other)),
    }
}

fn req_int(kind: EntityKind, field: &str, value: FieldValue) -> Result<i64> {
    match value {
        FieldValue::Int(n) => Ok(n),
        other => Err(mismatch(kind, field, "non-null integer", &other)),
    }
}

fn opt_bool(kind: EntityKind, field: &str, value: FieldValue) -> Result<Option<bool>> {
    match value {
        FieldValue::Null => Ok(None),
        FieldValue::Bool(b) => Ok(Some(b)),
        other => Err(mismatch(kind, field, "boolean", &other)),
    }
}

fn req_datetime(kind: EntityKind, field: &str, value: FieldValue) -> Result<NaiveDateTime> {
    match value {
        FieldValue::DateTime(dt) => Ok(dt),
        other => Err(mismatch(kind, field, "datetime", &other)),
    }
}

fn opt_ref<T: Entity>(kind: EntityKind, field: &str, value: FieldValue) -> Result<Option<Ref<T>>> {
    match value {
        FieldValue::Null => Ok(None),
        FieldValue::Ref(target, key) if target == T::KIND => Ok(Some(Ref::new(key))),
        other => Err(mismatch(
            kind,
            field,
            &format!("reference to {}", T::KIND),
            &other,
        )),
    }
}

fn ref_value<T: Entity>(r: &Option<Ref<T>>) -> FieldValue {
    r.map_or(FieldValue::Null, |r| FieldValue::Ref(T::KIND, r.key()))
}

impl Entity for Place {
    const KIND: EntityKind = EntityKind::Place;

    fn blank() -> Self {
        Self {
            key: None,
            id: String::new(),
            place_type: None,
            country_code: None,
            country: None,
            name: None,
            full_name: None,
            url: None,
            bounding_box_coordinates: None,
        }
    }

    fn key(&self) -> Option<Key> {
        self.key
    }

    fn set_key(&mut self, key: Key) {
        self.key = Some(key);
    }

    fn get(&self, field: &str) -> Option<FieldValue> {
        let value = match field {
            "id" => FieldValue::Text(self.id.clone()),
            "place_type" => self.place_type.clone().into(),
            "country_code" => self.country_code.clone().into(),
            "country" => self.country.clone().into(),
            "name" => self.name.clone().into(),
            "full_name" => self.full_name.clone().into(),
            "url" => self.url.clone().into(),
            "bounding_box_coordinates" => self.bounding_box_coordinates.clone().into(),
            _ => return None,
        };
        Some(value)
    }

    fn set(&mut self, field: &str, value: FieldValue) -> Result<()> {
        let k = Self::KIND;
        match field {
            "id" => self.id = req_text(k, field, value)?,
            "place_type" => self.place_type = opt_text(k, field, value)?,
            "country_code" => self.country_code = opt_text(k, field, value)?,
            "country" => self.country = opt_text(k, field, value)?,
            "name" => self.name = opt_text(k, field, value)?,
            "full_name" => self.full_name = opt_text(k, field, value)?,
            "url" => self.url = opt_text(k, field, value)?,
            "bounding_box_coordinates" => self.bounding_box_coordinates = opt_text(k, field, value)?,
            _ => return Err(CodecError::schema_mismatch(k.name(), field, "undeclared field")),
        }
        Ok(())
    }

    fn into_any(self) -> AnyRecord {
        AnyRecord::Place(self)
    }

    fn from_any(record: AnyRecord) -> Option<Self> {
        match record {
            AnyRecord::Place(r) => Some(r),
            _ => None,
        }
    }
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::User;

    fn blank() -> Self {
        Self {
            key: None,
            screen_name: String::new(),
            location: None,
            followers_count: None,
            created_date: NaiveDateTime::default(),
            statuses_count: None,
            friends_count: None,
            favourites_count: 0,
        }
    }

    fn key(&self) -> Option<Key> {
        self.key
    }

    fn set_key(&mut self, key: Key) {
        self.key = Some(key);
    }

    fn get(&self, field: &str) -> Option<FieldValue> {
        let value = match field {
            "screen_name" => FieldValue::Text(self.screen_name.clone()),
            "location" => ref_value(&self.location),
            "followers_count" => self.followers_count.into(),
            "created_date" => self.created_date.into(),
            "statuses_count" => self.statuses_count.into(),
            "friends_count" => self.friends_count.into(),
            "favourites_count" => self.favourites_count.into(),
            _ => return None,
        };
        Some(value)
    }

    fn set(&mut self, field: &str, value: FieldValue) -> Result<()> {
        let k = Self::KIND;
        match field {
            "screen_name" => self.screen_name = req_text(k, field, value)?,
            "location" => self.location = opt_ref(k, field, value)?,
            "followers_count" => self.followers_count = opt_int(k, field, value)?,
            "created_date" => self.created_date = req_datetime(k, field, value)?,
            "statuses_count" => self.statuses_count = opt_int(k, field, value)?,
            "friends_count" => self.friends_count = opt_int(k, field, value)?,
            "favourites_count" => self.favourites_count = req_int(k, field, value)?,
            _ => return Err(CodecError::schema_mismatch(k.name(), field, "undeclared field")),
        }
        Ok(())
    }

    fn into_any(self) -> AnyRecord {
        AnyRecord::User(self)
    }

    fn from_any(record: AnyRecord) -> Option<Self> {
        match record {
            AnyRecord::User(r) => Some(r),
            _ => None,
        }
    }
}

impl Entity for Tweet {
    const KIND: EntityKind = EntityKind::Tweet;

    fn blank() -> Self {
        Self {
            key: None,
            id: None,
            id_str: None,
            in_reply_to_id_str: None,
            in_reply_to: None,
            user: None,
            source: None,
            text: None,
            tags: None,
            created_date: NaiveDateTime::default(),
            location: None,
            place: None,
            verified: None,
            favorite_count: 0,
        }
    }

    fn key(&self) -> Option<Key> {
        self.key
    }

    fn set_key(&mut self, key: Key) {
        self.key = Some(key);
    }

    fn get(&self, field: &str) -> Option<FieldValue> {
        let value = match field {
            "id" => self.id.into(),
            "id_str" => self.id_str.clone().into(),
            "in_reply_to_id_str" => self.in_reply_to_id_str.clone().into(),
            "in_reply_to" => ref_value(&self.in_reply_to),
            "user" => ref_value(&self.user),
            "source" => self.source.clone().into(),
            "text" => self.text.clone().into(),
            "tags" => self.tags.clone().into(),
            "created_date" => self.created_date.into(),
            "location" => self.location.clone().into(),
            "place" => ref_value(&self.place),
            "verified" => self.verified.into(),
            "favorite_count" => self.favorite_count.into(),
            _ => return None,
        };
        Some(value)
    }

    fn set(&mut self, field: &str, value: FieldValue) -> Result<()> {
        let k = Self::KIND;
        match field {
            "id" => self.id = opt_int(k, field, value)?,
            "id_str" => self.id_str = opt_text(k, field, value)?,
            "in_reply_to_id_str" => self.in_reply_to_id_str = opt_text(k, field, value)?,
            "in_reply_to" => self.in_reply_to = opt_ref(k, field, value)?,
            "user" => self.user = opt_ref(k, field, value)?,
            "source" => self.source = opt_text(k, field, value)?,
            "text" => self.text = opt_text(k, field, value)?,
            "tags" => self.tags = opt_text(k, field, value)?,
            "created_date" => self.created_date = req_datetime(k, field, value)?,
            "location" => self.location = opt_text(k, field, value)?,
            "place" => self.place = opt_ref(k, field, value)?,
            "verified" => self.verified = opt_bool(k, field, value)?,
            "favorite_count" => self.favorite_count = req_int(k, field, value)?,
            _ => return Err(CodecError::schema_mismatch(k.name(), field, "undeclared field")),
        }
        Ok(())
    }

    fn into_any(self) -> AnyRecord {
        AnyRecord::Tweet(self)
    }

    fn from_any(record: AnyRecord) -> Option<Self> {
        match record {
            AnyRecord::Tweet(r) => Some(r),
            _ => None,
        }
    }
}

/// 不限種類的紀錄，給依執行期 kind 分派的呼叫端使用
#[derive(Debug, Clone, PartialEq)]
pub enum AnyRecord {
    Place(Place),
    User(User),
    Tweet(Tweet),
}

impl AnyRecord {
    pub fn kind(&self) -> EntityKind {
        match self {
            AnyRecord::Place(_) => EntityKind::Place,
            AnyRecord::User(_) => EntityKind::User,
            AnyRecord::Tweet(_) => EntityKind::Tweet,
        }
    }

    pub fn key(&self) -> Option<Key> {
        match self {
            AnyRecord::Place(p) => p.key(),
            AnyRecord::User(u) => u.key(),
            AnyRecord::Tweet(t) => t.key(),
        }
    }

    pub fn set_key(&mut self, key: Key) {
        match self {
            AnyRecord::Place(p) => p.set_key(key),
            AnyRecord::User(u) => u.set_key(key),
            AnyRecord::Tweet(t) => t.set_key(key),
        }
    }

    pub fn get(&self, field: &str) -> Option<FieldValue> {
        match self {
            AnyRecord::Place(p) => p.get(field),
            AnyRecord::User(u) => u.get(field),
            AnyRecord::Tweet(t) => t.get(field),
        }
    }
}
