//! 每種實體的欄位描述表。轉換器只透過這些表認識欄位，不做執行期反射。

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Place,
    User,
    Tweet,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Place, EntityKind::User, EntityKind::Tweet];

    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Place => "place",
            EntityKind::User => "user",
            EntityKind::Tweet => "tweet",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn fields(self) -> &'static [FieldDescriptor] {
        match self {
            EntityKind::Place => PLACE_FIELDS,
            EntityKind::User => USER_FIELDS,
            EntityKind::Tweet => TWEET_FIELDS,
        }
    }

    pub fn field(self, name: &str) -> Option<&'static FieldDescriptor> {
        self.fields().iter().find(|f| f.name == name)
    }

    /// 反向關聯（例如 User.tweets），只在投影時展開成 key 序列
    pub fn reverse_relations(self) -> &'static [ReverseRelation] {
        match self {
            EntityKind::Place => &[],
            EntityKind::User => USER_REVERSE,
            EntityKind::Tweet => TWEET_REVERSE,
        }
    }

    pub fn reverse_relation(self, name: &str) -> Option<&'static ReverseRelation> {
        self.reverse_relations().iter().find(|r| r.name == name)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Integer,
    BigInteger,
    Boolean,
    DateTime,
    Date,
    Time,
    Reference(EntityKind),
}

impl FieldType {
    pub fn describe(self) -> &'static str {
        match self {
            FieldType::Text => "string",
            FieldType::Integer | FieldType::BigInteger => "integer",
            FieldType::Boolean => "boolean",
            FieldType::DateTime => "datetime string",
            FieldType::Date => "date string",
            FieldType::Time => "time string",
            FieldType::Reference(_) => "reference key",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    /// 沒有宣告預設值
    None,
    Integer(i64),
    /// 建立當下的本地時間
    Now,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub ty: FieldType,
    pub nullable: bool,
    pub default: FieldDefault,
}

impl FieldDescriptor {
    const fn new(name: &'static str, ty: FieldType, nullable: bool, default: FieldDefault) -> Self {
        Self {
            name,
            ty,
            nullable,
            default,
        }
    }

    const fn optional(name: &'static str, ty: FieldType) -> Self {
        Self::new(name, ty, true, FieldDefault::None)
    }

    pub fn reference_kind(&self) -> Option<EntityKind> {
        match self.ty {
            FieldType::Reference(kind) => Some(kind),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReverseRelation {
    pub name: &'static str,
    /// 持有外鍵的那一方
    pub source: EntityKind,
    pub via_field: &'static str,
}

use FieldDefault as D;
use FieldType as T;

static PLACE_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("id", T::Text, false, D::None),
    FieldDescriptor::optional("place_type", T::Text),
    FieldDescriptor::optional("country_code", T::Text),
    FieldDescriptor::optional("country", T::Text),
    FieldDescriptor::optional("name", T::Text),
    FieldDescriptor::optional("full_name", T::Text),
    FieldDescriptor::optional("url", T::Text),
    FieldDescriptor::optional("bounding_box_coordinates", T::Text),
];

static USER_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("screen_name", T::Text, false, D::None),
    FieldDescriptor::optional("location", T::Reference(EntityKind::Place)),
    FieldDescriptor::optional("followers_count", T::Integer),
    FieldDescriptor::new("created_date", T::DateTime, false, D::Now),
    FieldDescriptor::optional("statuses_count", T::Integer),
    FieldDescriptor::optional("friends_count", T::Integer),
    FieldDescriptor::new("favourites_count", T::Integer, false, D::Integer(0)),
];

static TWEET_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::optional("id", T::BigInteger),
    FieldDescriptor::optional("id_str", T::Text),
    FieldDescriptor::optional("in_reply_to_id_str", T::Text),
    FieldDescriptor::optional("in_reply_to", T::Reference(EntityKind::Tweet)),
    FieldDescriptor::optional("user", T::Reference(EntityKind::User)),
    FieldDescriptor::optional("source", T::Text),
    FieldDescriptor::optional("text", T::Text),
    FieldDescriptor::optional("tags", T::Text),
    FieldDescriptor::new("created_date", T::DateTime, false, D::Now),
    FieldDescriptor::optional("location", T::Text),
    FieldDescriptor::optional("place", T::Reference(EntityKind::Place)),
    FieldDescriptor::optional("verified", T::Boolean),
    FieldDescriptor::new("favorite_count", T::Integer, false, D::Integer(0)),
];

static USER_REVERSE: &[ReverseRelation] = &[ReverseRelation {
    name: "tweets",
    source: EntityKind::Tweet,
    via_field: "user",
}];

static TWEET_REVERSE: &[ReverseRelation] = &[ReverseRelation {
    name: "replies",
    source: EntityKind::Tweet,
    via_field: "in_reply_to",
}];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_lookup() {
        let location = EntityKind::User.field("location").unwrap();
        assert_eq!(location.reference_kind(), Some(EntityKind::Place));
        assert!(EntityKind::User.field("nickname").is_none());

        // Tweet.location 是自由文字，不是外鍵
        let tweet_location = EntityKind::Tweet.field("location").unwrap();
        assert_eq!(tweet_location.ty, FieldType::Text);
    }

    #[test]
    fn test_defaults_declared() {
        let fav = EntityKind::User.field("favourites_count").unwrap();
        assert_eq!(fav.default, FieldDefault::Integer(0));
        let fav = EntityKind::Tweet.field("favorite_count").unwrap();
        assert_eq!(fav.default, FieldDefault::Integer(0));
    }

    #[test]
    fn test_reverse_relations_point_back() {
        for kind in EntityKind::ALL {
            for rel in kind.reverse_relations() {
                let via = rel.source.field(rel.via_field).unwrap();
                assert_eq!(via.reference_kind(), Some(kind));
            }
        }
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(EntityKind::from_name("retweet"), None);
    }
}
