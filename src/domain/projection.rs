//! 紀錄與欄位 mapping 之間的投影。轉換器把這一步當成儲存層提供的工具使用。

use crate::domain::model::{now, Entity};
use crate::domain::schema::{EntityKind, FieldDefault};
use crate::domain::value::FieldValue;
use crate::utils::error::{CodecError, Result};
use serde::{Deserialize, Serialize};

/// 轉換前的結構：有序 mapping、序列或型別化純量
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Mapping(Vec<(String, Node)>),
    Sequence(Vec<Node>),
    Scalar(FieldValue),
}

impl Node {
    pub fn mapping() -> Self {
        Node::Mapping(Vec::new())
    }

    /// 在 mapping 末端加一個欄位；只能用在 mapping 上
    pub fn push(&mut self, name: impl Into<String>, node: Node) -> Result<()> {
        let name = name.into();
        match self {
            Node::Mapping(entries) => {
                entries.push((name, node));
                Ok(())
            }
            _ => Err(CodecError::schema_mismatch(
                "node",
                name,
                "cannot add a field to a non-mapping node",
            )),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        match self {
            Node::Mapping(entries) => entries.iter().find(|(k, _)| k == name).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl From<FieldValue> for Node {
    fn from(value: FieldValue) -> Self {
        Node::Scalar(value)
    }
}

/// 投影要輸出哪些欄位
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSelection {
    pub only: Option<Vec<String>>,
    pub exclude: Vec<String>,
    /// 附上反向關聯（User.tweets、Tweet.replies）的 key 序列
    pub backrefs: bool,
}

impl FieldSelection {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            only: Some(names.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn excluding<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_backrefs(mut self) -> Self {
        self.backrefs = true;
        self
    }

    pub fn includes(&self, name: &str) -> bool {
        let listed = self
            .only
            .as_ref()
            .map_or(true, |only| only.iter().any(|n| n == name));
        listed && !self.exclude.iter().any(|n| n == name)
    }

    /// 名稱必須是該種類宣告過的欄位或反向關聯
    pub fn check(&self, kind: EntityKind) -> Result<()> {
        let names = self.only.iter().flatten().chain(self.exclude.iter());
        for name in names {
            if kind.field(name).is_none() && kind.reverse_relation(name).is_none() {
                return Err(CodecError::schema_mismatch(
                    kind.name(),
                    name.as_str(),
                    "field selection names an undeclared field",
                ));
            }
        }
        Ok(())
    }
}

/// 依描述表順序把紀錄投影成 mapping
pub fn project_fields<E: Entity>(record: &E, selection: &FieldSelection) -> Result<Node> {
    selection.check(E::KIND)?;

    let mut node = Node::mapping();
    for desc in E::KIND.fields() {
        if !selection.includes(desc.name) {
            continue;
        }
        let value = record.get(desc.name).ok_or_else(|| {
            CodecError::schema_mismatch(E::KIND.name(), desc.name, "declared field not readable")
        })?;
        node.push(desc.name, Node::Scalar(value))?;
    }
    Ok(node)
}

/// 由欄位值建立紀錄：先套宣告的預設值，再覆寫提供的欄位
pub fn construct_record<E: Entity>(values: Vec<(String, FieldValue)>) -> Result<E> {
    let mut record = E::blank();
    for desc in E::KIND.fields() {
        match desc.default {
            FieldDefault::None => {}
            FieldDefault::Integer(n) => record.set(desc.name, FieldValue::Int(n))?,
            FieldDefault::Now => record.set(desc.name, FieldValue::DateTime(now()))?,
        }
    }
    for (name, value) in values {
        record.set(&name, value)?;
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Ref, Tweet, User};

    #[test]
    fn test_project_keeps_declaration_order() {
        let user = User::new("abc");
        let node = project_fields(&user, &FieldSelection::all()).unwrap();
        let Node::Mapping(entries) = node else {
            panic!("expected mapping");
        };
        let names: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        let declared: Vec<&str> = EntityKind::User.fields().iter().map(|f| f.name).collect();
        assert_eq!(names, declared);
    }

    #[test]
    fn test_only_and_exclude() {
        let mut tweet = Tweet::new("hi");
        tweet.user = Some(Ref::new(4));
        let selection = FieldSelection::only(["text", "user", "created_date"]).excluding(["created_date"]);
        let node = project_fields(&tweet, &selection).unwrap();
        assert_eq!(
            node,
            Node::Mapping(vec![
                ("user".to_string(), Node::Scalar(FieldValue::Ref(EntityKind::User, 4))),
                ("text".to_string(), Node::Scalar(FieldValue::Text("hi".to_string()))),
            ])
        );
    }

    #[test]
    fn test_unknown_selection_name_fails() {
        let user = User::new("abc");
        let err = project_fields(&user, &FieldSelection::only(["nickname"])).unwrap_err();
        assert!(matches!(err, CodecError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_push_requires_mapping() {
        let mut node = Node::mapping();
        node.push("text", Node::Scalar(FieldValue::Text("hi".to_string()))).unwrap();
        assert!(node.get("text").is_some());

        let mut sequence = Node::Sequence(vec![]);
        let err = sequence.push("text", Node::Scalar(FieldValue::Null)).unwrap_err();
        assert!(matches!(err, CodecError::SchemaMismatch { .. }));
        assert_eq!(sequence, Node::Sequence(vec![]));
    }

    #[test]
    fn test_construct_applies_defaults() {
        let user: User = construct_record(vec![(
            "screen_name".to_string(),
            FieldValue::Text("abc".to_string()),
        )])
        .unwrap();
        assert_eq!(user.favourites_count, 0);
        assert!(user.created_date > chrono::NaiveDateTime::default());
    }
}
