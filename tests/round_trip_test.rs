use anyhow::Result;
use chrono::NaiveDate;
use serde_json::json;
use tweet_codec::{
    CodecError, Deserializer, Detached, FieldSelection, MemoryStore, Place, Ref, Serializer, Tweet, User,
};

fn at(h: u32, m: u32, s: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

/// 每個純量欄位經過序列化再反序列化後應完全相同
#[test]
fn test_round_trip_every_kind() -> Result<()> {
    let serializer = Serializer::new(&Detached);
    let deserializer = Deserializer::new(&Detached);

    let place = Place {
        place_type: Some("city".to_string()),
        country_code: Some("TW".to_string()),
        country: Some("Taiwan".to_string()),
        name: Some("Taipei".to_string()),
        full_name: Some("Taipei City, Taiwan".to_string()),
        url: Some("https://api.twitter.com/1.1/geo/id/5a110d312052166f.json".to_string()),
        bounding_box_coordinates: Some("[[121.45, 24.96], [121.66, 24.96], [121.66, 25.21], [121.45, 25.21]]".to_string()),
        ..Place::new("5a110d312052166f")
    };
    let back: Place = deserializer.deserialize(&serializer.serialize(&place, None)?)?;
    assert_eq!(back, place);

    let user = User {
        location: Some(Ref::new(7)),
        followers_count: Some(120),
        statuses_count: Some(5_000),
        friends_count: None,
        favourites_count: 42,
        created_date: at(3, 4, 5),
        ..User::new("abc")
    };
    let back: User = deserializer.deserialize(&serializer.serialize(&user, None)?)?;
    assert_eq!(back, user);

    let tweet = Tweet {
        id: Some(1_745_000_000_000_000_000),
        id_str: Some("1745000000000000000".to_string()),
        in_reply_to_id_str: Some("1744999999999999999".to_string()),
        in_reply_to: Some(Ref::new(3)),
        user: Some(Ref::new(2)),
        source: Some("Twitter for iPhone".to_string()),
        tags: Some("#sarcasm #angry".to_string()),
        location: Some("somewhere sunny".to_string()),
        place: Some(Ref::new(7)),
        verified: Some(false),
        favorite_count: 3,
        created_date: at(23, 59, 59),
        ..Tweet::new("hello")
    };
    let back: Tweet = deserializer.deserialize(&serializer.serialize(&tweet, None)?)?;
    assert_eq!(back, tweet);

    Ok(())
}

#[test]
fn test_serialized_user_example() -> Result<()> {
    let user = User {
        created_date: at(3, 4, 5),
        location: Some(Ref::new(7)),
        ..User::new("abc")
    };
    let value = Serializer::new(&Detached).serialize(&user, None)?;
    assert_eq!(value["screen_name"], json!("abc"));
    assert_eq!(value["created_date"], json!("2024-01-02 03:04:05"));
    assert_eq!(value["location"], json!(7));
    assert_eq!(value["followers_count"], json!(null));
    Ok(())
}

/// 外鍵只輸出 key，被參照紀錄的其他欄位不會出現
#[test]
fn test_reference_erasure_through_store() -> Result<()> {
    let mut store = MemoryStore::new();
    let mut place = Place::new("5a110d312052166f");
    place.name = Some("Taipei".to_string());
    let place_key = store.save(place)?;
    let mut user = User::new("abc");
    user.location = Some(Ref::new(place_key));
    let user_key = store.save(user)?;

    let user = store.resolve(Ref::<User>::new(user_key)).unwrap();
    let text = Serializer::new(&store).to_json_string(&user, None, false)?;
    assert!(!text.contains("Taipei"));
    assert!(!text.contains("5a110d312052166f"));
    assert!(text.contains(&format!("\"location\":{}", place_key)));
    Ok(())
}

/// A → B → C → A 的回覆循環仍可序列化，反向關聯也只展開成 key
#[test]
fn test_reply_cycle_is_safe() -> Result<()> {
    let mut store = MemoryStore::new();
    for (key, parent) in [(1, 3), (2, 1), (3, 2)] {
        let mut tweet = Tweet::new(format!("tweet {}", key));
        tweet.key = Some(key);
        tweet.in_reply_to = Some(Ref::new(parent));
        store.save(tweet)?;
    }
    store.verify_references()?;

    let serializer = Serializer::new(&store);
    let selection = FieldSelection::only(["in_reply_to", "replies"]).with_backrefs();
    for key in 1..=3 {
        let tweet = store.resolve(Ref::<Tweet>::new(key)).unwrap();
        let value = serializer.serialize(&tweet, Some(&selection))?;
        let expected_parent = if key == 1 { 3 } else { key - 1 };
        let expected_reply = if key == 3 { 1 } else { key + 1 };
        assert_eq!(value["in_reply_to"], json!(expected_parent));
        assert_eq!(value["replies"], json!([expected_reply]));
    }
    Ok(())
}

#[test]
fn test_defaults_applied_on_missing_fields() -> Result<()> {
    let deserializer = Deserializer::new(&Detached);

    let user: User = deserializer.deserialize(&json!({"screen_name": "abc"}))?;
    assert_eq!(user.favourites_count, 0);

    let tweet: Tweet = deserializer.deserialize(&json!({"text": "hello", "user": 5}))?;
    assert_eq!(tweet.text.as_deref(), Some("hello"));
    assert_eq!(tweet.user, Some(Ref::new(5)));
    assert_eq!(tweet.favorite_count, 0);
    Ok(())
}

#[test]
fn test_undeclared_field_rejected() {
    let err = Deserializer::new(&Detached)
        .deserialize::<User>(&json!({"nickname": "x"}))
        .unwrap_err();
    assert!(matches!(err, CodecError::SchemaMismatch { .. }));
}

/// 序列化 → JSON 文字 → 反序列化
#[test]
fn test_text_encoding_boundary() -> Result<()> {
    let tweet = Tweet {
        created_date: at(8, 0, 0),
        verified: Some(true),
        ..Tweet::new("über 🚀")
    };
    let text = Serializer::new(&Detached).to_json_string(&tweet, None, true)?;
    let record = Deserializer::new(&Detached).from_json_str(tweet_codec::EntityKind::Tweet, &text)?;
    assert_eq!(record, tweet_codec::AnyRecord::Tweet(tweet));
    Ok(())
}
