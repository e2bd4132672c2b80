use crate::adapters::memory::MemoryStore;
use crate::core::deserializer::Deserializer;
use crate::core::serializer::Serializer;
use crate::core::{ConfigProvider, Envelope, ExchangeResult, Pipeline, Storage};
use crate::domain::ports::Detached;
use crate::utils::error::Result;
use std::path::Path;

/// 讀入傾印檔、還原成紀錄、檢查外鍵、再以設定的欄位選擇輸出
pub struct DumpPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> DumpPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    /// 把所有 envelope 寫進一個新的記憶體儲存層
    pub fn stage(&self, data: Vec<Envelope>) -> Result<MemoryStore> {
        let codec = self.config.codec();
        let deserializer = Deserializer::new(&Detached)
            .with_formats(codec.formats.clone())
            .with_options(codec.deserializer);

        let mut store = MemoryStore::new();
        for envelope in data {
            let mut record = deserializer.deserialize_kind(envelope.kind, &envelope.record)?;
            if let Some(key) = envelope.key {
                record.set_key(key);
            }
            store.insert_any(record)?;
        }
        // 所有紀錄都寫入後才檢查，傾印檔內的順序不影響
        store.verify_references()?;
        Ok(store)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for DumpPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<Envelope>> {
        tracing::debug!("Reading dump from: {}", self.config.input_file());
        let raw = self.storage.read_file(self.config.input_file()).await?;
        let envelopes: Vec<Envelope> = serde_json::from_slice(&raw)?;
        tracing::debug!("Read {} envelopes", envelopes.len());
        Ok(envelopes)
    }

    async fn transform(&self, data: Vec<Envelope>) -> Result<ExchangeResult> {
        let codec = self.config.codec();
        let store = self.stage(data)?;
        let serializer = Serializer::with_formats(&store, codec.formats.clone());

        let mut result = ExchangeResult::default();
        for record in store.records() {
            let kind = record.kind();
            let selection = codec.selection_for(kind);
            let value = serializer.serialize_any(&record, Some(&selection))?;
            result.count(kind);
            result.envelopes.push(Envelope {
                kind,
                key: record.key(),
                record: value,
            });
        }

        Ok(result)
    }

    async fn load(&self, result: ExchangeResult) -> Result<String> {
        let output_path = Path::new(self.config.output_path())
            .join(self.config.output_file())
            .to_string_lossy()
            .to_string();

        let json_data = serde_json::to_string_pretty(&result.envelopes)?;
        tracing::debug!("Writing {} bytes to {}", json_data.len(), output_path);
        self.storage.write_file(&output_path, json_data.as_bytes()).await?;

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::codec_config::CodecConfig;
    use crate::domain::schema::EntityKind;
    use crate::utils::error::CodecError;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn with_file(path: &str, data: &serde_json::Value) -> Self {
            let mut files = HashMap::new();
            files.insert(path.to_string(), serde_json::to_vec(data).unwrap());
            Self {
                files: Arc::new(Mutex::new(files)),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                CodecError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        codec: CodecConfig,
    }

    impl ConfigProvider for MockConfig {
        fn input_file(&self) -> &str {
            "dump.json"
        }

        fn output_path(&self) -> &str {
            "out"
        }

        fn output_file(&self) -> &str {
            "records.json"
        }

        fn codec(&self) -> &CodecConfig {
            &self.codec
        }
    }

    fn sample_dump() -> serde_json::Value {
        json!([
            {"kind": "place", "key": 7, "record": {"id": "5a110d312052166f", "name": "Taipei"}},
            {"kind": "user", "key": 1, "record": {
                "screen_name": "abc",
                "location": 7,
                "created_date": "2024-01-02 03:04:05"
            }},
            {"kind": "tweet", "key": 10, "record": {
                "text": "hello",
                "user": 1,
                "created_date": "2024-01-02 03:05:00"
            }},
            {"kind": "tweet", "key": 11, "record": {
                "text": "reply",
                "user": 1,
                "in_reply_to": 10,
                "created_date": "2024-01-02 03:06:00"
            }}
        ])
    }

    #[tokio::test]
    async fn test_full_exchange() {
        let storage = MockStorage::with_file("dump.json", &sample_dump());
        let pipeline = DumpPipeline::new(
            storage.clone(),
            MockConfig {
                codec: CodecConfig::default(),
            },
        );

        let envelopes = pipeline.extract().await.unwrap();
        assert_eq!(envelopes.len(), 4);

        let result = pipeline.transform(envelopes).await.unwrap();
        assert_eq!((result.places, result.users, result.tweets), (1, 1, 2));

        let user = &result.envelopes[1];
        assert_eq!(user.kind, EntityKind::User);
        assert_eq!(user.record["favourites_count"], json!(0));
        assert_eq!(user.record["location"], json!(7));

        let output = pipeline.load(result).await.unwrap();
        assert_eq!(output, "out/records.json");
        let written = storage.get_file("out/records.json").await.unwrap();
        let parsed: Vec<Envelope> = serde_json::from_slice(&written).unwrap();
        assert_eq!(parsed.len(), 4);
        assert_eq!(parsed[3].record["in_reply_to"], json!(10));
    }

    #[tokio::test]
    async fn test_dangling_reference_fails_transform() {
        let dump = json!([
            {"kind": "tweet", "key": 1, "record": {"text": "orphan", "user": 99}}
        ]);
        let storage = MockStorage::with_file("dump.json", &dump);
        let pipeline = DumpPipeline::new(
            storage,
            MockConfig {
                codec: CodecConfig::default(),
            },
        );
        let envelopes = pipeline.extract().await.unwrap();
        let err = pipeline.transform(envelopes).await.unwrap_err();
        assert!(matches!(err, CodecError::Constraint { .. }));
    }

    #[tokio::test]
    async fn test_duplicate_key_fails_transform() {
        let dump = json!([
            {"kind": "tweet", "key": 10, "record": {"text": "first"}},
            {"kind": "tweet", "key": 10, "record": {"text": "second"}}
        ]);
        let storage = MockStorage::with_file("dump.json", &dump);
        let pipeline = DumpPipeline::new(
            storage,
            MockConfig {
                codec: CodecConfig::default(),
            },
        );
        let envelopes = pipeline.extract().await.unwrap();
        let err = pipeline.transform(envelopes).await.unwrap_err();
        assert!(matches!(err, CodecError::Constraint { .. }));
    }

    #[test]
    fn test_stage_rejects_explicit_key_after_assigned_one() {
        let pipeline = DumpPipeline::new(
            MockStorage::with_file("dump.json", &json!([])),
            MockConfig {
                codec: CodecConfig::default(),
            },
        );
        let envelopes: Vec<Envelope> = serde_json::from_value(json!([
            {"kind": "tweet", "record": {"text": "auto-keyed"}},
            {"kind": "tweet", "key": 1, "record": {"text": "explicit"}}
        ]))
        .unwrap();
        let err = pipeline.stage(envelopes).unwrap_err();
        assert!(matches!(err, CodecError::Constraint { .. }));
    }

    #[tokio::test]
    async fn test_backrefs_and_exclude_from_config() {
        let codec = CodecConfig::from_toml_str(
            r#"
[serializer]
exclude = ["created_date"]
backrefs = true
"#,
        )
        .unwrap();
        let storage = MockStorage::with_file("dump.json", &sample_dump());
        let pipeline = DumpPipeline::new(storage, MockConfig { codec });

        let envelopes = pipeline.extract().await.unwrap();
        let result = pipeline.transform(envelopes).await.unwrap();

        let user = &result.envelopes[1].record;
        assert!(user.get("created_date").is_none());
        assert_eq!(user["tweets"], json!([10, 11]));
        let root = &result.envelopes[2].record;
        assert_eq!(root["replies"], json!([11]));
    }
}
