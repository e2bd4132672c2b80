use crate::core::deserializer::DeserializeOptions;
use crate::core::policy::TemporalFormats;
use crate::domain::projection::FieldSelection;
use crate::domain::schema::EntityKind;
use crate::utils::error::{CodecError, Result};
use crate::utils::validation::{validate_temporal_format, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub formats: TemporalFormats,
    pub serializer: FieldSelection,
    pub deserializer: DeserializeOptions,
}

impl CodecConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CodecError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CodecError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATETIME_FORMAT})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CodecError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_temporal_format("formats.datetime", &self.formats.datetime, true, true)?;
        validate_temporal_format("formats.date", &self.formats.date, true, false)?;
        validate_temporal_format("formats.time", &self.formats.time, false, true)?;

        // 每個種類共用一組選擇，名稱只要在任一種類宣告過即可
        let names = self
            .serializer
            .only
            .iter()
            .flatten()
            .chain(self.serializer.exclude.iter());
        for name in names {
            let known = EntityKind::ALL
                .iter()
                .any(|k| k.field(name).is_some() || k.reverse_relation(name).is_some());
            if !known {
                return Err(CodecError::InvalidConfigValueError {
                    field: "serializer".to_string(),
                    value: name.clone(),
                    reason: "Field is not declared on any entity kind".to_string(),
                });
            }
        }

        Ok(())
    }

    /// 針對單一種類，去掉該種類沒有宣告的名稱
    pub fn selection_for(&self, kind: EntityKind) -> FieldSelection {
        let declared = |name: &String| kind.field(name).is_some() || kind.reverse_relation(name).is_some();
        FieldSelection {
            only: self
                .serializer
                .only
                .as_ref()
                .map(|only| only.iter().filter(|n| declared(*n)).cloned().collect()),
            exclude: self
                .serializer
                .exclude
                .iter()
                .filter(|n| declared(*n))
                .cloned()
                .collect(),
            backrefs: self.serializer.backrefs,
        }
    }
}

impl Validate for CodecConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_codec_config() {
        let toml_content = r#"
[formats]
datetime = "%Y/%m/%d %H:%M:%S"

[serializer]
exclude = ["created_date"]
backrefs = true

[deserializer]
ignore_unknown = true
"#;

        let config = CodecConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.formats.datetime, "%Y/%m/%d %H:%M:%S");
        assert_eq!(config.formats.date, "%Y-%m-%d");
        assert_eq!(config.serializer.exclude, vec!["created_date".to_string()]);
        assert!(config.serializer.backrefs);
        assert!(config.deserializer.ignore_unknown);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = CodecConfig::from_toml_str("").unwrap();
        assert_eq!(config, CodecConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("TWEET_CODEC_TEST_TIME_FORMAT", "%H.%M.%S");
        let config = CodecConfig::from_toml_str(
            r#"
[formats]
time = "${TWEET_CODEC_TEST_TIME_FORMAT}"
"#,
        )
        .unwrap();
        assert_eq!(config.formats.time, "%H.%M.%S");
    }

    #[test]
    fn test_unknown_selection_name_rejected() {
        let config = CodecConfig::from_toml_str(
            r#"
[serializer]
only = ["screen_name", "nickname"]
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_selection_for_filters_per_kind() {
        let config = CodecConfig::from_toml_str(
            r#"
[serializer]
only = ["screen_name", "text", "tweets"]
"#,
        )
        .unwrap();
        let user = config.selection_for(EntityKind::User);
        assert_eq!(
            user.only,
            Some(vec!["screen_name".to_string(), "tweets".to_string()])
        );
        let place = config.selection_for(EntityKind::Place);
        assert_eq!(place.only, Some(vec![]));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[deserializer]\nignore_unknown = true").unwrap();
        let config = CodecConfig::from_file(file.path()).unwrap();
        assert!(config.deserializer.ignore_unknown);
    }
}
