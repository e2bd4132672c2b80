use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Schema mismatch on {kind}.{field}: {reason}")]
    SchemaMismatch {
        kind: String,
        field: String,
        reason: String,
    },

    #[error("Format error on '{field}': '{value}' does not match '{expected}'")]
    FormatError {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Unsupported value kind for '{field}': {kind}")]
    UnsupportedValueKind { field: String, kind: String },

    #[error("Constraint violated on {kind}: {reason}")]
    Constraint { kind: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for '{field}' ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// 輸入資料與宣告欄位不符
    Data,
    /// 程式或設定錯誤，不可恢復
    Programming,
    /// IO / 設定檔等系統層錯誤
    System,
}

impl CodecError {
    pub fn schema_mismatch(
        kind: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::SchemaMismatch {
            kind: kind.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn constraint(kind: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Constraint {
            kind: kind.into(),
            reason: reason.into(),
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::SchemaMismatch { .. }
            | Self::FormatError { .. }
            | Self::Constraint { .. }
            | Self::SerializationError(_) => ErrorSeverity::Data,
            Self::UnsupportedValueKind { .. } => ErrorSeverity::Programming,
            Self::IoError(_) | Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorSeverity::System
            }
        }
    }

    /// CLI 結束碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Data => 2,
            ErrorSeverity::Programming => 3,
            ErrorSeverity::System => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_mapping() {
        let err = CodecError::schema_mismatch("user", "nickname", "undeclared field");
        assert_eq!(err.severity(), ErrorSeverity::Data);
        assert_eq!(err.exit_code(), 2);

        let err = CodecError::UnsupportedValueKind {
            field: "score".to_string(),
            kind: "non-finite float".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Programming);

        let err = CodecError::ConfigError {
            message: "bad".to_string(),
        };
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_display_includes_field() {
        let err = CodecError::schema_mismatch("user", "nickname", "undeclared field");
        assert_eq!(
            err.to_string(),
            "Schema mismatch on user.nickname: undeclared field"
        );
    }
}
