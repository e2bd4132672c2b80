use crate::utils::error::{CodecError, Result};
use chrono::NaiveDate;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(CodecError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(CodecError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CodecError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// 確認 chrono 格式字串可以把範例時間寫出再讀回
pub fn validate_temporal_format(field_name: &str, format: &str, with_date: bool, with_time: bool) -> Result<()> {
    validate_non_empty_string(field_name, format)?;

    let sample = NaiveDate::from_ymd_opt(2024, 1, 2)
        .and_then(|d| d.and_hms_opt(3, 4, 5))
        .ok_or_else(|| CodecError::ConfigError {
            message: "sample timestamp out of range".to_string(),
        })?;

    let invalid = |reason: &str| CodecError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: format.to_string(),
        reason: reason.to_string(),
    };

    // chrono 遇到非法指令時 Display 會失敗，先用 write! 接住
    let mut rendered = String::new();
    {
        use std::fmt::Write;
        if write!(rendered, "{}", sample.format(format)).is_err() {
            return Err(invalid("Format string contains an invalid specifier"));
        }
    }

    let parsed = match (with_date, with_time) {
        (true, true) => chrono::NaiveDateTime::parse_from_str(&rendered, format).is_ok(),
        (true, false) => NaiveDate::parse_from_str(&rendered, format).is_ok(),
        _ => chrono::NaiveTime::parse_from_str(&rendered, format).is_ok(),
    };

    if !parsed {
        return Err(invalid("Format does not round-trip a sample value"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("output_path", "./out").is_ok());
        assert!(validate_path("output_path", "").is_err());
        assert!(validate_path("output_path", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_temporal_format() {
        assert!(validate_temporal_format("formats.datetime", "%Y-%m-%d %H:%M:%S", true, true).is_ok());
        assert!(validate_temporal_format("formats.date", "%Y-%m-%d", true, false).is_ok());
        assert!(validate_temporal_format("formats.time", "%H:%M:%S", false, true).is_ok());
        // 少了時間欄位，無法還原 datetime
        assert!(validate_temporal_format("formats.datetime", "%Y-%m-%d", true, true).is_err());
        assert!(validate_temporal_format("formats.date", "  ", true, false).is_err());
    }
}
