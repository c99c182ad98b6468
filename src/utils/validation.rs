use crate::utils::error::{CastError, Result};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(CastError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(CastError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CastError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// 檢查欄位清單：不可有空白名稱
///
/// 重複的欄位只記錄警告，因為所有轉型都是冪等的
pub fn validate_field_names(list_name: &str, names: &[String]) -> Result<()> {
    let mut seen = HashSet::new();

    for name in names {
        validate_non_empty_string(list_name, name)?;
        if !seen.insert(name.as_str()) {
            tracing::warn!("⚠️ Field '{}' is listed more than once in {}", name, list_name);
        }
    }

    Ok(())
}

pub fn validate_slug_separator(field_name: &str, separator: &str) -> Result<()> {
    if separator.is_empty() {
        return Err(CastError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: separator.to_string(),
            reason: "Separator cannot be empty".to_string(),
        });
    }

    // 分隔符若含英數字，slug 就不再是冪等的
    if separator.chars().any(char::is_alphanumeric) {
        return Err(CastError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: separator.to_string(),
            reason: "Separator must not contain letters or digits".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("config", "casts.toml").is_ok());
        assert!(validate_path("config", "").is_err());
        assert!(validate_path("config", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_field_names() {
        let names = vec!["email".to_string(), "name".to_string()];
        assert!(validate_field_names("toLowerCaseWords", &names).is_ok());

        let duplicated = vec!["email".to_string(), "email".to_string()];
        assert!(validate_field_names("toLowerCaseWords", &duplicated).is_ok());

        let blank = vec!["email".to_string(), "  ".to_string()];
        assert!(validate_field_names("toLowerCaseWords", &blank).is_err());
    }

    #[test]
    fn test_validate_slug_separator() {
        assert!(validate_slug_separator("slugSeparator", "-").is_ok());
        assert!(validate_slug_separator("slugSeparator", "_").is_ok());
        assert!(validate_slug_separator("slugSeparator", "").is_err());
        assert!(validate_slug_separator("slugSeparator", "x").is_err());
    }
}
