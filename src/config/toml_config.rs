use crate::core::casts::{CastKind, DEFAULT_SLUG_SEPARATOR};
use crate::utils::error::{CastError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// 單一請求處理器的轉型設定
///
/// 每個清單都可省略，省略即為空清單
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CastConfig {
    pub to_lower_case_words: Vec<String>,
    pub to_upper_case_words: Vec<String>,
    #[serde(rename = "toUCFirstWords")]
    pub to_uc_first_words: Vec<String>,
    pub to_slugs: Vec<String>,
    pub to_integers: Vec<String>,
    pub to_floats: Vec<String>,
    pub to_booleans: Vec<String>,
    pub to_array_from_json: Vec<String>,
    /// new field -> `"<glue>|<field1>,<field2>"`
    pub join_strings: BTreeMap<String, String>,
    /// new field -> `"<source>|<method1>, <method2>"`
    pub new_fields: BTreeMap<String, String>,
    pub slug_separator: Option<String>,
}

impl CastConfig {
    /// 從 TOML 檔案載入設定
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CastError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析設定
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${SLUG_SEPARATOR})，找不到的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::LazyLock;

        static ENV_VAR: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// 取得某一類簡單轉型的欄位清單
    pub fn fields_for(&self, kind: CastKind) -> &[String] {
        match kind {
            CastKind::LowerCase => &self.to_lower_case_words,
            CastKind::UpperCase => &self.to_upper_case_words,
            CastKind::UcFirstWords => &self.to_uc_first_words,
            CastKind::Slug => &self.to_slugs,
            CastKind::Integer => &self.to_integers,
            CastKind::Float => &self.to_floats,
            CastKind::Boolean => &self.to_booleans,
            CastKind::JsonToArray => &self.to_array_from_json,
        }
    }

    pub fn slug_separator(&self) -> &str {
        self.slug_separator
            .as_deref()
            .unwrap_or(DEFAULT_SLUG_SEPARATOR)
    }

    pub fn is_empty(&self) -> bool {
        CastKind::ALL
            .iter()
            .all(|kind| self.fields_for(*kind).is_empty())
            && self.join_strings.is_empty()
            && self.new_fields.is_empty()
    }

    /// 驗證設定的合理性（規則字串本身在建立 pipeline 時才解析）
    pub fn validate_config(&self) -> Result<()> {
        for kind in CastKind::ALL {
            validation::validate_field_names(kind.config_key(), self.fields_for(kind))?;
        }

        for target in self.join_strings.keys().chain(self.new_fields.keys()) {
            validation::validate_non_empty_string("new field name", target)?;
        }

        if let Some(separator) = &self.slug_separator {
            validation::validate_slug_separator("slugSeparator", separator)?;
        }

        Ok(())
    }
}

impl Validate for CastConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
