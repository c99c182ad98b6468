use crate::domain::ports::FieldStore;
use crate::utils::error::{CastError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestMap {
    pub data: HashMap<String, Value>,
}

impl RequestMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 只取出指定欄位（缺少的欄位為 null）
    pub fn only(&self, keys: &[String]) -> Map<String, Value> {
        self.all(Some(keys))
    }

    /// 以排序後的 JSON 輸出所有欄位，同時寫入 debug 日誌
    pub fn dump(&self) -> String {
        let sorted: Map<String, Value> = self.all(None);
        let rendered = serde_json::to_string_pretty(&Value::Object(sorted))
            .unwrap_or_else(|_| "{}".to_string());
        tracing::debug!("📋 Request fields: {}", rendered);
        rendered
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.data.into_iter().collect())
    }
}

impl FieldStore for RequestMap {
    fn has(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    fn set(&mut self, key: &str, value: Value) {
        self.data.insert(key.to_string(), value);
    }

    fn all(&self, keys: Option<&[String]>) -> Map<String, Value> {
        match keys {
            Some(keys) => keys
                .iter()
                .map(|key| {
                    let value = self.data.get(key).cloned().unwrap_or(Value::Null);
                    (key.clone(), value)
                })
                .collect(),
            None => self
                .data
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        }
    }
}

impl TryFrom<Value> for RequestMap {
    type Error = CastError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(obj) => Ok(Self {
                data: obj.into_iter().collect(),
            }),
            other => Err(CastError::InvalidRequest {
                message: format!("expected a JSON object, got {}", json_kind(&other)),
            }),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> RequestMap {
        RequestMap::try_from(json!({ "name": "Ada", "age": "36" })).unwrap()
    }

    #[test]
    fn test_all_with_keys_fills_missing() {
        let request = sample();
        let keys = vec!["missing".to_string(), "name".to_string()];
        let subset = request.all(Some(keys.as_slice()));

        assert_eq!(subset.len(), 2);
        assert!(!subset.contains_key("age"));
        assert_eq!(subset["missing"], Value::Null);
        assert_eq!(subset["name"], json!("Ada"));
    }

    #[test]
    fn test_set_and_has() {
        let mut request = sample();
        assert!(!request.has("email"));
        request.set("email", json!("ada@example.com"));
        assert!(request.has("email"));
        assert_eq!(request.get("email"), Some(&json!("ada@example.com")));
    }

    #[test]
    fn test_try_from_rejects_non_objects() {
        let err = RequestMap::try_from(json!(["a", "b"])).unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_dump_renders_all_fields() {
        let dumped = sample().dump();
        let parsed: Value = serde_json::from_str(&dumped).unwrap();
        assert_eq!(parsed, json!({ "name": "Ada", "age": "36" }));
    }
}
