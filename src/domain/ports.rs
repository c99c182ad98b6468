use serde_json::{Map, Value};

/// The request bag a cast pipeline mutates.
///
/// This is the whole surface the pipeline needs from a host framework's
/// request object. `all(Some(keys))` answers every requested key, with
/// missing ones mapped to `Value::Null`.
pub trait FieldStore {
    fn has(&self, key: &str) -> bool;
    fn get(&self, key: &str) -> Option<&Value>;
    fn set(&mut self, key: &str, value: Value);
    fn all(&self, keys: Option<&[String]>) -> Map<String, Value>;
}
