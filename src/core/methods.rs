use crate::core::casts::{self, DEFAULT_SLUG_SEPARATOR};
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::LazyLock;

/// A pure unary function a new-field rule can chain.
pub type CastMethod = fn(&Value) -> Value;

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^\s>][^>]*>").expect("html tag pattern is valid"));

/// Lookup table from method names used in rule strings to functions.
///
/// Only registered names can appear in a `newFields` rule; anything else is
/// rejected when the pipeline is built.
#[derive(Clone)]
pub struct MethodRegistry {
    methods: HashMap<String, CastMethod>,
}

impl std::fmt::Debug for MethodRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodRegistry")
            .field("methods", &self.names())
            .finish()
    }
}

impl MethodRegistry {
    pub fn empty() -> Self {
        Self {
            methods: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: &str, method: CastMethod) -> &mut Self {
        if self.methods.insert(name.to_string(), method).is_some() {
            tracing::debug!("🔁 Cast method '{}' re-registered", name);
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<CastMethod> {
        self.methods.get(name).copied()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for MethodRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register("strtolower", strtolower)
            .register("strtoupper", strtoupper)
            .register("ucfirst", ucfirst)
            .register("lcfirst", lcfirst)
            .register("ucwords", ucwords)
            .register("trim", trim)
            .register("ltrim", ltrim)
            .register("rtrim", rtrim)
            .register("strrev", strrev)
            .register("strlen", strlen)
            .register("str_slug", str_slug)
            .register("intval", intval)
            .register("floatval", floatval)
            .register("boolval", boolval)
            .register("json_decode", casts::json_decode)
            .register("json_encode", json_encode)
            .register("nl2br", nl2br)
            .register("strip_tags", strip_tags);
        registry
    }
}

fn strtolower(value: &Value) -> Value {
    Value::String(casts::to_lower(value))
}

fn strtoupper(value: &Value) -> Value {
    Value::String(casts::to_upper(value))
}

fn ucwords(value: &Value) -> Value {
    Value::String(casts::uc_words(value))
}

fn ucfirst(value: &Value) -> Value {
    Value::String(map_first_char(&casts::string_form(value), |c| {
        c.to_uppercase().collect()
    }))
}

fn lcfirst(value: &Value) -> Value {
    Value::String(map_first_char(&casts::string_form(value), |c| {
        c.to_lowercase().collect()
    }))
}

fn map_first_char(s: &str, f: impl Fn(char) -> String) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => f(first) + chars.as_str(),
        None => String::new(),
    }
}

// 與表單常見的 trim 行為一致：空白、tab、換行、NUL、垂直 tab
fn is_trim_char(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\0' | '\x0B')
}

fn trim(value: &Value) -> Value {
    Value::String(casts::string_form(value).trim_matches(is_trim_char).to_string())
}

fn ltrim(value: &Value) -> Value {
    Value::String(casts::string_form(value).trim_start_matches(is_trim_char).to_string())
}

fn rtrim(value: &Value) -> Value {
    Value::String(casts::string_form(value).trim_end_matches(is_trim_char).to_string())
}

fn strrev(value: &Value) -> Value {
    Value::String(casts::string_form(value).chars().rev().collect())
}

fn strlen(value: &Value) -> Value {
    Value::from(casts::string_form(value).chars().count())
}

fn str_slug(value: &Value) -> Value {
    Value::String(casts::slugify(value, DEFAULT_SLUG_SEPARATOR))
}

fn intval(value: &Value) -> Value {
    Value::from(casts::to_integer(value))
}

fn floatval(value: &Value) -> Value {
    casts::float_value(casts::to_float(value))
}

fn boolval(value: &Value) -> Value {
    Value::Bool(casts::to_boolean(value))
}

/// Compact JSON with `/` and every non-ASCII character escaped, the way web
/// backends encode by default.
fn json_encode(value: &Value) -> Value {
    let raw = value.to_string();
    let mut out = String::with_capacity(raw.len());

    // `/` 與非 ASCII 字元只會出現在字串內，可直接逐字替換
    for c in raw.chars() {
        match c {
            '/' => out.push_str("\\/"),
            c if c.is_ascii() => out.push(c),
            c => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{:04x}", unit));
                }
            }
        }
    }

    Value::String(out)
}

fn nl2br(value: &Value) -> Value {
    let text = casts::string_form(value);
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\r' if chars.peek() == Some(&'\n') => {
                chars.next();
                out.push_str("<br />\r\n");
            }
            '\n' if chars.peek() == Some(&'\r') => {
                chars.next();
                out.push_str("<br />\n\r");
            }
            '\n' | '\r' => {
                out.push_str("<br />");
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    Value::String(out)
}

fn strip_tags(value: &Value) -> Value {
    Value::String(HTML_TAG.replace_all(&casts::string_form(value), "").into_owned())
}
