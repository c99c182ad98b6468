//! Simple casts and the coercion tables they share.
//!
//! Every function here is total: any JSON value goes in, a JSON value comes
//! out. Coercions follow the loose rules web forms were written against, so
//! `"12abc"` is 12 and `"0"` is false.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

pub const DEFAULT_SLUG_SEPARATOR: &str = "-";

const WORD_DELIMITERS: [char; 6] = [' ', '\t', '\r', '\n', '\x0B', '\x0C'];

static NUMERIC_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t\n\r\x0B\x0C]*([+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)")
        .expect("numeric prefix pattern is valid")
});

/// The simple cast categories, in the order the pipeline runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastKind {
    LowerCase,
    UpperCase,
    UcFirstWords,
    Slug,
    Integer,
    Float,
    Boolean,
    JsonToArray,
}

impl CastKind {
    pub const ALL: [CastKind; 8] = [
        CastKind::LowerCase,
        CastKind::UpperCase,
        CastKind::UcFirstWords,
        CastKind::Slug,
        CastKind::Integer,
        CastKind::Float,
        CastKind::Boolean,
        CastKind::JsonToArray,
    ];

    /// Name of the configuration list feeding this cast.
    pub fn config_key(self) -> &'static str {
        match self {
            CastKind::LowerCase => "toLowerCaseWords",
            CastKind::UpperCase => "toUpperCaseWords",
            CastKind::UcFirstWords => "toUCFirstWords",
            CastKind::Slug => "toSlugs",
            CastKind::Integer => "toIntegers",
            CastKind::Float => "toFloats",
            CastKind::Boolean => "toBooleans",
            CastKind::JsonToArray => "toArrayFromJson",
        }
    }

    pub fn apply(self, value: &Value, slug_separator: &str) -> Value {
        match self {
            CastKind::LowerCase => Value::String(to_lower(value)),
            CastKind::UpperCase => Value::String(to_upper(value)),
            CastKind::UcFirstWords => Value::String(uc_words(value)),
            CastKind::Slug => Value::String(slugify(value, slug_separator)),
            CastKind::Integer => Value::from(to_integer(value)),
            CastKind::Float => float_value(to_float(value)),
            CastKind::Boolean => Value::Bool(to_boolean(value)),
            CastKind::JsonToArray => json_decode(value),
        }
    }
}

/// String form of a value, as a form field would render it.
pub fn string_form(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if !n.is_i64() && !n.is_u64() => format_float(f),
            _ => n.to_string(),
        },
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) | Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

pub fn to_lower(value: &Value) -> String {
    string_form(value).to_lowercase()
}

pub fn to_upper(value: &Value) -> String {
    string_form(value).to_uppercase()
}

/// Upper-cases the first character of every word and leaves the rest alone.
pub fn uc_words(value: &Value) -> String {
    let source = string_form(value);
    let mut out = String::with_capacity(source.len());
    let mut word_start = true;

    for ch in source.chars() {
        if WORD_DELIMITERS.contains(&ch) {
            word_start = true;
            out.push(ch);
        } else if word_start {
            word_start = false;
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
    }

    out
}

/// Lower-cases and collapses every run of non-alphanumeric characters into
/// one separator, with none at either end.
pub fn slugify(value: &Value, separator: &str) -> String {
    let lowered = string_form(value).to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut gap = false;

    for ch in lowered.chars() {
        if ch.is_alphanumeric() {
            if gap && !out.is_empty() {
                out.push_str(separator);
            }
            gap = false;
            out.push(ch);
        } else {
            gap = true;
        }
    }

    out
}

pub fn to_integer(value: &Value) -> i64 {
    match value {
        Value::String(s) => string_to_integer(s),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i
            } else if n.as_u64().is_some() {
                i64::MAX
            } else {
                n.as_f64().map(float_to_integer).unwrap_or(0)
            }
        }
        Value::Bool(b) => i64::from(*b),
        Value::Null => 0,
        Value::Array(items) => i64::from(!items.is_empty()),
        Value::Object(obj) => i64::from(!obj.is_empty()),
    }
}

fn string_to_integer(s: &str) -> i64 {
    let Some(prefix) = numeric_prefix(s) else {
        return 0;
    };

    if prefix.contains(['.', 'e', 'E']) {
        return prefix.parse::<f64>().map(saturating_float_to_integer).unwrap_or(0);
    }

    // 純整數字串超出範圍時飽和
    prefix.parse::<i64>().unwrap_or(if prefix.starts_with('-') {
        i64::MIN
    } else {
        i64::MAX
    })
}

fn float_to_integer(f: f64) -> i64 {
    // i64::MAX as f64 rounds up to 2^63, which is already out of range
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if !f.is_finite() || f >= LIMIT || f < -LIMIT {
        return 0;
    }
    f.trunc() as i64
}

// 數字字串超出範圍時飽和，只有 INF/NaN 才是 0
fn saturating_float_to_integer(f: f64) -> i64 {
    if !f.is_finite() {
        0
    } else {
        // `as` 對有限值會飽和到 i64::MIN / i64::MAX
        f.trunc() as i64
    }
}

pub fn to_float(value: &Value) -> f64 {
    match value {
        Value::String(s) => numeric_prefix(s)
            .and_then(|prefix| prefix.parse::<f64>().ok())
            .unwrap_or(0.0),
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Null => 0.0,
        Value::Array(items) => f64::from(u8::from(!items.is_empty())),
        Value::Object(obj) => f64::from(u8::from(!obj.is_empty())),
    }
}

/// JSON has no NaN or infinity, so those collapse to zero.
pub fn float_value(f: f64) -> Value {
    if f.is_finite() {
        Value::from(f)
    } else {
        Value::from(0.0)
    }
}

pub fn to_boolean(value: &Value) -> bool {
    match value {
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::Bool(b) => *b,
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        Value::Object(obj) => !obj.is_empty(),
    }
}

/// Decode-or-null: a value that is not valid JSON text becomes `null`.
pub fn json_decode(value: &Value) -> Value {
    let text = string_form(value);
    match serde_json::from_str::<Value>(&text) {
        Ok(decoded) => decoded,
        Err(e) => {
            tracing::trace!("JSON decode failed, using null: {}", e);
            Value::Null
        }
    }
}

fn numeric_prefix(s: &str) -> Option<&str> {
    NUMERIC_PREFIX
        .captures(s)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
