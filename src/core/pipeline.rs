use crate::config::CastConfig;
use crate::core::casts::{self, CastKind};
use crate::core::methods::{CastMethod, MethodRegistry};
use crate::core::rules::{JoinRule, NewFieldRule};
use crate::domain::ports::FieldStore;
use crate::utils::error::{CastError, Result};
use serde_json::Value;

pub const JOIN_STAGE: &str = "joinStrings";
pub const NEW_FIELDS_STAGE: &str = "newFields";

#[derive(Debug, Clone)]
struct SimpleStage {
    kind: CastKind,
    fields: Vec<String>,
}

#[derive(Clone)]
struct DerivedField {
    rule: NewFieldRule,
    chain: Vec<CastMethod>,
}

impl std::fmt::Debug for DerivedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedField")
            .field("rule", &self.rule)
            .finish_non_exhaustive()
    }
}

/// What one `apply` call changed, for logging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CastReport {
    /// `(stage, fields written)` in execution order, empty stages left out
    pub stages: Vec<(&'static str, usize)>,
    /// Listed fields that were absent from the request
    pub skipped: usize,
}

impl CastReport {
    pub fn touched(&self, stage: &str) -> usize {
        self.stages
            .iter()
            .find(|(name, _)| *name == stage)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.stages.iter().map(|(_, count)| count).sum()
    }

    fn record(&mut self, stage: &'static str, count: usize) {
        if count > 0 {
            self.stages.push((stage, count));
        }
    }
}

/// A cast configuration with every rule parsed and every method resolved.
///
/// Building one is where configuration errors surface; applying one never
/// fails. Stages run in a fixed order and each stage reads all of its inputs
/// before writing any result, so a stage sees exactly what the previous
/// stages produced.
#[derive(Debug, Clone)]
pub struct FieldCastPipeline {
    simple: Vec<SimpleStage>,
    slug_separator: String,
    joins: Vec<JoinRule>,
    derived: Vec<DerivedField>,
}

impl FieldCastPipeline {
    pub fn new(config: &CastConfig) -> Result<Self> {
        Self::with_registry(config, &MethodRegistry::default())
    }

    pub fn with_registry(config: &CastConfig, registry: &MethodRegistry) -> Result<Self> {
        config.validate_config()?;

        let simple = CastKind::ALL
            .iter()
            .map(|kind| SimpleStage {
                kind: *kind,
                fields: config.fields_for(*kind).to_vec(),
            })
            .filter(|stage| !stage.fields.is_empty())
            .collect();

        let joins = config
            .join_strings
            .iter()
            .map(|(target, rule)| -> Result<JoinRule> {
                let parsed = JoinRule::parse(target, rule)?;
                tracing::debug!(
                    "🔗 Join rule '{}': {:?} joined by {:?}",
                    target,
                    parsed.fields,
                    parsed.glue
                );
                Ok(parsed)
            })
            .collect::<Result<Vec<_>>>()?;

        let derived = config
            .new_fields
            .iter()
            .map(|(target, rule)| -> Result<DerivedField> {
                let rule = NewFieldRule::parse(target, rule)?;
                let chain = resolve_chain(&rule, registry)?;
                if rule.is_copy() {
                    tracing::debug!("🧩 New field '{}' copies '{}'", target, rule.source);
                } else {
                    tracing::debug!(
                        "🧩 New field '{}' from '{}' via {:?}",
                        target,
                        rule.source,
                        rule.methods
                    );
                }
                Ok(DerivedField { rule, chain })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            simple,
            slug_separator: config.slug_separator().to_string(),
            joins,
            derived,
        })
    }

    pub fn apply<S: FieldStore + ?Sized>(&self, store: &mut S) -> CastReport {
        let mut report = CastReport::default();

        for stage in &self.simple {
            let (written, skipped) = self.apply_simple(stage, store);
            report.record(stage.kind.config_key(), written);
            report.skipped += skipped;
        }

        report.record(JOIN_STAGE, self.join_fields(store));
        report.record(NEW_FIELDS_STAGE, self.make_new_fields(store));

        tracing::debug!(
            "✨ Casts applied: {} fields written, {} listed fields absent",
            report.total(),
            report.skipped
        );
        report
    }

    fn apply_simple<S: FieldStore + ?Sized>(&self, stage: &SimpleStage, store: &mut S) -> (usize, usize) {
        let mut skipped = 0;

        let updates: Vec<(&str, Value)> = stage
            .fields
            .iter()
            .filter_map(|field| match store.get(field) {
                Some(current) => Some((
                    field.as_str(),
                    stage.kind.apply(current, &self.slug_separator),
                )),
                None => {
                    tracing::trace!("{}: '{}' not in request, skipped", stage.kind.config_key(), field);
                    skipped += 1;
                    None
                }
            })
            .collect();

        let written = updates.len();
        for (field, value) in updates {
            store.set(field, value);
        }

        tracing::debug!("🔄 {}: {} fields cast", stage.kind.config_key(), written);
        (written, skipped)
    }

    fn join_fields<S: FieldStore + ?Sized>(&self, store: &mut S) -> usize {
        let joined: Vec<(&str, String)> = self
            .joins
            .iter()
            .map(|rule| {
                let parts: Vec<String> = rule
                    .fields
                    .iter()
                    .map(|field| store.get(field).map(casts::string_form).unwrap_or_default())
                    .collect();
                (rule.target.as_str(), parts.join(rule.glue.as_str()))
            })
            .collect();

        let written = joined.len();
        for (target, value) in joined {
            store.set(target, Value::String(value));
        }
        written
    }

    fn make_new_fields<S: FieldStore + ?Sized>(&self, store: &mut S) -> usize {
        let derived: Vec<(&str, Value)> = self
            .derived
            .iter()
            .map(|field| {
                let source = store.get(&field.rule.source).cloned().unwrap_or(Value::Null);
                let value = field
                    .chain
                    .iter()
                    .fold(source, |value, method| method(&value));
                (field.rule.target.as_str(), value)
            })
            .collect();

        let written = derived.len();
        for (target, value) in derived {
            store.set(target, value);
        }
        written
    }
}

fn resolve_chain(rule: &NewFieldRule, registry: &MethodRegistry) -> Result<Vec<CastMethod>> {
    rule.methods
        .iter()
        .map(|name| {
            registry
                .get(name)
                .ok_or_else(|| CastError::UnknownCastMethod {
                    field: rule.target.clone(),
                    method: name.clone(),
                })
        })
        .collect()
}

/// Compiles `config` and applies it to `request`.
///
/// Configuration errors are returned before any field is written.
pub fn apply_casts<S: FieldStore + ?Sized>(request: &mut S, config: &CastConfig) -> Result<()> {
    let pipeline = FieldCastPipeline::new(config)?;
    pipeline.apply(request);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::RequestMap;
    use serde_json::json;

    fn request(value: Value) -> RequestMap {
        RequestMap::try_from(value).unwrap()
    }

    #[test]
    fn test_lowercase_and_missing_fields() {
        let config = CastConfig {
            to_lower_case_words: vec!["email".to_string(), "missing".to_string()],
            ..Default::default()
        };
        let mut req = request(json!({ "email": "Ada@Example.COM" }));

        let report = FieldCastPipeline::new(&config).unwrap().apply(&mut req);

        assert_eq!(req.get("email"), Some(&json!("ada@example.com")));
        assert!(!req.has("missing"));
        assert_eq!(report.touched("toLowerCaseWords"), 1);
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn test_join_sees_earlier_casts() {
        let mut config = CastConfig {
            to_upper_case_words: vec!["last".to_string()],
            ..Default::default()
        };
        config
            .join_strings
            .insert("full".to_string(), " |first,last".to_string());
        let mut req = request(json!({ "first": "grace", "last": "hopper" }));

        apply_casts(&mut req, &config).unwrap();

        assert_eq!(req.get("full"), Some(&json!("grace HOPPER")));
    }

    #[test]
    fn test_join_missing_field_contributes_empty_string() {
        let mut config = CastConfig::default();
        config
            .join_strings
            .insert("code".to_string(), "-|a,nope,b".to_string());
        let mut req = request(json!({ "a": "x", "b": 7 }));

        apply_casts(&mut req, &config).unwrap();

        assert_eq!(req.get("code"), Some(&json!("x--7")));
    }

    #[test]
    fn test_new_field_chain_runs_left_to_right() {
        let mut config = CastConfig::default();
        config
            .new_fields
            .insert("slug".to_string(), "title| trim ,strrev, strtoupper".to_string());
        config
            .new_fields
            .insert("title_copy".to_string(), "title".to_string());
        let mut req = request(json!({ "title": "  abc  " }));

        apply_casts(&mut req, &config).unwrap();

        assert_eq!(req.get("slug"), Some(&json!("CBA")));
        assert_eq!(req.get("title_copy"), Some(&json!("  abc  ")));
    }

    #[test]
    fn test_new_fields_read_before_write() {
        // a 與 b 互相引用：兩者都應看到階段開始前的值
        let mut config = CastConfig::default();
        config.new_fields.insert("a".to_string(), "b|strtoupper".to_string());
        config.new_fields.insert("b".to_string(), "a|strtoupper".to_string());
        let mut req = request(json!({ "a": "first", "b": "second" }));

        apply_casts(&mut req, &config).unwrap();

        assert_eq!(req.get("a"), Some(&json!("SECOND")));
        assert_eq!(req.get("b"), Some(&json!("FIRST")));
    }

    #[test]
    fn test_unknown_method_fails_before_any_write() {
        let mut config = CastConfig {
            to_lower_case_words: vec!["name".to_string()],
            ..Default::default()
        };
        config
            .new_fields
            .insert("shout".to_string(), "name|strtoupper, explode".to_string());
        let mut req = request(json!({ "name": "Hi" }));
        let before = req.clone();

        let err = apply_casts(&mut req, &config).unwrap_err();

        match err {
            CastError::UnknownCastMethod { field, method } => {
                assert_eq!(field, "shout");
                assert_eq!(method, "explode");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(req, before);
    }

    #[test]
    fn test_custom_registry() {
        fn exclaim(value: &Value) -> Value {
            Value::String(format!("{}!", casts::string_form(value)))
        }

        let mut registry = MethodRegistry::empty();
        registry.register("exclaim", exclaim);

        let mut config = CastConfig::default();
        config
            .new_fields
            .insert("greeting".to_string(), "name|exclaim".to_string());

        let pipeline = FieldCastPipeline::with_registry(&config, &registry).unwrap();
        let mut req = request(json!({ "name": "hello" }));
        pipeline.apply(&mut req);

        assert_eq!(req.get("greeting"), Some(&json!("hello!")));
        assert!(FieldCastPipeline::new(&config).is_err());
    }

    #[test]
    fn test_pipeline_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FieldCastPipeline>();
    }
}
