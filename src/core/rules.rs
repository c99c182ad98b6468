use crate::utils::error::{CastError, Result};

const RULE_DELIMITER: char = '|';
const LIST_DELIMITER: char = ',';

/// `"<glue>|<field1>,<field2>,..."`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRule {
    pub target: String,
    pub glue: String,
    pub fields: Vec<String>,
}

/// `"<source>|<method1>, <method2>, ..."`, or just `"<source>"` for a copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFieldRule {
    pub target: String,
    pub source: String,
    pub methods: Vec<String>,
}

impl JoinRule {
    pub fn parse(target: &str, rule: &str) -> Result<Self> {
        let Some((glue, list)) = rule.split_once(RULE_DELIMITER) else {
            return Err(malformed(target, "join rule must look like \"<glue>|a,b\""));
        };

        let fields = split_list(target, list, "field")?;

        Ok(Self {
            target: target.to_string(),
            glue: glue.to_string(),
            fields,
        })
    }
}

impl NewFieldRule {
    pub fn parse(target: &str, rule: &str) -> Result<Self> {
        let (source, methods) = match rule.split_once(RULE_DELIMITER) {
            Some((source, list)) => (source.trim(), split_list(target, list, "method")?),
            None => (rule.trim(), Vec::new()),
        };

        if source.is_empty() {
            return Err(malformed(target, "source field name is empty"));
        }

        Ok(Self {
            target: target.to_string(),
            source: source.to_string(),
            methods,
        })
    }

    pub fn is_copy(&self) -> bool {
        self.methods.is_empty()
    }
}

fn split_list(target: &str, list: &str, what: &str) -> Result<Vec<String>> {
    if list.trim().is_empty() {
        return Err(malformed(target, &format!("{} list after '|' is empty", what)));
    }

    list.split(LIST_DELIMITER)
        .map(str::trim)
        .enumerate()
        .map(|(index, name)| {
            if name.is_empty() {
                Err(malformed(
                    target,
                    &format!("{} #{} in '{}' is empty", what, index + 1, list),
                ))
            } else {
                Ok(name.to_string())
            }
        })
        .collect()
}

fn malformed(target: &str, reason: &str) -> CastError {
    CastError::MalformedCastRule {
        field: target.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_join_rule() {
        let rule = JoinRule::parse("full_name", " |first_name, last_name").unwrap();
        assert_eq!(rule.glue, " ");
        assert_eq!(rule.fields, vec!["first_name", "last_name"]);
    }

    #[test]
    fn test_join_glue_may_be_empty() {
        let rule = JoinRule::parse("code", "|prefix,number").unwrap();
        assert_eq!(rule.glue, "");
        assert_eq!(rule.fields.len(), 2);
    }

    #[test]
    fn test_malformed_join_rules() {
        for rule in ["first_name,last_name", "-|", "-|a,,b", "-|  "] {
            match JoinRule::parse("full_name", rule) {
                Err(CastError::MalformedCastRule { field, .. }) => assert_eq!(field, "full_name"),
                other => panic!("expected MalformedCastRule for {:?}, got {:?}", rule, other),
            }
        }
    }

    #[test]
    fn test_parse_new_field_rule() {
        let rule = NewFieldRule::parse("slug", "title|trim, strtolower,str_slug").unwrap();
        assert_eq!(rule.source, "title");
        assert_eq!(rule.methods, vec!["trim", "strtolower", "str_slug"]);
        assert!(!rule.is_copy());

        let copy = NewFieldRule::parse("backup_email", "email").unwrap();
        assert!(copy.is_copy());
        assert_eq!(copy.source, "email");
    }

    #[test]
    fn test_malformed_new_field_rules() {
        for rule in ["", "|trim", "name|", "name|trim,"] {
            assert!(
                matches!(
                    NewFieldRule::parse("derived", rule),
                    Err(CastError::MalformedCastRule { .. })
                ),
                "rule {:?} should be rejected",
                rule
            );
        }
    }
}
