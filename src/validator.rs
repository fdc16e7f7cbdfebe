//! Validator descriptors.
//!
//! A validator only describes a rule: it carries a rule tag and an error
//! message template. Binding it to a [`ParamDescriptor`] materializes the
//! human-readable message shown in the parameter table.

use crate::model::ParamDescriptor;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::sync::LazyLock;

static RE_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{#(\w+)\}").unwrap());

/// Rule kinds with their rule-specific arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Required,
    Optional,
    MaxLength(usize),
    MinLength(usize),
    Alpha,
    AlphaDash,
    AlphaNum,
    IsNumeric,
    Integer,
    Between { min: Number, max: Number },
    InArray(Vec<Value>),
    Regex(String),
    Url,
}

impl Rule {
    pub fn name(&self) -> &'static str {
        match self {
            Rule::Required => "Required",
            Rule::Optional => "Optional",
            Rule::MaxLength(_) => "MaxLength",
            Rule::MinLength(_) => "MinLength",
            Rule::Alpha => "Alpha",
            Rule::AlphaDash => "AlphaDash",
            Rule::AlphaNum => "AlphaNum",
            Rule::IsNumeric => "IsNumeric",
            Rule::Integer => "Integer",
            Rule::Between { .. } => "Between",
            Rule::InArray(_) => "InArray",
            Rule::Regex(_) => "Regex",
            Rule::Url => "Url",
        }
    }

    fn default_template(&self) -> &'static str {
        match self {
            Rule::Required => "{#name} must be set",
            Rule::Optional => "{#name} is optional",
            Rule::MaxLength(_) => "{#name} max length is {#maxLen}",
            Rule::MinLength(_) => "{#name} min length is {#minLen}",
            Rule::Alpha => "{#name} must be all alpha",
            Rule::AlphaDash => "{#name} must be all AlphaDash",
            Rule::AlphaNum => "{#name} must be all alpha or number",
            Rule::IsNumeric => "{#name} must be numeric",
            Rule::Integer => "{#name} must be integer",
            Rule::Between { .. } => "{#name} must between {#min} and {#max}",
            Rule::InArray(_) => "{#name} must in array of {#array}",
            Rule::Regex(_) => "{#name} must meet specified rules",
            Rule::Url => "{#name} must be url",
        }
    }

    /// Rule-specific placeholder values (everything except `{#name}`).
    fn placeholder(&self, key: &str) -> Option<String> {
        match (self, key) {
            (Rule::MaxLength(n), "maxLen") => Some(n.to_string()),
            (Rule::MinLength(n), "minLen") => Some(n.to_string()),
            (Rule::Between { min, .. }, "min") => Some(min.to_string()),
            (Rule::Between { max, .. }, "max") => Some(max.to_string()),
            (Rule::InArray(items), "array") => Some(Value::Array(items.clone()).to_string()),
            (Rule::Regex(pattern), "rule") => Some(pattern.clone()),
            _ => None,
        }
    }
}

/// A named rule with its message template.
#[derive(Debug, Clone, PartialEq)]
pub struct Validator {
    rule: Rule,
    template: String,
}

impl Validator {
    pub fn new(rule: Rule) -> Self {
        let template = rule.default_template().to_string();
        Self { rule, template }
    }

    /// Replace the default template; an empty override keeps the default.
    pub fn with_message(mut self, template: impl Into<String>) -> Self {
        let template = template.into();
        if !template.is_empty() {
            self.template = template;
        }
        self
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn rule_name(&self) -> &'static str {
        self.rule.name()
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Materialize the message for a bound parameter.
    ///
    /// Unknown placeholders are left in place.
    pub fn message(&self, param: &ParamDescriptor) -> String {
        RE_PLACEHOLDER
            .replace_all(&self.template, |caps: &regex::Captures| {
                let key = &caps[1];
                if key == "name" {
                    return param.name.clone();
                }
                self.rule
                    .placeholder(key)
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

// -- Declaration surface ------------------------------------------------------

/// A validator as declared: either a bare rule name (`"required"`) or a
/// table carrying a `rule` tag and the rule's arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValidatorArgs {
    Name(String),
    Rule(RuleArgs),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RuleArgs {
    Required {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error_msg: Option<String>,
    },
    Optional {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error_msg: Option<String>,
    },
    MaxLength {
        max_len: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error_msg: Option<String>,
    },
    MinLength {
        min_len: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error_msg: Option<String>,
    },
    Alpha {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error_msg: Option<String>,
    },
    AlphaDash {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error_msg: Option<String>,
    },
    AlphaNum {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error_msg: Option<String>,
    },
    IsNumeric {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error_msg: Option<String>,
    },
    Integer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error_msg: Option<String>,
    },
    Between {
        min: Number,
        max: Number,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error_msg: Option<String>,
    },
    InArray {
        array: Vec<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error_msg: Option<String>,
    },
    Regex {
        rule_pattern: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error_msg: Option<String>,
    },
    Url {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error_msg: Option<String>,
    },
}

impl ValidatorArgs {
    /// Build the validator, rejecting unknown rule names and bad arguments.
    pub fn into_validator(self) -> Result<Validator, String> {
        let args = match self {
            ValidatorArgs::Rule(args) => args,
            ValidatorArgs::Name(name) => {
                serde_json::from_value::<RuleArgs>(serde_json::json!({ "rule": name }))
                    .map_err(|e| format!("invalid validator `{}`: {}", name, e))?
            }
        };
        args.into_validator()
    }
}

impl RuleArgs {
    fn into_validator(self) -> Result<Validator, String> {
        let (rule, error_msg) = match self {
            RuleArgs::Required { error_msg } => (Rule::Required, error_msg),
            RuleArgs::Optional { error_msg } => (Rule::Optional, error_msg),
            RuleArgs::MaxLength { max_len, error_msg } => (Rule::MaxLength(max_len), error_msg),
            RuleArgs::MinLength { min_len, error_msg } => (Rule::MinLength(min_len), error_msg),
            RuleArgs::Alpha { error_msg } => (Rule::Alpha, error_msg),
            RuleArgs::AlphaDash { error_msg } => (Rule::AlphaDash, error_msg),
            RuleArgs::AlphaNum { error_msg } => (Rule::AlphaNum, error_msg),
            RuleArgs::IsNumeric { error_msg } => (Rule::IsNumeric, error_msg),
            RuleArgs::Integer { error_msg } => (Rule::Integer, error_msg),
            RuleArgs::Between {
                min,
                max,
                error_msg,
            } => {
                if min.as_f64() > max.as_f64() {
                    return Err(format!("between min {} is greater than max {}", min, max));
                }
                (Rule::Between { min, max }, error_msg)
            }
            RuleArgs::InArray { array, error_msg } => (Rule::InArray(array), error_msg),
            RuleArgs::Regex {
                rule_pattern,
                error_msg,
            } => {
                Regex::new(&rule_pattern)
                    .map_err(|e| format!("invalid regex rule `{}`: {}", rule_pattern, e))?;
                (Rule::Regex(rule_pattern), error_msg)
            }
            RuleArgs::Url { error_msg } => (Rule::Url, error_msg),
        };
        let validator = Validator::new(rule);
        Ok(match error_msg {
            Some(msg) => validator.with_message(msg),
            None => validator,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(name: &str) -> ParamDescriptor {
        ParamDescriptor::new(name)
    }

    #[test]
    fn required_message() {
        let v = Validator::new(Rule::Required);
        assert_eq!(v.message(&param("account")), "account must be set");
        assert_eq!(v.rule_name(), "Required");
    }

    #[test]
    fn max_length_substitutes_argument() {
        let v = Validator::new(Rule::MaxLength(15));
        assert_eq!(v.message(&param("password")), "password max length is 15");
    }

    #[test]
    fn custom_template() {
        let v = Validator::new(Rule::Alpha).with_message("{#name} letters only");
        assert_eq!(v.message(&param("nick")), "nick letters only");
    }

    #[test]
    fn empty_override_keeps_default() {
        let v = Validator::new(Rule::IsNumeric).with_message("");
        assert_eq!(v.message(&param("age")), "age must be numeric");
    }

    #[test]
    fn unknown_placeholder_left_alone() {
        let v = Validator::new(Rule::Required).with_message("{#name} {#nope}");
        assert_eq!(v.message(&param("a")), "a {#nope}");
    }

    #[test]
    fn in_array_renders_compact_list() {
        let v = Validator::new(Rule::InArray(vec![Value::from("a"), Value::from(1)]));
        assert_eq!(v.message(&param("kind")), "kind must in array of [\"a\",1]");
    }

    #[test]
    fn bare_name_shorthand() {
        let v = ValidatorArgs::Name("alpha_dash".into()).into_validator().unwrap();
        assert_eq!(v.rule(), &Rule::AlphaDash);
    }

    #[test]
    fn shorthand_rejects_rule_with_arguments() {
        let err = ValidatorArgs::Name("max_length".into())
            .into_validator()
            .unwrap_err();
        assert!(err.contains("max_length"), "{err}");
    }

    #[test]
    fn invalid_regex_rejected() {
        let err = ValidatorArgs::Rule(RuleArgs::Regex {
            rule_pattern: "(".into(),
            error_msg: None,
        })
        .into_validator()
        .unwrap_err();
        assert!(err.contains("invalid regex"));
    }

    #[test]
    fn between_bounds_checked() {
        let err = ValidatorArgs::Rule(RuleArgs::Between {
            min: Number::from(10),
            max: Number::from(1),
            error_msg: None,
        })
        .into_validator()
        .unwrap_err();
        assert!(err.contains("greater than"));
    }
}
