//! Rule declarations
//!
//! The data model record types use to declare their rules, one table per
//! validation domain:
//!
//! - [`FieldValidRules`] — typed-field rules, keyed by scene then rule tag.
//! - [`ExtraValidRules`] — rules over the open string-keyed extra map, keyed
//!   by scene then extra-map key.
//! - [`LocalizeValidRules`] — message tables mapping a failed rule back to a
//!   localized message key and template arguments.
//!
//! Declarations are pure functions of the record type: the engine reads them
//! at registration time and caches the merged result per concrete type.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::scene::Scene;
use crate::tag::{FieldName, Tag};

// ============================================================================
// CHECK FUNCTIONS
// ============================================================================

/// A field predicate: receives the field's snapshot value (or `Null` when the
/// field is absent) and the rule's string parameter.
///
/// Predicate authors are responsible for type safety inside their own
/// closures; a value of an unexpected shape should simply fail the check.
pub type FieldCheckFn = Arc<dyn Fn(&Value, &str) -> bool + Send + Sync>;

/// An extra-map predicate: receives the untyped value stored under the rule's
/// extra-map key. Never invoked for absent keys.
pub type ExtraCheckFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// The open string-keyed side-map a record may carry outside its typed
/// schema.
pub type ExtraMap = serde_json::Map<String, Value>;

// ============================================================================
// FIELD RULES
// ============================================================================

/// Per-scene field rules. The inner map key is the rule identifier, which
/// doubles as the reported failure tag.
pub type FieldValidRules = HashMap<Scene, FieldValidRule>;

/// Field rules of a single scene.
pub type FieldValidRule = HashMap<Tag, FieldValidRuleInfo>;

/// One declared field rule: which field it reads, the parameter handed to the
/// predicate, and the predicate itself.
#[derive(Clone)]
pub struct FieldValidRuleInfo {
    /// Snapshot key of the field the rule reads and reports against.
    pub field: FieldName,
    /// Free-form rule parameter, forwarded to the predicate and carried on
    /// the raw violation.
    pub param: String,
    /// The predicate.
    pub check: FieldCheckFn,
}

impl FieldValidRuleInfo {
    /// Declares a rule from a closure.
    pub fn new<F>(field: impl Into<FieldName>, check: F) -> Self
    where
        F: Fn(&Value, &str) -> bool + Send + Sync + 'static,
    {
        Self {
            field: field.into(),
            param: String::new(),
            check: Arc::new(check),
        }
    }

    /// Declares a rule from a prebuilt check (see [`crate::checks`]).
    pub fn with_check(field: impl Into<FieldName>, check: FieldCheckFn) -> Self {
        Self {
            field: field.into(),
            param: String::new(),
            check,
        }
    }

    /// Sets the rule parameter.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.param = param.into();
        self
    }
}

impl fmt::Debug for FieldValidRuleInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldValidRuleInfo")
            .field("field", &self.field)
            .field("param", &self.param)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// EXTRA RULES
// ============================================================================

/// Per-scene extra-map rules. The inner map key is the extra-map key the rule
/// checks.
pub type ExtraValidRules = HashMap<Scene, ExtraValidRule>;

/// Extra-map rules of a single scene.
pub type ExtraValidRule = HashMap<String, ExtraValidRuleInfo>;

/// One declared extra-map rule.
///
/// A rule tagged [`Tag::REQUIRED`] reports a violation when its key is absent
/// from the map; any rule whose key is present runs the predicate. Absent key
/// plus a non-required tag is silently valid: no data, no opinion.
#[derive(Clone)]
pub struct ExtraValidRuleInfo {
    /// Name the failure is reported against (need not equal the map key).
    pub field: FieldName,
    /// Reported failure tag.
    pub tag: Tag,
    /// Free-form rule parameter carried on the raw violation.
    pub param: String,
    /// The predicate, run only when the key is present.
    pub check: ExtraCheckFn,
}

impl ExtraValidRuleInfo {
    /// Declares a rule from a closure.
    pub fn new<F>(field: impl Into<FieldName>, tag: impl Into<Tag>, check: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            field: field.into(),
            tag: tag.into(),
            param: String::new(),
            check: Arc::new(check),
        }
    }

    /// Declares a rule from a prebuilt check (see [`crate::checks`]).
    pub fn with_check(
        field: impl Into<FieldName>,
        tag: impl Into<Tag>,
        check: ExtraCheckFn,
    ) -> Self {
        Self {
            field: field.into(),
            tag: tag.into(),
            param: String::new(),
            check,
        }
    }

    /// Declares a presence requirement: violated iff the key is absent.
    pub fn required(field: impl Into<FieldName>) -> Self {
        Self::new(field, Tag::REQUIRED, |_| true)
    }

    /// Sets the rule parameter.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.param = param.into();
        self
    }
}

impl fmt::Debug for ExtraValidRuleInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtraValidRuleInfo")
            .field("field", &self.field)
            .field("tag", &self.tag)
            .field("param", &self.param)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// LOCALIZATION RULES
// ============================================================================

/// Per-scene localization tables.
pub type LocalizeValidRules = HashMap<Scene, LocalizeValidRule>;

/// Message tables of a single scene.
///
/// `rule1` matches a failure on (tag, field); `rule2` matches on tag alone.
/// The two are checked independently, so one raw failure can yield a message
/// from each.
#[derive(Debug, Clone, Default)]
pub struct LocalizeValidRule {
    /// Tag + field templates.
    pub rule1: HashMap<Tag, HashMap<FieldName, LocalizeValidRuleParam>>,
    /// Tag-only templates.
    pub rule2: HashMap<Tag, LocalizeValidRuleParam>,
}

impl LocalizeValidRule {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a (tag, field) template.
    #[must_use = "builder methods must be chained or built"]
    pub fn rule1(
        mut self,
        tag: impl Into<Tag>,
        field: impl Into<FieldName>,
        param: LocalizeValidRuleParam,
    ) -> Self {
        self.rule1
            .entry(tag.into())
            .or_default()
            .insert(field.into(), param);
        self
    }

    /// Adds a tag-only template.
    #[must_use = "builder methods must be chained or built"]
    pub fn rule2(mut self, tag: impl Into<Tag>, param: LocalizeValidRuleParam) -> Self {
        self.rule2.insert(tag.into(), param);
        self
    }
}

/// One message template: the message key, whether to append the raw rule
/// parameter to the arguments, and the fixed template arguments.
#[derive(Debug, Clone)]
pub struct LocalizeValidRuleParam {
    /// Message key handed to the caller's localization layer.
    pub msg: std::borrow::Cow<'static, str>,
    /// Append the failing rule's raw parameter as the final argument.
    pub with_param: bool,
    /// Fixed template arguments.
    pub args: Vec<Value>,
}

impl LocalizeValidRuleParam {
    /// Creates a template with no arguments.
    pub fn msg(msg: impl Into<std::borrow::Cow<'static, str>>) -> Self {
        Self {
            msg: msg.into(),
            with_param: false,
            args: Vec::new(),
        }
    }

    /// Appends the raw rule parameter to the rendered arguments.
    #[must_use = "builder methods must be chained or built"]
    pub fn include_raw_param(mut self) -> Self {
        self.with_param = true;
        self
    }

    /// Sets the fixed template arguments.
    #[must_use = "builder methods must be chained or built"]
    pub fn args<I>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        self.args = args.into_iter().collect();
        self
    }
}

// ============================================================================
// VIOLATION
// ============================================================================

/// A raw rule failure, before localization.
#[derive(Debug, Clone)]
pub struct Violation {
    /// The offending value (`Null` when the field or key was absent).
    pub value: Value,
    /// Name the failure is reported against.
    pub field: FieldName,
    /// Failure tag.
    pub tag: Tag,
    /// Raw rule parameter.
    pub param: String,
}

impl Violation {
    /// Creates a violation.
    pub fn new(
        value: Value,
        field: impl Into<FieldName>,
        tag: impl Into<Tag>,
        param: impl Into<String>,
    ) -> Self {
        Self {
            value,
            field: field.into(),
            tag: tag.into(),
            param: param.into(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_rule_builder() {
        let info = FieldValidRuleInfo::new("name", |value, _| value.is_string()).with_param("1,50");
        assert_eq!(info.field, FieldName::from("name"));
        assert_eq!(info.param, "1,50");
        assert!((info.check)(&json!("ok"), "1,50"));
        assert!(!(info.check)(&json!(7), "1,50"));
    }

    #[test]
    fn test_extra_required_never_rejects_present_values() {
        let info = ExtraValidRuleInfo::required("Name");
        assert_eq!(info.tag, Tag::REQUIRED);
        assert!((info.check)(&json!("anything")));
    }

    #[test]
    fn test_localize_rule_builder() {
        let rule = LocalizeValidRule::new()
            .rule1(
                Tag::REQUIRED,
                "Name",
                LocalizeValidRuleParam::msg("format_s_input_required").args([json!("org_name")]),
            )
            .rule2("name-format", LocalizeValidRuleParam::msg("format_org_name_err"));

        let fields = rule.rule1.get(&Tag::REQUIRED).unwrap();
        assert_eq!(
            fields.get(&FieldName::from("Name")).unwrap().msg,
            "format_s_input_required"
        );
        assert!(rule.rule2.contains_key(&Tag::new("name-format")));
    }

    #[test]
    fn test_template_raw_param_flag() {
        let param = LocalizeValidRuleParam::msg("range_err").include_raw_param();
        assert!(param.with_param);
        assert!(param.args.is_empty());
    }
}
