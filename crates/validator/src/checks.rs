//! Built-in checks
//!
//! Prebuilt predicates for the rule declarations most record types need:
//! presence, string length, numeric range, regex patterns, and membership.
//! Each constructor returns a check function ready to drop into a
//! [`FieldValidRuleInfo`](crate::rules::FieldValidRuleInfo) or
//! [`ExtraValidRuleInfo`](crate::rules::ExtraValidRuleInfo).
//!
//! String lengths are counted in Unicode scalar values, not bytes.

use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

use crate::rules::{ExtraCheckFn, FieldCheckFn};

// ============================================================================
// ZERO VALUES
// ============================================================================

/// Returns `true` for the zero value of each JSON shape: `null`, `false`,
/// `0`, `""`, `[]`, `{}`.
///
/// This is the notion of "missing" the [`required`] check uses: an absent
/// field surfaces as `null`, a present-but-empty one as its empty shape.
#[must_use]
pub fn is_zero_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

// ============================================================================
// PRESENCE
// ============================================================================

/// Field check that fails on absent or zero values.
#[must_use]
pub fn required() -> FieldCheckFn {
    Arc::new(|value, _| !is_zero_value(value))
}

/// Extra-map check that fails on zero values.
#[must_use]
pub fn non_empty() -> ExtraCheckFn {
    Arc::new(|value| !is_zero_value(value))
}

// ============================================================================
// LENGTH
// ============================================================================

/// Field check: string length within `[min, max]`, inclusive.
///
/// Non-string values fail.
#[must_use]
pub fn length_between(min: usize, max: usize) -> FieldCheckFn {
    Arc::new(move |value, _| match value {
        Value::String(s) => {
            let len = s.chars().count();
            len >= min && len <= max
        }
        _ => false,
    })
}

/// Extra-map check: string value no longer than `max` characters.
///
/// Non-string values fail.
#[must_use]
pub fn max_length(max: usize) -> ExtraCheckFn {
    Arc::new(move |value| match value {
        Value::String(s) => s.chars().count() <= max,
        _ => false,
    })
}

/// Extra-map check: array of strings, at most `max_items` entries, each
/// entry's length within `[min_len, max_len]`.
#[must_use]
pub fn string_list(max_items: usize, min_len: usize, max_len: usize) -> ExtraCheckFn {
    Arc::new(move |value| match value {
        Value::Array(items) => {
            items.len() <= max_items
                && items.iter().all(|item| match item {
                    Value::String(s) => {
                        let len = s.chars().count();
                        len >= min_len && len <= max_len
                    }
                    _ => false,
                })
        }
        _ => false,
    })
}

// ============================================================================
// RANGE
// ============================================================================

/// Field check: numeric value within `[min, max]`, inclusive.
///
/// Non-numeric values fail.
#[must_use]
pub fn in_range(min: f64, max: f64) -> FieldCheckFn {
    Arc::new(move |value, _| {
        value
            .as_f64()
            .is_some_and(|number| number >= min && number <= max)
    })
}

// ============================================================================
// PATTERN
// ============================================================================

/// Field check: string value matches `pattern` (compiled once, up front).
///
/// Non-string values fail.
pub fn pattern(pattern: &str) -> Result<FieldCheckFn, regex::Error> {
    let regex = Regex::new(pattern)?;
    Ok(Arc::new(move |value, _| {
        value.as_str().is_some_and(|s| regex.is_match(s))
    }))
}

// ============================================================================
// MEMBERSHIP
// ============================================================================

/// Field check: value is one of `allowed`.
#[must_use]
pub fn one_of<T, I>(allowed: I) -> FieldCheckFn
where
    T: Into<Value>,
    I: IntoIterator<Item = T>,
{
    let allowed: Vec<Value> = allowed.into_iter().map(Into::into).collect();
    Arc::new(move |value, _| allowed.contains(value))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!(null), true)]
    #[case(json!(false), true)]
    #[case(json!(0), true)]
    #[case(json!(0.0), true)]
    #[case(json!(""), true)]
    #[case(json!([]), true)]
    #[case(json!({}), true)]
    #[case(json!(true), false)]
    #[case(json!(1), false)]
    #[case(json!(-3.5), false)]
    #[case(json!("x"), false)]
    #[case(json!([0]), false)]
    #[case(json!({"k": null}), false)]
    fn test_zero_value_table(#[case] value: Value, #[case] zero: bool) {
        assert_eq!(is_zero_value(&value), zero);
    }

    #[test]
    fn test_required() {
        let check = required();
        assert!(check(&json!("alice"), ""));
        assert!(!check(&json!(""), ""));
        assert!(!check(&Value::Null, ""));
    }

    #[test]
    fn test_length_between_counts_chars() {
        let check = length_between(1, 5);
        assert!(check(&json!("hello"), ""));
        assert!(check(&json!("\u{1f44b}\u{1f30d}"), "")); // 2 chars, 8 bytes
        assert!(!check(&json!(""), ""));
        assert!(!check(&json!("toolong"), ""));
        assert!(!check(&json!(42), ""));
    }

    #[test]
    fn test_max_length() {
        let check = max_length(3);
        assert!(check(&json!("abc")));
        assert!(!check(&json!("abcd")));
        assert!(!check(&json!(["abc"])));
    }

    #[test]
    fn test_string_list() {
        let check = string_list(2, 1, 3);
        assert!(check(&json!(["a", "bcd"])));
        assert!(check(&json!([])));
        assert!(!check(&json!(["a", "b", "c"]))); // too many
        assert!(!check(&json!(["toolong"])));
        assert!(!check(&json!([""])));
        assert!(!check(&json!([1])));
        assert!(!check(&json!("a")));
    }

    #[test]
    fn test_in_range() {
        let check = in_range(0.0, 10.0);
        assert!(check(&json!(0), ""));
        assert!(check(&json!(10), ""));
        assert!(check(&json!(5.5), ""));
        assert!(!check(&json!(-1), ""));
        assert!(!check(&json!(11), ""));
        assert!(!check(&json!("5"), ""));
    }

    #[test]
    fn test_pattern() {
        let check = pattern(r"^[\w-]+$").unwrap();
        assert!(check(&json!("team_a-1"), ""));
        assert!(!check(&json!("team a"), ""));
        assert!(!check(&json!(3), ""));
    }

    #[test]
    fn test_pattern_rejects_bad_regex() {
        assert!(pattern("(unclosed").is_err());
    }

    #[test]
    fn test_one_of() {
        let check = one_of([0_u8, 1, 2]);
        assert!(check(&json!(1), ""));
        assert!(!check(&json!(3), ""));
        assert!(!check(&json!("1"), ""));
    }
}
