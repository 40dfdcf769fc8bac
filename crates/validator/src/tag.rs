//! Rule tags and field names
//!
//! A [`Tag`] classifies a rule failure for localization lookup. The four
//! reserved tags (`required`, `format`, `range`, `check`) cover the common
//! categories; free-form tags (e.g. `"name-format"`) identify record-specific
//! rules and are matched by tag-only localization entries.
//!
//! Both types wrap `Cow<'static, str>` so the reserved constants and the
//! usual literal declarations never allocate.

use std::borrow::Cow;
use std::fmt;

// ============================================================================
// TAG
// ============================================================================

/// A rule-category label, used both as a rule identifier and as a
/// localization lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(Cow<'static, str>);

impl Tag {
    /// The value must be present and non-zero.
    pub const REQUIRED: Tag = Tag(Cow::Borrowed("required"));
    /// The value is malformed.
    pub const FORMAT: Tag = Tag(Cow::Borrowed("format"));
    /// The value is out of bounds.
    pub const RANGE: Tag = Tag(Cow::Borrowed("range"));
    /// A cross-field invariant does not hold.
    pub const CHECK: Tag = Tag(Cow::Borrowed("check"));

    /// Creates a free-form tag.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Tag(name.into())
    }

    /// Returns the tag text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for Tag {
    fn from(name: &'static str) -> Self {
        Tag(Cow::Borrowed(name))
    }
}

impl From<String> for Tag {
    fn from(name: String) -> Self {
        Tag(Cow::Owned(name))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// FIELD NAME
// ============================================================================

/// The name a rule failure is reported against.
///
/// For typed fields this is the snapshot key of the field; for extra-map and
/// struct rules it is whatever name the declaring record chooses to report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldName(Cow<'static, str>);

impl FieldName {
    /// Creates a field name.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        FieldName(name.into())
    }

    /// Returns the field name text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for FieldName {
    fn from(name: &'static str) -> Self {
        FieldName(Cow::Borrowed(name))
    }
}

impl From<String> for FieldName {
    fn from(name: String) -> Self {
        FieldName(Cow::Owned(name))
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_tags() {
        assert_eq!(Tag::REQUIRED.as_str(), "required");
        assert_eq!(Tag::FORMAT.as_str(), "format");
        assert_eq!(Tag::RANGE.as_str(), "range");
        assert_eq!(Tag::CHECK.as_str(), "check");
    }

    #[test]
    fn test_free_form_tag_equality() {
        assert_eq!(Tag::new("name-format"), Tag::from("name-format"));
        assert_eq!(Tag::new(String::from("required")), Tag::REQUIRED);
        assert_ne!(Tag::new("name-format"), Tag::new("display-format"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Tag::CHECK.to_string(), "check");
        assert_eq!(FieldName::from("create_at").to_string(), "create_at");
    }
}
