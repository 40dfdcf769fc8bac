//! Error shapes
//!
//! [`MsgErr`] is the engine's sole externally visible failure unit: a message
//! key plus ordered template arguments, resolved to display text by the
//! caller. [`ValidError`] covers the engine's own failures (nil input,
//! snapshot serialization) and rides along inside a `MsgErr`.

use std::borrow::Cow;
use std::fmt;

use serde_json::Value;
use smallvec::SmallVec;
use thiserror::Error;

// ============================================================================
// MESSAGE KEYS
// ============================================================================

/// Message key for a nil/absent validation object.
pub const MSG_INVALID_OBJECT: &str = "invalid_object_validation";
/// Message key for an unexpected engine failure.
pub const MSG_UNKNOWN_VALIDATOR: &str = "unknown_validator_err";
/// Message key of the generic fallback when no localized rule matches.
pub const MSG_VALIDATION_FAILED: &str = "validation_failed";

// ============================================================================
// ENGINE ERRORS
// ============================================================================

/// Failures of the engine itself, as opposed to rule violations (which are
/// data, not errors).
#[derive(Debug, Error)]
pub enum ValidError {
    /// The validation object was absent.
    #[error("validation object cannot be nil")]
    NilObject,

    /// The record could not be serialized into a snapshot.
    #[error("record snapshot failed: {0}")]
    Snapshot(#[from] serde_json::Error),
}

// ============================================================================
// MSG ERR
// ============================================================================

/// Ordered template arguments of a [`MsgErr`].
///
/// Most messages carry zero to two arguments, so they live inline.
pub type MsgParams = SmallVec<[Value; 2]>;

/// A localized (or localizable) validation failure: a message key plus the
/// ordered arguments its template expects. Immutable once produced.
#[derive(Debug)]
pub struct MsgErr {
    /// Underlying engine error, when one exists.
    pub err: Option<ValidError>,
    /// Message key for the caller's localization layer.
    pub msg: Cow<'static, str>,
    /// Ordered message arguments.
    pub params: MsgParams,
}

impl MsgErr {
    /// Creates a message error with no arguments.
    pub fn new(msg: impl Into<Cow<'static, str>>) -> Self {
        Self {
            err: None,
            msg: msg.into(),
            params: MsgParams::new(),
        }
    }

    /// Attaches the underlying engine error.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_err(mut self, err: ValidError) -> Self {
        self.err = Some(err);
        self
    }

    /// Sets the ordered message arguments.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_params<I>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        self.params = params.into_iter().collect();
        self
    }

    /// The failure returned for a nil validation object.
    #[must_use]
    pub fn invalid_object() -> Self {
        Self::new(MSG_INVALID_OBJECT).with_err(ValidError::NilObject)
    }
}

impl fmt::Display for MsgErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.msg)?;
        if !self.params.is_empty() {
            write!(f, " (params: [")?;
            for (i, param) in self.params.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{param}")?;
            }
            write!(f, "])")?;
        }
        if let Some(err) = &self.err {
            write!(f, " [{err}]")?;
        }
        Ok(())
    }
}

impl std::error::Error for MsgErr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.err
            .as_ref()
            .map(|err| err as &(dyn std::error::Error + 'static))
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
    fn test_invalid_object_shape() {
        let err = MsgErr::invalid_object();
        assert_eq!(err.msg, MSG_INVALID_OBJECT);
        assert!(matches!(err.err, Some(ValidError::NilObject)));
        assert!(err.params.is_empty());
    }

    #[test]
    fn test_display_with_params() {
        let err = MsgErr::new("format_s_input_required")
            .with_params([json!("org_name"), json!(5)]);
        assert_eq!(
            err.to_string(),
            "format_s_input_required (params: [\"org_name\", 5])"
        );
    }

    #[test]
    fn test_display_plain() {
        assert_eq!(MsgErr::new("check_create_at_err").to_string(), "check_create_at_err");
    }

    #[test]
    fn test_source_carries_engine_error() {
        use std::error::Error;

        let err = MsgErr::invalid_object();
        assert!(err.source().is_some());
        assert!(MsgErr::new("x").source().is_none());
    }
}
