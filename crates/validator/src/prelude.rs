//! Common imports for declaring and running validations.
//!
//! ```rust,ignore
//! use scenic_validator::prelude::*;
//! ```

pub use crate::checks;
pub use crate::engine::{Validator, check, global};
pub use crate::error::{MSG_INVALID_OBJECT, MSG_UNKNOWN_VALIDATOR, MSG_VALIDATION_FAILED, MsgErr};
pub use crate::rules::{
    ExtraMap, ExtraValidRule, ExtraValidRuleInfo, ExtraValidRules, FieldValidRule,
    FieldValidRuleInfo, FieldValidRules, LocalizeValidRule, LocalizeValidRuleParam,
    LocalizeValidRules, Violation,
};
pub use crate::scene::Scene;
pub use crate::tag::{FieldName, Tag};
pub use crate::traits::{
    ExtraRules, FieldRules, LocalizeRules, StructRules, Validatable, snapshot_of,
};
