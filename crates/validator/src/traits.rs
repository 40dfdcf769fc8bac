//! Rule declaration protocol
//!
//! A record type opts into validation domains by implementing any subset of
//! the four capability traits ([`FieldRules`], [`ExtraRules`],
//! [`StructRules`], [`LocalizeRules`]) and exposing them through the
//! [`Validatable`] accessors. A capability that stays `None` simply skips
//! that domain for the type — none are mandatory.
//!
//! Composition is explicit: [`Validatable::components`] returns the directly
//! composed sub-records (present ones only), and the engine walks them
//! depth-first so a parent type inherits its components' rules, with its own
//! declarations winning on collision.
//!
//! ```rust,ignore
//! #[derive(Serialize)]
//! struct Org {
//!     #[serde(flatten)]
//!     audit: Audit,
//!     name: String,
//! }
//!
//! impl Validatable for Org {
//!     fn snapshot(&self) -> Result<Value, serde_json::Error> {
//!         snapshot_of(self)
//!     }
//!     fn type_key(&self) -> TypeId {
//!         TypeId::of::<Self>()
//!     }
//!     fn components(&self) -> Vec<&dyn Validatable> {
//!         vec![&self.audit]
//!     }
//!     fn as_field_rules(&self) -> Option<&dyn FieldRules> {
//!         Some(self)
//!     }
//! }
//! ```

use std::any::TypeId;

use serde::Serialize;
use serde_json::Value;

use crate::rules::{ExtraMap, ExtraValidRules, FieldValidRules, LocalizeValidRules, Violation};
use crate::scene::Scene;

// ============================================================================
// CAPABILITY TRAITS
// ============================================================================

/// Supplies per-scene typed-field rules.
pub trait FieldRules {
    /// The type's field-rule declarations. Must be a pure function of the
    /// type: the engine reads it once per (type, scene) and caches the
    /// merged plan.
    fn field_rules(&self) -> FieldValidRules;
}

/// Supplies the open extra map and its per-scene rules.
pub trait ExtraRules {
    /// The record's extra map and the type's extra-rule declarations.
    fn extra_rules(&self) -> (ExtraMap, ExtraValidRules);
}

/// Supplies cross-field invariants over the whole record.
pub trait StructRules {
    /// Reports zero or more violations for `scene`. Invoked once for
    /// [`Scene::ALL`] and once for the requested scene.
    fn struct_rules(&self, scene: Scene, report: &mut dyn FnMut(Violation));
}

/// Supplies per-scene localized message tables.
pub trait LocalizeRules {
    /// The type's localization declarations. Pure function of the type;
    /// the merged table is cached per (type, scene).
    fn localize_rules(&self) -> LocalizeValidRules;
}

// ============================================================================
// VALIDATABLE
// ============================================================================

/// The umbrella contract every validatable record implements.
///
/// Carries the record's serialized snapshot, its composition structure, and
/// accessors for the optional capabilities above. `Send + Sync` because the
/// engine is invoked from arbitrarily many concurrent callers.
pub trait Validatable: Send + Sync {
    /// Serialized view of the record; the field pass reads field values out
    /// of it. Usually one line: [`snapshot_of`]`(self)`.
    fn snapshot(&self) -> Result<Value, serde_json::Error>;

    /// Cache key for the concrete record type. Always
    /// `TypeId::of::<Self>()`.
    fn type_key(&self) -> TypeId;

    /// Directly composed sub-records, present ones only. An absent optional
    /// component is simply not returned, and is skipped without error.
    fn components(&self) -> Vec<&dyn Validatable> {
        Vec::new()
    }

    /// Field-rule capability, if implemented.
    fn as_field_rules(&self) -> Option<&dyn FieldRules> {
        None
    }

    /// Extra-map capability, if implemented.
    fn as_extra_rules(&self) -> Option<&dyn ExtraRules> {
        None
    }

    /// Cross-field capability, if implemented.
    fn as_struct_rules(&self) -> Option<&dyn StructRules> {
        None
    }

    /// Localization capability, if implemented.
    fn as_localize_rules(&self) -> Option<&dyn LocalizeRules> {
        None
    }
}

/// One-line [`Validatable::snapshot`] implementation for `Serialize` records.
pub fn snapshot_of<T: Serialize>(record: &T) -> Result<Value, serde_json::Error> {
    serde_json::to_value(record)
}

// ============================================================================
// TESTS
// ============================================================================
