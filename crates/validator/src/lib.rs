//! # scenic-validator
//!
//! A scene-aware validation engine for composed record types.
//!
//! Record types declare rules per [`Scene`](scene::Scene) — a bitmask naming
//! the context of a run (insert, update, query, ...) — across three domains:
//! typed fields, the open extra map, and cross-field invariants. Declarations
//! are merged across a record's composed sub-records, cached once per
//! (type, scene), and failures come back as localized message keys ready for
//! the caller's i18n layer.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use scenic_validator::prelude::*;
//!
//! #[derive(Serialize)]
//! struct Org {
//!     #[serde(flatten)]
//!     audit: Audit,
//!     name: String,
//! }
//!
//! impl FieldRules for Org {
//!     fn field_rules(&self) -> FieldValidRules {
//!         HashMap::from([(
//!             Scene::ALL,
//!             HashMap::from([(
//!                 Tag::new("name-format"),
//!                 FieldValidRuleInfo::with_check("name", checks::length_between(1, 50)),
//!             )]),
//!         )])
//!     }
//! }
//!
//! impl Validatable for Org {
//!     fn snapshot(&self) -> Result<Value, serde_json::Error> { snapshot_of(self) }
//!     fn type_key(&self) -> TypeId { TypeId::of::<Self>() }
//!     fn components(&self) -> Vec<&dyn Validatable> { vec![&self.audit] }
//!     fn as_field_rules(&self) -> Option<&dyn FieldRules> { Some(self) }
//! }
//!
//! let errs = check(Some(&org), Scene::INSERT);
//! assert!(errs.is_empty());
//! ```
//!
//! ## Layout
//!
//! - [`scene`] — scene bitmasks and the subset matching law
//! - [`tag`] — rule tags and reported field names
//! - [`rules`] — the rule-declaration data model
//! - [`checks`] — prebuilt field and extra-map predicates
//! - [`traits`] — the [`Validatable`](traits::Validatable) protocol and its
//!   optional capabilities
//! - [`engine`] — registration caches and the execution passes
//! - [`error`] — [`MsgErr`](error::MsgErr) and the engine's own error type

pub mod checks;
pub mod engine;
pub mod error;
mod localize;
pub mod prelude;
pub mod rules;
pub mod scene;
pub mod tag;
pub mod traits;

pub use engine::{CacheStats, Validator, check, global};
pub use error::{MsgErr, ValidError};
pub use scene::Scene;
pub use tag::{FieldName, Tag};
pub use traits::{ExtraRules, FieldRules, LocalizeRules, StructRules, Validatable, snapshot_of};
