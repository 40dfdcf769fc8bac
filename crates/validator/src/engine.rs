//! Rule registration and execution core
//!
//! [`Validator`] owns the two process-lifetime caches — merged field-rule
//! plans and merged localization tables, both keyed by
//! `(record type, requested scene)` — and drives the three execution passes:
//!
//! 1. **Field pass**: the cached plan's predicates run against a serde
//!    snapshot of the record.
//! 2. **Extra pass**: open-map rules, composed sub-records first.
//! 3. **Struct pass**: cross-field rules for [`Scene::ALL`] and the requested
//!    scene, composed sub-records first.
//!
//! Raw violations are then handed to the localization resolver in
//! `localize`.
//!
//! Registration races are benign: plan building is pure, both racers may do
//! the work, and the first insert wins.

use std::any::TypeId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{MSG_UNKNOWN_VALIDATOR, MsgErr, ValidError};
use crate::rules::{ExtraValidRuleInfo, FieldValidRuleInfo, LocalizeValidRule, Violation};
use crate::scene::{Scene, matching_scenes};
use crate::tag::Tag;
use crate::traits::Validatable;

// ============================================================================
// FIELD PLAN
// ============================================================================

/// The merged field rules of one (type, scene): rule tag → rule, in
/// deterministic execution order.
pub(crate) type FieldPlan = IndexMap<Tag, FieldValidRuleInfo>;

// ============================================================================
// CACHE STATS
// ============================================================================

/// Advisory counters over the two caches. Relaxed atomics; exact only in
/// quiescent states (e.g. tests).
#[derive(Debug, Default)]
pub struct CacheStats {
    plan_builds: AtomicU64,
    plan_hits: AtomicU64,
    locale_builds: AtomicU64,
    locale_hits: AtomicU64,
}

impl CacheStats {
    /// Field plans built from declarations.
    pub fn plan_builds(&self) -> u64 {
        self.plan_builds.load(Ordering::Relaxed)
    }

    /// Field plans served from cache.
    pub fn plan_hits(&self) -> u64 {
        self.plan_hits.load(Ordering::Relaxed)
    }

    /// Localization tables built from declarations.
    pub fn locale_builds(&self) -> u64 {
        self.locale_builds.load(Ordering::Relaxed)
    }

    /// Localization tables served from cache.
    pub fn locale_hits(&self) -> u64 {
        self.locale_hits.load(Ordering::Relaxed)
    }

    pub(crate) fn count_locale_build(&self) {
        self.locale_builds.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn count_locale_hit(&self) {
        self.locale_hits.fetch_add(1, Ordering::Relaxed);
    }
}

// ============================================================================
// VALIDATOR
// ============================================================================

/// The validation engine.
///
/// Cheap to share behind `&'static` or `Arc`; all methods take `&self` and
/// are safe to call from any number of threads. Most callers use the
/// process-wide instance via [`check`].
pub struct Validator {
    pub(crate) plans: DashMap<(TypeId, Scene), Arc<FieldPlan>>,
    pub(crate) locales: DashMap<(TypeId, Scene), Arc<LocalizeValidRule>>,
    pub(crate) stats: CacheStats,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Creates an engine with empty caches.
    #[must_use]
    pub fn new() -> Self {
        Self {
            plans: DashMap::new(),
            locales: DashMap::new(),
            stats: CacheStats::default(),
        }
    }

    /// Validates `record` under `scene`.
    ///
    /// An empty result means valid. `None` short-circuits to a single
    /// `invalid_object_validation` failure without touching the caches.
    pub fn check(&self, record: Option<&dyn Validatable>, scene: Scene) -> Vec<MsgErr> {
        let Some(record) = record else {
            return vec![MsgErr::invalid_object()];
        };

        let snapshot = match record.snapshot() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                return vec![
                    MsgErr::new(MSG_UNKNOWN_VALIDATOR).with_err(ValidError::Snapshot(err)),
                ];
            }
        };

        let plan = self.field_plan(record, scene);

        let mut violations = Vec::new();
        run_field_rules(&plan, &snapshot, &mut violations);
        collect_extra(record, scene, &mut violations);
        collect_struct(record, scene, &mut violations);

        if violations.is_empty() {
            return Vec::new();
        }
        trace!(scene = %scene, count = violations.len(), "raw violations");
        self.localize(record, scene, &violations)
    }

    /// Cache counters.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Number of distinct (type, scene) field plans currently registered.
    pub fn registered_plans(&self) -> usize {
        self.plans.len()
    }

    fn field_plan(&self, record: &dyn Validatable, scene: Scene) -> Arc<FieldPlan> {
        let key = (record.type_key(), scene);
        if let Some(plan) = self.plans.get(&key) {
            self.stats.plan_hits.fetch_add(1, Ordering::Relaxed);
            return Arc::clone(&plan);
        }

        let mut plan = FieldPlan::new();
        collect_field_rules(record, scene, &mut plan);
        self.stats.plan_builds.fetch_add(1, Ordering::Relaxed);
        debug!(scene = %scene, rules = plan.len(), "built field plan");

        // First insert wins; a racing builder's plan is identical and dropped.
        Arc::clone(self.plans.entry(key).or_insert_with(|| Arc::new(plan)).value())
    }
}

// ============================================================================
// REGISTRATION
// ============================================================================

/// Merges field rules into `plan`, composed sub-records first so the outer
/// record's declarations win on rule-tag collision. Within one record,
/// matching scenes merge global-first then ascending; entries of a single
/// scene are sorted by tag so the plan order is deterministic.
fn collect_field_rules(record: &dyn Validatable, scene: Scene, plan: &mut FieldPlan) {
    for component in record.components() {
        collect_field_rules(component, scene, plan);
    }

    let Some(source) = record.as_field_rules() else {
        return;
    };
    let rules = source.field_rules();
    for declared in matching_scenes(rules.keys().copied(), scene) {
        let Some(tag_rules) = rules.get(&declared) else {
            continue;
        };
        let mut entries: Vec<(&Tag, &FieldValidRuleInfo)> = tag_rules.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        for (tag, info) in entries {
            plan.insert(tag.clone(), info.clone());
        }
    }
}

// ============================================================================
// FIELD PASS
// ============================================================================

fn run_field_rules(plan: &FieldPlan, snapshot: &Value, out: &mut Vec<Violation>) {
    for (tag, info) in plan {
        let value = locate_field(snapshot, info.field.as_str());
        let passed = match value {
            Some(value) => (info.check)(value, &info.param),
            None => (info.check)(&Value::Null, &info.param),
        };
        if !passed {
            out.push(Violation::new(
                value.cloned().unwrap_or(Value::Null),
                info.field.clone(),
                tag.clone(),
                info.param.clone(),
            ));
        }
    }
}

/// Finds `field` at the top level of the snapshot, else depth-first inside
/// nested objects. Covers both flattened and nested composition without the
/// rule author caring which way the record serializes.
fn locate_field<'a>(value: &'a Value, field: &str) -> Option<&'a Value> {
    let object = value.as_object()?;
    if let Some(found) = object.get(field) {
        return Some(found);
    }
    object
        .values()
        .filter(|nested| nested.is_object())
        .find_map(|nested| locate_field(nested, field))
}

// ============================================================================
// EXTRA PASS
// ============================================================================

/// Runs extra-map rules, composed sub-records first.
fn collect_extra(record: &dyn Validatable, scene: Scene, out: &mut Vec<Violation>) {
    for component in record.components() {
        collect_extra(component, scene, out);
    }

    let Some(source) = record.as_extra_rules() else {
        return;
    };
    let (extra, rules) = source.extra_rules();

    let mut merged: IndexMap<String, ExtraValidRuleInfo> = IndexMap::new();
    for declared in matching_scenes(rules.keys().copied(), scene) {
        let Some(key_rules) = rules.get(&declared) else {
            continue;
        };
        let mut entries: Vec<(&String, &ExtraValidRuleInfo)> = key_rules.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        for (key, info) in entries {
            merged.insert(key.clone(), info.clone());
        }
    }

    for (key, info) in &merged {
        match extra.get(key) {
            // Required and absent: the predicate never gets a say.
            None if info.tag == Tag::REQUIRED => {
                out.push(Violation::new(
                    Value::Null,
                    info.field.clone(),
                    info.tag.clone(),
                    info.param.clone(),
                ));
            }
            Some(value) if !(info.check)(value) => {
                out.push(Violation::new(
                    value.clone(),
                    info.field.clone(),
                    info.tag.clone(),
                    info.param.clone(),
                ));
            }
            // Absent and not required: no data, no opinion.
            _ => {}
        }
    }
}

// ============================================================================
// STRUCT PASS
// ============================================================================

/// Runs cross-field rules for the global scene and the requested scene:
/// composed sub-records in both scenes first, then the outer record's own
/// rules in both scenes.
fn collect_struct(record: &dyn Validatable, scene: Scene, out: &mut Vec<Violation>) {
    let scenes: &[Scene] = if scene == Scene::ALL {
        &[Scene::ALL]
    } else {
        &[Scene::ALL, scene]
    };

    for &declared in scenes {
        visit_component_struct_rules(record, declared, out);
    }

    let Some(source) = record.as_struct_rules() else {
        return;
    };
    for &declared in scenes {
        source.struct_rules(declared, &mut |violation| out.push(violation));
    }
}

fn visit_component_struct_rules(record: &dyn Validatable, scene: Scene, out: &mut Vec<Violation>) {
    for component in record.components() {
        visit_component_struct_rules(component, scene, out);
        if let Some(source) = component.as_struct_rules() {
            source.struct_rules(scene, &mut |violation| out.push(violation));
        }
    }
}

// ============================================================================
// PROCESS-WIDE INSTANCE
// ============================================================================

static GLOBAL: OnceLock<Validator> = OnceLock::new();

/// The process-wide engine, lazily initialized on first use. Lives for the
/// process lifetime; its caches are never evicted.
pub fn global() -> &'static Validator {
    GLOBAL.get_or_init(Validator::new)
}

/// Validates `record` under `scene` using the process-wide engine.
///
/// An empty result means valid.
pub fn check(record: Option<&dyn Validatable>, scene: Scene) -> Vec<MsgErr> {
    global().check(record, scene)
}

// ============================================================================
// TESTS
// ============================================================================
