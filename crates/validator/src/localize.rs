//! Localization resolver
//!
//! Turns raw [`Violation`]s into [`MsgErr`]s. Resolution walks the record's
//! composition depth-first: every composed sub-record matches the violation
//! list against its own table first, then the outer record matches against
//! its own, so a failure originating in a sub-record is localized with the
//! sub-record's messages even when the outer type never mentions the tag.
//!
//! Within one record, two match shapes are tried for every violation,
//! independently:
//!
//! - **Rule1**: keyed by (tag, field).
//! - **Rule2**: keyed by tag alone.
//!
//! A violation matching both yields one message from each. When the whole
//! walk produces nothing, a single generic `validation_failed` message is
//! synthesized carrying a textual digest of every raw violation, so failures
//! never disappear just because nobody wrote a template for them.
//!
//! Each record's table merges its matching scenes global-first then
//! ascending; a Rule1 collision on a tag replaces that tag's whole per-field
//! map. Tables are cached per (type, scene).

use std::sync::Arc;

use serde_json::Value;
use tracing::trace;

use crate::error::{MSG_VALIDATION_FAILED, MsgErr, MsgParams};
use crate::rules::{LocalizeValidRule, LocalizeValidRuleParam, Violation};
use crate::scene::{Scene, matching_scenes};
use crate::traits::{LocalizeRules, Validatable};

impl crate::engine::Validator {
    /// Resolves `violations` into localized messages, synthesizing the
    /// generic fallback when the whole resolution matched nothing. Outermost
    /// entry point; the fallback fires here and only here.
    pub(crate) fn localize(
        &self,
        record: &dyn Validatable,
        scene: Scene,
        violations: &[Violation],
    ) -> Vec<MsgErr> {
        let mut out = Vec::new();
        self.resolve(record, scene, violations, &mut out);

        if out.is_empty() {
            trace!(scene = %scene, "no localized rule matched, using fallback");
            out.push(fallback(violations));
        }
        out
    }

    /// One level of the resolution walk: components first, then this
    /// record's own table. A record without the localization capability
    /// contributes nothing of its own, but its components still resolve.
    fn resolve(
        &self,
        record: &dyn Validatable,
        scene: Scene,
        violations: &[Violation],
        out: &mut Vec<MsgErr>,
    ) {
        for component in record.components() {
            self.resolve(component, scene, violations, out);
        }

        let Some(source) = record.as_localize_rules() else {
            return;
        };
        let table = self.locale_table(record, source, scene);

        for violation in violations {
            if let Some(template) = table
                .rule1
                .get(&violation.tag)
                .and_then(|fields| fields.get(&violation.field))
            {
                out.push(render(template, violation));
            }
            if let Some(template) = table.rule2.get(&violation.tag) {
                out.push(render(template, violation));
            }
        }
    }

    fn locale_table(
        &self,
        record: &dyn Validatable,
        source: &dyn LocalizeRules,
        scene: Scene,
    ) -> Arc<LocalizeValidRule> {
        let key = (record.type_key(), scene);
        if let Some(table) = self.locales.get(&key) {
            self.stats.count_locale_hit();
            return Arc::clone(&table);
        }

        let mut table = LocalizeValidRule::new();
        let rules = source.localize_rules();
        for declared in matching_scenes(rules.keys().copied(), scene) {
            let Some(rule) = rules.get(&declared) else {
                continue;
            };
            for (tag, fields) in &rule.rule1 {
                table.rule1.insert(tag.clone(), fields.clone());
            }
            for (tag, template) in &rule.rule2 {
                table.rule2.insert(tag.clone(), template.clone());
            }
        }
        self.stats.count_locale_build();

        // First insert wins, same as the field-plan cache.
        Arc::clone(self.locales.entry(key).or_insert_with(|| Arc::new(table)).value())
    }
}

/// Instantiates a template for one violation: fixed arguments first, then the
/// raw rule parameter when the template asks for it.
fn render(template: &LocalizeValidRuleParam, violation: &Violation) -> MsgErr {
    let mut params: MsgParams = template.args.iter().cloned().collect();
    if template.with_param {
        params.push(Value::String(violation.param.clone()));
    }
    MsgErr::new(template.msg.clone()).with_params(params)
}

/// The generic failure message: one `MsgErr` for the whole run, its single
/// parameter a `"field:<f>, tag:<t>, param:<p>"` digest of every violation
/// joined by `"; "`.
fn fallback(violations: &[Violation]) -> MsgErr {
    let digest = violations
        .iter()
        .map(|v| format!("field:{}, tag:{}, param:{}", v.field, v.tag, v.param))
        .collect::<Vec<_>>()
        .join("; ");
    MsgErr::new(MSG_VALIDATION_FAILED).with_params([Value::String(digest)])
}

// ============================================================================
// TESTS
// ============================================================================
