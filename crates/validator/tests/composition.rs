//! Composition, scenes, and cache behavior through the public API.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde::Serialize;
use serde_json::Value;

use scenic_validator::checks;
use scenic_validator::prelude::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

// ============================================================================
// FIXTURES
// ============================================================================

/// Audit trail shared by every record type, flattened into the owner's
/// serialized form.
#[derive(Serialize, Default)]
struct Audit {
    create_at: u64,
    update_at: u64,
}

impl StructRules for Audit {
    fn struct_rules(&self, scene: Scene, report: &mut dyn FnMut(Violation)) {
        if scene == Scene::ALL && self.update_at < self.create_at {
            report(Violation::new(
                Value::from(self.update_at),
                "update_at",
                Tag::CHECK,
                "",
            ));
        }
    }
}

impl LocalizeRules for Audit {
    fn localize_rules(&self) -> LocalizeValidRules {
        HashMap::from([(
            Scene::ALL,
            LocalizeValidRule::new()
                .rule2(Tag::CHECK, LocalizeValidRuleParam::msg("check_create_at_err")),
        )])
    }
}

impl Validatable for Audit {
    fn snapshot(&self) -> Result<Value, serde_json::Error> {
        snapshot_of(self)
    }

    fn type_key(&self) -> TypeId {
        TypeId::of::<Self>()
    }

    fn as_struct_rules(&self) -> Option<&dyn StructRules> {
        Some(self)
    }

    fn as_localize_rules(&self) -> Option<&dyn LocalizeRules> {
        Some(self)
    }
}

#[derive(Serialize, Default)]
struct Org {
    #[serde(flatten)]
    audit: Audit,
    name: String,
    kind: u8,
}

impl Org {
    fn valid() -> Self {
        Org {
            audit: Audit {
                create_at: 100,
                update_at: 200,
            },
            name: "acme".into(),
            kind: 1,
        }
    }
}

impl FieldRules for Org {
    fn field_rules(&self) -> FieldValidRules {
        HashMap::from([
            (
                Scene::ALL,
                HashMap::from([(
                    Tag::new("name-format"),
                    FieldValidRuleInfo::with_check("name", checks::length_between(1, 50))
                        .with_param("1,50"),
                )]),
            ),
            (
                Scene::INSERT,
                HashMap::from([(
                    Tag::new("kind-range"),
                    FieldValidRuleInfo::with_check("kind", checks::in_range(1.0, 3.0)),
                )]),
            ),
        ])
    }
}

impl Validatable for Org {
    fn snapshot(&self) -> Result<Value, serde_json::Error> {
        snapshot_of(self)
    }

    fn type_key(&self) -> TypeId {
        TypeId::of::<Self>()
    }

    fn components(&self) -> Vec<&dyn Validatable> {
        vec![&self.audit]
    }

    fn as_field_rules(&self) -> Option<&dyn FieldRules> {
        Some(self)
    }
}

// ============================================================================
// BASIC RUNS
// ============================================================================

#[test]
fn valid_record_passes_every_scene() {
    init_tracing();
    let validator = Validator::new();
    let org = Org::valid();
    for scene in [Scene::ALL, Scene::INSERT, Scene::UPDATE, Scene::QUERY] {
        assert!(validator.check(Some(&org), scene).is_empty(), "scene {scene}");
    }
}

#[test]
fn nil_record_reports_invalid_object() {
    let errs = Validator::new().check(None, Scene::INSERT);
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].msg, MSG_INVALID_OBJECT);
    assert!(errs[0].err.is_some());
}

#[test]
fn scene_scoped_rule_stays_out_of_other_scenes() {
    let validator = Validator::new();
    let org = Org {
        kind: 9, // outside the insert-only range rule
        ..Org::valid()
    };
    assert!(!validator.check(Some(&org), Scene::INSERT).is_empty());
    assert!(validator.check(Some(&org), Scene::QUERY).is_empty());
}

// ============================================================================
// COMPOSITION
// ============================================================================

#[test]
fn component_struct_rule_reaches_the_outer_record() {
    let validator = Validator::new();
    let org = Org {
        audit: Audit {
            create_at: 200,
            update_at: 100,
        },
        ..Org::valid()
    };
    let errs = validator.check(Some(&org), Scene::INSERT);
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].msg, "check_create_at_err");
}

#[test]
fn field_rule_reads_flattened_component_fields() {
    // A rule on the outer type naming a field the component serializes.
    #[derive(Serialize)]
    struct Stamped {
        #[serde(flatten)]
        audit: Audit,
    }

    impl FieldRules for Stamped {
        fn field_rules(&self) -> FieldValidRules {
            HashMap::from([(
                Scene::ALL,
                HashMap::from([(
                    Tag::REQUIRED,
                    FieldValidRuleInfo::with_check("create_at", checks::required()),
                )]),
            )])
        }
    }

    impl Validatable for Stamped {
        fn snapshot(&self) -> Result<Value, serde_json::Error> {
            snapshot_of(self)
        }

        fn type_key(&self) -> TypeId {
            TypeId::of::<Self>()
        }

        fn components(&self) -> Vec<&dyn Validatable> {
            vec![&self.audit]
        }

        fn as_field_rules(&self) -> Option<&dyn FieldRules> {
            Some(self)
        }
    }

    let validator = Validator::new();
    let missing = Stamped {
        audit: Audit::default(),
    };
    assert!(!validator.check(Some(&missing), Scene::ALL).is_empty());

    let present = Stamped {
        audit: Audit {
            create_at: 1,
            update_at: 1,
        },
    };
    assert!(validator.check(Some(&present), Scene::ALL).is_empty());
}

#[test]
fn outer_declaration_overrides_component_rule_with_same_tag() {
    #[derive(Serialize)]
    struct Inner {
        flag: bool,
    }

    impl FieldRules for Inner {
        fn field_rules(&self) -> FieldValidRules {
            HashMap::from([(
                Scene::ALL,
                // Always fails; the outer type replaces it.
                HashMap::from([(
                    Tag::new("flag-check"),
                    FieldValidRuleInfo::new("flag", |_, _| false),
                )]),
            )])
        }
    }

    impl Validatable for Inner {
        fn snapshot(&self) -> Result<Value, serde_json::Error> {
            snapshot_of(self)
        }

        fn type_key(&self) -> TypeId {
            TypeId::of::<Self>()
        }

        fn as_field_rules(&self) -> Option<&dyn FieldRules> {
            Some(self)
        }
    }

    #[derive(Serialize)]
    struct Outer {
        #[serde(flatten)]
        inner: Inner,
    }

    impl FieldRules for Outer {
        fn field_rules(&self) -> FieldValidRules {
            HashMap::from([(
                Scene::ALL,
                HashMap::from([(
                    Tag::new("flag-check"),
                    FieldValidRuleInfo::new("flag", |value, _| value == &Value::Bool(true)),
                )]),
            )])
        }
    }

    impl Validatable for Outer {
        fn snapshot(&self) -> Result<Value, serde_json::Error> {
            snapshot_of(self)
        }

        fn type_key(&self) -> TypeId {
            TypeId::of::<Self>()
        }

        fn components(&self) -> Vec<&dyn Validatable> {
            vec![&self.inner]
        }

        fn as_field_rules(&self) -> Option<&dyn FieldRules> {
            Some(self)
        }
    }

    let validator = Validator::new();
    let outer = Outer {
        inner: Inner { flag: true },
    };
    // The inner always-fail rule must have been replaced.
    assert!(validator.check(Some(&outer), Scene::ALL).is_empty());

    let inner_alone = Inner { flag: true };
    assert!(!validator.check(Some(&inner_alone), Scene::ALL).is_empty());
}

// ============================================================================
// CACHING
// ============================================================================

#[test]
fn plan_is_built_once_per_type_and_scene() {
    let validator = Validator::new();
    let org = Org::valid();

    validator.check(Some(&org), Scene::INSERT);
    validator.check(Some(&org), Scene::INSERT);

    assert_eq!(validator.stats().plan_builds(), 1);
    assert_eq!(validator.stats().plan_hits(), 1);
    assert_eq!(validator.registered_plans(), 1);

    // A different scene is a different plan.
    validator.check(Some(&org), Scene::UPDATE);
    assert_eq!(validator.stats().plan_builds(), 2);
    assert_eq!(validator.registered_plans(), 2);
}

#[test]
fn concurrent_checks_register_one_plan() {
    let validator = Arc::new(Validator::new());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let validator = Arc::clone(&validator);
            std::thread::spawn(move || {
                let org = Org::valid();
                for _ in 0..50 {
                    assert!(validator.check(Some(&org), Scene::INSERT).is_empty());
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(validator.registered_plans(), 1);
    assert_eq!(
        validator.stats().plan_builds() + validator.stats().plan_hits(),
        8 * 50
    );
}

#[test]
fn global_engine_is_shared() {
    let org = Org::valid();
    assert!(check(Some(&org), Scene::QUERY).is_empty());
    assert!(std::ptr::eq(global(), global()));
}
