//! Validation scenes
//!
//! A [`Scene`] is a bitmask naming the context a validation run happens in
//! (request binding, insert, update, ...). Rule tables are keyed by scene,
//! and a rule declared under scene `D` participates in a run requested under
//! scene `R` iff every bit of `D` is present in `R` (the subset law).
//! [`Scene::ALL`] carries no bits and therefore participates unconditionally.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

// ============================================================================
// SCENE
// ============================================================================

/// A validation scene bitmask.
///
/// Named scenes occupy distinct bits and combine with `|`:
///
/// ```rust
/// use scenic_validator::scene::Scene;
///
/// let write = Scene::INSERT | Scene::UPDATE;
/// assert!(Scene::INSERT.applies_to(write));
/// assert!(!write.applies_to(Scene::INSERT));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Scene(u64);

impl Scene {
    /// The global scene: applies to every requested scene.
    pub const ALL: Scene = Scene(0);

    /// Request data binding.
    pub const BIND: Scene = Scene(1 << 0);
    /// Insertion / creation.
    pub const INSERT: Scene = Scene(1 << 1);
    /// Deletion / removal.
    pub const DELETE: Scene = Scene(1 << 2);
    /// Update / modification.
    pub const UPDATE: Scene = Scene(1 << 3);
    /// Retrieval / query.
    pub const QUERY: Scene = Scene(1 << 4);
    /// Response shaping.
    pub const RESPOND: Scene = Scene(1 << 5);

    /// Alias for the highest reserved bit. Application-defined scenes are
    /// allocated above it via [`Scene::custom`].
    pub const CUSTOM: Scene = Scene::RESPOND;

    /// Returns the raw bit pattern.
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Builds a scene from a raw bit pattern.
    #[must_use]
    pub const fn from_bits(bits: u64) -> Scene {
        Scene(bits)
    }

    /// The `n`-th application-defined scene (1-based), above the reserved
    /// bits.
    #[must_use]
    pub const fn custom(n: u32) -> Scene {
        Scene(Scene::CUSTOM.0 << n)
    }

    /// Returns `true` if every bit of `other` is present in `self`.
    #[must_use]
    pub const fn contains(self, other: Scene) -> bool {
        self.0 & other.0 == other.0
    }

    /// The subset law: a rule declared under `self` participates in a run
    /// requested under `requested` iff `self & requested == self`.
    ///
    /// [`Scene::ALL`] has no bits, so it trivially applies to everything.
    #[must_use]
    pub const fn applies_to(self, requested: Scene) -> bool {
        self.0 & requested.0 == self.0
    }
}

impl BitOr for Scene {
    type Output = Scene;

    fn bitor(self, rhs: Scene) -> Scene {
        Scene(self.0 | rhs.0)
    }
}

impl BitOrAssign for Scene {
    fn bitor_assign(&mut self, rhs: Scene) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Scene::ALL {
            return write!(f, "all");
        }
        const NAMED: [(Scene, &str); 6] = [
            (Scene::BIND, "bind"),
            (Scene::INSERT, "insert"),
            (Scene::DELETE, "delete"),
            (Scene::UPDATE, "update"),
            (Scene::QUERY, "query"),
            (Scene::RESPOND, "respond"),
        ];
        let mut rest = self.0;
        let mut first = true;
        for (scene, name) in NAMED {
            if self.contains(scene) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{name}")?;
                first = false;
                rest &= !scene.0;
            }
        }
        if rest != 0 {
            if !first {
                write!(f, "|")?;
            }
            write!(f, "{rest:#x}")?;
        }
        Ok(())
    }
}

// ============================================================================
// SCENE SELECTION
// ============================================================================

/// Filters `declared` down to the scenes that apply to `requested` and
/// returns them in merge order: [`Scene::ALL`] first, then ascending bit
/// order. Later scenes win on rule-key collision, so the ordering must be
/// deterministic.
#[must_use]
pub fn matching_scenes<I>(declared: I, requested: Scene) -> Vec<Scene>
where
    I: IntoIterator<Item = Scene>,
{
    let mut scenes: Vec<Scene> = declared
        .into_iter()
        .filter(|scene| scene.applies_to(requested))
        .collect();
    scenes.sort_unstable();
    scenes
}

// ============================================================================
// TESTS
// ============================================================================
