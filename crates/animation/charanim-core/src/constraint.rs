//! Action restrictions and their per-animation timeline.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Set of actions an animation currently forbids. Empty means everything is allowed.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ConstraintMask: u32 {
        const PREVENT_DYING             = 1 << 0;
        const PREVENT_WALKING           = 1 << 1;
        const PREVENT_AIMING            = 1 << 2;
        const PREVENT_DODGE             = 1 << 3;
        const PREVENT_SHOOTING          = 1 << 4;
        const PREVENT_MELEE             = 1 << 5;
        const PREVENT_BEING_SHOT        = 1 << 6;
        const PREVENT_BEING_MELEED      = 1 << 7;
        const PREVENT_RAGDOLL           = 1 << 8;
        const PREVENT_WORLD_INTERACTION = 1 << 9;
        const PREVENT_THROWING          = 1 << 10;
        const PREVENT_IRON_SIGHT        = 1 << 11;
        const PREVENT_MIX_TRANSITION    = 1 << 12;
        const PREVENT_FLIP              = 1 << 13;
        const FACE_FORWARDS             = 1 << 14;
        const PREVENT_DEATH_ANIMATION   = 1 << 15;

        const PREVENT_BLOCK = Self::PREVENT_IRON_SIGHT.bits();
        const PREVENT_ALL_ATTACKING = Self::PREVENT_MELEE.bits()
            | Self::PREVENT_SHOOTING.bits()
            | Self::PREVENT_THROWING.bits();
        const PREVENT_ALL_MOVEMENT = Self::PREVENT_WALKING.bits()
            | Self::PREVENT_AIMING.bits()
            | Self::PREVENT_FLIP.bits();
        const PREVENT_ALL_DAMAGE = Self::PREVENT_BEING_SHOT.bits()
            | Self::PREVENT_BEING_MELEED.bits();
        const PREVENT_ALL = u32::MAX;
    }
}

const NAMES: &[(&str, ConstraintMask)] = &[
    ("allowall", ConstraintMask::empty()),
    ("preventall", ConstraintMask::PREVENT_ALL),
    ("preventdying", ConstraintMask::PREVENT_DYING),
    ("preventwalking", ConstraintMask::PREVENT_WALKING),
    ("preventaiming", ConstraintMask::PREVENT_AIMING),
    ("preventdodge", ConstraintMask::PREVENT_DODGE),
    ("preventshooting", ConstraintMask::PREVENT_SHOOTING),
    ("preventmelee", ConstraintMask::PREVENT_MELEE),
    ("preventbeingshot", ConstraintMask::PREVENT_BEING_SHOT),
    ("preventbeingmeleed", ConstraintMask::PREVENT_BEING_MELEED),
    ("preventragdoll", ConstraintMask::PREVENT_RAGDOLL),
    ("preventworldinteraction", ConstraintMask::PREVENT_WORLD_INTERACTION),
    ("preventthrowing", ConstraintMask::PREVENT_THROWING),
    ("preventironsight", ConstraintMask::PREVENT_IRON_SIGHT),
    ("preventblock", ConstraintMask::PREVENT_BLOCK),
    ("preventmixtransition", ConstraintMask::PREVENT_MIX_TRANSITION),
    ("preventflip", ConstraintMask::PREVENT_FLIP),
    ("faceforwards", ConstraintMask::FACE_FORWARDS),
    ("preventdeathanimation", ConstraintMask::PREVENT_DEATH_ANIMATION),
    ("preventallattacking", ConstraintMask::PREVENT_ALL_ATTACKING),
    ("preventallmovement", ConstraintMask::PREVENT_ALL_MOVEMENT),
    ("preventalldamage", ConstraintMask::PREVENT_ALL_DAMAGE),
];

impl ConstraintMask {
    /// Look up a restriction by its file-format name (`PreventShooting`, `preventshooting`, ...).
    pub fn from_file_name(name: &str) -> Option<ConstraintMask> {
        NAMES
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, m)| *m)
    }

    /// True if any flag of `other` is set.
    #[inline]
    pub fn constrains_any(self, other: ConstraintMask) -> bool {
        self.intersects(other)
    }

    /// True if every flag of `other` is set.
    #[inline]
    pub fn constrains_all(self, other: ConstraintMask) -> bool {
        self.contains(other)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConstraintEntry {
    /// Absolute seconds into the animation.
    pub time: f32,
    pub mask: ConstraintMask,
}

/// Restriction keyframes sorted by absolute time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintTimeline {
    entries: Vec<ConstraintEntry>,
}

impl ConstraintTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, time: f32, mask: ConstraintMask) {
        self.entries.push(ConstraintEntry { time, mask });
    }

    /// Stable sort by time; entries sharing a time keep authoring order.
    pub fn sort(&mut self) {
        self.entries.sort_by(|a, b| a.time.total_cmp(&b.time));
    }

    pub fn entries(&self) -> &[ConstraintEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mask of the latest entry at or before `time`; empty before the first entry.
    pub fn mask_at(&self, time: f32) -> ConstraintMask {
        self.entries
            .iter()
            .rev()
            .find(|e| e.time <= time)
            .map(|e| e.mask)
            .unwrap_or_default()
    }
}
