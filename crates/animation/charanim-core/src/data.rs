//! Parsed animation data model.
//!
//! A `CharacterAnimationDefinition` is produced once by the parser and then
//! shared read-only (behind an `Arc`) by every actor that plays it.

use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::constraint::ConstraintTimeline;
use crate::curve::{AngleCurve, Curve};
use crate::hand_look::HandLookTimeline;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
    pub const ONE: Vec2 = Vec2 { x: 1.0, y: 1.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Rotate counter-clockwise around `pivot` by `degrees`.
    pub fn rotate_around(self, pivot: Vec2, degrees: f32) -> Vec2 {
        let (s, c) = degrees.to_radians().sin_cos();
        let d = self - pivot;
        pivot + Vec2::new(d.x * c - d.y * s, d.x * s + d.y * c)
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// Which body part a track drives. Hand indices follow file order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LimbKind {
    Body,
    Head,
    Hand(usize),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LimbTrack {
    pub kind: LimbKind,
    /// Authored length in seconds (after `speed` was applied).
    pub duration: f32,
    pub adjust_for_aim: bool,
    pub translation: Option<Curve<Vec2>>,
    pub rotation: Option<AngleCurve>,
    pub scale: Option<Curve<Vec2>>,
    #[serde(default)]
    pub hand_looks: HandLookTimeline,
}

impl LimbTrack {
    pub fn new(kind: LimbKind) -> Self {
        Self {
            kind,
            duration: 0.0,
            adjust_for_aim: false,
            translation: None,
            rotation: None,
            scale: None,
            hand_looks: HandLookTimeline::default(),
        }
    }

    /// Largest number of keys on any curve of this track.
    pub fn key_count(&self) -> usize {
        let t = self.translation.as_ref().map_or(0, Curve::len);
        let r = self.rotation.as_ref().map_or(0, Curve::len);
        let s = self.scale.as_ref().map_or(0, Curve::len);
        t.max(r).max(s)
    }
}

/// Identity of a definition inside the asset cache.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnimationKey {
    pub name: String,
    pub group: String,
}

impl AnimationKey {
    pub fn new(name: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
        }
    }
}

impl std::fmt::Display for AnimationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.group, self.name)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CharacterAnimationDefinition {
    pub name: String,
    pub group: String,
    pub body: Option<LimbTrack>,
    pub head: Option<LimbTrack>,
    pub hands: Vec<LimbTrack>,
    pub constraints: ConstraintTimeline,
    /// Longest track duration in seconds.
    pub total_duration: f32,
    pub do_smoothing: bool,
    pub relative_hand_position: bool,
}

impl CharacterAnimationDefinition {
    pub fn key(&self) -> AnimationKey {
        AnimationKey::new(self.name.clone(), self.group.clone())
    }

    pub fn tracks(&self) -> impl Iterator<Item = &LimbTrack> {
        self.body
            .iter()
            .chain(self.head.iter())
            .chain(self.hands.iter())
    }

    /// Largest key count over every track.
    pub fn max_key_count(&self) -> usize {
        self.tracks().map(LimbTrack::key_count).max().unwrap_or(0)
    }

    pub fn hand(&self, index: usize) -> Option<&LimbTrack> {
        self.hands.get(index)
    }
}
