//! Pose records exchanged with rendering and physics collaborators.

use serde::{Deserialize, Serialize};

use crate::curve::Interpolatable;
use crate::data::Vec2;
use crate::hand_look::HandLook;

/// Number of hand channels a character exposes.
pub const HAND_COUNT: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LimbPose {
    pub position: Vec2,
    /// Degrees.
    pub rotation: f32,
    pub scale: Vec2,
    #[serde(default)]
    pub look: Option<HandLook>,
}

impl Default for LimbPose {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
            look: None,
        }
    }
}

impl LimbPose {
    /// Blend transforms by `t`; the look switches to `b` once `t` reaches one half.
    pub fn lerp(a: &LimbPose, b: &LimbPose, t: f32) -> LimbPose {
        LimbPose {
            position: Vec2::lerp(a.position, b.position, t),
            rotation: <f32 as Interpolatable>::lerp(a.rotation, b.rotation, t),
            scale: Vec2::lerp(a.scale, b.scale, t),
            look: if t < 0.5 { a.look } else { b.look },
        }
    }
}

/// Per-limb output of the blender. Also used as the procedural pose input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationResult {
    pub body: LimbPose,
    pub head: LimbPose,
    pub hands: [LimbPose; HAND_COUNT],
}

/// The pose a character would hold with no animation playing.
pub type ProceduralPose = AnimationResult;

impl AnimationResult {
    pub fn lerp(a: &AnimationResult, b: &AnimationResult, t: f32) -> AnimationResult {
        AnimationResult {
            body: LimbPose::lerp(&a.body, &b.body, t),
            head: LimbPose::lerp(&a.head, &b.head, t),
            hands: [
                LimbPose::lerp(&a.hands[0], &b.hands[0], t),
                LimbPose::lerp(&a.hands[1], &b.hands[1], t),
            ],
        }
    }
}

/// Per-actor state that shapes how curve values land in character space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseContext {
    /// Mirror curve X positions and rotations.
    pub flipped: bool,
    /// Aim angle in degrees, applied to hand tracks marked `aim`.
    pub aim_angle: f32,
    /// Multiplier for curve positions.
    pub scale: f32,
}

impl Default for PoseContext {
    fn default() -> Self {
        Self {
            flipped: false,
            aim_angle: 0.0,
            scale: 1.0,
        }
    }
}

impl PoseContext {
    #[inline]
    pub fn flip_sign(&self) -> f32 {
        if self.flipped {
            -1.0
        } else {
            1.0
        }
    }

    /// Map a curve position into character space.
    pub fn place(&self, p: Vec2) -> Vec2 {
        Vec2::new(p.x * self.flip_sign(), p.y) * self.scale
    }
}
