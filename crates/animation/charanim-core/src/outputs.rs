//! Output contracts from the core engine.
//!
//! One frame per actor with its blended pose and effective restriction mask,
//! plus a separate list of semantic events.

use serde::{Deserialize, Serialize};

use crate::constraint::ConstraintMask;
use crate::data::AnimationKey;
use crate::ids::{ActorId, InstId};
use crate::pose::AnimationResult;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActorFrame {
    pub actor: ActorId,
    pub pose: AnimationResult,
    pub constraints: ConstraintMask,
}

/// Discrete semantic signals emitted during stepping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum CoreEvent {
    AnimationStarted {
        actor: ActorId,
        inst: InstId,
        animation: AnimationKey,
    },
    AnimationEnded {
        actor: ActorId,
        inst: InstId,
        animation: AnimationKey,
        timer: f32,
    },
    Error {
        message: String,
    },
}

/// Outputs returned by Engine::update().
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub frames: Vec<ActorFrame>,
    #[serde(default)]
    pub events: Vec<CoreEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.frames.clear();
        self.events.clear();
    }

    #[inline]
    pub fn push_frame(&mut self, frame: ActorFrame) {
        self.frames.push(frame);
    }

    #[inline]
    pub fn push_event(&mut self, event: CoreEvent) {
        self.events.push(event);
    }

    pub fn frame(&self, actor: ActorId) -> Option<&ActorFrame> {
        self.frames.iter().find(|f| f.actor == actor)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty() && self.events.is_empty()
    }
}
