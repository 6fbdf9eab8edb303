//! Discrete hand poses keyed on a hand track's normalized timeline.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandLook {
    Fist,
    Open,
    Point,
    HoldPistol,
    HoldRifle,
    HoldStock,
    HoldUnderside,
    ThumbsUp,
    Grip,
}

impl HandLook {
    pub const ALL: [HandLook; 9] = [
        HandLook::Fist,
        HandLook::Open,
        HandLook::Point,
        HandLook::HoldPistol,
        HandLook::HoldRifle,
        HandLook::HoldStock,
        HandLook::HoldUnderside,
        HandLook::ThumbsUp,
        HandLook::Grip,
    ];

    pub fn name(self) -> &'static str {
        match self {
            HandLook::Fist => "Fist",
            HandLook::Open => "Open",
            HandLook::Point => "Point",
            HandLook::HoldPistol => "HoldPistol",
            HandLook::HoldRifle => "HoldRifle",
            HandLook::HoldStock => "HoldStock",
            HandLook::HoldUnderside => "HoldUnderside",
            HandLook::ThumbsUp => "ThumbsUp",
            HandLook::Grip => "Grip",
        }
    }

    /// Case-insensitive lookup of a look name as written in animation files.
    pub fn from_name(name: &str) -> Option<HandLook> {
        Self::ALL
            .into_iter()
            .find(|look| look.name().eq_ignore_ascii_case(name))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HandLookKey {
    /// Normalized time in [0,1].
    pub time: f32,
    pub look: HandLook,
}

/// Look changes in authoring order. Lookup assumes ascending times and does not re-sort.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HandLookTimeline {
    keys: Vec<HandLookKey>,
}

impl HandLookTimeline {
    pub fn push(&mut self, time: f32, look: HandLook) {
        self.keys.push(HandLookKey { time, look });
    }

    pub fn keys(&self) -> &[HandLookKey] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Scan backwards for the first key at or before `time`.
    pub fn look_at(&self, time: f32) -> Option<HandLook> {
        self.keys
            .iter()
            .rev()
            .find(|k| k.time <= time)
            .map(|k| k.look)
    }
}
