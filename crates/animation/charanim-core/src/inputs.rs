//! Input contracts for the core engine.
//!
//! Adapters build these each tick and pass them into `Engine::update()`.
//! Actors not mentioned keep whatever they were given last.

use serde::{Deserialize, Serialize};

use crate::constraint::ConstraintMask;
use crate::ids::ActorId;
use crate::pose::{PoseContext, ProceduralPose};

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Inputs {
    #[serde(default)]
    pub actors: Vec<ActorInput>,
    /// Commands applied before stepping.
    #[serde(default)]
    pub commands: Vec<ActorCommand>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActorInput {
    pub actor: ActorId,
    #[serde(default)]
    pub procedural: Option<ProceduralPose>,
    #[serde(default)]
    pub context: Option<PoseContext>,
    #[serde(default)]
    pub additional_constraints: Option<ConstraintMask>,
}

impl ActorInput {
    pub fn new(actor: ActorId) -> Self {
        Self {
            actor,
            procedural: None,
            context: None,
            additional_constraints: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ActorCommand {
    Play {
        actor: ActorId,
        name: String,
        group: String,
        #[serde(default)]
        speed: Option<f32>,
    },
    Clear {
        actor: ActorId,
    },
    SetClockEnabled {
        actor: ActorId,
        enabled: bool,
    },
}
