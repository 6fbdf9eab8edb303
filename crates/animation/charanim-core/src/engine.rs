//! Engine: owns the animation library and every actor, and steps them together.
//!
//! Methods:
//! - new, library/library_mut, create_actor, play, clear, set_clock_enabled, update

use crate::animator::Animator;
use crate::config::Config;
use crate::error::{AnimationError, Result};
use crate::ids::{ActorId, IdAllocator, InstId};
use crate::inputs::{ActorCommand, ActorInput, Inputs};
use crate::library::AnimationLibrary;
use crate::outputs::{ActorFrame, CoreEvent, Outputs};
use crate::pose::ProceduralPose;

/// A character driven by the engine.
#[derive(Debug)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    pub animator: Animator,
    pub procedural: ProceduralPose,
}

#[derive(Debug)]
pub struct Engine {
    cfg: Config,
    ids: IdAllocator,
    library: AnimationLibrary,
    actors: Vec<Actor>,
    // events raised between ticks (play calls) are reported with the next update
    pending: Vec<CoreEvent>,
    outputs: Outputs,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Engine {
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            ids: IdAllocator::new(),
            library: AnimationLibrary::new(),
            actors: Vec::new(),
            pending: Vec::new(),
            outputs: Outputs::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn library(&self) -> &AnimationLibrary {
        &self.library
    }

    pub fn library_mut(&mut self) -> &mut AnimationLibrary {
        &mut self.library
    }

    /// Create an actor with an empty stack and the engine's blend timing.
    pub fn create_actor(&mut self, name: &str) -> ActorId {
        let id = self.ids.alloc_actor();
        self.actors.push(Actor {
            id,
            name: name.to_string(),
            animator: Animator::new(&self.cfg),
            procedural: ProceduralPose::default(),
        });
        id
    }

    pub fn remove_actor(&mut self, id: ActorId) -> bool {
        let before = self.actors.len();
        self.actors.retain(|a| a.id != id);
        self.actors.len() != before
    }

    pub fn actors(&self) -> impl Iterator<Item = &Actor> {
        self.actors.iter()
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.iter().find(|a| a.id == id)
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.iter_mut().find(|a| a.id == id)
    }

    fn actor_or_err(&mut self, id: ActorId) -> Result<&mut Actor> {
        self.actors
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(AnimationError::ActorNotFound { id: id.0 })
    }

    /// Push a library animation onto an actor's stack.
    pub fn play(
        &mut self,
        actor: ActorId,
        name: &str,
        group: &str,
        speed: Option<f32>,
    ) -> Result<InstId> {
        let def = self
            .library
            .get(name, group)
            .ok_or_else(|| AnimationError::AnimationNotFound {
                name: name.to_string(),
                group: group.to_string(),
            })?;
        let speed = speed.unwrap_or(self.cfg.default_speed);
        let key = def.key();
        let inst = self.actor_or_err(actor)?.animator.play(def, speed);
        self.pending.push(CoreEvent::AnimationStarted {
            actor,
            inst,
            animation: key,
        });
        Ok(inst)
    }

    pub fn clear(&mut self, actor: ActorId) -> Result<()> {
        self.actor_or_err(actor)?.animator.clear();
        Ok(())
    }

    pub fn set_clock_enabled(&mut self, actor: ActorId, enabled: bool) -> Result<()> {
        self.actor_or_err(actor)?.animator.set_clock_enabled(enabled);
        Ok(())
    }

    fn apply_actor_input(&mut self, input: ActorInput) -> Result<()> {
        let actor = self.actor_or_err(input.actor)?;
        if let Some(pose) = input.procedural {
            actor.procedural = pose;
        }
        if let Some(ctx) = input.context {
            actor.animator.set_context(ctx);
        }
        if let Some(mask) = input.additional_constraints {
            actor.animator.set_additional_constraints(mask);
        }
        Ok(())
    }

    fn apply_command(&mut self, cmd: ActorCommand) -> Result<()> {
        match cmd {
            ActorCommand::Play {
                actor,
                name,
                group,
                speed,
            } => self.play(actor, &name, &group, speed).map(|_| ()),
            ActorCommand::Clear { actor } => self.clear(actor),
            ActorCommand::SetClockEnabled { actor, enabled } => {
                self.set_clock_enabled(actor, enabled)
            }
        }
    }

    /// Step every actor by `dt` seconds.
    /// Input problems (unknown actor or animation) are reported as `CoreEvent::Error`.
    pub fn update(&mut self, dt: f32, inputs: Inputs) -> &Outputs {
        self.outputs.clear();

        let mut errors = Vec::new();
        for input in inputs.actors {
            if let Err(e) = self.apply_actor_input(input) {
                errors.push(e);
            }
        }
        for cmd in inputs.commands {
            if let Err(e) = self.apply_command(cmd) {
                errors.push(e);
            }
        }
        for e in errors {
            log::warn!("animation input rejected: {e}");
            self.outputs.push_event(CoreEvent::Error {
                message: e.to_string(),
            });
        }
        for event in self.pending.drain(..) {
            self.outputs.push_event(event);
        }

        for actor in &mut self.actors {
            let ended = actor.animator.update(dt, &actor.procedural);
            for e in ended {
                self.outputs.push_event(CoreEvent::AnimationEnded {
                    actor: actor.id,
                    inst: e.inst,
                    animation: e.animation,
                    timer: e.timer,
                });
            }
            self.outputs.push_frame(ActorFrame {
                actor: actor.id,
                pose: *actor.animator.result(),
                constraints: actor.animator.last_constraints(),
            });
        }

        &self.outputs
    }
}
