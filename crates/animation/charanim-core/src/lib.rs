//! charanim core (engine-agnostic)
//!
//! Parses `.anim` character animation files into shared, immutable curve
//! definitions and plays them back: a per-actor playback stack, a pose blender
//! that cross-fades animations against a procedural pose, and a per-frame
//! action restriction mask.

pub mod animator;
pub mod config;
pub mod constraint;
pub mod curve;
pub mod data;
pub mod engine;
pub mod error;
pub mod hand_look;
pub mod ids;
pub mod inputs;
pub mod instance;
pub mod library;
pub mod outputs;
pub mod parser;
pub mod pose;
pub mod stack;

// Re-exports for consumers (adapters)
pub use animator::{ease_in_out_quad, sample_instance, Animator, BlendState};
pub use config::Config;
pub use constraint::{ConstraintEntry, ConstraintMask, ConstraintTimeline};
pub use curve::{AngleCurve, Curve, Interpolatable, Key};
pub use data::{AnimationKey, CharacterAnimationDefinition, LimbKind, LimbTrack, Vec2};
pub use engine::{Actor, Engine};
pub use error::{AnimationError, ParseError, ParseErrorKind, Result};
pub use hand_look::{HandLook, HandLookTimeline};
pub use ids::{ActorId, InstId};
pub use inputs::{ActorCommand, ActorInput, Inputs};
pub use instance::{ActiveAnimation, EndCallback};
pub use library::AnimationLibrary;
pub use outputs::{ActorFrame, CoreEvent, Outputs};
pub use parser::{parse_animation, parse_animation_bytes, parse_animation_reader};
pub use pose::{AnimationResult, LimbPose, PoseContext, ProceduralPose};
pub use stack::{EndedAnimation, PlaybackStack};
