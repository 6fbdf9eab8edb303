//! Error types for parsing and playback.

use thiserror::Error;

/// Why a line of an animation file was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ParseErrorKind {
    #[error("file is empty; expected a version line")]
    MissingVersion,

    #[error("line is not valid UTF-8")]
    InvalidUtf8,

    #[error("read failed: {reason}")]
    Io { reason: String },

    #[error("invalid fps value '{value}'")]
    InvalidFps { value: String },

    #[error("invalid scale value '{value}'")]
    InvalidScale { value: String },

    #[error("'{directive}' is not allowed inside a track block")]
    DirectiveInsideBlock { directive: String },

    #[error("'{directive}' is only allowed inside a track block")]
    DirectiveOutsideBlock { directive: String },

    #[error("duplicate {block} block")]
    DuplicateBlock { block: &'static str },

    #[error("keyframe outside of a track block")]
    KeyframeOutsideBlock,

    #[error("unbalanced parentheses in '{line}'")]
    UnbalancedParens { line: String },

    #[error("keyframe has no time (expected '<seconds>s' or a frame number)")]
    MissingTime,

    #[error("keyframe has more than one time")]
    DuplicateTime,

    #[error("negative keyframe time {time}")]
    NegativeTime { time: f32 },

    #[error("expected 0 or 2 px values, found {count}")]
    PositionArity { count: usize },

    #[error("keyframe has more than one rotation")]
    DuplicateRotation,

    #[error("keyframe has more than one {what}")]
    DuplicateToken { what: &'static str },

    #[error("invalid number '{token}'")]
    InvalidNumber { token: String },

    #[error("unknown constraint '{name}'")]
    UnknownConstraint { name: String },

    #[error("scale(...) needs two comma separated numbers, got '{token}'")]
    InvalidScaleKey { token: String },

    #[error("hand look '{name}' used outside a HAND block")]
    HandLookOutsideHand { name: String },

    #[error("unrecognised token '{token}'")]
    UnknownToken { token: String },
}

/// A fatal parse failure with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(line: usize, kind: ParseErrorKind) -> Self {
        Self { line, kind }
    }
}

/// Crate-level error.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum AnimationError {
    #[error("failed to parse animation {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: ParseError,
    },

    #[error("IO error on {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Animation not found: {group}/{name}")]
    AnimationNotFound { name: String, group: String },

    #[error("Actor not found: {id}")]
    ActorNotFound { id: u32 },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

pub type Result<T> = core::result::Result<T, AnimationError>;
