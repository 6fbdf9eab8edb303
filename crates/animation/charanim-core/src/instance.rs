//! A single running playback of a definition.

use std::fmt;
use std::sync::Arc;

use crate::constraint::ConstraintMask;
use crate::data::{AnimationKey, CharacterAnimationDefinition, LimbTrack};
use crate::ids::InstId;

/// Fired once when an instance finishes and leaves its stack.
pub type EndCallback = Box<dyn FnMut(&ActiveAnimation) + Send>;

pub struct ActiveAnimation {
    id: InstId,
    definition: Arc<CharacterAnimationDefinition>,
    speed: f32,
    unscaled_timer: f32,
    on_end: Option<EndCallback>,
}

impl fmt::Debug for ActiveAnimation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveAnimation")
            .field("id", &self.id)
            .field("animation", &self.definition.key())
            .field("speed", &self.speed)
            .field("unscaled_timer", &self.unscaled_timer)
            .field("has_on_end", &self.on_end.is_some())
            .finish()
    }
}

impl ActiveAnimation {
    pub fn new(id: InstId, definition: Arc<CharacterAnimationDefinition>, speed: f32) -> Self {
        Self {
            id,
            definition,
            speed,
            unscaled_timer: 0.0,
            on_end: None,
        }
    }

    pub fn with_on_end(mut self, callback: impl FnMut(&ActiveAnimation) + Send + 'static) -> Self {
        self.on_end = Some(Box::new(callback));
        self
    }

    #[inline]
    pub fn id(&self) -> InstId {
        self.id
    }

    #[inline]
    pub fn definition(&self) -> &Arc<CharacterAnimationDefinition> {
        &self.definition
    }

    pub fn key(&self) -> AnimationKey {
        self.definition.key()
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    /// Seconds into the animation's own timeline.
    #[inline]
    pub fn timer(&self) -> f32 {
        self.unscaled_timer
    }

    pub fn set_timer(&mut self, seconds: f32) {
        self.unscaled_timer = seconds.max(0.0);
    }

    pub fn scaled_timer(&self) -> f32 {
        self.unscaled_timer * self.speed
    }

    pub fn scaled_duration(&self) -> f32 {
        self.speed * self.definition.total_duration
    }

    #[inline]
    pub fn total_duration(&self) -> f32 {
        self.definition.total_duration
    }

    pub fn is_over(&self) -> bool {
        self.unscaled_timer >= self.definition.total_duration
    }

    /// True once `fraction` of the animation has played (e.g. `0.95`).
    pub fn is_almost_over(&self, fraction: f32) -> bool {
        self.unscaled_timer >= self.definition.total_duration * fraction
    }

    /// Jump to the end; the owning stack drops it on its next advance.
    pub fn stop(&mut self) {
        self.unscaled_timer = self.unscaled_timer.max(self.definition.total_duration);
    }

    /// Normalized position on `track`, 1 for zero-length tracks.
    pub fn progress(&self, track: &LimbTrack) -> f32 {
        if track.duration <= 0.0 {
            1.0
        } else {
            self.unscaled_timer / track.duration
        }
    }

    pub fn constraint_mask(&self) -> ConstraintMask {
        self.definition.constraints.mask_at(self.unscaled_timer)
    }

    pub fn max_key_count(&self) -> usize {
        self.definition.max_key_count()
    }

    pub(crate) fn advance(&mut self, dt: f32) {
        self.unscaled_timer += dt * self.speed;
    }

    pub(crate) fn fire_on_end(&mut self) {
        if let Some(mut callback) = self.on_end.take() {
            callback(self);
        }
    }
}
