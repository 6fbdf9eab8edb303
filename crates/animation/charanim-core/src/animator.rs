//! Per-actor pose blending.
//!
//! Two scalars drive the blend:
//! - `mix_progress` cross-fades from the previous main animation into the
//!   current one. It restarts at 0 on every push and reaches 1 after
//!   `mix_duration` seconds (scaled by the main animation's speed).
//! - `transition_factor` is the weight of the curve-driven pose against the
//!   procedural pose. It ramps up while an animation plays, ramps down when the
//!   stack is empty or the main animation enters its last `transition_window`
//!   seconds, and is pinned to 1 while the animation forbids mix transitions.
//!
//! Frame order in `update`: sample curves at the current timers, step the mix,
//! step the transition factor, advance the stack, blend against the procedural pose.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::constraint::ConstraintMask;
use crate::data::{AnimationKey, CharacterAnimationDefinition, LimbTrack};
use crate::ids::{IdAllocator, InstId};
use crate::instance::ActiveAnimation;
use crate::pose::{AnimationResult, LimbPose, PoseContext, ProceduralPose, HAND_COUNT};
use crate::stack::{EndedAnimation, PlaybackStack};

/// Quadratic ease-in-out on [0,1].
pub fn ease_in_out_quad(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlendState {
    pub mix_progress: f32,
    pub mix_duration: f32,
    pub transition_factor: f32,
    pub transition_factor_eased: f32,
}

impl BlendState {
    pub fn new(mix_duration: f32) -> Self {
        Self {
            mix_progress: 1.0,
            mix_duration,
            transition_factor: 0.0,
            transition_factor_eased: 0.0,
        }
    }

    fn step_mix(&mut self, dt: f32, main_speed: f32) {
        let rate = if self.mix_duration > 0.0 {
            dt / self.mix_duration * main_speed
        } else {
            1.0
        };
        self.mix_progress = (self.mix_progress + rate).clamp(0.0, 1.0);
    }

    fn step_transition(&mut self, dt: f32, window: f32, toward_animated: Option<bool>) {
        match toward_animated {
            None => self.transition_factor = 1.0,
            Some(up) => {
                let step = if window > 0.0 { dt / window } else { 1.0 };
                self.transition_factor += if up { step } else { -step };
            }
        }
        self.transition_factor = self.transition_factor.clamp(0.0, 1.0);
        self.transition_factor_eased = ease_in_out_quad(self.transition_factor);
    }
}

/// Playback stack, blend state and last output for one character.
#[derive(Debug)]
pub struct Animator {
    stack: PlaybackStack,
    blend: BlendState,
    transition_window: f32,
    additional: ConstraintMask,
    context: PoseContext,
    ids: IdAllocator,
    animated: Option<AnimationResult>,
    result: AnimationResult,
    mask: ConstraintMask,
}

impl Default for Animator {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl Animator {
    pub fn new(cfg: &Config) -> Self {
        Self {
            stack: PlaybackStack::new(),
            blend: BlendState::new(cfg.mix_duration),
            transition_window: cfg.transition_window,
            additional: ConstraintMask::empty(),
            context: PoseContext::default(),
            ids: IdAllocator::new(),
            animated: None,
            result: AnimationResult::default(),
            mask: ConstraintMask::empty(),
        }
    }

    /// Start `definition` on top of the stack and restart the cross-fade.
    pub fn play(&mut self, definition: Arc<CharacterAnimationDefinition>, speed: f32) -> InstId {
        let id = self.ids.alloc_inst();
        self.push(ActiveAnimation::new(id, definition, speed));
        id
    }

    /// Push a prepared instance. Ids of instances built elsewhere are the caller's concern.
    pub fn push(&mut self, instance: ActiveAnimation) {
        if self.stack.main().is_none() {
            // entering from idle: do not blend out of a stale curve pose
            self.animated = None;
        }
        self.blend.mix_progress = 0.0;
        self.stack.push(instance);
    }

    /// Stop everything. Blend scalars are kept so the pose fades back smoothly.
    pub fn clear(&mut self) {
        self.stack.clear();
    }

    pub fn stop(&mut self, inst: InstId) -> bool {
        match self.stack.get_mut(inst) {
            Some(i) => {
                i.stop();
                true
            }
            None => false,
        }
    }

    pub fn set_clock_enabled(&mut self, enabled: bool) {
        self.stack.set_clock_enabled(enabled);
    }

    pub fn set_additional_constraints(&mut self, mask: ConstraintMask) {
        self.additional = mask;
    }

    pub fn additional_constraints(&self) -> ConstraintMask {
        self.additional
    }

    pub fn set_context(&mut self, context: PoseContext) {
        self.context = context;
    }

    pub fn context(&self) -> &PoseContext {
        &self.context
    }

    pub fn stack(&self) -> &PlaybackStack {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut PlaybackStack {
        &mut self.stack
    }

    pub fn blend(&self) -> &BlendState {
        &self.blend
    }

    pub fn main(&self) -> Option<&ActiveAnimation> {
        self.stack.main()
    }

    pub fn is_playing(&self) -> bool {
        self.stack.main().is_some()
    }

    pub fn is_playing_animation(&self, key: &AnimationKey) -> bool {
        self.stack.is_playing(key)
    }

    pub fn is_playing_group(&self, group: &str) -> bool {
        self.stack.is_playing_group(group)
    }

    /// Main animation's restrictions at its current time, plus the additional ones.
    pub fn constraints(&self) -> ConstraintMask {
        let from_animation = self
            .stack
            .main()
            .map(ActiveAnimation::constraint_mask)
            .unwrap_or_default();
        from_animation | self.additional
    }

    pub fn constrains_any(&self, mask: ConstraintMask) -> bool {
        self.constraints().constrains_any(mask)
    }

    pub fn constrains_all(&self, mask: ConstraintMask) -> bool {
        self.constraints().constrains_all(mask)
    }

    /// Pose written by the last `update`.
    pub fn result(&self) -> &AnimationResult {
        &self.result
    }

    /// Effective mask computed during the last `update`.
    pub fn last_constraints(&self) -> ConstraintMask {
        self.mask
    }

    /// Step one frame and return the instances that left the stack.
    pub fn update(&mut self, dt: f32, procedural: &ProceduralPose) -> Vec<EndedAnimation> {
        if let Some(sampled) = self.sample_mixed(procedural) {
            self.animated = Some(sampled);
        }

        let main_speed = self.stack.main().map_or(1.0, ActiveAnimation::speed);
        self.blend.step_mix(dt, main_speed);

        self.mask = self.constraints();
        let toward_animated = if self.mask.contains(ConstraintMask::PREVENT_MIX_TRANSITION) {
            None
        } else {
            Some(match self.stack.main() {
                Some(main) => main.timer() <= main.total_duration() - self.transition_window,
                None => false,
            })
        };
        self.blend
            .step_transition(dt, self.transition_window, toward_animated);

        let ended = self.stack.advance(dt);

        self.result = match &self.animated {
            Some(animated) => {
                AnimationResult::lerp(procedural, animated, self.blend.transition_factor_eased)
            }
            None => *procedural,
        };
        ended
    }

    /// Curve pose of the main animation, cross-faded from the previous one while mixing.
    fn sample_mixed(&self, procedural: &ProceduralPose) -> Option<AnimationResult> {
        let main = self.stack.main()?;
        let current = sample_instance(main, procedural, &self.context);
        if self.blend.mix_progress >= 1.0 {
            return Some(current);
        }
        match self.stack.previous() {
            Some(prev) => {
                let previous = sample_instance(prev, procedural, &self.context);
                Some(AnimationResult::lerp(&previous, &current, self.blend.mix_progress))
            }
            None => Some(current),
        }
    }
}

/// Evaluate every limb channel of `inst`; channels without curves keep the procedural value.
pub fn sample_instance(
    inst: &ActiveAnimation,
    procedural: &ProceduralPose,
    ctx: &PoseContext,
) -> AnimationResult {
    let def = inst.definition();
    let mut out = *procedural;
    if let Some(track) = &def.body {
        out.body = sample_limb(inst, track, &procedural.body, ctx, false);
    }
    if let Some(track) = &def.head {
        out.head = sample_limb(inst, track, &procedural.head, ctx, false);
    }
    // a flipped character swaps which physical hand each track drives
    for (index, track) in def.hands.iter().take(HAND_COUNT).enumerate() {
        let slot = if ctx.flipped { HAND_COUNT - 1 - index } else { index };
        out.hands[slot] = sample_limb(
            inst,
            track,
            &procedural.hands[slot],
            ctx,
            def.relative_hand_position,
        );
    }
    out
}

fn sample_limb(
    inst: &ActiveAnimation,
    track: &LimbTrack,
    procedural: &LimbPose,
    ctx: &PoseContext,
    relative: bool,
) -> LimbPose {
    let t = inst.progress(track);
    let flip = ctx.flip_sign();
    let mut pose = *procedural;

    if let Some(curve) = &track.translation {
        if let Some(p) = curve.evaluate(t) {
            let mut position = ctx.place(p);
            if relative {
                if let Some(first) = curve.first() {
                    position = position + procedural.position - ctx.place(first);
                }
            }
            if track.adjust_for_aim {
                position = position.rotate_around(procedural.position, ctx.aim_angle);
            }
            pose.position = position;
        }
    }

    if let Some(r) = track.rotation.as_ref().and_then(|c| c.evaluate(t)) {
        let aim = if track.adjust_for_aim { ctx.aim_angle } else { 0.0 };
        pose.rotation = aim + r * flip;
    }

    if let Some(s) = track.scale.as_ref().and_then(|c| c.evaluate(t)) {
        pose.scale = s;
    }

    if !track.hand_looks.is_empty() {
        pose.look = track.hand_looks.look_at(t);
    }
    pose
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ease_hits_endpoints_and_midpoint() {
        assert_eq!(ease_in_out_quad(0.0), 0.0);
        assert_eq!(ease_in_out_quad(1.0), 1.0);
        assert!((ease_in_out_quad(0.5) - 0.5).abs() < 1e-6);
        assert!((ease_in_out_quad(0.25) - 0.125).abs() < 1e-6);
        assert_eq!(ease_in_out_quad(2.0), 1.0);
    }

    #[test]
    fn transition_pins_when_requested() {
        let mut b = BlendState::new(0.3125);
        b.step_transition(0.01, 0.2, None);
        assert_eq!(b.transition_factor, 1.0);
        assert_eq!(b.transition_factor_eased, 1.0);
        b.step_transition(0.1, 0.2, Some(false));
        assert!((b.transition_factor - 0.5).abs() < 1e-6);
    }
}
