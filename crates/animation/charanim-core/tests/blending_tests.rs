use std::sync::Arc;

use charanim_core::{
    parse_animation, sample_instance, ActiveAnimation, Animator, CharacterAnimationDefinition,
    Config, ConstraintMask, HandLook, InstId, PoseContext, ProceduralPose, Vec2,
};

fn approx(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

fn def(text: &str) -> Arc<CharacterAnimationDefinition> {
    Arc::new(parse_animation(text, "anim", "test").unwrap())
}

/// Body held at `x` for `seconds`.
fn hold(x: f32, seconds: f32, extra: &str) -> Arc<CharacterAnimationDefinition> {
    def(&format!(
        "1\nBODY\n0s {x}px 0px {extra}\n{seconds}s {x}px 0px\n"
    ))
}

#[test]
fn push_restarts_mix_and_switches_main() {
    let mut animator = Animator::new(&Config::default());
    let pose = ProceduralPose::default();

    animator.play(hold(0.0, 2.0, ""), 1.0);
    animator.update(0.1, &pose);
    assert!(approx(animator.blend().mix_progress, 0.32, 1e-5));

    let b = animator.play(hold(10.0, 2.0, ""), 1.0);
    assert_eq!(animator.blend().mix_progress, 0.0);
    assert_eq!(animator.main().unwrap().id(), b);

    let mut last = 0.0;
    for _ in 0..3 {
        animator.update(0.1, &pose);
        let mix = animator.blend().mix_progress;
        assert!(mix > last);
        last = mix;
    }
    assert!(approx(last, 0.96, 1e-5));
    animator.update(0.1, &pose);
    assert_eq!(animator.blend().mix_progress, 1.0);
}

#[test]
fn mix_rate_scales_with_main_speed() {
    let mut animator = Animator::new(&Config::default());
    animator.play(hold(0.0, 2.0, ""), 2.0);
    animator.update(0.1, &ProceduralPose::default());
    assert!(approx(animator.blend().mix_progress, 0.64, 1e-5));
}

#[test]
fn cross_fade_blends_previous_into_main() {
    let mut animator = Animator::new(&Config::default());
    let pose = ProceduralPose::default();
    let pin = "constraints(PreventMixTransition)";

    animator.play(hold(0.0, 2.0, pin), 1.0);
    animator.update(0.1, &pose);
    assert_eq!(animator.blend().transition_factor, 1.0);

    animator.play(hold(10.0, 2.0, pin), 1.0);
    animator.update(0.1, &pose);
    // sampled before the mix stepped
    assert!(approx(animator.result().body.position.x, 0.0, 1e-5));
    animator.update(0.1, &pose);
    assert!(approx(animator.result().body.position.x, 3.2, 1e-4));
    for _ in 0..5 {
        animator.update(0.1, &pose);
    }
    assert!(approx(animator.result().body.position.x, 10.0, 1e-5));
}

#[test]
fn transition_factor_eases_in() {
    let mut animator = Animator::new(&Config::default());
    let pose = ProceduralPose::default();
    animator.play(hold(10.0, 2.0, ""), 1.0);

    animator.update(0.05, &pose);
    assert!(approx(animator.blend().transition_factor, 0.25, 1e-5));
    assert!(approx(animator.blend().transition_factor_eased, 0.125, 1e-5));
    assert!(approx(animator.result().body.position.x, 1.25, 1e-4));

    for _ in 0..3 {
        animator.update(0.05, &pose);
    }
    assert_eq!(animator.blend().transition_factor, 1.0);
    assert!(approx(animator.result().body.position.x, 10.0, 1e-5));
}

#[test]
fn hands_back_to_procedural_near_the_end() {
    let mut animator = Animator::new(&Config::default());
    let pose = ProceduralPose::default();
    animator.play(hold(10.0, 1.0, ""), 1.0);

    for _ in 0..15 {
        animator.update(0.05, &pose);
    }
    assert_eq!(animator.blend().transition_factor, 1.0);

    // timer passes 0.8s: inside the window, ramp down
    for _ in 0..3 {
        animator.update(0.05, &pose);
    }
    assert!(animator.blend().transition_factor < 1.0);

    for _ in 0..25 {
        animator.update(0.05, &pose);
    }
    assert!(!animator.is_playing());
    assert!(animator.stack().is_empty());
    assert_eq!(animator.blend().transition_factor, 0.0);
    assert_eq!(*animator.result(), pose);
}

#[test]
fn prevent_mix_transition_pins_to_animated_pose() {
    let mut animator = Animator::new(&Config::default());
    let pose = ProceduralPose::default();
    animator.play(hold(6.0, 1.0, "constraints(PreventMixTransition)"), 1.0);
    animator.update(0.01, &pose);
    assert_eq!(animator.blend().transition_factor, 1.0);
    assert_eq!(animator.result().body.position, Vec2::new(6.0, 0.0));
    assert!(animator
        .last_constraints()
        .contains(ConstraintMask::PREVENT_MIX_TRANSITION));
}

#[test]
fn clear_fades_out_without_a_jump() {
    let mut animator = Animator::new(&Config::default());
    let pose = ProceduralPose::default();
    animator.play(hold(10.0, 2.0, ""), 1.0);
    for _ in 0..10 {
        animator.update(0.05, &pose);
    }
    animator.clear();
    animator.update(0.05, &pose);
    let tf = animator.blend().transition_factor;
    assert!(approx(tf, 0.75, 1e-5));
    // last curve pose is held and faded: eased(0.75) = 0.875
    assert!(approx(animator.result().body.position.x, 8.75, 1e-4));

    for _ in 0..10 {
        animator.update(0.05, &pose);
    }
    assert_eq!(*animator.result(), pose);
}

#[test]
fn idle_to_animating_uses_the_new_pose() {
    let mut animator = Animator::new(&Config::default());
    let pose = ProceduralPose::default();
    animator.play(hold(10.0, 2.0, "constraints(PreventMixTransition)"), 1.0);
    animator.update(0.05, &pose);
    animator.clear();

    animator.play(hold(-4.0, 2.0, "constraints(PreventMixTransition)"), 1.0);
    animator.update(0.05, &pose);
    assert_eq!(animator.result().body.position, Vec2::new(-4.0, 0.0));
}

#[test]
fn missing_channels_keep_procedural_values() {
    let mut pose = ProceduralPose::default();
    pose.head.position = Vec2::new(0.0, 40.0);
    pose.hands[1].rotation = 12.0;
    let d = def("1\nBODY\n0s 15deg\n1s 15deg\n");
    let inst = ActiveAnimation::new(InstId(0), d, 1.0);
    let sampled = sample_instance(&inst, &pose, &PoseContext::default());
    assert_eq!(sampled.body.rotation, 15.0);
    assert_eq!(sampled.body.position, Vec2::ZERO);
    assert_eq!(sampled.head.position, Vec2::new(0.0, 40.0));
    assert_eq!(sampled.hands[1].rotation, 12.0);
}

#[test]
fn flip_mirrors_and_scale_multiplies() {
    let d = def("1\nBODY\n0s 4px 2px 30deg\n");
    let inst = ActiveAnimation::new(InstId(0), d, 1.0);
    let ctx = PoseContext {
        flipped: true,
        scale: 2.0,
        ..PoseContext::default()
    };
    let sampled = sample_instance(&inst, &ProceduralPose::default(), &ctx);
    assert_eq!(sampled.body.position, Vec2::new(-8.0, 4.0));
    assert_eq!(sampled.body.rotation, -30.0);
}

#[test]
fn aim_adjusted_hands_rotate_around_procedural_hand() {
    let d = def("1\nHAND\naim\n0s 10px 0px 5deg\n");
    let inst = ActiveAnimation::new(InstId(0), d, 1.0);
    let ctx = PoseContext {
        aim_angle: 90.0,
        ..PoseContext::default()
    };
    let sampled = sample_instance(&inst, &ProceduralPose::default(), &ctx);
    let hand = sampled.hands[0];
    assert!(approx(hand.position.x, 0.0, 1e-4));
    assert!(approx(hand.position.y, 10.0, 1e-4));
    assert_eq!(hand.rotation, 95.0);
}

#[test]
fn relative_hands_start_at_procedural_position() {
    let d = def("1\nrelative\nHAND\n0s 5px 5px\n1s 7px 5px\n");
    let mut pose = ProceduralPose::default();
    pose.hands[0].position = Vec2::new(1.0, 1.0);
    let mut inst = ActiveAnimation::new(InstId(0), d, 1.0);

    let start = sample_instance(&inst, &pose, &PoseContext::default());
    assert_eq!(start.hands[0].position, Vec2::new(1.0, 1.0));

    inst.set_timer(1.0);
    let end = sample_instance(&inst, &pose, &PoseContext::default());
    assert_eq!(end.hands[0].position, Vec2::new(3.0, 1.0));
}

#[test]
fn flipped_characters_swap_hand_tracks() {
    let d = def("1\nrelative\nHAND\n0s 5px 0px fist\n1s 7px 0px\nHAND\n0s 0px 0px\n");
    let mut pose = ProceduralPose::default();
    pose.hands[0].position = Vec2::new(-10.0, 0.0);
    pose.hands[1].position = Vec2::new(10.0, 0.0);
    let ctx = PoseContext {
        flipped: true,
        ..PoseContext::default()
    };
    let mut inst = ActiveAnimation::new(InstId(0), d, 1.0);

    let start = sample_instance(&inst, &pose, &ctx);
    assert_eq!(start.hands[1].position, Vec2::new(10.0, 0.0));
    assert_eq!(start.hands[1].look, Some(HandLook::Fist));
    assert_eq!(start.hands[0].position, Vec2::new(-10.0, 0.0));

    inst.set_timer(1.0);
    let end = sample_instance(&inst, &pose, &ctx);
    assert_eq!(end.hands[1].position, Vec2::new(8.0, 0.0));
    assert_eq!(end.hands[0].position, Vec2::new(-10.0, 0.0));

    let unflipped = sample_instance(&inst, &pose, &PoseContext::default());
    assert_eq!(unflipped.hands[0].position, Vec2::new(-8.0, 0.0));
}

#[test]
fn only_two_hands_are_driven() {
    let d = def("1\nHAND\n0s 1px 0px\nHAND\n0s 2px 0px\nHAND\n0s 3px 0px\n");
    let inst = ActiveAnimation::new(InstId(0), d, 1.0);
    let sampled = sample_instance(&inst, &ProceduralPose::default(), &PoseContext::default());
    assert_eq!(sampled.hands[0].position.x, 1.0);
    assert_eq!(sampled.hands[1].position.x, 2.0);
}

#[test]
fn hand_look_follows_timeline_and_transition() {
    let mut animator = Animator::new(&Config::default());
    let mut pose = ProceduralPose::default();
    pose.hands[0].look = Some(HandLook::Open);
    animator.play(def("1\nHAND\n0s 0px 0px fist\n1s 0px 0px point\n2s 0px 0px\n"), 1.0);

    // eased factor 0.125: still the procedural look
    animator.update(0.05, &pose);
    assert_eq!(animator.result().hands[0].look, Some(HandLook::Open));

    // eased factor 0.875 at tf 0.75
    animator.update(0.05, &pose);
    animator.update(0.05, &pose);
    assert_eq!(animator.result().hands[0].look, Some(HandLook::Fist));

    while animator.main().map_or(false, |m| m.timer() < 1.0) {
        animator.update(0.05, &pose);
    }
    animator.update(0.05, &pose);
    assert_eq!(animator.result().hands[0].look, Some(HandLook::Point));
}
