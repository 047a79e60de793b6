use crate::{
    AnimationClip, AnimationInstance, AnimationSettings, Effectors, Settings, Timeline,
    TimelineEffector, TimelineState,
};
use std::sync::Arc;

fn assert_approx(actual: f32, expected: f32) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= 1.0e-5,
        "expected {expected}, got {actual} (diff {diff})"
    );
}

fn instance(key_count: usize, frame_duration: f32, looping: bool, reverse: bool) -> AnimationInstance {
    AnimationInstance::with_settings(
        Arc::new(AnimationClip::new("clip", key_count, 1)),
        AnimationSettings {
            frame_duration,
            looping,
            reverse,
            ..AnimationSettings::default()
        },
    )
}

fn playing(animation: &AnimationInstance) -> Timeline {
    let mut timeline = Timeline::new();
    timeline.sync_to_animation(animation);
    timeline.reset();
    timeline.play();
    timeline
}

#[test]
fn new_timeline_is_paused() {
    let timeline = Timeline::new();
    assert_eq!(timeline.state(), TimelineState::Paused);
    assert!(timeline.is_paused());
    assert_approx(timeline.interpolation_alpha(), 0.0);
}

#[test]
fn two_key_clip_advances_then_pauses_on_last_key() {
    let mut timeline = playing(&instance(2, 0.1, false, false));

    assert_eq!(timeline.update(0.05), 0);
    assert_eq!(timeline.current_key_frame(), 0);
    assert_approx(timeline.interpolation_alpha(), 0.5);
    assert!(timeline.is_playing());

    assert_eq!(timeline.update(0.05), 1);
    assert_eq!(timeline.current_key_frame(), 1);
    assert!(timeline.is_paused());
    assert!(timeline.is_last_key_frame(false));
    assert_eq!(timeline.take_frame_changes(), 1);
    assert_eq!(timeline.take_frame_changes(), 0);
}

#[test]
fn looping_clip_wraps_and_keeps_playing() {
    let mut timeline = playing(&instance(2, 0.1, true, false));

    timeline.update(0.05);
    timeline.update(0.05);
    assert_eq!(timeline.current_key_frame(), 1);
    assert!(timeline.is_playing());

    timeline.update(0.1);
    assert_eq!(timeline.current_key_frame(), 0);
    assert_eq!(timeline.state(), TimelineState::Playing);
}

#[test]
fn large_delta_advances_several_keys() {
    let mut timeline = playing(&instance(8, 0.1, false, false));
    let emitted = timeline.update(0.35);
    assert_eq!(emitted, 3);
    assert_eq!(timeline.current_key_frame(), 3);
    assert_approx(timeline.frame_timer(), 0.05);
}

#[test]
fn advance_stops_at_last_key_even_with_time_left() {
    let mut timeline = playing(&instance(3, 0.1, false, false));
    let emitted = timeline.update(1.0);
    assert_eq!(emitted, 2);
    assert_eq!(timeline.current_key_frame(), 2);
    assert!(timeline.is_paused());
    assert_eq!(timeline.frame_timer(), 0.0);
}

#[test]
fn resume_after_auto_pause_starts_from_the_last_key() {
    let mut timeline = playing(&instance(3, 0.1, false, false));
    timeline.update(1.0);
    timeline.resume();
    assert!(timeline.is_playing());
    let alpha = timeline.interpolation_alpha();
    assert!((0.0..1.0).contains(&alpha), "alpha {alpha} out of range");
    assert_eq!(timeline.update(0.0), 0);
    assert_eq!(timeline.current_key_frame(), 2);
    assert!(timeline.is_playing());

    let mut timeline = playing(&instance(2, 0.1, false, false));
    timeline.update(0.15);
    assert!(timeline.is_paused());
    timeline.toggle_pause();
    assert_approx(timeline.interpolation_alpha(), 0.0);
}

#[test]
fn ignore_looping_effector_overrides_clip_loop() {
    let mut timeline = playing(&instance(2, 0.1, true, false));
    timeline.set_effector(TimelineEffector::IgnoreLooping, true);
    assert!(!timeline.is_looping());

    timeline.update(0.1);
    assert_eq!(timeline.current_key_frame(), 1);
    assert!(timeline.is_paused());
}

#[test]
fn reversed_clip_plays_backwards() {
    let animation = instance(3, 0.1, false, true);
    let mut timeline = Timeline::new();
    timeline.sync_to_animation(&animation);
    timeline.reset();
    timeline.play_transition(0.0);
    assert_eq!(timeline.current_key_frame(), 2);
    assert!(timeline.is_first_key_frame(false));

    timeline.update(0.0);
    assert!(timeline.is_playing());

    timeline.update(0.1);
    assert_eq!(timeline.current_key_frame(), 1);
    timeline.update(0.1);
    assert_eq!(timeline.current_key_frame(), 0);
    assert!(timeline.is_paused());
    assert!(timeline.is_last_key_frame(false));
}

#[test]
fn next_of_previous_round_trips_in_both_directions() {
    let animation = instance(5, 0.1, false, false);
    for rewind in [false, true] {
        let mut timeline = Timeline::new();
        timeline.sync_to_animation(&animation);
        timeline.set_effector(TimelineEffector::Rewind, rewind);

        for _ in 0..5 {
            let key = timeline.current_key_frame();
            for ignore_direction in [false, true] {
                timeline.go_to_previous_key_frame(ignore_direction);
                timeline.go_to_next_key_frame(ignore_direction);
                assert_eq!(timeline.current_key_frame(), key);
            }
            timeline.go_to_next_key_frame(true);
        }
    }
}

#[test]
fn key_queries_wrap_around() {
    let animation = instance(4, 0.1, false, false);
    let mut timeline = Timeline::new();
    timeline.sync_to_animation(&animation);

    assert_eq!(timeline.previous_key_frame(false), 3);
    assert_eq!(timeline.next_key_frame(false), 1);

    timeline.set_effector(TimelineEffector::Rewind, true);
    assert_eq!(timeline.next_key_frame(false), 3);
    assert_eq!(timeline.next_key_frame(true), 1);
    assert_eq!(timeline.first_key_frame(false), 3);
    assert_eq!(timeline.last_key_frame(false), 0);
    assert_eq!(timeline.last_key_frame(true), 3);
}

#[test]
fn toggling_rewind_twice_restores_direction() {
    for reverse in [false, true] {
        let mut timeline = Timeline::new();
        timeline.sync_to_animation(&instance(3, 0.1, false, reverse));
        let before = timeline.is_reversed();
        timeline.toggle_effector(TimelineEffector::Rewind);
        assert_ne!(timeline.is_reversed(), before);
        timeline.toggle_effector(TimelineEffector::Rewind);
        assert_eq!(timeline.is_reversed(), before);
    }
}

#[test]
fn alpha_stays_in_unit_range_while_playing() {
    let mut timeline = playing(&instance(50, 0.03, true, false));
    for _ in 0..200 {
        timeline.update(0.007);
        let alpha = timeline.interpolation_alpha();
        assert!((0.0..1.0).contains(&alpha), "alpha {alpha} out of range");
    }
}

#[test]
fn alpha_is_zero_with_ignore_frame_interpolation() {
    let mut timeline = playing(&instance(4, 0.1, true, false));
    timeline.set_effector(TimelineEffector::IgnoreFrameInterpolation, true);
    for _ in 0..10 {
        timeline.update(0.037);
        assert_eq!(timeline.interpolation_alpha(), 0.0);
    }

    timeline.play_transition(1.0);
    timeline.update(0.5);
    assert_eq!(timeline.interpolation_alpha(), 0.0);
}

#[test]
fn transition_hands_off_to_playing_after_its_duration() {
    let mut timeline = Timeline::new();
    timeline.sync_to_animation(&instance(3, 0.1, false, false));
    timeline.play_transition(0.2);
    assert!(timeline.is_transitioning());

    assert_eq!(timeline.update(0.1), 0);
    assert_approx(timeline.interpolation_alpha(), 0.5);
    assert!(timeline.is_transitioning());

    assert_eq!(timeline.update(0.1), 1);
    assert!(timeline.is_playing());
    assert_eq!(timeline.current_key_frame(), 0);
}

#[test]
fn zero_length_transition_reports_zero_alpha_and_hands_off_next_update() {
    let mut timeline = Timeline::new();
    timeline.sync_to_animation(&instance(3, 0.1, false, false));
    timeline.play_transition(0.0);
    assert_eq!(timeline.interpolation_alpha(), 0.0);
    assert!(timeline.is_transitioning());

    assert_eq!(timeline.update(0.0), 1);
    assert!(timeline.is_playing());
}

#[test]
fn play_transition_is_ignored_with_effector() {
    let mut timeline = Timeline::new();
    timeline.set_effector(TimelineEffector::IgnoreTransitioning, true);
    timeline.sync_to_animation(&instance(3, 0.1, false, false));
    timeline.play_transition(0.5);
    assert!(timeline.is_paused());
}

#[test]
fn pause_and_resume_restore_previous_state() {
    let mut timeline = playing(&instance(3, 0.1, false, false));
    timeline.pause();
    timeline.pause();
    assert!(timeline.is_paused());

    timeline.update(1.0);
    assert_eq!(timeline.current_key_frame(), 0);

    timeline.resume();
    assert!(timeline.is_playing());

    timeline.toggle_pause();
    assert!(timeline.is_paused());
    timeline.toggle_pause();
    assert!(timeline.is_playing());
}

#[test]
fn reset_returns_to_start_and_clears_timers() {
    let mut timeline = playing(&instance(5, 0.1, false, false));
    timeline.update(0.25);
    assert_eq!(timeline.current_key_frame(), 2);

    timeline.reset();
    assert_eq!(timeline.current_key_frame(), 0);
    assert_eq!(timeline.frame_timer(), 0.0);
    assert_eq!(timeline.transition_timer(), 0.0);
}

#[test]
fn invalid_deltas_are_ignored() {
    let mut timeline = playing(&instance(3, 0.1, false, false));
    assert_eq!(timeline.update(-1.0), 0);
    assert_eq!(timeline.update(f32::NAN), 0);
    assert_eq!(timeline.update(f32::INFINITY), 0);
    assert_eq!(timeline.current_key_frame(), 0);
    assert_eq!(timeline.frame_timer(), 0.0);
}

#[test]
fn sync_clamps_current_key_into_new_range() {
    let mut timeline = Timeline::new();
    timeline.sync_to_animation(&instance(10, 0.1, false, false));
    for _ in 0..7 {
        timeline.go_to_next_key_frame(true);
    }
    assert_eq!(timeline.take_frame_changes(), 7);

    timeline.sync_to_animation(&instance(3, 0.1, false, false));
    assert_eq!(timeline.current_key_frame(), 2);
}

#[test]
fn effectors_are_read_from_configuration() {
    let config = Settings::new()
        .with(TimelineEffector::Rewind.setting_key(), true)
        .with(TimelineEffector::IgnoreTransitioning.setting_key(), true);

    let timeline = Timeline::from_settings(&config).unwrap();
    assert!(timeline.effector(TimelineEffector::Rewind));
    assert!(timeline.effector(TimelineEffector::IgnoreTransitioning));
    assert!(!timeline.effector(TimelineEffector::IgnoreLooping));
    assert!(!timeline.effector(TimelineEffector::IgnoreFrameInterpolation));

    let bad = Settings::new().with(TimelineEffector::IgnoreLooping.setting_key(), "yes");
    assert!(Effectors::from_settings(&bad).is_err());
}
