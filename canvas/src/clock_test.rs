#![allow(clippy::float_cmp)]

use super::*;

// =============================================================
// AnimationClock
// =============================================================

#[test]
fn new_clock_is_paused_at_zero() {
    let clock = AnimationClock::new();
    assert_eq!(clock.frame(), 0);
    assert!(!clock.is_playing());
    assert!(!clock.reveal_enabled());
}

#[test]
fn progress_is_one_when_paused() {
    let mut clock = AnimationClock::new();
    clock.replay();
    clock.advance();
    clock.pause();
    assert_eq!(clock.reveal_progress(), 1.0);
}

#[test]
fn progress_grows_over_reveal_duration() {
    let mut clock = AnimationClock::new();
    clock.replay();
    assert_eq!(clock.reveal_progress(), 0.0);
    for _ in 0..60 {
        clock.advance();
    }
    assert_eq!(clock.reveal_progress(), 0.5);
    for _ in 0..200 {
        clock.advance();
    }
    assert_eq!(clock.reveal_progress(), 1.0);
}

#[test]
fn progress_is_monotonic_while_playing() {
    let mut clock = AnimationClock::new();
    clock.replay();
    let mut last = clock.reveal_progress();
    for _ in 0..150 {
        clock.advance();
        let p = clock.reveal_progress();
        assert!(p >= last);
        assert!((0.0..=1.0).contains(&p));
        last = p;
    }
}

#[test]
fn clip_width_only_when_revealing_and_playing() {
    let mut clock = AnimationClock::new();
    clock.replay();
    for _ in 0..30 {
        clock.advance();
    }
    assert_eq!(clock.clip_width(800.0), None);
    clock.set_reveal(true);
    assert_eq!(clock.clip_width(800.0), Some(200.0));
    clock.pause();
    assert_eq!(clock.clip_width(800.0), None);
}

#[test]
fn show_result_jumps_to_static_frame_and_pauses() {
    let mut clock = AnimationClock::new();
    clock.replay();
    clock.show_result();
    assert_eq!(clock.frame(), STATIC_RESULT_FRAME);
    assert!(!clock.is_playing());
}

#[test]
fn replay_resets_counter_and_plays() {
    let mut clock = AnimationClock::new();
    clock.show_result();
    clock.replay();
    assert_eq!(clock.frame(), 0);
    assert!(clock.is_playing());
}

#[test]
fn play_resumes_from_current_frame() {
    let mut clock = AnimationClock::new();
    clock.replay();
    clock.advance();
    clock.advance();
    clock.pause();
    clock.play();
    assert_eq!(clock.frame(), 2);
    assert!(clock.is_playing());
}

// =============================================================
// TickScheduler
// =============================================================

#[test]
fn only_one_tick_is_live() {
    let mut ticks = TickScheduler::new();
    assert!(ticks.schedule().is_some());
    assert!(ticks.schedule().is_none());
}

#[test]
fn accept_consumes_token() {
    let mut ticks = TickScheduler::new();
    let token = ticks.schedule().unwrap();
    assert!(ticks.accept(token));
    assert!(!ticks.accept(token));
    assert!(!ticks.is_pending());
}

#[test]
fn cancelled_token_is_stale() {
    let mut ticks = TickScheduler::new();
    let old = ticks.schedule().unwrap();
    assert_eq!(ticks.cancel(), Some(old));
    let fresh = ticks.schedule().unwrap();
    assert_ne!(old, fresh);
    assert!(!ticks.accept(old));
    assert!(ticks.accept(fresh));
}
