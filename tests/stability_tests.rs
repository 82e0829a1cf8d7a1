use std::time::{Duration, Instant};
use yomu::stability::{
    ImageGate, LayoutStabilizer, PendingRelayout, RelayoutGuard, RelayoutPoll, StabilityConfig,
    StabilityState,
};

#[test]
fn test_image_gate_waits_for_loads_or_deadline() {
    let start = Instant::now();
    let mut gate = ImageGate::new(2, Duration::from_millis(2000), start);

    assert!(!gate.is_ready(start));
    gate.image_settled();
    assert!(!gate.is_ready(start));
    gate.image_settled();
    assert!(gate.is_ready(start));

    let stuck = ImageGate::with_default_timeout(3, start);
    assert!(!stuck.is_ready(start + Duration::from_millis(1999)));
    assert!(stuck.is_ready(start + Duration::from_millis(2000)));
}

#[test]
fn test_stabilizer_needs_consecutive_equal_samples() {
    let mut stabilizer = LayoutStabilizer::new(StabilityConfig::default(), 1200.0);

    for _ in 0..4 {
        assert_eq!(stabilizer.observe(1200.0), StabilityState::Settling);
    }
    // a change restarts the streak
    assert_eq!(stabilizer.observe(1300.0), StabilityState::Settling);
    for _ in 0..4 {
        assert_eq!(stabilizer.observe(1300.0), StabilityState::Settling);
    }
    assert_eq!(stabilizer.observe(1300.0), StabilityState::Stable);
}

#[test]
fn test_stabilizer_gives_up_on_empty_extent() {
    let config = StabilityConfig::default();
    let mut stabilizer = LayoutStabilizer::new(config, 0.0);

    for _ in 1..config.max_attempts {
        assert_eq!(stabilizer.observe(0.0), StabilityState::Settling);
    }
    assert_eq!(stabilizer.observe(0.0), StabilityState::GaveUp);
}

#[test]
fn test_pending_relayout_is_ready_after_stable_frames() {
    let mut guard = RelayoutGuard::new();
    let now = Instant::now();
    let ticket = guard.invalidate();
    let mut pending = PendingRelayout::new(
        ticket,
        ImageGate::with_default_timeout(0, now),
        StabilityConfig::default(),
    );

    let mut polls = 0;
    loop {
        polls += 1;
        match pending.poll(&guard, 640.0, now) {
            RelayoutPoll::Waiting => continue,
            RelayoutPoll::Ready => break,
            RelayoutPoll::Cancelled => panic!("relayout cancelled"),
        }
    }
    assert_eq!(polls, 6);
}

#[test]
fn test_pending_relayout_holds_for_images() {
    let mut guard = RelayoutGuard::new();
    let now = Instant::now();
    let mut pending = PendingRelayout::new(
        guard.invalidate(),
        ImageGate::with_default_timeout(1, now),
        StabilityConfig::default(),
    );

    for _ in 0..10 {
        assert_eq!(pending.poll(&guard, 640.0, now), RelayoutPoll::Waiting);
    }
    pending.image_settled();
    for _ in 0..5 {
        assert_eq!(pending.poll(&guard, 640.0, now), RelayoutPoll::Waiting);
    }
    assert_eq!(pending.poll(&guard, 640.0, now), RelayoutPoll::Ready);
}

#[test]
fn test_newer_relayout_cancels_older_one() {
    let mut guard = RelayoutGuard::new();
    let now = Instant::now();
    let first = guard.invalidate();
    let mut pending = PendingRelayout::new(
        first,
        ImageGate::with_default_timeout(0, now),
        StabilityConfig::default(),
    );
    assert_eq!(pending.poll(&guard, 640.0, now), RelayoutPoll::Waiting);

    let second = guard.invalidate();
    assert!(!guard.is_current(first));
    assert!(guard.is_current(second));
    assert_eq!(pending.poll(&guard, 640.0, now), RelayoutPoll::Cancelled);
}
