//! Caller-side waits that precede an index build.
//!
//! The engine itself never waits. Before building a [`PositionIndex`] the
//! reading-view controller holds off until embedded images have loaded (or a
//! deadline passes) and until the surface's reported extent stops changing
//! across consecutive frame samples. Any content swap or resize invalidates
//! the wait so a stale index is never installed over a newer layout.
//!
//! [`PositionIndex`]: crate::position::PositionIndex

use crate::constants::{IMAGE_LOAD_TIMEOUT, MAX_STABILITY_ATTEMPTS, STABLE_FRAME_COUNT};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayoutTicket(u64);

/// Generation counter shared by everything that schedules a relayout.
#[derive(Debug, Default)]
pub struct RelayoutGuard {
    generation: u64,
}

impl RelayoutGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new generation; tickets from earlier ones become stale.
    pub fn invalidate(&mut self) -> RelayoutTicket {
        self.generation += 1;
        RelayoutTicket(self.generation)
    }

    pub fn is_current(&self, ticket: RelayoutTicket) -> bool {
        ticket.0 == self.generation
    }
}

/// Outstanding image loads with an upper bound on how long to wait.
#[derive(Debug, Clone)]
pub struct ImageGate {
    pending: usize,
    deadline: Instant,
}

impl ImageGate {
    pub fn new(pending: usize, timeout: Duration, now: Instant) -> Self {
        Self {
            pending,
            deadline: now + timeout,
        }
    }

    pub fn with_default_timeout(pending: usize, now: Instant) -> Self {
        Self::new(pending, IMAGE_LOAD_TIMEOUT, now)
    }

    /// One image finished, successfully or not.
    pub fn image_settled(&mut self) {
        self.pending = self.pending.saturating_sub(1);
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn is_ready(&self, now: Instant) -> bool {
        self.pending == 0 || now >= self.deadline
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StabilityConfig {
    pub stable_frames: u32,
    pub max_attempts: u32,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            stable_frames: STABLE_FRAME_COUNT,
            max_attempts: MAX_STABILITY_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StabilityState {
    Settling,
    Stable,
    /// The attempt bound was hit; proceed with best-effort geometry.
    GaveUp,
}

/// Debounced check that the scroll extent has stopped changing.
#[derive(Debug, Clone)]
pub struct LayoutStabilizer {
    config: StabilityConfig,
    last_extent: f64,
    stable_count: u32,
    attempts: u32,
}

impl LayoutStabilizer {
    pub fn new(config: StabilityConfig, initial_extent: f64) -> Self {
        Self {
            config,
            last_extent: initial_extent,
            stable_count: 0,
            attempts: 0,
        }
    }

    /// Feeds one frame's extent sample.
    pub fn observe(&mut self, extent: f64) -> StabilityState {
        if extent == self.last_extent && extent > 0.0 {
            self.stable_count += 1;
            if self.stable_count >= self.config.stable_frames {
                return StabilityState::Stable;
            }
        } else {
            self.stable_count = 0;
            self.last_extent = extent;
        }

        self.attempts += 1;
        if self.attempts >= self.config.max_attempts {
            warn!(
                "Layout extent still changing after {} samples, proceeding",
                self.attempts
            );
            return StabilityState::GaveUp;
        }
        StabilityState::Settling
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayoutPoll {
    Waiting,
    Ready,
    Cancelled,
}

#[derive(Debug, Clone)]
enum Phase {
    Images(ImageGate),
    Settling(LayoutStabilizer),
    Done,
}

/// One scheduled relayout: images first, then extent stability.
#[derive(Debug, Clone)]
pub struct PendingRelayout {
    ticket: RelayoutTicket,
    stability: StabilityConfig,
    phase: Phase,
}

impl PendingRelayout {
    pub fn new(ticket: RelayoutTicket, images: ImageGate, stability: StabilityConfig) -> Self {
        Self {
            ticket,
            stability,
            phase: Phase::Images(images),
        }
    }

    pub fn ticket(&self) -> RelayoutTicket {
        self.ticket
    }

    pub fn image_settled(&mut self) {
        if let Phase::Images(gate) = &mut self.phase {
            gate.image_settled();
        }
    }

    /// Advances the wait by one frame.
    pub fn poll(&mut self, guard: &RelayoutGuard, extent: f64, now: Instant) -> RelayoutPoll {
        if !guard.is_current(self.ticket) {
            debug!("Relayout {:?} superseded", self.ticket);
            return RelayoutPoll::Cancelled;
        }

        match &mut self.phase {
            Phase::Images(gate) => {
                if gate.is_ready(now) {
                    if gate.pending() > 0 {
                        warn!("{} images still loading at deadline", gate.pending());
                    }
                    self.phase = Phase::Settling(LayoutStabilizer::new(self.stability, extent));
                }
                RelayoutPoll::Waiting
            }
            Phase::Settling(stabilizer) => match stabilizer.observe(extent) {
                StabilityState::Settling => RelayoutPoll::Waiting,
                StabilityState::Stable | StabilityState::GaveUp => {
                    self.phase = Phase::Done;
                    RelayoutPoll::Ready
                }
            },
            Phase::Done => RelayoutPoll::Ready,
        }
    }
}
