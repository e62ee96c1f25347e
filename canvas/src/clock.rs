//! Animation clock and tick-token bookkeeping.
//!
//! The clock owns the frame counter, the playing flag and the reveal toggle.
//! Ticks are identified by [`TickToken`]s so a callback that fires after the
//! scheduler stopped (or restarted) can recognise itself as stale.

#[cfg(test)]
#[path = "clock_test.rs"]
mod clock_test;

use crate::consts::{REVEAL_DURATION_FRAMES, STATIC_RESULT_FRAME};

/// Frame counter and playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnimationClock {
    frame: u64,
    playing: bool,
    reveal: bool,
}

impl AnimationClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    #[must_use]
    pub fn reveal_enabled(&self) -> bool {
        self.reveal
    }

    pub fn set_reveal(&mut self, enabled: bool) {
        self.reveal = enabled;
    }

    /// Resume from the current counter.
    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Restart from frame zero and play.
    pub fn replay(&mut self) {
        self.frame = 0;
        self.playing = true;
    }

    /// Jump to the settled figure and pause.
    pub fn show_result(&mut self) {
        self.frame = STATIC_RESULT_FRAME;
        self.playing = false;
    }

    /// Move to the next frame.
    pub fn advance(&mut self) {
        self.frame = self.frame.saturating_add(1);
    }

    /// Reveal progress in `[0, 1]`: `frame / 120` while playing, `1` otherwise.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn reveal_progress(&self) -> f64 {
        if !self.playing {
            return 1.0;
        }
        (self.frame as f64 / REVEAL_DURATION_FRAMES as f64).min(1.0)
    }

    /// Width of the reveal clip for a drawing area `width` wide, or `None`
    /// when no clip applies.
    #[must_use]
    pub fn clip_width(&self, width: f64) -> Option<f64> {
        (self.reveal && self.playing).then(|| width * self.reveal_progress())
    }
}

/// Identifier of one scheduled tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickToken(u64);

/// Tracks the single live tick chain.
#[derive(Debug, Default)]
pub struct TickScheduler {
    next: u64,
    pending: Option<TickToken>,
}

impl TickScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a token for the next tick. Returns `None` if one is already
    /// outstanding, so at most one chain is live.
    pub fn schedule(&mut self) -> Option<TickToken> {
        if self.pending.is_some() {
            return None;
        }
        self.next = self.next.wrapping_add(1);
        let token = TickToken(self.next);
        self.pending = Some(token);
        Some(token)
    }

    /// Consume `token` when its tick fires. Returns `false` for stale tokens.
    pub fn accept(&mut self, token: TickToken) -> bool {
        if self.pending == Some(token) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Invalidate the outstanding token, returning it if there was one.
    pub fn cancel(&mut self) -> Option<TickToken> {
        self.pending.take()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
