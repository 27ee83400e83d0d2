use std::time::{Duration, Instant};

/// Frame deadlines at a fixed refresh period.
///
/// A stalled loop does not replay the frames it missed: the next deadline
/// is moved one period past the stall.
#[derive(Debug)]
pub struct RefreshPacer {
    period: Duration,
    next_frame: Instant,
    frames: u64,
}

impl RefreshPacer {
    pub fn new(period: Duration, now: Instant) -> Self {
        Self {
            period,
            next_frame: now + period,
            frames: 0,
        }
    }

    /// Frames that came due so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn limit_reached(&self, limit: Option<u64>) -> bool {
        limit.is_some_and(|limit| self.frames >= limit)
    }

    /// Returns `true` when a frame is due at `now`, and counts it.
    pub fn frame_due(&mut self, now: Instant) -> bool {
        if now < self.next_frame {
            return false;
        }

        self.frames += 1;
        self.next_frame += self.period;
        if self.next_frame <= now {
            self.next_frame = now + self.period;
        }
        true
    }

    /// When the caller should wake up next, given the toolkit's idle hint.
    pub fn wake_at(&self, now: Instant, idle: Duration) -> Instant {
        self.next_frame.min(now + idle)
    }
}
