use std::time::{Duration, Instant};

/// Timing snapshot for one loop iteration.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous tick, clamped.
    pub dt: f32,
    pub now: Instant,
    pub frame_index: u64,
}

/// Per-loop clock with a target interval.
///
/// Each loop (main, render) owns one; they never share delta state. The
/// interval is only a pacing target: `remaining` tells an idle loop how long
/// it may sleep before the next tick is due.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    interval: Duration,
    dt_max: Duration,
}

const DT_MIN: Duration = Duration::from_micros(100);
const DT_MAX: Duration = Duration::from_millis(250);

impl FrameClock {
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            last: Instant::now(),
            frame_index: 0,
            interval,
            dt_max: DT_MAX.max(interval),
        }
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[inline]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Instant the next tick is due.
    pub fn next_deadline(&self) -> Instant {
        self.last + self.interval
    }

    /// Time left until the next tick is due; zero if overdue.
    pub fn remaining(&self) -> Duration {
        self.next_deadline().saturating_duration_since(Instant::now())
    }

    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Advances the clock.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(DT_MIN, self.dt_max);
        self.last = now;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::with_interval(Duration::from_millis(16))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_index_increments_per_tick() {
        let mut clock = FrameClock::default();
        assert_eq!(clock.tick().frame_index, 0);
        assert_eq!(clock.tick().frame_index, 1);
        assert_eq!(clock.frame_index(), 2);
    }

    #[test]
    fn dt_is_clamped_below() {
        let mut clock = FrameClock::default();
        let ft = clock.tick();
        assert!(ft.dt >= DT_MIN.as_secs_f32());
    }

    #[test]
    fn remaining_never_exceeds_interval() {
        let mut clock = FrameClock::with_interval(Duration::from_millis(50));
        clock.tick();
        assert!(clock.remaining() <= Duration::from_millis(50));
    }

    #[test]
    fn zero_interval_is_always_due() {
        let mut clock = FrameClock::with_interval(Duration::ZERO);
        clock.tick();
        assert_eq!(clock.remaining(), Duration::ZERO);
    }
}
