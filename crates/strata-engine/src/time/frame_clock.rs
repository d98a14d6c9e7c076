use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Seconds since the previous tick, clamped.
    pub dt: f32,
    /// Seconds of game time since the first tick (sum of clamped deltas).
    pub elapsed: f64,
    pub frame_index: u64,
}

/// Produces [`FrameTime`] snapshots.
///
/// Deltas are capped so a stall (debugger, minimized window) advances the
/// game by at most `max_dt`.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<Instant>,
    elapsed: f64,
    frame_index: u64,
    max_dt: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_max_dt(Duration::from_millis(100))
    }

    pub fn with_max_dt(max_dt: Duration) -> Self {
        Self {
            last: None,
            elapsed: 0.0,
            frame_index: 0,
            max_dt,
        }
    }

    /// Forgets the previous tick; the next one reports `dt == 0`.
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = self
            .last
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last))
            .min(self.max_dt);

        self.last = Some(now);
        self.elapsed += dt.as_secs_f64();

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            elapsed: self.elapsed,
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_has_no_delta() {
        let mut clock = FrameClock::new();
        let ft = clock.tick_at(Instant::now());
        assert_eq!(ft.dt, 0.0);
        assert_eq!(ft.frame_index, 0);
    }

    #[test]
    fn stalls_are_clamped() {
        let start = Instant::now();
        let mut clock = FrameClock::with_max_dt(Duration::from_millis(50));
        clock.tick_at(start);

        let ft = clock.tick_at(start + Duration::from_millis(20));
        assert!((ft.dt - 0.02).abs() < 1e-6);

        let ft = clock.tick_at(start + Duration::from_secs(5));
        assert!((ft.dt - 0.05).abs() < 1e-6);
        assert!((ft.elapsed - 0.07).abs() < 1e-9);
        assert_eq!(ft.frame_index, 2);
    }

    #[test]
    fn reset_drops_the_baseline() {
        let start = Instant::now();
        let mut clock = FrameClock::new();
        clock.tick_at(start);
        clock.reset();
        assert_eq!(clock.tick_at(start + Duration::from_millis(30)).dt, 0.0);
    }
}
