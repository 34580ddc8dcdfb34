//! Session timing
//!
//! Elapsed time is derived from anchor instants rather than a countdown that
//! gets decremented on every tick. The timer starts on the first move of a
//! round, stops on a win or quit, and accumulates each running stretch into a
//! session total so pausing between rounds neither loses nor double-counts time.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionTimer {
    /// When the current round's clock started
    round_anchor: Option<Instant>,
    /// Last instant folded into `accumulated`
    last_sample: Option<Instant>,
    /// Time banked from finished or sampled stretches
    accumulated: Duration,
    running: bool,
}

impl SessionTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Start (or resume) the clock. A running timer is left alone.
    pub fn start(&mut self, now: Instant) {
        if self.running {
            return;
        }
        self.running = true;
        self.round_anchor = Some(now);
        self.last_sample = Some(now);
    }

    /// Bank the time since the last sample.
    pub fn sample(&mut self, now: Instant) {
        if !self.running {
            return;
        }
        if let Some(last) = self.last_sample {
            self.accumulated += now.saturating_duration_since(last);
        }
        self.last_sample = Some(now);
    }

    /// Bank outstanding time and freeze the clock.
    pub fn stop(&mut self, now: Instant) {
        self.sample(now);
        self.running = false;
        self.last_sample = None;
    }

    /// Time since the current round's clock started; zero when stopped.
    pub fn round_elapsed(&self, now: Instant) -> Duration {
        match (self.running, self.round_anchor) {
            (true, Some(anchor)) => now.saturating_duration_since(anchor),
            _ => Duration::ZERO,
        }
    }

    /// Session total at `now`, without mutating anything.
    pub fn total_elapsed(&self, now: Instant) -> Duration {
        let pending = match (self.running, self.last_sample) {
            (true, Some(last)) => now.saturating_duration_since(last),
            _ => Duration::ZERO,
        };
        self.accumulated + pending
    }

    /// Banked total. Equals `total_elapsed` whenever the timer is stopped.
    #[cfg(test)]
    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }
}

/// Render a duration as `m:ss.hh`.
pub fn format_elapsed(elapsed: Duration) -> String {
    format_millis(elapsed.as_millis() as u64)
}

/// Render milliseconds as `m:ss.hh`. Hundredths are truncated.
pub fn format_millis(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let hundredths = (ms % 1000) / 10;
    format!("{}:{:02}.{:02}", minutes, seconds, hundredths)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_idle_timer_reads_zero() {
        let t0 = Instant::now();
        let timer = SessionTimer::new();
        assert!(!timer.is_running());
        assert_eq!(timer.total_elapsed(t0 + ms(5000)), Duration::ZERO);
        assert_eq!(timer.round_elapsed(t0 + ms(5000)), Duration::ZERO);
    }

    #[test]
    fn test_running_total_is_pure() {
        let t0 = Instant::now();
        let mut timer = SessionTimer::new();
        timer.start(t0);
        assert_eq!(timer.total_elapsed(t0 + ms(1500)), ms(1500));
        // Reading twice changes nothing
        assert_eq!(timer.total_elapsed(t0 + ms(1500)), ms(1500));
        assert_eq!(timer.accumulated(), Duration::ZERO);
    }

    #[test]
    fn test_stop_freezes_total() {
        let t0 = Instant::now();
        let mut timer = SessionTimer::new();
        timer.start(t0);
        timer.stop(t0 + ms(2000));
        assert!(!timer.is_running());
        assert_eq!(timer.total_elapsed(t0 + ms(9000)), ms(2000));
    }

    #[test]
    fn test_pause_and_resume_accumulates_without_gap() {
        let t0 = Instant::now();
        let mut timer = SessionTimer::new();

        // Round 1 runs 3s
        timer.start(t0);
        timer.stop(t0 + ms(3000));

        // 10s presentation gap, then round 2 runs 4s
        timer.start(t0 + ms(13_000));
        assert_eq!(timer.round_elapsed(t0 + ms(14_000)), ms(1000));
        timer.stop(t0 + ms(17_000));

        assert_eq!(timer.total_elapsed(t0 + ms(20_000)), ms(7000));
    }

    #[test]
    fn test_sampling_does_not_double_count() {
        let t0 = Instant::now();
        let mut timer = SessionTimer::new();
        timer.start(t0);
        timer.sample(t0 + ms(100));
        timer.sample(t0 + ms(250));
        timer.sample(t0 + ms(250));
        assert_eq!(timer.accumulated(), ms(250));
        assert_eq!(timer.total_elapsed(t0 + ms(400)), ms(400));
    }

    #[test]
    fn test_start_while_running_keeps_anchor() {
        let t0 = Instant::now();
        let mut timer = SessionTimer::new();
        timer.start(t0);
        timer.start(t0 + ms(500));
        assert_eq!(timer.round_elapsed(t0 + ms(1000)), ms(1000));
    }

    #[test]
    fn test_format_millis() {
        assert_eq!(format_millis(0), "0:00.00");
        assert_eq!(format_millis(180_500), "3:00.50");
        assert_eq!(format_millis(240_750), "4:00.75");
        assert_eq!(format_millis(61_009), "1:01.00");
        assert_eq!(format_millis(59_999), "0:59.99");
        assert_eq!(format_millis(600_000), "10:00.00");
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(ms(3_456)), "0:03.45");
    }
}
