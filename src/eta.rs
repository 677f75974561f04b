//! Smoothed remaining-time estimation.
//!
//! [`Eta`] turns "fraction complete" plus wall-clock time into a short human
//! string. The naive projection `started_at + elapsed / completed` jitters
//! badly on noisy step rates, so successive projections are blended with a
//! weight of `(1 + completed) * 0.5`: early estimates are damped at 50%,
//! late estimates track the fresh projection almost fully.

use web_time::Instant;

/// Remaining-time estimator for one progress session.
///
/// One instance is created per outermost start and discarded on the final
/// stop. The estimator never fails; a missing or useless estimate is simply
/// `None` and the caller omits the ETA segment.
pub struct Eta {
    started_at: Instant,
    /// Smoothed projected completion, as seconds since `started_at`.
    smoothed: Option<f64>,
}

impl Eta {
    /// Creates an estimator whose clock starts now.
    #[must_use]
    pub fn new() -> Self {
        Self::with_start(Instant::now())
    }

    /// Creates an estimator with an explicit start instant.
    #[must_use]
    pub const fn with_start(started_at: Instant) -> Self {
        Self {
            started_at,
            smoothed: None,
        }
    }

    /// Returns a smoothed estimate of the time left, as a human string.
    ///
    /// Returns `None` until at least one second of wall-clock time has
    /// elapsed (a single fast step would otherwise produce a wild estimate),
    /// when `completed` is not yet positive, or when the smoothed projection
    /// is already in the past.
    pub fn left(&mut self, completed: f64) -> Option<String> {
        let seconds = self.seconds_left(completed)?;
        if seconds > 0.0 {
            Some(format_seconds(seconds))
        } else {
            None
        }
    }

    /// Returns the time elapsed since the session started, as a human string.
    #[must_use]
    pub fn elapsed(&self) -> String {
        format_seconds(self.started_at.elapsed().as_secs_f64())
    }

    fn seconds_left(&mut self, completed: f64) -> Option<f64> {
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if completed <= 0.0 || elapsed < 1.0 {
            return None;
        }

        // Projected completion as seconds from start.
        let naive = elapsed / completed;
        let smoothed = match self.smoothed {
            Some(prev) => prev + (naive - prev) * (1.0 + completed) * 0.5,
            None => naive,
        };
        self.smoothed = Some(smoothed);

        Some(smoothed - elapsed)
    }
}

impl Default for Eta {
    fn default() -> Self {
        Self::new()
    }
}

/// Formats a second count with a unit keeping the quantity human-friendly:
/// seconds below a minute, then minutes, hours, days.
#[must_use]
pub(crate) fn format_seconds(seconds: f64) -> String {
    if seconds < 60.0 {
        format!("{seconds:.0}s")
    } else if seconds < 3600.0 {
        format!("{:.1}m", seconds / 60.0)
    } else if seconds < 86_400.0 {
        format!("{:.1}h", seconds / 3600.0)
    } else {
        format!("{:.1}d", seconds / 86_400.0)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use web_time::Instant;

    use super::{format_seconds, Eta};

    fn started_ago(seconds: u64) -> Instant {
        Instant::now()
            .checked_sub(Duration::from_secs(seconds))
            .expect("clock predates process start")
    }

    /// Unit Ladder
    /// Verifies the seconds/minutes/hours/days selection and precision.
    #[test]
    fn test_format_seconds_units() {
        assert_eq!(format_seconds(0.0), "0s");
        assert_eq!(format_seconds(59.4), "59s");
        assert_eq!(format_seconds(60.0), "1.0m");
        assert_eq!(format_seconds(1800.0), "30.0m");
        assert_eq!(format_seconds(7200.0), "2.0h");
        assert_eq!(format_seconds(172_800.0), "2.0d");
    }

    /// Warm-up Window
    /// No estimate before one second of wall-clock time has passed.
    #[test]
    fn test_no_estimate_before_one_second() {
        let mut eta = Eta::new();
        assert!(eta.left(0.5).is_none());
    }

    /// Zero Completion
    /// No estimate without any completed fraction, however long we waited.
    #[test]
    fn test_no_estimate_without_completion() {
        let mut eta = Eta::with_start(started_ago(30));
        assert!(eta.left(0.0).is_none());
    }

    /// First Projection
    /// The first usable call returns the naive projection unsmoothed:
    /// 10s elapsed at 50% complete leaves 10s.
    #[test]
    fn test_first_projection_is_naive() {
        let mut eta = Eta::with_start(started_ago(10));
        assert_eq!(eta.left(0.5).as_deref(), Some("10s"));
    }

    /// Smoothing Blend
    /// A second projection moves `(1 + completed) * 0.5` of the way toward
    /// the fresh value: from 20s projected to 13.25s, leaving ~3s.
    #[test]
    fn test_smoothing_blend() {
        let mut eta = Eta::with_start(started_ago(10));
        assert_eq!(eta.left(0.5).as_deref(), Some("10s"));
        assert_eq!(eta.left(0.8).as_deref(), Some("3s"));
    }

    /// Overdue Projection
    /// Once the smoothed completion time is in the past, no estimate is
    /// shown rather than a negative one.
    #[test]
    fn test_overdue_projection_suppressed() {
        let mut eta = Eta::with_start(started_ago(100));
        // Fully complete projects completion exactly now, so nothing is left.
        assert!(eta.left(1.0).is_none());
    }

    /// Elapsed Formatting
    /// Elapsed time uses the same unit ladder as the estimate.
    #[test]
    fn test_elapsed() {
        assert_eq!(Eta::with_start(started_ago(0)).elapsed(), "0s");
        assert_eq!(Eta::with_start(started_ago(90)).elapsed(), "1.5m");
    }
}
