//! Iterator adapters for automatic progress tracking.
//!
//! [`ProgressIteratorExt`] attaches a progress level to any iterator: one
//! level per iteration, one unit step per element, and a guaranteed matching
//! stop when the adapter is dropped, early exit and panics included.
//!
//! # Heuristics
//!
//! The level's total comes from [`Iterator::size_hint`] when the bounds are
//! exact; otherwise the level falls back to the binary done/not-done total.
//! A step is reported *after* the element has been processed, i.e. on the
//! following `next` call, so a render during processing shows the element as
//! still in flight.

use crate::session::{global, Progress};

/// An iterator adapter driving a progress level from iteration.
///
/// Constructed via [`ProgressIteratorExt`]. The level is started on
/// construction and stopped exactly once, on exhaustion or drop. If the
/// session refused the level (cross-thread nesting), the adapter is
/// transparent and tracks nothing.
pub struct WithProgress<I> {
    iter: I,
    progress: Progress,
    tracked: bool,
    /// An element has been handed out but its step not yet reported.
    pending: bool,
    stopped: bool,
}

impl<I: Iterator> WithProgress<I> {
    fn new(iter: I, progress: Progress, title: Option<&str>) -> Self {
        let (lower, upper) = iter.size_hint();
        let total = match upper {
            Some(upper) if upper == lower => Some(lower as f64),
            _ => None,
        };
        let tracked = progress.start_level(total, title);

        Self {
            iter,
            progress,
            tracked,
            pending: false,
            stopped: false,
        }
    }
}

impl<I> WithProgress<I> {
    fn finish(&mut self) {
        if self.tracked && !self.stopped {
            self.stopped = true;
            self.progress.stop();
        }
    }
}

impl<I: Iterator> Iterator for WithProgress<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        if self.tracked && self.pending {
            self.progress.advance(1.0, None);
            self.pending = false;
        }

        match self.iter.next() {
            Some(item) => {
                self.pending = true;
                Some(item)
            }
            None => {
                self.finish();
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<I> Drop for WithProgress<I> {
    fn drop(&mut self) {
        // An element may still be in flight on early exit; its step is
        // deliberately not reported.
        self.finish();
    }
}

/// Extension trait attaching progress tracking to any iterator.
pub trait ProgressIteratorExt: Iterator + Sized {
    /// Tracks this iteration as a level of the [`global`] session.
    fn with_progress(self, title: &str) -> WithProgress<Self> {
        self.with_progress_in(global(), title)
    }

    /// Tracks this iteration as a level of the given session.
    fn with_progress_in(self, progress: &Progress, title: &str) -> WithProgress<Self> {
        WithProgress::new(self, progress.clone(), Some(title))
    }

    /// Tracks this iteration as an untitled level of the given session.
    fn with_progress_untitled(self, progress: &Progress) -> WithProgress<Self> {
        WithProgress::new(self, progress.clone(), None)
    }
}

impl<I: Iterator> ProgressIteratorExt for I {}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::builder::ProgressBuilder;
    use crate::session::Progress;

    use super::ProgressIteratorExt as _;

    fn quiet_session() -> Progress {
        ProgressBuilder::new()
            .sink(Box::new(std::io::sink()))
            .stay_on_line(false)
            .highlight(false)
            .terminal_title(false)
            .throttle(Duration::ZERO)
            .build()
    }

    /// Transparent Iteration
    /// The adapter yields every element unchanged and stops its level on
    /// exhaustion.
    #[test]
    fn test_full_iteration() {
        let progress = quiet_session();

        let collected: Vec<i32> = (1..=5).with_progress_in(&progress, "count").collect();
        assert_eq!(collected, vec![1, 2, 3, 4, 5]);
        assert!(!progress.is_running());
    }

    /// Deferred Steps
    /// An element's step is reported once the next element is requested, so
    /// the position trails the handed-out count by one while in flight.
    #[test]
    #[allow(clippy::float_cmp)]
    fn test_steps_trail_processing() {
        let progress = quiet_session();

        let mut iter = (0..3).with_progress_in(&progress, "trail");
        assert_eq!(iter.next(), Some(0));
        assert_eq!(progress.position(), Some(0.0));
        assert_eq!(iter.next(), Some(1));
        assert_eq!(progress.position(), Some(1.0));
        assert_eq!(iter.next(), Some(2));
        assert_eq!(iter.next(), None);
        assert!(!progress.is_running());
    }

    /// Early Exit
    /// Dropping a half-consumed adapter still stops the level exactly once.
    #[test]
    fn test_early_exit_stops() {
        let progress = quiet_session();

        for n in (0..100).with_progress_in(&progress, "early") {
            if n == 3 {
                break;
            }
        }
        assert!(!progress.is_running());
    }

    /// Nested Passthrough
    /// Nested tracked iterations compose and map results flow through
    /// unchanged.
    #[test]
    fn test_nested_map_passthrough() {
        let progress = quiet_session();

        let table: Vec<Vec<i32>> = [1, 2, 3]
            .iter()
            .with_progress_in(&progress, "outer")
            .map(|a| {
                [1, 2, 3]
                    .iter()
                    .with_progress_untitled(&progress)
                    .map(|b| a * b)
                    .collect()
            })
            .collect();

        assert_eq!(table, vec![vec![1, 2, 3], vec![2, 4, 6], vec![3, 6, 9]]);
        assert!(!progress.is_running());
    }
}
