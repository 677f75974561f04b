//! A single entry of nested progress.
//!
//! A [`Level`] tracks one bracket of work: an optional title, a target total,
//! and the position accumulated so far. Levels are pure data plus arithmetic;
//! they never touch the output stream. The interesting piece is
//! [`fraction_with_inner`](Level::fraction_with_inner), which folds a nested
//! level's partial completion into this level's displayed fraction using the
//! in-flight step magnitude set by [`begin_step`](Level::begin_step).

use compact_str::CompactString;

/// One entry in the nested-progress stack.
///
/// Created when a session level starts, mutated only through the session's
/// `advance`/`set` family while it is the innermost level, and discarded when
/// the matching stop pops it. `current` may transiently exceed `total` on
/// caller error; only the nested fraction fed into
/// [`fraction_with_inner`](Level::fraction_with_inner) is clamped.
#[derive(Clone, Debug)]
pub struct Level {
    title: Option<CompactString>,
    total: f64,
    current: f64,
    note: Option<CompactString>,
    /// Magnitude of the step currently in flight, if any. While set, a nested
    /// level's completion ratio is weighted by it so the nested work
    /// contributes proportionally to this level's fraction.
    step: Option<f64>,
}

impl Level {
    /// Creates a level with an optional title and an optional target total.
    ///
    /// A missing or zero `total` normalizes to `1.0`, so a title-only level
    /// reads as binary done/not-done.
    #[must_use]
    pub fn new(total: Option<f64>, title: Option<&str>) -> Self {
        let total = match total {
            Some(t) if t != 0.0 => t,
            _ => 1.0,
        };

        Self {
            title: title.map(CompactString::from),
            total,
            current: 0.0,
            note: None,
            step: None,
        }
    }

    /// Returns the display label, if any.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Returns the target total (always non-zero).
    #[must_use]
    pub const fn total(&self) -> f64 {
        self.total
    }

    /// Returns the accumulated position.
    #[must_use]
    pub const fn current(&self) -> f64 {
        self.current
    }

    /// Returns the transient annotation, if any.
    #[must_use]
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    /// Folds a nested level's completion fraction into this level's fraction.
    ///
    /// `inner` is clamped to `1.0`, then weighted by the in-flight step
    /// magnitude when one is set. The result is
    /// `(current + weighted_inner) / total`; pass `0.0` for the innermost
    /// level.
    #[must_use]
    pub fn fraction_with_inner(&self, inner: f64) -> f64 {
        let inner = inner.min(1.0);
        let inner = match self.step {
            Some(step) => inner * step,
            None => inner,
        };
        (self.current + inner) / self.total
    }

    /// Marks a step of `magnitude` as in flight and overwrites the note.
    ///
    /// Nested renders performed before the step completes use the magnitude to
    /// compute a provisional fraction for this level.
    pub fn begin_step(&mut self, magnitude: f64, note: Option<&str>) {
        self.step = Some(magnitude);
        self.note = note.map(CompactString::from);
    }

    /// Clears the in-flight step marker.
    pub fn end_step(&mut self) {
        self.step = None;
    }

    /// Sets the position to an explicit absolute value.
    pub fn apply(&mut self, new_current: f64) {
        self.current = new_current;
    }

    /// Overwrites the annotation shown appended to the rendered line.
    pub fn set_note(&mut self, note: Option<&str>) {
        self.note = note.map(CompactString::from);
    }
}

#[cfg(test)]
mod tests {
    use super::Level;

    /// Total Normalization
    /// Missing and zero totals both read as a binary done/not-done level.
    #[test]
    #[allow(clippy::float_cmp)]
    fn test_total_normalization() {
        assert_eq!(Level::new(None, Some("only title")).total(), 1.0);
        assert_eq!(Level::new(Some(0.0), None).total(), 1.0);
        assert_eq!(Level::new(Some(42.0), None).total(), 42.0);
    }

    /// Fraction Composition
    /// Verifies clamping and in-flight weighting of a nested fraction.
    #[test]
    #[allow(clippy::float_cmp)]
    fn test_fraction_with_inner() {
        let mut level = Level::new(Some(5.0), None);
        level.apply(2.0);

        // No nested work in flight.
        assert_eq!(level.fraction_with_inner(0.0), 0.4);

        // Nested fraction above 1.0 is clamped before weighting.
        level.begin_step(2.0, None);
        assert_eq!(level.fraction_with_inner(1.5), 0.8);

        // A third of a nested level, weighted by a step of 2 out of 5.
        let composed = level.fraction_with_inner(1.0 / 3.0);
        assert!((composed - 0.533_333).abs() < 1e-5);

        level.end_step();
        assert_eq!(level.fraction_with_inner(0.5), 0.5);
    }

    /// Absolute Positioning
    /// `apply` replaces the position, it does not accumulate.
    #[test]
    #[allow(clippy::float_cmp)]
    fn test_apply_is_absolute() {
        let mut level = Level::new(Some(10.0), None);
        level.apply(3.0);
        level.apply(3.0);
        assert_eq!(level.current(), 3.0);
    }

    /// Note Lifecycle
    /// Each update overwrites the note; passing nothing clears it.
    #[test]
    fn test_note_overwrite() {
        let mut level = Level::new(Some(2.0), None);
        level.begin_step(1.0, Some("first"));
        assert_eq!(level.note(), Some("first"));
        level.begin_step(1.0, None);
        assert_eq!(level.note(), None);
    }
}
