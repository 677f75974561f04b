//! Fluent construction of a [`Progress`] session.
//!
//! [`Progress::new`] covers the common case (stderr, everything
//! auto-detected). The builder exists for the rest: routing output to a
//! custom [`Sink`], forcing the display toggles, and overriding the render
//! throttle or beep period (the latter two mostly so tests can run
//! deterministically against a recording sink).

use std::time::Duration;

use crate::{
    io::{Sink, StderrSink},
    session::{Progress, State, DEFAULT_BEEP_PERIOD, DEFAULT_THROTTLE},
};

/// Builder for a [`Progress`] session.
pub struct ProgressBuilder {
    sink: Option<Box<dyn Sink>>,
    stay_on_line: Option<bool>,
    highlight: Option<bool>,
    terminal_title: Option<bool>,
    throttle: Duration,
    beep_period: Duration,
}

impl ProgressBuilder {
    /// Starts building a session with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sink: None,
            stay_on_line: None,
            highlight: None,
            terminal_title: None,
            throttle: DEFAULT_THROTTLE,
            beep_period: DEFAULT_BEEP_PERIOD,
        }
    }

    /// Renders to `sink` instead of standard error.
    #[must_use]
    pub fn sink(mut self, sink: Box<dyn Sink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Forces in-place line overwrite on or off.
    ///
    /// Unset, the mode follows the sink's terminal capability.
    #[must_use]
    pub const fn stay_on_line(mut self, value: bool) -> Self {
        self.stay_on_line = Some(value);
        self
    }

    /// Forces bold percentage highlighting on or off.
    #[must_use]
    pub const fn highlight(mut self, value: bool) -> Self {
        self.highlight = Some(value);
        self
    }

    /// Forces mirroring the progress line into the terminal title on or off.
    #[must_use]
    pub const fn terminal_title(mut self, value: bool) -> Self {
        self.terminal_title = Some(value);
        self
    }

    /// Overrides the minimum interval between non-forced renders
    /// (default 0.3s). `Duration::ZERO` renders on every update.
    #[must_use]
    pub const fn throttle(mut self, interval: Duration) -> Self {
        self.throttle = interval;
        self
    }

    /// Overrides the automatic re-render period (default 10s).
    #[must_use]
    pub const fn beep_period(mut self, period: Duration) -> Self {
        self.beep_period = period;
        self
    }

    /// Consumes the builder and returns the configured session handle.
    #[must_use]
    pub fn build(self) -> Progress {
        Progress::from_state(State {
            levels: Vec::new(),
            owner: None,
            eta: None,
            beeper: None,
            next_render: None,
            previous_len: 0,
            stay_on_line: self.stay_on_line,
            highlight: self.highlight,
            terminal_title: self.terminal_title,
            throttle: self.throttle,
            beep_period: self.beep_period,
            sink: self.sink.unwrap_or_else(|| Box::new(StderrSink::new())),
        })
    }
}

impl Default for ProgressBuilder {
    fn default() -> Self {
        Self::new()
    }
}
