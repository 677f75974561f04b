//! The progress session: level stack, locking discipline, and print path.
//!
//! A [`Progress`] is a cheap-to-clone (`Arc`-based) handle to one progress
//! session. All shared state (the level stack, the ETA estimator, the beeper
//! handle, render cadence, display toggles, and the sink) lives behind a
//! single [`Mutex`](parking_lot::Mutex). Structural operations and the render
//! path both serialize on it, so a render always observes a consistent stack
//! and output bytes never interleave. The beeper's periodic render uses
//! `try_lock` and simply skips when a caller-driven update is busy.
//!
//! Caller-supplied closures (`run`, `instrument`) execute *outside* the lock;
//! they are free to start nested levels and trigger renders of their own.

use std::{
    sync::{Arc, OnceLock},
    thread::{self, ThreadId},
    time::Duration,
};

use parking_lot::Mutex;
use web_time::Instant;

use crate::{
    beeper::Beeper,
    eta::Eta,
    io::{self, Sink},
    level::Level,
    render,
};

/// Minimum interval between non-forced renders.
pub(crate) const DEFAULT_THROTTLE: Duration = Duration::from_millis(300);

/// Interval of the automatic re-render keeping a stalled line alive.
pub(crate) const DEFAULT_BEEP_PERIOD: Duration = Duration::from_secs(10);

pub(crate) struct State {
    pub(crate) levels: Vec<Level>,
    /// Thread that performed the outermost start; only it may nest further.
    pub(crate) owner: Option<ThreadId>,
    pub(crate) eta: Option<Eta>,
    pub(crate) beeper: Option<Beeper>,
    pub(crate) next_render: Option<Instant>,
    pub(crate) previous_len: usize,
    pub(crate) stay_on_line: Option<bool>,
    pub(crate) highlight: Option<bool>,
    pub(crate) terminal_title: Option<bool>,
    pub(crate) throttle: Duration,
    pub(crate) beep_period: Duration,
    pub(crate) sink: Box<dyn Sink>,
}

/// A handle to a nested progress session.
///
/// Clones share the same underlying session. The four core operations are
/// [`start`](Progress::start)/[`run`](Progress::run),
/// [`advance`](Progress::advance)/[`instrument`](Progress::instrument),
/// [`set`](Progress::set)/[`instrument_to`](Progress::instrument_to) and
/// [`stop`](Progress::stop); everything else is configuration or read-only
/// inspection. When no level is running, the update operations degrade to
/// no-op wrappers that still execute and pass through the wrapped work.
#[derive(Clone)]
pub struct Progress {
    shared: Arc<Mutex<State>>,
}

impl Progress {
    /// Creates a session with default configuration: stderr sink, display
    /// toggles auto-detected from terminal capability.
    #[must_use]
    pub fn new() -> Self {
        crate::builder::ProgressBuilder::new().build()
    }

    pub(crate) fn from_state(state: State) -> Self {
        Self {
            shared: Arc::new(Mutex::new(state)),
        }
    }

    /// Pushes a progress level and renders it immediately.
    ///
    /// The first level of a session records the owning thread, creates a
    /// fresh ETA estimator and starts the beeper. A missing or zero `total`
    /// normalizes to `1.0` (binary done/not-done).
    ///
    /// Starting a nested level from a thread other than the one that started
    /// the session is refused with a logged warning: interleaved level
    /// mutation across uncoordinated threads would corrupt the stack. This is
    /// a deliberate restriction; see the crate docs.
    pub fn start(&self, total: Option<f64>, title: Option<&str>) {
        self.start_level(total, title);
    }

    /// Starts a level, runs `op`, and guarantees the matching [`stop`] runs
    /// on every exit path, panics included. `op`'s value is passed through.
    ///
    /// When the start is refused (cross-thread nesting), `op` still runs,
    /// untracked.
    ///
    /// [`stop`]: Progress::stop
    pub fn run<T>(&self, total: Option<f64>, title: Option<&str>, op: impl FnOnce() -> T) -> T {
        if !self.start_level(total, title) {
            return op();
        }
        let _guard = StopGuard(self);
        op()
    }

    pub(crate) fn start_level(&self, total: Option<f64>, title: Option<&str>) -> bool {
        {
            let mut st = self.shared.lock();
            if st.levels.is_empty() {
                st.owner = Some(thread::current().id());
                st.eta = Some(Eta::new());

                let weak = Arc::downgrade(&self.shared);
                st.beeper = Some(Beeper::new(st.beep_period, move || {
                    if let Some(shared) = weak.upgrade() {
                        Self { shared }.print(false, false);
                    }
                }));
            } else if st.owner != Some(thread::current().id()) {
                tracing::warn!("can't start nested progress from a different thread");
                return false;
            }
            st.levels.push(Level::new(total, title));
        }
        self.print(true, false);
        true
    }

    /// Advances the innermost level by `amount`, overwriting its note, and
    /// renders (throttled). No-op when nothing is running.
    ///
    /// The unit step is `advance(1.0, None)`.
    pub fn advance(&self, amount: f64, note: Option<&str>) {
        self.instrument(amount, note, || ());
    }

    /// Runs `op` as a step of `amount`, returning its value unchanged.
    ///
    /// While `op` runs, the step magnitude is marked in flight on the
    /// innermost level, so nested levels started inside `op` contribute
    /// proportionally to this level's displayed percentage. The position is
    /// applied after `op` returns. When nothing is running, `op` just runs.
    pub fn instrument<T>(&self, amount: f64, note: Option<&str>, op: impl FnOnce() -> T) -> T {
        let idx = {
            let mut st = self.shared.lock();
            match st.levels.last_mut() {
                Some(level) => {
                    level.begin_step(amount, note);
                    st.levels.len() - 1
                }
                None => {
                    drop(st);
                    return op();
                }
            }
        };

        let ret = op();

        {
            let mut st = self.shared.lock();
            // The level may be gone if the closure mismanaged stops.
            if let Some(level) = st.levels.get_mut(idx) {
                let target = level.current() + amount;
                level.apply(target);
                level.end_step();
            }
        }
        self.print(false, false);
        ret
    }

    /// Sets the innermost level's position to an absolute `value`,
    /// overwriting its note, and renders (throttled). No-op when nothing is
    /// running.
    pub fn set(&self, value: f64, note: Option<&str>) {
        self.instrument_to(value, note, || ());
    }

    /// Runs `op` as a step to the absolute position `value`, returning its
    /// value unchanged. The in-flight magnitude is the delta from the current
    /// position. When nothing is running, `op` just runs.
    pub fn instrument_to<T>(&self, value: f64, note: Option<&str>, op: impl FnOnce() -> T) -> T {
        let idx = {
            let mut st = self.shared.lock();
            match st.levels.last_mut() {
                Some(level) => {
                    let delta = value - level.current();
                    level.begin_step(delta, note);
                    st.levels.len() - 1
                }
                None => {
                    drop(st);
                    return op();
                }
            }
        };

        let ret = op();

        {
            let mut st = self.shared.lock();
            if let Some(level) = st.levels.get_mut(idx) {
                level.apply(value);
                level.end_step();
            }
        }
        self.print(false, false);
        ret
    }

    /// Pops the innermost level.
    ///
    /// Popping the outermost level renders a final line (elapsed time
    /// instead of ETA, line terminated, terminal title cleared) and stops
    /// the beeper. A level that never reported any progress is forced to
    /// completion first, so a bare start/stop bracket shows 100% rather than
    /// the untouched placeholder. Extra `stop` calls are no-ops.
    pub fn stop(&self) {
        let beeper = {
            let mut st = self.shared.lock();
            match st.levels.len() {
                0 => return,
                1 => {
                    let level = &mut st.levels[0];
                    if level.current() == 0.0 {
                        let total = level.total();
                        level.apply(total);
                    }
                    drop(st);
                    self.print(true, true);

                    let mut st = self.shared.lock();
                    let beeper = st.beeper.take();
                    st.levels.pop();
                    st.eta = None;
                    st.owner = None;
                    beeper
                }
                _ => {
                    st.levels.pop();
                    None
                }
            }
        };
        if let Some(beeper) = beeper {
            beeper.stop();
        }
    }

    /// Whether any level is currently running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.shared.lock().levels.is_empty()
    }

    /// Current nesting depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.shared.lock().levels.len()
    }

    /// Position of the innermost level, if any level is running.
    #[must_use]
    pub fn position(&self) -> Option<f64> {
        self.shared.lock().levels.last().map(Level::current)
    }

    /// Overwrites the innermost level's note; no-op when nothing is running.
    pub fn set_note(&self, note: Option<&str>) {
        if let Some(level) = self.shared.lock().levels.last_mut() {
            level.set_note(note);
        }
    }

    /// Forces in-place overwrite on or off; `None` restores auto-detection
    /// from terminal capability.
    pub fn set_stay_on_line(&self, value: Option<bool>) {
        self.shared.lock().stay_on_line = value;
    }

    /// Forces bold percentage highlighting on or off; `None` restores
    /// auto-detection.
    pub fn set_highlight(&self, value: Option<bool>) {
        self.shared.lock().highlight = value;
    }

    /// Forces the terminal-title mirror on or off; `None` restores
    /// auto-detection.
    pub fn set_terminal_title(&self, value: Option<bool>) {
        self.shared.lock().terminal_title = value;
    }

    /// Renders the current stack to the sink.
    ///
    /// Non-forced renders are throttled and use `try_lock`: a beep never
    /// waits behind a busy caller-driven update. Every performed render
    /// re-arms the throttle and restarts the beeper's wait window.
    pub(crate) fn print(&self, force: bool, finish: bool) {
        let mut guard = if force {
            self.shared.lock()
        } else {
            match self.shared.try_lock() {
                Some(guard) => guard,
                None => return,
            }
        };
        let st = &mut *guard;

        let now = Instant::now();
        if !force && st.next_render.is_some_and(|at| now < at) {
            return;
        }
        st.next_render = Some(now + st.throttle);
        if let Some(beeper) = &st.beeper {
            beeper.restart();
        }
        if st.levels.is_empty() {
            // A beep can slip in right after the final stop.
            return;
        }

        let terminal_like = io::terminal_like(&*st.sink);
        let stay_on_line = st.stay_on_line.unwrap_or(terminal_like);
        let highlight = st.highlight.unwrap_or(terminal_like);
        let terminal_title = st.terminal_title.unwrap_or(terminal_like);

        let comp = render::compose(&st.levels, highlight);

        let timing = if finish {
            st.eta
                .as_ref()
                .map(|eta| format!(" (elapsed: {})", eta.elapsed()))
        } else {
            st.eta
                .as_mut()
                .and_then(|eta| eta.left(comp.fraction))
                .map(|left| format!(" (ETA: {left})"))
        };

        let mut line = comp.styled;
        let mut plain = comp.plain;
        if let Some(timing) = &timing {
            line.push_str(timing);
            plain.push_str(timing);
        }
        if let Some(note) = st.levels.last().and_then(|level| level.note()) {
            line.push_str(" - ");
            line.push_str(note);
            plain.push_str(" - ");
            plain.push_str(note);
        }

        let previous_len = st.previous_len;
        st.previous_len = plain.chars().count();

        let chunk = if stay_on_line {
            let erase = if terminal_like {
                render::CLEAR_LINE.to_owned()
            } else {
                // No ANSI clear on a dumb sink: blank out the tail of a
                // longer previous line instead.
                " ".repeat(previous_len.saturating_sub(st.previous_len))
            };
            let newline = if finish { "\n" } else { "" };
            format!("\r{line}{erase}{newline}")
        } else {
            format!("{line}\n")
        };

        // Output is best effort; a failing sink must never take the wrapped
        // computation down with it.
        let _ = st.sink.write_all(chunk.as_bytes());
        if terminal_title {
            let text = if finish { "" } else { plain.as_str() };
            let _ = st.sink.write_all(render::title_escape(text).as_bytes());
        }
        let _ = st.sink.flush();
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress")
            .field("depth", &self.depth())
            .finish()
    }
}

struct StopGuard<'a>(&'a Progress);

impl Drop for StopGuard<'_> {
    fn drop(&mut self) {
        self.0.stop();
    }
}

static GLOBAL: OnceLock<Progress> = OnceLock::new();

/// The process-wide convenience session for simple call sites.
///
/// Library code should prefer threading an explicit [`Progress`] handle.
pub fn global() -> &'static Progress {
    GLOBAL.get_or_init(Progress::new)
}
