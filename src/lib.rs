//! # `nested_progress`
//!
//! A live, nested terminal progress indicator for long-running iterative
//! work.
//!
//! A session holds a stack of progress levels (outer task, inner sub-task,
//! …), each with a target total and a current position. The stack is rendered
//! as one composed percentage line like `Test:  53.3% >  33.3%`, with smoothed
//! ETA estimation, ANSI in-place redraw, optional bold highlighting, and an
//! optional terminal-title mirror. A background timer keeps the line and the
//! estimate alive even when no explicit update arrives.
//!
//! * **Nested**: a step can wrap a whole sub-session; the sub-session's
//!   partial completion folds proportionally into the enclosing percentage.
//! * **Concurrent**: session handles are cheap to clone ([`std::sync::Arc`]-based)
//!   and safe to share across threads; a single lock serializes state and
//!   output. Only the thread that started a session may nest further levels:
//!   other threads' attempts are refused with a warning and run untracked.
//! * **Unintrusive**: wrapped work always runs and its value always passes
//!   through, session or no session; the core never fails the caller.
//!
//! ## Example
//!
//! ```no_run
//! use nested_progress::Progress;
//!
//! let progress = Progress::new();
//! progress.run(Some(1000.0), Some("Crunch"), || {
//!     for chunk in 0..1000 {
//!         progress.instrument(1.0, None, || {
//!             // do something with `chunk`
//!             let _ = chunk;
//!         });
//!     }
//! });
//! ```
//!
//! ## Modules
//!
//! * [`builder`]: Fluent configuration of a [`Progress`] session.
//! * [`eta`]: Smoothed remaining-time estimation.
//! * [`io`]: The output [`Sink`] boundary and terminal detection.
//! * [`iter`]: Extension trait for tracking progress on iterators.
//! * [`level`]: One entry of the nested-progress stack.
//! * [`session`]: The session handle and its concurrent print path.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod beeper;
pub mod builder;
pub mod eta;
pub mod io;
pub mod iter;
pub mod level;
mod render;
pub mod session;

pub use builder::ProgressBuilder;
pub use eta::Eta;
pub use io::{Sink, StderrSink, PROGRESS_TTY_ENV};
pub use iter::{ProgressIteratorExt, WithProgress};
pub use level::Level;
pub use session::{global, Progress};
