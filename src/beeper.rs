//! Periodic re-render timer.
//!
//! A [`Beeper`] fires a callback on a fixed period so a stalled task still
//! shows a live line and a fresh elapsed/ETA figure between caller-driven
//! updates. The background thread waits on a control channel with a timeout:
//! a timeout is a beep, a [`restart`](Beeper::restart) message begins a fresh
//! full-length wait, and a [`stop`](Beeper::stop) message (or a dropped
//! sender) ends the loop for good.

use std::{
    sync::mpsc::{self, RecvTimeoutError, Sender},
    thread,
    time::Duration,
};

enum Signal {
    Restart,
    Stop,
}

/// A cancellable, restartable periodic callback timer.
///
/// `restart` and `stop` may be called from any thread, concurrently with the
/// timer's own wake-and-invoke cycle; the callback itself is responsible for
/// its own synchronization (the session routes it through the locked print
/// path).
pub(crate) struct Beeper {
    tx: Sender<Signal>,
}

impl Beeper {
    /// Spawns the timer thread; `callback` runs once per elapsed `period`.
    pub(crate) fn new<F>(period: Duration, callback: F) -> Self
    where
        F: Fn() + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || loop {
            match rx.recv_timeout(period) {
                Err(RecvTimeoutError::Timeout) => callback(),
                Ok(Signal::Restart) => {}
                Ok(Signal::Stop) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });

        Self { tx }
    }

    /// Abandons the current wait and begins a fresh full-length one.
    ///
    /// Called after every caller-driven render so the next automatic beep is
    /// a whole period away rather than right on its heels.
    pub(crate) fn restart(&self) {
        let _ = self.tx.send(Signal::Restart);
    }

    /// Terminates the timer; no callback invocation happens afterwards.
    pub(crate) fn stop(self) {
        let _ = self.tx.send(Signal::Stop);
    }
}

impl Drop for Beeper {
    fn drop(&mut self) {
        let _ = self.tx.send(Signal::Stop);
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
        thread,
        time::Duration,
    };

    use super::Beeper;

    fn counting_beeper(period: Duration) -> (Beeper, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let beeps = count.clone();
        let beeper = Beeper::new(period, move || {
            beeps.fetch_add(1, Ordering::SeqCst);
        });
        (beeper, count)
    }

    /// Periodic Firing
    /// The callback keeps firing on its own without any caller activity.
    #[test]
    fn test_beeps_periodically() {
        let (beeper, count) = counting_beeper(Duration::from_millis(10));
        thread::sleep(Duration::from_millis(100));
        assert!(count.load(Ordering::SeqCst) >= 2);
        beeper.stop();
    }

    /// Restart Defers
    /// Restarting just before each deadline keeps the beep from ever firing.
    #[test]
    fn test_restart_resets_wait() {
        let (beeper, count) = counting_beeper(Duration::from_millis(50));
        for _ in 0..10 {
            thread::sleep(Duration::from_millis(10));
            beeper.restart();
        }
        assert_eq!(count.load(Ordering::SeqCst), 0);
        beeper.stop();
    }

    /// Stop Is Final
    /// No callback runs after stop, even well past the period.
    #[test]
    fn test_stop_is_irrevocable() {
        let (beeper, count) = counting_beeper(Duration::from_millis(10));
        thread::sleep(Duration::from_millis(35));
        beeper.stop();
        // Give the loop time to observe the signal, then freeze the count.
        thread::sleep(Duration::from_millis(20));
        let frozen = count.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(count.load(Ordering::SeqCst), frozen);
    }
}
