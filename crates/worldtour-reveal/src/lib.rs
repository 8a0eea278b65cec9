//! Reveal interval timer for BINGO World Tour sessions.
//!
//! While a session is ACTIVE, one destination is revealed every
//! `revealInterval` minutes. [`RevealTimer`] drives that cadence: it is
//! armed when the host starts the game, suspended on pause, and disarmed
//! permanently when the session ends or the reveal budget is exhausted.
//!
//! # Integration
//!
//! The timer is designed to sit inside a session actor's
//! `tokio::select!` loop. When disarmed or paused, [`RevealTimer::wait`]
//! pends forever, so the other branches keep the actor responsive:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle commands */ }
//!         _ = timer.wait() => { /* perform one automatic reveal */ }
//!     }
//! }
//! ```
//!
//! # Pause policy
//!
//! Resuming restarts the *full* interval countdown rather than preserving
//! the remaining time from before the pause. This is the deliberately
//! simpler policy: the next reveal lands a full interval after resume.

use std::time::Duration;

use tokio::time::{self, Instant as TokioInstant};
use tracing::debug;

/// Shortest interval the timer will accept. A zero interval would make
/// `wait` resolve immediately in a loop; anything shorter is clamped here.
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Drives the automatic reveal cadence for a single session.
///
/// One `RevealTimer` per session actor. The timer knows nothing about
/// reveal budgets or catalog exhaustion — the actor checks those when a
/// tick fires and calls [`stop`](Self::stop) when the schedule is done.
pub struct RevealTimer {
    interval: Duration,
    /// When the next automatic reveal is due. `None` = disarmed.
    deadline: Option<TokioInstant>,
    paused: bool,
    ticks_fired: u64,
}

impl RevealTimer {
    /// Creates a disarmed timer with the given interval.
    ///
    /// Intervals below [`MIN_INTERVAL`] are clamped with a warning; the
    /// host-facing configuration layer validates ranges properly, this is
    /// the last line of defense.
    pub fn new(interval: Duration) -> Self {
        let interval = if interval < MIN_INTERVAL {
            tracing::warn!(
                requested_ms = interval.as_millis() as u64,
                "reveal interval below minimum — clamping"
            );
            MIN_INTERVAL
        } else {
            interval
        };

        Self {
            interval,
            deadline: None,
            paused: false,
            ticks_fired: 0,
        }
    }

    /// The configured interval between automatic reveals.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Arms the timer: the first reveal fires one full interval from now.
    /// Clears any pause.
    pub fn start(&mut self) {
        self.deadline = Some(TokioInstant::now() + self.interval);
        self.paused = false;
        debug!(interval_s = self.interval.as_secs(), "reveal timer armed");
    }

    /// Suspends the timer; [`wait`](Self::wait) pends until resumed.
    /// Idempotent.
    pub fn pause(&mut self) {
        if !self.paused && self.deadline.is_some() {
            self.paused = true;
            debug!("reveal timer paused");
        }
    }

    /// Resumes after a pause, restarting the full interval countdown.
    /// Idempotent; a no-op on a disarmed timer.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.deadline = Some(TokioInstant::now() + self.interval);
            debug!("reveal timer resumed, full interval restarted");
        }
    }

    /// Disarms the timer permanently (session ended or schedule
    /// exhausted). A later [`start`](Self::start) re-arms it.
    pub fn stop(&mut self) {
        if self.deadline.take().is_some() {
            debug!(ticks = self.ticks_fired, "reveal timer stopped");
        }
        self.paused = false;
    }

    /// Whether the timer currently has a deadline (paused or not).
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Whether the timer is suspended.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// How many automatic ticks have fired since creation.
    pub fn ticks_fired(&self) -> u64 {
        self.ticks_fired
    }

    /// Waits until the next automatic reveal is due, then re-arms for the
    /// following one. Returns the tick ordinal (1-based).
    ///
    /// When the timer is disarmed or paused this future pends forever —
    /// it never resolves on its own, but a surrounding `tokio::select!`
    /// still processes its other branches.
    pub async fn wait(&mut self) -> u64 {
        let deadline = match self.deadline {
            Some(d) if !self.paused => d,
            _ => {
                // Disarmed or paused: never completes.
                std::future::pending::<()>().await;
                unreachable!()
            }
        };

        time::sleep_until(deadline).await;

        // Schedule from now, not from the deadline: if a tick was delayed
        // (slow storage, busy actor), the next one still waits a full
        // interval instead of bunching up.
        self.deadline = Some(TokioInstant::now() + self.interval);
        self.ticks_fired += 1;
        debug!(tick = self.ticks_fired, "reveal tick fired");
        self.ticks_fired
    }
}
