//! Batch progress reporting through an explicit run context.
//!
//! A batch run receives a [`RunContext`] holding a [`Clock`] and a
//! [`ProgressReporter`]. The runner captures its own start instant from
//! the clock and hands the reporter a [`Progress`] snapshot at 0% and
//! after every written image. There is no process-wide timer.

use std::time::{Duration, Instant};

/// Time source for progress and elapsed-time measurements.
///
/// Abstracted so tests can drive time deterministically.
pub trait Clock {
    /// Opaque point in time.
    type Instant;

    /// The current instant.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// Snapshot of batch progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Images written so far.
    pub completed: usize,
    /// Images in the batch.
    pub total: usize,
    /// Wall-clock time since the batch started.
    pub elapsed: Duration,
}

impl Progress {
    /// Completed fraction in `0.0..=1.0`. An empty batch is complete.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    /// Estimated time remaining, extrapolated from the average time per
    /// completed image. `None` until the first image is done.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn eta(&self) -> Option<Duration> {
        if self.completed == 0 {
            return None;
        }
        let remaining = self.total.saturating_sub(self.completed);
        let per_image = self.elapsed.as_secs_f64() / self.completed as f64;
        Duration::try_from_secs_f64(per_image * remaining as f64).ok()
    }
}

/// Receiver of progress snapshots.
pub trait ProgressReporter {
    /// Called at 0% and after each written image.
    fn report(&mut self, progress: &Progress);
}

impl<F: FnMut(&Progress)> ProgressReporter for F {
    fn report(&mut self, progress: &Progress) {
        self(progress);
    }
}

/// Reporter that emits each snapshot as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl ProgressReporter for LogReporter {
    fn report(&mut self, progress: &Progress) {
        tracing::info!(
            completed = progress.completed,
            total = progress.total,
            percent = format_args!("{:.1}", progress.fraction() * 100.0),
            elapsed = ?progress.elapsed,
            eta = ?progress.eta(),
            "progress"
        );
    }
}

/// Everything a batch run needs besides its inputs: where time comes
/// from and where progress goes.
#[derive(Debug, Clone, Default)]
pub struct RunContext<C, R> {
    /// Time source.
    pub clock: C,
    /// Progress sink.
    pub reporter: R,
}

impl<C: Clock, R: ProgressReporter> RunContext<C, R> {
    /// Bundle a clock and a reporter.
    pub const fn new(clock: C, reporter: R) -> Self {
        Self { clock, reporter }
    }
}
