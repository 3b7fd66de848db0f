//! Timed advancement through the year catalog.
//!
//! The controller is a two-state machine (`Idle`, `Running`) over a
//! [`TickScheduler`]. At most one tick is pending at any time and the
//! controller remembers its [`TimerId`]. An expiration carrying any other id
//! is stale and has no effect, which is what makes `stop` final even when
//! the host already queued the expiration.

use std::time::Duration;

use catalog::YearCatalog;
use runtime::{TickScheduler, TimerId};
use scene::EmptySelection;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Delay between two rendered years.
    pub tick_delay_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_delay_ms: 6000,
        }
    }
}

impl PlaybackConfig {
    pub fn tick_delay(&self) -> Duration {
        Duration::from_millis(self.tick_delay_ms)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackPhase {
    Idle,
    Running,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The play/stop control was used while running.
    User,
    /// The last year of the catalog was shown.
    Exhausted,
    /// A tick found nothing selected.
    EmptySelection,
}

/// What a call into the controller did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome<F> {
    /// `year` was rendered and the next tick is scheduled.
    Advanced { year: String, frame: F },
    /// `year` was the last one; playback is idle again.
    Finished { year: String, frame: F },
    /// Playback went idle without rendering.
    Halted(StopReason),
    /// Nothing happened (stale timer, or stop while idle).
    Ignored,
}

impl<F> TickOutcome<F> {
    pub fn frame(&self) -> Option<&F> {
        match self {
            TickOutcome::Advanced { frame, .. } | TickOutcome::Finished { frame, .. } => {
                Some(frame)
            }
            TickOutcome::Halted(_) | TickOutcome::Ignored => None,
        }
    }

    pub fn year(&self) -> Option<&str> {
        match self {
            TickOutcome::Advanced { year, .. } | TickOutcome::Finished { year, .. } => {
                Some(year)
            }
            TickOutcome::Halted(_) | TickOutcome::Ignored => None,
        }
    }

    /// The reason playback went idle during this call, if it did.
    pub fn stop_reason(&self) -> Option<StopReason> {
        match self {
            TickOutcome::Finished { .. } => Some(StopReason::Exhausted),
            TickOutcome::Halted(reason) => Some(*reason),
            TickOutcome::Advanced { .. } | TickOutcome::Ignored => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlaybackController {
    phase: PlaybackPhase,
    /// Catalog index of the year the next tick renders.
    next_index: usize,
    /// Catalog index of the most recently rendered year.
    shown_index: Option<usize>,
    pending: Option<TimerId>,
    last_stop: Option<StopReason>,
    config: PlaybackConfig,
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new(PlaybackConfig::default())
    }
}

impl PlaybackController {
    pub fn new(config: PlaybackConfig) -> Self {
        Self {
            phase: PlaybackPhase::Idle,
            next_index: 0,
            shown_index: None,
            pending: None,
            last_stop: None,
            config,
        }
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == PlaybackPhase::Running
    }

    /// Timer of the scheduled tick, if one is outstanding.
    pub fn pending(&self) -> Option<TimerId> {
        self.pending
    }

    pub fn last_stop(&self) -> Option<StopReason> {
        self.last_stop
    }

    pub fn next_index(&self) -> usize {
        self.next_index
    }

    /// Year most recently rendered by playback.
    pub fn shown_year<'y>(&self, years: &'y YearCatalog) -> Option<&'y str> {
        self.shown_index.and_then(|i| years.get(i))
    }

    /// Play/stop control; same as [`start`](Self::start).
    pub fn toggle<S, F, R>(
        &mut self,
        years: &YearCatalog,
        selected_year: &str,
        scheduler: &mut S,
        render: R,
    ) -> TickOutcome<F>
    where
        S: TickScheduler,
        R: FnOnce(&str) -> Result<F, EmptySelection>,
    {
        self.start(years, selected_year, scheduler, render)
    }

    /// Enters `Running` at `selected_year` and renders it right away.
    ///
    /// A year missing from the catalog starts at the first one. Called while
    /// running, it stops playback instead, so two starts in a row leave the
    /// controller idle with nothing scheduled.
    pub fn start<S, F, R>(
        &mut self,
        years: &YearCatalog,
        selected_year: &str,
        scheduler: &mut S,
        render: R,
    ) -> TickOutcome<F>
    where
        S: TickScheduler,
        R: FnOnce(&str) -> Result<F, EmptySelection>,
    {
        if self.is_running() {
            self.stop(scheduler, StopReason::User);
            return TickOutcome::Halted(StopReason::User);
        }
        self.phase = PlaybackPhase::Running;
        self.next_index = years.position(selected_year).unwrap_or(0);
        self.shown_index = None;
        self.last_stop = None;
        debug!(year = selected_year, index = self.next_index, "playback started");
        self.tick(years, scheduler, render)
    }

    /// Enters `Idle` and cancels the pending tick.
    ///
    /// Returns `false` if playback was already idle. After this returns no
    /// expiration of an earlier timer is accepted by [`on_timer`](Self::on_timer).
    pub fn stop<S: TickScheduler>(&mut self, scheduler: &mut S, reason: StopReason) -> bool {
        if !self.is_running() {
            return false;
        }
        self.phase = PlaybackPhase::Idle;
        self.cancel_pending(scheduler);
        self.last_stop = Some(reason);
        debug!(?reason, "playback stopped");
        true
    }

    /// Delivers a timer expiration.
    pub fn on_timer<S, F, R>(
        &mut self,
        id: TimerId,
        years: &YearCatalog,
        scheduler: &mut S,
        render: R,
    ) -> TickOutcome<F>
    where
        S: TickScheduler,
        R: FnOnce(&str) -> Result<F, EmptySelection>,
    {
        if !self.is_running() || self.pending != Some(id) {
            debug!(timer = id.0, pending = ?self.pending.map(|p| p.0), "ignoring stale tick");
            return TickOutcome::Ignored;
        }
        self.pending = None;
        self.tick(years, scheduler, render)
    }

    fn tick<S, F, R>(&mut self, years: &YearCatalog, scheduler: &mut S, render: R) -> TickOutcome<F>
    where
        S: TickScheduler,
        R: FnOnce(&str) -> Result<F, EmptySelection>,
    {
        let Some(year) = years.get(self.next_index) else {
            self.stop(scheduler, StopReason::Exhausted);
            return TickOutcome::Halted(StopReason::Exhausted);
        };
        let year = year.to_string();

        let frame = match render(&year) {
            Ok(frame) => frame,
            Err(empty) => {
                debug!(%year, %empty, "playback tick found an empty selection");
                self.stop(scheduler, StopReason::EmptySelection);
                return TickOutcome::Halted(StopReason::EmptySelection);
            }
        };

        self.shown_index = Some(self.next_index);
        self.next_index += 1;
        if self.next_index >= years.len() {
            self.stop(scheduler, StopReason::Exhausted);
            return TickOutcome::Finished { year, frame };
        }

        self.pending = Some(scheduler.schedule(self.config.tick_delay()));
        TickOutcome::Advanced { year, frame }
    }

    fn cancel_pending<S: TickScheduler>(&mut self, scheduler: &mut S) {
        if let Some(id) = self.pending.take() {
            scheduler.cancel(id);
        }
    }
}
