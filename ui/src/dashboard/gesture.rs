//! Pull-to-refresh.
//!
//! The controller is a small state machine fed by [`TouchSignal`]s. It has no
//! idea where the signals come from: the dashboard view forwards Dioxus touch
//! events into a coroutine channel and hands the receiving end to
//! [`GestureRefreshController::drive`], while tests push signals directly
//! through [`GestureRefreshController::handle`].
//!
//! ```text
//! Idle --start @ scroll 0--> Tracking --end, pull > 80--> Refreshing
//!   ^                            |                            |
//!   +-------end, pull <= 80------+<--------refresh settles----+
//! ```

use std::future::Future;

use futures::future::{Fuse, FusedFuture, FutureExt};
use futures::stream::{Stream, StreamExt};
use futures::{pin_mut, select_biased};

/// Pull distance that has to be exceeded before a release refreshes.
pub const PULL_THRESHOLD: f64 = 80.0;
/// Pull distance is clamped to this.
pub const MAX_PULL: f64 = 150.0;

const INDICATOR_LEAD: f64 = 40.0;
const INDICATOR_MAX_OFFSET: f64 = 20.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GesturePhase {
    #[default]
    Idle,
    Tracking,
    Refreshing,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GestureState {
    pub phase: GesturePhase,
    pub start_y: f64,
    pub pull_distance: f64,
}

impl GestureState {
    /// `None` while nothing has been pulled.
    pub fn indicator(&self) -> Option<PullIndicator> {
        match self.phase {
            GesturePhase::Idle => None,
            _ if self.pull_distance <= 0.0 => None,
            _ => Some(PullIndicator::for_distance(self.pull_distance)),
        }
    }
}

/// Raw input, already reduced to what the state machine needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TouchSignal {
    Start { y: f64, scroll_offset: f64 },
    Move { y: f64 },
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureAction {
    None,
    /// The caller must run the refresh and call [`GestureRefreshController::settle`].
    Refresh,
}

/// Spinner shown above the content while pulling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PullIndicator {
    pub opacity: f64,
    pub offset_px: f64,
    /// Releasing now would refresh.
    pub armed: bool,
}

impl PullIndicator {
    pub fn for_distance(distance: f64) -> Self {
        Self {
            opacity: (distance / PULL_THRESHOLD).min(1.0),
            offset_px: (distance - INDICATOR_LEAD).min(INDICATOR_MAX_OFFSET),
            armed: distance > PULL_THRESHOLD,
        }
    }

    pub fn style(&self) -> String {
        format!(
            "transform: translateY({:.1}px); opacity: {:.2};",
            self.offset_px, self.opacity
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GestureRefreshController {
    state: GestureState,
}

impl GestureRefreshController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn phase(&self) -> GesturePhase {
        self.state.phase
    }

    pub fn handle(&mut self, signal: TouchSignal) -> GestureAction {
        match (self.state.phase, signal) {
            (GesturePhase::Refreshing, _) => GestureAction::None,
            (_, TouchSignal::Start { y, scroll_offset }) => {
                if scroll_offset == 0.0 {
                    self.state = GestureState {
                        phase: GesturePhase::Tracking,
                        start_y: y,
                        pull_distance: 0.0,
                    };
                }
                GestureAction::None
            }
            (GesturePhase::Tracking, TouchSignal::Move { y }) => {
                self.state.pull_distance = (y - self.state.start_y).clamp(0.0, MAX_PULL);
                GestureAction::None
            }
            (GesturePhase::Tracking, TouchSignal::End) => {
                if self.state.pull_distance > PULL_THRESHOLD {
                    self.state.phase = GesturePhase::Refreshing;
                    tracing::debug!(pull = self.state.pull_distance, "pull released, refreshing");
                    GestureAction::Refresh
                } else {
                    self.state = GestureState::default();
                    GestureAction::None
                }
            }
            (GesturePhase::Idle, TouchSignal::Move { .. } | TouchSignal::End) => {
                GestureAction::None
            }
        }
    }

    /// The refresh finished, whatever its outcome.
    pub fn settle(&mut self) {
        self.state = GestureState::default();
    }

    pub fn indicator(&self) -> Option<PullIndicator> {
        self.state.indicator()
    }

    /// Consume `signals` until the stream ends, running `refresh` whenever a
    /// release crosses the threshold. Signals keep being read while a refresh
    /// is in flight (and ignored by the state machine). `observe` sees the
    /// state after every change.
    pub async fn drive<S, R, Fut, O>(&mut self, signals: S, mut refresh: R, mut observe: O)
    where
        S: Stream<Item = TouchSignal>,
        R: FnMut() -> Fut,
        Fut: Future<Output = ()>,
        O: FnMut(&GestureState),
    {
        let signals = signals.fuse();
        let in_flight = Fuse::<Fut>::terminated();
        pin_mut!(signals, in_flight);

        loop {
            select_biased! {
                () = in_flight => {
                    self.settle();
                    observe(&self.state);
                }
                signal = signals.next() => match signal {
                    Some(signal) => {
                        if self.handle(signal) == GestureAction::Refresh {
                            in_flight.set(refresh().fuse());
                        }
                        observe(&self.state);
                    }
                    None => break,
                },
            }
        }

        if !in_flight.is_terminated() {
            in_flight.await;
            self.settle();
            observe(&self.state);
        }
    }
}
