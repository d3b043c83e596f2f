//! Owner of the live snapshot and everything derived from it.
//!
//! The controller is plain state with no I/O of its own. A refresh is split
//! into [`DashboardController::begin_refresh`], which hands out a ticket or
//! refuses when a fetch is already in flight, and
//! [`DashboardController::finish_refresh`], which applies the result only for
//! the ticket it handed out and only while the dashboard is still mounted.
//! The manual button, the keyboard shortcut and pull-to-refresh all go through
//! [`DashboardController::refresh`], so they share one in-flight guard.

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::config::DEFAULT_ANIMATION_MS;
use crate::core::error::LoadError;
use crate::core::timing::InstantStamp;
use crate::snapshot::loader::{LoadedSnapshot, SnapshotLoader, SnapshotSource};
use crate::snapshot::model::MarketLabel;

use super::allocation::{AllocationProfileEngine, Profile, TwoFundSplit};
use super::animator::{AnimatedField, FieldAnimators};

/// Proof that the holder started the refresh currently in flight.
#[derive(Debug, PartialEq, Eq)]
pub struct RefreshTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new snapshot replaced the old one.
    Applied,
    /// The load failed; the previous snapshot (if any) is still shown.
    Failed,
    /// Another refresh was already running; nothing was fetched.
    Coalesced,
    /// The result arrived after teardown or for a superseded ticket.
    Discarded,
}

/// What the top level of the dashboard should render.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Loading,
    Failed(String),
    /// The producer published a document without a prediction.
    NoData(Option<String>),
    Ready,
}

#[derive(Debug)]
pub struct DashboardController {
    snapshot: Option<Rc<LoadedSnapshot>>,
    last_error: Option<LoadError>,
    animators: FieldAnimators,
    profiles: Option<AllocationProfileEngine>,
    selected_profile: Profile,
    in_flight: Option<u64>,
    next_ticket: u64,
    torn_down: bool,
    prediction_key: u32,
    last_label: Option<MarketLabel>,
}

impl Default for DashboardController {
    fn default() -> Self {
        Self::new(DEFAULT_ANIMATION_MS)
    }
}

impl DashboardController {
    pub fn new(animation_ms: f64) -> Self {
        Self {
            snapshot: None,
            last_error: None,
            animators: FieldAnimators::new(animation_ms),
            profiles: None,
            selected_profile: Profile::default(),
            in_flight: None,
            next_ticket: 0,
            torn_down: false,
            prediction_key: 0,
            last_label: None,
        }
    }

    pub fn snapshot(&self) -> Option<Rc<LoadedSnapshot>> {
        self.snapshot.clone()
    }

    pub fn last_error(&self) -> Option<&LoadError> {
        self.last_error.as_ref()
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Bumped whenever the predicted label changes between two snapshots.
    pub fn prediction_key(&self) -> u32 {
        self.prediction_key
    }

    pub fn view_state(&self) -> ViewState {
        match (&self.snapshot, &self.last_error) {
            (Some(_), _) => ViewState::Ready,
            (None, Some(LoadError::Empty(message))) => ViewState::NoData(message.clone()),
            (None, Some(err)) => ViewState::Failed(err.localized()),
            (None, None) => ViewState::Loading,
        }
    }

    pub fn begin_refresh(&mut self) -> Option<RefreshTicket> {
        if self.torn_down || self.in_flight.is_some() {
            return None;
        }
        let id = self.next_ticket;
        self.next_ticket += 1;
        self.in_flight = Some(id);
        Some(RefreshTicket(id))
    }

    pub fn finish_refresh(
        &mut self,
        ticket: RefreshTicket,
        result: Result<LoadedSnapshot, LoadError>,
        now: InstantStamp,
    ) -> RefreshOutcome {
        if self.torn_down || self.in_flight != Some(ticket.0) {
            tracing::debug!(ticket = ticket.0, "dropping late refresh result");
            return RefreshOutcome::Discarded;
        }
        self.in_flight = None;

        match result {
            Ok(loaded) => {
                self.apply(loaded, now);
                RefreshOutcome::Applied
            }
            Err(err) => {
                tracing::warn!(kind = err.kind(), "refresh failed: {err}");
                self.last_error = Some(err);
                RefreshOutcome::Failed
            }
        }
    }

    fn apply(&mut self, loaded: LoadedSnapshot, now: InstantStamp) {
        let prediction = loaded.snapshot.prediction.as_ref();

        let label = prediction.map(|p| p.label);
        if self.last_label.is_some() && label.is_some() && self.last_label != label {
            self.prediction_key += 1;
        }
        self.last_label = label;

        self.profiles = prediction
            .and_then(|p| p.multi_fund.clone())
            .map(|data| AllocationProfileEngine::with_selection(data, self.selected_profile));

        let split =
            TwoFundSplit::from_recommendation(prediction.and_then(|p| p.recommended_allocation));
        let confidence = prediction.map(|p| p.confidence_pct()).unwrap_or(0.0);
        let win_rate = loaded
            .snapshot
            .backtest
            .as_ref()
            .map(|b| b.metrics.win_rate_pct)
            .unwrap_or(0.0);

        self.animators
            .retarget(AnimatedField::EquityAllocation, split.equity_pct, now);
        self.animators
            .retarget(AnimatedField::BondAllocation, split.bond_pct, now);
        self.animators
            .retarget(AnimatedField::Confidence, confidence, now);
        self.animators.retarget(AnimatedField::WinRate, win_rate, now);

        self.snapshot = Some(Rc::new(loaded));
        self.last_error = None;
    }

    /// Advance every animator by one frame; `true` while any still moves.
    pub fn tick(&mut self, now: InstantStamp) -> bool {
        if self.torn_down {
            return false;
        }
        self.animators.step_all(now)
    }

    pub fn is_animating(&self) -> bool {
        !self.torn_down && self.animators.any_running()
    }

    pub fn displayed(&self, field: AnimatedField) -> i64 {
        self.animators.rounded(field)
    }

    pub fn profiles(&self) -> Option<&AllocationProfileEngine> {
        self.profiles.as_ref()
    }

    pub fn selected_profile(&self) -> Profile {
        self.selected_profile
    }

    /// Kept across reloads.
    pub fn select_profile(&mut self, profile: Profile) {
        self.selected_profile = profile;
        if let Some(engine) = self.profiles.as_mut() {
            engine.select(profile);
        }
    }

    /// Legacy equity/bond split for snapshots without per-profile data.
    pub fn two_fund_split(&self) -> TwoFundSplit {
        TwoFundSplit::from_recommendation(
            self.snapshot
                .as_ref()
                .and_then(|loaded| loaded.snapshot.prediction.as_ref())
                .and_then(|p| p.recommended_allocation),
        )
    }

    /// Stop animating and ignore whatever fetch is still outstanding.
    pub fn teardown(&mut self) {
        self.torn_down = true;
        self.in_flight = None;
        self.animators.cancel_all();
    }

    /// One guarded refresh: begin, load, finish.
    pub async fn refresh<S, C>(
        cell: &RefCell<DashboardController>,
        loader: &SnapshotLoader<S>,
        clock: C,
    ) -> RefreshOutcome
    where
        S: SnapshotSource,
        C: Fn() -> InstantStamp,
    {
        let ticket = {
            let mut controller = cell.borrow_mut();
            if controller.is_torn_down() {
                return RefreshOutcome::Discarded;
            }
            match controller.begin_refresh() {
                Some(ticket) => ticket,
                None => return RefreshOutcome::Coalesced,
            }
        };

        let result = loader.load().await;
        cell.borrow_mut().finish_refresh(ticket, result, clock())
    }
}
