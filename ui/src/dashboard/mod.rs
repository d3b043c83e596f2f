//! Presentation engine: everything the dashboard derives from a snapshot.

pub mod allocation;
pub mod animator;
pub mod controller;
pub mod gesture;
pub mod series;

pub use allocation::{AllocationProfileEngine, Fund, Profile, TwoFundSplit};
pub use animator::{AnimatedField, FieldAnimators, ValueAnimator};
pub use controller::{DashboardController, RefreshOutcome, RefreshTicket, ViewState};
pub use gesture::{GestureRefreshController, GestureState, PullIndicator, TouchSignal};
pub use series::{normalize_series, BacktestChart, ChartSeries, Polyline};
