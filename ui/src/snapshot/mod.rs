//! Snapshot document model, loading and freshness classification.

pub mod loader;
pub mod model;
pub mod staleness;

pub use loader::{HttpSnapshotSource, LoadedSnapshot, SnapshotLoader, SnapshotSource};
pub use model::{
    AllocationVector, Backtest, HistoryPoint, MarketLabel, MultiFundData, Prediction, Snapshot,
    TrendInfo,
};
pub use staleness::Staleness;
