mod delegation;
mod network;
mod rewards;
mod snapshot;

pub use delegation::{AggregateStats, DelegationEvent, EventKind, PeriodSelector};
pub use network::NetworkStat;
pub use rewards::{DailyRewardPoint, QuarterlyRewards, RewardsSnapshot};
pub use snapshot::{
    DelegationSummary, MetricsSnapshot, NetworkRewardsEntry, PeriodSummary, QuarterlyEntry,
    SubgraphTotals,
};
