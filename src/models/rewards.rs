use serde::{Deserialize, Serialize};

/// Reward totals in token units. indexer_rewards + delegator_rewards equals
/// total_rewards within wei-to-token conversion rounding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardsSnapshot {
    pub total_rewards: f64,
    pub indexer_rewards: f64,
    pub delegator_rewards: f64,
}

/// One day of the upstream reward series. Values are running cumulative
/// totals (wei-scale strings), not per-day deltas.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRewardPoint {
    pub day_start: i64,
    pub total_rewards: String,
    pub indexer_rewards: String,
    pub delegator_rewards: String,
}

/// Rewards distributed during one calendar quarter. `rewards` is None when
/// the cumulative series has no data at or before the quarter start, in
/// which case the quarter is reported as unavailable rather than zero.
#[derive(Debug, Clone, PartialEq)]
pub struct QuarterlyRewards {
    pub label: String,
    pub rewards: Option<RewardsSnapshot>,
    pub indexer_pct: Option<f64>,
    pub delegator_pct: Option<f64>,
}
