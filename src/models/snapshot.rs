use serde::{Deserialize, Serialize};

/// Audit record written alongside the dashboard on every successful run.
/// Field names are part of the contract with external tooling; renaming one
/// is a breaking change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub run_date: String,
    pub generator_version: String,
    pub subgraphs: SubgraphTotals,
    pub delegation: DelegationSummary,
    pub network_rewards: Vec<NetworkRewardsEntry>,
    pub quarterly_rewards: Vec<QuarterlyEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubgraphTotals {
    pub all_networks: u64,
    pub top_networks: u64,
    pub top_n: usize,
    pub percentage_of_total: f64,
}

/// Delegation aggregates per period, without raw event details.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegationSummary {
    pub event_count: usize,
    pub periods: Vec<PeriodSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    pub period: String,
    pub total_delegated: f64,
    pub total_undelegated: f64,
    pub net: f64,
    pub displayed_events: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRewardsEntry {
    pub network: String,
    pub total_rewards: f64,
    pub indexer_rewards: f64,
    pub delegator_rewards: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarterlyEntry {
    pub quarter: String,
    pub unavailable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_rewards: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indexer_rewards: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delegator_rewards: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indexer_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delegator_pct: Option<f64>,
}
