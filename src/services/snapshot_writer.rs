use crate::error::MetricsError;
use crate::models::{
    AggregateStats, DelegationSummary, MetricsSnapshot, NetworkRewardsEntry, NetworkStat,
    PeriodSelector, PeriodSummary, QuarterlyEntry, QuarterlyRewards, RewardsSnapshot,
    SubgraphTotals,
};
use chrono::{DateTime, Utc};
use log::info;
use std::fs;

/// Assemble the audit record for one run. Raw event details stay out of the
/// snapshot; only aggregates persist.
pub fn build_snapshot(
    now: DateTime<Utc>,
    all_networks: &[NetworkStat],
    top: &[NetworkStat],
    percentage_of_total: f64,
    event_count: usize,
    aggregates: &[(PeriodSelector, AggregateStats)],
    network_rewards: &[(String, RewardsSnapshot)],
    quarterly: &[QuarterlyRewards],
) -> MetricsSnapshot {
    MetricsSnapshot {
        run_date: now.format("%Y-%m-%d").to_string(),
        generator_version: env!("CARGO_PKG_VERSION").to_string(),
        subgraphs: SubgraphTotals {
            all_networks: all_networks.iter().map(|s| s.subgraph_count).sum(),
            top_networks: top.iter().map(|s| s.subgraph_count).sum(),
            top_n: top.len(),
            percentage_of_total,
        },
        delegation: DelegationSummary {
            event_count,
            periods: aggregates
                .iter()
                .map(|(period, stats)| PeriodSummary {
                    period: period.label().to_string(),
                    total_delegated: stats.total_delegated,
                    total_undelegated: stats.total_undelegated,
                    net: stats.net,
                    displayed_events: stats.filtered_events.len(),
                })
                .collect(),
        },
        network_rewards: network_rewards
            .iter()
            .map(|(network, rewards)| NetworkRewardsEntry {
                network: network.clone(),
                total_rewards: rewards.total_rewards,
                indexer_rewards: rewards.indexer_rewards,
                delegator_rewards: rewards.delegator_rewards,
            })
            .collect(),
        quarterly_rewards: quarterly
            .iter()
            .map(|quarter| QuarterlyEntry {
                quarter: quarter.label.clone(),
                unavailable: quarter.rewards.is_none(),
                total_rewards: quarter.rewards.map(|r| r.total_rewards),
                indexer_rewards: quarter.rewards.map(|r| r.indexer_rewards),
                delegator_rewards: quarter.rewards.map(|r| r.delegator_rewards),
                indexer_pct: quarter.indexer_pct,
                delegator_pct: quarter.delegator_pct,
            })
            .collect(),
    }
}

pub fn write_snapshot(snapshot: &MetricsSnapshot, path: &str) -> Result<(), MetricsError> {
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, json).map_err(|e| MetricsError::Io {
        path: path.to_string(),
        source: e,
    })?;
    info!("Snapshot saved to {}", path);
    Ok(())
}
