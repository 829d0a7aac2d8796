use crate::error::MetricsError;
use crate::models::{DailyRewardPoint, RewardsSnapshot};
use crate::services::graph_client::GraphClient;
use crate::units::{token_units_from_str, TOKEN_DECIMALS};
use futures::future::join_all;
use log::{info, warn};
use serde_json::Value;

/// A per-chain deployment of the network subgraph that exposes the
/// `graphNetwork` reward totals.
pub struct RewardsSource {
    pub name: &'static str,
    pub subgraph_id: &'static str,
    /// Degradation value when the deployment is unreachable; sections
    /// without one are mandatory and abort the run.
    pub fallback: Option<RewardsSnapshot>,
}

/// Mainnet reward totals as observed from the gateway on 2025-11-30. The
/// mainnet protocol contracts have been inactive since the L2 migration, so
/// these totals no longer move; when the legacy deployment is unreachable
/// the section degrades to this snapshot instead of aborting the run.
pub const LEGACY_MAINNET_REWARDS: RewardsSnapshot = RewardsSnapshot {
    total_rewards: 298_431_077.0,
    indexer_rewards: 214_228_312.0,
    delegator_rewards: 84_202_765.0,
};

pub const REWARDS_SOURCES: [RewardsSource; 2] = [
    RewardsSource {
        name: "arbitrum-one",
        subgraph_id: "DZz4kDTdmzWLWsV373w2bSmoar3umKKH9y82SUKr5qmp",
        fallback: None,
    },
    RewardsSource {
        name: "mainnet",
        subgraph_id: "9Co7EQe5PgW3ugCUJrJgRv4u9zdEuDJf8NvMWftNsBH8",
        fallback: Some(LEGACY_MAINNET_REWARDS),
    },
];

const SECTION: &str = "network rewards";
const DAILY_SECTION: &str = "daily reward series";

/// Lifetime reward totals per network. Sources are independent, so they are
/// queried concurrently and merged in declaration order afterwards.
pub async fn fetch_network_rewards(
    client: &GraphClient,
) -> Result<Vec<(String, RewardsSnapshot)>, MetricsError> {
    info!("Fetching per-network reward totals...");
    let results = join_all(
        REWARDS_SOURCES
            .iter()
            .map(|source| fetch_source_totals(client, source)),
    )
    .await;

    let mut rewards = Vec::with_capacity(REWARDS_SOURCES.len());
    for (source, result) in REWARDS_SOURCES.iter().zip(results) {
        match result {
            Ok(snapshot) => rewards.push((source.name.to_string(), snapshot)),
            Err(e) => match &source.fallback {
                Some(fallback) => {
                    warn!(
                        "Rewards for {} unreachable ({}), using last observed totals",
                        source.name, e
                    );
                    rewards.push((source.name.to_string(), *fallback));
                }
                None => return Err(e),
            },
        }
    }
    Ok(rewards)
}

async fn fetch_source_totals(
    client: &GraphClient,
    source: &RewardsSource,
) -> Result<RewardsSnapshot, MetricsError> {
    let query = r#"{
        graphNetwork(id: "1") {
            totalIndexingRewards
            totalIndexingIndexerRewards
            totalIndexingDelegatorRewards
        }
    }"#;
    let data = client.query(SECTION, source.subgraph_id, query).await?;
    parse_network_totals(&data["graphNetwork"])
        .ok_or_else(|| MetricsError::fetch(SECTION, format!("malformed totals for {}", source.name)))
}

/// Convert the graphNetwork totals object into token-unit rewards. Each
/// field is converted independently; the indexer + delegator == total
/// invariant holds upstream and survives within f64 rounding.
fn parse_network_totals(network: &Value) -> Option<RewardsSnapshot> {
    let field = |name: &str| -> Option<f64> {
        let raw = network[name].as_str()?;
        match token_units_from_str(raw, TOKEN_DECIMALS) {
            Ok(units) => Some(units),
            Err(e) => {
                warn!("Bad reward total `{}`: {}", name, e);
                None
            }
        }
    };
    Some(RewardsSnapshot {
        total_rewards: field("totalIndexingRewards")?,
        indexer_rewards: field("totalIndexingIndexerRewards")?,
        delegator_rewards: field("totalIndexingDelegatorRewards")?,
    })
}

/// The day-by-day cumulative reward series for the active network, oldest
/// first, used for the quarterly breakdown.
pub async fn fetch_daily_rewards(
    client: &GraphClient,
    page_size: usize,
    max_pages: usize,
) -> Result<Vec<DailyRewardPoint>, MetricsError> {
    info!("Fetching daily reward series...");
    let mut series = Vec::new();
    let mut skip = 0;

    for _ in 0..max_pages {
        let query = format!(
            r#"{{
            graphNetworkDailyDatas(first: {page_size}, skip: {skip}, orderBy: dayStart, orderDirection: asc) {{
                dayStart
                totalIndexingRewards
                totalIndexingIndexerRewards
                totalIndexingDelegatorRewards
            }}
        }}"#
        );

        let data = client
            .query(DAILY_SECTION, REWARDS_SOURCES[0].subgraph_id, &query)
            .await?;
        let batch = match data.get("graphNetworkDailyDatas").and_then(|v| v.as_array()) {
            Some(batch) if !batch.is_empty() => batch.clone(),
            _ => break,
        };

        let fetched = batch.len();
        series.extend(batch.iter().filter_map(parse_daily_point));
        skip += page_size;
        info!("Fetched {} daily points (cursor at {})", fetched, skip);

        if fetched < page_size {
            break;
        }
    }

    if series.is_empty() {
        return Err(MetricsError::fetch(
            DAILY_SECTION,
            "no daily reward data returned",
        ));
    }
    Ok(series)
}

fn parse_daily_point(record: &Value) -> Option<DailyRewardPoint> {
    let day_start = record["dayStart"]
        .as_i64()
        .or_else(|| record["dayStart"].as_str().and_then(|s| s.parse().ok()))?;
    let field = |name: &str| -> Option<String> {
        let raw = record[name].as_str()?;
        Some(raw.to_string())
    };
    let point = DailyRewardPoint {
        day_start,
        total_rewards: field("totalIndexingRewards")?,
        indexer_rewards: field("totalIndexingIndexerRewards")?,
        delegator_rewards: field("totalIndexingDelegatorRewards")?,
    };
    Some(point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_graph_network_totals_in_token_units() {
        let network = json!({
            "totalIndexingRewards": "3000000000000000000000",
            "totalIndexingIndexerRewards": "2000000000000000000000",
            "totalIndexingDelegatorRewards": "1000000000000000000000"
        });
        let totals = parse_network_totals(&network).unwrap();
        assert_eq!(totals.total_rewards, 3_000.0);
        assert_eq!(totals.indexer_rewards, 2_000.0);
        assert_eq!(totals.delegator_rewards, 1_000.0);
        assert!(
            (totals.indexer_rewards + totals.delegator_rewards - totals.total_rewards).abs()
                < 1e-6
        );
    }

    #[test]
    fn rejects_totals_with_missing_fields() {
        let network = json!({ "totalIndexingRewards": "1" });
        assert!(parse_network_totals(&network).is_none());
    }

    #[test]
    fn rejects_totals_with_junk_amounts() {
        let network = json!({
            "totalIndexingRewards": "junk",
            "totalIndexingIndexerRewards": "1",
            "totalIndexingDelegatorRewards": "1"
        });
        assert!(parse_network_totals(&network).is_none());
    }

    #[test]
    fn parses_daily_points_with_string_day_starts() {
        let record = json!({
            "dayStart": "1700006400",
            "totalIndexingRewards": "10",
            "totalIndexingIndexerRewards": "7",
            "totalIndexingDelegatorRewards": "3"
        });
        let point = parse_daily_point(&record).unwrap();
        assert_eq!(point.day_start, 1_700_006_400);
        assert_eq!(point.total_rewards, "10");
    }

    #[test]
    fn legacy_fallback_preserves_the_split_invariant() {
        let legacy = LEGACY_MAINNET_REWARDS;
        assert_eq!(
            legacy.indexer_rewards + legacy.delegator_rewards,
            legacy.total_rewards
        );
    }
}
