use crate::error::MetricsError;
use crate::models::NetworkStat;
use crate::services::graph_client::GraphClient;
use log::info;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// The gateway network subgraph indexing subgraph deployments.
const NETWORK_SUBGRAPH_ID: &str = "DZz4kDTdmzWLWsV373w2bSmoar3umKKH9y82SUKr5qmp";

const SECTION: &str = "network stats";

/// Count subgraphs and unique allocated indexers per network by paging
/// through every deployed subgraph version.
pub async fn fetch_network_stats(
    client: &GraphClient,
    page_size: usize,
    max_pages: usize,
) -> Result<Vec<NetworkStat>, MetricsError> {
    let mut acc = NetworkAccumulator::default();
    let mut skip = 0;

    info!("Fetching network subgraph counts...");
    for _ in 0..max_pages {
        let query = format!(
            r#"{{
            subgraphs(first: {page_size}, skip: {skip}, where: {{ currentVersion_not: null }}) {{
                id
                currentVersion {{
                    subgraphDeployment {{
                        manifest {{
                            network
                        }}
                        indexerAllocations(first: 1000, where: {{ status: Active }}) {{
                            indexer {{
                                id
                            }}
                        }}
                    }}
                }}
            }}
        }}"#
        );

        let data = client.query(SECTION, NETWORK_SUBGRAPH_ID, &query).await?;
        let batch = match data.get("subgraphs").and_then(|v| v.as_array()) {
            Some(batch) if !batch.is_empty() => batch.clone(),
            _ => break,
        };

        for item in &batch {
            acc.record(item);
        }
        skip += page_size;
        info!("Fetched {} subgraphs (cursor at {})", batch.len(), skip);
    }

    let stats = acc.into_stats();
    if stats.is_empty() {
        return Err(MetricsError::fetch(SECTION, "no subgraph data returned"));
    }
    info!(
        "Fetched subgraph and indexer counts for {} networks",
        stats.len()
    );
    Ok(stats)
}

/// Accumulates per-network counts across pages. Networks keep first-seen
/// order, which is the tie-break order for the top-20 ranking.
#[derive(Default)]
struct NetworkAccumulator {
    order: Vec<String>,
    counts: HashMap<String, u64>,
    indexers: HashMap<String, HashSet<String>>,
}

impl NetworkAccumulator {
    fn record(&mut self, item: &Value) {
        let deployment = &item["currentVersion"]["subgraphDeployment"];
        let network = match deployment["manifest"]["network"].as_str() {
            Some(network) => network.to_string(),
            None => return,
        };

        if !self.counts.contains_key(&network) {
            self.order.push(network.clone());
        }
        *self.counts.entry(network.clone()).or_insert(0) += 1;

        let seen = self.indexers.entry(network).or_default();
        if let Some(allocations) = deployment["indexerAllocations"].as_array() {
            for allocation in allocations {
                if let Some(id) = allocation["indexer"]["id"].as_str() {
                    seen.insert(id.to_string());
                }
            }
        }
    }

    fn into_stats(self) -> Vec<NetworkStat> {
        self.order
            .into_iter()
            .map(|name| NetworkStat {
                subgraph_count: self.counts.get(&name).copied().unwrap_or(0),
                unique_indexer_count: self
                    .indexers
                    .get(&name)
                    .map(|set| set.len() as u64)
                    .unwrap_or(0),
                name,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn subgraph(network: &str, indexers: &[&str]) -> Value {
        let allocations: Vec<Value> = indexers
            .iter()
            .map(|id| json!({ "indexer": { "id": id } }))
            .collect();
        json!({
            "id": "sg",
            "currentVersion": {
                "subgraphDeployment": {
                    "manifest": { "network": network },
                    "indexerAllocations": allocations
                }
            }
        })
    }

    #[test]
    fn counts_subgraphs_and_dedupes_indexers_per_network() {
        let mut acc = NetworkAccumulator::default();
        acc.record(&subgraph("mainnet", &["0x1", "0x2"]));
        acc.record(&subgraph("mainnet", &["0x2", "0x3"]));
        acc.record(&subgraph("base", &["0x1"]));

        let stats = acc.into_stats();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].name, "mainnet");
        assert_eq!(stats[0].subgraph_count, 2);
        assert_eq!(stats[0].unique_indexer_count, 3);
        assert_eq!(stats[1].name, "base");
        assert_eq!(stats[1].subgraph_count, 1);
    }

    #[test]
    fn keeps_first_seen_order() {
        let mut acc = NetworkAccumulator::default();
        for network in ["gnosis", "celo", "gnosis", "arbitrum-one", "celo"] {
            acc.record(&subgraph(network, &[]));
        }
        let names: Vec<String> = acc.into_stats().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["gnosis", "celo", "arbitrum-one"]);
    }

    #[test]
    fn skips_records_without_a_manifest_network() {
        let mut acc = NetworkAccumulator::default();
        acc.record(&json!({ "id": "sg", "currentVersion": { "subgraphDeployment": {} } }));
        acc.record(&subgraph("sonic", &[]));
        let stats = acc.into_stats();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].name, "sonic");
    }
}
