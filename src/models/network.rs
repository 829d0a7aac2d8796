use serde::{Deserialize, Serialize};

/// Per-network subgraph and indexer counts, in original fetch order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStat {
    pub name: String,
    pub subgraph_count: u64,
    pub unique_indexer_count: u64,
}
