use crate::error::MetricsError;
use crate::models::{DelegationEvent, EventKind};
use crate::services::graph_client::GraphClient;
use crate::units::parse_raw_amount;
use log::{info, warn};
use serde_json::Value;

/// The graph network analytics subgraph, which materializes delegation
/// lifecycle events with their transaction hashes.
const ANALYTICS_SUBGRAPH_ID: &str = "8prkmtsTsLJyyknqErJaHM4WLcvdbkxPCkW5R4dAvP3o";

const SECTION: &str = "delegation events";

/// Fetch the full delegation and undelegation event set, newest first per
/// kind. Records requested are capped by `page_size * max_pages` per kind;
/// capping is how the rate limit is respected.
pub async fn fetch_delegation_events(
    client: &GraphClient,
    page_size: usize,
    max_pages: usize,
) -> Result<Vec<DelegationEvent>, MetricsError> {
    info!("Fetching delegation events...");
    let mut events = fetch_events_of_kind(
        client,
        EventKind::Delegation,
        "stakeDelegatedEvents",
        page_size,
        max_pages,
    )
    .await?;
    let undelegations = fetch_events_of_kind(
        client,
        EventKind::Undelegation,
        "stakeUndelegatedEvents",
        page_size,
        max_pages,
    )
    .await?;
    events.extend(undelegations);

    info!("Fetched {} delegation events", events.len());
    Ok(events)
}

async fn fetch_events_of_kind(
    client: &GraphClient,
    kind: EventKind,
    entity: &str,
    page_size: usize,
    max_pages: usize,
) -> Result<Vec<DelegationEvent>, MetricsError> {
    let mut events = Vec::new();
    let mut skip = 0;

    for _ in 0..max_pages {
        let query = format!(
            r#"{{
            {entity}(first: {page_size}, skip: {skip}, orderBy: timestamp, orderDirection: desc) {{
                tokens
                timestamp
                delegator {{
                    id
                }}
                indexer {{
                    id
                }}
                transactionHash
            }}
        }}"#
        );

        let data = client.query(SECTION, ANALYTICS_SUBGRAPH_ID, &query).await?;
        let batch = match data.get(entity).and_then(|v| v.as_array()) {
            Some(batch) if !batch.is_empty() => batch.clone(),
            _ => break,
        };

        let fetched = batch.len();
        events.extend(batch.iter().filter_map(|record| parse_event(record, kind)));
        skip += page_size;
        info!("Fetched {} {} records (cursor at {})", fetched, entity, skip);

        if fetched < page_size {
            break;
        }
    }

    Ok(events)
}

/// Turn one upstream record into a DelegationEvent. Records with a missing
/// hash or an unparseable amount are dropped with a warning; a bad amount
/// must never be counted as zero.
fn parse_event(record: &Value, kind: EventKind) -> Option<DelegationEvent> {
    let transaction_hash = match record["transactionHash"].as_str() {
        Some(hash) => hash.to_string(),
        None => {
            warn!("Dropping {:?} event without a transaction hash", kind);
            return None;
        }
    };

    let raw_amount = field_as_string(&record["tokens"]);
    let amount = match parse_raw_amount(&raw_amount) {
        Ok(raw) => raw.to_string(),
        Err(e) => {
            warn!("Dropping event {}: {}", transaction_hash, e);
            return None;
        }
    };

    let timestamp = match record["timestamp"]
        .as_i64()
        .or_else(|| record["timestamp"].as_str().and_then(|s| s.parse().ok()))
    {
        Some(ts) => ts,
        None => {
            warn!("Dropping event {} without a timestamp", transaction_hash);
            return None;
        }
    };

    Some(DelegationEvent {
        kind,
        amount,
        timestamp,
        delegator_address: record["delegator"]["id"].as_str().unwrap_or("").to_string(),
        indexer_address: record["indexer"]["id"].as_str().unwrap_or("").to_string(),
        transaction_hash,
    })
}

fn field_as_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
