use serde::{Deserialize, Serialize};

/// Direction of a delegation event as reported by the network subgraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Delegation,
    Undelegation,
}

/// One delegation or undelegation, immutable once fetched.
/// Identity is (transaction_hash, kind). The amount stays a wei-scale
/// decimal string so no precision is lost before summation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegationEvent {
    pub kind: EventKind,
    pub amount: String,
    pub timestamp: i64,
    pub delegator_address: String,
    pub indexer_address: String,
    pub transaction_hash: String,
}

/// Time window applied to the event set, relative to the fetch time of the
/// dataset rather than wall-clock at view time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodSelector {
    All,
    Last90Days,
    Last30Days,
}

impl PeriodSelector {
    /// Window length in days; None means no cutoff.
    pub fn days(&self) -> Option<i64> {
        match self {
            PeriodSelector::All => None,
            PeriodSelector::Last90Days => Some(90),
            PeriodSelector::Last30Days => Some(30),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PeriodSelector::All => "all",
            PeriodSelector::Last90Days => "90d",
            PeriodSelector::Last30Days => "30d",
        }
    }
}

/// Derived statistics for one period selection. Recomputed fresh from the
/// full event set on every call, never mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateStats {
    pub total_delegated: f64,
    pub total_undelegated: f64,
    pub net: f64,
    pub filtered_events: Vec<DelegationEvent>,
}

impl PartialEq for DelegationEvent {
    fn eq(&self, other: &Self) -> bool {
        self.transaction_hash == other.transaction_hash && self.kind == other.kind
    }
}
