use crate::models::{AggregateStats, DelegationEvent, EventKind, PeriodSelector};
use crate::units::{parse_raw_amount, to_token_units, TOKEN_DECIMALS};
use log::warn;
use num_bigint::BigUint;
use num_traits::Zero;

pub const SECONDS_PER_DAY: i64 = 86_400;

/// Period-filtered delegation aggregation.
///
/// Pure function of (events, period, min_amount, now): identical inputs give
/// identical output, which is what lets the dashboard recompute any period
/// client-side from one embedded dataset instead of re-fetching. `now` is
/// the fetch time of the dataset, captured once per run.
///
/// Totals always cover the full period-retained set; `min_amount` filters
/// the displayed event table only. Summation happens over raw wei integers
/// with a single conversion per total.
pub fn aggregate(
    events: &[DelegationEvent],
    period: PeriodSelector,
    min_amount: f64,
    now: i64,
) -> AggregateStats {
    let cutoff = period.days().map(|days| now - days * SECONDS_PER_DAY);
    let retained: Vec<&DelegationEvent> = events
        .iter()
        .filter(|e| cutoff.map_or(true, |c| e.timestamp >= c))
        .collect();

    let mut delegated = BigUint::zero();
    let mut undelegated = BigUint::zero();
    for event in &retained {
        let raw = match parse_raw_amount(&event.amount) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    "Dropping event {} from totals: {}",
                    event.transaction_hash, e
                );
                continue;
            }
        };
        match event.kind {
            EventKind::Delegation => delegated += raw,
            EventKind::Undelegation => undelegated += raw,
        }
    }

    let total_delegated = to_token_units(&delegated, TOKEN_DECIMALS);
    let total_undelegated = to_token_units(&undelegated, TOKEN_DECIMALS);

    let mut filtered_events: Vec<DelegationEvent> = retained
        .iter()
        .filter(|e| {
            parse_raw_amount(&e.amount)
                .map(|raw| to_token_units(&raw, TOKEN_DECIMALS) >= min_amount)
                .unwrap_or(false)
        })
        .map(|e| (*e).clone())
        .collect();
    // sort_by is stable, so equal timestamps keep original fetch order
    filtered_events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    AggregateStats {
        total_delegated,
        total_undelegated,
        net: total_delegated - total_undelegated,
        filtered_events,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRT: &str = "000000000000000000";
    const NOW: i64 = 1_750_000_000;

    fn event(kind: EventKind, tokens: u64, age_days: i64, hash: &str) -> DelegationEvent {
        DelegationEvent {
            kind,
            amount: format!("{}{}", tokens, GRT),
            timestamp: NOW - age_days * SECONDS_PER_DAY,
            delegator_address: "0xdel".to_string(),
            indexer_address: "0xidx".to_string(),
            transaction_hash: hash.to_string(),
        }
    }

    #[test]
    fn worked_example_from_contract() {
        let events = vec![
            event(EventKind::Delegation, 15_000, 10, "0xa"),
            event(EventKind::Undelegation, 5_000, 100, "0xb"),
        ];
        let stats = aggregate(&events, PeriodSelector::Last90Days, 10_000.0, NOW);
        assert_eq!(stats.total_delegated, 15_000.0);
        assert_eq!(stats.total_undelegated, 0.0);
        assert_eq!(stats.net, 15_000.0);
        assert_eq!(stats.filtered_events.len(), 1);
        assert_eq!(stats.filtered_events[0].transaction_hash, "0xa");
    }

    #[test]
    fn all_period_retains_everything() {
        let events = vec![
            event(EventKind::Delegation, 15_000, 10, "0xa"),
            event(EventKind::Undelegation, 5_000, 100, "0xb"),
        ];
        let stats = aggregate(&events, PeriodSelector::All, 10_000.0, NOW);
        assert_eq!(stats.total_delegated, 15_000.0);
        assert_eq!(stats.total_undelegated, 5_000.0);
        assert_eq!(stats.net, 10_000.0);
    }

    #[test]
    fn superset_sums_dominate_subset_sums() {
        let events = vec![
            event(EventKind::Delegation, 1_000, 5, "0xa"),
            event(EventKind::Delegation, 2_000, 45, "0xb"),
            event(EventKind::Delegation, 3_000, 120, "0xc"),
        ];
        let all = aggregate(&events, PeriodSelector::All, 0.0, NOW);
        let last90 = aggregate(&events, PeriodSelector::Last90Days, 0.0, NOW);
        let last30 = aggregate(&events, PeriodSelector::Last30Days, 0.0, NOW);
        assert!(all.total_delegated >= last90.total_delegated);
        assert!(last90.total_delegated >= last30.total_delegated);
        assert_eq!(all.total_delegated, 6_000.0);
        assert_eq!(last90.total_delegated, 3_000.0);
        assert_eq!(last30.total_delegated, 1_000.0);
    }

    #[test]
    fn net_is_exactly_delegated_minus_undelegated() {
        let events = vec![
            event(EventKind::Delegation, 7_000, 1, "0xa"),
            event(EventKind::Undelegation, 9_500, 2, "0xb"),
        ];
        for period in [
            PeriodSelector::All,
            PeriodSelector::Last90Days,
            PeriodSelector::Last30Days,
        ] {
            let stats = aggregate(&events, period, 10_000.0, NOW);
            assert_eq!(stats.net, stats.total_delegated - stats.total_undelegated);
        }
        let stats = aggregate(&events, PeriodSelector::All, 10_000.0, NOW);
        assert_eq!(stats.net, -2_500.0);
    }

    #[test]
    fn identical_inputs_give_identical_output() {
        let events = vec![
            event(EventKind::Delegation, 15_000, 10, "0xa"),
            event(EventKind::Undelegation, 5_000, 40, "0xb"),
            event(EventKind::Delegation, 20_000, 80, "0xc"),
        ];
        let first = aggregate(&events, PeriodSelector::Last90Days, 10_000.0, NOW);
        let second = aggregate(&events, PeriodSelector::Last90Days, 10_000.0, NOW);
        assert_eq!(first, second);
    }

    #[test]
    fn threshold_filters_table_but_not_totals() {
        let events = vec![
            event(EventKind::Delegation, 100, 1, "0xa"),
            event(EventKind::Delegation, 200, 2, "0xb"),
        ];
        let stats = aggregate(&events, PeriodSelector::All, 10_000.0, NOW);
        assert_eq!(stats.total_delegated, 300.0);
        assert!(stats.filtered_events.is_empty());
    }

    #[test]
    fn threshold_is_sound_and_complete() {
        let events = vec![
            event(EventKind::Delegation, 9_999, 1, "0xa"),
            event(EventKind::Delegation, 10_000, 2, "0xb"),
            event(EventKind::Undelegation, 50_000, 3, "0xc"),
            event(EventKind::Delegation, 10_001, 95, "0xd"),
        ];
        let stats = aggregate(&events, PeriodSelector::Last90Days, 10_000.0, NOW);
        let hashes: Vec<&str> = stats
            .filtered_events
            .iter()
            .map(|e| e.transaction_hash.as_str())
            .collect();
        // every displayed event clears the threshold, every in-window event
        // that clears it is displayed, and the out-of-window one is not
        assert_eq!(hashes, vec!["0xb", "0xc"]);
    }

    #[test]
    fn table_is_time_descending_with_stable_ties() {
        // same age gives the two a tied timestamp
        let tied_early = event(EventKind::Delegation, 20_000, 5, "0xfirst");
        let tied_late = event(EventKind::Undelegation, 30_000, 5, "0xsecond");
        let newest = event(EventKind::Delegation, 40_000, 1, "0xnewest");
        let events = vec![tied_early, tied_late, newest];

        let stats = aggregate(&events, PeriodSelector::All, 10_000.0, NOW);
        let hashes: Vec<&str> = stats
            .filtered_events
            .iter()
            .map(|e| e.transaction_hash.as_str())
            .collect();
        assert_eq!(hashes, vec!["0xnewest", "0xfirst", "0xsecond"]);
    }

    #[test]
    fn empty_input_gives_zeroed_stats() {
        let stats = aggregate(&[], PeriodSelector::Last30Days, 10_000.0, NOW);
        assert_eq!(stats.total_delegated, 0.0);
        assert_eq!(stats.total_undelegated, 0.0);
        assert_eq!(stats.net, 0.0);
        assert!(stats.filtered_events.is_empty());
    }

    #[test]
    fn unparseable_amount_is_skipped_not_zeroed_in() {
        let mut bad = event(EventKind::Delegation, 1, 1, "0xbad");
        bad.amount = "not-a-number".to_string();
        let events = vec![bad, event(EventKind::Delegation, 5_000, 1, "0xgood")];
        let stats = aggregate(&events, PeriodSelector::All, 0.0, NOW);
        assert_eq!(stats.total_delegated, 5_000.0);
        assert_eq!(stats.filtered_events.len(), 1);
    }

    #[test]
    fn cutoff_is_inclusive_at_the_boundary() {
        let mut boundary = event(EventKind::Delegation, 1_000, 0, "0xa");
        boundary.timestamp = NOW - 90 * SECONDS_PER_DAY;
        let stats = aggregate(&[boundary], PeriodSelector::Last90Days, 0.0, NOW);
        assert_eq!(stats.total_delegated, 1_000.0);
    }
}
