use crate::error::MetricsError;
use crate::models::{DailyRewardPoint, QuarterlyRewards, RewardsSnapshot};
use crate::units::{parse_raw_amount, to_token_units, TOKEN_DECIMALS};
use chrono::{DateTime, Datelike, TimeZone, Utc};
use log::warn;
use num_bigint::BigUint;
use num_traits::{CheckedSub, Zero};
use std::collections::BTreeMap;

/// One calendar quarter, bounds in Unix seconds. `end` is inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quarter {
    pub label: String,
    pub start: i64,
    pub end: i64,
}

/// The trailing `count` calendar quarters, newest first. The newest entry is
/// the current partial quarter and ends at `now`.
pub fn trailing_quarters(now: DateTime<Utc>, count: usize) -> Vec<Quarter> {
    let mut quarters = Vec::with_capacity(count);
    let mut year = now.year();
    let mut quarter = now.month0() / 3 + 1;
    let mut end = now.timestamp();
    for _ in 0..count {
        let start_month = (quarter - 1) * 3 + 1;
        let start = Utc
            .with_ymd_and_hms(year, start_month, 1, 0, 0, 0)
            .single()
            .map(|dt| dt.timestamp())
            .unwrap_or(end);
        quarters.push(Quarter {
            label: format!("Q{} {}", quarter, year),
            start,
            end,
        });
        end = start - 1;
        if quarter == 1 {
            quarter = 4;
            year -= 1;
        } else {
            quarter -= 1;
        }
    }
    quarters
}

/// Rewards distributed between `quarter_start` and `quarter_end`, computed
/// as the difference of the cumulative series at the two bounds. The
/// upstream exposes running cumulative totals per day, so a missing day
/// falls back to the nearest earlier day (forward-fill). Returns None when
/// no data exists at or before `quarter_start`: the quarter is unavailable,
/// not zero.
pub fn quarterly_delta(
    series: &[DailyRewardPoint],
    quarter_start: i64,
    quarter_end: i64,
) -> Option<RewardsSnapshot> {
    if quarter_start > quarter_end {
        warn!(
            "{}",
            MetricsError::Aggregation(format!(
                "quarter bounds inverted ({} > {})",
                quarter_start, quarter_end
            ))
        );
        return None;
    }
    let by_day: BTreeMap<i64, &DailyRewardPoint> =
        series.iter().map(|p| (p.day_start, p)).collect();
    let at = |t: i64| by_day.range(..=t).next_back().map(|(_, p)| *p);
    let start = at(quarter_start)?;
    let end = at(quarter_end)?;

    let deltas = (|| -> Result<RewardsSnapshot, MetricsError> {
        Ok(RewardsSnapshot {
            total_rewards: delta_tokens(&start.total_rewards, &end.total_rewards)?,
            indexer_rewards: delta_tokens(&start.indexer_rewards, &end.indexer_rewards)?,
            delegator_rewards: delta_tokens(&start.delegator_rewards, &end.delegator_rewards)?,
        })
    })();
    match deltas {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            warn!(
                "Malformed cumulative reward point around day {}: {}",
                start.day_start, e
            );
            None
        }
    }
}

fn delta_tokens(start_raw: &str, end_raw: &str) -> Result<f64, MetricsError> {
    let start = parse_raw_amount(start_raw)?;
    let end = parse_raw_amount(end_raw)?;
    let diff = match end.checked_sub(&start) {
        Some(diff) => diff,
        None => {
            warn!("Cumulative reward series decreased ({} -> {})", start, end);
            BigUint::zero()
        }
    };
    Ok(to_token_units(&diff, TOKEN_DECIMALS))
}

/// Indexer/delegator share of a quarter's rewards, each rounded to one
/// decimal. None when the quarter distributed nothing.
pub fn percent_split(rewards: &RewardsSnapshot) -> (Option<f64>, Option<f64>) {
    if rewards.total_rewards <= 0.0 {
        return (None, None);
    }
    let indexer = round_one_decimal(rewards.indexer_rewards / rewards.total_rewards * 100.0);
    let delegator = round_one_decimal(rewards.delegator_rewards / rewards.total_rewards * 100.0);
    (Some(indexer), Some(delegator))
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Quarterly reward deltas for the trailing `count` quarters, newest first.
pub fn quarterly_breakdown(
    series: &[DailyRewardPoint],
    now: DateTime<Utc>,
    count: usize,
) -> Vec<QuarterlyRewards> {
    trailing_quarters(now, count)
        .into_iter()
        .map(|quarter| {
            let rewards = quarterly_delta(series, quarter.start, quarter.end);
            let (indexer_pct, delegator_pct) = rewards
                .as_ref()
                .map(percent_split)
                .unwrap_or((None, None));
            QuarterlyRewards {
                label: quarter.label,
                rewards,
                indexer_pct,
                delegator_pct,
            }
        })
        .collect()
}
