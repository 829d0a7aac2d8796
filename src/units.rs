use crate::error::MetricsError;
use num_bigint::BigUint;
use num_traits::ToPrimitive;
use std::str::FromStr;

/// GRT uses 18 decimals on-chain.
pub const TOKEN_DECIMALS: u32 = 18;

/// Parse a wei-scale amount string from an upstream record. The gateway
/// serializes BigInt fields as decimal strings; some sources append a
/// fractional tail which is truncated, matching on-chain integer semantics.
/// Negative or non-numeric input is a conversion error, never zero.
pub fn parse_raw_amount(raw: &str) -> Result<BigUint, MetricsError> {
    let cleaned = raw.trim().trim_matches('"');
    let integral = cleaned.split('.').next().unwrap_or("");
    if integral.starts_with('-') {
        return Err(MetricsError::Conversion(raw.to_string()));
    }
    BigUint::from_str(integral).map_err(|_| MetricsError::Conversion(raw.to_string()))
}

/// Convert a wei-scale integer to token units. Callers sum raw integers
/// first and convert the sum once; converting per event and adding f64s
/// accumulates rounding error over large sets.
pub fn to_token_units(raw: &BigUint, decimals: u32) -> f64 {
    let scale = BigUint::from(10u32).pow(decimals);
    let whole = raw / &scale;
    let frac = raw % &scale;
    whole.to_f64().unwrap_or(f64::INFINITY)
        + frac.to_f64().unwrap_or(0.0) / 10f64.powi(decimals as i32)
}

/// Parse and convert in one step, for per-record threshold checks.
pub fn token_units_from_str(raw: &str, decimals: u32) -> Result<f64, MetricsError> {
    Ok(to_token_units(&parse_raw_amount(raw)?, decimals))
}
