use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::SourceError;

/// Supply statistics as reported by the info server. Amounts are in the base
/// denom (`aalthea`, 10^-18 ALTHEA) and kept as `f64` since they are only
/// ever scaled for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplySnapshot {
    #[serde(default = "missing_amount", deserialize_with = "lenient_amount")]
    pub community_pool: f64,
    #[serde(default = "missing_amount", deserialize_with = "lenient_amount")]
    pub total_supply: f64,
    #[serde(default = "missing_amount", deserialize_with = "lenient_amount")]
    pub total_liquid_supply: f64,
    #[serde(default = "missing_amount", deserialize_with = "lenient_amount")]
    pub total_liquid_balances: f64,
    #[serde(default = "missing_amount", deserialize_with = "lenient_amount")]
    pub total_unclaimed_rewards: f64,
    #[serde(default = "missing_amount", deserialize_with = "lenient_amount")]
    pub total_nonvesting_staked: f64,
    #[serde(default = "missing_amount", deserialize_with = "lenient_amount")]
    pub total_vesting: f64,
    #[serde(default = "missing_amount", deserialize_with = "lenient_amount")]
    pub total_vesting_staked: f64,
    #[serde(default = "missing_amount", deserialize_with = "lenient_amount")]
    pub total_vested: f64,
}

fn missing_amount() -> f64 {
    f64::NAN
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_amount(&value))
}

/// Numeric coercion for a single amount field. The server sends 256 bit
/// integers as decimal strings, older builds sent plain numbers.
pub fn coerce_amount(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_amount_str(s.trim()),
        Value::Null => 0.0,
        Value::Bool(b) => {
            if *b { 1.0 } else { 0.0 }
        }
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

/// String-to-number rules of ECMAScript `Number(s)` for an already trimmed
/// string: empty is 0, `Infinity` is spelled out, radix prefixes are allowed
/// without a sign, and nothing else alphabetic but an exponent marker.
fn parse_amount_str(s: &str) -> f64 {
    match s {
        "" => return 0.0,
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = s.strip_prefix(prefix) {
            if digits.starts_with('+') {
                return f64::NAN;
            }
            return u128::from_str_radix(digits, radix)
                .map(|n| n as f64)
                .unwrap_or(f64::NAN);
        }
    }

    if s.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return f64::NAN;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

/// Result of one poll, after the body has been looked at.
#[derive(Debug)]
pub enum FetchOutcome {
    Loaded(SupplySnapshot),
    /// Parseable JSON that is not an object. The server answers with a bare
    /// string ("Info not yet generated...") while it is still computing.
    Malformed,
    Failed(SourceError),
}

impl FetchOutcome {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(_) => match serde_json::from_value::<SupplySnapshot>(value) {
                Ok(snapshot) => FetchOutcome::Loaded(snapshot),
                Err(e) => {
                    tracing::debug!("Supply object rejected: {}", e);
                    FetchOutcome::Malformed
                }
            },
            Value::String(s) => {
                tracing::debug!("Backend answered with a string: {:?}", s);
                FetchOutcome::Malformed
            }
            other => {
                tracing::debug!("Backend answered with a non-object: {}", other);
                FetchOutcome::Malformed
            }
        }
    }

    pub fn from_result(result: Result<Value, SourceError>) -> Self {
        match result {
            Ok(value) => Self::from_value(value),
            Err(e) => FetchOutcome::Failed(e),
        }
    }
}
