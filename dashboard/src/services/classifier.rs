//! Maps raw gateway failures onto the user-facing error taxonomy.
//!
//! The contracts in the wild signal a stale oracle through revert strings
//! rather than structured codes, so recognition is a string heuristic. It is
//! deliberately confined to this module.

use crate::chain::GatewayError;
use crate::services::workflow::WorkflowError;

// Lowercased substrings the deployed contracts use for stale-oracle reverts.
const STALE_PRICE_SIGNALS: &[&str] =
    &["stale price", "staleprice", "stale_price", "price too old", "oracle stale"];

/// Is this revert reason the contract's stale-oracle signal?
pub fn is_stale_price_signal(reason: &str) -> bool {
    let lowered = reason.to_ascii_lowercase();
    STALE_PRICE_SIGNALS.iter().any(|signal| lowered.contains(signal))
}

/// Classify a gateway failure for display. The raw detail stays in the logs.
pub fn classify_gateway_error(err: GatewayError) -> WorkflowError {
    match err {
        GatewayError::NoSigner => WorkflowError::NoWallet,
        GatewayError::BadSigner(detail) => {
            tracing::error!("wallet key rejected: {}", detail);
            WorkflowError::NoWallet
        }
        GatewayError::Estimation(detail) => {
            tracing::warn!("gas estimation failed: {}", detail);
            WorkflowError::GasEstimationFailed
        }
        GatewayError::Reverted(reason) if is_stale_price_signal(&reason) => {
            tracing::warn!("stale oracle revert: {}", reason);
            WorkflowError::OraclePriceStale
        }
        GatewayError::Reverted(reason) => WorkflowError::ContractRejected(reason),
        err @ GatewayError::WrongNetwork { .. } => WorkflowError::Unknown(err.to_string()),
        GatewayError::Rpc(detail) => WorkflowError::Unknown(detail),
    }
}
