use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A collateral token enabled by the protocol.
///
/// The backend is the source of truth for the enabled set and for each
/// token's declared decimal precision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollateralInfo {
    pub address: Address,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
}

/// Per-user, per-collateral vault position as reported by the backend.
///
/// Amounts are decimal strings in base units; USD values are already
/// priced by the backend's oracle view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub collateral: Address,
    pub collateral_deposited: String,
    pub debt_minted: String,
    pub collateral_value_usd: f64,
    pub debt_value_usd: f64,
    /// Collateral value over debt value, percent. Absent when no debt is minted.
    pub collateral_ratio: Option<f64>,
    pub liquidation_threshold: f64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintStatusSnapshot {
    pub eligible: bool,
    pub minted_total: String,
    pub pending_requests: i64,
    pub next_eligible_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleSnapshot {
    pub collateral: Address,
    pub price_usd: f64,
    pub updated_at: DateTime<Utc>,
    pub stale: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: i64,
    pub tx_hash: String,
    pub tx_type: String,
    pub collateral: Address,
    pub amount: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionPage {
    pub items: Vec<TransactionRecord>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

impl TransactionPage {
    pub fn has_more(&self) -> bool {
        self.page * self.limit < self.total
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolHealthSnapshot {
    pub status: String,
    pub paused: bool,
    pub total_collateral_usd: f64,
    pub total_debt_usd: f64,
    /// Protocol-wide collateral over debt, percent. Absent when no debt exists.
    pub global_collateral_ratio: Option<f64>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingMintRequest {
    pub id: i64,
    pub account: Address,
    pub collateral: Address,
    pub requested_at: DateTime<Utc>,
}

/// Accept/reject verdict from the backend's auto-mint eligibility check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoMintVerdict {
    pub eligible: bool,
    pub reason: Option<String>,
}

/// One consistent batch of read-only snapshots for a collateral.
///
/// Produced by a single parallel fetch; either every member comes from the
/// same refresh or the batch is discarded as a whole.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub position: PositionSnapshot,
    pub mint_status: MintStatusSnapshot,
    pub oracle: OracleSnapshot,
    pub transactions: TransactionPage,
    pub health: ProtocolHealthSnapshot,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    Deposit,
    Withdraw,
    Mint,
    Repay,
    AutoMint,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Deposit => "deposit",
            ActionKind::Withdraw => "withdraw",
            ActionKind::Mint => "mint",
            ActionKind::Repay => "repay",
            ActionKind::AutoMint => "auto-mint",
        }
    }

}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "deposit" => Ok(ActionKind::Deposit),
            "withdraw" => Ok(ActionKind::Withdraw),
            "mint" => Ok(ActionKind::Mint),
            "repay" => Ok(ActionKind::Repay),
            "auto-mint" | "automint" => Ok(ActionKind::AutoMint),
            other => Err(format!("unknown action kind: {}", other)),
        }
    }
}

/// A user-initiated protocol action, created when an action is requested
/// and dropped once its outcome has been observed.
#[derive(Debug, Clone)]
pub struct ActionRequest {
    pub kind: ActionKind,
    pub collateral: CollateralInfo,
    /// Human-unit decimal string. Absent for auto-mint.
    pub amount: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    pub fn error(error: String) -> Self {
        Self { success: false, data: None, error: Some(error) }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub tx_type: Option<ActionKind>,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self { page: default_page(), limit: default_limit(), tx_type: None }
    }
}
