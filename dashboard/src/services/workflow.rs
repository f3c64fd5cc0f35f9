//! # Transaction Workflow
//!
//! Drives a single user-initiated protocol action from intent to on-chain
//! confirmation: pre-flight validation, the approve-then-act sequence where
//! one is needed, failure classification, and a snapshot refresh once the
//! action is confirmed.
//!
//! Phases per invocation:
//!
//! ```text
//! idle -> validating -> [awaiting-approval ->] awaiting-primary-tx -> confirmed
//! ```
//!
//! with `failed` reachable from any non-terminal phase. The approval phase
//! occurs only for deposit and repay, and only when the existing allowance
//! falls short of the requested amount. There are no automatic retries; a
//! failed invocation ends there and the next submission revalidates from
//! scratch.
//!
//! Status is published over a watch channel. Observers may disappear at any
//! time; a submission that outlives every observer still runs to completion
//! and its final publish is simply unseen.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, TxHash, U256};
use tokio::sync::watch;
use uuid::Uuid;

use shared::{parse_base_units, ActionKind, ActionRequest, STABLECOIN_DECIMALS};

use crate::api::mint::AutoMintValidator;
use crate::chain::ChainGateway;
use crate::services::classifier::classify_gateway_error;
use crate::services::preflight::Preflight;
use crate::services::refresher::SnapshotRefresher;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Validating,
    AwaitingApproval,
    AwaitingPrimaryTx,
    Confirmed,
    Failed,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Confirmed | Phase::Failed)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Phase::Idle => "idle",
            Phase::Validating => "validating",
            Phase::AwaitingApproval => "awaiting-approval",
            Phase::AwaitingPrimaryTx => "awaiting-primary-tx",
            Phase::Confirmed => "confirmed",
            Phase::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Progress of the current invocation, for display.
#[derive(Debug, Clone)]
pub struct WorkflowStatus {
    pub phase: Phase,
    pub message: String,
    /// Raw failure detail, kept for diagnostics only.
    pub detail: Option<String>,
}

impl WorkflowStatus {
    fn idle() -> Self {
        Self { phase: Phase::Idle, message: String::new(), detail: None }
    }
}

/// User-facing failure classification.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("No wallet connected")]
    NoWallet,

    #[error("Enter an amount greater than zero")]
    InvalidAmount,

    #[error("Insufficient token balance for this action")]
    InsufficientBalance,

    #[error("The network rejected the transaction while estimating gas")]
    GasEstimationFailed,

    #[error("The oracle price for this collateral is stale; try again shortly")]
    OraclePriceStale,

    #[error("Transaction rejected: {0}")]
    ContractRejected(String),

    #[error("Auto-mint unavailable: {0}")]
    AutoMintIneligible(String),

    /// Generic message for the user; the payload goes to the logs only.
    #[error("Something went wrong, please try again")]
    Unknown(String),

    /// Re-entrancy guard: returned without touching status or the network.
    #[error("Another submission is already in progress")]
    AlreadyInFlight,
}

enum GuardedCall {
    Deposit,
    Burn,
}

pub struct TxWorkflow {
    gateway: Arc<dyn ChainGateway>,
    validator: Arc<dyn AutoMintValidator>,
    refresher: Arc<dyn SnapshotRefresher>,
    vault: Address,
    stablecoin: Address,
    status: watch::Sender<WorkflowStatus>,
    trace: Mutex<Vec<Phase>>,
    in_flight: AtomicBool,
}

impl TxWorkflow {
    pub fn new(
        gateway: Arc<dyn ChainGateway>,
        validator: Arc<dyn AutoMintValidator>,
        refresher: Arc<dyn SnapshotRefresher>,
        vault: Address,
        stablecoin: Address,
    ) -> Self {
        let (status, _) = watch::channel(WorkflowStatus::idle());
        Self {
            gateway,
            validator,
            refresher,
            vault,
            stablecoin,
            status,
            trace: Mutex::new(Vec::new()),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Watch status transitions. Dropping the receiver is always safe.
    pub fn subscribe(&self) -> watch::Receiver<WorkflowStatus> {
        self.status.subscribe()
    }

    pub fn status(&self) -> WorkflowStatus {
        self.status.borrow().clone()
    }

    /// Phases of the current invocation, in transition order.
    pub fn phase_trace(&self) -> Vec<Phase> {
        self.trace.lock().expect("phase trace lock poisoned").clone()
    }

    /// Return to idle between invocations. Ignored while one is in flight.
    pub fn reset(&self) {
        if !self.in_flight.load(Ordering::SeqCst) {
            self.trace.lock().expect("phase trace lock poisoned").clear();
            self.status.send_replace(WorkflowStatus::idle());
        }
    }

    /// Run the submission in the background. The caller may drop every
    /// status receiver before completion; the invocation still finishes.
    pub fn spawn(
        self: Arc<Self>,
        request: ActionRequest,
    ) -> tokio::task::JoinHandle<Result<TxHash, WorkflowError>> {
        tokio::spawn(async move { self.submit(request).await })
    }

    /// Drive one action to a terminal phase.
    ///
    /// At most one submission runs at a time; a second call while one is in
    /// flight returns [`WorkflowError::AlreadyInFlight`] untouched.
    pub async fn submit(&self, request: ActionRequest) -> Result<TxHash, WorkflowError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::warn!("submission refused: another one is in flight");
            return Err(WorkflowError::AlreadyInFlight);
        }

        self.trace.lock().expect("phase trace lock poisoned").clear();
        let invocation = Uuid::new_v4();

        let result = self.run(invocation, &request).await;
        match &result {
            Ok(tx_hash) => {
                self.transition(
                    Phase::Confirmed,
                    format!("{} confirmed", request.kind),
                    None,
                );
                tracing::info!(%invocation, tx = %tx_hash, "workflow confirmed");
                // Exactly one refresh, and only on confirmation.
                self.refresher.refresh(request.collateral.address).await;
            }
            Err(e) => {
                let detail = match e {
                    WorkflowError::Unknown(detail) => Some(detail.clone()),
                    _ => None,
                };
                tracing::warn!(%invocation, "workflow failed: {:?}", e);
                self.transition(Phase::Failed, e.to_string(), detail);
            }
        }

        self.in_flight.store(false, Ordering::SeqCst);
        result
    }

    async fn run(&self, invocation: Uuid, request: &ActionRequest) -> Result<TxHash, WorkflowError> {
        self.transition(
            Phase::Validating,
            format!("Validating {} request", request.kind),
            None,
        );
        tracing::info!(
            %invocation,
            action = %request.kind,
            collateral = %request.collateral.address,
            "starting submission"
        );

        let account = self.gateway.account().ok_or(WorkflowError::NoWallet)?;

        match request.kind {
            ActionKind::Deposit => {
                let amount = self.amount_in_base_units(request)?;
                self.approve_then_submit(
                    account,
                    request.collateral.address,
                    request.collateral.address,
                    amount,
                    GuardedCall::Deposit,
                )
                .await
            }
            ActionKind::Withdraw => {
                let amount = self.amount_in_base_units(request)?;
                self.transition(
                    Phase::AwaitingPrimaryTx,
                    "Confirm the withdrawal in your wallet",
                    None,
                );
                self.gateway
                    .withdraw_collateral(request.collateral.address, amount)
                    .await
                    .map_err(classify_gateway_error)
            }
            ActionKind::Mint => {
                let amount = self.amount_in_base_units(request)?;
                self.transition(Phase::AwaitingPrimaryTx, "Confirm the mint in your wallet", None);
                self.gateway
                    .mint_tokens(request.collateral.address, amount)
                    .await
                    .map_err(classify_gateway_error)
            }
            ActionKind::Repay => {
                let amount = self.amount_in_base_units(request)?;
                self.approve_then_submit(
                    account,
                    self.stablecoin,
                    request.collateral.address,
                    amount,
                    GuardedCall::Burn,
                )
                .await
            }
            ActionKind::AutoMint => {
                let verdict = self
                    .validator
                    .validate_auto_mint(request.collateral.address)
                    .await
                    .map_err(|e| WorkflowError::Unknown(e.to_string()))?;
                if !verdict.eligible {
                    return Err(WorkflowError::AutoMintIneligible(
                        verdict.reason.unwrap_or_else(|| "not eligible".to_string()),
                    ));
                }
                self.transition(
                    Phase::AwaitingPrimaryTx,
                    "Confirm the auto-mint in your wallet",
                    None,
                );
                self.gateway
                    .auto_mint(request.collateral.address)
                    .await
                    .map_err(classify_gateway_error)
            }
        }
    }

    /// Deposit and repay move tokens out of the user's account: check funds,
    /// grant the allowance if the existing one falls short, then submit the
    /// primary call. The approval is always confirmed before the primary
    /// call is sent.
    async fn approve_then_submit(
        &self,
        account: Address,
        pay_token: Address,
        collateral: Address,
        amount: U256,
        call: GuardedCall,
    ) -> Result<TxHash, WorkflowError> {
        let funded =
            Preflight::has_sufficient_balance(self.gateway.as_ref(), pay_token, account, amount)
                .await
                .map_err(classify_gateway_error)?;
        if !funded {
            return Err(WorkflowError::InsufficientBalance);
        }

        let needs_approval = Preflight::needs_approval(
            self.gateway.as_ref(),
            pay_token,
            account,
            self.vault,
            amount,
        )
        .await
        .map_err(classify_gateway_error)?;

        if needs_approval {
            self.transition(
                Phase::AwaitingApproval,
                "Confirm the token approval in your wallet",
                None,
            );
            self.gateway
                .approve(pay_token, self.vault, amount)
                .await
                .map_err(classify_gateway_error)?;
        } else {
            tracing::debug!("existing allowance covers the amount, skipping approval");
        }

        let message = match call {
            GuardedCall::Deposit => "Confirm the deposit in your wallet",
            GuardedCall::Burn => "Confirm the repayment in your wallet",
        };
        self.transition(Phase::AwaitingPrimaryTx, message, None);

        match call {
            GuardedCall::Deposit => self.gateway.deposit_collateral(collateral, amount).await,
            GuardedCall::Burn => self.gateway.burn_tokens(collateral, amount).await,
        }
        .map_err(classify_gateway_error)
    }

    /// Parse the request's human-unit amount into base units.
    ///
    /// Mint and repay amounts are stablecoin amounts and use its fixed
    /// precision; deposit and withdraw use the collateral's declared
    /// decimals. Conversion truncates, never rounds up.
    fn amount_in_base_units(&self, request: &ActionRequest) -> Result<U256, WorkflowError> {
        let raw = request.amount.as_deref().ok_or(WorkflowError::InvalidAmount)?;
        let decimals = match request.kind {
            ActionKind::Deposit | ActionKind::Withdraw => request.collateral.decimals,
            _ => STABLECOIN_DECIMALS,
        };
        parse_base_units(raw, decimals).map_err(|e| {
            tracing::warn!("rejected amount {:?}: {}", raw, e);
            WorkflowError::InvalidAmount
        })
    }

    fn transition(&self, phase: Phase, message: impl Into<String>, detail: Option<String>) {
        let status = WorkflowStatus { phase, message: message.into(), detail };
        tracing::debug!(phase = %status.phase, "{}", status.message);
        if let Some(detail) = &status.detail {
            tracing::debug!("failure detail: {}", detail);
        }
        self.trace.lock().expect("phase trace lock poisoned").push(phase);
        self.status.send_replace(status);
    }
}
