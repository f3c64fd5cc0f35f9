//! # Transaction Workflow Tests
//!
//! Exercises the submission workflow against doubles of its three
//! capabilities: the chain gateway, the auto-mint validator and the
//! snapshot refresher.
//!
//! ## Coverage:
//! - Validation failures never reach the network
//! - Pre-flight balance checks for deposit and repay
//! - Approve-before-act ordering, and approval reuse
//! - Failure classification (stale oracle, readable reverts)
//! - Refresh-on-confirmation accounting
//! - Re-entrancy guard and completions outliving their observers

use std::sync::Arc;

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use mockall::Sequence;

use shared::{ActionKind, ActionRequest, AutoMintVerdict, CollateralInfo};

use crate::api::mint::MockAutoMintValidator;
use crate::chain::{ChainGateway, GatewayError, MockChainGateway};
use crate::services::refresher::MockSnapshotRefresher;
use crate::services::workflow::{Phase, TxWorkflow, WorkflowError};

// ============================================================================
// Fixtures
// ============================================================================

const VAULT: Address = Address::repeat_byte(0x11);
const STABLECOIN: Address = Address::repeat_byte(0x22);
const ACCOUNT: Address = Address::repeat_byte(0x33);
const WETH: Address = Address::repeat_byte(0xAA);

fn weth(decimals: u8) -> CollateralInfo {
    CollateralInfo {
        address: WETH,
        symbol: "WETH".to_string(),
        name: "Wrapped Ether".to_string(),
        decimals,
    }
}

fn request(kind: ActionKind, amount: Option<&str>) -> ActionRequest {
    ActionRequest {
        kind,
        collateral: weth(6),
        amount: amount.map(str::to_string),
    }
}

fn hash(byte: u8) -> TxHash {
    TxHash::repeat_byte(byte)
}

fn connected_gateway() -> MockChainGateway {
    let mut gateway = MockChainGateway::new();
    gateway.expect_account().return_const(Some(ACCOUNT));
    gateway
}

fn workflow(
    gateway: MockChainGateway,
    validator: MockAutoMintValidator,
    refresher: MockSnapshotRefresher,
) -> TxWorkflow {
    TxWorkflow::new(
        Arc::new(gateway),
        Arc::new(validator),
        Arc::new(refresher),
        VAULT,
        STABLECOIN,
    )
}

fn silent_refresher() -> MockSnapshotRefresher {
    MockSnapshotRefresher::new()
}

fn refresher_expecting_one_refresh() -> MockSnapshotRefresher {
    let mut refresher = MockSnapshotRefresher::new();
    refresher.expect_refresh().times(1).returning(|_| ());
    refresher
}

// ============================================================================
// Validation failures stay local
// ============================================================================

#[cfg(test)]
mod validation {
    use super::*;

    #[tokio::test]
    async fn zero_amount_deposit_is_rejected_without_any_call() {
        let wf = workflow(
            connected_gateway(),
            MockAutoMintValidator::new(),
            silent_refresher(),
        );

        let result = wf.submit(request(ActionKind::Deposit, Some("0"))).await;

        assert!(matches!(result, Err(WorkflowError::InvalidAmount)));
        assert_eq!(wf.phase_trace(), vec![Phase::Validating, Phase::Failed]);
    }

    #[tokio::test]
    async fn non_numeric_amount_is_rejected_without_any_call() {
        let wf = workflow(
            connected_gateway(),
            MockAutoMintValidator::new(),
            silent_refresher(),
        );

        for bad in ["abc", "1e5", "-3", ""] {
            let result = wf.submit(request(ActionKind::Mint, Some(bad))).await;
            assert!(
                matches!(result, Err(WorkflowError::InvalidAmount)),
                "amount {:?} should be invalid",
                bad
            );
        }
    }

    #[tokio::test]
    async fn missing_amount_is_rejected_for_amount_taking_kinds() {
        let wf = workflow(
            connected_gateway(),
            MockAutoMintValidator::new(),
            silent_refresher(),
        );

        let result = wf.submit(request(ActionKind::Withdraw, None)).await;

        assert!(matches!(result, Err(WorkflowError::InvalidAmount)));
    }

    #[tokio::test]
    async fn missing_signer_fails_with_no_wallet() {
        let mut gateway = MockChainGateway::new();
        gateway.expect_account().returning(|| None);
        let wf = workflow(gateway, MockAutoMintValidator::new(), silent_refresher());

        let result = wf.submit(request(ActionKind::Deposit, Some("10"))).await;

        assert!(matches!(result, Err(WorkflowError::NoWallet)));
        assert_eq!(wf.phase_trace(), vec![Phase::Validating, Phase::Failed]);
    }
}

// ============================================================================
// Pre-flight balance checks
// ============================================================================

#[cfg(test)]
mod preflight {
    use super::*;

    #[tokio::test]
    async fn deposit_with_short_balance_issues_no_state_changing_call() {
        let mut gateway = connected_gateway();
        // 100 requested, 50 held; no approve/deposit expectations set, so
        // any submission would panic the mock.
        gateway
            .expect_token_balance()
            .withf(|token, owner| *token == WETH && *owner == ACCOUNT)
            .times(1)
            .returning(|_, _| Ok(U256::from(50_000_000u64)));

        let wf = workflow(gateway, MockAutoMintValidator::new(), silent_refresher());
        let result = wf.submit(request(ActionKind::Deposit, Some("100"))).await;

        assert!(matches!(result, Err(WorkflowError::InsufficientBalance)));
        assert_eq!(wf.phase_trace(), vec![Phase::Validating, Phase::Failed]);
    }

    #[tokio::test]
    async fn repay_checks_the_stablecoin_balance_not_the_collateral() {
        let mut gateway = connected_gateway();
        gateway
            .expect_token_balance()
            .withf(|token, owner| *token == STABLECOIN && *owner == ACCOUNT)
            .times(1)
            .returning(|_, _| Ok(U256::from(1u64)));

        let wf = workflow(gateway, MockAutoMintValidator::new(), silent_refresher());
        let result = wf.submit(request(ActionKind::Repay, Some("25"))).await;

        assert!(matches!(result, Err(WorkflowError::InsufficientBalance)));
    }
}

// ============================================================================
// Approve-then-act sequencing
// ============================================================================

#[cfg(test)]
mod sequencing {
    use super::*;

    #[tokio::test]
    async fn deposit_approves_before_depositing_and_refreshes_once() {
        let mut gateway = connected_gateway();
        let mut seq = Sequence::new();

        gateway
            .expect_token_balance()
            .times(1)
            .returning(|_, _| Ok(U256::from(100_000_000u64)));
        gateway
            .expect_token_allowance()
            .withf(|token, owner, spender| {
                *token == WETH && *owner == ACCOUNT && *spender == VAULT
            })
            .times(1)
            .returning(|_, _, _| Ok(U256::ZERO));
        gateway
            .expect_approve()
            .withf(|token, spender, amount| {
                *token == WETH && *spender == VAULT && *amount == U256::from(10_000_000u64)
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(hash(0x01)));
        gateway
            .expect_deposit_collateral()
            .withf(|collateral, amount| {
                *collateral == WETH && *amount == U256::from(10_000_000u64)
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(hash(0x02)));

        let wf = workflow(
            gateway,
            MockAutoMintValidator::new(),
            refresher_expecting_one_refresh(),
        );
        let result = wf.submit(request(ActionKind::Deposit, Some("10"))).await;

        assert_eq!(result.unwrap(), hash(0x02));
        assert_eq!(
            wf.phase_trace(),
            vec![
                Phase::Validating,
                Phase::AwaitingApproval,
                Phase::AwaitingPrimaryTx,
                Phase::Confirmed,
            ]
        );
    }

    #[tokio::test]
    async fn deposit_reuses_an_existing_sufficient_allowance() {
        let mut gateway = connected_gateway();
        gateway
            .expect_token_balance()
            .returning(|_, _| Ok(U256::from(100_000_000u64)));
        gateway
            .expect_token_allowance()
            .returning(|_, _, _| Ok(U256::from(10_000_000u64)));
        // no expect_approve: an approval submission would panic the mock
        gateway
            .expect_deposit_collateral()
            .times(1)
            .returning(|_, _| Ok(hash(0x02)));

        let wf = workflow(
            gateway,
            MockAutoMintValidator::new(),
            refresher_expecting_one_refresh(),
        );
        let result = wf.submit(request(ActionKind::Deposit, Some("10"))).await;

        assert!(result.is_ok());
        assert_eq!(
            wf.phase_trace(),
            vec![Phase::Validating, Phase::AwaitingPrimaryTx, Phase::Confirmed]
        );
    }

    #[tokio::test]
    async fn repay_approves_the_stablecoin_then_burns() {
        let mut gateway = connected_gateway();
        let mut seq = Sequence::new();

        gateway
            .expect_token_balance()
            .returning(|_, _| Ok(U256::from(50_000_000u64)));
        gateway
            .expect_token_allowance()
            .returning(|_, _, _| Ok(U256::ZERO));
        gateway
            .expect_approve()
            .withf(|token, spender, amount| {
                *token == STABLECOIN && *spender == VAULT && *amount == U256::from(25_000_000u64)
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(hash(0x03)));
        gateway
            .expect_burn_tokens()
            .withf(|collateral, amount| {
                *collateral == WETH && *amount == U256::from(25_000_000u64)
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(hash(0x04)));

        let wf = workflow(
            gateway,
            MockAutoMintValidator::new(),
            refresher_expecting_one_refresh(),
        );
        let result = wf.submit(request(ActionKind::Repay, Some("25"))).await;

        assert_eq!(result.unwrap(), hash(0x04));
    }

    #[tokio::test]
    async fn withdraw_and_mint_never_touch_allowances() {
        let mut gateway = connected_gateway();
        gateway
            .expect_withdraw_collateral()
            .times(1)
            .returning(|_, _| Ok(hash(0x05)));
        gateway
            .expect_mint_tokens()
            .times(1)
            .returning(|_, _| Ok(hash(0x06)));

        let mut refresher = MockSnapshotRefresher::new();
        refresher.expect_refresh().times(2).returning(|_| ());

        let wf = workflow(gateway, MockAutoMintValidator::new(), refresher);

        assert!(wf.submit(request(ActionKind::Withdraw, Some("1"))).await.is_ok());
        assert_eq!(
            wf.phase_trace(),
            vec![Phase::Validating, Phase::AwaitingPrimaryTx, Phase::Confirmed]
        );

        assert!(wf.submit(request(ActionKind::Mint, Some("1"))).await.is_ok());
    }

    #[tokio::test]
    async fn deposit_amount_uses_the_collateral_decimals() {
        let mut gateway = connected_gateway();
        let expected = U256::from(10u64) * U256::from(10u64).pow(U256::from(18u64));

        gateway
            .expect_token_balance()
            .returning(move |_, _| Ok(expected));
        gateway
            .expect_token_allowance()
            .returning(move |_, _, _| Ok(expected));
        gateway
            .expect_deposit_collateral()
            .withf(move |_, amount| *amount == expected)
            .times(1)
            .returning(|_, _| Ok(hash(0x07)));

        let wf = workflow(
            gateway,
            MockAutoMintValidator::new(),
            refresher_expecting_one_refresh(),
        );
        let request = ActionRequest {
            kind: ActionKind::Deposit,
            collateral: weth(18),
            amount: Some("10".to_string()),
        };

        assert!(wf.submit(request).await.is_ok());
    }
}

// ============================================================================
// Auto-mint eligibility
// ============================================================================

#[cfg(test)]
mod auto_mint {
    use super::*;

    #[tokio::test]
    async fn backend_rejection_aborts_with_its_reason_and_no_contract_call() {
        let mut validator = MockAutoMintValidator::new();
        validator.expect_validate_auto_mint().times(1).returning(|_| {
            Ok(AutoMintVerdict {
                eligible: false,
                reason: Some("cooldown active".to_string()),
            })
        });

        let wf = workflow(connected_gateway(), validator, silent_refresher());
        let result = wf.submit(request(ActionKind::AutoMint, None)).await;

        match result {
            Err(WorkflowError::AutoMintIneligible(reason)) => {
                assert!(reason.contains("cooldown active"));
            }
            other => panic!("unexpected outcome: {:?}", other.map(|_| ())),
        }
        assert_eq!(wf.phase_trace(), vec![Phase::Validating, Phase::Failed]);
    }

    #[tokio::test]
    async fn accepted_auto_mint_submits_without_an_amount() {
        let mut validator = MockAutoMintValidator::new();
        validator
            .expect_validate_auto_mint()
            .returning(|_| Ok(AutoMintVerdict { eligible: true, reason: None }));

        let mut gateway = connected_gateway();
        gateway
            .expect_auto_mint()
            .withf(|collateral| *collateral == WETH)
            .times(1)
            .returning(|_| Ok(hash(0x08)));

        let wf = workflow(gateway, validator, refresher_expecting_one_refresh());
        let result = wf.submit(request(ActionKind::AutoMint, None)).await;

        assert_eq!(result.unwrap(), hash(0x08));
    }
}

// ============================================================================
// Failure classification and refresh accounting
// ============================================================================

#[cfg(test)]
mod failures {
    use super::*;

    #[tokio::test]
    async fn stale_price_revert_is_classified_and_triggers_no_refresh() {
        let mut gateway = connected_gateway();
        gateway.expect_mint_tokens().returning(|_, _| {
            Err(GatewayError::Reverted("StalePrice()".to_string()))
        });

        // silent refresher: a refresh call would panic the mock
        let wf = workflow(gateway, MockAutoMintValidator::new(), silent_refresher());
        let result = wf.submit(request(ActionKind::Mint, Some("5"))).await;

        assert!(matches!(result, Err(WorkflowError::OraclePriceStale)));
        assert_eq!(
            wf.phase_trace(),
            vec![Phase::Validating, Phase::AwaitingPrimaryTx, Phase::Failed]
        );
    }

    #[tokio::test]
    async fn readable_revert_reason_is_surfaced_verbatim() {
        let mut gateway = connected_gateway();
        gateway
            .expect_withdraw_collateral()
            .returning(|_, _| Err(GatewayError::Reverted("exceeds free collateral".to_string())));

        let wf = workflow(gateway, MockAutoMintValidator::new(), silent_refresher());
        let result = wf.submit(request(ActionKind::Withdraw, Some("5"))).await;

        match result {
            Err(WorkflowError::ContractRejected(reason)) => {
                assert_eq!(reason, "exceeds free collateral");
            }
            other => panic!("unexpected outcome: {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn primary_call_failure_after_approval_does_not_refresh() {
        let mut gateway = connected_gateway();
        gateway
            .expect_token_balance()
            .returning(|_, _| Ok(U256::from(100_000_000u64)));
        gateway
            .expect_token_allowance()
            .returning(|_, _, _| Ok(U256::ZERO));
        gateway.expect_approve().returning(|_, _, _| Ok(hash(0x01)));
        gateway
            .expect_deposit_collateral()
            .returning(|_, _| Err(GatewayError::Estimation("out of gas".to_string())));

        let wf = workflow(gateway, MockAutoMintValidator::new(), silent_refresher());
        let result = wf.submit(request(ActionKind::Deposit, Some("10"))).await;

        assert!(matches!(result, Err(WorkflowError::GasEstimationFailed)));
        let trace = wf.phase_trace();
        assert_eq!(trace.last(), Some(&Phase::Failed));
    }
}

// ============================================================================
// Re-entrancy and detached completion
// ============================================================================

#[cfg(test)]
mod lifecycle {
    use super::*;

    /// Gateway whose primary call parks until released, so tests can observe
    /// the workflow mid-flight.
    struct BlockingGateway {
        release: tokio::sync::Notify,
    }

    impl BlockingGateway {
        fn new() -> Self {
            Self { release: tokio::sync::Notify::new() }
        }
    }

    #[async_trait]
    impl ChainGateway for BlockingGateway {
        fn account(&self) -> Option<Address> {
            Some(ACCOUNT)
        }

        async fn token_balance(&self, _: Address, _: Address) -> Result<U256, GatewayError> {
            Ok(U256::MAX)
        }

        async fn token_allowance(
            &self,
            _: Address,
            _: Address,
            _: Address,
        ) -> Result<U256, GatewayError> {
            Ok(U256::MAX)
        }

        async fn approve(&self, _: Address, _: Address, _: U256) -> Result<TxHash, GatewayError> {
            Ok(hash(0x01))
        }

        async fn deposit_collateral(
            &self,
            _: Address,
            _: U256,
        ) -> Result<TxHash, GatewayError> {
            self.release.notified().await;
            Ok(hash(0x02))
        }

        async fn withdraw_collateral(
            &self,
            _: Address,
            _: U256,
        ) -> Result<TxHash, GatewayError> {
            Ok(hash(0x03))
        }

        async fn mint_tokens(&self, _: Address, _: U256) -> Result<TxHash, GatewayError> {
            Ok(hash(0x04))
        }

        async fn burn_tokens(&self, _: Address, _: U256) -> Result<TxHash, GatewayError> {
            Ok(hash(0x05))
        }

        async fn auto_mint(&self, _: Address) -> Result<TxHash, GatewayError> {
            Ok(hash(0x06))
        }
    }

    #[tokio::test]
    async fn a_second_submission_is_refused_while_one_is_in_flight() {
        let gateway = Arc::new(BlockingGateway::new());
        let mut refresher = MockSnapshotRefresher::new();
        refresher.expect_refresh().times(1).returning(|_| ());

        let wf = Arc::new(TxWorkflow::new(
            gateway.clone(),
            Arc::new(MockAutoMintValidator::new()),
            Arc::new(refresher),
            VAULT,
            STABLECOIN,
        ));

        let mut status = wf.subscribe();
        let in_flight = wf.clone().spawn(request(ActionKind::Deposit, Some("10")));

        status
            .wait_for(|s| s.phase == Phase::AwaitingPrimaryTx)
            .await
            .expect("status channel closed early");

        let refused = wf.submit(request(ActionKind::Deposit, Some("10"))).await;
        assert!(matches!(refused, Err(WorkflowError::AlreadyInFlight)));

        gateway.release.notify_one();
        let result = in_flight.await.expect("workflow task panicked");
        assert_eq!(result.unwrap(), hash(0x02));
    }

    #[tokio::test]
    async fn completion_after_every_observer_is_gone_is_harmless() {
        let gateway = Arc::new(BlockingGateway::new());
        let mut refresher = MockSnapshotRefresher::new();
        refresher.expect_refresh().times(1).returning(|_| ());

        let wf = Arc::new(TxWorkflow::new(
            gateway.clone(),
            Arc::new(MockAutoMintValidator::new()),
            Arc::new(refresher),
            VAULT,
            STABLECOIN,
        ));

        let status = wf.subscribe();
        let in_flight = wf.clone().spawn(request(ActionKind::Deposit, Some("10")));

        // the view goes away before the submission resolves
        drop(status);
        gateway.release.notify_one();

        let result = in_flight.await.expect("workflow task panicked");
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn reset_returns_to_idle_between_invocations() {
        let mut gateway = connected_gateway();
        gateway
            .expect_withdraw_collateral()
            .returning(|_, _| Ok(hash(0x05)));

        let wf = workflow(
            gateway,
            MockAutoMintValidator::new(),
            refresher_expecting_one_refresh(),
        );

        assert!(wf.submit(request(ActionKind::Withdraw, Some("1"))).await.is_ok());
        assert_eq!(wf.status().phase, Phase::Confirmed);

        wf.reset();
        assert_eq!(wf.status().phase, Phase::Idle);
        assert!(wf.phase_trace().is_empty());
    }
}
