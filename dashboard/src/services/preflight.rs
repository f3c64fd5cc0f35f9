use alloy::primitives::{Address, U256};

use crate::chain::{ChainGateway, GatewayError};

/// Read-only checks issued before any state-changing submission, so a doomed
/// action never costs the user gas.
pub struct Preflight;

impl Preflight {
    /// Does `owner` hold at least `required` of `token`?
    pub async fn has_sufficient_balance(
        gateway: &dyn ChainGateway,
        token: Address,
        owner: Address,
        required: U256,
    ) -> Result<bool, GatewayError> {
        let balance = gateway.token_balance(token, owner).await?;
        tracing::debug!("balance check: have {}, need {}", balance, required);
        Ok(balance >= required)
    }

    /// Does the existing allowance for `spender` fall short of `amount`?
    ///
    /// An allowance at or above the requested amount satisfies the approval
    /// step; it is reused rather than re-granted.
    pub async fn needs_approval(
        gateway: &dyn ChainGateway,
        token: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<bool, GatewayError> {
        let allowance = gateway.token_allowance(token, owner, spender).await?;
        tracing::debug!("allowance check: granted {}, need {}", allowance, amount);
        Ok(allowance < amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::MockChainGateway;

    fn addr(b: u8) -> Address {
        Address::repeat_byte(b)
    }

    #[tokio::test]
    async fn balance_equal_to_required_is_sufficient() {
        let mut gateway = MockChainGateway::new();
        gateway
            .expect_token_balance()
            .returning(|_, _| Ok(U256::from(100u64)));

        let ok = Preflight::has_sufficient_balance(&gateway, addr(1), addr(2), U256::from(100u64))
            .await
            .unwrap();
        assert!(ok);
    }

    #[tokio::test]
    async fn balance_below_required_is_insufficient() {
        let mut gateway = MockChainGateway::new();
        gateway
            .expect_token_balance()
            .returning(|_, _| Ok(U256::from(99u64)));

        let ok = Preflight::has_sufficient_balance(&gateway, addr(1), addr(2), U256::from(100u64))
            .await
            .unwrap();
        assert!(!ok);
    }

    #[tokio::test]
    async fn allowance_covering_amount_skips_approval() {
        let mut gateway = MockChainGateway::new();
        gateway
            .expect_token_allowance()
            .returning(|_, _, _| Ok(U256::from(100u64)));

        let needs =
            Preflight::needs_approval(&gateway, addr(1), addr(2), addr(3), U256::from(100u64))
                .await
                .unwrap();
        assert!(!needs);
    }

    #[tokio::test]
    async fn short_allowance_requires_approval() {
        let mut gateway = MockChainGateway::new();
        gateway
            .expect_token_allowance()
            .returning(|_, _, _| Ok(U256::from(1u64)));

        let needs =
            Preflight::needs_approval(&gateway, addr(1), addr(2), addr(3), U256::from(100u64))
                .await
                .unwrap();
        assert!(needs);
    }
}
