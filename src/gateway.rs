//! Contract gateways: typed capability traits over the on-chain surface.
//!
//! Each trait exposes exactly the remote functions the client consumes, one
//! trait per contract, with fixed signatures. Reads resolve to values; writes
//! resolve to the submitted transaction hash. Failures propagate unchanged as
//! [`RemoteCallError`] — no retries, no local recovery.

use alloy_primitives::{Address, TxHash, U256};
use alloy_provider::Provider;
use async_trait::async_trait;

use crate::contracts::{IMarketToken, IPaymentProcessor, Slab};

/// A contract invocation or transaction submission failed. Reverts and
/// transport failures surface as-is to the caller.
#[derive(Debug, thiserror::Error)]
pub enum RemoteCallError {
    #[error(transparent)]
    Contract(#[from] alloy_contract::Error),
    #[error(transparent)]
    Pending(#[from] alloy_provider::PendingTransactionError),
}

/// Remote surface of the marketplace token contract.
#[async_trait]
pub trait TokenGateway: Send + Sync {
    /// `approve(spender, amount)` — submits an allowance approval.
    async fn approve(&self, spender: Address, amount: U256) -> Result<TxHash, RemoteCallError>;

    /// `allowance(owner, spender)` — reads the current allowance in base units.
    async fn allowance(&self, owner: Address, spender: Address)
    -> Result<U256, RemoteCallError>;

    /// `balanceOf(account)` — reads the token balance in base units.
    async fn balance_of(&self, account: Address) -> Result<U256, RemoteCallError>;

    /// `getNonce(user)` — reads the meta-transaction replay-protection nonce.
    ///
    /// Returns `None` when the contract answers with empty data, which happens
    /// for first-time users without a nonce entry. Must be fetched immediately
    /// before use: a stale nonce invalidates the relayed transaction.
    async fn meta_nonce(&self, user: Address) -> Result<Option<U256>, RemoteCallError>;
}

/// Remote surface of the payment processing contract.
///
/// Administrative operations are restricted by on-chain access control, not by
/// this layer; they are plain pass-throughs.
#[async_trait]
pub trait ProcessorGateway: Send + Sync {
    async fn charge(&self, user: Address, amount: U256) -> Result<TxHash, RemoteCallError>;
    async fn charge_with_provider(
        &self,
        user: Address,
        amount: U256,
        provider: Address,
    ) -> Result<TxHash, RemoteCallError>;

    async fn update_underlying_token(&self, token: Address) -> Result<TxHash, RemoteCallError>;
    async fn update_escrow(&self, escrow: Address) -> Result<TxHash, RemoteCallError>;
    async fn update_feeder_address(&self, feeder: Address) -> Result<TxHash, RemoteCallError>;
    async fn update_staked_token(&self, token: Address) -> Result<TxHash, RemoteCallError>;
    async fn update_token(&self, token: Address) -> Result<TxHash, RemoteCallError>;
    async fn update_discount_slabs(
        &self,
        amounts: Vec<U256>,
        percents: Vec<U256>,
    ) -> Result<TxHash, RemoteCallError>;
    async fn change_build_time_rate(&self, rate: U256) -> Result<TxHash, RemoteCallError>;
    async fn enable_discounts(&self) -> Result<TxHash, RemoteCallError>;
    async fn disable_discounts(&self) -> Result<TxHash, RemoteCallError>;
    async fn set_governance_address(&self, governance: Address)
    -> Result<TxHash, RemoteCallError>;
    async fn set_managers(&self, managers: Vec<Address>) -> Result<TxHash, RemoteCallError>;

    async fn get_managers(&self) -> Result<Vec<Address>, RemoteCallError>;
    async fn governance_address(&self) -> Result<Address, RemoteCallError>;
    async fn underlying(&self) -> Result<Address, RemoteCallError>;
    async fn escrow(&self) -> Result<Address, RemoteCallError>;
    async fn discounts_enabled(&self) -> Result<bool, RemoteCallError>;
    async fn staking_manager(&self) -> Result<Address, RemoteCallError>;
    async fn staked_token(&self) -> Result<Address, RemoteCallError>;
    async fn discount_slabs(&self) -> Result<Vec<Slab>, RemoteCallError>;
}

/// [`TokenGateway`] over an alloy provider.
#[derive(Debug)]
pub struct EvmTokenGateway<P> {
    token: IMarketToken::IMarketTokenInstance<P>,
}

impl<P: Provider> EvmTokenGateway<P> {
    pub fn new(provider: P, address: Address) -> Self {
        Self {
            token: IMarketToken::new(address, provider),
        }
    }

    /// The token contract address this gateway is bound to.
    pub fn address(&self) -> Address {
        *self.token.address()
    }
}

#[async_trait]
impl<P: Provider> TokenGateway for EvmTokenGateway<P> {
    async fn approve(&self, spender: Address, amount: U256) -> Result<TxHash, RemoteCallError> {
        tracing::debug!(token = %self.address(), %spender, %amount, "submitting approve");
        let pending = self.token.approve(spender, amount).send().await?;
        Ok(pending.watch().await?)
    }

    async fn allowance(
        &self,
        owner: Address,
        spender: Address,
    ) -> Result<U256, RemoteCallError> {
        Ok(self.token.allowance(owner, spender).call().await?)
    }

    async fn balance_of(&self, account: Address) -> Result<U256, RemoteCallError> {
        Ok(self.token.balanceOf(account).call().await?)
    }

    async fn meta_nonce(&self, user: Address) -> Result<Option<U256>, RemoteCallError> {
        match self.token.getNonce(user).call().await {
            Ok(nonce) => Ok(Some(nonce)),
            // No nonce entry for this user yet.
            Err(alloy_contract::Error::ZeroData(_, _)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// [`ProcessorGateway`] over an alloy provider.
#[derive(Debug)]
pub struct EvmProcessorGateway<P> {
    processor: IPaymentProcessor::IPaymentProcessorInstance<P>,
}

impl<P: Provider> EvmProcessorGateway<P> {
    pub fn new(provider: P, address: Address) -> Self {
        Self {
            processor: IPaymentProcessor::new(address, provider),
        }
    }

    /// The payment processor contract address this gateway is bound to.
    pub fn address(&self) -> Address {
        *self.processor.address()
    }
}

#[async_trait]
impl<P: Provider> ProcessorGateway for EvmProcessorGateway<P> {
    async fn charge(&self, user: Address, amount: U256) -> Result<TxHash, RemoteCallError> {
        tracing::debug!(processor = %self.address(), %user, %amount, "submitting charge");
        let pending = self.processor.charge(user, amount).send().await?;
        Ok(pending.watch().await?)
    }

    async fn charge_with_provider(
        &self,
        user: Address,
        amount: U256,
        provider: Address,
    ) -> Result<TxHash, RemoteCallError> {
        tracing::debug!(
            processor = %self.address(),
            %user,
            %amount,
            %provider,
            "submitting chargeWithProvider"
        );
        let pending = self
            .processor
            .chargeWithProvider(user, amount, provider)
            .send()
            .await?;
        Ok(pending.watch().await?)
    }

    async fn update_underlying_token(&self, token: Address) -> Result<TxHash, RemoteCallError> {
        let pending = self.processor.updateUnderlyingToken(token).send().await?;
        Ok(pending.watch().await?)
    }

    async fn update_escrow(&self, escrow: Address) -> Result<TxHash, RemoteCallError> {
        let pending = self.processor.updateEscrow(escrow).send().await?;
        Ok(pending.watch().await?)
    }

    async fn update_feeder_address(&self, feeder: Address) -> Result<TxHash, RemoteCallError> {
        let pending = self.processor.updateFeederAddress(feeder).send().await?;
        Ok(pending.watch().await?)
    }

    async fn update_staked_token(&self, token: Address) -> Result<TxHash, RemoteCallError> {
        let pending = self.processor.updateStakedToken(token).send().await?;
        Ok(pending.watch().await?)
    }

    async fn update_token(&self, token: Address) -> Result<TxHash, RemoteCallError> {
        let pending = self.processor.updateToken(token).send().await?;
        Ok(pending.watch().await?)
    }

    async fn update_discount_slabs(
        &self,
        amounts: Vec<U256>,
        percents: Vec<U256>,
    ) -> Result<TxHash, RemoteCallError> {
        let pending = self
            .processor
            .updateDiscountSlabs(amounts, percents)
            .send()
            .await?;
        Ok(pending.watch().await?)
    }

    async fn change_build_time_rate(&self, rate: U256) -> Result<TxHash, RemoteCallError> {
        let pending = self.processor.changeBuildTimeRate(rate).send().await?;
        Ok(pending.watch().await?)
    }

    async fn enable_discounts(&self) -> Result<TxHash, RemoteCallError> {
        let pending = self.processor.enableDiscounts().send().await?;
        Ok(pending.watch().await?)
    }

    async fn disable_discounts(&self) -> Result<TxHash, RemoteCallError> {
        let pending = self.processor.disableDiscounts().send().await?;
        Ok(pending.watch().await?)
    }

    async fn set_governance_address(
        &self,
        governance: Address,
    ) -> Result<TxHash, RemoteCallError> {
        let pending = self.processor.setGovernanceAddress(governance).send().await?;
        Ok(pending.watch().await?)
    }

    async fn set_managers(&self, managers: Vec<Address>) -> Result<TxHash, RemoteCallError> {
        let pending = self.processor.setManagers(managers).send().await?;
        Ok(pending.watch().await?)
    }

    async fn get_managers(&self) -> Result<Vec<Address>, RemoteCallError> {
        Ok(self.processor.getManagers().call().await?)
    }

    async fn governance_address(&self) -> Result<Address, RemoteCallError> {
        Ok(self.processor.governanceAddress().call().await?)
    }

    async fn underlying(&self) -> Result<Address, RemoteCallError> {
        Ok(self.processor.underlying().call().await?)
    }

    async fn escrow(&self) -> Result<Address, RemoteCallError> {
        Ok(self.processor.escrow().call().await?)
    }

    async fn discounts_enabled(&self) -> Result<bool, RemoteCallError> {
        Ok(self.processor.discountsEnabled().call().await?)
    }

    async fn staking_manager(&self) -> Result<Address, RemoteCallError> {
        Ok(self.processor.stakingManager().call().await?)
    }

    async fn staked_token(&self) -> Result<Address, RemoteCallError> {
        Ok(self.processor.stakedToken().call().await?)
    }

    async fn discount_slabs(&self) -> Result<Vec<Slab>, RemoteCallError> {
        Ok(self.processor.discountSlabs().call().await?)
    }
}
