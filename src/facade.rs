//! User-facing payment operations.
//!
//! [`PaymentFacade`] composes the capability seams — token and processor
//! gateways, signer, relay, quote client — into the operation set callers use.
//! Non-gasless operations are direct single-call delegations with unit
//! conversion applied at the amount boundaries; the gasless path builds the
//! signed meta-transaction and delegates to [`GaslessCoordinator`].
//!
//! No retries anywhere: a contract revert, transport failure, or relay error
//! surfaces unchanged. The only fail-fast checks are for configuration
//! (relay credential, price-feed API key), performed before any network call.

use alloy_network::EthereumWallet;
use alloy_primitives::{Address, Bytes, TxHash, U256};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::{SolCall, SolStruct, eip712_domain};

use crate::config::PaymentsConfig;
use crate::contracts::{IMarketToken, MetaTransaction, Slab};
use crate::gasless::GaslessCoordinator;
use crate::gateway::{
    EvmProcessorGateway, EvmTokenGateway, ProcessorGateway, RemoteCallError, TokenGateway,
};
use crate::quote::{QuoteClient, QuoteError};
use crate::relay::{GaslessRelay, RelayClient, RelayError};
use crate::signer::{LocalSignerFacility, SignatureFormatError, SignerFacility};
use crate::units;

/// A required credential is absent. Detected before any network call.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("relay credential is not configured")]
    MissingRelayCredential,
    #[error("price feed API key is not configured")]
    MissingPriceFeedApiKey,
}

/// Facade-level error: every failure a payment operation can surface.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Units(#[from] alloy_primitives::utils::UnitsError),
    #[error(transparent)]
    RemoteCall(#[from] RemoteCallError),
    #[error(transparent)]
    Relay(#[from] RelayError),
    #[error(transparent)]
    Signer(#[from] alloy_signer::Error),
    #[error(transparent)]
    SignatureFormat(#[from] SignatureFormatError),
    #[error(transparent)]
    Quote(#[from] QuoteError),
}

/// The user-facing operation set of the payment-settlement client.
pub struct PaymentFacade<T, P, S, R> {
    config: PaymentsConfig,
    token: T,
    processor: P,
    signer: S,
    gasless: Option<GaslessCoordinator<R>>,
    quote: QuoteClient,
}

/// [`PaymentFacade`] over alloy providers and a local signing key.
pub type EvmPaymentFacade = PaymentFacade<
    EvmTokenGateway<DynProvider>,
    EvmProcessorGateway<DynProvider>,
    LocalSignerFacility,
    GaslessRelay<DynProvider>,
>;

impl EvmPaymentFacade {
    /// Builds a facade connected to the configured RPC endpoints.
    ///
    /// The gasless coordinator is constructed only when a relay credential is
    /// configured; its relay starts not-ready, and the embedding application
    /// signals readiness through the notifier exposed by
    /// [`relay`](PaymentFacade::relay).
    pub fn connect(config: PaymentsConfig, key: PrivateKeySigner) -> Self {
        let wallet = EthereumWallet::from(key.clone());
        let provider = ProviderBuilder::new()
            .wallet(wallet.clone())
            .connect_http(config.rpc_url.clone())
            .erased();
        let relay = config.relay_api_key.as_ref().map(|_| {
            let relay_url = config
                .relay_url
                .clone()
                .unwrap_or_else(|| config.rpc_url.clone());
            tracing::info!(%relay_url, "relay credential configured, enabling gasless path");
            let relay_provider = ProviderBuilder::new()
                .wallet(wallet)
                .connect_http(relay_url)
                .erased();
            GaslessRelay::new(relay_provider)
        });
        let token = EvmTokenGateway::new(provider.clone(), config.token_address);
        let processor = EvmProcessorGateway::new(provider, config.processor_address);
        let signer = LocalSignerFacility::new(key);
        Self::new(config, token, processor, signer, relay)
    }
}

impl<T, P, S, R> PaymentFacade<T, P, S, R>
where
    T: TokenGateway,
    P: ProcessorGateway,
    S: SignerFacility,
    R: RelayClient,
{
    pub fn new(
        config: PaymentsConfig,
        token: T,
        processor: P,
        signer: S,
        relay: Option<R>,
    ) -> Self {
        let quote = QuoteClient::new(config.quote_url.clone());
        Self {
            config,
            token,
            processor,
            signer,
            gasless: relay.map(GaslessCoordinator::new),
            quote,
        }
    }

    /// The gasless relay, when configured. Exposed so the embedding
    /// application can wire readiness transitions from its relay transport.
    pub fn relay(&self) -> Option<&R> {
        self.gasless.as_ref().map(GaslessCoordinator::relay)
    }

    // ------------------------------------------------------------------
    // Gasless path
    // ------------------------------------------------------------------

    /// Approves a token allowance for the payment processor via the gasless
    /// relay, so the user pays no gas.
    ///
    /// Fails immediately with a configuration error when no relay credential
    /// is configured — before touching the signer, any contract, or the relay.
    /// Steps are strictly sequential: each feeds the next, and any failure
    /// before submission aborts with no relay state created. The signing step
    /// may suspend for user interaction and cannot be cancelled mid-flight by
    /// this layer.
    pub async fn gasless_approve(
        &self,
        amount: &str,
        chain_id: u64,
    ) -> Result<TxHash, PaymentError> {
        let coordinator = self
            .gasless
            .as_ref()
            .ok_or(ConfigurationError::MissingRelayCredential)?;

        let value = units::to_base_units(amount, self.config.token_decimals)?;
        let encoded_call: Bytes = IMarketToken::approveCall {
            spender: self.config.processor_address,
            amount: value,
        }
        .abi_encode()
        .into();

        let caller = self.signer.address();
        // Fetched immediately before signing; never cached. A missing entry is
        // treated as nonce zero: the token contract has no entry yet for a
        // first-time user. Whether an absent entry can legitimately mean
        // anything else is an open question of the token contract's design.
        let nonce = self.token.meta_nonce(caller).await?.unwrap_or(U256::ZERO);

        let domain = eip712_domain! {
            name: self.config.eip712_name.clone(),
            version: self.config.eip712_version.clone(),
            chain_id: chain_id,
            verifying_contract: self.config.token_address,
        };
        let meta_transaction = MetaTransaction {
            nonce,
            from: caller,
            functionSignature: encoded_call.clone(),
        };
        let digest = meta_transaction.eip712_signing_hash(&domain);

        let signature = self.signer.sign_payload(digest).await?;
        let rsv = signature.decompose()?;

        tracing::info!(%caller, token = %self.config.token_address, %nonce, "submitting gasless approve");
        let hash = coordinator
            .submit_gasless_call(caller, encoded_call, self.config.token_address, &rsv)
            .await?;
        Ok(hash)
    }

    // ------------------------------------------------------------------
    // Token operations
    // ------------------------------------------------------------------

    /// Approves a token allowance for the payment processor, paying gas.
    pub async fn approve(&self, amount: &str) -> Result<TxHash, PaymentError> {
        let value = units::to_base_units(amount, self.config.token_decimals)?;
        Ok(self
            .token
            .approve(self.config.processor_address, value)
            .await?)
    }

    /// The caller's allowance toward the payment processor, as a decimal string.
    pub async fn allowance(&self, owner: Address) -> Result<String, PaymentError> {
        let raw = self
            .token
            .allowance(owner, self.config.processor_address)
            .await?;
        Ok(units::to_decimal(raw, self.config.token_decimals)?)
    }

    /// An account's token balance, as a decimal string.
    pub async fn balance_of(&self, account: Address) -> Result<String, PaymentError> {
        let raw = self.token.balance_of(account).await?;
        Ok(units::to_decimal(raw, self.config.token_decimals)?)
    }

    // ------------------------------------------------------------------
    // Billing operations
    // ------------------------------------------------------------------

    /// Charges a user for storage, amount in decimal tokens.
    pub async fn charge(&self, user: Address, amount: &str) -> Result<TxHash, PaymentError> {
        let value = units::to_base_units(amount, self.config.token_decimals)?;
        Ok(self.processor.charge(user, value).await?)
    }

    /// Charges a user with a storage-provider fee split.
    pub async fn charge_with_provider(
        &self,
        user: Address,
        amount: &str,
        provider: Address,
    ) -> Result<TxHash, PaymentError> {
        let value = units::to_base_units(amount, self.config.token_decimals)?;
        Ok(self
            .processor
            .charge_with_provider(user, value, provider)
            .await?)
    }

    // ------------------------------------------------------------------
    // Administrative pass-throughs (restricted by on-chain access control)
    // ------------------------------------------------------------------

    pub async fn update_underlying_token(&self, token: Address) -> Result<TxHash, PaymentError> {
        Ok(self.processor.update_underlying_token(token).await?)
    }

    pub async fn update_escrow(&self, escrow: Address) -> Result<TxHash, PaymentError> {
        Ok(self.processor.update_escrow(escrow).await?)
    }

    pub async fn update_feeder_address(&self, feeder: Address) -> Result<TxHash, PaymentError> {
        Ok(self.processor.update_feeder_address(feeder).await?)
    }

    pub async fn update_staked_token(&self, token: Address) -> Result<TxHash, PaymentError> {
        Ok(self.processor.update_staked_token(token).await?)
    }

    pub async fn update_token(&self, token: Address) -> Result<TxHash, PaymentError> {
        Ok(self.processor.update_token(token).await?)
    }

    /// Replaces the discount slabs. Thresholds are decimal token amounts;
    /// percents are whole percentages.
    pub async fn update_discount_slabs(
        &self,
        amounts: &[&str],
        percents: &[u64],
    ) -> Result<TxHash, PaymentError> {
        let amounts = units::to_base_units_many(amounts, self.config.token_decimals)?;
        let percents = percents.iter().copied().map(U256::from).collect();
        Ok(self.processor.update_discount_slabs(amounts, percents).await?)
    }

    pub async fn change_build_time_rate(&self, rate: U256) -> Result<TxHash, PaymentError> {
        Ok(self.processor.change_build_time_rate(rate).await?)
    }

    pub async fn enable_discounts(&self) -> Result<TxHash, PaymentError> {
        Ok(self.processor.enable_discounts().await?)
    }

    pub async fn disable_discounts(&self) -> Result<TxHash, PaymentError> {
        Ok(self.processor.disable_discounts().await?)
    }

    pub async fn set_governance_address(
        &self,
        governance: Address,
    ) -> Result<TxHash, PaymentError> {
        Ok(self.processor.set_governance_address(governance).await?)
    }

    pub async fn set_managers(&self, managers: Vec<Address>) -> Result<TxHash, PaymentError> {
        Ok(self.processor.set_managers(managers).await?)
    }

    // ------------------------------------------------------------------
    // Read pass-throughs
    // ------------------------------------------------------------------

    pub async fn get_managers(&self) -> Result<Vec<Address>, PaymentError> {
        Ok(self.processor.get_managers().await?)
    }

    pub async fn governance_address(&self) -> Result<Address, PaymentError> {
        Ok(self.processor.governance_address().await?)
    }

    pub async fn underlying(&self) -> Result<Address, PaymentError> {
        Ok(self.processor.underlying().await?)
    }

    pub async fn escrow(&self) -> Result<Address, PaymentError> {
        Ok(self.processor.escrow().await?)
    }

    pub async fn discounts_enabled(&self) -> Result<bool, PaymentError> {
        Ok(self.processor.discounts_enabled().await?)
    }

    pub async fn staking_manager(&self) -> Result<Address, PaymentError> {
        Ok(self.processor.staking_manager().await?)
    }

    pub async fn staked_token(&self) -> Result<Address, PaymentError> {
        Ok(self.processor.staked_token().await?)
    }

    pub async fn discount_slabs(&self) -> Result<Vec<Slab>, PaymentError> {
        Ok(self.processor.discount_slabs().await?)
    }

    // ------------------------------------------------------------------
    // Price quotes
    // ------------------------------------------------------------------

    /// The current USD quote for the given token id.
    pub async fn token_quote(&self, token_id: &str) -> Result<f64, PaymentError> {
        let api_key = self
            .config
            .price_feed_api_key
            .as_deref()
            .ok_or(ConfigurationError::MissingPriceFeedApiKey)?;
        Ok(self.quote.token_quote(token_id, api_key).await?)
    }

    /// The USD value of a token amount for the given token id.
    pub async fn token_to_usd(&self, amount: f64, token_id: &str) -> Result<f64, PaymentError> {
        let api_key = self
            .config
            .price_feed_api_key
            .as_deref()
            .ok_or(ConfigurationError::MissingPriceFeedApiKey)?;
        Ok(self.quote.token_to_usd(amount, token_id, api_key).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::{RelayFault, RelayNotifier, RelayState};
    use crate::signer::{SignedAuthorization, SignerFacility};
    use alloy_primitives::{B256, Signature};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::oneshot;

    fn token_address() -> Address {
        Address::repeat_byte(0x11)
    }

    fn processor_address() -> Address {
        Address::repeat_byte(0x22)
    }

    fn config(price_feed_api_key: Option<&str>) -> PaymentsConfig {
        serde_json::from_value(serde_json::json!({
            "chain_id": 137,
            "rpc_url": "http://localhost:1/",
            "token_address": token_address(),
            "processor_address": processor_address(),
            "token_decimals": 18,
            "eip712_name": "StorageMarketToken",
            "eip712_version": "1",
            "price_feed_api_key": price_feed_api_key,
            "quote_url": "http://localhost:1/"
        }))
        .unwrap()
    }

    #[derive(Default)]
    struct MockToken {
        balance: U256,
        allowance: U256,
        nonce: Option<U256>,
        approvals: Mutex<Vec<(Address, U256)>>,
        nonce_queries: AtomicUsize,
    }

    #[async_trait]
    impl TokenGateway for MockToken {
        async fn approve(
            &self,
            spender: Address,
            amount: U256,
        ) -> Result<TxHash, RemoteCallError> {
            self.approvals.lock().unwrap().push((spender, amount));
            Ok(TxHash::repeat_byte(0x0a))
        }

        async fn allowance(&self, _: Address, _: Address) -> Result<U256, RemoteCallError> {
            Ok(self.allowance)
        }

        async fn balance_of(&self, _: Address) -> Result<U256, RemoteCallError> {
            Ok(self.balance)
        }

        async fn meta_nonce(&self, _: Address) -> Result<Option<U256>, RemoteCallError> {
            self.nonce_queries.fetch_add(1, Ordering::SeqCst);
            Ok(self.nonce)
        }
    }

    #[derive(Default)]
    struct MockProcessor {
        charges: Mutex<Vec<(Address, U256)>>,
        slab_updates: Mutex<Vec<(Vec<U256>, Vec<U256>)>>,
    }

    #[async_trait]
    impl ProcessorGateway for MockProcessor {
        async fn charge(&self, user: Address, amount: U256) -> Result<TxHash, RemoteCallError> {
            self.charges.lock().unwrap().push((user, amount));
            Ok(TxHash::repeat_byte(0x0c))
        }

        async fn charge_with_provider(
            &self,
            user: Address,
            amount: U256,
            _provider: Address,
        ) -> Result<TxHash, RemoteCallError> {
            self.charges.lock().unwrap().push((user, amount));
            Ok(TxHash::repeat_byte(0x0c))
        }

        async fn update_underlying_token(&self, _: Address) -> Result<TxHash, RemoteCallError> {
            Ok(TxHash::ZERO)
        }

        async fn update_escrow(&self, _: Address) -> Result<TxHash, RemoteCallError> {
            Ok(TxHash::ZERO)
        }

        async fn update_feeder_address(&self, _: Address) -> Result<TxHash, RemoteCallError> {
            Ok(TxHash::ZERO)
        }

        async fn update_staked_token(&self, _: Address) -> Result<TxHash, RemoteCallError> {
            Ok(TxHash::ZERO)
        }

        async fn update_token(&self, _: Address) -> Result<TxHash, RemoteCallError> {
            Ok(TxHash::ZERO)
        }

        async fn update_discount_slabs(
            &self,
            amounts: Vec<U256>,
            percents: Vec<U256>,
        ) -> Result<TxHash, RemoteCallError> {
            self.slab_updates.lock().unwrap().push((amounts, percents));
            Ok(TxHash::ZERO)
        }

        async fn change_build_time_rate(&self, _: U256) -> Result<TxHash, RemoteCallError> {
            Ok(TxHash::ZERO)
        }

        async fn enable_discounts(&self) -> Result<TxHash, RemoteCallError> {
            Ok(TxHash::ZERO)
        }

        async fn disable_discounts(&self) -> Result<TxHash, RemoteCallError> {
            Ok(TxHash::ZERO)
        }

        async fn set_governance_address(&self, _: Address) -> Result<TxHash, RemoteCallError> {
            Ok(TxHash::ZERO)
        }

        async fn set_managers(&self, _: Vec<Address>) -> Result<TxHash, RemoteCallError> {
            Ok(TxHash::ZERO)
        }

        async fn get_managers(&self) -> Result<Vec<Address>, RemoteCallError> {
            Ok(vec![])
        }

        async fn governance_address(&self) -> Result<Address, RemoteCallError> {
            Ok(Address::ZERO)
        }

        async fn underlying(&self) -> Result<Address, RemoteCallError> {
            Ok(Address::ZERO)
        }

        async fn escrow(&self) -> Result<Address, RemoteCallError> {
            Ok(Address::ZERO)
        }

        async fn discounts_enabled(&self) -> Result<bool, RemoteCallError> {
            Ok(false)
        }

        async fn staking_manager(&self) -> Result<Address, RemoteCallError> {
            Ok(Address::ZERO)
        }

        async fn staked_token(&self) -> Result<Address, RemoteCallError> {
            Ok(Address::ZERO)
        }

        async fn discount_slabs(&self) -> Result<Vec<Slab>, RemoteCallError> {
            Ok(vec![])
        }
    }

    struct CountingSigner {
        inner: LocalSignerFacility,
        sign_calls: AtomicUsize,
    }

    impl CountingSigner {
        fn random() -> Self {
            Self {
                inner: LocalSignerFacility::new(PrivateKeySigner::random()),
                sign_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SignerFacility for CountingSigner {
        fn address(&self) -> Address {
            self.inner.address()
        }

        async fn sign_payload(
            &self,
            digest: B256,
        ) -> Result<SignedAuthorization, alloy_signer::Error> {
            self.sign_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.sign_payload(digest).await
        }
    }

    #[derive(Default)]
    struct MockRelay {
        notifier: RelayNotifier,
        submissions: Mutex<Vec<(Address, Address, Bytes, crate::signer::Rsv)>>,
    }

    impl MockRelay {
        fn ready() -> Self {
            let relay = Self::default();
            relay.notifier.mark_ready();
            relay
        }
    }

    #[async_trait]
    impl RelayClient for MockRelay {
        fn state(&self) -> RelayState {
            self.notifier.state()
        }

        fn on_ready(&self) -> oneshot::Receiver<()> {
            self.notifier.on_ready()
        }

        fn on_error(&self) -> oneshot::Receiver<RelayFault> {
            self.notifier.on_error()
        }

        async fn execute_meta_transaction(
            &self,
            target: Address,
            user: Address,
            call: Bytes,
            rsv: &crate::signer::Rsv,
        ) -> Result<TxHash, RelayError> {
            self.submissions
                .lock()
                .unwrap()
                .push((target, user, call, *rsv));
            Ok(TxHash::repeat_byte(0xab))
        }
    }

    fn facade(
        token: MockToken,
        relay: Option<std::sync::Arc<MockRelay>>,
        price_feed_api_key: Option<&str>,
    ) -> PaymentFacade<MockToken, MockProcessor, CountingSigner, std::sync::Arc<MockRelay>> {
        PaymentFacade::new(
            config(price_feed_api_key),
            token,
            MockProcessor::default(),
            CountingSigner::random(),
            relay,
        )
    }

    fn signing_digest(nonce: U256, from: Address, call: &Bytes) -> B256 {
        let domain = eip712_domain! {
            name: "StorageMarketToken",
            version: "1",
            chain_id: 137,
            verifying_contract: token_address(),
        };
        MetaTransaction {
            nonce,
            from,
            functionSignature: call.clone(),
        }
        .eip712_signing_hash(&domain)
    }

    fn recover(rsv: &crate::signer::Rsv, digest: B256) -> Address {
        Signature::new(
            U256::from_be_bytes(rsv.r.0),
            U256::from_be_bytes(rsv.s.0),
            rsv.v == 28,
        )
        .recover_address_from_prehash(&digest)
        .unwrap()
    }

    #[tokio::test]
    async fn gasless_approve_without_credential_fails_before_any_call() {
        let facade = facade(MockToken::default(), None, None);

        let err = facade.gasless_approve("10.5", 137).await.unwrap_err();

        assert!(matches!(
            err,
            PaymentError::Configuration(ConfigurationError::MissingRelayCredential)
        ));
        assert_eq!(facade.token.nonce_queries.load(Ordering::SeqCst), 0);
        assert_eq!(facade.signer.sign_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn gasless_approve_submits_signed_approve_call() {
        let relay = std::sync::Arc::new(MockRelay::ready());
        let token = MockToken {
            nonce: Some(U256::from(7)),
            ..MockToken::default()
        };
        let facade = facade(token, Some(std::sync::Arc::clone(&relay)), None);
        let caller = facade.signer.address();

        let hash = facade.gasless_approve("10.5", 137).await.unwrap();
        assert_eq!(hash, TxHash::repeat_byte(0xab));

        let submissions = relay.submissions.lock().unwrap();
        let (target, user, call, rsv) = &submissions[0];
        assert_eq!(*target, token_address());
        assert_eq!(*user, caller);

        let expected_call: Bytes = IMarketToken::approveCall {
            spender: processor_address(),
            amount: U256::from(10_500_000_000_000_000_000u128),
        }
        .abi_encode()
        .into();
        assert_eq!(*call, expected_call);

        // The signature must verify over the payload binding the fetched nonce.
        let digest = signing_digest(U256::from(7), caller, call);
        assert_eq!(recover(rsv, digest), caller);
    }

    #[tokio::test]
    async fn gasless_approve_defaults_missing_nonce_to_zero() {
        let relay = std::sync::Arc::new(MockRelay::ready());
        let token = MockToken {
            nonce: None,
            ..MockToken::default()
        };
        let facade = facade(token, Some(std::sync::Arc::clone(&relay)), None);
        let caller = facade.signer.address();

        facade.gasless_approve("1", 137).await.unwrap();

        let submissions = relay.submissions.lock().unwrap();
        let (_, _, call, rsv) = &submissions[0];
        let digest = signing_digest(U256::ZERO, caller, call);
        assert_eq!(recover(rsv, digest), caller);
        assert_eq!(facade.token.nonce_queries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn charge_converts_decimal_amount_to_base_units() {
        let facade = facade(MockToken::default(), None, None);
        let user = Address::repeat_byte(0x33);

        facade.charge(user, "10.5").await.unwrap();

        let charges = facade.processor.charges.lock().unwrap();
        assert_eq!(
            charges[0],
            (user, U256::from(10_500_000_000_000_000_000u128))
        );
    }

    #[tokio::test]
    async fn balances_and_allowances_read_back_as_decimals() {
        let token = MockToken {
            balance: U256::from(10_500_000_000_000_000_000u128),
            allowance: U256::from(2_000_000_000_000_000_000u128),
            ..MockToken::default()
        };
        let facade = facade(token, None, None);

        let account = Address::repeat_byte(0x33);
        assert_eq!(facade.balance_of(account).await.unwrap(), "10.5");
        assert_eq!(facade.allowance(account).await.unwrap(), "2");
    }

    #[tokio::test]
    async fn approve_targets_the_processor() {
        let facade = facade(MockToken::default(), None, None);

        facade.approve("3").await.unwrap();

        let approvals = facade.token.approvals.lock().unwrap();
        assert_eq!(
            approvals[0],
            (
                processor_address(),
                U256::from(3_000_000_000_000_000_000u128)
            )
        );
    }

    #[tokio::test]
    async fn discount_slab_amounts_are_converted() {
        let facade = facade(MockToken::default(), None, None);

        facade
            .update_discount_slabs(&["1", "2.5"], &[5, 10])
            .await
            .unwrap();

        let updates = facade.processor.slab_updates.lock().unwrap();
        let (amounts, percents) = &updates[0];
        assert_eq!(
            *amounts,
            vec![
                U256::from(1_000_000_000_000_000_000u128),
                U256::from(2_500_000_000_000_000_000u128)
            ]
        );
        assert_eq!(*percents, vec![U256::from(5), U256::from(10)]);
    }

    #[tokio::test]
    async fn quotes_require_an_api_key() {
        let facade = facade(MockToken::default(), None, None);

        let err = facade.token_quote("storage-token").await.unwrap_err();
        assert!(matches!(
            err,
            PaymentError::Configuration(ConfigurationError::MissingPriceFeedApiKey)
        ));

        let err = facade.token_to_usd(10.0, "storage-token").await.unwrap_err();
        assert!(matches!(
            err,
            PaymentError::Configuration(ConfigurationError::MissingPriceFeedApiKey)
        ));
    }

    #[tokio::test]
    async fn malformed_amount_is_rejected_before_submission() {
        let facade = facade(MockToken::default(), None, None);

        let err = facade
            .charge(Address::repeat_byte(0x33), "ten and a half")
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::Units(_)));
        assert!(facade.processor.charges.lock().unwrap().is_empty());
    }
}
