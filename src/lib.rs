//! Payment-settlement client for a decentralized storage marketplace.
//!
//! This crate handles billing between storage users and the marketplace's
//! on-chain payment contracts: an ERC-20 marketplace token, a payment
//! processing contract, a gasless meta-transaction path through a relay, and
//! an external price-quote service.
//!
//! # Overview
//!
//! Users hold the marketplace token and approve the payment processor to
//! spend it; the marketplace charges them for storage through the processor.
//! Token amounts cross the API as human-decimal strings (`"10.5"`) and are
//! converted to base units at the configured precision on the way in, and
//! back on the way out.
//!
//! The centerpiece is the gasless path: instead of paying gas for an
//! `approve`, the user signs an EIP-712 meta-transaction payload binding
//! their current replay-protection nonce to the exact encoded call, and a
//! relay submits `executeMetaTransaction` on their behalf. Submission waits
//! for the relay to become ready without polling: one ready subscription
//! raced against one error subscription, resolved exactly once.
//!
//! # Modules
//!
//! - [`facade`] — [`PaymentFacade`](facade::PaymentFacade), the user-facing
//!   operation set, and [`PaymentError`](facade::PaymentError).
//! - [`gasless`] — the meta-transaction submission coordinator.
//! - [`relay`] — relay readiness states, one-shot event subscriptions, and the
//!   provider-backed relay.
//! - [`signer`] — signing capability and `(r, s, v)` signature decomposition.
//! - [`gateway`] — typed capability traits over the token and processor
//!   contracts.
//! - [`contracts`] — the Solidity interface declarations.
//! - [`units`] — decimal string <-> base-unit conversion.
//! - [`quote`] — HTTP client for the USD price-quote service.
//! - [`config`] — client configuration with environment-variable fallbacks.
//!
//! # Example
//!
//! ```no_run
//! use storpay::config::PaymentsConfig;
//! use storpay::facade::EvmPaymentFacade;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PaymentsConfig::load_from_path("storpay.json")?;
//! let chain_id = config.chain_id;
//! let key = "0x...".parse()?;
//! let payments = EvmPaymentFacade::connect(config, key);
//!
//! // Signal relay readiness from the transport layer, then submit gaslessly.
//! if let Some(relay) = payments.relay() {
//!     relay.notifier().mark_ready();
//! }
//! let tx = payments.gasless_approve("10.5", chain_id).await?;
//! println!("approved in {tx}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod contracts;
pub mod facade;
pub mod gasless;
pub mod gateway;
pub mod quote;
pub mod relay;
pub mod signer;
pub mod units;

pub use config::PaymentsConfig;
pub use facade::{ConfigurationError, EvmPaymentFacade, PaymentError, PaymentFacade};
pub use gasless::GaslessCoordinator;
pub use relay::{GaslessRelay, RelayClient, RelayError, RelayFault, RelayNotifier, RelayState};
pub use signer::{LocalSignerFacility, Rsv, SignedAuthorization, SignerFacility};
