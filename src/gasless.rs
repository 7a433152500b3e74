//! Gasless meta-transaction submission.
//!
//! [`GaslessCoordinator`] turns "submit this signed call without the user
//! paying gas" into a single asynchronous result, hiding the relay's two
//! readiness states behind one resolution:
//!
//! - relay ready: submit immediately, no event subscription at all;
//! - relay not ready: no polling — race one ready subscription against one
//!   error subscription and resolve with whichever fires first. The losing
//!   subscription is consumed with the race.
//!
//! The coordinator does not re-verify the signature triple: correctness of
//! `(user, nonce, encoded call, target, chain id)` binding is the caller's
//! responsibility. It applies no timeout; if the relay never signals either
//! transition the submission stays pending, and callers wanting a deadline
//! wrap the future themselves.

use alloy_primitives::{Address, Bytes, TxHash};

use crate::relay::{RelayClient, RelayError, RelayState};
use crate::signer::Rsv;

/// Orchestrates relay-readiness waiting and meta-transaction submission.
#[derive(Debug)]
pub struct GaslessCoordinator<R> {
    relay: R,
}

impl<R: RelayClient> GaslessCoordinator<R> {
    pub fn new(relay: R) -> Self {
        Self { relay }
    }

    /// The underlying relay, exposed for transport wiring.
    pub fn relay(&self) -> &R {
        &self.relay
    }

    /// Submits `executeMetaTransaction(user, encoded_call, r, s, v)` on the
    /// target contract once the relay is ready.
    ///
    /// Resolves exactly once: with the submission result if the relay is (or
    /// becomes) ready, or with the relay's error payload verbatim if the relay
    /// fails first. No retry in either case.
    pub async fn submit_gasless_call(
        &self,
        user: Address,
        encoded_call: Bytes,
        target: Address,
        rsv: &Rsv,
    ) -> Result<TxHash, RelayError> {
        match self.relay.state() {
            RelayState::Ready => {
                self.relay
                    .execute_meta_transaction(target, user, encoded_call, rsv)
                    .await
            }
            RelayState::NotReady => {
                tracing::debug!(%target, %user, "relay not ready, waiting for transition");
                let ready = self.relay.on_ready();
                let failed = self.relay.on_error();
                tokio::select! {
                    became_ready = ready => match became_ready {
                        Ok(()) => {
                            self.relay
                                .execute_meta_transaction(target, user, encoded_call, rsv)
                                .await
                        }
                        Err(_) => Err(RelayError::Disconnected),
                    },
                    fault = failed => match fault {
                        Ok(fault) => Err(RelayError::Faulted(fault)),
                        Err(_) => Err(RelayError::Disconnected),
                    },
                }
            }
        }
    }
}
