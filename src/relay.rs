//! Gasless relay abstraction: readiness state and one-shot event subscriptions.
//!
//! A relay connection has two observable states, ready and not-ready-yet, and
//! reports exactly one of two transitions: it became ready, or it failed. Both
//! transitions feed [`RelayNotifier`], a resolve-once primitive: the first
//! transition fires its subscribers, every later transition is a no-op. A
//! subscriber therefore sees at most one event per subscription, even when both
//! transitions are signaled in the same scheduling tick.
//!
//! No timeout is enforced here: if the relay never signals either transition,
//! subscriptions stay pending. Callers wrap the wait in their own deadline.

use alloy_primitives::{Address, Bytes, TxHash};
use alloy_provider::Provider;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

use crate::contracts::IMarketToken;
use crate::gateway::RemoteCallError;
use crate::signer::Rsv;

/// Observable relay readiness. A failed relay is reported through the error
/// subscription, not through this state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Ready,
    NotReady,
}

/// Error payload reported by the relay, carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayFault(pub String);

/// Gasless submission failed.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The relay reported an error before becoming ready. The payload is the
    /// relay's own, unwrapped; the caller must not assume the transaction was
    /// or was not broadcast.
    #[error("{}", .0.0)]
    Faulted(RelayFault),
    /// The relay was dropped without signaling either transition.
    #[error("relay subscription channel closed")]
    Disconnected,
    /// The meta-transaction submission itself failed.
    #[error(transparent)]
    Submit(#[from] RemoteCallError),
}

/// The relay surface consumed by the gasless coordinator: a synchronous state
/// query, one-shot ready/error subscriptions, and the relay-bound
/// `executeMetaTransaction` call.
#[async_trait]
pub trait RelayClient: Send + Sync {
    /// Current readiness, queried synchronously at the moment of submission.
    fn state(&self) -> RelayState;

    /// Subscribes to the ready transition. Fires at most once; fires
    /// immediately if the relay is already ready.
    fn on_ready(&self) -> oneshot::Receiver<()>;

    /// Subscribes to the error transition. Fires at most once; fires
    /// immediately if the relay has already failed.
    fn on_error(&self) -> oneshot::Receiver<RelayFault>;

    /// Submits `executeMetaTransaction(user, call, r, s, v)` on the target
    /// contract through the relay-bound provider.
    async fn execute_meta_transaction(
        &self,
        target: Address,
        user: Address,
        call: Bytes,
        rsv: &Rsv,
    ) -> Result<TxHash, RelayError>;
}

#[async_trait]
impl<T: RelayClient> RelayClient for Arc<T> {
    fn state(&self) -> RelayState {
        self.as_ref().state()
    }

    fn on_ready(&self) -> oneshot::Receiver<()> {
        self.as_ref().on_ready()
    }

    fn on_error(&self) -> oneshot::Receiver<RelayFault> {
        self.as_ref().on_error()
    }

    async fn execute_meta_transaction(
        &self,
        target: Address,
        user: Address,
        call: Bytes,
        rsv: &Rsv,
    ) -> Result<TxHash, RelayError> {
        self.as_ref()
            .execute_meta_transaction(target, user, call, rsv)
            .await
    }
}

#[derive(Debug)]
enum Resolution {
    Pending,
    Ready,
    Failed(RelayFault),
}

#[derive(Debug)]
struct NotifierInner {
    resolution: Resolution,
    ready_listeners: Vec<oneshot::Sender<()>>,
    error_listeners: Vec<oneshot::Sender<RelayFault>>,
}

/// Resolve-once readiness tracker.
///
/// The first of `mark_ready` / `mark_failed` wins and fires the matching
/// subscribers; the losing side's subscribers are kept alive but never fired,
/// so a waiter racing both subscriptions observes exactly one event.
#[derive(Debug)]
pub struct RelayNotifier {
    inner: Mutex<NotifierInner>,
}

impl Default for RelayNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayNotifier {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(NotifierInner {
                resolution: Resolution::Pending,
                ready_listeners: Vec::new(),
                error_listeners: Vec::new(),
            }),
        }
    }

    pub fn state(&self) -> RelayState {
        let inner = self.inner.lock().expect("relay notifier lock poisoned");
        match inner.resolution {
            Resolution::Ready => RelayState::Ready,
            Resolution::Pending | Resolution::Failed(_) => RelayState::NotReady,
        }
    }

    pub fn on_ready(&self) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        let mut guard = self.inner.lock().expect("relay notifier lock poisoned");
        let inner = &mut *guard;
        match inner.resolution {
            Resolution::Ready => {
                let _ = tx.send(());
            }
            Resolution::Pending => inner.ready_listeners.push(tx),
            // Resolved against ready: hold the sender so the receiver stays
            // pending instead of observing a closed channel.
            Resolution::Failed(_) => inner.ready_listeners.push(tx),
        }
        rx
    }

    pub fn on_error(&self) -> oneshot::Receiver<RelayFault> {
        let (tx, rx) = oneshot::channel();
        let mut guard = self.inner.lock().expect("relay notifier lock poisoned");
        let inner = &mut *guard;
        match &inner.resolution {
            Resolution::Failed(fault) => {
                let _ = tx.send(fault.clone());
            }
            Resolution::Pending => inner.error_listeners.push(tx),
            Resolution::Ready => inner.error_listeners.push(tx),
        }
        rx
    }

    /// Signals the ready transition. A no-op if the relay already resolved.
    pub fn mark_ready(&self) {
        let mut inner = self.inner.lock().expect("relay notifier lock poisoned");
        if !matches!(inner.resolution, Resolution::Pending) {
            return;
        }
        inner.resolution = Resolution::Ready;
        tracing::info!("relay ready");
        for listener in inner.ready_listeners.drain(..) {
            let _ = listener.send(());
        }
    }

    /// Signals the error transition with the relay's payload. A no-op if the
    /// relay already resolved.
    pub fn mark_failed(&self, fault: RelayFault) {
        let mut inner = self.inner.lock().expect("relay notifier lock poisoned");
        if !matches!(inner.resolution, Resolution::Pending) {
            return;
        }
        tracing::warn!(payload = %fault.0, "relay failed");
        for listener in inner.error_listeners.drain(..) {
            let _ = listener.send(fault.clone());
        }
        inner.resolution = Resolution::Failed(fault);
    }
}

/// Production relay: a [`RelayNotifier`] plus the relay-bound provider that
/// carries `executeMetaTransaction` submissions.
///
/// The embedding application wires its relay transport to
/// [`notifier`](Self::notifier): signal `mark_ready` once the relay session is
/// established, `mark_failed` with the transport's payload if it is not.
#[derive(Debug)]
pub struct GaslessRelay<P> {
    notifier: Arc<RelayNotifier>,
    provider: P,
}

impl<P: Provider> GaslessRelay<P> {
    pub fn new(provider: P) -> Self {
        Self {
            notifier: Arc::new(RelayNotifier::new()),
            provider,
        }
    }

    /// Handle for signaling readiness transitions from the transport layer.
    pub fn notifier(&self) -> Arc<RelayNotifier> {
        Arc::clone(&self.notifier)
    }
}

#[async_trait]
impl<P: Provider> RelayClient for GaslessRelay<P> {
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
        rsv: &Rsv,
    ) -> Result<TxHash, RelayError> {
        tracing::debug!(%target, %user, "submitting meta-transaction through relay");
        let contract = IMarketToken::new(target, &self.provider);
        let pending = contract
            .executeMetaTransaction(user, call, rsv.r, rsv.s, rsv.v)
            .send()
            .await
            .map_err(RemoteCallError::from)?;
        let hash = pending.watch().await.map_err(RemoteCallError::from)?;
        Ok(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ready_transition_fires_pending_subscribers_once() {
        let notifier = RelayNotifier::new();
        let rx = notifier.on_ready();
        assert_eq!(notifier.state(), RelayState::NotReady);

        notifier.mark_ready();
        assert_eq!(notifier.state(), RelayState::Ready);
        rx.await.unwrap();
    }

    #[tokio::test]
    async fn subscribing_after_ready_fires_immediately() {
        let notifier = RelayNotifier::new();
        notifier.mark_ready();
        notifier.on_ready().await.unwrap();
    }

    #[tokio::test]
    async fn error_transition_carries_payload_verbatim() {
        let notifier = RelayNotifier::new();
        let rx = notifier.on_error();
        notifier.mark_failed(RelayFault("relay down".to_string()));
        assert_eq!(rx.await.unwrap(), RelayFault("relay down".to_string()));
    }

    #[tokio::test]
    async fn first_transition_wins() {
        let notifier = RelayNotifier::new();
        let ready_rx = notifier.on_ready();
        let error_rx = notifier.on_error();

        notifier.mark_ready();
        notifier.mark_failed(RelayFault("late".to_string()));

        ready_rx.await.unwrap();
        // The losing side's sender is retained unfired, so its receiver is
        // still pending rather than closed.
        let mut error_rx = error_rx;
        assert!(matches!(
            error_rx.try_recv(),
            Err(oneshot::error::TryRecvError::Empty)
        ));
        assert_eq!(notifier.state(), RelayState::Ready);
    }

    #[tokio::test]
    async fn failure_then_ready_is_a_noop() {
        let notifier = RelayNotifier::new();
        let error_rx = notifier.on_error();

        notifier.mark_failed(RelayFault("relay down".to_string()));
        notifier.mark_ready();

        assert_eq!(error_rx.await.unwrap().0, "relay down");
        assert_eq!(notifier.state(), RelayState::NotReady);
    }

    #[test]
    fn faulted_error_displays_payload_unwrapped() {
        let err = RelayError::Faulted(RelayFault("relay down".to_string()));
        assert_eq!(err.to_string(), "relay down");
    }
}
