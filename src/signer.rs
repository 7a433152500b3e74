//! Message signing and signature decomposition.
//!
//! The gasless path needs two capabilities from a signer: produce a signature
//! over an EIP-712 digest (possibly suspending for user interaction, e.g. a
//! wallet confirmation prompt), and report the signer's address. Decomposition
//! of a signature into its `(r, s, v)` components is a pure function of the
//! signature string and lives on [`SignedAuthorization`] itself.

use alloy_primitives::{Address, B256, hex};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use std::sync::Arc;

/// The `(r, s, v)` triple of an ECDSA signature, as consumed by
/// `executeMetaTransaction` for on-chain verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rsv {
    /// The 32-byte `r` value.
    pub r: B256,
    /// The 32-byte `s` value.
    pub s: B256,
    /// The recovery byte, in Electrum notation (27 or 28).
    pub v: u8,
}

/// An opaque signature string as produced by a signer.
///
/// Stored as 0x-prefixed hex of the 65-byte `r || s || v` encoding. The value
/// is write-once: it is produced by [`SignerFacility::sign_payload`] and
/// decomposed (never mutated) before submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedAuthorization(String);

/// Error decomposing a signature string into its `(r, s, v)` components.
#[derive(Debug, thiserror::Error)]
pub enum SignatureFormatError {
    #[error("signature is not valid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("signature must be 65 bytes, got {0}")]
    InvalidLength(usize),
}

impl SignedAuthorization {
    /// Wraps a raw signature string. The string is validated lazily, on
    /// [`decompose`](Self::decompose).
    pub fn new(signature: impl Into<String>) -> Self {
        Self(signature.into())
    }

    /// Returns the signature string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits the signature into its `(r, s, v)` triple.
    ///
    /// This is a pure function of the signature string: the same input always
    /// yields the same triple. A recovery byte of 0 or 1 is normalized to
    /// Electrum notation (27 or 28), which is what the verifying contracts
    /// expect.
    pub fn decompose(&self) -> Result<Rsv, SignatureFormatError> {
        let bytes = hex::decode(&self.0)?;
        if bytes.len() != 65 {
            return Err(SignatureFormatError::InvalidLength(bytes.len()));
        }
        let r = B256::from_slice(&bytes[0..32]);
        let s = B256::from_slice(&bytes[32..64]);
        let mut v = bytes[64];
        if v < 27 {
            v += 27;
        }
        Ok(Rsv { r, s, v })
    }
}

impl From<alloy_primitives::Signature> for SignedAuthorization {
    fn from(signature: alloy_primitives::Signature) -> Self {
        Self(hex::encode_prefixed(signature.as_bytes()))
    }
}

/// Signing capability consumed by the payment flows.
///
/// Implementations may suspend in [`sign_payload`](Self::sign_payload) while
/// waiting for user interaction; the flows treat that step as uncancellable.
#[async_trait]
pub trait SignerFacility: Send + Sync {
    /// The address of the signing key.
    fn address(&self) -> Address;

    /// Signs a 32-byte digest and returns the opaque signature string.
    async fn sign_payload(&self, digest: B256)
    -> Result<SignedAuthorization, alloy_signer::Error>;
}

#[async_trait]
impl<T: SignerFacility> SignerFacility for Arc<T> {
    fn address(&self) -> Address {
        self.as_ref().address()
    }

    async fn sign_payload(
        &self,
        digest: B256,
    ) -> Result<SignedAuthorization, alloy_signer::Error> {
        self.as_ref().sign_payload(digest).await
    }
}

/// A [`SignerFacility`] backed by an in-memory private key.
#[derive(Debug, Clone)]
pub struct LocalSignerFacility {
    signer: PrivateKeySigner,
}

impl LocalSignerFacility {
    pub fn new(signer: PrivateKeySigner) -> Self {
        Self { signer }
    }
}

#[async_trait]
impl SignerFacility for LocalSignerFacility {
    fn address(&self) -> Address {
        self.signer.address()
    }

    async fn sign_payload(
        &self,
        digest: B256,
    ) -> Result<SignedAuthorization, alloy_signer::Error> {
        let signature = self.signer.sign_hash(&digest).await?;
        Ok(signature.into())
    }
}
