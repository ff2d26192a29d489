//! Pluggable handshake identity verification.
//!
//! The wire protocol carries a claimed user id in the `auth` frame; what
//! the service does with that claim is a deployment decision. The default
//! [`AcceptAllVerifier`] accepts any claimed identity, which matches the
//! platform's current trust model where the surrounding HTTP layer has
//! already authenticated the session. A deployment that wants real
//! verification swaps in its own [`IdentityVerifier`] without touching
//! the protocol.

use async_trait::async_trait;

use unilet_core::result::AppResult;

/// Transport-level metadata available at handshake time.
#[derive(Debug, Clone, Default)]
pub struct TransportMeta {
    /// Client user agent, if reported.
    pub user_agent: Option<String>,
    /// Client remote address, if reported.
    pub ip_address: Option<String>,
}

/// Decides whether a claimed identity is accepted and returns the
/// canonical user id to bind the connection to.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verify a claimed identity. `Err` rejects the handshake.
    async fn verify(&self, claimed_user_id: i64, meta: &TransportMeta) -> AppResult<i64>;
}

/// Accepts every claimed identity as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllVerifier;

#[async_trait]
impl IdentityVerifier for AcceptAllVerifier {
    async fn verify(&self, claimed_user_id: i64, _meta: &TransportMeta) -> AppResult<i64> {
        Ok(claimed_user_id)
    }
}
