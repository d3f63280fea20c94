//! Identity provider boundary.
//!
//! Accounts and credentials live behind [`IdentityProvider`]; directory
//! profiles never carry credential material. The bundled implementation is
//! [`local::LocalIdentityProvider`] (argon2 hashes + JWT sessions); a hosted
//! provider can be swapped in behind the same trait.

mod local;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppResult;

pub use local::LocalIdentityProvider;

/// An authenticated identity as the provider reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
}

/// Result of a successful sign-in.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub identity: Identity,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> AppResult<AuthSession>;

    async fn sign_up(&self, email: &str, password: &str) -> AppResult<Identity>;

    /// Always succeeds from the caller's perspective so the endpoint cannot
    /// be used to probe which addresses have accounts.
    async fn request_password_reset(&self, email: &str) -> AppResult<()>;

    /// Provision an account for a directory-managed user. Returns the new
    /// account id, which doubles as the profile id.
    async fn admin_create_account(&self, email: &str, password: &str) -> AppResult<Uuid>;

    async fn admin_delete_account(&self, user_id: Uuid) -> AppResult<()>;

    /// Set a new credential for a target account out-of-band; no
    /// re-authentication of the target is involved.
    async fn admin_set_password(&self, user_id: Uuid, new_password: &str) -> AppResult<()>;
}
