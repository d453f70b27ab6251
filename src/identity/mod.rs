//! Hosted identity provider client surface.
//!
//! Handlers only see the [`IdentityProvider`] trait. The production
//! implementation, [`SupabaseClient`], talks to a GoTrue-compatible REST API.

mod error;
pub mod pkce;
mod supabase;
mod types;

pub use error::AuthError;
pub use supabase::SupabaseClient;
pub use types::{EmailOtpType, Session, SignUp, SignUpOptions, User};

use async_trait::async_trait;
use secrecy::SecretString;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Session, AuthError>;

    async fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
        options: &SignUpOptions,
    ) -> Result<SignUp, AuthError>;

    /// Legacy email link verification. Some link types verify without
    /// returning a session.
    async fn verify_otp(
        &self,
        otp_type: EmailOtpType,
        token_hash: &str,
    ) -> Result<Option<Session>, AuthError>;

    /// Exchange a one-time PKCE code. `Ok(None)` means the provider accepted
    /// the code but did not hand out a session.
    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<Option<Session>, AuthError>;

    /// Trade a refresh token for a new session once the access token has
    /// expired. Refresh tokens are single use.
    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, AuthError>;

    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: &str,
        code_challenge: Option<&str>,
    ) -> Result<(), AuthError>;

    async fn update_user_password(
        &self,
        access_token: &str,
        password: &SecretString,
    ) -> Result<User, AuthError>;

    async fn get_user(&self, access_token: &str) -> Result<User, AuthError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;
}
