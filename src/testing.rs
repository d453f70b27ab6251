//! In-memory fakes shared by unit and handler tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use secrecy::SecretString;
use serde_json::{json, Map};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
};
use uuid::Uuid;

use crate::{
    identity::{
        AuthError, EmailOtpType, IdentityProvider, Session, SignUp, SignUpOptions, User,
    },
    store::{ProfileStore, UserProfile},
};

pub(crate) const USER_ID: Uuid = Uuid::from_u128(0x0b6a_3f5e_5a43_4f59_9d2b_4a7d_8e0f_1c2d);

/// Scripted answer for one fake provider operation.
#[derive(Clone, Debug)]
pub(crate) enum Reply<T> {
    Ok(T),
    Reject(String),
    Broken,
}

impl<T: Clone> Reply<T> {
    fn get(&self) -> Result<T, AuthError> {
        match self {
            Self::Ok(value) => Ok(value.clone()),
            Self::Reject(message) => Err(AuthError::api(400, message.clone())),
            Self::Broken => Err(AuthError::InvalidResponse("connection reset".to_string())),
        }
    }
}

pub(crate) fn user() -> User {
    User {
        id: USER_ID,
        email: Some("ada@example.com".to_string()),
        email_confirmed_at: Some("2024-01-01T00:00:00Z".to_string()),
        last_sign_in_at: None,
        created_at: None,
        user_metadata: Map::new(),
        identities: Some(vec![json!({"provider": "email"})]),
    }
}

pub(crate) fn session() -> Session {
    Session {
        access_token: "access-token".to_string(),
        refresh_token: "refresh-token".to_string(),
        expires_in: 3600,
        token_type: "bearer".to_string(),
        user: Some(user()),
    }
}

/// Session handed out by a refresh: new tokens for the same user.
pub(crate) fn refreshed_session() -> Session {
    Session {
        access_token: "refreshed-access-token".to_string(),
        refresh_token: "refreshed-refresh-token".to_string(),
        ..session()
    }
}

pub(crate) struct FakeIdentity {
    pub(crate) calls: Mutex<Vec<(&'static str, String)>>,
    pub sign_in: Reply<Session>,
    pub sign_up: Reply<SignUp>,
    pub verify: Reply<Option<Session>>,
    pub exchange: Reply<Option<Session>>,
    pub refresh: Reply<Session>,
    pub recover: Reply<()>,
    pub update_password: Reply<User>,
    pub user: Reply<User>,
}

impl Default for FakeIdentity {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            sign_in: Reply::Ok(session()),
            sign_up: Reply::Ok(SignUp {
                user: Some(user()),
                session: None,
            }),
            verify: Reply::Ok(Some(session())),
            exchange: Reply::Ok(Some(session())),
            refresh: Reply::Ok(refreshed_session()),
            recover: Reply::Ok(()),
            update_password: Reply::Ok(user()),
            user: Reply::Ok(user()),
        }
    }
}

impl FakeIdentity {
    fn record(&self, operation: &'static str, detail: impl Into<String>) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((operation, detail.into()));
        }
    }

    /// Number of calls made to `operation`.
    pub(crate) fn count(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .map(|calls| calls.iter().filter(|(name, _)| *name == operation).count())
            .unwrap_or_default()
    }

    /// Details recorded for `operation`, in call order.
    pub(crate) fn details(&self, operation: &str) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| {
                calls
                    .iter()
                    .filter(|(name, _)| *name == operation)
                    .map(|(_, detail)| detail.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or_default()
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn sign_in_with_password(
        &self,
        email: &str,
        _password: &SecretString,
    ) -> Result<Session, AuthError> {
        self.record("sign_in", email);
        self.sign_in.get()
    }

    async fn sign_up(
        &self,
        email: &str,
        _password: &SecretString,
        options: &SignUpOptions,
    ) -> Result<SignUp, AuthError> {
        self.record("sign_up", format!("{email} {}", options.email_redirect_to));
        self.sign_up.get()
    }

    async fn verify_otp(
        &self,
        otp_type: EmailOtpType,
        token_hash: &str,
    ) -> Result<Option<Session>, AuthError> {
        self.record("verify_otp", format!("{otp_type}:{token_hash}"));
        self.verify.get()
    }

    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<Option<Session>, AuthError> {
        self.record(
            "exchange",
            format!("{code}:{}", code_verifier.unwrap_or_default()),
        );
        self.exchange.get()
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, AuthError> {
        self.record("refresh", refresh_token);
        self.refresh.get()
    }

    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: &str,
        _code_challenge: Option<&str>,
    ) -> Result<(), AuthError> {
        self.record("recover", format!("{email} {redirect_to}"));
        self.recover.get()
    }

    async fn update_user_password(
        &self,
        access_token: &str,
        _password: &SecretString,
    ) -> Result<User, AuthError> {
        self.record("update_password", access_token);
        self.update_password.get()
    }

    async fn get_user(&self, access_token: &str) -> Result<User, AuthError> {
        self.record("get_user", access_token);
        self.user.get()
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        self.record("sign_out", access_token);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct MemoryStore {
    rows: Mutex<HashMap<Uuid, UserProfile>>,
    pub fail_fetch: AtomicBool,
    pub fail_upsert: AtomicBool,
    pub fail_count: AtomicBool,
}

impl MemoryStore {
    pub(crate) fn with_profile(profile: UserProfile) -> Self {
        let store = Self::default();
        if let Ok(mut rows) = store.rows.lock() {
            rows.insert(profile.id, profile);
        }
        store
    }

    pub(crate) fn get(&self, id: Uuid) -> Option<UserProfile> {
        self.rows.lock().ok().and_then(|rows| rows.get(&id).cloned())
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn fetch(&self, id: Uuid) -> Result<Option<UserProfile>> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(anyhow!("fetch failed"));
        }
        Ok(self.get(id))
    }

    async fn upsert(&self, profile: &UserProfile) -> Result<()> {
        if self.fail_upsert.load(Ordering::SeqCst) {
            return Err(anyhow!("upsert failed"));
        }
        let mut rows = self.rows.lock().map_err(|_| anyhow!("poisoned"))?;
        rows.insert(profile.id, profile.clone());
        Ok(())
    }

    async fn count(&self) -> Result<i64> {
        if self.fail_count.load(Ordering::SeqCst) {
            return Err(anyhow!("count failed"));
        }
        let rows = self.rows.lock().map_err(|_| anyhow!("poisoned"))?;
        Ok(i64::try_from(rows.len())?)
    }

    async fn ping(&self) -> Result<()> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(anyhow!("ping failed"));
        }
        Ok(())
    }
}
