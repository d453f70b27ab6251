//! GoTrue (Supabase auth) REST client.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, instrument};
use url::Url;

use super::{
    pkce::CODE_CHALLENGE_METHOD, AuthError, EmailOtpType, IdentityProvider, Session, SignUp,
    SignUpOptions, User,
};

#[derive(Clone)]
pub struct SupabaseClient {
    base_url: Url,
    anon_key: SecretString,
    http: Client,
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl SupabaseClient {
    /// Build a client for the project at `base_url` (e.g. `https://<ref>.supabase.co`).
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(base_url: &str, anon_key: SecretString) -> Result<Self> {
        let mut base_url =
            Url::parse(base_url).with_context(|| format!("Invalid identity URL: {base_url}"))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(anyhow!(
                "Identity URL must use http or https: {}",
                base_url.as_str()
            ));
        }
        // `Url::join` drops the last segment unless the path ends with a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .build()
            .context("Failed to build identity HTTP client")?;

        Ok(Self {
            base_url,
            anon_key,
            http,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, AuthError> {
        self.base_url
            .join(path)
            .map_err(|err| AuthError::InvalidResponse(format!("invalid endpoint {path}: {err}")))
    }

    fn request(&self, method: Method, url: Url, bearer: Option<&str>) -> RequestBuilder {
        let anon_key = self.anon_key.expose_secret();
        self.http
            .request(method, url)
            .header("apikey", anon_key)
            .bearer_auth(bearer.unwrap_or(anon_key))
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, AuthError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), "identity provider rejected request");
            return Err(AuthError::from_body(status.as_u16(), &body));
        }
        response
            .json::<T>()
            .await
            .map_err(|err| AuthError::InvalidResponse(err.to_string()))
    }

    async fn send_empty(request: RequestBuilder) -> Result<(), AuthError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), "identity provider rejected request");
            return Err(AuthError::from_body(status.as_u16(), &body));
        }
        Ok(())
    }
}

/// Some endpoints answer with a session, others with a bare user.
fn session_from_value(value: Value) -> Result<Option<Session>, AuthError> {
    if value.get("access_token").is_some() {
        serde_json::from_value(value)
            .map(Some)
            .map_err(|err| AuthError::InvalidResponse(err.to_string()))
    } else {
        Ok(None)
    }
}

fn sign_up_from_value(value: Value) -> Result<SignUp, AuthError> {
    if let Some(session) = session_from_value(value.clone())? {
        return Ok(SignUp {
            user: session.user.clone(),
            session: Some(session),
        });
    }
    if value.get("id").is_some() {
        let user: User = serde_json::from_value(value)
            .map_err(|err| AuthError::InvalidResponse(err.to_string()))?;
        return Ok(SignUp {
            user: Some(user),
            session: None,
        });
    }
    Ok(SignUp::default())
}

#[async_trait]
impl IdentityProvider for SupabaseClient {
    #[instrument(skip_all)]
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Session, AuthError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");
        let body = json!({ "email": email, "password": password.expose_secret() });
        Self::send_json(self.request(Method::POST, url, None).json(&body)).await
    }

    #[instrument(skip_all)]
    async fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
        options: &SignUpOptions,
    ) -> Result<SignUp, AuthError> {
        let mut url = self.endpoint("auth/v1/signup")?;
        if !options.email_redirect_to.is_empty() {
            url.query_pairs_mut()
                .append_pair("redirect_to", &options.email_redirect_to);
        }
        let mut body = json!({ "email": email, "password": password.expose_secret() });
        if let Some(challenge) = &options.code_challenge {
            body["code_challenge"] = json!(challenge);
            body["code_challenge_method"] = json!(CODE_CHALLENGE_METHOD);
        }
        let value: Value = Self::send_json(self.request(Method::POST, url, None).json(&body)).await?;
        sign_up_from_value(value)
    }

    #[instrument(skip(self, token_hash))]
    async fn verify_otp(
        &self,
        otp_type: EmailOtpType,
        token_hash: &str,
    ) -> Result<Option<Session>, AuthError> {
        let url = self.endpoint("auth/v1/verify")?;
        let body = json!({ "type": otp_type.as_str(), "token_hash": token_hash });
        let value: Value = Self::send_json(self.request(Method::POST, url, None).json(&body)).await?;
        session_from_value(value)
    }

    #[instrument(skip_all)]
    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<Option<Session>, AuthError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "pkce");
        let body = json!({
            "auth_code": code,
            "code_verifier": code_verifier.unwrap_or_default(),
        });
        let value: Value = Self::send_json(self.request(Method::POST, url, None).json(&body)).await?;
        session_from_value(value)
    }

    #[instrument(skip_all)]
    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, AuthError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut()
            .append_pair("grant_type", "refresh_token");
        let body = json!({ "refresh_token": refresh_token });
        Self::send_json(self.request(Method::POST, url, None).json(&body)).await
    }

    #[instrument(skip_all)]
    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: &str,
        code_challenge: Option<&str>,
    ) -> Result<(), AuthError> {
        let mut url = self.endpoint("auth/v1/recover")?;
        url.query_pairs_mut().append_pair("redirect_to", redirect_to);
        let mut body = json!({ "email": email });
        if let Some(challenge) = code_challenge {
            body["code_challenge"] = json!(challenge);
            body["code_challenge_method"] = json!(CODE_CHALLENGE_METHOD);
        }
        Self::send_empty(self.request(Method::POST, url, None).json(&body)).await
    }

    #[instrument(skip_all)]
    async fn update_user_password(
        &self,
        access_token: &str,
        password: &SecretString,
    ) -> Result<User, AuthError> {
        let url = self.endpoint("auth/v1/user")?;
        let body = json!({ "password": password.expose_secret() });
        Self::send_json(
            self.request(Method::PUT, url, Some(access_token))
                .json(&body),
        )
        .await
    }

    #[instrument(skip_all)]
    async fn get_user(&self, access_token: &str) -> Result<User, AuthError> {
        let url = self.endpoint("auth/v1/user")?;
        Self::send_json(self.request(Method::GET, url, Some(access_token))).await
    }

    #[instrument(skip_all)]
    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let url = self.endpoint("auth/v1/logout")?;
        Self::send_empty(self.request(Method::POST, url, Some(access_token))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_appends_trailing_slash() -> Result<()> {
        let client = SupabaseClient::new(
            "https://project.supabase.co/proxy",
            SecretString::from("anon".to_string()),
        )?;
        assert_eq!(
            client.base_url().as_str(),
            "https://project.supabase.co/proxy/"
        );
        let url = client.endpoint("auth/v1/user").map_err(anyhow::Error::new)?;
        assert_eq!(url.as_str(), "https://project.supabase.co/proxy/auth/v1/user");
        Ok(())
    }

    #[test]
    fn new_rejects_non_http_schemes() {
        assert!(SupabaseClient::new("ftp://example.com", SecretString::from("anon".to_string())).is_err());
        assert!(SupabaseClient::new("not a url", SecretString::from("anon".to_string())).is_err());
    }

    #[test]
    fn sign_up_value_with_session() -> Result<()> {
        let value = json!({
            "access_token": "a",
            "refresh_token": "r",
            "expires_in": 3600,
            "token_type": "bearer",
            "user": {"id": "0b6a3f5e-5a43-4f59-9d2b-4a7d8e0f1c2d", "email": "a@b.co"}
        });
        let sign_up = sign_up_from_value(value).map_err(anyhow::Error::new)?;
        assert!(sign_up.session.is_some());
        assert!(sign_up.user.is_some());
        Ok(())
    }

    #[test]
    fn sign_up_value_with_user_only() -> Result<()> {
        let value = json!({"id": "0b6a3f5e-5a43-4f59-9d2b-4a7d8e0f1c2d", "identities": []});
        let sign_up = sign_up_from_value(value).map_err(anyhow::Error::new)?;
        assert!(sign_up.session.is_none());
        assert!(sign_up.is_existing_account());
        Ok(())
    }

    #[test]
    fn session_value_without_token_is_none() -> Result<()> {
        let session = session_from_value(json!({"user": null})).map_err(anyhow::Error::new)?;
        assert!(session.is_none());
        Ok(())
    }
}
