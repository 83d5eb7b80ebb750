//! Client for the external auth/OTP service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{error, info};

use crate::config::AuthServiceConfig;

const API_KEY_HEADER: &str = "X-Api-Key";

#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("auth service rejected the request: {0}")]
    BadRequest(String),
    #[error("auth service refused the credentials: {0}")]
    Unauthorized(String),
    #[error("auth service could not find the resource: {0}")]
    NotFound(String),
    #[error("auth service reported a conflict: {0}")]
    Conflict(String),
    #[error("too many requests: {0}")]
    TooManyRequests(String),
    #[error("auth service unreachable: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("auth service returned {status}: {message}")]
    Unexpected { status: u16, message: String },
    #[error("invalid auth service response: {0}")]
    Decode(#[source] reqwest::Error),
}

impl AuthServiceError {
    /// Classifies a non-success response by its status code.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            400 | 422 => AuthServiceError::BadRequest(message),
            401 | 403 => AuthServiceError::Unauthorized(message),
            404 => AuthServiceError::NotFound(message),
            409 => AuthServiceError::Conflict(message),
            429 => AuthServiceError::TooManyRequests(message),
            _ => AuthServiceError::Unexpected { status, message },
        }
    }
}

/// Identity as the auth service knows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUserInfo {
    pub id: String,
    pub name: String,
}

/// Opaque token pair. Never decoded here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn health_check(&self) -> Result<(), AuthServiceError>;
    async fn send_otp(&self, phone: &str) -> Result<(), AuthServiceError>;
    async fn verify_code(&self, phone: &str, code: &str) -> Result<bool, AuthServiceError>;
    async fn get_user_info_by_phone(&self, phone: &str) -> Result<AuthUserInfo, AuthServiceError>;
    async fn generate_jwt(&self, name: &str) -> Result<TokenPair, AuthServiceError>;
}

#[derive(Serialize)]
struct PhoneBody<'a> {
    phone: &'a str,
}

#[derive(Serialize)]
struct VerifyBody<'a> {
    phone: &'a str,
    code: &'a str,
}

#[derive(Deserialize)]
struct VerifyResponse {
    valid: bool,
}

#[derive(Serialize)]
struct TokenBody<'a> {
    name: &'a str,
}

/// HTTP implementation of [`AuthProvider`].
#[derive(Clone)]
pub struct HttpAuthClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpAuthClient {
    pub fn new(config: &AuthServiceConfig) -> Result<Self, AuthServiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(AuthServiceError::Transport)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|key| !key.is_empty()),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_key(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        operation: &str,
    ) -> Result<reqwest::Response, AuthServiceError> {
        let response = self.with_key(request).send().await.map_err(|e| {
            error!(operation, error = %e, "auth service request failed");
            AuthServiceError::Transport(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        error!(operation, status = status.as_u16(), %message, "auth service returned an error");
        Err(AuthServiceError::from_status(status.as_u16(), message))
    }

    async fn send_json<R: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        operation: &str,
    ) -> Result<R, AuthServiceError> {
        self.send(request, operation)
            .await?
            .json::<R>()
            .await
            .map_err(AuthServiceError::Decode)
    }
}

#[async_trait]
impl AuthProvider for HttpAuthClient {
    async fn health_check(&self) -> Result<(), AuthServiceError> {
        self.send(self.client.get(self.url("/health")), "health_check")
            .await?;
        info!(base_url = %self.base_url, "auth service is healthy");
        Ok(())
    }

    async fn send_otp(&self, phone: &str) -> Result<(), AuthServiceError> {
        let request = self
            .client
            .post(self.url("/api/v1/otp/send"))
            .json(&PhoneBody { phone });
        self.send(request, "send_otp").await?;
        Ok(())
    }

    async fn verify_code(&self, phone: &str, code: &str) -> Result<bool, AuthServiceError> {
        let request = self
            .client
            .post(self.url("/api/v1/otp/verify"))
            .json(&VerifyBody { phone, code });
        let response: VerifyResponse = self.send_json(request, "verify_code").await?;
        Ok(response.valid)
    }

    async fn get_user_info_by_phone(&self, phone: &str) -> Result<AuthUserInfo, AuthServiceError> {
        let request = self
            .client
            .get(self.url("/api/v1/users/by-phone"))
            .query(&[("phone", phone)]);
        self.send_json(request, "get_user_info_by_phone").await
    }

    async fn generate_jwt(&self, name: &str) -> Result<TokenPair, AuthServiceError> {
        let request = self
            .client
            .post(self.url("/api/v1/token"))
            .json(&TokenBody { name });
        self.send_json(request, "generate_jwt").await
    }
}
