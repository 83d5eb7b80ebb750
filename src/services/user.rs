use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    error::{AppError, AppResult},
    models::user::NewUser,
    repository::UserRepository,
    services::{
        auth_client::{AuthProvider, TokenPair},
        dto::{LoginByMobile, SendOtp},
    },
};

/// Mobile registration and login, delegated to the auth service.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    auth: Arc<dyn AuthProvider>,
    default_country_code: String,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        auth: Arc<dyn AuthProvider>,
        default_country_code: impl Into<String>,
    ) -> Self {
        Self {
            users,
            auth,
            default_country_code: default_country_code.into(),
        }
    }

    /// Full phone number; a blank country code falls back to the default.
    pub fn phone_number(&self, country_code: &str, mobile_number: &str) -> String {
        let country_code = country_code.trim();
        let country_code = if country_code.is_empty() {
            self.default_country_code.as_str()
        } else {
            country_code
        };
        format!("{}{}", country_code, mobile_number.trim())
    }

    pub async fn send_otp(&self, input: SendOtp) -> AppResult<()> {
        let phone = self.phone_number(&input.country_code, &input.mobile_number);
        self.auth.send_otp(&phone).await?;
        info!(%phone, "otp sent");
        Ok(())
    }

    /// Verifies the OTP, makes sure a local user exists for the identity and
    /// returns a fresh token pair.
    pub async fn register_and_login_by_mobile(&self, input: LoginByMobile) -> AppResult<TokenPair> {
        let phone = self.phone_number(&input.country_code, &input.mobile_number);

        if !self.auth.verify_code(&phone, &input.otp).await? {
            warn!(%phone, "otp verification failed");
            return Err(AppError::InvalidOtp);
        }

        let identity = self.auth.get_user_info_by_phone(&phone).await?;

        if !self.users.exists_user_id(&identity.id).await? {
            match self.users.create_user(NewUser::new(identity.id.as_str())).await {
                Ok(user) => info!(user_id = %user.user_id, id = user.id, "registered new user"),
                // Lost a race with a concurrent login for the same identity.
                Err(err) if err.is_duplicate() => {
                    info!(user_id = %identity.id, "user already registered")
                }
                Err(err) => return Err(err),
            }
        }

        let tokens = self.auth.generate_jwt(&identity.name).await?;
        info!(user_id = %identity.id, "user logged in");
        Ok(tokens)
    }
}
