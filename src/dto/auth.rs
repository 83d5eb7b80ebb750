use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::services::{
    auth_client::TokenPair,
    dto::{LoginByMobile, SendOtp},
};

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetOtpRequest {
    /// e.g. `+98`; blank uses the configured default.
    #[serde(default)]
    #[validate(custom(function = "validate_country_code"))]
    pub country_code: String,
    #[validate(custom(function = "validate_mobile_number"))]
    pub mobile_number: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterLoginByMobileRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_country_code"))]
    pub country_code: String,
    #[validate(custom(function = "validate_mobile_number"))]
    pub mobile_number: String,
    #[validate(custom(function = "validate_otp"))]
    pub otp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
}

pub fn to_send_otp(request: GetOtpRequest) -> SendOtp {
    SendOtp {
        country_code: request.country_code,
        mobile_number: request.mobile_number,
    }
}

pub fn to_login_by_mobile(request: RegisterLoginByMobileRequest) -> LoginByMobile {
    LoginByMobile {
        country_code: request.country_code,
        mobile_number: request.mobile_number,
        otp: request.otp,
    }
}

pub fn to_token_response(tokens: TokenPair) -> TokenResponse {
    TokenResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    }
}

fn all_digits(value: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&value.len()) && value.bytes().all(|b| b.is_ascii_digit())
}

fn rule(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

fn validate_country_code(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    match value.strip_prefix('+') {
        Some(digits) if all_digits(digits, 1, 4) => Ok(()),
        _ => Err(rule("country_code", "countryCode must be '+' followed by 1 to 4 digits")),
    }
}

fn validate_mobile_number(value: &str) -> Result<(), ValidationError> {
    if all_digits(value, 10, 11) {
        Ok(())
    } else {
        Err(rule("mobile_number", "mobileNumber must be 10 or 11 digits"))
    }
}

fn validate_otp(value: &str) -> Result<(), ValidationError> {
    if all_digits(value, 4, 8) {
        Ok(())
    } else {
        Err(rule("otp", "otp must be 4 to 8 digits"))
    }
}
