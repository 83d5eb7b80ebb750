use axum::{
    extract::{rejection::JsonRejection, State},
    http::{
        header::{HeaderMap, HeaderValue, SET_COOKIE},
        StatusCode,
    },
    Json,
};

use crate::{
    config::AppConfig,
    dto::{
        auth::{
            to_login_by_mobile, to_send_otp, to_token_response, GetOtpRequest,
            RegisterLoginByMobileRequest, TokenResponse,
        },
        base::BaseHttpResponse,
    },
    error::{AppError, AppResult},
    handlers::crud::{self, ApiResponse},
    AppState,
};

pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

#[utoipa::path(
    post,
    path = "/api/v1/auth/send-otp",
    request_body = GetOtpRequest,
    responses(
        (status = 200, description = "OTP sent"),
        (status = 400, description = "Invalid phone number"),
        (status = 409, description = "Rejected by the auth service"),
        (status = 429, description = "Too many OTP requests")
    ),
    tag = "auth"
)]
pub async fn send_otp(
    State(state): State<AppState>,
    payload: Result<Json<GetOtpRequest>, JsonRejection>,
) -> ApiResponse<()> {
    let request = crud::bind_json(payload)?;
    state.user_service.send_otp(to_send_otp(request)).await?;
    Ok((StatusCode::OK, Json(BaseHttpResponse::empty())))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login-by-mobile",
    request_body = RegisterLoginByMobileRequest,
    responses(
        (status = 200, description = "Logged in; refresh token also set as a cookie", body = TokenResponse),
        (status = 400, description = "Invalid request or OTP")
    ),
    tag = "auth"
)]
pub async fn login_by_mobile(
    State(state): State<AppState>,
    payload: Result<Json<RegisterLoginByMobileRequest>, JsonRejection>,
) -> AppResult<(StatusCode, HeaderMap, Json<BaseHttpResponse<TokenResponse>>)> {
    let request = crud::bind_json(payload)?;
    let tokens = state
        .user_service
        .register_and_login_by_mobile(to_login_by_mobile(request))
        .await?;

    let cookie = refresh_token_cookie(&tokens.refresh_token, &state.config);
    let mut headers = HeaderMap::new();
    headers.insert(
        SET_COOKIE,
        HeaderValue::from_str(&cookie)
            .map_err(|e| AppError::Internal(format!("invalid refresh token cookie: {}", e)))?,
    );

    let (status, body) = crud::ok(to_token_response(tokens));
    Ok((status, headers, body))
}

/// `Set-Cookie` value carrying the refresh token.
pub fn refresh_token_cookie(token: &str, config: &AppConfig) -> String {
    let mut cookie = format!(
        "{}={}; Max-Age={}; Path=/",
        REFRESH_TOKEN_COOKIE,
        token,
        config.refresh_cookie_max_age()
    );
    if !config.server.domain.is_empty() {
        cookie.push_str("; Domain=");
        cookie.push_str(&config.server.domain);
    }
    cookie.push_str("; Secure; HttpOnly; SameSite=Strict");
    cookie
}
