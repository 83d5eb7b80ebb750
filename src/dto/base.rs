//! Uniform response envelope shared by every endpoint.
//!
//! Success and failure both serialize as
//! `{ "result": T | null, "success": bool, "resultCode": i32, "error"?: {..} }`.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Numeric result codes carried in `resultCode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCode {
    Success = 0,
    ValidationError = 40001,
    AuthError = 40101,
    NotFoundError = 40401,
    MethodNotAllowed = 40501,
    ConflictError = 40901,
    TooManyRequests = 42901,
    InternalError = 50002,
}

impl ResultCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseHttpResponse<T> {
    pub result: Option<T>,
    pub success: bool,
    pub result_code: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<Vec<ValidationErrorDetail>>,
}

/// One failed field constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationErrorDetail {
    pub property: String,
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub message: String,
}

impl<T> BaseHttpResponse<T> {
    pub fn success(result: T) -> Self {
        Self {
            result: Some(result),
            success: true,
            result_code: ResultCode::Success.as_i32(),
            error: None,
        }
    }

    pub fn failure(code: ResultCode, error: ErrorBody) -> Self {
        Self {
            result: None,
            success: false,
            result_code: code.as_i32(),
            error: Some(error),
        }
    }
}

impl BaseHttpResponse<()> {
    /// Successful response whose `result` is `null`.
    pub fn empty() -> Self {
        Self {
            result: None,
            success: true,
            result_code: ResultCode::Success.as_i32(),
            error: None,
        }
    }
}

/// Flattens `validator` output into the envelope's detail list, ordered by property.
pub fn validation_details(errors: &validator::ValidationErrors) -> Vec<ValidationErrorDetail> {
    let mut details: Vec<ValidationErrorDetail> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, field_errors)| {
            let property = field.to_string();
            field_errors.iter().map(move |err| ValidationErrorDetail {
                property: property.clone(),
                tag: err.code.to_string(),
                value: err.params.get("value").map(|v| match v {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                }),
                message: err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} failed on the '{}' rule", property, err.code)),
            })
        })
        .collect();

    details.sort_by(|a, b| a.property.cmp(&b.property).then_with(|| a.tag.cmp(&b.tag)));
    details
}
