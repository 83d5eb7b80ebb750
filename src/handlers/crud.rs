//! Generic CRUD handler plumbing.
//!
//! Each function takes a request shape, a mapper into the usecase input, the
//! usecase operation and a mapper from the usecase output into the response
//! shape. Binding failures and usecase errors come back as [`AppError`], which
//! renders the error envelope.

use std::future::Future;

use axum::{extract::rejection::JsonRejection, http::StatusCode, Json};
use validator::Validate;

use crate::{
    dto::{
        base::BaseHttpResponse,
        filter::{PaginationInputWithFilter, PagedList},
    },
    error::{AppError, AppResult},
};

pub type ApiResponse<T> = AppResult<(StatusCode, Json<BaseHttpResponse<T>>)>;

/// Unwraps a JSON body and runs its field validation.
pub fn bind_json<T: Validate>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    let Json(request) = payload.map_err(|rejection| AppError::validation(rejection.body_text()))?;
    request.validate()?;
    Ok(request)
}

/// Parses the `id` path parameter. Anything but a positive integer is
/// [`AppError::InvalidId`].
pub fn parse_id(raw: &str) -> AppResult<i64> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::InvalidId),
    }
}

pub fn ok<T>(result: T) -> (StatusCode, Json<BaseHttpResponse<T>>) {
    (StatusCode::OK, Json(BaseHttpResponse::success(result)))
}

/// Responds 201 with the created resource.
pub async fn create<Req, In, Out, Resp, MapIn, Op, Fut, MapOut>(
    request: Req,
    to_input: MapIn,
    operation: Op,
    to_response: MapOut,
) -> ApiResponse<Resp>
where
    MapIn: FnOnce(Req) -> In,
    Op: FnOnce(In) -> Fut,
    Fut: Future<Output = AppResult<Out>>,
    MapOut: FnOnce(Out) -> Resp,
{
    let output = operation(to_input(request)).await?;
    Ok((
        StatusCode::CREATED,
        Json(BaseHttpResponse::success(to_response(output))),
    ))
}

/// The id is checked before the body, so a bad id is a 404 whatever the body.
pub async fn update<Req, In, Out, Resp, MapIn, Op, Fut, MapOut>(
    raw_id: &str,
    payload: Result<Json<Req>, JsonRejection>,
    to_input: MapIn,
    operation: Op,
    to_response: MapOut,
) -> ApiResponse<Resp>
where
    Req: Validate,
    MapIn: FnOnce(Req) -> In,
    Op: FnOnce(i64, In) -> Fut,
    Fut: Future<Output = AppResult<Out>>,
    MapOut: FnOnce(Out) -> Resp,
{
    let id = parse_id(raw_id)?;
    let request = bind_json(payload)?;
    let output = operation(id, to_input(request)).await?;
    Ok(ok(to_response(output)))
}

pub async fn delete<Op, Fut>(raw_id: &str, operation: Op) -> ApiResponse<()>
where
    Op: FnOnce(i64) -> Fut,
    Fut: Future<Output = AppResult<()>>,
{
    let id = parse_id(raw_id)?;
    operation(id).await?;
    Ok((StatusCode::OK, Json(BaseHttpResponse::empty())))
}

pub async fn get_by_id<Out, Resp, Op, Fut, MapOut>(
    raw_id: &str,
    operation: Op,
    to_response: MapOut,
) -> ApiResponse<Resp>
where
    Op: FnOnce(i64) -> Fut,
    Fut: Future<Output = AppResult<Out>>,
    MapOut: FnOnce(Out) -> Resp,
{
    let id = parse_id(raw_id)?;
    let output = operation(id).await?;
    Ok(ok(to_response(output)))
}

/// Maps every item of the page; paging metadata is passed through untouched.
pub async fn get_by_filter<Out, Resp, Op, Fut, MapOut>(
    payload: Result<Json<PaginationInputWithFilter>, JsonRejection>,
    operation: Op,
    to_response: MapOut,
) -> ApiResponse<PagedList<Resp>>
where
    Op: FnOnce(PaginationInputWithFilter) -> Fut,
    Fut: Future<Output = AppResult<PagedList<Out>>>,
    MapOut: FnMut(Out) -> Resp,
{
    let request = bind_json(payload)?;
    let page = operation(request).await?;
    Ok(ok(page.map(to_response)))
}
