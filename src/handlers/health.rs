use crate::handlers::crud::{self, ApiResponse};

#[utoipa::path(
    get,
    path = "/api/v1/health/",
    responses((status = 200, description = "Service is up")),
    tag = "health"
)]
pub async fn health() -> ApiResponse<&'static str> {
    Ok(crud::ok("Working!"))
}
