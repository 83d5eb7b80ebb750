pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use utoipa::OpenApi;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use services::{file::FileService, user::UserService};

use metrics::HttpMetrics;
use repository::{FileRepository, UserRepository};
use services::{auth_client::AuthProvider, storage::FileStorage};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub file_service: Arc<FileService>,
    pub user_service: Arc<UserService>,
    pub metrics: Arc<HttpMetrics>,
}

impl AppState {
    /// Wires the services from their collaborators. Production passes the
    /// Postgres repositories and the HTTP auth client; tests pass fakes.
    pub fn new(
        config: Arc<AppConfig>,
        files: Arc<FileRepository>,
        users: Arc<dyn UserRepository>,
        auth: Arc<dyn AuthProvider>,
        metrics: Arc<HttpMetrics>,
    ) -> Self {
        let storage = FileStorage::new(&config.upload.directory);
        let file_service = Arc::new(FileService::new(files, storage));
        let user_service = Arc::new(UserService::new(
            users,
            auth,
            config.otp.default_country_code.clone(),
        ));

        Self {
            config,
            file_service,
            user_service,
            metrics,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::file::upload_file,
        handlers::file::update_file,
        handlers::file::delete_file,
        handlers::file::get_file,
        handlers::file::get_files_by_filter,
        handlers::auth::send_otp,
        handlers::auth::login_by_mobile,
    ),
    components(schemas(
        dto::file::UploadFileForm,
        dto::file::UpdateFileRequest,
        dto::file::FileResponse,
        dto::filter::PaginationInputWithFilter,
        dto::filter::SortCriteria,
        dto::filter::SortDirection,
        dto::filter::FilterCondition,
        dto::filter::FilterOperator,
        dto::auth::GetOtpRequest,
        dto::auth::RegisterLoginByMobileRequest,
        dto::auth::TokenResponse,
        dto::base::ErrorBody,
        dto::base::ValidationErrorDetail,
    )),
    tags(
        (name = "health", description = "Liveness"),
        (name = "file", description = "File upload and management API"),
        (name = "auth", description = "Mobile OTP registration and login")
    )
)]
pub struct ApiDoc;
