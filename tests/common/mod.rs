#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Method, Request, Response},
    Router,
};
use chrono::Utc;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use template_service::{
    config::AppConfig,
    dto::filter::PaginationInputWithFilter,
    error::{AppError, AppResult},
    models::{
        file::{File, FilePatch, NewFile},
        user::{NewUser, User},
    },
    repository::{Repository, UserRepository},
    metrics::HttpMetrics,
    routes::create_router,
    services::auth_client::{AuthProvider, AuthServiceError, AuthUserInfo, TokenPair},
    AppState,
};

pub const BOUNDARY: &str = "X-TEST-BOUNDARY";
pub const VALID_OTP: &str = "123456";

/// `Repository<File>` over a vector. Filters are ignored; paging is honoured.
#[derive(Default)]
pub struct InMemoryFileRepository {
    files: Mutex<Vec<File>>,
    fail_creates: AtomicBool,
    fail_deletes: AtomicBool,
}

impl InMemoryFileRepository {
    pub fn fail_creates(&self) {
        self.fail_creates.store(true, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.files.lock().unwrap().len()
    }
}

#[async_trait]
impl Repository<File> for InMemoryFileRepository {
    async fn create(&self, input: NewFile) -> AppResult<File> {
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(AppError::Internal("insert failed".to_string()));
        }
        let mut files = self.files.lock().unwrap();
        let id = files.iter().map(|f| f.id).max().unwrap_or(0) + 1;
        let now = Utc::now();
        let file = File {
            id,
            name: input.name,
            directory: input.directory,
            description: input.description,
            mime_type: input.mime_type,
            created_at: now,
            updated_at: now,
        };
        files.push(file.clone());
        Ok(file)
    }

    async fn update(&self, id: i64, patch: FilePatch) -> AppResult<File> {
        let mut files = self.files.lock().unwrap();
        let file = files
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| AppError::not_found("File", id))?;
        if let Some(description) = patch.description {
            file.description = description;
        }
        file.updated_at = Utc::now();
        Ok(file.clone())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(AppError::Internal("delete failed".to_string()));
        }
        let mut files = self.files.lock().unwrap();
        let before = files.len();
        files.retain(|f| f.id != id);
        if files.len() == before {
            return Err(AppError::not_found("File", id));
        }
        Ok(())
    }

    async fn get_by_id(&self, id: i64) -> AppResult<File> {
        self.files
            .lock()
            .unwrap()
            .iter()
            .find(|f| f.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found("File", id))
    }

    async fn get_by_filter(&self, req: &PaginationInputWithFilter) -> AppResult<(i64, Vec<File>)> {
        let files = self.files.lock().unwrap();
        let items = files
            .iter()
            .skip(req.offset() as usize)
            .take(req.page_size() as usize)
            .cloned()
            .collect();
        Ok((files.len() as i64, items))
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn user_ids(&self) -> Vec<String> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .map(|u| u.user_id.clone())
            .collect()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn exists_user_id(&self, user_id: &str) -> AppResult<bool> {
        Ok(self.users.lock().unwrap().iter().any(|u| u.user_id == user_id))
    }

    async fn create_user(&self, input: NewUser) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.user_id == input.user_id) {
            return Err(AppError::Duplicate(format!("user {} exists", input.user_id)));
        }
        let now = Utc::now();
        let user = User {
            id: users.len() as i64 + 1,
            user_id: input.user_id,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }
}

/// Reports every identity as unknown, so callers always try to insert, the
/// way a concurrent login for the same identity looks between the existence
/// check and the insert.
#[derive(Default)]
pub struct RacingUserRepository {
    inner: InMemoryUserRepository,
}

impl RacingUserRepository {
    pub fn count(&self) -> usize {
        self.inner.count()
    }
}

#[async_trait]
impl UserRepository for RacingUserRepository {
    async fn exists_user_id(&self, _user_id: &str) -> AppResult<bool> {
        Ok(false)
    }

    async fn create_user(&self, input: NewUser) -> AppResult<User> {
        self.inner.create_user(input).await
    }
}

/// Auth service double: accepts [`VALID_OTP`] and knows one identity.
pub struct FakeAuthProvider {
    pub identity: AuthUserInfo,
    pub sent_to: Mutex<Vec<String>>,
    pub verified: Mutex<Vec<String>>,
    send_failure: Mutex<Option<u16>>,
}

impl Default for FakeAuthProvider {
    fn default() -> Self {
        Self {
            identity: AuthUserInfo {
                id: "ext-42".to_string(),
                name: "alice".to_string(),
            },
            sent_to: Mutex::new(Vec::new()),
            verified: Mutex::new(Vec::new()),
            send_failure: Mutex::new(None),
        }
    }
}

impl FakeAuthProvider {
    pub fn fail_send_with(&self, status: u16) {
        *self.send_failure.lock().unwrap() = Some(status);
    }
}

#[async_trait]
impl AuthProvider for FakeAuthProvider {
    async fn health_check(&self) -> Result<(), AuthServiceError> {
        Ok(())
    }

    async fn send_otp(&self, phone: &str) -> Result<(), AuthServiceError> {
        if let Some(status) = *self.send_failure.lock().unwrap() {
            return Err(AuthServiceError::from_status(status, "rejected".to_string()));
        }
        self.sent_to.lock().unwrap().push(phone.to_string());
        Ok(())
    }

    async fn verify_code(&self, phone: &str, code: &str) -> Result<bool, AuthServiceError> {
        self.verified.lock().unwrap().push(phone.to_string());
        Ok(code == VALID_OTP)
    }

    async fn get_user_info_by_phone(&self, _phone: &str) -> Result<AuthUserInfo, AuthServiceError> {
        Ok(self.identity.clone())
    }

    async fn generate_jwt(&self, name: &str) -> Result<TokenPair, AuthServiceError> {
        Ok(TokenPair {
            access_token: format!("access-{}", name),
            refresh_token: format!("refresh-{}", name),
            expires_in: Some(3600),
        })
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub files: Arc<InMemoryFileRepository>,
    pub users: Arc<InMemoryUserRepository>,
    pub auth: Arc<FakeAuthProvider>,
    pub upload_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(mut config: AppConfig) -> Self {
        let upload_dir = tempfile::tempdir().unwrap();
        config.upload.directory = upload_dir.path().to_string_lossy().into_owned();

        let files = Arc::new(InMemoryFileRepository::default());
        let users = Arc::new(InMemoryUserRepository::default());
        let auth = Arc::new(FakeAuthProvider::default());

        let state = AppState::new(
            Arc::new(config),
            files.clone(),
            users.clone(),
            auth.clone(),
            Arc::new(HttpMetrics::new().unwrap()),
        );

        Self {
            router: create_router(state.clone()),
            state,
            files,
            users,
            auth,
            upload_dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn json(&self, method: Method, uri: &str, body: Value) -> (Response<Body>, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = self.send(request).await;
        split(response).await
    }

    pub async fn empty(&self, method: Method, uri: &str) -> (Response<Body>, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = self.send(request).await;
        split(response).await
    }

    /// Uploads `content` as `file_name` through the multipart endpoint.
    pub async fn upload(&self, file_name: &str, content: &[u8], description: Option<&str>) -> (Response<Body>, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/files/")
            .header(CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
            .body(Body::from(multipart_body(Some((file_name, content)), description)))
            .unwrap();
        let response = self.send(request).await;
        split(response).await
    }

    pub fn stored_files(&self) -> Vec<String> {
        match std::fs::read_dir(self.upload_dir.path()) {
            Ok(entries) => entries
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

pub fn multipart_body(file: Option<(&str, &[u8])>, description: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(description) = description {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"description\"\r\n\r\n{}\r\n",
                BOUNDARY, description
            )
            .as_bytes(),
        );
    }
    if let Some((name, content)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: text/plain\r\n\r\n",
                BOUNDARY, name
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub async fn split(response: Response<Body>) -> (Response<Body>, Value) {
    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (Response::from_parts(parts, Body::empty()), value)
}
