//! Persistence contracts.
//!
//! [`Repository`] is the per-entity CRUD contract; [`PgRepository`] is the one
//! generic implementation every entity shares. Entity specific queries live in
//! their own traits (see [`UserRepository`]).

pub mod filter;
pub mod postgres;
pub mod user;

use async_trait::async_trait;
use sqlx::{postgres::PgRow, FromRow, Postgres, QueryBuilder};

use crate::{
    dto::filter::PaginationInputWithFilter,
    error::AppResult,
    models::{file::File, user::{NewUser, User}},
};

pub use postgres::PgRepository;
pub use user::PgUserRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Timestamp,
}

/// A column that may appear in dynamic filters and sort criteria.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    /// Field name as clients send it (`mimeType`).
    pub field: &'static str,
    /// SQL column name (`mime_type`).
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    pub const fn new(field: &'static str, name: &'static str, kind: ColumnKind) -> Self {
        Self { field, name, kind }
    }
}

/// A persisted record with a store-assigned `BIGINT` primary key named `id`.
pub trait Entity: for<'r> FromRow<'r, PgRow> + Send + Sync + Unpin + 'static {
    /// Insert shape.
    type Create: Send + 'static;
    /// Typed partial update; `None` fields are left untouched.
    type Patch: Send + 'static;

    /// Name used in error messages.
    const NAME: &'static str;
    const TABLE: &'static str;
    const SELECT_COLUMNS: &'static str;
    const COLUMNS: &'static [Column];

    /// Pushes `(col, ..) VALUES ($1, ..)`.
    fn push_insert(builder: &mut QueryBuilder<'_, Postgres>, input: Self::Create);

    /// Pushes `, col = $n` for every supplied field.
    fn push_patch(builder: &mut QueryBuilder<'_, Postgres>, patch: Self::Patch);

    fn column(field: &str) -> Option<&'static Column> {
        Self::COLUMNS.iter().find(|c| c.field == field)
    }
}

#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    async fn create(&self, input: T::Create) -> AppResult<T>;
    async fn update(&self, id: i64, patch: T::Patch) -> AppResult<T>;
    async fn delete(&self, id: i64) -> AppResult<()>;
    async fn get_by_id(&self, id: i64) -> AppResult<T>;
    /// Returns the total number of matching rows and the requested page.
    async fn get_by_filter(&self, req: &PaginationInputWithFilter) -> AppResult<(i64, Vec<T>)>;
}

pub type FileRepository = dyn Repository<File>;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn exists_user_id(&self, user_id: &str) -> AppResult<bool>;
    async fn create_user(&self, input: NewUser) -> AppResult<User>;
}
