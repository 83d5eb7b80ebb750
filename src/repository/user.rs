use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    error::AppResult,
    models::user::{NewUser, User},
    repository::{PgRepository, Repository, UserRepository},
};

/// User store: the generic repository plus the lookups only users need.
#[derive(Clone)]
pub struct PgUserRepository {
    base: PgRepository<User>,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            base: PgRepository::new(pool),
        }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn exists_user_id(&self, user_id: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE user_id = $1)")
                .bind(user_id)
                .fetch_one(self.base.pool())
                .await?;
        Ok(exists)
    }

    async fn create_user(&self, input: NewUser) -> AppResult<User> {
        self.base.create(input).await
    }
}
