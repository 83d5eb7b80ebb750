use std::marker::PhantomData;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use crate::{
    dto::filter::PaginationInputWithFilter,
    error::{AppError, AppResult},
    repository::{filter, Entity, Repository},
};

/// Generic Postgres-backed repository shared by every [`Entity`].
///
/// Writes run inside a transaction. When a statement fails the transaction is
/// rolled back and the original error is returned.
pub struct PgRepository<T> {
    pool: PgPool,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for PgRepository<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> PgRepository<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

async fn rollback(tx: Transaction<'_, Postgres>, table: &str, err: sqlx::Error) -> AppError {
    tracing::error!(table, error = %err, "statement failed, rolling back");
    if let Err(rollback_err) = tx.rollback().await {
        tracing::warn!(table, error = %rollback_err, "rollback failed");
    }
    AppError::Database(err)
}

#[async_trait]
impl<T: Entity> Repository<T> for PgRepository<T> {
    async fn create(&self, input: T::Create) -> AppResult<T> {
        let mut tx = self.pool.begin().await?;

        let mut builder = QueryBuilder::<Postgres>::new(format!("INSERT INTO {} ", T::TABLE));
        T::push_insert(&mut builder, input);
        builder.push(format!(" RETURNING {}", T::SELECT_COLUMNS));

        let result = builder.build_query_as::<T>().fetch_one(&mut *tx).await;
        let entity = match result {
            Ok(entity) => entity,
            Err(err) => return Err(rollback(tx, T::TABLE, err).await),
        };

        tx.commit().await?;
        Ok(entity)
    }

    async fn update(&self, id: i64, patch: T::Patch) -> AppResult<T> {
        let mut tx = self.pool.begin().await?;

        let mut builder =
            QueryBuilder::<Postgres>::new(format!("UPDATE {} SET updated_at = NOW()", T::TABLE));
        T::push_patch(&mut builder, patch);
        builder
            .push(" WHERE id = ")
            .push_bind(id)
            .push(format!(" RETURNING {}", T::SELECT_COLUMNS));

        let result = builder.build_query_as::<T>().fetch_optional(&mut *tx).await;
        let entity = match result {
            Ok(Some(entity)) => entity,
            Ok(None) => {
                tx.rollback().await?;
                return Err(AppError::not_found(T::NAME, id));
            }
            Err(err) => return Err(rollback(tx, T::TABLE, err).await),
        };

        tx.commit().await?;
        Ok(entity)
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let query = format!("DELETE FROM {} WHERE id = $1", T::TABLE);
        let result = sqlx::query(&query).bind(id).execute(&mut *tx).await;
        let affected = match result {
            Ok(result) => result.rows_affected(),
            Err(err) => return Err(rollback(tx, T::TABLE, err).await),
        };

        if affected == 0 {
            tx.rollback().await?;
            return Err(AppError::not_found(T::NAME, id));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get_by_id(&self, id: i64) -> AppResult<T> {
        let query = format!("SELECT {} FROM {} WHERE id = $1", T::SELECT_COLUMNS, T::TABLE);
        sqlx::query_as::<_, T>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found(T::NAME, id))
    }

    async fn get_by_filter(&self, req: &PaginationInputWithFilter) -> AppResult<(i64, Vec<T>)> {
        let mut count_query = filter::build_count_query::<T>(req)?;
        let total: i64 = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut page_query = filter::build_page_query::<T>(req)?;
        let items = page_query
            .build_query_as::<T>()
            .fetch_all(&self.pool)
            .await?;

        Ok((total, items))
    }
}
