use std::{marker::PhantomData, sync::Arc};

use crate::{
    dto::filter::{PaginationInputWithFilter, PagedList},
    error::AppResult,
    repository::{Entity, Repository},
};

/// Generic usecase over one entity.
///
/// `C` and `U` are the create and update inputs, `O` the output shape. The
/// service only projects between those shapes and the repository; it holds
/// no state of its own.
pub struct BaseService<T: Entity, C, U, O> {
    repository: Arc<dyn Repository<T>>,
    _shapes: PhantomData<fn(C, U) -> O>,
}

impl<T: Entity, C, U, O> Clone for BaseService<T, C, U, O> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            _shapes: PhantomData,
        }
    }
}

impl<T, C, U, O> BaseService<T, C, U, O>
where
    T: Entity,
    C: Into<T::Create>,
    U: Into<T::Patch>,
    O: From<T>,
{
    pub fn new(repository: Arc<dyn Repository<T>>) -> Self {
        Self {
            repository,
            _shapes: PhantomData,
        }
    }

    pub fn repository(&self) -> &Arc<dyn Repository<T>> {
        &self.repository
    }

    pub async fn create(&self, input: C) -> AppResult<O> {
        let entity = self.repository.create(input.into()).await?;
        Ok(O::from(entity))
    }

    pub async fn update(&self, id: i64, input: U) -> AppResult<O> {
        let entity = self.repository.update(id, input.into()).await?;
        Ok(O::from(entity))
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.repository.delete(id).await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<O> {
        let entity = self.repository.get_by_id(id).await?;
        Ok(O::from(entity))
    }

    pub async fn get_by_filter(&self, req: PaginationInputWithFilter) -> AppResult<PagedList<O>> {
        let (total_rows, items) = self.repository.get_by_filter(&req).await?;
        Ok(PagedList::new(items, total_rows, req.page_number(), req.page_size()).map(O::from))
    }
}
