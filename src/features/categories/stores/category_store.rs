use async_trait::async_trait;

use crate::features::categories::models::{Category, NewCategory};

/// Key-by-id persistence for categories.
///
/// Implementations own durability only; tree rules are enforced by
/// `CategoryManager`. Methods take `&mut self` because a store is normally
/// bound to a single open transaction.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryStore: Send {
    async fn find_by_id(&mut self, id: i64) -> Result<Option<Category>, sqlx::Error>;

    async fn exists_by_id(&mut self, id: i64) -> Result<bool, sqlx::Error>;

    /// Persist a new category and return it with its assigned id.
    async fn insert(&mut self, category: NewCategory) -> Result<Category, sqlx::Error>;

    /// Persist changes to an existing category.
    async fn save(&mut self, category: Category) -> Result<Category, sqlx::Error>;

    async fn delete_by_id(&mut self, id: i64) -> Result<(), sqlx::Error>;
}

#[async_trait]
impl<T: CategoryStore + ?Sized> CategoryStore for Box<T> {
    async fn find_by_id(&mut self, id: i64) -> Result<Option<Category>, sqlx::Error> {
        (**self).find_by_id(id).await
    }

    async fn exists_by_id(&mut self, id: i64) -> Result<bool, sqlx::Error> {
        (**self).exists_by_id(id).await
    }

    async fn insert(&mut self, category: NewCategory) -> Result<Category, sqlx::Error> {
        (**self).insert(category).await
    }

    async fn save(&mut self, category: Category) -> Result<Category, sqlx::Error> {
        (**self).save(category).await
    }

    async fn delete_by_id(&mut self, id: i64) -> Result<(), sqlx::Error> {
        (**self).delete_by_id(id).await
    }
}

/// A store bound to one transaction. Dropping it without `commit` discards
/// every write made through it.
#[async_trait]
pub trait CategoryUnitOfWork: CategoryStore {
    /// Block other hierarchy writers until this unit of work ends.
    async fn lock_hierarchy(&mut self) -> Result<(), sqlx::Error>;

    async fn commit(self: Box<Self>) -> Result<(), sqlx::Error>;
}

/// Opens units of work, one per service call
#[async_trait]
pub trait CategoryStoreFactory: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn CategoryUnitOfWork>, sqlx::Error>;
}
