use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::features::categories::models::{Category, NewCategory};
use crate::features::categories::stores::{
    CategoryStore, CategoryStoreFactory, CategoryUnitOfWork,
};

/// Advisory lock key guarding structural changes to the category tree
const HIERARCHY_LOCK_KEY: i64 = 0x6361_7465_676f_7279;

/// Postgres-backed store running every query inside one transaction
pub struct PgCategoryStore {
    tx: Transaction<'static, Postgres>,
}

impl PgCategoryStore {
    pub async fn begin(pool: &PgPool) -> Result<Self, sqlx::Error> {
        Ok(Self {
            tx: pool.begin().await?,
        })
    }
}

#[async_trait]
impl CategoryStore for PgCategoryStore {
    async fn find_by_id(&mut self, id: i64) -> Result<Option<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, parent_id
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .inspect_err(|e| tracing::error!("Failed to fetch category {}: {:?}", id, e))
    }

    async fn exists_by_id(&mut self, id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *self.tx)
            .await
    }

    async fn insert(&mut self, category: NewCategory) -> Result<Category, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, parent_id)
            VALUES ($1, $2)
            RETURNING id, name, parent_id
            "#,
        )
        .bind(&category.name)
        .bind(category.parent_id)
        .fetch_one(&mut *self.tx)
        .await
        .inspect_err(|e| tracing::error!("Failed to insert category: {:?}", e))
    }

    async fn save(&mut self, category: Category) -> Result<Category, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = $2, parent_id = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, parent_id
            "#,
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(category.parent_id)
        .fetch_one(&mut *self.tx)
        .await
        .inspect_err(|e| tracing::error!("Failed to update category {}: {:?}", category.id, e))
    }

    async fn delete_by_id(&mut self, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CategoryUnitOfWork for PgCategoryStore {
    async fn lock_hierarchy(&mut self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(HIERARCHY_LOCK_KEY)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), sqlx::Error> {
        self.tx.commit().await
    }
}

#[async_trait]
impl CategoryStoreFactory for PgPool {
    async fn begin(&self) -> Result<Box<dyn CategoryUnitOfWork>, sqlx::Error> {
        Ok(Box::new(PgCategoryStore::begin(self).await?))
    }
}
