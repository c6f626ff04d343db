use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::{CategoryResponseDto, CreateCategoryDto};
use crate::features::categories::services::CategoryManager;
use crate::features::categories::stores::{CategoryStoreFactory, CategoryUnitOfWork};

type TxManager = CategoryManager<Box<dyn CategoryUnitOfWork>>;

/// Service for category operations.
///
/// Every method runs inside one unit of work: it is committed only when the
/// whole operation succeeded, otherwise dropped (rolled back).
pub struct CategoryService {
    stores: Arc<dyn CategoryStoreFactory>,
}

impl CategoryService {
    pub fn new(stores: Arc<dyn CategoryStoreFactory>) -> Self {
        Self { stores }
    }

    async fn begin(&self) -> Result<TxManager> {
        let store = self.stores.begin().await.map_err(|e| {
            tracing::error!("Failed to open category transaction: {:?}", e);
            AppError::Database(e)
        })?;
        Ok(CategoryManager::new(store))
    }

    /// Create a category, optionally under an existing parent
    pub async fn create(&self, dto: CreateCategoryDto) -> Result<CategoryResponseDto> {
        let mut manager = self.begin().await?;

        let category = manager.add_category(dto.name, dto.parent_id).await?;
        let lineage = manager.lineage(&category).await?;
        manager.into_store().commit().await?;

        tracing::info!(
            "Category created: id={}, parent_id={:?}",
            category.id,
            category.parent_id
        );

        Ok(CategoryResponseDto::from_lineage(category, lineage))
    }

    /// Delete a category; its children become roots
    pub async fn delete(&self, id: i64) -> Result<()> {
        let mut manager = self.begin().await?;

        manager.remove_category(id).await?;
        manager.into_store().commit().await?;

        tracing::info!("Category deleted: id={}", id);
        Ok(())
    }

    /// Get a single category with its parent chain
    pub async fn get(&self, id: i64) -> Result<CategoryResponseDto> {
        let mut manager = self.begin().await?;

        let category = manager.get_category_subtree(id).await?;
        let lineage = manager.lineage(&category).await?;
        manager.into_store().commit().await?;

        Ok(CategoryResponseDto::from_lineage(category, lineage))
    }

    /// Reparent a category, or make it a root when `new_parent_id` is `None`
    pub async fn move_subtree(
        &self,
        id: i64,
        new_parent_id: Option<i64>,
    ) -> Result<CategoryResponseDto> {
        let mut manager = self.begin().await?;
        // Two concurrent moves could each pass the cycle check on their own
        manager.store_mut().lock_hierarchy().await?;

        let category = manager.move_subtree(id, new_parent_id).await?;
        let lineage = manager.lineage(&category).await?;
        manager.into_store().commit().await?;

        tracing::info!(
            "Category moved: id={}, parent_id={:?}, root={}",
            category.id,
            category.parent_id,
            category.is_root()
        );

        Ok(CategoryResponseDto::from_lineage(category, lineage))
    }
}
