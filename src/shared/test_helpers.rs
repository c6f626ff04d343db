use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::features::categories::models::{Category, NewCategory};
use crate::features::categories::stores::{
    CategoryStore, CategoryStoreFactory, CategoryUnitOfWork,
};

#[derive(Debug, Clone, Default)]
struct InMemoryState {
    last_id: i64,
    rows: BTreeMap<i64, Category>,
}

/// In-memory stand-in for the categories table.
///
/// Each unit of work edits a private copy that replaces the shared state on
/// commit, so a dropped unit of work leaves nothing behind.
#[derive(Clone, Default)]
pub struct InMemoryCategoryStores {
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryCategoryStores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unit_of_work(&self) -> InMemoryUnitOfWork {
        let working = self.state.lock().unwrap().clone();
        InMemoryUnitOfWork {
            shared: Arc::clone(&self.state),
            working,
        }
    }

    /// Committed rows ordered by id
    pub fn snapshot(&self) -> Vec<Category> {
        self.state.lock().unwrap().rows.values().cloned().collect()
    }
}

pub struct InMemoryUnitOfWork {
    shared: Arc<Mutex<InMemoryState>>,
    working: InMemoryState,
}

#[async_trait]
impl CategoryStore for InMemoryUnitOfWork {
    async fn find_by_id(&mut self, id: i64) -> Result<Option<Category>, sqlx::Error> {
        Ok(self.working.rows.get(&id).cloned())
    }

    async fn exists_by_id(&mut self, id: i64) -> Result<bool, sqlx::Error> {
        Ok(self.working.rows.contains_key(&id))
    }

    async fn insert(&mut self, category: NewCategory) -> Result<Category, sqlx::Error> {
        self.working.last_id += 1;
        let stored = Category {
            id: self.working.last_id,
            name: category.name,
            parent_id: category.parent_id,
        };
        self.working.rows.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn save(&mut self, category: Category) -> Result<Category, sqlx::Error> {
        match self.working.rows.get_mut(&category.id) {
            Some(row) => {
                *row = category.clone();
                Ok(category)
            }
            None => Err(sqlx::Error::RowNotFound),
        }
    }

    async fn delete_by_id(&mut self, id: i64) -> Result<(), sqlx::Error> {
        self.working.rows.remove(&id);
        // Same as the ON DELETE SET NULL foreign key
        for row in self.working.rows.values_mut() {
            if row.parent_id == Some(id) {
                row.parent_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryUnitOfWork for InMemoryUnitOfWork {
    async fn lock_hierarchy(&mut self) -> Result<(), sqlx::Error> {
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), sqlx::Error> {
        let InMemoryUnitOfWork { shared, working } = *self;
        *shared.lock().unwrap() = working;
        Ok(())
    }
}

#[async_trait]
impl CategoryStoreFactory for InMemoryCategoryStores {
    async fn begin(&self) -> Result<Box<dyn CategoryUnitOfWork>, sqlx::Error> {
        Ok(Box::new(self.unit_of_work()))
    }
}
