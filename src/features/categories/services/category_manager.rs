use std::collections::HashSet;

use crate::features::categories::errors::{CategoryError, CategoryRole};
use crate::features::categories::models::{Category, NewCategory};
use crate::features::categories::stores::CategoryStore;

type Result<T> = std::result::Result<T, CategoryError>;

/// Enforces the forest invariant on top of a [`CategoryStore`].
///
/// Stateless apart from the store it wraps; the caller decides the
/// transaction boundary by choosing which store to hand in.
pub struct CategoryManager<S> {
    store: S,
}

impl<S: CategoryStore> CategoryManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Create a category, optionally linked under an existing parent
    pub async fn add_category(&mut self, name: String, parent_id: Option<i64>) -> Result<Category> {
        if let Some(parent_id) = parent_id {
            self.find_existing(parent_id, CategoryRole::Parent).await?;
        }

        let category = self.store.insert(NewCategory { name, parent_id }).await?;
        Ok(category)
    }

    /// Hard-delete a category. Children are left to the store's delete rule.
    pub async fn remove_category(&mut self, id: i64) -> Result<()> {
        if !self.store.exists_by_id(id).await? {
            return Err(CategoryError::NotFound {
                role: CategoryRole::Target,
                id,
            });
        }

        self.store.delete_by_id(id).await?;
        Ok(())
    }

    /// Fetch the root node of a subtree. Descendants are not loaded.
    pub async fn get_category_subtree(&mut self, id: i64) -> Result<Category> {
        self.find_existing(id, CategoryRole::Target).await
    }

    /// Reparent a category, or detach it to a root when `new_parent_id` is `None`.
    ///
    /// Moving a category under itself or under any of its descendants fails
    /// with [`CategoryError::Cycle`] before anything is written. Moving to the
    /// parent it already has returns it without a write.
    pub async fn move_subtree(&mut self, id: i64, new_parent_id: Option<i64>) -> Result<Category> {
        let mut node = self.find_existing(id, CategoryRole::Target).await?;

        let Some(new_parent_id) = new_parent_id else {
            node.parent_id = None;
            return Ok(self.store.save(node).await?);
        };

        if node.parent_id == Some(new_parent_id) {
            return Ok(node);
        }

        let new_parent = self
            .find_existing(new_parent_id, CategoryRole::NewParent)
            .await?;
        self.ensure_not_own_ancestor(node.id, new_parent).await?;

        node.parent_id = Some(new_parent_id);
        Ok(self.store.save(node).await?)
    }

    /// Ancestors of `category`, nearest first
    pub async fn lineage(&mut self, category: &Category) -> Result<Vec<Category>> {
        let mut ancestors = Vec::new();
        let mut visited = HashSet::from([category.id]);
        let mut next = category.parent_id;

        while let Some(parent_id) = next {
            if !visited.insert(parent_id) {
                return Err(CategoryError::CorruptHierarchy(parent_id));
            }
            let Some(parent) = self.store.find_by_id(parent_id).await? else {
                break;
            };
            next = parent.parent_id;
            ancestors.push(parent);
        }

        Ok(ancestors)
    }

    async fn find_existing(&mut self, id: i64, role: CategoryRole) -> Result<Category> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(CategoryError::NotFound { role, id })
    }

    /// Walk up from the candidate parent using the current links; reaching
    /// `node_id` means the move would close a cycle.
    async fn ensure_not_own_ancestor(&mut self, node_id: i64, new_parent: Category) -> Result<()> {
        let attempted_parent_id = new_parent.id;
        let mut visited = HashSet::new();
        let mut current = Some(new_parent);

        while let Some(ancestor) = current {
            if ancestor.id == node_id {
                return Err(CategoryError::Cycle {
                    node_id,
                    attempted_parent_id,
                });
            }
            if !visited.insert(ancestor.id) {
                return Err(CategoryError::CorruptHierarchy(ancestor.id));
            }
            current = match ancestor.parent_id {
                Some(parent_id) => self.store.find_by_id(parent_id).await?,
                None => None,
            };
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::categories::stores::MockCategoryStore;
    use crate::shared::test_helpers::InMemoryCategoryStores;
    use mockall::predicate::eq;

    fn category(id: i64, name: &str, parent_id: Option<i64>) -> Category {
        Category {
            id,
            name: name.to_string(),
            parent_id,
        }
    }

    /// Mock whose lookups resolve against a fixed set of rows
    fn store_with(rows: Vec<Category>) -> MockCategoryStore {
        let mut store = MockCategoryStore::new();
        store
            .expect_find_by_id()
            .returning(move |id| Ok(rows.iter().find(|c| c.id == id).cloned()));
        store
    }

    #[tokio::test]
    async fn test_add_root_category() {
        let mut store = MockCategoryStore::new();
        store.expect_find_by_id().never();
        store
            .expect_insert()
            .with(eq(NewCategory {
                name: "Music".to_string(),
                parent_id: None,
            }))
            .times(1)
            .returning(|new| Ok(category(1, &new.name, new.parent_id)));

        let mut manager = CategoryManager::new(store);
        let created = manager.add_category("Music".to_string(), None).await.unwrap();

        assert_eq!(created.name, "Music");
        assert_eq!(created.parent_id, None);
    }

    #[tokio::test]
    async fn test_add_category_under_existing_parent() {
        let mut store = store_with(vec![category(1, "Music", None)]);
        store
            .expect_insert()
            .times(1)
            .returning(|new| Ok(category(2, &new.name, new.parent_id)));

        let mut manager = CategoryManager::new(store);
        let created = manager
            .add_category("Jazz".to_string(), Some(1))
            .await
            .unwrap();

        assert_eq!(created.parent_id, Some(1));
    }

    #[tokio::test]
    async fn test_add_category_with_missing_parent() {
        let mut store = store_with(vec![]);
        store.expect_insert().never();

        let mut manager = CategoryManager::new(store);
        let err = manager
            .add_category("Jazz".to_string(), Some(99))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CategoryError::NotFound {
                role: CategoryRole::Parent,
                id: 99
            }
        ));
    }

    #[tokio::test]
    async fn test_remove_existing_category_deletes_once() {
        let mut store = MockCategoryStore::new();
        store
            .expect_exists_by_id()
            .with(eq(1))
            .returning(|_| Ok(true));
        store
            .expect_delete_by_id()
            .with(eq(1))
            .times(1)
            .returning(|_| Ok(()));

        let mut manager = CategoryManager::new(store);
        manager.remove_category(1).await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_missing_category_does_not_delete() {
        let mut store = MockCategoryStore::new();
        store.expect_exists_by_id().returning(|_| Ok(false));
        store.expect_delete_by_id().never();

        let mut manager = CategoryManager::new(store);
        let err = manager.remove_category(1).await.unwrap_err();

        assert!(matches!(
            err,
            CategoryError::NotFound {
                role: CategoryRole::Target,
                id: 1
            }
        ));
    }

    #[tokio::test]
    async fn test_get_category_subtree() {
        let mut manager = CategoryManager::new(store_with(vec![category(1, "Music", None)]));

        let found = manager.get_category_subtree(1).await.unwrap();
        assert_eq!(found, category(1, "Music", None));

        let err = manager.get_category_subtree(2).await.unwrap_err();
        assert!(matches!(err, CategoryError::NotFound { id: 2, .. }));
    }

    #[tokio::test]
    async fn test_move_to_root_saves_once() {
        let mut store = store_with(vec![category(1, "Music", None), category(2, "Jazz", Some(1))]);
        store
            .expect_save()
            .with(eq(category(2, "Jazz", None)))
            .times(1)
            .returning(|saved| Ok(saved));

        let mut manager = CategoryManager::new(store);
        let moved = manager.move_subtree(2, None).await.unwrap();

        assert!(moved.is_root());
    }

    #[tokio::test]
    async fn test_move_to_current_parent_does_not_save() {
        let mut store = store_with(vec![category(1, "Music", None), category(2, "Jazz", Some(1))]);
        store.expect_save().never();

        let mut manager = CategoryManager::new(store);
        let moved = manager.move_subtree(2, Some(1)).await.unwrap();

        assert_eq!(moved, category(2, "Jazz", Some(1)));
    }

    #[tokio::test]
    async fn test_move_under_descendant_is_a_cycle() {
        // 1 is the parent of 2; putting 1 under 2 would loop
        let mut store = store_with(vec![category(1, "Music", None), category(2, "Jazz", Some(1))]);
        store.expect_save().never();

        let mut manager = CategoryManager::new(store);
        let err = manager.move_subtree(1, Some(2)).await.unwrap_err();

        assert!(matches!(
            err,
            CategoryError::Cycle {
                node_id: 1,
                attempted_parent_id: 2
            }
        ));
    }

    #[tokio::test]
    async fn test_move_under_itself_is_a_cycle() {
        let mut store = store_with(vec![category(1, "Music", None)]);
        store.expect_save().never();

        let mut manager = CategoryManager::new(store);
        let err = manager.move_subtree(1, Some(1)).await.unwrap_err();

        assert!(matches!(err, CategoryError::Cycle { node_id: 1, .. }));
    }

    #[tokio::test]
    async fn test_move_to_missing_parent() {
        let mut store = store_with(vec![category(1, "Music", None)]);
        store.expect_save().never();

        let mut manager = CategoryManager::new(store);
        let err = manager.move_subtree(1, Some(42)).await.unwrap_err();

        assert!(matches!(
            err,
            CategoryError::NotFound {
                role: CategoryRole::NewParent,
                id: 42
            }
        ));
    }

    #[tokio::test]
    async fn test_move_missing_category() {
        let mut store = store_with(vec![]);
        store.expect_save().never();

        let mut manager = CategoryManager::new(store);
        let err = manager.move_subtree(5, None).await.unwrap_err();

        assert!(matches!(
            err,
            CategoryError::NotFound {
                role: CategoryRole::Target,
                id: 5
            }
        ));
    }

    #[tokio::test]
    async fn test_cycle_check_reports_corrupt_chain() {
        // 2 and 3 already point at each other
        let mut store = store_with(vec![
            category(1, "Music", None),
            category(2, "Jazz", Some(3)),
            category(3, "Bebop", Some(2)),
        ]);
        store.expect_save().never();

        let mut manager = CategoryManager::new(store);
        let err = manager.move_subtree(1, Some(2)).await.unwrap_err();

        assert!(matches!(err, CategoryError::CorruptHierarchy(_)));
    }

    #[tokio::test]
    async fn test_lineage_is_nearest_first() {
        let mut manager = CategoryManager::new(store_with(vec![
            category(1, "Music", None),
            category(2, "Jazz", Some(1)),
            category(3, "Bebop", Some(2)),
        ]));

        let lineage = manager
            .lineage(&category(3, "Bebop", Some(2)))
            .await
            .unwrap();

        let ids: Vec<i64> = lineage.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_three_level_chain_moves() {
        let stores = InMemoryCategoryStores::new();
        let mut manager = CategoryManager::new(stores.unit_of_work());

        let a = manager.add_category("A".to_string(), None).await.unwrap();
        let b = manager.add_category("B".to_string(), Some(a.id)).await.unwrap();
        let c = manager.add_category("C".to_string(), Some(b.id)).await.unwrap();

        let err = manager.move_subtree(a.id, Some(c.id)).await.unwrap_err();
        assert!(matches!(err, CategoryError::Cycle { .. }));

        let moved = manager.move_subtree(c.id, Some(a.id)).await.unwrap();
        assert_eq!(moved.parent_id, Some(a.id));

        // A is untouched by the rejected move
        let a_now = manager.get_category_subtree(a.id).await.unwrap();
        assert!(a_now.is_root());

        let lineage = manager.lineage(&moved).await.unwrap();
        assert_eq!(lineage, vec![a]);
    }
}
