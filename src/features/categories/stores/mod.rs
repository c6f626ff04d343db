pub mod category_store;
pub mod pg_category_store;

pub use category_store::{CategoryStore, CategoryStoreFactory, CategoryUnitOfWork};

#[cfg(test)]
pub use category_store::MockCategoryStore;
