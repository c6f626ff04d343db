pub mod category_manager;
pub mod category_service;

pub use category_manager::CategoryManager;
pub use category_service::CategoryService;
