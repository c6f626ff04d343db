//! Category hierarchy feature.
//!
//! Categories form a forest: every category holds at most one upward link to
//! its parent, children are implied by those links. The tree rules live in
//! [`services::CategoryManager`]; [`services::CategoryService`] wraps each
//! manager call in one database transaction.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | POST | `/categories` | No | Create category, optionally under a parent |
//! | GET | `/categories/{id}` | No | Get category with its parent chain |
//! | DELETE | `/categories/{id}` | No | Delete category, children become roots |
//! | PUT | `/categories/{id}/move` | No | Reparent category (`newParentId` query) |

pub mod dtos;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod stores;

pub use routes::routes;
pub use services::CategoryService;
