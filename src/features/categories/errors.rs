use std::fmt;

use thiserror::Error;

use crate::core::error::AppError;

/// Which reference in a request failed to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryRole {
    /// The category the operation acts on
    Target,
    /// The parent named when creating a category
    Parent,
    /// The destination parent of a move
    NewParent,
}

impl fmt::Display for CategoryRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CategoryRole::Target => "Category",
            CategoryRole::Parent => "Parent category",
            CategoryRole::NewParent => "New parent category",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error)]
pub enum CategoryError {
    #[error("{role} not found with id: {id}")]
    NotFound { role: CategoryRole, id: i64 },

    #[error("Cannot move category into its own subtree. Cycle detected.")]
    Cycle { node_id: i64, attempted_parent_id: i64 },

    /// Stored parent links already loop; the forest invariant was broken outside this service
    #[error("Category hierarchy is corrupt: parent chain revisits category {0}")]
    CorruptHierarchy(i64),

    #[error(transparent)]
    Store(#[from] sqlx::Error),
}

impl From<CategoryError> for AppError {
    fn from(err: CategoryError) -> Self {
        match err {
            CategoryError::NotFound { .. } => AppError::BadRequest(err.to_string()),
            CategoryError::Cycle {
                node_id,
                attempted_parent_id,
            } => {
                tracing::warn!(
                    "Rejected move of category {} under {}: cycle",
                    node_id,
                    attempted_parent_id
                );
                AppError::BadRequest(err.to_string())
            }
            CategoryError::CorruptHierarchy(_) => AppError::Internal(err.to_string()),
            CategoryError::Store(e) => AppError::Database(e),
        }
    }
}
