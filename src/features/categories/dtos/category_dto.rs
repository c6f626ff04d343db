use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::features::categories::models::Category;

/// Request DTO for creating a category
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryDto {
    /// Category name (required, not blank)
    #[validate(
        length(max = 255, message = "Name must not exceed 255 characters"),
        custom(function = "validate_not_blank", message = "Name is required")
    )]
    pub name: String,

    /// Optional id of the parent category
    pub parent_id: Option<i64>,
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Query params for moving a category
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MoveCategoryQuery {
    /// New parent id; omit to make the category a root
    pub new_parent_id: Option<i64>,
}

/// Response DTO for category, with its parent chain nested upward
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(no_recursion)]
pub struct CategoryResponseDto {
    pub id: i64,
    pub name: String,
    pub parent: Option<Box<CategoryResponseDto>>,
}

impl CategoryResponseDto {
    /// Build the nested form from a category and its ancestors (nearest first)
    pub fn from_lineage(category: Category, ancestors: Vec<Category>) -> Self {
        let parent = ancestors
            .into_iter()
            .rev()
            .fold(None, |parent, ancestor| {
                Some(Box::new(CategoryResponseDto {
                    id: ancestor.id,
                    name: ancestor.name,
                    parent,
                }))
            });

        Self {
            id: category.id,
            name: category.name,
            parent,
        }
    }
}
