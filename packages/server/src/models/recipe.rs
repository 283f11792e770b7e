use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::entity::recipe;
use crate::error::AppError;
use crate::models::shared::{Pagination, dedup_ids, validate_text_field};
use crate::models::tag::TagResponse;
use crate::models::user::UserResponse;

const NAME_MAX: usize = 200;

/// One `{id, amount}` pair of a recipe write request.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq, utoipa::ToSchema)]
pub struct IngredientLine {
    /// Ingredient ID.
    #[schema(example = 1)]
    pub id: i32,
    /// Quantity in the ingredient's measurement unit (>= 1).
    #[schema(example = 100)]
    pub amount: i32,
}

/// Write model for creating or replacing a recipe.
///
/// Ingredient lines and tags always replace the stored set in full.
#[derive(Deserialize, Debug, utoipa::ToSchema)]
pub struct RecipeWriteRequest {
    #[schema(example = "Pancakes")]
    pub name: String,
    #[schema(example = "Mix everything and fry.")]
    pub text: String,
    /// Minutes (>= 1).
    #[schema(example = 20)]
    pub cooking_time: i32,
    /// Tag IDs. Duplicates are ignored.
    #[serde(default)]
    #[schema(example = json!([1, 2]))]
    pub tags: Vec<i32>,
    pub ingredients: Vec<IngredientLine>,
    /// Inline image as `data:image/<type>;base64,<payload>`. Required on create.
    #[schema(example = "data:image/png;base64,iVBORw0KGgo=")]
    pub image: Option<String>,
}

/// A write request that passed validation.
#[derive(Debug)]
pub struct ValidRecipe {
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
    pub tags: Vec<i32>,
    pub ingredients: Vec<IngredientLine>,
    pub image: Option<String>,
}

impl RecipeWriteRequest {
    /// Check the payload. Rules run in a fixed order so the first failing rule decides
    /// the error message.
    pub fn validate(self, image_required: bool) -> Result<ValidRecipe, AppError> {
        validate_ingredient_lines(&self.ingredients)?;
        if self.cooking_time < 1 {
            return Err(AppError::Validation("invalid cooking time".into()));
        }
        if self.ingredients.is_empty() {
            return Err(AppError::Validation(
                "at least one ingredient required".into(),
            ));
        }
        validate_text_field(&self.name, "Name", NAME_MAX)?;
        if self.text.trim().is_empty() {
            return Err(AppError::Validation("Text must not be empty".into()));
        }
        let image = self.image.filter(|s| !s.trim().is_empty());
        if image_required && image.is_none() {
            return Err(AppError::Validation("Image is required".into()));
        }

        Ok(ValidRecipe {
            name: self.name.trim().to_string(),
            text: self.text,
            cooking_time: self.cooking_time,
            tags: dedup_ids(&self.tags),
            ingredients: self.ingredients,
            image,
        })
    }
}

/// Amount bounds first, then duplicates.
pub fn validate_ingredient_lines(lines: &[IngredientLine]) -> Result<(), AppError> {
    if lines.iter().any(|l| l.amount < 1) {
        return Err(AppError::Validation("amount below minimum".into()));
    }
    let mut seen = HashSet::new();
    if !lines.iter().all(|l| seen.insert(l.id)) {
        return Err(AppError::Validation("duplicate ingredient".into()));
    }
    Ok(())
}

/// Public URL of a stored media key.
pub fn media_url(prefix: &str, key: &str) -> String {
    if prefix.ends_with('/') {
        format!("{prefix}{key}")
    } else {
        format!("{prefix}/{key}")
    }
}

/// One ingredient line of a recipe as seen by readers.
#[derive(Serialize, Clone, Debug, utoipa::ToSchema)]
pub struct RecipeIngredientResponse {
    /// Ingredient ID.
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "flour")]
    pub name: String,
    #[schema(example = "g")]
    pub measurement_unit: String,
    #[schema(example = 100)]
    pub amount: i32,
}

/// Read model of a recipe for a particular viewer.
#[derive(Serialize, Debug, utoipa::ToSchema)]
pub struct RecipeResponse {
    #[schema(example = 7)]
    pub id: i32,
    pub tags: Vec<TagResponse>,
    pub author: UserResponse,
    pub ingredients: Vec<RecipeIngredientResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    #[schema(example = "Pancakes")]
    pub name: String,
    /// Public image URL.
    #[schema(example = "/media/recipes/3f2a.png")]
    pub image: Option<String>,
    pub text: String,
    #[schema(example = 20)]
    pub cooking_time: i32,
}

/// Compact recipe card used by favorites, the cart and subscriptions.
#[derive(Serialize, Clone, Debug, utoipa::ToSchema)]
pub struct ShortRecipeResponse {
    #[schema(example = 7)]
    pub id: i32,
    #[schema(example = "Pancakes")]
    pub name: String,
    #[schema(example = "/media/recipes/3f2a.png")]
    pub image: Option<String>,
    #[schema(example = 20)]
    pub cooking_time: i32,
}

impl ShortRecipeResponse {
    pub fn from_model(m: recipe::Model, url_prefix: &str) -> Self {
        Self {
            id: m.id,
            name: m.name,
            image: m.image.map(|key| media_url(url_prefix, &key)),
            cooking_time: m.cooking_time,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RecipeListResponse {
    pub data: Vec<RecipeResponse>,
    pub pagination: Pagination,
}

/// Recipe list filters.
///
/// Parsed from raw query pairs so `tags` may be repeated as well as comma-separated.
#[derive(Debug, Default, PartialEq, Eq, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecipeListQuery {
    /// Page number (1-based). Default: 1.
    pub page: Option<u64>,
    /// Recipes per page.
    pub limit: Option<u64>,
    /// Tag slugs; a recipe matches when it carries any of them.
    pub tags: Vec<String>,
    /// Author user ID.
    pub author: Option<i32>,
    /// `1` to show only the viewer's favorites. Ignored for anonymous viewers.
    #[param(value_type = Option<u8>)]
    pub is_favorited: bool,
    /// `1` to show only recipes in the viewer's cart. Ignored for anonymous viewers.
    #[param(value_type = Option<u8>)]
    pub is_in_shopping_cart: bool,
}

impl RecipeListQuery {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Result<Self, AppError> {
        let mut query = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "page" => query.page = Some(parse_number(&key, &value)?),
                "limit" => query.limit = Some(parse_number(&key, &value)?),
                "author" => query.author = Some(parse_number(&key, &value)?),
                "tags" => query.tags.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from),
                ),
                "is_favorited" => query.is_favorited = parse_flag(&key, &value)?,
                "is_in_shopping_cart" => query.is_in_shopping_cart = parse_flag(&key, &value)?,
                _ => {}
            }
        }
        Ok(query)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, AppError> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::Validation(format!("{key} must be a number")))
}

fn parse_flag(key: &str, value: &str) -> Result<bool, AppError> {
    match value.trim() {
        "1" | "true" => Ok(true),
        "0" | "false" | "" => Ok(false),
        _ => Err(AppError::Validation(format!("{key} must be 0 or 1"))),
    }
}
