use std::collections::HashSet;

use sea_orm::sea_query::{Query as SeaQuery, SelectStatement};
use sea_orm::*;

use crate::entity::{cart, favorite_recipe, recipe};
use crate::error::AppError;
use crate::models::recipe::ShortRecipeResponse;

/// A `(user, recipe)` relation that a user can join and leave.
pub trait Membership: EntityTrait<Model: Sync> {
    /// Human-readable name of the collection, used in error messages.
    const COLLECTION: &'static str;

    fn user_column() -> Self::Column;
    fn recipe_column() -> Self::Column;
    fn new_row(user_id: i32, recipe_id: i32) -> Self::ActiveModel;
}

impl Membership for favorite_recipe::Entity {
    const COLLECTION: &'static str = "favorites";

    fn user_column() -> Self::Column {
        favorite_recipe::Column::UserId
    }

    fn recipe_column() -> Self::Column {
        favorite_recipe::Column::RecipeId
    }

    fn new_row(user_id: i32, recipe_id: i32) -> Self::ActiveModel {
        favorite_recipe::ActiveModel {
            user_id: Set(user_id),
            recipe_id: Set(recipe_id),
            created_at: Set(chrono::Utc::now()),
        }
    }
}

impl Membership for cart::Entity {
    const COLLECTION: &'static str = "shopping cart";

    fn user_column() -> Self::Column {
        cart::Column::UserId
    }

    fn recipe_column() -> Self::Column {
        cart::Column::RecipeId
    }

    fn new_row(user_id: i32, recipe_id: i32) -> Self::ActiveModel {
        cart::ActiveModel {
            user_id: Set(user_id),
            recipe_id: Set(recipe_id),
            created_at: Set(chrono::Utc::now()),
        }
    }
}

async fn find_recipe<C: ConnectionTrait>(db: &C, id: i32) -> Result<recipe::Model, AppError> {
    recipe::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe not found".into()))
}

async fn is_member<M: Membership, C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    recipe_id: i32,
) -> Result<bool, DbErr> {
    let count = M::find()
        .filter(M::user_column().eq(user_id))
        .filter(M::recipe_column().eq(recipe_id))
        .count(db)
        .await?;
    Ok(count > 0)
}

/// Put a recipe into the user's collection and return its short card.
pub async fn add<M: Membership, C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    recipe_id: i32,
    url_prefix: &str,
) -> Result<ShortRecipeResponse, AppError> {
    let recipe = find_recipe(db, recipe_id).await?;
    let conflict = || AppError::Conflict(format!("Recipe is already in {}", M::COLLECTION));

    if is_member::<M, _>(db, user_id, recipe_id).await? {
        return Err(conflict());
    }

    match M::insert(M::new_row(user_id, recipe_id))
        .exec_without_returning(db)
        .await
    {
        Ok(_) => {}
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            tracing::debug!(collection = M::COLLECTION, "Membership race caught on insert");
            return Err(conflict());
        }
        Err(e) => return Err(e.into()),
    }

    Ok(ShortRecipeResponse::from_model(recipe, url_prefix))
}

/// Take a recipe out of the user's collection.
pub async fn remove<M: Membership, C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    recipe_id: i32,
) -> Result<(), AppError> {
    find_recipe(db, recipe_id).await?;

    let result = M::delete_many()
        .filter(M::user_column().eq(user_id))
        .filter(M::recipe_column().eq(recipe_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotMember(format!(
            "Recipe is not in {}",
            M::COLLECTION
        )));
    }
    Ok(())
}

/// Which of `recipe_ids` are in the user's collection.
pub async fn member_recipe_ids<M: Membership, C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    recipe_ids: &[i32],
) -> Result<HashSet<i32>, DbErr> {
    if recipe_ids.is_empty() {
        return Ok(HashSet::new());
    }
    let ids: Vec<i32> = M::find()
        .select_only()
        .column(M::recipe_column())
        .filter(M::user_column().eq(user_id))
        .filter(M::recipe_column().is_in(recipe_ids.to_vec()))
        .into_tuple()
        .all(db)
        .await?;
    Ok(ids.into_iter().collect())
}

/// `SELECT recipe_id FROM <relation> WHERE user_id = ?`, for `IN` filters.
pub fn recipe_ids_subquery<M: Membership>(user_id: i32) -> SelectStatement {
    SeaQuery::select()
        .column(M::recipe_column())
        .from(M::default())
        .and_where(M::user_column().eq(user_id))
        .to_owned()
}
