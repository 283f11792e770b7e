use std::collections::HashSet;

use common::MediaStore;
use sea_orm::sea_query::LockType;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{
    cart, favorite_recipe, ingredient, recipe, recipe_ingredient, recipe_tag, tag,
};
use crate::error::AppError;
use crate::models::recipe::{IngredientLine, RecipeWriteRequest, ValidRecipe};
use crate::utils::data_uri::{DecodedImage, decode_image};

const IMAGE_NAMESPACE: &str = "recipes";

/// What a write does to the recipe aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeOperation {
    /// Insert a new recipe owned by `author_id`.
    Create { author_id: i32 },
    /// Replace recipe `recipe_id`. Only its author may do this.
    Update { recipe_id: i32, editor_id: i32 },
}

/// Transactional writer for a recipe together with its ingredient lines and tag links.
pub struct RecipeWriter<'a> {
    db: &'a DatabaseConnection,
    media: &'a dyn MediaStore,
}

impl<'a> RecipeWriter<'a> {
    pub fn new(db: &'a DatabaseConnection, media: &'a dyn MediaStore) -> Self {
        Self { db, media }
    }

    /// Validate and persist. Either the whole aggregate is written or nothing is.
    #[instrument(skip(self, payload))]
    pub async fn write(
        &self,
        op: RecipeOperation,
        payload: RecipeWriteRequest,
    ) -> Result<recipe::Model, AppError> {
        let valid = payload.validate(matches!(op, RecipeOperation::Create { .. }))?;
        let image = valid
            .image
            .as_deref()
            .map(decode_image)
            .transpose()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let txn = self.db.begin().await?;

        let (author_id, existing) = match op {
            RecipeOperation::Create { author_id } => (author_id, None),
            RecipeOperation::Update {
                recipe_id,
                editor_id,
            } => {
                let current = find_recipe_for_update(&txn, recipe_id).await?;
                if current.author_id != editor_id {
                    return Err(AppError::PermissionDenied);
                }
                (current.author_id, Some(current))
            }
        };

        ensure_ingredients_exist(&txn, &valid.ingredients).await?;
        ensure_tags_exist(&txn, &valid.tags).await?;

        let stored = match image {
            Some(img) => Some(self.store_image(&txn, &img).await?),
            None => None,
        };
        let image_key = stored.as_ref().map(|s| s.key.clone());

        match persist(txn, author_id, existing, valid, image_key).await {
            Ok((model, replaced_image)) => {
                if let Some(key) = replaced_image {
                    self.release_image(&key).await;
                }
                Ok(model)
            }
            Err(e) => {
                if let Some(StoredImage { key, created: true }) = stored {
                    self.release_image(&key).await;
                }
                Err(e)
            }
        }
    }

    /// Put the image while holding its key lock in `txn`, so no release of the same key
    /// can run until this write commits or rolls back.
    async fn store_image(
        &self,
        txn: &DatabaseTransaction,
        image: &DecodedImage,
    ) -> Result<StoredImage, AppError> {
        let key = self
            .media
            .key_for(IMAGE_NAMESPACE, &image.extension, &image.bytes)?;
        lock_image(txn, &key).await?;
        let created = !self.media.exists(&key).await?;
        let key = self
            .media
            .put(IMAGE_NAMESPACE, &image.extension, &image.bytes)
            .await?;
        Ok(StoredImage { key, created })
    }

    /// Delete a recipe together with its lines, tag links, favorites and cart entries.
    #[instrument(skip(self))]
    pub async fn delete(&self, recipe_id: i32, editor_id: i32) -> Result<(), AppError> {
        let txn = self.db.begin().await?;
        let current = find_recipe_for_update(&txn, recipe_id).await?;
        if current.author_id != editor_id {
            return Err(AppError::PermissionDenied);
        }

        recipe_ingredient::Entity::delete_many()
            .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
            .exec(&txn)
            .await?;
        recipe_tag::Entity::delete_many()
            .filter(recipe_tag::Column::RecipeId.eq(recipe_id))
            .exec(&txn)
            .await?;
        favorite_recipe::Entity::delete_many()
            .filter(favorite_recipe::Column::RecipeId.eq(recipe_id))
            .exec(&txn)
            .await?;
        cart::Entity::delete_many()
            .filter(cart::Column::RecipeId.eq(recipe_id))
            .exec(&txn)
            .await?;
        recipe::Entity::delete_by_id(recipe_id).exec(&txn).await?;

        txn.commit().await?;

        if let Some(key) = current.image {
            self.release_image(&key).await;
        }
        Ok(())
    }

    /// Remove a stored image once no recipe refers to it. Failures are only logged.
    async fn release_image(&self, key: &str) {
        match self.try_release_image(key).await {
            Ok(true) => tracing::debug!(key, "Deleted unused image"),
            Ok(false) => {}
            Err(e) => tracing::warn!(key, "Failed to release image: {:?}", e),
        }
    }

    async fn try_release_image(&self, key: &str) -> Result<bool, AppError> {
        let txn = self.db.begin().await?;
        lock_image(&txn, key).await?;
        let still_used = recipe::Entity::find()
            .filter(recipe::Column::Image.eq(key))
            .count(&txn)
            .await?;
        let deleted = still_used == 0 && self.media.delete(key).await?;
        txn.commit().await?;
        Ok(deleted)
    }
}

/// An image put by the current write.
struct StoredImage {
    key: String,
    /// The object did not exist before this write.
    created: bool,
}

/// Insert or update the recipe row, replace its lines and tags, and commit.
/// Returns the written row and the image key it no longer uses.
async fn persist(
    txn: DatabaseTransaction,
    author_id: i32,
    existing: Option<recipe::Model>,
    valid: ValidRecipe,
    image_key: Option<String>,
) -> Result<(recipe::Model, Option<String>), AppError> {
    let now = chrono::Utc::now();
    let (model, replaced_image) = match existing {
        None => {
            let new_recipe = recipe::ActiveModel {
                name: Set(valid.name),
                text: Set(valid.text),
                image: Set(image_key),
                cooking_time: Set(valid.cooking_time),
                author_id: Set(author_id),
                pub_date: Set(now),
                ..Default::default()
            };
            (new_recipe.insert(&txn).await?, None)
        }
        Some(current) => {
            let old_image = current.image.clone();
            let mut active: recipe::ActiveModel = current.into();
            active.name = Set(valid.name);
            active.text = Set(valid.text);
            active.cooking_time = Set(valid.cooking_time);
            active.pub_date = Set(now);
            let replaced = match image_key {
                Some(key) => {
                    let replaced = old_image.filter(|old| *old != key);
                    active.image = Set(Some(key));
                    replaced
                }
                None => None,
            };
            let model = active.update(&txn).await?;

            recipe_ingredient::Entity::delete_many()
                .filter(recipe_ingredient::Column::RecipeId.eq(model.id))
                .exec(&txn)
                .await?;
            recipe_tag::Entity::delete_many()
                .filter(recipe_tag::Column::RecipeId.eq(model.id))
                .exec(&txn)
                .await?;
            (model, replaced)
        }
    };

    insert_lines(&txn, model.id, &valid.ingredients).await?;
    insert_tags(&txn, model.id, &valid.tags).await?;

    txn.commit().await?;
    Ok((model, replaced_image))
}

/// Transaction-scoped advisory lock on an image key. Image puts and the reference check
/// before a delete hold it until their transaction ends.
async fn lock_image(txn: &DatabaseTransaction, key: &str) -> Result<(), DbErr> {
    txn.execute_raw(Statement::from_sql_and_values(
        ConnectionTrait::get_database_backend(txn),
        "SELECT pg_advisory_xact_lock(hashtextextended($1, 0))",
        [key.into()],
    ))
    .await?;
    Ok(())
}

async fn find_recipe_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<recipe::Model, AppError> {
    recipe::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe not found".into()))
}

async fn ensure_ingredients_exist<C: ConnectionTrait>(
    db: &C,
    lines: &[IngredientLine],
) -> Result<(), AppError> {
    let ids: Vec<i32> = lines.iter().map(|l| l.id).collect();
    let found: HashSet<i32> = ingredient::Entity::find()
        .select_only()
        .column(ingredient::Column::Id)
        .filter(ingredient::Column::Id.is_in(ids.clone()))
        .into_tuple::<i32>()
        .all(db)
        .await?
        .into_iter()
        .collect();
    match ids.into_iter().find(|id| !found.contains(id)) {
        Some(missing) => Err(AppError::NotFound(format!(
            "Ingredient {missing} not found"
        ))),
        None => Ok(()),
    }
}

async fn ensure_tags_exist<C: ConnectionTrait>(db: &C, ids: &[i32]) -> Result<(), AppError> {
    if ids.is_empty() {
        return Ok(());
    }
    let found: HashSet<i32> = tag::Entity::find()
        .select_only()
        .column(tag::Column::Id)
        .filter(tag::Column::Id.is_in(ids.to_vec()))
        .into_tuple::<i32>()
        .all(db)
        .await?
        .into_iter()
        .collect();
    match ids.iter().find(|id| !found.contains(id)) {
        Some(missing) => Err(AppError::NotFound(format!("Tag {missing} not found"))),
        None => Ok(()),
    }
}

/// Lines are inserted in payload order so their ids preserve it.
async fn insert_lines<C: ConnectionTrait>(
    db: &C,
    recipe_id: i32,
    lines: &[IngredientLine],
) -> Result<(), DbErr> {
    let models = lines.iter().map(|l| recipe_ingredient::ActiveModel {
        recipe_id: Set(recipe_id),
        ingredient_id: Set(l.id),
        amount: Set(l.amount),
        ..Default::default()
    });
    recipe_ingredient::Entity::insert_many(models)
        .exec_without_returning(db)
        .await?;
    Ok(())
}

async fn insert_tags<C: ConnectionTrait>(
    db: &C,
    recipe_id: i32,
    ids: &[i32],
) -> Result<(), DbErr> {
    if ids.is_empty() {
        return Ok(());
    }
    let models = ids.iter().map(|&tag_id| recipe_tag::ActiveModel {
        recipe_id: Set(recipe_id),
        tag_id: Set(tag_id),
    });
    recipe_tag::Entity::insert_many(models)
        .exec_without_returning(db)
        .await?;
    Ok(())
}
