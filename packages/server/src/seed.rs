use std::path::Path;

use anyhow::Context;
use sea_orm::sea_query::{Index, OnConflict, PostgresQueryBuilder};
use sea_orm::*;
use tracing::info;

use crate::config::SeedConfig;
use crate::entity::{cart, favorite_recipe, follow, ingredient, recipe, tag};
use crate::models::ingredient::IngredientFixture;
use crate::models::shared::validate_text_field;
use crate::models::tag::{TagFixture, validate_tag_fixture};

/// Parse and validate a JSON array of tags.
pub fn parse_tags(json: &str) -> anyhow::Result<Vec<TagFixture>> {
    let tags: Vec<TagFixture> = serde_json::from_str(json).context("malformed tag fixtures")?;
    for tag in &tags {
        validate_tag_fixture(tag)
            .map_err(|e| anyhow::anyhow!("invalid tag '{}': {:?}", tag.name, e))?;
    }
    Ok(tags)
}

/// Parse and validate a JSON array of ingredients.
pub fn parse_ingredients(json: &str) -> anyhow::Result<Vec<IngredientFixture>> {
    let items: Vec<IngredientFixture> =
        serde_json::from_str(json).context("malformed ingredient fixtures")?;
    for item in &items {
        validate_text_field(&item.name, "Ingredient name", 200)
            .and_then(|_| validate_text_field(&item.measurement_unit, "Measurement unit", 200))
            .map_err(|e| anyhow::anyhow!("invalid ingredient '{}': {:?}", item.name, e))?;
    }
    Ok(items)
}

/// Insert tags that are not present yet. Returns how many were inserted.
pub async fn seed_tags(db: &DatabaseConnection, tags: &[TagFixture]) -> Result<u32, DbErr> {
    let mut inserted = 0u32;
    for t in tags {
        let model = tag::ActiveModel {
            name: Set(t.name.trim().to_string()),
            color: Set(t.color.to_uppercase()),
            slug: Set(t.slug.clone()),
            ..Default::default()
        };

        let result = tag::Entity::insert(model)
            .on_conflict(OnConflict::new().do_nothing().to_owned())
            .exec_without_returning(db)
            .await;

        match result {
            Ok(n) if n > 0 => inserted += 1,
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }
    Ok(inserted)
}

/// Insert ingredients that are not present yet. Returns how many were inserted.
pub async fn seed_ingredients(
    db: &DatabaseConnection,
    items: &[IngredientFixture],
) -> Result<u32, DbErr> {
    let mut inserted = 0u32;
    for item in items {
        let model = ingredient::ActiveModel {
            name: Set(item.name.trim().to_string()),
            measurement_unit: Set(item.measurement_unit.trim().to_string()),
            ..Default::default()
        };

        let result = ingredient::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    ingredient::Column::Name,
                    ingredient::Column::MeasurementUnit,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(n) if n > 0 => inserted += 1,
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }
    Ok(inserted)
}

fn read_fixture(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

/// Load the configured fixture files, if any.
pub async fn seed_from_config(db: &DatabaseConnection, cfg: &SeedConfig) -> anyhow::Result<()> {
    if let Some(path) = &cfg.tags_path {
        let tags = parse_tags(&read_fixture(path)?)?;
        let n = seed_tags(db, &tags).await?;
        info!("Seeded {} new tags from {}", n, path.display());
    }
    if let Some(path) = &cfg.ingredients_path {
        let items = parse_ingredients(&read_fixture(path)?)?;
        let n = seed_ingredients(db, &items).await?;
        info!("Seeded {} new ingredients from {}", n, path.display());
    }
    Ok(())
}

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    let statements = [
        // Author pages: WHERE author_id = ? ORDER BY pub_date DESC
        (
            "idx_recipe_author_pub_date",
            Index::create()
                .if_not_exists()
                .name("idx_recipe_author_pub_date")
                .table(recipe::Entity)
                .col(recipe::Column::AuthorId)
                .col(recipe::Column::PubDate)
                .to_string(PostgresQueryBuilder),
        ),
        // "Who follows this author" lookups hit the second key column.
        (
            "idx_follow_following",
            Index::create()
                .if_not_exists()
                .name("idx_follow_following")
                .table(follow::Entity)
                .col(follow::Column::FollowingId)
                .to_string(PostgresQueryBuilder),
        ),
        // Recipe deletion removes relation rows by recipe.
        (
            "idx_favorite_recipe_recipe",
            Index::create()
                .if_not_exists()
                .name("idx_favorite_recipe_recipe")
                .table(favorite_recipe::Entity)
                .col(favorite_recipe::Column::RecipeId)
                .to_string(PostgresQueryBuilder),
        ),
        (
            "idx_cart_recipe",
            Index::create()
                .if_not_exists()
                .name("idx_cart_recipe")
                .table(cart::Entity)
                .col(cart::Column::RecipeId)
                .to_string(PostgresQueryBuilder),
        ),
    ];

    for (name, stmt) in statements {
        match db.execute_unprepared(&stmt).await {
            Ok(_) => info!("Ensured index {} exists", name),
            Err(e) => tracing::warn!("Failed to create index {}: {}", name, e),
        }
    }

    Ok(())
}
