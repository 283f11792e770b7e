use common::ShoppingListEntry;
use sea_orm::prelude::Expr;
use sea_orm::*;

use crate::entity::{cart, ingredient, recipe_ingredient};
use crate::services::membership::recipe_ids_subquery;

/// Ingredients of every recipe in the user's cart, summed per `(name, measurement_unit)`
/// and ordered by name then unit.
pub async fn shopping_list<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<Vec<ShoppingListEntry>, DbErr> {
    let rows: Vec<(String, String, i64)> = recipe_ingredient::Entity::find()
        .select_only()
        .column(ingredient::Column::Name)
        .column(ingredient::Column::MeasurementUnit)
        .column_as(
            Expr::col((recipe_ingredient::Entity, recipe_ingredient::Column::Amount)).sum(),
            "total_amount",
        )
        .inner_join(ingredient::Entity)
        .filter(
            recipe_ingredient::Column::RecipeId
                .in_subquery(recipe_ids_subquery::<cart::Entity>(user_id)),
        )
        .group_by(ingredient::Column::Name)
        .group_by(ingredient::Column::MeasurementUnit)
        .order_by_asc(ingredient::Column::Name)
        .order_by_asc(ingredient::Column::MeasurementUnit)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(name, measurement_unit, total_amount)| ShoppingListEntry {
            name,
            measurement_unit,
            total_amount,
        })
        .collect())
}
