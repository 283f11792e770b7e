use std::collections::{HashMap, HashSet};

use sea_orm::*;

use crate::entity::{
    cart, favorite_recipe, ingredient, recipe, recipe_ingredient, recipe_tag, tag, user,
};
use crate::error::AppError;
use crate::models::recipe::{RecipeIngredientResponse, RecipeResponse, media_url};
use crate::models::tag::TagResponse;
use crate::models::user::UserResponse;
use crate::services::{follow, membership};

/// Read-side projection of recipes for an explicit viewer.
///
/// A batch of recipes is assembled with a fixed number of queries regardless of its size.
pub struct RecipeProjector<'a, C: ConnectionTrait> {
    conn: &'a C,
    url_prefix: &'a str,
}

impl<'a, C: ConnectionTrait> RecipeProjector<'a, C> {
    pub fn new(conn: &'a C, url_prefix: &'a str) -> Self {
        Self { conn, url_prefix }
    }

    pub async fn project_one(
        &self,
        recipe: recipe::Model,
        viewer: Option<i32>,
    ) -> Result<RecipeResponse, AppError> {
        self.project(vec![recipe], viewer)
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal("Recipe projection came back empty".into()))
    }

    /// Project `recipes`, keeping their order.
    pub async fn project(
        &self,
        recipes: Vec<recipe::Model>,
        viewer: Option<i32>,
    ) -> Result<Vec<RecipeResponse>, AppError> {
        if recipes.is_empty() {
            return Ok(Vec::new());
        }
        let recipe_ids: Vec<i32> = recipes.iter().map(|r| r.id).collect();
        let author_ids: Vec<i32> = recipes
            .iter()
            .map(|r| r.author_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let mut lines = self.lines(&recipe_ids).await?;
        let mut tags = self.tags(&recipe_ids).await?;
        let authors: HashMap<i32, user::Model> = user::Entity::find()
            .filter(user::Column::Id.is_in(author_ids.clone()))
            .all(self.conn)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let subscribed = follow::subscribed_ids(self.conn, viewer, &author_ids).await?;
        let (favorited, in_cart) = match viewer {
            Some(uid) => (
                membership::member_recipe_ids::<favorite_recipe::Entity, _>(
                    self.conn,
                    uid,
                    &recipe_ids,
                )
                .await?,
                membership::member_recipe_ids::<cart::Entity, _>(self.conn, uid, &recipe_ids)
                    .await?,
            ),
            None => (HashSet::new(), HashSet::new()),
        };

        recipes
            .into_iter()
            .map(|r| {
                let author = authors.get(&r.author_id).cloned().ok_or_else(|| {
                    AppError::Internal(format!("Author {} of recipe {} missing", r.author_id, r.id))
                })?;
                let is_subscribed = subscribed.contains(&author.id);
                Ok(RecipeResponse {
                    id: r.id,
                    tags: tags.remove(&r.id).unwrap_or_default(),
                    author: UserResponse::from_model(author, is_subscribed),
                    ingredients: lines.remove(&r.id).unwrap_or_default(),
                    is_favorited: favorited.contains(&r.id),
                    is_in_shopping_cart: in_cart.contains(&r.id),
                    name: r.name,
                    image: r.image.map(|key| media_url(self.url_prefix, &key)),
                    text: r.text,
                    cooking_time: r.cooking_time,
                })
            })
            .collect()
    }

    /// Ingredient lines per recipe, in insertion order.
    async fn lines(
        &self,
        recipe_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<RecipeIngredientResponse>>, DbErr> {
        let rows = recipe_ingredient::Entity::find()
            .filter(recipe_ingredient::Column::RecipeId.is_in(recipe_ids.to_vec()))
            .find_also_related(ingredient::Entity)
            .order_by_asc(recipe_ingredient::Column::Id)
            .all(self.conn)
            .await?;

        let mut map: HashMap<i32, Vec<RecipeIngredientResponse>> = HashMap::new();
        for (line, ing) in rows {
            let Some(ing) = ing else { continue };
            map.entry(line.recipe_id)
                .or_default()
                .push(RecipeIngredientResponse {
                    id: ing.id,
                    name: ing.name,
                    measurement_unit: ing.measurement_unit,
                    amount: line.amount,
                });
        }
        Ok(map)
    }

    /// Tags per recipe, by name.
    async fn tags(&self, recipe_ids: &[i32]) -> Result<HashMap<i32, Vec<TagResponse>>, DbErr> {
        let rows = recipe_tag::Entity::find()
            .filter(recipe_tag::Column::RecipeId.is_in(recipe_ids.to_vec()))
            .find_also_related(tag::Entity)
            .order_by_asc(tag::Column::Name)
            .all(self.conn)
            .await?;

        let mut map: HashMap<i32, Vec<TagResponse>> = HashMap::new();
        for (link, t) in rows {
            if let Some(t) = t {
                map.entry(link.recipe_id).or_default().push(t.into());
            }
        }
        Ok(map)
    }
}
