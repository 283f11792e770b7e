use std::collections::{HashMap, HashSet};

use sea_orm::sea_query::Query as SeaQuery;
use sea_orm::*;

use crate::entity::{follow, recipe, user};
use crate::error::AppError;
use crate::models::recipe::ShortRecipeResponse;
use crate::models::shared::PageWindow;
use crate::models::user::{SubscriptionResponse, UserResponse};

async fn find_user<C: ConnectionTrait>(db: &C, id: i32) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

/// `follower` starts following `target`. Returns the followed user.
pub async fn subscribe<C: ConnectionTrait>(
    db: &C,
    follower: i32,
    target: i32,
) -> Result<user::Model, AppError> {
    if follower == target {
        return Err(AppError::Validation("self-follow".into()));
    }
    let author = find_user(db, target).await?;

    let row = follow::ActiveModel {
        user_id: Set(follower),
        following_id: Set(target),
        created_at: Set(chrono::Utc::now()),
    };

    match follow::Entity::insert(row).exec_without_returning(db).await {
        Ok(_) => Ok(author),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            Err(AppError::Conflict("Already subscribed to this user".into()))
        }
        Err(e) => Err(e.into()),
    }
}

/// `follower` stops following `target`.
pub async fn unsubscribe<C: ConnectionTrait>(
    db: &C,
    follower: i32,
    target: i32,
) -> Result<(), AppError> {
    find_user(db, target).await?;

    let result = follow::Entity::delete_many()
        .filter(follow::Column::UserId.eq(follower))
        .filter(follow::Column::FollowingId.eq(target))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotMember("Not subscribed to this user".into()));
    }
    Ok(())
}

/// Which of `user_ids` the viewer follows. Empty for anonymous viewers.
pub async fn subscribed_ids<C: ConnectionTrait>(
    db: &C,
    viewer: Option<i32>,
    user_ids: &[i32],
) -> Result<HashSet<i32>, DbErr> {
    let Some(viewer) = viewer else {
        return Ok(HashSet::new());
    };
    if user_ids.is_empty() {
        return Ok(HashSet::new());
    }
    let ids: Vec<i32> = follow::Entity::find()
        .select_only()
        .column(follow::Column::FollowingId)
        .filter(follow::Column::UserId.eq(viewer))
        .filter(follow::Column::FollowingId.is_in(user_ids.to_vec()))
        .into_tuple()
        .all(db)
        .await?;
    Ok(ids.into_iter().collect())
}

/// Build subscription cards for `authors`, all of whom the viewer follows.
///
/// Recipes are newest first and cut to `recipes_limit`; `recipes_count` is the full count.
pub async fn subscription_cards<C: ConnectionTrait>(
    db: &C,
    authors: Vec<user::Model>,
    recipes_limit: Option<u64>,
    url_prefix: &str,
) -> Result<Vec<SubscriptionResponse>, DbErr> {
    let author_ids: Vec<i32> = authors.iter().map(|a| a.id).collect();
    let recipes = if author_ids.is_empty() {
        Vec::new()
    } else {
        recipe::Entity::find()
            .filter(recipe::Column::AuthorId.is_in(author_ids))
            .order_by_desc(recipe::Column::PubDate)
            .order_by_desc(recipe::Column::Id)
            .all(db)
            .await?
    };

    let mut by_author: HashMap<i32, Vec<recipe::Model>> = HashMap::new();
    for r in recipes {
        by_author.entry(r.author_id).or_default().push(r);
    }

    let limit = recipes_limit.map(|n| n as usize);
    Ok(authors
        .into_iter()
        .map(|author| {
            let recipes = by_author.remove(&author.id).unwrap_or_default();
            let recipes_count = recipes.len() as u64;
            let recipes = recipes
                .into_iter()
                .take(limit.unwrap_or(usize::MAX))
                .map(|r| ShortRecipeResponse::from_model(r, url_prefix))
                .collect();
            SubscriptionResponse {
                user: UserResponse::from_model(author, true),
                recipes,
                recipes_count,
            }
        })
        .collect())
}

/// One page of the authors `follower` subscribes to, ordered by username.
pub async fn subscriptions<C: ConnectionTrait>(
    db: &C,
    follower: i32,
    window: PageWindow,
    recipes_limit: Option<u64>,
    url_prefix: &str,
) -> Result<(Vec<SubscriptionResponse>, u64), DbErr> {
    let select = user::Entity::find().filter(
        user::Column::Id.in_subquery(
            SeaQuery::select()
                .column(follow::Column::FollowingId)
                .from(follow::Entity)
                .and_where(follow::Column::UserId.eq(follower))
                .to_owned(),
        ),
    );

    let total = select.clone().paginate(db, window.per_page).num_items().await?;

    let authors = select
        .order_by_asc(user::Column::Username)
        .offset(Some(window.offset))
        .limit(Some(window.per_page))
        .all(db)
        .await?;

    let cards = subscription_cards(db, authors, recipes_limit, url_prefix).await?;
    Ok((cards, total))
}
