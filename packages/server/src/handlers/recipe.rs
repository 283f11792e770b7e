use axum::Json;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use sea_orm::sea_query::Query as SeaQuery;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{cart, favorite_recipe, recipe, recipe_tag, tag};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, MaybeAuthUser};
use crate::extractors::json::AppJson;
use crate::models::recipe::*;
use crate::models::shared::{Pagination, resolve_page};
use crate::services::membership::{self, Membership, recipe_ids_subquery};
use crate::services::recipe_view::RecipeProjector;
use crate::services::recipe_writer::{RecipeOperation, RecipeWriter};
use crate::services::shopping_list::shopping_list;
use crate::state::AppState;

async fn find_recipe<C: ConnectionTrait>(db: &C, id: i32) -> Result<recipe::Model, AppError> {
    recipe::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe not found".into()))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Recipes",
    operation_id = "listRecipes",
    summary = "List recipes with filters",
    description = "Paginated recipes, newest first. `tags` accepts comma-separated or repeated slugs and matches any of them. `is_favorited` and `is_in_shopping_cart` only apply to authenticated callers.",
    params(RecipeListQuery),
    responses(
        (status = 200, description = "List of recipes", body = RecipeListResponse),
        (status = 400, description = "Malformed filter (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Invalid token (TOKEN_INVALID)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, viewer, pairs))]
pub async fn list_recipes(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<RecipeListResponse>, AppError> {
    let query = RecipeListQuery::from_pairs(pairs)?;
    let window = resolve_page(query.page, query.limit, &state.config.pagination)?;

    let mut select = recipe::Entity::find();

    if !query.tags.is_empty() {
        select = select.filter(
            recipe::Column::Id.in_subquery(
                SeaQuery::select()
                    .column(recipe_tag::Column::RecipeId)
                    .from(recipe_tag::Entity)
                    .and_where(
                        recipe_tag::Column::TagId.in_subquery(
                            SeaQuery::select()
                                .column(tag::Column::Id)
                                .from(tag::Entity)
                                .and_where(tag::Column::Slug.is_in(query.tags.clone()))
                                .to_owned(),
                        ),
                    )
                    .to_owned(),
            ),
        );
    }

    if let Some(author) = query.author {
        select = select.filter(recipe::Column::AuthorId.eq(author));
    }

    if let Some(uid) = viewer.viewer() {
        if query.is_favorited {
            let favorites = recipe_ids_subquery::<favorite_recipe::Entity>(uid);
            select = select.filter(recipe::Column::Id.in_subquery(favorites));
        }
        if query.is_in_shopping_cart {
            let cart_items = recipe_ids_subquery::<cart::Entity>(uid);
            select = select.filter(recipe::Column::Id.in_subquery(cart_items));
        }
    }

    let total = select
        .clone()
        .paginate(&state.db, window.per_page)
        .num_items()
        .await?;

    let recipes = select
        .order_by_desc(recipe::Column::PubDate)
        .order_by_desc(recipe::Column::Id)
        .offset(Some(window.offset))
        .limit(Some(window.per_page))
        .all(&state.db)
        .await?;

    let data = RecipeProjector::new(&state.db, &state.config.media.url_prefix)
        .project(recipes, viewer.viewer())
        .await?;

    Ok(Json(RecipeListResponse {
        data,
        pagination: Pagination::of(window, total),
    }))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Recipes",
    operation_id = "createRecipe",
    summary = "Create a recipe",
    description = "Creates a recipe with its ingredient lines and tags in one transaction. The image is an inline base64 data URI.",
    request_body = RecipeWriteRequest,
    responses(
        (status = 201, description = "Recipe created", body = RecipeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Unknown ingredient or tag (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id, name = %payload.name))]
pub async fn create_recipe(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<RecipeWriteRequest>,
) -> Result<impl IntoResponse, AppError> {
    let model = RecipeWriter::new(&state.db, state.media.as_ref())
        .write(
            RecipeOperation::Create {
                author_id: auth_user.user_id,
            },
            payload,
        )
        .await?;

    let response = RecipeProjector::new(&state.db, &state.config.media.url_prefix)
        .project_one(model, Some(auth_user.user_id))
        .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Recipes",
    operation_id = "getRecipe",
    summary = "Get a recipe by ID",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 200, description = "Recipe", body = RecipeResponse),
        (status = 401, description = "Invalid token (TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Recipe not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, viewer), fields(id))]
pub async fn get_recipe(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<RecipeResponse>, AppError> {
    let model = find_recipe(&state.db, id).await?;
    let response = RecipeProjector::new(&state.db, &state.config.media.url_prefix)
        .project_one(model, viewer.viewer())
        .await?;
    Ok(Json(response))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Recipes",
    operation_id = "updateRecipe",
    summary = "Replace a recipe",
    description = "Replaces the recipe's fields, ingredient lines and tags. Only the author may update. The image is kept when omitted.",
    params(("id" = i32, Path, description = "Recipe ID")),
    request_body = RecipeWriteRequest,
    responses(
        (status = 200, description = "Recipe updated", body = RecipeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the author (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Recipe, ingredient or tag not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id, id))]
pub async fn update_recipe(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<RecipeWriteRequest>,
) -> Result<Json<RecipeResponse>, AppError> {
    let current = find_recipe(&state.db, id).await?;
    auth_user.require_author(current.author_id)?;

    let model = RecipeWriter::new(&state.db, state.media.as_ref())
        .write(
            RecipeOperation::Update {
                recipe_id: id,
                editor_id: auth_user.user_id,
            },
            payload,
        )
        .await?;

    let response = RecipeProjector::new(&state.db, &state.config.media.url_prefix)
        .project_one(model, Some(auth_user.user_id))
        .await?;
    Ok(Json(response))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Recipes",
    operation_id = "deleteRecipe",
    summary = "Delete a recipe",
    description = "Deletes the recipe with its ingredient lines, tag links, favorites and cart entries. Only the author may delete.",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the author (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Recipe not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id, id))]
pub async fn delete_recipe(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    RecipeWriter::new(&state.db, state.media.as_ref())
        .delete(id, auth_user.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn join<M: Membership>(
    state: &AppState,
    user_id: i32,
    recipe_id: i32,
) -> Result<(StatusCode, Json<ShortRecipeResponse>), AppError> {
    let card =
        membership::add::<M, _>(&state.db, user_id, recipe_id, &state.config.media.url_prefix)
            .await?;
    Ok((StatusCode::CREATED, Json(card)))
}

async fn leave<M: Membership>(
    state: &AppState,
    user_id: i32,
    recipe_id: i32,
) -> Result<StatusCode, AppError> {
    membership::remove::<M, _>(&state.db, user_id, recipe_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/favorite",
    tag = "Favorites",
    operation_id = "addFavorite",
    summary = "Add a recipe to favorites",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 201, description = "Added", body = ShortRecipeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Recipe not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already in favorites (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id, id))]
pub async fn add_favorite(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    join::<favorite_recipe::Entity>(&state, auth_user.user_id, id).await
}

#[utoipa::path(
    delete,
    path = "/{id}/favorite",
    tag = "Favorites",
    operation_id = "removeFavorite",
    summary = "Remove a recipe from favorites",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 204, description = "Removed"),
        (status = 400, description = "Not in favorites (NOT_A_MEMBER)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Recipe not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id, id))]
pub async fn remove_favorite(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    leave::<favorite_recipe::Entity>(&state, auth_user.user_id, id).await
}

#[utoipa::path(
    post,
    path = "/{id}/shopping_cart",
    tag = "Shopping Cart",
    operation_id = "addToCart",
    summary = "Add a recipe to the shopping cart",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 201, description = "Added", body = ShortRecipeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Recipe not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already in the cart (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id, id))]
pub async fn add_to_cart(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    join::<cart::Entity>(&state, auth_user.user_id, id).await
}

#[utoipa::path(
    delete,
    path = "/{id}/shopping_cart",
    tag = "Shopping Cart",
    operation_id = "removeFromCart",
    summary = "Remove a recipe from the shopping cart",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 204, description = "Removed"),
        (status = 400, description = "Not in the cart (NOT_A_MEMBER)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Recipe not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id, id))]
pub async fn remove_from_cart(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    leave::<cart::Entity>(&state, auth_user.user_id, id).await
}

#[utoipa::path(
    get,
    path = "/download_shopping_cart",
    tag = "Shopping Cart",
    operation_id = "downloadShoppingCart",
    summary = "Download the aggregated shopping list",
    description = "Sums ingredient amounts over every recipe in the cart, grouped by name and unit. Rendered as PDF or plain text depending on server configuration.",
    responses(
        (status = 200, description = "Shopping list document", content(("application/pdf"), ("text/plain"))),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn download_shopping_cart(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let entries = shopping_list(&state.db, auth_user.user_id).await?;
    let renderer = state.config.shopping_list.format.renderer();
    let document = renderer.render(&entries)?;

    tracing::debug!(entries = entries.len(), bytes = document.len(), "Rendered shopping list");

    Response::builder()
        .header(header::CONTENT_TYPE, renderer.content_type())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", renderer.file_name()),
        )
        .body(Body::from(document))
        .map_err(|e| AppError::Internal(e.to_string()))
}
