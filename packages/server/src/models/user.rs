use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::entity::user;
use crate::error::AppError;
use crate::models::auth::validate_password;
use crate::models::recipe::ShortRecipeResponse;
use crate::models::shared::{Pagination, validate_text_field};

const NAME_MAX: usize = 50;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid username pattern"));

/// Request body for user registration.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// Unique username (1-50 chars: letters, digits and `.@+-_`).
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "Alice")]
    pub first_name: String,
    #[schema(example = "Liddell")]
    pub last_name: String,
    /// Password (8-128 characters).
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_register_request(payload: &RegisterRequest) -> Result<(), AppError> {
    let email = payload.email.trim();
    validate_text_field(email, "Email", NAME_MAX)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
        _ => return Err(AppError::Validation("Email is not valid".into())),
    }

    let username = payload.username.trim();
    validate_text_field(username, "Username", NAME_MAX)?;
    if !USERNAME_RE.is_match(username) {
        return Err(AppError::Validation(
            "Username may contain only letters, digits and .@+-_".into(),
        ));
    }
    if username.eq_ignore_ascii_case("me") {
        return Err(AppError::Validation("Username 'me' is reserved".into()));
    }

    validate_text_field(&payload.first_name, "First name", NAME_MAX)?;
    validate_text_field(&payload.last_name, "Last name", NAME_MAX)?;
    validate_password(&payload.password)
}

/// Registration response. Never includes the password.
#[derive(Serialize, utoipa::ToSchema)]
pub struct RegisterResponse {
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "Alice")]
    pub first_name: String,
    #[schema(example = "Liddell")]
    pub last_name: String,
}

impl From<user::Model> for RegisterResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

/// Public user profile as seen by a particular viewer.
#[derive(Serialize, Clone, Debug, utoipa::ToSchema)]
pub struct UserResponse {
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "Alice")]
    pub first_name: String,
    #[schema(example = "Liddell")]
    pub last_name: String,
    /// Whether the viewer follows this user. Always `false` for anonymous viewers.
    pub is_subscribed: bool,
}

impl UserResponse {
    pub fn from_model(user: user::Model, is_subscribed: bool) -> Self {
        Self {
            email: user.email,
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_subscribed,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UserListResponse {
    pub data: Vec<UserResponse>,
    pub pagination: Pagination,
}

/// Query parameters for the subscriptions listing.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SubscriptionsQuery {
    /// Page number (1-based). Default: 1.
    pub page: Option<u64>,
    /// Authors per page.
    pub limit: Option<u64>,
    /// Maximum number of recipes shown per author.
    pub recipes_limit: Option<u64>,
}

/// Query parameters accepted by subscribe, for the embedded recipe list.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecipesLimitQuery {
    /// Maximum number of recipes shown for the author.
    pub recipes_limit: Option<u64>,
}

/// A followed author with their newest recipes.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SubscriptionResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub recipes: Vec<ShortRecipeResponse>,
    /// Total number of recipes by this author, regardless of `recipes_limit`.
    #[schema(example = 12)]
    pub recipes_count: u64,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubscriptionListResponse {
    pub data: Vec<SubscriptionResponse>,
    pub pagination: Pagination,
}
