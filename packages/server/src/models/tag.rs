use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::entity::tag;
use crate::error::AppError;
use crate::models::shared::validate_text_field;

#[derive(Serialize, Clone, Debug, PartialEq, Eq, utoipa::ToSchema)]
pub struct TagResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Breakfast")]
    pub name: String,
    /// `#RRGGBB` hex color.
    #[schema(example = "#E26C2D")]
    pub color: String,
    #[schema(example = "breakfast")]
    pub slug: String,
}

impl From<tag::Model> for TagResponse {
    fn from(m: tag::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            color: m.color,
            slug: m.slug,
        }
    }
}

static COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid color pattern"));
static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("valid slug pattern"));

/// A tag definition loaded from fixtures.
#[derive(Deserialize, Debug, Clone)]
pub struct TagFixture {
    pub name: String,
    pub color: String,
    pub slug: String,
}

pub fn validate_tag_fixture(tag: &TagFixture) -> Result<(), AppError> {
    validate_text_field(&tag.name, "Tag name", 200)?;
    if !COLOR_RE.is_match(&tag.color) {
        return Err(AppError::Validation(format!(
            "Tag color '{}' must be #RRGGBB",
            tag.color
        )));
    }
    if tag.slug.chars().count() > 200 || !SLUG_RE.is_match(&tag.slug) {
        return Err(AppError::Validation(format!(
            "Tag slug '{}' may contain only letters, digits, '-' and '_'",
            tag.slug
        )));
    }
    Ok(())
}
