use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recipe")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub text: String,
    /// Media store key, e.g. `recipes/<sha256>.png`.
    pub image: Option<String>,
    pub cooking_time: i32, // in minutes

    #[sea_orm(indexed)]
    pub author_id: i32,
    #[sea_orm(belongs_to, from = "author_id", to = "id")]
    pub author: HasOne<super::user::Entity>,

    #[sea_orm(has_many)]
    pub lines: HasMany<super::recipe_ingredient::Entity>,

    #[sea_orm(has_many, via = "recipe_tag")]
    pub tags: HasMany<super::tag::Entity>,

    /// Refreshed on every write.
    #[sea_orm(indexed)]
    pub pub_date: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
