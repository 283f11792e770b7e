use serde::{Deserialize, Serialize};

use crate::entity::ingredient;

#[derive(Serialize, Clone, Debug, utoipa::ToSchema)]
pub struct IngredientResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "flour")]
    pub name: String,
    #[schema(example = "g")]
    pub measurement_unit: String,
}

impl From<ingredient::Model> for IngredientResponse {
    fn from(m: ingredient::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            measurement_unit: m.measurement_unit,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IngredientListQuery {
    /// Case-insensitive name prefix.
    pub name: Option<String>,
}

/// An ingredient definition loaded from fixtures.
#[derive(Deserialize, Debug, Clone)]
pub struct IngredientFixture {
    pub name: String,
    pub measurement_unit: String,
}
