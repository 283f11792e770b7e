//! Rendering of the aggregated shopping list into a downloadable document.

mod pdf;
mod text;

use serde::Deserialize;

pub use pdf::PdfRenderer;
pub use text::TextRenderer;

/// Heading printed at the top of every rendered shopping list.
pub const TITLE: &str = "Shopping list";

/// One aggregated line of the shopping list.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, utoipa::ToSchema)]
pub struct ShoppingListEntry {
    /// Ingredient name.
    #[schema(example = "flour")]
    pub name: String,
    /// Measurement unit shared by every summed line.
    #[schema(example = "g")]
    pub measurement_unit: String,
    /// Sum of the amounts across all recipes in the cart.
    #[schema(example = 150)]
    pub total_amount: i64,
}

impl ShoppingListEntry {
    /// Human-readable line, e.g. `flour (g) - 150`.
    pub fn line(&self) -> String {
        format!(
            "{} ({}) - {}",
            self.name, self.measurement_unit, self.total_amount
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("PDF rendering failed: {0}")]
    Pdf(#[from] printpdf::Error),
}

/// Turns a shopping list into document bytes.
pub trait ShoppingListRenderer: Send + Sync {
    /// MIME type of the produced document.
    fn content_type(&self) -> &'static str;

    /// File name offered in `Content-Disposition`.
    fn file_name(&self) -> &'static str;

    fn render(&self, entries: &[ShoppingListEntry]) -> Result<Vec<u8>, RenderError>;
}

/// Output format for the shopping list download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    #[default]
    Pdf,
    Text,
}

impl DocumentFormat {
    pub fn renderer(self) -> Box<dyn ShoppingListRenderer> {
        match self {
            DocumentFormat::Pdf => Box::new(PdfRenderer::default()),
            DocumentFormat::Text => Box::new(TextRenderer),
        }
    }
}
