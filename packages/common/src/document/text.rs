use super::{RenderError, ShoppingListEntry, ShoppingListRenderer, TITLE};

/// Plain UTF-8 text rendering, one ingredient per line.
pub struct TextRenderer;

impl ShoppingListRenderer for TextRenderer {
    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    fn file_name(&self) -> &'static str {
        "shopping_list.txt"
    }

    fn render(&self, entries: &[ShoppingListEntry]) -> Result<Vec<u8>, RenderError> {
        let mut out = String::with_capacity(32 + entries.len() * 32);
        out.push_str(TITLE);
        out.push_str("\n\n");
        for entry in entries {
            out.push_str(&entry.line());
            out.push('\n');
        }
        Ok(out.into_bytes())
    }
}
