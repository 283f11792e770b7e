use printpdf::{IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

use super::{RenderError, ShoppingListEntry, ShoppingListRenderer, TITLE};

/// DejaVu Serif, embedded so Cyrillic and other non-Latin names print as-is.
const FONT: &[u8] = include_bytes!("../../fonts/DejaVuSerif.ttf");

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const LAYER: &str = "Shopping list";

const MARGIN_LEFT: f32 = 20.0;
const MARGIN_BOTTOM: f32 = 20.0;
const TITLE_Y: f32 = 277.0;
const FIRST_LINE_Y: f32 = 262.0;
const LEADING: f32 = 7.0;
const TITLE_FONT_SIZE: f32 = 18.0;
const BODY_FONT_SIZE: f32 = 12.0;

/// A4 PDF with an embedded TrueType font.
pub struct PdfRenderer {
    lines_per_page: usize,
}

impl Default for PdfRenderer {
    fn default() -> Self {
        Self {
            lines_per_page: ((FIRST_LINE_Y - MARGIN_BOTTOM) / LEADING) as usize + 1,
        }
    }
}

impl ShoppingListRenderer for PdfRenderer {
    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    fn file_name(&self) -> &'static str {
        "shopping_list.pdf"
    }

    fn render(&self, entries: &[ShoppingListEntry]) -> Result<Vec<u8>, RenderError> {
        let lines: Vec<String> = entries.iter().map(ShoppingListEntry::line).collect();

        let (doc, page, layer) = PdfDocument::new(TITLE, PAGE_WIDTH, PAGE_HEIGHT, LAYER);
        let font = doc.add_external_font(FONT)?;

        let mut current = doc.get_page(page).get_layer(layer);
        current.use_text(TITLE, TITLE_FONT_SIZE, Mm(MARGIN_LEFT), Mm(TITLE_Y), &font);

        for (index, chunk) in lines.chunks(self.lines_per_page.max(1)).enumerate() {
            let top = if index == 0 {
                FIRST_LINE_Y
            } else {
                let (page, layer) = doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, LAYER);
                current = doc.get_page(page).get_layer(layer);
                TITLE_Y
            };
            write_lines(&current, &font, top, chunk);
        }

        Ok(doc.save_to_bytes()?)
    }
}

fn write_lines(layer: &PdfLayerReference, font: &IndirectFontRef, top: f32, lines: &[String]) {
    for (i, line) in lines.iter().enumerate() {
        let y = top - LEADING * i as f32;
        layer.use_text(line.as_str(), BODY_FONT_SIZE, Mm(MARGIN_LEFT), Mm(y), font);
    }
}
