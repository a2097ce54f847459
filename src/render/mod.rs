pub mod canvas;
pub mod fonts;
pub mod layout;
pub mod pdf;
pub mod script;

pub use canvas::{Align, Canvas, FontChoice};
pub use fonts::{FontBook, FontFile, FontSlot};
pub use layout::{InvoiceLayout, PageGeometry};
pub use pdf::PdfCanvas;
pub use script::{detect_script, Script};

use crate::error::RenderError;
use crate::models::Invoice;

/// 发票 -> 文档字节
pub trait InvoiceRenderer: Send + Sync {
    fn render(&self, invoice: &Invoice) -> Result<Vec<u8>, RenderError>;

    fn content_type(&self) -> &'static str {
        "application/pdf"
    }
}

/// 表格版式 PDF 渲染
pub struct TableRenderer {
    fonts: FontBook,
    layout: InvoiceLayout,
}

impl TableRenderer {
    pub fn new(fonts: FontBook) -> Self {
        Self {
            fonts,
            layout: InvoiceLayout::default(),
        }
    }
}

impl InvoiceRenderer for TableRenderer {
    fn render(&self, invoice: &Invoice) -> Result<Vec<u8>, RenderError> {
        let mut canvas = PdfCanvas::new(&self.fonts, self.layout.page());
        self.layout.draw(invoice, &mut canvas);

        let pages = canvas.page_count();
        let bytes = canvas.finish();
        tracing::debug!(
            "Rendered invoice {}: {} items, {} pages, {} bytes",
            invoice.order_id,
            invoice.items.len(),
            pages,
            bytes.len()
        );
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::normalizer::normalize;
    use serde_json::json;

    #[test]
    fn renders_normalized_invoice_to_pdf() {
        let items: Vec<_> = (0..60)
            .map(|i| json!({ "Item_Name": format!("Dish {i}"), "Quantity": 1, "Price": 5, "Amount": 5 }))
            .collect();
        let orders = json!({ "result": { "data": json!([{
            "Order_Id": "ORD-9",
            "Shop_Name": "Spice Route",
            "Amount": 300,
            "Total_Amount": 315,
            "Currency": "INR",
            "OrderedItemList": items,
            "OrderTaxList": [{ "Tax_Name": "GST", "Tax_Amount": 15 }]
        }]).to_string() } });
        let shop = json!({ "data": json!([{ "name": "Asha" }]).to_string() });
        let invoice = normalize(&orders, &shop).expect("normalize");

        let bytes = TableRenderer::new(FontBook::builtin())
            .render(&invoice)
            .expect("render");

        assert!(bytes.starts_with(b"%PDF-"));
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Count 2"));
        assert!(text.contains("(Dish 59) Tj"));
        assert!(text.contains("(INR 315.00) Tj"));
    }

    #[test]
    fn arabic_item_names_use_the_configured_script_font() {
        let orders = json!({ "result": { "data": json!([{
            "Order_Id": "ORD-10",
            "Shop_Name": "Spice Route",
            "OrderedItemList": [
                { "Item_Name": "شاي", "Quantity": 1, "Price": 2.5, "Amount": 2.5 },
                { "Item_Name": "Samosa", "Quantity": 2, "Price": 1, "Amount": 2 }
            ]
        }]).to_string() } });
        let shop = json!({ "data": json!([{ "name": "Asha" }]).to_string() });
        let invoice = normalize(&orders, &shop).expect("normalize");

        let font = FontFile::from_bytes(
            "DejaVuSans.ttf",
            include_bytes!("../../tests/fixtures/DejaVuSans.ttf").to_vec(),
        )
        .expect("fixture font");
        let fonts = FontBook::builtin().with_font(FontSlot::Arabic, font);
        let bytes = TableRenderer::new(fonts).render(&invoice).expect("render");

        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/F3"));
        assert!(text.contains("/Identity-H"));
        assert!(text.contains("/ToUnicode"));
        assert!(text.contains("(Samosa) Tj"));
    }
}
