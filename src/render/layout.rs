//! 发票版式: 抬头, 客户信息, 商品表, 税费合计表

use crate::models::invoice::{format_amount, format_quantity};
use crate::models::{Invoice, LineItem, OrderSummary, TaxLine};
use crate::render::canvas::{Align, Canvas, FontChoice};
use crate::render::script::detect_script;

/// 页面尺寸与边距 (pt)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl PageGeometry {
    pub const A4: PageGeometry = PageGeometry {
        width: 595.28,
        height: 841.89,
        margin: 50.0,
    };

    pub fn usable_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    /// 可打印高度 = 页高 - 上下边距
    pub fn printable_height(&self) -> f32 {
        self.height - 2.0 * self.margin
    }

    pub fn printable_bottom(&self) -> f32 {
        self.margin + self.printable_height()
    }
}

pub const ROW_HEIGHT: f32 = 20.0;
const CELL_PADDING: f32 = 5.0;
const TABLE_FONT_SIZE: f32 = 10.0;
const TITLE_FONT_SIZE: f32 = 20.0;
const BODY_FONT_SIZE: f32 = 10.0;
const LINE_GAP: f32 = 15.0;

/// 商品表列宽占可用宽度的比例
const ITEM_COLUMNS: [(&str, f32); 4] = [
    ("Name", 0.4),
    ("Quantity", 0.2),
    ("Price", 0.2),
    ("Amount", 0.2),
];
const TOTALS_WIDTH_RATIO: f32 = 0.4;

struct Cell {
    text: String,
    font: FontChoice,
    align: Align,
}

impl Cell {
    fn new(text: impl Into<String>, font: FontChoice, align: Align) -> Self {
        Self {
            text: text.into(),
            font,
            align,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct InvoiceLayout {
    page: PageGeometry,
}

impl Default for InvoiceLayout {
    fn default() -> Self {
        Self::new(PageGeometry::A4)
    }
}

impl InvoiceLayout {
    pub fn new(page: PageGeometry) -> Self {
        Self { page }
    }

    pub fn page(&self) -> PageGeometry {
        self.page
    }

    /// 绘制整张发票, 返回最终纵向游标
    pub fn draw<C: Canvas + ?Sized>(&self, invoice: &Invoice, canvas: &mut C) -> f32 {
        let mut y = self.page.margin;
        y = self.draw_header(invoice, canvas, y);
        y = self.draw_customer(&invoice.order, canvas, y);
        y = self.draw_items(&invoice.items, canvas, y);
        self.draw_totals(&invoice.order, &invoice.tax_list, canvas, y)
    }

    fn draw_header<C: Canvas + ?Sized>(&self, invoice: &Invoice, canvas: &mut C, mut y: f32) -> f32 {
        let x = self.page.margin;
        let width = self.page.usable_width();
        let order = &invoice.order;

        let title = fit_text(canvas, &order.shop_name, width, FontChoice::Bold, TITLE_FONT_SIZE);
        canvas.draw_text_in(&title, x, y, width, Align::Center, FontChoice::Bold, TITLE_FONT_SIZE);
        y += TITLE_FONT_SIZE + 6.0;

        let lines = [
            order.shop_address.clone(),
            format!("Invoice #: {}", invoice.order_id),
            format!("Date: {}", order.transaction_date),
        ];
        for line in &lines {
            let line = fit_text(canvas, line, width, FontChoice::Regular, BODY_FONT_SIZE);
            canvas.draw_text_in(&line, x, y, width, Align::Center, FontChoice::Regular, BODY_FONT_SIZE);
            y += LINE_GAP;
        }

        canvas.stroke_line((x, y), (x + width, y));
        y + LINE_GAP
    }

    fn draw_customer<C: Canvas + ?Sized>(&self, order: &OrderSummary, canvas: &mut C, mut y: f32) -> f32 {
        let lines = [
            ("Customer", &order.user_name),
            ("Mobile", &order.user_mobile),
            ("Email", &order.user_email),
            ("Payment Method", &order.payment_method),
            ("Delivery Method", &order.delivery_method),
        ];
        for (label, value) in lines {
            let text = format!("{}: {}", label, value);
            canvas.draw_text(&text, self.page.margin, y, FontChoice::Regular, BODY_FONT_SIZE);
            y += LINE_GAP;
        }

        y + LINE_GAP
    }

    /// 商品表; 每行绘制前检查分页, 续页不重绘表头
    pub fn draw_items<C: Canvas + ?Sized>(&self, items: &[LineItem], canvas: &mut C, mut y: f32) -> f32 {
        let widths: Vec<f32> = ITEM_COLUMNS
            .iter()
            .map(|(_, ratio)| self.page.usable_width() * ratio)
            .collect();

        let header: Vec<Cell> = ITEM_COLUMNS
            .iter()
            .map(|(label, _)| Cell::new(*label, FontChoice::Bold, Align::Left))
            .collect();
        y = self.break_if_full(canvas, y);
        self.draw_row(canvas, self.page.margin, y, &widths, &header);
        y += ROW_HEIGHT;

        for item in items {
            y = self.break_if_full(canvas, y);
            let row = [
                Cell::new(
                    item.name.as_str(),
                    FontChoice::Script(detect_script(&item.name)),
                    Align::Left,
                ),
                Cell::new(format_quantity(&item.quantity), FontChoice::Regular, Align::Right),
                Cell::new(format_amount(&item.unit_price), FontChoice::Regular, Align::Right),
                Cell::new(format_amount(&item.amount), FontChoice::Regular, Align::Right),
            ];
            self.draw_row(canvas, self.page.margin, y, &widths, &row);
            y += ROW_HEIGHT;
        }

        y
    }

    /// 税费合计表, 右对齐到页边距; 紧接当前游标绘制, 不做分页检查
    pub fn draw_totals<C: Canvas + ?Sized>(
        &self,
        order: &OrderSummary,
        taxes: &[TaxLine],
        canvas: &mut C,
        mut y: f32,
    ) -> f32 {
        let table_width = self.page.usable_width() * TOTALS_WIDTH_RATIO;
        let x = self.page.margin + self.page.usable_width() - table_width;
        let widths = [table_width / 2.0, table_width / 2.0];

        let mut rows = vec![
            [
                Cell::new("Description", FontChoice::Bold, Align::Left),
                Cell::new("Amount", FontChoice::Bold, Align::Right),
            ],
            [
                Cell::new("Subtotal", FontChoice::Regular, Align::Left),
                Cell::new(order.money(&order.amount), FontChoice::Regular, Align::Right),
            ],
        ];
        rows.extend(taxes.iter().map(|tax| {
            [
                Cell::new(tax.name.as_str(), FontChoice::Regular, Align::Left),
                Cell::new(order.money(&tax.amount), FontChoice::Regular, Align::Right),
            ]
        }));
        rows.push([
            Cell::new("Total", FontChoice::Bold, Align::Left),
            Cell::new(order.money(&order.total_amount), FontChoice::Bold, Align::Right),
        ]);

        for row in &rows {
            self.draw_row(canvas, x, y, &widths, row);
            y += ROW_HEIGHT;
        }

        y
    }

    fn break_if_full<C: Canvas + ?Sized>(&self, canvas: &mut C, y: f32) -> f32 {
        if y + ROW_HEIGHT > self.page.printable_bottom() {
            canvas.new_page();
            self.page.margin
        } else {
            y
        }
    }

    /// 每个单元格四边描框, 相邻框线即列分隔线
    fn draw_row<C: Canvas + ?Sized>(&self, canvas: &mut C, x: f32, y: f32, widths: &[f32], cells: &[Cell]) {
        let text_y = y + (ROW_HEIGHT - TABLE_FONT_SIZE) / 2.0;
        let mut cell_x = x;

        for (cell, width) in cells.iter().zip(widths) {
            canvas.stroke_rect(cell_x, y, *width, ROW_HEIGHT);

            let inner = width - 2.0 * CELL_PADDING;
            let text = fit_text(canvas, &cell.text, inner, cell.font, TABLE_FONT_SIZE);
            canvas.draw_text_in(
                &text,
                cell_x + CELL_PADDING,
                text_y,
                inner,
                cell.align,
                cell.font,
                TABLE_FONT_SIZE,
            );
            cell_x += width;
        }
    }
}

/// 超出单元格宽度时截断并加省略号
fn fit_text<C: Canvas + ?Sized>(canvas: &C, text: &str, width: f32, font: FontChoice, size: f32) -> String {
    if canvas.text_width(text, font, size) <= width {
        return text.to_string();
    }

    // 前缀宽度单调, 二分查找能放下的最长前缀
    let starts: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let candidate = |keep: usize| format!("{}...", &text[..starts[keep]]);
    if starts.is_empty() || canvas.text_width(&candidate(0), font, size) > width {
        return String::new();
    }

    let (mut lo, mut hi) = (0, starts.len() - 1);
    while lo < hi {
        let mid = (lo + hi + 1) / 2;
        if canvas.text_width(&candidate(mid), font, size) <= width {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    candidate(lo)
}
