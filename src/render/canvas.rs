use crate::render::script::Script;

/// 文本使用的字体
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontChoice {
    Regular,
    Bold,
    /// 按书写系统选择, 仅用于商品名
    Script(Script),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// 页面绘制原语
///
/// 坐标原点在页面左上角, y 向下增长; `y` 指文本行的顶部.
pub trait Canvas {
    fn text_width(&self, text: &str, font: FontChoice, size: f32) -> f32;

    fn draw_text(&mut self, text: &str, x: f32, y: f32, font: FontChoice, size: f32);

    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32);

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32));

    /// 结束当前页并开始新页
    fn new_page(&mut self);

    /// 在 `[x, x + width]` 内按对齐方式绘制文本
    fn draw_text_in(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        width: f32,
        align: Align,
        font: FontChoice,
        size: f32,
    ) {
        let offset = match align {
            Align::Left => 0.0,
            Align::Center => (width - self.text_width(text, font, size)) / 2.0,
            Align::Right => width - self.text_width(text, font, size),
        };
        self.draw_text(text, x + offset.max(0.0), y, font, size);
    }
}
