//! 基于 pdf-writer 的 [`Canvas`] 实现, 整个文档在内存中生成

use std::collections::{BTreeMap, BTreeSet};

use pdf_writer::types::{CidFontType, FontFlags, SystemInfo, UnicodeCmap};
use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};

use crate::render::canvas::{Canvas, FontChoice};
use crate::render::fonts::{FontBook, FontFile, FontSlot, Glyph};
use crate::render::layout::PageGeometry;

const IDENTITY_INFO: SystemInfo<'static> = SystemInfo {
    registry: Str(b"Adobe"),
    ordering: Str(b"Identity"),
    supplement: 0,
};

/// 文本基线相对行顶部的位置 (字号的比例)
const BASELINE_RATIO: f32 = 0.8;

pub struct PdfCanvas<'a> {
    fonts: &'a FontBook,
    page: PageGeometry,
    pages: Vec<Content>,
    used_slots: BTreeSet<FontSlot>,
    /// 嵌入字体已用字形: gid -> (字符, 字宽)
    used_glyphs: BTreeMap<FontSlot, BTreeMap<u16, (char, f32)>>,
}

impl<'a> PdfCanvas<'a> {
    pub fn new(fonts: &'a FontBook, page: PageGeometry) -> Self {
        Self {
            fonts,
            page,
            pages: vec![Content::new()],
            used_slots: BTreeSet::new(),
            used_glyphs: BTreeMap::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn content(&mut self) -> &mut Content {
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn flip(&self, y: f32) -> f32 {
        self.page.height - y
    }

    /// 编码文本: 内置字体用 WinAnsi 单字节, 嵌入字体用 Identity-H 双字节字形号
    fn encode(&mut self, slot: FontSlot, text: &str) -> Vec<u8> {
        let fonts = self.fonts;
        match fonts.embedded(slot) {
            Some(file) => {
                let glyphs = file.glyphs(text);
                let used = self.used_glyphs.entry(slot).or_default();
                let mut bytes = Vec::with_capacity(glyphs.len() * 2);
                for Glyph { id, ch, advance } in glyphs {
                    used.entry(id).or_insert((ch, advance));
                    bytes.extend_from_slice(&id.to_be_bytes());
                }
                bytes
            }
            None => text.chars().map(winansi_byte).collect(),
        }
    }

    /// 写出全部对象并返回 PDF 字节
    pub fn finish(self) -> Vec<u8> {
        let mut pdf = Pdf::new();
        let mut next_id = 1;
        let mut alloc = || {
            let id = Ref::new(next_id);
            next_id += 1;
            id
        };

        let catalog_id = alloc();
        let tree_id = alloc();

        let mut font_refs: Vec<(FontSlot, Ref)> = Vec::new();
        for &slot in &self.used_slots {
            let font_id = alloc();
            match self.fonts.embedded(slot) {
                Some(file) => {
                    let empty = BTreeMap::new();
                    let glyphs = self.used_glyphs.get(&slot).unwrap_or(&empty);
                    write_type0_font(&mut pdf, &mut alloc, font_id, file, glyphs);
                }
                None => {
                    pdf.type1_font(font_id)
                        .base_font(Name(slot.builtin_name().as_bytes()))
                        .encoding_predefined(Name(b"WinAnsiEncoding"));
                }
            }
            font_refs.push((slot, font_id));
        }

        let mut page_ids = Vec::with_capacity(self.pages.len());
        for content in self.pages {
            let page_id = alloc();
            let content_id = alloc();
            page_ids.push(page_id);

            {
                let mut page = pdf.page(page_id);
                page.media_box(Rect::new(0.0, 0.0, self.page.width, self.page.height));
                page.parent(tree_id);
                page.contents(content_id);
                let mut resources = page.resources();
                let mut fonts = resources.fonts();
                for (slot, id) in &font_refs {
                    fonts.pair(Name(slot.resource_name().as_bytes()), *id);
                }
            }

            pdf.stream(content_id, &content.finish());
        }

        pdf.catalog(catalog_id).pages(tree_id);
        let count = page_ids.len() as i32;
        pdf.pages(tree_id).kids(page_ids).count(count);

        pdf.finish()
    }
}

impl Canvas for PdfCanvas<'_> {
    fn text_width(&self, text: &str, font: FontChoice, size: f32) -> f32 {
        let slot = self.fonts.resolve(font);
        self.fonts.text_width(slot, text, size)
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, font: FontChoice, size: f32) {
        if text.is_empty() {
            return;
        }
        let slot = self.fonts.resolve(font);
        self.used_slots.insert(slot);

        let encoded = self.encode(slot, text);
        let baseline = self.flip(y + size * BASELINE_RATIO);
        let content = self.content();
        content.begin_text();
        content.set_font(Name(slot.resource_name().as_bytes()), size);
        content.next_line(x, baseline);
        content.show(Str(&encoded));
        content.end_text();
    }

    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let bottom = self.flip(y + height);
        let content = self.content();
        content.set_line_width(0.5);
        content.rect(x, bottom, width, height);
        content.stroke();
    }

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32)) {
        let (from_y, to_y) = (self.flip(from.1), self.flip(to.1));
        let content = self.content();
        content.set_line_width(0.5);
        content.move_to(from.0, from_y);
        content.line_to(to.0, to_y);
        content.stroke();
    }

    fn new_page(&mut self) {
        self.pages.push(Content::new());
    }
}

/// 嵌入 TrueType 字体: Type0 + CIDFontType2 + ToUnicode, 宽度只写已用字形
fn write_type0_font(
    pdf: &mut Pdf,
    alloc: &mut impl FnMut() -> Ref,
    font_id: Ref,
    file: &FontFile,
    glyphs: &BTreeMap<u16, (char, f32)>,
) {
    let cid_id = alloc();
    let descriptor_id = alloc();
    let cmap_id = alloc();
    let file_id = alloc();
    let base_font = Name(file.postscript_name().as_bytes());

    pdf.type0_font(font_id)
        .base_font(base_font)
        .encoding_predefined(Name(b"Identity-H"))
        .descendant_font(cid_id)
        .to_unicode(cmap_id);

    {
        let mut cid = pdf.cid_font(cid_id);
        cid.subtype(CidFontType::Type2);
        cid.base_font(base_font);
        cid.system_info(IDENTITY_INFO);
        cid.font_descriptor(descriptor_id);
        cid.default_width(0.0);
        cid.cid_to_gid_map_predefined(Name(b"Identity"));
        let mut widths = cid.widths();
        for (gid, (_, advance)) in glyphs {
            widths.consecutive(*gid, [*advance]);
        }
    }

    let metrics = file.metrics();
    let [x_min, y_min, x_max, y_max] = metrics.bbox;
    pdf.font_descriptor(descriptor_id)
        .name(base_font)
        .flags(FontFlags::NON_SYMBOLIC)
        .bbox(Rect::new(x_min, y_min, x_max, y_max))
        .italic_angle(0.0)
        .ascent(metrics.ascent)
        .descent(metrics.descent)
        .cap_height(metrics.cap_height)
        .stem_v(80.0)
        .font_file2(file_id);

    let mut cmap = UnicodeCmap::new(Name(b"Custom"), IDENTITY_INFO);
    for (gid, (ch, _)) in glyphs {
        cmap.pair(*gid, *ch);
    }
    pdf.cmap(cmap_id, &cmap.finish());

    pdf.stream(file_id, file.data())
        .pair(Name(b"Length1"), file.data().len() as i32);
}

/// WinAnsi 单字节; Latin-1 以外的字符用 `?` 代替
fn winansi_byte(c: char) -> u8 {
    match u32::from(c) {
        code @ (0x20..=0x7E | 0xA0..=0xFF) => code as u8,
        _ => b'?',
    }
}
