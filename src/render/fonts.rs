//! 字体资源: 可选的 TTF/OTF 文件, 未配置时回退到 PDF 内置 Helvetica

use std::collections::BTreeMap;
use std::path::Path;

use ttf_parser::{name_id, Face};

use crate::config::FontConfig;
use crate::error::RenderError;
use crate::render::canvas::FontChoice;
use crate::render::script::Script;

/// PDF 页面资源中的字体槽位
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FontSlot {
    Regular,
    Bold,
    Arabic,
    Cjk,
    Devanagari,
    Gujarati,
}

impl FontSlot {
    pub fn resource_name(self) -> &'static str {
        match self {
            FontSlot::Regular => "F1",
            FontSlot::Bold => "F2",
            FontSlot::Arabic => "F3",
            FontSlot::Cjk => "F4",
            FontSlot::Devanagari => "F5",
            FontSlot::Gujarati => "F6",
        }
    }

    /// 未嵌入字体时使用的标准 Type1 字体
    pub fn builtin_name(self) -> &'static str {
        match self {
            FontSlot::Bold => "Helvetica-Bold",
            _ => "Helvetica",
        }
    }

    fn for_script(script: Script) -> Self {
        match script {
            Script::Latin => FontSlot::Regular,
            Script::Arabic => FontSlot::Arabic,
            Script::Cjk => FontSlot::Cjk,
            Script::Devanagari => FontSlot::Devanagari,
            Script::Gujarati => FontSlot::Gujarati,
        }
    }
}

/// 已校验的字体文件
#[derive(Debug, Clone)]
pub struct FontFile {
    data: Vec<u8>,
    postscript_name: String,
}

/// 一个字符在嵌入字体中的字形
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    pub id: u16,
    pub ch: char,
    /// 千分之一 em
    pub advance: f32,
}

impl FontFile {
    pub fn load(path: &Path) -> Result<Self, RenderError> {
        let data = std::fs::read(path).map_err(|source| RenderError::FontIo {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_bytes(&path.display().to_string(), data)
    }

    pub fn from_bytes(label: &str, data: Vec<u8>) -> Result<Self, RenderError> {
        let face = Face::parse(&data, 0).map_err(|e| RenderError::InvalidFont {
            path: label.to_string(),
            reason: e.to_string(),
        })?;

        let postscript_name = face
            .names()
            .into_iter()
            .filter(|n| n.name_id == name_id::POST_SCRIPT_NAME || n.name_id == name_id::FAMILY)
            .find_map(|n| n.to_string())
            .map(|n| n.chars().filter(|c| c.is_ascii_alphanumeric() || *c == '-').collect::<String>())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "EmbeddedFont".to_string());

        Ok(Self {
            data,
            postscript_name,
        })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn postscript_name(&self) -> &str {
        &self.postscript_name
    }

    fn face(&self) -> Option<Face<'_>> {
        Face::parse(&self.data, 0).ok()
    }

    /// 逐字符映射字形; 字体中缺失的字符映射到 .notdef
    pub fn glyphs(&self, text: &str) -> Vec<Glyph> {
        let Some(face) = self.face() else {
            return Vec::new();
        };
        let scale = 1000.0 / f32::from(face.units_per_em());

        text.chars()
            .map(|ch| {
                let gid = face.glyph_index(ch).unwrap_or(ttf_parser::GlyphId(0));
                let advance = face.glyph_hor_advance(gid).unwrap_or(0);
                Glyph {
                    id: gid.0,
                    ch,
                    advance: f32::from(advance) * scale,
                }
            })
            .collect()
    }

    /// 字体包围盒及上下伸部, 千分之一 em
    pub fn metrics(&self) -> FontMetrics {
        let Some(face) = self.face() else {
            return FontMetrics::default();
        };
        let scale = 1000.0 / f32::from(face.units_per_em());
        let bbox = face.global_bounding_box();

        FontMetrics {
            bbox: [
                f32::from(bbox.x_min) * scale,
                f32::from(bbox.y_min) * scale,
                f32::from(bbox.x_max) * scale,
                f32::from(bbox.y_max) * scale,
            ],
            ascent: f32::from(face.ascender()) * scale,
            descent: f32::from(face.descender()) * scale,
            cap_height: face
                .capital_height()
                .map(|h| f32::from(h) * scale)
                .unwrap_or_else(|| f32::from(face.ascender()) * scale),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FontMetrics {
    pub bbox: [f32; 4],
    pub ascent: f32,
    pub descent: f32,
    pub cap_height: f32,
}

/// 渲染用字体集合, 启动时加载, 请求间只读共享
#[derive(Debug, Clone, Default)]
pub struct FontBook {
    embedded: BTreeMap<FontSlot, FontFile>,
}

impl FontBook {
    /// 仅使用内置 Helvetica
    pub fn builtin() -> Self {
        Self::default()
    }

    pub fn from_config(config: &FontConfig) -> Result<Self, RenderError> {
        let mut book = Self::builtin();
        let configured = [
            (FontSlot::Regular, &config.regular),
            (FontSlot::Bold, &config.bold),
            (FontSlot::Arabic, &config.arabic),
            (FontSlot::Cjk, &config.cjk),
            (FontSlot::Devanagari, &config.devanagari),
            (FontSlot::Gujarati, &config.gujarati),
        ];

        for (slot, path) in configured {
            if let Some(path) = path {
                let file = FontFile::load(path)?;
                tracing::info!(
                    "Loaded font {} for {:?} from {}",
                    file.postscript_name(),
                    slot,
                    path.display()
                );
                book = book.with_font(slot, file);
            }
        }

        Ok(book)
    }

    pub fn with_font(mut self, slot: FontSlot, file: FontFile) -> Self {
        self.embedded.insert(slot, file);
        self
    }

    pub fn embedded(&self, slot: FontSlot) -> Option<&FontFile> {
        self.embedded.get(&slot)
    }

    /// 书写系统字体未配置时回退到常规字体
    pub fn resolve(&self, choice: FontChoice) -> FontSlot {
        match choice {
            FontChoice::Regular => FontSlot::Regular,
            FontChoice::Bold => FontSlot::Bold,
            FontChoice::Script(script) => {
                let slot = FontSlot::for_script(script);
                if slot == FontSlot::Regular || self.embedded.contains_key(&slot) {
                    slot
                } else {
                    FontSlot::Regular
                }
            }
        }
    }

    pub fn text_width(&self, slot: FontSlot, text: &str, size: f32) -> f32 {
        let units: f32 = match self.embedded(slot) {
            Some(file) => file.glyphs(text).iter().map(|g| g.advance).sum(),
            None => {
                let table = if slot == FontSlot::Bold {
                    &HELVETICA_BOLD_WIDTHS
                } else {
                    &HELVETICA_WIDTHS
                };
                text.chars().map(|c| builtin_width(table, c)).sum()
            }
        };
        units * size / 1000.0
    }
}

fn builtin_width(table: &[u16; 95], c: char) -> f32 {
    match u32::from(c) {
        code @ 0x20..=0x7E => f32::from(table[(code - 0x20) as usize]),
        _ => 556.0,
    }
}

/// Helvetica AFM 字宽, ASCII 0x20..=0x7E
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, //
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, //
    278, 278, 584, 584, 584, 556, 1015, //
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, 778, 722,
    667, 611, 722, 667, 944, 667, 667, 611, //
    278, 278, 278, 469, 556, 333, //
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333,
    500, 278, 556, 500, 722, 500, 500, 500, //
    334, 260, 334, 584,
];

/// Helvetica-Bold AFM 字宽, ASCII 0x20..=0x7E
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, //
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, //
    333, 333, 584, 584, 584, 611, 975, //
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, 667, 778, 722,
    667, 611, 722, 667, 944, 667, 667, 611, //
    333, 278, 333, 584, 556, 333, //
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, 611, 611, 389,
    556, 333, 611, 556, 778, 556, 556, 500, //
    389, 280, 389, 584,
];
