//! Pixel painting on window surfaces: boxes, text, icons and the generic
//! field widgets every tool view is built from.

use ab_glyph::{Font, FontArc, PxScale, ScaleFont, point};
use fontdb::Database;
use thiserror::Error;

use glyphed_core::*;

pub const FONT_PX: f32 = 14.0;
/// Advance used for measuring when no font could be loaded.
const FALLBACK_ADVANCE: i32 = 8;

#[derive(Debug, Error)]
pub enum FontError {
    #[error("no system font found")]
    NotFound,
    #[error("cannot read font: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid font data")]
    Invalid,
}

/// The font all UI text is drawn with.
#[derive(Clone, Debug)]
pub struct UiFont {
    font: FontArc,
    px: f32,
}

impl UiFont {
    /// Picks a monospace system face, falling back to sans-serif.
    pub fn from_system() -> Result<Self, FontError> {
        let mut db = Database::new();
        db.load_system_fonts();
        let query = fontdb::Query {
            families: &[fontdb::Family::Monospace, fontdb::Family::SansSerif],
            ..Default::default()
        };
        let id = db.query(&query).ok_or(FontError::NotFound)?;
        let (source, index) = db.face_source(id).ok_or(FontError::NotFound)?;
        let bytes = match source {
            fontdb::Source::Binary(data) => {
                let b: &[u8] = data.as_ref().as_ref();
                b.to_vec()
            }
            fontdb::Source::File(path) | fontdb::Source::SharedFile(path, _) => {
                std::fs::read(path)?
            }
        };
        let font = ab_glyph::FontVec::try_from_vec_and_index(bytes, index)
            .map_err(|_| FontError::Invalid)?;
        log::debug!("ui font: face {index} of {:?}", db.face(id).map(|f| &f.families));
        Ok(Self {
            font: FontArc::new(font),
            px: FONT_PX,
        })
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, FontError> {
        let font = FontArc::try_from_vec(bytes).map_err(|_| FontError::Invalid)?;
        Ok(Self { font, px: FONT_PX })
    }

    fn advance(&self, c: char) -> f32 {
        let scaled = self.font.as_scaled(PxScale::from(self.px));
        scaled.h_advance(scaled.glyph_id(c))
    }

    pub fn width(&self, text: &str) -> i32 {
        text.chars().map(|c| self.advance(c)).sum::<f32>().ceil() as i32
    }

    /// Draws `text` with its top-left corner at (x, y); returns the pen x
    /// after the last character.
    fn draw(&self, s: &mut Surface, x: i32, y: i32, text: &str, fg: Color) -> i32 {
        let scale = PxScale::from(self.px);
        let scaled = self.font.as_scaled(scale);
        let mut pen = x as f32;
        let base = y as f32 + scaled.ascent();
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            let glyph = id.with_scale_and_position(scale, point(pen, base));
            if let Some(outlined) = scaled.outline_glyph(glyph) {
                let bb = outlined.px_bounds();
                outlined.draw(|gx, gy, cov| {
                    let a = (cov.clamp(0.0, 1.0) * 255.0) as u8;
                    if a > 0 {
                        s.blend(bb.min.x as i32 + gx as i32, bb.min.y as i32 + gy as i32, fg, a);
                    }
                });
            }
            pen += scaled.h_advance(id);
        }
        pen.ceil() as i32
    }
}

const ICON_SIZE: usize = 16;

/// 8×8 masks scaled up 2× into 16×16 ARGB icons.
const ICON_MASKS: [[u8; 8]; 9] = [
    // about: "i"
    [0x18, 0x18, 0x00, 0x38, 0x18, 0x18, 0x18, 0x3C],
    // load: folder
    [0x00, 0x70, 0x8F, 0x81, 0x81, 0x81, 0xFF, 0x00],
    // save: disk
    [0xFF, 0x81, 0xBD, 0x81, 0xFF, 0xC3, 0xC3, 0xFF],
    // properties: lines
    [0x00, 0x7E, 0x00, 0x7E, 0x00, 0x7E, 0x00, 0x7E],
    // ranges: brackets
    [0x66, 0x42, 0x42, 0x42, 0x42, 0x42, 0x42, 0x66],
    // glyphs: grid
    [0xDB, 0xDB, 0x00, 0xDB, 0xDB, 0x00, 0xDB, 0xDB],
    // measures: ruler
    [0x80, 0xC0, 0xA0, 0x90, 0x88, 0x84, 0x82, 0xFF],
    // layers: stack
    [0x18, 0x66, 0x81, 0x66, 0x99, 0x66, 0x18, 0x00],
    // kerning: "AV"
    [0x00, 0x81, 0x42, 0x24, 0x24, 0x42, 0x81, 0x00],
];

/// Toolbar icon bitmaps, rendered once at startup.
#[derive(Clone, Debug, Default)]
pub struct IconAtlas {
    icons: Vec<Vec<u32>>,
}

impl IconAtlas {
    pub fn new(fg: Color) -> Self {
        let icons = ICON_MASKS
            .iter()
            .map(|mask| {
                let mut px = vec![0u32; ICON_SIZE * ICON_SIZE];
                for (y, row) in px.chunks_mut(ICON_SIZE).enumerate() {
                    let bits = mask[y / 2];
                    for (x, p) in row.iter_mut().enumerate() {
                        if bits & (0x80 >> (x / 2)) != 0 {
                            *p = fg.0;
                        }
                    }
                }
                px
            })
            .collect();
        Self { icons }
    }

    /// Icon `n` of a window of `kind`.
    pub fn get(&self, kind: WindowKind, n: usize) -> Option<&[u32]> {
        let base = if kind.is_main() { 0 } else { 6 };
        self.icons.get(base + n).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }
}

/// Draws on one surface with the shared theme and font.
pub struct Painter<'a> {
    pub surface: &'a mut Surface,
    font: Option<&'a UiFont>,
    palette: &'a Palette,
}

impl<'a> Painter<'a> {
    pub fn new(surface: &'a mut Surface, font: Option<&'a UiFont>, palette: &'a Palette) -> Self {
        Self {
            surface,
            font,
            palette,
        }
    }

    pub fn color(&self, role: ThemeRole) -> Color {
        self.palette.get(role)
    }

    pub fn width(&self) -> i32 {
        self.surface.width() as i32
    }

    pub fn height(&self) -> i32 {
        self.surface.height() as i32
    }

    pub fn fill(&mut self, r: Rect, role: ThemeRole) {
        let c = self.color(role);
        self.surface.fill_rect(r, c);
    }

    pub fn bevel(&mut self, r: Rect, light: ThemeRole, bg: ThemeRole, dark: ThemeRole) {
        let (l, b, d) = (self.color(light), self.color(bg), self.color(dark));
        self.surface.bevel(r, l, b, d);
    }

    pub fn text_width(&self, text: &str) -> i32 {
        match self.font {
            Some(f) => f.width(text),
            None => text.chars().count() as i32 * FALLBACK_ADVANCE,
        }
    }

    /// Returns the x after the text.
    pub fn text(&mut self, x: i32, y: i32, text: &str, fg: ThemeRole) -> i32 {
        let c = self.color(fg);
        match self.font {
            Some(f) => f.draw(self.surface, x, y, text, c),
            None => x + self.text_width(text),
        }
    }

    pub fn icon(&mut self, x: i32, y: i32, bitmap: &[u32]) {
        self.surface
            .blit(x, y, ICON_SIZE as u32, ICON_SIZE as u32, bitmap);
    }

    pub fn button(&mut self, r: Rect, label: &str, pressed: bool, focused: bool) {
        if pressed {
            self.bevel(r, ThemeRole::Btn0Dark, ThemeRole::Btn0Bg, ThemeRole::Btn0Light);
        } else {
            self.bevel(r, ThemeRole::Btn1Light, ThemeRole::Btn1Bg, ThemeRole::Btn1Dark);
        }
        let tw = self.text_width(label);
        self.text(r.x + (r.w - tw).max(0) / 2, r.y + 2, label, ThemeRole::Btn1Fg);
        if focused {
            self.underline(r);
        }
    }

    /// Text field. With `cursor` the field is being edited and a caret is
    /// drawn before that byte offset.
    pub fn input(&mut self, r: Rect, text: &str, focused: bool, cursor: Option<usize>) {
        self.bevel(r, ThemeRole::Darker, ThemeRole::InputBg, ThemeRole::Lighter);
        let x = r.x + 4;
        self.text(x, r.y + 2, text, ThemeRole::InputFg);
        if let Some(at) = cursor {
            let head = text.get(..at).unwrap_or(text);
            let cx = x + self.text_width(head);
            self.fill(Rect::new(cx, r.y + 2, 1, r.h - 4), ThemeRole::Cursor);
        } else if focused {
            self.underline(r);
        }
    }

    pub fn item(&mut self, r: Rect, label: &str, selected: bool, focused: bool) {
        if selected {
            self.fill(r, ThemeRole::Selected);
        }
        self.text(r.x + 2, r.y + 2, label, ThemeRole::Fg);
        if focused {
            self.underline(r);
        }
    }

    fn underline(&mut self, r: Rect) {
        self.fill(Rect::new(r.x, r.bottom() - 1, r.w, 1), ThemeRole::Cursor);
    }
}
