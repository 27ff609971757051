use std::path::Path;

use thiserror::Error;

/// A 0xAARRGGBB pixel value, the layout every surface in the editor uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    pub const TRANSPARENT: Color = Color(0);
    pub const BLACK: Color = Color(0xFF00_0000);
    pub const WHITE: Color = Color(0xFFFF_FFFF);

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Color(0xFF00_0000 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    pub fn from_hex(hex: &str) -> Self {
        let s = hex.trim_start_matches('#');
        let c = |i: usize| u8::from_str_radix(s.get(i..i + 2).unwrap_or("00"), 16).unwrap_or(0);
        match s.len() {
            6 => Color::from_rgb(c(0), c(2), c(4)),
            _ => Color::BLACK,
        }
    }

    pub fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }
    pub fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }
    pub fn b(self) -> u8 {
        self.0 as u8
    }

    /// Adds `d` to every channel, saturating. Used for hover/pressed variants.
    pub fn lighten(self, d: u8) -> Self {
        Color::from_rgb(
            self.r().saturating_add(d),
            self.g().saturating_add(d),
            self.b().saturating_add(d),
        )
    }

    /// Blend `self` over `bg` with coverage `a` (0..=255).
    pub fn blend(self, bg: Color, a: u8) -> Color {
        let a = a as u32;
        let mix = |f: u8, b: u8| ((f as u32 * a + b as u32 * (255 - a)) / 255) as u8;
        Color::from_rgb(mix(self.r(), bg.r()), mix(self.g(), bg.g()), mix(self.b(), bg.b()))
    }
}

/// Fixed theme roles. The discriminant is the role's index in a palette file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum ThemeRole {
    Bg,
    Fg,
    Light,
    Dark,
    Lighter,
    Darker,
    InputBg,
    InputFg,
    Selected,
    Cursor,
    Grid,
    GridAlt,
    Btn0Light,
    Btn0Bg,
    Btn0Dark,
    Btn1Light,
    Btn1Bg,
    Btn1Fg,
    Btn1Dark,
    /// Background of the status bar when an error is shown.
    ErrorBg,
    TabBg,
    TabFg,
    TabActive,
    Baseline,
    Underline,
    Overline,
    Advance,
    Horizontal,
    Point,
    Control,
    Kerning,
    Ligature,
}

impl ThemeRole {
    pub const COUNT: usize = 32;
}

const DEFAULT_THEME: [u32; ThemeRole::COUNT] = [
    0xFF454545, 0xFFBEBEBE, 0xFF5C5C5C, 0xFF343434, 0xFF606060, 0xFF303030, 0xFF3C3C3C,
    0xFF101010, 0xFF686868, 0xFF515151, 0xFF484848, 0xFF404040, 0xFF744C4C, 0xFF5D3535,
    0xFF542C2C, 0xFF4C2424, 0xFF606060, 0xFFF0F0F0, 0xFF909090, 0xFF4E4E4E, 0xFF101010,
    0xFF343434, 0xFFB0B0B0, 0xFF800000, 0xFF004040, 0xFF005050, 0xFFFF0000, 0xFF007F7F,
    0xFF0000B0, 0xFF00B000, 0xFF007F00, 0xFF005050,
];

#[derive(Debug, Error)]
pub enum PaletteError {
    #[error("cannot read palette file: {0}")]
    Io(#[from] std::io::Error),
}

/// The shared theme consulted by every renderer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    colors: [Color; ThemeRole::COUNT],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_THEME.map(Color),
        }
    }
}

impl Palette {
    pub fn get(&self, role: ThemeRole) -> Color {
        self.colors[role as usize]
    }

    pub fn set(&mut self, role: ThemeRole, color: Color) {
        self.colors[role as usize] = color;
    }

    pub fn colors(&self) -> &[Color; ThemeRole::COUNT] {
        &self.colors
    }

    /// Overrides roles in order from `"r g b"` lines. Returns how many roles
    /// were overridden.
    pub fn apply_text(&mut self, text: &str) -> usize {
        let mut role = 0;
        for line in text.lines() {
            if role >= ThemeRole::COUNT {
                break;
            }
            if let Some(c) = parse_palette_line(line) {
                self.colors[role] = c;
                role += 1;
            }
        }
        role
    }

    pub fn load(&mut self, path: &Path) -> Result<usize, PaletteError> {
        let text = std::fs::read_to_string(path)?;
        let n = self.apply_text(&text);
        log::info!("palette {}: {} colors overridden", path.display(), n);
        Ok(n)
    }
}

const HEADER_WORDS: [&str; 3] = ["GIMP", "Name", "Columns"];

/// One palette line. Headers, comments and anything not starting with three
/// integers yield `None`; trailing text after the triple (a color name) is
/// ignored.
pub fn parse_palette_line(line: &str) -> Option<Color> {
    let t = line.trim();
    if t.is_empty() || t.starts_with('#') || HEADER_WORDS.iter().any(|w| t.starts_with(w)) {
        return None;
    }
    let mut it = t.split_whitespace().map(|s| s.parse::<i64>());
    let (Some(Ok(r)), Some(Ok(g)), Some(Ok(b))) = (it.next(), it.next(), it.next()) else {
        return None;
    };
    Some(Color::from_rgb((r & 0xFF) as u8, (g & 0xFF) as u8, (b & 0xFF) as u8))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_palette_overrides_only_leading_roles() {
        let mut p = Palette::default();
        let text = "GIMP Palette\nName: test\n#\n1 2 3\n  4 5 6\tblue-ish\n7 8 9\nnot a color\n10 11\n";
        assert_eq!(p.apply_text(text), 3);
        assert_eq!(p.get(ThemeRole::Bg), Color::from_rgb(1, 2, 3));
        assert_eq!(p.get(ThemeRole::Fg), Color::from_rgb(4, 5, 6));
        assert_eq!(p.get(ThemeRole::Light), Color::from_rgb(7, 8, 9));
        assert_eq!(p.get(ThemeRole::Dark), Palette::default().get(ThemeRole::Dark));
        assert_eq!(p.get(ThemeRole::Ligature), Color(0xFF005050));
    }

    #[test]
    fn malformed_lines_do_not_consume_roles() {
        let mut p = Palette::default();
        assert_eq!(p.apply_text("x y z\n255 0 0\n"), 1);
        assert_eq!(p.get(ThemeRole::Bg), Color::from_rgb(255, 0, 0));
    }

    #[test]
    fn components_are_masked_to_a_byte() {
        assert_eq!(parse_palette_line("256 257 -1"), Some(Color::from_rgb(0, 1, 255)));
    }

    #[test]
    fn blend_endpoints() {
        let fg = Color::WHITE;
        let bg = Color::BLACK;
        assert_eq!(fg.blend(bg, 255), Color::WHITE);
        assert_eq!(fg.blend(bg, 0), Color::BLACK);
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let mut p = Palette::default();
        assert!(p.load(Path::new("/nonexistent/palette.gpl")).is_err());
        assert_eq!(p, Palette::default());
    }
}
