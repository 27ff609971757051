//! The in-memory font document and its on-disk store.
//!
//! Only what the editor shell needs is modeled here: per-codepoint metrics
//! and layers, the six string properties and the ligature name table.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Point;

pub const MAX_CODEPOINT: u32 = 0x10FFFF;
pub const LIGATURE_FIRST: u32 = 0xF000;
pub const LIGATURE_LAST: u32 = 0xF8FF;
pub const LIGATURE_SLOTS: usize = (LIGATURE_LAST - LIGATURE_FIRST + 1) as usize;

pub fn is_ligature(cp: u32) -> bool {
    (LIGATURE_FIRST..=LIGATURE_LAST).contains(&cp)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Property {
    Name,
    Family,
    Subfamily,
    Revision,
    Manufacturer,
    License,
}

impl Property {
    pub const ALL: [Property; 6] = [
        Property::Name,
        Property::Family,
        Property::Subfamily,
        Property::Revision,
        Property::Manufacturer,
        Property::License,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Property::Name => "Unique name",
            Property::Family => "Family",
            Property::Subfamily => "Subfamily",
            Property::Revision => "Revision",
            Property::Manufacturer => "Manufacturer",
            Property::License => "License",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerKind {
    #[default]
    Contour,
    Bitmap,
    Pixmap,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    pub kind: LayerKind,
    /// Index into the font's color map; 0xFE means "foreground".
    pub color: u8,
    #[serde(default)]
    pub points: Vec<Point>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kerning {
    pub next: u32,
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlyphEntry {
    #[serde(default)]
    pub layers: Vec<Layer>,
    pub width: u32,
    pub height: u32,
    pub adv_x: i32,
    pub adv_y: i32,
    pub ovl_x: i32,
    #[serde(default)]
    pub kerning: Vec<Kerning>,
}

impl GlyphEntry {
    /// Neither drawn nor spacing: nothing worth keeping a window open for.
    pub fn is_blank(&self) -> bool {
        self.layers.is_empty() && self.adv_x == 0 && self.adv_y == 0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontDocument {
    pub width: u32,
    pub height: u32,
    pub baseline: u32,
    pub underline: u32,
    #[serde(default)]
    properties: [String; 6],
    #[serde(default)]
    glyphs: BTreeMap<u32, GlyphEntry>,
    #[serde(default)]
    ligatures: BTreeMap<u16, String>,
}

impl Default for FontDocument {
    fn default() -> Self {
        Self {
            width: 8,
            height: 16,
            baseline: 12,
            underline: 14,
            properties: Default::default(),
            glyphs: BTreeMap::new(),
            ligatures: BTreeMap::new(),
        }
    }
}

impl FontDocument {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            baseline: height * 3 / 4,
            underline: (height * 7 / 8).min(height.saturating_sub(1)),
            ..Self::default()
        }
    }

    pub fn property(&self, p: Property) -> &str {
        &self.properties[p as usize]
    }

    pub fn set_property(&mut self, p: Property, value: &str) {
        self.properties[p as usize] = value.to_owned();
    }

    pub fn glyph(&self, cp: u32) -> Option<&GlyphEntry> {
        self.glyphs.get(&cp)
    }

    pub fn glyph_mut(&mut self, cp: u32) -> &mut GlyphEntry {
        self.glyphs.entry(cp).or_default()
    }

    pub fn glyphs(&self) -> impl Iterator<Item = (u32, &GlyphEntry)> {
        self.glyphs.iter().map(|(&cp, g)| (cp, g))
    }

    /// Drops every entry in `range`; returns how many there were.
    pub fn remove_glyphs(&mut self, range: std::ops::RangeInclusive<u32>) -> usize {
        if range.start() > range.end() {
            return 0;
        }
        let doomed: Vec<u32> = self.glyphs.range(range).map(|(&cp, _)| cp).collect();
        for cp in &doomed {
            self.glyphs.remove(cp);
        }
        doomed.len()
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.values().filter(|g| !g.is_blank()).count()
    }

    pub fn ligature(&self, slot: usize) -> Option<&str> {
        u16::try_from(slot)
            .ok()
            .and_then(|s| self.ligatures.get(&s))
            .map(String::as_str)
    }

    /// Sets ligature `slot`; an empty string clears it. Slots past the table
    /// are ignored.
    pub fn set_ligature(&mut self, slot: usize, value: &str) {
        if slot >= LIGATURE_SLOTS {
            return;
        }
        let slot = slot as u16;
        if value.is_empty() {
            self.ligatures.remove(&slot);
        } else {
            self.ligatures.insert(slot, value.to_owned());
        }
    }

    /// Prepares the entry of a freshly opened glyph window. A glyph without
    /// layers takes the document's default size, and loses its advances
    /// unless it is a whitespace character.
    pub fn seed_glyph_metrics(&mut self, cp: u32) {
        let (w, h) = (self.width, self.height);
        let g = self.glyph_mut(cp);
        if !g.layers.is_empty() {
            return;
        }
        g.width = w;
        g.height = h;
        if !char::from_u32(cp).is_some_and(char::is_whitespace) {
            g.adv_x = 0;
            g.adv_y = 0;
            g.ovl_x = 0;
        }
    }

    /// Drops data that cannot be addressed: codepoints past the Unicode range
    /// and out of table ligatures.
    pub fn sanitize(&mut self) {
        self.glyphs.retain(|&cp, _| cp <= MAX_CODEPOINT);
        self.ligatures.retain(|&s, v| (s as usize) < LIGATURE_SLOTS && !v.is_empty());
        for g in self.glyphs.values_mut() {
            g.kerning.retain(|k| k.next <= MAX_CODEPOINT);
            g.kerning.sort_by_key(|k| k.next);
            g.kerning.dedup_by_key(|k| k.next);
        }
    }
}

/// Progress report of a long document operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    pub step: u32,
    /// 0 when the operation has a single step.
    pub total_steps: u32,
    pub current: u64,
    pub total: u64,
    pub message: Option<&'static str>,
}

impl Progress {
    /// Rounded the same way for every caller so repeated reports of the same
    /// value can be skipped.
    pub fn percent(&self) -> u32 {
        ((self.current + 1) * 100 / (self.total + 1)) as u32
    }
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("bad font document: {0}")]
    Format(#[from] serde_json::Error),
    #[error("no file name")]
    NoFilename,
}

pub trait DocumentStore {
    fn load(
        &self,
        path: &Path,
        progress: &mut dyn FnMut(Progress),
    ) -> Result<FontDocument, DocumentError>;

    fn save(
        &self,
        doc: &FontDocument,
        path: &Path,
        progress: &mut dyn FnMut(Progress),
    ) -> Result<(), DocumentError>;
}

/// Stores documents as pretty-printed JSON.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonStore;

impl DocumentStore for JsonStore {
    fn load(
        &self,
        path: &Path,
        progress: &mut dyn FnMut(Progress),
    ) -> Result<FontDocument, DocumentError> {
        let file = File::open(path)?;
        let size = file.metadata().map(|m| m.len()).unwrap_or(0);
        progress(Progress {
            step: 1,
            total_steps: 2,
            current: 0,
            total: size,
            message: Some("Loading"),
        });
        let mut doc: FontDocument = serde_json::from_reader(BufReader::new(file))?;
        let total = doc.glyphs.len() as u64;
        progress(Progress {
            step: 2,
            total_steps: 2,
            current: 0,
            total,
            message: Some("Checking"),
        });
        doc.sanitize();
        progress(Progress {
            step: 2,
            total_steps: 2,
            current: total,
            total,
            message: Some("Checking"),
        });
        log::info!("loaded {} ({} glyphs)", path.display(), doc.glyph_count());
        Ok(doc)
    }

    fn save(
        &self,
        doc: &FontDocument,
        path: &Path,
        progress: &mut dyn FnMut(Progress),
    ) -> Result<(), DocumentError> {
        let total = doc.glyphs.len() as u64;
        progress(Progress {
            step: 0,
            total_steps: 0,
            current: 0,
            total,
            message: Some("Saving"),
        });
        let mut w = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut w, doc)?;
        w.flush()?;
        progress(Progress {
            step: 0,
            total_steps: 0,
            current: total,
            total,
            message: Some("Saving"),
        });
        log::info!("saved {}", path.display());
        Ok(())
    }
}

/// Display names of code points.
pub trait UnicodeNames {
    fn name(&self, cp: u32) -> Option<Cow<'static, str>>;
}

/// A small built-in name table: ASCII letters and digits plus a handful of
/// common punctuation.
#[derive(Clone, Copy, Debug, Default)]
pub struct BasicNames;

const DIGITS: [&str; 10] = [
    "ZERO", "ONE", "TWO", "THREE", "FOUR", "FIVE", "SIX", "SEVEN", "EIGHT", "NINE",
];

impl UnicodeNames for BasicNames {
    fn name(&self, cp: u32) -> Option<Cow<'static, str>> {
        let c = char::from_u32(cp)?;
        let n: &'static str = match c {
            'A'..='Z' => return Some(format!("LATIN CAPITAL LETTER {c}").into()),
            'a'..='z' => {
                return Some(format!("LATIN SMALL LETTER {}", c.to_ascii_uppercase()).into());
            }
            '0'..='9' => return Some(format!("DIGIT {}", DIGITS[c as usize - '0' as usize]).into()),
            '\0' => "NULL",
            ' ' => "SPACE",
            '!' => "EXCLAMATION MARK",
            '"' => "QUOTATION MARK",
            '#' => "NUMBER SIGN",
            '$' => "DOLLAR SIGN",
            '%' => "PERCENT SIGN",
            '&' => "AMPERSAND",
            '\'' => "APOSTROPHE",
            '(' => "LEFT PARENTHESIS",
            ')' => "RIGHT PARENTHESIS",
            '*' => "ASTERISK",
            '+' => "PLUS SIGN",
            ',' => "COMMA",
            '-' => "HYPHEN-MINUS",
            '.' => "FULL STOP",
            '/' => "SOLIDUS",
            ':' => "COLON",
            ';' => "SEMICOLON",
            '<' => "LESS-THAN SIGN",
            '=' => "EQUALS SIGN",
            '>' => "GREATER-THAN SIGN",
            '?' => "QUESTION MARK",
            '@' => "COMMERCIAL AT",
            '\u{a0}' => "NO-BREAK SPACE",
            '\u{fffd}' => "REPLACEMENT CHARACTER",
            _ => return None,
        };
        Some(Cow::Borrowed(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeding_keeps_whitespace_advance() {
        let mut doc = FontDocument::new(10, 20);
        doc.glyph_mut(0x20).adv_x = 5;
        doc.glyph_mut(0x41).adv_x = 7;
        doc.seed_glyph_metrics(0x20);
        doc.seed_glyph_metrics(0x41);
        assert_eq!(doc.glyph(0x20).unwrap().adv_x, 5);
        assert_eq!(doc.glyph(0x41).unwrap().adv_x, 0);
        assert_eq!(doc.glyph(0x41).unwrap().width, 10);
        assert_eq!(doc.glyph(0x41).unwrap().height, 20);
    }

    #[test]
    fn seeding_leaves_drawn_glyphs_alone() {
        let mut doc = FontDocument::new(10, 20);
        let g = doc.glyph_mut(0x42);
        g.layers.push(Layer::default());
        g.adv_x = 9;
        g.width = 3;
        doc.seed_glyph_metrics(0x42);
        let g = doc.glyph(0x42).unwrap();
        assert_eq!((g.width, g.adv_x), (3, 9));
    }

    #[test]
    fn removing_a_range() {
        let mut doc = FontDocument::default();
        for cp in [0x40, 0x41, 0x42, 0x50] {
            doc.glyph_mut(cp).adv_x = 1;
        }
        assert_eq!(doc.remove_glyphs(0x41..=0x4F), 2);
        assert!(doc.glyph(0x40).is_some());
        assert!(doc.glyph(0x42).is_none());
        assert_eq!(doc.glyph_count(), 2);
    }

    #[test]
    fn ligature_table_bounds() {
        let mut doc = FontDocument::default();
        doc.set_ligature(0, "fi");
        doc.set_ligature(LIGATURE_SLOTS - 1, "ffl");
        doc.set_ligature(LIGATURE_SLOTS, "nope");
        assert_eq!(doc.ligature(0), Some("fi"));
        assert_eq!(doc.ligature(LIGATURE_SLOTS - 1), Some("ffl"));
        assert_eq!(doc.ligature(LIGATURE_SLOTS), None);
        doc.set_ligature(0, "");
        assert_eq!(doc.ligature(0), None);
    }

    #[test]
    fn json_store_keeps_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("font.json");
        let mut doc = FontDocument::new(8, 16);
        doc.set_property(Property::Family, "Test Sans");
        doc.set_ligature(3, "ffi");
        doc.glyph_mut(0x41).adv_x = 8;

        let mut reports = Vec::new();
        JsonStore
            .save(&doc, &path, &mut |p| reports.push(p))
            .unwrap();
        let back = JsonStore.load(&path, &mut |p| reports.push(p)).unwrap();
        assert_eq!(back, doc);
        assert!(reports.iter().any(|p| p.message == Some("Checking")));
    }

    #[test]
    fn loading_garbage_is_a_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = JsonStore.load(&path, &mut |_| {}).unwrap_err();
        assert!(matches!(err, DocumentError::Format(_)));
    }

    #[test]
    fn basic_names() {
        assert_eq!(BasicNames.name(0x41).as_deref(), Some("LATIN CAPITAL LETTER A"));
        assert_eq!(BasicNames.name('q' as u32).as_deref(), Some("LATIN SMALL LETTER Q"));
        assert_eq!(BasicNames.name('7' as u32).as_deref(), Some("DIGIT SEVEN"));
        assert_eq!(BasicNames.name(0x4E00), None);
    }

    #[test]
    fn percent_is_stable() {
        let p = Progress {
            step: 0,
            total_steps: 0,
            current: 49,
            total: 99,
            message: None,
        };
        assert_eq!(p.percent(), 50);
    }
}
