//! Per-window modal tools and the field-focus cycle.

use crate::document::is_ligature;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WindowKind {
    Main,
    /// A window editing the glyph of one code point.
    Glyph(u32),
}

impl WindowKind {
    pub fn codepoint(self) -> Option<u32> {
        match self {
            WindowKind::Main => None,
            WindowKind::Glyph(cp) => Some(cp),
        }
    }

    pub fn is_main(self) -> bool {
        self == WindowKind::Main
    }

    pub fn is_ligature(self) -> bool {
        self.codepoint().is_some_and(is_ligature)
    }

    /// Number of toolbar icons.
    pub fn icon_count(self) -> usize {
        match self {
            WindowKind::Main => 6,
            WindowKind::Glyph(_) => 3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MainTool {
    About,
    Load,
    Save,
    Properties,
    Ranges,
    Glyphs,
    /// Asked when closing with unsaved changes; not on the toolbar.
    ConfirmSave,
    /// Not on the toolbar; reached from the About page.
    New,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GlyphTool {
    Coordinates,
    Layers,
    Kerning,
    /// Not on the toolbar; reached from the Layers tool.
    Color,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tool {
    Main(MainTool),
    Glyph(GlyphTool),
}

impl MainTool {
    pub const ALL: [MainTool; 8] = [
        MainTool::About,
        MainTool::Load,
        MainTool::Save,
        MainTool::Properties,
        MainTool::Ranges,
        MainTool::Glyphs,
        MainTool::ConfirmSave,
        MainTool::New,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MainTool::About => "About",
            MainTool::Load => "Load Font",
            MainTool::Save => "Save Font",
            MainTool::Properties => "Font Properties",
            MainTool::Ranges => "Unicode Ranges",
            MainTool::Glyphs => "Glyph Table",
            MainTool::ConfirmSave => "Save Changes?",
            MainTool::New => "New Font",
        }
    }
}

impl GlyphTool {
    pub const ALL: [GlyphTool; 4] = [
        GlyphTool::Coordinates,
        GlyphTool::Layers,
        GlyphTool::Kerning,
        GlyphTool::Color,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GlyphTool::Coordinates => "Measures",
            GlyphTool::Layers => "Layers",
            GlyphTool::Kerning => "Kerning",
            GlyphTool::Color => "Colors",
        }
    }
}

impl Tool {
    /// The tool behind toolbar icon `icon` of a window of `kind`.
    pub fn from_icon(kind: WindowKind, icon: usize) -> Option<Tool> {
        if icon >= kind.icon_count() {
            return None;
        }
        Some(match kind {
            WindowKind::Main => Tool::Main(MainTool::ALL[icon]),
            WindowKind::Glyph(_) => Tool::Glyph(GlyphTool::ALL[icon]),
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Tool::Main(t) => t.name(),
            Tool::Glyph(t) => t.name(),
        }
    }
}

/// Highest focusable field index of a window in `tool`.
pub fn max_field(tool: Option<Tool>) -> usize {
    match tool {
        Some(Tool::Main(t)) => match t {
            MainTool::About => 6,
            MainTool::Load | MainTool::Save => 12,
            MainTool::Properties => 16,
            MainTool::Ranges => 8,
            MainTool::Glyphs => 15,
            MainTool::ConfirmSave | MainTool::New => 7,
        },
        Some(Tool::Glyph(t)) => match t {
            GlyphTool::Coordinates => 23,
            GlyphTool::Layers => 15,
            GlyphTool::Kerning => 8,
            GlyphTool::Color => 7,
        },
        None => 3,
    }
}

/// The ligature name field; it only exists on ligature glyph windows.
pub const LIGATURE_FIELD: usize = 3;

fn skips(kind: WindowKind, field: usize) -> bool {
    field == LIGATURE_FIELD && !kind.is_main() && !kind.is_ligature()
}

/// Tab: `None → 0 → … → max → None`, stepping over the ligature field where
/// it does not exist.
pub fn next_field(kind: WindowKind, tool: Option<Tool>, field: Option<usize>) -> Option<usize> {
    let max = max_field(tool);
    let mut next = match field {
        None => Some(0),
        Some(f) if f >= max => None,
        Some(f) => Some(f + 1),
    };
    if next.is_some_and(|f| skips(kind, f)) {
        next = if LIGATURE_FIELD >= max { None } else { Some(LIGATURE_FIELD + 1) };
    }
    next
}

/// Shift+Tab, the exact inverse of [`next_field`].
pub fn prev_field(kind: WindowKind, tool: Option<Tool>, field: Option<usize>) -> Option<usize> {
    let max = max_field(tool);
    let mut prev = match field {
        None => Some(max),
        Some(0) => None,
        Some(f) => Some(f.min(max + 1) - 1),
    };
    if prev.is_some_and(|f| skips(kind, f)) {
        prev = Some(LIGATURE_FIELD - 1);
    }
    prev
}
