use crate::document::GlyphEntry;
use crate::driver::WindowHandle;
use crate::editor::CommitAction;
use crate::tool::{Tool, WindowKind, max_field};
use crate::{Point, Rect, Size, Surface};

pub const MAIN_SIZE: Size = Size::new(800, 600);
pub const GLYPH_SIZE: Size = Size::new(564, 544);
pub const GLYPH_ZOOM: u32 = 4;

/// Snapshots of one glyph, most recent last.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UndoHistory {
    undo: Vec<GlyphEntry>,
    redo: Vec<GlyphEntry>,
}

impl UndoHistory {
    /// Remembers the glyph as it was before a change.
    pub fn record(&mut self, before: &GlyphEntry) {
        self.undo.push(before.clone());
        self.redo.clear();
    }

    /// Swaps `current` with the previous snapshot.
    pub fn undo(&mut self, current: &mut GlyphEntry) -> bool {
        let Some(prev) = self.undo.pop() else {
            return false;
        };
        self.redo.push(std::mem::replace(current, prev));
        true
    }

    pub fn redo(&mut self, current: &mut GlyphEntry) -> bool {
        let Some(next) = self.redo.pop() else {
            return false;
        };
        self.undo.push(std::mem::replace(current, next));
        true
    }

    pub fn len(&self) -> usize {
        self.undo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo.is_empty() && self.redo.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// Toolbar icon `n`.
    Icon(usize),
    Button(String),
    /// A row of a list or a choice, e.g. a file name.
    Item(String),
    Input {
        label: String,
        text: String,
        max_len: usize,
        action: CommitAction,
    },
}

/// One focusable element of the current layout. A window's field index is
/// a position in its field list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub rect: Rect,
    pub kind: FieldKind,
}

impl Field {
    pub fn icon(n: usize) -> Self {
        Self {
            rect: Rect::new(1 + 24 * n as i32, 1, 22, 22),
            kind: FieldKind::Icon(n),
        }
    }

    pub fn button(rect: Rect, label: impl Into<String>) -> Self {
        Self {
            rect,
            kind: FieldKind::Button(label.into()),
        }
    }

    pub fn item(rect: Rect, label: impl Into<String>) -> Self {
        Self {
            rect,
            kind: FieldKind::Item(label.into()),
        }
    }

    pub fn input(
        rect: Rect,
        label: impl Into<String>,
        text: impl Into<String>,
        max_len: usize,
        action: CommitAction,
    ) -> Self {
        Self {
            rect,
            kind: FieldKind::Input {
                label: label.into(),
                text: text.into(),
                max_len,
                action,
            },
        }
    }

    pub fn is_input(&self) -> bool {
        matches!(self.kind, FieldKind::Input { .. })
    }

    /// An empty slot, keeps indices stable where a field is conditional.
    pub fn placeholder() -> Self {
        Self {
            rect: Rect::default(),
            kind: FieldKind::Item(String::new()),
        }
    }
}

#[derive(Debug)]
pub struct Window {
    pub handle: WindowHandle,
    pub surface: Surface,
    pub kind: WindowKind,
    pub tool: Option<Tool>,
    pub field: Option<usize>,
    pub help: bool,
    pub zoom: u32,
    /// Needs a full redraw before the next flush.
    pub dirty: bool,
    pub history: UndoHistory,
    pub fields: Vec<Field>,
    /// First visible row of scrolled views.
    pub scroll: i32,
}

impl Window {
    pub fn new(handle: WindowHandle, kind: WindowKind, surface: Surface) -> Self {
        Self {
            handle,
            surface,
            kind,
            tool: None,
            field: None,
            help: false,
            zoom: if kind.is_main() { 1 } else { GLYPH_ZOOM },
            dirty: true,
            history: UndoHistory::default(),
            fields: Vec::new(),
            scroll: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    pub fn height(&self) -> u32 {
        self.surface.height()
    }

    pub fn codepoint(&self) -> Option<u32> {
        self.kind.codepoint()
    }

    pub fn max_field(&self) -> usize {
        max_field(self.tool)
    }

    pub fn focused(&self) -> Option<&Field> {
        self.field.and_then(|i| self.fields.get(i))
    }

    /// The field under `p`, if any.
    pub fn field_at(&self, p: Point) -> Option<usize> {
        self.fields.iter().position(|f| f.rect.contains(p))
    }

    /// Status bar strip at the bottom.
    pub fn status_rect(&self) -> Rect {
        let h = self.height() as i32;
        Rect::new(0, h - 18, self.width() as i32, 18)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    #[test]
    fn undo_redo_swap_snapshots() {
        let mut h = UndoHistory::default();
        let mut g = GlyphEntry {
            adv_x: 1,
            ..Default::default()
        };
        h.record(&g);
        g.adv_x = 2;
        assert!(h.undo(&mut g));
        assert_eq!(g.adv_x, 1);
        assert!(h.redo(&mut g));
        assert_eq!(g.adv_x, 2);
        assert!(!h.redo(&mut g));
        h.clear();
        assert!(h.is_empty());
    }

    #[test]
    fn glyph_windows_zoom_in() {
        let s = Surface::new(Size::new(10, 10), Color::BLACK).unwrap();
        let w = Window::new(WindowHandle(1), WindowKind::Glyph(0x41), s.clone());
        assert_eq!(w.zoom, GLYPH_ZOOM);
        assert_eq!(w.max_field(), 3);
        let w = Window::new(WindowHandle(2), WindowKind::Main, s);
        assert_eq!(w.zoom, 1);
        assert_eq!(w.status_rect(), Rect::new(0, -8, 10, 18));
    }

    #[test]
    fn toolbar_icons_match_hit_test() {
        // icon index is (x - 1) / 24 inside the strip
        for n in 0..6 {
            let f = Field::icon(n);
            assert_eq!(((f.rect.x - 1) / 24) as usize, n);
            assert_eq!(((f.rect.right() - 2) / 24) as usize, n);
        }
    }
}
