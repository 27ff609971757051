//! The parts of a window every tool shares: toolbar, status bar and the
//! help page.
//!
//! Windows are painted while their surface is out of the registry, so all
//! sizes here come from the [`Painter`], never from the [`Window`].

use glyphed_core::*;

use crate::context::Context;
use crate::paint::Painter;

pub const TOOLBAR_HEIGHT: i32 = 23;
/// Width of the toolbar strip; icons and the ligature name field.
pub const TOOLBAR_WIDTH: i32 = 144;
/// Start of the character info zone on glyph windows.
pub const CHAR_INFO_X: i32 = 78;
/// Start of the copy-to-clipboard zone in the Coordinates tool.
pub const COPY_ZONE_X: i32 = 144;
pub const STATUS_HEIGHT: i32 = 18;

/// Toolbar icon under `at`, if `at` is within the toolbar strip.
pub fn toolbar_icon(at: Point) -> Option<usize> {
    if at.y < TOOLBAR_HEIGHT && at.x < TOOLBAR_WIDTH {
        Some(((at.x - 1).max(0) / 24) as usize)
    } else {
        None
    }
}

pub fn in_copy_zone(kind: WindowKind, tool: Option<Tool>, at: Point) -> bool {
    !kind.is_main()
        && tool == Some(Tool::Glyph(GlyphTool::Coordinates))
        && at.y < 24
        && at.x >= COPY_ZONE_X
}

pub fn in_ligature_zone(kind: WindowKind, at: Point) -> bool {
    kind.is_ligature() && at.y < TOOLBAR_HEIGHT && (CHAR_INFO_X..=132).contains(&at.x)
}

pub fn toolbar(ctx: &Context, idx: usize, w: &Window, p: &mut Painter<'_>) {
    p.fill(Rect::new(0, 0, p.width(), TOOLBAR_HEIGHT + 1), ThemeRole::Light);
    for n in 0..w.kind.icon_count() {
        let r = Field::icon(n).rect;
        let pressed = ctx.pending_icon == Some(n) || w.tool == Tool::from_icon(w.kind, n);
        p.button(r, "", pressed, w.field == Some(n));
        if let Some(bitmap) = ctx.res.icons.get(w.kind, n) {
            p.icon(r.x + 3, r.y + 3, bitmap);
        }
    }
    let WindowKind::Glyph(cp) = w.kind else {
        return;
    };
    if let Some(f) = w.fields.get(LIGATURE_FIELD).filter(|f| f.is_input()) {
        draw_input(ctx, idx, w, p, LIGATURE_FIELD, f);
    } else {
        let ch = char::from_u32(cp)
            .filter(|c| !c.is_control())
            .map(String::from)
            .unwrap_or_default();
        p.text(CHAR_INFO_X + 2, 4, &format!("U+{cp:06X} {ch}"), ThemeRole::Fg);
    }
}

/// Draws an input field, with the live editor text and caret when it is
/// being edited.
pub fn draw_input(ctx: &Context, idx: usize, w: &Window, p: &mut Painter<'_>, i: usize, f: &Field) {
    let FieldKind::Input { text, .. } = &f.kind else {
        return;
    };
    let focused = w.field == Some(i);
    let editing = ctx
        .editor
        .as_ref()
        .filter(|e| e.target() == FieldRef { window: idx, field: i });
    match editing {
        Some(e) => p.input(f.rect, e.text(), focused, Some(e.cursor())),
        None => p.input(f.rect, text, focused, None),
    }
}

/// The bottom strip. An error replaces everything else; with `hover` the
/// hovered element's description is shown, otherwise glyph windows show the
/// pointer position.
pub fn status_bar(ctx: &Context, w: &Window, p: &mut Painter<'_>, hover: bool) {
    let r = Rect::new(0, p.height() - STATUS_HEIGHT, p.width(), STATUS_HEIGHT);
    if let Some(err) = &ctx.error {
        p.fill(r, ThemeRole::ErrorBg);
        p.text(r.x + 4, r.y + 2, err, ThemeRole::Fg);
        return;
    }
    p.fill(r, ThemeRole::Dark);
    if hover {
        if let Some(s) = &ctx.status {
            p.text(r.x + 4, r.y + 2, s, ThemeRole::Fg);
            return;
        }
    }
    if !w.kind.is_main() {
        if let Some(pos) = ctx.pos {
            p.text(
                r.x + 4,
                r.y + 2,
                &format!("X: {:3} Y: {:3}", pos.x, pos.y),
                ThemeRole::Fg,
            );
        }
    }
}

const HELP_COMMON: &[&str] = &[
    "Tab / Shift+Tab: move between fields",
    "Enter: activate the focused field",
    "Ctrl+S: save, Ctrl+Shift+S: save as",
    "Esc: close the window",
];

fn help_lines(tool: Option<Tool>) -> &'static [&'static str] {
    match tool {
        Some(Tool::Main(MainTool::Load)) => &[
            "Type a path or pick a file from the list,",
            "then press Load.",
        ],
        Some(Tool::Main(MainTool::Save)) => &["Type the file name to save to, then press Save."],
        Some(Tool::Main(MainTool::Properties)) => &[
            "Edit the font's names and default metrics.",
            "Arrows on a metric change it by one.",
        ],
        Some(Tool::Main(MainTool::Ranges)) => &[
            "Enter a range as U+hex or a character,",
            "or pick a block from the list.",
        ],
        Some(Tool::Main(MainTool::Glyphs)) => &[
            "Click a glyph to open it in its own window.",
            "Arrows and PgUp/PgDn scroll the table.",
        ],
        Some(Tool::Glyph(GlyphTool::Coordinates)) => &[
            "Left click adds a point, right click removes one.",
            "Ctrl+Z / Ctrl+Y: undo / redo.",
            "Click the code point to copy the character.",
        ],
        Some(Tool::Glyph(GlyphTool::Layers)) => &["Add, remove and reorder layers."],
        Some(Tool::Glyph(GlyphTool::Kerning)) => &[
            "Type a character to add a kerning pair,",
            "arrows adjust the selected pair.",
        ],
        _ => &["Pick a tool from the toolbar."],
    }
}

pub fn help(p: &mut Painter<'_>, kind: WindowKind, tool: Option<Tool>) {
    let title = match (kind, tool) {
        (_, Some(t)) => format!("Help - {}", t.name()),
        (WindowKind::Main, None) => "Help".to_owned(),
        (WindowKind::Glyph(cp), None) => format!("Help - U+{cp:06X}"),
    };
    let mut y = 8;
    p.text(8, y, &title, ThemeRole::Fg);
    y += 28;
    for line in help_lines(tool).iter().chain(HELP_COMMON) {
        p.text(12, y, line, ThemeRole::Fg);
        y += 18;
    }
    p.text(8, p.height() - 22, "Press any key to return", ThemeRole::Lighter);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toolbar_hit_testing() {
        assert_eq!(toolbar_icon(Point::new(0, 5)), Some(0));
        assert_eq!(toolbar_icon(Point::new(25, 5)), Some(1));
        assert_eq!(toolbar_icon(Point::new(143, 22)), Some(5));
        assert_eq!(toolbar_icon(Point::new(144, 5)), None);
        assert_eq!(toolbar_icon(Point::new(10, 23)), None);
    }

    #[test]
    fn hot_zones() {
        let coords = Some(Tool::Glyph(GlyphTool::Coordinates));
        let at = Point::new(150, 10);
        assert!(in_copy_zone(WindowKind::Glyph(0x41), coords, at));
        assert!(!in_copy_zone(WindowKind::Main, coords, at));
        assert!(!in_copy_zone(
            WindowKind::Glyph(0x41),
            Some(Tool::Glyph(GlyphTool::Layers)),
            at
        ));
        assert!(in_ligature_zone(WindowKind::Glyph(0xF001), Point::new(132, 3)));
        assert!(!in_ligature_zone(WindowKind::Glyph(0xF001), Point::new(133, 3)));
        assert!(!in_ligature_zone(WindowKind::Glyph(0x41), Point::new(90, 3)));
    }

    #[test]
    fn error_status_uses_alternate_color() {
        let mut ctx = crate::tests::headless_context(Vec::new());
        ctx.startup(None).unwrap();
        ctx.show_error("boom");
        ctx.paint_status(0);
        let w = ctx.window(0).unwrap();
        let y = w.height() as i32 - 1;
        assert_eq!(w.surface.pixel(1, y), Some(ctx.palette.get(ThemeRole::ErrorBg)));
    }
}
