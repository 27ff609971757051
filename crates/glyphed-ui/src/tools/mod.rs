//! Built-in tool views and controllers, plus the form helpers they share.
//!
//! Main window tools number their fields from 6 (after the six toolbar
//! icons), glyph window tools from 4 (after three icons and the ligature
//! name field).

use std::rc::Rc;

use glyphed_core::*;

use crate::context::Context;
use crate::handler::HandlerTable;
use crate::paint::Painter;
use crate::view;

pub mod about;
pub mod color;
pub mod coords;
pub mod dosave;
pub mod fileops;
pub mod glyphs;
pub mod kern;
pub mod layers;
pub mod new;
pub mod props;
pub mod ranges;

pub const MAIN_FIRST: usize = 6;
pub const GLYPH_FIRST: usize = 4;
pub const ROW_H: i32 = 24;
/// Top of the content area, below the toolbar.
pub const TOP: i32 = 36;

/// Handlers for every tool the editor ships.
pub fn builtin() -> HandlerTable {
    let main = WindowKind::Main;
    let glyph = WindowKind::Glyph(0);
    let mut t = HandlerTable::new();
    t.register(main, Some(Tool::Main(MainTool::About)), Rc::new(about::About));
    let files = Rc::new(fileops::FileOps);
    t.register(main, Some(Tool::Main(MainTool::Load)), files.clone());
    t.register(main, Some(Tool::Main(MainTool::Save)), files);
    t.register(
        main,
        Some(Tool::Main(MainTool::Properties)),
        Rc::new(props::Properties),
    );
    t.register(main, Some(Tool::Main(MainTool::Ranges)), Rc::new(ranges::Ranges));
    t.register(main, Some(Tool::Main(MainTool::Glyphs)), Rc::new(glyphs::GlyphTable));
    t.register(
        main,
        Some(Tool::Main(MainTool::ConfirmSave)),
        Rc::new(dosave::ConfirmSave),
    );
    t.register(main, Some(Tool::Main(MainTool::New)), Rc::new(new::NewFont));
    t.register(
        glyph,
        Some(Tool::Glyph(GlyphTool::Coordinates)),
        Rc::new(coords::Coordinates),
    );
    t.register(glyph, Some(Tool::Glyph(GlyphTool::Layers)), Rc::new(layers::Layers));
    t.register(glyph, Some(Tool::Glyph(GlyphTool::Kerning)), Rc::new(kern::KernTable));
    t.register(glyph, Some(Tool::Glyph(GlyphTool::Color)), Rc::new(color::Colors));
    t
}

/// A column of equally sized rows starting at (x, y).
pub fn column(x: i32, y: i32, w: i32, n: usize) -> Rect {
    Rect::new(x, y + n as i32 * ROW_H, w, ROW_H - 4)
}

/// Remembers the field under `at` as pressed and focuses it. Text inputs
/// start editing right away.
pub fn press(ctx: &mut Context, idx: usize, at: Point) -> Option<usize> {
    let f = ctx.window(idx)?.field_at(at)?;
    ctx.sel.pressed = Some(f);
    ctx.set_focus(idx, Some(f));
    Some(f)
}

/// The field under `at`, when it is also the one that was pressed.
pub fn released(ctx: &Context, idx: usize, at: Point) -> Option<usize> {
    let f = ctx.window(idx)?.field_at(at)?;
    (ctx.sel.pressed == Some(f)).then_some(f)
}

pub fn focused(ctx: &Context, idx: usize) -> Option<usize> {
    ctx.window(idx)?.field
}

/// Draws the fields from `from` on. `selected` marks list rows.
pub fn draw_fields(
    ctx: &Context,
    idx: usize,
    w: &Window,
    p: &mut Painter<'_>,
    from: usize,
    selected: impl Fn(usize) -> bool,
) {
    for (i, f) in w.fields.iter().enumerate().skip(from) {
        if f.rect.is_empty() {
            continue;
        }
        let focus = w.field == Some(i);
        match &f.kind {
            FieldKind::Button(label) => p.button(f.rect, label, ctx.sel.pressed == Some(i), focus),
            FieldKind::Item(label) => p.item(f.rect, label, selected(i), focus),
            FieldKind::Input { label, .. } => {
                if !label.is_empty() {
                    let lw = p.text_width(label);
                    p.text(f.rect.x - lw - 8, f.rect.y + 2, label, ThemeRole::Fg);
                }
                view::draw_input(ctx, idx, w, p, i, f);
            }
            FieldKind::Icon(_) => {}
        }
    }
}

/// Changes the glyph of window `idx` through `f`, with an undo step and the
/// modified flag when anything actually changed.
pub fn edit_glyph(ctx: &mut Context, idx: usize, f: impl FnOnce(&mut GlyphEntry)) -> bool {
    let Some(cp) = ctx.window(idx).and_then(Window::codepoint) else {
        return false;
    };
    let before = ctx.doc.glyph(cp).cloned().unwrap_or_default();
    let mut after = before.clone();
    f(&mut after);
    if after == before {
        return false;
    }
    if let Some(w) = ctx.window_mut(idx) {
        w.history.record(&before);
    }
    *ctx.doc.glyph_mut(cp) = after;
    ctx.modified = true;
    true
}

/// Undo (or redo) on the glyph of window `idx`.
pub fn step_history(ctx: &mut Context, idx: usize, redo: bool) -> bool {
    let Some(cp) = ctx.window(idx).and_then(Window::codepoint) else {
        return false;
    };
    let Context { windows, doc, .. } = &mut *ctx;
    let Some(w) = windows.get_mut(idx) else {
        return false;
    };
    let g = doc.glyph_mut(cp);
    let done = if redo {
        w.history.redo(g)
    } else {
        w.history.undo(g)
    };
    if done {
        ctx.modified = true;
    }
    done
}

/// Scrolls a list of `len` rows showing `visible` at a time.
pub fn scroll_by(ctx: &mut Context, idx: usize, delta: i32, len: usize, visible: usize) {
    let max = len.saturating_sub(visible) as i32;
    if let Some(w) = ctx.window_mut(idx) {
        w.scroll = (w.scroll + delta).clamp(0, max);
    }
}

/// Wheel buttons as a scroll step.
pub fn wheel(buttons: Buttons) -> i32 {
    if buttons.contains(Buttons::WHEEL_UP) {
        -1
    } else if buttons.contains(Buttons::WHEEL_DOWN) {
        1
    } else {
        0
    }
}
