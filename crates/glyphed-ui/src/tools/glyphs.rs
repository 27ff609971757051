//! The glyph table: every code point of the current range in a grid.
//! Clicking a cell opens the glyph in its own window.

use glyphed_core::error::Result;
use glyphed_core::*;

use super::{MAIN_FIRST, TOP, draw_fields, press, released, wheel};
use crate::context::Context;
use crate::handler::ToolHandler;
use crate::paint::Painter;

const BUTTONS: [&str; 10] = [
    "Prev",
    "Next",
    "Open",
    "Delete",
    "Copy",
    "Zoom -",
    "Zoom +",
    "First",
    "Last",
    "Select all",
];
const PREV: usize = MAIN_FIRST;
const NEXT: usize = MAIN_FIRST + 1;
const OPEN: usize = MAIN_FIRST + 2;
const DELETE: usize = MAIN_FIRST + 3;
const COPY: usize = MAIN_FIRST + 4;
const ZOOM_OUT: usize = MAIN_FIRST + 5;
const ZOOM_IN: usize = MAIN_FIRST + 6;
const FIRST: usize = MAIN_FIRST + 7;
const LAST: usize = MAIN_FIRST + 8;
const SELECT_ALL: usize = MAIN_FIRST + 9;

const GRID_TOP: i32 = TOP + 48;
const MAX_ZOOM: u32 = 4;
/// Upper bound of characters put on the clipboard at once.
const COPY_MAX: usize = 65536;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Grid {
    cell: i32,
    cols: i32,
    rows: i32,
    lo: u32,
    hi: u32,
    scroll: i32,
}

impl Grid {
    fn new(ctx: &Context, width: i32, height: i32, zoom: u32, scroll: i32) -> Self {
        let cell = 16 + 8 * zoom.clamp(1, MAX_ZOOM) as i32;
        let (lo, hi) = ordered(ctx.range);
        Self {
            cell,
            cols: ((width - 16) / cell).max(1),
            rows: ((height - GRID_TOP - 20) / cell).max(1),
            lo,
            hi,
            scroll,
        }
    }

    fn of(ctx: &Context, idx: usize) -> Option<Self> {
        let w = ctx.window(idx)?;
        Some(Self::new(ctx, w.width() as i32, w.height() as i32, w.zoom, w.scroll))
    }

    fn total_rows(&self) -> i32 {
        ((self.hi - self.lo) / self.cols as u32) as i32 + 1
    }

    fn max_scroll(&self) -> i32 {
        (self.total_rows() - self.rows).max(0)
    }

    fn at(&self, p: Point) -> Option<u32> {
        if p.x < 8 || p.y < GRID_TOP {
            return None;
        }
        let (col, row) = ((p.x - 8) / self.cell, (p.y - GRID_TOP) / self.cell);
        if col >= self.cols || row >= self.rows {
            return None;
        }
        let n = (self.scroll + row) as u64 * self.cols as u64 + col as u64;
        let cp = self.lo as u64 + n;
        (cp <= self.hi as u64).then_some(cp as u32)
    }

    fn rect(&self, cp: u32) -> Option<Rect> {
        let n = (cp.checked_sub(self.lo)?) as i64;
        let row = n / self.cols as i64 - self.scroll as i64;
        if !(0..self.rows as i64).contains(&row) {
            return None;
        }
        let col = n % self.cols as i64;
        Some(Rect::new(
            8 + col as i32 * self.cell,
            GRID_TOP + row as i32 * self.cell,
            self.cell - 1,
            self.cell - 1,
        ))
    }

    /// Scroll position that keeps `cp` in view.
    fn follow(&self, cp: u32) -> i32 {
        let row = ((cp - self.lo) / self.cols as u32) as i32;
        if row < self.scroll {
            row
        } else if row >= self.scroll + self.rows {
            row - self.rows + 1
        } else {
            self.scroll
        }
    }
}

fn ordered((a, b): (u32, u32)) -> (u32, u32) {
    (a.min(b), a.max(b))
}

fn selection(ctx: &Context) -> Option<(u32, u32)> {
    match (ctx.sel.start, ctx.sel.end) {
        (Some(a), Some(b)) => Some(ordered((a, b))),
        (Some(a), None) | (None, Some(a)) => Some((a, a)),
        (None, None) => None,
    }
}

fn set_scroll(ctx: &mut Context, idx: usize, scroll: i32) {
    if let Some(g) = Grid::of(ctx, idx) {
        let s = scroll.clamp(0, g.max_scroll());
        if let Some(w) = ctx.window_mut(idx) {
            w.scroll = s;
        }
    }
}

pub struct GlyphTable;

impl GlyphTable {
    fn activate(&self, ctx: &mut Context, idx: usize, field: usize) -> Result<()> {
        let Some(g) = Grid::of(ctx, idx) else {
            return Ok(());
        };
        match field {
            PREV => set_scroll(ctx, idx, g.scroll - g.rows),
            NEXT => set_scroll(ctx, idx, g.scroll + g.rows),
            FIRST => set_scroll(ctx, idx, 0),
            LAST => set_scroll(ctx, idx, g.max_scroll()),
            OPEN => {
                if let Some(cp) = ctx.sel.end.or(ctx.sel.start) {
                    ctx.open_window(WindowKind::Glyph(cp))?;
                }
            }
            DELETE => self.delete(ctx),
            COPY => self.copy(ctx),
            ZOOM_OUT | ZOOM_IN => {
                if let Some(w) = ctx.window_mut(idx) {
                    w.zoom = if field == ZOOM_IN {
                        (w.zoom + 1).min(MAX_ZOOM)
                    } else {
                        w.zoom.saturating_sub(1).max(1)
                    };
                }
                set_scroll(ctx, idx, g.scroll);
            }
            SELECT_ALL => {
                ctx.sel.start = Some(g.lo);
                ctx.sel.end = Some(g.hi);
            }
            _ => {}
        }
        Ok(())
    }

    fn delete(&self, ctx: &mut Context) {
        let Some((lo, hi)) = selection(ctx) else {
            return;
        };
        let n = ctx.doc.remove_glyphs(lo..=hi);
        if n > 0 {
            log::info!("deleted {n} glyphs in U+{lo:04X}..U+{hi:04X}");
            ctx.modified = true;
            ctx.refresh_all();
        }
    }

    fn copy(&self, ctx: &mut Context) {
        let Some((lo, hi)) = selection(ctx) else {
            return;
        };
        let text: String = (lo..=hi)
            .filter(|&cp| cp > 0)
            .filter_map(char::from_u32)
            .take(COPY_MAX)
            .collect();
        if text.is_empty() {
            return;
        }
        ctx.res.driver.copy_to_clipboard(&text);
        ctx.status = Some(format!("Copied {} characters", text.chars().count()));
    }

    fn select(&self, ctx: &mut Context, idx: usize, cp: u32, extend: bool) {
        ctx.sel.end = Some(cp);
        if !extend || ctx.sel.start.is_none() {
            ctx.sel.start = Some(cp);
        }
        if let Some(g) = Grid::of(ctx, idx) {
            set_scroll(ctx, idx, g.follow(cp));
        }
    }
}

impl ToolHandler for GlyphTable {
    fn layout(&self, _ctx: &Context, _idx: usize) -> Vec<Field> {
        BUTTONS
            .iter()
            .enumerate()
            .map(|(n, label)| Field::button(Rect::new(8 + 78 * n as i32, TOP, 74, 22), *label))
            .collect()
    }

    fn render(&self, ctx: &Context, idx: usize, p: &mut Painter<'_>) {
        let Some(w) = ctx.window(idx) else {
            return;
        };
        draw_fields(ctx, idx, w, p, MAIN_FIRST, |_| false);
        let g = Grid::new(ctx, p.width(), p.height(), w.zoom, w.scroll);
        let defined = ctx
            .doc
            .glyphs()
            .filter(|(cp, e)| (g.lo..=g.hi).contains(cp) && !e.is_blank())
            .count();
        p.text(
            8,
            TOP + 28,
            &format!("U+{:04X}..U+{:04X}  {defined} defined", g.lo, g.hi),
            ThemeRole::Lighter,
        );
        let sel = selection(ctx);
        let first = g.lo as u64 + g.scroll as u64 * g.cols as u64;
        let count = (g.rows * g.cols) as u64;
        for cp in (first..first + count).take_while(|&cp| cp <= g.hi as u64) {
            let cp = cp as u32;
            let Some(r) = g.rect(cp) else {
                continue;
            };
            let n = cp - g.lo;
            let bg = if sel.is_some_and(|(a, b)| (a..=b).contains(&cp)) {
                ThemeRole::Selected
            } else if n % 2 == 0 {
                ThemeRole::Grid
            } else {
                ThemeRole::GridAlt
            };
            p.fill(r, bg);
            let is_defined = ctx.doc.glyph(cp).is_some_and(|e| !e.is_blank());
            let label = if is_ligature(cp) {
                ctx.doc
                    .ligature((cp - LIGATURE_FIRST) as usize)
                    .map(str::to_owned)
                    .unwrap_or_default()
            } else {
                char::from_u32(cp)
                    .filter(|c| !c.is_control())
                    .map(String::from)
                    .unwrap_or_default()
            };
            let fg = if is_defined {
                ThemeRole::Fg
            } else {
                ThemeRole::Darker
            };
            let tw = p.text_width(&label);
            p.text(r.x + (r.w - tw) / 2, r.y + (r.h - 16) / 2, &label, fg);
        }
    }

    fn on_move(&self, ctx: &mut Context, idx: usize, at: Point) -> Result<()> {
        let cp = Grid::of(ctx, idx).and_then(|g| g.at(at));
        ctx.sel.hover = cp.map(|cp| cp as usize);
        if let Some(cp) = cp {
            ctx.status = Some(ctx.char_info(cp));
        }
        Ok(())
    }

    fn on_btn_press(&self, ctx: &mut Context, idx: usize, at: Point, buttons: Buttons) -> Result<()> {
        match wheel(buttons) {
            0 => {
                if press(ctx, idx, at).is_none() {
                    ctx.sel.cell = Grid::of(ctx, idx).and_then(|g| g.at(at));
                }
            }
            d => {
                let scroll = ctx.window(idx).map_or(0, |w| w.scroll);
                set_scroll(ctx, idx, scroll + d);
            }
        }
        Ok(())
    }

    fn on_click(&self, ctx: &mut Context, idx: usize, at: Point) -> Result<()> {
        if let Some(f) = released(ctx, idx, at) {
            return self.activate(ctx, idx, f);
        }
        let pressed = ctx.sel.cell.take();
        let cp = Grid::of(ctx, idx).and_then(|g| g.at(at));
        if let Some(cp) = cp.filter(|&cp| pressed == Some(cp)) {
            self.select(ctx, idx, cp, false);
            ctx.open_window(WindowKind::Glyph(cp))?;
        }
        Ok(())
    }

    fn on_key(&self, ctx: &mut Context, idx: usize, key: Key, mods: Modifiers) -> Result<()> {
        let Some(g) = Grid::of(ctx, idx) else {
            return Ok(());
        };
        let cur = ctx.sel.end.unwrap_or(g.lo) as i64;
        let step = match key {
            Key::ArrowLeft => -1,
            Key::ArrowRight => 1,
            Key::ArrowUp => -(g.cols as i64),
            Key::ArrowDown => g.cols as i64,
            Key::PageUp => return self.activate(ctx, idx, PREV),
            Key::PageDown => return self.activate(ctx, idx, NEXT),
            Key::Home => return self.activate(ctx, idx, FIRST),
            Key::End => return self.activate(ctx, idx, LAST),
            Key::Delete => return self.activate(ctx, idx, DELETE),
            Key::Character('a' | 'A') if mods.contains(Modifiers::CTRL) => {
                return self.activate(ctx, idx, SELECT_ALL);
            }
            Key::Character('c' | 'C') if mods.contains(Modifiers::CTRL) => {
                return self.activate(ctx, idx, COPY);
            }
            Key::Character(c) if mods.is_empty() || mods == Modifiers::SHIFT => {
                let cp = c as u32;
                if (g.lo..=g.hi).contains(&cp) {
                    self.select(ctx, idx, cp, false);
                }
                return Ok(());
            }
            _ => return Ok(()),
        };
        let cp = (cur + step).clamp(g.lo as i64, g.hi as i64) as u32;
        self.select(ctx, idx, cp, mods.contains(Modifiers::SHIFT));
        Ok(())
    }

    fn on_enter(&self, ctx: &mut Context, idx: usize) -> Result<()> {
        match super::focused(ctx, idx) {
            Some(f) if f >= MAIN_FIRST => self.activate(ctx, idx, f),
            _ => self.activate(ctx, idx, OPEN),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{click, headless_context, key};

    fn table() -> Context {
        let mut ctx = headless_context(Vec::new());
        ctx.startup(None).unwrap();
        ctx.range = (0x20, 0x7E);
        ctx.select_tool(0, Tool::Main(MainTool::Glyphs));
        ctx
    }

    #[test]
    fn grid_maps_points_and_codepoints_both_ways() {
        let ctx = table();
        let g = Grid::of(&ctx, 0).unwrap();
        assert_eq!(g.cell, 24);
        assert_eq!(g.at(Point::new(8, GRID_TOP)), Some(0x20));
        let r = g.rect(0x41).unwrap();
        assert_eq!(g.at(Point::new(r.x + 1, r.y + 1)), Some(0x41));
        assert_eq!(g.at(Point::new(4, GRID_TOP)), None);
    }

    #[test]
    fn clicking_a_cell_opens_its_window() {
        let mut ctx = table();
        let r = Grid::of(&ctx, 0).unwrap().rect(0x41).unwrap();
        click(&mut ctx, 0, Point::new(r.x + 2, r.y + 2));
        let idx = ctx.windows.find(WindowKind::Glyph(0x41)).unwrap();
        assert_eq!(idx, 1);
        assert_eq!(ctx.sel.start, Some(0x41));
    }

    #[test]
    fn shift_arrows_extend_and_delete_removes_selection() {
        let mut ctx = table();
        for cp in 0x41..=0x44 {
            ctx.doc.glyph_mut(cp).adv_x = 8;
        }
        key(&mut ctx, 0, Key::Character('A'), Modifiers::SHIFT);
        key(&mut ctx, 0, Key::ArrowRight, Modifiers::SHIFT);
        key(&mut ctx, 0, Key::ArrowRight, Modifiers::SHIFT);
        assert_eq!(selection(&ctx), Some((0x41, 0x43)));
        key(&mut ctx, 0, Key::Delete, Modifiers::empty());
        assert!(ctx.doc.glyph(0x42).is_none());
        assert!(ctx.doc.glyph(0x44).is_some());
        assert!(ctx.modified);
    }

    #[test]
    fn copy_puts_selection_on_clipboard() {
        let (mut ctx, drv) = crate::tests::headless_context_with_driver(Vec::new());
        ctx.startup(None).unwrap();
        ctx.select_tool(0, Tool::Main(MainTool::Glyphs));
        ctx.sel.start = Some(0x61);
        ctx.sel.end = Some(0x63);
        key(&mut ctx, 0, Key::Character('c'), Modifiers::CTRL);
        assert_eq!(drv.clipboard().as_deref(), Some("abc"));
    }
}
