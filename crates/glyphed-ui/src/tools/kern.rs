use glyphed_core::error::Result;
use glyphed_core::*;

use super::{GLYPH_FIRST, ROW_H, TOP, draw_fields, edit_glyph, press, released};
use crate::context::Context;
use crate::handler::ToolHandler;
use crate::paint::Painter;

const BUTTONS: [&str; 5] = ["Prev", "Next", "X -", "X +", "Delete"];
const PREV: usize = GLYPH_FIRST;
const NEXT: usize = GLYPH_FIRST + 1;
const LESS: usize = GLYPH_FIRST + 2;
const MORE: usize = GLYPH_FIRST + 3;
const DELETE: usize = GLYPH_FIRST + 4;
const LIST_TOP: i32 = TOP + 32;

fn pairs(ctx: &Context, idx: usize) -> Vec<Kerning> {
    ctx.window(idx)
        .and_then(Window::codepoint)
        .and_then(|cp| ctx.doc.glyph(cp))
        .map(|g| g.kerning.clone())
        .unwrap_or_default()
}

/// Adds a pair with `next` unless there is one; returns its position.
pub fn add_pair(g: &mut GlyphEntry, next: u32) -> usize {
    match g.kerning.binary_search_by_key(&next, |k| k.next) {
        Ok(i) => i,
        Err(i) => {
            g.kerning.insert(i, Kerning { next, x: 0, y: 0 });
            i
        }
    }
}

pub struct KernTable;

impl KernTable {
    fn nudge(&self, ctx: &mut Context, idx: usize, d: i32) {
        let Some(k) = ctx.sel.kern else {
            return;
        };
        edit_glyph(ctx, idx, |g| {
            if let Some(pair) = g.kerning.get_mut(k) {
                pair.x = (pair.x + d).clamp(-128, 127);
            }
        });
    }

    fn activate(&self, ctx: &mut Context, idx: usize, field: usize) {
        let len = pairs(ctx, idx).len();
        match field {
            PREV | NEXT if len > 0 => {
                let cur = ctx.sel.kern.unwrap_or(0);
                ctx.sel.kern = Some(if field == PREV {
                    cur.saturating_sub(1)
                } else {
                    (cur + 1).min(len - 1)
                });
            }
            LESS => self.nudge(ctx, idx, -1),
            MORE => self.nudge(ctx, idx, 1),
            DELETE => {
                if let Some(k) = ctx.sel.kern.take() {
                    edit_glyph(ctx, idx, |g| {
                        if k < g.kerning.len() {
                            g.kerning.remove(k);
                        }
                    });
                }
            }
            _ => {}
        }
    }
}

impl ToolHandler for KernTable {
    fn layout(&self, _ctx: &Context, _idx: usize) -> Vec<Field> {
        BUTTONS
            .iter()
            .enumerate()
            .map(|(n, label)| Field::button(Rect::new(16 + 76 * n as i32, TOP, 72, 22), *label))
            .collect()
    }

    fn render(&self, ctx: &Context, idx: usize, p: &mut Painter<'_>) {
        let Some(w) = ctx.window(idx) else {
            return;
        };
        draw_fields(ctx, idx, w, p, GLYPH_FIRST, |_| false);
        let all = pairs(ctx, idx);
        if all.is_empty() {
            p.text(16, LIST_TOP, "Type a character to add a pair", ThemeRole::Lighter);
        }
        let rows = ((p.height() - LIST_TOP - 24) / ROW_H).max(0) as usize;
        let first = ctx.sel.kern.map_or(0, |k| k.saturating_sub(rows.saturating_sub(1)));
        for (row, (n, k)) in all.iter().enumerate().skip(first).take(rows).enumerate() {
            let ch = char::from_u32(k.next)
                .filter(|c| !c.is_control())
                .map(String::from)
                .unwrap_or_default();
            let label = format!("U+{:06X} {ch}   x: {:+}  y: {:+}", k.next, k.x, k.y);
            let r = Rect::new(16, LIST_TOP + row as i32 * ROW_H, 400, ROW_H - 4);
            p.item(r, &label, ctx.sel.kern == Some(n), false);
        }
    }

    fn on_btn_press(&self, ctx: &mut Context, idx: usize, at: Point, _: Buttons) -> Result<()> {
        press(ctx, idx, at);
        Ok(())
    }

    fn on_click(&self, ctx: &mut Context, idx: usize, at: Point) -> Result<()> {
        if let Some(f) = released(ctx, idx, at) {
            self.activate(ctx, idx, f);
        }
        Ok(())
    }

    fn on_key(&self, ctx: &mut Context, idx: usize, key: Key, mods: Modifiers) -> Result<()> {
        match key {
            Key::ArrowLeft => self.nudge(ctx, idx, -1),
            Key::ArrowRight => self.nudge(ctx, idx, 1),
            Key::ArrowUp => self.activate(ctx, idx, PREV),
            Key::ArrowDown => self.activate(ctx, idx, NEXT),
            Key::Delete | Key::Backspace => self.activate(ctx, idx, DELETE),
            k if !mods.intersects(Modifiers::CTRL | Modifiers::ALT) => {
                if let Some(c) = k.printable() {
                    let mut at = 0;
                    edit_glyph(ctx, idx, |g| at = add_pair(g, c as u32));
                    ctx.sel.kern = Some(at);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn on_enter(&self, ctx: &mut Context, idx: usize) -> Result<()> {
        if let Some(f) = super::focused(ctx, idx) {
            self.activate(ctx, idx, f);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{headless_context, key};

    #[test]
    fn pairs_stay_sorted_and_unique() {
        let mut g = GlyphEntry::default();
        assert_eq!(add_pair(&mut g, 0x56), 0);
        assert_eq!(add_pair(&mut g, 0x41), 0);
        assert_eq!(add_pair(&mut g, 0x56), 1);
        assert_eq!(g.kerning.len(), 2);
    }

    #[test]
    fn typing_adds_a_pair_arrows_nudge_it() {
        let mut ctx = headless_context(Vec::new());
        ctx.startup(None).unwrap();
        let idx = ctx.open_window(WindowKind::Glyph(0x41)).unwrap();
        ctx.select_tool(idx, Tool::Glyph(GlyphTool::Kerning));
        key(&mut ctx, idx, Key::Character('V'), Modifiers::SHIFT);
        key(&mut ctx, idx, Key::ArrowLeft, Modifiers::empty());
        key(&mut ctx, idx, Key::ArrowLeft, Modifiers::empty());
        let k = pairs(&ctx, idx);
        assert_eq!(k.len(), 1);
        assert_eq!((k[0].next, k[0].x), (0x56, -2));
        assert!(ctx.modified);
    }
}
