use glyphed_core::error::Result;
use glyphed_core::*;

use super::coords::FOREGROUND;
use super::{GLYPH_FIRST, TOP, draw_fields, edit_glyph, press, released};
use crate::context::Context;
use crate::handler::ToolHandler;
use crate::paint::Painter;

const PREV: usize = GLYPH_FIRST;
const NEXT: usize = GLYPH_FIRST + 1;
const FG: usize = GLYPH_FIRST + 2;
const BACK: usize = GLYPH_FIRST + 3;
/// Highest color map index; the one above it stands for the foreground.
const LAST_INDEX: u8 = 0xFD;

fn current(ctx: &Context, idx: usize) -> Option<u8> {
    let l = ctx.sel.layer?;
    let cp = ctx.window(idx)?.codepoint()?;
    ctx.doc.glyph(cp)?.layers.get(l).map(|l| l.color)
}

/// Steps a color index by `d`, wrapping within the color map. Leaving the
/// foreground starts from either end.
pub fn step_color(c: u8, d: i32) -> u8 {
    let n = LAST_INDEX as i32 + 1;
    let from = match (c, d < 0) {
        (FOREGROUND, true) => n,
        (FOREGROUND, false) => -1,
        _ => c as i32,
    };
    (from + d).rem_euclid(n) as u8
}

pub struct Colors;

impl Colors {
    fn set(&self, ctx: &mut Context, idx: usize, f: impl FnOnce(u8) -> u8) {
        let Some(l) = ctx.sel.layer else {
            return;
        };
        edit_glyph(ctx, idx, |g| {
            if let Some(layer) = g.layers.get_mut(l) {
                layer.color = f(layer.color);
            }
        });
    }

    fn activate(&self, ctx: &mut Context, idx: usize, field: usize) {
        match field {
            PREV => self.set(ctx, idx, |c| step_color(c, -1)),
            NEXT => self.set(ctx, idx, |c| step_color(c, 1)),
            FG => self.set(ctx, idx, |_| FOREGROUND),
            BACK => {
                let layer = ctx.sel.layer;
                ctx.select_tool(idx, Tool::Glyph(GlyphTool::Layers));
                ctx.sel.layer = layer;
            }
            _ => {}
        }
    }
}

impl ToolHandler for Colors {
    fn layout(&self, _ctx: &Context, _idx: usize) -> Vec<Field> {
        ["Prev", "Next", "Foreground", "Back"]
            .iter()
            .enumerate()
            .map(|(n, label)| Field::button(Rect::new(16 + 92 * n as i32, TOP, 88, 22), *label))
            .collect()
    }

    fn render(&self, ctx: &Context, idx: usize, p: &mut Painter<'_>) {
        let Some(w) = ctx.window(idx) else {
            return;
        };
        draw_fields(ctx, idx, w, p, GLYPH_FIRST, |_| false);
        let y = TOP + 36;
        match (ctx.sel.layer, current(ctx, idx)) {
            (Some(l), Some(FOREGROUND)) => {
                p.fill(Rect::new(16, y, 20, 20), ThemeRole::Fg);
                p.text(44, y + 2, &format!("Layer {}: foreground", l + 1), ThemeRole::Fg);
            }
            (Some(l), Some(c)) => {
                p.bevel(Rect::new(16, y, 20, 20), ThemeRole::Light, ThemeRole::Bg, ThemeRole::Dark);
                p.text(44, y + 2, &format!("Layer {}: color #{c} of {}", l + 1, LAST_INDEX as u32 + 1), ThemeRole::Fg);
            }
            _ => {
                p.text(16, y + 2, "No layer selected", ThemeRole::Lighter);
            }
        }
    }

    fn on_btn_press(&self, ctx: &mut Context, idx: usize, at: Point, buttons: Buttons) -> Result<()> {
        match super::wheel(buttons) {
            0 => {
                press(ctx, idx, at);
            }
            d => self.set(ctx, idx, |c| step_color(c, d)),
        }
        Ok(())
    }

    fn on_click(&self, ctx: &mut Context, idx: usize, at: Point) -> Result<()> {
        if let Some(f) = released(ctx, idx, at) {
            self.activate(ctx, idx, f);
        }
        Ok(())
    }

    fn on_key(&self, ctx: &mut Context, idx: usize, key: Key, _: Modifiers) -> Result<()> {
        match key {
            Key::ArrowLeft | Key::ArrowUp => self.activate(ctx, idx, PREV),
            Key::ArrowRight | Key::ArrowDown => self.activate(ctx, idx, NEXT),
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
