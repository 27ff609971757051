use glyphed_core::error::Result;
use glyphed_core::*;

use super::{MAIN_FIRST, TOP, draw_fields, press, released};
use crate::context::Context;
use crate::handler::ToolHandler;
use crate::paint::Painter;

const SIZE: usize = MAIN_FIRST;
const CREATE: usize = MAIN_FIRST + 1;

/// Glyph cell sizes offered for a new font.
pub const PRESETS: [(u32, u32); 6] = [(8, 16), (8, 8), (6, 12), (12, 24), (16, 32), (32, 64)];

pub struct NewFont;

impl NewFont {
    fn cycle(&self, ctx: &mut Context, delta: isize) {
        let n = PRESETS.len() as isize;
        ctx.sel.preset = (ctx.sel.preset as isize + delta).rem_euclid(n) as usize;
    }

    fn activate(&self, ctx: &mut Context, field: usize) {
        match field {
            SIZE => self.cycle(ctx, 1),
            CREATE => {
                let (w, h) = PRESETS[ctx.sel.preset % PRESETS.len()];
                log::info!("new {w}x{h} font");
                ctx.new_document(w, h);
            }
            _ => {}
        }
    }
}

impl ToolHandler for NewFont {
    fn layout(&self, ctx: &Context, _idx: usize) -> Vec<Field> {
        let (w, h) = PRESETS[ctx.sel.preset % PRESETS.len()];
        vec![
            Field::item(Rect::new(120, TOP + 8, 160, 20), format!("{w} x {h}")),
            Field::button(Rect::new(16, TOP + 40, 100, 22), "Create"),
        ]
    }

    fn render(&self, ctx: &Context, idx: usize, p: &mut Painter<'_>) {
        let Some(w) = ctx.window(idx) else {
            return;
        };
        p.text(16, TOP + 10, "Glyph size", ThemeRole::Fg);
        if ctx.modified {
            p.text(16, TOP + 72, "Unsaved changes will be lost.", ThemeRole::Lighter);
        }
        draw_fields(ctx, idx, w, p, MAIN_FIRST, |i| i == SIZE);
    }

    fn on_btn_press(&self, ctx: &mut Context, idx: usize, at: Point, _: Buttons) -> Result<()> {
        press(ctx, idx, at);
        Ok(())
    }

    fn on_click(&self, ctx: &mut Context, idx: usize, at: Point) -> Result<()> {
        if let Some(f) = released(ctx, idx, at) {
            self.activate(ctx, f);
        }
        Ok(())
    }

    fn on_key(&self, ctx: &mut Context, idx: usize, key: Key, _: Modifiers) -> Result<()> {
        if super::focused(ctx, idx) == Some(SIZE) {
            match key {
                Key::ArrowLeft | Key::ArrowUp => self.cycle(ctx, -1),
                Key::ArrowRight | Key::ArrowDown => self.cycle(ctx, 1),
                _ => {}
            }
        }
        Ok(())
    }

    fn on_enter(&self, ctx: &mut Context, idx: usize) -> Result<()> {
        if let Some(f) = super::focused(ctx, idx) {
            self.activate(ctx, f);
        }
        Ok(())
    }
}
