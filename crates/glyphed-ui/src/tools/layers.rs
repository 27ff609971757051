use glyphed_core::error::Result;
use glyphed_core::*;

use super::coords::FOREGROUND;
use super::{GLYPH_FIRST, TOP, column, draw_fields, edit_glyph, press, released, scroll_by, wheel};
use crate::context::Context;
use crate::handler::ToolHandler;
use crate::paint::Painter;

const BUTTONS: [&str; 7] = [
    "+ Contour",
    "+ Bitmap",
    "+ Pixmap",
    "Delete",
    "Move up",
    "Move down",
    "Color...",
];
const ADD_CONTOUR: usize = GLYPH_FIRST;
const ADD_PIXMAP: usize = GLYPH_FIRST + 2;
const DELETE: usize = GLYPH_FIRST + 3;
const UP: usize = GLYPH_FIRST + 4;
const DOWN: usize = GLYPH_FIRST + 5;
const COLOR: usize = GLYPH_FIRST + 6;
const FIRST_ROW: usize = GLYPH_FIRST + BUTTONS.len();
const ROWS: usize = 5;

fn layers(ctx: &Context, idx: usize) -> Vec<Layer> {
    ctx.window(idx)
        .and_then(Window::codepoint)
        .and_then(|cp| ctx.doc.glyph(cp))
        .map(|g| g.layers.clone())
        .unwrap_or_default()
}

fn describe(n: usize, l: &Layer) -> String {
    let kind = match l.kind {
        LayerKind::Contour => "Contour",
        LayerKind::Bitmap => "Bitmap",
        LayerKind::Pixmap => "Pixmap",
    };
    let color = match l.color {
        FOREGROUND => "fg".to_owned(),
        c => format!("#{c}"),
    };
    format!("{}: {kind}, {} points, color {color}", n + 1, l.points.len())
}

pub struct Layers;

impl Layers {
    fn activate(&self, ctx: &mut Context, idx: usize, field: usize) {
        let sel = ctx.sel.layer;
        match field {
            ADD_CONTOUR..=ADD_PIXMAP => {
                let kind = [LayerKind::Contour, LayerKind::Bitmap, LayerKind::Pixmap]
                    [field - ADD_CONTOUR];
                let mut at = 0;
                edit_glyph(ctx, idx, |g| {
                    g.layers.push(Layer {
                        kind,
                        color: FOREGROUND,
                        points: Vec::new(),
                    });
                    at = g.layers.len() - 1;
                });
                ctx.sel.layer = Some(at);
            }
            DELETE => {
                let Some(l) = sel else {
                    return;
                };
                edit_glyph(ctx, idx, |g| {
                    if l < g.layers.len() {
                        g.layers.remove(l);
                    }
                });
                ctx.sel.layer = None;
            }
            UP | DOWN => {
                let Some(l) = sel else {
                    return;
                };
                let to = if field == UP {
                    l.checked_sub(1)
                } else {
                    Some(l + 1)
                };
                let Some(to) = to.filter(|&t| t < layers(ctx, idx).len()) else {
                    return;
                };
                edit_glyph(ctx, idx, |g| g.layers.swap(l, to));
                ctx.sel.layer = Some(to);
            }
            COLOR => {
                ctx.select_tool(idx, Tool::Glyph(GlyphTool::Color));
                ctx.sel.layer = sel;
            }
            FIRST_ROW.. => {
                let first = ctx.window(idx).map_or(0, |w| w.scroll.max(0) as usize);
                let n = first + field - FIRST_ROW;
                if n < layers(ctx, idx).len() {
                    ctx.sel.layer = Some(n);
                }
            }
            _ => {}
        }
    }
}

impl ToolHandler for Layers {
    fn layout(&self, ctx: &Context, idx: usize) -> Vec<Field> {
        let mut fields: Vec<Field> = BUTTONS
            .iter()
            .enumerate()
            .map(|(n, label)| Field::button(column(16, TOP, 120, n), *label))
            .collect();
        let all = layers(ctx, idx);
        let first = ctx.window(idx).map_or(0, |w| w.scroll.max(0) as usize);
        for n in 0..ROWS {
            fields.push(match all.get(first + n) {
                Some(l) => Field::item(column(150, TOP, 380, n), describe(first + n, l)),
                None => Field::placeholder(),
            });
        }
        fields
    }

    fn render(&self, ctx: &Context, idx: usize, p: &mut Painter<'_>) {
        let Some(w) = ctx.window(idx) else {
            return;
        };
        let first = w.scroll.max(0) as usize;
        if layers(ctx, idx).is_empty() {
            p.text(154, TOP + 2, "No layers", ThemeRole::Lighter);
        }
        draw_fields(ctx, idx, w, p, GLYPH_FIRST, |i| {
            i >= FIRST_ROW && ctx.sel.layer == Some(first + i - FIRST_ROW)
        });
    }

    fn on_btn_press(&self, ctx: &mut Context, idx: usize, at: Point, buttons: Buttons) -> Result<()> {
        match wheel(buttons) {
            0 => {
                press(ctx, idx, at);
            }
            d => {
                let len = layers(ctx, idx).len();
                scroll_by(ctx, idx, d, len, ROWS);
            }
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
        let len = layers(ctx, idx).len();
        match key {
            Key::ArrowUp | Key::ArrowDown if len > 0 => {
                let cur = ctx.sel.layer.unwrap_or(0);
                ctx.sel.layer = Some(if key == Key::ArrowUp {
                    cur.saturating_sub(1)
                } else {
                    (cur + 1).min(len - 1)
                });
            }
            Key::Delete => self.activate(ctx, idx, DELETE),
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
    use crate::tests::{click, headless_context};

    fn layers_tool() -> (Context, usize) {
        let mut ctx = headless_context(Vec::new());
        ctx.startup(None).unwrap();
        let idx = ctx.open_window(WindowKind::Glyph(0x42)).unwrap();
        ctx.select_tool(idx, Tool::Glyph(GlyphTool::Layers));
        (ctx, idx)
    }

    fn field(ctx: &Context, idx: usize, i: usize) -> Point {
        let r = ctx.window(idx).unwrap().fields[i].rect;
        Point::new(r.x + 3, r.y + 3)
    }

    #[test]
    fn add_reorder_and_delete() {
        let (mut ctx, idx) = layers_tool();
        let at = field(&ctx, idx, ADD_CONTOUR);
        click(&mut ctx, idx, at);
        let at = field(&ctx, idx, ADD_CONTOUR + 1);
        click(&mut ctx, idx, at);
        assert_eq!(layers(&ctx, idx).len(), 2);
        assert_eq!(ctx.sel.layer, Some(1));

        let at = field(&ctx, idx, UP);
        click(&mut ctx, idx, at);
        let l = layers(&ctx, idx);
        assert_eq!((l[0].kind, l[1].kind), (LayerKind::Bitmap, LayerKind::Contour));
        assert_eq!(ctx.sel.layer, Some(0));

        let at = field(&ctx, idx, DELETE);
        click(&mut ctx, idx, at);
        assert_eq!(layers(&ctx, idx)[0].kind, LayerKind::Contour);
        assert_eq!(ctx.window(idx).unwrap().history.len(), 4);
    }

    #[test]
    fn color_tool_keeps_the_selected_layer() {
        let (mut ctx, idx) = layers_tool();
        let at = field(&ctx, idx, ADD_CONTOUR);
        click(&mut ctx, idx, at);
        let at = field(&ctx, idx, COLOR);
        click(&mut ctx, idx, at);
        assert_eq!(
            ctx.window(idx).unwrap().tool,
            Some(Tool::Glyph(GlyphTool::Color))
        );
        assert_eq!(ctx.sel.layer, Some(0));
    }
}
