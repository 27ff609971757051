use glyphed_core::error::Result;
use glyphed_core::*;

use super::{MAIN_FIRST, TOP, draw_fields, press, released};
use crate::context::Context;
use crate::handler::ToolHandler;
use crate::paint::Painter;

pub const NEW_BUTTON: usize = MAIN_FIRST;

pub struct About;

impl About {
    fn activate(&self, ctx: &mut Context, idx: usize, field: usize) {
        if field == NEW_BUTTON {
            ctx.select_tool(idx, Tool::Main(MainTool::New));
        }
    }
}

impl ToolHandler for About {
    fn layout(&self, _ctx: &Context, _idx: usize) -> Vec<Field> {
        vec![Field::button(Rect::new(16, TOP + 120, 120, 22), "New Font...")]
    }

    fn render(&self, ctx: &Context, idx: usize, p: &mut Painter<'_>) {
        let Some(w) = ctx.window(idx) else {
            return;
        };
        let y = TOP + 8;
        p.text(16, y, concat!("glyphed ", env!("CARGO_PKG_VERSION")), ThemeRole::Fg);
        p.text(16, y + 24, "A bitmap and outline font editor.", ThemeRole::Fg);
        let doc = match &ctx.filename {
            Some(f) => format!("{}: {} glyphs", f.display(), ctx.doc.glyph_count()),
            None => format!("Unsaved font: {} glyphs", ctx.doc.glyph_count()),
        };
        let role = if ctx.modified {
            ThemeRole::Selected
        } else {
            ThemeRole::Fg
        };
        p.text(16, y + 48, &doc, role);
        p.text(
            16,
            y + 72,
            &format!("Default size {}x{}", ctx.doc.width, ctx.doc.height),
            ThemeRole::Fg,
        );
        draw_fields(ctx, idx, w, p, MAIN_FIRST, |_| false);
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

    #[test]
    fn new_font_button_opens_new_tool() {
        let mut ctx = headless_context(Vec::new());
        ctx.startup(None).unwrap();
        assert_eq!(ctx.main_tool(), Some(Tool::Main(MainTool::About)));
        let r = ctx.window(0).unwrap().fields[NEW_BUTTON].rect;
        click(&mut ctx, 0, Point::new(r.x + 4, r.y + 4));
        assert_eq!(ctx.main_tool(), Some(Tool::Main(MainTool::New)));
    }
}
