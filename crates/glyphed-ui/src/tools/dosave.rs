use glyphed_core::error::Result;
use glyphed_core::*;

use super::{MAIN_FIRST, TOP, draw_fields, press, released};
use crate::context::Context;
use crate::handler::ToolHandler;
use crate::paint::Painter;

const SAVE: usize = MAIN_FIRST;
const DISCARD: usize = MAIN_FIRST + 1;

/// Shown instead of exiting when the main window is closed with unsaved
/// changes.
pub struct ConfirmSave;

impl ConfirmSave {
    fn activate(&self, ctx: &mut Context, field: usize) {
        match field {
            SAVE if ctx.filename.is_none() => ctx.save_as(),
            SAVE => {
                if ctx.save() {
                    ctx.close_window(0);
                }
            }
            DISCARD => {
                log::info!("discarding unsaved changes");
                ctx.running = false;
            }
            _ => {}
        }
    }
}

impl ToolHandler for ConfirmSave {
    fn layout(&self, _ctx: &Context, _idx: usize) -> Vec<Field> {
        vec![
            Field::button(Rect::new(16, TOP + 40, 100, 22), "Save"),
            Field::button(Rect::new(124, TOP + 40, 100, 22), "Don't save"),
        ]
    }

    fn render(&self, ctx: &Context, idx: usize, p: &mut Painter<'_>) {
        let Some(w) = ctx.window(idx) else {
            return;
        };
        let name = ctx
            .filename
            .as_deref()
            .and_then(|f| f.file_name())
            .map_or_else(|| "the new font".to_owned(), |f| f.to_string_lossy().into_owned());
        p.text(16, TOP + 8, &format!("Save changes to {name} before closing?"), ThemeRole::Fg);
        draw_fields(ctx, idx, w, p, MAIN_FIRST, |_| false);
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

    fn on_enter(&self, ctx: &mut Context, idx: usize) -> Result<()> {
        if let Some(f) = super::focused(ctx, idx) {
            self.activate(ctx, f);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{click, headless_context};

    fn confirming() -> Context {
        let mut ctx = headless_context(Vec::new());
        ctx.startup(None).unwrap();
        ctx.modified = true;
        ctx.close_window(0);
        assert_eq!(ctx.main_tool(), Some(Tool::Main(MainTool::ConfirmSave)));
        ctx
    }

    fn button(ctx: &Context, i: usize) -> Point {
        let r = ctx.window(0).unwrap().fields[i].rect;
        Point::new(r.x + 3, r.y + 3)
    }

    #[test]
    fn dont_save_ends_the_loop() {
        let mut ctx = confirming();
        let at = button(&ctx, DISCARD);
        click(&mut ctx, 0, at);
        assert!(!ctx.running);
    }

    #[test]
    fn save_without_a_name_asks_for_one() {
        let mut ctx = confirming();
        let at = button(&ctx, SAVE);
        click(&mut ctx, 0, at);
        assert!(ctx.running);
        assert_eq!(ctx.main_tool(), Some(Tool::Main(MainTool::Save)));
        assert_eq!(ctx.path_input, "untitled.json");
    }

    #[test]
    fn save_with_a_name_saves_and_exits() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = confirming();
        ctx.filename = Some(dir.path().join("f.json"));
        let at = button(&ctx, SAVE);
        click(&mut ctx, 0, at);
        assert!(dir.path().join("f.json").exists());
        assert!(!ctx.running);
    }
}
