//! Load and Save: a path field, a directory listing and the action button.

use std::path::{Path, PathBuf};

use glyphed_core::error::Result;
use glyphed_core::*;

use super::{MAIN_FIRST, TOP, column, draw_fields, press, released, scroll_by, wheel};
use crate::context::Context;
use crate::handler::ToolHandler;
use crate::paint::Painter;

pub const PATH_FIELD: usize = MAIN_FIRST;
const FIRST_ROW: usize = PATH_FIELD + 1;
const ROWS: usize = 5;
const GO_BUTTON: usize = FIRST_ROW + ROWS;
const PATH_MAX: usize = 1024;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub dir: bool,
}

/// Directory contents for browsing: parent first, then directories, then
/// files, hidden entries left out.
pub fn list_dir(dir: &Path) -> Vec<Entry> {
    let mut out = Vec::new();
    if dir.parent().is_some() {
        out.push(Entry {
            name: "..".to_owned(),
            dir: true,
        });
    }
    let Ok(rd) = std::fs::read_dir(dir) else {
        log::debug!("cannot list {}", dir.display());
        return out;
    };
    let mut entries: Vec<Entry> = rd
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let name = e.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                return None;
            }
            let dir = e.file_type().is_ok_and(|t| t.is_dir());
            Some(Entry { name, dir })
        })
        .collect();
    entries.sort_by(|a, b| b.dir.cmp(&a.dir).then_with(|| a.name.cmp(&b.name)));
    out.extend(entries);
    out
}

fn scroll(ctx: &Context, idx: usize) -> usize {
    ctx.window(idx).map_or(0, |w| w.scroll.max(0) as usize)
}

pub struct FileOps;

impl FileOps {
    fn saving(ctx: &Context, idx: usize) -> bool {
        ctx.window(idx).and_then(|w| w.tool) == Some(Tool::Main(MainTool::Save))
    }

    fn target(ctx: &Context) -> Option<PathBuf> {
        let typed = ctx.path_input.trim();
        if typed.is_empty() {
            return None;
        }
        let p = PathBuf::from(typed);
        Some(if p.is_relative() {
            ctx.browse_dir.join(p)
        } else {
            p
        })
    }

    fn go(&self, ctx: &mut Context, idx: usize) {
        let Some(path) = Self::target(ctx) else {
            ctx.show_error("No file name given");
            return;
        };
        let ok = if Self::saving(ctx, idx) {
            ctx.save_to(&path)
        } else {
            ctx.load(&path)
        };
        if ok {
            ctx.select_tool(0, Tool::Main(MainTool::Glyphs));
        }
    }

    fn activate(&self, ctx: &mut Context, idx: usize, field: usize) {
        match field {
            FIRST_ROW..GO_BUTTON => {
                let n = scroll(ctx, idx) + field - FIRST_ROW;
                let entries = list_dir(&ctx.browse_dir);
                let Some(e) = entries.get(n) else {
                    return;
                };
                if e.dir {
                    let next = if e.name == ".." {
                        ctx.browse_dir.parent().map(Path::to_path_buf)
                    } else {
                        Some(ctx.browse_dir.join(&e.name))
                    };
                    if let Some(dir) = next {
                        log::debug!("browse {}", dir.display());
                        ctx.browse_dir = dir;
                    }
                    ctx.sel.file = None;
                    if let Some(w) = ctx.window_mut(idx) {
                        w.scroll = 0;
                    }
                    return;
                }
                ctx.path_input = ctx.browse_dir.join(&e.name).to_string_lossy().into_owned();
                if ctx.sel.file == Some(n) {
                    self.go(ctx, idx);
                } else {
                    ctx.sel.file = Some(n);
                }
            }
            GO_BUTTON => self.go(ctx, idx),
            _ => {}
        }
    }
}

impl ToolHandler for FileOps {
    fn layout(&self, ctx: &Context, idx: usize) -> Vec<Field> {
        let mut fields = vec![Field::input(
            Rect::new(64, TOP, 480, 20),
            "File",
            ctx.path_input.clone(),
            PATH_MAX,
            CommitAction::Path,
        )];
        let entries = list_dir(&ctx.browse_dir);
        let first = scroll(ctx, idx);
        for n in 0..ROWS {
            let rect = column(16, TOP + 32, 528, n);
            fields.push(match entries.get(first + n) {
                Some(e) if e.dir => Field::item(rect, format!("{}/", e.name)),
                Some(e) => Field::item(rect, e.name.clone()),
                None => Field::placeholder(),
            });
        }
        let label = if Self::saving(ctx, idx) { "Save" } else { "Load" };
        fields.push(Field::button(
            Rect::new(16, TOP + 40 + ROWS as i32 * super::ROW_H, 100, 22),
            label,
        ));
        fields
    }

    fn render(&self, ctx: &Context, idx: usize, p: &mut Painter<'_>) {
        let Some(w) = ctx.window(idx) else {
            return;
        };
        let dir = ctx.browse_dir.display().to_string();
        p.text(16, TOP + 28 - 16, &dir, ThemeRole::Lighter);
        let first = w.scroll.max(0) as usize;
        draw_fields(ctx, idx, w, p, PATH_FIELD, |i| {
            (FIRST_ROW..GO_BUTTON).contains(&i) && ctx.sel.file == Some(first + i - FIRST_ROW)
        });
    }

    fn on_btn_press(&self, ctx: &mut Context, idx: usize, at: Point, buttons: Buttons) -> Result<()> {
        match wheel(buttons) {
            0 => {
                press(ctx, idx, at);
            }
            d => {
                let len = list_dir(&ctx.browse_dir).len();
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
        let d = match key {
            Key::ArrowUp => -1,
            Key::ArrowDown => 1,
            Key::PageUp => -(ROWS as i32),
            Key::PageDown => ROWS as i32,
            _ => return Ok(()),
        };
        let len = list_dir(&ctx.browse_dir).len();
        scroll_by(ctx, idx, d, len, ROWS);
        Ok(())
    }

    fn on_enter(&self, ctx: &mut Context, idx: usize) -> Result<()> {
        match super::focused(ctx, idx) {
            Some(f) if f > PATH_FIELD => self.activate(ctx, idx, f),
            _ => self.go(ctx, idx),
        }
        Ok(())
    }
}
