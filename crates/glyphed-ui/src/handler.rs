use std::collections::HashMap;
use std::rc::Rc;

use glyphed_core::error::Result;
use glyphed_core::*;

use crate::context::Context;
use crate::paint::Painter;

/// View and controller of one tool. The dispatcher only calls the handler
/// registered for the window's kind and current tool.
///
/// `layout` returns the tool's own fields; they are numbered after the
/// toolbar (and, on glyph windows, after the ligature name field).
pub trait ToolHandler {
    fn layout(&self, _ctx: &Context, _idx: usize) -> Vec<Field> {
        Vec::new()
    }

    fn render(&self, _ctx: &Context, _idx: usize, _p: &mut Painter<'_>) {}

    fn on_move(&self, _ctx: &mut Context, _idx: usize, _at: Point) -> Result<()> {
        Ok(())
    }

    fn on_btn_press(&self, _ctx: &mut Context, _idx: usize, _at: Point, _buttons: Buttons) -> Result<()> {
        Ok(())
    }

    fn on_click(&self, _ctx: &mut Context, _idx: usize, _at: Point) -> Result<()> {
        Ok(())
    }

    fn on_key(&self, _ctx: &mut Context, _idx: usize, _key: Key, _mods: Modifiers) -> Result<()> {
        Ok(())
    }

    fn on_enter(&self, _ctx: &mut Context, _idx: usize) -> Result<()> {
        Ok(())
    }
}

/// A window without a handler for its tool: toolbar only.
struct Idle;

impl ToolHandler for Idle {}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct Slot {
    main: bool,
    tool: Option<Tool>,
}

/// `(window kind, tool)` → handler.
#[derive(Clone)]
pub struct HandlerTable {
    map: HashMap<Slot, Rc<dyn ToolHandler>>,
    idle: Rc<dyn ToolHandler>,
}

impl Default for HandlerTable {
    fn default() -> Self {
        Self {
            map: HashMap::new(),
            idle: Rc::new(Idle),
        }
    }
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `h` for windows of this class (main or glyph) in `tool`.
    pub fn register(&mut self, kind: WindowKind, tool: Option<Tool>, h: Rc<dyn ToolHandler>) {
        self.map.insert(
            Slot {
                main: kind.is_main(),
                tool,
            },
            h,
        );
    }

    pub fn get(&self, kind: WindowKind, tool: Option<Tool>) -> Rc<dyn ToolHandler> {
        self.map
            .get(&Slot {
                main: kind.is_main(),
                tool,
            })
            .cloned()
            .unwrap_or_else(|| self.idle.clone())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
