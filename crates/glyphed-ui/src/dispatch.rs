//! The main loop: one driver event at a time, routed to the window it
//! belongs to and from there to the handler of the window's tool.

use glyphed_core::error::Result;
use glyphed_core::*;

use crate::context::Context;
use crate::view::{CHAR_INFO_X, in_copy_zone, in_ligature_zone, toolbar_icon};

/// Runs until the main window is closed or the driver has no more events.
pub fn run(ctx: &mut Context) -> Result<()> {
    log::info!("event loop started");
    while ctx.running {
        let ev = match ctx.res.driver.next_event() {
            Ok(ev) => ev,
            Err(DriverError::Disconnected) => {
                log::info!("event source disconnected, leaving the event loop");
                break;
            }
            Err(e) => return Err(e.into()),
        };
        dispatch(ctx, ev)?;
    }
    log::info!("event loop finished");
    Ok(())
}

fn help_allowed(kind: WindowKind, tool: Option<Tool>) -> bool {
    match tool {
        _ if !kind.is_main() => true,
        None => true,
        Some(Tool::Main(t)) => t <= MainTool::Glyphs,
        Some(Tool::Glyph(_)) => false,
    }
}

pub fn dispatch(ctx: &mut Context, ev: Event) -> Result<()> {
    let Some(idx) = ctx.lookup(ev.window) else {
        log::trace!("event for unknown window {:?} dropped", ev.window);
        return Ok(());
    };
    if !ev.kind.is_passive() {
        ctx.error = None;
    }
    let Some(w) = ctx.window(idx) else {
        return Ok(());
    };
    let (kind, tool, field, help) = (w.kind, w.tool, w.field, w.help);

    if help {
        match ev.kind {
            EventKind::Close => ctx.close_window(idx),
            EventKind::Resize { width, height } => ctx.resize_window(idx, width, height)?,
            EventKind::Refresh(r) => ctx.refresh(idx, r),
            EventKind::ButtonRelease { .. } | EventKind::Key(_) => {
                if let Some(w) = ctx.window_mut(idx) {
                    w.help = false;
                }
                ctx.relayout(idx);
                ctx.redraw(idx);
            }
            _ => {}
        }
        return Ok(());
    }

    if let EventKind::Key(Key::Character('s' | 'S')) = ev.kind {
        if ev.modifiers.intersects(Modifiers::CTRL | Modifiers::ALT) {
            ctx.commit_edit();
            if ev.modifiers.contains(Modifiers::SHIFT) || ctx.filename.is_none() {
                ctx.save_as();
            } else {
                // a failed save leaves only the error to show it
                ctx.save();
                ctx.redraw(idx);
                if idx != 0 {
                    ctx.paint_status(0);
                }
            }
            return Ok(());
        }
    }

    match ev.kind {
        EventKind::Close => ctx.close_window(idx),
        EventKind::Resize { width, height } => ctx.resize_window(idx, width, height)?,
        EventKind::Refresh(r) => ctx.refresh(idx, r),
        EventKind::MouseMove { x, y } => {
            let at = Point::new(x, y);
            ctx.cursor = CursorKind::Pointer;
            ctx.status = None;
            if in_copy_zone(kind, tool, at) {
                ctx.cursor = CursorKind::Grab;
                ctx.pos = None;
                ctx.status = kind.codepoint().map(|cp| ctx.char_info(cp));
            } else if let Some(i) = toolbar_icon(at) {
                ctx.pos = None;
                if i < kind.icon_count() {
                    ctx.status = Tool::from_icon(kind, i).map(|t| t.name().to_owned());
                } else if let Some(cp) = kind.codepoint().filter(|_| x >= CHAR_INFO_X) {
                    ctx.status = Some(ctx.char_info(cp));
                }
            } else {
                ctx.handler(idx).on_move(ctx, idx, at)?;
            }
            ctx.paint_status(idx);
            if ctx.last_cursor != Some(ctx.cursor) {
                ctx.set_cursor(idx, ctx.cursor);
                ctx.last_cursor = Some(ctx.cursor);
            }
        }
        EventKind::ButtonPress { x, y } => {
            let at = Point::new(x, y);
            ctx.commit_edit();
            if in_copy_zone(kind, tool, at) {
                if let Some(c) = kind.codepoint().filter(|&cp| cp > 0).and_then(char::from_u32) {
                    ctx.res.driver.copy_to_clipboard(&c.to_string());
                    ctx.status = Some("Copied to clipboard".to_owned());
                    ctx.paint_status(idx);
                    return Ok(());
                }
            }
            if let Some(i) = toolbar_icon(at) {
                ctx.sel.reset();
                if i < kind.icon_count() {
                    ctx.pending_icon = Some(i);
                } else if in_ligature_zone(kind, at) {
                    ctx.set_focus(idx, Some(LIGATURE_FIELD));
                }
                ctx.redraw(idx);
                return Ok(());
            }
            ctx.handler(idx).on_btn_press(ctx, idx, at, ev.buttons)?;
            ctx.redraw(idx);
        }
        EventKind::ButtonRelease { x, y } => {
            let at = Point::new(x, y);
            let pending = ctx.pending_icon.take();
            match toolbar_icon(at) {
                Some(i) => {
                    if pending == Some(i) {
                        if let Some(t) = Tool::from_icon(kind, i) {
                            ctx.select_tool(idx, t);
                        }
                    }
                }
                None => ctx.handler(idx).on_click(ctx, idx, at)?,
            }
            ctx.sel.pressed = None;
            // the handler may have closed the window, or the slot was reused
            if ctx.window(idx).is_some_and(|w| w.handle == ev.window) {
                if ctx.last_cursor != Some(ctx.cursor) {
                    ctx.set_cursor(idx, ctx.cursor);
                    ctx.last_cursor = Some(ctx.cursor);
                }
                ctx.relayout(idx);
                ctx.redraw(idx);
            }
        }
        EventKind::Key(key) => {
            ctx.pending_icon = None;
            on_key(ctx, idx, kind, tool, field, key, ev.modifiers)?;
        }
    }
    Ok(())
}

fn on_key(
    ctx: &mut Context,
    idx: usize,
    kind: WindowKind,
    tool: Option<Tool>,
    field: Option<usize>,
    key: Key,
    mods: Modifiers,
) -> Result<()> {
    match key {
        Key::Escape => ctx.close_window(idx),
        Key::F(1) => {
            if help_allowed(kind, tool) {
                ctx.commit_edit();
                if let Some(w) = ctx.window_mut(idx) {
                    w.help = true;
                }
                ctx.redraw(idx);
            }
        }
        Key::Tab => {
            ctx.commit_edit();
            let f = if mods.contains(Modifiers::SHIFT) {
                prev_field(kind, tool, field)
            } else {
                next_field(kind, tool, field)
            };
            ctx.set_focus(idx, f);
            ctx.redraw(idx);
        }
        Key::Enter => {
            if ctx.editing(idx).is_some() {
                ctx.commit_edit();
                ctx.set_focus(idx, next_field(kind, tool, field));
                ctx.redraw(idx);
            } else if let Some(t) = field
                .filter(|&f| f < kind.icon_count())
                .and_then(|f| Tool::from_icon(kind, f))
            {
                ctx.select_tool(idx, t);
            } else {
                ctx.handler(idx).on_enter(ctx, idx)?;
                ctx.relayout(idx);
                ctx.redraw(idx);
            }
        }
        _ => {
            let plain = !mods.intersects(Modifiers::CTRL | Modifiers::ALT);
            let consumed = plain
                && ctx.editor.as_mut().is_some_and(|e| {
                    e.target().window == idx && e.handle_key(key)
                });
            if consumed {
                ctx.redraw(idx);
            } else {
                ctx.handler(idx).on_key(ctx, idx, key, mods)?;
                ctx.relayout(idx);
                ctx.redraw(idx);
            }
        }
    }
    Ok(())
}
