#[cfg(test)]
use glyphed_core::*;

#[cfg(test)]
use crate::{Context, Resources, dispatch, tools};

#[cfg(test)]
pub(crate) fn headless_context_with_driver(script: Vec<Event>) -> (Context, HeadlessDriver) {
    let driver = HeadlessDriver::with_script(script);
    let palette = Palette::default();
    let res = Resources::new(Box::new(driver.clone()), &palette);
    let ctx = Context::new(res, Box::new(JsonStore), palette, tools::builtin());
    (ctx, driver)
}

#[cfg(test)]
pub(crate) fn headless_context(script: Vec<Event>) -> Context {
    headless_context_with_driver(script).0
}

#[cfg(test)]
fn send(ctx: &mut Context, handle: WindowHandle, kind: EventKind, buttons: Buttons, mods: Modifiers) {
    let ev = Event::new(handle, kind)
        .with_buttons(buttons)
        .with_modifiers(mods);
    dispatch(ctx, ev).unwrap();
}

#[cfg(test)]
pub(crate) fn click_with(ctx: &mut Context, idx: usize, at: Point, buttons: Buttons) {
    let handle = ctx.window(idx).unwrap().handle;
    let (x, y) = (at.x, at.y);
    send(ctx, handle, EventKind::ButtonPress { x, y }, buttons, Modifiers::empty());
    send(ctx, handle, EventKind::ButtonRelease { x, y }, buttons, Modifiers::empty());
}

#[cfg(test)]
pub(crate) fn click(ctx: &mut Context, idx: usize, at: Point) {
    click_with(ctx, idx, at, Buttons::LEFT);
}

#[cfg(test)]
pub(crate) fn key(ctx: &mut Context, idx: usize, key: Key, mods: Modifiers) {
    let handle = ctx.window(idx).unwrap().handle;
    send(ctx, handle, EventKind::Key(key), Buttons::empty(), mods);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run;

    fn main_handle() -> WindowHandle {
        HeadlessDriver::nth_handle(0)
    }

    #[test]
    fn test_startup_without_a_file_shows_about() {
        let (mut ctx, drv) = headless_context_with_driver(Vec::new());
        ctx.startup(None).unwrap();
        assert_eq!(ctx.main_tool(), Some(Tool::Main(MainTool::About)));
        assert_eq!(drv.live_windows(), 1);
        assert_eq!(drv.title(main_handle()).as_deref(), Some("glyphed"));
        assert_eq!(drv.last_cursor(main_handle()), Some(CursorKind::Pointer));
    }

    #[test]
    fn test_startup_with_a_missing_file_reports_it() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = headless_context(Vec::new());
        ctx.startup(Some(&dir.path().join("missing.json"))).unwrap();
        assert_eq!(ctx.main_tool(), Some(Tool::Main(MainTool::About)));
        assert!(ctx.error.as_deref().is_some_and(|e| e.contains("missing.json")));
        assert!(ctx.filename.is_none());
    }

    #[test]
    fn test_glyph_window_opens_once() {
        let (mut ctx, drv) = headless_context_with_driver(Vec::new());
        ctx.startup(None).unwrap();
        let a = ctx.open_window(WindowKind::Glyph(0x41)).unwrap();
        let h = ctx.window(a).unwrap().handle;
        assert!(drv.calls().contains(&DriverCall::Create {
            handle: h,
            width: 564,
            height: 544,
        }));
        assert!(drv.title(h).is_some_and(|t| t.contains("U+000041")));

        let focused = drv.count(|c| *c == DriverCall::Focus(h));
        let b = ctx.open_window(WindowKind::Glyph(0x41)).unwrap();
        assert_eq!(a, b);
        assert_eq!(drv.live_windows(), 2);
        assert_eq!(drv.count(|c| *c == DriverCall::Focus(h)), focused + 1);
    }

    #[test]
    fn test_closing_main_with_changes_asks_before_exit() {
        let (mut ctx, drv) = headless_context_with_driver(Vec::new());
        ctx.startup(None).unwrap();
        ctx.open_window(WindowKind::Glyph(0x41)).unwrap();
        ctx.open_window(WindowKind::Glyph(0x42)).unwrap();
        ctx.modified = true;

        send(&mut ctx, main_handle(), EventKind::Close, Buttons::empty(), Modifiers::empty());
        assert_eq!(drv.live_windows(), 1);
        assert_eq!(ctx.windows.open_count(), 1);
        assert_eq!(ctx.main_tool(), Some(Tool::Main(MainTool::ConfirmSave)));
        assert!(ctx.running);

        send(&mut ctx, main_handle(), EventKind::Close, Buttons::empty(), Modifiers::empty());
        assert!(!ctx.running);
    }

    #[test]
    fn test_closing_main_without_changes_exits() {
        let mut ctx = headless_context(Vec::new());
        ctx.startup(None).unwrap();
        key(&mut ctx, 0, Key::Escape, Modifiers::empty());
        assert!(!ctx.running);
    }

    #[test]
    fn test_tab_walks_every_field_and_wraps_to_none() {
        let mut ctx = headless_context(Vec::new());
        ctx.startup(None).unwrap();
        let max = max_field(ctx.main_tool());
        for expect in 0..=max {
            key(&mut ctx, 0, Key::Tab, Modifiers::empty());
            assert_eq!(ctx.window(0).unwrap().field, Some(expect));
        }
        key(&mut ctx, 0, Key::Tab, Modifiers::empty());
        assert_eq!(ctx.window(0).unwrap().field, None);
    }

    #[test]
    fn test_tab_skips_missing_ligature_field() {
        let mut ctx = headless_context(Vec::new());
        ctx.startup(None).unwrap();
        let idx = ctx.open_window(WindowKind::Glyph(0x41)).unwrap();
        ctx.select_tool(idx, Tool::Glyph(GlyphTool::Coordinates));
        ctx.set_focus(idx, Some(2));
        key(&mut ctx, idx, Key::Tab, Modifiers::empty());
        assert_eq!(ctx.window(idx).unwrap().field, Some(LIGATURE_FIELD + 1));
    }

    #[test]
    fn test_ligature_name_commits_on_tab() {
        let mut ctx = headless_context(Vec::new());
        ctx.startup(None).unwrap();
        let idx = ctx.open_window(WindowKind::Glyph(LIGATURE_FIRST + 1)).unwrap();
        ctx.set_focus(idx, Some(LIGATURE_FIELD));
        assert!(ctx.editing(idx).is_some());
        key(&mut ctx, idx, Key::Character('f'), Modifiers::empty());
        key(&mut ctx, idx, Key::Character('i'), Modifiers::empty());
        key(&mut ctx, idx, Key::Tab, Modifiers::empty());
        assert!(ctx.editor.is_none());
        assert_eq!(ctx.doc.ligature(1), Some("fi"));
        assert!(ctx.modified);
    }

    #[test]
    fn test_ctrl_s_without_a_name_opens_save() {
        let mut ctx = headless_context(Vec::new());
        ctx.startup(None).unwrap();
        key(&mut ctx, 0, Key::Character('s'), Modifiers::CTRL);
        assert_eq!(ctx.main_tool(), Some(Tool::Main(MainTool::Save)));
        assert_eq!(ctx.path_input, "untitled.json");
        assert_eq!(ctx.window(0).unwrap().field, Some(tools::fileops::PATH_FIELD));
    }

    #[test]
    fn test_ctrl_s_with_a_name_saves_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("font.json");
        let mut ctx = headless_context(Vec::new());
        ctx.startup(None).unwrap();
        ctx.filename = Some(path.clone());
        ctx.modified = true;
        key(&mut ctx, 0, Key::Character('s'), Modifiers::CTRL);
        assert!(path.exists());
        assert!(!ctx.modified);
        assert_eq!(ctx.main_tool(), Some(Tool::Main(MainTool::About)));
    }

    #[test]
    fn test_help_overlay_leaves_on_any_key() {
        let mut ctx = headless_context(Vec::new());
        ctx.startup(None).unwrap();
        key(&mut ctx, 0, Key::F(1), Modifiers::empty());
        assert!(ctx.window(0).unwrap().help);
        key(&mut ctx, 0, Key::Character('x'), Modifiers::empty());
        assert!(!ctx.window(0).unwrap().help);
        assert!(ctx.running);
    }

    #[test]
    fn test_copy_zone_puts_the_character_on_the_clipboard() {
        let (mut ctx, drv) = headless_context_with_driver(Vec::new());
        ctx.startup(None).unwrap();
        let idx = ctx.open_window(WindowKind::Glyph(0x41)).unwrap();
        ctx.select_tool(idx, Tool::Glyph(GlyphTool::Coordinates));
        let h = ctx.window(idx).unwrap().handle;
        send(&mut ctx, h, EventKind::ButtonPress { x: 150, y: 5 }, Buttons::LEFT, Modifiers::empty());
        assert_eq!(drv.clipboard().as_deref(), Some("A"));
        assert_eq!(ctx.status.as_deref(), Some("Copied to clipboard"));
    }

    #[test]
    fn test_error_survives_passive_events_only() {
        let mut ctx = headless_context(Vec::new());
        ctx.startup(None).unwrap();
        ctx.show_error("boom");
        send(&mut ctx, main_handle(), EventKind::MouseMove { x: 10, y: 100 }, Buttons::empty(), Modifiers::empty());
        assert_eq!(ctx.error.as_deref(), Some("boom"));
        key(&mut ctx, 0, Key::Character('q'), Modifiers::empty());
        assert!(ctx.error.is_none());
    }

    #[test]
    fn test_toolbar_press_and_release_selects_tool() {
        let mut ctx = headless_context(Vec::new());
        ctx.startup(None).unwrap();
        // icon 3 is Properties
        click(&mut ctx, 0, Point::new(1 + 24 * 3 + 4, 5));
        assert_eq!(ctx.main_tool(), Some(Tool::Main(MainTool::Properties)));
    }

    #[test]
    fn test_events_for_unknown_windows_are_dropped() {
        let mut ctx = headless_context(Vec::new());
        ctx.startup(None).unwrap();
        send(&mut ctx, WindowHandle(99), EventKind::Close, Buttons::empty(), Modifiers::empty());
        assert!(ctx.running);
    }

    #[test]
    fn test_run_stops_when_the_script_ends() {
        let script = vec![Event::new(main_handle(), EventKind::MouseMove { x: 5, y: 50 })];
        let mut ctx = headless_context(script);
        ctx.startup(None).unwrap();
        assert!(run(&mut ctx).is_ok());
        assert!(ctx.running);
    }

    #[test]
    fn test_run_stops_when_main_is_closed() {
        let script = vec![
            Event::new(main_handle(), EventKind::Close),
            Event::new(main_handle(), EventKind::Key(Key::F(1))),
        ];
        let mut ctx = headless_context(script);
        ctx.startup(None).unwrap();
        run(&mut ctx).unwrap();
        assert!(!ctx.running);
        assert!(!ctx.window(0).unwrap().help);
    }

    #[test]
    fn test_shutdown_releases_the_clipboard_before_the_driver_goes() {
        let (mut ctx, drv) = headless_context_with_driver(Vec::new());
        ctx.startup(None).unwrap();
        ctx.res.driver.copy_to_clipboard("x");
        ctx.shutdown();
        let calls = drv.calls();
        assert_eq!(drv.count(|c| *c == DriverCall::ReleaseClipboard), 1);
        assert_eq!(
            calls.iter().position(|c| *c == DriverCall::ReleaseClipboard),
            Some(calls.len() - 1)
        );
        assert!(drv.clipboard().is_none());
    }

    fn status_color(ctx: &Context, idx: usize) -> Option<Color> {
        let s = &ctx.window(idx).unwrap().surface;
        s.pixel(1, s.height() as i32 - 1)
    }

    #[test]
    fn test_failed_ctrl_s_shows_the_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = headless_context(Vec::new());
        ctx.startup(None).unwrap();
        ctx.filename = Some(dir.path().join("missing").join("font.json"));
        ctx.modified = true;

        key(&mut ctx, 0, Key::Character('s'), Modifiers::CTRL);
        assert!(ctx.error.as_deref().is_some_and(|e| e.starts_with("Unable to save")));
        assert!(ctx.modified);
        assert_eq!(status_color(&ctx, 0), Some(ctx.palette.get(ThemeRole::ErrorBg)));
    }

    #[test]
    fn test_failed_ctrl_s_in_a_glyph_window_marks_both_status_bars() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = headless_context(Vec::new());
        ctx.startup(None).unwrap();
        let g = ctx.open_window(WindowKind::Glyph(0x41)).unwrap();
        ctx.filename = Some(dir.path().join("missing").join("font.json"));

        key(&mut ctx, g, Key::Character('s'), Modifiers::CTRL);
        let err = Some(ctx.palette.get(ThemeRole::ErrorBg));
        assert_eq!(status_color(&ctx, g), err);
        assert_eq!(status_color(&ctx, 0), err);
    }

    #[test]
    fn test_glyph_window_resize_sets_the_size_of_new_ones() {
        let (mut ctx, drv) = headless_context_with_driver(Vec::new());
        ctx.startup(None).unwrap();
        let a = ctx.open_window(WindowKind::Glyph(0x41)).unwrap();
        let h = ctx.window(a).unwrap().handle;
        let resize = |width, height| EventKind::Resize { width, height };

        send(&mut ctx, h, resize(300, 200), Buttons::empty(), Modifiers::empty());
        assert_eq!(ctx.window(a).unwrap().surface.size(), Size::new(300, 200));

        let b = ctx.open_window(WindowKind::Glyph(0x42)).unwrap();
        let hb = ctx.window(b).unwrap().handle;
        assert_eq!(ctx.window(b).unwrap().surface.size(), Size::new(300, 200));
        assert!(drv.calls().contains(&DriverCall::Create {
            handle: hb,
            width: 300,
            height: 200,
        }));

        send(&mut ctx, h, resize(0, 0), Buttons::empty(), Modifiers::empty());
        assert_eq!(ctx.window(a).unwrap().surface.size(), Size::new(0, 0));
        assert_eq!(ctx.glyph_size, Size::new(300, 200));
    }

    #[test]
    fn test_main_window_resize_keeps_the_glyph_default() {
        let mut ctx = headless_context(Vec::new());
        ctx.startup(None).unwrap();
        let resize = EventKind::Resize {
            width: 1000,
            height: 700,
        };
        send(&mut ctx, main_handle(), resize, Buttons::empty(), Modifiers::empty());
        assert_eq!(ctx.window(0).unwrap().surface.size(), Size::new(1000, 700));
        assert_eq!(ctx.glyph_size, GLYPH_SIZE);

        let g = ctx.open_window(WindowKind::Glyph(0x41)).unwrap();
        assert_eq!(ctx.window(g).unwrap().surface.size(), GLYPH_SIZE);
    }

    #[test]
    fn test_opening_a_window_sizes_it_through_the_driver() {
        let (mut ctx, drv) = headless_context_with_driver(Vec::new());
        ctx.startup(None).unwrap();
        let g = ctx.open_window(WindowKind::Glyph(0x41)).unwrap();
        let handle = ctx.window(g).unwrap().handle;
        assert!(drv.calls().contains(&DriverCall::Resize {
            handle,
            width: GLYPH_SIZE.width,
            height: GLYPH_SIZE.height,
        }));
    }
}
