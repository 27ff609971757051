#[cfg(test)]
mod tests {
    use crate::*;

    fn open(reg: &mut WindowRegistry, driver: &mut HeadlessDriver, kind: WindowKind) -> usize {
        if let Some(i) = reg.find(kind) {
            return i;
        }
        let idx = reg.free_slot(kind);
        let size = if kind.is_main() { MAIN_SIZE } else { GLYPH_SIZE };
        let handle = driver.create_window(size.width, size.height).unwrap();
        let surface = Surface::new(size, Color::BLACK).unwrap();
        reg.insert(idx, Window::new(handle, kind, surface)).unwrap();
        idx
    }

    #[test]
    fn test_one_window_per_codepoint() {
        let mut reg = WindowRegistry::new();
        let mut drv = HeadlessDriver::new();
        open(&mut reg, &mut drv, WindowKind::Main);
        let a = open(&mut reg, &mut drv, WindowKind::Glyph(0x41));
        let b = open(&mut reg, &mut drv, WindowKind::Glyph(0x41));
        assert_eq!(a, b);
        assert_eq!(reg.open_count(), 2);
        assert_eq!(drv.live_windows(), 2);
    }

    #[test]
    fn test_slot_reuse_keeps_handles_resolvable() {
        let mut reg = WindowRegistry::new();
        let mut drv = HeadlessDriver::new();
        open(&mut reg, &mut drv, WindowKind::Main);
        let a = open(&mut reg, &mut drv, WindowKind::Glyph(0x41));
        let b = open(&mut reg, &mut drv, WindowKind::Glyph(0x42));
        let old = reg.remove(a).unwrap();
        drv.destroy(old.handle);

        let c = open(&mut reg, &mut drv, WindowKind::Glyph(0x43));
        assert_eq!(c, a);
        assert_eq!(reg.lookup(old.handle), None);
        let h = reg.get(c).unwrap().handle;
        assert_eq!(reg.lookup(h), Some(c));
        assert_eq!(reg.get(b).unwrap().kind, WindowKind::Glyph(0x42));
    }

    #[test]
    fn test_tab_cycle_stays_in_range_for_every_tool() {
        let mut tools: Vec<Option<Tool>> = vec![None];
        tools.extend(MainTool::ALL.map(|t| Some(Tool::Main(t))));
        tools.extend(GlyphTool::ALL.map(|t| Some(Tool::Glyph(t))));
        for kind in [WindowKind::Main, WindowKind::Glyph(0x20), WindowKind::Glyph(0xF8FF)] {
            for tool in &tools {
                let max = max_field(*tool);
                let mut field = None;
                let mut trail = vec![field];
                for _ in 0..3 * (max + 2) {
                    field = next_field(kind, *tool, field);
                    assert!(field.is_none_or(|f| f <= max));
                    trail.push(field);
                }
                while trail.len() > 1 {
                    let last = trail.pop().unwrap();
                    assert_eq!(prev_field(kind, *tool, last), *trail.last().unwrap());
                }
            }
        }
    }

    #[test]
    fn test_headless_events_deserialize_from_json() {
        let json = r#"[
            {"window": 1, "kind": {"Key": "Tab"}, "modifiers": "SHIFT"},
            {"window": 1, "kind": {"ButtonPress": {"x": 3, "y": 4}}, "buttons": "LEFT"},
            {"window": 2, "kind": "Close"}
        ]"#;
        let events: Vec<Event> = serde_json::from_str(json).unwrap();
        assert_eq!(events[0].modifiers, Modifiers::SHIFT);
        assert_eq!(events[0].kind, EventKind::Key(Key::Tab));
        assert_eq!(events[1].buttons, Buttons::LEFT);
        assert_eq!(events[2].window, WindowHandle(2));
        assert!(events[2].modifiers.is_empty());
    }

    #[test]
    fn test_fatal_report_names_the_operation_and_exit_code() {
        let e = FatalError::new("openwin", ErrorCode::OutOfMemory);
        assert_eq!(e.exit_code(), 1);
        assert!(e.report("glyphed").starts_with("glyphed: openwin: "));
    }
}
