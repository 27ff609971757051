use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::Rect;
use crate::driver::WindowHandle;

bitflags! {
    /// Keyboard modifier state. One keyboard is modeled for the whole process.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Modifiers: u8 {
        const SHIFT = 1;
        const CTRL = 1 << 1;
        /// Super or Alt; the editor does not tell them apart.
        const ALT = 1 << 2;
    }
}

bitflags! {
    /// Pointer buttons currently held down.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Buttons: u8 {
        const LEFT = 1;
        const MIDDLE = 1 << 1;
        const RIGHT = 1 << 2;
        const WHEEL_UP = 1 << 3;
        const WHEEL_DOWN = 1 << 4;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Character(char),
    Enter,
    Tab,
    Backspace,
    Delete,
    Escape,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8), // F1-F12
}

impl Key {
    /// The character a printable key inserts into a text field.
    pub fn printable(self) -> Option<char> {
        match self {
            Key::Character(c) if c >= ' ' && c != '\u{7f}' => Some(c),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Close,
    Resize { width: u32, height: u32 },
    /// Part of the window must be repainted from its surface.
    Refresh(Rect),
    MouseMove { x: i32, y: i32 },
    ButtonPress { x: i32, y: i32 },
    ButtonRelease { x: i32, y: i32 },
    Key(Key),
}

impl EventKind {
    /// Passive events leave a pending error message on the status bar.
    pub fn is_passive(&self) -> bool {
        matches!(
            self,
            EventKind::Refresh(_) | EventKind::MouseMove { .. } | EventKind::ButtonRelease { .. }
        )
    }
}

/// A normalized input event as delivered by a driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub window: WindowHandle,
    pub kind: EventKind,
    #[serde(default)]
    pub buttons: Buttons,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl Event {
    pub fn new(window: WindowHandle, kind: EventKind) -> Self {
        Self {
            window,
            kind,
            buttons: Buttons::empty(),
            modifiers: Modifiers::empty(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_buttons(mut self, buttons: Buttons) -> Self {
        self.buttons = buttons;
        self
    }
}

/// A key as seen by a backend, before it becomes an [`Event`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RawKey {
    Modifier(Modifiers),
    Key(Key),
    /// Anything the editor has no use for (media keys, dead keys, ...).
    Other,
}

/// Tracks modifier state across press/release pairs.
///
/// Keys are reported on release. A release without a matching press (the
/// press was delivered to another application, or got lost) is dropped so a
/// modifier cannot stick.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeyTracker {
    mods: Modifiers,
    pressed: u32,
}

impl KeyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn modifiers(&self) -> Modifiers {
        self.mods
    }

    pub fn press(&mut self, key: RawKey) {
        self.pressed += 1;
        if let RawKey::Modifier(m) = key {
            self.mods.insert(m);
        }
    }

    /// Returns the key to report, if any.
    pub fn release(&mut self, key: RawKey) -> Option<Key> {
        if self.pressed == 0 {
            return None;
        }
        self.pressed -= 1;
        match key {
            RawKey::Modifier(m) => {
                self.mods.remove(m);
                None
            }
            RawKey::Key(k) => Some(k),
            RawKey::Other => None,
        }
    }

    /// Forget everything, e.g. when the application loses keyboard focus.
    pub fn reset(&mut self) {
        self.mods = Modifiers::empty();
        self.pressed = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifiers_follow_press_and_release() {
        let mut t = KeyTracker::new();
        t.press(RawKey::Modifier(Modifiers::CTRL));
        t.press(RawKey::Modifier(Modifiers::SHIFT));
        assert_eq!(t.modifiers(), Modifiers::CTRL | Modifiers::SHIFT);
        t.press(RawKey::Key(Key::Character('S')));
        assert_eq!(t.release(RawKey::Key(Key::Character('S'))), Some(Key::Character('S')));
        assert_eq!(t.release(RawKey::Modifier(Modifiers::SHIFT)), None);
        assert_eq!(t.modifiers(), Modifiers::CTRL);
    }

    #[test]
    fn unmatched_release_is_dropped() {
        let mut t = KeyTracker::new();
        assert_eq!(t.release(RawKey::Key(Key::Enter)), None);
        t.press(RawKey::Key(Key::Character('a')));
        assert_eq!(t.release(RawKey::Key(Key::Character('a'))), Some(Key::Character('a')));
        assert_eq!(t.release(RawKey::Key(Key::Character('a'))), None);
    }

    #[test]
    fn reset_clears_modifiers() {
        let mut t = KeyTracker::new();
        t.press(RawKey::Modifier(Modifiers::ALT));
        t.reset();
        assert!(t.modifiers().is_empty());
        assert_eq!(t.release(RawKey::Modifier(Modifiers::ALT)), None);
    }

    #[test]
    fn printable_keys() {
        assert_eq!(Key::Character('a').printable(), Some('a'));
        assert_eq!(Key::Character('\u{8}').printable(), None);
        assert_eq!(Key::Tab.printable(), None);
    }

    #[test]
    fn passive_events() {
        assert!(EventKind::MouseMove { x: 0, y: 0 }.is_passive());
        assert!(!EventKind::ButtonPress { x: 0, y: 0 }.is_passive());
        assert!(!EventKind::Key(Key::Tab).is_passive());
    }
}
