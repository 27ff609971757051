use std::collections::HashMap;

use crate::driver::WindowHandle;
use crate::error::{ErrorCode, FatalError};
use crate::tool::WindowKind;
use crate::window::Window;

/// The open windows, indexed densely. Slot 0 is the main window; closed
/// slots in the middle are reused before the table grows, closed slots at
/// the end are dropped.
#[derive(Debug, Default)]
pub struct WindowRegistry {
    slots: Vec<Option<Window>>,
    by_handle: HashMap<WindowHandle, usize>,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots, open or not.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn open_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn get(&self, idx: usize) -> Option<&Window> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut Window> {
        self.slots.get_mut(idx).and_then(Option::as_mut)
    }

    pub fn lookup(&self, handle: WindowHandle) -> Option<usize> {
        self.by_handle.get(&handle).copied()
    }

    /// The open window showing `kind`.
    pub fn find(&self, kind: WindowKind) -> Option<usize> {
        self.slots
            .iter()
            .position(|w| w.as_ref().is_some_and(|w| w.kind == kind))
    }

    /// Indices of every open window, in slot order.
    pub fn indices(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, w)| w.as_ref().map(|_| i))
            .collect()
    }

    /// Where a new window of `kind` goes.
    pub fn free_slot(&self, kind: WindowKind) -> usize {
        if kind.is_main() {
            return 0;
        }
        self.slots
            .iter()
            .enumerate()
            .skip(1)
            .find_map(|(i, w)| w.is_none().then_some(i))
            .unwrap_or(self.slots.len().max(1))
    }

    /// Puts `window` into slot `idx`, growing the table if needed.
    pub fn insert(&mut self, idx: usize, window: Window) -> Result<(), FatalError> {
        if idx >= self.slots.len() {
            let extra = idx + 1 - self.slots.len();
            self.slots
                .try_reserve(extra)
                .map_err(|e| FatalError::new("openwin", ErrorCode::OutOfMemory).with_detail(e.to_string()))?;
            self.slots.resize_with(idx + 1, || None);
        }
        if let Some(old) = self.slots[idx].take() {
            self.by_handle.remove(&old.handle);
        }
        self.by_handle.insert(window.handle, idx);
        self.slots[idx] = Some(window);
        Ok(())
    }

    /// Empties slot `idx` and trims closed slots off the end.
    pub fn remove(&mut self, idx: usize) -> Option<Window> {
        let w = self.slots.get_mut(idx)?.take()?;
        self.by_handle.remove(&w.handle);
        while self.slots.last().is_some_and(Option::is_none) {
            self.slots.pop();
        }
        Some(w)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Window)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, w)| w.as_ref().map(|w| (i, w)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, Size, Surface};

    fn win(h: u64, kind: WindowKind) -> Window {
        let s = Surface::new(Size::new(2, 2), Color::BLACK).unwrap();
        Window::new(WindowHandle(h), kind, s)
    }

    #[test]
    fn main_window_takes_slot_zero() {
        let r = WindowRegistry::new();
        assert_eq!(r.free_slot(WindowKind::Main), 0);
        assert_eq!(r.free_slot(WindowKind::Glyph(1)), 1);
    }

    #[test]
    fn interior_holes_are_reused_and_tail_is_trimmed() {
        let mut r = WindowRegistry::new();
        r.insert(0, win(1, WindowKind::Main)).unwrap();
        r.insert(1, win(2, WindowKind::Glyph(0x41))).unwrap();
        r.insert(2, win(3, WindowKind::Glyph(0x42))).unwrap();
        r.insert(3, win(4, WindowKind::Glyph(0x43))).unwrap();

        assert!(r.remove(1).is_some());
        assert_eq!(r.len(), 4);
        assert_eq!(r.free_slot(WindowKind::Glyph(0x44)), 1);
        assert_eq!(r.lookup(WindowHandle(2)), None);

        r.remove(3);
        assert_eq!(r.len(), 3);
        r.remove(2);
        // 1 and 2 closed: both trimmed
        assert_eq!(r.len(), 1);
        assert_eq!(r.indices(), vec![0]);
    }

    #[test]
    fn lookup_and_find() {
        let mut r = WindowRegistry::new();
        r.insert(0, win(7, WindowKind::Main)).unwrap();
        r.insert(1, win(9, WindowKind::Glyph(0x41))).unwrap();
        assert_eq!(r.lookup(WindowHandle(9)), Some(1));
        assert_eq!(r.lookup(WindowHandle(8)), None);
        assert_eq!(r.find(WindowKind::Glyph(0x41)), Some(1));
        assert_eq!(r.find(WindowKind::Glyph(0x42)), None);
        assert_eq!(r.open_count(), 2);
    }

    #[test]
    fn removing_twice_is_harmless() {
        let mut r = WindowRegistry::new();
        r.insert(0, win(1, WindowKind::Main)).unwrap();
        assert!(r.remove(5).is_none());
        assert!(r.remove(0).is_some());
        assert!(r.remove(0).is_none());
        assert!(r.is_empty());
    }
}
