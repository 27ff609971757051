//! The contract between the dispatcher and a windowing backend.
//!
//! A driver owns native windows and hands out opaque [`WindowHandle`]s; the
//! editor owns the pixel [`Surface`] of each window and asks the driver to
//! put a region of it on screen.

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::input::Event;
use crate::{Rect, Surface};

/// Opaque reference to a backend window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowHandle(pub u64);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CursorKind {
    Loading,
    #[default]
    Pointer,
    Cross,
    Move,
    Grab,
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("unable to open display: {0}")]
    Display(String),
    #[error("cannot create a {width}x{height} window: {reason}")]
    CreateWindow {
        width: u32,
        height: u32,
        reason: String,
    },
    #[error("unknown window {0:?}")]
    UnknownWindow(WindowHandle),
    /// The process received an interrupt while waiting for events.
    #[error("interrupted")]
    Interrupted,
    /// No more events will ever arrive (the event source went away).
    #[error("event source disconnected")]
    Disconnected,
}

pub trait Driver {
    fn create_window(&mut self, width: u32, height: u32) -> Result<WindowHandle, DriverError>;
    fn set_title(&mut self, handle: WindowHandle, title: &str);
    /// Changes the native window size. The caller reallocates the surface
    /// and redraws; nothing of the old content is kept. Opening a window
    /// always ends with one, at the size the window was created with.
    fn resize(&mut self, handle: WindowHandle, width: u32, height: u32) -> Result<(), DriverError>;
    fn destroy(&mut self, handle: WindowHandle);
    fn focus(&mut self, handle: WindowHandle);
    fn set_cursor(&mut self, handle: WindowHandle, cursor: CursorKind);
    /// Puts `area` of `surface` on screen.
    fn flush(&mut self, handle: WindowHandle, surface: &Surface, area: Rect);
    fn copy_to_clipboard(&mut self, text: &str);
    /// Blocks until the next event.
    fn next_event(&mut self) -> Result<Event, DriverError>;
    /// Drops clipboard ownership. Called once, first thing at shutdown.
    fn release_clipboard(&mut self) {}
}

/// One call made on a [`HeadlessDriver`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DriverCall {
    Create {
        handle: WindowHandle,
        width: u32,
        height: u32,
    },
    SetTitle(WindowHandle, String),
    Resize {
        handle: WindowHandle,
        width: u32,
        height: u32,
    },
    Destroy(WindowHandle),
    Focus(WindowHandle),
    SetCursor(WindowHandle, CursorKind),
    Flush(WindowHandle, Rect),
    Copy(String),
    ReleaseClipboard,
}

#[derive(Debug, Default)]
struct HeadlessState {
    script: VecDeque<Event>,
    calls: Vec<DriverCall>,
    live: HashSet<WindowHandle>,
    next_handle: u64,
    clipboard: Option<String>,
}

/// A driver without a display: events come from a script, every call is
/// recorded. Clones share state, so a test can keep one clone to inspect
/// what the dispatcher did with the other.
#[derive(Clone, Debug, Default)]
pub struct HeadlessDriver {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(events: impl IntoIterator<Item = Event>) -> Self {
        let d = Self::new();
        d.state.borrow_mut().script.extend(events);
        d
    }

    pub fn push(&self, event: Event) {
        self.state.borrow_mut().script.push_back(event);
    }

    /// Handles are handed out sequentially starting at 1, so scripts can
    /// name windows before they exist: the main window is always 1.
    pub fn nth_handle(n: u64) -> WindowHandle {
        WindowHandle(n + 1)
    }

    pub fn calls(&self) -> Vec<DriverCall> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn live_windows(&self) -> usize {
        self.state.borrow().live.len()
    }

    pub fn is_live(&self, handle: WindowHandle) -> bool {
        self.state.borrow().live.contains(&handle)
    }

    pub fn clipboard(&self) -> Option<String> {
        self.state.borrow().clipboard.clone()
    }

    /// The most recent title set on `handle`.
    pub fn title(&self, handle: WindowHandle) -> Option<String> {
        self.state.borrow().calls.iter().rev().find_map(|c| match c {
            DriverCall::SetTitle(h, t) if *h == handle => Some(t.clone()),
            _ => None,
        })
    }

    pub fn last_cursor(&self, handle: WindowHandle) -> Option<CursorKind> {
        self.state.borrow().calls.iter().rev().find_map(|c| match c {
            DriverCall::SetCursor(h, k) if *h == handle => Some(*k),
            _ => None,
        })
    }

    pub fn count(&self, pred: impl Fn(&DriverCall) -> bool) -> usize {
        self.state.borrow().calls.iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: DriverCall) {
        log::trace!("headless: {call:?}");
        self.state.borrow_mut().calls.push(call);
    }
}

impl Driver for HeadlessDriver {
    fn create_window(&mut self, width: u32, height: u32) -> Result<WindowHandle, DriverError> {
        if width == 0 || height == 0 {
            return Err(DriverError::CreateWindow {
                width,
                height,
                reason: "zero size".into(),
            });
        }
        let handle = {
            let mut st = self.state.borrow_mut();
            st.next_handle += 1;
            let h = WindowHandle(st.next_handle);
            st.live.insert(h);
            h
        };
        self.record(DriverCall::Create {
            handle,
            width,
            height,
        });
        Ok(handle)
    }

    fn set_title(&mut self, handle: WindowHandle, title: &str) {
        self.record(DriverCall::SetTitle(handle, title.to_owned()));
    }

    fn resize(&mut self, handle: WindowHandle, width: u32, height: u32) -> Result<(), DriverError> {
        if !self.is_live(handle) {
            return Err(DriverError::UnknownWindow(handle));
        }
        self.record(DriverCall::Resize {
            handle,
            width,
            height,
        });
        Ok(())
    }

    fn destroy(&mut self, handle: WindowHandle) {
        self.state.borrow_mut().live.remove(&handle);
        self.record(DriverCall::Destroy(handle));
    }

    fn focus(&mut self, handle: WindowHandle) {
        self.record(DriverCall::Focus(handle));
    }

    fn set_cursor(&mut self, handle: WindowHandle, cursor: CursorKind) {
        self.record(DriverCall::SetCursor(handle, cursor));
    }

    fn flush(&mut self, handle: WindowHandle, _surface: &Surface, area: Rect) {
        self.record(DriverCall::Flush(handle, area));
    }

    fn copy_to_clipboard(&mut self, text: &str) {
        self.state.borrow_mut().clipboard = Some(text.to_owned());
        self.record(DriverCall::Copy(text.to_owned()));
    }

    fn next_event(&mut self) -> Result<Event, DriverError> {
        self.state
            .borrow_mut()
            .script
            .pop_front()
            .ok_or(DriverError::Disconnected)
    }

    fn release_clipboard(&mut self) {
        self.state.borrow_mut().clipboard = None;
        self.record(DriverCall::ReleaseClipboard);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{EventKind, Key};

    #[test]
    fn handles_are_sequential_and_shared_between_clones() {
        let d = HeadlessDriver::new();
        let mut boxed: Box<dyn Driver> = Box::new(d.clone());
        let a = boxed.create_window(10, 10).unwrap();
        let b = boxed.create_window(10, 10).unwrap();
        assert_eq!(a, HeadlessDriver::nth_handle(0));
        assert_eq!(b, HeadlessDriver::nth_handle(1));
        boxed.destroy(a);
        assert_eq!(d.live_windows(), 1);
        assert!(!d.is_live(a));
    }

    #[test]
    fn script_runs_out_with_disconnect() {
        let h = HeadlessDriver::nth_handle(0);
        let mut d = HeadlessDriver::with_script([Event::new(h, EventKind::Key(Key::Escape))]);
        assert!(d.next_event().is_ok());
        assert!(matches!(d.next_event(), Err(DriverError::Disconnected)));
    }

    #[test]
    fn zero_sized_window_is_rejected() {
        let mut d = HeadlessDriver::new();
        assert!(d.create_window(0, 10).is_err());
        assert_eq!(d.live_windows(), 0);
    }

    #[test]
    fn title_reports_latest() {
        let mut d = HeadlessDriver::new();
        let h = d.create_window(1, 1).unwrap();
        d.set_title(h, "one");
        d.set_title(h, "two");
        assert_eq!(d.title(h).as_deref(), Some("two"));
    }
}
