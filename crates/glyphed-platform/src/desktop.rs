use std::collections::{HashMap, VecDeque};
use std::num::NonZeroU32;
use std::rc::Rc;
use std::time::Duration;

use glyphed_core::*;
use smallvec::{SmallVec, smallvec};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, StartCause, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy, OwnedDisplayHandle};
use winit::keyboard::{Key as WinitKey, NamedKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{CursorIcon, Window, WindowId};

type Buffer = softbuffer::Surface<OwnedDisplayHandle, Rc<Window>>;

/// Sent through the event loop proxy to wake a blocked `next_event`.
#[derive(Clone, Copy, Debug)]
enum Wake {
    Interrupt,
}

/// Wakes the desktop event loop from another thread and makes the pending
/// `next_event` return `DriverError::Interrupted`.
#[derive(Clone)]
pub struct Interrupter(EventLoopProxy<Wake>);

impl Interrupter {
    pub fn interrupt(&self) {
        if self.0.send_event(Wake::Interrupt).is_err() {
            log::debug!("interrupt after the event loop closed");
        }
    }
}

struct Native {
    window: Rc<Window>,
    buffer: Buffer,
    size: (u32, u32),
    pointer: (i32, i32),
    buttons: Buttons,
}

/// Everything the winit callbacks touch.
struct State {
    context: softbuffer::Context<OwnedDisplayHandle>,
    windows: HashMap<WindowHandle, Native>,
    requests: VecDeque<(u32, u32)>,
    created: Option<Result<WindowHandle, DriverError>>,
    queue: VecDeque<Event>,
    keys: KeyTracker,
    interrupted: bool,
    exited: bool,
}

fn handle_of(id: WindowId) -> WindowHandle {
    WindowHandle(u64::from(id))
}

impl State {
    fn create_pending(&mut self, el: &ActiveEventLoop) {
        while let Some((width, height)) = self.requests.pop_front() {
            let fail = |e: &dyn std::fmt::Display| DriverError::CreateWindow {
                width,
                height,
                reason: e.to_string(),
            };
            let attrs = Window::default_attributes()
                .with_title("glyphed")
                .with_inner_size(PhysicalSize::new(width, height));
            let result = el
                .create_window(attrs)
                .map_err(|e| fail(&e))
                .and_then(|w| {
                    let window = Rc::new(w);
                    let buffer = softbuffer::Surface::new(&self.context, window.clone())
                        .map_err(|e| fail(&e))?;
                    Ok((window, buffer))
                });
            self.created = Some(result.map(|(window, buffer)| {
                let handle = handle_of(window.id());
                log::debug!("native window {handle:?} {width}x{height}");
                self.windows.insert(
                    handle,
                    Native {
                        window,
                        buffer,
                        size: (0, 0),
                        pointer: (0, 0),
                        buttons: Buttons::empty(),
                    },
                );
                handle
            }));
        }
    }

    fn key(&mut self, handle: WindowHandle, ev: &KeyEvent) {
        if ev.repeat {
            return;
        }
        let raw = raw_key(&ev.logical_key);
        match ev.state {
            ElementState::Pressed => self.keys.press(raw),
            ElementState::Released => {
                if let Some(k) = self.keys.release(raw) {
                    let e = Event::new(handle, EventKind::Key(k)).with_modifiers(self.keys.modifiers());
                    self.queue.push_back(e);
                }
            }
        }
    }

    fn translate(&mut self, handle: WindowHandle, event: WindowEvent) -> SmallVec<[EventKind; 2]> {
        let Some(n) = self.windows.get_mut(&handle) else {
            return SmallVec::new();
        };
        let (x, y) = n.pointer;
        match event {
            WindowEvent::CloseRequested => smallvec![EventKind::Close],
            WindowEvent::Resized(s) => smallvec![EventKind::Resize {
                width: s.width,
                height: s.height,
            }],
            WindowEvent::RedrawRequested => {
                let s = n.window.inner_size();
                smallvec![EventKind::Refresh(Rect::new(0, 0, s.width as i32, s.height as i32))]
            }
            WindowEvent::CursorMoved { position, .. } => {
                n.pointer = (position.x as i32, position.y as i32);
                let (x, y) = n.pointer;
                smallvec![EventKind::MouseMove { x, y }]
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let Some(b) = mouse_button(button) else {
                    return SmallVec::new();
                };
                match state {
                    ElementState::Pressed => {
                        n.buttons.insert(b);
                        smallvec![EventKind::ButtonPress { x, y }]
                    }
                    ElementState::Released => {
                        n.buttons.remove(b);
                        smallvec![EventKind::ButtonRelease { x, y }]
                    }
                }
            }
            WindowEvent::MouseWheel { delta, .. } => match wheel_button(delta) {
                Some(b) => {
                    n.buttons.insert(b);
                    smallvec![EventKind::ButtonPress { x, y }, EventKind::ButtonRelease { x, y }]
                }
                None => SmallVec::new(),
            },
            WindowEvent::Focused(false) => {
                self.keys.reset();
                SmallVec::new()
            }
            WindowEvent::Destroyed => {
                self.windows.remove(&handle);
                SmallVec::new()
            }
            _ => SmallVec::new(),
        }
    }
}

impl ApplicationHandler<Wake> for State {
    fn resumed(&mut self, el: &ActiveEventLoop) {
        self.create_pending(el);
    }

    fn new_events(&mut self, el: &ActiveEventLoop, _cause: StartCause) {
        self.create_pending(el);
    }

    fn user_event(&mut self, _el: &ActiveEventLoop, wake: Wake) {
        match wake {
            Wake::Interrupt => self.interrupted = true,
        }
    }

    fn window_event(&mut self, _el: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        let handle = handle_of(id);
        if let WindowEvent::KeyboardInput { event, .. } = &event {
            self.key(handle, event);
            return;
        }
        let kinds = self.translate(handle, event);
        let Some(n) = self.windows.get_mut(&handle) else {
            return;
        };
        let buttons = n.buttons;
        for kind in kinds {
            let ev = Event::new(handle, kind)
                .with_buttons(buttons)
                .with_modifiers(self.keys.modifiers());
            self.queue.push_back(ev);
        }
        n.buttons.remove(Buttons::WHEEL_UP | Buttons::WHEEL_DOWN);
    }

    fn about_to_wait(&mut self, el: &ActiveEventLoop) {
        self.create_pending(el);
    }

    fn exiting(&mut self, _el: &ActiveEventLoop) {
        self.exited = true;
    }
}

/// A winit event loop driven one iteration at a time from `next_event`.
pub struct DesktopDriver {
    event_loop: EventLoop<Wake>,
    state: State,
    clipboard: Option<arboard::Clipboard>,
}

impl DesktopDriver {
    pub fn new() -> Result<Self, DriverError> {
        let event_loop = EventLoop::<Wake>::with_user_event()
            .build()
            .map_err(|e| DriverError::Display(e.to_string()))?;
        let context = softbuffer::Context::new(event_loop.owned_display_handle())
            .map_err(|e| DriverError::Display(e.to_string()))?;
        log::info!("desktop driver ready");
        Ok(Self {
            event_loop,
            state: State {
                context,
                windows: HashMap::new(),
                requests: VecDeque::new(),
                created: None,
                queue: VecDeque::new(),
                keys: KeyTracker::new(),
                interrupted: false,
                exited: false,
            },
            clipboard: None,
        })
    }

    pub fn interrupter(&self) -> Interrupter {
        Interrupter(self.event_loop.create_proxy())
    }

    fn pump(&mut self, timeout: Option<Duration>) {
        if let PumpStatus::Exit(code) = self.event_loop.pump_app_events(timeout, &mut self.state) {
            log::debug!("event loop exited with {code}");
            self.state.exited = true;
        }
    }

    fn native(&mut self, handle: WindowHandle) -> Option<&mut Native> {
        self.state.windows.get_mut(&handle)
    }
}

impl Driver for DesktopDriver {
    fn create_window(&mut self, width: u32, height: u32) -> Result<WindowHandle, DriverError> {
        self.state.requests.push_back((width, height));
        while self.state.created.is_none() && !self.state.exited {
            self.pump(Some(Duration::ZERO));
        }
        self.state.created.take().unwrap_or(Err(DriverError::Disconnected))
    }

    fn set_title(&mut self, handle: WindowHandle, title: &str) {
        if let Some(n) = self.native(handle) {
            n.window.set_title(title);
        }
    }

    fn resize(&mut self, handle: WindowHandle, width: u32, height: u32) -> Result<(), DriverError> {
        let n = self.native(handle).ok_or(DriverError::UnknownWindow(handle))?;
        // the compositor may answer asynchronously with a Resized event
        let _ = n.window.request_inner_size(PhysicalSize::new(width, height));
        Ok(())
    }

    fn destroy(&mut self, handle: WindowHandle) {
        if self.state.windows.remove(&handle).is_some() {
            log::debug!("native window {handle:?} destroyed");
        }
    }

    fn focus(&mut self, handle: WindowHandle) {
        if let Some(n) = self.native(handle) {
            n.window.focus_window();
        }
    }

    fn set_cursor(&mut self, handle: WindowHandle, cursor: CursorKind) {
        if let Some(n) = self.native(handle) {
            n.window.set_cursor(cursor_icon(cursor));
        }
    }

    fn flush(&mut self, handle: WindowHandle, surface: &Surface, area: Rect) {
        let Some(n) = self.native(handle) else {
            return;
        };
        let (Some(w), Some(h)) = (NonZeroU32::new(surface.width()), NonZeroU32::new(surface.height()))
        else {
            return;
        };
        if n.size != (surface.width(), surface.height()) {
            if let Err(e) = n.buffer.resize(w, h) {
                log::warn!("cannot resize the frame buffer: {e}");
                return;
            }
            n.size = (surface.width(), surface.height());
        }
        let r = area.intersect(&surface.bounds());
        let mut buf = match n.buffer.buffer_mut() {
            Ok(b) => b,
            Err(e) => {
                log::warn!("no frame buffer: {e}");
                return;
            }
        };
        for (dst, src) in buf.iter_mut().zip(surface.pixels()) {
            *dst = src & 0x00FF_FFFF;
        }
        let damage = match (NonZeroU32::new(r.w as u32), NonZeroU32::new(r.h as u32)) {
            (Some(width), Some(height)) if !r.is_empty() => softbuffer::Rect {
                x: r.x as u32,
                y: r.y as u32,
                width,
                height,
            },
            _ => return,
        };
        if let Err(e) = buf.present_with_damage(&[damage]) {
            log::warn!("present failed: {e}");
        }
    }

    fn copy_to_clipboard(&mut self, text: &str) {
        if self.clipboard.is_none() {
            self.clipboard = arboard::Clipboard::new()
                .inspect_err(|e| log::warn!("clipboard unavailable: {e}"))
                .ok();
        }
        if let Some(c) = &mut self.clipboard {
            if let Err(e) = c.set_text(text) {
                log::warn!("copy failed: {e}");
            }
        }
    }

    fn next_event(&mut self) -> Result<Event, DriverError> {
        loop {
            if self.state.interrupted {
                return Err(DriverError::Interrupted);
            }
            if let Some(ev) = self.state.queue.pop_front() {
                return Ok(ev);
            }
            if self.state.exited {
                return Err(DriverError::Disconnected);
            }
            self.pump(None);
        }
    }

    fn release_clipboard(&mut self) {
        if self.clipboard.take().is_some() {
            log::debug!("clipboard released");
        }
    }
}

fn raw_key(key: &WinitKey) -> RawKey {
    match key {
        WinitKey::Named(n) => named_key(*n),
        WinitKey::Character(s) => s
            .chars()
            .next()
            .map_or(RawKey::Other, |c| RawKey::Key(Key::Character(c))),
        _ => RawKey::Other,
    }
}

fn named_key(n: NamedKey) -> RawKey {
    let key = match n {
        NamedKey::Shift => return RawKey::Modifier(Modifiers::SHIFT),
        NamedKey::Control => return RawKey::Modifier(Modifiers::CTRL),
        NamedKey::Alt | NamedKey::Super | NamedKey::Meta => return RawKey::Modifier(Modifiers::ALT),
        NamedKey::Enter => Key::Enter,
        NamedKey::Tab => Key::Tab,
        NamedKey::Space => Key::Character(' '),
        NamedKey::Backspace => Key::Backspace,
        NamedKey::Delete => Key::Delete,
        NamedKey::Escape => Key::Escape,
        NamedKey::ArrowLeft => Key::ArrowLeft,
        NamedKey::ArrowRight => Key::ArrowRight,
        NamedKey::ArrowUp => Key::ArrowUp,
        NamedKey::ArrowDown => Key::ArrowDown,
        NamedKey::Home => Key::Home,
        NamedKey::End => Key::End,
        NamedKey::PageUp => Key::PageUp,
        NamedKey::PageDown => Key::PageDown,
        NamedKey::F1 => Key::F(1),
        NamedKey::F2 => Key::F(2),
        NamedKey::F3 => Key::F(3),
        NamedKey::F4 => Key::F(4),
        NamedKey::F5 => Key::F(5),
        NamedKey::F6 => Key::F(6),
        NamedKey::F7 => Key::F(7),
        NamedKey::F8 => Key::F(8),
        NamedKey::F9 => Key::F(9),
        NamedKey::F10 => Key::F(10),
        NamedKey::F11 => Key::F(11),
        NamedKey::F12 => Key::F(12),
        _ => return RawKey::Other,
    };
    RawKey::Key(key)
}

fn mouse_button(b: MouseButton) -> Option<Buttons> {
    match b {
        MouseButton::Left => Some(Buttons::LEFT),
        MouseButton::Middle => Some(Buttons::MIDDLE),
        MouseButton::Right => Some(Buttons::RIGHT),
        _ => None,
    }
}

fn wheel_button(delta: MouseScrollDelta) -> Option<Buttons> {
    let dy = match delta {
        MouseScrollDelta::LineDelta(_, y) => y as f64,
        MouseScrollDelta::PixelDelta(p) => p.y,
    };
    if dy > 0.0 {
        Some(Buttons::WHEEL_UP)
    } else if dy < 0.0 {
        Some(Buttons::WHEEL_DOWN)
    } else {
        None
    }
}

fn cursor_icon(c: CursorKind) -> CursorIcon {
    match c {
        CursorKind::Loading => CursorIcon::Wait,
        CursorKind::Pointer => CursorIcon::Default,
        CursorKind::Cross => CursorIcon::Crosshair,
        CursorKind::Move => CursorIcon::Move,
        CursorKind::Grab => CursorIcon::Grab,
    }
}
