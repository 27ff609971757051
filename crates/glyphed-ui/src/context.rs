//! Application state shared by the dispatcher and every tool handler.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use glyphed_core::error::Result;
use glyphed_core::*;

use crate::handler::{HandlerTable, ToolHandler};
use crate::paint::{IconAtlas, Painter, UiFont};
use crate::progress::ProgressBar;
use crate::view;

/// The ligature name input in the toolbar row of ligature windows.
pub const LIGATURE_RECT: Rect = Rect::new(78, 1, 55, 21);
pub const LIGATURE_MAX_LEN: usize = 63;

/// Process-wide resources, created once and released once.
pub struct Resources {
    pub driver: Box<dyn Driver>,
    pub font: Option<UiFont>,
    pub names: Box<dyn UnicodeNames>,
    pub icons: IconAtlas,
}

impl Resources {
    pub fn new(driver: Box<dyn Driver>, palette: &Palette) -> Self {
        Self {
            driver,
            font: None,
            names: Box::new(BasicNames),
            icons: IconAtlas::new(palette.get(ThemeRole::Fg)),
        }
    }

    pub fn with_font(mut self, font: Option<UiFont>) -> Self {
        self.font = font;
        self
    }

    pub fn with_names(mut self, names: Box<dyn UnicodeNames>) -> Self {
        self.names = names;
        self
    }

    /// Releases everything in order: clipboard, driver, font, name table,
    /// icons.
    pub fn shutdown(self) {
        let Resources {
            mut driver,
            font,
            names,
            icons,
        } = self;
        driver.release_clipboard();
        drop(driver);
        log::debug!("shutdown: driver closed");
        drop(font);
        drop(names);
        drop(icons);
        log::info!("shutdown complete");
    }
}

/// Transient list/selection state of the views. Reset whenever a tool is
/// selected or the toolbar is pressed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    /// Glyph table: anchor and end of the selected codepoints.
    pub start: Option<u32>,
    pub end: Option<u32>,
    /// Row under the pointer in lists.
    pub hover: Option<usize>,
    /// Field pressed, for matching the release.
    pub pressed: Option<usize>,
    /// Glyph table cell pressed.
    pub cell: Option<u32>,
    pub file: Option<usize>,
    /// Unicode block pressed in the Ranges list.
    pub range: Option<usize>,
    pub layer: Option<usize>,
    pub kern: Option<usize>,
    /// Size preset of the New tool.
    pub preset: usize,
}

impl Selection {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

pub struct Context {
    pub windows: WindowRegistry,
    pub editor: Option<InputEditor>,
    pub palette: Palette,
    pub doc: FontDocument,
    pub store: Box<dyn DocumentStore>,
    pub res: Resources,
    pub handlers: Rc<HandlerTable>,
    pub filename: Option<PathBuf>,
    pub modified: bool,
    pub running: bool,
    /// Hover text for the status bar.
    pub status: Option<String>,
    /// Transient error, cleared by the next non-passive event.
    pub error: Option<String>,
    /// Toolbar icon pressed and not yet released.
    pub pending_icon: Option<usize>,
    pub cursor: CursorKind,
    pub last_cursor: Option<CursorKind>,
    /// Glyph coordinates under the pointer, shown as `X: Y:`.
    pub pos: Option<Point>,
    /// Size of newly opened glyph windows.
    pub glyph_size: Size,
    pub range: (u32, u32),
    pub sel: Selection,
    pub path_input: String,
    pub browse_dir: PathBuf,
    pub(crate) last_percent: Option<u32>,
}

impl Context {
    pub fn new(
        res: Resources,
        store: Box<dyn DocumentStore>,
        palette: Palette,
        handlers: HandlerTable,
    ) -> Self {
        Self {
            windows: WindowRegistry::new(),
            editor: None,
            palette,
            doc: FontDocument::default(),
            store,
            res,
            handlers: Rc::new(handlers),
            filename: None,
            modified: false,
            running: true,
            status: None,
            error: None,
            pending_icon: None,
            cursor: CursorKind::Pointer,
            last_cursor: None,
            pos: None,
            glyph_size: GLYPH_SIZE,
            range: (0, 0xFF),
            sel: Selection::default(),
            path_input: String::new(),
            browse_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            last_percent: None,
        }
    }

    pub fn lookup(&self, handle: WindowHandle) -> Option<usize> {
        self.windows.lookup(handle)
    }

    pub fn window(&self, idx: usize) -> Option<&Window> {
        self.windows.get(idx)
    }

    pub fn window_mut(&mut self, idx: usize) -> Option<&mut Window> {
        self.windows.get_mut(idx)
    }

    pub fn handler(&self, idx: usize) -> Rc<dyn ToolHandler> {
        match self.windows.get(idx) {
            Some(w) => self.handlers.get(w.kind, w.tool),
            None => self.handlers.get(WindowKind::Main, None),
        }
    }

    pub fn main_tool(&self) -> Option<Tool> {
        self.windows.get(0).and_then(|w| w.tool)
    }

    /// Opens the window for `kind`, or focuses it when it is already open.
    pub fn open_window(&mut self, kind: WindowKind) -> Result<usize> {
        if let Some(idx) = self.windows.find(kind) {
            let handle = self.windows.get(idx).map(|w| w.handle);
            if let Some(h) = handle {
                self.res.driver.focus(h);
            }
            return Ok(idx);
        }
        self.commit_edit();
        let idx = self.windows.free_slot(kind);
        let size = if kind.is_main() {
            MAIN_SIZE
        } else {
            self.glyph_size
        };
        let handle = self.res.driver.create_window(size.width, size.height)?;
        let surface = self
            .res
            .driver
            .resize(handle, size.width, size.height)
            .map_err(Error::from)
            .and_then(|()| Ok(Surface::new(size, self.palette.get(ThemeRole::Bg))?));
        let surface = match surface {
            Ok(s) => s,
            Err(e) => {
                self.res.driver.destroy(handle);
                return Err(e);
            }
        };
        self.windows.insert(idx, Window::new(handle, kind, surface))?;
        if let WindowKind::Glyph(cp) = kind {
            self.doc.seed_glyph_metrics(cp);
        }
        log::info!("open window {idx} ({kind:?}) {}x{}", size.width, size.height);
        self.update_title(idx);
        self.relayout(idx);
        self.redraw(idx);
        self.res.driver.focus(handle);
        Ok(idx)
    }

    /// Closes window `idx`. Closing the main window closes every glyph
    /// window first, then either asks to save unsaved changes or ends the
    /// main loop.
    pub fn close_window(&mut self, idx: usize) {
        self.set_cursor(idx, CursorKind::Pointer);
        self.set_cursor(0, CursorKind::Pointer);
        self.cursor = CursorKind::Pointer;
        self.last_cursor = Some(CursorKind::Pointer);
        self.commit_edit();
        if self.windows.get(idx).is_none() {
            return;
        }
        if idx == 0 {
            for i in self.windows.indices() {
                if i != 0 {
                    self.close_window(i);
                }
            }
            let confirm = Some(Tool::Main(MainTool::ConfirmSave));
            let Some(main) = self.windows.get_mut(0) else {
                return;
            };
            main.history.clear();
            if self.modified && main.tool != confirm {
                main.tool = confirm;
                main.field = None;
                main.help = false;
                log::info!("unsaved changes, asking before exit");
                self.relayout(0);
                self.redraw(0);
            } else {
                log::info!("main window closed");
                self.running = false;
            }
            return;
        }
        if let Some(mut w) = self.windows.remove(idx) {
            w.history.clear();
            self.res.driver.destroy(w.handle);
            log::info!("close window {idx} ({:?})", w.kind);
        }
    }

    pub fn update_title(&mut self, idx: usize) {
        let Some(w) = self.windows.get(idx) else {
            return;
        };
        let file = self
            .filename
            .as_deref()
            .and_then(Path::file_name)
            .map(|s| s.to_string_lossy().into_owned());
        let title = match (w.kind, file) {
            (WindowKind::Main, None) => "glyphed".to_owned(),
            (WindowKind::Main, Some(f)) => format!("glyphed - {f}"),
            (WindowKind::Glyph(cp), None) => format!("glyphed - U+{cp:06X}"),
            (WindowKind::Glyph(cp), Some(f)) => format!("glyphed - U+{cp:06X} - {f}"),
        };
        self.res.driver.set_title(w.handle, &title);
    }

    pub fn update_titles(&mut self) {
        for idx in self.windows.indices() {
            self.update_title(idx);
        }
    }

    /// Rebuilds the field list of window `idx` for its current tool.
    pub fn relayout(&mut self, idx: usize) {
        let Some(w) = self.windows.get(idx) else {
            return;
        };
        let (kind, tool) = (w.kind, w.tool);
        let mut fields: Vec<Field> = (0..kind.icon_count()).map(Field::icon).collect();
        if let WindowKind::Glyph(cp) = kind {
            if is_ligature(cp) {
                let slot = (cp - LIGATURE_FIRST) as usize;
                fields.push(Field::input(
                    LIGATURE_RECT,
                    "",
                    self.doc.ligature(slot).unwrap_or_default(),
                    LIGATURE_MAX_LEN,
                    CommitAction::Ligature(slot),
                ));
            } else {
                fields.push(Field::placeholder());
            }
        }
        fields.extend(self.handler(idx).layout(self, idx));
        let max = max_field(tool);
        if fields.len() <= max {
            fields.resize_with(max + 1, Field::placeholder);
        }
        if let Some(w) = self.windows.get_mut(idx) {
            w.fields = fields;
            w.dirty = true;
        }
    }

    /// Repaints the whole window and puts `area` of it on screen.
    pub fn refresh(&mut self, idx: usize, area: Rect) {
        let Some(w) = self.windows.get_mut(idx) else {
            return;
        };
        let mut surface = std::mem::take(&mut w.surface);
        if surface.width() >= 8 && surface.height() >= 8 {
            self.render(idx, &mut surface);
        }
        if let Some(w) = self.windows.get_mut(idx) {
            w.surface = surface;
            w.dirty = false;
            self.res.driver.flush(w.handle, &w.surface, area);
        }
    }

    pub fn redraw(&mut self, idx: usize) {
        if let Some(area) = self.windows.get(idx).map(|w| w.surface.bounds()) {
            self.refresh(idx, area);
        }
    }

    fn render(&self, idx: usize, surface: &mut Surface) {
        let Some(w) = self.windows.get(idx) else {
            return;
        };
        let mut p = Painter::new(surface, self.res.font.as_ref(), &self.palette);
        let all = Rect::new(0, 0, p.width(), p.height());
        p.fill(all, ThemeRole::Bg);
        if w.help {
            view::help(&mut p, w.kind, w.tool);
            return;
        }
        view::toolbar(self, idx, w, &mut p);
        self.handler(idx).render(self, idx, &mut p);
        view::status_bar(self, w, &mut p, false);
    }

    /// Repaints and flushes only the status bar, showing the hover status
    /// if there is one.
    pub fn paint_status(&mut self, idx: usize) {
        let Some(w) = self.windows.get_mut(idx) else {
            return;
        };
        let mut surface = std::mem::take(&mut w.surface);
        if let Some(w) = self.windows.get(idx) {
            let mut p = Painter::new(&mut surface, self.res.font.as_ref(), &self.palette);
            view::status_bar(self, w, &mut p, true);
        }
        if let Some(w) = self.windows.get_mut(idx) {
            w.surface = surface;
            let r = w.status_rect();
            self.res.driver.flush(w.handle, &w.surface, r);
        }
    }

    /// Surface reallocation after the native window changed size.
    pub fn resize_window(&mut self, idx: usize, width: u32, height: u32) -> Result<()> {
        let surface = Surface::new(Size::new(width, height), self.palette.get(ThemeRole::Bg))?;
        let Some(w) = self.windows.get_mut(idx) else {
            return Ok(());
        };
        w.surface = surface;
        if idx > 0 && width > 0 && height > 0 {
            self.glyph_size = Size::new(width, height);
        }
        self.relayout(idx);
        self.redraw(idx);
        Ok(())
    }

    /// Commits the pending edit, if any, to wherever its field stores data.
    pub fn commit_edit(&mut self) {
        let Some(ed) = self.editor.take() else {
            return;
        };
        let target = ed.target();
        match ed.finish() {
            Committed::Range { end, value, text } => {
                log::debug!("range {} = {text}", if end { "end" } else { "start" });
                if end {
                    self.range.1 = value;
                } else {
                    self.range.0 = value;
                }
            }
            Committed::Property(p, text) => {
                if self.doc.property(p) != text {
                    self.doc.set_property(p, &text);
                    self.modified = true;
                }
            }
            Committed::Ligature(n, text) => {
                if self.doc.ligature(n).unwrap_or_default() != text {
                    self.doc.set_ligature(n, &text);
                    self.modified = true;
                }
            }
            Committed::Path(text) => self.path_input = text,
            Committed::Nothing => {}
        }
        self.relayout(target.window);
    }

    /// Moves focus and starts editing when the new field is a text input.
    pub fn set_focus(&mut self, idx: usize, field: Option<usize>) {
        self.commit_edit();
        let Some(w) = self.windows.get_mut(idx) else {
            return;
        };
        w.field = field;
        self.relayout(idx);
        self.start_edit(idx);
    }

    fn start_edit(&mut self, idx: usize) {
        let Some(w) = self.windows.get(idx) else {
            return;
        };
        let (Some(f), Some(field)) = (w.field, w.focused()) else {
            return;
        };
        if let FieldKind::Input {
            text,
            max_len,
            action,
            ..
        } = &field.kind
        {
            let target = FieldRef { window: idx, field: f };
            self.editor = Some(InputEditor::new(text, *max_len, *action, target));
        }
    }

    /// The editor, when it edits a field of window `idx`.
    pub fn editing(&self, idx: usize) -> Option<&InputEditor> {
        self.editor.as_ref().filter(|e| e.target().window == idx)
    }

    pub fn select_tool(&mut self, idx: usize, tool: Tool) {
        self.commit_edit();
        let Some(w) = self.windows.get_mut(idx) else {
            return;
        };
        log::debug!("window {idx}: tool {tool:?}");
        w.tool = Some(tool);
        w.field = None;
        w.scroll = 0;
        self.sel.reset();
        self.pending_icon = None;
        self.relayout(idx);
        self.redraw(idx);
    }

    pub fn set_cursor(&mut self, idx: usize, cursor: CursorKind) {
        if let Some(w) = self.windows.get(idx) {
            self.res.driver.set_cursor(w.handle, cursor);
        }
    }

    pub fn show_error(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        log::warn!("{msg}");
        self.error = Some(msg);
    }

    /// Progress hook for long document operations: a bar in the main
    /// window's status bar, repainted only when the percentage changes.
    pub fn progress(&mut self, p: Progress) {
        let mut bar = ProgressBar {
            windows: &mut self.windows,
            driver: &mut *self.res.driver,
            font: self.res.font.as_ref(),
            palette: &self.palette,
            last: &mut self.last_percent,
        };
        bar.report(p);
    }

    /// One status line about a code point: hex, UTF-8 bytes, decimal,
    /// the character and its name.
    pub fn char_info(&self, cp: u32) -> String {
        let mut buf = [0u8; 4];
        let enc = char::from_u32(cp).map(|c| c.encode_utf8(&mut buf).len());
        let bytes = buf
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<Vec<_>>()
            .join(" ");
        if is_ligature(cp) {
            let n = cp - LIGATURE_FIRST;
            let lig = self.doc.ligature(n as usize).unwrap_or_default();
            return format!("U+{cp:06X}  {bytes}  {cp}  {lig}  Ligature #{n}");
        }
        let ch = match enc {
            Some(_) if cp >= 0x20 => char::from_u32(cp).map(String::from).unwrap_or_default(),
            _ => String::new(),
        };
        let name = self
            .res
            .names
            .name(cp)
            .map(|n| n.into_owned())
            .unwrap_or_else(|| "Undefined".to_owned());
        format!("U+{cp:06X}  {bytes}  {cp}  {ch}  {name}")
    }

    /// Loads `path` as the new document. Failures go to the status bar.
    pub fn load(&mut self, path: &Path) -> bool {
        self.set_cursor(0, CursorKind::Loading);
        let result = {
            let Context {
                store,
                windows,
                res,
                palette,
                last_percent,
                ..
            } = &mut *self;
            let mut bar = ProgressBar {
                windows,
                driver: &mut *res.driver,
                font: res.font.as_ref(),
                palette,
                last: last_percent,
            };
            store.load(path, &mut |p| bar.report(p))
        };
        self.last_percent = None;
        self.set_cursor(0, CursorKind::Pointer);
        match result {
            Ok(doc) => {
                self.doc = doc;
                self.filename = Some(path.to_path_buf());
                self.modified = false;
                self.update_titles();
                self.refresh_all();
                true
            }
            Err(e) => {
                self.show_error(format!("Unable to load {}: {e}", path.display()));
                false
            }
        }
    }

    /// Saves under the current name; without one, asks for a name.
    pub fn save(&mut self) -> bool {
        match self.filename.clone() {
            Some(path) => self.save_to(&path),
            None => {
                self.save_as();
                false
            }
        }
    }

    pub fn save_to(&mut self, path: &Path) -> bool {
        self.set_cursor(0, CursorKind::Loading);
        let result = {
            let Context {
                store,
                doc,
                windows,
                res,
                palette,
                last_percent,
                ..
            } = &mut *self;
            let mut bar = ProgressBar {
                windows,
                driver: &mut *res.driver,
                font: res.font.as_ref(),
                palette,
                last: last_percent,
            };
            store.save(doc, path, &mut |p| bar.report(p))
        };
        self.last_percent = None;
        self.set_cursor(0, CursorKind::Pointer);
        match result {
            Ok(()) => {
                self.filename = Some(path.to_path_buf());
                self.modified = false;
                self.update_titles();
                true
            }
            Err(e) => {
                self.show_error(format!("Unable to save {}: {e}", path.display()));
                false
            }
        }
    }

    /// Switches the main window to the Save tool with the path field
    /// focused.
    pub fn save_as(&mut self) {
        self.commit_edit();
        self.path_input = match &self.filename {
            Some(p) => p.to_string_lossy().into_owned(),
            None => "untitled.json".to_owned(),
        };
        self.select_tool(0, Tool::Main(MainTool::Save));
        self.set_focus(0, Some(crate::tools::fileops::PATH_FIELD));
        self.redraw(0);
        if let Some(h) = self.windows.get(0).map(|w| w.handle) {
            self.res.driver.focus(h);
        }
    }

    /// Starts over with an empty document.
    pub fn new_document(&mut self, width: u32, height: u32) {
        for i in self.windows.indices() {
            if i != 0 {
                self.close_window(i);
            }
        }
        self.doc = FontDocument::new(width, height);
        self.filename = None;
        self.modified = false;
        self.range = (0, 0xFF);
        self.update_titles();
        self.select_tool(0, Tool::Main(MainTool::Glyphs));
    }

    /// After a load: glyph windows showing nothing are closed, the rest
    /// start over with a fresh history.
    pub fn refresh_all(&mut self) {
        for idx in self.windows.indices() {
            let Some(kind) = self.windows.get(idx).map(|w| w.kind) else {
                continue;
            };
            if let WindowKind::Glyph(cp) = kind {
                if self.doc.glyph(cp).is_none_or(GlyphEntry::is_blank) {
                    self.close_window(idx);
                    continue;
                }
            }
            if let Some(w) = self.windows.get_mut(idx) {
                w.history.clear();
                if idx > 0 {
                    w.zoom = GLYPH_ZOOM;
                    w.scroll = 0;
                }
            }
            self.relayout(idx);
            self.redraw(idx);
        }
    }

    /// Opens the main window and the document given on the command line.
    /// Without a document, or when it cannot be loaded, the About page is
    /// shown.
    pub fn startup(&mut self, file: Option<&Path>) -> Result<()> {
        self.open_window(WindowKind::Main)?;
        self.set_cursor(0, CursorKind::Loading);
        let loaded = match file {
            Some(f) => self.load(f),
            None => false,
        };
        let tool = if loaded {
            MainTool::Glyphs
        } else {
            MainTool::About
        };
        if let Some(w) = self.windows.get_mut(0) {
            w.tool = Some(Tool::Main(tool));
        }
        self.set_cursor(0, CursorKind::Pointer);
        self.relayout(0);
        self.redraw(0);
        Ok(())
    }

    /// Consumes the context and releases the process-wide resources.
    pub fn shutdown(self) {
        self.res.shutdown();
    }
}
