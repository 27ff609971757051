//! The single inline text editor.
//!
//! Whichever input field has focus is edited through one [`InputEditor`]
//! that holds a copy of the field's text. The copy is written back through
//! its [`CommitAction`] when editing finishes.

use crate::document::{LIGATURE_SLOTS, MAX_CODEPOINT, Property};
use crate::input::Key;

/// What happens with the text when the field is committed. Fields declare it
/// with a numeric id: 1 and 2 are the range endpoints, 3..=8 the document
/// properties, 9 the file path, 1024 and up the ligature name table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CommitAction {
    #[default]
    None,
    RangeStart,
    RangeEnd,
    Property(Property),
    Path,
    Ligature(usize),
}

pub const LIGATURE_ACTION_BASE: u16 = 1024;

impl From<u16> for CommitAction {
    fn from(id: u16) -> Self {
        match id {
            1 => CommitAction::RangeStart,
            2 => CommitAction::RangeEnd,
            3..=8 => CommitAction::Property(Property::ALL[id as usize - 3]),
            9 => CommitAction::Path,
            n if n >= LIGATURE_ACTION_BASE
                && ((n - LIGATURE_ACTION_BASE) as usize) < LIGATURE_SLOTS =>
            {
                CommitAction::Ligature((n - LIGATURE_ACTION_BASE) as usize)
            }
            _ => CommitAction::None,
        }
    }
}

impl CommitAction {
    pub fn id(self) -> u16 {
        match self {
            CommitAction::None => 0,
            CommitAction::RangeStart => 1,
            CommitAction::RangeEnd => 2,
            CommitAction::Property(p) => 3 + p as u16,
            CommitAction::Path => 9,
            CommitAction::Ligature(n) => LIGATURE_ACTION_BASE + n as u16,
        }
    }
}

/// Which field of which window the editor works on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FieldRef {
    pub window: usize,
    pub field: usize,
}

/// The outcome of committing an editor, for the owner of the data to apply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Committed {
    /// A range endpoint, already clamped, with its canonical text.
    Range { end: bool, value: u32, text: String },
    Property(Property, String),
    Ligature(usize, String),
    Path(String),
    Nothing,
}

fn is_continuation(b: u8) -> bool {
    b & 0xC0 == 0x80
}

/// Start of the code point before `pos`.
fn prev_boundary(buf: &[u8], mut pos: usize) -> usize {
    while pos > 0 {
        pos -= 1;
        if !is_continuation(buf[pos]) {
            break;
        }
    }
    pos
}

/// Start of the code point after the one at `pos`.
fn next_boundary(buf: &[u8], mut pos: usize) -> usize {
    while pos < buf.len() {
        pos += 1;
        if pos == buf.len() || !is_continuation(buf[pos]) {
            break;
        }
    }
    pos
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputEditor {
    buf: Vec<u8>,
    cursor: usize,
    max_len: usize,
    action: CommitAction,
    target: FieldRef,
}

impl InputEditor {
    /// Starts editing a copy of `text` with the cursor at the end.
    pub fn new(text: &str, max_len: usize, action: CommitAction, target: FieldRef) -> Self {
        Self {
            buf: text.as_bytes().to_vec(),
            cursor: text.len(),
            max_len,
            action,
            target,
        }
    }

    pub fn text(&self) -> &str {
        std::str::from_utf8(&self.buf).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn action(&self) -> CommitAction {
        self.action
    }

    pub fn target(&self) -> FieldRef {
        self.target
    }

    pub fn left(&mut self) {
        self.cursor = prev_boundary(&self.buf, self.cursor);
    }

    pub fn right(&mut self) {
        self.cursor = next_boundary(&self.buf, self.cursor);
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.buf.len();
    }

    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let start = prev_boundary(&self.buf, self.cursor);
        self.buf.drain(start..self.cursor);
        self.cursor = start;
        true
    }

    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.buf.len() {
            return false;
        }
        let end = next_boundary(&self.buf, self.cursor);
        self.buf.drain(self.cursor..end);
        true
    }

    /// Inserts `s` at the cursor unless the text would grow past `max_len`,
    /// in which case nothing changes.
    pub fn insert(&mut self, s: &str) -> bool {
        if s.is_empty() || self.buf.len() + s.len() > self.max_len {
            return false;
        }
        let at = self.cursor;
        self.buf.splice(at..at, s.bytes());
        self.cursor += s.len();
        true
    }

    /// Applies an editing key. Returns whether the key belonged to the editor.
    pub fn handle_key(&mut self, key: Key) -> bool {
        match key {
            Key::ArrowLeft => self.left(),
            Key::ArrowRight => self.right(),
            Key::Home | Key::ArrowUp => self.home(),
            Key::End | Key::ArrowDown => self.end(),
            Key::Backspace => {
                self.backspace();
            }
            Key::Delete => {
                self.delete();
            }
            k => match k.printable() {
                Some(c) => {
                    let mut tmp = [0u8; 4];
                    if !self.insert(c.encode_utf8(&mut tmp)) {
                        log::trace!("input: {c:?} rejected, field is full");
                    }
                }
                None => return false,
            },
        }
        true
    }

    /// Ends editing and reports what to store.
    pub fn finish(self) -> Committed {
        let text = self.text().to_owned();
        match self.action {
            CommitAction::RangeStart | CommitAction::RangeEnd => {
                let value = parse_codepoint(&text);
                Committed::Range {
                    end: self.action == CommitAction::RangeEnd,
                    value,
                    text: format_codepoint(value),
                }
            }
            CommitAction::Property(p) => Committed::Property(p, text),
            CommitAction::Ligature(n) => Committed::Ligature(n, text),
            CommitAction::Path => Committed::Path(text),
            CommitAction::None => Committed::Nothing,
        }
    }
}

/// `U+<hex>` (also `u+`, at most six digits) or the first character of the
/// text itself, clamped to the Unicode range. Empty text is 0.
pub fn parse_codepoint(text: &str) -> u32 {
    let v: u64 = match text.strip_prefix("U+").or_else(|| text.strip_prefix("u+")) {
        Some(hex) => hex
            .chars()
            .map_while(|c| c.to_digit(16))
            .take(6)
            .fold(0, |acc, d| acc * 16 + d as u64),
        None => text.chars().next().map_or(0, |c| c as u64),
    };
    v.min(MAX_CODEPOINT as u64) as u32
}

pub fn format_codepoint(cp: u32) -> String {
    format!("U+{cp:X}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const AT: FieldRef = FieldRef {
        window: 0,
        field: 4,
    };

    fn editor(text: &str, max: usize) -> InputEditor {
        InputEditor::new(text, max, CommitAction::None, AT)
    }

    #[test]
    fn insert_up_to_the_limit() {
        let mut e = editor("ab", 4);
        assert!(e.insert("cd"));
        assert_eq!(e.text(), "abcd");
        assert!(!e.insert("e"));
        e.handle_key(Key::Character('x'));
        assert_eq!(e.text(), "abcd");
    }

    #[test]
    fn multibyte_insert_respects_encoded_length() {
        let mut e = editor("abc", 4);
        assert!(!e.insert("é"));
        e.backspace();
        assert!(e.insert("é"));
        assert_eq!(e.text(), "abé");
    }

    #[test]
    fn cursor_moves_by_code_point() {
        let mut e = editor("aé€😀", 32);
        let mut stops = vec![e.cursor()];
        while e.cursor() > 0 {
            e.left();
            stops.push(e.cursor());
        }
        assert_eq!(stops, vec![10, 6, 3, 1, 0]);
        e.right();
        e.right();
        assert_eq!(e.cursor(), 3);
        e.left();
        e.left();
        e.left();
        assert_eq!(e.cursor(), 0);
        e.end();
        e.right();
        assert_eq!(e.cursor(), 10);
    }

    #[test]
    fn backspace_and_delete_remove_whole_code_points() {
        let mut e = editor("aé€", 32);
        e.left();
        assert!(e.backspace());
        assert_eq!(e.text(), "a€");
        assert_eq!(e.cursor(), 1);
        assert!(e.delete());
        assert_eq!(e.text(), "a");
        assert!(!e.delete());
        e.home();
        assert!(!e.backspace());
    }

    #[test]
    fn cursor_never_lands_inside_a_code_point() {
        let keys = [
            Key::ArrowLeft,
            Key::Character('ő'),
            Key::ArrowRight,
            Key::Backspace,
            Key::Character('字'),
            Key::ArrowLeft,
            Key::ArrowLeft,
            Key::Delete,
            Key::Character('x'),
            Key::Home,
            Key::ArrowRight,
            Key::Character('😀'),
            Key::End,
            Key::ArrowUp,
            Key::ArrowDown,
        ];
        let mut e = editor("ab€c", 24);
        for i in 0..500 {
            e.handle_key(keys[(i * 7 + i / 3) % keys.len()]);
            let c = e.cursor();
            assert!(c <= e.len());
            if c < e.len() {
                assert!(!is_continuation(e.text().as_bytes()[c]));
            }
            assert!(e.len() <= 24);
            assert!(std::str::from_utf8(e.text().as_bytes()).is_ok());
        }
    }

    #[test]
    fn control_characters_are_not_inserted() {
        let mut e = editor("", 8);
        assert!(!e.handle_key(Key::Character('\u{7}')));
        assert!(!e.handle_key(Key::Tab));
        assert!(e.is_empty());
    }

    #[test]
    fn range_commit_decodes_first_character() {
        let e = InputEditor::new("65", 8, CommitAction::RangeStart, AT);
        assert_eq!(
            e.finish(),
            Committed::Range {
                end: false,
                value: 0x36,
                text: "U+36".into()
            }
        );
    }

    #[test]
    fn codepoint_parsing() {
        assert_eq!(parse_codepoint("U+41"), 0x41);
        assert_eq!(parse_codepoint("u+1f600"), 0x1F600);
        assert_eq!(parse_codepoint("U+FFFFFFFF"), 0x10FFFF);
        assert_eq!(parse_codepoint("U+0000411"), 0x41);
        assert_eq!(parse_codepoint("U+"), 0);
        assert_eq!(parse_codepoint(""), 0);
        assert_eq!(parse_codepoint("é"), 0xE9);
        assert_eq!(format_codepoint(0x1F600), "U+1F600");
    }

    #[test]
    fn action_ids() {
        assert_eq!(CommitAction::from(1), CommitAction::RangeStart);
        assert_eq!(
            CommitAction::from(5),
            CommitAction::Property(Property::Subfamily)
        );
        assert_eq!(CommitAction::from(1024 + 0x8FF), CommitAction::Ligature(0x8FF));
        assert_eq!(CommitAction::from(1024 + 0x900), CommitAction::None);
        assert_eq!(CommitAction::from(10), CommitAction::None);
        for id in [1u16, 2, 3, 8, 9, 1024, 1500] {
            assert_eq!(CommitAction::from(id).id(), id);
        }
    }

    #[test]
    fn other_commits_carry_text_verbatim() {
        let e = InputEditor::new(" Sans ", 32, CommitAction::from(4), AT);
        assert_eq!(e.finish(), Committed::Property(Property::Family, " Sans ".into()));
        let e = InputEditor::new("fi", 32, CommitAction::Ligature(2), AT);
        assert_eq!(e.finish(), Committed::Ligature(2, "fi".into()));
        let e = InputEditor::new("x", 32, CommitAction::None, AT);
        assert_eq!(e.finish(), Committed::Nothing);
    }
}
