//! The code point range shown by the glyph table: two inputs, plus a list
//! of common Unicode blocks that fill both at once.

use glyphed_core::error::Result;
use glyphed_core::*;

use super::{MAIN_FIRST, ROW_H, TOP, draw_fields, press, released, scroll_by, wheel};
use crate::context::Context;
use crate::handler::ToolHandler;
use crate::paint::Painter;

const START: usize = MAIN_FIRST;
const END: usize = MAIN_FIRST + 1;
const SHOW: usize = MAIN_FIRST + 2;
const INPUT_MAX: usize = 16;
const LIST_TOP: i32 = TOP + 3 * ROW_H + 8;

pub const BLOCKS: &[(u32, u32, &str)] = &[
    (0x0000, 0x007F, "Basic Latin"),
    (0x0080, 0x00FF, "Latin-1 Supplement"),
    (0x0100, 0x017F, "Latin Extended-A"),
    (0x0180, 0x024F, "Latin Extended-B"),
    (0x0250, 0x02AF, "IPA Extensions"),
    (0x0300, 0x036F, "Combining Diacritical Marks"),
    (0x0370, 0x03FF, "Greek and Coptic"),
    (0x0400, 0x04FF, "Cyrillic"),
    (0x0530, 0x058F, "Armenian"),
    (0x0590, 0x05FF, "Hebrew"),
    (0x0600, 0x06FF, "Arabic"),
    (0x0900, 0x097F, "Devanagari"),
    (0x0E00, 0x0E7F, "Thai"),
    (0x10A0, 0x10FF, "Georgian"),
    (0x1E00, 0x1EFF, "Latin Extended Additional"),
    (0x2000, 0x206F, "General Punctuation"),
    (0x20A0, 0x20CF, "Currency Symbols"),
    (0x2100, 0x214F, "Letterlike Symbols"),
    (0x2190, 0x21FF, "Arrows"),
    (0x2200, 0x22FF, "Mathematical Operators"),
    (0x2500, 0x257F, "Box Drawing"),
    (0x2580, 0x259F, "Block Elements"),
    (0x25A0, 0x25FF, "Geometric Shapes"),
    (0x2600, 0x26FF, "Miscellaneous Symbols"),
    (0x2800, 0x28FF, "Braille Patterns"),
    (0x3040, 0x309F, "Hiragana"),
    (0x30A0, 0x30FF, "Katakana"),
    (0x4E00, 0x9FFF, "CJK Unified Ideographs"),
    (0xAC00, 0xD7AF, "Hangul Syllables"),
    (0xE000, 0xF8FF, "Private Use Area"),
    (0xF000, 0xF8FF, "Ligatures"),
    (0x1F300, 0x1F5FF, "Misc Symbols and Pictographs"),
    (0x1F600, 0x1F64F, "Emoticons"),
];

fn visible_rows(height: i32) -> usize {
    ((height - LIST_TOP - 24) / ROW_H).max(1) as usize
}

fn block_at(ctx: &Context, idx: usize, at: Point) -> Option<usize> {
    let w = ctx.window(idx)?;
    if at.y < LIST_TOP || at.x < 16 || at.x >= 560 {
        return None;
    }
    let row = ((at.y - LIST_TOP) / ROW_H) as usize;
    if row >= visible_rows(w.height() as i32) {
        return None;
    }
    let n = w.scroll.max(0) as usize + row;
    (n < BLOCKS.len()).then_some(n)
}

pub struct Ranges;

impl ToolHandler for Ranges {
    fn layout(&self, ctx: &Context, _idx: usize) -> Vec<Field> {
        vec![
            Field::input(
                Rect::new(80, TOP, 120, 20),
                "From",
                format_codepoint(ctx.range.0),
                INPUT_MAX,
                CommitAction::RangeStart,
            ),
            Field::input(
                Rect::new(260, TOP, 120, 20),
                "To",
                format_codepoint(ctx.range.1),
                INPUT_MAX,
                CommitAction::RangeEnd,
            ),
            Field::button(Rect::new(400, TOP - 1, 80, 22), "Show"),
        ]
    }

    fn render(&self, ctx: &Context, idx: usize, p: &mut Painter<'_>) {
        let Some(w) = ctx.window(idx) else {
            return;
        };
        draw_fields(ctx, idx, w, p, MAIN_FIRST, |_| false);
        let first = w.scroll.max(0) as usize;
        for (row, &(lo, hi, name)) in BLOCKS
            .iter()
            .skip(first)
            .take(visible_rows(p.height()))
            .enumerate()
        {
            let r = Rect::new(16, LIST_TOP + row as i32 * ROW_H, 544, ROW_H - 4);
            let defined = ctx
                .doc
                .glyphs()
                .filter(|(cp, g)| (lo..=hi).contains(cp) && !g.is_blank())
                .count();
            let label = format!("U+{lo:04X}..U+{hi:04X}  {name}  ({defined}/{})", hi - lo + 1);
            p.item(r, &label, ctx.range == (lo, hi), false);
        }
    }

    fn on_btn_press(&self, ctx: &mut Context, idx: usize, at: Point, buttons: Buttons) -> Result<()> {
        match wheel(buttons) {
            0 => {
                if press(ctx, idx, at).is_none() {
                    ctx.sel.range = block_at(ctx, idx, at);
                }
            }
            d => {
                let rows = ctx.window(idx).map_or(1, |w| visible_rows(w.height() as i32));
                scroll_by(ctx, idx, d, BLOCKS.len(), rows);
            }
        }
        Ok(())
    }

    fn on_click(&self, ctx: &mut Context, idx: usize, at: Point) -> Result<()> {
        if released(ctx, idx, at) == Some(SHOW) {
            ctx.select_tool(idx, Tool::Main(MainTool::Glyphs));
            return Ok(());
        }
        let pressed = ctx.sel.range.take();
        if let Some(n) = block_at(ctx, idx, at).filter(|&n| pressed == Some(n)) {
            let (lo, hi, name) = BLOCKS[n];
            log::debug!("range set to {name}");
            ctx.range = (lo, hi);
        }
        Ok(())
    }

    fn on_key(&self, ctx: &mut Context, idx: usize, key: Key, _: Modifiers) -> Result<()> {
        let rows = ctx.window(idx).map_or(1, |w| visible_rows(w.height() as i32));
        let d = match key {
            Key::ArrowUp => -1,
            Key::ArrowDown => 1,
            Key::PageUp => -(rows as i32),
            Key::PageDown => rows as i32,
            _ => return Ok(()),
        };
        scroll_by(ctx, idx, d, BLOCKS.len(), rows);
        Ok(())
    }

    fn on_enter(&self, ctx: &mut Context, idx: usize) -> Result<()> {
        if matches!(super::focused(ctx, idx), Some(SHOW) | None) {
            ctx.select_tool(idx, Tool::Main(MainTool::Glyphs));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{click, headless_context, key};

    #[test]
    fn start_field_commits_canonical_codepoint() {
        let mut ctx = headless_context(Vec::new());
        ctx.startup(None).unwrap();
        ctx.select_tool(0, Tool::Main(MainTool::Ranges));
        ctx.set_focus(0, Some(START));
        for _ in 0..8 {
            key(&mut ctx, 0, Key::Backspace, Modifiers::empty());
        }
        key(&mut ctx, 0, Key::Character('6'), Modifiers::empty());
        key(&mut ctx, 0, Key::Character('5'), Modifiers::empty());
        key(&mut ctx, 0, Key::Enter, Modifiers::empty());
        assert_eq!(ctx.range.0, 0x36);
        let w = ctx.window(0).unwrap();
        match &w.fields[START].kind {
            FieldKind::Input { text, .. } => assert_eq!(text, "U+36"),
            other => panic!("unexpected field {other:?}"),
        }
        // Enter moved on to the end field
        assert_eq!(w.field, Some(END));
    }

    #[test]
    fn clicking_a_block_selects_its_range() {
        let mut ctx = headless_context(Vec::new());
        ctx.startup(None).unwrap();
        ctx.select_tool(0, Tool::Main(MainTool::Ranges));
        click(&mut ctx, 0, Point::new(40, LIST_TOP + ROW_H + 4));
        assert_eq!(ctx.range, (0x80, 0xFF));
    }
}
