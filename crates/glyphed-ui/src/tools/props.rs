use glyphed_core::error::Result;
use glyphed_core::*;

use super::{MAIN_FIRST, TOP, column, draw_fields, press, released, wheel};
use crate::context::Context;
use crate::handler::ToolHandler;
use crate::paint::Painter;

const FIRST_METRIC: usize = MAIN_FIRST + Property::ALL.len();
const METRICS: [&str; 4] = ["Width", "Height", "Baseline", "Underline"];
const SANITIZE: usize = FIRST_METRIC + METRICS.len();
const PROP_MAX: usize = 255;

fn metric(doc: &FontDocument, n: usize) -> u32 {
    match n {
        0 => doc.width,
        1 => doc.height,
        2 => doc.baseline,
        _ => doc.underline,
    }
}

/// Adjusts a default metric; baseline and underline stay within the height.
fn adjust(doc: &mut FontDocument, n: usize, delta: i32) -> bool {
    let before = metric(doc, n);
    let v = before.saturating_add_signed(delta);
    match n {
        0 => doc.width = v.clamp(1, 255),
        1 => {
            doc.height = v.clamp(1, 255);
            doc.baseline = doc.baseline.min(doc.height);
            doc.underline = doc.underline.min(doc.height);
        }
        2 => doc.baseline = v.min(doc.height),
        _ => doc.underline = v.min(doc.height),
    }
    metric(doc, n) != before
}

pub struct Properties;

impl Properties {
    fn change(&self, ctx: &mut Context, field: usize, delta: i32) {
        if (FIRST_METRIC..SANITIZE).contains(&field)
            && adjust(&mut ctx.doc, field - FIRST_METRIC, delta)
        {
            ctx.modified = true;
        }
    }

    fn activate(&self, ctx: &mut Context, field: usize) {
        if field == SANITIZE {
            ctx.doc.sanitize();
            ctx.modified = true;
            ctx.status = Some("Font sanitized".to_owned());
            log::info!("document sanitized");
        }
    }
}

impl ToolHandler for Properties {
    fn layout(&self, ctx: &Context, _idx: usize) -> Vec<Field> {
        let mut fields: Vec<Field> = Property::ALL
            .iter()
            .enumerate()
            .map(|(n, &p)| {
                Field::input(
                    column(140, TOP, 420, n),
                    p.label(),
                    ctx.doc.property(p),
                    PROP_MAX,
                    CommitAction::Property(p),
                )
            })
            .collect();
        let base = Property::ALL.len();
        fields.extend(METRICS.iter().enumerate().map(|(n, label)| {
            Field::item(
                column(140, TOP + 8, 160, base + n),
                format!("{label}: {}", metric(&ctx.doc, n)),
            )
        }));
        fields.push(Field::button(
            column(140, TOP + 16, 120, base + METRICS.len()),
            "Sanitize",
        ));
        fields
    }

    fn render(&self, ctx: &Context, idx: usize, p: &mut Painter<'_>) {
        if let Some(w) = ctx.window(idx) {
            draw_fields(ctx, idx, w, p, MAIN_FIRST, |_| false);
        }
    }

    fn on_btn_press(&self, ctx: &mut Context, idx: usize, at: Point, buttons: Buttons) -> Result<()> {
        match (wheel(buttons), ctx.window(idx).and_then(|w| w.field_at(at))) {
            (0, _) => {
                press(ctx, idx, at);
            }
            // wheel up grows
            (d, Some(f)) => self.change(ctx, f, -d),
            _ => {}
        }
        Ok(())
    }

    fn on_click(&self, ctx: &mut Context, idx: usize, at: Point) -> Result<()> {
        if let Some(f) = released(ctx, idx, at) {
            self.activate(ctx, f);
        }
        Ok(())
    }

    fn on_key(&self, ctx: &mut Context, idx: usize, key: Key, _: Modifiers) -> Result<()> {
        let Some(f) = super::focused(ctx, idx) else {
            return Ok(());
        };
        match key {
            Key::ArrowLeft | Key::ArrowDown | Key::Character('-') => self.change(ctx, f, -1),
            Key::ArrowRight | Key::ArrowUp | Key::Character('+') => self.change(ctx, f, 1),
            _ => {}
        }
        Ok(())
    }

    fn on_enter(&self, ctx: &mut Context, idx: usize) -> Result<()> {
        if let Some(f) = super::focused(ctx, idx) {
            self.activate(ctx, f);
        }
        Ok(())
    }
}
