//! Measures: the glyph canvas with its metrics, point editing and undo.

use glyphed_core::error::Result;
use glyphed_core::*;

use super::{GLYPH_FIRST, column, draw_fields, edit_glyph, press, released, step_history, wheel};
use crate::context::Context;
use crate::handler::ToolHandler;
use crate::paint::Painter;

const METRICS: [&str; 5] = ["Width", "Height", "Adv X", "Adv Y", "Overlap"];
const BUTTONS: [&str; 9] = [
    "Zoom -", "Zoom +", "Undo", "Redo", "Left", "Right", "Up", "Down", "Clear",
];
const FIRST_BUTTON: usize = GLYPH_FIRST + METRICS.len();
const ZOOM_OUT: usize = FIRST_BUTTON;
const ZOOM_IN: usize = FIRST_BUTTON + 1;
const UNDO: usize = FIRST_BUTTON + 2;
const REDO: usize = FIRST_BUTTON + 3;
const SHIFT_LEFT: usize = FIRST_BUTTON + 4;
const SHIFT_DOWN: usize = FIRST_BUTTON + 7;
const CLEAR: usize = FIRST_BUTTON + 8;

const PANEL_W: i32 = 140;
const ORIGIN: Point = Point::new(12, 36);
const MAX_ZOOM: u32 = 16;
/// Foreground color index for new layers.
pub const FOREGROUND: u8 = 0xFE;

/// Screen pixels per glyph unit.
fn scale(zoom: u32) -> i32 {
    zoom.clamp(1, MAX_ZOOM) as i32 * 4
}

fn canvas(width: i32, height: i32) -> Rect {
    Rect::new(8, 32, width - PANEL_W - 16, height - 32 - 22)
}

fn metric(g: &GlyphEntry, n: usize) -> i32 {
    match n {
        0 => g.width as i32,
        1 => g.height as i32,
        2 => g.adv_x,
        3 => g.adv_y,
        _ => g.ovl_x,
    }
}

fn bump(g: &mut GlyphEntry, n: usize, d: i32) {
    match n {
        0 => g.width = g.width.saturating_add_signed(d).clamp(1, 255),
        1 => g.height = g.height.saturating_add_signed(d).clamp(1, 255),
        2 => g.adv_x = (g.adv_x + d).clamp(0, 255),
        3 => g.adv_y = (g.adv_y + d).clamp(0, 255),
        _ => g.ovl_x = (g.ovl_x + d).clamp(0, 63),
    }
}

/// Glyph unit under `at`, when `at` is on the canvas.
fn unit_at(ctx: &Context, idx: usize, at: Point) -> Option<Point> {
    let w = ctx.window(idx)?;
    if !canvas(w.width() as i32, w.height() as i32).contains(at) {
        return None;
    }
    let s = scale(w.zoom);
    Some(Point::new(
        (at.x - ORIGIN.x).div_euclid(s),
        (at.y - ORIGIN.y).div_euclid(s),
    ))
}

/// The layer points go to: the selected one, else the topmost.
fn target_layer(g: &mut GlyphEntry, selected: Option<usize>) -> usize {
    if g.layers.is_empty() {
        g.layers.push(Layer {
            kind: LayerKind::Contour,
            color: FOREGROUND,
            points: Vec::new(),
        });
    }
    selected
        .filter(|&l| l < g.layers.len())
        .unwrap_or(g.layers.len() - 1)
}

pub fn add_point(g: &mut GlyphEntry, layer: Option<usize>, p: Point) {
    let l = target_layer(g, layer);
    let layer = &mut g.layers[l];
    match layer.kind {
        LayerKind::Contour => layer.points.push(p),
        LayerKind::Bitmap | LayerKind::Pixmap => {
            if !layer.points.contains(&p) {
                layer.points.push(p);
            }
        }
    }
}

/// Removes the point closest to `p` on the target layer, if it is at most
/// one unit away.
pub fn remove_point(g: &mut GlyphEntry, layer: Option<usize>, p: Point) {
    if g.layers.is_empty() {
        return;
    }
    let l = target_layer(g, layer);
    let points = &mut g.layers[l].points;
    let near = points
        .iter()
        .enumerate()
        .map(|(i, q)| (i, (q.x - p.x).abs().max((q.y - p.y).abs())))
        .filter(|&(_, d)| d <= 1)
        .min_by_key(|&(_, d)| d)
        .map(|(i, _)| i);
    if let Some(i) = near {
        points.remove(i);
    }
}

fn shift(g: &mut GlyphEntry, dx: i32, dy: i32) {
    for p in g.layers.iter_mut().flat_map(|l| l.points.iter_mut()) {
        p.x += dx;
        p.y += dy;
    }
}

fn set_zoom(ctx: &mut Context, idx: usize, d: i32) {
    if let Some(w) = ctx.window_mut(idx) {
        w.zoom = w.zoom.saturating_add_signed(d).clamp(1, MAX_ZOOM);
    }
}

pub struct Coordinates;

impl Coordinates {
    fn activate(&self, ctx: &mut Context, idx: usize, field: usize) {
        match field {
            ZOOM_OUT => set_zoom(ctx, idx, -1),
            ZOOM_IN => set_zoom(ctx, idx, 1),
            UNDO => {
                step_history(ctx, idx, false);
            }
            REDO => {
                step_history(ctx, idx, true);
            }
            SHIFT_LEFT..=SHIFT_DOWN => {
                let (dx, dy) = [(-1, 0), (1, 0), (0, -1), (0, 1)][field - SHIFT_LEFT];
                edit_glyph(ctx, idx, |g| shift(g, dx, dy));
            }
            CLEAR => {
                edit_glyph(ctx, idx, |g| g.layers.clear());
            }
            _ => {}
        }
    }
}

impl ToolHandler for Coordinates {
    fn layout(&self, ctx: &Context, idx: usize) -> Vec<Field> {
        let Some(w) = ctx.window(idx) else {
            return Vec::new();
        };
        let g = w
            .codepoint()
            .and_then(|cp| ctx.doc.glyph(cp))
            .cloned()
            .unwrap_or_default();
        let x = w.width() as i32 - PANEL_W - 4;
        let mut fields: Vec<Field> = METRICS
            .iter()
            .enumerate()
            .map(|(n, label)| Field::item(column(x, 32, PANEL_W, n), format!("{label}: {}", metric(&g, n))))
            .collect();
        fields.extend(BUTTONS.iter().enumerate().map(|(n, label)| {
            Field::button(column(x, 40, PANEL_W, METRICS.len() + n), *label)
        }));
        fields
    }

    fn render(&self, ctx: &Context, idx: usize, p: &mut Painter<'_>) {
        let Some(w) = ctx.window(idx) else {
            return;
        };
        let area = canvas(p.width(), p.height());
        p.fill(area, ThemeRole::Darker);
        let g = w
            .codepoint()
            .and_then(|cp| ctx.doc.glyph(cp))
            .cloned()
            .unwrap_or_default();
        let s = scale(w.zoom);
        let (ox, oy) = (ORIGIN.x, ORIGIN.y);
        let (gw, gh) = (g.width as i32 * s, g.height as i32 * s);
        if s >= 8 {
            for u in 0..=g.width as i32 {
                p.fill(Rect::new(ox + u * s, oy, 1, gh).intersect(&area), ThemeRole::Grid);
            }
            for u in 0..=g.height as i32 {
                p.fill(Rect::new(ox, oy + u * s, gw, 1).intersect(&area), ThemeRole::Grid);
            }
        }
        for (units, role) in [
            (ctx.doc.baseline, ThemeRole::Baseline),
            (ctx.doc.underline, ThemeRole::Underline),
        ] {
            p.fill(Rect::new(area.x, oy + units as i32 * s, area.w, 1).intersect(&area), role);
        }
        p.fill(
            Rect::new(ox + g.adv_x * s, area.y, 1, area.h).intersect(&area),
            ThemeRole::Advance,
        );
        for (n, layer) in g.layers.iter().enumerate() {
            let selected = ctx.sel.layer.is_none_or(|l| l == n);
            for pt in &layer.points {
                let r = match layer.kind {
                    LayerKind::Contour => Rect::new(ox + pt.x * s - 2, oy + pt.y * s - 2, 5, 5),
                    _ => Rect::new(ox + pt.x * s, oy + pt.y * s, s, s),
                };
                let role = match (layer.kind, selected) {
                    (LayerKind::Contour, true) => ThemeRole::Point,
                    (LayerKind::Contour, false) => ThemeRole::Control,
                    _ => ThemeRole::Fg,
                };
                p.fill(r.intersect(&area), role);
            }
        }
        draw_fields(ctx, idx, w, p, GLYPH_FIRST, |_| false);
    }

    fn on_move(&self, ctx: &mut Context, idx: usize, at: Point) -> Result<()> {
        ctx.pos = unit_at(ctx, idx, at);
        if ctx.pos.is_some() {
            ctx.cursor = CursorKind::Cross;
        }
        Ok(())
    }

    fn on_btn_press(&self, ctx: &mut Context, idx: usize, at: Point, buttons: Buttons) -> Result<()> {
        match wheel(buttons) {
            0 => {}
            d => {
                set_zoom(ctx, idx, -d);
                return Ok(());
            }
        }
        let Some(u) = unit_at(ctx, idx, at) else {
            press(ctx, idx, at);
            return Ok(());
        };
        let layer = ctx.sel.layer;
        if buttons.contains(Buttons::RIGHT) {
            edit_glyph(ctx, idx, |g| remove_point(g, layer, u));
        } else if buttons.contains(Buttons::LEFT) {
            edit_glyph(ctx, idx, |g| add_point(g, layer, u));
        }
        Ok(())
    }

    fn on_click(&self, ctx: &mut Context, idx: usize, at: Point) -> Result<()> {
        if let Some(f) = released(ctx, idx, at) {
            self.activate(ctx, idx, f);
        }
        Ok(())
    }

    fn on_key(&self, ctx: &mut Context, idx: usize, key: Key, mods: Modifiers) -> Result<()> {
        let ctrl = mods.contains(Modifiers::CTRL);
        match key {
            Key::Character('z' | 'Z') if ctrl && mods.contains(Modifiers::SHIFT) => {
                self.activate(ctx, idx, REDO)
            }
            Key::Character('z' | 'Z') if ctrl => self.activate(ctx, idx, UNDO),
            Key::Character('y' | 'Y') if ctrl => self.activate(ctx, idx, REDO),
            Key::Character('+') => set_zoom(ctx, idx, 1),
            Key::Character('-') => set_zoom(ctx, idx, -1),
            Key::ArrowLeft | Key::ArrowRight | Key::ArrowUp | Key::ArrowDown => {
                let d = if matches!(key, Key::ArrowRight | Key::ArrowUp) { 1 } else { -1 };
                match super::focused(ctx, idx) {
                    Some(f) if (GLYPH_FIRST..FIRST_BUTTON).contains(&f) => {
                        edit_glyph(ctx, idx, |g| bump(g, f - GLYPH_FIRST, d));
                    }
                    _ => {}
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn on_enter(&self, ctx: &mut Context, idx: usize) -> Result<()> {
        if let Some(f) = super::focused(ctx, idx) {
            self.activate(ctx, idx, f);
        }
        Ok(())
    }
}
