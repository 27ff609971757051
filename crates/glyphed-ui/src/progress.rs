use glyphed_core::*;

use crate::paint::{Painter, UiFont};

/// Paints document load/save progress into the main window's status bar.
///
/// Built from disjoint borrows of the context so that it can run while the
/// document and its store are borrowed by the operation being reported.
pub struct ProgressBar<'a> {
    pub windows: &'a mut WindowRegistry,
    pub driver: &'a mut dyn Driver,
    pub font: Option<&'a UiFont>,
    pub palette: &'a Palette,
    pub last: &'a mut Option<u32>,
}

impl ProgressBar<'_> {
    /// Repaints only when the rounded percentage changed since the last call.
    pub fn report(&mut self, p: Progress) {
        let pct = p.percent();
        if *self.last == Some(pct) {
            return;
        }
        *self.last = Some(pct);
        let Some(w) = self.windows.get_mut(0) else {
            return;
        };
        let r = w.status_rect();
        if r.w <= 0 || r.y < 0 {
            return;
        }
        {
            let mut painter = Painter::new(&mut w.surface, self.font, self.palette);
            paint(&mut painter, r, &p, pct);
        }
        self.driver.flush(w.handle, &w.surface, r);
    }
}

fn paint(painter: &mut Painter<'_>, r: Rect, p: &Progress, pct: u32) {
    painter.fill(r, ThemeRole::Dark);
    if p.total_steps > 0 {
        let w = r.w as i64 * p.step.min(p.total_steps) as i64 / p.total_steps as i64;
        painter.fill(Rect::new(r.x, r.y, w as i32, 3), ThemeRole::Selected);
    }
    let w = r.w as i64 * (p.current + 1).min(p.total + 1) as i64 / (p.total + 1) as i64;
    painter.fill(Rect::new(r.x, r.bottom() - 3, w as i32, 3), ThemeRole::Cursor);

    let label = if p.total_steps > 0 {
        format!("[ {} / {} ] {pct:3}%", p.step, p.total_steps)
    } else {
        format!("{pct:3}%")
    };
    let x = painter.text(r.x + 4, r.y + 2, &label, ThemeRole::Fg);
    if let Some(msg) = p.message {
        painter.text(x + 8, r.y + 2, msg, ThemeRole::Fg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(current: u64) -> Progress {
        Progress {
            step: 1,
            total_steps: 2,
            current,
            total: 99,
            message: Some("Loading"),
        }
    }

    #[test]
    fn repaints_only_on_percent_change() {
        let mut drv = HeadlessDriver::new();
        let handle = drv.create_window(100, 40).unwrap();
        let mut windows = WindowRegistry::new();
        let surface = Surface::new(Size::new(100, 40), Color::BLACK).unwrap();
        windows
            .insert(0, Window::new(handle, WindowKind::Main, surface))
            .unwrap();
        let palette = Palette::default();
        let mut last = None;
        let mut dyn_drv = drv.clone();
        let mut bar = ProgressBar {
            windows: &mut windows,
            driver: &mut dyn_drv,
            font: None,
            palette: &palette,
            last: &mut last,
        };
        bar.report(progress(0));
        bar.report(progress(0));
        bar.report(progress(49));
        assert_eq!(drv.count(|c| matches!(c, DriverCall::Flush(..))), 2);
        assert_eq!(last, Some(50));

        let w = windows.get(0).unwrap();
        // step bar: half of the width in the top rows of the status strip
        assert_eq!(w.surface.pixel(10, 22), Some(palette.get(ThemeRole::Selected)));
        assert_eq!(w.surface.pixel(90, 22), Some(palette.get(ThemeRole::Dark)));
    }
}
