use thiserror::Error;

use crate::{Color, Rect, Size};

#[derive(Clone, Copy, Debug, Error)]
#[error("cannot allocate a {width}x{height} surface")]
pub struct SurfaceError {
    pub width: u32,
    pub height: u32,
}

/// A window's in-memory pixel buffer (0xAARRGGBB, row-major, stride = width).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<u32>,
}

impl Surface {
    /// Allocates a surface filled with `bg`. Allocation failure is reported,
    /// not aborted on, so the caller can go through fatal-error reporting.
    pub fn new(size: Size, bg: Color) -> Result<Self, SurfaceError> {
        let err = SurfaceError {
            width: size.width,
            height: size.height,
        };
        let len = (size.width as usize)
            .checked_mul(size.height as usize)
            .ok_or(err)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|_| err)?;
        data.resize(len, bg.0);
        Ok(Self {
            width: size.width,
            height: size.height,
            data,
        })
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.size())
    }

    pub fn pixels(&self) -> &[u32] {
        &self.data
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(Color(self.data[y as usize * self.width as usize + x as usize]))
    }

    pub fn put(&mut self, x: i32, y: i32, c: Color) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let i = y as usize * self.width as usize + x as usize;
        self.data[i] = c.0;
    }

    /// Coverage-blended pixel, `a` in 0..=255.
    pub fn blend(&mut self, x: i32, y: i32, c: Color, a: u8) {
        if let Some(bg) = self.pixel(x, y) {
            self.put(x, y, c.blend(bg, a));
        }
    }

    pub fn fill(&mut self, c: Color) {
        self.data.fill(c.0);
    }

    pub fn fill_rect(&mut self, r: Rect, c: Color) {
        let r = r.intersect(&self.bounds());
        if r.is_empty() {
            return;
        }
        let stride = self.width as usize;
        for y in r.y..r.bottom() {
            let row = y as usize * stride;
            self.data[row + r.x as usize..row + r.right() as usize].fill(c.0);
        }
    }

    /// Raised/sunken box: top-left edge `light`, bottom-right edge `dark`.
    pub fn bevel(&mut self, r: Rect, light: Color, bg: Color, dark: Color) {
        if r.is_empty() {
            return;
        }
        self.fill_rect(r, bg);
        self.fill_rect(Rect::new(r.x, r.y, r.w, 1), light);
        self.fill_rect(Rect::new(r.x, r.y, 1, r.h), light);
        self.fill_rect(Rect::new(r.x, r.bottom() - 1, r.w, 1), dark);
        self.fill_rect(Rect::new(r.right() - 1, r.y, 1, r.h), dark);
    }

    /// Copies a `w`×`h` ARGB bitmap with alpha onto the surface at (x, y).
    pub fn blit(&mut self, x: i32, y: i32, w: u32, h: u32, bitmap: &[u32]) {
        for j in 0..h as i32 {
            for i in 0..w as i32 {
                let Some(&p) = bitmap.get((j as u32 * w + i as u32) as usize) else {
                    return;
                };
                let a = (p >> 24) as u8;
                if a != 0 {
                    self.blend(x + i, y + j, Color(p | 0xFF00_0000), a);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_surface_is_filled() {
        let s = Surface::new(Size::new(4, 3), Color(0xFF112233)).unwrap();
        assert_eq!(s.pixels().len(), 12);
        assert!(s.pixels().iter().all(|&p| p == 0xFF112233));
    }

    #[test]
    fn fill_rect_is_clipped() {
        let mut s = Surface::new(Size::new(4, 4), Color::BLACK).unwrap();
        s.fill_rect(Rect::new(2, 2, 10, 10), Color::WHITE);
        assert_eq!(s.pixel(3, 3), Some(Color::WHITE));
        assert_eq!(s.pixel(1, 1), Some(Color::BLACK));
        assert_eq!(s.pixel(4, 4), None);
        s.fill_rect(Rect::new(-5, -5, 2, 2), Color::WHITE);
        assert_eq!(s.pixel(0, 0), Some(Color::BLACK));
    }

    #[test]
    fn oversized_surface_is_an_error() {
        assert!(Surface::new(Size::new(u32::MAX, u32::MAX), Color::BLACK).is_err());
    }
}
