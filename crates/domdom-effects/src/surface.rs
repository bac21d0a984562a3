//! The shared render surface.
//!
//! A single RGB accumulation buffer in pixel space: one column per terminal
//! cell, two rows per terminal row. Effects draw additive light into it each
//! frame; the frontend rasterizes it with half-block glyphs so dots stay
//! crisp at the doubled vertical resolution.

use std::cell::RefCell;
use std::rc::Rc;

use domdom_core::{Rgb, Viewport};
use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
};

/// Channel level below which a pixel is treated as unlit.
const DARK: f32 = 0.02;

/// A drawable pixel buffer sized to the terminal.
#[derive(Debug, Clone)]
pub struct Surface {
    cols: u16,
    rows: u16,
    width: f32,
    height: f32,
    px: Vec<[f32; 3]>,
}

impl Surface {
    pub fn new(cols: u16, rows: u16) -> Self {
        // Keep the buffer in step with the floored viewport so a zero-sized
        // terminal never yields an empty pixel vec behind a 1x2 viewport.
        let cols = cols.max(1);
        let rows = rows.max(1);
        let vp = Viewport::from_cells(cols, rows);
        Self {
            cols,
            rows,
            width: vp.width,
            height: vp.height,
            px: vec![[0.0; 3]; cols as usize * rows as usize * 2],
        }
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }

    /// Reset every pixel to black.
    pub fn clear(&mut self) {
        self.px.fill([0.0; 3]);
    }

    /// Dim the whole buffer, leaving `keep` of the previous frame.
    ///
    /// This is how trail-style effects persist motion blur between frames.
    pub fn fade(&mut self, keep: f32) {
        let keep = keep.clamp(0.0, 1.0);
        for p in &mut self.px {
            p[0] *= keep;
            p[1] *= keep;
            p[2] *= keep;
        }
    }

    /// True when nothing has been drawn since the last clear.
    pub fn is_blank(&self) -> bool {
        self.px
            .iter()
            .all(|p| p[0] < DARK && p[1] < DARK && p[2] < DARK)
    }

    /// Add light at a single pixel. Out-of-bounds coordinates are ignored.
    pub fn point(&mut self, x: f32, y: f32, color: Rgb, alpha: f32) {
        if x < 0.0 || y < 0.0 || x >= self.width || y >= self.height {
            return;
        }
        let idx = y as usize * self.cols as usize + x as usize;
        let p = &mut self.px[idx];
        p[0] += color.r as f32 / 255.0 * alpha;
        p[1] += color.g as f32 / 255.0 * alpha;
        p[2] += color.b as f32 / 255.0 * alpha;
    }

    /// Filled circle with a soft falloff toward the rim.
    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgb, alpha: f32) {
        if radius < 0.75 {
            self.point(cx, cy, color, alpha);
            return;
        }
        let r = radius.ceil() as i32;
        for dy in -r..=r {
            for dx in -r..=r {
                let d2 = (dx * dx + dy * dy) as f32;
                if d2 <= radius * radius {
                    let falloff = 1.0 - (d2.sqrt() / radius) * 0.5;
                    self.point(
                        cx + dx as f32,
                        cy + dy as f32,
                        color,
                        alpha * falloff,
                    );
                }
            }
        }
    }

    /// Straight line segment, stepped at pixel resolution.
    pub fn line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgb, alpha: f32) {
        let dx = x1 - x0;
        let dy = y1 - y0;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0);
        for i in 0..=steps as u32 {
            let t = i as f32 / steps;
            self.point(x0 + dx * t, y0 + dy * t, color, alpha);
        }
    }

    /// Rasterize the buffer into half-block lines for ratatui.
    pub fn render_lines(&self) -> Vec<Line<'static>> {
        let cols = self.cols as usize;
        (0..self.rows as usize)
            .map(|row| {
                let spans: Vec<Span> = (0..cols)
                    .map(|col| {
                        let top = self.px[row * 2 * cols + col];
                        let bottom = self.px[(row * 2 + 1) * cols + col];
                        render_cell(top, bottom)
                    })
                    .collect();
                Line::from(spans)
            })
            .collect()
    }
}

fn channel(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0) as u8
}

fn render_cell(top: [f32; 3], bottom: [f32; 3]) -> Span<'static> {
    let top_lit = top.iter().any(|&c| c >= DARK);
    let bottom_lit = bottom.iter().any(|&c| c >= DARK);

    if !top_lit && !bottom_lit {
        // Leave the terminal background untouched behind unlit cells.
        return Span::raw(" ");
    }

    let fg = Color::Rgb(channel(top[0]), channel(top[1]), channel(top[2]));
    let mut style = Style::new().fg(fg);
    if bottom_lit {
        style = style.bg(Color::Rgb(
            channel(bottom[0]),
            channel(bottom[1]),
            channel(bottom[2]),
        ));
    }
    Span::styled("▀", style)
}

/// A clonable slot holding the surface, shared between the frontend (which
/// owns sizing) and whichever effect is currently running.
///
/// An empty slot models a host with no render target: effects decline to
/// start against it.
#[derive(Debug, Clone, Default)]
pub struct SurfaceHandle {
    slot: Rc<RefCell<Option<Surface>>>,
}

impl SurfaceHandle {
    /// A handle with no surface installed.
    pub fn detached() -> Self {
        Self::default()
    }

    /// A handle with a surface sized to the given terminal.
    pub fn sized(cols: u16, rows: u16) -> Self {
        let handle = Self::default();
        handle.install(Surface::new(cols, rows));
        handle
    }

    pub fn install(&self, surface: Surface) {
        *self.slot.borrow_mut() = Some(surface);
    }

    /// Replace the surface with a fresh buffer at the new size.
    pub fn resize(&self, cols: u16, rows: u16) {
        *self.slot.borrow_mut() = Some(Surface::new(cols, rows));
    }

    /// The surface's viewport, or `None` when no surface is installed.
    pub fn viewport(&self) -> Option<Viewport> {
        self.slot.borrow().as_ref().map(Surface::viewport)
    }

    /// Run `f` against the surface if one is installed.
    pub fn with<R>(&self, f: impl FnOnce(&mut Surface) -> R) -> Option<R> {
        self.slot.borrow_mut().as_mut().map(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_surface_is_blank() {
        let s = Surface::new(40, 12);
        assert!(s.is_blank());
        assert_eq!(s.viewport(), Viewport::new(40.0, 24.0));
    }

    #[test]
    fn point_then_clear() {
        let mut s = Surface::new(40, 12);
        s.point(5.0, 5.0, Rgb::new(255, 255, 255), 1.0);
        assert!(!s.is_blank());
        s.clear();
        assert!(s.is_blank());
    }

    #[test]
    fn out_of_bounds_draws_are_ignored() {
        let mut s = Surface::new(10, 10);
        s.point(-1.0, 5.0, Rgb::new(255, 0, 0), 1.0);
        s.point(10.0, 5.0, Rgb::new(255, 0, 0), 1.0);
        s.point(5.0, 20.0, Rgb::new(255, 0, 0), 1.0);
        assert!(s.is_blank());
    }

    #[test]
    fn fade_dims_toward_black() {
        let mut s = Surface::new(10, 10);
        s.point(2.0, 2.0, Rgb::new(255, 255, 255), 1.0);
        for _ in 0..200 {
            s.fade(0.9);
        }
        assert!(s.is_blank());
    }

    #[test]
    fn detached_handle_has_no_viewport() {
        let handle = SurfaceHandle::detached();
        assert_eq!(handle.viewport(), None);
        assert!(handle.with(|_| ()).is_none());
    }

    #[test]
    fn zero_sized_surface_still_has_a_drawable_cell() {
        let mut s = Surface::new(0, 0);
        assert_eq!(s.viewport(), Viewport::new(1.0, 2.0));
        s.point(0.0, 0.0, Rgb::new(255, 255, 255), 1.0);
        assert!(!s.is_blank());
    }

    #[test]
    fn sized_handle_resizes() {
        let handle = SurfaceHandle::sized(40, 12);
        assert_eq!(handle.viewport(), Some(Viewport::new(40.0, 24.0)));
        handle.resize(80, 24);
        assert_eq!(handle.viewport(), Some(Viewport::new(80.0, 48.0)));
    }
}
