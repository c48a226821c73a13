use serde::{Deserialize, Serialize};

/// Multiplicative step applied per zoom notch.
pub const ZOOM_STEP: f32 = 1.1;
/// Zoom factor bounds; `set_zoom` clamps into this range.
pub const MIN_ZOOM: f32 = 1.0 / 64.0;
pub const MAX_ZOOM: f32 = 64.0;
/// Largest side `scaled_size` reports, in pixels.
pub const MAX_SCALED_SIDE: u32 = 16384;

/// Zoom and pan applied by a display sink when it draws a composed board.
///
/// This type never touches pixels; see [`crate::display::render_viewport`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    zoom_factor: f32,
    origin_x: f32,
    origin_y: f32,
    #[serde(skip)]
    drag_anchor: Option<(f32, f32)>,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            zoom_factor: 1.0,
            origin_x: 0.0,
            origin_y: 0.0,
            drag_anchor: None,
        }
    }
}

impl ViewTransform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zoom_factor(&self) -> f32 {
        self.zoom_factor
    }

    pub fn origin(&self) -> (f32, f32) {
        (self.origin_x, self.origin_y)
    }

    /// Zoom one step in (positive `delta`) or out (negative). Zero is a no-op.
    pub fn zoom(&mut self, delta: f32) {
        if delta > 0.0 {
            self.zoom_in();
        } else if delta < 0.0 {
            self.zoom_out();
        }
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom_factor * ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom_factor / ZOOM_STEP);
    }

    /// Set the zoom factor, clamped to [`MIN_ZOOM`, `MAX_ZOOM`].
    /// Non-finite or non-positive values are ignored and return `false`.
    pub fn set_zoom(&mut self, zoom: f32) -> bool {
        if zoom.is_finite() && zoom > 0.0 {
            self.zoom_factor = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
            true
        } else {
            false
        }
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        if dx.is_finite() && dy.is_finite() {
            self.origin_x += dx;
            self.origin_y += dy;
        }
    }

    /// Start a drag gesture at pointer position (x, y).
    pub fn begin_drag(&mut self, x: f32, y: f32) {
        self.drag_anchor = Some((x, y));
    }

    /// Move the drag pointer; pans by the delta since the last position.
    pub fn drag_to(&mut self, x: f32, y: f32) {
        if let Some((ax, ay)) = self.drag_anchor {
            self.pan(x - ax, y - ay);
            self.drag_anchor = Some((x, y));
        }
    }

    pub fn end_drag(&mut self) {
        self.drag_anchor = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    /// Back to identity: zoom 1, origin (0, 0).
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Displayed size of a `w`x`h` canvas under the current zoom, each side
    /// between 1 and [`MAX_SCALED_SIDE`].
    pub fn scaled_size(&self, w: u32, h: u32) -> (u32, u32) {
        let zoom = self.zoom_factor as f64;
        let side = |v: u32| (v as f64 * zoom).clamp(1.0, MAX_SCALED_SIDE as f64) as u32;
        (side(w), side(h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_in_then_out_round_trips() {
        let mut v = ViewTransform::new();
        v.zoom(1.0);
        assert!((v.zoom_factor() - 1.1).abs() < 1e-6);
        v.zoom(-3.0);
        assert!((v.zoom_factor() - 1.0).abs() < 1e-6);
        v.zoom(0.0);
        assert!((v.zoom_factor() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_degenerate_zoom() {
        let mut v = ViewTransform::new();
        assert!(!v.set_zoom(0.0));
        assert!(!v.set_zoom(f32::NAN));
        assert!(!v.set_zoom(f32::INFINITY));
        assert_eq!(v.zoom_factor(), 1.0);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut v = ViewTransform::new();
        for _ in 0..500 {
            v.zoom_in();
        }
        assert_eq!(v.zoom_factor(), MAX_ZOOM);
        assert_eq!(v.scaled_size(4096, 1), (MAX_SCALED_SIDE, 64));
        for _ in 0..1000 {
            v.zoom_out();
        }
        assert_eq!(v.zoom_factor(), MIN_ZOOM);
        assert_eq!(v.scaled_size(10, 10), (1, 1));
    }

    #[test]
    fn drag_pans_by_pointer_delta() {
        let mut v = ViewTransform::new();
        v.drag_to(50.0, 50.0);
        assert_eq!(v.origin(), (0.0, 0.0));
        v.begin_drag(10.0, 10.0);
        v.drag_to(15.0, 8.0);
        v.drag_to(20.0, 8.0);
        v.end_drag();
        v.drag_to(100.0, 100.0);
        assert_eq!(v.origin(), (10.0, -2.0));
    }
}
