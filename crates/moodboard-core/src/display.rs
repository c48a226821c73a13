//! The seam between composed boards and whatever draws them.

use crate::error::Result;
use crate::pipeline::Board;
use crate::view::ViewTransform;
use image::RgbaImage;
use image::imageops::{self, FilterType};

/// Receives composed boards on the foreground side.
///
/// Implementations decide how to draw; by convention only
/// [`Board::primary`] is shown when several canvases were produced.
pub trait DisplaySink {
    fn present(&mut self, board: &Board, view: &ViewTransform) -> Result<()>;

    /// Called when there is nothing to show (empty catalog).
    fn clear(&mut self, _view: &ViewTransform) -> Result<()> {
        Ok(())
    }
}

/// Draw `canvas` into a transparent `viewport_w`x`viewport_h` image, scaled by
/// the view's zoom factor and offset by its origin.
///
/// Only the part of the canvas that lands inside the viewport is cropped and
/// resized, so the work is bounded by the viewport size, not by the zoom.
pub fn render_viewport(
    canvas: &RgbaImage,
    view: &ViewTransform,
    viewport_w: u32,
    viewport_h: u32,
) -> RgbaImage {
    let mut out = RgbaImage::new(viewport_w, viewport_h);
    let (w, h) = canvas.dimensions();
    if w == 0 || h == 0 || viewport_w == 0 || viewport_h == 0 {
        return out;
    }
    let zoom = view.zoom_factor() as f64;
    let (ox, oy) = view.origin();
    let (ox, oy) = (ox as f64, oy as f64);
    let (x0, x1) = visible_span(ox, zoom, viewport_w, w);
    let (y0, y1) = visible_span(oy, zoom, viewport_h, h);
    if x0 >= x1 || y0 >= y1 {
        return out;
    }

    let crop = imageops::crop_imm(canvas, x0, y0, x1 - x0, y1 - y0).to_image();
    let sw = (((x1 - x0) as f64 * zoom) as u32).max(1);
    let sh = (((y1 - y0) as f64 * zoom) as u32).max(1);
    let dx = (ox + x0 as f64 * zoom).floor() as i64;
    let dy = (oy + y0 as f64 * zoom).floor() as i64;
    if (sw, sh) == crop.dimensions() {
        imageops::replace(&mut out, &crop, dx, dy);
    } else {
        let scaled = imageops::resize(&crop, sw, sh, FilterType::Lanczos3);
        imageops::replace(&mut out, &scaled, dx, dy);
    }
    out
}

/// Canvas pixel range `[start, end)` along one axis that maps into `[0, viewport)`.
fn visible_span(origin: f64, zoom: f64, viewport: u32, extent: u32) -> (u32, u32) {
    let start = (-origin / zoom).floor().clamp(0.0, extent as f64) as u32;
    let end = ((viewport as f64 - origin) / zoom)
        .ceil()
        .clamp(0.0, extent as f64) as u32;
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn identity_view_copies_pixels() {
        let canvas = RgbaImage::from_pixel(4, 4, Rgba([9, 8, 7, 6]));
        let out = render_viewport(&canvas, &ViewTransform::new(), 8, 8);
        assert_eq!(*out.get_pixel(3, 3), Rgba([9, 8, 7, 6]));
        assert_eq!(*out.get_pixel(4, 4), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn pan_and_zoom_move_the_canvas() {
        let canvas = RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 255]));
        let mut view = ViewTransform::new();
        view.set_zoom(2.0);
        view.pan(5.0, -3.0);
        let out = render_viewport(&canvas, &view, 40, 40);
        assert_eq!(out.get_pixel(4, 0)[3], 0);
        assert_eq!(out.get_pixel(5, 0)[3], 255);
        assert_eq!(out.get_pixel(24, 16)[3], 255);
        assert_eq!(out.get_pixel(25, 17)[3], 0);
    }

    #[test]
    fn deep_zoom_renders_within_viewport() {
        let mut canvas = RgbaImage::from_pixel(64, 64, Rgba([0, 0, 255, 255]));
        canvas.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        let mut view = ViewTransform::new();
        for _ in 0..200 {
            view.zoom_in();
        }
        let out = render_viewport(&canvas, &view, 32, 32);
        assert_eq!(out.dimensions(), (32, 32));
        assert_eq!(out.get_pixel(16, 16)[3], 255);
    }

    #[test]
    fn canvas_panned_out_of_view_leaves_viewport_empty() {
        let canvas = RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 255]));
        let mut view = ViewTransform::new();
        view.pan(-50.0, 0.0);
        let out = render_viewport(&canvas, &view, 20, 20);
        assert!(out.pixels().all(|p| p[3] == 0));
    }
}
