use crate::packer::ShelfBin;
use image::RgbaImage;
use tracing::warn;

/// Copy `src` into `canvas` with its top-left at (dx, dy).
///
/// Channels are copied as-is, alpha included; pixels falling outside the
/// canvas are clipped.
pub fn blit_rgba(src: &RgbaImage, canvas: &mut RgbaImage, dx: u32, dy: u32) {
    let (cw, ch) = canvas.dimensions();
    let (sw, sh) = src.dimensions();
    let w = sw.min(cw.saturating_sub(dx));
    let h = sh.min(ch.saturating_sub(dy));
    for yy in 0..h {
        for xx in 0..w {
            canvas.put_pixel(dx + xx, dy + yy, *src.get_pixel(xx, yy));
        }
    }
}

/// Rasterize one bin into a canvas cropped to the bin's used extent.
///
/// Placement keys index into `images`. Returns `None` for an empty bin.
pub fn compose_page(bin: &ShelfBin<usize>, images: &[RgbaImage]) -> Option<RgbaImage> {
    if bin.is_empty() {
        return None;
    }
    let (w, h) = bin.used_extent();
    // RgbaImage::new is zero-filled, i.e. fully transparent.
    let mut canvas = RgbaImage::new(w, h);
    for placement in bin.placements() {
        match images.get(placement.key) {
            Some(src) => blit_rgba(src, &mut canvas, placement.frame.x, placement.frame.y),
            None => warn!(key = placement.key, "placement refers to a missing image"),
        }
    }
    Some(canvas)
}

/// Rasterize every non-empty bin, in bin order.
pub fn compose(bins: &[ShelfBin<usize>], images: &[RgbaImage]) -> Vec<RgbaImage> {
    bins.iter()
        .filter_map(|bin| compose_page(bin, images))
        .collect()
}
