use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Exclusive right edge (`x + w`).
    pub fn right_edge(&self) -> u32 {
        self.x + self.w
    }
    /// Exclusive bottom edge (`y + h`).
    pub fn bottom_edge(&self) -> u32 {
        self.y + self.h
    }
    pub fn area(&self) -> u64 {
        (self.w as u64) * (self.h as u64)
    }
    /// True when the two rectangles share at least one pixel.
    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.x >= other.right_edge()
            || other.x >= self.right_edge()
            || self.y >= other.bottom_edge()
            || other.y >= self.bottom_edge())
    }
    /// True if `r` lies fully inside `self`.
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x
            && r.y >= self.y
            && r.right_edge() <= self.right_edge()
            && r.bottom_edge() <= self.bottom_edge()
    }
}

/// Path and intrinsic pixel size of one catalog image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageDescriptor {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl ImageDescriptor {
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Top-left placement of one item inside a bin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Placement<K = usize> {
    /// Caller-supplied key (the pipeline uses the index into the loaded batch).
    pub key: K,
    /// Placed rectangle within the bin.
    pub frame: Rect,
}

/// Statistics about how well a batch filled its canvases.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct BoardStats {
    /// Number of non-empty bins (canvases).
    pub num_bins: usize,
    /// Number of placed images across all bins.
    pub num_placed: usize,
    /// Number of images dropped for exceeding canvas capacity.
    pub num_oversized: usize,
    /// Sum of the tight canvas areas.
    pub canvas_area: u64,
    /// Sum of the placed image areas.
    pub used_area: u64,
    /// used_area / canvas_area (0.0 to 1.0).
    pub occupancy: f64,
}

impl BoardStats {
    pub fn summary(&self) -> String {
        format!(
            "Canvases: {}, Images: {}, Dropped: {}, Occupancy: {:.2}%",
            self.num_bins,
            self.num_placed,
            self.num_oversized,
            self.occupancy * 100.0,
        )
    }

    pub fn wasted_area(&self) -> u64 {
        self.canvas_area.saturating_sub(self.used_area)
    }
}
