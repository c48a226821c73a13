use crate::model::{BoardStats, Placement, Rect};
use tracing::{debug, warn};

pub mod shelf;

pub use shelf::ShelfBin;

/// A packer places rectangles into one bin.
///
/// Implementations must ensure no overlaps and keep every placement inside the bin.
/// `pack` returns `None` if the rectangle cannot be placed in this bin.
pub trait Packer<K> {
    fn can_pack(&self, rect: &Rect) -> bool;
    fn pack(&mut self, key: K, rect: &Rect) -> Option<Placement<K>>;
}

/// One rectangle to pack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackItem<K = usize> {
    pub key: K,
    pub w: u32,
    pub h: u32,
}

impl<K> PackItem<K> {
    pub fn new(key: K, w: u32, h: u32) -> Self {
        Self { key, w, h }
    }
}

/// An item that does not fit into an empty bin and was left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OversizedItem<K = usize> {
    pub key: K,
    pub w: u32,
    pub h: u32,
}

/// Result of a packing pass.
#[derive(Debug, Clone)]
pub struct PackOutcome<K = usize> {
    /// Non-empty bins in creation order.
    pub bins: Vec<ShelfBin<K>>,
    /// Items that exceed the bin capacity on their own, in input order.
    pub oversized: Vec<OversizedItem<K>>,
    pub bin_width: u32,
    pub bin_height: u32,
}

impl<K> PackOutcome<K> {
    pub fn placed(&self) -> impl Iterator<Item = &Placement<K>> {
        self.bins.iter().flat_map(|b| b.placements().iter())
    }

    pub fn num_placed(&self) -> usize {
        self.bins.iter().map(|b| b.placements().len()).sum()
    }

    pub fn stats(&self) -> BoardStats {
        let mut canvas_area = 0u64;
        let mut used_area = 0u64;
        for bin in &self.bins {
            let (w, h) = bin.used_extent();
            canvas_area += (w as u64) * (h as u64);
            used_area += bin.placements().iter().map(|p| p.frame.area()).sum::<u64>();
        }
        let occupancy = if canvas_area > 0 {
            used_area as f64 / canvas_area as f64
        } else {
            0.0
        };
        BoardStats {
            num_bins: self.bins.len(),
            num_placed: self.num_placed(),
            num_oversized: self.oversized.len(),
            canvas_area,
            used_area,
            occupancy,
        }
    }
}

/// Greedy first-fit shelf packing.
///
/// Items are visited in input order; each goes into the first existing bin that
/// accepts it, otherwise into a freshly opened bin of `bin_width`x`bin_height`.
/// Items larger than an empty bin are reported in [`PackOutcome::oversized`].
pub fn pack<K, I>(items: I, bin_width: u32, bin_height: u32) -> PackOutcome<K>
where
    K: Clone + std::fmt::Debug,
    I: IntoIterator<Item = PackItem<K>>,
{
    let mut bins: Vec<ShelfBin<K>> = Vec::new();
    let mut oversized = Vec::new();

    for item in items {
        let rect = Rect::new(0, 0, item.w, item.h);
        if item.w == 0 || item.h == 0 || item.w > bin_width || item.h > bin_height {
            warn!(
                key = ?item.key,
                w = item.w,
                h = item.h,
                bin_width,
                bin_height,
                "image does not fit an empty canvas; dropped"
            );
            oversized.push(OversizedItem {
                key: item.key,
                w: item.w,
                h: item.h,
            });
            continue;
        }
        let target = bins.iter().position(|b| b.can_pack(&rect));
        let idx = match target {
            Some(idx) => idx,
            None => {
                bins.push(ShelfBin::new(bin_width, bin_height));
                bins.len() - 1
            }
        };
        // A fresh bin always accepts an item that passed the capacity check.
        if bins[idx].pack(item.key.clone(), &rect).is_none() {
            oversized.push(OversizedItem {
                key: item.key,
                w: item.w,
                h: item.h,
            });
        }
    }

    bins.retain(|b| !b.is_empty());
    debug!(
        bins = bins.len(),
        dropped = oversized.len(),
        "shelf packing finished"
    );
    PackOutcome {
        bins,
        oversized,
        bin_width,
        bin_height,
    }
}
