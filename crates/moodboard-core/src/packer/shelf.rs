use super::Packer;
use crate::model::{Placement, Rect};

/// One fixed-capacity canvas filled row by row ("shelves"), left to right.
///
/// A bin only ever grows: `cursor_x` advances along the current row and
/// `cursor_y` jumps by the tallest item of the row when a new row starts.
#[derive(Debug, Clone)]
pub struct ShelfBin<K = usize> {
    capacity_width: u32,
    capacity_height: u32,
    cursor_x: u32,
    cursor_y: u32,
    row_height: u32,
    placements: Vec<Placement<K>>,
}

/// Where the next item would land and which row state it would leave behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    x: u32,
    y: u32,
    row_height: u32,
}

impl<K> ShelfBin<K> {
    pub fn new(capacity_width: u32, capacity_height: u32) -> Self {
        Self {
            capacity_width,
            capacity_height,
            cursor_x: 0,
            cursor_y: 0,
            row_height: 0,
            placements: Vec::new(),
        }
    }

    pub fn capacity(&self) -> (u32, u32) {
        (self.capacity_width, self.capacity_height)
    }

    pub fn cursor(&self) -> (u32, u32) {
        (self.cursor_x, self.cursor_y)
    }

    pub fn row_height(&self) -> u32 {
        self.row_height
    }

    pub fn placements(&self) -> &[Placement<K>] {
        &self.placements
    }

    pub fn into_placements(self) -> Vec<Placement<K>> {
        self.placements
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Tight bounding box of the placements: (max right edge, max bottom edge).
    pub fn used_extent(&self) -> (u32, u32) {
        self.placements.iter().fold((0, 0), |(w, h), p| {
            (w.max(p.frame.right_edge()), h.max(p.frame.bottom_edge()))
        })
    }

    fn remaining_width(&self) -> u32 {
        self.capacity_width.saturating_sub(self.cursor_x)
    }

    /// Finds the slot for a `w`x`h` item without touching the bin.
    fn find_slot(&self, w: u32, h: u32) -> Option<Slot> {
        if w == 0 || h == 0 || w > self.capacity_width || h > self.capacity_height {
            return None;
        }
        if w <= self.remaining_width() {
            // Same row; a new row would only sit lower, so no wrap on height misses.
            if self.cursor_y + h <= self.capacity_height {
                return Some(Slot {
                    x: self.cursor_x,
                    y: self.cursor_y,
                    row_height: self.row_height.max(h),
                });
            }
            return None;
        }
        let next_y = self.cursor_y + self.row_height;
        if next_y + h <= self.capacity_height {
            return Some(Slot {
                x: 0,
                y: next_y,
                row_height: h,
            });
        }
        None
    }
}

impl<K: Clone> Packer<K> for ShelfBin<K> {
    fn can_pack(&self, rect: &Rect) -> bool {
        self.find_slot(rect.w, rect.h).is_some()
    }

    fn pack(&mut self, key: K, rect: &Rect) -> Option<Placement<K>> {
        let slot = self.find_slot(rect.w, rect.h)?;
        let frame = Rect::new(slot.x, slot.y, rect.w, rect.h);
        self.cursor_x = slot.x + rect.w;
        self.cursor_y = slot.y;
        self.row_height = slot.row_height;
        let placement = Placement { key, frame };
        self.placements.push(placement.clone());
        Some(placement)
    }
}
