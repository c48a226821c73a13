//! Wrap-around batch selection over a catalog.
//!
//! `advance` and `retreat` are the only functions that move a board index;
//! the scheduler and manual navigation both go through them.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// `count` consecutive catalog indices starting at `start_index`, wrapping at
/// `catalog_len`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchWindow {
    pub start_index: usize,
    pub count: usize,
    pub catalog_len: usize,
}

impl BatchWindow {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0 || self.catalog_len == 0
    }

    /// Catalog indices in window order.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        let len = self.catalog_len.max(1);
        let count = if self.catalog_len == 0 { 0 } else { self.count };
        (0..count).map(move |i| (self.start_index + i) % len)
    }

    /// The window as contiguous catalog ranges: one range, or two when it
    /// crosses the end of the catalog. A window longer than the catalog
    /// yields further full passes.
    pub fn ranges(&self) -> Vec<Range<usize>> {
        let mut out = Vec::new();
        if self.is_empty() {
            return out;
        }
        let mut start = self.start_index;
        let mut remaining = self.count;
        while remaining > 0 {
            let take = remaining.min(self.catalog_len - start);
            out.push(start..start + take);
            remaining -= take;
            start = 0;
        }
        out
    }
}

/// Window of `batch_size` entries starting at `current_index mod catalog_len`.
pub fn next_window(current_index: usize, batch_size: usize, catalog_len: usize) -> BatchWindow {
    if catalog_len == 0 || batch_size == 0 {
        return BatchWindow {
            start_index: 0,
            count: 0,
            catalog_len,
        };
    }
    BatchWindow {
        start_index: current_index % catalog_len,
        count: batch_size,
        catalog_len,
    }
}

/// `(current_index + batch_size) mod catalog_len`; 0 for an empty catalog.
pub fn advance(current_index: usize, batch_size: usize, catalog_len: usize) -> usize {
    if catalog_len == 0 {
        return 0;
    }
    ((current_index % catalog_len) + (batch_size % catalog_len)) % catalog_len
}

/// `(current_index - batch_size) mod catalog_len`, never negative; 0 for an empty catalog.
pub fn retreat(current_index: usize, batch_size: usize, catalog_len: usize) -> usize {
    if catalog_len == 0 {
        return 0;
    }
    let cur = current_index % catalog_len;
    let step = batch_size % catalog_len;
    (cur + catalog_len - step) % catalog_len
}
