//! Core library for composing mood boards.
//!
//! - Catalog: images of one folder, as an immutable snapshot of paths
//! - Packing: greedy first-fit shelf packing into fixed-size canvases
//! - Compositing: tight, transparent canvases with images pasted at their placements
//! - Selection: wrap-around batch windows over the catalog
//! - Scheduling: a background worker that cycles boards on a timer or on command
//! - View: zoom/pan state applied by the display sink
//!
//! Quick example:
//! ```ignore
//! use moodboard_core::prelude::*;
//! # fn main() -> anyhow::Result<()> {
//! let catalog = ImageCatalog::open("refs/characters")?;
//! let cfg = BoardConfig::builder().images_per_board(4).build();
//! let window = next_window(0, cfg.images_per_board, catalog.len());
//! let board = compose_board(&catalog, window, &cfg);
//! println!("canvases: {}, warnings: {}", board.canvases.len(), board.warnings.len());
//! # Ok(()) }
//! ```

pub mod catalog;
pub mod compositing;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod model;
pub mod packer;
pub mod pipeline;
pub mod scheduler;
pub mod selector;
pub mod view;

pub use catalog::*;
pub use config::*;
pub use error::*;
pub use export::*;
pub use model::*;
pub use packer::*;
pub use pipeline::*;

/// Convenience prelude for common types and functions.
/// Importing `moodboard_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::catalog::{ImageCatalog, LoadedBatch, LoadedImage};
    pub use crate::compositing::{compose, compose_page};
    pub use crate::config::{BoardConfig, BoardConfigBuilder, RawSettings};
    pub use crate::display::{DisplaySink, render_viewport};
    pub use crate::error::{MoodBoardError, Result};
    pub use crate::model::{BoardStats, ImageDescriptor, Placement, Rect};
    pub use crate::packer::{PackItem, PackOutcome, Packer, ShelfBin, pack};
    pub use crate::pipeline::{Board, BoardLayout, BoardWarning, compose_board, plan_board};
    pub use crate::scheduler::{
        BoardFrame, CycleScheduler, EVENT_CAPACITY, SchedulerCommand, SchedulerEvent, Trigger,
    };
    pub use crate::selector::{BatchWindow, advance, next_window, retreat};
    pub use crate::view::ViewTransform;
}
