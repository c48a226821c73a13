use crate::catalog::{ImageCatalog, LoadedBatch};
use crate::compositing::compose;
use crate::config::BoardConfig;
use crate::error::{MoodBoardError, Result};
use crate::model::{BoardStats, ImageDescriptor, Rect};
use crate::packer::{PackItem, PackOutcome, pack};
use crate::selector::BatchWindow;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, instrument, warn};

/// A recoverable problem met while building a board. The board is still
/// produced from the remaining images.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoardWarning {
    /// The file was missing, unreadable or not a valid image.
    Decode { path: PathBuf, message: String },
    /// The image is larger than one canvas and was left out.
    Oversized {
        path: PathBuf,
        width: u32,
        height: u32,
    },
}

impl BoardWarning {
    /// Warning for the image at `path` that was left off the board because of `err`.
    pub fn skipped(path: PathBuf, err: MoodBoardError) -> Self {
        match err {
            MoodBoardError::Oversized { width, height, .. } => Self::Oversized {
                path,
                width,
                height,
            },
            MoodBoardError::Decode { message, .. } => Self::Decode { path, message },
            other => Self::Decode {
                path,
                message: other.to_string(),
            },
        }
    }
}

/// Placement of one catalog image on a board canvas.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoardPlacement {
    pub path: PathBuf,
    pub frame: Rect,
}

/// Logical record of one composed canvas.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoardPage {
    pub id: usize,
    pub width: u32,
    pub height: u32,
    pub placements: Vec<BoardPlacement>,
}

/// Placement plan of a board: which image lands where, before any pixels move.
#[derive(Debug, Clone)]
pub struct BoardLayout {
    pub window: BatchWindow,
    pub descriptors: Vec<ImageDescriptor>,
    pub outcome: PackOutcome<usize>,
    pub warnings: Vec<BoardWarning>,
}

impl BoardLayout {
    pub fn pages(&self) -> Vec<BoardPage> {
        self.outcome
            .bins
            .iter()
            .enumerate()
            .map(|(id, bin)| {
                let (width, height) = bin.used_extent();
                let placements = bin
                    .placements()
                    .iter()
                    .map(|p| BoardPlacement {
                        path: self.descriptors[p.key].path.clone(),
                        frame: p.frame,
                    })
                    .collect();
                BoardPage {
                    id,
                    width,
                    height,
                    placements,
                }
            })
            .collect()
    }

    pub fn stats(&self) -> BoardStats {
        self.outcome.stats()
    }
}

/// One composed refresh: the canvases for a window plus what went wrong on the way.
#[derive(Debug, Clone)]
pub struct Board {
    pub window: BatchWindow,
    pub canvases: Vec<RgbaImage>,
    pub pages: Vec<BoardPage>,
    pub warnings: Vec<BoardWarning>,
    pub stats: BoardStats,
}

impl Board {
    pub fn empty(window: BatchWindow) -> Self {
        Self {
            window,
            canvases: Vec::new(),
            pages: Vec::new(),
            warnings: Vec::new(),
            stats: BoardStats::default(),
        }
    }

    /// True when nothing could be drawn (empty catalog or every image failed).
    pub fn is_empty(&self) -> bool {
        self.canvases.is_empty()
    }

    /// The canvas a single-view display shows: the first non-empty bin.
    pub fn primary(&self) -> Option<&RgbaImage> {
        self.canvases.first()
    }

    /// Fails with `EmptyCatalog` for callers that cannot render a blank board.
    pub fn require_content(&self) -> Result<&Self> {
        if self.is_empty() {
            Err(MoodBoardError::EmptyCatalog)
        } else {
            Ok(self)
        }
    }
}

fn window_paths(catalog: &ImageCatalog, window: &BatchWindow) -> Vec<PathBuf> {
    window
        .indices()
        .filter_map(|i| catalog.get(i).map(|p| p.to_path_buf()))
        .collect()
}

fn oversized_warnings(
    outcome: &PackOutcome<usize>,
    descriptors: &[ImageDescriptor],
) -> Vec<BoardWarning> {
    outcome
        .oversized
        .iter()
        .map(|o| {
            let path = descriptors[o.key].path.clone();
            let err = MoodBoardError::Oversized {
                key: path.display().to_string(),
                width: o.w,
                height: o.h,
                bin_width: outcome.bin_width,
                bin_height: outcome.bin_height,
            };
            BoardWarning::skipped(path, err)
        })
        .collect()
}

fn pack_descriptors(descriptors: &[ImageDescriptor], cfg: &BoardConfig) -> PackOutcome<usize> {
    let items = descriptors
        .iter()
        .enumerate()
        .map(|(i, d)| PackItem::new(i, d.width, d.height));
    pack(items, cfg.canvas_width, cfg.canvas_height)
}

/// Plans a board from image headers only; no pixel data is decoded.
#[instrument(skip_all, fields(start = window.start_index, count = window.count))]
pub fn plan_board(
    catalog: &ImageCatalog,
    window: BatchWindow,
    cfg: &BoardConfig,
) -> BoardLayout {
    let mut warnings = Vec::new();
    let mut descriptors = Vec::new();
    for path in window_paths(catalog, &window) {
        match ImageCatalog::describe(&path) {
            Ok(d) => descriptors.push(d),
            Err(e) => {
                warn!(?path, error = %e, "skip image");
                warnings.push(BoardWarning::skipped(path, e));
            }
        }
    }
    let outcome = pack_descriptors(&descriptors, cfg);
    warnings.extend(oversized_warnings(&outcome, &descriptors));
    BoardLayout {
        window,
        descriptors,
        outcome,
        warnings,
    }
}

/// Loads, packs and composes the images of `window`.
///
/// Never fails: undecodable and oversized images become warnings, and an empty
/// catalog yields an empty board.
#[instrument(skip_all, fields(start = window.start_index, count = window.count))]
pub fn compose_board(
    catalog: &ImageCatalog,
    window: BatchWindow,
    cfg: &BoardConfig,
) -> Board {
    if window.is_empty() || catalog.is_empty() {
        return Board::empty(window);
    }
    let paths = window_paths(catalog, &window);
    let LoadedBatch { images, failures } = ImageCatalog::load_batch(&paths);
    let mut warnings: Vec<BoardWarning> = failures
        .into_iter()
        .map(|(path, err)| BoardWarning::skipped(path, err))
        .collect();

    let (descriptors, rgba): (Vec<ImageDescriptor>, Vec<RgbaImage>) =
        images.into_iter().map(|l| (l.descriptor, l.rgba)).unzip();
    let outcome = pack_descriptors(&descriptors, cfg);
    warnings.extend(oversized_warnings(&outcome, &descriptors));

    let canvases = compose(&outcome.bins, &rgba);
    let layout = BoardLayout {
        window,
        descriptors,
        outcome,
        warnings,
    };
    let pages = layout.pages();
    let stats = layout.stats();
    debug!(
        canvases = canvases.len(),
        warnings = layout.warnings.len(),
        "board composed"
    );
    Board {
        window,
        canvases,
        pages,
        warnings: layout.warnings,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skipped_images_keep_their_path() {
        let path = PathBuf::from("refs/huge.png");
        let oversized = MoodBoardError::Oversized {
            key: "refs/huge.png".into(),
            width: 5000,
            height: 10,
            bin_width: 4096,
            bin_height: 4096,
        };
        assert_eq!(
            BoardWarning::skipped(path.clone(), oversized),
            BoardWarning::Oversized {
                path: path.clone(),
                width: 5000,
                height: 10,
            }
        );

        let io = MoodBoardError::Io(std::io::Error::other("disk gone"));
        match BoardWarning::skipped(path.clone(), io) {
            BoardWarning::Decode { path: p, message } => {
                assert_eq!(p, path);
                assert!(message.contains("disk gone"));
            }
            other => panic!("unexpected warning {other:?}"),
        }
    }

    #[test]
    fn oversized_images_become_warnings_with_paths() {
        let descriptors = vec![
            ImageDescriptor {
                path: PathBuf::from("a.png"),
                width: 10,
                height: 10,
            },
            ImageDescriptor {
                path: PathBuf::from("b.png"),
                width: 200,
                height: 10,
            },
        ];
        let cfg = BoardConfig::builder().with_canvas(100, 100).build();
        let outcome = pack_descriptors(&descriptors, &cfg);
        let warnings = oversized_warnings(&outcome, &descriptors);
        assert_eq!(
            warnings,
            vec![BoardWarning::Oversized {
                path: PathBuf::from("b.png"),
                width: 200,
                height: 10,
            }]
        );
    }
}
