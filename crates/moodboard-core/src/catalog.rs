//! Image catalog: the ordered list of image files in one folder.

use crate::error::{MoodBoardError, Result};
use crate::model::ImageDescriptor;
use image::{ImageReader, RgbaImage};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Extensions (lowercase) a catalog accepts.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "bmp"];

/// True if `p` has one of [`IMAGE_EXTENSIONS`], compared case-insensitively.
pub fn is_image(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase()),
        Some(ext) if IMAGE_EXTENSIONS.contains(&ext.as_str())
    )
}

/// Immutable snapshot of the image paths in a folder.
///
/// Cloning shares the underlying list, so a catalog can be handed to another
/// thread and replaced wholesale without readers ever seeing a partial list.
#[derive(Debug, Clone, Default)]
pub struct ImageCatalog {
    root: Option<PathBuf>,
    paths: Arc<[PathBuf]>,
}

/// A decoded image together with its descriptor.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub descriptor: ImageDescriptor,
    pub rgba: RgbaImage,
}

/// Outcome of loading several images: successes in input order plus the
/// paths that could not be decoded.
#[derive(Debug, Default)]
pub struct LoadedBatch {
    pub images: Vec<LoadedImage>,
    pub failures: Vec<(PathBuf, MoodBoardError)>,
}

impl ImageCatalog {
    /// List the images directly inside `dir`, in directory-listing order.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let meta = std::fs::metadata(dir)?;
        if !meta.is_dir() {
            return Err(MoodBoardError::Io(std::io::Error::new(
                std::io::ErrorKind::NotADirectory,
                format!("{} is not a directory", dir.display()),
            )));
        }
        let mut list: Vec<PathBuf> = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let p = entry.path();
            if entry.file_type().is_file() && is_image(p) {
                list.push(p.to_path_buf());
            }
        }
        debug!(dir = %dir.display(), count = list.len(), "catalog opened");
        Ok(Self {
            root: Some(dir.to_path_buf()),
            paths: list.into(),
        })
    }

    /// Build a catalog from an explicit list; non-image paths are dropped.
    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let list: Vec<PathBuf> = paths
            .into_iter()
            .map(Into::<PathBuf>::into)
            .filter(|p: &PathBuf| is_image(p))
            .collect();
        Self {
            root: None,
            paths: list.into(),
        }
    }

    /// Immediate subdirectories of `root`, in directory-listing order.
    pub fn subfolders(root: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let root = root.as_ref();
        std::fs::metadata(root)?;
        Ok(WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir())
            .map(|e| e.into_path())
            .collect())
    }

    /// Keep only the paths matching `keep`, producing a new snapshot.
    pub fn retain(&self, mut keep: impl FnMut(&Path) -> bool) -> Self {
        let list: Vec<PathBuf> = self
            .paths
            .iter()
            .filter(|p| keep(p.as_path()))
            .cloned()
            .collect();
        Self {
            root: self.root.clone(),
            paths: list.into(),
        }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn get(&self, index: usize) -> Option<&Path> {
        self.paths.get(index).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Read the intrinsic size of `path` from its header without decoding pixels.
    pub fn describe(path: &Path) -> Result<ImageDescriptor> {
        let (width, height) = ImageReader::open(path)
            .map_err(|e| MoodBoardError::decode(path, e))?
            .with_guessed_format()
            .map_err(|e| MoodBoardError::decode(path, e))?
            .into_dimensions()
            .map_err(|e| MoodBoardError::decode(path, e))?;
        Ok(ImageDescriptor {
            path: path.to_path_buf(),
            width,
            height,
        })
    }

    /// Decode `path` into RGBA8. May block on disk I/O.
    pub fn load(path: &Path) -> Result<LoadedImage> {
        let img = ImageReader::open(path)
            .map_err(|e| MoodBoardError::decode(path, e))?
            .with_guessed_format()
            .map_err(|e| MoodBoardError::decode(path, e))?
            .decode()
            .map_err(|e| MoodBoardError::decode(path, e))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(LoadedImage {
            descriptor: ImageDescriptor {
                path: path.to_path_buf(),
                width,
                height,
            },
            rgba,
        })
    }

    /// Decode every path, skipping (and recording) the ones that fail.
    pub fn load_batch(paths: &[PathBuf]) -> LoadedBatch {
        #[cfg(feature = "parallel")]
        let results: Vec<Result<LoadedImage>> = paths.par_iter().map(|p| Self::load(p)).collect();
        #[cfg(not(feature = "parallel"))]
        let results: Vec<Result<LoadedImage>> = paths.iter().map(|p| Self::load(p)).collect();

        let mut batch = LoadedBatch::default();
        for (path, res) in paths.iter().zip(results) {
            match res {
                Ok(img) => batch.images.push(img),
                Err(e) => {
                    warn!(?path, error = %e, "skip image");
                    batch.failures.push((path.clone(), e));
                }
            }
        }
        batch
    }
}
