use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MoodBoardError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Cannot decode {path}: {message}")]
    Decode { path: PathBuf, message: String },
    #[error("No eligible images in catalog")]
    EmptyCatalog,
    #[error("Image {key} ({width}x{height}) exceeds canvas capacity {bin_width}x{bin_height}")]
    Oversized {
        key: String,
        width: u32,
        height: u32,
        bin_width: u32,
        bin_height: u32,
    },
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Scheduler worker is no longer running")]
    SchedulerClosed,
}

impl MoodBoardError {
    pub(crate) fn decode(path: impl Into<PathBuf>, err: impl ToString) -> Self {
        Self::Decode {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MoodBoardError>;
