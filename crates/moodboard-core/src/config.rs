use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_INTERVAL_SECONDS: u64 = 3;
pub const DEFAULT_IMAGES_PER_BOARD: usize = 3;
pub const DEFAULT_CANVAS_WIDTH: u32 = 4096;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 4096;

/// Settings for composing and cycling boards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoardConfig {
    /// Seconds between automatic advances.
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,
    /// Number of catalog images composed into one board.
    #[serde(default = "default_images_per_board")]
    pub images_per_board: usize,
    /// Capacity of one canvas (bin) in pixels.
    #[serde(default = "default_canvas_width")]
    pub canvas_width: u32,
    #[serde(default = "default_canvas_height")]
    pub canvas_height: u32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval_seconds(),
            images_per_board: default_images_per_board(),
            canvas_width: default_canvas_width(),
            canvas_height: default_canvas_height(),
        }
    }
}

impl BoardConfig {
    /// Validates the configuration parameters.
    ///
    /// Every field must be positive.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::MoodBoardError;

        if self.interval_seconds == 0 {
            return Err(MoodBoardError::InvalidConfig(
                "interval_seconds must be positive".into(),
            ));
        }
        if self.images_per_board == 0 {
            return Err(MoodBoardError::InvalidConfig(
                "images_per_board must be positive".into(),
            ));
        }
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(MoodBoardError::InvalidConfig(format!(
                "canvas must be non-empty, got {}x{}",
                self.canvas_width, self.canvas_height
            )));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    /// Build a config from untrusted textual settings.
    ///
    /// Each field is parsed independently; a missing, non-numeric or zero value
    /// falls back to that field's default.
    pub fn from_raw(raw: &RawSettings) -> Self {
        Self {
            interval_seconds: parse_positive(
                "interval_seconds",
                raw.interval_seconds.as_deref(),
                default_interval_seconds(),
            ),
            images_per_board: parse_positive(
                "images_per_board",
                raw.images_per_board.as_deref(),
                default_images_per_board(),
            ),
            canvas_width: parse_positive(
                "canvas_width",
                raw.canvas_width.as_deref(),
                default_canvas_width(),
            ),
            canvas_height: parse_positive(
                "canvas_height",
                raw.canvas_height.as_deref(),
                default_canvas_height(),
            ),
        }
    }

    /// Create a fluent builder for `BoardConfig`.
    pub fn builder() -> BoardConfigBuilder {
        BoardConfigBuilder::new()
    }
}

/// Textual settings as entered by a user or read from a file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawSettings {
    #[serde(default)]
    pub interval_seconds: Option<String>,
    #[serde(default)]
    pub images_per_board: Option<String>,
    #[serde(default)]
    pub canvas_width: Option<String>,
    #[serde(default)]
    pub canvas_height: Option<String>,
}

impl RawSettings {
    /// Overlay `other` on top of `self`; set fields in `other` win.
    pub fn merge(mut self, other: RawSettings) -> Self {
        if other.interval_seconds.is_some() {
            self.interval_seconds = other.interval_seconds;
        }
        if other.images_per_board.is_some() {
            self.images_per_board = other.images_per_board;
        }
        if other.canvas_width.is_some() {
            self.canvas_width = other.canvas_width;
        }
        if other.canvas_height.is_some() {
            self.canvas_height = other.canvas_height;
        }
        self
    }
}

fn parse_positive<T>(field: &str, value: Option<&str>, default: T) -> T
where
    T: FromStr + PartialOrd + Default + Copy + std::fmt::Display,
{
    let Some(text) = value else {
        return default;
    };
    match text.trim().parse::<T>() {
        Ok(v) if v > T::default() => v,
        _ => {
            warn!(field, value = text, fallback = %default, "invalid setting, using default");
            default
        }
    }
}

fn default_interval_seconds() -> u64 {
    DEFAULT_INTERVAL_SECONDS
}
fn default_images_per_board() -> usize {
    DEFAULT_IMAGES_PER_BOARD
}
fn default_canvas_width() -> u32 {
    DEFAULT_CANVAS_WIDTH
}
fn default_canvas_height() -> u32 {
    DEFAULT_CANVAS_HEIGHT
}

/// Builder for `BoardConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct BoardConfigBuilder {
    cfg: BoardConfig,
}

impl BoardConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: BoardConfig::default(),
        }
    }
    pub fn interval_seconds(mut self, v: u64) -> Self {
        self.cfg.interval_seconds = v;
        self
    }
    pub fn images_per_board(mut self, v: usize) -> Self {
        self.cfg.images_per_board = v;
        self
    }
    pub fn with_canvas(mut self, w: u32, h: u32) -> Self {
        self.cfg.canvas_width = w;
        self.cfg.canvas_height = h;
        self
    }
    pub fn build(self) -> BoardConfig {
        self.cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_settings_fall_back_per_field() {
        let raw = RawSettings {
            interval_seconds: Some("abc".into()),
            images_per_board: Some(" 5 ".into()),
            canvas_width: Some("0".into()),
            canvas_height: Some("-20".into()),
        };
        let cfg = BoardConfig::from_raw(&raw);
        assert_eq!(cfg.interval_seconds, 3);
        assert_eq!(cfg.images_per_board, 5);
        assert_eq!(cfg.canvas_width, 4096);
        assert_eq!(cfg.canvas_height, 4096);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn merge_prefers_later_values() {
        let file = RawSettings {
            interval_seconds: Some("10".into()),
            images_per_board: Some("4".into()),
            ..Default::default()
        };
        let flags = RawSettings {
            images_per_board: Some("6".into()),
            ..Default::default()
        };
        let cfg = BoardConfig::from_raw(&file.merge(flags));
        assert_eq!(cfg.interval_seconds, 10);
        assert_eq!(cfg.images_per_board, 6);
    }

    #[test]
    fn validate_rejects_zero_batch() {
        let cfg = BoardConfig::builder().images_per_board(0).build();
        assert!(cfg.validate().is_err());
    }
}
