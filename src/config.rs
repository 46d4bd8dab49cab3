use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::creator::CaptionPolicy;
use crate::exif::FallbackOrder;

/// Top-level configuration for the banfinator library.
///
/// Controls the exported file, the side-by-side canvas, how manual captions
/// interact with automatic merges, and which EXIF tag is tried first when an
/// image carries no IPTC creator.
///
/// # Loading
///
/// ```rust,no_run
/// use banfinator::config::Config;
///
/// // From a JSON file
/// let config = Config::load(Some("config.json".as_ref())).unwrap();
///
/// // Or use defaults and customize
/// let mut config = Config::default();
/// config.export.jpeg_quality = 90;
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output file settings.
    pub export: ExportConfig,
    /// Canvas geometry for the composed image.
    pub canvas: CanvasConfig,
    /// Whether a manual caption survives late extraction results.
    pub caption_policy: CaptionPolicy,
    /// EXIF tag order used when no IPTC creator exists.
    pub exif_fallback: FallbackOrder,
}

/// Controls the exported JPEG.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// File name used when no output path is given.
    pub file_name: String,
    /// JPEG encoder quality, 1-100.
    pub jpeg_quality: u8,
    /// If `false`, the composed image is written without an IPTC block.
    pub embed_metadata: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: "banfinator_kombinerad_bild.jpg".to_string(),
            jpeg_quality: 80,
            embed_metadata: true,
        }
    }
}

/// Canvas geometry. Each image fills a half of `(width - divider) / 2`
/// pixels; the divider between them is left white.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    pub divider: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 3000,
            height: 2000,
            divider: 20,
        }
    }
}

impl CanvasConfig {
    /// Width of one image half.
    pub fn half_width(&self) -> u32 {
        self.width.saturating_sub(self.divider) / 2
    }

    /// X offset of the right half.
    pub fn right_x(&self) -> u32 {
        self.half_width() + self.divider
    }
}

impl Config {
    /// Resolve the config file path: same directory as the executable.
    pub fn config_path() -> Result<PathBuf> {
        let exe_path = std::env::current_exe().context("Failed to get executable path")?;
        let exe_dir = exe_path
            .parent()
            .context("Failed to get executable directory")?;
        Ok(exe_dir.join("config.json"))
    }

    /// Load config from the given path, or from the default location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            log::warn!(
                "Config file not found at {}. Using defaults.",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&contents).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the given path, or to the default location.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents).context("Failed to write config file")?;
        log::info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Reject values the compositor and encoder cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.export.jpeg_quality) {
            anyhow::bail!(
                "export.jpeg_quality must be between 1 and 100, got {}",
                self.export.jpeg_quality
            );
        }
        if self.canvas.height == 0 || self.canvas.half_width() == 0 {
            anyhow::bail!(
                "canvas {}x{} with divider {} leaves no room for the images",
                self.canvas.width,
                self.canvas.height,
                self.canvas.divider
            );
        }
        if self.export.file_name.trim().is_empty() {
            anyhow::bail!("export.file_name must not be empty");
        }
        Ok(())
    }
}
