//! EXIF fallback for images without an IPTC creator.
//!
//! Only two IFD0 tags matter here: Artist and Copyright. The lookup goes
//! through the [`ExifTagSource`] trait so the pipeline can be driven by any
//! reader; [`NomExifSource`] is the default, backed by `nom-exif`.

mod reader;

pub use reader::read_exif_tags;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::creator::CreatorSource;

/// Artist and Copyright values of one image, as stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExifTags {
    pub artist: Option<String>,
    pub copyright: Option<String>,
}

impl ExifTags {
    /// Look a tag up by its EXIF name (`"Artist"` or `"Copyright"`).
    pub fn get_tag(&self, name: &str) -> Option<&str> {
        match name {
            "Artist" => self.artist.as_deref(),
            "Copyright" => self.copyright.as_deref(),
            _ => None,
        }
    }

    /// The first tag, in `order`, holding more than whitespace.
    pub fn creator(&self, order: FallbackOrder) -> Option<(&str, CreatorSource)> {
        order
            .tags()
            .into_iter()
            .find_map(|(name, source)| {
                self.get_tag(name)
                    .filter(|v| !v.trim().is_empty())
                    .map(|v| (v, source))
            })
    }
}

/// Order in which the EXIF tags are tried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackOrder {
    #[default]
    ArtistFirst,
    CopyrightFirst,
}

impl FallbackOrder {
    fn tags(self) -> [(&'static str, CreatorSource); 2] {
        let artist = ("Artist", CreatorSource::ExifArtist);
        let copyright = ("Copyright", CreatorSource::ExifCopyright);
        match self {
            FallbackOrder::ArtistFirst => [artist, copyright],
            FallbackOrder::CopyrightFirst => [copyright, artist],
        }
    }
}

/// Loads EXIF tags for a file.
#[async_trait::async_trait]
pub trait ExifTagSource: Send + Sync {
    async fn load_metadata(&self, path: &Path) -> Result<ExifTags>;
}

/// [`ExifTagSource`] backed by `nom-exif`, run on the blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct NomExifSource;

#[async_trait::async_trait]
impl ExifTagSource for NomExifSource {
    async fn load_metadata(&self, path: &Path) -> Result<ExifTags> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || read_exif_tags(&path))
            .await
            .context("EXIF reader task failed")?
    }
}
