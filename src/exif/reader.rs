use anyhow::{Context, Result};
use nom_exif::*;
use std::path::Path;

use super::ExifTags;

// IFD0 tag IDs
const TAG_ARTIST: u16 = 0x013B;
const TAG_COPYRIGHT: u16 = 0x8298;

/// Read the Artist and Copyright tags from an image file.
///
/// Files without a parseable EXIF block yield empty tags, not an error.
pub fn read_exif_tags(path: &Path) -> Result<ExifTags> {
    let mut parser = MediaParser::new();
    let ms = MediaSource::file_path(path).context("Failed to open image file")?;

    let iter: ExifIter = match parser.parse(ms) {
        Ok(iter) => iter,
        Err(_) => {
            log::debug!("No EXIF data found in {}", path.display());
            return Ok(ExifTags::default());
        }
    };
    let exif: Exif = iter.into();

    let tags = ExifTags {
        artist: exif
            .get_by_ifd_tag_code(0, TAG_ARTIST)
            .and_then(entry_to_string),
        copyright: exif
            .get_by_ifd_tag_code(0, TAG_COPYRIGHT)
            .and_then(entry_to_string),
    };
    log::debug!("EXIF tags in {}: {tags:?}", path.display());
    Ok(tags)
}

/// Convert an EntryValue to an Option<String>.
fn entry_to_string(val: &EntryValue) -> Option<String> {
    let s = val.to_string();
    let s = s.trim_matches('"').to_string();
    if s.trim().is_empty() { None } else { Some(s) }
}
