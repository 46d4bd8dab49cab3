use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::creator::{CreatorMetadata, Session, Side};
use crate::error::{Error, Result};
use crate::exif::{ExifTagSource, FallbackOrder};
use crate::iptc::{self, TruncationWarning};

/// MIME types accepted as input.
const ACCEPTED_MIME_TYPES: &[&str] = &["image/jpeg", "image/jpg"];

/// Derive a MIME type from a file extension.
///
/// # Example
///
/// ```rust
/// use banfinator::pipeline::mime_type_for;
/// use std::path::Path;
///
/// assert_eq!(mime_type_for(Path::new("left.JPG")), "image/jpeg");
/// assert_eq!(mime_type_for(Path::new("scan.png")), "image/png");
/// ```
pub fn mime_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "tif" | "tiff" => "image/tiff",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
}

/// Accept only JPEG input, before any parsing is attempted.
pub fn accept_mime(mime: &str) -> Result<()> {
    let mime = mime.trim().to_ascii_lowercase();
    if ACCEPTED_MIME_TYPES.contains(&mime.as_str()) {
        Ok(())
    } else {
        Err(Error::UnsupportedType(format!(
            "Only JPEG images are supported (got {mime})"
        )))
    }
}

/// [`accept_mime`] for a file path.
pub fn accept_path(path: &Path) -> Result<()> {
    accept_mime(mime_type_for(path)).map_err(|_| {
        Error::UnsupportedType(format!(
            "{} is not a JPEG image. Only .jpg and .jpeg files are supported.",
            path.display()
        ))
    })
}

/// Read a whole file into memory.
pub async fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    Ok(tokio::fs::read(path).await?)
}

/// Run the IPTC stage on in-memory bytes.
///
/// A missing SOI is reported; any other malformed metadata is logged and
/// treated as "no creator" so the caller can fall back to EXIF.
pub fn iptc_creator(side: Side, bytes: &[u8]) -> Result<Option<CreatorMetadata>> {
    match iptc::find_creator(bytes) {
        Ok(Some(raw)) => {
            let metadata = CreatorMetadata::from_iptc(side, raw);
            if metadata.is_empty() {
                return Ok(None);
            }
            Ok(Some(metadata))
        }
        Ok(None) => Ok(None),
        Err(Error::NotJpeg) => Err(Error::NotJpeg),
        Err(e) => {
            log::warn!("Ignoring malformed IPTC metadata in {side} image: {e}");
            Ok(None)
        }
    }
}

/// Extract the creator credit of one source image.
///
/// IPTC Creator is tried first, then the EXIF tags in `order`. An image with
/// no usable credit yields [`CreatorMetadata::empty`]. Errors are limited to
/// I/O failures and input that is not a JPEG at all.
pub async fn extract_creator(
    side: Side,
    path: &Path,
    exif: &dyn ExifTagSource,
    order: FallbackOrder,
) -> Result<CreatorMetadata> {
    accept_path(path)?;
    let bytes = read_bytes(path).await?;

    if let Some(metadata) = iptc_creator(side, &bytes)? {
        log::info!("{side}: IPTC creator {:?}", metadata.cleaned_value);
        return Ok(metadata);
    }

    let tags = match exif.load_metadata(path).await {
        Ok(tags) => tags,
        Err(e) => {
            log::warn!("{side}: EXIF fallback failed for {}: {e:#}", path.display());
            return Ok(CreatorMetadata::empty(side));
        }
    };

    match tags.creator(order) {
        Some((raw, source)) => {
            let metadata = CreatorMetadata::from_exif(side, raw.to_string(), source);
            log::info!(
                "{side}: EXIF {source:?} creator {:?}",
                metadata.cleaned_value
            );
            Ok(metadata)
        }
        None => {
            log::info!("{side}: no creator metadata in {}", path.display());
            Ok(CreatorMetadata::empty(side))
        }
    }
}

/// Load both images into `session`, extracting concurrently.
///
/// Results are applied in the order they finish. A side whose extraction
/// fails is left empty; the first such error is returned once both are done.
pub async fn load_sides(
    session: &mut Session,
    left: PathBuf,
    right: PathBuf,
    exif: Arc<dyn ExifTagSource>,
    order: FallbackOrder,
) -> Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    for (side, path) in [(Side::Left, left), (Side::Right, right)] {
        let ticket = session.begin_load(side);
        let tx = tx.clone();
        let exif = Arc::clone(&exif);
        tokio::spawn(async move {
            let result = extract_creator(side, &path, exif.as_ref(), order).await;
            let _ = tx.send((ticket, side, result));
        });
    }
    drop(tx);

    let mut first_error = None;
    while let Some((ticket, side, result)) = rx.recv().await {
        let metadata = match result {
            Ok(metadata) => metadata,
            Err(e) => {
                log::error!("Failed to load {side} image: {e}");
                first_error.get_or_insert(e);
                CreatorMetadata::empty(side)
            }
        };
        session.complete(ticket, metadata);
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// The final bytes to write, and whether the caption made it in.
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub bytes: Vec<u8>,
    pub embedded: bool,
    pub truncation: Option<TruncationWarning>,
}

/// Embed `caption` into the composed JPEG.
///
/// An empty caption leaves the image untouched. If the splice fails the
/// plain image is returned so the export still goes through.
pub fn embed_caption(jpeg: Vec<u8>, caption: &str) -> ExportOutcome {
    if caption.trim().is_empty() {
        log::info!("No caption; exporting without IPTC metadata");
        return ExportOutcome {
            bytes: jpeg,
            embedded: false,
            truncation: None,
        };
    }

    match iptc::embed_creator(&jpeg, caption) {
        Ok((bytes, truncation)) => {
            log::info!("Embedded IPTC creator {caption:?}");
            ExportOutcome {
                bytes,
                embedded: true,
                truncation,
            }
        }
        Err(e) => {
            log::error!("Failed to embed IPTC metadata, exporting plain image: {e}");
            ExportOutcome {
                bytes: jpeg,
                embedded: false,
                truncation: None,
            }
        }
    }
}

/// Write the exported bytes to disk.
pub async fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    tokio::fs::write(path, bytes).await?;
    log::info!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}
