use std::path::{Path, PathBuf};
use std::sync::Arc;

use banfinator::compose::compose_side_by_side;
use banfinator::config::{CanvasConfig, Config};
use banfinator::creator::{CaptionPolicy, CreatorSource, Session, Side};
use banfinator::exif::{ExifTagSource, ExifTags, FallbackOrder, NomExifSource};
use banfinator::iptc;
use banfinator::pipeline::{self, embed_caption, load_sides};
use image::codecs::jpeg::JpegEncoder;
use image::{GenericImageView, Rgb, RgbImage};
use tempfile::TempDir;

struct NoExif;

#[async_trait::async_trait]
impl ExifTagSource for NoExif {
    async fn load_metadata(&self, _path: &Path) -> anyhow::Result<ExifTags> {
        Ok(ExifTags::default())
    }
}

fn real_jpeg(color: [u8; 3]) -> Vec<u8> {
    let img = RgbImage::from_pixel(40, 30, Rgb(color));
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, 85)
        .encode_image(&img)
        .unwrap();
    buf
}

fn tagged_jpeg(color: [u8; 3], creator: &str) -> Vec<u8> {
    iptc::embed_creator(&real_jpeg(color), creator).unwrap().0
}

/// A JPEG whose only metadata is an EXIF APP1 with Artist and Copyright.
fn exif_jpeg(artist: &str, copyright: &str) -> Vec<u8> {
    let mut artist = artist.as_bytes().to_vec();
    artist.push(0);
    let mut copyright = copyright.as_bytes().to_vec();
    copyright.push(0);

    // Big-endian TIFF: header, IFD0 with two ASCII entries, then the strings.
    let data_start: u32 = 8 + 2 + 2 * 12 + 4;
    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"MM\x00\x2A");
    tiff.extend_from_slice(&8u32.to_be_bytes());
    tiff.extend_from_slice(&2u16.to_be_bytes());
    for (tag, value, offset) in [
        (0x013Bu16, &artist, data_start),
        (0x8298u16, &copyright, data_start + artist.len() as u32),
    ] {
        tiff.extend_from_slice(&tag.to_be_bytes());
        tiff.extend_from_slice(&2u16.to_be_bytes());
        tiff.extend_from_slice(&(value.len() as u32).to_be_bytes());
        tiff.extend_from_slice(&offset.to_be_bytes());
    }
    tiff.extend_from_slice(&0u32.to_be_bytes());
    tiff.extend_from_slice(&artist);
    tiff.extend_from_slice(&copyright);

    let mut app1 = b"Exif\0\0".to_vec();
    app1.extend_from_slice(&tiff);

    let body = real_jpeg([90, 90, 90]);
    let mut out = vec![0xFF, 0xD8, 0xFF, 0xE1];
    out.extend_from_slice(&((app1.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&app1);
    out.extend_from_slice(&body[2..]);
    out
}

fn write(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

fn small_canvas() -> CanvasConfig {
    CanvasConfig {
        width: 120,
        height: 60,
        divider: 20,
    }
}

// ── end to end ───────────────────────────────────────────────────────

#[tokio::test]
async fn combine_two_tagged_images() {
    let dir = TempDir::new().unwrap();
    let left = write(&dir, "left.jpg", &tagged_jpeg([255, 0, 0], "Jane Doe/TT"));
    let right = write(&dir, "right.jpg", &tagged_jpeg([0, 0, 255], "John Smith/TT"));

    let mut session = Session::new(CaptionPolicy::KeepManual);
    load_sides(
        &mut session,
        left.clone(),
        right.clone(),
        Arc::new(NoExif),
        FallbackOrder::ArtistFirst,
    )
    .await
    .unwrap();
    assert_eq!(session.caption(), "Jane Doe/John Smith/TT");

    let composed = compose_side_by_side(
        &std::fs::read(&left).unwrap(),
        &std::fs::read(&right).unwrap(),
        &small_canvas(),
        80,
    )
    .unwrap();
    let outcome = embed_caption(composed, session.caption());
    assert!(outcome.embedded);

    let out_path = dir.path().join(Config::default().export.file_name);
    pipeline::write_output(&out_path, &outcome.bytes).await.unwrap();

    let written = std::fs::read(&out_path).unwrap();
    let fields = iptc::read_fields(&written).unwrap();
    assert_eq!(fields.creators, vec!["Jane Doe/John Smith/TT".to_string()]);
    assert_eq!(fields.copyright.as_deref(), Some("Jane Doe/John Smith/TT"));
    assert_eq!(fields.software.as_deref(), Some(iptc::SOFTWARE_NAME));

    let decoded = image::load_from_memory(&written).unwrap();
    assert_eq!(decoded.dimensions(), (120, 60));
}

#[tokio::test]
async fn swap_reverses_the_caption() {
    let dir = TempDir::new().unwrap();
    let left = write(&dir, "a.jpg", &tagged_jpeg([0, 0, 0], "Anna"));
    let right = write(&dir, "b.jpg", &tagged_jpeg([0, 0, 0], "Bo"));

    let mut session = Session::default();
    load_sides(&mut session, left, right, Arc::new(NoExif), FallbackOrder::ArtistFirst)
        .await
        .unwrap();
    assert_eq!(session.caption(), "Anna/Bo");

    session.swap();
    assert_eq!(session.caption(), "Bo/Anna");
    assert_eq!(session.creator(Side::Left).unwrap().cleaned_value, "Bo");
}

#[tokio::test]
async fn manual_caption_is_what_gets_embedded() {
    let dir = TempDir::new().unwrap();
    let left = write(&dir, "a.jpg", &tagged_jpeg([0, 0, 0], "Anna/AP"));
    let right = write(&dir, "b.jpg", &real_jpeg([0, 0, 0]));

    let mut session = Session::new(CaptionPolicy::KeepManual);
    session.set_caption("Foto: Anna/AP");
    load_sides(&mut session, left, right, Arc::new(NoExif), FallbackOrder::ArtistFirst)
        .await
        .unwrap();
    assert_eq!(session.merged(), "Anna/AP");
    assert_eq!(session.caption(), "Foto: Anna/AP");

    let outcome = embed_caption(real_jpeg([1, 2, 3]), session.caption());
    assert_eq!(
        iptc::find_creator(&outcome.bytes).unwrap().as_deref(),
        Some("Foto: Anna/AP")
    );
}

#[tokio::test]
async fn untagged_images_export_without_metadata() {
    let dir = TempDir::new().unwrap();
    let left = write(&dir, "a.jpg", &real_jpeg([0, 0, 0]));
    let right = write(&dir, "b.jpg", &real_jpeg([0, 0, 0]));

    let mut session = Session::default();
    load_sides(&mut session, left, right, Arc::new(NoExif), FallbackOrder::ArtistFirst)
        .await
        .unwrap();
    assert_eq!(session.caption(), "");

    let composed = real_jpeg([5, 5, 5]);
    let outcome = embed_caption(composed.clone(), session.caption());
    assert!(!outcome.embedded);
    assert_eq!(outcome.bytes, composed);
}

// ── EXIF fallback through nom-exif ───────────────────────────────────

#[tokio::test]
async fn reads_exif_artist_from_file() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "exif.jpg", &exif_jpeg("Kim Svensson", "(c) Bildbyran"));

    let tags = NomExifSource.load_metadata(&path).await.unwrap();
    assert!(tags.get_tag("Artist").unwrap().contains("Kim Svensson"));
    assert!(tags.get_tag("Copyright").unwrap().contains("Bildbyran"));

    let m = pipeline::extract_creator(Side::Left, &path, &NomExifSource, FallbackOrder::ArtistFirst)
        .await
        .unwrap();
    assert_eq!(m.source, CreatorSource::ExifArtist);
    assert_eq!(m.cleaned_value, "Kim Svensson");
}

#[tokio::test]
async fn iptc_takes_precedence_over_real_exif() {
    let dir = TempDir::new().unwrap();
    let bytes = iptc::embed_creator(&exif_jpeg("Kim Svensson", "(c) Kim"), "Per Persson/TT")
        .unwrap()
        .0;
    let path = write(&dir, "both.jpg", &bytes);

    let m = pipeline::extract_creator(Side::Right, &path, &NomExifSource, FallbackOrder::ArtistFirst)
        .await
        .unwrap();
    assert_eq!(m.source, CreatorSource::Iptc);
    assert_eq!(m.cleaned_value, "Per Persson/TT");
}

#[tokio::test]
async fn image_without_exif_yields_no_tags() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "plain.jpg", &real_jpeg([0, 0, 0]));
    let tags = NomExifSource.load_metadata(&path).await.unwrap();
    assert_eq!(tags, ExifTags::default());
}
