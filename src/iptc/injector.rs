use super::cursor::ByteWriter;
use super::resource::{IPTC_RESOURCE_ID, PHOTOSHOP_SIGNATURE, RESOURCE_SIGNATURE};
use super::segment::{APP13, SOI};
use crate::error::{Error, Result};

// signature (14) + "8BIM" (4) + resource id (2) + empty name (2) + data length (4)
const RESOURCE_HEADER_LEN: usize = 26;

/// Largest IPTC payload that fits one APP13 segment, leaving room for the pad byte.
pub const MAX_IPTC_PAYLOAD: usize = u16::MAX as usize - 2 - RESOURCE_HEADER_LEN - 1;

/// Build a complete APP13 segment (marker included) carrying `iptc` as
/// Photoshop resource 0x0404.
pub fn build_app13_segment(iptc: &[u8]) -> Result<Vec<u8>> {
    if iptc.len() > MAX_IPTC_PAYLOAD {
        return Err(Error::Injection(format!(
            "IPTC payload of {} bytes does not fit one APP13 segment (max {MAX_IPTC_PAYLOAD})",
            iptc.len()
        )));
    }

    let padding = iptc.len() % 2;
    let content_len = RESOURCE_HEADER_LEN + iptc.len() + padding;

    let mut writer = ByteWriter::with_capacity(4 + content_len);
    writer
        .put_u16_be(APP13)
        .put_u16_be((content_len + 2) as u16)
        .put_bytes(PHOTOSHOP_SIGNATURE)
        .put_bytes(RESOURCE_SIGNATURE)
        .put_u16_be(IPTC_RESOURCE_ID)
        .put_u8(0) // empty name
        .put_u8(0) // name padding
        .put_u32_be(iptc.len() as u32)
        .put_bytes(iptc);
    if padding == 1 {
        writer.put_u8(0);
    }
    Ok(writer.into_inner())
}

/// Splice a new IPTC APP13 segment into `jpeg` right after SOI.
///
/// An APP13 segment sitting directly after SOI is replaced; otherwise the new
/// segment is inserted in front of whatever came first. Everything after the
/// insertion point is copied unchanged.
pub fn inject(jpeg: &[u8], iptc: &[u8]) -> Result<Vec<u8>> {
    if jpeg.len() < 2 || u16::from_be_bytes([jpeg[0], jpeg[1]]) != SOI {
        return Err(Error::NotJpeg);
    }

    let resume_at = if jpeg.get(2..4) == Some(&APP13.to_be_bytes()[..]) {
        let length = jpeg
            .get(4..6)
            .map(|b| u16::from_be_bytes([b[0], b[1]]) as usize)
            .ok_or_else(|| Error::Injection("existing APP13 segment has no length field".into()))?;
        let end = 4 + length;
        if length < 2 || end > jpeg.len() {
            return Err(Error::Injection(format!(
                "existing APP13 segment declares {length} bytes but the stream has {}",
                jpeg.len() - 4
            )));
        }
        log::debug!("Replacing existing APP13 segment ({length} bytes)");
        end
    } else {
        2
    };

    let segment = build_app13_segment(iptc)?;
    let mut out = Vec::with_capacity(2 + segment.len() + jpeg.len() - resume_at);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&segment);
    out.extend_from_slice(&jpeg[resume_at..]);
    Ok(out)
}
