//! IPTC-IIM metadata inside JPEG APP13 segments.
//!
//! The container nesting is JPEG segment → "Photoshop 3.0" APP13 payload →
//! "8BIM" resource 0x0404 → IPTC-IIM datasets. Each layer has its own
//! iterator-based parser:
//!
//! - [`segment::scan`]: marker segments up to Start of Scan
//! - [`resource::parse_resources`]: 8BIM blocks of an APP13 payload
//! - [`record::parse_records`]: IPTC datasets of resource 0x0404
//!
//! and writing goes through [`encoder::encode_creator_block`] and
//! [`injector::inject`]. The convenience functions below tie the layers
//! together.

pub mod cursor;
pub mod encoder;
pub mod injector;
pub mod record;
pub mod resource;
pub mod segment;

pub use cursor::{ByteCursor, ByteWriter};
pub use encoder::{SOFTWARE_NAME, TruncationWarning, encode_creator_block};
pub use injector::inject;
pub use record::IptcRecord;
pub use resource::ResourceBlock;
pub use segment::Segment;

use crate::error::Result;
use record::{APPLICATION_RECORD, DATASET_COPYRIGHT, DATASET_CREATOR, DATASET_SOFTWARE};

/// Record 2 fields this crate reads and writes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IptcFields {
    /// Every 2:80 value found, in stream order.
    pub creators: Vec<String>,
    pub software: Option<String>,
    pub copyright: Option<String>,
}

/// IPTC-IIM payloads of every Photoshop resource 0x0404 in the stream.
fn iptc_payloads(jpeg: &[u8]) -> Result<Vec<&[u8]>> {
    let mut payloads = Vec::new();
    for segment in segment::scan(jpeg)? {
        let segment = segment?;
        if !segment.is_app13() {
            continue;
        }
        for block in resource::parse_resources(segment.payload) {
            let block = block?;
            if block.is_iptc() {
                payloads.push(block.data);
            }
        }
    }
    Ok(payloads)
}

/// First non-empty IPTC Creator (2:80) in a JPEG stream.
///
/// `Ok(None)` means the image simply carries no creator. The stream is
/// walked lazily and the search stops at the first creator, so damage in
/// later segments or resources does not hide it. Errors are structural
/// (not a JPEG, or lengths that run past the data) and are only reported
/// when they occur before any creator was found.
pub fn find_creator(jpeg: &[u8]) -> Result<Option<String>> {
    for segment in segment::scan(jpeg)? {
        let segment = segment?;
        if !segment.is_app13() {
            continue;
        }
        for block in resource::parse_resources(segment.payload) {
            let block = block?;
            if !block.is_iptc() {
                continue;
            }
            if let Some(creator) = record::find_creator(block.data)? {
                return Ok(Some(creator));
            }
        }
    }
    Ok(None)
}

/// Read the Creator, Originating Program and Copyright Notice datasets.
pub fn read_fields(jpeg: &[u8]) -> Result<IptcFields> {
    let mut fields = IptcFields::default();
    for payload in iptc_payloads(jpeg)? {
        for record in record::parse_records(payload) {
            let record = record?;
            if record.record != APPLICATION_RECORD {
                continue;
            }
            match record.dataset {
                DATASET_CREATOR => fields.creators.push(record.text()),
                DATASET_SOFTWARE => fields.software = Some(record.text()),
                DATASET_COPYRIGHT => fields.copyright = Some(record.text()),
                _ => {}
            }
        }
    }
    Ok(fields)
}

/// Encode `creator` and splice it into `jpeg` as the image's IPTC block.
pub fn embed_creator(jpeg: &[u8], creator: &str) -> Result<(Vec<u8>, Option<TruncationWarning>)> {
    let encoded = encode_creator_block(creator);
    let bytes = inject(jpeg, &encoded.bytes)?;
    Ok((bytes, encoded.truncation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::iptc::resource::tests::block;

    const MINIMAL: &[u8] = &[0xFF, 0xD8, 0xFF, 0xDA, 0x00, 0x02, 0x00, 0xFF, 0xD9];

    #[test]
    fn minimal_jpeg_has_no_creator() {
        assert_eq!(find_creator(MINIMAL).unwrap(), None);
        assert_eq!(read_fields(MINIMAL).unwrap(), IptcFields::default());
    }

    #[test]
    fn non_jpeg_is_a_format_error() {
        let err = find_creator(b"plain text").unwrap_err();
        assert!(matches!(err, Error::NotJpeg));
        assert!(err.is_format_error());
    }

    #[test]
    fn embed_then_read_round_trip() {
        let (out, truncation) = embed_creator(MINIMAL, "Jane Doe/John Smith/TT").unwrap();
        assert!(truncation.is_none());
        assert_eq!(find_creator(&out).unwrap().as_deref(), Some("Jane Doe/John Smith/TT"));

        let fields = read_fields(&out).unwrap();
        assert_eq!(fields.creators, vec!["Jane Doe/John Smith/TT".to_string()]);
        assert_eq!(fields.software.as_deref(), Some(SOFTWARE_NAME));
        assert_eq!(fields.copyright.as_deref(), Some("Jane Doe/John Smith/TT"));
    }

    #[test]
    fn re_embedding_replaces_the_previous_creator() {
        let (first, _) = embed_creator(MINIMAL, "Old Name/AP").unwrap();
        let (second, _) = embed_creator(&first, "New Name").unwrap();

        let fields = read_fields(&second).unwrap();
        assert_eq!(fields.creators, vec!["New Name".to_string()]);
        assert!(!second.windows(11).any(|w| w == b"Old Name/AP"));
    }

    // ── damage after the creator ─────────────────────────────────────

    fn app13(payload: &[u8]) -> Vec<u8> {
        let mut out = vec![0xFF, 0xED];
        out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
        out.extend_from_slice(payload);
        out
    }

    fn iptc_block() -> Vec<u8> {
        block(0x0404, b"", &encode_creator_block("Jane Doe/TT").bytes)
    }

    #[test]
    fn creator_survives_truncated_later_segment() {
        let mut jpeg = vec![0xFF, 0xD8];
        let mut payload = resource::PHOTOSHOP_SIGNATURE.to_vec();
        payload.extend(iptc_block());
        jpeg.extend(app13(&payload));
        // APP1 declaring 4094 payload bytes with only 2 present.
        jpeg.extend([0xFF, 0xE1, 0x10, 0x00, 0x01, 0x02]);

        assert_eq!(find_creator(&jpeg).unwrap().as_deref(), Some("Jane Doe/TT"));
        assert!(matches!(
            read_fields(&jpeg),
            Err(Error::TruncatedSegment { declared: 4094, .. })
        ));
    }

    #[test]
    fn creator_survives_truncated_later_resource() {
        let mut payload = resource::PHOTOSHOP_SIGNATURE.to_vec();
        payload.extend(iptc_block());
        // 8BIM 0x040C declaring 0x4000 data bytes with only 2 present.
        payload.extend_from_slice(b"8BIM\x04\x0C\x00\x00\x00\x00\x40\x00\xAA\xBB");
        let mut jpeg = vec![0xFF, 0xD8];
        jpeg.extend(app13(&payload));
        jpeg.extend([0xFF, 0xD9]);

        assert_eq!(find_creator(&jpeg).unwrap().as_deref(), Some("Jane Doe/TT"));
    }

    #[test]
    fn damage_before_any_creator_is_reported() {
        let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1, 0x10, 0x00, 0x01, 0x02];
        jpeg.extend(app13(resource::PHOTOSHOP_SIGNATURE));
        assert!(find_creator(&jpeg).unwrap_err().is_format_error());
    }

    #[test]
    fn multibyte_round_trip() {
        let (out, _) = embed_creator(MINIMAL, "Åsa Öberg").unwrap();
        assert_eq!(find_creator(&out).unwrap().as_deref(), Some("Åsa Öberg"));
    }
}
