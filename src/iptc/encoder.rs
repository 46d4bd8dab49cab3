use super::cursor::ByteWriter;
use super::injector::MAX_IPTC_PAYLOAD;
use super::record::{
    APPLICATION_RECORD, DATASET_COPYRIGHT, DATASET_CREATOR, DATASET_SOFTWARE, MAX_STANDARD_LENGTH,
    TAG_MARKER,
};

/// Value written to 2:65 Originating Program.
pub const SOFTWARE_NAME: &str = "The Banfinator";

/// The creator text did not fit the standard IPTC length field and was cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruncationWarning {
    /// UTF-8 length of the text as given.
    pub original_len: usize,
    /// UTF-8 length actually written.
    pub kept_len: usize,
}

/// IPTC-IIM datasets ready to be wrapped in an 8BIM resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedCreator {
    pub bytes: Vec<u8>,
    pub truncation: Option<TruncationWarning>,
}

/// Encode `text` as Creator (2:80), Originating Program (2:65) and
/// Copyright Notice (2:116).
///
/// Text longer than 32767 UTF-8 bytes is cut at the last character boundary
/// that fits; extended-length datasets are never written. The result always
/// fits a single APP13 segment: near the limit the Copyright Notice copy is
/// shortened, the Creator never is.
pub fn encode_creator_block(text: &str) -> EncodedCreator {
    let (creator, truncation) = fit_within(text, MAX_STANDARD_LENGTH);
    if truncation.is_some() {
        log::warn!(
            "Creator text is {} bytes, truncated to {} for IPTC",
            text.len(),
            creator.len()
        );
    }

    let copyright_budget =
        MAX_IPTC_PAYLOAD - 3 * DATASET_HEADER_LEN - creator.len() - SOFTWARE_NAME.len();
    let (copyright, _) = fit_within(creator, copyright_budget);
    if copyright.len() < creator.len() {
        log::debug!(
            "Copyright Notice shortened to {} bytes to fit one APP13 segment",
            copyright.len()
        );
    }

    let mut writer = ByteWriter::with_capacity(
        3 * DATASET_HEADER_LEN + creator.len() + copyright.len() + SOFTWARE_NAME.len(),
    );
    put_dataset(&mut writer, DATASET_CREATOR, creator.as_bytes());
    put_dataset(&mut writer, DATASET_SOFTWARE, SOFTWARE_NAME.as_bytes());
    put_dataset(&mut writer, DATASET_COPYRIGHT, copyright.as_bytes());

    EncodedCreator {
        bytes: writer.into_inner(),
        truncation,
    }
}

const DATASET_HEADER_LEN: usize = 5;

/// Longest prefix of `text` that is at most `max` bytes and ends on a char boundary.
fn fit_within(text: &str, max: usize) -> (&str, Option<TruncationWarning>) {
    if text.len() <= max {
        return (text, None);
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    (
        &text[..end],
        Some(TruncationWarning {
            original_len: text.len(),
            kept_len: end,
        }),
    )
}

fn put_dataset(writer: &mut ByteWriter, dataset: u8, data: &[u8]) {
    // Callers guarantee data.len() <= MAX_STANDARD_LENGTH.
    writer
        .put_u8(TAG_MARKER)
        .put_u8(APPLICATION_RECORD)
        .put_u8(dataset)
        .put_u16_be(data.len() as u16)
        .put_bytes(data);
}
