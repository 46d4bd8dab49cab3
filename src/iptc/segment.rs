use super::cursor::ByteCursor;
use crate::error::{Error, Result};

pub const SOI: u16 = 0xFFD8;
pub const EOI: u16 = 0xFFD9;
pub const SOS: u16 = 0xFFDA;
pub const APP13: u16 = 0xFFED;

/// One marker segment of a JPEG stream, borrowed from the scanned buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    /// Full 16-bit marker code, e.g. `0xFFED` for APP13.
    pub marker: u16,
    /// Byte position of the marker's leading `0xFF`.
    pub offset: usize,
    /// Declared length, counting the 2-byte length field itself.
    pub content_length: u16,
    /// `content_length - 2` bytes following the length field.
    pub payload: &'a [u8],
}

impl Segment<'_> {
    pub fn is_app13(&self) -> bool {
        self.marker == APP13
    }
}

/// Iterator over the marker segments between SOI and the first SOS.
///
/// Created by [`scan`]. After an error is yielded the iterator is exhausted.
#[derive(Debug)]
pub struct SegmentScanner<'a> {
    cursor: ByteCursor<'a>,
    done: bool,
}

/// Start scanning `bytes` as a JPEG stream.
///
/// Fails with [`Error::NotJpeg`] when the stream does not open with SOI.
pub fn scan(bytes: &[u8]) -> Result<SegmentScanner<'_>> {
    let mut cursor = ByteCursor::new(bytes);
    match cursor.read_u16_be() {
        Ok(SOI) => Ok(SegmentScanner {
            cursor,
            done: false,
        }),
        _ => Err(Error::NotJpeg),
    }
}

/// RSTn and TEM markers carry no length field.
fn is_standalone(marker: u16) -> bool {
    marker == 0xFF01 || (0xFFD0..=0xFFD7).contains(&marker)
}

impl<'a> SegmentScanner<'a> {
    fn next_segment(&mut self) -> Result<Option<Segment<'a>>> {
        loop {
            let offset = self.cursor.position();
            let Ok(marker_bytes) = self.cursor.peek_bytes(2) else {
                log::debug!("JPEG stream ends at offset {offset} without SOS");
                return Ok(None);
            };

            let code = marker_bytes[1];
            if marker_bytes[0] != 0xFF || code == 0x00 || code == 0xFF {
                log::debug!(
                    "No marker at offset {offset} ({:02X} {:02X}), stopping scan",
                    marker_bytes[0],
                    code
                );
                return Ok(None);
            }
            self.cursor.skip(2)?;

            let marker = u16::from_be_bytes([0xFF, code]);
            if marker == SOS || marker == EOI {
                return Ok(None);
            }
            if is_standalone(marker) {
                continue;
            }

            let content_length = self.cursor.read_u16_be()?;
            if content_length < 2 {
                return Err(Error::InvalidSegmentLength {
                    offset,
                    length: content_length,
                });
            }

            let declared = content_length as usize - 2;
            let available = self.cursor.remaining();
            let payload = self
                .cursor
                .read_bytes(declared)
                .map_err(|_| Error::TruncatedSegment {
                    offset,
                    declared,
                    available,
                })?;

            return Ok(Some(Segment {
                marker,
                offset,
                content_length,
                payload,
            }));
        }
    }
}

impl<'a> Iterator for SegmentScanner<'a> {
    type Item = Result<Segment<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_segment() {
            Ok(Some(segment)) => Some(Ok(segment)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
