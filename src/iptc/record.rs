use super::cursor::ByteCursor;
use crate::error::{Error, Result};

/// Byte that introduces every IPTC-IIM dataset.
pub const TAG_MARKER: u8 = 0x1C;
/// Record 2, the Application Record.
pub const APPLICATION_RECORD: u8 = 2;
/// 2:80 By-line / Creator.
pub const DATASET_CREATOR: u8 = 0x50;
/// 2:65 Originating Program.
pub const DATASET_SOFTWARE: u8 = 0x41;
/// 2:116 Copyright Notice.
pub const DATASET_COPYRIGHT: u8 = 0x74;
/// Largest length expressible in the standard (non-extended) 2-byte form.
pub const MAX_STANDARD_LENGTH: usize = 0x7FFF;

// marker + record + dataset + length
const HEADER_LEN: usize = 5;

/// One IPTC-IIM dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IptcRecord<'a> {
    pub record: u8,
    pub dataset: u8,
    pub data: &'a [u8],
}

impl IptcRecord<'_> {
    pub fn is(&self, record: u8, dataset: u8) -> bool {
        self.record == record && self.dataset == dataset
    }

    /// Data decoded as UTF-8 (invalid sequences replaced) and trimmed.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(self.data).trim().to_string()
    }
}

/// Iterator over the datasets of an IPTC-IIM payload. See [`parse_records`].
#[derive(Debug)]
pub struct RecordParser<'a> {
    cursor: ByteCursor<'a>,
    done: bool,
}

/// Parse the TLV datasets of an IPTC-IIM payload (the data of 8BIM resource 0x0404).
///
/// Bytes where a tag marker is expected but missing are skipped one at a
/// time. An extended-length dataset ends the iteration with
/// [`Error::ExtendedLength`].
pub fn parse_records(payload: &[u8]) -> RecordParser<'_> {
    RecordParser {
        cursor: ByteCursor::new(payload),
        done: false,
    }
}

impl<'a> RecordParser<'a> {
    fn next_record(&mut self) -> Result<Option<IptcRecord<'a>>> {
        while self.cursor.remaining() >= HEADER_LEN {
            if self.cursor.peek_bytes(1)?[0] != TAG_MARKER {
                self.cursor.skip(1)?;
                continue;
            }

            let offset = self.cursor.position();
            self.cursor.skip(1)?;
            let record = self.cursor.read_u8()?;
            let dataset = self.cursor.read_u8()?;
            let length = self.cursor.read_u16_be()?;

            if length as usize > MAX_STANDARD_LENGTH {
                return Err(Error::ExtendedLength {
                    offset,
                    record,
                    dataset,
                    length,
                });
            }

            let data = self.cursor.read_bytes(length as usize)?;
            return Ok(Some(IptcRecord {
                record,
                dataset,
                data,
            }));
        }
        Ok(None)
    }
}

impl<'a> Iterator for RecordParser<'a> {
    type Item = Result<IptcRecord<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
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

/// First non-empty 2:80 Creator value in an IPTC-IIM payload.
pub fn find_creator(payload: &[u8]) -> Result<Option<String>> {
    for record in parse_records(payload) {
        let record = record?;
        if record.is(APPLICATION_RECORD, DATASET_CREATOR) {
            let text = record.text();
            if !text.is_empty() {
                return Ok(Some(text));
            }
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(record: u8, dataset: u8, data: &[u8]) -> Vec<u8> {
        let mut out = vec![TAG_MARKER, record, dataset];
        out.extend_from_slice(&(data.len() as u16).to_be_bytes());
        out.extend_from_slice(data);
        out
    }

    #[test]
    fn parses_consecutive_records() {
        let mut data = dataset(2, 0x00, &[0x00, 0x04]);
        data.extend(dataset(2, DATASET_CREATOR, b"Jane Doe"));
        data.extend(dataset(2, DATASET_COPYRIGHT, b"(c) Jane"));

        let records: Vec<_> = parse_records(&data).map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 3);
        assert!(records[1].is(2, 0x50));
        assert_eq!(records[1].data, b"Jane Doe");
        assert_eq!(records[2].dataset, 116);
    }

    #[test]
    fn skips_misaligned_bytes() {
        let mut data = vec![0x00, 0x07, 0xFF];
        data.extend(dataset(2, DATASET_CREATOR, b"Kim"));
        let records: Vec<_> = parse_records(&data).map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].data, b"Kim");
    }

    #[test]
    fn zero_length_record_at_end() {
        let data = dataset(2, DATASET_SOFTWARE, b"");
        let records: Vec<_> = parse_records(&data).map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 1);
        assert!(records[0].data.is_empty());
    }

    #[test]
    fn extended_length_is_reported() {
        let data = [TAG_MARKER, 2, DATASET_CREATOR, 0x80, 0x04, 0, 0, 0x01, 0x00];
        let results: Vec<_> = parse_records(&data).collect();
        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0],
            Err(Error::ExtendedLength {
                offset: 0,
                record: 2,
                dataset: 0x50,
                length: 0x8004
            })
        ));
    }

    #[test]
    fn length_beyond_payload_is_an_error() {
        let data = [TAG_MARKER, 2, DATASET_CREATOR, 0x00, 0x20, b'a', b'b'];
        let results: Vec<_> = parse_records(&data).collect();
        assert!(matches!(results[0], Err(Error::UnexpectedEof { .. })));
    }

    // ── find_creator ─────────────────────────────────────────────────

    #[test]
    fn finds_trimmed_creator() {
        let mut data = dataset(2, DATASET_SOFTWARE, b"Editor");
        data.extend(dataset(2, DATASET_CREATOR, "  Åsa Öberg/TT \n".as_bytes()));
        assert_eq!(find_creator(&data).unwrap().as_deref(), Some("Åsa Öberg/TT"));
    }

    #[test]
    fn ignores_creator_dataset_in_other_records() {
        let data = dataset(1, DATASET_CREATOR, b"Envelope");
        assert_eq!(find_creator(&data).unwrap(), None);
    }

    #[test]
    fn blank_creator_counts_as_absent() {
        let mut data = dataset(2, DATASET_CREATOR, b"   ");
        data.extend(dataset(2, DATASET_CREATOR, b"Second"));
        assert_eq!(find_creator(&data).unwrap().as_deref(), Some("Second"));
        assert_eq!(find_creator(&dataset(2, DATASET_CREATOR, b" ")).unwrap(), None);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let data = dataset(2, DATASET_CREATOR, b"Ann\xFF");
        assert_eq!(find_creator(&data).unwrap().as_deref(), Some("Ann\u{FFFD}"));
    }

    #[test]
    fn empty_payload() {
        assert_eq!(parse_records(&[]).count(), 0);
        assert_eq!(find_creator(&[]).unwrap(), None);
    }
}
