use super::cursor::ByteCursor;
use crate::error::Result;

/// Signature that opens a Photoshop APP13 payload.
pub const PHOTOSHOP_SIGNATURE: &[u8; 14] = b"Photoshop 3.0\0";
/// Signature of each image resource block.
pub const RESOURCE_SIGNATURE: &[u8; 4] = b"8BIM";
/// Resource ID of the IPTC-IIM block.
pub const IPTC_RESOURCE_ID: u16 = 0x0404;

// signature (4) + id (2) + empty name (2) + data length (4)
const MIN_BLOCK_LEN: usize = 12;

/// A Photoshop image resource block ("8BIM" block).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceBlock<'a> {
    pub resource_id: u16,
    /// Pascal-string name without its length byte or padding. Usually empty.
    pub name: &'a [u8],
    pub data: &'a [u8],
}

impl ResourceBlock<'_> {
    pub fn is_iptc(&self) -> bool {
        self.resource_id == IPTC_RESOURCE_ID
    }
}

/// Iterator over the resource blocks of an APP13 payload. See [`parse_resources`].
#[derive(Debug)]
pub struct ResourceParser<'a> {
    cursor: ByteCursor<'a>,
    done: bool,
}

/// Parse the "8BIM" blocks of an APP13 payload.
///
/// Payloads that do not start with `"Photoshop 3.0\0"` belong to other
/// software and yield nothing. Bytes between blocks that are not an "8BIM"
/// signature are skipped one at a time.
pub fn parse_resources(payload: &[u8]) -> ResourceParser<'_> {
    let mut cursor = ByteCursor::new(payload);
    let done = !payload.starts_with(PHOTOSHOP_SIGNATURE);
    if !done {
        cursor.skip_padding(PHOTOSHOP_SIGNATURE.len());
    }
    ResourceParser { cursor, done }
}

impl<'a> ResourceParser<'a> {
    fn next_block(&mut self) -> Result<Option<ResourceBlock<'a>>> {
        while self.cursor.remaining() >= MIN_BLOCK_LEN {
            if self.cursor.peek_bytes(4)? != RESOURCE_SIGNATURE {
                self.cursor.skip(1)?;
                continue;
            }
            self.cursor.skip(4)?;

            let resource_id = self.cursor.read_u16_be()?;

            // The name is a Pascal string padded so that length byte + text is even.
            let name_len = self.cursor.read_u8()? as usize;
            let name = if name_len == 0 {
                self.cursor.skip(1)?;
                &[][..]
            } else {
                let name = self.cursor.read_bytes(name_len)?;
                if (name_len + 1) % 2 != 0 {
                    self.cursor.skip(1)?;
                }
                name
            };

            let data_len = self.cursor.read_u32_be()? as usize;
            let data = self.cursor.read_bytes(data_len)?;
            if data_len % 2 != 0 {
                self.cursor.skip_padding(1);
            }

            log::debug!(
                "8BIM resource 0x{resource_id:04X} ({} bytes)",
                data.len()
            );
            return Ok(Some(ResourceBlock {
                resource_id,
                name,
                data,
            }));
        }
        Ok(None)
    }
}

impl<'a> Iterator for ResourceParser<'a> {
    type Item = Result<ResourceBlock<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_block() {
            Ok(Some(block)) => Some(Ok(block)),
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
