/// Clean a creator string read from EXIF or IPTC.
///
/// 1. Drops C0 control characters and DEL.
/// 2. If the text contains `\x` or `%`, treats `\x` as `%` and tries a
///    strict percent-decode; when that fails the text from step 1 is kept.
/// 3. Trims surrounding whitespace.
///
/// Never fails: malformed input degrades to the best available string.
pub fn clean(raw: &str) -> String {
    let mut cleaned: String = raw
        .chars()
        .filter(|c| !matches!(*c, '\u{00}'..='\u{1F}' | '\u{7F}'))
        .collect();

    if cleaned.contains("\\x") || cleaned.contains('%') {
        match percent_decode(&cleaned.replace("\\x", "%")) {
            Some(decoded) => cleaned = decoded,
            None => log::debug!("Keeping {cleaned:?}: not a valid escape sequence"),
        }
    }

    cleaned.trim().to_string()
}

/// Decode `%XX` escapes. `None` for a malformed escape or a result that is not UTF-8.
fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hi = hex_value(*bytes.get(i + 1)?)?;
            let lo = hex_value(*bytes.get(i + 2)?)?;
            out.push((hi << 4) | lo);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

fn hex_value(byte: u8) -> Option<u8> {
    (byte as char).to_digit(16).map(|d| d as u8)
}
