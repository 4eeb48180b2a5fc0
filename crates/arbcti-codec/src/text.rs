//! Text encodings for fixed-width byte-array fields.

use crate::field::TextEncoding;

/// Encode `text`, returning `None` when the encoding cannot represent it.
pub fn encode(text: &str, encoding: TextEncoding) -> Option<Vec<u8>> {
    match encoding {
        TextEncoding::Ascii => text.is_ascii().then(|| text.as_bytes().to_vec()),
        TextEncoding::Utf8 => Some(text.as_bytes().to_vec()),
        TextEncoding::Utf16Le => Some(text.encode_utf16().flat_map(u16::to_le_bytes).collect()),
    }
}

/// Decode a field and strip trailing NUL characters.
///
/// UTF-8 drops invalid sequences. ASCII rejects bytes above 0x7F.
pub fn decode(raw: &[u8], encoding: TextEncoding) -> Option<String> {
    let text = match encoding {
        TextEncoding::Ascii => {
            if !raw.is_ascii() {
                return None;
            }
            raw.iter().copied().map(char::from).collect::<String>()
        }
        TextEncoding::Utf8 => {
            let mut out = String::with_capacity(raw.len());
            for chunk in raw.utf8_chunks() {
                out.push_str(chunk.valid());
            }
            out
        }
        TextEncoding::Utf16Le => {
            let units: Vec<u16> = raw
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
    };
    Some(text.trim_end_matches('\0').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_rejects_non_ascii() {
        assert!(encode("volts", TextEncoding::Ascii).is_some());
        assert!(encode("µV", TextEncoding::Ascii).is_none());
        assert!(decode(&[b'o', b'k', 0xC2], TextEncoding::Ascii).is_none());
    }

    #[test]
    fn utf8_drops_invalid_bytes() {
        let raw = [b'a', 0xFF, b'b', 0, 0];
        assert_eq!(decode(&raw, TextEncoding::Utf8).as_deref(), Some("ab"));
    }

    #[test]
    fn utf16_is_two_bytes_per_unit() {
        let bytes = encode("ab", TextEncoding::Utf16Le).unwrap();
        assert_eq!(bytes, [b'a', 0, b'b', 0]);

        let mut padded = bytes.clone();
        padded.extend_from_slice(&[0; 6]);
        assert_eq!(decode(&padded, TextEncoding::Utf16Le).as_deref(), Some("ab"));
    }

    #[test]
    fn interior_nul_is_kept() {
        let raw = [b'a', 0, b'b', 0, 0];
        assert_eq!(decode(&raw, TextEncoding::Utf8).as_deref(), Some("a\0b"));
    }
}
