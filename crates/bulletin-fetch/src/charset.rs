//! Response-body decoding with charset detection.

use encoding_rs::{Encoding, UTF_8};
use once_cell::sync::Lazy;
use regex::Regex;

static META_CHARSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([A-Za-z0-9_.:\-]+)"#).unwrap());

/// How many leading bytes to scan for a `<meta charset>` declaration.
const SNIFF_WINDOW: usize = 2048;

/// Decode a response body to a `String`.
///
/// Precedence: the server's Content-Type charset, then a BOM, then a
/// `<meta charset>` declaration near the top of the document, then UTF-8
/// with replacement. Decoding never fails; a wrong label degrades to
/// replacement characters rather than an error.
pub fn decode_body(bytes: &[u8], header_charset: Option<&str>) -> String {
    if let Some(label) = header_charset {
        if let Some(encoding) = Encoding::for_label(label.trim().as_bytes()) {
            let (text, _, _) = encoding.decode(bytes);
            return text.into_owned();
        }
    }

    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        let (text, _, _) = encoding.decode(bytes);
        return text.into_owned();
    }

    if let Some(encoding) = sniff_meta_charset(bytes) {
        let (text, _, _) = encoding.decode(bytes);
        return text.into_owned();
    }

    let (text, _, _) = UTF_8.decode(bytes);
    text.into_owned()
}

/// Look for `charset=` inside the head of the document.
///
/// The window is decoded as Latin-1 first; every encoding a meta tag can
/// realistically declare is ASCII-compatible, so the label itself survives.
fn sniff_meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let window = &bytes[..bytes.len().min(SNIFF_WINDOW)];
    let head: String = window.iter().map(|&b| b as char).collect();
    let label = META_CHARSET.captures(&head)?.get(1)?.as_str();
    Encoding::for_label(label.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_charset_wins() {
        let (encoded, _, _) = encoding_rs::EUC_KR.encode("공지사항");
        let text = decode_body(&encoded, Some("euc-kr"));
        assert_eq!(text, "공지사항");
    }

    #[test]
    fn meta_charset_is_sniffed() {
        let (body, _, _) = encoding_rs::EUC_KR.encode("<html><head><meta charset=\"euc-kr\"></head><body>입학 안내</body></html>");
        let text = decode_body(&body, None);
        assert!(text.contains("입학 안내"));
    }

    #[test]
    fn plain_utf8_needs_no_hints() {
        let text = decode_body("모집 요강".as_bytes(), None);
        assert_eq!(text, "모집 요강");
    }

    #[test]
    fn unknown_label_falls_back_to_sniffing() {
        let text = decode_body("board".as_bytes(), Some("definitely-not-a-charset"));
        assert_eq!(text, "board");
    }
}
