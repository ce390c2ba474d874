//! Byte-order-mark detection and re-encoding.
//!
//! Revit writes shared parameter files as UTF-16LE with a BOM, while hand
//! edited copies are usually UTF-8. The detected encoding travels with the
//! document so a rewrite produces the same kind of file.

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};

use crate::error::{SharedParamError, SharedParamResult};
use crate::models::TextEncoding;

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];
const UTF16LE_BOM: [u8; 2] = [0xFF, 0xFE];
const UTF16BE_BOM: [u8; 2] = [0xFE, 0xFF];

/// Decode raw file bytes, returning the text without its BOM.
///
/// Malformed input is an error rather than being replaced.
pub fn decode(bytes: &[u8]) -> SharedParamResult<(String, TextEncoding)> {
    let (encoding, bom_len) = Encoding::for_bom(bytes).unwrap_or((UTF_8, 0));
    let text_encoding = if encoding == UTF_16LE {
        TextEncoding::Utf16LeBom
    } else if encoding == UTF_16BE {
        TextEncoding::Utf16BeBom
    } else if bom_len > 0 {
        TextEncoding::Utf8Bom
    } else {
        TextEncoding::Utf8
    };

    let text = encoding
        .decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
        .ok_or_else(|| SharedParamError::Encoding(format!("invalid {} content", encoding.name())))?;
    Ok((text.into_owned(), text_encoding))
}

/// Encode text in the given encoding, prefixing the BOM where it has one.
pub fn encode(text: &str, encoding: TextEncoding) -> Vec<u8> {
    match encoding {
        TextEncoding::Utf8 => text.as_bytes().to_vec(),
        TextEncoding::Utf8Bom => {
            let mut out = Vec::with_capacity(UTF8_BOM.len() + text.len());
            out.extend_from_slice(&UTF8_BOM);
            out.extend_from_slice(text.as_bytes());
            out
        }
        TextEncoding::Utf16LeBom => {
            let mut out = UTF16LE_BOM.to_vec();
            out.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
            out
        }
        TextEncoding::Utf16BeBom => {
            let mut out = UTF16BE_BOM.to_vec();
            out.extend(text.encode_utf16().flat_map(u16::to_be_bytes));
            out
        }
    }
}
