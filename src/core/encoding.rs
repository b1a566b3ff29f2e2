//! XML Encoding Detection and Conversion
//!
//! Handles UTF-16 input: detects endianness from the BOM (or from the
//! configured hint) and converts to UTF-8 for parsing. UTF-8 input passes
//! through untouched apart from BOM stripping.

use crate::options::Encoding;

/// Detected encoding of raw XML input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DetectedEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
}

/// Detect encoding from byte order mark or initial bytes
fn detect(input: &[u8]) -> DetectedEncoding {
    if input.len() < 2 {
        return DetectedEncoding::Utf8;
    }

    // Check for BOM
    match (input[0], input[1]) {
        // UTF-16 LE BOM: 0xFF 0xFE
        (0xFF, 0xFE) => DetectedEncoding::Utf16Le,
        // UTF-16 BE BOM: 0xFE 0xFF
        (0xFE, 0xFF) => DetectedEncoding::Utf16Be,
        // UTF-8 BOM: 0xEF 0xBB 0xBF (detected but treated as UTF-8)
        (0xEF, 0xBB) if input.len() >= 3 && input[2] == 0xBF => DetectedEncoding::Utf8,
        // No BOM - check for UTF-16 pattern (< followed by null or null followed by <)
        (0x00, b'<') => DetectedEncoding::Utf16Be,
        (b'<', 0x00) => DetectedEncoding::Utf16Le,
        _ => DetectedEncoding::Utf8,
    }
}

/// Convert raw input bytes to UTF-8 under the configured encoding.
///
/// With [`Encoding::Utf8`] the BOM (if any) is stripped and a stray UTF-16
/// BOM still triggers conversion. [`Encoding::Utf16`] takes endianness from
/// the BOM and falls back to big-endian, per the XML spec's default.
pub fn convert_to_utf8(input: Vec<u8>, hint: Encoding) -> Result<Vec<u8>, String> {
    let detected = match hint {
        Encoding::Utf8 => detect(&input),
        Encoding::Utf16 => match detect(&input) {
            DetectedEncoding::Utf16Le => DetectedEncoding::Utf16Le,
            _ => DetectedEncoding::Utf16Be,
        },
        Encoding::Utf16Le => DetectedEncoding::Utf16Le,
        Encoding::Utf16Be => DetectedEncoding::Utf16Be,
    };

    match detected {
        DetectedEncoding::Utf8 => {
            // Skip UTF-8 BOM if present
            if input.starts_with(&[0xEF, 0xBB, 0xBF]) {
                Ok(input[3..].to_vec())
            } else {
                Ok(input)
            }
        }
        DetectedEncoding::Utf16Le => convert_utf16_le_to_utf8(&input),
        DetectedEncoding::Utf16Be => convert_utf16_be_to_utf8(&input),
    }
}

/// Convert UTF-16 LE to UTF-8
fn convert_utf16_le_to_utf8(input: &[u8]) -> Result<Vec<u8>, String> {
    // Skip BOM if present
    let start = if input.starts_with(&[0xFF, 0xFE]) { 2 } else { 0 };
    let bytes = &input[start..];

    // Ensure even number of bytes
    if bytes.len() % 2 != 0 {
        return Err("Invalid UTF-16 LE: odd number of bytes".to_string());
    }

    // Convert pairs of bytes to u16 code units (little endian)
    let code_units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
        .collect();

    // Decode UTF-16 to String
    String::from_utf16(&code_units)
        .map(|s| s.into_bytes())
        .map_err(|e| format!("Invalid UTF-16 LE: {}", e))
}

/// Convert UTF-16 BE to UTF-8
fn convert_utf16_be_to_utf8(input: &[u8]) -> Result<Vec<u8>, String> {
    // Skip BOM if present
    let start = if input.starts_with(&[0xFE, 0xFF]) { 2 } else { 0 };
    let bytes = &input[start..];

    // Ensure even number of bytes
    if bytes.len() % 2 != 0 {
        return Err("Invalid UTF-16 BE: odd number of bytes".to_string());
    }

    // Convert pairs of bytes to u16 code units (big endian)
    let code_units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
        .collect();

    // Decode UTF-16 to String
    String::from_utf16(&code_units)
        .map(|s| s.into_bytes())
        .map_err(|e| format!("Invalid UTF-16 BE: {}", e))
}
