//! Structural precheck: cheap rejection before full parsing
//!
//! Catches the common typos with a clear message, and rejects named
//! entity references that only a DTD could resolve.

use crate::{Error, Result};

const PREDEFINED_ENTITIES: [&str; 5] = ["lt", "gt", "amp", "apos", "quot"];

/// Check raw input before it reaches the parser
///
/// # Errors
/// - `InvalidInput` when the input is empty or whitespace only
/// - `MalformedXml` when `<` and `>` counts differ
/// - `MalformedXml` for an entity reference that is neither predefined nor
///   a syntactically valid numeric character reference. Comments, CDATA,
///   processing instructions and the DOCTYPE are not scanned for references.
pub fn check(xml: &str) -> Result<()> {
    if xml.trim().is_empty() {
        return Err(Error::InvalidInput("input is empty".to_string()));
    }
    check_angle_brackets(xml)?;
    check_entities(xml)
}

fn check_angle_brackets(xml: &str) -> Result<()> {
    let (opens, closes) = xml.bytes().fold((0usize, 0usize), |(o, c), b| match b {
        b'<' => (o + 1, c),
        b'>' => (o, c + 1),
        _ => (o, c),
    });
    if opens != closes {
        return Err(Error::malformed(format!(
            "unbalanced markup: {} '<' but {} '>'",
            opens, closes
        )));
    }
    Ok(())
}

fn check_entities(xml: &str) -> Result<()> {
    let bytes = xml.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let rest = &bytes[i..];
        if rest.starts_with(b"<!--") {
            i += skip_past(rest, b"-->");
            continue;
        }
        if rest.starts_with(b"<![CDATA[") {
            i += skip_past(rest, b"]]>");
            continue;
        }
        if rest.starts_with(b"<?") {
            i += skip_past(rest, b"?>");
            continue;
        }
        if rest.starts_with(b"<!DOCTYPE") {
            i += skip_doctype(rest);
            continue;
        }
        if bytes[i] == b'&' {
            if let Some(name) = reference_name(&rest[1..]) {
                if !is_valid_reference(name) {
                    return Err(Error::malformed_at(
                        format!("unknown entity reference &{};", name),
                        xml,
                        i,
                    ));
                }
                i += name.len() + 2;
                continue;
            }
        }
        i += 1;
    }
    Ok(())
}

/// Bytes to skip so that `haystack` is consumed through `terminator`,
/// or all of it when the terminator is missing
fn skip_past(haystack: &[u8], terminator: &[u8]) -> usize {
    haystack
        .windows(terminator.len())
        .position(|w| w == terminator)
        .map(|p| p + terminator.len())
        .unwrap_or(haystack.len())
}

/// A DOCTYPE ends at the first `>`, or at `]>` when it has an internal subset
fn skip_doctype(rest: &[u8]) -> usize {
    let close = rest.iter().position(|&b| b == b'>');
    let subset = rest.iter().position(|&b| b == b'[');
    match (subset, close) {
        (Some(open), Some(end)) if open < end => skip_past(rest, b"]>"),
        _ => skip_past(rest, b">"),
    }
}

/// Name between `&` and `;`, if the bytes form a reference at all.
/// A bare `&` is left for the parser to report.
fn reference_name(after_amp: &[u8]) -> Option<&str> {
    let len = after_amp
        .iter()
        .take_while(|&&b| b.is_ascii_alphanumeric() || matches!(b, b'#' | b'_' | b'-' | b'.' | b':'))
        .count();
    if len == 0 || after_amp.get(len) != Some(&b';') {
        return None;
    }
    std::str::from_utf8(&after_amp[..len]).ok()
}

fn is_valid_reference(name: &str) -> bool {
    if PREDEFINED_ENTITIES.contains(&name) {
        return true;
    }
    if let Some(hex) = name.strip_prefix("#x") {
        return !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit());
    }
    if let Some(dec) = name.strip_prefix('#') {
        return !dec.is_empty() && dec.bytes().all(|b| b.is_ascii_digit());
    }
    false
}
