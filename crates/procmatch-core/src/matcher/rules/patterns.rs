//! Regex patterns shared by the matching rules.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Bare procedure code: 6 to 10 digits standing alone
    pub static ref PROCEDURE_CODE: Regex = Regex::new(r"\b\d{6,10}\b").unwrap();
}

/// Characters that end a physical OCR line.
pub const LINE_BREAKS: [char; 6] = ['\n', '\r', '\u{0b}', '\u{0c}', '\u{2028}', '\u{2029}'];

/// Split text into physical lines on any line-break character.
///
/// `\r\n` yields an extra empty piece, which callers drop as blank.
pub fn physical_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split(LINE_BREAKS)
}
