//! Char/byte offset helpers.
//!
//! Public positions are counted in chars; regex matches work in bytes.

/// Number of chars in `text`
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Char position of a byte offset that lies on a char boundary
pub fn char_offset(text: &str, byte: usize) -> usize {
    text[..byte.min(text.len())].chars().count()
}
