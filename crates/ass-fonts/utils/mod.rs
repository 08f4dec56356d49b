//! Shared utilities: the attachment codec, text encodings and errors

pub mod encoding;
pub mod errors;
pub mod uu;

pub use errors::{CoreError, ErrorCategory, Result};

/// Read a style flag such as `Bold: -1` or an override value such as `\b700`
///
/// Only the leading signed integer counts; anything unparsable is `false`.
#[must_use]
pub fn parse_flag(value: &str) -> bool {
    value
        .strip_prefix(['+', '-'])
        .unwrap_or(value)
        .chars()
        .take_while(char::is_ascii_digit)
        .any(|digit| digit != '0')
}

#[cfg(test)]
mod tests {
    use super::parse_flag;

    #[test]
    fn flags() {
        assert!(parse_flag("-1"));
        assert!(parse_flag("1"));
        assert!(parse_flag("700"));
        assert!(parse_flag("+2px"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("-0"));
        assert!(!parse_flag(""));
        assert!(!parse_flag("yes"));
    }
}
