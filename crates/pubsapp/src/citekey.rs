//! Citekey rules and disambiguation suffixes.
//!
//! A citekey doubles as a file stem in every store, so it must be usable as a
//! single path component:
//! - Must not be empty
//! - Cannot contain whitespace or control characters
//! - Cannot contain path separators (`/`, `\`)
//! - Cannot start with a dot (hidden files are reserved for temp writes)
//!
//! When a key is taken, [`candidates`] yields `base + base27(n)` for `n = 1, 2, …`,
//! i.e. `Doe2013a`, `Doe2013b`, …, `Doe2013z`, `Doe2013aa`, …

use crate::error::{PubsError, Result};

/// Encodes `n` in bijective base-26 over `a..=z`.
///
/// `0` maps to the empty string, `1..=26` to `a..=z`, `27` to `aa` and so on.
///
/// ```
/// use pubsapp::citekey::base27;
///
/// assert_eq!(base27(0), "");
/// assert_eq!(base27(1), "a");
/// assert_eq!(base27(26), "z");
/// assert_eq!(base27(27), "aa");
/// assert_eq!(base27(28), "ab");
/// ```
pub fn base27(mut n: u64) -> String {
    let mut digits = Vec::new();
    while n > 0 {
        n -= 1;
        digits.push(b'a' + (n % 26) as u8);
        n /= 26;
    }
    digits.iter().rev().map(|&d| d as char).collect()
}

/// Inverse of [`base27`]. Returns `None` for characters outside `a..=z` or on
/// overflow.
pub fn decode_base27(s: &str) -> Option<u64> {
    s.chars().try_fold(0u64, |acc, ch| {
        if !ch.is_ascii_lowercase() {
            return None;
        }
        let digit = (ch as u8 - b'a' + 1) as u64;
        acc.checked_mul(26)?.checked_add(digit)
    })
}

/// Suffixed alternatives for `base`, starting at `base + "a"`.
///
/// Never yields `base` itself; callers check the bare key first.
pub fn candidates(base: &str) -> impl Iterator<Item = String> + '_ {
    (1u64..).map(move |n| format!("{}{}", base, base27(n)))
}

/// Validates a citekey against the naming rules above.
///
/// ```
/// use pubsapp::citekey::validate_citekey;
///
/// assert!(validate_citekey("Doe2013").is_ok());
/// assert!(validate_citekey("turing1950computing").is_ok());
/// assert!(validate_citekey("knuth:1984").is_ok());
///
/// assert!(validate_citekey("").is_err());
/// assert!(validate_citekey("Doe 2013").is_err());
/// assert!(validate_citekey("../Doe").is_err());
/// assert!(validate_citekey(".hidden").is_err());
/// ```
pub fn validate_citekey(key: &str) -> std::result::Result<(), CiteKeyError> {
    if key.is_empty() {
        return Err(CiteKeyError::Empty);
    }
    if key.starts_with('.') {
        return Err(CiteKeyError::LeadingDot);
    }
    for ch in key.chars() {
        if ch.is_whitespace() {
            return Err(CiteKeyError::Whitespace);
        }
        if ch == '/' || ch == '\\' {
            return Err(CiteKeyError::PathSeparator(ch));
        }
        if ch.is_control() {
            return Err(CiteKeyError::ControlCharacter);
        }
    }
    Ok(())
}

/// [`validate_citekey`] lifted into the crate error type.
pub fn check_citekey(key: &str) -> Result<()> {
    validate_citekey(key).map_err(|e| PubsError::InvalidCiteKey {
        citekey: key.to_string(),
        reason: e.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CiteKeyError {
    Empty,
    LeadingDot,
    Whitespace,
    PathSeparator(char),
    ControlCharacter,
}

impl std::fmt::Display for CiteKeyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CiteKeyError::Empty => write!(f, "citekey cannot be empty"),
            CiteKeyError::LeadingDot => write!(f, "citekey cannot start with a dot"),
            CiteKeyError::Whitespace => write!(f, "citekey cannot contain whitespace"),
            CiteKeyError::PathSeparator(ch) => {
                write!(f, "citekey cannot contain path separator '{}'", ch)
            }
            CiteKeyError::ControlCharacter => {
                write!(f, "citekey cannot contain control characters")
            }
        }
    }
}

impl std::error::Error for CiteKeyError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base27_single_letters() {
        assert_eq!(base27(0), "");
        for i in 0..26u64 {
            let letter = (b'a' + i as u8) as char;
            assert_eq!(base27(i + 1), letter.to_string());
            assert_eq!(base27(26 + i + 1), format!("a{}", letter));
        }
    }

    #[test]
    fn test_base27_carries() {
        assert_eq!(base27(52), "az");
        assert_eq!(base27(53), "ba");
        assert_eq!(base27(702), "zz");
        assert_eq!(base27(703), "aaa");
    }

    #[test]
    fn test_decode_inverts_encode() {
        for n in 0..2000u64 {
            assert_eq!(decode_base27(&base27(n)), Some(n));
        }
        assert_eq!(decode_base27(""), Some(0));
    }

    #[test]
    fn test_decode_rejects_foreign_characters() {
        assert_eq!(decode_base27("A"), None);
        assert_eq!(decode_base27("a1"), None);
        assert_eq!(decode_base27("é"), None);
    }

    #[test]
    fn test_decode_overflow() {
        let long = "z".repeat(20);
        assert_eq!(decode_base27(&long), None);
    }

    #[test]
    fn test_candidates_skip_bare_key() {
        let first: Vec<String> = candidates("Doe2013").take(3).collect();
        assert_eq!(first, vec!["Doe2013a", "Doe2013b", "Doe2013c"]);
        assert_eq!(candidates("k").nth(26).unwrap(), "kaa");
    }

    #[test]
    fn test_invalid_citekeys() {
        assert_eq!(validate_citekey(""), Err(CiteKeyError::Empty));
        assert_eq!(validate_citekey("a b"), Err(CiteKeyError::Whitespace));
        assert_eq!(validate_citekey("a\tb"), Err(CiteKeyError::Whitespace));
        assert_eq!(
            validate_citekey("a/b"),
            Err(CiteKeyError::PathSeparator('/'))
        );
        assert_eq!(
            validate_citekey("a\\b"),
            Err(CiteKeyError::PathSeparator('\\'))
        );
        assert_eq!(validate_citekey(".x"), Err(CiteKeyError::LeadingDot));
        assert_eq!(
            validate_citekey("a\u{7}b"),
            Err(CiteKeyError::ControlCharacter)
        );
    }

    #[test]
    fn test_check_citekey_maps_error() {
        match check_citekey("bad key") {
            Err(PubsError::InvalidCiteKey { citekey, reason }) => {
                assert_eq!(citekey, "bad key");
                assert!(reason.contains("whitespace"));
            }
            other => panic!("Expected InvalidCiteKey, got {:?}", other),
        }
    }
}
