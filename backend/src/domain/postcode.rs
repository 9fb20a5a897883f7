//! Postcode value type and the records keyed by it.
//!
//! Postcodes are stored and matched in one canonical spelling: uppercase,
//! no surrounding whitespace, and a single space before the three-character
//! inward code (`SW1A 1AA`, `E1 6AN`).

use std::fmt;

use serde::Serialize;

use super::OutputAreaCode;

const INWARD_CODE_LEN: usize = 3;
const MIN_COMPACT_LEN: usize = 5;
const MAX_COMPACT_LEN: usize = 7;

/// Reasons a raw string cannot be turned into a [`Postcode`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PostcodeValidationError {
    /// Nothing but whitespace was supplied.
    #[error("postcode must not be empty")]
    Empty,
    /// The input cannot be a UK postcode.
    #[error("postcode '{input}' is not a valid UK postcode")]
    Malformed {
        /// The trimmed input.
        input: String,
    },
}

/// Normalised UK postcode.
///
/// # Examples
/// ```
/// use census_lookup::domain::Postcode;
///
/// let postcode = Postcode::parse("  sw1a1aa ").expect("valid postcode");
/// assert_eq!(postcode.as_str(), "SW1A 1AA");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Postcode(String);

impl Postcode {
    /// Normalise and validate a raw postcode string.
    pub fn parse(raw: &str) -> Result<Self, PostcodeValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PostcodeValidationError::Empty);
        }

        let compact: String = trimmed
            .chars()
            .filter(|ch| !ch.is_whitespace())
            .map(|ch| ch.to_ascii_uppercase())
            .collect();
        let plausible = (MIN_COMPACT_LEN..=MAX_COMPACT_LEN).contains(&compact.len())
            && compact.chars().all(|ch| ch.is_ascii_alphanumeric());
        if !plausible {
            return Err(PostcodeValidationError::Malformed {
                input: trimmed.to_owned(),
            });
        }

        let (outward, inward) = compact.split_at(compact.len() - INWARD_CODE_LEN);
        Ok(Self(format!("{outward} {inward}")))
    }

    /// Borrow the canonical spelling.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Postcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Postcode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// A postcode and the output area containing it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostcodeRecord {
    /// Canonical postcode.
    pub code: Postcode,
    /// Latitude of the postcode centroid.
    pub latitude: f64,
    /// Longitude of the postcode centroid.
    pub longitude: f64,
    /// Output area the postcode falls in.
    pub output_area_code: OutputAreaCode,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("SW1A 1AA", "SW1A 1AA")]
    #[case("sw1a1aa", "SW1A 1AA")]
    #[case("  e1   6an\t", "E1 6AN")]
    #[case("M11AE", "M1 1AE")]
    #[case("ZZ99 9ZZ", "ZZ99 9ZZ")]
    fn parse_normalises_spacing_and_case(#[case] raw: &str, #[case] expected: &str) {
        let postcode = Postcode::parse(raw).expect("valid postcode");
        assert_eq!(postcode.as_str(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn parse_rejects_blank_input(#[case] raw: &str) {
        assert_eq!(Postcode::parse(raw), Err(PostcodeValidationError::Empty));
    }

    #[rstest]
    #[case("SW1")]
    #[case("SW1A 1AA X")]
    #[case("SW1A-1AA")]
    #[case("'; DROP TABLE postcode_data; --")]
    fn parse_rejects_implausible_input(#[case] raw: &str) {
        assert!(matches!(
            Postcode::parse(raw),
            Err(PostcodeValidationError::Malformed { .. })
        ));
    }
}
