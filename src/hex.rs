//! RGB⇄hex string conversions.

use crate::PalettizeError;
use palette::Srgb;

/// Formats a color as a 7-character lowercase hex string, e.g. `#1a2b3c`.
///
/// Every 8-bit triple is representable, so this cannot fail.
///
/// # Examples
/// ```
/// # use palettize::rgb_to_hex;
/// # use palette::Srgb;
/// assert_eq!(rgb_to_hex(Srgb::new(255, 0, 128)), "#ff0080");
/// ```
#[must_use]
pub fn rgb_to_hex(color: Srgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue)
}

/// Parses a `#rrggbb` hex string (case-insensitive) into a color.
///
/// # Errors
/// Returns [`PalettizeError::InvalidColorFormat`] unless the input is
/// exactly `#` followed by six hex digits.
///
/// # Examples
/// ```
/// # use palettize::hex_to_rgb;
/// # use palette::Srgb;
/// # fn main() -> Result<(), palettize::PalettizeError> {
/// assert_eq!(hex_to_rgb("#FF0080")?, Srgb::new(255, 0, 128));
/// assert!(hex_to_rgb("blue").is_err());
/// # Ok(())
/// # }
/// ```
pub fn hex_to_rgb(hex: &str) -> Result<Srgb<u8>, PalettizeError> {
    let invalid = || PalettizeError::InvalidColorFormat(hex.to_owned());

    // from_str_radix tolerates a leading `+`, so check every digit ourselves
    let digits = hex
        .strip_prefix('#')
        .filter(|digits| digits.len() == 6 && digits.bytes().all(|b| b.is_ascii_hexdigit()))
        .ok_or_else(invalid)?;

    let channel = |range| {
        digits
            .get(range)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .ok_or_else(invalid)
    };

    Ok(Srgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::tests::*;

    #[test]
    fn formats_lowercase_seven_chars() {
        assert_eq!(rgb_to_hex(Srgb::new(0, 0, 0)), "#000000");
        assert_eq!(rgb_to_hex(Srgb::new(255, 255, 255)), "#ffffff");
        assert_eq!(rgb_to_hex(Srgb::new(171, 205, 239)), "#abcdef");
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(hex_to_rgb("#abCDef").unwrap(), Srgb::new(171, 205, 239));
        assert_eq!(hex_to_rgb("#ABCDEF").unwrap(), Srgb::new(171, 205, 239));
    }

    #[test]
    fn round_trip() {
        for color in test_data_1024() {
            assert_eq!(hex_to_rgb(&rgb_to_hex(color)).unwrap(), color);
        }

        // channel extremes
        for c in [0, 1, 127, 128, 254, 255] {
            let color = Srgb::new(c, 255 - c, c ^ 0x55);
            assert_eq!(hex_to_rgb(&rgb_to_hex(color)).unwrap(), color);
        }
    }

    #[test]
    fn rejects_malformed_strings() {
        for bad in [
            "blue", "", "#", "#fff", "#fffffff", "ffffff", "#ggffff", "#ffff 0", "##fffff",
            "#+1+2+3", "#+fab12", "#-12345",
        ] {
            assert_eq!(
                hex_to_rgb(bad),
                Err(PalettizeError::InvalidColorFormat(bad.to_owned())),
                "{bad:?} should be rejected"
            );
        }
    }
}
