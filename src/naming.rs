//! Display names derived from pattern identifiers.

use heapless::String;

/// Maximum length of a pattern display name, in bytes.
pub const MAX_NAME_LEN: usize = 32;

/// A fixed-capacity pattern display name.
pub type DisplayName = String<MAX_NAME_LEN>;

/// Error returned when a name does not fit in [`MAX_NAME_LEN`] bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NameTooLong;

/// Turns a `snake_case` identifier into a title-cased display name.
///
/// Underscores become spaces. A letter is upper-cased when it starts the name
/// or follows a non-letter and lower-cased otherwise, so digits start a new
/// word: `bounce_cubic_1d` becomes `"Bounce Cubic 1D"`.
pub fn title_case(identifier: &str) -> Result<DisplayName, NameTooLong> {
    let mut name = DisplayName::new();
    let mut after_letter = false;

    for c in identifier.chars() {
        let c = if c == '_' { ' ' } else { c };
        if c.is_alphabetic() {
            if after_letter {
                push_all(&mut name, c.to_lowercase())?;
            } else {
                push_all(&mut name, c.to_uppercase())?;
            }
            after_letter = true;
        } else {
            name.push(c).map_err(|_| NameTooLong)?;
            after_letter = false;
        }
    }

    Ok(name)
}

/// Copies an explicit display name into a [`DisplayName`].
pub fn display_name(name: &str) -> Result<DisplayName, NameTooLong> {
    let mut out = DisplayName::new();
    out.push_str(name).map_err(|_| NameTooLong)?;
    Ok(out)
}

fn push_all(name: &mut DisplayName, chars: impl Iterator<Item = char>) -> Result<(), NameTooLong> {
    for c in chars {
        name.push(c).map_err(|_| NameTooLong)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_underscores_and_capitalizes_words() {
        assert_eq!(title_case("bounce_cubic_1d").unwrap().as_str(), "Bounce Cubic 1D");
        assert_eq!(title_case("twinkle_pulse_1d").unwrap().as_str(), "Twinkle Pulse 1D");
    }

    #[test]
    fn single_word_is_capitalized() {
        assert_eq!(title_case("ramp").unwrap().as_str(), "Ramp");
    }

    #[test]
    fn rejects_names_over_capacity() {
        assert_eq!(
            title_case("an_identifier_that_is_much_too_long_to_fit"),
            Err(NameTooLong)
        );
    }
}
