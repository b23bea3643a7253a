#![forbid(unsafe_code)]

use std::sync::OnceLock;

use regex::Regex;

use crate::error::LabtuiError;

// The Ukrainian alphabet plus the accented variants that show up in names.
fn ukrainian_letters() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[А-Яа-яёЁЇїІіЄєҐґ]+$").unwrap_or_else(|_| Regex::new("$^").unwrap())
    })
}

/// Validates the name/surname pair for an add operation and returns the
/// trimmed values. Emptiness is checked for both fields before the letter
/// check, so an empty field is reported even when the other field would
/// also fail the letter check.
pub fn person_fields<'a>(
    name: &'a str,
    surname: &'a str,
) -> Result<(&'a str, &'a str), LabtuiError> {
    let name = name.trim();
    let surname = surname.trim();

    if name.is_empty() || surname.is_empty() {
        return Err(LabtuiError::EmptyField);
    }

    let re = ukrainian_letters();
    if !re.is_match(name) || !re.is_match(surname) {
        return Err(LabtuiError::InvalidLetters);
    }

    Ok((name, surname))
}
