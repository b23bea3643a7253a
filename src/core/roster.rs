#![forbid(unsafe_code)]

use serde::de::Error as _;
use serde::ser::SerializeMap as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::validate;
use crate::error::LabtuiError;

/// The closed set of tube colors. Entries carry exactly one of these;
/// display and serialization use the Ukrainian labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TubeColor {
    Red,
    Yellow,
    Green,
    Blue,
}

impl TubeColor {
    pub const ALL: [TubeColor; 4] = [
        TubeColor::Red,
        TubeColor::Yellow,
        TubeColor::Green,
        TubeColor::Blue,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            TubeColor::Red => "Червона",
            TubeColor::Yellow => "Жовта",
            TubeColor::Green => "Зелена",
            TubeColor::Blue => "Голуба",
        }
    }

    /// ASCII name used in config files and as a CLI-friendly alias.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            TubeColor::Red => "red",
            TubeColor::Yellow => "yellow",
            TubeColor::Green => "green",
            TubeColor::Blue => "blue",
        }
    }

    /// Accepts the label or the ASCII name (case-insensitive ASCII).
    pub fn parse(input: &str) -> Result<Self, LabtuiError> {
        let s = input.trim();
        Self::ALL
            .into_iter()
            .find(|c| s == c.label() || s.eq_ignore_ascii_case(c.name()))
            .ok_or_else(|| LabtuiError::UnknownColor(s.to_owned()))
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl std::str::FromStr for TubeColor {
    type Err = LabtuiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for TubeColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for TubeColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for TubeColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(D::Error::custom)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entry {
    pub id: u32,
    pub name: String,
    pub surname: String,
    pub color: TubeColor,
}

/// Per-color counts over the live entries. Always carries all four colors;
/// recomputed in full by [`Roster::summary`], never maintained incrementally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColorSummary {
    counts: [usize; 4],
}

impl ColorSummary {
    #[must_use]
    pub fn count(&self, color: TubeColor) -> usize {
        self.counts[color.index()]
    }

    /// All four colors with their counts, in declaration order.
    pub fn counts(&self) -> impl Iterator<Item = (TubeColor, usize)> + '_ {
        TubeColor::ALL.into_iter().map(|c| (c, self.count(c)))
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

impl Serialize for ColorSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(TubeColor::ALL.len()))?;
        for (color, count) in self.counts() {
            map.serialize_entry(color.label(), &count)?;
        }
        map.end()
    }
}

/// The roster state: an ordered entry sequence (insertion order is display
/// order) plus the next id to assign. Ids are unique and never reused, even
/// after removal.
#[derive(Debug, Clone)]
pub struct Roster {
    entries: Vec<Entry>,
    next_id: u32,
}

impl Default for Roster {
    fn default() -> Self {
        Self::new()
    }
}

impl Roster {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validates, appends, and returns the created entry. Both fields are
    /// trimmed and must be non-empty Ukrainian-letter words; on any failure
    /// the roster is left untouched.
    pub fn add(
        &mut self,
        name: &str,
        surname: &str,
        color: TubeColor,
    ) -> Result<Entry, LabtuiError> {
        let (name, surname) = validate::person_fields(name, surname)?;
        let entry = Entry {
            id: self.next_id,
            name: name.to_owned(),
            surname: surname.to_owned(),
            color,
        };
        self.next_id += 1;
        self.entries.push(entry.clone());
        Ok(entry)
    }

    /// Removes the entry matching the raw id input and returns it. An empty
    /// (post-trim) input fails without consulting the sequence; input that
    /// does not parse to a live id fails the same way as an unknown id.
    /// `next_id` is unaffected.
    pub fn remove(&mut self, raw_id: &str) -> Result<Entry, LabtuiError> {
        let raw = raw_id.trim();
        if raw.is_empty() {
            return Err(LabtuiError::MissingRemoveId);
        }
        let pos = raw
            .parse::<u32>()
            .ok()
            .and_then(|id| self.entries.iter().position(|e| e.id == id))
            .ok_or_else(|| LabtuiError::IdNotFound(raw.to_owned()))?;
        Ok(self.entries.remove(pos))
    }

    #[must_use]
    pub fn summary(&self) -> ColorSummary {
        let mut counts = [0usize; 4];
        for entry in &self.entries {
            counts[entry.color.index()] += 1;
        }
        ColorSummary { counts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_labels_and_names() {
        assert_eq!(TubeColor::parse("Червона").unwrap(), TubeColor::Red);
        assert_eq!(TubeColor::parse("  Голуба ").unwrap(), TubeColor::Blue);
        assert_eq!(TubeColor::parse("GREEN").unwrap(), TubeColor::Green);
        assert_eq!(TubeColor::parse("yellow").unwrap(), TubeColor::Yellow);
        assert!(matches!(
            TubeColor::parse("mauve"),
            Err(LabtuiError::UnknownColor(_))
        ));
    }

    #[test]
    fn add_assigns_monotonic_ids_and_appends() {
        let mut roster = Roster::new();
        let first = roster.add("Іван", "Петренко", TubeColor::Red).unwrap();
        let second = roster.add("Олена", "Коваль", TubeColor::Green).unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.entries()[0].name, "Іван");
        assert_eq!(roster.entries()[1].surname, "Коваль");
    }

    #[test]
    fn ids_are_never_reused() {
        let mut roster = Roster::new();
        let first = roster.add("Іван", "Петренко", TubeColor::Red).unwrap();
        roster.remove("1").unwrap();
        let second = roster.add("Олена", "Коваль", TubeColor::Blue).unwrap();

        assert_eq!(roster.len(), 1);
        assert_ne!(second.id, first.id);
        assert_eq!(second.id, 2);
    }

    #[test]
    fn add_trims_fields_before_validation() {
        let mut roster = Roster::new();
        let entry = roster.add("  Іван ", " Петренко  ", TubeColor::Red).unwrap();
        assert_eq!(entry.name, "Іван");
        assert_eq!(entry.surname, "Петренко");
    }

    #[test]
    fn empty_field_wins_over_letter_check() {
        let mut roster = Roster::new();
        // Surname is Latin, but the blank name is reported first.
        let err = roster.add(" ", "Petrenko", TubeColor::Red).unwrap_err();
        assert!(matches!(err, LabtuiError::EmptyField));
        assert!(roster.is_empty());
    }

    #[test]
    fn latin_letters_are_rejected() {
        let mut roster = Roster::new();
        let err = roster.add("Ivan", "Petrenko", TubeColor::Red).unwrap_err();
        assert!(matches!(err, LabtuiError::InvalidLetters));
        assert!(roster.is_empty());
    }

    #[test]
    fn failed_add_does_not_consume_an_id() {
        let mut roster = Roster::new();
        let _ = roster.add("Ivan", "Petrenko", TubeColor::Red);
        let entry = roster.add("Іван", "Петренко", TubeColor::Red).unwrap();
        assert_eq!(entry.id, 1);
    }

    #[test]
    fn remove_requires_an_id() {
        let mut roster = Roster::new();
        roster.add("Іван", "Петренко", TubeColor::Red).unwrap();

        let err = roster.remove("   ").unwrap_err();
        assert!(matches!(err, LabtuiError::MissingRemoveId));
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn remove_unknown_or_unparsable_id_is_not_found() {
        let mut roster = Roster::new();
        roster.add("Іван", "Петренко", TubeColor::Red).unwrap();

        assert!(matches!(
            roster.remove("7"),
            Err(LabtuiError::IdNotFound(_))
        ));
        assert!(matches!(
            roster.remove("abc"),
            Err(LabtuiError::IdNotFound(_))
        ));
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn remove_accepts_surrounding_whitespace() {
        let mut roster = Roster::new();
        roster.add("Іван", "Петренко", TubeColor::Red).unwrap();
        let removed = roster.remove(" 1 ").unwrap();
        assert_eq!(removed.id, 1);
        assert!(roster.is_empty());
    }

    #[test]
    fn summary_counts_every_color() {
        let mut roster = Roster::new();
        roster.add("Іван", "Петренко", TubeColor::Red).unwrap();
        roster.add("Олена", "Коваль", TubeColor::Green).unwrap();

        let summary = roster.summary();
        assert_eq!(summary.count(TubeColor::Red), 1);
        assert_eq!(summary.count(TubeColor::Yellow), 0);
        assert_eq!(summary.count(TubeColor::Green), 1);
        assert_eq!(summary.count(TubeColor::Blue), 0);
        assert_eq!(summary.total(), roster.len());

        roster.remove("1").unwrap();
        let summary = roster.summary();
        assert_eq!(summary.count(TubeColor::Red), 0);
        assert_eq!(summary.count(TubeColor::Green), 1);
        assert_eq!(summary.total(), roster.len());

        assert!(matches!(
            roster.remove("1"),
            Err(LabtuiError::IdNotFound(_))
        ));
    }

    #[test]
    fn summary_total_matches_roster_length() {
        let mut roster = Roster::new();
        for color in TubeColor::ALL.into_iter().cycle().take(11) {
            roster.add("Іван", "Петренко", color).unwrap();
        }
        assert_eq!(roster.summary().total(), roster.len());

        roster.remove("3").unwrap();
        roster.remove("8").unwrap();
        assert_eq!(roster.summary().total(), roster.len());
    }

    #[test]
    fn entries_serialize_with_color_labels() {
        let mut roster = Roster::new();
        roster.add("Іван", "Петренко", TubeColor::Red).unwrap();
        let json = serde_json::to_value(roster.entries()).unwrap();
        assert_eq!(json[0]["color"], "Червона");
        assert_eq!(json[0]["id"], 1);
    }

    #[test]
    fn summary_serializes_as_label_keyed_object() {
        let mut roster = Roster::new();
        roster.add("Олена", "Коваль", TubeColor::Green).unwrap();
        let json = serde_json::to_value(roster.summary()).unwrap();
        assert_eq!(json["Червона"], 0);
        assert_eq!(json["Зелена"], 1);
        assert_eq!(json["Жовта"], 0);
        assert_eq!(json["Голуба"], 0);
    }
}
