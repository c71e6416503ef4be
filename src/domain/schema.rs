//! Static column schema for hearing-set records.
//!
//! A record has three label columns followed by 24 integer thresholds. The
//! position of each threshold in `THRESHOLD_FIELDS` is its feature index; the
//! delimited-file column is `position + LABEL_COLUMNS.len()`.

/// Threshold value type (decibels HL, may be negative).
pub type Threshold = i32;

/// Number of threshold fields (and encoded features).
pub const FEATURE_COUNT: usize = 24;

/// Label columns, in file order, ahead of the thresholds.
pub const LABEL_COLUMNS: [&str; 3] = ["Type", "Degree", "Config"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modality {
    /// Air conduction.
    Ac,
    /// Bone conduction.
    Bc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ear {
    Left,
    Right,
}

/// Test frequency in Hz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    F250,
    F500,
    F1000,
    F2000,
    F4000,
    F8000,
}

impl Modality {
    pub fn code(self) -> &'static str {
        match self {
            Modality::Ac => "AC",
            Modality::Bc => "BC",
        }
    }
}

impl Ear {
    pub fn code(self) -> &'static str {
        match self {
            Ear::Left => "L",
            Ear::Right => "R",
        }
    }
}

impl Frequency {
    pub const ALL: [Frequency; 6] = [
        Frequency::F250,
        Frequency::F500,
        Frequency::F1000,
        Frequency::F2000,
        Frequency::F4000,
        Frequency::F8000,
    ];

    pub fn hz(self) -> u32 {
        match self {
            Frequency::F250 => 250,
            Frequency::F500 => 500,
            Frequency::F1000 => 1000,
            Frequency::F2000 => 2000,
            Frequency::F4000 => 4000,
            Frequency::F8000 => 8000,
        }
    }
}

/// One threshold column: `(name, position, type)` plus its audiometric key.
///
/// All thresholds share the `Threshold` type, so the type is carried by the
/// table itself rather than per entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub position: usize,
    pub modality: Modality,
    pub ear: Ear,
    pub frequency: Frequency,
}

impl FieldSpec {
    /// Column index in a delimited training file.
    pub fn column(&self) -> usize {
        self.position + LABEL_COLUMNS.len()
    }
}

const fn field(
    name: &'static str,
    position: usize,
    modality: Modality,
    ear: Ear,
    frequency: Frequency,
) -> FieldSpec {
    FieldSpec {
        name,
        position,
        modality,
        ear,
        frequency,
    }
}

use Ear::{Left, Right};
use Frequency::{F1000, F2000, F250, F4000, F500, F8000};
use Modality::{Ac, Bc};

/// Canonical threshold order. Encoding always follows this table.
pub const THRESHOLD_FIELDS: [FieldSpec; FEATURE_COUNT] = [
    field("AC_L_250", 0, Ac, Left, F250),
    field("AC_L_500", 1, Ac, Left, F500),
    field("AC_L_1000", 2, Ac, Left, F1000),
    field("AC_L_2000", 3, Ac, Left, F2000),
    field("AC_L_4000", 4, Ac, Left, F4000),
    field("AC_L_8000", 5, Ac, Left, F8000),
    field("AC_R_250", 6, Ac, Right, F250),
    field("AC_R_500", 7, Ac, Right, F500),
    field("AC_R_1000", 8, Ac, Right, F1000),
    field("AC_R_2000", 9, Ac, Right, F2000),
    field("AC_R_4000", 10, Ac, Right, F4000),
    field("AC_R_8000", 11, Ac, Right, F8000),
    field("BC_L_250", 12, Bc, Left, F250),
    field("BC_L_500", 13, Bc, Left, F500),
    field("BC_L_1000", 14, Bc, Left, F1000),
    field("BC_L_2000", 15, Bc, Left, F2000),
    field("BC_L_4000", 16, Bc, Left, F4000),
    field("BC_L_8000", 17, Bc, Left, F8000),
    field("BC_R_250", 18, Bc, Right, F250),
    field("BC_R_500", 19, Bc, Right, F500),
    field("BC_R_1000", 20, Bc, Right, F1000),
    field("BC_R_2000", 21, Bc, Right, F2000),
    field("BC_R_4000", 22, Bc, Right, F4000),
    field("BC_R_8000", 23, Bc, Right, F8000),
];

/// Look up a threshold field by name (case-insensitive).
pub fn field_by_name(name: &str) -> Option<&'static FieldSpec> {
    let name = name.trim();
    THRESHOLD_FIELDS
        .iter()
        .find(|f| f.name.eq_ignore_ascii_case(name))
}

/// Feature position of a `(modality, ear, frequency)` key.
pub fn position_of(modality: Modality, ear: Ear, frequency: Frequency) -> usize {
    let block = match (modality, ear) {
        (Modality::Ac, Ear::Left) => 0,
        (Modality::Ac, Ear::Right) => 1,
        (Modality::Bc, Ear::Left) => 2,
        (Modality::Bc, Ear::Right) => 3,
    };
    let offset = Frequency::ALL
        .iter()
        .position(|f| *f == frequency)
        .unwrap_or_default();
    block * Frequency::ALL.len() + offset
}

/// Feature names in canonical order.
pub fn feature_names() -> Vec<String> {
    THRESHOLD_FIELDS.iter().map(|f| f.name.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_positions_are_sequential_and_names_match_keys() {
        for (idx, f) in THRESHOLD_FIELDS.iter().enumerate() {
            assert_eq!(f.position, idx);
            let expected = format!("{}_{}_{}", f.modality.code(), f.ear.code(), f.frequency.hz());
            assert_eq!(f.name, expected);
            assert_eq!(position_of(f.modality, f.ear, f.frequency), idx);
        }
    }

    #[test]
    fn columns_follow_label_columns() {
        assert_eq!(THRESHOLD_FIELDS[0].column(), 3);
        assert_eq!(THRESHOLD_FIELDS[FEATURE_COUNT - 1].column(), 26);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let f = field_by_name(" bc_r_4000 ").unwrap();
        assert_eq!(f.position, 22);
        assert!(field_by_name("AC_L_3000").is_none());
    }
}
