//! Closed label spaces for the three classification heads.
//!
//! Each space has a canonical class order. Score vectors and head weight rows
//! are indexed by `LabelSpace::index`, so the order of `ALL` must never change
//! between training and prediction.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// A closed, ordered set of classes.
pub trait LabelSpace: Copy + Eq + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// Space name used in errors and artifacts ("Type", "Degree", "Config").
    const NAME: &'static str;
    /// Classes in canonical order.
    const ALL: &'static [Self];

    fn as_str(self) -> &'static str;

    fn count() -> usize {
        Self::ALL.len()
    }

    fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|c| *c == self)
            .unwrap_or_default()
    }

    fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    /// Parse a label, ignoring case, whitespace, `-` and `_`.
    fn parse_label(raw: &str) -> Option<Self> {
        let key = label_key(raw);
        if key.is_empty() {
            return None;
        }
        Self::ALL
            .iter()
            .copied()
            .find(|c| label_key(c.as_str()) == key)
    }

    /// Canonical names in order (stored in artifacts).
    fn names() -> Vec<String> {
        Self::ALL.iter().map(|c| c.as_str().to_string()).collect()
    }
}

fn label_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Hearing-loss type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeLabel {
    Conductive,
    Mixed,
    None,
    Sensorineural,
}

/// Hearing-loss degree (ASHA severity bands).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DegreeLabel {
    Normal,
    Slight,
    Mild,
    Moderate,
    ModeratelySevere,
    Severe,
    Profound,
}

/// Audiogram configuration (shape across frequencies).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigLabel {
    Normal,
    Flat,
    Sloping,
    Rising,
    CookieBite,
    Notched,
    Precipitous,
}

impl LabelSpace for TypeLabel {
    const NAME: &'static str = "Type";
    const ALL: &'static [Self] = &[
        TypeLabel::Conductive,
        TypeLabel::Mixed,
        TypeLabel::None,
        TypeLabel::Sensorineural,
    ];

    fn as_str(self) -> &'static str {
        match self {
            TypeLabel::Conductive => "Conductive",
            TypeLabel::Mixed => "Mixed",
            TypeLabel::None => "None",
            TypeLabel::Sensorineural => "Sensorineural",
        }
    }
}

impl LabelSpace for DegreeLabel {
    const NAME: &'static str = "Degree";
    const ALL: &'static [Self] = &[
        DegreeLabel::Normal,
        DegreeLabel::Slight,
        DegreeLabel::Mild,
        DegreeLabel::Moderate,
        DegreeLabel::ModeratelySevere,
        DegreeLabel::Severe,
        DegreeLabel::Profound,
    ];

    fn as_str(self) -> &'static str {
        match self {
            DegreeLabel::Normal => "Normal",
            DegreeLabel::Slight => "Slight",
            DegreeLabel::Mild => "Mild",
            DegreeLabel::Moderate => "Moderate",
            DegreeLabel::ModeratelySevere => "Moderately Severe",
            DegreeLabel::Severe => "Severe",
            DegreeLabel::Profound => "Profound",
        }
    }
}

impl DegreeLabel {
    /// Band for a pure-tone average in dB HL.
    pub fn from_pta(pta: f64) -> Self {
        match pta {
            p if p <= 15.0 => DegreeLabel::Normal,
            p if p <= 25.0 => DegreeLabel::Slight,
            p if p <= 40.0 => DegreeLabel::Mild,
            p if p <= 55.0 => DegreeLabel::Moderate,
            p if p <= 70.0 => DegreeLabel::ModeratelySevere,
            p if p <= 90.0 => DegreeLabel::Severe,
            _ => DegreeLabel::Profound,
        }
    }
}

impl LabelSpace for ConfigLabel {
    const NAME: &'static str = "Config";
    const ALL: &'static [Self] = &[
        ConfigLabel::Normal,
        ConfigLabel::Flat,
        ConfigLabel::Sloping,
        ConfigLabel::Rising,
        ConfigLabel::CookieBite,
        ConfigLabel::Notched,
        ConfigLabel::Precipitous,
    ];

    fn as_str(self) -> &'static str {
        match self {
            ConfigLabel::Normal => "Normal",
            ConfigLabel::Flat => "Flat",
            ConfigLabel::Sloping => "Sloping",
            ConfigLabel::Rising => "Rising",
            ConfigLabel::CookieBite => "Cookie Bite",
            ConfigLabel::Notched => "Notched",
            ConfigLabel::Precipitous => "Precipitous",
        }
    }
}

macro_rules! label_text_impls {
    ($($ty:ty),*) => {$(
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        // Serialized as the display name ("Moderately Severe").
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty as LabelSpace>::parse_label(s)
                    .ok_or_else(|| format!("'{s}' is not a known {} class", <$ty as LabelSpace>::NAME))
            }
        }
    )*};
}

label_text_impls!(TypeLabel, DegreeLabel, ConfigLabel);

/// Ground-truth triple for one training record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelTriple {
    pub type_label: TypeLabel,
    pub degree: DegreeLabel,
    pub config: ConfigLabel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_order_is_fixed() {
        assert_eq!(TypeLabel::names(), ["Conductive", "Mixed", "None", "Sensorineural"]);
        assert_eq!(TypeLabel::None.index(), 2);
        assert_eq!(TypeLabel::from_index(3), Some(TypeLabel::Sensorineural));
        assert_eq!(TypeLabel::from_index(4), None);
    }

    #[test]
    fn parsing_ignores_case_and_separators() {
        assert_eq!("moderately-severe".parse::<DegreeLabel>(), Ok(DegreeLabel::ModeratelySevere));
        assert_eq!(" Cookie_Bite ".parse::<ConfigLabel>(), Ok(ConfigLabel::CookieBite));
        assert_eq!("NONE".parse::<TypeLabel>(), Ok(TypeLabel::None));
        assert!("Sensory".parse::<TypeLabel>().is_err());
        assert_eq!(TypeLabel::parse_label("   "), None);
    }

    #[test]
    fn display_round_trips_through_parse() {
        for c in ConfigLabel::ALL {
            assert_eq!(c.to_string().parse::<ConfigLabel>(), Ok(*c));
        }
        for d in DegreeLabel::ALL {
            assert_eq!(d.to_string().parse::<DegreeLabel>(), Ok(*d));
        }
    }

    #[test]
    fn labels_serialize_as_display_names() {
        assert_eq!(
            serde_json::to_string(&DegreeLabel::ModeratelySevere).unwrap(),
            "\"Moderately Severe\""
        );
        assert_eq!(serde_json::to_string(&ConfigLabel::CookieBite).unwrap(), "\"Cookie Bite\"");
    }

    #[test]
    fn pta_bands() {
        assert_eq!(DegreeLabel::from_pta(0.0), DegreeLabel::Normal);
        assert_eq!(DegreeLabel::from_pta(20.0), DegreeLabel::Slight);
        assert_eq!(DegreeLabel::from_pta(40.0), DegreeLabel::Mild);
        assert_eq!(DegreeLabel::from_pta(60.0), DegreeLabel::ModeratelySevere);
        assert_eq!(DegreeLabel::from_pta(95.0), DegreeLabel::Profound);
    }
}
