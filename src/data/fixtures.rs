//! Named prediction fixtures.
//!
//! Hand-written unlabeled audiograms with a recognisable pattern each. The CLI
//! `demo` and `predict --fixture` commands run them through a trained model.

use crate::domain::{Audiogram, HearingSetRecord};

/// Air loss over normal bone: a wide air-bone gap.
pub fn conductive() -> HearingSetRecord {
    Audiogram {
        ac_left: [50, 50, 45, 45, 50, 55],
        ac_right: [45, 50, 45, 40, 45, 50],
        bc_left: [5, 5, 10, 10, 5, 10],
        bc_right: [0, 5, 5, 10, 5, 5],
    }
    .to_record()
}

/// Bone loss plus an air-bone gap.
pub fn mixed() -> HearingSetRecord {
    Audiogram {
        ac_left: [70, 75, 75, 80, 80, 85],
        ac_right: [70, 70, 75, 75, 80, 80],
        bc_left: [35, 40, 40, 45, 45, 45],
        bc_right: [35, 35, 40, 40, 45, 45],
    }
    .to_record()
}

/// Normal hearing.
pub fn none() -> HearingSetRecord {
    Audiogram {
        ac_left: [10, 5, 5, 10, 10, 5],
        ac_right: [5, 5, 10, 5, 10, 10],
        bc_left: [5, 0, 5, 5, 5, 0],
        bc_right: [0, 5, 5, 0, 5, 5],
    }
    .to_record()
}

/// Air and bone elevated together, sloping toward the high frequencies.
pub fn sensorineural() -> HearingSetRecord {
    Audiogram {
        ac_left: [45, 50, 55, 65, 70, 75],
        ac_right: [40, 50, 55, 60, 70, 75],
        bc_left: [40, 45, 55, 60, 65, 70],
        bc_right: [40, 45, 50, 60, 65, 70],
    }
    .to_record()
}

/// Sensorineural loss confined to the low frequencies (rising audiogram).
pub fn low_frequency() -> HearingSetRecord {
    Audiogram {
        ac_left: [55, 50, 40, 25, 20, 20],
        ac_right: [55, 45, 40, 25, 20, 15],
        bc_left: [50, 45, 35, 25, 15, 15],
        bc_right: [50, 45, 35, 20, 15, 15],
    }
    .to_record()
}

/// Fixture names accepted by `get`, in display order.
pub const NAMES: [&str; 5] = ["conductive", "mixed", "none", "sensorineural", "low-frequency"];

/// Look up a fixture by name (case-insensitive; `_` and `-` are equivalent).
pub fn get(name: &str) -> Option<HearingSetRecord> {
    let key = name.trim().to_ascii_lowercase().replace('_', "-");
    match key.as_str() {
        "conductive" => Some(conductive()),
        "mixed" => Some(mixed()),
        "none" => Some(none()),
        "sensorineural" => Some(sensorineural()),
        "low-frequency" | "lowfrequency" => Some(low_frequency()),
        _ => None,
    }
}

/// Every fixture with its name.
pub fn all() -> Vec<(&'static str, HearingSetRecord)> {
    NAMES
        .iter()
        .filter_map(|name| get(name).map(|r| (*name, r)))
        .collect()
}
