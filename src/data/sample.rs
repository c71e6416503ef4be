//! Synthetic labeled audiograms.
//!
//! Used when no training CSV is at hand (and by tests). Each record is drawn
//! from one of four type archetypes, shaped by a configuration profile, then
//! perturbed per ear and per frequency and rounded to the 5 dB steps an
//! audiometer reports.
//!
//! Labels follow common clinical conventions:
//! - Type comes from the archetype (air-bone gap and bone level)
//! - Config is the shape profile that was applied
//! - Degree is the ASHA band of the worse ear's pure-tone average
//!   (0.5 / 1 / 2 kHz, air conduction)
//!
//! These conventions only label generated data; the classifier learns its own
//! boundaries from whatever records it is given.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{
    Audiogram, ConfigLabel, DegreeLabel, HearingSetRecord, LabelSpace, LabelTriple, Threshold,
    TypeLabel,
};
use crate::error::AppError;

/// Audiometers report thresholds in 5 dB steps.
const STEP_DB: f64 = 5.0;
const MIN_DB: f64 = -10.0;
const MAX_DB: f64 = 120.0;

/// Shapes that can accompany an actual loss.
const LOSS_SHAPES: [ConfigLabel; 6] = [
    ConfigLabel::Flat,
    ConfigLabel::Sloping,
    ConfigLabel::Rising,
    ConfigLabel::CookieBite,
    ConfigLabel::Notched,
    ConfigLabel::Precipitous,
];

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub count: usize,
    pub seed: u64,
    /// Standard deviation (dB) of per-frequency measurement noise.
    pub noise_sd: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            count: 400,
            seed: 42,
            noise_sd: 3.0,
        }
    }
}

/// Generate a labeled, type-balanced training set.
pub fn generate_training_set(config: &SampleConfig) -> Result<Vec<HearingSetRecord>, AppError> {
    if config.count == 0 {
        return Err(AppError::new(2, "Synthetic sample count must be positive."));
    }
    let noise = Normal::new(0.0, config.noise_sd)
        .map_err(|e| AppError::new(2, format!("Invalid noise_sd {}: {e}", config.noise_sd)))?;
    let mut rng = StdRng::seed_from_u64(config.seed);

    let records = (0..config.count)
        .map(|i| {
            let type_label = TypeLabel::ALL[i % TypeLabel::ALL.len()];
            let (gram, labels) = draw_audiogram(type_label, &mut rng, &noise);
            gram.to_builder().label_triple(labels).build()
        })
        .collect();

    Ok(records)
}

/// Per-frequency offsets (dB) for a configuration, 250 Hz..8 kHz.
pub fn shape_profile(shape: ConfigLabel) -> [f64; 6] {
    match shape {
        ConfigLabel::Normal | ConfigLabel::Flat => [0.0; 6],
        ConfigLabel::Sloping => [-15.0, -10.0, -5.0, 5.0, 10.0, 15.0],
        ConfigLabel::Rising => [15.0, 10.0, 5.0, -5.0, -10.0, -15.0],
        ConfigLabel::CookieBite => [-10.0, 5.0, 15.0, 15.0, 5.0, -10.0],
        ConfigLabel::Notched => [-5.0, -5.0, -5.0, 0.0, 20.0, -5.0],
        ConfigLabel::Precipitous => [-15.0, -15.0, -10.0, 10.0, 25.0, 30.0],
    }
}

/// Pure-tone average (0.5, 1, 2 kHz) of one ear's air thresholds.
pub fn pure_tone_average(ac: &[Threshold; 6]) -> f64 {
    f64::from(ac[1] + ac[2] + ac[3]) / 3.0
}

fn draw_audiogram(
    type_label: TypeLabel,
    rng: &mut StdRng,
    noise: &Normal<f64>,
) -> (Audiogram, LabelTriple) {
    let shape = if type_label == TypeLabel::None {
        ConfigLabel::Normal
    } else {
        LOSS_SHAPES[rng.gen_range(0..LOSS_SHAPES.len())]
    };
    let profile = shape_profile(shape);

    // (bone level, air-bone gap); the shape bends bone too unless the
    // sensorineural component is absent.
    let (bone, gap, shape_on_bone) = match type_label {
        TypeLabel::None => (rng.gen_range(-5.0..10.0), rng.gen_range(0.0..5.0), false),
        TypeLabel::Conductive => (rng.gen_range(-5.0..10.0), rng.gen_range(20.0..60.0), false),
        TypeLabel::Sensorineural => (rng.gen_range(30.0..85.0), rng.gen_range(0.0..5.0), true),
        TypeLabel::Mixed => (rng.gen_range(30.0..60.0), rng.gen_range(20.0..40.0), true),
    };

    let mut ears = [([0; 6], [0; 6]); 2];
    for ear in ears.iter_mut() {
        let ear_offset: f64 = rng.gen_range(-5.0..5.0);
        for (k, offset) in profile.iter().enumerate() {
            let bc = bone + ear_offset + if shape_on_bone { *offset } else { 0.0 };
            let ac = bone + ear_offset + gap + offset;
            ear.0[k] = quantize(ac + noise.sample(rng));
            ear.1[k] = quantize(bc + noise.sample(rng));
        }
    }
    let [(ac_left, bc_left), (ac_right, bc_right)] = ears;

    let pta = pure_tone_average(&ac_left).max(pure_tone_average(&ac_right));
    let labels = LabelTriple {
        type_label,
        degree: DegreeLabel::from_pta(pta),
        config: shape,
    };

    (
        Audiogram {
            ac_left,
            ac_right,
            bc_left,
            bc_right,
        },
        labels,
    )
}

fn quantize(db: f64) -> Threshold {
    ((db / STEP_DB).round() * STEP_DB).clamp(MIN_DB, MAX_DB) as Threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_is_seeded_and_balanced() {
        let config = SampleConfig {
            count: 40,
            ..SampleConfig::default()
        };
        let a = generate_training_set(&config).unwrap();
        let b = generate_training_set(&config).unwrap();
        assert_eq!(a, b);

        for label in TypeLabel::ALL {
            let n = a
                .iter()
                .filter(|r| r.type_label() == Some(label.as_str()))
                .count();
            assert_eq!(n, 10);
        }
    }

    #[test]
    fn generated_records_are_complete_and_labeled() {
        let records = generate_training_set(&SampleConfig::default()).unwrap();
        for (i, r) in records.iter().enumerate() {
            assert_eq!(r.missing_fields().count(), 0);
            assert!(r.label_triple(i).is_ok());
            for v in r.thresholds().iter().flatten() {
                assert_eq!(v % 5, 0, "threshold {v} is not a 5 dB step");
                assert!((-10..=120).contains(v));
            }
        }
    }

    #[test]
    fn conductive_records_keep_bone_near_normal() {
        let records = generate_training_set(&SampleConfig::default()).unwrap();
        for r in records.iter().filter(|r| r.type_label() == Some("Conductive")) {
            let values: Vec<i32> = r.thresholds().iter().flatten().copied().collect();
            let air: i32 = values[..12].iter().sum();
            let bone: i32 = values[12..].iter().sum();
            assert!(bone / 12 <= 25, "bone mean too high: {}", bone / 12);
            assert!(air - bone >= 12 * 10, "air-bone gap too small");
        }
    }

    #[test]
    fn zero_count_is_rejected() {
        let config = SampleConfig {
            count: 0,
            ..SampleConfig::default()
        };
        assert_eq!(generate_training_set(&config).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn pta_uses_speech_frequencies() {
        assert!((pure_tone_average(&[90, 10, 20, 30, 90, 90]) - 20.0).abs() < 1e-12);
    }
}
