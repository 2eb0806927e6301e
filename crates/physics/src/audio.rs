//! Audio-derived feature vector consumed by the physics core.
//!
//! The physics core does not decode audio. An external analysis
//! collaborator supplies these scalars once per frame; the core only
//! reads them (groove modulates gravity, BPM drives the wind target).

use serde::{Deserialize, Serialize};

/// Per-frame audio features supplied by the external analysis layer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AudioFeatures {
    /// Musical "swing/feel" in [0, 1]. Scales gravity down for floatier
    /// movement on groovier passages.
    pub groove: f32,

    /// Detected tempo in beats per minute.
    pub bpm: f32,

    /// Phase within the current beat in [0, 1).
    pub beat_phase: f32,

    /// Kick-drum transient strength in [0, 1].
    pub kick: f32,
}

impl Default for AudioFeatures {
    /// Neutral silence: no groove, resting tempo.
    fn default() -> Self {
        Self {
            groove: 0.0,
            bpm: 120.0,
            beat_phase: 0.0,
            kick: 0.0,
        }
    }
}

impl AudioFeatures {
    /// Returns a copy with every field forced into its documented range.
    ///
    /// The analysis layer is an external collaborator; a NaN or wild BPM
    /// from it must not leak into motion integration.
    pub fn clamped(self) -> Self {
        let sane = |v: f32, fallback: f32| if v.is_finite() { v } else { fallback };
        Self {
            groove: sane(self.groove, 0.0).clamp(0.0, 1.0),
            bpm: sane(self.bpm, 120.0).clamp(20.0, 300.0),
            beat_phase: sane(self.beat_phase, 0.0).rem_euclid(1.0),
            kick: sane(self.kick, 0.0).clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_neutral() {
        let f = AudioFeatures::default();
        assert_eq!(f.groove, 0.0);
        assert_eq!(f.bpm, 120.0);
    }

    #[test]
    fn test_clamped_rejects_nan() {
        let f = AudioFeatures {
            groove: f32::NAN,
            bpm: f32::INFINITY,
            beat_phase: -0.25,
            kick: 2.0,
        }
        .clamped();

        assert_eq!(f.groove, 0.0);
        assert_eq!(f.bpm, 120.0);
        assert!((f.beat_phase - 0.75).abs() < 1e-6);
        assert_eq!(f.kick, 1.0);
    }
}
