use crate::field::stats::ScalarRange;
use serde::{Deserialize, Serialize};

/// Handedness of the polarization ellipse at one sample direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum PolarizationSense {
    #[default]
    Linear,
    Right,
    Left,
}

impl PolarizationSense {
    /// Reads the solver's sense column by literal prefix.
    pub fn from_token(token: &str) -> Option<Self> {
        if token.starts_with("LINEAR") {
            Some(PolarizationSense::Linear)
        } else if token.starts_with("RIGHT") {
            Some(PolarizationSense::Right)
        } else if token.starts_with("LEFT") {
            Some(PolarizationSense::Left)
        } else {
            None
        }
    }
}

/// One row of the far-field radiation pattern.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldSample {
    /// Degrees.
    pub theta: f64,
    /// Degrees.
    pub phi: f64,
    pub vertical_gain: f64,
    pub horizontal_gain: f64,
    /// dBi.
    pub total_gain: f64,
    pub axial_ratio: f64,
    pub sense: PolarizationSense,
    /// Degrees.
    pub tilt: f64,
    pub theta_magnitude: f64,
    pub theta_phase: f64,
    pub phi_magnitude: f64,
    pub phi_phase: f64,
}

/// Spread of the scalar channels used for color mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldRanges {
    pub gain: ScalarRange,
    pub tilt: ScalarRange,
    pub axial_ratio: ScalarRange,
}

impl FieldRanges {
    fn seed(sample: &FieldSample) -> Self {
        Self {
            gain: ScalarRange::seed(sample.total_gain),
            tilt: ScalarRange::seed(sample.tilt),
            axial_ratio: ScalarRange::seed(sample.axial_ratio),
        }
    }

    fn include(&mut self, sample: &FieldSample) {
        self.gain.include(sample.total_gain);
        self.tilt.include(sample.tilt);
        self.axial_ratio.include(sample.axial_ratio);
    }
}

/// Radiation pattern of one solve, sampled over a theta/phi grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldData {
    /// Angular step the solver was asked to sample at.
    pub step_size: f64,
    samples: Vec<FieldSample>,
    ranges: Option<FieldRanges>,
}

impl FieldData {
    pub fn new(step_size: f64) -> Self {
        Self {
            step_size,
            samples: Vec::with_capacity(1024),
            ranges: None,
        }
    }

    pub fn from_samples(step_size: f64, samples: Vec<FieldSample>) -> Self {
        let mut field = Self::new(step_size);
        field.samples.reserve(samples.len());
        for sample in samples {
            field.push(sample);
        }
        field
    }

    /// Appends a sample and widens the running ranges.
    pub fn push(&mut self, sample: FieldSample) {
        match self.ranges.as_mut() {
            Some(ranges) => ranges.include(&sample),
            None => self.ranges = Some(FieldRanges::seed(&sample)),
        }
        self.samples.push(sample);
    }

    pub fn samples(&self) -> &[FieldSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Channel ranges; `None` while the pattern holds no samples.
    pub fn ranges(&self) -> Option<&FieldRanges> {
        self.ranges.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(gain: f64, tilt: f64, axial_ratio: f64) -> FieldSample {
        FieldSample {
            total_gain: gain,
            tilt,
            axial_ratio,
            ..Default::default()
        }
    }

    #[test]
    fn sense_tokens_match_by_prefix() {
        assert_eq!(PolarizationSense::from_token("LINEAR"), Some(PolarizationSense::Linear));
        assert_eq!(PolarizationSense::from_token("RIGHTHAND"), Some(PolarizationSense::Right));
        assert_eq!(PolarizationSense::from_token("LEFT"), Some(PolarizationSense::Left));
        assert_eq!(PolarizationSense::from_token("?"), None);
    }

    #[test]
    fn ranges_bound_every_sample() {
        let samples = vec![
            sample(-3.0, 10.0, 0.2),
            sample(2.1, -45.0, 0.0),
            sample(-999.99, 90.0, 1.0),
            sample(0.5, 0.0, 0.7),
        ];
        let field = FieldData::from_samples(5.0, samples);
        let ranges = field.ranges().unwrap();

        for s in field.samples() {
            assert!(ranges.gain.contains(s.total_gain));
            assert!(ranges.tilt.contains(s.tilt));
            assert!(ranges.axial_ratio.contains(s.axial_ratio));
        }
        assert_eq!(ranges.gain.min, -999.99);
        assert_eq!(ranges.gain.max, 2.1);
        assert_eq!(ranges.tilt.min, -45.0);
        assert_eq!(ranges.axial_ratio.max, 1.0);
    }

    #[test]
    fn empty_field_has_no_ranges() {
        let field = FieldData::new(5.0);
        assert!(field.is_empty());
        assert!(field.ranges().is_none());
    }
}
