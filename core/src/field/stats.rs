use serde::{Deserialize, Serialize};

/// Closed `[min, max]` interval tracked over a stream of values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalarRange {
    pub min: f64,
    pub max: f64,
}

impl ScalarRange {
    /// Range holding a single value; the first sample seeds both ends.
    pub fn seed(value: f64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    pub fn include(&mut self, value: f64) {
        if value > self.max {
            self.max = value;
        }
        if value < self.min {
            self.min = value;
        }
    }

    /// Seeds `range` on the first value, widens it afterwards.
    pub fn track(range: &mut Option<ScalarRange>, value: f64) {
        match range {
            Some(existing) => existing.include(value),
            None => *range = Some(ScalarRange::seed(value)),
        }
    }

    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        let mut range = None;
        for value in values {
            Self::track(&mut range, value);
        }
        range
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn is_degenerate(&self) -> bool {
        self.min == self.max
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    /// Maps `value` into `[0, 1]` over the range. A degenerate range yields
    /// the midpoint `0.5`.
    pub fn normalize(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            0.5
        } else {
            (value - self.min) / self.span()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_value_seeds_both_ends() {
        let range = ScalarRange::from_values([3.0]).unwrap();
        assert_eq!(range.min, 3.0);
        assert_eq!(range.max, 3.0);
        assert!(range.is_degenerate());
    }

    #[test]
    fn empty_sequence_has_no_range() {
        assert!(ScalarRange::from_values(std::iter::empty()).is_none());
    }

    #[test]
    fn normalize_handles_degenerate_range() {
        let range = ScalarRange::seed(-4.0);
        assert_eq!(range.normalize(100.0), 0.5);

        let wide = ScalarRange::from_values([-10.0, 10.0]).unwrap();
        assert_eq!(wide.normalize(-10.0), 0.0);
        assert_eq!(wide.normalize(0.0), 0.5);
        assert_eq!(wide.normalize(10.0), 1.0);
    }
}
