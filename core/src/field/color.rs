use serde::{Deserialize, Serialize};

/// Straight RGBA color, components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

/// Diverging blue-green-red scale. `min` maps to pure blue, the midpoint to
/// pure green and `max` to pure red. A degenerate range maps everything to
/// the midpoint. Always opaque.
pub fn color_for(value: f64, min: f64, max: f64) -> Rgba {
    let t = if min != max {
        ((value - min) / (max - min)) as f32
    } else {
        0.5
    };

    if t > 0.5 {
        Rgba::opaque((t - 0.5) * 2.0, (1.0 - t) * 2.0, 0.0)
    } else {
        Rgba::opaque(0.0, t * 2.0, (0.5 - t) * 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_ends_map_to_pure_colors() {
        assert_eq!(color_for(-3.0, -3.0, 9.0), Rgba::opaque(0.0, 0.0, 1.0));
        assert_eq!(color_for(9.0, -3.0, 9.0), Rgba::opaque(1.0, 0.0, 0.0));
        assert_eq!(color_for(3.0, -3.0, 9.0), Rgba::opaque(0.0, 1.0, 0.0));
    }

    #[test]
    fn degenerate_range_is_midpoint_green() {
        for v in [-1.0, 0.0, 42.0] {
            assert_eq!(color_for(17.0, v, v), Rgba::opaque(0.0, 1.0, 0.0));
            assert_eq!(color_for(v, v, v), Rgba::opaque(0.0, 1.0, 0.0));
        }
    }

    #[test]
    fn alpha_can_be_overridden() {
        let color = color_for(1.0, 0.0, 2.0).with_alpha(0.25);
        assert_eq!(color.a, 0.25);
        assert_eq!(color.g, 1.0);
    }
}
