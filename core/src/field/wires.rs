use crate::field::color::{color_for, Rgba};
use crate::geometry::antenna::Antenna;
use crate::geometry::element::WireElement;
use serde::{Deserialize, Serialize};

const SELECTED_COLOR: Rgba = Rgba::opaque(0.8, 0.1, 0.1);
const WIRE_COLOR: Rgba = Rgba::new(0.8, 0.9, 0.9, 0.9);

/// How wires are colored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WireDrawMode {
    #[default]
    Geometry,
    CurrentMagnitude,
    CurrentPhase,
}

/// Colors for one element: a single body color, plus one color per segment
/// when drawn by current.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementAppearance {
    pub element: usize,
    pub selected: bool,
    pub color: Rgba,
    pub segment_colors: Vec<Rgba>,
}

/// Per-element colors for `antenna` under `mode`. Current modes fall back to
/// geometry colors when the antenna holds no solved currents.
pub fn wire_appearance(antenna: &Antenna, mode: WireDrawMode) -> Vec<ElementAppearance> {
    let selected = antenna.current_element_index();
    let ranges = antenna.current_ranges();

    antenna
        .elements()
        .iter()
        .enumerate()
        .map(|(idx, element)| {
            let is_selected = selected == Some(idx);
            let color = if is_selected { SELECTED_COLOR } else { WIRE_COLOR };

            let segment_colors = match (element, mode, ranges) {
                (WireElement::Wire(wire), WireDrawMode::CurrentMagnitude, Some(r))
                    if wire.has_currents() =>
                {
                    wire.currents()
                        .iter()
                        .map(|c| color_for(c.magnitude, r.magnitude.min, r.magnitude.max))
                        .collect()
                }
                (WireElement::Wire(wire), WireDrawMode::CurrentPhase, Some(r))
                    if wire.has_currents() =>
                {
                    wire.currents()
                        .iter()
                        .map(|c| color_for(c.phase, r.phase.min, r.phase.max))
                        .collect()
                }
                _ => Vec::new(),
            };

            ElementAppearance {
                element: idx,
                selected: is_selected,
                color,
                segment_colors,
            }
        })
        .collect()
}
