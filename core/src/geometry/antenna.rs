use crate::field::data::FieldData;
use crate::field::stats::ScalarRange;
use crate::geometry::element::{SegmentCurrent, Wire, WireElement};
use crate::geometry::point::Point;
use crate::prelude::AntennaMode;
use serde::{Deserialize, Serialize};

/// Canonical display size the visual scale maps the largest extent onto.
const CANONICAL_EXTENT: f64 = 50.0;

/// Classification read from the first comment card of a description.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum AntennaType {
    Vertical,
    Yagi,
    Quad,
    Dipole,
    ElevatedVertical,
    #[default]
    Unknown,
}

impl AntennaType {
    /// Matches the comment text by literal prefix. `ELEVATED_VERTICAL` is
    /// checked before `VERTICAL` so the longer hint wins.
    pub fn from_comment(text: &str) -> Self {
        let text = text.trim_start();
        if text.starts_with("ELEVATED_VERTICAL") {
            AntennaType::ElevatedVertical
        } else if text.starts_with("VERTICAL") {
            AntennaType::Vertical
        } else if text.starts_with("QUAD") {
            AntennaType::Quad
        } else if text.starts_with("YAGI") {
            AntennaType::Yagi
        } else if text.starts_with("DIPOLE") {
            AntennaType::Dipole
        } else {
            AntennaType::Unknown
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AntennaType::Vertical => "VERTICAL",
            AntennaType::Yagi => "YAGI",
            AntennaType::Quad => "QUAD",
            AntennaType::Dipole => "DIPOLE",
            AntennaType::ElevatedVertical => "ELEVATED_VERTICAL",
            AntennaType::Unknown => "UNKNOWN",
        }
    }

    /// Types drawn on a mast above the ground.
    pub fn is_elevated(&self) -> bool {
        matches!(
            self,
            AntennaType::Yagi | AntennaType::Quad | AntennaType::Dipole | AntennaType::ElevatedVertical
        )
    }

    /// Types carrying a horizontal boom.
    pub fn has_boom(&self) -> bool {
        matches!(self, AntennaType::Yagi | AntennaType::Quad)
    }
}

/// Axis-aligned extent of a set of points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl BoundingBox {
    pub fn around(point: Point) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    pub fn include(&mut self, p: Point) {
        self.min = Point::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z));
        self.max = Point::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z));
    }

    pub fn extent(&self) -> Point {
        self.max - self.min
    }

    pub fn center(&self) -> Point {
        self.min.midpoint(&self.max)
    }

    pub fn largest_extent(&self) -> f64 {
        let e = self.extent();
        e.x.max(e.y).max(e.z)
    }
}

/// Spread of segment currents over every wire of an antenna.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrentRanges {
    pub magnitude: ScalarRange,
    pub phase: ScalarRange,
}

/// Inputs a stored field was computed from: the solve mode and the
/// `(id, revision)` of every antenna written into the deck, in deck order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveStamp {
    pub mode: AntennaMode,
    pub inputs: Vec<(u64, u64)>,
}

/// One antenna: its elements, placement in the scene and solve results.
#[derive(Debug, Clone, Default)]
pub struct Antenna {
    pub name: String,
    pub kind: AntennaType,
    /// Positional offset in multi-antenna scenes.
    pub offset: Point,
    /// MHz.
    pub frequency: f64,
    pub ground_specified: bool,
    visual_scale: f64,
    elements: Vec<WireElement>,
    current_element: Option<usize>,
    field: Option<FieldData>,
    solved_from: Option<SolveStamp>,
    current_ranges: Option<CurrentRanges>,
    cards: Vec<String>,
    id: u64,
    revision: u64,
}

impl Antenna {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visual_scale: 1.0,
            ..Default::default()
        }
    }

    /// Appends an element; insertion order is traversal and render order.
    pub fn insert(&mut self, element: WireElement) {
        self.elements.push(element);
        self.mark_changed();
    }

    pub fn elements(&self) -> &[WireElement] {
        &self.elements
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn wires(&self) -> impl Iterator<Item = (usize, &Wire)> {
        self.elements
            .iter()
            .enumerate()
            .filter_map(|(idx, element)| element.as_wire().map(|wire| (idx, wire)))
    }

    pub fn total_segments(&self) -> usize {
        self.wires().map(|(_, wire)| wire.segments() as usize).sum()
    }

    pub fn cards(&self) -> &[String] {
        &self.cards
    }

    pub(crate) fn push_card(&mut self, card: impl Into<String>) {
        self.cards.push(card.into());
    }

    pub fn visual_scale(&self) -> f64 {
        self.visual_scale
    }

    pub fn current_element_index(&self) -> Option<usize> {
        self.current_element
    }

    pub fn current_element(&self) -> Option<&WireElement> {
        self.current_element.and_then(|idx| self.elements.get(idx))
    }

    /// Mutable access to the selected element. Edits made through it are
    /// not tracked; use `edit_current_element` or call `mark_changed`.
    pub fn current_element_mut(&mut self) -> Option<&mut WireElement> {
        let idx = self.current_element?;
        self.elements.get_mut(idx)
    }

    /// Runs `edit` on the selected element and marks the antenna changed
    /// only when `edit` reports that it modified something. `None` when
    /// nothing is selected.
    pub fn edit_current_element(
        &mut self,
        edit: impl FnOnce(&mut WireElement) -> bool,
    ) -> Option<bool> {
        let element = self.current_element_mut()?;
        let applied = edit(element);
        if applied {
            self.mark_changed();
        }
        Some(applied)
    }

    /// Rewinds the selection to the first element, if any.
    pub fn select_first_element(&mut self) {
        self.current_element = if self.elements.is_empty() { None } else { Some(0) };
    }

    /// Selects the element at `idx`; false when out of range.
    pub fn select_element(&mut self, idx: usize) -> bool {
        if idx >= self.elements.len() {
            return false;
        }
        self.current_element = Some(idx);
        true
    }

    /// Advances the selection cyclically, wrapping past the last element.
    pub fn select_next_element(&mut self) -> Option<usize> {
        if self.elements.is_empty() {
            self.current_element = None;
            return None;
        }
        let next = match self.current_element {
            Some(idx) => (idx + 1) % self.elements.len(),
            None => 0,
        };
        self.current_element = Some(next);
        Some(next)
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        let mut points = self.elements.iter().flat_map(|element| {
            let (e1, e2) = element.endpoints();
            [e1, e2]
        });
        let first = points.next()?;
        let mut bounds = BoundingBox::around(first);
        points.for_each(|p| bounds.include(p));
        Some(bounds)
    }

    /// Bounds over wire endpoints only; obstructions are left out.
    fn wire_bounds(&self) -> Option<BoundingBox> {
        let mut points = self.wires().flat_map(|(_, wire)| [wire.e1, wire.e2]);
        let first = points.next()?;
        let mut bounds = BoundingBox::around(first);
        points.for_each(|p| bounds.include(p));
        Some(bounds)
    }

    /// Recomputes the scale that fits the wire geometry into the canonical
    /// display size.
    pub fn update_visual_scale(&mut self) {
        let largest = self
            .wire_bounds()
            .map(|bounds| bounds.largest_extent())
            .unwrap_or(0.0);
        self.visual_scale = if largest > 0.0 {
            CANONICAL_EXTENT / largest
        } else {
            1.0
        };
    }

    pub fn field(&self) -> Option<&FieldData> {
        self.field.as_ref()
    }

    pub fn field_computed(&self) -> bool {
        self.field.is_some()
    }

    /// Replaces the field data wholesale, recording what it was solved from.
    pub fn set_field(&mut self, field: FieldData, stamp: SolveStamp) {
        self.field = Some(field);
        self.solved_from = Some(stamp);
    }

    pub fn clear_field(&mut self) {
        self.field = None;
        self.solved_from = None;
    }

    pub fn solved_from(&self) -> Option<&SolveStamp> {
        self.solved_from.as_ref()
    }

    /// Scene-unique identity, assigned when the antenna joins a scene.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    /// Bumped by every edit to geometry, placement or frequency.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// True when the antenna was edited after its stored field was solved,
    /// or when it has no field.
    pub fn geometry_changed(&self) -> bool {
        match &self.solved_from {
            Some(stamp) => !stamp.inputs.contains(&(self.id, self.revision)),
            None => true,
        }
    }

    pub fn mark_changed(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Stores currents for the wire at `element`; ignored for obstructions.
    pub fn set_wire_currents(&mut self, element: usize, currents: Vec<SegmentCurrent>) -> bool {
        match self.elements.get_mut(element).and_then(WireElement::as_wire_mut) {
            Some(wire) => {
                wire.set_currents(currents);
                true
            }
            None => false,
        }
    }

    pub fn clear_currents(&mut self) {
        for element in &mut self.elements {
            if let Some(wire) = element.as_wire_mut() {
                wire.clear_currents();
            }
        }
        self.current_ranges = None;
    }

    pub fn current_ranges(&self) -> Option<CurrentRanges> {
        self.current_ranges
    }

    /// Recomputes the magnitude and phase spread from the stored currents.
    pub fn update_current_ranges(&mut self) {
        let mut magnitude: Option<ScalarRange> = None;
        let mut phase: Option<ScalarRange> = None;
        for (_, wire) in self.wires() {
            for sample in wire.currents() {
                ScalarRange::track(&mut magnitude, sample.magnitude);
                ScalarRange::track(&mut phase, sample.phase);
            }
        }
        self.current_ranges = match (magnitude, phase) {
            (Some(magnitude), Some(phase)) => Some(CurrentRanges { magnitude, phase }),
            _ => None,
        };
    }

    pub fn translate_all(&mut self, dx: f64, dy: f64, dz: f64) {
        for element in &mut self.elements {
            match element {
                WireElement::Wire(wire) => wire.translate(dx, dy, dz),
                WireElement::Obstruction(wall) => wall.translate(dx, dy, dz),
            }
        }
        self.mark_changed();
    }

    /// Rotates every element about the centre of the antenna's bounding box.
    pub fn rotate_all(&mut self, rx: f64, ry: f64, rz: f64) {
        let Some(bounds) = self.bounds() else {
            return;
        };
        let pivot = bounds.center();
        for element in &mut self.elements {
            element.rotate_about(pivot, rx, ry, rz);
        }
        self.mark_changed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::element::Obstruction;

    fn wire(x1: f64, z1: f64, x2: f64, z2: f64, segments: u32) -> WireElement {
        WireElement::Wire(
            Wire::new(Point::new(x1, 0.0, z1), Point::new(x2, 0.0, z2), 0.01, segments).unwrap(),
        )
    }

    #[test]
    fn type_hint_prefers_elevated_vertical() {
        assert_eq!(
            AntennaType::from_comment("ELEVATED_VERTICAL 20m"),
            AntennaType::ElevatedVertical
        );
        assert_eq!(AntennaType::from_comment("VERTICAL"), AntennaType::Vertical);
        assert_eq!(AntennaType::from_comment(" YAGI 3 el"), AntennaType::Yagi);
        assert_eq!(AntennaType::from_comment("my antenna"), AntennaType::Unknown);
    }

    #[test]
    fn insert_preserves_order_and_counts_segments() {
        let mut antenna = Antenna::new("test");
        antenna.insert(wire(0.0, 0.0, 0.0, 1.0, 3));
        antenna.insert(WireElement::Obstruction(Obstruction::new(
            Point::ORIGIN,
            Point::new(1.0, 1.0, 1.0),
        )));
        antenna.insert(wire(1.0, 0.0, 1.0, 1.0, 5));

        assert_eq!(antenna.element_count(), 3);
        assert_eq!(antenna.total_segments(), 8);
        let indices: Vec<usize> = antenna.wires().map(|(idx, _)| idx).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn element_selection_cycles_back_to_start() {
        let mut antenna = Antenna::new("cycle");
        for i in 0..4 {
            antenna.insert(wire(i as f64, 0.0, i as f64, 1.0, 1));
        }
        antenna.select_first_element();
        let start = antenna.current_element_index();
        for _ in 0..antenna.element_count() {
            antenna.select_next_element();
        }
        assert_eq!(antenna.current_element_index(), start);
    }

    #[test]
    fn empty_antenna_has_no_selection() {
        let mut antenna = Antenna::new("empty");
        assert_eq!(antenna.select_next_element(), None);
        assert!(antenna.current_element().is_none());
    }

    #[test]
    fn visual_scale_uses_largest_extent() {
        let mut antenna = Antenna::new("scale");
        antenna.insert(wire(-2.0, 0.0, 3.0, 1.0, 1));
        antenna.update_visual_scale();
        assert!((antenna.visual_scale() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn current_ranges_cover_every_wire() {
        let mut antenna = Antenna::new("currents");
        antenna.insert(wire(0.0, 0.0, 0.0, 1.0, 2));
        antenna.insert(wire(1.0, 0.0, 1.0, 1.0, 1));
        antenna.set_wire_currents(
            0,
            vec![SegmentCurrent::new(0.5, -10.0), SegmentCurrent::new(2.0, 5.0)],
        );
        antenna.set_wire_currents(1, vec![SegmentCurrent::new(0.1, 40.0)]);
        antenna.update_current_ranges();

        let ranges = antenna.current_ranges().unwrap();
        assert_eq!(ranges.magnitude.min, 0.1);
        assert_eq!(ranges.magnitude.max, 2.0);
        assert_eq!(ranges.phase.min, -10.0);
        assert_eq!(ranges.phase.max, 40.0);
    }

    #[test]
    fn edit_marks_changed_only_when_applied() {
        let mut antenna = Antenna::new("edit");
        assert_eq!(antenna.edit_current_element(|_| true), None);
        antenna.insert(wire(0.0, 0.0, 0.0, 1.0, 1));
        antenna.select_first_element();
        let before = antenna.revision();

        let as_wall = antenna.edit_current_element(|e| e.as_obstruction_mut().is_some());
        assert_eq!(as_wall, Some(false));
        assert_eq!(antenna.revision(), before);
        assert_eq!(antenna.edit_current_element(|_| true), Some(true));
        assert_eq!(antenna.revision(), before + 1);
    }

    #[test]
    fn stored_field_goes_stale_after_edit() {
        let mut antenna = Antenna::new("stale");
        antenna.insert(wire(0.0, 0.0, 0.0, 1.0, 1));
        assert!(antenna.geometry_changed());

        let stamp = SolveStamp {
            mode: AntennaMode::Single,
            inputs: vec![(antenna.id(), antenna.revision())],
        };
        antenna.set_field(FieldData::new(5.0), stamp);
        assert!(!antenna.geometry_changed());

        antenna.translate_all(1.0, 0.0, 0.0);
        assert!(antenna.geometry_changed());
        antenna.clear_field();
        assert!(antenna.solved_from().is_none());
    }

    #[test]
    fn rotate_all_pivots_on_bounds_center() {
        let mut antenna = Antenna::new("rotate");
        antenna.insert(wire(-1.0, 0.0, 1.0, 0.0, 1));
        antenna.rotate_all(0.0, 0.0, 90.0);
        let (e1, e2) = antenna.elements()[0].endpoints();
        assert!(e1.distance(&Point::new(0.0, -1.0, 0.0)) < 1e-9);
        assert!(e2.distance(&Point::new(0.0, 1.0, 0.0)) < 1e-9);
    }
}
