use crate::geometry::point::Point;
use crate::prelude::{AntennaError, AntennaResult};
use serde::{Deserialize, Serialize};

/// Smallest radius a wire may be scaled down to.
pub const MIN_WIRE_RADIUS: f64 = 0.001;

/// Current on one solver segment of a wire.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SegmentCurrent {
    /// Amperes.
    pub magnitude: f64,
    /// Degrees.
    pub phase: f64,
}

impl SegmentCurrent {
    pub fn new(magnitude: f64, phase: f64) -> Self {
        Self { magnitude, phase }
    }
}

/// Cylindrical conductor between two endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wire {
    pub e1: Point,
    pub e2: Point,
    pub radius: f64,
    segments: u32,
    currents: Vec<SegmentCurrent>,
}

impl Wire {
    pub fn new(e1: Point, e2: Point, radius: f64, segments: u32) -> AntennaResult<Self> {
        if segments < 1 {
            return Err(AntennaError::MalformedGeometry(
                "wire needs at least one segment".into(),
            ));
        }
        Ok(Self {
            e1,
            e2,
            radius,
            segments,
            currents: Vec::new(),
        })
    }

    pub fn segments(&self) -> u32 {
        self.segments
    }

    pub fn length(&self) -> f64 {
        self.e1.distance(&self.e2)
    }

    pub fn midpoint(&self) -> Point {
        self.e1.midpoint(&self.e2)
    }

    /// Per-segment currents; empty until a solve has populated them.
    pub fn currents(&self) -> &[SegmentCurrent] {
        &self.currents
    }

    pub fn has_currents(&self) -> bool {
        self.currents.len() == self.segments as usize
    }

    /// Replaces the current samples. Surplus samples beyond the segment
    /// count are dropped.
    pub fn set_currents(&mut self, mut currents: Vec<SegmentCurrent>) {
        currents.truncate(self.segments as usize);
        self.currents = currents;
    }

    pub fn clear_currents(&mut self) {
        self.currents.clear();
    }

    pub fn translate(&mut self, dx: f64, dy: f64, dz: f64) {
        self.e1 = self.e1.translated(dx, dy, dz);
        self.e2 = self.e2.translated(dx, dy, dz);
    }

    /// Rotates both endpoints about the wire's own midpoint.
    pub fn rotate(&mut self, rx: f64, ry: f64, rz: f64) {
        let center = self.midpoint();
        self.rotate_about(center, rx, ry, rz);
    }

    pub fn rotate_about(&mut self, pivot: Point, rx: f64, ry: f64, rz: f64) {
        self.e1 = (self.e1 - pivot).rotated(rx, ry, rz) + pivot;
        self.e2 = (self.e2 - pivot).rotated(rx, ry, rz) + pivot;
    }

    /// Stretches the wire about its midpoint by `1 + scale` and multiplies
    /// the radius by `1 + width_delta`.
    pub fn scale(&mut self, scale: f64, width_delta: f64) {
        let center = self.midpoint();
        let half = self.e1 - center;
        let half_sq = half.x * half.x + half.y * half.y + half.z * half.z;

        // A collapsed wire may still grow but never shrinks further.
        if half_sq > 0.01 || scale > 0.0 {
            let stretched = half.scaled(1.0 + scale);
            self.e1 = center + stretched;
            self.e2 = center - stretched;
        }

        self.radius *= width_delta + 1.0;
        if self.radius < MIN_WIRE_RADIUS {
            self.radius = MIN_WIRE_RADIUS;
        }
    }
}

/// Flat rectangular obstruction given by two opposite corners. Rendered as a
/// box and approximated by a grid of wires when written for the solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstruction {
    pub e1: Point,
    pub e2: Point,
}

impl Obstruction {
    pub fn new(e1: Point, e2: Point) -> Self {
        Self { e1, e2 }
    }

    pub fn translate(&mut self, dx: f64, dy: f64, dz: f64) {
        self.e1 = self.e1.translated(dx, dy, dz);
        self.e2 = self.e2.translated(dx, dy, dz);
    }

    /// Grows the box by moving its second corner.
    pub fn resize(&mut self, sx: f64, sy: f64, sz: f64) {
        self.e2 = self.e2.translated(sx, sy, sz);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WireElement {
    Wire(Wire),
    Obstruction(Obstruction),
}

impl WireElement {
    pub fn endpoints(&self) -> (Point, Point) {
        match self {
            WireElement::Wire(wire) => (wire.e1, wire.e2),
            WireElement::Obstruction(wall) => (wall.e1, wall.e2),
        }
    }

    pub fn as_wire(&self) -> Option<&Wire> {
        match self {
            WireElement::Wire(wire) => Some(wire),
            WireElement::Obstruction(_) => None,
        }
    }

    pub fn as_wire_mut(&mut self) -> Option<&mut Wire> {
        match self {
            WireElement::Wire(wire) => Some(wire),
            WireElement::Obstruction(_) => None,
        }
    }

    pub fn as_obstruction_mut(&mut self) -> Option<&mut Obstruction> {
        match self {
            WireElement::Obstruction(wall) => Some(wall),
            WireElement::Wire(_) => None,
        }
    }

    pub fn rotate_about(&mut self, pivot: Point, rx: f64, ry: f64, rz: f64) {
        match self {
            WireElement::Wire(wire) => wire.rotate_about(pivot, rx, ry, rz),
            WireElement::Obstruction(wall) => {
                wall.e1 = (wall.e1 - pivot).rotated(rx, ry, rz) + pivot;
                wall.e2 = (wall.e2 - pivot).rotated(rx, ry, rz) + pivot;
            }
        }
    }
}
