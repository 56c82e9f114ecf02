//! Bounded collection of antennas with a current-antenna cursor and the
//! user-driven edits applied to the current selection.

pub mod boom;
pub mod standard;

pub use boom::{boom_height, derive_boom_geometry, field_center, BoomGeometry};
pub use standard::StandardAntenna;

use crate::geometry::antenna::{Antenna, SolveStamp};
use crate::geometry::element::{Obstruction, Wire, WireElement};
use crate::geometry::point::Point;
use crate::prelude::{AntennaError, AntennaMode, AntennaResult, VisualConfig, MAX_ANTENNAS};
use crate::solver::cards;
use crate::solver::writer;
use log::{debug, info};
use std::fs;
use std::path::Path;

/// Corners of a freshly added wall.
pub const WALL_CORNERS: (Point, Point) = (
    Point {
        x: -2.0,
        y: 0.0,
        z: 0.0,
    },
    Point {
        x: -1.0,
        y: 2.0,
        z: 4.0,
    },
);

#[derive(Debug)]
pub struct Scene {
    antennas: Vec<Antenna>,
    current: usize,
    capacity: usize,
    next_id: u64,
    pub mode: AntennaMode,
}

impl Scene {
    pub fn new(capacity: usize) -> Self {
        Self {
            antennas: Vec::with_capacity(capacity),
            current: 0,
            capacity,
            next_id: 0,
            mode: AntennaMode::Single,
        }
    }

    pub fn from_config(config: &VisualConfig) -> Self {
        Self::new(config.max_antennas)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.antennas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.antennas.is_empty()
    }

    pub fn antennas(&self) -> &[Antenna] {
        &self.antennas
    }

    pub(crate) fn antennas_mut(&mut self) -> &mut [Antenna] {
        &mut self.antennas
    }

    /// Index of the current antenna; `None` for an empty scene.
    pub fn current_index(&self) -> Option<usize> {
        (!self.antennas.is_empty()).then_some(self.current)
    }

    pub fn current_antenna(&self) -> AntennaResult<&Antenna> {
        self.antennas
            .get(self.current)
            .ok_or(AntennaError::NoCurrentAntenna)
    }

    pub fn current_antenna_mut(&mut self) -> AntennaResult<&mut Antenna> {
        self.antennas
            .get_mut(self.current)
            .ok_or(AntennaError::NoCurrentAntenna)
    }

    fn ensure_capacity(&self) -> AntennaResult<()> {
        if self.antennas.len() >= self.capacity {
            return Err(AntennaError::CapacityExceeded(self.capacity));
        }
        Ok(())
    }

    /// Installs a parsed antenna as the new current antenna. The scene is
    /// untouched when the scene is full or the antenna has no elements.
    pub fn add_antenna(&mut self, mut antenna: Antenna) -> AntennaResult<usize> {
        self.ensure_capacity()?;
        if antenna.element_count() == 0 {
            return Err(AntennaError::MalformedGeometry(format!(
                "{} has no elements",
                antenna.name
            )));
        }
        antenna.clear_field();
        antenna.set_id(self.next_id);
        self.next_id += 1;
        self.antennas.push(antenna);
        self.current = self.antennas.len() - 1;
        info!(
            "scene holds {} antennas, current is {}",
            self.antennas.len(),
            self.current
        );
        Ok(self.current)
    }

    /// Parses `text` and installs the result.
    pub fn load_description(&mut self, name: &str, text: &str) -> AntennaResult<usize> {
        self.ensure_capacity()?;
        let antenna = cards::parse_description(name, text)?;
        self.add_antenna(antenna)
    }

    pub fn load_file(&mut self, path: impl AsRef<Path>) -> AntennaResult<usize> {
        self.ensure_capacity()?;
        let antenna = cards::load_file(path)?;
        self.add_antenna(antenna)
    }

    pub fn load_standard(&mut self, standard: StandardAntenna) -> AntennaResult<usize> {
        self.load_description(standard.name(), standard.description())
    }

    /// Removes the current antenna, keeping the order of the others, and
    /// clamps the cursor to the new last antenna.
    pub fn delete_current_antenna(&mut self) -> AntennaResult<Antenna> {
        if self.antennas.is_empty() {
            return Err(AntennaError::NoCurrentAntenna);
        }
        let removed = self.antennas.remove(self.current);
        if self.current >= self.antennas.len() {
            self.current = self.antennas.len().saturating_sub(1);
        }
        info!("deleted antenna {}", removed.name);
        Ok(removed)
    }

    pub fn clear(&mut self) {
        self.antennas.clear();
        self.current = 0;
    }

    /// Advances the cursor cyclically.
    pub fn select_next_antenna(&mut self) -> AntennaResult<usize> {
        if self.antennas.is_empty() {
            return Err(AntennaError::NoCurrentAntenna);
        }
        self.current = (self.current + 1) % self.antennas.len();
        Ok(self.current)
    }

    pub fn select_next_element(&mut self) -> AntennaResult<usize> {
        self.current_antenna_mut()?
            .select_next_element()
            .ok_or(AntennaError::NoCurrentElement)
    }

    /// Applies `edit` to the selected wire. Returns false, leaving the
    /// antenna untouched, when the selection is a wall.
    fn edit_current_wire(&mut self, edit: impl FnOnce(&mut Wire)) -> AntennaResult<bool> {
        let applied = self
            .current_antenna_mut()?
            .edit_current_element(|element| match element.as_wire_mut() {
                Some(wire) => {
                    edit(wire);
                    true
                }
                None => false,
            })
            .ok_or(AntennaError::NoCurrentElement)?;
        if !applied {
            debug!("selected element is a wall, wire edit skipped");
        }
        Ok(applied)
    }

    fn edit_current_wall(&mut self, edit: impl FnOnce(&mut Obstruction)) -> AntennaResult<bool> {
        let applied = self
            .current_antenna_mut()?
            .edit_current_element(|element| match element.as_obstruction_mut() {
                Some(wall) => {
                    edit(wall);
                    true
                }
                None => false,
            })
            .ok_or(AntennaError::NoCurrentElement)?;
        if !applied {
            debug!("selected element is a wire, wall edit skipped");
        }
        Ok(applied)
    }

    pub fn move_current_element(&mut self, dx: f64, dy: f64, dz: f64) -> AntennaResult<bool> {
        self.edit_current_wire(|wire| wire.translate(dx, dy, dz))
    }

    /// Rotates the selected wire about its midpoint, X then Y then Z.
    pub fn rotate_current_element(&mut self, rx: f64, ry: f64, rz: f64) -> AntennaResult<bool> {
        self.edit_current_wire(|wire| wire.rotate(rx, ry, rz))
    }

    pub fn scale_current_element(&mut self, scale: f64, width_delta: f64) -> AntennaResult<bool> {
        self.edit_current_wire(|wire| wire.scale(scale, width_delta))
    }

    /// Appends a wall at the fixed starting corners and selects it.
    pub fn add_wall(&mut self) -> AntennaResult<usize> {
        let antenna = self.current_antenna_mut()?;
        let (e1, e2) = WALL_CORNERS;
        antenna.insert(WireElement::Obstruction(Obstruction::new(e1, e2)));
        let idx = antenna.element_count() - 1;
        antenna.select_element(idx);
        Ok(idx)
    }

    pub fn move_current_wall(&mut self, dx: f64, dy: f64, dz: f64) -> AntennaResult<bool> {
        self.edit_current_wall(|wall| wall.translate(dx, dy, dz))
    }

    pub fn scale_current_wall(&mut self, sx: f64, sy: f64, sz: f64) -> AntennaResult<bool> {
        self.edit_current_wall(|wall| wall.resize(sx, sy, sz))
    }

    /// Shifts the current antenna's placement offset.
    pub fn move_current_antenna(&mut self, dx: f64, dy: f64, dz: f64) -> AntennaResult<Point> {
        let antenna = self.current_antenna_mut()?;
        antenna.offset = antenna.offset.translated(dx, dy, dz);
        antenna.mark_changed();
        Ok(antenna.offset)
    }

    pub fn rotate_current_antenna(&mut self, rx: f64, ry: f64, rz: f64) -> AntennaResult<()> {
        self.current_antenna_mut()?.rotate_all(rx, ry, rz);
        Ok(())
    }

    /// Sets the solve frequency in MHz; negative values become zero.
    pub fn change_frequency(&mut self, mhz: f64) -> AntennaResult<f64> {
        let antenna = self.current_antenna_mut()?;
        antenna.frequency = mhz.max(0.0);
        antenna.mark_changed();
        Ok(antenna.frequency)
    }

    /// Writes the current antenna, or every antenna in multiple mode, as a
    /// solver description.
    pub fn save(&self, path: impl AsRef<Path>, config: &VisualConfig) -> AntennaResult<()> {
        let current = self.current_index().ok_or(AntennaError::NoCurrentAntenna)?;
        let deck = match self.mode {
            AntennaMode::Single => writer::write_single(&self.antennas[current], current, config),
            AntennaMode::Multiple => writer::write_combined(&self.antennas, current, config),
        };
        let path = path.as_ref();
        fs::write(path, deck.text).map_err(|e| AntennaError::io(path, e))?;
        info!("saved geometry to {}", path.display());
        Ok(())
    }

    /// What a solve of the current antenna in the current mode would be
    /// computed from. `None` for an empty scene.
    pub fn solve_stamp(&self) -> Option<SolveStamp> {
        let current = self.current_antenna().ok()?;
        let inputs = match self.mode {
            AntennaMode::Single => vec![(current.id(), current.revision())],
            AntennaMode::Multiple => self
                .antennas
                .iter()
                .map(|antenna| (antenna.id(), antenna.revision()))
                .collect(),
        };
        Some(SolveStamp {
            mode: self.mode,
            inputs,
        })
    }

    /// True when a solve for the current mode would see different input
    /// than the one that produced the current antenna's field.
    pub fn needs_solve(&self) -> bool {
        let Ok(current) = self.current_antenna() else {
            return false;
        };
        !current.field_computed() || current.solved_from() != self.solve_stamp().as_ref()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(MAX_ANTENNAS)
    }
}
