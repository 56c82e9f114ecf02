pub mod antenna;
pub mod element;
pub mod point;

pub use antenna::{Antenna, AntennaType, BoundingBox, CurrentRanges, SolveStamp};
pub use element::{Obstruction, SegmentCurrent, Wire, WireElement};
pub use point::{point_distance, Point};
