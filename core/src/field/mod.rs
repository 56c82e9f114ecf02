pub mod color;
pub mod data;
pub mod mesh;
pub mod stats;
pub mod wires;

pub use color::{color_for, Rgba};
pub use data::{FieldData, FieldRanges, FieldSample, PolarizationSense};
pub use mesh::{Channel, DisplayMode, MeshBuilder, MeshPoint, PointSprite, Renderable, SurfaceMesh};
pub use stats::ScalarRange;
pub use wires::{wire_appearance, ElementAppearance, WireDrawMode};
