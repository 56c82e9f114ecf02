use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// Cartesian coordinate in internal length units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub const ORIGIN: Point = Point {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new(
            (self.x + other.x) / 2.0,
            (self.y + other.y) / 2.0,
            (self.z + other.z) / 2.0,
        )
    }

    pub fn translated(&self, dx: f64, dy: f64, dz: f64) -> Point {
        Point::new(self.x + dx, self.y + dy, self.z + dz)
    }

    pub fn scaled(&self, factor: f64) -> Point {
        Point::new(self.x * factor, self.y * factor, self.z * factor)
    }

    /// Rotates about the origin by `rx`, `ry`, `rz` degrees, applied about
    /// the X axis first, then Y, then Z.
    pub fn rotated(&self, rx: f64, ry: f64, rz: f64) -> Point {
        let (sx, cx) = rx.to_radians().sin_cos();
        let (sy, cy) = ry.to_radians().sin_cos();
        let (sz, cz) = rz.to_radians().sin_cos();

        let mut p = *self;

        let y = p.y * cx - p.z * sx;
        p.z = p.y * sx + p.z * cx;
        p.y = y;

        let x = p.x * cy + p.z * sy;
        p.z = -p.x * sy + p.z * cy;
        p.x = x;

        let x = p.x * cz - p.y * sz;
        p.y = p.x * sz + p.y * cz;
        p.x = x;

        p
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// Euclidean distance between two points.
pub fn point_distance(p1: Point, p2: Point) -> f64 {
    p1.distance(&p2)
}
