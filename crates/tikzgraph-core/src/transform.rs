//! Coordinate mappings between document and display space

use serde::{Deserialize, Serialize};

use crate::model::Point;

/// A mapping between document coordinates and some other space.
pub trait Transformer {
    fn to_screen(&self, point: Point) -> Point;
    fn from_screen(&self, point: Point) -> Point;
}

/// Uniform scale about a screen-space origin, optionally flipping the y axis
/// (screens usually grow downwards, documents upwards).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleTransformer {
    pub origin: Point,
    pub scale: f64,
    pub flip_y: bool,
}

impl ScaleTransformer {
    pub fn new(origin: Point, scale: f64) -> Self {
        ScaleTransformer {
            origin,
            scale,
            flip_y: false,
        }
    }

    pub fn flipped(mut self) -> Self {
        self.flip_y = true;
        self
    }

    fn y_sign(&self) -> f64 {
        if self.flip_y { -1.0 } else { 1.0 }
    }
}

impl Default for ScaleTransformer {
    fn default() -> Self {
        ScaleTransformer::new(Point::default(), 1.0)
    }
}

impl Transformer for ScaleTransformer {
    fn to_screen(&self, point: Point) -> Point {
        Point::new(
            self.origin.x + point.x * self.scale,
            self.origin.y + self.y_sign() * point.y * self.scale,
        )
    }

    fn from_screen(&self, point: Point) -> Point {
        Point::new(
            (point.x - self.origin.x) / self.scale,
            self.y_sign() * (point.y - self.origin.y) / self.scale,
        )
    }
}
