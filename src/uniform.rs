//! Infinite single-color image.

use crate::color::{Color, ColorModel};
use crate::geom::{Point, Rectangle};
use crate::image::Image;

/// Extent used for "unbounded" images.
const EXTENT: i32 = 1_000_000_000;

/// An infinite-sized image of one color.
///
/// It is its own color sample ([`rgba`](Uniform::rgba)) and its own color
/// model ([`convert`](Uniform::convert) maps everything to the stored color).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Uniform {
    pub color: Color,
}

/// Opaque black.
pub static BLACK: Uniform = Uniform::new(Color::BLACK);
/// Opaque white.
pub static WHITE: Uniform = Uniform::new(Color::WHITE);
/// Fully transparent.
pub static TRANSPARENT: Uniform = Uniform::new(Color::TRANSPARENT);
/// Fully opaque.
pub static OPAQUE: Uniform = Uniform::new(Color::OPAQUE);

impl Uniform {
    pub const fn new(color: Color) -> Self {
        Self { color }
    }

    /// The stored color's premultiplied quadruple.
    pub fn rgba(&self) -> (u32, u32, u32, u32) {
        self.color.rgba()
    }

    /// Ignores `c` and returns the stored color.
    pub fn convert(&self, _c: Color) -> Color {
        self.color
    }

    /// Whether the stored color has full alpha.
    pub fn opaque(&self) -> bool {
        self.color.alpha() == 0xffff
    }
}

impl Image for Uniform {
    fn color_model(&self) -> ColorModel {
        ColorModel::Constant(self.color)
    }

    fn bounds(&self) -> Rectangle {
        Rectangle::from_corners(Point::new(-EXTENT, -EXTENT), Point::new(EXTENT, EXTENT))
    }

    fn at(&self, _x: i32, _y: i32) -> Color {
        self.color
    }
}

impl From<Uniform> for Color {
    fn from(u: Uniform) -> Self {
        u.color
    }
}
