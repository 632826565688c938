//! The [`Image`] contract and the closed set of buffer types behind it.

use crate::buffer::{Alpha, Alpha16, Gray, Gray16, Nrgba, Nrgba64, Rgba, Rgba64};
use crate::color::{Color, ColorModel};
use crate::geom::Rectangle;
use crate::paletted::Paletted;
use crate::uniform::Uniform;
use crate::ycbcr::YCbCr;

/// A finite (or, for [`Uniform`], unbounded) rectangular grid of colors.
///
/// `at` must return the color model's zero value for coordinates outside
/// [`bounds`](Image::bounds) and must never panic for them.
pub trait Image {
    /// The model whose native samples `at` returns.
    fn color_model(&self) -> ColorModel;

    /// The domain on which `at` returns non-zero colors. Need not contain the
    /// origin.
    fn bounds(&self) -> Rectangle;

    /// The color of the pixel at `(x, y)`.
    fn at(&self, x: i32, y: i32) -> Color;
}

/// An image whose pixels can be written.
///
/// Buffer views share storage, so writing takes `&self`: a write through any
/// view is visible through every other view of the same pixels.
pub trait ImageMut: Image {
    /// Stores `c`, converted through [`color_model`](Image::color_model).
    /// Writes outside the bounds are discarded.
    fn set(&self, x: i32, y: i32, c: Color);
}

/// An image whose colors come from a limited palette.
///
/// When `color_model()` is [`ColorModel::Palette`], `at(x, y)` equals the
/// palette entry at `color_index_at(x, y)`.
pub trait PalettedImage: Image {
    /// Palette index of the pixel at `(x, y)`; 0 outside the bounds.
    fn color_index_at(&self, x: i32, y: i32) -> u8;
}

/// Color model and dimensions of an image, without its pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub color_model: ColorModel,
    pub width: u32,
    pub height: u32,
}

impl Config {
    pub fn new(color_model: ColorModel, width: u32, height: u32) -> Self {
        Self {
            color_model,
            width,
            height,
        }
    }
}

// ---------------------------------------------------------------------------
// AnyImage
// ---------------------------------------------------------------------------

/// Any of the in-memory image types.
///
/// This is what decoders hand back and what generic code can match on when it
/// wants the concrete layout.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum AnyImage {
    Alpha(Alpha),
    Alpha16(Alpha16),
    Gray(Gray),
    Gray16(Gray16),
    Nrgba(Nrgba),
    Nrgba64(Nrgba64),
    Rgba(Rgba),
    Rgba64(Rgba64),
    Paletted(Paletted),
    YCbCr(YCbCr),
    Uniform(Uniform),
}

macro_rules! dispatch {
    ($self:expr, $img:ident => $body:expr) => {
        match $self {
            AnyImage::Alpha($img) => $body,
            AnyImage::Alpha16($img) => $body,
            AnyImage::Gray($img) => $body,
            AnyImage::Gray16($img) => $body,
            AnyImage::Nrgba($img) => $body,
            AnyImage::Nrgba64($img) => $body,
            AnyImage::Rgba($img) => $body,
            AnyImage::Rgba64($img) => $body,
            AnyImage::Paletted($img) => $body,
            AnyImage::YCbCr($img) => $body,
            AnyImage::Uniform($img) => $body,
        }
    };
}

impl AnyImage {
    /// Whether every pixel is fully opaque. Scans all pixels: O(width·height).
    pub fn opaque(&self) -> bool {
        dispatch!(self, img => img.opaque())
    }

    /// The portion of the image visible through `r`, sharing pixels with
    /// `self`. A [`Uniform`] has no bounds to narrow and is returned as is.
    pub fn sub_image(&self, r: Rectangle) -> AnyImage {
        match self {
            AnyImage::Alpha(img) => img.sub_image(r).into(),
            AnyImage::Alpha16(img) => img.sub_image(r).into(),
            AnyImage::Gray(img) => img.sub_image(r).into(),
            AnyImage::Gray16(img) => img.sub_image(r).into(),
            AnyImage::Nrgba(img) => img.sub_image(r).into(),
            AnyImage::Nrgba64(img) => img.sub_image(r).into(),
            AnyImage::Rgba(img) => img.sub_image(r).into(),
            AnyImage::Rgba64(img) => img.sub_image(r).into(),
            AnyImage::Paletted(img) => img.sub_image(r).into(),
            AnyImage::YCbCr(img) => img.sub_image(r).into(),
            AnyImage::Uniform(img) => AnyImage::Uniform(*img),
        }
    }

    /// Writes `c` at `(x, y)` for the writable types.
    ///
    /// Returns `false` for [`YCbCr`] and [`Uniform`], which have no setter.
    pub fn set(&self, x: i32, y: i32, c: Color) -> bool {
        match self {
            AnyImage::Alpha(img) => img.set(x, y, c),
            AnyImage::Alpha16(img) => img.set(x, y, c),
            AnyImage::Gray(img) => img.set(x, y, c),
            AnyImage::Gray16(img) => img.set(x, y, c),
            AnyImage::Nrgba(img) => img.set(x, y, c),
            AnyImage::Nrgba64(img) => img.set(x, y, c),
            AnyImage::Rgba(img) => img.set(x, y, c),
            AnyImage::Rgba64(img) => img.set(x, y, c),
            AnyImage::Paletted(img) => img.set(x, y, c),
            AnyImage::YCbCr(_) | AnyImage::Uniform(_) => return false,
        }
        true
    }
}

impl Image for AnyImage {
    fn color_model(&self) -> ColorModel {
        dispatch!(self, img => img.color_model())
    }

    fn bounds(&self) -> Rectangle {
        dispatch!(self, img => img.bounds())
    }

    fn at(&self, x: i32, y: i32) -> Color {
        dispatch!(self, img => img.at(x, y))
    }
}

macro_rules! impl_from_image {
    ($($ty:ident),* $(,)?) => {
        $(
            impl From<$ty> for AnyImage {
                #[inline]
                fn from(img: $ty) -> Self {
                    AnyImage::$ty(img)
                }
            }
        )*
    };
}

impl_from_image!(
    Alpha, Alpha16, Gray, Gray16, Nrgba, Nrgba64, Rgba, Rgba64, Paletted, YCbCr, Uniform,
);
