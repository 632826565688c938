//! Single-plane pixel buffers.
//!
//! Each type stores its pixels row by row in a shared [`Pix`]. The pixel at
//! `(x, y)` starts at byte
//! `(y - rect.min.y) * stride + (x - rect.min.x) * BYTES_PER_PIXEL`.
//! Multi-byte channels are big-endian; channel order is R, G, B, A.

use crate::color::{self, Color, ColorModel};
use crate::geom::{Point, Rectangle};
use crate::image::{Image, ImageMut};
use crate::pix::{BufferError, Pix, alloc_len, check_layout};

/// Generates the storage header shared by every single-plane buffer: the
/// struct itself, constructors, offsets and zero-copy sub-images.
macro_rules! single_plane {
    ($(#[$meta:meta])* $name:ident, $bpp:expr) => {
        $(#[$meta])*
        #[derive(Clone, Debug)]
        pub struct $name {
            pix: Pix,
            stride: usize,
            rect: Rectangle,
        }

        impl $name {
            /// Bytes used by one pixel.
            pub const BYTES_PER_PIXEL: usize = $bpp;

            /// Allocates a zeroed buffer covering `r`.
            ///
            /// A rectangle that is not well-formed gets no storage.
            pub fn new(r: Rectangle) -> Self {
                let (stride, len) = alloc_len(r, $bpp);
                Self {
                    pix: Pix::zeroed(len),
                    stride,
                    rect: r,
                }
            }

            /// Wraps existing bytes laid out with the given row `stride`.
            ///
            /// Accepts a fresh `Vec<u8>` or a [`Pix`] view shared with other
            /// buffers.
            ///
            /// # Errors
            ///
            /// Returns an error if `r` is not well-formed, if `stride` is
            /// shorter than a row, or if `pix` cannot hold every row.
            pub fn from_raw(
                pix: impl Into<Pix>,
                stride: usize,
                r: Rectangle,
            ) -> Result<Self, BufferError> {
                let pix = pix.into();
                check_layout(pix.len(), stride, r, $bpp)?;
                Ok(Self {
                    pix,
                    stride,
                    rect: r,
                })
            }

            /// The backing bytes, starting at the pixel `rect.min`.
            #[inline]
            pub fn pix(&self) -> &Pix {
                &self.pix
            }

            /// Byte distance between vertically adjacent pixels.
            #[inline]
            pub fn stride(&self) -> usize {
                self.stride
            }

            /// Index into [`pix`](Self::pix) of the first byte of `(x, y)`.
            ///
            /// Meaningless for points outside the bounds.
            #[inline]
            pub fn pix_offset(&self, x: i32, y: i32) -> usize {
                let dy = (y - self.rect.min.y) as isize;
                let dx = (x - self.rect.min.x) as isize;
                (dy * self.stride as isize + dx * $bpp as isize) as usize
            }

            /// Offset of `(x, y)`, or `None` outside the bounds.
            #[inline]
            fn offset_of(&self, x: i32, y: i32) -> Option<usize> {
                Point::new(x, y)
                    .in_rect(self.rect)
                    .then(|| self.pix_offset(x, y))
            }

            /// The portion of the image visible through `r`.
            ///
            /// The result shares pixels with `self`. Its bounds are
            /// `r.intersect(self.bounds())`; if that is empty the result has
            /// no storage and [`Rectangle::ZERO`] bounds.
            pub fn sub_image(&self, r: Rectangle) -> Self {
                let r = r.intersect(self.rect);
                if r.is_empty() || self.rect.is_empty() {
                    return Self {
                        pix: Pix::empty(),
                        stride: 0,
                        rect: Rectangle::ZERO,
                    };
                }
                let i = self.pix_offset(r.min.x, r.min.y);
                Self {
                    pix: self.pix.tail(i),
                    stride: self.stride,
                    rect: r,
                }
            }
        }
    };
}

/// Reports whether the `width`-byte channel at `channel` within every pixel is
/// all `0xff`. Empty bounds are vacuously opaque.
fn channel_saturated(
    pix: &Pix,
    stride: usize,
    r: Rectangle,
    bpp: usize,
    channel: usize,
    width: usize,
) -> bool {
    if r.is_empty() {
        return true;
    }
    let (w, h) = (r.dx() as usize, r.dy() as usize);
    for row in 0..h {
        let base = row * stride;
        for col in 0..w {
            let i = base + col * bpp + channel;
            if (0..width).any(|k| pix.get(i + k) != 0xff) {
                return false;
            }
        }
    }
    true
}

// ---------------------------------------------------------------------------
// Alpha
// ---------------------------------------------------------------------------

single_plane!(
    /// 8-bit alpha image. `at` returns [`color::Alpha`] values.
    Alpha,
    1
);

impl Alpha {
    pub fn alpha_at(&self, x: i32, y: i32) -> color::Alpha {
        match self.offset_of(x, y) {
            Some(i) => color::Alpha { a: self.pix.get(i) },
            None => color::Alpha::default(),
        }
    }

    pub fn set_alpha(&self, x: i32, y: i32, c: color::Alpha) {
        if let Some(i) = self.offset_of(x, y) {
            self.pix.set(i, c.a);
        }
    }

    /// Whether every pixel has full alpha. O(width·height).
    pub fn opaque(&self) -> bool {
        channel_saturated(&self.pix, self.stride, self.rect, 1, 0, 1)
    }
}

impl Image for Alpha {
    fn color_model(&self) -> ColorModel {
        ColorModel::Alpha
    }

    fn bounds(&self) -> Rectangle {
        self.rect
    }

    fn at(&self, x: i32, y: i32) -> Color {
        self.alpha_at(x, y).into()
    }
}

impl ImageMut for Alpha {
    fn set(&self, x: i32, y: i32, c: Color) {
        if self.offset_of(x, y).is_some() {
            self.set_alpha(x, y, color::to_alpha(c));
        }
    }
}

// ---------------------------------------------------------------------------
// Alpha16
// ---------------------------------------------------------------------------

single_plane!(
    /// 16-bit alpha image, big-endian. `at` returns [`color::Alpha16`] values.
    Alpha16,
    2
);

impl Alpha16 {
    pub fn alpha16_at(&self, x: i32, y: i32) -> color::Alpha16 {
        match self.offset_of(x, y) {
            Some(i) => color::Alpha16 {
                a: self.pix.get_u16(i),
            },
            None => color::Alpha16::default(),
        }
    }

    pub fn set_alpha16(&self, x: i32, y: i32, c: color::Alpha16) {
        if let Some(i) = self.offset_of(x, y) {
            self.pix.set_u16(i, c.a);
        }
    }

    /// Whether every pixel has full alpha. O(width·height).
    pub fn opaque(&self) -> bool {
        channel_saturated(&self.pix, self.stride, self.rect, 2, 0, 2)
    }
}

impl Image for Alpha16 {
    fn color_model(&self) -> ColorModel {
        ColorModel::Alpha16
    }

    fn bounds(&self) -> Rectangle {
        self.rect
    }

    fn at(&self, x: i32, y: i32) -> Color {
        self.alpha16_at(x, y).into()
    }
}

impl ImageMut for Alpha16 {
    fn set(&self, x: i32, y: i32, c: Color) {
        if self.offset_of(x, y).is_some() {
            self.set_alpha16(x, y, color::to_alpha16(c));
        }
    }
}

// ---------------------------------------------------------------------------
// Gray
// ---------------------------------------------------------------------------

single_plane!(
    /// 8-bit grayscale image. `at` returns [`color::Gray`] values.
    Gray,
    1
);

impl Gray {
    pub fn gray_at(&self, x: i32, y: i32) -> color::Gray {
        match self.offset_of(x, y) {
            Some(i) => color::Gray { y: self.pix.get(i) },
            None => color::Gray::default(),
        }
    }

    pub fn set_gray(&self, x: i32, y: i32, c: color::Gray) {
        if let Some(i) = self.offset_of(x, y) {
            self.pix.set(i, c.y);
        }
    }

    /// Always true: gray has no alpha channel.
    pub fn opaque(&self) -> bool {
        true
    }
}

impl Image for Gray {
    fn color_model(&self) -> ColorModel {
        ColorModel::Gray
    }

    fn bounds(&self) -> Rectangle {
        self.rect
    }

    fn at(&self, x: i32, y: i32) -> Color {
        self.gray_at(x, y).into()
    }
}

impl ImageMut for Gray {
    fn set(&self, x: i32, y: i32, c: Color) {
        if self.offset_of(x, y).is_some() {
            self.set_gray(x, y, color::to_gray(c));
        }
    }
}

// ---------------------------------------------------------------------------
// Gray16
// ---------------------------------------------------------------------------

single_plane!(
    /// 16-bit grayscale image, big-endian. `at` returns [`color::Gray16`]
    /// values.
    Gray16,
    2
);

impl Gray16 {
    pub fn gray16_at(&self, x: i32, y: i32) -> color::Gray16 {
        match self.offset_of(x, y) {
            Some(i) => color::Gray16 {
                y: self.pix.get_u16(i),
            },
            None => color::Gray16::default(),
        }
    }

    pub fn set_gray16(&self, x: i32, y: i32, c: color::Gray16) {
        if let Some(i) = self.offset_of(x, y) {
            self.pix.set_u16(i, c.y);
        }
    }

    /// Always true: gray has no alpha channel.
    pub fn opaque(&self) -> bool {
        true
    }
}

impl Image for Gray16 {
    fn color_model(&self) -> ColorModel {
        ColorModel::Gray16
    }

    fn bounds(&self) -> Rectangle {
        self.rect
    }

    fn at(&self, x: i32, y: i32) -> Color {
        self.gray16_at(x, y).into()
    }
}

impl ImageMut for Gray16 {
    fn set(&self, x: i32, y: i32, c: Color) {
        if self.offset_of(x, y).is_some() {
            self.set_gray16(x, y, color::to_gray16(c));
        }
    }
}

// ---------------------------------------------------------------------------
// Nrgba
// ---------------------------------------------------------------------------

single_plane!(
    /// 8-bit straight-alpha RGBA image. `at` returns [`color::Nrgba`] values.
    Nrgba,
    4
);

impl Nrgba {
    pub fn nrgba_at(&self, x: i32, y: i32) -> color::Nrgba {
        match self.offset_of(x, y) {
            Some(i) => color::Nrgba::new(
                self.pix.get(i),
                self.pix.get(i + 1),
                self.pix.get(i + 2),
                self.pix.get(i + 3),
            ),
            None => color::Nrgba::default(),
        }
    }

    pub fn set_nrgba(&self, x: i32, y: i32, c: color::Nrgba) {
        if let Some(i) = self.offset_of(x, y) {
            self.pix.copy_from_slice(i, &[c.r, c.g, c.b, c.a]);
        }
    }

    /// Whether every pixel has full alpha. O(width·height).
    pub fn opaque(&self) -> bool {
        channel_saturated(&self.pix, self.stride, self.rect, 4, 3, 1)
    }
}

impl Image for Nrgba {
    fn color_model(&self) -> ColorModel {
        ColorModel::Nrgba
    }

    fn bounds(&self) -> Rectangle {
        self.rect
    }

    fn at(&self, x: i32, y: i32) -> Color {
        self.nrgba_at(x, y).into()
    }
}

impl ImageMut for Nrgba {
    fn set(&self, x: i32, y: i32, c: Color) {
        if self.offset_of(x, y).is_some() {
            self.set_nrgba(x, y, color::to_nrgba(c));
        }
    }
}

// ---------------------------------------------------------------------------
// Nrgba64
// ---------------------------------------------------------------------------

single_plane!(
    /// 16-bit straight-alpha RGBA image, big-endian. `at` returns
    /// [`color::Nrgba64`] values.
    Nrgba64,
    8
);

impl Nrgba64 {
    pub fn nrgba64_at(&self, x: i32, y: i32) -> color::Nrgba64 {
        match self.offset_of(x, y) {
            Some(i) => color::Nrgba64::new(
                self.pix.get_u16(i),
                self.pix.get_u16(i + 2),
                self.pix.get_u16(i + 4),
                self.pix.get_u16(i + 6),
            ),
            None => color::Nrgba64::default(),
        }
    }

    pub fn set_nrgba64(&self, x: i32, y: i32, c: color::Nrgba64) {
        if let Some(i) = self.offset_of(x, y) {
            self.pix.set_u16(i, c.r);
            self.pix.set_u16(i + 2, c.g);
            self.pix.set_u16(i + 4, c.b);
            self.pix.set_u16(i + 6, c.a);
        }
    }

    /// Whether every pixel has full alpha. O(width·height).
    pub fn opaque(&self) -> bool {
        channel_saturated(&self.pix, self.stride, self.rect, 8, 6, 2)
    }
}

impl Image for Nrgba64 {
    fn color_model(&self) -> ColorModel {
        ColorModel::Nrgba64
    }

    fn bounds(&self) -> Rectangle {
        self.rect
    }

    fn at(&self, x: i32, y: i32) -> Color {
        self.nrgba64_at(x, y).into()
    }
}

impl ImageMut for Nrgba64 {
    fn set(&self, x: i32, y: i32, c: Color) {
        if self.offset_of(x, y).is_some() {
            self.set_nrgba64(x, y, color::to_nrgba64(c));
        }
    }
}

// ---------------------------------------------------------------------------
// Rgba
// ---------------------------------------------------------------------------

single_plane!(
    /// 8-bit premultiplied RGBA image. `at` returns [`color::Rgba`] values.
    Rgba,
    4
);

impl Rgba {
    pub fn rgba_at(&self, x: i32, y: i32) -> color::Rgba {
        match self.offset_of(x, y) {
            Some(i) => color::Rgba::new(
                self.pix.get(i),
                self.pix.get(i + 1),
                self.pix.get(i + 2),
                self.pix.get(i + 3),
            ),
            None => color::Rgba::default(),
        }
    }

    pub fn set_rgba(&self, x: i32, y: i32, c: color::Rgba) {
        if let Some(i) = self.offset_of(x, y) {
            self.pix.copy_from_slice(i, &[c.r, c.g, c.b, c.a]);
        }
    }

    /// Whether every pixel has full alpha. O(width·height).
    pub fn opaque(&self) -> bool {
        channel_saturated(&self.pix, self.stride, self.rect, 4, 3, 1)
    }
}

impl Image for Rgba {
    fn color_model(&self) -> ColorModel {
        ColorModel::Rgba
    }

    fn bounds(&self) -> Rectangle {
        self.rect
    }

    fn at(&self, x: i32, y: i32) -> Color {
        self.rgba_at(x, y).into()
    }
}

impl ImageMut for Rgba {
    fn set(&self, x: i32, y: i32, c: Color) {
        if self.offset_of(x, y).is_some() {
            self.set_rgba(x, y, color::to_rgba(c));
        }
    }
}

// ---------------------------------------------------------------------------
// Rgba64
// ---------------------------------------------------------------------------

single_plane!(
    /// 16-bit premultiplied RGBA image, big-endian. `at` returns
    /// [`color::Rgba64`] values.
    Rgba64,
    8
);

impl Rgba64 {
    pub fn rgba64_at(&self, x: i32, y: i32) -> color::Rgba64 {
        match self.offset_of(x, y) {
            Some(i) => color::Rgba64::new(
                self.pix.get_u16(i),
                self.pix.get_u16(i + 2),
                self.pix.get_u16(i + 4),
                self.pix.get_u16(i + 6),
            ),
            None => color::Rgba64::default(),
        }
    }

    pub fn set_rgba64(&self, x: i32, y: i32, c: color::Rgba64) {
        if let Some(i) = self.offset_of(x, y) {
            self.pix.set_u16(i, c.r);
            self.pix.set_u16(i + 2, c.g);
            self.pix.set_u16(i + 4, c.b);
            self.pix.set_u16(i + 6, c.a);
        }
    }

    /// Whether every pixel has full alpha. O(width·height).
    pub fn opaque(&self) -> bool {
        channel_saturated(&self.pix, self.stride, self.rect, 8, 6, 2)
    }
}

impl Image for Rgba64 {
    fn color_model(&self) -> ColorModel {
        ColorModel::Rgba64
    }

    fn bounds(&self) -> Rectangle {
        self.rect
    }

    fn at(&self, x: i32, y: i32) -> Color {
        self.rgba64_at(x, y).into()
    }
}

impl ImageMut for Rgba64 {
    fn set(&self, x: i32, y: i32, c: Color) {
        if self.offset_of(x, y).is_some() {
            self.set_rgba64(x, y, color::to_rgba64(c));
        }
    }
}
