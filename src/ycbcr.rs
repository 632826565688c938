//! Planar Y'CbCr image with chroma subsampling.

use core::fmt;

use crate::color::{self, Color, ColorModel};
use crate::geom::{Point, Rectangle};
use crate::image::Image;
use crate::pix::Pix;

/// Chroma subsample ratio of a [`YCbCr`] image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum YCbCrSubsampleRatio {
    /// Full-resolution chroma.
    #[default]
    Ratio444,
    /// Chroma halved horizontally.
    Ratio422,
    /// Chroma halved in both directions.
    Ratio420,
    /// Chroma halved vertically.
    Ratio440,
}

impl YCbCrSubsampleRatio {
    /// Whether chroma columns are shared by pairs of pixels.
    #[inline]
    const fn halves_x(self) -> bool {
        matches!(self, Self::Ratio422 | Self::Ratio420)
    }

    /// Whether chroma rows are shared by pairs of pixels.
    #[inline]
    const fn halves_y(self) -> bool {
        matches!(self, Self::Ratio420 | Self::Ratio440)
    }

    /// Chroma plane size for luma bounds `r`.
    ///
    /// Halved axes cover every chroma cell touched by `r`, so an odd origin
    /// or extent rounds outward.
    pub fn chroma_size(self, r: Rectangle) -> (usize, usize) {
        let w = r.dx().max(0);
        let h = r.dy().max(0);
        let cw = if self.halves_x() && w > 0 {
            (r.max.x + 1).div_euclid(2) - r.min.x.div_euclid(2)
        } else {
            w
        };
        let ch = if self.halves_y() && h > 0 {
            (r.max.y + 1).div_euclid(2) - r.min.y.div_euclid(2)
        } else {
            h
        };
        (cw as usize, ch as usize)
    }
}

impl fmt::Display for YCbCrSubsampleRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ratio444 => "YCbCrSubsampleRatio444",
            Self::Ratio422 => "YCbCrSubsampleRatio422",
            Self::Ratio420 => "YCbCrSubsampleRatio420",
            Self::Ratio440 => "YCbCrSubsampleRatio440",
        })
    }
}

/// An in-memory Y'CbCr image.
///
/// There is one Y sample per pixel; each Cb and Cr sample may span several
/// pixels depending on the [`YCbCrSubsampleRatio`]. Typically:
///
/// | ratio | `c_stride` | chroma plane length |
/// |---|---|---|
/// | 4:4:4 | `y_stride` | `len(y)` |
/// | 4:2:2 | `y_stride / 2` | `len(y) / 2` |
/// | 4:2:0 | `y_stride / 2` | `len(y) / 4` |
/// | 4:4:0 | `y_stride` | `len(y) / 2` |
///
/// Chroma cells are aligned to even absolute coordinates, so the cell for
/// `x` is `x.div_euclid(2)` on a halved axis.
#[derive(Clone, Debug)]
pub struct YCbCr {
    y: Pix,
    cb: Pix,
    cr: Pix,
    y_stride: usize,
    c_stride: usize,
    ratio: YCbCrSubsampleRatio,
    rect: Rectangle,
}

impl YCbCr {
    /// Allocates zeroed planes for luma bounds `r`.
    ///
    /// All three planes live in one allocation.
    pub fn new(r: Rectangle, ratio: YCbCrSubsampleRatio) -> Self {
        let w = r.dx().max(0) as usize;
        let h = r.dy().max(0) as usize;
        let (cw, ch) = ratio.chroma_size(r);
        let (ylen, clen) = (w * h, cw * ch);
        let all = Pix::zeroed(ylen + 2 * clen);
        Self {
            y: all.range(0, ylen),
            cb: all.range(ylen, clen),
            cr: all.range(ylen + clen, clen),
            y_stride: w,
            c_stride: cw,
            ratio,
            rect: r,
        }
    }

    /// Builds an image over caller-supplied planes.
    ///
    /// The planes' strides and lengths are not checked against the ratio;
    /// reading a pixel the planes do not cover panics.
    pub fn from_planes(
        y: impl Into<Pix>,
        cb: impl Into<Pix>,
        cr: impl Into<Pix>,
        y_stride: usize,
        c_stride: usize,
        ratio: YCbCrSubsampleRatio,
        r: Rectangle,
    ) -> Self {
        Self {
            y: y.into(),
            cb: cb.into(),
            cr: cr.into(),
            y_stride,
            c_stride,
            ratio,
            rect: r,
        }
    }

    pub fn y_plane(&self) -> &Pix {
        &self.y
    }

    pub fn cb_plane(&self) -> &Pix {
        &self.cb
    }

    pub fn cr_plane(&self) -> &Pix {
        &self.cr
    }

    pub fn y_stride(&self) -> usize {
        self.y_stride
    }

    pub fn c_stride(&self) -> usize {
        self.c_stride
    }

    pub fn subsample_ratio(&self) -> YCbCrSubsampleRatio {
        self.ratio
    }

    /// Index into the Y plane of the sample for `(x, y)`.
    #[inline]
    pub fn y_offset(&self, x: i32, y: i32) -> usize {
        let dy = (y - self.rect.min.y) as isize;
        let dx = (x - self.rect.min.x) as isize;
        (dy * self.y_stride as isize + dx) as usize
    }

    /// Index into the Cb and Cr planes of the sample for `(x, y)`.
    #[inline]
    pub fn c_offset(&self, x: i32, y: i32) -> usize {
        let min = self.rect.min;
        let dx = if self.ratio.halves_x() {
            x.div_euclid(2) - min.x.div_euclid(2)
        } else {
            x - min.x
        };
        let dy = if self.ratio.halves_y() {
            y.div_euclid(2) - min.y.div_euclid(2)
        } else {
            y - min.y
        };
        (dy as isize * self.c_stride as isize + dx as isize) as usize
    }

    pub fn ycbcr_at(&self, x: i32, y: i32) -> color::YCbCr {
        if !Point::new(x, y).in_rect(self.rect) {
            return color::YCbCr::default();
        }
        let yi = self.y_offset(x, y);
        let ci = self.c_offset(x, y);
        color::YCbCr {
            y: self.y.get(yi),
            cb: self.cb.get(ci),
            cr: self.cr.get(ci),
        }
    }

    /// Sub-image sharing all three planes with `self`.
    ///
    /// The chroma origin is recomputed from the ratio, so a sub-image
    /// starting on an odd coordinate still finds the chroma cell it shares
    /// with its left or upper neighbour.
    pub fn sub_image(&self, r: Rectangle) -> Self {
        let r = r.intersect(self.rect);
        if r.is_empty() || self.rect.is_empty() {
            return Self {
                y: Pix::empty(),
                cb: Pix::empty(),
                cr: Pix::empty(),
                y_stride: 0,
                c_stride: 0,
                ratio: self.ratio,
                rect: Rectangle::ZERO,
            };
        }
        let yi = self.y_offset(r.min.x, r.min.y);
        let ci = self.c_offset(r.min.x, r.min.y);
        Self {
            y: self.y.tail(yi),
            cb: self.cb.tail(ci),
            cr: self.cr.tail(ci),
            y_stride: self.y_stride,
            c_stride: self.c_stride,
            ratio: self.ratio,
            rect: r,
        }
    }

    /// Always true: Y'CbCr has no alpha channel.
    pub fn opaque(&self) -> bool {
        true
    }
}

impl Image for YCbCr {
    fn color_model(&self) -> ColorModel {
        ColorModel::YCbCr
    }

    fn bounds(&self) -> Rectangle {
        self.rect
    }

    fn at(&self, x: i32, y: i32) -> Color {
        self.ycbcr_at(x, y).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::rect;
    use alloc::format;

    /// Writes a distinct value into every luma and chroma cell so reads can
    /// be traced back to a position.
    fn fill_pattern(img: &YCbCr) {
        let r = img.bounds();
        for y in r.min.y..r.max.y {
            for x in r.min.x..r.max.x {
                let yi = img.y_offset(x, y);
                img.y_plane().set(yi, (x * 16 + y) as u8);
                let ci = img.c_offset(x, y);
                img.cb_plane().set(ci, (x.div_euclid(2) * 16 + y) as u8);
                img.cr_plane().set(ci, (100 + ci) as u8);
            }
        }
    }

    #[test]
    fn c_offset_420_shares_cells() {
        let img = YCbCr::new(rect(0, 0, 4, 4), YCbCrSubsampleRatio::Ratio420);
        assert_eq!(img.c_offset(2, 2), img.c_offset(3, 3));
        assert_ne!(img.c_offset(0, 0), img.c_offset(2, 0));
        assert_eq!(img.c_stride(), 2);
        assert_eq!(img.cb_plane().len(), 4);
        assert_eq!(img.y_plane().len(), 16);
    }

    #[test]
    fn plane_sizes_per_ratio() {
        let r = rect(0, 0, 6, 4);
        let cases = [
            (YCbCrSubsampleRatio::Ratio444, 6, 24),
            (YCbCrSubsampleRatio::Ratio422, 3, 12),
            (YCbCrSubsampleRatio::Ratio420, 3, 6),
            (YCbCrSubsampleRatio::Ratio440, 6, 12),
        ];
        for (ratio, c_stride, clen) in cases {
            let img = YCbCr::new(r, ratio);
            assert_eq!(img.c_stride(), c_stride, "{ratio}");
            assert_eq!(img.cb_plane().len(), clen, "{ratio}");
            assert_eq!(img.cr_plane().len(), clen, "{ratio}");
        }
    }

    #[test]
    fn odd_bounds_round_outward() {
        let img = YCbCr::new(rect(1, 1, 4, 4), YCbCrSubsampleRatio::Ratio420);
        // Columns 1..4 touch chroma cells 0 and 1; same for rows.
        assert_eq!(img.c_stride(), 2);
        assert_eq!(img.cb_plane().len(), 4);
        assert_eq!(img.c_offset(1, 1), 0);
        assert_eq!(img.c_offset(2, 1), 1);
        assert_eq!(img.c_offset(3, 3), 3);
    }

    #[test]
    fn sub_image_recomputes_chroma_origin() {
        for ratio in [
            YCbCrSubsampleRatio::Ratio444,
            YCbCrSubsampleRatio::Ratio422,
            YCbCrSubsampleRatio::Ratio420,
            YCbCrSubsampleRatio::Ratio440,
        ] {
            let img = YCbCr::new(rect(0, 0, 8, 8), ratio);
            fill_pattern(&img);
            for sub_rect in [rect(1, 1, 6, 7), rect(2, 3, 8, 8), rect(3, 0, 4, 1)] {
                let sub = img.sub_image(sub_rect);
                assert_eq!(sub.bounds(), sub_rect);
                for y in sub_rect.min.y..sub_rect.max.y {
                    for x in sub_rect.min.x..sub_rect.max.x {
                        assert_eq!(
                            sub.ycbcr_at(x, y),
                            img.ycbcr_at(x, y),
                            "{ratio} {sub_rect} at ({x},{y})"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn sub_image_writes_reach_parent() {
        let img = YCbCr::new(rect(0, 0, 4, 4), YCbCrSubsampleRatio::Ratio420);
        let sub = img.sub_image(rect(1, 1, 4, 4));
        let ci = sub.c_offset(3, 3);
        sub.cr_plane().set(ci, 0x55);
        assert_eq!(img.ycbcr_at(2, 2).cr, 0x55);
        assert_eq!(img.ycbcr_at(3, 2).cr, 0x55);
        assert_eq!(img.ycbcr_at(1, 1).cr, 0);
    }

    #[test]
    fn negative_coordinates_floor_to_cells() {
        let img = YCbCr::new(rect(-3, -3, 1, 1), YCbCrSubsampleRatio::Ratio420);
        assert_eq!(img.c_offset(-3, -3), 0);
        assert_eq!(img.c_offset(-2, -2), img.c_offset(-1, -1));
        assert_ne!(img.c_offset(-1, -1), img.c_offset(0, -1));
        fill_pattern(&img);
        let sub = img.sub_image(rect(-1, -1, 1, 1));
        assert_eq!(sub.ycbcr_at(-1, -1), img.ycbcr_at(-1, -1));
        assert_eq!(sub.ycbcr_at(0, 0), img.ycbcr_at(0, 0));
    }

    #[test]
    fn outside_bounds_is_zero() {
        let img = YCbCr::new(rect(0, 0, 2, 2), YCbCrSubsampleRatio::Ratio444);
        img.y_plane().set(0, 9);
        assert_eq!(img.ycbcr_at(-1, 0), color::YCbCr::default());
        assert_eq!(img.at(2, 2), Color::YCbCr(color::YCbCr::default()));
        assert!(img.opaque());
    }

    #[test]
    fn empty_sub_image_keeps_ratio() {
        let img = YCbCr::new(rect(0, 0, 2, 2), YCbCrSubsampleRatio::Ratio422);
        let sub = img.sub_image(rect(5, 5, 9, 9));
        assert_eq!(sub.bounds(), Rectangle::ZERO);
        assert_eq!(sub.subsample_ratio(), YCbCrSubsampleRatio::Ratio422);
    }

    #[test]
    fn from_planes_reads_caller_layout() {
        let img = YCbCr::from_planes(
            alloc::vec![10, 20, 30, 40],
            alloc::vec![1, 2],
            alloc::vec![3, 4],
            2,
            2,
            YCbCrSubsampleRatio::Ratio440,
            rect(0, 0, 2, 2),
        );
        assert_eq!(img.ycbcr_at(1, 1), color::YCbCr { y: 40, cb: 2, cr: 4 });
    }

    #[test]
    fn ratio_display() {
        assert_eq!(
            format!("{}", YCbCrSubsampleRatio::Ratio420),
            "YCbCrSubsampleRatio420"
        );
    }
}
