//! Palette-indexed image.

use crate::color::{Color, ColorModel, Palette};
use crate::geom::{Point, Rectangle};
use crate::image::{Image, ImageMut, PalettedImage};
use crate::pix::{BufferError, Pix, alloc_len, check_layout};

/// Palette entries reachable through an 8-bit index.
const ADDRESSABLE: usize = 256;

/// 8-bit palette indices into a [`Palette`].
///
/// Indices are not checked against the palette length. Reading a pixel whose
/// index has no palette entry yields [`Color::TRANSPARENT`].
///
/// Only the first 256 palette entries are addressable; [`ImageMut::set`]
/// picks the nearest among those.
#[derive(Clone, Debug)]
pub struct Paletted {
    pix: Pix,
    stride: usize,
    rect: Rectangle,
    palette: Palette,
}

impl Paletted {
    /// Allocates a buffer covering `r` with every index 0.
    ///
    /// Entries of `palette` past index 255 are kept but never selected.
    pub fn new(r: Rectangle, palette: Palette) -> Self {
        let (stride, len) = alloc_len(r, 1);
        Self {
            pix: Pix::zeroed(len),
            stride,
            rect: r,
            palette,
        }
    }

    /// Wraps existing index bytes.
    ///
    /// # Errors
    ///
    /// Same conditions as the single-plane buffers' `from_raw`.
    pub fn from_raw(
        pix: impl Into<Pix>,
        stride: usize,
        r: Rectangle,
        palette: Palette,
    ) -> Result<Self, BufferError> {
        let pix = pix.into();
        check_layout(pix.len(), stride, r, 1)?;
        Ok(Self {
            pix,
            stride,
            rect: r,
            palette,
        })
    }

    #[inline]
    pub fn pix(&self) -> &Pix {
        &self.pix
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Replaces the palette. Stored indices are left untouched, and existing
    /// sub-images keep the palette they were created with.
    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    /// Index into [`pix`](Self::pix) of `(x, y)`. Meaningless outside the
    /// bounds.
    #[inline]
    pub fn pix_offset(&self, x: i32, y: i32) -> usize {
        let dy = (y - self.rect.min.y) as isize;
        let dx = (x - self.rect.min.x) as isize;
        (dy * self.stride as isize + dx) as usize
    }

    #[inline]
    fn offset_of(&self, x: i32, y: i32) -> Option<usize> {
        Point::new(x, y)
            .in_rect(self.rect)
            .then(|| self.pix_offset(x, y))
    }

    /// Writes a raw palette index. No-op outside the bounds.
    pub fn set_color_index(&self, x: i32, y: i32, index: u8) {
        if let Some(i) = self.offset_of(x, y) {
            self.pix.set(i, index);
        }
    }

    /// Sub-image sharing pixels with `self`. The palette entries are shared
    /// too, as they stand when this is called.
    pub fn sub_image(&self, r: Rectangle) -> Self {
        let r = r.intersect(self.rect);
        if r.is_empty() || self.rect.is_empty() {
            return Self {
                pix: Pix::empty(),
                stride: 0,
                rect: Rectangle::ZERO,
                palette: self.palette.clone(),
            };
        }
        let i = self.pix_offset(r.min.x, r.min.y);
        Self {
            pix: self.pix.tail(i),
            stride: self.stride,
            rect: r,
            palette: self.palette.clone(),
        }
    }

    /// Whether every palette entry actually referenced by a pixel is fully
    /// opaque. O(width·height).
    pub fn opaque(&self) -> bool {
        if self.rect.is_empty() {
            return true;
        }
        let mut present = [false; 256];
        let (w, h) = (self.rect.dx() as usize, self.rect.dy() as usize);
        for row in 0..h {
            let base = row * self.stride;
            for col in 0..w {
                present[self.pix.get(base + col) as usize] = true;
            }
        }
        // Indices with no entry read as transparent.
        if present.iter().skip(self.palette.len()).any(|&used| used) {
            return false;
        }
        present
            .iter()
            .zip(self.palette.colors())
            .filter(|(used, _)| **used)
            .all(|(_, c)| c.alpha() == 0xffff)
    }
}

impl Image for Paletted {
    fn color_model(&self) -> ColorModel {
        ColorModel::Palette(self.palette.clone())
    }

    fn bounds(&self) -> Rectangle {
        self.rect
    }

    /// Outside the bounds this is palette entry 0, or transparent for an
    /// empty palette.
    fn at(&self, x: i32, y: i32) -> Color {
        let index = self.color_index_at(x, y);
        self.palette
            .get(index as usize)
            .unwrap_or(Color::TRANSPARENT)
    }
}

impl PalettedImage for Paletted {
    fn color_index_at(&self, x: i32, y: i32) -> u8 {
        match self.offset_of(x, y) {
            Some(i) => self.pix.get(i),
            None => 0,
        }
    }
}

impl ImageMut for Paletted {
    /// Stores the index of the nearest palette entry.
    fn set(&self, x: i32, y: i32, c: Color) {
        if let Some(i) = self.offset_of(x, y) {
            self.pix.set(i, self.palette.index_within(c, ADDRESSABLE) as u8);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Alpha16, Gray16, Rgba};
    use crate::geom::rect;
    use alloc::vec;
    use alloc::vec::Vec;

    fn palette() -> Palette {
        Palette::new(vec![
            Color::BLACK,
            Color::WHITE,
            Color::from(Rgba::new(255, 0, 0, 255)),
            Color::from(Alpha16 { a: 0x8000 }),
        ])
    }

    #[test]
    fn at_reads_palette_entry() {
        let img = Paletted::new(rect(0, 0, 3, 3), palette());
        img.set_color_index(1, 2, 2);
        assert_eq!(img.color_index_at(1, 2), 2);
        assert_eq!(img.at(1, 2), Color::from(Rgba::new(255, 0, 0, 255)));
        assert_eq!(img.at(0, 0), Color::BLACK);
    }

    #[test]
    fn set_picks_nearest() {
        let img = Paletted::new(rect(0, 0, 2, 2), palette());
        img.set(0, 1, Color::from(Rgba::new(250, 250, 240, 255)));
        assert_eq!(img.color_index_at(0, 1), 1);
        assert_eq!(img.at(0, 1), img.color_model().convert(Color::WHITE));
    }

    #[test]
    fn out_of_range_index_is_transparent() {
        let img = Paletted::new(rect(0, 0, 1, 1), palette());
        img.set_color_index(0, 0, 200);
        assert_eq!(img.at(0, 0), Color::TRANSPARENT);
    }

    #[test]
    fn index_past_palette_is_not_opaque() {
        let img = Paletted::new(rect(0, 0, 1, 1), Palette::new(vec![Color::WHITE]));
        assert!(img.opaque());
        img.set_color_index(0, 0, 5);
        assert_eq!(img.at(0, 0).alpha(), 0);
        assert!(!img.opaque());
    }

    #[test]
    fn set_ignores_entries_past_255() {
        let colors: Vec<Color> = (0..300u16)
            .map(|i| Color::from(Gray16 { y: i * 200 }))
            .collect();
        let img = Paletted::new(rect(0, 0, 1, 1), Palette::new(colors));
        img.set(0, 0, Color::from(Gray16 { y: 299 * 200 }));
        assert_eq!(img.color_index_at(0, 0), 255);
    }

    #[test]
    fn sub_image_keeps_palette_at_creation() {
        let mut img = Paletted::new(rect(0, 0, 2, 2), palette());
        let sub = img.sub_image(rect(0, 0, 1, 1));
        assert!(sub.palette().shares_storage(img.palette()));
        img.set_palette(Palette::new(vec![Color::WHITE]));
        assert_eq!(sub.palette(), &palette());
        assert_eq!(img.at(0, 0), Color::WHITE);
        assert_eq!(sub.at(0, 0), Color::BLACK);
    }

    #[test]
    fn outside_bounds_is_entry_zero() {
        let img = Paletted::new(rect(0, 0, 1, 1), palette());
        assert_eq!(img.color_index_at(7, 7), 0);
        assert_eq!(img.at(7, 7), Color::BLACK);
        let bare = Paletted::new(rect(0, 0, 1, 1), Palette::default());
        assert_eq!(bare.at(7, 7), Color::TRANSPARENT);
    }

    #[test]
    fn opaque_only_counts_used_entries() {
        let img = Paletted::new(rect(0, 0, 2, 2), palette());
        assert!(img.opaque());
        img.set_color_index(1, 1, 3);
        assert!(!img.opaque());
        assert!(img.sub_image(rect(0, 0, 1, 2)).opaque());
    }

    #[test]
    fn sub_image_shares_indices() {
        let img = Paletted::new(rect(0, 0, 4, 4), palette());
        let sub = img.sub_image(rect(2, 2, 4, 4));
        sub.set_color_index(3, 3, 1);
        assert_eq!(img.color_index_at(3, 3), 1);
        assert_eq!(sub.palette(), img.palette());
    }

    #[test]
    fn model_is_palette() {
        let img = Paletted::new(rect(0, 0, 1, 1), palette());
        assert_eq!(img.color_model(), ColorModel::Palette(palette()));
    }
}
