//! Color samples and color models.
//!
//! Every sample type reports its value as an alpha-premultiplied quadruple
//! with 16 significant bits per channel ([`Color::rgba`]). A [`ColorModel`]
//! canonicalizes an arbitrary [`Color`] into one native sample type, which is
//! what pixel buffers do before storing a value.
//!
//! The arithmetic is plain integer rounding. There is no gamma handling and no
//! color management.

use alloc::sync::Arc;
use alloc::vec::Vec;

/// Maximum value of a 16-bit channel.
const MAX16: u32 = 0xffff;

// ---------------------------------------------------------------------------
// Sample types
// ---------------------------------------------------------------------------

/// 8-bit alpha-premultiplied RGBA.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// 16-bit alpha-premultiplied RGBA.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba64 {
    pub r: u16,
    pub g: u16,
    pub b: u16,
    pub a: u16,
}

/// 8-bit straight-alpha RGBA.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Nrgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// 16-bit straight-alpha RGBA.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Nrgba64 {
    pub r: u16,
    pub g: u16,
    pub b: u16,
    pub a: u16,
}

/// 8-bit alpha. Color channels equal the alpha (premultiplied white).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Alpha {
    pub a: u8,
}

/// 16-bit alpha.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Alpha16 {
    pub a: u16,
}

/// 8-bit opaque luma.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Gray {
    pub y: u8,
}

/// 16-bit opaque luma.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Gray16 {
    pub y: u16,
}

/// Opaque Y'CbCr (JFIF full range), 8 bits per component.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct YCbCr {
    pub y: u8,
    pub cb: u8,
    pub cr: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl Nrgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl Rgba64 {
    pub const fn new(r: u16, g: u16, b: u16, a: u16) -> Self {
        Self { r, g, b, a }
    }
}

impl Nrgba64 {
    pub const fn new(r: u16, g: u16, b: u16, a: u16) -> Self {
        Self { r, g, b, a }
    }
}

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// Any color sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Rgba(Rgba),
    Rgba64(Rgba64),
    Nrgba(Nrgba),
    Nrgba64(Nrgba64),
    Alpha(Alpha),
    Alpha16(Alpha16),
    Gray(Gray),
    Gray16(Gray16),
    YCbCr(YCbCr),
}

impl Default for Color {
    fn default() -> Self {
        Color::TRANSPARENT
    }
}

impl Color {
    /// Opaque black.
    pub const BLACK: Color = Color::Gray16(Gray16 { y: 0 });
    /// Opaque white.
    pub const WHITE: Color = Color::Gray16(Gray16 { y: 0xffff });
    /// Fully transparent.
    pub const TRANSPARENT: Color = Color::Alpha16(Alpha16 { a: 0 });
    /// Fully opaque (premultiplied white).
    pub const OPAQUE: Color = Color::Alpha16(Alpha16 { a: 0xffff });

    /// Alpha-premultiplied red, green, blue and alpha, each in `0..=0xffff`.
    pub fn rgba(&self) -> (u32, u32, u32, u32) {
        match *self {
            Color::Rgba(c) => (
                widen(c.r),
                widen(c.g),
                widen(c.b),
                widen(c.a),
            ),
            Color::Rgba64(c) => (c.r as u32, c.g as u32, c.b as u32, c.a as u32),
            Color::Nrgba(c) => {
                let a = widen(c.a);
                (
                    widen(c.r) * a / MAX16,
                    widen(c.g) * a / MAX16,
                    widen(c.b) * a / MAX16,
                    a,
                )
            }
            Color::Nrgba64(c) => {
                let a = c.a as u32;
                (
                    c.r as u32 * a / MAX16,
                    c.g as u32 * a / MAX16,
                    c.b as u32 * a / MAX16,
                    a,
                )
            }
            Color::Alpha(c) => {
                let a = widen(c.a);
                (a, a, a, a)
            }
            Color::Alpha16(c) => {
                let a = c.a as u32;
                (a, a, a, a)
            }
            Color::Gray(c) => {
                let y = widen(c.y);
                (y, y, y, MAX16)
            }
            Color::Gray16(c) => {
                let y = c.y as u32;
                (y, y, y, MAX16)
            }
            Color::YCbCr(c) => ycbcr_to_rgba16(c),
        }
    }

    /// The alpha channel alone, in `0..=0xffff`.
    #[inline]
    pub fn alpha(&self) -> u32 {
        self.rgba().3
    }
}

macro_rules! impl_from_sample {
    ($($ty:ident),* $(,)?) => {
        $(
            impl From<$ty> for Color {
                #[inline]
                fn from(c: $ty) -> Self {
                    Color::$ty(c)
                }
            }
        )*
    };
}

impl_from_sample!(Rgba, Rgba64, Nrgba, Nrgba64, Alpha, Alpha16, Gray, Gray16, YCbCr);

#[inline]
fn widen(v: u8) -> u32 {
    v as u32 * 0x101
}

// ---------------------------------------------------------------------------
// Y'CbCr arithmetic
// ---------------------------------------------------------------------------

/// Clamps a 16.16 fixed-point intermediate into `0..=0xffff` after a shift by
/// 8, saturating on overflow in either direction.
#[inline]
fn clamp_shift8(v: i32) -> u32 {
    if (v as u32) & 0xff00_0000 == 0 {
        (v >> 8) as u32
    } else if v < 0 {
        0
    } else {
        MAX16
    }
}

fn ycbcr_to_rgba16(c: YCbCr) -> (u32, u32, u32, u32) {
    let yy = c.y as i32 * 0x10101;
    let cb = c.cb as i32 - 128;
    let cr = c.cr as i32 - 128;
    let r = clamp_shift8(yy + 91881 * cr);
    let g = clamp_shift8(yy - 22554 * cb - 46802 * cr);
    let b = clamp_shift8(yy + 116130 * cb);
    (r, g, b, MAX16)
}

/// Converts 8-bit RGB to full-range Y'CbCr.
pub fn rgb_to_ycbcr(r: u8, g: u8, b: u8) -> YCbCr {
    let (r, g, b) = (r as i32, g as i32, b as i32);
    let y = (19595 * r + 38470 * g + 7471 * b + (1 << 15)) >> 16;
    let chroma = |v: i32| -> u8 {
        if (v as u32) & 0xff00_0000 == 0 {
            (v >> 16) as u8
        } else if v < 0 {
            0
        } else {
            0xff
        }
    };
    let cb = chroma(-11056 * r - 21712 * g + 32768 * b + (257 << 15));
    let cr = chroma(32768 * r - 27440 * g - 5328 * b + (257 << 15));
    YCbCr {
        y: y as u8,
        cb,
        cr,
    }
}

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

/// An ordered list of colors addressed by byte index.
///
/// Entries are reference counted: clones share one allocation, and
/// [`push`](Palette::push) copies before appending.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Palette {
    colors: Arc<[Color]>,
}

impl Palette {
    pub fn new(colors: impl Into<Vec<Color>>) -> Self {
        Self {
            colors: Arc::from(colors.into()),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color at `index`, or `None` if the palette is shorter.
    #[inline]
    pub fn get(&self, index: usize) -> Option<Color> {
        self.colors.get(index).copied()
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn push(&mut self, c: Color) {
        let mut colors = self.colors.to_vec();
        colors.push(c);
        self.colors = Arc::from(colors);
    }

    /// Whether `self` and `other` are clones of the same entries.
    pub fn shares_storage(&self, other: &Palette) -> bool {
        Arc::ptr_eq(&self.colors, &other.colors)
    }

    /// Index of the entry closest to `c` in squared RGBA distance.
    ///
    /// Ties go to the lowest index. Returns 0 for an empty palette.
    pub fn index(&self, c: Color) -> usize {
        self.index_within(c, self.colors.len())
    }

    /// Like [`index`](Self::index), considering only the first `n` entries.
    pub(crate) fn index_within(&self, c: Color, n: usize) -> usize {
        let (cr, cg, cb, ca) = c.rgba();
        let mut best = 0;
        let mut best_sum = u32::MAX;
        for (i, v) in self.colors.iter().take(n).enumerate() {
            let (vr, vg, vb, va) = v.rgba();
            let sum = sq_diff(cr, vr)
                .wrapping_add(sq_diff(cg, vg))
                .wrapping_add(sq_diff(cb, vb))
                .wrapping_add(sq_diff(ca, va));
            if sum < best_sum {
                if sum == 0 {
                    return i;
                }
                best = i;
                best_sum = sum;
            }
        }
        best
    }

    /// The palette entry closest to `c`, or `c` itself if the palette is
    /// empty.
    pub fn convert(&self, c: Color) -> Color {
        self.get(self.index(c)).unwrap_or(c)
    }
}

impl From<Vec<Color>> for Palette {
    fn from(colors: Vec<Color>) -> Self {
        Self::new(colors)
    }
}

/// Squared difference scaled down by 4 so four of them fit a `u32`.
#[inline]
fn sq_diff(x: u32, y: u32) -> u32 {
    let d = x.abs_diff(y);
    (d * d) >> 2
}

// ---------------------------------------------------------------------------
// ColorModel
// ---------------------------------------------------------------------------

/// Canonicalizes arbitrary colors into one native sample type.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ColorModel {
    Rgba,
    Rgba64,
    Nrgba,
    Nrgba64,
    Alpha,
    Alpha16,
    Gray,
    Gray16,
    YCbCr,
    /// Nearest palette entry.
    Palette(Palette),
    /// Every input maps to the same color.
    Constant(Color),
}

impl ColorModel {
    /// Converts `c` into this model's native representation.
    pub fn convert(&self, c: Color) -> Color {
        match self {
            ColorModel::Rgba => to_rgba(c).into(),
            ColorModel::Rgba64 => to_rgba64(c).into(),
            ColorModel::Nrgba => to_nrgba(c).into(),
            ColorModel::Nrgba64 => to_nrgba64(c).into(),
            ColorModel::Alpha => to_alpha(c).into(),
            ColorModel::Alpha16 => to_alpha16(c).into(),
            ColorModel::Gray => to_gray(c).into(),
            ColorModel::Gray16 => to_gray16(c).into(),
            ColorModel::YCbCr => to_ycbcr(c).into(),
            ColorModel::Palette(p) => p.convert(c),
            ColorModel::Constant(k) => *k,
        }
    }
}

pub(crate) fn to_rgba(c: Color) -> Rgba {
    if let Color::Rgba(v) = c {
        return v;
    }
    let (r, g, b, a) = c.rgba();
    Rgba::new((r >> 8) as u8, (g >> 8) as u8, (b >> 8) as u8, (a >> 8) as u8)
}

pub(crate) fn to_rgba64(c: Color) -> Rgba64 {
    if let Color::Rgba64(v) = c {
        return v;
    }
    let (r, g, b, a) = c.rgba();
    Rgba64::new(r as u16, g as u16, b as u16, a as u16)
}

pub(crate) fn to_nrgba(c: Color) -> Nrgba {
    if let Color::Nrgba(v) = c {
        return v;
    }
    let (r, g, b, a) = c.rgba();
    match a {
        MAX16 => Nrgba::new((r >> 8) as u8, (g >> 8) as u8, (b >> 8) as u8, 0xff),
        0 => Nrgba::default(),
        _ => {
            let (r, g, b) = (r * MAX16 / a, g * MAX16 / a, b * MAX16 / a);
            Nrgba::new((r >> 8) as u8, (g >> 8) as u8, (b >> 8) as u8, (a >> 8) as u8)
        }
    }
}

pub(crate) fn to_nrgba64(c: Color) -> Nrgba64 {
    if let Color::Nrgba64(v) = c {
        return v;
    }
    let (r, g, b, a) = c.rgba();
    match a {
        MAX16 => Nrgba64::new(r as u16, g as u16, b as u16, MAX16 as u16),
        0 => Nrgba64::default(),
        _ => Nrgba64::new(
            (r * MAX16 / a) as u16,
            (g * MAX16 / a) as u16,
            (b * MAX16 / a) as u16,
            a as u16,
        ),
    }
}

pub(crate) fn to_alpha(c: Color) -> Alpha {
    if let Color::Alpha(v) = c {
        return v;
    }
    Alpha {
        a: (c.alpha() >> 8) as u8,
    }
}

pub(crate) fn to_alpha16(c: Color) -> Alpha16 {
    if let Color::Alpha16(v) = c {
        return v;
    }
    Alpha16 { a: c.alpha() as u16 }
}

/// Rec. 601 luma weights in 16.16 fixed point.
#[inline]
fn luma16(r: u32, g: u32, b: u32) -> u32 {
    (19595 * r + 38470 * g + 7471 * b + (1 << 15)) >> 16
}

pub(crate) fn to_gray(c: Color) -> Gray {
    if let Color::Gray(v) = c {
        return v;
    }
    let (r, g, b, _) = c.rgba();
    Gray {
        y: (luma16(r, g, b) >> 8) as u8,
    }
}

pub(crate) fn to_gray16(c: Color) -> Gray16 {
    if let Color::Gray16(v) = c {
        return v;
    }
    let (r, g, b, _) = c.rgba();
    Gray16 {
        y: luma16(r, g, b) as u16,
    }
}

pub(crate) fn to_ycbcr(c: Color) -> YCbCr {
    if let Color::YCbCr(v) = c {
        return v;
    }
    let (r, g, b, _) = c.rgba();
    rgb_to_ycbcr((r >> 8) as u8, (g >> 8) as u8, (b >> 8) as u8)
}
