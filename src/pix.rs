//! Shared pixel storage.
//!
//! [`Pix`] is a window into a reference-counted byte allocation. Cloning a
//! `Pix` or taking a [`tail`](Pix::tail) of it never copies: every view
//! aliases the same bytes, so a write through one view is visible through
//! all others that cover the same index. The allocation is freed when the
//! last view is dropped.
//!
//! Bytes are stored as relaxed atomics. Concurrent reads from any number of
//! views are fine. Concurrent writes to overlapping regions are memory-safe
//! but their ordering is up to the caller, and multi-byte samples written
//! from two threads at once may tear.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::sync::atomic::{AtomicU8, Ordering};

use crate::geom::Rectangle;

// ---------------------------------------------------------------------------
// BufferError
// ---------------------------------------------------------------------------

/// Errors from building a pixel buffer over caller-provided bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum BufferError {
    /// Byte slice is too small for the given bounds and stride.
    InsufficientData,
    /// Stride is smaller than `width * bytes_per_pixel`.
    StrideTooSmall,
    /// Bounds are not well-formed, or their size overflows.
    InvalidDimensions,
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientData => {
                write!(f, "pixel data is too small for the given bounds and stride")
            }
            Self::StrideTooSmall => write!(f, "stride is smaller than width * bytes_per_pixel"),
            Self::InvalidDimensions => {
                write!(f, "bounds are not well-formed or their size overflows")
            }
        }
    }
}

impl core::error::Error for BufferError {}

/// Checks that `len` bytes with the given `stride` can back `r` at `bpp`
/// bytes per pixel.
pub(crate) fn check_layout(
    len: usize,
    stride: usize,
    r: Rectangle,
    bpp: usize,
) -> Result<(), BufferError> {
    if r.dx() < 0 || r.dy() < 0 {
        return Err(BufferError::InvalidDimensions);
    }
    let (w, h) = (r.dx() as usize, r.dy() as usize);
    let row = w.checked_mul(bpp).ok_or(BufferError::InvalidDimensions)?;
    if stride < row {
        return Err(BufferError::StrideTooSmall);
    }
    if h > 0 && w > 0 {
        // The last row only needs its pixels, not the full stride.
        let required = (h - 1)
            .checked_mul(stride)
            .and_then(|n| n.checked_add(row))
            .ok_or(BufferError::InvalidDimensions)?;
        if len < required {
            return Err(BufferError::InsufficientData);
        }
    }
    Ok(())
}

/// Byte count for a zeroed `w`x`h` buffer at `bpp`; negative sizes count as
/// zero.
pub(crate) fn alloc_len(r: Rectangle, bpp: usize) -> (usize, usize) {
    let w = r.dx().max(0) as usize;
    let h = r.dy().max(0) as usize;
    let stride = w * bpp;
    (stride, stride * h)
}

// ---------------------------------------------------------------------------
// Pix
// ---------------------------------------------------------------------------

/// A shared, mutable byte buffer view.
#[derive(Clone)]
pub struct Pix {
    storage: Arc<[AtomicU8]>,
    start: usize,
    len: usize,
}

impl Pix {
    /// Allocates `len` zero bytes.
    pub fn zeroed(len: usize) -> Self {
        let storage: Arc<[AtomicU8]> = (0..len).map(|_| AtomicU8::new(0)).collect();
        Self {
            storage,
            start: 0,
            len,
        }
    }

    /// Takes ownership of `bytes`.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        let len = bytes.len();
        let storage: Arc<[AtomicU8]> = bytes.into_iter().map(AtomicU8::new).collect();
        Self {
            storage,
            start: 0,
            len,
        }
    }

    /// An empty view with no backing bytes.
    pub fn empty() -> Self {
        Self::zeroed(0)
    }

    /// Number of bytes visible through this view.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reads byte `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len()`.
    #[inline]
    pub fn get(&self, i: usize) -> u8 {
        self.cell(i).load(Ordering::Relaxed)
    }

    /// Writes byte `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len()`.
    #[inline]
    pub fn set(&self, i: usize, v: u8) {
        self.cell(i).store(v, Ordering::Relaxed);
    }

    /// Reads a big-endian `u16` at `i`.
    #[inline]
    pub fn get_u16(&self, i: usize) -> u16 {
        u16::from_be_bytes([self.get(i), self.get(i + 1)])
    }

    /// Writes a big-endian `u16` at `i`.
    #[inline]
    pub fn set_u16(&self, i: usize, v: u16) {
        let [hi, lo] = v.to_be_bytes();
        self.set(i, hi);
        self.set(i + 1, lo);
    }

    /// View of bytes `offset..` sharing this storage.
    ///
    /// # Panics
    ///
    /// Panics if `offset > len()`.
    pub fn tail(&self, offset: usize) -> Pix {
        self.range(offset, self.len - offset)
    }

    /// View of `len` bytes starting at `offset`, sharing this storage.
    ///
    /// # Panics
    ///
    /// Panics if the range extends past `len()`.
    pub fn range(&self, offset: usize, len: usize) -> Pix {
        assert!(
            offset.checked_add(len).is_some_and(|end| end <= self.len),
            "range {offset}+{len} out of bounds (len: {})",
            self.len
        );
        Pix {
            storage: Arc::clone(&self.storage),
            start: self.start + offset,
            len,
        }
    }

    /// Whether `self` and `other` view the same allocation.
    pub fn shares_storage(&self, other: &Pix) -> bool {
        Arc::ptr_eq(&self.storage, &other.storage)
    }

    /// Copies the visible bytes out.
    pub fn to_vec(&self) -> Vec<u8> {
        (0..self.len).map(|i| self.get(i)).collect()
    }

    /// Copies `src` into the view starting at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `src` does not fit.
    pub fn copy_from_slice(&self, offset: usize, src: &[u8]) {
        assert!(
            offset
                .checked_add(src.len())
                .is_some_and(|end| end <= self.len),
            "copy of {} bytes at {offset} out of bounds (len: {})",
            src.len(),
            self.len
        );
        for (i, &b) in src.iter().enumerate() {
            self.set(offset + i, b);
        }
    }

    #[inline]
    fn cell(&self, i: usize) -> &AtomicU8 {
        assert!(i < self.len, "index {i} out of bounds (len: {})", self.len);
        &self.storage[self.start + i]
    }
}

impl Default for Pix {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Vec<u8>> for Pix {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_vec(bytes)
    }
}

impl fmt::Debug for Pix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pix({} bytes @ {})", self.len, self.start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::rect;
    use alloc::vec;

    #[test]
    fn zeroed_reads_zero() {
        let p = Pix::zeroed(4);
        assert_eq!(p.to_vec(), vec![0; 4]);
    }

    #[test]
    fn tail_aliases_parent() {
        let p = Pix::from_vec(vec![1, 2, 3, 4, 5]);
        let t = p.tail(2);
        assert_eq!(t.len(), 3);
        assert_eq!(t.get(0), 3);
        t.set(1, 40);
        assert_eq!(p.get(3), 40);
        p.set(4, 50);
        assert_eq!(t.get(2), 50);
        assert!(p.shares_storage(&t));
        assert!(!p.shares_storage(&Pix::zeroed(5)));
    }

    #[test]
    fn u16_is_big_endian() {
        let p = Pix::zeroed(2);
        p.set_u16(0, 0x1234);
        assert_eq!(p.to_vec(), vec![0x12, 0x34]);
        assert_eq!(p.get_u16(0), 0x1234);
    }

    #[test]
    #[should_panic]
    fn tail_cannot_read_past_end() {
        let p = Pix::from_vec(vec![1, 2, 3]);
        p.tail(1).get(2);
    }

    #[test]
    fn range_limits_view() {
        let p = Pix::from_vec(vec![0, 1, 2, 3, 4, 5]);
        let r = p.range(1, 2);
        assert_eq!(r.to_vec(), vec![1, 2]);
    }

    #[test]
    fn copy_from_slice_writes_through() {
        let p = Pix::zeroed(4);
        p.tail(1).copy_from_slice(1, &[7, 8]);
        assert_eq!(p.to_vec(), vec![0, 0, 7, 8]);
    }

    #[test]
    fn layout_checks() {
        let r = rect(0, 0, 3, 2);
        assert_eq!(check_layout(12, 6, r, 2), Ok(()));
        // Last row needs only its pixels.
        assert_eq!(check_layout(14, 8, r, 2), Ok(()));
        assert_eq!(check_layout(13, 8, r, 2), Err(BufferError::InsufficientData));
        assert_eq!(check_layout(100, 5, r, 2), Err(BufferError::StrideTooSmall));
        assert_eq!(check_layout(0, 0, rect(0, 0, 0, 5), 4), Ok(()));
    }

    #[test]
    fn alloc_len_clamps_negative() {
        let r = Rectangle::from_corners(crate::geom::pt(5, 5), crate::geom::pt(0, 0));
        assert_eq!(alloc_len(r, 4), (0, 0));
        assert_eq!(alloc_len(rect(0, 0, 3, 2), 4), (12, 24));
    }
}
