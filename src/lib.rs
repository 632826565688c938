//! In-memory raster images for zen* codecs.
//!
//! - [`Point`] / [`Rectangle`]: integer geometry with half-open rectangles
//! - [`color`]: color samples, [`ColorModel`](color::ColorModel) conversion
//!   and palettes
//! - [`Image`] / [`ImageMut`] / [`PalettedImage`]: the read and write contract
//! - [`Rgba`], [`Gray`], [`Paletted`], [`YCbCr`] and friends: pixel buffers
//!   over shared storage, with zero-copy [`sub_image`](Rgba::sub_image) views
//! - [`Uniform`]: an unbounded single-color image
//! - [`Registry`]: magic-byte format sniffing and decoder dispatch (`std`)
//!
//! Every buffer addresses pixels by absolute coordinates; its bounds need not
//! contain the origin. Reads outside the bounds return the model's zero color
//! and writes outside the bounds are ignored.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod buffer;
pub mod color;
#[cfg(feature = "std")]
mod format;
mod geom;
mod image;
mod limits;
mod paletted;
mod pix;
pub mod uniform;
mod ycbcr;

pub use buffer::{Alpha, Alpha16, Gray, Gray16, Nrgba, Nrgba64, Rgba, Rgba64};
#[cfg(feature = "std")]
pub use format::{
    CodecError, DecodeConfigFn, DecodeFn, FormatError, Registry, decode, decode_config,
    register_format,
};
pub use geom::{Point, Rectangle, pt, rect};
pub use image::{AnyImage, Config, Image, ImageMut, PalettedImage};
pub use limits::{LimitExceeded, Limits};
pub use paletted::Paletted;
pub use pix::{BufferError, Pix};
pub use uniform::Uniform;
pub use ycbcr::{YCbCr, YCbCrSubsampleRatio};

// Re-exports for codec implementors.
pub use enough::{Stop, StopReason, Unstoppable};
