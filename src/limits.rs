//! Dimension limits applied to decode results.
//!
//! [`Limits`] caps what the registry will hand back from a decoder.
//! [`LimitExceeded`] is returned when a check fails.

use core::fmt;

use crate::geom::Rectangle;
use crate::image::Config;

/// Caps on decoded image dimensions.
///
/// All fields are optional; `None` means no limit for that dimension.
///
/// # Example
///
/// ```
/// use zenraster::Limits;
///
/// let limits = Limits::none()
///     .with_max_pixels(100_000_000)
///     .with_max_width(16_384);
/// assert!(limits.has_any());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct Limits {
    /// Maximum image width in pixels.
    pub max_width: Option<u32>,
    /// Maximum image height in pixels.
    pub max_height: Option<u32>,
    /// Maximum total pixels (width × height).
    pub max_pixels: Option<u64>,
}

impl Limits {
    /// No limits (all fields `None`).
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_max_width(mut self, width: u32) -> Self {
        self.max_width = Some(width);
        self
    }

    pub fn with_max_height(mut self, height: u32) -> Self {
        self.max_height = Some(height);
        self
    }

    pub fn with_max_pixels(mut self, max: u64) -> Self {
        self.max_pixels = Some(max);
        self
    }

    /// Whether any limits are set.
    pub fn has_any(&self) -> bool {
        self.max_width.is_some() || self.max_height.is_some() || self.max_pixels.is_some()
    }

    /// Checks a `width` x `height` image.
    pub fn check_dimensions(&self, width: u32, height: u32) -> Result<(), LimitExceeded> {
        if let Some(max) = self.max_width
            && width > max
        {
            return Err(LimitExceeded::Width { actual: width, max });
        }
        if let Some(max) = self.max_height
            && height > max
        {
            return Err(LimitExceeded::Height { actual: height, max });
        }
        if let Some(max) = self.max_pixels {
            let pixels = width as u64 * height as u64;
            if pixels > max {
                return Err(LimitExceeded::Pixels { actual: pixels, max });
            }
        }
        Ok(())
    }

    /// Checks a decoded configuration.
    pub fn check_config(&self, config: &Config) -> Result<(), LimitExceeded> {
        self.check_dimensions(config.width, config.height)
    }

    /// Checks image bounds. Empty bounds always pass.
    ///
    /// Unbounded images such as `Uniform` should not be passed here.
    pub fn check_bounds(&self, r: Rectangle) -> Result<(), LimitExceeded> {
        if r.is_empty() {
            return Ok(());
        }
        self.check_dimensions(r.dx() as u32, r.dy() as u32)
    }
}

/// A limit check failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum LimitExceeded {
    Width { actual: u32, max: u32 },
    Height { actual: u32, max: u32 },
    Pixels { actual: u64, max: u64 },
}

impl fmt::Display for LimitExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Width { actual, max } => write!(f, "width {actual} exceeds limit {max}"),
            Self::Height { actual, max } => write!(f, "height {actual} exceeds limit {max}"),
            Self::Pixels { actual, max } => {
                write!(f, "pixel count {actual} exceeds limit {max}")
            }
        }
    }
}

impl core::error::Error for LimitExceeded {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorModel;
    use crate::geom::rect;
    use alloc::string::ToString;

    #[test]
    fn default_has_no_limits() {
        let limits = Limits::none();
        assert!(!limits.has_any());
        assert_eq!(limits.check_dimensions(u32::MAX, u32::MAX), Ok(()));
    }

    #[test]
    fn builder_sets_limits() {
        let limits = Limits::none().with_max_width(100).with_max_pixels(5_000);
        assert!(limits.has_any());
        assert_eq!(limits.max_width, Some(100));
        assert_eq!(limits.max_pixels, Some(5_000));
        assert!(limits.max_height.is_none());
    }

    #[test]
    fn each_limit_trips() {
        let limits = Limits::none()
            .with_max_width(100)
            .with_max_height(50)
            .with_max_pixels(4_000);
        assert_eq!(limits.check_dimensions(80, 50), Ok(()));
        assert_eq!(
            limits.check_dimensions(101, 1),
            Err(LimitExceeded::Width { actual: 101, max: 100 })
        );
        assert_eq!(
            limits.check_dimensions(1, 51),
            Err(LimitExceeded::Height { actual: 51, max: 50 })
        );
        assert_eq!(
            limits.check_dimensions(100, 41),
            Err(LimitExceeded::Pixels { actual: 4_100, max: 4_000 })
        );
    }

    #[test]
    fn config_and_bounds() {
        let limits = Limits::none().with_max_width(10);
        assert!(limits.check_config(&Config::new(ColorModel::Gray, 11, 1)).is_err());
        assert!(limits.check_bounds(rect(-5, 0, 5, 1)).is_ok());
        assert!(limits.check_bounds(rect(-6, 0, 5, 1)).is_err());
        assert!(limits.check_bounds(Rectangle::ZERO).is_ok());
    }

    #[test]
    fn display() {
        assert_eq!(
            LimitExceeded::Width { actual: 3, max: 2 }.to_string(),
            "width 3 exceeds limit 2"
        );
    }
}
