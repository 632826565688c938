//! Format registry: magic-byte sniffing and decoder dispatch.
//!
//! Codec crates register a name, a magic prefix and two callbacks. Decoding a
//! byte stream reads just enough of it to compare against every registered
//! prefix, picks the first match in registration order, and hands the callback
//! the complete stream (prefix included).
//!
//! A `?` byte in a magic prefix matches any byte.
//!
//! Registration normally happens once at startup, before any decoding. The
//! registry is still safe to use concurrently: entries sit behind a
//! read-write lock, and callbacks run without holding it.

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use std::io::{self, BufRead, BufReader, Cursor, Read};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use enough::{Stop, StopReason, Unstoppable};
use log::{debug, trace};

use crate::image::{AnyImage, Config, Image};
use crate::limits::{LimitExceeded, Limits};

/// Error type produced by codec callbacks.
pub type CodecError = Box<dyn core::error::Error + Send + Sync>;

/// Full-decode callback.
pub type DecodeFn =
    dyn Fn(&mut dyn BufRead, &dyn Stop) -> Result<AnyImage, CodecError> + Send + Sync;

/// Header-only decode callback.
pub type DecodeConfigFn =
    dyn Fn(&mut dyn BufRead, &dyn Stop) -> Result<Config, CodecError> + Send + Sync;

/// Wildcard byte in a magic prefix.
const WILDCARD: u8 = b'?';

// ---------------------------------------------------------------------------
// FormatError
// ---------------------------------------------------------------------------

/// Errors from [`Registry::decode`] and [`Registry::decode_config`].
#[derive(Debug)]
#[non_exhaustive]
pub enum FormatError {
    /// No registered magic prefix matches the stream.
    UnknownFormat,
    /// Reading the prefix failed.
    Io(io::Error),
    /// The stop token fired before a callback was invoked.
    Stopped(StopReason),
    /// The decoded image exceeds the registry's [`Limits`].
    Limit(LimitExceeded),
    /// The codec callback failed. The error is kept exactly as returned.
    Codec(CodecError),
}

impl FormatError {
    /// The codec's own error, if this is a [`FormatError::Codec`].
    pub fn into_codec(self) -> Option<CodecError> {
        match self {
            Self::Codec(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownFormat => write!(f, "image: unknown format"),
            Self::Io(e) => write!(f, "image: reading magic prefix: {e}"),
            Self::Stopped(reason) => write!(f, "image: decode stopped ({reason:?})"),
            Self::Limit(e) => write!(f, "image: {e}"),
            // Codec errors surface unchanged.
            Self::Codec(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl core::error::Error for FormatError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Limit(e) => Some(e),
            Self::Codec(e) => e.source(),
            _ => None,
        }
    }
}

impl From<io::Error> for FormatError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<StopReason> for FormatError {
    fn from(reason: StopReason) -> Self {
        Self::Stopped(reason)
    }
}

impl From<LimitExceeded> for FormatError {
    fn from(e: LimitExceeded) -> Self {
        Self::Limit(e)
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// One registered format.
#[derive(Clone)]
struct Format {
    name: &'static str,
    magic: Vec<u8>,
    decode: Arc<DecodeFn>,
    decode_config: Arc<DecodeConfigFn>,
}

impl Format {
    /// Whether `prefix` starts with this format's magic, honouring wildcards.
    fn matches(&self, prefix: &[u8]) -> bool {
        self.magic.len() <= prefix.len()
            && self
                .magic
                .iter()
                .zip(prefix)
                .all(|(&m, &b)| m == WILDCARD || m == b)
    }
}

struct State {
    formats: Vec<Format>,
    limits: Limits,
}

/// An ordered, append-only table of image formats.
///
/// Use [`Registry::global`] for the process-wide table that the free
/// functions [`register_format`], [`decode`] and [`decode_config`] operate
/// on, or build a private one with [`Registry::new`].
pub struct Registry {
    state: RwLock<State>,
}

static GLOBAL: Registry = Registry::new();

impl Registry {
    /// An empty registry with no limits.
    pub const fn new() -> Self {
        Self {
            state: RwLock::new(State {
                formats: Vec::new(),
                limits: Limits {
                    max_width: None,
                    max_height: None,
                    max_pixels: None,
                },
            }),
        }
    }

    /// The process-wide registry.
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    /// Sets the limits applied to decode results.
    pub fn with_limits(self, limits: Limits) -> Self {
        self.set_limits(limits);
        self
    }

    /// Replaces the limits applied to decode results.
    pub fn set_limits(&self, limits: Limits) {
        self.write().limits = limits;
    }

    pub fn limits(&self) -> Limits {
        self.read().limits
    }

    /// Appends a format.
    ///
    /// `magic` is the prefix identifying the format's encoding; each `?`
    /// matches any one byte. Earlier registrations win when several prefixes
    /// match, and duplicate names are not rejected.
    pub fn register_format<D, C>(
        &self,
        name: &'static str,
        magic: impl AsRef<[u8]>,
        decode: D,
        decode_config: C,
    ) where
        D: Fn(&mut dyn BufRead, &dyn Stop) -> Result<AnyImage, CodecError> + Send + Sync + 'static,
        C: Fn(&mut dyn BufRead, &dyn Stop) -> Result<Config, CodecError> + Send + Sync + 'static,
    {
        let format = Format {
            name,
            magic: magic.as_ref().to_vec(),
            decode: Arc::new(decode),
            decode_config: Arc::new(decode_config),
        };
        debug!(
            "registered image format {:?} ({} magic bytes)",
            format.name,
            format.magic.len()
        );
        self.write().formats.push(format);
    }

    /// Names of the registered formats, in registration order.
    pub fn formats(&self) -> Vec<&'static str> {
        self.read().formats.iter().map(|f| f.name).collect()
    }

    /// Decodes an image, returning it with the name of the format used.
    pub fn decode<R: Read>(&self, r: R) -> Result<(AnyImage, &'static str), FormatError> {
        self.decode_with_stop(r, &Unstoppable)
    }

    /// Like [`decode`](Self::decode), with a cancellation token that is
    /// checked before sniffing and passed on to the codec.
    pub fn decode_with_stop<R: Read>(
        &self,
        r: R,
        stop: &dyn Stop,
    ) -> Result<(AnyImage, &'static str), FormatError> {
        let (format, mut stream) = self.sniff(r, stop)?;
        let image = (format.decode)(&mut stream, stop).map_err(FormatError::Codec)?;
        if !matches!(image, AnyImage::Uniform(_)) {
            self.limits().check_bounds(image.bounds())?;
        }
        Ok((image, format.name))
    }

    /// Decodes only the color model and dimensions.
    pub fn decode_config<R: Read>(&self, r: R) -> Result<(Config, &'static str), FormatError> {
        self.decode_config_with_stop(r, &Unstoppable)
    }

    /// Like [`decode_config`](Self::decode_config), with a cancellation
    /// token.
    pub fn decode_config_with_stop<R: Read>(
        &self,
        r: R,
        stop: &dyn Stop,
    ) -> Result<(Config, &'static str), FormatError> {
        let (format, mut stream) = self.sniff(r, stop)?;
        let config = (format.decode_config)(&mut stream, stop).map_err(FormatError::Codec)?;
        self.limits().check_config(&config)?;
        Ok((config, format.name))
    }

    /// Reads the longest magic length from `r`, finds the first matching
    /// format, and returns it with a reader that replays the prefix before
    /// the rest of `r`.
    fn sniff<R: Read>(
        &self,
        mut r: R,
        stop: &dyn Stop,
    ) -> Result<(Format, BufReader<io::Chain<Cursor<Vec<u8>>, R>>), FormatError> {
        stop.check()?;
        let longest = self
            .read()
            .formats
            .iter()
            .map(|f| f.magic.len())
            .max()
            .unwrap_or(0);

        let mut prefix = Vec::with_capacity(longest);
        r.by_ref().take(longest as u64).read_to_end(&mut prefix)?;

        let found = self
            .read()
            .formats
            .iter()
            .find(|f| f.matches(&prefix))
            .cloned();
        let Some(format) = found else {
            debug!("no image format matches prefix {prefix:02x?}");
            return Err(FormatError::UnknownFormat);
        };
        trace!(
            "sniffed {} bytes, dispatching to {:?}",
            prefix.len(),
            format.name
        );
        stop.check()?;
        Ok((format, BufReader::new(Cursor::new(prefix).chain(r))))
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        f.debug_struct("Registry")
            .field(
                "formats",
                &state.formats.iter().map(|f| f.name).collect::<Vec<_>>(),
            )
            .field("limits", &state.limits)
            .finish()
    }
}

/// Registers a format with the [global registry](Registry::global).
pub fn register_format<D, C>(
    name: &'static str,
    magic: impl AsRef<[u8]>,
    decode: D,
    decode_config: C,
) where
    D: Fn(&mut dyn BufRead, &dyn Stop) -> Result<AnyImage, CodecError> + Send + Sync + 'static,
    C: Fn(&mut dyn BufRead, &dyn Stop) -> Result<Config, CodecError> + Send + Sync + 'static,
{
    Registry::global().register_format(name, magic, decode, decode_config);
}

/// Decodes with the [global registry](Registry::global).
pub fn decode<R: Read>(r: R) -> Result<(AnyImage, &'static str), FormatError> {
    Registry::global().decode(r)
}

/// Decodes a configuration with the [global registry](Registry::global).
pub fn decode_config<R: Read>(r: R) -> Result<(Config, &'static str), FormatError> {
    Registry::global().decode_config(r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Gray;
    use crate::color::ColorModel;
    use crate::geom::rect;
    use alloc::string::ToString;

    /// Registers a format whose decoder returns a 1x1 gray image and whose
    /// config reports the first byte after the magic as the width.
    fn register(reg: &Registry, name: &'static str, magic: &'static [u8]) {
        reg.register_format(
            name,
            magic,
            |_, _| Ok(Gray::new(rect(0, 0, 1, 1)).into()),
            move |r, _| {
                let mut all = Vec::new();
                r.read_to_end(&mut all)?;
                let width = all.get(magic.len()).copied().unwrap_or(0) as u32;
                Ok(Config::new(ColorModel::Gray, width, 1))
            },
        );
    }

    #[test]
    fn first_registered_match_wins() {
        let reg = Registry::new();
        register(&reg, "A", b"AB");
        register(&reg, "B", b"A?");
        assert_eq!(reg.decode(&b"ABxyz"[..]).unwrap().1, "A");
        assert_eq!(reg.decode(&b"ACxyz"[..]).unwrap().1, "B");
    }

    #[test]
    fn unknown_format() {
        let reg = Registry::new();
        register(&reg, "A", b"AB");
        let err = reg.decode(&b"ZZ"[..]).unwrap_err();
        assert!(matches!(err, FormatError::UnknownFormat));
        assert_eq!(err.to_string(), "image: unknown format");
    }

    #[test]
    fn empty_registry_is_unknown() {
        let reg = Registry::new();
        assert!(matches!(
            reg.decode_config(&b"anything"[..]),
            Err(FormatError::UnknownFormat)
        ));
    }

    #[test]
    fn short_stream_does_not_match_long_magic() {
        let reg = Registry::new();
        register(&reg, "long", b"ABCD");
        register(&reg, "short", b"A");
        assert_eq!(reg.decode(&b"ABC"[..]).unwrap().1, "short");
    }

    #[test]
    fn callback_sees_whole_stream() {
        let reg = Registry::new();
        register(&reg, "short", b"P");
        register(&reg, "long", b"Q???????");
        let (cfg, name) = reg.decode_config(&b"P\x07rest"[..]).unwrap();
        assert_eq!(name, "short");
        assert_eq!(cfg.width, 7);
        let (cfg, name) = reg.decode_config(&b"Q1234567\x09"[..]).unwrap();
        assert_eq!(name, "long");
        assert_eq!(cfg.width, 9);
    }

    #[test]
    fn formats_keep_order() {
        let reg = Registry::new();
        register(&reg, "png", b"\x89PNG");
        register(&reg, "gif", b"GIF8?a");
        register(&reg, "png", b"\x89PNG");
        assert_eq!(reg.formats(), ["png", "gif", "png"]);
    }

    #[test]
    fn limits_apply_to_config() {
        let reg = Registry::new().with_limits(Limits::none().with_max_width(4));
        register(&reg, "A", b"A");
        assert!(reg.decode_config(&b"A\x04"[..]).is_ok());
        let err = reg.decode_config(&b"A\x05"[..]).unwrap_err();
        assert!(matches!(
            err,
            FormatError::Limit(LimitExceeded::Width { actual: 5, max: 4 })
        ));
    }

    #[test]
    fn limits_apply_to_image() {
        let reg = Registry::new();
        register(&reg, "A", b"A");
        reg.set_limits(Limits::none().with_max_pixels(0));
        assert!(matches!(
            reg.decode(&b"A"[..]),
            Err(FormatError::Limit(LimitExceeded::Pixels { .. }))
        ));
    }

    #[test]
    fn debug_lists_names() {
        let reg = Registry::new();
        register(&reg, "A", b"A");
        let s = alloc::format!("{reg:?}");
        assert!(s.contains("\"A\""), "{s}");
    }
}
