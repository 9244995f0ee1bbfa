//! Framebuffer geometry.
//!
//! Outputs are placed side by side along the X axis in the order the
//! resolver produced.  Each output contributes its *effective* extent:
//! the mode dimensions, with width and height swapped when the output is
//! rotated by a quarter turn.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A mode size in pixels, written `<width>x<height>` (e.g. `1920x1080`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Error from parsing a `<width>x<height>` string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid resolution {0:?}, expected WIDTHxHEIGHT")]
pub struct ParseResolutionError(String);

impl FromStr for Resolution {
    type Err = ParseResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseResolutionError(s.to_string());
        let (w, h) = s.trim().split_once('x').ok_or_else(err)?;
        let width = w.parse().map_err(|_| err())?;
        let height = h.parse().map_err(|_| err())?;
        Ok(Self { width, height })
    }
}

impl Serialize for Resolution {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Resolution {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(DeError::custom)
    }
}

/// Output rotation as understood by `xrandr --rotate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    Normal,
    Left,
    Right,
    Inverted,
}

impl Rotation {
    /// Whether the output is turned on its side, swapping its axes.
    pub fn is_quarter_turn(self) -> bool {
        matches!(self, Rotation::Left | Rotation::Right)
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rotation::Normal => write!(f, "normal"),
            Rotation::Left => write!(f, "left"),
            Rotation::Right => write!(f, "right"),
            Rotation::Inverted => write!(f, "inverted"),
        }
    }
}

/// Horizontal and vertical space an output occupies in the framebuffer.
pub fn effective_extent(resolution: Resolution, rotation: Option<Rotation>) -> (u32, u32) {
    match rotation {
        Some(r) if r.is_quarter_turn() => (resolution.height, resolution.width),
        _ => (resolution.width, resolution.height),
    }
}

/// Computed framebuffer size plus the X offset of every placed output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Framebuffer width: sum of all effective widths.
    pub width: u32,
    /// Framebuffer height: tallest effective height.
    pub height: u32,
    /// X offset of each output, in input order.
    pub offsets: Vec<u32>,
}

impl Layout {
    /// Lay out outputs left to right.
    ///
    /// Each item is `(mode, rotation)`; offset `i` is the sum of the
    /// effective widths of items `0..i`.
    pub fn left_to_right<I>(outputs: I) -> Self
    where
        I: IntoIterator<Item = (Resolution, Option<Rotation>)>,
    {
        let mut width: u32 = 0;
        let mut height: u32 = 0;
        let mut offsets = Vec::new();
        for (resolution, rotation) in outputs {
            let (w, h) = effective_extent(resolution, rotation);
            offsets.push(width);
            width += w;
            height = height.max(h);
        }
        Self {
            width,
            height,
            offsets,
        }
    }

    /// Framebuffer size as a [`Resolution`].
    pub fn framebuffer(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }
}
