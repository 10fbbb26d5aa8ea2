// Copyright 2026 the Barrage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Danmaku entries as loaded from a comment file.

use core::fmt;
use std::sync::Arc;

/// Placement mode of an entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Moves right to left across the viewport.
    Scroll,
    /// Fixed, centered, stacked down from the top edge.
    Top,
    /// Fixed, centered, stacked up from the bottom edge.
    Bottom,
}

impl Mode {
    /// All modes, in lane-table order.
    pub const ALL: [Self; 3] = [Self::Scroll, Self::Top, Self::Bottom];

    /// Maps a comment-file mode code to a placement mode.
    ///
    /// Code 1 scrolls, 4 is bottom, and 5 is top. Anything else, including
    /// the legacy scroll codes 2 and 3, reverse scrolls, and positioned or
    /// scripted comments, has no placement here and is skipped on load.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Scroll),
            4 => Some(Self::Bottom),
            5 => Some(Self::Top),
            _ => None,
        }
    }

    /// Returns whether this mode stays in place until a deadline.
    #[inline]
    #[must_use]
    pub const fn is_fixed(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }

    pub(crate) const fn table_index(self) -> usize {
        match self {
            Self::Scroll => 0,
            Self::Top => 1,
            Self::Bottom => 2,
        }
    }
}

/// An opaque 8-bit-per-channel RGB color.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// Black.
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// White.
    pub const WHITE: Self = Self::new(0xff, 0xff, 0xff);

    /// Creates a color from its channels.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Decodes a packed `0xRRGGBB` value, ignoring the high byte.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "each channel is masked to 8 bits before narrowing"
    )]
    pub const fn from_packed(packed: u32) -> Self {
        Self {
            r: ((packed >> 16) & 0xff) as u8,
            g: ((packed >> 8) & 0xff) as u8,
            b: (packed & 0xff) as u8,
        }
    }

    /// Encodes this color as `0xRRGGBB`.
    #[must_use]
    pub const fn to_packed(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

impl fmt::Debug for Rgb8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.to_packed())
    }
}

/// A single timestamped annotation. Immutable once created.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    /// Media position, in seconds, at which the entry appears.
    pub start_time: f64,
    /// Placement mode.
    pub mode: Mode,
    /// Text to display.
    pub text: Arc<str>,
    /// Fill color.
    pub color: Rgb8,
}

impl Entry {
    /// Creates an entry.
    #[must_use]
    pub fn new(start_time: f64, mode: Mode, text: impl Into<Arc<str>>, color: Rgb8) -> Self {
        Self {
            start_time,
            mode,
            text: text.into(),
            color,
        }
    }

    /// Returns the number of characters (not bytes) in the text.
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}
