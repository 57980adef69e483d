//! Basic geometry and color types for rendering.
//!
//! All geometry is integral: the canvas works in device pixels and the pyramid
//! only ever scales by powers of two, so there is never a fractional coordinate
//! to carry around.

use std::fmt;

/// A point in 2D pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A size in 2D pixel space (width and height).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Zero size.
    pub const ZERO: Self = Self {
        width: 0,
        height: 0,
    };

    /// Check if the size has zero area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of pixels covered by this size, if it fits in `usize`.
    #[inline]
    pub fn area(&self) -> Option<usize> {
        (self.width as usize).checked_mul(self.height as usize)
    }

    /// The size halved in both dimensions, rounding up.
    #[inline]
    pub const fn half_ceil(self) -> Self {
        Self {
            width: self.width.div_ceil(2),
            height: self.height.div_ceil(2),
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// An axis-aligned rectangle defined by its top-left corner and size.
///
/// The right and bottom edges are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle from origin and size.
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from its edges (left/top inclusive, right/bottom exclusive).
    #[inline]
    pub const fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        }
    }

    /// A rectangle at the origin covering `size`.
    #[inline]
    pub fn from_size(size: Size) -> Self {
        Self {
            x: 0,
            y: 0,
            width: clamp_to_i32(size.width as i64),
            height: clamp_to_i32(size.height as i64),
        }
    }

    /// Left edge x coordinate.
    #[inline]
    pub const fn left(&self) -> i32 {
        self.x
    }

    /// Top edge y coordinate.
    #[inline]
    pub const fn top(&self) -> i32 {
        self.y
    }

    /// Right edge x coordinate (exclusive).
    #[inline]
    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Bottom edge y coordinate (exclusive).
    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Check if the rectangle is empty (zero or negative size).
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Number of pixels covered by the rectangle.
    #[inline]
    pub fn area(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.width as u64 * self.height as u64
        }
    }

    /// Compute the intersection of two rectangles.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if left < right && top < bottom {
            Some(Rect::from_edges(left, top, right, bottom))
        } else {
            None
        }
    }

    /// The parts of this rectangle not covered by `hole`.
    ///
    /// Returns at most four non-overlapping bands: the full-width strips above
    /// and below the hole, then the left and right strips beside it.
    pub fn subtract(&self, hole: &Rect) -> Vec<Rect> {
        let Some(hole) = self.intersect(hole) else {
            return if self.is_empty() { Vec::new() } else { vec![*self] };
        };

        let bands = [
            Rect::from_edges(self.left(), self.top(), self.right(), hole.top()),
            Rect::from_edges(self.left(), hole.bottom(), self.right(), self.bottom()),
            Rect::from_edges(self.left(), hole.top(), hole.left(), hole.bottom()),
            Rect::from_edges(hole.right(), hole.top(), self.right(), hole.bottom()),
        ];
        bands.into_iter().filter(|band| !band.is_empty()).collect()
    }

}

/// Saturating conversion used wherever a wide intermediate lands back in
/// pixel space.
#[inline]
pub(crate) fn clamp_to_i32(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// An opaque RGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Create a color from 8-bit channels.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create a color from a `0xRRGGBB` value. The top byte is ignored.
    #[inline]
    pub const fn from_u32(rgb: u32) -> Self {
        Self {
            r: (rgb >> 16) as u8,
            g: (rgb >> 8) as u8,
            b: rgb as u8,
        }
    }

    /// The color as a `0xRRGGBB` value.
    #[inline]
    pub const fn to_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// The color as an opaque packed pixel (`0xFFRRGGBB`).
    #[inline]
    pub const fn to_pixel(self) -> u32 {
        0xFF00_0000 | self.to_u32()
    }

    /// Parse a color from `#RRGGBB` or `RRGGBB`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        u32::from_str_radix(digits, 16).ok().map(Self::from_u32)
    }

    /// Format the color as `#RRGGBB`.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const RED: Self = Self::new(255, 0, 0);
    /// The default viewer background, a dark gray.
    pub const DARK_GRAY: Self = Self::new(0x40, 0x40, 0x40);
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Rgb {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Rgb {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Rgb::from_hex(&text).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid color `{text}`, expected #RRGGBB"))
        })
    }
}
