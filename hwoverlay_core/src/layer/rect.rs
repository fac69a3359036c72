// Copyright 2026 the Hwoverlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Integer pixel rectangles.

/// An axis-aligned rectangle in pixel coordinates, stored as edges.
///
/// Producers are expected to supply `right > left` and `bottom > top`, but
/// nothing enforces it: [`width`](Self::width) and [`height`](Self::height)
/// return the magnitude of the edge difference, so an edge-swapped rectangle
/// describes the same area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PixelRect {
    /// Left edge.
    pub left: i32,
    /// Top edge.
    pub top: i32,
    /// Right edge (exclusive).
    pub right: i32,
    /// Bottom edge (exclusive).
    pub bottom: i32,
}

impl PixelRect {
    /// Creates a rectangle from its four edges.
    #[inline]
    #[must_use]
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Creates a rectangle from an origin and a size.
    ///
    /// Edges saturate at `i32::MAX`.
    #[inline]
    #[must_use]
    pub const fn from_origin_size(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            left: x,
            top: y,
            right: x.saturating_add_unsigned(width),
            bottom: y.saturating_add_unsigned(height),
        }
    }

    /// Horizontal extent in pixels.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.right.abs_diff(self.left)
    }

    /// Vertical extent in pixels.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.bottom.abs_diff(self.top)
    }

    /// Returns `true` if the rectangle covers no pixels.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Returns the top-left corner of the covered area.
    #[inline]
    #[must_use]
    pub const fn origin(&self) -> (i32, i32) {
        let n = self.normalized();
        (n.left, n.top)
    }

    /// Returns the same area with `left <= right` and `top <= bottom`.
    #[must_use]
    pub const fn normalized(&self) -> Self {
        let (left, right) = if self.left <= self.right {
            (self.left, self.right)
        } else {
            (self.right, self.left)
        };
        let (top, bottom) = if self.top <= self.bottom {
            (self.top, self.bottom)
        } else {
            (self.bottom, self.top)
        };
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Converts to a [`kurbo::Rect`] covering the same area.
    #[must_use]
    pub fn to_kurbo(&self) -> kurbo::Rect {
        kurbo::Rect::new(
            f64::from(self.left),
            f64::from(self.top),
            f64::from(self.right),
            f64::from(self.bottom),
        )
        .abs()
    }
}
