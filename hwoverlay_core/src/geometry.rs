// Copyright 2026 the Hwoverlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Source and destination geometry for an overlay transfer.
//!
//! [`plan`] reduces a layer's crop window and display frame to the sizes the
//! transfer engine needs. Degenerate rectangles pass through unchanged; the
//! engine decides what to do with a zero-area destination.

use crate::format::HwImageType;
use crate::layer::PixelRect;

/// Row pitch alignment required by the overlay engine, in bytes.
pub const DEFAULT_PITCH_ALIGNMENT: u32 = 32;

/// Sizes derived from one layer's rectangles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Geometry {
    /// Width of the display frame.
    pub dest_width: u32,
    /// Height of the display frame.
    pub dest_height: u32,
    /// Width of the source crop.
    pub src_width: u32,
    /// Height of the source crop.
    pub src_height: u32,
    /// Top-left corner of the display frame.
    pub dest_origin: (i32, i32),
}

impl Geometry {
    /// Bytes per destination row for `image_type`, rounded up to `alignment`.
    #[must_use]
    pub const fn row_pitch(&self, image_type: HwImageType, alignment: u32) -> u32 {
        align_up(
            self.dest_width.saturating_mul(image_type.bytes_per_pixel()),
            alignment,
        )
    }

    /// The rectangle written inside the resource: `(0, 0)` to the source size.
    #[must_use]
    pub const fn source_rect(&self) -> PixelRect {
        PixelRect::from_origin_size(0, 0, self.src_width, self.src_height)
    }

    /// The on-screen rectangle, anchored at the display frame origin with the
    /// destination size.
    #[must_use]
    pub const fn placement(&self) -> PixelRect {
        PixelRect::from_origin_size(
            self.dest_origin.0,
            self.dest_origin.1,
            self.dest_width,
            self.dest_height,
        )
    }

    /// Returns `true` if the destination covers no pixels.
    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        self.dest_width == 0 || self.dest_height == 0
    }
}

/// Computes transfer geometry from a layer's crop window and display frame.
#[must_use]
pub const fn plan(source_crop: PixelRect, display_frame: PixelRect) -> Geometry {
    Geometry {
        dest_width: display_frame.width(),
        dest_height: display_frame.height(),
        src_width: source_crop.width(),
        src_height: source_crop.height(),
        dest_origin: display_frame.origin(),
    }
}

/// Rounds `value` up to a multiple of `alignment`.
///
/// An alignment of zero or one leaves the value unchanged. Saturates at the
/// largest representable multiple.
#[must_use]
pub const fn align_up(value: u32, alignment: u32) -> u32 {
    if alignment <= 1 {
        return value;
    }
    match value.checked_next_multiple_of(alignment) {
        Some(v) => v,
        None => u32::MAX - u32::MAX % alignment,
    }
}
