// Copyright 2026 the Hwoverlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer descriptors and the per-frame layer list.

use alloc::vec::Vec;

use super::buffer::BufferRef;
use super::rect::PixelRect;
use crate::format::PixelFormat;

/// How a layer is composed for the current frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CompositionType {
    /// The GPU composites the layer into the framebuffer.
    #[default]
    Framebuffer,
    /// The overlay engine scans the layer out directly.
    Overlay,
}

/// One visible surface, as supplied by the windowing server for one frame.
///
/// `transform`, `blending`, and `flags` are carried through untouched; the
/// classifier only looks at [`format`](Self::format).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layer<'a> {
    /// Pixel format of [`buffer`](Self::buffer).
    pub format: PixelFormat,
    /// Region of the buffer to display, in buffer pixels.
    pub source_crop: PixelRect,
    /// Where the layer appears on screen, in output pixels.
    pub display_frame: PixelRect,
    /// The layer's pixel data, borrowed from the producer.
    pub buffer: BufferRef<'a>,
    /// Opaque transform hint.
    pub transform: u32,
    /// Opaque blend mode hint.
    pub blending: u32,
    /// Opaque layer flags.
    pub flags: u32,
    /// Composition tag written by [`Composer::prepare`](crate::composer::Composer::prepare).
    pub composition: CompositionType,
}

impl<'a> Layer<'a> {
    /// Creates a layer with empty rectangles, zeroed hints, and a
    /// [`CompositionType::Framebuffer`] tag.
    #[must_use]
    pub const fn new(format: PixelFormat, buffer: BufferRef<'a>) -> Self {
        Self {
            format,
            source_crop: PixelRect::new(0, 0, 0, 0),
            display_frame: PixelRect::new(0, 0, 0, 0),
            buffer,
            transform: 0,
            blending: 0,
            flags: 0,
            composition: CompositionType::Framebuffer,
        }
    }

    /// Sets the source crop.
    #[must_use]
    pub const fn with_source_crop(mut self, crop: PixelRect) -> Self {
        self.source_crop = crop;
        self
    }

    /// Sets the display frame.
    #[must_use]
    pub const fn with_display_frame(mut self, frame: PixelRect) -> Self {
        self.display_frame = frame;
        self
    }

    /// Returns `true` if the layer is tagged for the overlay path.
    #[inline]
    #[must_use]
    pub const fn is_overlay(&self) -> bool {
        matches!(self.composition, CompositionType::Overlay)
    }
}

/// The ordered layers of one frame plus the geometry-changed flag.
///
/// The core reads layers in order and never reorders, inserts, or removes
/// them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LayerList<'a> {
    /// Layers, back to front.
    pub layers: Vec<Layer<'a>>,
    /// Whether the list's shape differs from the previous frame.
    pub geometry_changed: bool,
}

impl<'a> LayerList<'a> {
    /// Creates a list from layers and the geometry-changed flag.
    #[must_use]
    pub fn new(layers: Vec<Layer<'a>>, geometry_changed: bool) -> Self {
        Self {
            layers,
            geometry_changed,
        }
    }

    /// Number of layers.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns `true` if the list holds no layers.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Returns the composition tag of every layer, in list order.
    #[must_use]
    pub fn compositions(&self) -> Vec<CompositionType> {
        self.layers.iter().map(|l| l.composition).collect()
    }

    /// Returns the indices of overlay-tagged layers, in list order.
    #[must_use]
    pub fn overlay_indices(&self) -> Vec<usize> {
        self.layers
            .iter()
            .enumerate()
            .filter(|(_, l)| l.is_overlay())
            .map(|(i, _)| i)
            .collect()
    }
}
