// Copyright 2026 the Hwoverlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collaborator contracts for platform integrations.
//!
//! The core never talks to a driver directly. Backend crates implement these
//! traits:
//!
//! - **GPU presentation**: [`GpuPresenter`] swaps the GPU-composited
//!   framebuffer. Blocking; its result is known before it returns.
//!
//! - **Overlay resources**: [`OverlayHardware`] allocates hardware
//!   resources, writes pixel data into them, positions them on the output,
//!   and releases them. A frame's changes are bracketed by
//!   [`begin_frame`](OverlayHardware::begin_frame) and
//!   [`end_frame`](OverlayHardware::end_frame) so a backend can apply them
//!   as one update.
//!
//! - **Subsystem bring-up**: [`HwSubsystem`] performs the one-time hardware
//!   initialization and opens a display. Used only at device-open time by
//!   [`Composer::open`](crate::composer::Composer::open).
//!
//! - **Time**: `now() -> HostTime` and `timebase() -> Timebase` free
//!   functions that read the platform's monotonic clock. Passed to the core
//!   through [`ComposerConfig::clock`](crate::config::ComposerConfig::clock).
//!
//! # Crate boundaries
//!
//! `hwoverlay_core` owns the data model, classification, transfer planning,
//! and these contracts. Backend crates depend on `hwoverlay_core` and provide
//! driver glue. The display server integration constructs a
//! [`Composer`](crate::composer::Composer) and calls `prepare` and `present`
//! once per frame.

use crate::error::{HwError, SwapError};
use crate::format::HwImageType;
use crate::layer::{BufferRef, PixelRect};
use crate::output::{DisplayHandle, GpuDisplay, GpuSurface, ResourceHandle};

/// Alpha configuration applied when an overlay resource is positioned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OverlayAlpha {
    /// Take per-pixel alpha from the source image.
    pub from_source: bool,
    /// Global opacity, 0–255.
    pub opacity: u8,
}

impl OverlayAlpha {
    /// Fully opaque, ignoring source alpha.
    pub const OPAQUE: Self = Self {
        from_source: false,
        opacity: 255,
    };
}

impl Default for OverlayAlpha {
    fn default() -> Self {
        Self {
            from_source: true,
            opacity: 120,
        }
    }
}

/// Swaps the GPU-composited framebuffer onto the display.
pub trait GpuPresenter {
    /// Presents the back buffer of `surface` on `display`.
    fn swap_buffers(&mut self, display: GpuDisplay, surface: GpuSurface) -> Result<(), SwapError>;
}

/// Hardware resource allocator and output stage of the overlay engine.
///
/// Every handle returned by [`create_resource`](Self::create_resource) is
/// eventually passed to [`release_resource`](Self::release_resource) exactly
/// once by the [`TransferEngine`](crate::transfer::TransferEngine).
///
/// The [`Composer`](crate::composer::Composer) calls
/// [`begin_frame`](Self::begin_frame) before a frame's first placement or
/// release and [`end_frame`](Self::end_frame) after its last one. Placements
/// and releases between the two belong to one output update.
pub trait OverlayHardware {
    /// Opens the output update for a frame.
    fn begin_frame(&mut self) {}

    /// Applies every placement and release since [`begin_frame`](Self::begin_frame).
    fn end_frame(&mut self) {}

    /// Allocates a `width × height` resource of the given image type.
    fn create_resource(
        &mut self,
        image_type: HwImageType,
        width: u32,
        height: u32,
    ) -> Result<ResourceHandle, HwError>;

    /// Copies pixels from `src` into `rect` of the resource, reading `pitch`
    /// bytes per source row.
    fn write_resource(
        &mut self,
        resource: ResourceHandle,
        image_type: HwImageType,
        pitch: u32,
        src: BufferRef<'_>,
        rect: PixelRect,
    ) -> Result<(), HwError>;

    /// Positions the resource on the output at `dest`.
    ///
    /// `z` is the stacking position: where placed resources overlap, the one
    /// with the greater `z` is shown. A resource keeps its `z` until it is
    /// placed again or released.
    fn place_resource(
        &mut self,
        resource: ResourceHandle,
        dest: PixelRect,
        z: u32,
        alpha: OverlayAlpha,
    ) -> Result<(), HwError>;

    /// Removes the resource from the output and frees it.
    fn release_resource(&mut self, resource: ResourceHandle);
}

impl<T: GpuPresenter + ?Sized> GpuPresenter for &mut T {
    fn swap_buffers(&mut self, display: GpuDisplay, surface: GpuSurface) -> Result<(), SwapError> {
        (**self).swap_buffers(display, surface)
    }
}

impl<T: OverlayHardware + ?Sized> OverlayHardware for &mut T {
    fn begin_frame(&mut self) {
        (**self).begin_frame();
    }

    fn end_frame(&mut self) {
        (**self).end_frame();
    }

    fn create_resource(
        &mut self,
        image_type: HwImageType,
        width: u32,
        height: u32,
    ) -> Result<ResourceHandle, HwError> {
        (**self).create_resource(image_type, width, height)
    }

    fn write_resource(
        &mut self,
        resource: ResourceHandle,
        image_type: HwImageType,
        pitch: u32,
        src: BufferRef<'_>,
        rect: PixelRect,
    ) -> Result<(), HwError> {
        (**self).write_resource(resource, image_type, pitch, src, rect)
    }

    fn place_resource(
        &mut self,
        resource: ResourceHandle,
        dest: PixelRect,
        z: u32,
        alpha: OverlayAlpha,
    ) -> Result<(), HwError> {
        (**self).place_resource(resource, dest, z, alpha)
    }

    fn release_resource(&mut self, resource: ResourceHandle) {
        (**self).release_resource(resource);
    }
}

/// One-time hardware subsystem bring-up.
pub trait HwSubsystem {
    /// Initializes the hardware subsystem. Must be idempotent.
    fn init(&mut self);

    /// Opens display `index`.
    fn open_display(&mut self, index: u32) -> Result<DisplayHandle, HwError>;
}
