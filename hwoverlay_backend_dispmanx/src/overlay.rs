// Copyright 2026 the Hwoverlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dispmanx resources and elements.

use core::ffi::c_void;

use hashbrown::HashMap;
use hwoverlay_core::error::HwError;
use hwoverlay_core::format::HwImageType;
use hwoverlay_core::hardware::{OverlayAlpha, OverlayHardware};
use hwoverlay_core::layer::{BufferRef, PixelRect};
use hwoverlay_core::output::{DisplayHandle, ResourceHandle};

use crate::ffi;

/// Status reported when dispmanx hands back a null handle.
pub const STATUS_NULL_HANDLE: i32 = -1;
/// Status reported when a handle does not name a resource this backend owns.
pub const STATUS_UNKNOWN_RESOURCE: i32 = -2;
/// Status reported when the source buffer is shorter than the write needs.
pub const STATUS_SHORT_SOURCE: i32 = -3;

pub(crate) const fn vc_image_type(image_type: HwImageType) -> u32 {
    match image_type {
        HwImageType::Rgb565 => ffi::VC_IMAGE_RGB565,
        HwImageType::Rgbx8888 => ffi::VC_IMAGE_RGBX8888,
        HwImageType::Rgba32 => ffi::VC_IMAGE_RGBA32,
    }
}

pub(crate) fn vc_rect(r: PixelRect) -> ffi::VcRect {
    let r = r.normalized();
    ffi::VcRect {
        x: r.left,
        y: r.top,
        width: i32::try_from(r.width()).unwrap_or(i32::MAX),
        height: i32::try_from(r.height()).unwrap_or(i32::MAX),
    }
}

pub(crate) fn vc_alpha(alpha: OverlayAlpha) -> ffi::VcDispmanxAlpha {
    ffi::VcDispmanxAlpha {
        flags: if alpha.from_source {
            ffi::DISPMANX_FLAGS_ALPHA_FROM_SOURCE
        } else {
            ffi::DISPMANX_FLAGS_ALPHA_FIXED_ALL_PIXELS
        },
        opacity: u32::from(alpha.opacity),
        mask: ffi::NO_HANDLE,
    }
}

fn fixed_16_16(v: u32) -> i32 {
    v.checked_mul(1 << 16)
        .and_then(|v| i32::try_from(v).ok())
        .unwrap_or(i32::MAX)
}

/// Dispmanx layer number for stacking position `z`.
///
/// Layer 0 is left to the GPU framebuffer, so overlays start at 1.
pub(crate) fn element_layer(z: u32) -> i32 {
    i32::try_from(z).map_or(i32::MAX, |z| z.saturating_add(1))
}

#[derive(Clone, Copy, Debug)]
struct Resource {
    width: u32,
    height: u32,
    element: Option<ffi::ElementHandle>,
}

/// [`OverlayHardware`] on a dispmanx display.
///
/// Each placed resource owns one dispmanx element, stacked on the dispmanx
/// layer derived from its `z`. Changes made between
/// [`begin_frame`](OverlayHardware::begin_frame) and
/// [`end_frame`](OverlayHardware::end_frame) go into one update, submitted
/// once; resource deletions wait until that update has been applied.
/// Outside a frame every change is submitted on its own.
#[derive(Debug)]
pub struct DispmanxOverlay {
    display: DisplayHandle,
    resources: HashMap<u32, Resource>,
    update: Option<ffi::UpdateHandle>,
    pending_deletes: Vec<ffi::ResourceHandle>,
}

impl DispmanxOverlay {
    /// Creates an overlay engine for an opened display.
    ///
    /// `display` must come from [`BcmHost`](crate::BcmHost).
    #[must_use]
    pub fn new(display: DisplayHandle) -> Self {
        Self {
            display,
            resources: HashMap::new(),
            update: None,
            pending_deletes: Vec::new(),
        }
    }

    /// The display elements are added to.
    #[must_use]
    pub fn display(&self) -> DisplayHandle {
        self.display
    }

    /// Runs `f` in the frame's update, or in a standalone one outside a frame.
    fn in_update<T>(
        &self,
        f: impl FnOnce(ffi::UpdateHandle) -> Result<T, i32>,
        err: fn(i32) -> HwError,
    ) -> Result<T, HwError> {
        match self.update {
            Some(update) => f(update).map_err(err),
            None => with_update(f, err),
        }
    }
}

/// Runs `f` inside a dispmanx update and submits it synchronously.
fn with_update<T>(
    f: impl FnOnce(ffi::UpdateHandle) -> Result<T, i32>,
    err: fn(i32) -> HwError,
) -> Result<T, HwError> {
    // SAFETY: no preconditions beyond an initialized host interface.
    let update = unsafe { ffi::vc_dispmanx_update_start(0) };
    if update == ffi::NO_HANDLE {
        return Err(err(STATUS_NULL_HANDLE));
    }
    let out = f(update);
    // SAFETY: `update` was returned by `vc_dispmanx_update_start` and is
    // submitted exactly once.
    let status = unsafe { ffi::vc_dispmanx_update_submit_sync(update) };
    let value = out.map_err(err)?;
    if status != 0 {
        return Err(err(status));
    }
    Ok(value)
}

fn delete_resource(resource: ffi::ResourceHandle) {
    // SAFETY: `resource` was created by this backend and is deleted once.
    unsafe {
        ffi::vc_dispmanx_resource_delete(resource);
    }
}

impl OverlayHardware for DispmanxOverlay {
    fn begin_frame(&mut self) {
        if self.update.is_some() {
            return;
        }
        // SAFETY: no preconditions beyond an initialized host interface.
        let update = unsafe { ffi::vc_dispmanx_update_start(0) };
        // A null handle leaves the frame unbatched.
        self.update = (update != ffi::NO_HANDLE).then_some(update);
    }

    fn end_frame(&mut self) {
        if let Some(update) = self.update.take() {
            // SAFETY: `update` was returned by `vc_dispmanx_update_start` and
            // is submitted exactly once. A failed submit leaves the previous
            // frame on screen; there is nothing to retry.
            unsafe {
                ffi::vc_dispmanx_update_submit_sync(update);
            }
        }
        for resource in self.pending_deletes.drain(..) {
            delete_resource(resource);
        }
    }

    fn create_resource(
        &mut self,
        image_type: HwImageType,
        width: u32,
        height: u32,
    ) -> Result<ResourceHandle, HwError> {
        let mut native = 0_u32;
        // SAFETY: `native` is a valid out-pointer for the duration of the call.
        let handle = unsafe {
            ffi::vc_dispmanx_resource_create(vc_image_type(image_type), width, height, &mut native)
        };
        if handle == ffi::NO_HANDLE {
            return Err(HwError::CreateFailed(STATUS_NULL_HANDLE));
        }
        self.resources.insert(
            handle,
            Resource {
                width,
                height,
                element: None,
            },
        );
        Ok(ResourceHandle(handle))
    }

    fn write_resource(
        &mut self,
        resource: ResourceHandle,
        image_type: HwImageType,
        pitch: u32,
        src: BufferRef<'_>,
        rect: PixelRect,
    ) -> Result<(), HwError> {
        if !self.resources.contains_key(&resource.0) {
            return Err(HwError::WriteFailed(STATUS_UNKNOWN_RESOURCE));
        }
        let vc = vc_rect(rect);
        // The driver reads `height` rows `pitch` bytes apart, `width` pixels
        // each.
        let rows = usize::try_from(vc.height).unwrap_or(usize::MAX);
        let row_bytes = usize::try_from(vc.width)
            .unwrap_or(usize::MAX)
            .saturating_mul(image_type.bytes_per_pixel() as usize);
        let needed = match rows {
            0 => 0,
            n => (n - 1).saturating_mul(pitch as usize).saturating_add(row_bytes),
        };
        if src.len() < needed {
            return Err(HwError::WriteFailed(STATUS_SHORT_SOURCE));
        }
        let pitch = i32::try_from(pitch).map_err(|_| HwError::WriteFailed(STATUS_SHORT_SOURCE))?;
        // SAFETY: `src` covers every byte the driver reads (checked above) and
        // `vc` lives across the call.
        let status = unsafe {
            ffi::vc_dispmanx_resource_write_data(
                resource.0,
                vc_image_type(image_type),
                pitch,
                src.as_bytes().as_ptr().cast::<c_void>(),
                &vc,
            )
        };
        if status != 0 {
            return Err(HwError::WriteFailed(status));
        }
        Ok(())
    }

    fn place_resource(
        &mut self,
        resource: ResourceHandle,
        dest: PixelRect,
        z: u32,
        alpha: OverlayAlpha,
    ) -> Result<(), HwError> {
        let Some(entry) = self.resources.get(&resource.0).copied() else {
            return Err(HwError::PlaceFailed(STATUS_UNKNOWN_RESOURCE));
        };
        let layer = element_layer(z);
        let dest_rect = vc_rect(dest);
        // Source rectangles are 16.16 fixed point.
        let src_rect = ffi::VcRect {
            x: 0,
            y: 0,
            width: fixed_16_16(entry.width),
            height: fixed_16_16(entry.height),
        };
        let display = self.display.0;

        let element = self.in_update(
            |update| match entry.element {
                Some(element) => {
                    // SAFETY: `element` belongs to this display and the rects
                    // live across the call.
                    let status = unsafe {
                        ffi::vc_dispmanx_element_change_attributes(
                            update,
                            element,
                            ffi::ELEMENT_CHANGE_LAYER | ffi::ELEMENT_CHANGE_DEST_RECT,
                            layer,
                            alpha.opacity,
                            &dest_rect,
                            &src_rect,
                            ffi::NO_HANDLE,
                            ffi::DISPMANX_NO_ROTATE,
                        )
                    };
                    if status == 0 { Ok(element) } else { Err(status) }
                }
                None => {
                    let vc_alpha = vc_alpha(alpha);
                    // SAFETY: all pointers reference locals that outlive the
                    // call; a null clamp selects the default.
                    let element = unsafe {
                        ffi::vc_dispmanx_element_add(
                            update,
                            display,
                            layer,
                            &dest_rect,
                            resource.0,
                            &src_rect,
                            ffi::DISPMANX_PROTECTION_NONE,
                            &vc_alpha,
                            core::ptr::null(),
                            ffi::DISPMANX_NO_ROTATE,
                        )
                    };
                    if element == ffi::NO_HANDLE {
                        Err(STATUS_NULL_HANDLE)
                    } else {
                        Ok(element)
                    }
                }
            },
            HwError::PlaceFailed,
        )?;

        if let Some(entry) = self.resources.get_mut(&resource.0) {
            entry.element = Some(element);
        }
        Ok(())
    }

    fn release_resource(&mut self, resource: ResourceHandle) {
        let Some(entry) = self.resources.remove(&resource.0) else {
            return;
        };
        if let Some(element) = entry.element {
            // Removal failures leave nothing to retry; the resource is still
            // deleted below.
            let _ = self.in_update(
                |update| {
                    // SAFETY: `element` was added by this backend and is
                    // removed once.
                    match unsafe { ffi::vc_dispmanx_element_remove(update, element) } {
                        0 => Ok(()),
                        status => Err(status),
                    }
                },
                HwError::PlaceFailed,
            );
        }
        if self.update.is_some() {
            self.pending_deletes.push(resource.0);
        } else {
            delete_resource(resource.0);
        }
    }
}
