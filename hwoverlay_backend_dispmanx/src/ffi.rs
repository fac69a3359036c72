// Copyright 2026 the Hwoverlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw bindings to `bcm_host`, dispmanx, and `eglSwapBuffers`.
//!
//! Only the entry points the backend calls are declared. Types and constants
//! follow `interface/vmcs_host/vc_dispmanx_types.h` and
//! `interface/vctypes/vc_image_types.h` from the `VideoCore` userland.

use core::ffi::c_void;

pub(crate) type DisplayHandle = u32;
pub(crate) type UpdateHandle = u32;
pub(crate) type ElementHandle = u32;
pub(crate) type ResourceHandle = u32;

/// Handle value dispmanx returns on failure.
pub(crate) const NO_HANDLE: u32 = 0;

// VC_IMAGE_TYPE_T
pub(crate) const VC_IMAGE_RGB565: u32 = 1;
pub(crate) const VC_IMAGE_RGBA32: u32 = 15;
pub(crate) const VC_IMAGE_RGBX8888: u32 = 50;

// DISPMANX_FLAGS_ALPHA_T
pub(crate) const DISPMANX_FLAGS_ALPHA_FROM_SOURCE: u32 = 0;
pub(crate) const DISPMANX_FLAGS_ALPHA_FIXED_ALL_PIXELS: u32 = 1;

pub(crate) const DISPMANX_PROTECTION_NONE: u32 = 0;
pub(crate) const DISPMANX_NO_ROTATE: u32 = 0;

// vc_dispmanx_element_change_attributes flags
pub(crate) const ELEMENT_CHANGE_LAYER: u32 = 1 << 0;
pub(crate) const ELEMENT_CHANGE_DEST_RECT: u32 = 1 << 2;

pub(crate) const EGL_FALSE: u32 = 0;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct VcRect {
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) width: i32,
    pub(crate) height: i32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub(crate) struct VcDispmanxAlpha {
    pub(crate) flags: u32,
    pub(crate) opacity: u32,
    pub(crate) mask: ResourceHandle,
}

// SAFETY: These are the stable `VideoCore` host interface functions shipped in
// libbcm_host.
#[link(name = "bcm_host")]
unsafe extern "C" {
    pub(crate) fn bcm_host_init();
    pub(crate) fn vc_dispmanx_display_open(device: u32) -> DisplayHandle;

    pub(crate) fn vc_dispmanx_resource_create(
        image_type: u32,
        width: u32,
        height: u32,
        native_image_handle: *mut u32,
    ) -> ResourceHandle;
    pub(crate) fn vc_dispmanx_resource_write_data(
        res: ResourceHandle,
        src_type: u32,
        src_pitch: i32,
        src_address: *const c_void,
        rect: *const VcRect,
    ) -> i32;
    pub(crate) fn vc_dispmanx_resource_delete(res: ResourceHandle) -> i32;

    pub(crate) fn vc_dispmanx_update_start(priority: i32) -> UpdateHandle;
    pub(crate) fn vc_dispmanx_element_add(
        update: UpdateHandle,
        display: DisplayHandle,
        layer: i32,
        dest_rect: *const VcRect,
        src: ResourceHandle,
        src_rect: *const VcRect,
        protection: u32,
        alpha: *const VcDispmanxAlpha,
        clamp: *const c_void,
        transform: u32,
    ) -> ElementHandle;
    pub(crate) fn vc_dispmanx_element_change_attributes(
        update: UpdateHandle,
        element: ElementHandle,
        change_flags: u32,
        layer: i32,
        opacity: u8,
        dest_rect: *const VcRect,
        src_rect: *const VcRect,
        mask: ResourceHandle,
        transform: u32,
    ) -> i32;
    pub(crate) fn vc_dispmanx_element_remove(update: UpdateHandle, element: ElementHandle) -> i32;
    pub(crate) fn vc_dispmanx_update_submit_sync(update: UpdateHandle) -> i32;
}

// SAFETY: Standard EGL 1.4 entry point.
#[link(name = "EGL")]
unsafe extern "C" {
    pub(crate) fn eglSwapBuffers(display: *mut c_void, surface: *mut c_void) -> u32;
}
