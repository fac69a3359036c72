// Copyright 2026 the Hwoverlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! GPU presentation through `eglSwapBuffers`.

use core::ffi::c_void;
use core::ptr;

use hwoverlay_core::error::SwapError;
use hwoverlay_core::hardware::GpuPresenter;
use hwoverlay_core::output::{GpuDisplay, GpuSurface};

use crate::ffi;

/// [`GpuPresenter`] that swaps an EGL window surface.
///
/// [`GpuDisplay`] and [`GpuSurface`] carry the `EGLDisplay` and `EGLSurface`
/// pointer values.
#[derive(Clone, Copy, Debug, Default)]
pub struct EglPresenter;

impl GpuPresenter for EglPresenter {
    fn swap_buffers(&mut self, display: GpuDisplay, surface: GpuSurface) -> Result<(), SwapError> {
        let display = ptr::with_exposed_provenance_mut::<c_void>(display.0);
        let surface = ptr::with_exposed_provenance_mut::<c_void>(surface.0);
        // SAFETY: the caller hands over handles obtained from EGL for the
        // current thread's context.
        let ok = unsafe { ffi::eglSwapBuffers(display, surface) };
        if ok == ffi::EGL_FALSE {
            Err(SwapError)
        } else {
            Ok(())
        }
    }
}
