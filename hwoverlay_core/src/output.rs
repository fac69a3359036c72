// Copyright 2026 the Hwoverlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Display and surface identification.
//!
//! These are lightweight opaque handles. Backends assign them; core passes
//! them through without interpreting the value.

use core::fmt;

/// Identifies a display opened on the overlay hardware.
///
/// Produced by [`HwSubsystem::open_display`](crate::hardware::HwSubsystem::open_display)
/// once at device-open time.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DisplayHandle(pub u32);

impl fmt::Debug for DisplayHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DisplayHandle({})", self.0)
    }
}

/// Opaque GPU display handle (an `EGLDisplay` on EGL platforms).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpuDisplay(pub usize);

impl fmt::Debug for GpuDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GpuDisplay({:#x})", self.0)
    }
}

/// Opaque GPU surface handle (an `EGLSurface` on EGL platforms).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpuSurface(pub usize);

impl fmt::Debug for GpuSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GpuSurface({:#x})", self.0)
    }
}

/// An opaque handle to a hardware overlay resource.
///
/// Assigned by the [`OverlayHardware`](crate::hardware::OverlayHardware)
/// allocator. The [`TransferEngine`](crate::transfer::TransferEngine) owns
/// every handle it creates and releases it explicitly.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceHandle(pub u32);

impl fmt::Debug for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceHandle({})", self.0)
    }
}
