// Copyright 2026 the Hwoverlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `bcm_host` bring-up.

use hwoverlay_core::error::HwError;
use hwoverlay_core::hardware::HwSubsystem;
use hwoverlay_core::output::DisplayHandle;

use crate::ffi;

/// [`HwSubsystem`] for the `VideoCore` host interface.
#[derive(Debug, Default)]
pub struct BcmHost {
    initialized: bool,
}

impl BcmHost {
    /// Creates an uninitialized host interface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl HwSubsystem for BcmHost {
    fn init(&mut self) {
        if self.initialized {
            return;
        }
        // SAFETY: `bcm_host_init` has no preconditions.
        unsafe { ffi::bcm_host_init() };
        self.initialized = true;
    }

    fn open_display(&mut self, index: u32) -> Result<DisplayHandle, HwError> {
        // SAFETY: the host interface was initialized by `init`, which
        // `Composer::open` and `open_composer` call first.
        let handle = unsafe { ffi::vc_dispmanx_display_open(index) };
        if handle == ffi::NO_HANDLE {
            return Err(HwError::DisplayOpenFailed(index));
        }
        Ok(DisplayHandle(handle))
    }
}
